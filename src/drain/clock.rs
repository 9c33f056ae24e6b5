//! Wall clock abstraction for reset arithmetic.

use chrono::{DateTime, Utc};
use std::time::Duration;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Time left until `reset`; `None` once it is reached or already past
pub fn time_until_reset(reset: DateTime<Utc>, now: DateTime<Utc>) -> Option<Duration> {
    (reset - now)
        .to_std()
        .ok()
        .filter(|wait| !wait.is_zero())
}
