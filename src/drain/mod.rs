//! Drain Module
//!
//! Polls a cheap endpoint until the rate window is exhausted, sleeps until the
//! window resets, and starts over until cancelled.

pub mod clock;

pub use clock::{time_until_reset, Clock, SystemClock};

use crate::clients::GitHubClient;
use crate::error::{OctowireError, RateLimitExceeded, Result};
use crate::transport::RateWindowState;
use async_trait::async_trait;
use std::sync::Arc;
pub use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// One minimal read-only request that reports the current rate window
#[async_trait]
pub trait RateLimitProbe: Send + Sync {
    async fn probe(&self) -> Result<RateWindowState>;
}

/// Probes `GET /meta` and reads the window from the response metadata
pub struct MetadataProbe {
    client: Arc<dyn GitHubClient>,
}

impl MetadataProbe {
    pub fn new(client: Arc<dyn GitHubClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RateLimitProbe for MetadataProbe {
    async fn probe(&self) -> Result<RateWindowState> {
        self.client.miscellaneous().get_metadata().await?;

        self.client
            .last_api_info()
            .and_then(|info| info.rate_limit)
            .ok_or_else(|| {
                OctowireError::Response("Response carried no rate limit headers".to_string())
            })
    }
}

/// How the drain loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainLoopOutcome {
    /// Stopped by the cancellation token
    Cancelled {
        /// Probes that completed, successfully or with an exceeded limit
        probes: u64,

        /// Full waits for a window reset
        waits: u64,
    },
}

pub struct RateLimitDrain {
    probe: Arc<dyn RateLimitProbe>,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
}

impl RateLimitDrain {
    pub fn new(probe: Arc<dyn RateLimitProbe>, cancel: CancellationToken) -> Self {
        Self {
            probe,
            clock: Arc::new(SystemClock),
            cancel,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run until cancelled.
    ///
    /// Cancellation is observed before each probe and during the reset wait.
    /// Failures other than an exceeded rate limit end the loop with that error.
    pub async fn run(&self) -> Result<DrainLoopOutcome> {
        let mut probes = 0u64;
        let mut waits = 0u64;

        loop {
            if self.cancel.is_cancelled() {
                return Ok(self.stopped(probes, waits));
            }

            // An in-flight probe always runs to completion
            let exceeded = match self.probe.probe().await {
                Ok(state) => {
                    probes += 1;
                    info!(
                        remaining = state.remaining,
                        limit = state.limit,
                        reset = %state.reset,
                        "Rate limit window"
                    );
                    continue;
                }
                Err(OctowireError::RateLimitExceeded(exceeded)) => {
                    probes += 1;
                    exceeded
                }
                Err(e) => return Err(e),
            };

            log_exceeded(&exceeded);

            let Some(wait) = time_until_reset(exceeded.state.reset, self.clock.now()) else {
                debug!(reset = %exceeded.state.reset, "Reset already passed, no wait needed");
                continue;
            };

            info!(
                wait_secs = wait.as_secs_f64(),
                reset = %exceeded.state.reset,
                "Rate limit exceeded, waiting for reset"
            );

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Ok(self.stopped(probes, waits)),
                _ = tokio::time::sleep(wait) => waits += 1,
            }
        }
    }

    fn stopped(&self, probes: u64, waits: u64) -> DrainLoopOutcome {
        warn!(probes, waits, "Drain loop cancelled");
        DrainLoopOutcome::Cancelled { probes, waits }
    }
}

fn log_exceeded(exceeded: &RateLimitExceeded) {
    warn!(
        message = %exceeded.message,
        limit = exceeded.state.limit,
        remaining = exceeded.state.remaining,
        "Rate limit exceeded"
    );

    for detail in &exceeded.errors {
        error!(
            code = %detail.code,
            message = %detail.message,
            resource = ?detail.resource,
            field = ?detail.field,
            "API error detail"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::GitHub;
    use crate::error::ApiErrorDetail;
    use crate::test_support::{test_connection, RecordingTransport, StubResponse};
    use chrono::{DateTime, TimeZone, Utc};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::time::Duration;
    use tokio::time::Instant;
    use tokio_test::{assert_pending, assert_ready_ok, task};

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    /// Replays scripted results, then cancels the token and reports a fresh window
    struct ScriptedProbe {
        results: Mutex<VecDeque<Result<RateWindowState>>>,
        calls: Mutex<Vec<Instant>>,
        cancel: CancellationToken,
    }

    impl ScriptedProbe {
        fn new(results: Vec<Result<RateWindowState>>, cancel: CancellationToken) -> Arc<Self> {
            Arc::new(Self {
                results: Mutex::new(results.into()),
                calls: Mutex::new(Vec::new()),
                cancel,
            })
        }

        fn calls(&self) -> Vec<Instant> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl RateLimitProbe for ScriptedProbe {
        async fn probe(&self) -> Result<RateWindowState> {
            self.calls.lock().push(Instant::now());
            let next = self.results.lock().pop_front();
            match next {
                Some(result) => result,
                None => {
                    self.cancel.cancel();
                    Ok(window(60, now()))
                }
            }
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn window(remaining: u32, reset: DateTime<Utc>) -> RateWindowState {
        RateWindowState {
            limit: 60,
            remaining,
            reset,
        }
    }

    fn exceeded(reset: DateTime<Utc>) -> OctowireError {
        RateLimitExceeded {
            state: window(0, reset),
            message: "API rate limit exceeded".to_string(),
            errors: vec![ApiErrorDetail {
                code: "rate_limited".to_string(),
                message: "slow down".to_string(),
                ..Default::default()
            }],
        }
        .into()
    }

    /// The paused clock advances in whole timer ticks
    fn assert_waited(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual < expected + Duration::from_millis(5),
            "waited {actual:?}, expected {expected:?}"
        );
    }

    fn drain(probe: Arc<ScriptedProbe>, cancel: CancellationToken) -> RateLimitDrain {
        RateLimitDrain::new(probe, cancel).with_clock(Arc::new(FixedClock(now())))
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_until_reset() {
        let cancel = CancellationToken::new();
        let reset = now() + chrono::Duration::seconds(5);
        let probe = ScriptedProbe::new(
            vec![Ok(window(1, reset)), Err(exceeded(reset)), Ok(window(60, reset))],
            cancel.clone(),
        );

        let outcome = drain(probe.clone(), cancel).run().await.unwrap();

        assert_eq!(outcome, DrainLoopOutcome::Cancelled { probes: 4, waits: 1 });
        let calls = probe.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[1] - calls[0], Duration::ZERO);
        assert_waited(calls[2] - calls[1], Duration::from_secs(5));
        assert_eq!(calls[3] - calls[2], Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_past_reset_probes_again_immediately() {
        let cancel = CancellationToken::new();
        let probe = ScriptedProbe::new(
            vec![Err(exceeded(now() - chrono::Duration::seconds(10)))],
            cancel.clone(),
        );

        let outcome = drain(probe.clone(), cancel).run().await.unwrap();

        assert_eq!(outcome, DrainLoopOutcome::Cancelled { probes: 2, waits: 0 });
        let calls = probe.calls();
        assert_eq!(calls[1] - calls[0], Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_wait() {
        let cancel = CancellationToken::new();
        let probe = ScriptedProbe::new(
            vec![Err(exceeded(now() + chrono::Duration::hours(1)))],
            cancel.clone(),
        );

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            canceller.cancel();
        });

        let started = Instant::now();
        let outcome = drain(probe.clone(), cancel).run().await.unwrap();

        assert_eq!(outcome, DrainLoopOutcome::Cancelled { probes: 1, waits: 0 });
        assert_waited(started.elapsed(), Duration::from_secs(1));
        assert_eq!(probe.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_wakes_on_cancel() {
        let cancel = CancellationToken::new();
        let probe = ScriptedProbe::new(
            vec![Err(exceeded(now() + chrono::Duration::hours(1)))],
            cancel.clone(),
        );
        let drain = drain(probe.clone(), cancel.clone());
        let mut running = task::spawn(drain.run());

        assert_pending!(running.poll());
        cancel.cancel();

        assert!(running.is_woken());
        let outcome = assert_ready_ok!(running.poll());
        assert_eq!(outcome, DrainLoopOutcome::Cancelled { probes: 1, waits: 0 });
        assert_eq!(probe.calls().len(), 1);
    }

    struct SlowProbe {
        delay: Duration,
        finished: Mutex<u32>,
    }

    #[async_trait]
    impl RateLimitProbe for SlowProbe {
        async fn probe(&self) -> Result<RateWindowState> {
            tokio::time::sleep(self.delay).await;
            *self.finished.lock() += 1;
            Ok(window(59, now()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_lets_in_flight_request_finish() {
        let cancel = CancellationToken::new();
        let probe = Arc::new(SlowProbe {
            delay: Duration::from_secs(10),
            finished: Mutex::new(0),
        });

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            canceller.cancel();
        });

        let started = Instant::now();
        let outcome = RateLimitDrain::new(probe.clone(), cancel)
            .with_clock(Arc::new(FixedClock(now())))
            .run()
            .await
            .unwrap();

        assert_eq!(outcome, DrainLoopOutcome::Cancelled { probes: 1, waits: 0 });
        assert_eq!(*probe.finished.lock(), 1);
        assert_waited(started.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_cancelled_before_first_probe() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let probe = ScriptedProbe::new(vec![Ok(window(60, now()))], cancel.clone());

        let outcome = drain(probe.clone(), cancel).run().await.unwrap();

        assert_eq!(outcome, DrainLoopOutcome::Cancelled { probes: 0, waits: 0 });
        assert!(probe.calls().is_empty());
    }

    #[tokio::test]
    async fn test_other_errors_end_the_loop() {
        let cancel = CancellationToken::new();
        let probe = ScriptedProbe::new(
            vec![
                Ok(window(60, now())),
                Err(OctowireError::Request("connection reset".to_string())),
            ],
            cancel.clone(),
        );

        let err = drain(probe.clone(), cancel.clone()).run().await.unwrap_err();

        assert!(matches!(err, OctowireError::Request(_)));
        assert_eq!(probe.calls().len(), 2);
        assert!(!cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_metadata_probe_reads_window() {
        let transport = RecordingTransport::new(vec![
            StubResponse::ok(json!({})).with_rate_limit(60, 42, 1_700_000_000),
            StubResponse::ok(json!({})),
        ]);
        let client: Arc<dyn GitHubClient> = Arc::new(GitHub::new(test_connection(transport)));
        let probe = MetadataProbe::new(client);

        let state = probe.probe().await.unwrap();
        assert_eq!(state.remaining, 42);
        assert_eq!(state.reset, now());

        let err = probe.probe().await.unwrap_err();
        assert!(matches!(err, OctowireError::Response(_)));
    }

    #[tokio::test]
    async fn test_secondary_limit_ends_the_loop() {
        let transport = RecordingTransport::new(vec![StubResponse::status(
            403,
            json!({ "message": "You have exceeded a secondary rate limit." }),
        )
        .with_rate_limit(5000, 4000, 1_700_003_600)
        .with_header("retry-after", "30")]);
        let client: Arc<dyn GitHubClient> = Arc::new(GitHub::new(test_connection(transport)));
        let cancel = CancellationToken::new();

        let err = RateLimitDrain::new(Arc::new(MetadataProbe::new(client)), cancel)
            .with_clock(Arc::new(FixedClock(now())))
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, OctowireError::Api { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_metadata_probe_surfaces_exceeded_limit() {
        let transport = RecordingTransport::new(vec![StubResponse::status(
            403,
            json!({
                "message": "API rate limit exceeded",
                "errors": [{ "code": "rate_limited", "message": "slow down" }]
            }),
        )
        .with_rate_limit(60, 0, 1_700_000_000)]);
        let client: Arc<dyn GitHubClient> = Arc::new(GitHub::new(test_connection(transport)));

        let err = MetadataProbe::new(client).probe().await.unwrap_err();

        let exceeded = err.as_rate_limit_exceeded().unwrap();
        assert_eq!(exceeded.state.reset, now());
        assert_eq!(exceeded.errors.len(), 1);
    }
}
