//! Miscellaneous endpoints: service metadata and rate limits.

use crate::clients::models::{Meta, MiscellaneousRateLimit};
use crate::connection::{get_as, ApiConnection};
use crate::error::Result;
use crate::graph::{erase, AnyInstance};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait MiscellaneousClient: Send + Sync {
    /// `GET /meta`
    async fn get_metadata(&self) -> Result<Meta>;

    /// `GET /rate_limit`; does not count against the core window
    async fn get_rate_limits(&self) -> Result<MiscellaneousRateLimit>;
}

pub struct MiscellaneousApi {
    api: Arc<dyn ApiConnection>,
}

impl MiscellaneousApi {
    pub fn new(api: Arc<dyn ApiConnection>) -> Self {
        Self { api }
    }

    pub(crate) fn construct(api: Arc<dyn ApiConnection>) -> AnyInstance {
        erase::<dyn MiscellaneousClient>(Arc::new(Self::new(api)))
    }
}

#[async_trait]
impl MiscellaneousClient for MiscellaneousApi {
    async fn get_metadata(&self) -> Result<Meta> {
        get_as(self.api.as_ref(), "meta").await
    }

    async fn get_rate_limits(&self) -> Result<MiscellaneousRateLimit> {
        get_as(self.api.as_ref(), "rate_limit").await
    }
}
