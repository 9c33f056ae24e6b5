//! Root client
//!
//! Entry point of the client hierarchy. Built from a low-level connection and
//! hands out every sub-client over one shared API connection.

use crate::clients::miscellaneous::{MiscellaneousApi, MiscellaneousClient};
use crate::clients::repositories::{RepositoriesApi, RepositoriesClient};
use crate::clients::users::{UsersApi, UsersClient};
use crate::connection::{ApiConnection, Connection, DefaultApiConnection};
use crate::graph::{erase, AnyInstance};
use crate::transport::ApiInfo;
use std::sync::Arc;
use std::time::Duration;

pub trait GitHubClient: Send + Sync {
    fn connection(&self) -> Arc<dyn Connection>;

    fn miscellaneous(&self) -> Arc<dyn MiscellaneousClient>;

    fn user(&self) -> Arc<dyn UsersClient>;

    fn repository(&self) -> Arc<dyn RepositoriesClient>;

    /// Metadata of the most recent response on this client's connection
    fn last_api_info(&self) -> Option<ApiInfo> {
        self.connection().last_api_info()
    }

    /// `None` disables the request timeout
    fn set_request_timeout(&self, timeout: Option<Duration>) {
        self.connection().set_request_timeout(timeout)
    }
}

pub struct GitHub {
    connection: Arc<dyn Connection>,
    miscellaneous: Arc<dyn MiscellaneousClient>,
    user: Arc<dyn UsersClient>,
    repository: Arc<dyn RepositoriesClient>,
}

impl GitHub {
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        let api: Arc<dyn ApiConnection> = Arc::new(DefaultApiConnection::new(connection.clone()));
        Self {
            connection,
            miscellaneous: Arc::new(MiscellaneousApi::new(api.clone())),
            user: Arc::new(UsersApi::new(api.clone())),
            repository: Arc::new(RepositoriesApi::new(api)),
        }
    }

    pub(crate) fn construct(connection: Arc<dyn Connection>) -> AnyInstance {
        erase::<dyn GitHubClient>(Arc::new(Self::new(connection)))
    }
}

impl GitHubClient for GitHub {
    fn connection(&self) -> Arc<dyn Connection> {
        self.connection.clone()
    }

    fn miscellaneous(&self) -> Arc<dyn MiscellaneousClient> {
        self.miscellaneous.clone()
    }

    fn user(&self) -> Arc<dyn UsersClient> {
        self.user.clone()
    }

    fn repository(&self) -> Arc<dyn RepositoriesClient> {
        self.repository.clone()
    }
}
