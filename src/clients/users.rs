//! User endpoints.

use crate::clients::models::{EmailAddress, User};
use crate::connection::{get_as, ApiConnection};
use crate::error::{require_non_blank, Result};
use crate::graph::{erase, AnyInstance};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait UsersClient: Send + Sync {
    /// Email addresses of the authenticated user
    fn email(&self) -> Arc<dyn UserEmailsClient>;

    /// The authenticated user
    async fn current(&self) -> Result<User>;

    async fn get(&self, login: &str) -> Result<User>;
}

#[async_trait]
pub trait UserEmailsClient: Send + Sync {
    async fn get_all(&self) -> Result<Vec<EmailAddress>>;
}

pub struct UsersApi {
    api: Arc<dyn ApiConnection>,
    email: Arc<dyn UserEmailsClient>,
}

impl UsersApi {
    pub fn new(api: Arc<dyn ApiConnection>) -> Self {
        Self {
            email: Arc::new(UserEmailsApi::new(api.clone())),
            api,
        }
    }

    pub(crate) fn construct(api: Arc<dyn ApiConnection>) -> AnyInstance {
        erase::<dyn UsersClient>(Arc::new(Self::new(api)))
    }
}

#[async_trait]
impl UsersClient for UsersApi {
    fn email(&self) -> Arc<dyn UserEmailsClient> {
        self.email.clone()
    }

    async fn current(&self) -> Result<User> {
        get_as(self.api.as_ref(), "user").await
    }

    async fn get(&self, login: &str) -> Result<User> {
        require_non_blank("login", login)?;
        get_as(self.api.as_ref(), &format!("users/{}", login)).await
    }
}

pub struct UserEmailsApi {
    api: Arc<dyn ApiConnection>,
}

impl UserEmailsApi {
    pub fn new(api: Arc<dyn ApiConnection>) -> Self {
        Self { api }
    }

    pub(crate) fn construct(api: Arc<dyn ApiConnection>) -> AnyInstance {
        erase::<dyn UserEmailsClient>(Arc::new(Self::new(api)))
    }
}

#[async_trait]
impl UserEmailsClient for UserEmailsApi {
    async fn get_all(&self) -> Result<Vec<EmailAddress>> {
        get_as(self.api.as_ref(), "user/emails").await
    }
}
