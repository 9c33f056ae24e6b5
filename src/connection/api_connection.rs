//! API-level connection
//!
//! Typed JSON access on top of a low-level [`Connection`].

use crate::connection::connection::Connection;
use crate::error::{OctowireError, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Connection abstraction the generated clients are built on
#[async_trait]
pub trait ApiConnection: Send + Sync {
    /// The underlying low-level connection
    fn connection(&self) -> Arc<dyn Connection>;

    /// GET a resource and return its decoded body
    async fn get(&self, path: &str) -> Result<Value>;
}

/// Default [`ApiConnection`] wrapper
pub struct DefaultApiConnection {
    connection: Arc<dyn Connection>,
}

impl DefaultApiConnection {
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl ApiConnection for DefaultApiConnection {
    fn connection(&self) -> Arc<dyn Connection> {
        self.connection.clone()
    }

    async fn get(&self, path: &str) -> Result<Value> {
        let response = self.connection.send(Method::GET, path, None).await?;
        Ok(response.body)
    }
}

/// GET a resource and deserialize it into `T`
pub async fn get_as<T: DeserializeOwned>(api: &dyn ApiConnection, path: &str) -> Result<T> {
    let value = api.get(path).await?;
    serde_json::from_value(value)
        .map_err(|e| OctowireError::Response(format!("Unexpected shape for '{}': {}", path, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_connection, RecordingTransport, StubResponse};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Login {
        login: String,
    }

    #[tokio::test]
    async fn test_get_as_decodes_body() {
        let transport = RecordingTransport::new(vec![StubResponse::ok(json!({ "login": "octocat" }))]);
        let api = DefaultApiConnection::new(test_connection(transport.clone()));

        let user: Login = get_as(&api, "user").await.unwrap();

        assert_eq!(user.login, "octocat");
        assert_eq!(transport.last_request().unwrap().method, Method::GET);
    }

    #[tokio::test]
    async fn test_get_as_reports_shape_mismatch() {
        let transport = RecordingTransport::new(vec![StubResponse::ok(json!([1, 2, 3]))]);
        let api = DefaultApiConnection::new(test_connection(transport));

        let err = get_as::<Login>(&api, "user").await.unwrap_err();
        assert!(matches!(err, OctowireError::Response(msg) if msg.contains("'user'")));
    }

    #[tokio::test]
    async fn test_exposes_underlying_connection() {
        let transport = RecordingTransport::new(vec![]);
        let connection = test_connection(transport);
        let api = DefaultApiConnection::new(connection.clone());

        assert!(Arc::ptr_eq(&api.connection(), &connection));
    }
}
