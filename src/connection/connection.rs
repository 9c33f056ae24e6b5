//! Low-level connection
//!
//! Pairs a transport with a base address, credentials, an identity and a
//! serializer, and turns raw HTTP responses into API results.

use crate::connection::credentials::{CredentialStore, Credentials, InMemoryCredentialStore};
use crate::connection::product::ProductHeaderValue;
use crate::connection::serializer::{JsonSerializer, SimpleJsonSerializer};
use crate::error::{ApiErrorDetail, OctowireError, RateLimitExceeded, Result};
use crate::transport::{
    is_rate_limit_error, ApiInfo, HttpRequest, HttpResponse, HttpTransport,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Public GitHub API endpoint
pub const GITHUB_API_URL: &str = "https://api.github.com/";

const ACCEPT_V3: &str = "application/vnd.github.v3+json";

/// A decoded API response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub api_info: ApiInfo,
}

/// Low-level connection to the API
#[async_trait]
pub trait Connection: Send + Sync {
    /// Address all relative paths are resolved against
    fn base_address(&self) -> &str;

    fn credential_store(&self) -> Arc<dyn CredentialStore>;

    fn credentials(&self) -> Credentials {
        self.credential_store().get_credentials()
    }

    /// Metadata of the most recent response, if any request completed
    fn last_api_info(&self) -> Option<ApiInfo>;

    /// `None` removes the timeout: requests block until the network layer resolves
    fn set_request_timeout(&self, timeout: Option<Duration>);

    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<ApiResponse>;
}

/// Error payload GitHub returns on failures
#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

/// [`Connection`] speaking HTTP through an [`HttpTransport`]
pub struct HttpConnection {
    base_address: String,
    product: ProductHeaderValue,
    transport: Arc<dyn HttpTransport>,
    credential_store: Arc<dyn CredentialStore>,
    serializer: Arc<dyn JsonSerializer>,
    timeout: RwLock<Option<Duration>>,
    last_api_info: RwLock<Option<ApiInfo>>,
}

impl HttpConnection {
    /// Anonymous connection to the public API with the default serializer
    pub fn new(product: ProductHeaderValue, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            base_address: GITHUB_API_URL.to_string(),
            product,
            transport,
            credential_store: Arc::new(InMemoryCredentialStore::anonymous()),
            serializer: Arc::new(SimpleJsonSerializer),
            timeout: RwLock::new(None),
            last_api_info: RwLock::new(None),
        }
    }

    pub fn with_base_address(mut self, base_address: impl Into<String>) -> Self {
        self.base_address = base_address.into();
        self
    }

    pub fn with_credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credential_store = store;
        self
    }

    pub fn with_serializer(mut self, serializer: Arc<dyn JsonSerializer>) -> Self {
        self.serializer = serializer;
        self
    }

    pub fn product(&self) -> &ProductHeaderValue {
        &self.product
    }

    fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_address.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn build_request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<HttpRequest> {
        let mut request = HttpRequest::new(method, self.resolve_url(path));
        request.timeout = *self.timeout.read();

        request.headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.product.to_string())
                .map_err(|e| OctowireError::Config(format!("Invalid product header: {}", e)))?,
        );
        request
            .headers
            .insert(ACCEPT, HeaderValue::from_static(ACCEPT_V3));

        if let Some(auth) = self.credentials().authorization_header() {
            request.headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth)
                    .map_err(|e| OctowireError::Config(format!("Invalid credentials format: {}", e)))?,
            );
        }

        if let Some(body) = body {
            request
                .headers
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            request.body = Some(self.serializer.serialize(body)?);
        }

        Ok(request)
    }
}

#[async_trait]
impl Connection for HttpConnection {
    fn base_address(&self) -> &str {
        &self.base_address
    }

    fn credential_store(&self) -> Arc<dyn CredentialStore> {
        self.credential_store.clone()
    }

    fn last_api_info(&self) -> Option<ApiInfo> {
        self.last_api_info.read().clone()
    }

    fn set_request_timeout(&self, timeout: Option<Duration>) {
        *self.timeout.write() = timeout;
    }

    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<ApiResponse> {
        let request = self.build_request(method, path, body)?;
        let response = self.transport.send(request).await?;

        let api_info = ApiInfo::from_headers(&response.headers);
        *self.last_api_info.write() = Some(api_info.clone());

        if !response.status.is_success() {
            return Err(error_from_response(&response, &api_info));
        }

        let body = self.serializer.deserialize(&response.body)?;
        Ok(ApiResponse {
            status: response.status,
            headers: response.headers,
            body,
            api_info,
        })
    }
}

/// Classify a non-success response
fn error_from_response(response: &HttpResponse, api_info: &ApiInfo) -> OctowireError {
    let text = response.body_text();
    let payload: ErrorPayload = serde_json::from_str(&text).unwrap_or_default();
    let message = payload.message.unwrap_or_else(|| {
        response
            .status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    });

    let status = response.status.as_u16();

    if let Some(state) = api_info.rate_limit {
        if is_rate_limit_error(status, state.remaining) {
            return RateLimitExceeded {
                state,
                message,
                errors: payload.errors,
            }
            .into();
        }
    }

    match response.status {
        StatusCode::UNAUTHORIZED => OctowireError::Authorization(message),
        StatusCode::NOT_FOUND => OctowireError::NotFound(message),
        _ => OctowireError::Api { status, message },
    }
}
