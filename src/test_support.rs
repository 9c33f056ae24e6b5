//! Shared fakes for unit tests

use crate::connection::{Connection, HttpConnection, ProductHeaderValue};
use crate::error::{OctowireError, Result};
use crate::transport::rate_limit::{LIMIT_HEADER, REMAINING_HEADER, RESET_HEADER};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

/// Canned response handed out by [`RecordingTransport`]
#[derive(Debug, Clone)]
pub struct StubResponse {
    status: u16,
    headers: HeaderMap,
    body: Value,
}

impl StubResponse {
    pub fn ok(body: Value) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
        }
    }

    pub fn with_rate_limit(mut self, limit: u32, remaining: u32, reset: i64) -> Self {
        self.headers.insert(LIMIT_HEADER, limit.into());
        self.headers.insert(REMAINING_HEADER, remaining.into());
        self.headers.insert(RESET_HEADER, reset.into());
        self
    }

    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.insert(name, HeaderValue::from_static(value));
        self
    }
}

/// Transport that records requests and replays stubbed responses in order
#[derive(Debug, Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<StubResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    pub fn new(responses: Vec<StubResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().push(request);
        let stub = self
            .responses
            .lock()
            .pop_front()
            .ok_or_else(|| OctowireError::Request("no stubbed response left".to_string()))?;

        Ok(HttpResponse {
            status: StatusCode::from_u16(stub.status)
                .map_err(|e| OctowireError::Internal(e.to_string()))?,
            headers: stub.headers,
            body: Bytes::from(serde_json::to_vec(&stub.body)?),
        })
    }
}

/// Anonymous connection over the given transport
pub fn test_connection(transport: Arc<RecordingTransport>) -> Arc<dyn Connection> {
    let product = ProductHeaderValue::new("octowire-test", "1.0").expect("valid product");
    Arc::new(HttpConnection::new(product, transport))
}
