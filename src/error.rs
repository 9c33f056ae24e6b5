//! Octowire Error Types
//!
//! Error handling for client wiring, transport and the drain loop.

use crate::transport::RateWindowState;
use serde::Deserialize;
use std::fmt;

/// A single structured error record returned by the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiErrorDetail {
    /// Machine readable error code (e.g. "missing_field")
    #[serde(default)]
    pub code: String,

    /// Human readable message
    #[serde(default)]
    pub message: String,

    /// Resource the error refers to
    #[serde(default)]
    pub resource: Option<String>,

    /// Field the error refers to
    #[serde(default)]
    pub field: Option<String>,
}

/// Failure raised when the current rate window has no calls left
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitExceeded {
    /// Rate window metadata carried by the failed response
    pub state: RateWindowState,

    /// Top level message from the response body
    pub message: String,

    /// Structured error details from the response body
    pub errors: Vec<ApiErrorDetail>,
}

impl fmt::Display for RateLimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}/{} remaining, window resets at {})",
            self.message, self.state.remaining, self.state.limit, self.state.reset
        )
    }
}

/// Main error type for Octowire operations
#[derive(Debug, thiserror::Error)]
pub enum OctowireError {
    /// A required input was absent or blank
    #[error("Invalid value for '{parameter}': {message}")]
    InvalidInput {
        parameter: &'static str,
        message: String,
    },

    /// Configuration errors (invalid JSON, unreadable files, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// More than one implementation qualifies for an interface
    #[error("Interface '{interface}' has more than one eligible implementation: {}", .candidates.join(", "))]
    AmbiguousImplementation {
        interface: &'static str,
        candidates: Vec<&'static str>,
    },

    /// No implementation qualifies for an interface
    #[error("Interface '{interface}' has no eligible implementation")]
    MissingImplementation { interface: &'static str },

    /// A required service was requested but never registered
    #[error("No service registered for '{service}'{}", .name.as_deref().map(|n| format!(" (name '{n}')")).unwrap_or_default())]
    MissingService {
        service: &'static str,
        name: Option<String>,
    },

    /// Rate limit of the current window exhausted
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(Box<RateLimitExceeded>),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Authorization(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success API response
    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    /// HTTP request failed
    #[error("Request failed: {0}")]
    Request(String),

    /// Response parsing failed
    #[error("Response error: {0}")]
    Response(String),

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OctowireError {
    /// Shorthand for an [`OctowireError::InvalidInput`]
    pub fn invalid_input(parameter: &'static str, message: impl Into<String>) -> Self {
        OctowireError::InvalidInput {
            parameter,
            message: message.into(),
        }
    }

    /// Returns the rate limit failure if this is one
    pub fn as_rate_limit_exceeded(&self) -> Option<&RateLimitExceeded> {
        match self {
            OctowireError::RateLimitExceeded(exceeded) => Some(exceeded.as_ref()),
            _ => None,
        }
    }
}

impl From<RateLimitExceeded> for OctowireError {
    fn from(err: RateLimitExceeded) -> Self {
        OctowireError::RateLimitExceeded(Box::new(err))
    }
}

impl From<reqwest::Error> for OctowireError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OctowireError::Timeout(err.to_string())
        } else if err.is_connect() {
            OctowireError::Request(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            OctowireError::Response(format!("Failed to decode response: {}", err))
        } else {
            OctowireError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for OctowireError {
    fn from(err: serde_json::Error) -> Self {
        OctowireError::Response(format!("JSON parsing error: {}", err))
    }
}

impl From<std::io::Error> for OctowireError {
    fn from(err: std::io::Error) -> Self {
        OctowireError::Config(format!("IO error: {}", err))
    }
}

/// Result type alias for Octowire operations
pub type Result<T> = std::result::Result<T, OctowireError>;

/// Rejects a blank identifier
pub(crate) fn require_non_blank(parameter: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(OctowireError::invalid_input(parameter, "must not be blank"));
    }
    Ok(())
}
