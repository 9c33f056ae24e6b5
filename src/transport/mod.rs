//! Transport Module
//!
//! HTTP primitive and rate-limit metadata parsing.

pub mod http;
pub mod rate_limit;

pub use http::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use rate_limit::{is_rate_limit_error, ApiInfo, RateWindowState};
