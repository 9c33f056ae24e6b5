//! Rate Limit Metadata
//!
//! Extracts rate window state and other API metadata from response headers.

use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::HeaderMap;
use serde::Serialize;

pub const LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RESET_HEADER: &str = "x-ratelimit-reset";

const ETAG_HEADER: &str = "etag";
const OAUTH_SCOPES_HEADER: &str = "x-oauth-scopes";
const ACCEPTED_OAUTH_SCOPES_HEADER: &str = "x-accepted-oauth-scopes";

/// Snapshot of the server enforced call quota
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateWindowState {
    /// Total number of calls allowed in the window
    pub limit: u32,

    /// Calls left in the current window
    pub remaining: u32,

    /// When the next window opens
    pub reset: DateTime<Utc>,
}

impl RateWindowState {
    /// Read limit, remaining and reset from response headers.
    ///
    /// Returns `None` unless all three headers are present and well formed.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let limit = parse_header::<u32>(headers, LIMIT_HEADER)?;
        let remaining = parse_header::<u32>(headers, REMAINING_HEADER)?;
        let reset_epoch = parse_header::<i64>(headers, RESET_HEADER)?;
        let reset = Utc.timestamp_opt(reset_epoch, 0).single()?;

        Some(Self {
            limit,
            remaining,
            reset,
        })
    }

    /// Whether the window has no calls left
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// Metadata observed on the most recent API response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApiInfo {
    /// Rate window state, if the response carried it
    pub rate_limit: Option<RateWindowState>,

    /// Entity tag of the returned resource
    pub etag: Option<String>,

    /// Scopes granted to the token in use
    pub oauth_scopes: Vec<String>,

    /// Scopes the endpoint accepts
    pub accepted_oauth_scopes: Vec<String>,
}

impl ApiInfo {
    /// Collect all known metadata headers
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            rate_limit: RateWindowState::from_headers(headers),
            etag: header_str(headers, ETAG_HEADER).map(str::to_string),
            oauth_scopes: split_scopes(header_str(headers, OAUTH_SCOPES_HEADER)),
            accepted_oauth_scopes: split_scopes(header_str(headers, ACCEPTED_OAUTH_SCOPES_HEADER)),
        }
    }
}

/// Detect if a response reports an exhausted primary window.
///
/// Secondary limits answer 403 with calls still left in the window, so they
/// are not treated as an exceeded rate limit.
pub fn is_rate_limit_error(status: u16, remaining: u32) -> bool {
    matches!(status, 403 | 429) && remaining == 0
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn parse_header<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    header_str(headers, name).and_then(|s| s.trim().parse::<T>().ok())
}

fn split_scopes(value: Option<&str>) -> Vec<String> {
    value
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|scope| !scope.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_map(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, value.parse().unwrap());
        }
        headers
    }

    #[test]
    fn test_rate_window_from_headers() {
        let headers = header_map(&[
            (LIMIT_HEADER, "5000"),
            (REMAINING_HEADER, "4999"),
            (RESET_HEADER, "1700000000"),
        ]);

        let state = RateWindowState::from_headers(&headers).unwrap();
        assert_eq!(state.limit, 5000);
        assert_eq!(state.remaining, 4999);
        assert_eq!(state.reset.timestamp(), 1_700_000_000);
        assert!(!state.is_exhausted());
    }

    #[test]
    fn test_rate_window_requires_all_headers() {
        let headers = header_map(&[(LIMIT_HEADER, "60"), (REMAINING_HEADER, "0")]);
        assert!(RateWindowState::from_headers(&headers).is_none());

        let garbled = header_map(&[
            (LIMIT_HEADER, "sixty"),
            (REMAINING_HEADER, "0"),
            (RESET_HEADER, "1700000000"),
        ]);
        assert!(RateWindowState::from_headers(&garbled).is_none());
    }

    #[test]
    fn test_api_info_scopes_and_etag() {
        let headers = header_map(&[
            (ETAG_HEADER, "W/\"abc\""),
            (OAUTH_SCOPES_HEADER, "repo, user"),
            (ACCEPTED_OAUTH_SCOPES_HEADER, ""),
        ]);

        let info = ApiInfo::from_headers(&headers);
        assert_eq!(info.etag.as_deref(), Some("W/\"abc\""));
        assert_eq!(info.oauth_scopes, vec!["repo", "user"]);
        assert!(info.accepted_oauth_scopes.is_empty());
        assert!(info.rate_limit.is_none());
    }

    #[test]
    fn test_is_rate_limit_error() {
        assert!(is_rate_limit_error(403, 0));
        assert!(is_rate_limit_error(429, 0));
        assert!(!is_rate_limit_error(403, 4000));
        assert!(!is_rate_limit_error(429, 12));
        assert!(!is_rate_limit_error(500, 0));
        assert!(!is_rate_limit_error(200, 0));
    }
}
