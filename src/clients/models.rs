//! Response models
//!
//! Only the fields the clients need; unknown fields are ignored.

use crate::error::{OctowireError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Public service metadata from `GET /meta`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    pub verifiable_password_authentication: bool,
    pub hooks: Vec<String>,
    pub git: Vec<String>,
    pub pages: Vec<String>,
    pub importer: Vec<String>,
    pub actions: Vec<String>,
}

/// One rate window as reported by `GET /rate_limit`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub limit: u32,
    pub remaining: u32,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub reset: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRateLimit {
    pub core: RateLimit,
    pub search: RateLimit,
    #[serde(default)]
    pub graphql: Option<RateLimit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiscellaneousRateLimit {
    pub resources: ResourceRateLimit,

    /// Mirror of `resources.core`
    pub rate: RateLimit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub public_repos: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub email: String,
    pub verified: bool,
    pub primary: bool,
    #[serde(default)]
    pub visibility: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: User,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Kind of an entry in a repository tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    File,
    Dir,
    Symlink,
    Submodule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryContent {
    pub name: String,
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    #[serde(default)]
    pub download_url: Option<String>,

    /// Present only when a single file was requested
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

impl RepositoryContent {
    /// Decoded file body; `None` for directories and listings
    pub fn decoded_content(&self) -> Result<Option<Vec<u8>>> {
        let Some(content) = &self.content else {
            return Ok(None);
        };

        match self.encoding.as_deref() {
            Some("base64") => {
                // The API wraps base64 payloads at 60 columns
                let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
                STANDARD.decode(compact).map(Some).map_err(|e| {
                    OctowireError::Response(format!("Invalid base64 content for '{}': {}", self.path, e))
                })
            }
            _ => Ok(Some(content.clone().into_bytes())),
        }
    }
}

/// Contents endpoints answer with an object for a file and an array for a directory
pub(crate) fn contents_from_value(value: Value) -> Result<Vec<RepositoryContent>> {
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        single => Ok(vec![serde_json::from_value(single)?]),
    }
}
