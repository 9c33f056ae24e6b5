//! Settings
//!
//! Typed configuration for the GitHub client wiring.

use crate::connection::{AuthenticationType, Credentials, GITHUB_API_URL};
use crate::graph::ResolutionMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default transport discriminator name
pub const DEFAULT_CLIENT_NAME: &str = "octokit";

/// Resolved settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Name the transport primitive is registered under
    pub client_name: Option<String>,

    /// API base address
    pub base_url: String,

    pub resolution_mode: ResolutionMode,

    /// Request timeout in seconds; absent means requests never time out
    pub request_timeout_secs: Option<u64>,

    pub credentials: CredentialSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            client_name: Some(DEFAULT_CLIENT_NAME.to_string()),
            base_url: GITHUB_API_URL.to_string(),
            resolution_mode: ResolutionMode::default(),
            request_timeout_secs: None,
            credentials: CredentialSettings::default(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Overlay every field present in `other`
    pub fn merge(&mut self, other: SettingsOverlay) {
        if let Some(name) = other.client_name {
            self.client_name = Some(name);
        }
        if let Some(base_url) = other.base_url {
            self.base_url = base_url;
        }
        if let Some(mode) = other.resolution_mode {
            self.resolution_mode = mode;
        }
        if let Some(timeout) = other.request_timeout_secs {
            self.request_timeout_secs = Some(timeout);
        }
        if let Some(credentials) = other.credentials {
            self.credentials.merge(credentials);
        }
    }
}

/// A configuration file; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingsOverlay {
    pub client_name: Option<String>,
    pub base_url: Option<String>,
    pub resolution_mode: Option<ResolutionMode>,
    pub request_timeout_secs: Option<u64>,
    pub credentials: Option<CredentialSettings>,
}

/// Raw credential fields as they appear in configuration
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSettings {
    pub login: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    pub authentication_type: Option<AuthenticationType>,
}

impl std::fmt::Debug for CredentialSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSettings")
            .field("login", &self.login)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("token", &self.token.as_ref().map(|_| "****"))
            .field("authentication_type", &self.authentication_type)
            .finish()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl CredentialSettings {
    pub fn merge(&mut self, other: CredentialSettings) {
        if other.login.is_some() {
            self.login = other.login;
        }
        if other.password.is_some() {
            self.password = other.password;
        }
        if other.token.is_some() {
            self.token = other.token;
        }
        if other.authentication_type.is_some() {
            self.authentication_type = other.authentication_type;
        }
    }

    /// Turn the raw fields into credentials.
    ///
    /// An explicit anonymous type always wins. A login requires a password,
    /// and a login without one yields anonymous credentials rather than
    /// falling back to the token.
    pub fn to_credentials(&self) -> Credentials {
        if self.authentication_type == Some(AuthenticationType::Anonymous) {
            return Credentials::Anonymous;
        }

        if let Some(login) = non_empty(&self.login) {
            return match non_empty(&self.password) {
                Some(password) => Credentials::basic(login, password),
                None => Credentials::Anonymous,
            };
        }

        match non_empty(&self.token) {
            Some(token) => Credentials::Token {
                token: token.to_string(),
                kind: match self.authentication_type {
                    Some(AuthenticationType::Bearer) => AuthenticationType::Bearer,
                    _ => AuthenticationType::Oauth,
                },
            },
            None => Credentials::Anonymous,
        }
    }
}
