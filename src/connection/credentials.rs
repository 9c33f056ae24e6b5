//! Credentials
//!
//! Identities used to authenticate outbound requests.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a set of credentials authenticates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationType {
    #[default]
    Anonymous,
    Basic,
    Oauth,
    Bearer,
}

/// An identity, or the lack of one
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Credentials {
    #[default]
    Anonymous,

    /// Token credentials sent as `token` (OAuth) or `Bearer`
    Token {
        token: String,
        kind: AuthenticationType,
    },

    /// Login and password sent as HTTP basic auth
    Basic { login: String, password: String },
}

impl Credentials {
    /// OAuth token credentials
    pub fn token(token: impl Into<String>) -> Self {
        Credentials::Token {
            token: token.into(),
            kind: AuthenticationType::Oauth,
        }
    }

    /// Basic credentials
    pub fn basic(login: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Basic {
            login: login.into(),
            password: password.into(),
        }
    }

    pub fn authentication_type(&self) -> AuthenticationType {
        match self {
            Credentials::Anonymous => AuthenticationType::Anonymous,
            Credentials::Token { kind, .. } => *kind,
            Credentials::Basic { .. } => AuthenticationType::Basic,
        }
    }

    /// Login name, when known
    pub fn login(&self) -> Option<&str> {
        match self {
            Credentials::Basic { login, .. } => Some(login),
            _ => None,
        }
    }

    /// Value for the `Authorization` header, `None` when anonymous
    pub fn authorization_header(&self) -> Option<String> {
        match self {
            Credentials::Anonymous => None,
            Credentials::Token {
                token,
                kind: AuthenticationType::Bearer,
            } => Some(format!("Bearer {}", token)),
            Credentials::Token { token, .. } => Some(format!("token {}", token)),
            Credentials::Basic { login, password } => Some(format!(
                "Basic {}",
                STANDARD.encode(format!("{}:{}", login, password))
            )),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Anonymous => write!(f, "Anonymous"),
            Credentials::Token { kind, .. } => write!(f, "Token({:?}, ****)", kind),
            Credentials::Basic { login, .. } => write!(f, "Basic({}, ****)", login),
        }
    }
}

/// Source of credentials for a connection
pub trait CredentialStore: Send + Sync {
    fn get_credentials(&self) -> Credentials;
}

/// Credential store holding a fixed identity
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    credentials: Credentials,
}

impl InMemoryCredentialStore {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn get_credentials(&self) -> Credentials {
        self.credentials.clone()
    }
}
