//! Connection Module
//!
//! Identity, credentials, serialization and the two connection layers.

pub mod api_connection;
#[allow(clippy::module_inception)]
pub mod connection;
pub mod credentials;
pub mod product;
pub mod serializer;

pub use api_connection::{get_as, ApiConnection, DefaultApiConnection};
pub use connection::{ApiResponse, Connection, HttpConnection, GITHUB_API_URL};
pub use credentials::{AuthenticationType, CredentialStore, Credentials, InMemoryCredentialStore};
pub use product::{PackageInfo, ProductHeaderValue};
pub use serializer::{JsonSerializer, SimpleJsonSerializer};
