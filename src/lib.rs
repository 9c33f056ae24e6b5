//! Octowire - dependency-injected GitHub client wiring
//!
//! Discovers the GitHub client hierarchy from a statically declared interface
//! graph, registers every client with a service collection, and ships a
//! rate-window drain loop built on top of it.

pub mod clients;
pub mod config;
pub mod connection;
pub mod drain;
pub mod error;
pub mod graph;
pub mod logging;
pub mod registration;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use clients::{
    GitHub, GitHubClient, MiscellaneousClient, RepositoriesClient, RepositoryContentsClient,
    UserEmailsClient, UsersClient,
};
pub use config::{ConfigLoader, CredentialSettings, Settings};
pub use connection::{
    ApiConnection, Connection, CredentialStore, Credentials, InMemoryCredentialStore, PackageInfo,
    ProductHeaderValue,
};
pub use drain::{CancellationToken, DrainLoopOutcome, MetadataProbe, RateLimitDrain};
pub use error::{OctowireError, Result};
pub use graph::{ClientUniverse, ResolutionGraph, ResolutionMode};
pub use registration::{GitHubServiceBuilder, ServiceCollection, ServiceProvider};
pub use transport::{ApiInfo, RateWindowState};
