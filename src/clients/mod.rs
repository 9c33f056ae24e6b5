//! Clients Module
//!
//! The capability-interface hierarchy rooted at [`GitHubClient`], and the
//! statically declared graph the resolver walks to register it.

pub mod github;
pub mod miscellaneous;
pub mod models;
pub mod repositories;
pub mod users;

pub use github::{GitHub, GitHubClient};
pub use miscellaneous::{MiscellaneousApi, MiscellaneousClient};
pub use models::{
    ContentType, EmailAddress, Meta, MiscellaneousRateLimit, RateLimit, Repository,
    RepositoryContent, ResourceRateLimit, User,
};
pub use repositories::{
    RepositoriesApi, RepositoriesClient, RepositoryContentsApi, RepositoryContentsClient,
};
pub use users::{UserEmailsApi, UserEmailsClient, UsersApi, UsersClient};

use crate::connection::Connection;
use crate::graph::{
    ClientUniverse, ImplementationLibrary, ImplementationType, InterfaceCatalog,
    InterfaceDescriptor,
};
use crate::interface_id;

/// Every interface of the hierarchy with the properties it exposes
pub fn github_catalog() -> InterfaceCatalog {
    InterfaceCatalog::new()
        .with(
            InterfaceDescriptor::new(interface_id!(GitHubClient))
                .property("connection", interface_id!(Connection))
                .property("miscellaneous", interface_id!(MiscellaneousClient))
                .property("user", interface_id!(UsersClient))
                .property("repository", interface_id!(RepositoriesClient)),
        )
        .with(InterfaceDescriptor::new(interface_id!(MiscellaneousClient)))
        .with(
            InterfaceDescriptor::new(interface_id!(UsersClient))
                .property("email", interface_id!(UserEmailsClient)),
        )
        .with(InterfaceDescriptor::new(interface_id!(UserEmailsClient)))
        .with(
            InterfaceDescriptor::new(interface_id!(RepositoriesClient))
                .property("content", interface_id!(RepositoryContentsClient)),
        )
        .with(InterfaceDescriptor::new(interface_id!(RepositoryContentsClient)))
}

pub fn github_library() -> ImplementationLibrary {
    ImplementationLibrary::new()
        .with(
            ImplementationType::new("GitHub")
                .implements(interface_id!(GitHubClient))
                .connection_constructor(GitHub::construct),
        )
        .with(
            ImplementationType::new("MiscellaneousApi")
                .implements(interface_id!(MiscellaneousClient))
                .api_connection_constructor(MiscellaneousApi::construct),
        )
        .with(
            ImplementationType::new("UsersApi")
                .implements(interface_id!(UsersClient))
                .api_connection_constructor(UsersApi::construct),
        )
        .with(
            ImplementationType::new("UserEmailsApi")
                .implements(interface_id!(UserEmailsClient))
                .api_connection_constructor(UserEmailsApi::construct),
        )
        .with(
            ImplementationType::new("RepositoriesApi")
                .implements(interface_id!(RepositoriesClient))
                .api_connection_constructor(RepositoriesApi::construct),
        )
        .with(
            ImplementationType::new("RepositoryContentsApi")
                .implements(interface_id!(RepositoryContentsClient))
                .api_connection_constructor(RepositoryContentsApi::construct),
        )
}

impl ClientUniverse {
    /// The GitHub hierarchy rooted at [`GitHubClient`]
    pub fn github() -> Self {
        Self::new(interface_id!(GitHubClient), github_catalog(), github_library())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ResolutionMode;

    #[test]
    fn test_github_hierarchy_resolves_strictly() {
        let graph = ClientUniverse::github().resolve(ResolutionMode::Strict).unwrap();

        assert_eq!(graph.len(), 6);
        assert!(graph.unbound().is_empty());
        assert_eq!(graph.visited()[0], interface_id!(GitHubClient));
        assert!(!graph.visited().contains(&interface_id!(Connection)));
    }

    #[test]
    fn test_root_binds_through_connection() {
        let graph = ClientUniverse::github().resolve(ResolutionMode::Strict).unwrap();

        let root = graph.binding(&interface_id!(GitHubClient)).unwrap();
        assert_eq!(root.implementation, "GitHub");
        assert_eq!(root.constructor.parameter(), "Connection");

        let contents = graph.binding(&interface_id!(RepositoryContentsClient)).unwrap();
        assert_eq!(contents.constructor.parameter(), "ApiConnection");
    }
}
