//! Registration Module
//!
//! Service collection, provider and the GitHub service builder.

pub mod builder;
pub mod provider;
pub mod services;

pub use builder::GitHubServiceBuilder;
pub use provider::ServiceProvider;
pub use services::{
    ServiceCollection, ServiceDescriptor, ServiceFactory, ServiceKey, ServiceLifetime,
};
