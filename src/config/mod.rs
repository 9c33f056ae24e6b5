//! Configuration Module
//!
//! Settings for client wiring and the loader that assembles them.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{CredentialSettings, Settings, SettingsOverlay, DEFAULT_CLIENT_NAME};
