//! Logging
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` overrides the default directive.

use crate::error::{OctowireError, Result};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_DIRECTIVE: &str = "info";

/// Install a registry with an env filter and a fmt layer.
///
/// Fails instead of panicking when a global subscriber already exists.
pub fn init(default_directive: &str) -> Result<()> {
    let directive: Directive = default_directive.parse().map_err(|e| {
        OctowireError::Config(format!("Invalid log directive '{}': {}", default_directive, e))
    })?;

    let filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| OctowireError::Config(format!("Logging already initialised: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        init("octowire=debug").unwrap();
        let err = init(DEFAULT_DIRECTIVE).unwrap_err();
        assert!(matches!(err, OctowireError::Config(_)));
    }
}
