//! Product identification
//!
//! The `User-Agent` identity every request must carry.

use crate::error::{require_non_blank, Result};
use std::fmt;

/// Name and version of the calling product
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductHeaderValue {
    name: String,
    version: String,
}

impl ProductHeaderValue {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let version = version.into();
        require_non_blank("name", &name)?;
        require_non_blank("version", &version)?;
        Ok(Self { name, version })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for ProductHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

/// Declared metadata of a compiled package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub name: &'static str,
    pub version: &'static str,

    /// Free form version string (e.g. `1.2.0+9f1c2ab`), preferred over `version`
    pub informational_version: Option<&'static str>,
}

impl PackageInfo {
    pub const fn new(name: &'static str, version: &'static str) -> Self {
        Self {
            name,
            version,
            informational_version: None,
        }
    }

    pub const fn with_informational_version(mut self, version: &'static str) -> Self {
        self.informational_version = Some(version);
        self
    }

    /// Build the product header from the informational version if present
    pub fn product_header(&self) -> Result<ProductHeaderValue> {
        ProductHeaderValue::new(
            self.name,
            self.informational_version.unwrap_or(self.version),
        )
    }
}

/// Captures the calling crate's Cargo name and version.
///
/// `OCTOWIRE_INFORMATIONAL_VERSION`, when set at compile time, becomes the
/// informational version.
#[macro_export]
macro_rules! package_info {
    () => {{
        let info = $crate::connection::PackageInfo::new(
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
        );
        match option_env!("OCTOWIRE_INFORMATIONAL_VERSION") {
            Some(version) => info.with_informational_version(version),
            None => info,
        }
    }};
}
