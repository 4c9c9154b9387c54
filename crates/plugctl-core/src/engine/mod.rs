//! # plugctl Engine Lookup
//!
//! A project names its engine through the `EngineAssociation` field of the
//! project descriptor. That string is either a dotted version for launcher
//! installs or an opaque build identifier for source builds.
//! [`EngineAssociation`] classifies it and [`EngineLocator`] turns it into an
//! installation directory. The engine tree is scanned only when a directory
//! is found.
pub mod locator;
pub mod version;

use std::fmt;

pub use locator::{EngineLocator, FixedEngineLocator, SettingsEngineLocator};
pub use version::{EngineVersion, VersionError};

/// Parsed `EngineAssociation` value of a project descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EngineAssociation {
    /// Field missing or empty
    #[default]
    Unspecified,
    /// Launcher install, e.g. `5.3`
    Version(EngineVersion),
    /// Source build identifier, e.g. a GUID registered by the engine's build tooling
    Build(String),
}

impl EngineAssociation {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return EngineAssociation::Unspecified;
        }
        match EngineVersion::parse(trimmed) {
            Ok(version) => EngineAssociation::Version(version),
            Err(_) => EngineAssociation::Build(trimmed.to_string()),
        }
    }

    /// The association as written in the descriptor
    pub fn as_str(&self) -> &str {
        match self {
            EngineAssociation::Unspecified => "",
            EngineAssociation::Version(v) => v.as_str(),
            EngineAssociation::Build(id) => id,
        }
    }
}

impl fmt::Display for EngineAssociation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineAssociation::Unspecified => f.write_str("<unspecified>"),
            other => f.write_str(other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests;
