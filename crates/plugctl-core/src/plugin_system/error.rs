//! # plugctl Plugin System Errors
//!
//! Defines error types specific to the plugin system.
//!
//! [`PluginSystemError`] covers everything that can go wrong while loading a
//! project, resolving plugin state and mutating plugins on disk: a missing or
//! unreadable project descriptor, same-name conflicts across sources, path
//! collisions during renames and moves, an unresolved engine installation and
//! the distinguished permission condition raised while the editor holds a
//! plugin directory open.
use std::path::PathBuf;

use crate::kernel::error::Error;
use crate::plugin_system::manifest::{PluginKey, PluginSource};

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("No project descriptor (*.uproject) found in '{root}'")]
    NoProjectDescriptor { root: PathBuf },

    #[error("Descriptor parse error for '{path}': {message}")]
    DescriptorParse {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Plugin '{name}' not found in source '{location}'")]
    PluginNotFound { name: String, location: PluginSource },

    #[error("Path already exists: '{path}'")]
    PathCollision { path: PathBuf },

    #[error("Engine installation for association '{association}' could not be resolved")]
    EngineNotResolved { association: String },

    #[error(
        "Permission denied during '{operation}' on '{path}': {source}. \
         Close the editor (it may be holding the plugin open) and retry"
    )]
    PermissionDenied {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Plugin '{name}' is installed in more than one source ({})", join_sources(.sources))]
    Conflict {
        name: String,
        sources: Vec<PluginSource>,
    },

    #[error("Plugin '{name}' cannot be moved from '{from}' to '{to}'")]
    InvalidMove {
        name: String,
        from: PluginSource,
        to: PluginSource,
    },

    #[error(
        "Batch stopped at {failed} after {} applied change(s): {source}",
        .applied.len()
    )]
    BatchIncomplete {
        applied: Vec<PluginKey>,
        failed: PluginKey,
        #[source]
        source: Box<Error>,
    },
}

fn join_sources(sources: &[PluginSource]) -> String {
    sources
        .iter()
        .map(PluginSource::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl PluginSystemError {
    /// Classify a filesystem error raised by a plugin operation.
    ///
    /// Access errors become [`PluginSystemError::PermissionDenied`]; everything
    /// else stays a plain storage I/O error.
    pub fn from_io(source: std::io::Error, operation: &str, path: PathBuf) -> Error {
        if crate::utils::fs::is_access_error(&source) {
            PluginSystemError::PermissionDenied {
                path,
                operation: operation.to_string(),
                source,
            }
            .into()
        } else {
            Error::io(source, operation, path)
        }
    }
}
