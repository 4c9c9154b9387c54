//! # plugctl Kernel Errors
//!
//! Defines the crate-wide error type.
//!
//! [`Error`] wraps the typed errors of each subsystem so that every public
//! operation can return a single [`Result`]. Callers that need to react to a
//! particular failure (for example a permission problem while an editor holds
//! a plugin directory open) match on the wrapped subsystem error or use the
//! helper predicates below.
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::plugin_system::error::PluginSystemError;
use crate::storage::error::StorageSystemError;

/// Custom error type for plugctl
#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed plugin system error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Specific, typed storage system error
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// Wrap an I/O error with the operation and path it happened on.
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        Error::StorageSystem(StorageSystemError::io(source, operation, path))
    }

    /// True when the failure is the distinguished permission condition
    /// (the directory is most likely held open by the editor).
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            Error::PluginSystem(PluginSystemError::PermissionDenied { .. })
        )
    }

    /// True when an enable was refused because the name exists in more than one source.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::PluginSystem(PluginSystemError::Conflict { .. }))
    }

    /// Borrow the plugin system error, if that is what this is.
    pub fn as_plugin_error(&self) -> Option<&PluginSystemError> {
        match self {
            Error::PluginSystem(e) => Some(e),
            _ => None,
        }
    }
}
