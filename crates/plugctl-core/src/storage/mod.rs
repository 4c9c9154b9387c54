//! # plugctl Storage
//!
//! Persistence for everything that is not a plugin directory: the project
//! descriptor's override section, the tool's own settings file and the
//! soft-delete collaborator used when plugins are removed.
pub mod config;
pub mod error;
pub mod project_file;
pub mod trash;

pub use config::{ConfigFormat, Settings};
pub use error::StorageSystemError;
pub use project_file::ProjectFile;
pub use trash::{DirectoryTrash, TrashBin};

#[cfg(test)]
mod tests;
