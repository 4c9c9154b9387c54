//! Filesystem and JSON helpers shared by the loader, the project file writer
//! and the plugin directory operations.
pub mod fs;
pub mod json;

pub use fs::{find_files_with_extension, write_atomic};
