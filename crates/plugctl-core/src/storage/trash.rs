use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;

use crate::utils::fs::move_dir;

/// Reversible ("soft") deletion of a directory tree.
pub trait TrashBin {
    /// Move `path` out of the way so it can be restored later.
    fn soft_delete(&self, path: &Path) -> io::Result<()>;
}

/// Trash that keeps deleted trees inside a holding directory.
///
/// Each deleted tree lands at `<dir>/<name>`, or `<dir>/<name>.<n>` when an
/// earlier deletion already used that name.
#[derive(Debug, Clone)]
pub struct DirectoryTrash {
    dir: PathBuf,
}

impl DirectoryTrash {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn destination_for(&self, path: &Path) -> io::Result<PathBuf> {
        let name = path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' has no file name", path.display()),
            )
        })?;

        let first = self.dir.join(name);
        if !first.exists() {
            return Ok(first);
        }
        let name = name.to_string_lossy();
        Ok((1u32..)
            .map(|n| self.dir.join(format!("{}.{}", name, n)))
            .find(|candidate| !candidate.exists())
            .unwrap_or(first))
    }
}

impl TrashBin for DirectoryTrash {
    fn soft_delete(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let destination = self.destination_for(path)?;
        move_dir(path, &destination)?;
        info!("Moved {} to trash at {}", path.display(), destination.display());
        Ok(())
    }
}
