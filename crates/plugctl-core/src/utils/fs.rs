use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::NamedTempFile;

/// Find files recursively in a directory that match a predicate.
///
/// Entries are visited in sorted order so repeated scans report files in the
/// same order.
pub fn find_files<P, F>(path: P, predicate: &F) -> io::Result<Vec<PathBuf>>
where
    P: AsRef<Path>,
    F: Fn(&Path) -> bool + ?Sized,
{
    let mut result = Vec::new();

    if !path.as_ref().exists() {
        return Ok(result);
    }

    if path.as_ref().is_file() {
        if predicate(path.as_ref()) {
            result.push(path.as_ref().to_path_buf());
        }
        return Ok(result);
    }

    let mut entries = fs::read_dir(path)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    entries.sort();

    for entry_path in entries {
        if entry_path.is_file() {
            if predicate(&entry_path) {
                result.push(entry_path);
            }
        } else if entry_path.is_dir() {
            let mut sub_results = find_files(&entry_path, predicate)?;
            result.append(&mut sub_results);
        }
    }

    Ok(result)
}

/// Find files with a specific extension (case-insensitive)
pub fn find_files_with_extension<P: AsRef<Path>>(path: P, extension: &str) -> io::Result<Vec<PathBuf>> {
    let extension_lower = extension.to_lowercase();
    find_files(path, &move |p| match p.extension() {
        Some(ext) => ext.to_string_lossy().to_lowercase() == extension_lower,
        None => false,
    })
}

/// True for the error kinds an editor produces while it holds files open
pub fn is_access_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::ResourceBusy
    )
}

/// Make every file and directory below `path` (inclusive) writable.
pub fn clear_readonly_recursive(path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.file_type().is_symlink() {
        return Ok(());
    }
    make_writable(path, &metadata)?;

    if metadata.is_dir() {
        for entry in fs::read_dir(path)? {
            clear_readonly_recursive(&entry?.path())?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn make_writable(path: &Path, metadata: &fs::Metadata) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = metadata.permissions();
    let mode = permissions.mode();
    if mode & 0o200 == 0 {
        permissions.set_mode(mode | 0o200);
        fs::set_permissions(path, permissions)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn make_writable(path: &Path, metadata: &fs::Metadata) -> io::Result<()> {
    let mut permissions = metadata.permissions();
    if permissions.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
        fs::set_permissions(path, permissions)?;
    }
    Ok(())
}

/// Copy a directory tree. `to` must not exist yet.
pub fn copy_dir_recursive(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let src = entry.path();
        let dst = to.join(entry.file_name());
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            copy_dir_recursive(&src, &dst)?;
        } else {
            fs::copy(&src, &dst)?;
        }
    }
    Ok(())
}

/// Move a directory tree to `to`.
///
/// A plain rename is tried first. When that fails for any reason other than
/// access (typically because the two paths are on different volumes) the
/// tree is copied and the source removed. A failed copy removes whatever
/// reached the destination before the error is returned.
///
/// Once the copy is complete the move counts as done: if the source cannot
/// be removed afterwards the leftovers are logged and `Ok` is returned, so
/// callers record the plugin at `to`.
pub fn move_dir(from: &Path, to: &Path) -> io::Result<()> {
    move_dir_with(from, to, |a, b| fs::rename(a, b), |p| fs::remove_dir_all(p))
}

/// [`move_dir`] with the rename and source-removal steps supplied by the caller.
pub(crate) fn move_dir_with<R, D>(from: &Path, to: &Path, rename: R, remove_source: D) -> io::Result<()>
where
    R: Fn(&Path, &Path) -> io::Result<()>,
    D: Fn(&Path) -> io::Result<()>,
{
    match rename(from, to) {
        Ok(()) => return Ok(()),
        Err(e) if is_access_error(&e) => return Err(e),
        Err(e) => debug!(
            "Rename {} -> {} failed ({}); copying instead",
            from.display(),
            to.display(),
            e
        ),
    }

    if let Err(e) = copy_dir_recursive(from, to) {
        if to.exists() {
            if let Err(cleanup) = fs::remove_dir_all(to) {
                warn!(
                    "Could not remove partially copied directory {}: {}",
                    to.display(),
                    cleanup
                );
            }
        }
        return Err(e);
    }

    if let Err(e) = remove_source(from) {
        warn!(
            "Copied {} to {} but could not remove the source ({}); delete the leftovers by hand",
            from.display(),
            to.display(),
            e
        );
    }
    Ok(())
}

/// Replace `path` with `contents` through a temporary file in the same directory.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp_file = NamedTempFile::new_in(parent)?;
    temp_file.write_all(contents)?;
    temp_file.as_file().sync_all()?;
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
