//! Structural changes to plugin directories: canonical rename, moving
//! between the project and marketplace trees, and deletion.
//!
//! Access errors are reported as `PermissionDenied`; the editor keeping the
//! plugin's files open is the usual cause.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::kernel::error::{Error, Result};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manager::PluginManager;
use crate::plugin_system::manifest::{OverrideState, PluginSource};
use crate::storage::StorageSystemError;
use crate::utils::fs::{clear_readonly_recursive, is_access_error, move_dir};

impl PluginManager {
    /// Rename the plugin's directory to the plugin's name.
    ///
    /// Returns `false` when the directory already has that name.
    pub fn canonical_rename(&mut self, name: &str, source: PluginSource) -> Result<bool> {
        let plugin = self.get_plugin(name, source)?;
        if plugin.has_canonical_directory() {
            debug!("{} already lives in {}", plugin.key(), plugin.directory.display());
            return Ok(false);
        }

        let directory = plugin.directory.clone();
        let parent = directory.parent().unwrap_or_else(|| Path::new(""));
        let target = parent.join(name);
        if target.exists() && !same_entry(&directory, &target) {
            return Err(PluginSystemError::PathCollision { path: target }.into());
        }

        clear_readonly_recursive(&directory)
            .map_err(|e| PluginSystemError::from_io(e, "clear_readonly", directory.clone()))?;
        fs::rename(&directory, &target)
            .map_err(|e| PluginSystemError::from_io(e, "rename_plugin", directory.clone()))?;

        self.registry.relocate(name, source, source, target.clone());
        info!(
            "Renamed {} to {}",
            directory.display(),
            target.display()
        );
        Ok(true)
    }

    /// Move a plugin between the project and marketplace trees.
    ///
    /// The destination is `<tree>/<name>`. Returns the new directory.
    pub fn move_plugin(
        &mut self,
        name: &str,
        from: PluginSource,
        to: PluginSource,
    ) -> Result<PathBuf> {
        self.move_plugin_with(name, from, to, move_dir)
    }

    /// [`PluginManager::move_plugin`] with the directory mover supplied by the caller.
    pub(crate) fn move_plugin_with<M>(
        &mut self,
        name: &str,
        from: PluginSource,
        to: PluginSource,
        mover: M,
    ) -> Result<PathBuf>
    where
        M: Fn(&Path, &Path) -> io::Result<()>,
    {
        if from == to || !from.is_movable() || !to.is_movable() {
            return Err(PluginSystemError::InvalidMove {
                name: name.to_string(),
                from,
                to,
            }
            .into());
        }

        let directory = self.get_plugin(name, from)?.directory.clone();
        let tree = self.tree_for(to)?;
        let destination = tree.join(name);
        if destination.exists() {
            return Err(PluginSystemError::PathCollision { path: destination }.into());
        }
        // the target already registers the name under another directory
        if self.registry.contains(name, to) {
            return Err(PluginSystemError::Conflict {
                name: name.to_string(),
                sources: self.registry.sources_of(name),
            }
            .into());
        }

        fs::create_dir_all(&tree)
            .map_err(|e| PluginSystemError::from_io(e, "create_plugin_tree", tree.clone()))?;
        clear_readonly_recursive(&directory)
            .map_err(|e| PluginSystemError::from_io(e, "clear_readonly", directory.clone()))?;
        mover(&directory, &destination)
            .map_err(|e| PluginSystemError::from_io(e, "move_plugin", directory.clone()))?;

        self.registry.relocate(name, from, to, destination.clone());
        info!(
            "Moved '{}' from {} to {} ({})",
            name,
            from,
            to,
            destination.display()
        );
        Ok(destination)
    }

    /// Delete a plugin directory and clear its override.
    ///
    /// With a trash attached the directory is soft-deleted, otherwise it is
    /// removed permanently.
    pub fn delete_plugin(&mut self, name: &str, source: PluginSource) -> Result<()> {
        let directory = self.get_plugin(name, source)?.directory.clone();

        clear_readonly_recursive(&directory)
            .map_err(|e| PluginSystemError::from_io(e, "clear_readonly", directory.clone()))?;

        match &self.trash {
            Some(trash) => trash.soft_delete(&directory).map_err(|e| {
                if is_access_error(&e) {
                    PluginSystemError::from_io(e, "soft_delete", directory.clone())
                } else {
                    Error::from(StorageSystemError::TrashFailed {
                        path: directory.clone(),
                        message: e.to_string(),
                    })
                }
            })?,
            None => fs::remove_dir_all(&directory)
                .map_err(|e| PluginSystemError::from_io(e, "delete_plugin", directory.clone()))?,
        }

        self.registry.remove(name, source);
        info!("Deleted '{}' ({}) at {}", name, source, directory.display());

        if self.registry.project().override_for(name).is_set() {
            self.project_file().remove_override(name)?;
            self.registry.apply_override(name, OverrideState::Unset);
        }
        Ok(())
    }

    /// Root directory of a movable source's plugin tree
    fn tree_for(&self, source: PluginSource) -> Result<PathBuf> {
        match source {
            PluginSource::Project => Ok(self.project().plugins_dir()),
            _ => self.project().marketplace_dir().ok_or_else(|| {
                PluginSystemError::EngineNotResolved {
                    association: self.project().engine_association.to_string(),
                }
                .into()
            }),
        }
    }
}

/// Whether two existing paths name the same directory entry (case-only renames)
fn same_entry(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
