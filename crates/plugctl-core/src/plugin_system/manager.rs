use std::path::{Path, PathBuf};

use log::info;

use crate::engine::EngineLocator;
use crate::kernel::error::Result;
use crate::plugin_system::conflict::{ConflictDetector, PluginConflict};
use crate::plugin_system::dependency::StateResolver;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::loader::ManifestLoader;
use crate::plugin_system::manifest::{PluginDescriptor, PluginSource, ProjectDescriptor};
use crate::plugin_system::registry::{PluginFilter, PluginRegistry, PluginStats, SearchField};
use crate::storage::{ProjectFile, TrashBin};
use crate::ui_bridge::{ConfirmationPrompt, DeclineAll};

/// Owner of a loaded project: the registry, the current view over it and
/// the collaborators mutating operations need.
///
/// Queries borrow the registry; the cascade ([`PluginManager::enable`],
/// [`PluginManager::disable`], [`PluginManager::reset_to_default`]) and file
/// operations ([`PluginManager::canonical_rename`],
/// [`PluginManager::move_plugin`], [`PluginManager::delete_plugin`]) write to
/// disk first and update the registry afterwards.
pub struct PluginManager {
    pub(super) root: PathBuf,
    pub(super) locator: Box<dyn EngineLocator>,
    pub(super) prompt: Box<dyn ConfirmationPrompt>,
    pub(super) trash: Option<Box<dyn TrashBin>>,
    pub(super) registry: PluginRegistry,
    pub(super) filter: PluginFilter,
}

impl PluginManager {
    /// Load the project at `root`, resolving its engine through `locator`.
    ///
    /// Cascading changes are declined until a prompt is attached with
    /// [`PluginManager::with_prompt`]; deletions are permanent until a trash
    /// is attached with [`PluginManager::with_trash`].
    pub fn load(root: impl Into<PathBuf>, locator: Box<dyn EngineLocator>) -> Result<Self> {
        let root = root.into();
        let registry = ManifestLoader::new(locator.as_ref()).load(&root)?;
        Ok(Self {
            root,
            locator,
            prompt: Box::new(DeclineAll),
            trash: None,
            registry,
            filter: PluginFilter::default(),
        })
    }

    pub fn with_prompt(mut self, prompt: Box<dyn ConfirmationPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_trash(mut self, trash: Box<dyn TrashBin>) -> Self {
        self.trash = Some(trash);
        self
    }

    /// Re-scan everything, discarding the registry and the current view.
    ///
    /// On failure the previous registry is kept.
    pub fn reload(&mut self) -> Result<()> {
        let registry = ManifestLoader::new(self.locator.as_ref()).load(&self.root)?;
        self.registry = registry;
        self.filter.clear();
        info!("Reloaded project at {}", self.root.display());
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn project(&self) -> &ProjectDescriptor {
        self.registry.project()
    }

    /// Writer for the loaded project's descriptor file
    pub fn project_file(&self) -> ProjectFile {
        ProjectFile::new(self.project().descriptor_file.clone())
    }

    pub fn resolver(&self) -> StateResolver<'_> {
        StateResolver::new(&self.registry)
    }

    pub fn conflict_detector(&self) -> ConflictDetector<'_> {
        ConflictDetector::new(&self.registry)
    }

    /// Look a plugin up, failing with `PluginNotFound`.
    pub fn get_plugin(&self, name: &str, source: PluginSource) -> Result<&PluginDescriptor> {
        self.registry.get(name, source).ok_or_else(|| {
            PluginSystemError::PluginNotFound {
                name: name.to_string(),
                location: source,
            }
            .into()
        })
    }

    /// First source holding `name`, in lookup order
    pub fn first_source_of(&self, name: &str) -> Option<PluginSource> {
        self.registry.find(name).map(|p| p.source)
    }

    /// Plugins of `source` (all sources with `None`) passing the current view
    pub fn get_plugins(&self, source: Option<PluginSource>) -> Vec<&PluginDescriptor> {
        self.filter.apply(&self.registry, source)
    }

    /// Set the search keyword for the view; an empty keyword clears it.
    pub fn search(&mut self, keyword: &str, field: SearchField) {
        self.filter.search(keyword, field);
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.filter.set_category(category);
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
    }

    pub fn categories(&self, source: Option<PluginSource>) -> Vec<String> {
        self.registry.categories(source)
    }

    pub fn stats(&self) -> PluginStats {
        self.registry.stats()
    }

    /// Effective state; `false` for unknown plugins.
    pub fn is_enabled(&self, name: &str, source: PluginSource) -> bool {
        self.resolver().is_enabled(name, source)
    }

    pub fn has_conflict(&self, name: &str) -> bool {
        self.conflict_detector().has_conflict(name)
    }

    pub fn conflicts(&self) -> Vec<PluginConflict> {
        self.conflict_detector().conflicts()
    }
}
