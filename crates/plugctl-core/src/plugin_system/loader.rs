use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::engine::{EngineAssociation, EngineLocator};
use crate::kernel::constants;
use crate::kernel::error::{Error, Result};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::{PluginDescriptor, PluginSource, ProjectDescriptor};
use crate::plugin_system::registry::PluginRegistry;
use crate::utils::{find_files_with_extension, json};

// --- Intermediate structs for deserialization ---

fn default_true() -> bool {
    true
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct RawPluginReference {
    #[serde(default)]
    name: String,
    #[serde(default = "default_true")]
    enabled: bool,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct RawProjectDescriptor {
    #[serde(default)]
    engine_association: String,
    #[serde(default)]
    plugins: Vec<RawPluginReference>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct RawPluginDescriptor {
    #[serde(default)]
    version: Option<Value>,
    #[serde(default)]
    version_name: Option<Value>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    created_by: String,
    #[serde(default, rename = "DocsURL")]
    docs_url: String,
    #[serde(default)]
    enabled_by_default: bool,
    #[serde(default)]
    can_contain_content: bool,
    #[serde(default)]
    is_beta_version: bool,
    #[serde(default)]
    modules: Vec<Value>,
    #[serde(default)]
    plugins: Vec<RawPluginReference>,
}

// --- End Intermediate structs ---

fn version_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Builds a registry from a project root and the engine installation it uses.
///
/// The project descriptor must parse; individual plugin descriptors that do
/// not are logged and left out.
pub struct ManifestLoader<'a> {
    locator: &'a dyn EngineLocator,
}

impl<'a> ManifestLoader<'a> {
    pub fn new(locator: &'a dyn EngineLocator) -> Self {
        Self { locator }
    }

    /// Load the project at `root` and scan every plugin tree it can see.
    pub fn load(&self, root: &Path) -> Result<PluginRegistry> {
        let project = self.load_project(root)?;
        let mut registry = PluginRegistry::new(project);

        let project_tree = registry.project().plugins_dir();
        self.scan_tree(&project_tree, PluginSource::Project, &mut registry);

        match registry.project().engine_plugins_dir() {
            Some(engine_tree) => {
                self.scan_tree(&engine_tree, PluginSource::Engine, &mut registry)
            }
            None => info!(
                "No engine installation resolved for '{}'; engine and marketplace plugins are not listed",
                registry.project().engine_association
            ),
        }

        info!(
            "Loaded project '{}' with {} plugin(s)",
            registry.project().name,
            registry.len()
        );
        Ok(registry)
    }

    /// Locate the project descriptor file directly inside `root`.
    ///
    /// When several exist the first in name order is used.
    pub fn find_project_descriptor(root: &Path) -> Result<PathBuf> {
        if !root.is_dir() {
            return Err(PluginSystemError::NoProjectDescriptor {
                root: root.to_path_buf(),
            }
            .into());
        }

        let mut candidates = fs::read_dir(root)
            .map_err(|e| Error::io(e, "read_project_root", root.to_path_buf()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && has_extension(path, constants::PROJECT_DESCRIPTOR_EXTENSION))
            .collect::<Vec<_>>();
        candidates.sort();

        if candidates.len() > 1 {
            warn!(
                "Found {} project descriptors in {}; using {}",
                candidates.len(),
                root.display(),
                candidates[0].display()
            );
        }

        candidates.into_iter().next().ok_or_else(|| {
            PluginSystemError::NoProjectDescriptor {
                root: root.to_path_buf(),
            }
            .into()
        })
    }

    /// Parse the project descriptor and resolve its engine installation.
    pub fn load_project(&self, root: &Path) -> Result<ProjectDescriptor> {
        let descriptor_file = Self::find_project_descriptor(root)?;
        let content = fs::read_to_string(&descriptor_file)
            .map_err(|e| Error::io(e, "read_project_descriptor", descriptor_file.clone()))?;

        let raw: RawProjectDescriptor = json::from_relaxed_str(&content).map_err(|e| {
            PluginSystemError::DescriptorParse {
                path: descriptor_file.clone(),
                message: format!("Failed to parse project descriptor JSON: {}", e),
                source: Some(Box::new(e)),
            }
        })?;

        let name = file_stem(&descriptor_file);
        let mut project = ProjectDescriptor::new(&name, root, descriptor_file.clone());
        project.engine_association = EngineAssociation::parse(&raw.engine_association);

        for reference in raw.plugins.into_iter().filter(|r| !r.name.is_empty()) {
            if reference.enabled {
                project.disabled_plugins.remove(&reference.name);
                project.enabled_plugins.insert(reference.name);
            } else {
                project.enabled_plugins.remove(&reference.name);
                project.disabled_plugins.insert(reference.name);
            }
        }

        project.engine_path = self.locator.resolve(&project.engine_association);
        match &project.engine_path {
            Some(path) => debug!(
                "Engine '{}' resolved to {}",
                project.engine_association,
                path.display()
            ),
            None => debug!("Engine '{}' not resolved", project.engine_association),
        }

        Ok(project)
    }

    /// Parse one plugin descriptor file.
    ///
    /// `source` is the tree the file was found in; callers reclassify
    /// marketplace plugins themselves.
    pub fn load_plugin(path: &Path, source: PluginSource) -> Result<PluginDescriptor> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::io(e, "read_plugin_descriptor", path.to_path_buf()))?;

        let raw: RawPluginDescriptor = json::from_relaxed_str(&content).map_err(|e| {
            PluginSystemError::DescriptorParse {
                path: path.to_path_buf(),
                message: format!("Failed to parse plugin descriptor JSON: {}", e),
                source: Some(Box::new(e)),
            }
        })?;

        let directory = path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
        let mut plugin = PluginDescriptor::new(&file_stem(path), source, directory);
        plugin.version = raw
            .version
            .as_ref()
            .and_then(version_string)
            .or_else(|| raw.version_name.as_ref().and_then(version_string))
            .unwrap_or_default();
        plugin.description = raw.description;
        plugin.category = raw.category;
        plugin.author = raw.created_by;
        plugin.docs_url = raw.docs_url;
        plugin.enabled_by_default = raw.enabled_by_default;
        plugin.can_contain_content = raw.can_contain_content;
        plugin.is_beta_version = raw.is_beta_version;
        plugin.modules = raw.modules;
        plugin.dependencies = raw
            .plugins
            .into_iter()
            .filter(|r| r.enabled && !r.name.is_empty())
            .map(|r| r.name)
            .collect();

        Ok(plugin)
    }

    /// Add every plugin descriptor below `tree` to the registry.
    ///
    /// Anything below a `Marketplace` directory (relative to `tree`) is
    /// registered as a marketplace plugin.
    pub fn scan_tree(&self, tree: &Path, source: PluginSource, registry: &mut PluginRegistry) {
        if !tree.is_dir() {
            debug!("Plugin tree {} does not exist; skipping", tree.display());
            return;
        }

        let files = match find_files_with_extension(tree, constants::PLUGIN_DESCRIPTOR_EXTENSION) {
            Ok(files) => files,
            Err(e) => {
                warn!("Failed to scan plugin tree {}: {}", tree.display(), e);
                return;
            }
        };
        debug!("Found {} plugin descriptor(s) below {}", files.len(), tree.display());

        for file in files {
            let actual_source = if is_below_marketplace(tree, &file) {
                PluginSource::Marketplace
            } else {
                source
            };

            match Self::load_plugin(&file, actual_source) {
                Ok(plugin) => {
                    let key = plugin.key();
                    if !registry.insert(plugin) {
                        warn!(
                            "Skipping {} at {}: a plugin with that name is already registered in this source",
                            key,
                            file.display()
                        );
                    }
                }
                Err(e) => warn!("Skipping plugin descriptor {}: {}", file.display(), e),
            }
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

fn is_below_marketplace(tree: &Path, file: &Path) -> bool {
    let relative = file.strip_prefix(tree).unwrap_or(file);
    relative
        .parent()
        .map(|dir| {
            dir.components().any(|c| {
                matches!(c, Component::Normal(segment) if segment == constants::MARKETPLACE_DIR_NAME)
            })
        })
        .unwrap_or(false)
}
