use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::EngineAssociation;
use crate::kernel::constants;

/// Directory tree a plugin was discovered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PluginSource {
    /// `<project>/Plugins`
    Project,
    /// `<engine>/Engine/Plugins`, outside the marketplace folder
    Engine,
    /// Anything below a `Marketplace` path segment
    Marketplace,
}

impl PluginSource {
    /// All sources in lookup order. Dependency resolution takes the first match in this order.
    pub const ALL: [PluginSource; 3] = [
        PluginSource::Project,
        PluginSource::Engine,
        PluginSource::Marketplace,
    ];

    /// Lower-case label used on the command line and in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginSource::Project => "project",
            PluginSource::Engine => "engine",
            PluginSource::Marketplace => "marketplace",
        }
    }

    /// Whether plugins of this source may be moved between trees
    pub fn is_movable(&self) -> bool {
        matches!(self, PluginSource::Project | PluginSource::Marketplace)
    }
}

impl fmt::Display for PluginSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluginSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "project" => Ok(PluginSource::Project),
            "engine" => Ok(PluginSource::Engine),
            "marketplace" | "fab" => Ok(PluginSource::Marketplace),
            other => Err(format!(
                "unknown plugin source '{}' (expected project, engine or marketplace)",
                other
            )),
        }
    }
}

/// Explicit per-project override of a plugin's default state.
///
/// Kept as three variants so that "no override" can never be mistaken for "disabled".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverrideState {
    Enabled,
    Disabled,
    #[default]
    Unset,
}

impl OverrideState {
    /// Override matching an explicit boolean
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            OverrideState::Enabled
        } else {
            OverrideState::Disabled
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, OverrideState::Unset)
    }
}

/// Composite identity of a plugin: names are only unique within a source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginKey {
    pub name: String,
    pub source: PluginSource,
}

impl PluginKey {
    pub fn new(name: impl Into<String>, source: PluginSource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }
}

impl fmt::Display for PluginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.source)
    }
}

/// One discovered plugin descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct PluginDescriptor {
    /// Logical plugin name (the descriptor file stem)
    pub name: String,

    /// Tree the plugin was discovered in
    pub source: PluginSource,

    /// Directory holding the descriptor file
    pub directory: PathBuf,

    pub version: String,
    pub description: String,
    pub category: String,
    pub author: String,
    pub docs_url: String,

    pub enabled_by_default: bool,
    pub can_contain_content: bool,
    pub is_beta_version: bool,

    /// Module declarations, passed through untouched
    pub modules: Vec<serde_json::Value>,

    /// Names of required plugins, in declaration order
    pub dependencies: Vec<String>,

    /// Override taken from the project descriptor
    pub explicit_override: OverrideState,
}

impl PluginDescriptor {
    /// Create a descriptor with empty metadata
    pub fn new(name: &str, source: PluginSource, directory: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            source,
            directory: directory.into(),
            version: String::new(),
            description: String::new(),
            category: String::new(),
            author: String::new(),
            docs_url: String::new(),
            enabled_by_default: false,
            can_contain_content: false,
            is_beta_version: false,
            modules: Vec::new(),
            dependencies: Vec::new(),
            explicit_override: OverrideState::Unset,
        }
    }

    pub fn key(&self) -> PluginKey {
        PluginKey::new(self.name.clone(), self.source)
    }

    /// Effective state: the explicit override when set, otherwise the default.
    pub fn is_enabled(&self) -> bool {
        match self.explicit_override {
            OverrideState::Enabled => true,
            OverrideState::Disabled => false,
            OverrideState::Unset => self.enabled_by_default,
        }
    }

    /// Whether the directory name already equals the logical name
    pub fn has_canonical_directory(&self) -> bool {
        self.directory
            .file_name()
            .map(|n| n == self.name.as_str())
            .unwrap_or(false)
    }

    /// Path of the descriptor file inside the plugin directory
    pub fn descriptor_path(&self) -> PathBuf {
        self.directory.join(format!(
            "{}.{}",
            self.name,
            constants::PLUGIN_DESCRIPTOR_EXTENSION
        ))
    }

    /// Whether `name` appears among the declared dependencies
    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d == name)
    }
}

/// The project descriptor and the override sets it declares
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDescriptor {
    /// Project name (the descriptor file stem)
    pub name: String,

    /// Directory holding the project descriptor
    pub root: PathBuf,

    /// Path of the project descriptor file itself
    pub descriptor_file: PathBuf,

    pub engine_association: EngineAssociation,

    /// Engine directory reported by the engine locator, if any
    pub engine_path: Option<PathBuf>,

    pub enabled_plugins: BTreeSet<String>,
    pub disabled_plugins: BTreeSet<String>,
}

impl ProjectDescriptor {
    pub fn new(name: &str, root: impl Into<PathBuf>, descriptor_file: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            root: root.into(),
            descriptor_file: descriptor_file.into(),
            engine_association: EngineAssociation::Unspecified,
            engine_path: None,
            enabled_plugins: BTreeSet::new(),
            disabled_plugins: BTreeSet::new(),
        }
    }

    /// Override the project declares for `name`
    pub fn override_for(&self, name: &str) -> OverrideState {
        if self.enabled_plugins.contains(name) {
            OverrideState::Enabled
        } else if self.disabled_plugins.contains(name) {
            OverrideState::Disabled
        } else {
            OverrideState::Unset
        }
    }

    /// Record an override, keeping the two sets disjoint.
    pub fn set_override(&mut self, name: &str, state: OverrideState) {
        self.enabled_plugins.remove(name);
        self.disabled_plugins.remove(name);
        match state {
            OverrideState::Enabled => {
                self.enabled_plugins.insert(name.to_string());
            }
            OverrideState::Disabled => {
                self.disabled_plugins.insert(name.to_string());
            }
            OverrideState::Unset => {}
        }
    }

    /// `<root>/Plugins`
    pub fn plugins_dir(&self) -> PathBuf {
        self.root.join(constants::PROJECT_PLUGINS_DIR)
    }

    /// `<engine>/Engine/Plugins`, when the engine is known
    pub fn engine_plugins_dir(&self) -> Option<PathBuf> {
        self.engine_path.as_deref().map(engine_plugins_dir)
    }

    /// `<engine>/Engine/Plugins/Marketplace`, when the engine is known
    pub fn marketplace_dir(&self) -> Option<PathBuf> {
        self.engine_plugins_dir()
            .map(|dir| dir.join(constants::MARKETPLACE_DIR_NAME))
    }
}

/// `<engine>/Engine/Plugins` for a given installation directory
pub fn engine_plugins_dir(engine_path: &Path) -> PathBuf {
    constants::ENGINE_PLUGINS_DIR
        .iter()
        .fold(engine_path.to_path_buf(), |acc, segment| acc.join(segment))
}

/// Builder for plugin descriptors, mostly used to seed registries
pub struct DescriptorBuilder {
    descriptor: PluginDescriptor,
}

impl DescriptorBuilder {
    /// Start a descriptor whose directory is `<parent>/<name>`
    pub fn new(name: &str, source: PluginSource, parent: &Path) -> Self {
        Self {
            descriptor: PluginDescriptor::new(name, source, parent.join(name)),
        }
    }

    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.descriptor.directory = directory.into();
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.descriptor.category = category.to_string();
        self
    }

    pub fn author(mut self, author: &str) -> Self {
        self.descriptor.author = author.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.descriptor.description = description.to_string();
        self
    }

    pub fn enabled_by_default(mut self, enabled: bool) -> Self {
        self.descriptor.enabled_by_default = enabled;
        self
    }

    pub fn dependency(mut self, name: &str) -> Self {
        self.descriptor.dependencies.push(name.to_string());
        self
    }

    pub fn explicit_override(mut self, state: OverrideState) -> Self {
        self.descriptor.explicit_override = state;
        self
    }

    pub fn build(self) -> PluginDescriptor {
        self.descriptor
    }
}
