use crate::plugin_system::manifest::{PluginKey, PluginSource};
use crate::plugin_system::registry::PluginRegistry;

/// Read-only queries over the registry's dependency edges.
///
/// Edges are resolved lazily: a dependency name with no descriptor in any
/// source is simply missing from the resolved results. Resolution is one hop
/// in both directions.
#[derive(Debug, Clone, Copy)]
pub struct StateResolver<'a> {
    registry: &'a PluginRegistry,
}

impl<'a> StateResolver<'a> {
    pub fn new(registry: &'a PluginRegistry) -> Self {
        Self { registry }
    }

    /// Effective state of a plugin; `false` when it is not registered.
    pub fn is_enabled(&self, name: &str, source: PluginSource) -> bool {
        self.registry
            .get(name, source)
            .map(|p| p.is_enabled())
            .unwrap_or(false)
    }

    /// Declared dependency names, in declaration order
    pub fn dependencies(&self, name: &str, source: PluginSource) -> Vec<String> {
        self.registry
            .get(name, source)
            .map(|p| p.dependencies.clone())
            .unwrap_or_default()
    }

    /// Dependencies resolved to registry entries, first match per name.
    ///
    /// Sources are searched in [`PluginSource::ALL`] order. Names that occur
    /// more than once in the declaration are reported once.
    pub fn resolve_dependencies(&self, name: &str, source: PluginSource) -> Vec<PluginKey> {
        let mut resolved: Vec<PluginKey> = Vec::new();
        for dependency in self.dependencies(name, source) {
            if let Some(plugin) = self.registry.find(&dependency) {
                let key = plugin.key();
                if !resolved.contains(&key) {
                    resolved.push(key);
                }
            }
        }
        resolved
    }

    /// Plugins of the same source that declare `name` as a dependency
    pub fn dependents(&self, name: &str, source: PluginSource) -> Vec<PluginKey> {
        self.registry
            .plugins(source)
            .iter()
            .filter(|p| p.depends_on(name))
            .map(|p| p.key())
            .collect()
    }

    /// Plugins of any source that declare `name` as a dependency
    pub fn all_dependents(&self, name: &str) -> Vec<PluginKey> {
        self.registry
            .iter()
            .filter(|p| p.depends_on(name))
            .map(|p| p.key())
            .collect()
    }

    /// Resolved dependencies that are currently disabled; what enabling `name` must also enable.
    pub fn disabled_dependencies(&self, name: &str, source: PluginSource) -> Vec<PluginKey> {
        self.resolve_dependencies(name, source)
            .into_iter()
            .filter(|key| !self.is_enabled(&key.name, key.source))
            .collect()
    }

    /// Dependents in any source that are currently enabled; what disabling `name` must also disable.
    pub fn enabled_dependents(&self, name: &str) -> Vec<PluginKey> {
        self.all_dependents(name)
            .into_iter()
            .filter(|key| self.is_enabled(&key.name, key.source))
            .collect()
    }
}
