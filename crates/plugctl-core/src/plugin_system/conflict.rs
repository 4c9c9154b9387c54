use crate::plugin_system::manifest::{PluginDescriptor, PluginSource};
use crate::plugin_system::registry::PluginRegistry;

/// A plugin name installed in more than one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConflict {
    pub name: String,
    /// Sources holding the name, in lookup order
    pub sources: Vec<PluginSource>,
}

impl PluginConflict {
    pub fn description(&self) -> String {
        let sources: Vec<&str> = self.sources.iter().map(PluginSource::as_str).collect();
        format!("'{}' is installed in: {}", self.name, sources.join(", "))
    }
}

/// Detects same-name plugins across sources.
///
/// The engine refuses to activate two plugins sharing a name, so such a
/// plugin may be listed and inspected but never enabled.
#[derive(Debug, Clone, Copy)]
pub struct ConflictDetector<'a> {
    registry: &'a PluginRegistry,
}

impl<'a> ConflictDetector<'a> {
    pub fn new(registry: &'a PluginRegistry) -> Self {
        Self { registry }
    }

    /// True iff at least two sources hold a plugin named `name`
    pub fn has_conflict(&self, name: &str) -> bool {
        self.registry.sources_of(name).len() > 1
    }

    /// First plugin named `name` found outside `excluding`
    pub fn conflicting_plugin(
        &self,
        name: &str,
        excluding: PluginSource,
    ) -> Option<&'a PluginDescriptor> {
        PluginSource::ALL
            .iter()
            .filter(|source| **source != excluding)
            .find_map(|source| self.registry.get(name, *source))
    }

    /// Every conflicted name, sorted by name
    pub fn conflicts(&self) -> Vec<PluginConflict> {
        let mut names: Vec<&str> = self.registry.iter().map(|p| p.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();

        names
            .into_iter()
            .filter_map(|name| {
                let sources = self.registry.sources_of(name);
                (sources.len() > 1).then(|| PluginConflict {
                    name: name.to_string(),
                    sources,
                })
            })
            .collect()
    }
}
