use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::plugin_system::dependency::StateResolver;
use crate::plugin_system::manifest::{
    OverrideState, PluginDescriptor, PluginSource, ProjectDescriptor,
};

/// Owned store of every discovered plugin, partitioned by source, plus the
/// project descriptor the overrides come from.
///
/// The registry is rebuilt wholesale by the loader. Between rebuilds it only
/// changes through the cascade and file operation paths, each of which
/// updates it after the matching disk write succeeded.
#[derive(Debug, Clone)]
pub struct PluginRegistry {
    project: ProjectDescriptor,
    partitions: BTreeMap<PluginSource, Vec<PluginDescriptor>>,
}

impl PluginRegistry {
    pub fn new(project: ProjectDescriptor) -> Self {
        Self {
            project,
            partitions: PluginSource::ALL
                .iter()
                .map(|source| (*source, Vec::new()))
                .collect(),
        }
    }

    pub fn project(&self) -> &ProjectDescriptor {
        &self.project
    }

    /// Add a descriptor to its source partition.
    ///
    /// The explicit override is taken from the project descriptor. Returns
    /// `false` (and leaves the registry untouched) when the source already
    /// holds a plugin with that name.
    pub fn insert(&mut self, mut plugin: PluginDescriptor) -> bool {
        if self.contains(&plugin.name, plugin.source) {
            return false;
        }
        plugin.explicit_override = self.project.override_for(&plugin.name);
        debug!("Registered plugin {}", plugin.key());
        self.partition_mut(plugin.source).push(plugin);
        true
    }

    pub fn contains(&self, name: &str, source: PluginSource) -> bool {
        self.get(name, source).is_some()
    }

    pub fn get(&self, name: &str, source: PluginSource) -> Option<&PluginDescriptor> {
        self.plugins(source).iter().find(|p| p.name == name)
    }

    pub fn get_mut(&mut self, name: &str, source: PluginSource) -> Option<&mut PluginDescriptor> {
        self.partition_mut(source).iter_mut().find(|p| p.name == name)
    }

    /// First descriptor named `name`, searching sources in [`PluginSource::ALL`] order
    pub fn find(&self, name: &str) -> Option<&PluginDescriptor> {
        PluginSource::ALL
            .iter()
            .find_map(|source| self.get(name, *source))
    }

    /// Every source holding a plugin named `name`, in lookup order
    pub fn sources_of(&self, name: &str) -> Vec<PluginSource> {
        PluginSource::ALL
            .iter()
            .copied()
            .filter(|source| self.contains(name, *source))
            .collect()
    }

    /// The descriptors of one source, in discovery order
    pub fn plugins(&self, source: PluginSource) -> &[PluginDescriptor] {
        self.partitions
            .get(&source)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All descriptors, source by source
    pub fn iter(&self) -> impl Iterator<Item = &PluginDescriptor> {
        PluginSource::ALL
            .iter()
            .flat_map(move |source| self.plugins(*source).iter())
    }

    pub fn len(&self) -> usize {
        self.partitions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remove(&mut self, name: &str, source: PluginSource) -> Option<PluginDescriptor> {
        let partition = self.partition_mut(source);
        let index = partition.iter().position(|p| p.name == name)?;
        Some(partition.remove(index))
    }

    /// Point an entry at a new directory, moving it to `to`'s partition when
    /// the source changes. Returns `false` if the entry does not exist.
    pub fn relocate(
        &mut self,
        name: &str,
        from: PluginSource,
        to: PluginSource,
        directory: PathBuf,
    ) -> bool {
        if from == to {
            return match self.get_mut(name, from) {
                Some(plugin) => {
                    plugin.directory = directory;
                    true
                }
                None => false,
            };
        }

        let Some(mut plugin) = self.remove(name, from) else {
            return false;
        };
        plugin.directory = directory;
        plugin.source = to;
        self.partition_mut(to).push(plugin);
        true
    }

    /// Mirror an override that has been written to the project descriptor.
    ///
    /// Overrides are keyed by name in the descriptor, so every source's
    /// plugin with that name picks up the new state.
    pub fn apply_override(&mut self, name: &str, state: OverrideState) {
        self.project.set_override(name, state);
        for partition in self.partitions.values_mut() {
            for plugin in partition.iter_mut().filter(|p| p.name == name) {
                plugin.explicit_override = state;
            }
        }
    }

    /// Sorted distinct non-empty categories of one source, or of all sources
    pub fn categories(&self, source: Option<PluginSource>) -> Vec<String> {
        let categories: BTreeSet<&str> = self
            .iter()
            .filter(|p| source.is_none_or(|s| p.source == s))
            .map(|p| p.category.as_str())
            .filter(|c| !c.is_empty())
            .collect();
        categories.into_iter().map(str::to_string).collect()
    }

    /// Totals per source and by effective state
    pub fn stats(&self) -> PluginStats {
        let mut stats = PluginStats::default();
        for plugin in self.iter() {
            stats.total += 1;
            match plugin.source {
                PluginSource::Project => stats.project += 1,
                PluginSource::Engine => stats.engine += 1,
                PluginSource::Marketplace => stats.marketplace += 1,
            }
            if plugin.is_enabled() {
                stats.enabled += 1;
            } else {
                stats.disabled += 1;
            }
        }
        stats
    }

    fn partition_mut(&mut self, source: PluginSource) -> &mut Vec<PluginDescriptor> {
        self.partitions.entry(source).or_default()
    }
}

/// Counts reported by [`PluginRegistry::stats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PluginStats {
    pub total: usize,
    pub project: usize,
    pub engine: usize,
    pub marketplace: usize,
    pub enabled: usize,
    pub disabled: usize,
}

/// Descriptor field a search keyword is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    #[default]
    Name,
    Author,
    Category,
    Description,
    /// Names the plugin depends on
    Dependency,
    /// Names of same-source plugins that depend on it
    Dependent,
}

impl SearchField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Name => "name",
            SearchField::Author => "author",
            SearchField::Category => "category",
            SearchField::Description => "description",
            SearchField::Dependency => "dependency",
            SearchField::Dependent => "dependent",
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(SearchField::Name),
            "author" => Ok(SearchField::Author),
            "category" => Ok(SearchField::Category),
            "description" => Ok(SearchField::Description),
            "dependency" => Ok(SearchField::Dependency),
            "dependent" => Ok(SearchField::Dependent),
            other => Err(format!("unknown search field '{}'", other)),
        }
    }
}

/// The current search and category view over a registry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginFilter {
    keyword: Option<String>,
    field: SearchField,
    category: Option<String>,
}

impl PluginFilter {
    /// Set the search keyword; an empty keyword clears the search.
    pub fn search(&mut self, keyword: &str, field: SearchField) {
        let keyword = keyword.trim();
        self.keyword = if keyword.is_empty() {
            None
        } else {
            Some(keyword.to_lowercase())
        };
        self.field = field;
    }

    /// Restrict the view to one category, or lift the restriction with `None`.
    pub fn set_category(&mut self, category: Option<String>) {
        self.category = category.filter(|c| !c.is_empty());
    }

    pub fn clear(&mut self) {
        *self = PluginFilter::default();
    }

    pub fn is_active(&self) -> bool {
        self.keyword.is_some() || self.category.is_some()
    }

    pub fn matches(&self, plugin: &PluginDescriptor, registry: &PluginRegistry) -> bool {
        if let Some(category) = &self.category {
            if !plugin.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }

        let Some(keyword) = &self.keyword else {
            return true;
        };
        let contains = |text: &str| text.to_lowercase().contains(keyword.as_str());

        match self.field {
            SearchField::Name => contains(&plugin.name),
            SearchField::Author => contains(&plugin.author),
            SearchField::Category => contains(&plugin.category),
            SearchField::Description => contains(&plugin.description),
            SearchField::Dependency => plugin.dependencies.iter().any(|d| contains(d)),
            SearchField::Dependent => StateResolver::new(registry)
                .dependents(&plugin.name, plugin.source)
                .iter()
                .any(|d| contains(&d.name)),
        }
    }

    /// Plugins of `source` (or of every source) that pass the filter
    pub fn apply<'a>(
        &self,
        registry: &'a PluginRegistry,
        source: Option<PluginSource>,
    ) -> Vec<&'a PluginDescriptor> {
        registry
            .iter()
            .filter(|p| source.is_none_or(|s| p.source == s))
            .filter(|p| self.matches(p, registry))
            .collect()
    }
}
