mod cascade_tests;

use std::path::Path;

use crate::plugin_system::manifest::{
    DescriptorBuilder, OverrideState, PluginDescriptor, PluginSource, ProjectDescriptor,
};
use crate::plugin_system::registry::PluginRegistry;

/// Registry over an in-memory project at `/game`; nothing touches the disk.
pub(super) fn registry_with(
    overrides: &[(&str, OverrideState)],
    plugins: Vec<PluginDescriptor>,
) -> PluginRegistry {
    let mut project = ProjectDescriptor::new("Game", "/game", "/game/Game.uproject");
    for (name, state) in overrides {
        project.set_override(name, *state);
    }
    let mut registry = PluginRegistry::new(project);
    for plugin in plugins {
        assert!(registry.insert(plugin), "duplicate plugin in fixture");
    }
    registry
}

pub(super) fn plugin(name: &str, source: PluginSource) -> DescriptorBuilder {
    let parent = match source {
        PluginSource::Project => Path::new("/game/Plugins"),
        PluginSource::Engine => Path::new("/engine/Engine/Plugins"),
        PluginSource::Marketplace => Path::new("/engine/Engine/Plugins/Marketplace"),
    };
    DescriptorBuilder::new(name, source, parent)
}
