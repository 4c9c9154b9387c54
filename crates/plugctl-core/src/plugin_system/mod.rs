//! # plugctl Plugin System
//!
//! Models the plugins visible to one project and the operations that change
//! which of them are enabled or where they live on disk.
//!
//! Plugins are discovered in three trees: the project's `Plugins` directory,
//! the engine's `Engine/Plugins` directory and the marketplace folder below
//! it. A plugin is identified by its name together with the tree it came
//! from, so the same name may appear more than once; such duplicates are
//! reported as conflicts rather than rejected.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`manifest`]**: The data model ([`PluginDescriptor`], [`ProjectDescriptor`],
//!   [`PluginSource`], [`OverrideState`]).
//! - **[`loader`]**: Finds and parses the project and plugin descriptor files
//!   ([`ManifestLoader`]).
//! - **[`registry`]**: The owned store of descriptors ([`PluginRegistry`]) plus the
//!   search/category view and statistics.
//! - **[`dependency`]**: Effective state and one-hop dependency edges ([`StateResolver`]).
//! - **[`conflict`]**: Same-name detection across sources ([`ConflictDetector`]).
//! - **[`cascade`]**: Enable, disable and reset, with confirmation of cascading changes.
//! - **[`file_ops`]**: Canonical rename, move between trees and deletion.
//! - **[`manager`]**: The [`PluginManager`] facade owning the registry and collaborators.
//! - **[`error`]**: [`PluginSystemError`].
pub mod cascade;
pub mod conflict;
pub mod dependency;
pub mod error;
pub mod file_ops;
pub mod loader;
pub mod manager;
pub mod manifest;
pub mod registry;

pub use cascade::{ChangeOutcome, StateChange};
pub use conflict::{ConflictDetector, PluginConflict};
pub use dependency::StateResolver;
pub use error::PluginSystemError;
pub use loader::ManifestLoader;
pub use manager::PluginManager;
pub use manifest::{
    DescriptorBuilder, OverrideState, PluginDescriptor, PluginKey, PluginSource,
    ProjectDescriptor,
};
pub use registry::{PluginFilter, PluginRegistry, PluginStats, SearchField};

#[cfg(test)]
mod tests;
