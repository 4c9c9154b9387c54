pub mod engine;
pub mod kernel;
pub mod plugin_system;
pub mod storage;
pub mod ui_bridge;
pub mod utils;

// Re-export key public types for easier use by the binary
pub use engine::{EngineAssociation, EngineLocator, FixedEngineLocator, SettingsEngineLocator};
pub use kernel::error::{Error, Result};
pub use plugin_system::{
    ChangeOutcome, PluginDescriptor, PluginKey, PluginManager, PluginSource, PluginSystemError,
    SearchField,
};
pub use storage::{DirectoryTrash, Settings, TrashBin};
pub use ui_bridge::{AutoConfirm, ConfirmationPrompt, DeclineAll};

#[cfg(test)]
pub(crate) mod test_support;
