/// Application name
pub const APP_NAME: &str = "plugctl";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Extension of the project descriptor file found in a project root
pub const PROJECT_DESCRIPTOR_EXTENSION: &str = "uproject";

/// Extension of a plugin descriptor file
pub const PLUGIN_DESCRIPTOR_EXTENSION: &str = "uplugin";

/// Plugins directory below a project root
pub const PROJECT_PLUGINS_DIR: &str = "Plugins";

/// Plugins directory below an engine installation, as path segments
pub const ENGINE_PLUGINS_DIR: [&str; 2] = ["Engine", "Plugins"];

/// Path segment that marks a marketplace-installed plugin
pub const MARKETPLACE_DIR_NAME: &str = "Marketplace";

/// Prefix used by launcher installs, e.g. `UE_5.3`
pub const ENGINE_INSTALL_PREFIX: &str = "UE_";

/// Settings directory name below the user config dir
pub const CONFIG_DIR_NAME: &str = "plugctl";

/// Default settings file name
pub const SETTINGS_FILE_NAME: &str = "settings.toml";
