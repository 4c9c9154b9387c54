use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::kernel::constants;
use crate::kernel::error::{Error, Result};
use crate::plugin_system::registry::SearchField;
use crate::storage::error::StorageSystemError;
use crate::utils::write_atomic;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// Persisted tool settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Field used by `list --search` when none is given
    pub search_field: SearchField,

    /// Directories holding launcher installs named `UE_<major>.<minor>`
    pub install_roots: Vec<PathBuf>,

    /// Engine association (version or build id) -> installation directory
    pub engines: BTreeMap<String, PathBuf>,
}

impl Settings {
    /// `<user config dir>/plugctl/settings.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| {
            dir.join(constants::CONFIG_DIR_NAME)
                .join(constants::SETTINGS_FILE_NAME)
        })
    }

    /// Load settings; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| StorageSystemError::UnsupportedConfigFormat(path.to_path_buf()))?;

        if !path.exists() {
            debug!("Settings file {} not found; using defaults", path.display());
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::io(e, "read_settings", path.to_path_buf()))?;
        Self::deserialize(&content, format, path)
    }

    /// Write settings, creating the parent directory when needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| StorageSystemError::UnsupportedConfigFormat(path.to_path_buf()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::io(e, "create_settings_dir", parent.to_path_buf()))?;
        }

        let content = self.serialize(format)?;
        write_atomic(path, content.as_bytes())
            .map_err(|e| Error::io(e, "write_settings", path.to_path_buf()))
    }

    /// Serialize to string based on format
    pub fn serialize(&self, format: ConfigFormat) -> Result<String> {
        let result: std::result::Result<String, Box<dyn std::error::Error + Send + Sync>> =
            match format {
                ConfigFormat::Json => serde_json::to_string_pretty(self).map_err(Into::into),
                #[cfg(feature = "yaml-config")]
                ConfigFormat::Yaml => serde_yaml::to_string(self).map_err(Into::into),
                #[cfg(feature = "toml-config")]
                ConfigFormat::Toml => toml::to_string_pretty(self).map_err(Into::into),
            };
        result.map_err(|source| {
            StorageSystemError::SerializationError {
                format: format.extension().to_string(),
                source,
            }
            .into()
        })
    }

    /// Deserialize from string based on format
    pub fn deserialize(data: &str, format: ConfigFormat, path: &Path) -> Result<Self> {
        let result: std::result::Result<Settings, Box<dyn std::error::Error + Send + Sync>> =
            match format {
                ConfigFormat::Json => serde_json::from_str(data).map_err(Into::into),
                #[cfg(feature = "yaml-config")]
                ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(Into::into),
                #[cfg(feature = "toml-config")]
                ConfigFormat::Toml => toml::from_str(data).map_err(Into::into),
            };
        result.map_err(|source| {
            StorageSystemError::DeserializationError {
                format: format.extension().to_string(),
                path: path.to_path_buf(),
                source,
            }
            .into()
        })
    }
}
