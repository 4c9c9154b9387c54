use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde_json::{Map, Value};

use crate::kernel::error::{Error, Result};
use crate::plugin_system::error::PluginSystemError;
use crate::utils::{json, write_atomic};

const PLUGINS_KEY: &str = "Plugins";
const NAME_KEY: &str = "Name";
const ENABLED_KEY: &str = "Enabled";

/// Reads and rewrites the plugin override section of a project descriptor.
///
/// Every operation starts from a fresh read of the file, so edits made by the
/// editor since the project was loaded are kept. Keys keep their original
/// order and fields this type does not know about are written back untouched.
#[derive(Debug, Clone)]
pub struct ProjectFile {
    path: PathBuf,
}

impl ProjectFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the descriptor as a JSON object.
    pub fn read(&self) -> Result<Map<String, Value>> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| Error::io(e, "read_project_descriptor", self.path.clone()))?;

        let value: Value = json::from_relaxed_str(&content).map_err(|e| {
            PluginSystemError::DescriptorParse {
                path: self.path.clone(),
                message: format!("Failed to parse project descriptor JSON: {}", e),
                source: Some(Box::new(e)),
            }
        })?;

        match value {
            Value::Object(map) => Ok(map),
            _ => Err(self.parse_error("top level is not a JSON object")),
        }
    }

    /// Set `Enabled` for `name`, appending an entry when none exists.
    pub fn set_plugin_override(&self, name: &str, enabled: bool) -> Result<()> {
        let mut root = self.read()?;

        let plugins = root
            .entry(PLUGINS_KEY.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        let entries = plugins
            .as_array_mut()
            .ok_or_else(|| self.parse_error("'Plugins' is not an array"))?;

        let mut found = false;
        for entry in entries.iter_mut().filter(|e| entry_name(e) == Some(name)) {
            if let Value::Object(fields) = entry {
                fields.insert(ENABLED_KEY.to_string(), Value::Bool(enabled));
                found = true;
            }
        }

        if !found {
            let mut fields = Map::new();
            fields.insert(NAME_KEY.to_string(), Value::String(name.to_string()));
            fields.insert(ENABLED_KEY.to_string(), Value::Bool(enabled));
            entries.push(Value::Object(fields));
        }

        self.write(&root)?;
        info!(
            "Set plugin '{}' to {} in {}",
            name,
            if enabled { "enabled" } else { "disabled" },
            self.path.display()
        );
        Ok(())
    }

    /// Drop every override entry for `name`.
    ///
    /// Returns whether anything was removed; the file is only rewritten in that case.
    pub fn remove_override(&self, name: &str) -> Result<bool> {
        let mut root = self.read()?;

        let Some(plugins) = root.get_mut(PLUGINS_KEY) else {
            debug!("No 'Plugins' section in {}; nothing to remove", self.path.display());
            return Ok(false);
        };
        let entries = plugins
            .as_array_mut()
            .ok_or_else(|| self.parse_error("'Plugins' is not an array"))?;

        let before = entries.len();
        entries.retain(|e| entry_name(e) != Some(name));
        if entries.len() == before {
            return Ok(false);
        }

        self.write(&root)?;
        info!("Removed override for plugin '{}' from {}", name, self.path.display());
        Ok(true)
    }

    fn write(&self, root: &Map<String, Value>) -> Result<()> {
        let bytes = json::to_tabbed_vec(root).map_err(|e| PluginSystemError::DescriptorParse {
            path: self.path.clone(),
            message: format!("Failed to serialize project descriptor: {}", e),
            source: Some(Box::new(e)),
        })?;
        write_atomic(&self.path, &bytes)
            .map_err(|e| Error::io(e, "write_project_descriptor", self.path.clone()))
    }

    fn parse_error(&self, message: &str) -> Error {
        PluginSystemError::DescriptorParse {
            path: self.path.clone(),
            message: message.to_string(),
            source: None,
        }
        .into()
    }
}

fn entry_name(entry: &Value) -> Option<&str> {
    entry.get(NAME_KEY).and_then(Value::as_str)
}
