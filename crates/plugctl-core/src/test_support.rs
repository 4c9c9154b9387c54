//! On-disk project and engine trees for tests.
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use tempfile::TempDir;

use crate::engine::FixedEngineLocator;
use crate::plugin_system::PluginManager;

/// A project at `<tmp>/Game` with `Game.uproject`, and an engine install at `<tmp>/UE_5.3`.
pub struct Fixture {
    pub temp: TempDir,
    pub project: PathBuf,
    pub engine: PathBuf,
}

impl Fixture {
    pub fn new(uproject: &str) -> Self {
        let temp = tempfile::tempdir().expect("create temp dir");
        let project = temp.path().join("Game");
        let engine = temp.path().join("UE_5.3");
        fs::create_dir_all(project.join("Plugins")).expect("create project plugins");
        fs::create_dir_all(engine.join("Engine").join("Plugins")).expect("create engine plugins");
        fs::write(project.join("Game.uproject"), uproject).expect("write uproject");
        Self {
            temp,
            project,
            engine,
        }
    }

    /// A project with no overrides
    pub fn empty() -> Self {
        Self::new(r#"{"FileVersion": 3, "EngineAssociation": "5.3", "Plugins": []}"#)
    }

    pub fn uproject(&self) -> PathBuf {
        self.project.join("Game.uproject")
    }

    pub fn read_uproject(&self) -> String {
        fs::read_to_string(self.uproject()).expect("read uproject")
    }

    pub fn uproject_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.read_uproject()).expect("uproject is plain JSON")
    }

    pub fn project_plugins(&self) -> PathBuf {
        self.project.join("Plugins")
    }

    pub fn engine_plugins(&self) -> PathBuf {
        self.engine.join("Engine").join("Plugins")
    }

    pub fn marketplace(&self) -> PathBuf {
        self.engine_plugins().join("Marketplace")
    }

    /// Write `<tree>/<dir>/<name>.uplugin` and return the plugin directory.
    pub fn add_plugin(&self, tree: &Path, dir: &str, name: &str, content: &str) -> PathBuf {
        let directory = tree.join(dir);
        fs::create_dir_all(&directory).expect("create plugin dir");
        fs::write(directory.join(format!("{}.uplugin", name)), content).expect("write uplugin");
        directory
    }

    pub fn add_project_plugin(&self, name: &str, content: &str) -> PathBuf {
        self.add_plugin(&self.project_plugins(), name, name, content)
    }

    pub fn add_engine_plugin(&self, name: &str, content: &str) -> PathBuf {
        self.add_plugin(&self.engine_plugins(), name, name, content)
    }

    pub fn add_marketplace_plugin(&self, name: &str, content: &str) -> PathBuf {
        self.add_plugin(&self.marketplace(), name, name, content)
    }

    pub fn manager(&self) -> PluginManager {
        PluginManager::load(&self.project, Box::new(FixedEngineLocator::new(&self.engine)))
            .expect("load project")
    }
}

/// Minimal plugin descriptor text
pub fn plugin_json(enabled_by_default: bool, dependencies: &[&str]) -> String {
    let plugins: Vec<_> = dependencies
        .iter()
        .map(|name| json!({"Name": name, "Enabled": true}))
        .collect();
    json!({
        "FileVersion": 3,
        "Version": 1,
        "VersionName": "1.0",
        "EnabledByDefault": enabled_by_default,
        "Plugins": plugins,
    })
    .to_string()
}
