use std::collections::BTreeMap;
use std::path::PathBuf;

use log::debug;

use crate::engine::EngineAssociation;
use crate::kernel::constants;
use crate::storage::config::Settings;

/// Finds the installation directory for a project's engine association.
pub trait EngineLocator {
    /// Installation directory for `association`, or `None` when unknown.
    fn resolve(&self, association: &EngineAssociation) -> Option<PathBuf>;
}

/// Locator that always answers with the same directory (or never answers).
#[derive(Debug, Clone, Default)]
pub struct FixedEngineLocator {
    path: Option<PathBuf>,
}

impl FixedEngineLocator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A locator that never resolves anything
    pub fn none() -> Self {
        Self { path: None }
    }
}

impl EngineLocator for FixedEngineLocator {
    fn resolve(&self, _association: &EngineAssociation) -> Option<PathBuf> {
        self.path.clone()
    }
}

/// Locator backed by the user's settings.
///
/// Explicit entries (keyed by the association exactly as the project writes
/// it) win. Dotted versions then fall back to `<root>/UE_<major>.<minor>`
/// under each configured install root.
#[derive(Debug, Clone, Default)]
pub struct SettingsEngineLocator {
    engines: BTreeMap<String, PathBuf>,
    install_roots: Vec<PathBuf>,
}

impl SettingsEngineLocator {
    pub fn new(engines: BTreeMap<String, PathBuf>, install_roots: Vec<PathBuf>) -> Self {
        Self {
            engines,
            install_roots,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut install_roots = settings.install_roots.clone();
        if install_roots.is_empty() {
            install_roots.extend(default_install_roots());
        }
        Self::new(settings.engines.clone(), install_roots)
    }

    fn explicit(&self, key: &str) -> Option<PathBuf> {
        self.engines
            .get(key)
            .or_else(|| {
                // build ids are frequently written with or without braces
                let bare = key.trim_start_matches('{').trim_end_matches('}');
                self.engines.iter().find_map(|(k, v)| {
                    let k_bare = k.trim_start_matches('{').trim_end_matches('}');
                    k_bare.eq_ignore_ascii_case(bare).then_some(v)
                })
            })
            .cloned()
    }

    fn by_convention(&self, short_version: &str) -> Option<PathBuf> {
        let folder = format!("{}{}", constants::ENGINE_INSTALL_PREFIX, short_version);
        self.install_roots
            .iter()
            .map(|root| root.join(&folder))
            .find(|candidate| candidate.is_dir())
    }
}

impl EngineLocator for SettingsEngineLocator {
    fn resolve(&self, association: &EngineAssociation) -> Option<PathBuf> {
        let resolved = match association {
            EngineAssociation::Unspecified => None,
            EngineAssociation::Build(id) => self.explicit(id),
            EngineAssociation::Version(version) => self
                .explicit(version.as_str())
                .or_else(|| self.explicit(&version.short()))
                .or_else(|| self.by_convention(&version.short())),
        };
        debug!("Engine association '{}' resolved to {:?}", association, resolved);
        resolved
    }
}

/// Launcher install roots that exist on this platform by default
fn default_install_roots() -> Vec<PathBuf> {
    if cfg!(windows) {
        vec![PathBuf::from("C:/Program Files/Epic Games")]
    } else if cfg!(target_os = "macos") {
        vec![PathBuf::from("/Users/Shared/Epic Games")]
    } else {
        Vec::new()
    }
}
