//! Enable/disable orchestration.
//!
//! Turning a plugin on also turns on its disabled dependencies; turning one
//! off also turns off every enabled plugin, in any source, that depends on
//! it. Both directions look one hop along the dependency edges. When the
//! change reaches beyond the requested plugin the user is asked first.
//!
//! Writes go to the project descriptor one plugin at a time, prerequisites
//! first, and the registry follows each write only after it succeeded. A
//! failing write stops the batch; earlier writes stay on disk and are
//! reported through [`PluginSystemError::BatchIncomplete`].
use std::collections::BTreeSet;

use log::{debug, info};

use crate::kernel::error::Result;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manager::PluginManager;
use crate::plugin_system::manifest::{OverrideState, PluginKey, PluginSource};

/// A planned enable or disable, before confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub target: PluginKey,
    pub enable: bool,
    /// Plugins changing along with the target
    pub cascaded: Vec<PluginKey>,
}

impl StateChange {
    pub fn is_cascading(&self) -> bool {
        !self.cascaded.is_empty()
    }

    /// Cascaded plugins first, then the target
    pub fn write_order(&self) -> Vec<PluginKey> {
        let mut order = self.cascaded.clone();
        order.push(self.target.clone());
        order
    }

    /// Question put to the confirmation prompt
    pub fn message(&self) -> String {
        if self.enable {
            format!(
                "Enabling {} also enables {} disabled dependenc{}:",
                self.target,
                self.cascaded.len(),
                if self.cascaded.len() == 1 { "y" } else { "ies" }
            )
        } else {
            format!(
                "Disabling {} also disables {} enabled dependent{}:",
                self.target,
                self.cascaded.len(),
                if self.cascaded.len() == 1 { "" } else { "s" }
            )
        }
    }
}

/// Result of a confirmed or declined state change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// The listed plugins were written, in order
    Applied(Vec<PluginKey>),
    /// The user rejected the cascade; nothing was written
    Declined,
}

impl ChangeOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ChangeOutcome::Applied(_))
    }
}

impl PluginManager {
    /// Work out what enabling `name` involves without touching anything.
    ///
    /// Fails with `Conflict` when the plugin, or a dependency that would be
    /// enabled with it, is installed in more than one source.
    pub fn plan_enable(&self, name: &str, source: PluginSource) -> Result<StateChange> {
        let target = self.get_plugin(name, source)?.key();
        self.ensure_no_conflict(name)?;

        let cascaded: Vec<PluginKey> = self
            .resolver()
            .disabled_dependencies(name, source)
            .into_iter()
            .filter(|key| key.name != name)
            .collect();
        for key in &cascaded {
            self.ensure_no_conflict(&key.name)?;
        }

        Ok(StateChange {
            target,
            enable: true,
            cascaded,
        })
    }

    /// Work out what disabling `name` involves without touching anything.
    pub fn plan_disable(&self, name: &str, source: PluginSource) -> Result<StateChange> {
        let target = self.get_plugin(name, source)?.key();
        let cascaded: Vec<PluginKey> = self
            .resolver()
            .enabled_dependents(name)
            .into_iter()
            .filter(|key| key.name != name)
            .collect();

        Ok(StateChange {
            target,
            enable: false,
            cascaded,
        })
    }

    /// Enable a plugin together with its disabled direct dependencies.
    pub fn enable(&mut self, name: &str, source: PluginSource) -> Result<ChangeOutcome> {
        let change = self.plan_enable(name, source)?;
        self.apply_change(&change)
    }

    /// Disable a plugin together with its enabled direct dependents.
    pub fn disable(&mut self, name: &str, source: PluginSource) -> Result<ChangeOutcome> {
        let change = self.plan_disable(name, source)?;
        self.apply_change(&change)
    }

    /// Confirm (if cascading) and write a planned change.
    pub fn apply_change(&mut self, change: &StateChange) -> Result<ChangeOutcome> {
        if change.is_cascading() && !self.prompt.confirm(&change.message(), &change.cascaded) {
            info!("Change to {} declined; nothing written", change.target);
            return Ok(ChangeOutcome::Declined);
        }
        self.write_batch(&change.write_order(), change.enable)
            .map(ChangeOutcome::Applied)
    }

    /// Drop the explicit override so the plugin falls back to its default.
    ///
    /// Returns `false` without writing when there was no override.
    pub fn reset_to_default(&mut self, name: &str, source: PluginSource) -> Result<bool> {
        let plugin = self.get_plugin(name, source)?;
        if !plugin.explicit_override.is_set() {
            debug!("{} has no override; nothing to reset", plugin.key());
            return Ok(false);
        }

        self.project_file().remove_override(name)?;
        self.registry.apply_override(name, OverrideState::Unset);
        info!("Reset '{}' to its default state", name);
        Ok(true)
    }

    fn ensure_no_conflict(&self, name: &str) -> Result<()> {
        let sources = self.registry.sources_of(name);
        if sources.len() > 1 {
            return Err(PluginSystemError::Conflict {
                name: name.to_string(),
                sources,
            }
            .into());
        }
        Ok(())
    }

    fn write_batch(&mut self, order: &[PluginKey], enable: bool) -> Result<Vec<PluginKey>> {
        let project_file = self.project_file();
        self.write_batch_with(order, enable, |name, enabled| {
            project_file.set_plugin_override(name, enabled)
        })
    }

    /// Write `order` one name at a time through `write`, mirroring each
    /// successful write into the registry.
    pub(crate) fn write_batch_with<W>(
        &mut self,
        order: &[PluginKey],
        enable: bool,
        mut write: W,
    ) -> Result<Vec<PluginKey>>
    where
        W: FnMut(&str, bool) -> Result<()>,
    {
        let state = OverrideState::from_enabled(enable);
        let mut written: BTreeSet<&str> = BTreeSet::new();
        let mut applied: Vec<PluginKey> = Vec::new();

        for key in order {
            // overrides are keyed by name, one write covers every source
            if written.insert(key.name.as_str()) {
                if let Err(e) = write(&key.name, enable) {
                    if applied.is_empty() {
                        return Err(e);
                    }
                    return Err(PluginSystemError::BatchIncomplete {
                        applied,
                        failed: key.clone(),
                        source: Box::new(e),
                    }
                    .into());
                }
                self.registry.apply_override(&key.name, state);
            }
            applied.push(key.clone());
        }

        Ok(applied)
    }
}
