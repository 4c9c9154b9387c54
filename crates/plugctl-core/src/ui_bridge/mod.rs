//! # plugctl UI Bridge
//!
//! The seam between the core and whatever front end drives it. The core
//! never talks to a terminal or a window directly; when a state change needs
//! the user's consent it calls a [`ConfirmationPrompt`] and blocks until the
//! prompt answers.
use log::debug;

use crate::plugin_system::manifest::PluginKey;

/// Synchronous yes/no question put to the user before a cascading change.
pub trait ConfirmationPrompt {
    /// Ask the user to accept `message`, which affects the listed plugins.
    fn confirm(&self, message: &str, affected: &[PluginKey]) -> bool;
}

impl<F> ConfirmationPrompt for F
where
    F: Fn(&str, &[PluginKey]) -> bool,
{
    fn confirm(&self, message: &str, affected: &[PluginKey]) -> bool {
        self(message, affected)
    }
}

/// Accepts every request (non-interactive `--yes` runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl ConfirmationPrompt for AutoConfirm {
    fn confirm(&self, message: &str, affected: &[PluginKey]) -> bool {
        debug!("Auto-confirming '{}' ({} plugin(s))", message, affected.len());
        true
    }
}

/// Declines every request; the default when no prompt is attached
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclineAll;

impl ConfirmationPrompt for DeclineAll {
    fn confirm(&self, message: &str, _affected: &[PluginKey]) -> bool {
        debug!("Declining '{}': no confirmation prompt attached", message);
        false
    }
}

/// Render an affected-plugin list the way prompts show it, one per line.
pub fn format_affected(affected: &[PluginKey]) -> String {
    affected
        .iter()
        .map(|key| format!("  - {}", key))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests;
