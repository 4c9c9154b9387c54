use std::io::{self, BufRead, Write};

use log::debug;
use plugctl_core::ui_bridge::format_affected;
use plugctl_core::{ConfirmationPrompt, PluginKey};

/// Asks on the terminal and reads the answer from standard input.
///
/// Only `y` or `yes` (any case) accept; anything else, including end of
/// input, declines.
#[derive(Debug, Default)]
pub struct CliPrompt;

impl CliPrompt {
    fn ask(&self, message: &str, affected: &[PluginKey]) -> io::Result<bool> {
        let mut stderr = io::stderr().lock();
        writeln!(stderr, "{}", message)?;
        if !affected.is_empty() {
            writeln!(stderr, "{}", format_affected(affected))?;
        }
        write!(stderr, "Continue? [y/N] ")?;
        stderr.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(is_yes(&answer))
    }
}

impl ConfirmationPrompt for CliPrompt {
    fn confirm(&self, message: &str, affected: &[PluginKey]) -> bool {
        match self.ask(message, affected) {
            Ok(answer) => answer,
            Err(e) => {
                debug!("Could not read confirmation: {}", e);
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
