//! Command handler
//!
//! Wires configuration, platform detection, path resolution and the
//! lifecycle manager together for one command-line invocation, and prints
//! the outcome.

use colored::Colorize;
use std::path::Path;

use crate::backend::{select_backend, Comparison};
use crate::config::{load_settings, ConfigManager};
use crate::error::{ArchiveError, Result};
use crate::lifecycle::{ArchiveLifecycleManager, Operation, Outcome};
use crate::platform::Platform;
use crate::prompt::{Prompter, TerminalPrompter};
use crate::record::{expand_path, resolve};

/// Run `operation` on `raw_path` for the current user.
pub fn handle_command(operation: Operation, raw_path: &Path) -> Result<Outcome> {
    let platform = Platform::detect()?;
    let home = ConfigManager::home_dir()?;
    let cwd = std::env::current_dir().map_err(|e| ArchiveError::io(".", e))?;

    handle_command_in(&home, &cwd, platform, operation, raw_path, &TerminalPrompter)
}

/// Run `operation` with an explicit home directory, working directory and platform.
pub fn handle_command_in(
    home: &Path,
    cwd: &Path,
    platform: Platform,
    operation: Operation,
    raw_path: &Path,
    prompter: &dyn Prompter,
) -> Result<Outcome> {
    let backend = select_backend(platform);

    ConfigManager::ensure_dirs_in(home)?;
    let settings = load_settings(&ConfigManager::config_file_path_in(home), home, cwd)?;
    log::debug!("Loaded {settings:?}");

    let source = expand_path(raw_path, home, cwd);
    let record = resolve(&source, &settings.archive_base_path, home, platform)?;

    let manager = ArchiveLifecycleManager::new(
        backend.as_ref(),
        prompter,
        &settings.archive_password,
        ConfigManager::tmp_dir_in(home),
    );

    let outcome = manager.run(operation, &record)?;
    display_outcome(&outcome);
    Ok(outcome)
}

/// Print the result of an operation
pub fn display_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Archived { archive_file } => {
            println!("{} Archive created at {}", "✓".green(), archive_file.display());
        }
        Outcome::Verified {
            comparison: Comparison::Identical,
            extracted,
        } => {
            println!("{} Archive matches the original directory", "✓".green());
            println!(
                "  Extracted copy kept at {} (run `clean` to remove it)",
                extracted.display()
            );
        }
        Outcome::Verified { extracted, .. } => {
            println!("{}", "Comparison opened for manual review".yellow());
            println!(
                "  Extracted copy kept at {} (run `clean` to remove it)",
                extracted.display()
            );
        }
        Outcome::Cleaned {
            removed: Some(path),
        } => {
            println!("{} Removed {}", "✓".green(), path.display());
        }
        Outcome::Cleaned { removed: None } => {
            println!("{}", "No extracted copy to remove".dimmed());
        }
        Outcome::Removed { path } => {
            println!("{} Removed {}", "✓".green(), path.display());
        }
        Outcome::Declined { path } => {
            println!("{} {}", "Cancelled, nothing removed:".yellow(), path.display());
        }
        Outcome::Restored { path } => {
            println!("{} Restored {}", "✓".green(), path.display());
        }
        Outcome::Status(state) => {
            println!("{} {}", "Status:".bold(), state.stage);
            println!("{} {}", "Archive file:".bold(), state.archive_file.display());
            if let Some(extracted) = &state.extracted_copy {
                println!(
                    "{} {}",
                    "Extracted copy:".bold(),
                    extracted.display().to_string().yellow()
                );
            }
        }
    }
}
