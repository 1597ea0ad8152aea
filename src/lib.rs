//! # archive-dir
//!
//! A command-line tool for the manual bookkeeping of directory backups.
//!
//! ## Overview
//!
//! `archive-dir` turns a directory under your home directory into an
//! encrypted 7-Zip archive stored below a configured archive root, lets you
//! check the archive against the original, removes whichever copy you no
//! longer need, and restores archives back to where they came from. The
//! archive root mirrors the layout of the home directory, so
//! `~/Projects/app` is stored as `<archive root>/Projects/app.tar.7z` on
//! Linux and `<archive root>\Projects\app.7z` on Windows.
//!
//! ## Commands
//!
//! - **archive**: create the archive (refuses to overwrite an existing one)
//! - **verify**: extract into `~/.archive-dir/tmp` and compare with the original
//! - **clean**: remove the copy left by `verify`
//! - **remove_dir** / **remove_archive**: trash one copy after confirmation
//! - **restore**: extract the archive back to the original location
//! - **status**: show which copies exist
//!
//! Running two commands on the same directory at the same time is not
//! supported; the existence checks of one can race with the writes of the
//! other.
//!
//! ## Architecture
//!
//! - Configuration and process directories ([`config`])
//! - Archive path derivation ([`record`], [`platform`])
//! - External archive engine drivers ([`backend`])
//! - Lifecycle operations and their preconditions ([`lifecycle`])
//! - Confirmation prompts, command handling and logging ([`prompt`], [`handlers`], [`logger`])

/// Locations under `~/.archive-dir` and the `config.toml` file.
///
/// The config file is created with blank values on first run and rejected
/// until both `archive_base_path` and `archive_password` are filled in.
pub mod config;

/// Typed errors with stable process exit codes.
pub mod error;

/// Drivers for the external archive engine.
///
/// One implementation per platform family: the POSIX variant streams `tar`
/// through `7z` and uses the desktop trash, the Windows variant runs `7z`
/// on the directory and deletes permanently.
pub mod backend;

/// Glue between the command line and the lifecycle manager.
pub mod handlers;

/// Archive lifecycle operations with precondition checks.
pub mod lifecycle;

/// Logging configuration and utilities.
///
/// Console logging is controlled via `RUST_LOG`; each invocation is also
/// recorded in `~/.archive-dir/archive-dir.log`, rotated past 10MB.
pub mod logger;

/// Platform family detection.
pub mod platform;

/// Interactive yes/no confirmation.
pub mod prompt;

/// Deterministic derivation of archive locations from a source directory.
pub mod record;

pub use error::{ArchiveError, Result};
