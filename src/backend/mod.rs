//! Archive engine abstraction layer.
//!
//! The lifecycle manager only talks to [`ArchiveBackend`]; the concrete
//! variant is chosen once per process from the detected [`Platform`].
//! Both variants drive command-line tools (`7z`, `tar`, `diff`, `gio`,
//! `WinMergeU`) with argument vectors and check every exit status.

mod posix;
mod windows;

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, ExitStatus, Output, Stdio};

use crate::error::{ArchiveError, Result};
use crate::platform::Platform;

pub use posix::PosixBackend;
pub use windows::WindowsBackend;

/// Result of comparing an original directory with an extracted copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Identical,
    Differs,
    /// The comparison was handed to an interactive tool for the user to judge.
    Manual,
}

/// Operations the lifecycle manager needs from an archive engine.
pub trait ArchiveBackend {
    /// Platform this backend drives the engine for.
    fn platform(&self) -> Platform;

    /// Create an encrypted archive of `dir` at `archive_file`.
    fn create_archive(&self, dir: &Path, archive_file: &Path, password: &str) -> Result<()>;

    /// Extract `archive_file` into `dest_dir`, recreating the archived directory inside it.
    fn extract_archive(&self, archive_file: &Path, dest_dir: &Path, password: &str) -> Result<()>;

    /// Recursively compare two directory trees.
    fn compare_directories(&self, original: &Path, copy: &Path) -> Result<Comparison>;

    /// Move `path` to the trash, or delete it permanently where there is none.
    fn trash_or_delete(&self, path: &Path) -> Result<()>;
}

/// Select the backend for `platform`.
pub fn select_backend(platform: Platform) -> Box<dyn ArchiveBackend> {
    match platform {
        Platform::Posix => Box::new(PosixBackend::new()),
        Platform::Windows => Box::new(WindowsBackend::new()),
    }
}

/// `-p<password>` switch understood by 7-Zip.
pub(crate) fn password_switch(password: &str) -> OsString {
    OsString::from(format!("-p{password}"))
}

fn program_name(cmd: &Command) -> String {
    cmd.get_program().to_string_lossy().into_owned()
}

/// Render a command line for logs with the password switch masked.
pub(crate) fn describe(cmd: &Command, password: &str) -> String {
    let secret = password_switch(password);
    let mut parts = vec![program_name(cmd)];
    for arg in cmd.get_args() {
        if !password.is_empty() && arg == secret.as_os_str() {
            parts.push("-p***".to_string());
        } else {
            parts.push(arg.to_string_lossy().into_owned());
        }
    }
    parts.join(" ")
}

fn spawn_error(cmd: &Command, err: std::io::Error) -> ArchiveError {
    let program = program_name(cmd);
    let detail = if err.kind() == std::io::ErrorKind::NotFound {
        format!("'{program}' was not found, is it installed and on PATH?")
    } else {
        format!("could not be started: {err}")
    };
    ArchiveError::backend(program, detail)
}

fn status_error(cmd: &Command, status: ExitStatus, stderr: &[u8]) -> ArchiveError {
    let stderr = String::from_utf8_lossy(stderr);
    let stderr = stderr.trim();
    let detail = if stderr.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {stderr}")
    };
    ArchiveError::backend(program_name(cmd), detail)
}

/// Run a command to completion, capturing its output.
pub(crate) fn run(cmd: &mut Command, password: &str) -> Result<Output> {
    log::debug!("Running {}", describe(cmd, password));

    let output = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|e| spawn_error(cmd, e))?;

    if !output.status.success() {
        return Err(status_error(cmd, output.status, &output.stderr));
    }

    Ok(output)
}

/// Run a command with the terminal attached and return its exit status.
pub(crate) fn run_attached(cmd: &mut Command) -> Result<ExitStatus> {
    log::debug!("Running {}", describe(cmd, ""));
    cmd.status().map_err(|e| spawn_error(cmd, e))
}

/// Run `producer | consumer` and check both exit statuses.
pub(crate) fn run_pipeline(
    producer: &mut Command,
    consumer: &mut Command,
    password: &str,
) -> Result<()> {
    log::debug!(
        "Running {} | {}",
        describe(producer, password),
        describe(consumer, password)
    );

    let mut upstream = producer
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_error(producer, e))?;

    let Some(pipe) = upstream.stdout.take() else {
        let _ = upstream.kill();
        let _ = upstream.wait();
        return Err(ArchiveError::backend(
            program_name(producer),
            "standard output was not captured",
        ));
    };

    let spawned = consumer
        .stdin(Stdio::from(pipe))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();

    // `consumer` owns our copy of the read end; drop it so the producer sees
    // EPIPE as soon as the consumer exits.
    consumer.stdin(Stdio::null());

    let downstream = match spawned.and_then(|child| child.wait_with_output()) {
        Ok(output) => output,
        Err(e) => {
            let _ = upstream.kill();
            let _ = upstream.wait();
            return Err(spawn_error(consumer, e));
        }
    };

    let upstream_status = upstream
        .wait()
        .map_err(|e| ArchiveError::backend(program_name(producer), e.to_string()))?;

    let mut failures = Vec::new();
    if !upstream_status.success() {
        failures.push(format!("{} exited with {upstream_status}", program_name(producer)));
    }
    if !downstream.status.success() {
        let stderr = String::from_utf8_lossy(&downstream.stderr);
        let stderr = stderr.trim();
        let mut failure = format!("{} exited with {}", program_name(consumer), downstream.status);
        if !stderr.is_empty() {
            failure.push_str(&format!(": {stderr}"));
        }
        failures.push(failure);
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(ArchiveError::backend(
            format!("{} | {}", program_name(producer), program_name(consumer)),
            failures.join("; "),
        ))
    }
}
