//! POSIX backend: `tar` streamed through `7z`, `diff -r` and `gio trash`.

use std::path::Path;
use std::process::Command;

use super::{password_switch, run, run_attached, run_pipeline, ArchiveBackend, Comparison};
use crate::error::{ArchiveError, Result};
use crate::platform::Platform;

/// Archive engine driver for Linux.
///
/// Removal needs `gio` from GLib on `PATH`.
#[derive(Debug, Default)]
pub struct PosixBackend;

impl PosixBackend {
    pub fn new() -> Self {
        Self
    }

    /// `tar -cf - -C <parent> <name>` so entries are stored relative to the parent.
    fn tar_create(dir: &Path) -> Result<Command> {
        let (parent, name) = match (dir.parent(), dir.file_name()) {
            (Some(parent), Some(name)) => (parent, name),
            _ => {
                return Err(ArchiveError::Path {
                    path: dir.to_path_buf(),
                    reason: "cannot archive a path without a parent directory".to_string(),
                })
            }
        };

        let mut cmd = Command::new("tar");
        cmd.args(["-cf", "-", "-C"]).arg(parent).arg(name);
        Ok(cmd)
    }

    fn sevenzip_add_stdin(archive_file: &Path, password: &str) -> Command {
        let mut cmd = Command::new("7z");
        cmd.args(["a", "-si", "-mhe=on"])
            .arg(password_switch(password))
            .arg(archive_file);
        cmd
    }

    fn sevenzip_extract_stdout(archive_file: &Path, password: &str) -> Command {
        let mut cmd = Command::new("7z");
        cmd.args(["x", "-so"])
            .arg(password_switch(password))
            .arg(archive_file);
        cmd
    }

    fn tar_extract(dest_dir: &Path) -> Command {
        let mut cmd = Command::new("tar");
        cmd.args(["-xf", "-", "-C"]).arg(dest_dir);
        cmd
    }
}

impl ArchiveBackend for PosixBackend {
    fn platform(&self) -> Platform {
        Platform::Posix
    }

    fn create_archive(&self, dir: &Path, archive_file: &Path, password: &str) -> Result<()> {
        let mut tar = Self::tar_create(dir)?;
        let mut sevenzip = Self::sevenzip_add_stdin(archive_file, password);
        run_pipeline(&mut tar, &mut sevenzip, password)
    }

    fn extract_archive(&self, archive_file: &Path, dest_dir: &Path, password: &str) -> Result<()> {
        let mut sevenzip = Self::sevenzip_extract_stdout(archive_file, password);
        let mut tar = Self::tar_extract(dest_dir);
        run_pipeline(&mut sevenzip, &mut tar, password)
    }

    fn compare_directories(&self, original: &Path, copy: &Path) -> Result<Comparison> {
        let mut cmd = Command::new("diff");
        cmd.arg("-r").arg(original).arg(copy);

        // diff prints the differences itself; the exit code carries the verdict
        let status = run_attached(&mut cmd)?;
        match status.code() {
            Some(0) => Ok(Comparison::Identical),
            Some(1) => Ok(Comparison::Differs),
            _ => Err(ArchiveError::backend("diff", status.to_string())),
        }
    }

    fn trash_or_delete(&self, path: &Path) -> Result<()> {
        let mut cmd = Command::new("gio");
        cmd.arg("trash").arg(path);
        run(&mut cmd, "")?;
        Ok(())
    }
}
