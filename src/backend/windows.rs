//! Windows backend: `7z` directly on the directory, WinMerge for comparison.

use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::process::Command;

use super::{password_switch, run, run_attached, ArchiveBackend, Comparison};
use crate::error::{ArchiveError, Result};
use crate::platform::Platform;

/// Archive engine driver for Windows.
///
/// There is no trash integration, so removals are permanent.
#[derive(Debug, Default)]
pub struct WindowsBackend;

impl WindowsBackend {
    pub fn new() -> Self {
        Self
    }

    fn sevenzip_add(dir: &Path, archive_file: &Path, password: &str) -> Command {
        let mut cmd = Command::new("7z");
        cmd.args(["a", "-mhe=on"])
            .arg(password_switch(password))
            .arg(archive_file)
            .arg(dir);
        cmd
    }

    fn sevenzip_extract(archive_file: &Path, dest_dir: &Path, password: &str) -> Command {
        let mut output_switch = OsString::from("-o");
        output_switch.push(dest_dir);

        let mut cmd = Command::new("7z");
        cmd.arg("x")
            .arg(output_switch)
            .arg(password_switch(password))
            .arg(archive_file);
        cmd
    }
}

impl ArchiveBackend for WindowsBackend {
    fn platform(&self) -> Platform {
        Platform::Windows
    }

    fn create_archive(&self, dir: &Path, archive_file: &Path, password: &str) -> Result<()> {
        run(&mut Self::sevenzip_add(dir, archive_file, password), password)?;
        Ok(())
    }

    fn extract_archive(&self, archive_file: &Path, dest_dir: &Path, password: &str) -> Result<()> {
        run(&mut Self::sevenzip_extract(archive_file, dest_dir, password), password)?;
        Ok(())
    }

    fn compare_directories(&self, original: &Path, copy: &Path) -> Result<Comparison> {
        let mut cmd = Command::new("WinMergeU");
        cmd.arg("/r").arg(original).arg(copy);

        let status = run_attached(&mut cmd)?;
        if status.success() {
            Ok(Comparison::Manual)
        } else {
            Err(ArchiveError::backend("WinMergeU", status.to_string()))
        }
    }

    fn trash_or_delete(&self, path: &Path) -> Result<()> {
        log::debug!("Permanently deleting {}", path.display());
        let removed = if path.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        removed.map_err(|e| ArchiveError::io(path, e))
    }
}
