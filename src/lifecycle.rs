//! Archive lifecycle operations.
//!
//! Every operation checks all of its preconditions before it touches the
//! filesystem or calls the backend. The lifecycle state of a directory is
//! never stored; it is observed from which paths exist when the operation
//! runs. Two invocations working on the same directory at the same time are
//! not coordinated and must be avoided by the user.

use colored::Colorize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::{ArchiveBackend, Comparison};
use crate::error::{ArchiveError, Result};
use crate::platform::Platform;
use crate::prompt::Prompter;
use crate::record::DirectoryRecord;

/// Commands accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Operation {
    /// Create the encrypted archive of a directory
    #[value(name = "archive")]
    Archive,
    /// Extract the archive to the scratch directory and compare it with the original
    #[value(name = "verify")]
    Verify,
    /// Remove the copy extracted by `verify`
    #[value(name = "clean")]
    Clean,
    /// Trash (or delete) a directory that has been archived
    #[value(name = "remove_dir")]
    RemoveDir,
    /// Trash (or delete) the archive of a directory
    #[value(name = "remove_archive")]
    RemoveArchive,
    /// Extract an archive back to its original location
    #[value(name = "restore")]
    Restore,
    /// Show whether a directory is archived
    #[value(name = "status")]
    Status,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Archive => "archive",
            Operation::Verify => "verify",
            Operation::Clean => "clean",
            Operation::RemoveDir => "remove_dir",
            Operation::RemoveArchive => "remove_archive",
            Operation::Restore => "restore",
            Operation::Status => "status",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which of the directory and its archive currently exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Unarchived,
    Archived,
    ArchivedNoDir,
    /// Neither the directory nor an archive exists.
    Untracked,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Stage::Unarchived => "not archived",
            Stage::Archived => "archived, directory still present",
            Stage::ArchivedNoDir => "archived, directory removed",
            Stage::Untracked => "neither directory nor archive exists",
        };
        f.write_str(text)
    }
}

/// Observed lifecycle state of one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleState {
    pub stage: Stage,
    pub archive_file: PathBuf,
    /// Copy left in the scratch directory by a previous `verify`.
    pub extracted_copy: Option<PathBuf>,
}

impl LifecycleState {
    pub fn observe(record: &DirectoryRecord, tmp_dir: &Path) -> Self {
        let dir_exists = record.source_path().exists();
        let archive_exists = record.archive_file_path().exists();

        let stage = match (dir_exists, archive_exists) {
            (true, false) => Stage::Unarchived,
            (true, true) => Stage::Archived,
            (false, true) => Stage::ArchivedNoDir,
            (false, false) => Stage::Untracked,
        };

        let extracted = tmp_dir.join(record.name());
        LifecycleState {
            stage,
            archive_file: record.archive_file_path().to_path_buf(),
            extracted_copy: extracted.exists().then_some(extracted),
        }
    }
}

/// What a successful operation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Archived { archive_file: PathBuf },
    Verified { comparison: Comparison, extracted: PathBuf },
    /// `removed` is `None` when there was nothing to clean.
    Cleaned { removed: Option<PathBuf> },
    Removed { path: PathBuf },
    /// The user did not confirm; nothing was changed.
    Declined { path: PathBuf },
    Restored { path: PathBuf },
    Status(LifecycleState),
}

/// Runs lifecycle operations against one backend.
pub struct ArchiveLifecycleManager<'a> {
    backend: &'a dyn ArchiveBackend,
    prompter: &'a dyn Prompter,
    password: &'a str,
    tmp_dir: PathBuf,
}

impl<'a> ArchiveLifecycleManager<'a> {
    pub fn new(
        backend: &'a dyn ArchiveBackend,
        prompter: &'a dyn Prompter,
        password: &'a str,
        tmp_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            backend,
            prompter,
            password,
            tmp_dir: tmp_dir.into(),
        }
    }

    /// Scratch location `verify` extracts `record` into.
    pub fn extracted_path(&self, record: &DirectoryRecord) -> PathBuf {
        self.tmp_dir.join(record.name())
    }

    pub fn run(&self, operation: Operation, record: &DirectoryRecord) -> Result<Outcome> {
        log::info!("{} {}", operation, record.source_path().display());
        match operation {
            Operation::Archive => self.archive(record),
            Operation::Verify => self.verify(record),
            Operation::Clean => self.clean(record),
            Operation::RemoveDir => self.remove_dir(record),
            Operation::RemoveArchive => self.remove_archive(record),
            Operation::Restore => self.restore(record),
            Operation::Status => Ok(Outcome::Status(LifecycleState::observe(
                record,
                &self.tmp_dir,
            ))),
        }
    }

    pub fn archive(&self, record: &DirectoryRecord) -> Result<Outcome> {
        require_dir(record.source_path())?;
        let archive_file = record.archive_file_path();
        if archive_file.exists() {
            return Err(ArchiveError::precondition(archive_file, "archive file already exists"));
        }

        let specific = record.specific_archive_path();
        fs::create_dir_all(specific).map_err(|e| ArchiveError::io(specific, e))?;

        println!(
            "{} {}",
            "Creating encrypted archive".cyan(),
            archive_file.display()
        );
        if let Err(err) = self
            .backend
            .create_archive(record.source_path(), archive_file, self.password)
        {
            if archive_file.exists() {
                log::warn!(
                    "Archiving failed, a partial archive may remain at {}",
                    archive_file.display()
                );
            }
            return Err(err);
        }

        if !archive_file.is_file() {
            return Err(ArchiveError::backend(
                "archive engine",
                format!("reported success but {} was not created", archive_file.display()),
            ));
        }

        Ok(Outcome::Archived {
            archive_file: archive_file.to_path_buf(),
        })
    }

    pub fn verify(&self, record: &DirectoryRecord) -> Result<Outcome> {
        require_dir(record.source_path())?;
        require_archive(record)?;

        let extracted = self.extracted_path(record);
        if extracted.exists() {
            return Err(ArchiveError::precondition(
                &extracted,
                format!(
                    "an extracted copy from an earlier verify is still present, run `archive-dir clean {}` first",
                    record.source_path().display()
                ),
            ));
        }

        fs::create_dir_all(&self.tmp_dir).map_err(|e| ArchiveError::io(&self.tmp_dir, e))?;

        println!("{}", "Extracting archive file...".cyan());
        self.backend
            .extract_archive(record.archive_file_path(), &self.tmp_dir, self.password)?;

        if !extracted.is_dir() {
            return Err(ArchiveError::backend(
                "archive engine",
                format!(
                    "{} did not contain a directory named '{}'",
                    record.archive_file_path().display(),
                    record.name().to_string_lossy()
                ),
            ));
        }

        println!("{}", "Comparing original and archived directories...".cyan());
        let comparison = self
            .backend
            .compare_directories(record.source_path(), &extracted)?;

        if comparison == Comparison::Differs {
            return Err(ArchiveError::VerificationMismatch {
                original: record.source_path().to_path_buf(),
                extracted,
            });
        }

        Ok(Outcome::Verified {
            comparison,
            extracted,
        })
    }

    pub fn clean(&self, record: &DirectoryRecord) -> Result<Outcome> {
        let extracted = self.extracted_path(record);
        if !extracted.exists() {
            log::debug!("Nothing to clean at {}", extracted.display());
            return Ok(Outcome::Cleaned { removed: None });
        }

        println!("{}", "Removing temporary extracted archive...".cyan());
        let removed = if extracted.is_dir() {
            fs::remove_dir_all(&extracted)
        } else {
            fs::remove_file(&extracted)
        };
        removed.map_err(|e| ArchiveError::io(&extracted, e))?;

        Ok(Outcome::Cleaned {
            removed: Some(extracted),
        })
    }

    pub fn remove_dir(&self, record: &DirectoryRecord) -> Result<Outcome> {
        require_dir(record.source_path())?;
        require_archive(record)?;
        self.confirmed_removal(record.source_path(), "archived directory")
    }

    /// Removing an archive requires the original directory to still exist,
    /// so the last remaining copy is never removed by this command.
    pub fn remove_archive(&self, record: &DirectoryRecord) -> Result<Outcome> {
        require_dir(record.source_path())?;
        require_archive(record)?;
        self.confirmed_removal(record.archive_file_path(), "archive file")
    }

    pub fn restore(&self, record: &DirectoryRecord) -> Result<Outcome> {
        require_archive(record)?;
        let source = record.source_path();
        if source.exists() {
            return Err(ArchiveError::precondition(source, "directory already exists"));
        }

        let parent = source.parent().ok_or_else(|| ArchiveError::Path {
            path: source.to_path_buf(),
            reason: "path has no parent directory".to_string(),
        })?;
        fs::create_dir_all(parent).map_err(|e| ArchiveError::io(parent, e))?;

        println!(
            "{} {}",
            "Restoring archive into".cyan(),
            parent.display()
        );
        self.backend
            .extract_archive(record.archive_file_path(), parent, self.password)?;

        if !source.is_dir() {
            return Err(ArchiveError::backend(
                "archive engine",
                format!(
                    "extraction finished but {} was not recreated",
                    source.display()
                ),
            ));
        }

        Ok(Outcome::Restored {
            path: source.to_path_buf(),
        })
    }

    fn confirmed_removal(&self, path: &Path, what: &str) -> Result<Outcome> {
        let question = match self.backend.platform() {
            Platform::Posix => format!("Move {what} {} to the trash?", path.display()),
            Platform::Windows => format!("Permanently delete {what} {}?", path.display()),
        };

        if !self.prompter.confirm(&question)? {
            log::info!("Removal of {} declined", path.display());
            return Ok(Outcome::Declined {
                path: path.to_path_buf(),
            });
        }

        self.backend.trash_or_delete(path)?;
        Ok(Outcome::Removed {
            path: path.to_path_buf(),
        })
    }
}

fn require_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else if path.exists() {
        Err(ArchiveError::precondition(path, "not a directory"))
    } else {
        Err(ArchiveError::precondition(path, "directory does not exist"))
    }
}

fn require_archive(record: &DirectoryRecord) -> Result<()> {
    let archive_file = record.archive_file_path();
    if archive_file.exists() {
        Ok(())
    } else {
        Err(ArchiveError::precondition(archive_file, "archive file does not exist"))
    }
}
