//! Shared fixtures: an in-memory archive engine and a scripted prompter.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use archive_dir::backend::{ArchiveBackend, Comparison};
use archive_dir::platform::Platform;
use archive_dir::prompt::{is_affirmative, Prompter};
use archive_dir::record::{resolve, DirectoryRecord};
use archive_dir::{ArchiveError, Result};
use walkdir::WalkDir;

/// One entry of a directory tree: relative path and file contents (`None` for directories).
pub type Entry = (PathBuf, Option<Vec<u8>>);

/// Snapshot every entry below `root`, with paths relative to `base`.
pub fn entries(base: &Path, root: &Path) -> Vec<Entry> {
    let mut out: Vec<Entry> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| entry.unwrap())
        .map(|entry| {
            let relative = entry.path().strip_prefix(base).unwrap().to_path_buf();
            let contents = if entry.file_type().is_file() {
                Some(fs::read(entry.path()).unwrap())
            } else {
                None
            };
            (relative, contents)
        })
        .collect();
    out.sort();
    out
}

/// Snapshot of a tree relative to its own root.
pub fn tree(root: &Path) -> Vec<Entry> {
    entries(root, root)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create { dir: PathBuf, archive_file: PathBuf, password: String },
    Extract { archive_file: PathBuf, dest_dir: PathBuf, password: String },
    Compare { original: PathBuf, copy: PathBuf },
    TrashOrDelete { path: PathBuf },
}

/// Archive engine that keeps archive contents in memory.
///
/// The archive file on disk only holds a marker so existence checks work.
pub struct FakeBackend {
    pub platform: Platform,
    pub calls: RefCell<Vec<Call>>,
    archives: RefCell<HashMap<PathBuf, Vec<Entry>>>,
    /// Write a truncated archive and fail.
    pub fail_create: bool,
    /// Report success without writing anything.
    pub silent_create: bool,
    /// Hand comparisons to the user, like the WinMerge review.
    pub manual_compare: bool,
}

impl FakeBackend {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            calls: RefCell::new(Vec::new()),
            archives: RefCell::new(HashMap::new()),
            fail_create: false,
            silent_create: false,
            manual_compare: false,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }
}

impl ArchiveBackend for FakeBackend {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn create_archive(&self, dir: &Path, archive_file: &Path, password: &str) -> Result<()> {
        self.calls.borrow_mut().push(Call::Create {
            dir: dir.to_path_buf(),
            archive_file: archive_file.to_path_buf(),
            password: password.to_string(),
        });

        if self.silent_create {
            return Ok(());
        }
        if self.fail_create {
            fs::write(archive_file, b"trunc").unwrap();
            return Err(ArchiveError::backend("7z", "No space left on device"));
        }

        let parent = dir.parent().unwrap();
        self.archives
            .borrow_mut()
            .insert(archive_file.to_path_buf(), entries(parent, dir));
        fs::write(archive_file, format!("fake archive of {}", dir.display())).unwrap();
        Ok(())
    }

    fn extract_archive(&self, archive_file: &Path, dest_dir: &Path, password: &str) -> Result<()> {
        self.calls.borrow_mut().push(Call::Extract {
            archive_file: archive_file.to_path_buf(),
            dest_dir: dest_dir.to_path_buf(),
            password: password.to_string(),
        });

        let archives = self.archives.borrow();
        let contents = archives
            .get(archive_file)
            .ok_or_else(|| ArchiveError::backend("7z", "Can not open the file as archive"))?;

        for (relative, data) in contents {
            let target = dest_dir.join(relative);
            match data {
                Some(bytes) => fs::write(&target, bytes).unwrap(),
                None => fs::create_dir_all(&target).unwrap(),
            }
        }
        Ok(())
    }

    fn compare_directories(&self, original: &Path, copy: &Path) -> Result<Comparison> {
        self.calls.borrow_mut().push(Call::Compare {
            original: original.to_path_buf(),
            copy: copy.to_path_buf(),
        });

        if self.manual_compare {
            Ok(Comparison::Manual)
        } else if tree(original) == tree(copy) {
            Ok(Comparison::Identical)
        } else {
            Ok(Comparison::Differs)
        }
    }

    fn trash_or_delete(&self, path: &Path) -> Result<()> {
        self.calls.borrow_mut().push(Call::TrashOrDelete {
            path: path.to_path_buf(),
        });

        if path.is_dir() {
            fs::remove_dir_all(path).unwrap();
        } else {
            fs::remove_file(path).unwrap();
        }
        Ok(())
    }
}

/// Answers every confirmation with the same text and records the questions.
pub struct ScriptedPrompter {
    answer: String,
    pub questions: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            questions: RefCell::new(Vec::new()),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, question: &str) -> Result<bool> {
        self.questions.borrow_mut().push(question.to_string());
        Ok(is_affirmative(&self.answer))
    }
}

/// Fake home directory containing `Projects/app` with a few files.
pub struct Workspace {
    pub home: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let home = tempfile::TempDir::new().unwrap();
        let app = home.path().join("Projects/app");
        fs::create_dir_all(app.join("src")).unwrap();
        fs::create_dir_all(app.join("empty")).unwrap();
        fs::write(app.join("README.md"), "# app\n").unwrap();
        fs::write(app.join("src/main.rs"), "fn main() {}\n").unwrap();
        fs::write(app.join("src/data.bin"), [0u8, 159, 146, 150]).unwrap();
        Self { home }
    }

    pub fn home(&self) -> &Path {
        self.home.path()
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.home().join(".archive-dir/tmp")
    }

    pub fn record(&self, platform: Platform) -> DirectoryRecord {
        self.record_for("Projects/app", platform)
    }

    pub fn record_for(&self, relative: &str, platform: Platform) -> DirectoryRecord {
        resolve(
            &self.home().join(relative),
            &self.home().join("Backups"),
            self.home(),
            platform,
        )
        .unwrap()
    }
}
