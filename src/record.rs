//! Derivation of archive locations from a source directory.
//!
//! Archives mirror the layout of the home directory under the configured
//! archive root: `~/Projects/app` is stored as
//! `<archive root>/Projects/app.tar.7z` on POSIX systems.

use std::path::{Component, Path, PathBuf};

use crate::error::{ArchiveError, Result};
use crate::platform::Platform;

/// A directory together with the archive paths derived from it.
///
/// Built once per invocation by [`resolve`] and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRecord {
    source_path: PathBuf,
    archive_base_path: PathBuf,
    specific_archive_path: PathBuf,
    archive_file_path: PathBuf,
}

impl DirectoryRecord {
    /// The directory being archived or restored.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn archive_base_path(&self) -> &Path {
        &self.archive_base_path
    }

    /// Directory under the archive root that holds this directory's archive.
    pub fn specific_archive_path(&self) -> &Path {
        &self.specific_archive_path
    }

    pub fn archive_file_path(&self) -> &Path {
        &self.archive_file_path
    }

    /// Final segment of the source path.
    pub fn name(&self) -> &std::ffi::OsStr {
        // resolve() rejects paths without a final segment
        self.source_path.file_name().unwrap_or_default()
    }
}

/// Derive the archive location of `source_path`.
///
/// Pure: the result depends only on the arguments.
pub fn resolve(
    source_path: &Path,
    archive_base_path: &Path,
    home_path: &Path,
    platform: Platform,
) -> Result<DirectoryRecord> {
    if !source_path.is_absolute() {
        return Err(path_error(source_path, "path must be absolute"));
    }

    let source = normalize(source_path);
    let home = normalize(home_path);

    let name = source
        .file_name()
        .ok_or_else(|| path_error(&source, "path has no final component"))?
        .to_os_string();

    if source == home {
        return Err(path_error(&source, "the home directory itself cannot be archived"));
    }

    let relative_parent = source
        .parent()
        .and_then(|parent| parent.strip_prefix(&home).ok())
        .ok_or_else(|| {
            path_error(
                &source,
                &format!("path must be inside the home directory {}", home.display()),
            )
        })?;

    let archive_base_path = normalize(archive_base_path);
    let specific_archive_path = archive_base_path.join(relative_parent);

    let mut file_name = name;
    file_name.push(platform.archive_extension());
    let archive_file_path = specific_archive_path.join(file_name);

    Ok(DirectoryRecord {
        source_path: source,
        archive_base_path,
        specific_archive_path,
        archive_file_path,
    })
}

/// Turn user input into an absolute, normalized path.
///
/// A leading `~` is replaced with `home`; relative paths are joined to `cwd`.
pub fn expand_path(raw: &Path, home: &Path, cwd: &Path) -> PathBuf {
    let mut components = raw.components();
    let expanded = match components.next() {
        Some(Component::Normal(first)) if first == "~" => home.join(components.as_path()),
        _ => raw.to_path_buf(),
    };

    if expanded.is_absolute() {
        normalize(&expanded)
    } else {
        normalize(&cwd.join(expanded))
    }
}

/// Fold `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // never pop past the root or a prefix
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn path_error(path: &Path, reason: &str) -> ArchiveError {
    ArchiveError::Path {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn alice() -> (PathBuf, PathBuf) {
        (PathBuf::from("/home/alice"), PathBuf::from("/home/alice/Backups"))
    }

    #[test]
    fn test_posix_archive_path() {
        let (home, base) = alice();
        let record = resolve(
            Path::new("/home/alice/Projects/app"),
            &base,
            &home,
            Platform::Posix,
        )
        .unwrap();

        assert_eq!(record.specific_archive_path(), Path::new("/home/alice/Backups/Projects"));
        assert_eq!(
            record.archive_file_path(),
            Path::new("/home/alice/Backups/Projects/app.tar.7z")
        );
        assert_eq!(record.name(), "app");
    }

    #[test]
    fn test_windows_archive_suffix() {
        let (home, base) = alice();
        let record = resolve(
            Path::new("/home/alice/Projects/app"),
            &base,
            &home,
            Platform::Windows,
        )
        .unwrap();

        assert_eq!(
            record.archive_file_path(),
            Path::new("/home/alice/Backups/Projects/app.7z")
        );
    }

    #[test]
    fn test_direct_child_of_home() {
        let (home, base) = alice();
        let record = resolve(Path::new("/home/alice/Music"), &base, &home, Platform::Posix).unwrap();
        assert_eq!(record.specific_archive_path(), base.as_path());
        assert_eq!(record.archive_file_path(), Path::new("/home/alice/Backups/Music.tar.7z"));
    }

    #[rstest]
    #[case::posix(Platform::Posix)]
    #[case::windows(Platform::Windows)]
    fn test_resolution_is_deterministic(#[case] platform: Platform) {
        let (home, base) = alice();
        let source = Path::new("/home/alice/Projects/app");

        let first = resolve(source, &base, &home, platform).unwrap();
        let second = resolve(source, &base, &home, platform).unwrap();
        assert_eq!(first, second);
    }

    #[rstest]
    #[case::posix(Platform::Posix)]
    #[case::windows(Platform::Windows)]
    fn test_siblings_do_not_collide(#[case] platform: Platform) {
        let (home, base) = alice();
        let app = resolve(Path::new("/home/alice/Projects/app"), &base, &home, platform).unwrap();
        let lib = resolve(Path::new("/home/alice/Projects/lib"), &base, &home, platform).unwrap();

        assert_eq!(app.specific_archive_path(), lib.specific_archive_path());
        assert_ne!(app.archive_file_path(), lib.archive_file_path());
    }

    #[test]
    fn test_relative_source_rejected() {
        let (home, base) = alice();
        let err = resolve(Path::new("Projects/app"), &base, &home, Platform::Posix).unwrap_err();
        assert!(matches!(err, ArchiveError::Path { .. }));
    }

    #[rstest]
    #[case::outside_home("/srv/data")]
    #[case::home_itself("/home/alice")]
    #[case::sibling_home("/home/bob/Projects")]
    #[case::escapes_with_dotdot("/home/alice/../bob/Projects")]
    #[case::root("/")]
    fn test_paths_outside_home_rejected(#[case] source: &str) {
        let (home, base) = alice();
        let err = resolve(Path::new(source), &base, &home, Platform::Posix).unwrap_err();
        assert!(matches!(err, ArchiveError::Path { .. }), "{source}: {err}");
    }

    #[test]
    fn test_dot_components_are_folded() {
        let (home, base) = alice();
        let record = resolve(
            Path::new("/home/alice/Projects/./old/../app/"),
            &base,
            &home,
            Platform::Posix,
        )
        .unwrap();
        assert_eq!(record.source_path(), Path::new("/home/alice/Projects/app"));
        assert_eq!(
            record.archive_file_path(),
            Path::new("/home/alice/Backups/Projects/app.tar.7z")
        );
    }

    #[test]
    fn test_expand_tilde() {
        let home = Path::new("/home/alice");
        let cwd = Path::new("/tmp");
        assert_eq!(
            expand_path(Path::new("~/Projects/app"), home, cwd),
            PathBuf::from("/home/alice/Projects/app")
        );
        assert_eq!(expand_path(Path::new("~"), home, cwd), PathBuf::from("/home/alice"));
    }

    #[test]
    fn test_expand_relative_uses_cwd() {
        let home = Path::new("/home/alice");
        let cwd = Path::new("/home/alice/Projects");
        assert_eq!(
            expand_path(Path::new("app"), home, cwd),
            PathBuf::from("/home/alice/Projects/app")
        );
        assert_eq!(
            expand_path(Path::new("../Music"), home, cwd),
            PathBuf::from("/home/alice/Music")
        );
    }

    #[test]
    fn test_expand_absolute_is_kept() {
        let home = Path::new("/home/alice");
        let cwd = Path::new("/tmp");
        assert_eq!(
            expand_path(Path::new("/home/alice/Projects/app"), home, cwd),
            PathBuf::from("/home/alice/Projects/app")
        );
    }

    #[test]
    fn test_normalize_does_not_climb_past_root() {
        assert_eq!(normalize(Path::new("/../etc")), PathBuf::from("/etc"));
    }
}
