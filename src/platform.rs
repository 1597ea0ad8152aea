//! Operating system families the archive engine is driven differently on.

use std::fmt;

use crate::error::{ArchiveError, Result};

/// Operating system family the archive engine runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// `tar` streams the directory into `7z`; removal goes through the trash.
    Posix,
    /// `7z` compresses the directory directly; removal is permanent.
    Windows,
}

impl Platform {
    /// Detect the platform of the running process.
    pub fn detect() -> Result<Self> {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value to a platform family.
    ///
    /// Only Linux counts as POSIX: removal relies on `gio trash`, which
    /// macOS and the BSDs do not ship.
    pub fn from_os_name(os: &str) -> Result<Self> {
        match os {
            "linux" => Ok(Platform::Posix),
            "windows" => Ok(Platform::Windows),
            other => Err(ArchiveError::UnsupportedPlatform(other.to_string())),
        }
    }

    /// Suffix appended to the directory name to form the archive file name.
    pub fn archive_extension(self) -> &'static str {
        match self {
            Platform::Posix => ".tar.7z",
            Platform::Windows => ".7z",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Posix => write!(f, "POSIX"),
            Platform::Windows => write!(f, "Windows"),
        }
    }
}
