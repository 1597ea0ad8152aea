//! Process files under `~/.archive-dir` and the `config.toml` settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ArchiveError, Result};
use crate::record::expand_path;

const DATA_DIR_NAME: &str = ".archive-dir";

/// Locations of the process's working files under `~/.archive-dir`.
pub struct ConfigManager;

impl ConfigManager {
    /// Home directory of the current user.
    pub fn home_dir() -> Result<PathBuf> {
        dirs::home_dir().ok_or_else(|| ArchiveError::Config {
            path: PathBuf::from("~"),
            message: "could not determine the home directory".to_string(),
        })
    }

    /// `~/.archive-dir`
    pub fn data_dir_in(home: &Path) -> PathBuf {
        home.join(DATA_DIR_NAME)
    }

    /// Get the config file path (config.toml)
    pub fn config_file_path_in(home: &Path) -> PathBuf {
        Self::data_dir_in(home).join("config.toml")
    }

    /// Scratch directory used by `verify` for extracted archives.
    pub fn tmp_dir_in(home: &Path) -> PathBuf {
        Self::data_dir_in(home).join("tmp")
    }

    /// Get the log file path
    pub fn log_file_path() -> Result<PathBuf> {
        Ok(Self::log_file_path_in(&Self::home_dir()?))
    }

    pub fn log_file_path_in(home: &Path) -> PathBuf {
        Self::data_dir_in(home).join("archive-dir.log")
    }

    /// Ensure the data directory and its `tmp/` subdirectory exist.
    pub fn ensure_dirs_in(home: &Path) -> Result<PathBuf> {
        let tmp_dir = Self::tmp_dir_in(home);
        fs::create_dir_all(&tmp_dir).map_err(|e| ArchiveError::io(&tmp_dir, e))?;
        Ok(Self::data_dir_in(home))
    }
}

/// Contents of `config.toml`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Root directory under which archives are stored
    #[serde(default)]
    pub archive_base_path: String,

    /// Password handed to 7-Zip for header and content encryption
    #[serde(default)]
    pub archive_password: String,
}

impl fmt::Debug for ArchiveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveConfig")
            .field("archive_base_path", &self.archive_base_path)
            .field("archive_password", &"<redacted>")
            .finish()
    }
}

/// Validated configuration handed to the lifecycle manager.
#[derive(Clone)]
pub struct Settings {
    pub archive_base_path: PathBuf,
    pub archive_password: String,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("archive_base_path", &self.archive_base_path)
            .field("archive_password", &"<redacted>")
            .finish()
    }
}

impl ArchiveConfig {
    /// Read the config file, creating it with blank values if it is missing.
    ///
    /// A freshly created file is still rejected by validation, so the user
    /// is pointed at it on first run.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("Creating blank configuration at {}", path.display());
            Self::default().save(path)?;
        }

        let content = fs::read_to_string(path).map_err(|e| ArchiveError::io(path, e))?;

        toml::from_str(&content).map_err(|e| ArchiveError::Config {
            path: path.to_path_buf(),
            message: format!("failed to parse: {e}"),
        })
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ArchiveError::io(parent, e))?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| ArchiveError::Config {
            path: path.to_path_buf(),
            message: format!("failed to serialize: {e}"),
        })?;

        fs::write(path, content).map_err(|e| ArchiveError::io(path, e))
    }

    /// Check that no value is blank and expand the archive base path.
    ///
    /// `source` is only used to name the file in error messages.
    pub fn validate(&self, source: &Path, home: &Path, cwd: &Path) -> Result<Settings> {
        let blank = |key: &str| ArchiveError::Config {
            path: source.to_path_buf(),
            message: format!("{key} must not be blank, please fill it in"),
        };

        if self.archive_base_path.trim().is_empty() {
            return Err(blank("archive_base_path"));
        }
        if self.archive_password.is_empty() {
            return Err(blank("archive_password"));
        }

        let raw = Path::new(self.archive_base_path.trim());
        if !raw.is_absolute() && !raw.starts_with("~") {
            return Err(ArchiveError::Config {
                path: source.to_path_buf(),
                message: format!(
                    "archive_base_path must be absolute, got '{}'",
                    self.archive_base_path
                ),
            });
        }

        Ok(Settings {
            archive_base_path: expand_path(raw, home, cwd),
            archive_password: self.archive_password.clone(),
        })
    }
}

/// Load and validate the configuration file at `path`.
pub fn load_settings(path: &Path, home: &Path, cwd: &Path) -> Result<Settings> {
    ArchiveConfig::load_or_init(path)?.validate(path, home, cwd)
}
