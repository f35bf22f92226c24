use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::store::Backend;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: Backend,
    pub json_path: PathBuf,
    pub sqlite_path: PathBuf,
    /// Fail instead of starting over when the JSON file is unreadable
    pub strict: bool,
}

impl StorageConfig {
    /// Path of the file the selected backend reads and writes.
    pub fn data_path(&self) -> &Path {
        match self.backend {
            Backend::Json => &self.json_path,
            Backend::Sqlite => &self.sqlite_path,
        }
    }

    /// Point the selected backend at a different file.
    pub fn set_data_path(&mut self, path: PathBuf) {
        match self.backend {
            Backend::Json => self.json_path = path,
            Backend::Sqlite => self.sqlite_path = path,
        }
    }
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(env!("CARGO_PKG_NAME"))
}

impl Default for StorageConfig {
    fn default() -> Self {
        let dir = data_dir();
        Self {
            backend: Backend::default(),
            json_path: dir.join("tasks.json"),
            sqlite_path: dir.join("tasks.db"),
            strict: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("warn".to_string()),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_name = env!("CARGO_PKG_NAME");

        // Try project config: ./<project>.yml
        let local_config = PathBuf::from(format!("{}.yml", project_name));
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {:#}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {:#}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::debug!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.log_level.as_deref(), Some("warn"));
        assert_eq!(config.storage.backend, Backend::Json);
        assert!(!config.storage.strict);
        assert!(config.storage.json_path.ends_with("tasktrack/tasks.json"));
        assert!(config.storage.sqlite_path.ends_with("tasktrack/tasks.db"));
    }

    #[test]
    fn test_load_from_file_partial() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasktrack.yml");
        fs::write(&path, "storage:\n  backend: sqlite\n  sqlite_path: /tmp/x.db\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.storage.backend, Backend::Sqlite);
        assert_eq!(config.storage.sqlite_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.storage.data_path(), Path::new("/tmp/x.db"));
        assert_eq!(config.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_rejects_unknown_backend() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.yml");
        fs::write(&path, "storage:\n  backend: postgres\n").unwrap();
        assert!(Config::load_from_file(&path).is_err());
    }

    #[test]
    fn test_set_data_path_follows_backend() {
        let mut storage = StorageConfig::default();
        storage.set_data_path(PathBuf::from("a.json"));
        assert_eq!(storage.json_path, PathBuf::from("a.json"));

        storage.backend = Backend::Sqlite;
        storage.set_data_path(PathBuf::from("b.db"));
        assert_eq!(storage.sqlite_path, PathBuf::from("b.db"));
        assert_eq!(storage.json_path, PathBuf::from("a.json"));
    }
}
