// ⚙️ Configuration for the command-line front end
//
// Resolution order, later wins:
//   defaults → <config dir>/recurria/config.json → RECURRIA_DB → --db flag

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::recurrence::DEFAULT_UPCOMING_LIMIT;

pub const APP_DIR: &str = "recurria";
pub const DB_FILE: &str = "recurria.db";
pub const CONFIG_FILE: &str = "config.json";
pub const DB_ENV_VAR: &str = "RECURRIA_DB";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_path: PathBuf,
    /// Insert the demo subscriptions into an empty database on start
    pub seed_on_first_run: bool,
    pub upcoming_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: default_database_path(),
            seed_on_first_run: true,
            upcoming_limit: DEFAULT_UPCOMING_LIMIT,
        }
    }
}

fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(DB_FILE)
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

impl Config {
    /// Read a JSON config file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Defaults, then the config file if present, then environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match default_config_path() {
            Some(path) if path.exists() => Config::from_file(&path)?,
            _ => Config::default(),
        };
        config.apply_env(std::env::var_os(DB_ENV_VAR).map(PathBuf::from));
        Ok(config)
    }

    fn apply_env(&mut self, database_override: Option<PathBuf>) {
        if let Some(path) = database_override {
            self.database_path = path;
        }
    }

    pub fn with_database_path(mut self, path: PathBuf) -> Self {
        self.database_path = path;
        self
    }

    /// Create the database's parent directory if needed
    pub fn ensure_database_dir(&self) -> Result<()> {
        if let Some(parent) = self.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.seed_on_first_run);
        assert_eq!(config.upcoming_limit, 10);
        assert!(config.database_path.ends_with("recurria/recurria.db"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "upcoming_limit": 3 }"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.upcoming_limit, 3);
        assert!(config.seed_on_first_run);
    }

    #[test]
    fn test_bad_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_env_and_flag_overrides() {
        let mut config = Config::default();
        config.apply_env(Some(PathBuf::from("/tmp/env.db")));
        assert_eq!(config.database_path, PathBuf::from("/tmp/env.db"));

        config.apply_env(None);
        assert_eq!(config.database_path, PathBuf::from("/tmp/env.db"));

        let config = config.with_database_path(PathBuf::from("flag.db"));
        assert_eq!(config.database_path, PathBuf::from("flag.db"));
    }

    #[test]
    fn test_ensure_database_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default().with_database_path(dir.path().join("nested/deeper/x.db"));
        config.ensure_database_dir().unwrap();
        assert!(dir.path().join("nested/deeper").is_dir());
    }
}
