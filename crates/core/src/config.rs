//! Application configuration
//!
//! Loaded from a TOML file with every field optional; missing fields fall
//! back to defaults. The `TESSERA_DB` environment variable overrides the
//! database path regardless of the file.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_SESSION_HOURS: i64 = 24 * 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Path to the SQLite database. `None` means the platform data dir.
    pub database_path: Option<PathBuf>,
    /// Base URL used when rendering verification and reset links
    pub base_url: String,
    /// Login session lifetime in hours
    pub session_hours: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            session_hours: DEFAULT_SESSION_HOURS,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, or defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Invalid config file: {e}")))?
        } else {
            Self::default()
        };

        if let Ok(db) = std::env::var("TESSERA_DB") {
            if !db.is_empty() {
                config.database_path = Some(PathBuf::from(db));
            }
        }

        Ok(config)
    }

    /// Resolve the database path, creating the data directory if needed
    pub fn resolve_database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent)?;
                    }
                }
                Ok(path.clone())
            }
            None => {
                let dir = default_data_dir()?;
                fs::create_dir_all(&dir)?;
                Ok(dir.join("tessera.db"))
            }
        }
    }
}

/// Platform data directory for the application
fn default_data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("org", "tessera", "tessera").ok_or_else(|| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine data directory",
        ))
    })?;

    Ok(dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_file_missing() {
        let config = AppConfig::load(Path::new("/nonexistent/tessera.toml")).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.session_hours, DEFAULT_SESSION_HOURS);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tessera.toml");
        fs::write(&path, "base_url = \"https://kizuna.example.org\"\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.base_url, "https://kizuna.example.org");
        assert_eq!(config.session_hours, DEFAULT_SESSION_HOURS);
        assert!(config.database_path.is_none());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tessera.toml");
        fs::write(&path, "base_url = [not valid").unwrap();

        assert!(matches!(
            AppConfig::load(&path),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_resolve_explicit_database_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            database_path: Some(dir.path().join("nested").join("app.db")),
            ..Default::default()
        };

        let resolved = config.resolve_database_path().unwrap();
        assert!(resolved.parent().unwrap().exists());
        assert_eq!(resolved.file_name().unwrap(), "app.db");
    }
}
