use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "post-scheduler";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where posts and the log file live.
    pub data_dir: PathBuf,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Largest value storage will accept, in bytes. Unset means unlimited.
    pub storage_quota_bytes: Option<u64>,
    /// How long a notification stays in the footer.
    pub toast_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: default_data_dir(),
            log_level: "info".to_string(),
            storage_quota_bytes: None,
            toast_seconds: 3,
        }
    }
}

impl Config {
    /// Load from a TOML file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_secs(self.toast_seconds)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("post-scheduler.log")
    }
}

/// `POST_SCHEDULER_DATA_DIR`, else the platform data directory.
pub fn default_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("POST_SCHEDULER_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR))
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR))
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.toast_duration(), Duration::from_secs(3));
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "data_dir = \"/tmp/posts\"\nstorage_quota_bytes = 5242880\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/posts"));
        assert_eq!(config.storage_quota_bytes, Some(5_242_880));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_path(), PathBuf::from("/tmp/posts/post-scheduler.log"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "toast_seconds = \"soon\"").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Toml { .. })));
    }
}
