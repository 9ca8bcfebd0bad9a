//! CLI configuration.
//!
//! Stored as TOML at `~/.config/slosync/config.toml`; command-line flags
//! override any value read from it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory of the object store.
    #[serde(default = "default_store_root")]
    pub store_root: PathBuf,

    /// Chunk size in bytes for new uploads.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,
}

fn home() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| "/tmp".into()))
}

fn default_store_root() -> PathBuf {
    home().join(".local").join("share").join("slosync").join("store")
}

fn default_chunk_size() -> u64 {
    slosync_transfer::DEFAULT_CHUNK_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_root: default_store_root(),
            chunk_size: default_chunk_size(),
        }
    }
}

impl Config {
    /// Loads configuration from disk, or writes the defaults if not found.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }
}

/// Returns the configuration file path.
fn config_path() -> PathBuf {
    home().join(".config").join("slosync").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.store_root.ends_with("slosync/store"));
        assert_eq!(config.chunk_size, slosync_transfer::DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn config_partial_toml() {
        let config: Config = toml::from_str("chunk_size = 1048576").unwrap();
        assert_eq!(config.chunk_size, 1_048_576);
        assert_eq!(config.store_root, default_store_root());
    }

    #[test]
    fn config_path_not_empty() {
        assert!(config_path().to_string_lossy().contains("slosync"));
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.chunk_size, default_chunk_size());
    }

    #[test]
    fn config_save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");

        let config = Config {
            store_root: tmp.path().join("objects"),
            chunk_size: 4096,
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.store_root, tmp.path().join("objects"));
        assert_eq!(loaded.chunk_size, 4096);
    }
}
