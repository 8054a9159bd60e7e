//! Runtime configuration: data directory, source URLs, server bind address.
//!
//! The snapshot location is always an explicit value derived from here;
//! nothing in the pipeline touches working-directory-relative paths.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::error::Result;
use crate::fetch::api::VCB_API_URL;
use crate::fetch::scrape::VCB_RATES_URL;
use crate::store::SNAPSHOT_FILENAME;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the cached snapshot; defaults to the user cache dir.
    pub data_dir: Option<PathBuf>,
    /// XML rate feed endpoint.
    pub api_url: String,
    /// Rendered rates page for the scrape strategy.
    pub scrape_url: String,
    /// Server listen address.
    pub bind: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            api_url: VCB_API_URL.to_string(),
            scrape_url: VCB_RATES_URL.to_string(),
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

impl Config {
    /// Load from a TOML file; defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Directory holding the cached snapshot.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine cache directory"))?;
        Ok(cache_dir.join("tygia"))
    }

    pub fn snapshot_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(SNAPSHOT_FILENAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_point_at_bank_endpoints() {
        let config = Config::default();
        assert!(config.api_url.contains("vietcombank.com.vn"));
        assert!(config.scrape_url.contains("Ty-gia"));
        assert_eq!(config.bind, "127.0.0.1:8080");
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tygia.toml");
        std::fs::write(&path, "bind = \"0.0.0.0:9000\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.api_url, Config::default().api_url);
    }

    #[test]
    fn test_load_rejects_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tygia.toml");
        std::fs::write(&path, "snapshot = \"/tmp/x.csv\"\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let config = Config {
            data_dir: Some(PathBuf::from("/srv/rates")),
            ..Config::default()
        };
        assert_eq!(
            config.snapshot_path().unwrap(),
            PathBuf::from("/srv/rates").join(SNAPSHOT_FILENAME)
        );
    }
}
