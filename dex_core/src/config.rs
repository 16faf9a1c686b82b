//! Viewer configuration.
//!
//! Loaded from `viewer_config.json` with support for an environment variable
//! override (`DEX_VIEWER_CONFIG_PATH`).

use std::{
    env, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::navigation::DEFAULT_TOTAL_COUNT;

pub const BUILTIN_VIEWER_CONFIG: &str = include_str!("data/viewer_config.json");

pub const CONFIG_PATH_ENV: &str = "DEX_VIEWER_CONFIG_PATH";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    pub catalog_base_url: String,
    pub sprite_base_url: String,
    pub total_count: u32,
    pub error_text: String,
    pub unknown_trait_text: String,
    pub length_unit: String,
    pub mass_unit: String,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            catalog_base_url: "https://pokeapi.co/api/v2/pokemon".to_string(),
            sprite_base_url:
                "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/showdown"
                    .to_string(),
            total_count: DEFAULT_TOTAL_COUNT,
            error_text: "Error loading".to_string(),
            unknown_trait_text: "Unknown".to_string(),
            length_unit: "m".to_string(),
            mass_unit: "kg".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl ViewerConfig {
    pub fn builtin() -> Arc<Self> {
        match Self::from_json_str(BUILTIN_VIEWER_CONFIG) {
            Ok(config) => Arc::new(config),
            Err(err) => {
                tracing::warn!(
                    target: "dex::config",
                    error = %err,
                    "viewer_config.builtin_invalid"
                );
                Arc::new(Self::default())
            }
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, ViewerConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ViewerConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = ViewerConfig::from_json_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ViewerConfigError> {
        if self.total_count == 0 {
            return Err(ViewerConfigError::EmptyRange);
        }
        if self.catalog_base_url.trim().is_empty() {
            return Err(ViewerConfigError::MissingCatalogUrl);
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Error)]
pub enum ViewerConfigError {
    #[error("failed to parse viewer config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read viewer config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("total_count must be at least 1")]
    EmptyRange,
    #[error("catalog_base_url must not be empty")]
    MissingCatalogUrl,
}

/// Where the active configuration came from.
#[derive(Debug, Clone, Default)]
pub struct ViewerConfigMetadata {
    path: Option<PathBuf>,
}

impl ViewerConfigMetadata {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

/// Load the viewer configuration from `DEX_VIEWER_CONFIG_PATH`, falling back
/// to the builtin copy when the variable is unset or the file is unusable.
pub fn load_viewer_config_from_env() -> (Arc<ViewerConfig>, ViewerConfigMetadata) {
    let override_path = env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
    load_viewer_config(override_path)
}

pub fn load_viewer_config(path: Option<PathBuf>) -> (Arc<ViewerConfig>, ViewerConfigMetadata) {
    if let Some(path) = path {
        match ViewerConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "dex::config",
                    path = %path.display(),
                    "viewer_config.loaded=file"
                );
                return (Arc::new(config), ViewerConfigMetadata::new(Some(path)));
            }
            Err(err) => {
                tracing::warn!(
                    target: "dex::config",
                    path = %path.display(),
                    error = %err,
                    "viewer_config.load_failed"
                );
            }
        }
    }

    let config = ViewerConfig::builtin();
    tracing::info!(target: "dex::config", "viewer_config.loaded=builtin");
    (config, ViewerConfigMetadata::new(None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_matches_default() {
        let builtin = ViewerConfig::builtin();
        assert_eq!(*builtin, ViewerConfig::default());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config =
            ViewerConfig::from_json_str(r#"{"total_count": 20, "error_text": "oops"}"#).unwrap();
        assert_eq!(config.total_count, 20);
        assert_eq!(config.error_text, "oops");
        assert_eq!(config.unknown_trait_text, "Unknown");
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let (config, metadata) =
            load_viewer_config(Some(PathBuf::from("/definitely/not/here.json")));
        assert!(metadata.path().is_none());
        assert_eq!(config.total_count, DEFAULT_TOTAL_COUNT);
    }

    fn write_temp_config(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("dex_viewer_{}_{name}.json", std::process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn valid_file_is_loaded_with_its_path() {
        let path = write_temp_config(
            "valid",
            r#"{"catalog_base_url": "http://127.0.0.1:9/records", "total_count": 12, "mass_unit": "lb"}"#,
        );
        let (config, metadata) = load_viewer_config(Some(path.clone()));
        fs::remove_file(&path).unwrap();

        assert_eq!(metadata.path(), Some(&path));
        assert_eq!(config.catalog_base_url, "http://127.0.0.1:9/records");
        assert_eq!(config.total_count, 12);
        assert_eq!(config.mass_unit, "lb");
        assert_eq!(config.length_unit, "m");
    }

    #[test]
    fn file_with_empty_range_falls_back_to_builtin() {
        let path = write_temp_config("empty_range", r#"{"total_count": 0}"#);
        assert!(matches!(
            ViewerConfig::from_file(&path),
            Err(ViewerConfigError::EmptyRange)
        ));
        let (config, metadata) = load_viewer_config(Some(path.clone()));
        fs::remove_file(&path).unwrap();

        assert!(metadata.path().is_none());
        assert_eq!(*config, *ViewerConfig::builtin());
        assert_eq!(config.total_count, DEFAULT_TOTAL_COUNT);
    }

    #[test]
    fn unparseable_file_is_a_parse_error() {
        let path = write_temp_config("garbage", "total_count = 3");
        let result = ViewerConfig::from_file(&path);
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ViewerConfigError::Parse(_))));
    }

    #[test]
    fn zero_total_is_rejected() {
        let config = ViewerConfig {
            total_count: 0,
            ..ViewerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ViewerConfigError::EmptyRange)
        ));
    }

    #[test]
    fn timeout_converts_to_duration() {
        let config = ViewerConfig {
            request_timeout_secs: Some(5),
            ..ViewerConfig::default()
        };
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(5)));
    }
}
