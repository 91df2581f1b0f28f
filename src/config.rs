//! Pipeline configuration loaded from TOML.
//!
//! Every section is optional; missing keys fall back to the defaults that
//! reproduce the classic file layout (`iris.csv`, `prepared_data.json`,
//! `trained_model.json`, `confusion_matrix.png`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::SplitOptions;
use crate::ml::TreeBackend;

/// Config file picked up from the working directory when no path is given.
pub const CONFIG_FILE_NAME: &str = "iris-classifier.toml";
/// Accepted DPI range for the heat-map.
pub const DPI_RANGE: std::ops::RangeInclusive<u32> = 1..=600;

/// Errors that may occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse TOML config.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// A value parsed but is out of range.
    #[error("Invalid config value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    pub dataset: PathBuf,
    pub prepared: PathBuf,
    pub model: PathBuf,
    pub confusion_matrix: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("iris.csv"),
            prepared: PathBuf::from("prepared_data.json"),
            model: PathBuf::from("trained_model.json"),
            confusion_matrix: PathBuf::from("confusion_matrix.png"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSettings {
    pub backend: TreeBackend,
    pub seed: u64,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            backend: TreeBackend::Cart,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub dpi: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self { dpi: 300 }
    }
}

/// Top-level configuration shared by the driver and the stage binaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: ArtifactPaths,
    pub split: SplitOptions,
    pub training: TrainingSettings,
    pub render: RenderSettings,
}

impl PipelineConfig {
    /// Load `explicit` if given, else `iris-classifier.toml` from the working
    /// directory if present, else defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        let local = Path::new(CONFIG_FILE_NAME);
        if local.is_file() {
            return Self::load_from(local);
        }
        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fraction = self.split.test_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(ConfigError::Invalid {
                key: "split.test_fraction",
                reason: format!("{fraction} is not strictly between 0 and 1"),
            });
        }
        if !DPI_RANGE.contains(&self.render.dpi) {
            return Err(ConfigError::Invalid {
                key: "render.dpi",
                reason: format!(
                    "{} is outside {}..={}",
                    self.render.dpi,
                    DPI_RANGE.start(),
                    DPI_RANGE.end()
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_file_yields_defaults() {
        let config: PipelineConfig = toml::from_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.paths.model, PathBuf::from("trained_model.json"));
        assert_eq!(config.split.seed, 42);
        assert_eq!(config.render.dpi, 300);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        std::fs::write(
            &path,
            "[training]\nbackend = \"linfa\"\n\n[paths]\ndataset = \"data/iris.csv\"\n",
        )
        .unwrap();
        let config = PipelineConfig::load_from(&path).unwrap();
        assert_eq!(config.training.backend, TreeBackend::Linfa);
        assert_eq!(config.training.seed, 42);
        assert_eq!(config.paths.dataset, PathBuf::from("data/iris.csv"));
        assert_eq!(config.paths.prepared, PathBuf::from("prepared_data.json"));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        std::fs::write(&path, "[split]\ntest_fraction = 1.5\n").unwrap();
        assert!(matches!(
            PipelineConfig::load_from(&path).unwrap_err(),
            ConfigError::Invalid { key: "split.test_fraction", .. }
        ));
        std::fs::write(&path, "[render]\ndpi = 0\n").unwrap();
        assert!(matches!(
            PipelineConfig::load_from(&path).unwrap_err(),
            ConfigError::Invalid { key: "render.dpi", .. }
        ));
    }

    #[test]
    fn unknown_backend_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        std::fs::write(&path, "[training]\nbackend = \"forest\"\n").unwrap();
        assert!(matches!(
            PipelineConfig::load_from(&path).unwrap_err(),
            ConfigError::ParseToml { .. }
        ));
    }
}
