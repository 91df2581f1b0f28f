//! JSON persistence shared by the prepared dataset and the model artifact.

use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Remediation hint attached to prepared-dataset failures.
pub const HINT_PREPARE: &str = "re-run data preparation";
/// Remediation hint attached to model-artifact failures.
pub const HINT_TRAIN: &str = "re-run training";

/// Errors raised while reading or writing pipeline artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// A prerequisite file does not exist.
    #[error("Required file {path} not found ({hint})")]
    Missing { path: PathBuf, hint: &'static str },
    /// The file exists but could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file could not be written.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file is not the expected JSON document (bad syntax or missing key).
    #[error("Malformed artifact {path}: {source}; {hint}")]
    Malformed {
        path: PathBuf,
        hint: &'static str,
        source: serde_json::Error,
    },
    /// The artifact was written by an incompatible version.
    #[error("Unsupported format_version {found} in {path} (expected {expected}); {hint}")]
    Version {
        path: PathBuf,
        found: i64,
        expected: i64,
        hint: &'static str,
    },
    /// The document parsed but violates a structural invariant.
    #[error("Invalid artifact {path}: {reason}; {hint}")]
    Invalid {
        path: PathBuf,
        reason: String,
        hint: &'static str,
    },
    /// Serialization failed before anything was written.
    #[error("Failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Serialize `value` as pretty JSON, creating parent directories and overwriting `path`.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ArtifactError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| ArtifactError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| ArtifactError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, bytes).map_err(|source| ArtifactError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

/// Read and deserialize a JSON artifact, tagging failures with a remediation hint.
pub fn read_json<T: DeserializeOwned>(path: &Path, hint: &'static str) -> Result<T, ArtifactError> {
    if !path.is_file() {
        return Err(ArtifactError::Missing {
            path: path.to_path_buf(),
            hint,
        });
    }
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Malformed {
        path: path.to_path_buf(),
        hint,
        source,
    })
}

/// Fail with [`ArtifactError::Version`] unless `found == expected`.
pub fn check_version(
    path: &Path,
    found: i64,
    expected: i64,
    hint: &'static str,
) -> Result<(), ArtifactError> {
    if found == expected {
        return Ok(());
    }
    Err(ArtifactError::Version {
        path: path.to_path_buf(),
        found,
        expected,
        hint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
        values: Vec<f64>,
    }

    #[test]
    fn missing_file_reports_hint() {
        let dir = tempdir().unwrap();
        let err = read_json::<Doc>(&dir.path().join("absent.json"), HINT_TRAIN).unwrap_err();
        assert!(matches!(err, ArtifactError::Missing { hint, .. } if hint == HINT_TRAIN));
    }

    #[test]
    fn absent_key_is_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, br#"{"name":"x"}"#).unwrap();
        let err = read_json::<Doc>(&path, HINT_TRAIN).unwrap_err();
        assert!(matches!(err, ArtifactError::Malformed { .. }));
        assert!(err.to_string().contains("re-run training"));
    }

    #[test]
    fn write_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/out/doc.json");
        let doc = Doc {
            name: "a".into(),
            values: vec![0.1, 5.1, 1.0 / 3.0],
        };
        write_json(&path, &doc).unwrap();
        let back: Doc = read_json(&path, HINT_PREPARE).unwrap();
        assert_eq!(back, doc);
    }
}
