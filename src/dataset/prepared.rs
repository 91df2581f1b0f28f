//! The prepared-dataset artifact shared by training, evaluation and the predictor.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{LabelledDataset, Measurements, SplitDataset};
use crate::artifact::{self, ArtifactError, HINT_PREPARE};
use crate::species::{Label, SpeciesMap};

/// Current on-disk format of the prepared dataset.
pub const PREPARED_FORMAT_VERSION: i64 = 1;

/// Immutable train/test snapshot plus the label coding used to build it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedDataset {
    pub format_version: i64,
    pub x_train: Vec<Measurements>,
    pub y_train: Vec<Label>,
    pub x_test: Vec<Measurements>,
    pub y_test: Vec<Label>,
    pub feature_names: Vec<String>,
    pub species_map: SpeciesMap,
}

impl PreparedDataset {
    pub fn new(data: &LabelledDataset, split: SplitDataset, species_map: SpeciesMap) -> Self {
        Self {
            format_version: PREPARED_FORMAT_VERSION,
            x_train: split.x_train,
            y_train: split.y_train,
            x_test: split.x_test,
            y_test: split.y_test,
            feature_names: data.feature_names.clone(),
            species_map,
        }
    }

    /// Write the snapshot, replacing any previous one.
    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        artifact::write_json(path, self)
    }

    /// Load a snapshot written by [`PreparedDataset::save`].
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let data: Self = artifact::read_json(path, HINT_PREPARE)?;
        artifact::check_version(
            path,
            data.format_version,
            PREPARED_FORMAT_VERSION,
            HINT_PREPARE,
        )?;
        Ok(data)
    }

    pub fn total_rows(&self) -> usize {
        self.y_train.len() + self.y_test.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{SplitOptions, stratified_split};
    use tempfile::tempdir;

    fn sample() -> PreparedDataset {
        let data = LabelledDataset {
            feature_names: vec![
                "sepal_length".into(),
                "sepal_width".into(),
                "petal_length".into(),
                "petal_width".into(),
            ],
            x: (0..30)
                .map(|i| {
                    let v = i as f64;
                    [v * 0.1 + 4.3, v / 3.0, 1.0 / (v + 1.0), 0.1 * 3.0]
                })
                .collect(),
            y: (0..30).map(|i| i % 3 + 1).collect(),
        };
        let split = stratified_split(&data, &SplitOptions::default()).unwrap();
        PreparedDataset::new(&data, split, SpeciesMap::iris())
    }

    #[test]
    fn round_trip_is_bit_identical() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prepared_data.json");
        let prepared = sample();
        prepared.save(&path).unwrap();
        let loaded = PreparedDataset::load(&path).unwrap();
        assert_eq!(loaded, prepared);
        for (a, b) in loaded.x_train.iter().zip(prepared.x_train.iter()) {
            for (va, vb) in a.iter().zip(b.iter()) {
                assert_eq!(va.to_bits(), vb.to_bits());
            }
        }
    }

    #[test]
    fn missing_species_map_is_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prepared_data.json");
        let mut value = serde_json::to_value(sample()).unwrap();
        value.as_object_mut().unwrap().remove("species_map");
        std::fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();
        let err = PreparedDataset::load(&path).unwrap_err();
        assert!(matches!(err, ArtifactError::Malformed { .. }));
    }

    #[test]
    fn rejects_future_format_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prepared_data.json");
        let mut prepared = sample();
        prepared.format_version = 99;
        prepared.save(&path).unwrap();
        assert!(matches!(
            PreparedDataset::load(&path).unwrap_err(),
            ArtifactError::Version { found: 99, .. }
        ));
    }
}
