//! Iris dataset loading, label encoding, stratified splitting and the
//! prepared-dataset artifact.

pub mod loader;
pub mod prepared;
pub mod split;
pub mod stats;

use std::path::PathBuf;

use thiserror::Error;

use crate::species::{Label, SpeciesMap};

pub use loader::load_csv;
pub use prepared::{PREPARED_FORMAT_VERSION, PreparedDataset};
pub use split::{SplitDataset, SplitOptions, stratified_split};

/// Number of numeric measurements per flower.
pub const FEATURE_COUNT: usize = 4;

/// Sepal length, sepal width, petal length, petal width (cm).
pub type Measurements = [f64; FEATURE_COUNT];

/// Header name of the label column (matched case-insensitively).
pub const SPECIES_COLUMN: &str = "species";

/// Errors raised while reading or transforming the raw dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Dataset file {0} not found")]
    Missing(PathBuf),
    #[error("csv error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("Expected a 'species' column and 4 measurement columns, found header {found:?}")]
    Columns { found: Vec<String> },
    #[error("Line {line}: column '{column}' holds '{value}', which is not a finite number")]
    InvalidNumber {
        line: u64,
        column: String,
        value: String,
    },
    #[error("Line {line}: unrecognized species '{value}'")]
    UnknownSpecies { line: u64, value: String },
    #[error("Invalid test fraction {0} (expected a value strictly between 0 and 1)")]
    InvalidFraction(f64),
    #[error("Dataset is empty")]
    Empty,
}

/// One CSV row before label encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based line number in the source file (header is line 1).
    pub line: u64,
    pub features: Measurements,
    pub species: String,
}

/// Parsed CSV contents with the textual species column.
#[derive(Debug, Clone)]
pub struct RawDataset {
    /// Measurement column names in file order.
    pub feature_names: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawDataset {
    /// Map every textual species to its integer label.
    ///
    /// Values outside the map are rejected with [`DatasetError::UnknownSpecies`].
    pub fn encode_species(&self, species: &SpeciesMap) -> Result<LabelledDataset, DatasetError> {
        let mut x = Vec::with_capacity(self.rows.len());
        let mut y = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let label = species
                .label_for(&row.species)
                .ok_or_else(|| DatasetError::UnknownSpecies {
                    line: row.line,
                    value: row.species.clone(),
                })?;
            x.push(row.features);
            y.push(label);
        }
        Ok(LabelledDataset {
            feature_names: self.feature_names.clone(),
            x,
            y,
        })
    }

    /// Raw species values with their counts, sorted by value.
    pub fn species_counts(&self) -> Vec<(String, usize)> {
        let mut counts = std::collections::BTreeMap::<String, usize>::new();
        for row in &self.rows {
            *counts.entry(row.species.clone()).or_default() += 1;
        }
        counts.into_iter().collect()
    }
}

/// Feature matrix with integer labels, prior to splitting.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelledDataset {
    pub feature_names: Vec<String>,
    pub x: Vec<Measurements>,
    pub y: Vec<Label>,
}

impl LabelledDataset {
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}
