//! Seeded stratified train/test split.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{DatasetError, LabelledDataset, Measurements};
use crate::species::Label;

/// Parameters of the stratified train/test split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitOptions {
    /// Fraction of each class assigned to the test partition.
    pub test_fraction: f64,
    /// Seed mixed into the per-row ordering hash.
    pub seed: u64,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Train and test partitions, each kept in original row order.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitDataset {
    pub x_train: Vec<Measurements>,
    pub y_train: Vec<Label>,
    pub x_test: Vec<Measurements>,
    pub y_test: Vec<Label>,
    /// Source row indices of the test partition, ascending.
    pub test_rows: Vec<usize>,
}

/// Split `data` so every class contributes `round(n_class * test_fraction)` rows to test.
///
/// Within a class, rows are ranked by a hash of `(seed, label, row index)`, so the
/// same input and seed always produce the same membership.
pub fn stratified_split(
    data: &LabelledDataset,
    options: &SplitOptions,
) -> Result<SplitDataset, DatasetError> {
    if !(options.test_fraction > 0.0 && options.test_fraction < 1.0) {
        return Err(DatasetError::InvalidFraction(options.test_fraction));
    }
    if data.is_empty() {
        return Err(DatasetError::Empty);
    }

    let mut by_class: BTreeMap<Label, Vec<(u128, usize)>> = BTreeMap::new();
    for (row, &label) in data.y.iter().enumerate() {
        by_class
            .entry(label)
            .or_default()
            .push((row_key(options.seed, label, row), row));
    }

    let mut is_test = vec![false; data.len()];
    for entries in by_class.values_mut() {
        entries.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
        let n = entries.len();
        let mut test_n = ((n as f64) * options.test_fraction).round() as usize;
        if n > 1 {
            test_n = test_n.min(n - 1);
        } else {
            test_n = 0;
        }
        for &(_, row) in entries.iter().take(test_n) {
            is_test[row] = true;
        }
    }

    let mut split = SplitDataset {
        x_train: Vec::new(),
        y_train: Vec::new(),
        x_test: Vec::new(),
        y_test: Vec::new(),
        test_rows: Vec::new(),
    };
    for (row, (features, &label)) in data.x.iter().zip(data.y.iter()).enumerate() {
        if is_test[row] {
            split.x_test.push(*features);
            split.y_test.push(label);
            split.test_rows.push(row);
        } else {
            split.x_train.push(*features);
            split.y_train.push(label);
        }
    }
    Ok(split)
}

fn row_key(seed: u64, label: Label, row: usize) -> u128 {
    let hash = blake3::hash(format!("iris-split|{seed}|{label}|{row}").as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash.as_bytes()[0..16]);
    u128::from_le_bytes(bytes)
}
