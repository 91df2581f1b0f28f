//! Decision-tree training, inference and evaluation metrics.
//!
//! Two backends fit the same kind of model: an in-crate CART implementation
//! that keeps per-leaf class counts (and therefore exposes probabilities), and
//! a `linfa-trees` backend that only produces point predictions.

pub mod cart;
pub mod linfa_tree;
pub mod metrics;
pub mod model;

use thiserror::Error;

use crate::dataset::Measurements;
use crate::species::Label;

pub use model::{
    Capability, FittedModel, MODEL_FORMAT_VERSION, TrainedModelArtifact, TreeBackend,
};

/// Borrowed training partition.
#[derive(Debug, Clone, Copy)]
pub struct TrainDataset<'a> {
    pub x: &'a [Measurements],
    /// Labels aligned with `x`.
    pub y: &'a [Label],
}

impl TrainDataset<'_> {
    /// Reject empty or misaligned partitions.
    pub fn check(&self) -> Result<(), TrainError> {
        if self.x.len() != self.y.len() {
            return Err(TrainError::Mismatch {
                rows: self.x.len(),
                labels: self.y.len(),
            });
        }
        if self.x.is_empty() {
            return Err(TrainError::Empty);
        }
        Ok(())
    }

    /// Distinct labels in ascending order.
    pub fn classes(&self) -> Vec<Label> {
        let mut classes = self.y.to_vec();
        classes.sort_unstable();
        classes.dedup();
        classes
    }
}

/// Errors raised while fitting a model.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("Training partition is empty")]
    Empty,
    #[error("Training partition has {rows} rows but {labels} labels")]
    Mismatch { rows: usize, labels: usize },
    #[error("Tree backend failed: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_are_sorted_and_unique() {
        let x = [[0.0; 4]; 5];
        let y = [3, 1, 3, 2, 1];
        let data = TrainDataset { x: &x, y: &y };
        data.check().unwrap();
        assert_eq!(data.classes(), vec![1, 2, 3]);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let x = [[0.0; 4]; 2];
        let data = TrainDataset { x: &x, y: &[1] };
        assert!(matches!(
            data.check(),
            Err(TrainError::Mismatch { rows: 2, labels: 1 })
        ));
    }
}
