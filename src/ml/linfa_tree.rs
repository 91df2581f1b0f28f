//! Decision-tree backend built on `linfa-trees`.

use std::fmt;

use linfa::prelude::*;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::{TrainDataset, TrainError};
use crate::dataset::{FEATURE_COUNT, Measurements};
use crate::species::Label;

/// Fitted `linfa-trees` classifier. Point predictions only.
#[derive(Serialize, Deserialize)]
pub struct LinfaTree {
    pub classes: Vec<Label>,
    pub n_features: usize,
    tree: DecisionTree<f64, usize>,
}

impl fmt::Debug for LinfaTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinfaTree")
            .field("classes", &self.classes)
            .field("n_features", &self.n_features)
            .field("depth", &self.depth())
            .field("n_leaves", &self.n_leaves())
            .finish()
    }
}

/// Fit a Gini tree without a depth limit.
pub fn train_linfa_tree(dataset: &TrainDataset<'_>) -> Result<LinfaTree, TrainError> {
    dataset.check()?;
    let records = to_records(dataset.x);
    let targets = Array1::from_vec(dataset.y.to_vec());
    let data = Dataset::new(records, targets);
    let tree = DecisionTree::params()
        .split_quality(SplitQuality::Gini)
        .max_depth(None)
        .fit(&data)
        .map_err(|err: linfa::Error| TrainError::Backend(err.to_string()))?;
    Ok(LinfaTree {
        classes: dataset.classes(),
        n_features: FEATURE_COUNT,
        tree,
    })
}

impl LinfaTree {
    pub fn predict(&self, rows: &[Measurements]) -> Vec<Label> {
        if rows.is_empty() {
            return Vec::new();
        }
        self.tree.predict(&to_records(rows)).to_vec()
    }

    pub fn depth(&self) -> usize {
        self.tree.max_depth()
    }

    pub fn n_leaves(&self) -> usize {
        self.tree.num_leaves()
    }
}

fn to_records(rows: &[Measurements]) -> Array2<f64> {
    Array2::from_shape_fn((rows.len(), FEATURE_COUNT), |(r, c)| rows[r][c])
}
