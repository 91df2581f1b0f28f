//! Backend-independent model handle and the persisted model artifact.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::cart::{CartModel, CartOptions, train_cart};
use super::linfa_tree::{LinfaTree, train_linfa_tree};
use super::{TrainDataset, TrainError};
use crate::artifact::{self, ArtifactError, HINT_TRAIN};
use crate::dataset::Measurements;
use crate::species::Label;

/// Current on-disk format of the model artifact.
pub const MODEL_FORMAT_VERSION: i64 = 1;

/// Which tree implementation fits the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeBackend {
    #[default]
    Cart,
    Linfa,
}

impl FromStr for TreeBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cart" => Ok(Self::Cart),
            "linfa" => Ok(Self::Linfa),
            other => Err(format!("Unknown tree backend '{other}' (expected cart or linfa)")),
        }
    }
}

impl fmt::Display for TreeBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cart => "cart",
            Self::Linfa => "linfa",
        })
    }
}

/// What a loaded model can report besides the predicted label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Per-class probabilities aligned with [`FittedModel::classes`].
    Probabilities,
    PointOnly,
}

/// A fitted tree from either backend.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "backend", content = "tree", rename_all = "snake_case")]
pub enum FittedModel {
    Cart(CartModel),
    Linfa(LinfaTree),
}

impl FittedModel {
    /// Fit the selected backend; `seed` only affects CART tie-breaking.
    pub fn fit(
        backend: TreeBackend,
        dataset: &TrainDataset<'_>,
        seed: u64,
    ) -> Result<Self, TrainError> {
        tracing::info!("Fitting {backend} decision tree on {} rows", dataset.x.len());
        match backend {
            TreeBackend::Cart => Ok(Self::Cart(train_cart(dataset, &CartOptions { seed })?)),
            TreeBackend::Linfa => Ok(Self::Linfa(train_linfa_tree(dataset)?)),
        }
    }

    pub fn backend(&self) -> TreeBackend {
        match self {
            Self::Cart(_) => TreeBackend::Cart,
            Self::Linfa(_) => TreeBackend::Linfa,
        }
    }

    pub fn capability(&self) -> Capability {
        match self {
            Self::Cart(_) => Capability::Probabilities,
            Self::Linfa(_) => Capability::PointOnly,
        }
    }

    pub fn predict(&self, rows: &[Measurements]) -> Vec<Label> {
        match self {
            Self::Cart(model) => rows.iter().map(|row| model.predict(row)).collect(),
            Self::Linfa(model) => model.predict(rows),
        }
    }

    pub fn predict_one(&self, row: &Measurements) -> Label {
        match self {
            Self::Cart(model) => model.predict(row),
            Self::Linfa(model) => model
                .predict(std::slice::from_ref(row))
                .first()
                .copied()
                .unwrap_or_default(),
        }
    }

    /// Class probabilities aligned with [`FittedModel::classes`], when supported.
    pub fn predict_proba(&self, row: &Measurements) -> Option<Vec<f64>> {
        match self {
            Self::Cart(model) => Some(model.predict_proba(row)),
            Self::Linfa(_) => None,
        }
    }

    pub fn classes(&self) -> &[Label] {
        match self {
            Self::Cart(model) => &model.classes,
            Self::Linfa(model) => &model.classes,
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Self::Cart(model) => model.depth(),
            Self::Linfa(model) => model.depth(),
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            Self::Cart(model) => model.n_leaves(),
            Self::Linfa(model) => model.n_leaves(),
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            Self::Cart(model) => model.n_features,
            Self::Linfa(model) => model.n_features,
        }
    }
}

/// The fitted model plus the test-partition predictions made at training time.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainedModelArtifact {
    pub format_version: i64,
    pub seed: u64,
    pub model: FittedModel,
    pub test_predictions: Vec<Label>,
}

impl TrainedModelArtifact {
    pub fn new(model: FittedModel, seed: u64, test_predictions: Vec<Label>) -> Self {
        Self {
            format_version: MODEL_FORMAT_VERSION,
            seed,
            model,
            test_predictions,
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        artifact::write_json(path, self)
    }

    /// Load and structurally validate an artifact written by [`TrainedModelArtifact::save`].
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let loaded: Self = artifact::read_json(path, HINT_TRAIN)?;
        artifact::check_version(path, loaded.format_version, MODEL_FORMAT_VERSION, HINT_TRAIN)?;
        if let FittedModel::Cart(model) = &loaded.model
            && let Err(reason) = model.validate()
        {
            return Err(ArtifactError::Invalid {
                path: path.to_path_buf(),
                reason,
                hint: HINT_TRAIN,
            });
        }
        Ok(loaded)
    }
}
