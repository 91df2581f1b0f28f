//! Batch stages of the pipeline: preparation, training and evaluation.
//!
//! Each stage reads its inputs from explicit paths, writes its artifact, and
//! reports progress to the writer it is given. The driver and the per-stage
//! binaries share these entry points.

pub mod evaluate;
pub mod prepare;
pub mod train;

use std::io::Write;

use thiserror::Error;

use crate::artifact::ArtifactError;
use crate::config::ConfigError;
use crate::dataset::DatasetError;
use crate::ml::TrainError;
use crate::render::RenderError;

pub use evaluate::{EvaluateOptions, EvaluationReport, run_evaluation};
pub use prepare::{PrepareOptions, PreparationReport, run_preparation};
pub use train::{TrainOptions, TrainingReport, run_training};

/// Width of the console banners.
pub const BANNER_WIDTH: usize = 70;

/// Any failure raised by a pipeline stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error(transparent)]
    Train(#[from] TrainError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Console output failed: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Short category name printed next to the message at the error boundary.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Dataset(DatasetError::Missing(_))
            | Self::Artifact(ArtifactError::Missing { .. }) => "MissingFile",
            Self::Artifact(
                ArtifactError::Malformed { .. }
                | ArtifactError::Version { .. }
                | ArtifactError::Invalid { .. },
            ) => "MalformedArtifact",
            Self::Dataset(_) => "DatasetError",
            Self::Artifact(_) => "ArtifactError",
            Self::Train(_) => "TrainError",
            Self::Render(_) => "RenderError",
            Self::Config(_) => "ConfigError",
            Self::Io(_) => "IoError",
        }
    }
}

/// A horizontal rule of `ch` as wide as the banners.
pub fn rule(ch: char) -> String {
    std::iter::repeat_n(ch, BANNER_WIDTH).collect()
}

/// Print `title` between two `=` rules.
pub fn section<W: Write>(out: &mut W, title: &str) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", rule('='))?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", rule('='))
}
