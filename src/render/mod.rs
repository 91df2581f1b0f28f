//! Raster rendering of the confusion-matrix heat-map.

mod font;
mod heatmap;

use std::path::PathBuf;

use thiserror::Error;

pub use heatmap::{
    FIGURE_INCHES, annotation_color, blues, draw_confusion_heatmap, figure_size,
    render_confusion_heatmap,
};

/// Errors raised while drawing or saving a figure.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Cannot render an empty confusion matrix")]
    EmptyMatrix,
    #[error("Expected {expected} class names, got {found}")]
    ClassNames { expected: usize, found: usize },
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write image {path}: {source}")]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
}
