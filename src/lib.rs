//! Iris decision-tree pipeline: data preparation, training, evaluation and an
//! interactive predictor, shared by the driver and the per-stage binaries.

/// Application directories for logs.
pub mod app_dirs;
/// JSON artifact persistence.
pub mod artifact;
/// Pipeline configuration.
pub mod config;
/// Raw dataset loading, encoding, splitting and statistics.
pub mod dataset;
/// Logging setup.
pub mod logging;
/// Decision-tree backends and metrics.
pub mod ml;
/// Batch pipeline stages.
pub mod pipeline;
/// Interactive predictor.
pub mod predictor;
/// Confusion-matrix heat-map rendering.
pub mod render;
/// Species label coding.
pub mod species;
