use std::path::{Path, PathBuf};

use iris_classifier::config::PipelineConfig;
use tempfile::TempDir;

/// The 150-row dataset shipped with the crate.
pub fn shipped_dataset() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data/iris.csv")
}

/// Temporary directory with a config whose artifact paths all point inside it.
pub struct Workspace {
    pub dir: TempDir,
    pub config: PipelineConfig,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create tempdir");
        let mut config = PipelineConfig::default();
        config.paths.dataset = shipped_dataset();
        config.paths.prepared = dir.path().join("prepared_data.json");
        config.paths.model = dir.path().join("trained_model.json");
        config.paths.confusion_matrix = dir.path().join("confusion_matrix.png");
        config.render.dpi = 40;
        Self { dir, config }
    }
}
