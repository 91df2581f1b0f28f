//! Training stage: prepared dataset to model artifact.

use std::io::Write;
use std::path::PathBuf;

use super::{PipelineError, rule, section};
use crate::dataset::PreparedDataset;
use crate::dataset::stats::class_distribution;
use crate::ml::metrics::accuracy_score;
use crate::ml::{FittedModel, TrainDataset, TrainedModelArtifact, TreeBackend};
use crate::species::{Label, SpeciesMap, UNKNOWN_SPECIES};

/// Rows shown in the predicted-vs-real table.
const PREVIEW_ROWS: usize = 10;

#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub prepared: PathBuf,
    pub model_out: PathBuf,
    pub backend: TreeBackend,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub backend: TreeBackend,
    pub depth: usize,
    pub n_leaves: usize,
    /// Accuracy on the test partition; NaN when it is empty.
    pub accuracy: f64,
    pub correct: usize,
    pub total: usize,
}

/// Fit a tree on the train partition, score the test partition and save both.
pub fn run_training<W: Write>(
    options: &TrainOptions,
    out: &mut W,
) -> Result<TrainingReport, PipelineError> {
    section(out, "LOADING PREPARED DATA")?;
    let prepared = PreparedDataset::load(&options.prepared)?;
    report_prepared(out, options, &prepared)?;

    section(out, "STEP 4: TRAINING DECISION TREE")?;
    writeln!(
        out,
        "\nBackend: {}  seed: {}",
        options.backend, options.seed
    )?;
    let dataset = TrainDataset {
        x: &prepared.x_train,
        y: &prepared.y_train,
    };
    let model = FittedModel::fit(options.backend, &dataset, options.seed)?;
    writeln!(out, "\nModel trained")?;
    writeln!(out, "Tree depth: {}", model.depth())?;
    writeln!(out, "Number of leaves: {}", model.n_leaves())?;
    writeln!(out, "Number of features: {}", model.n_features())?;

    section(out, "PRELIMINARY EVALUATION")?;
    let predictions = model.predict(&prepared.x_test);
    let accuracy = accuracy_score(&prepared.y_test, &predictions);
    writeln!(out, "\nTest accuracy: {:.2}%", accuracy * 100.0)?;
    write_preview(out, &prepared.y_test, &predictions, &prepared.species_map)?;
    let correct = prepared
        .y_test
        .iter()
        .zip(predictions.iter())
        .filter(|(truth, pred)| truth == pred)
        .count();
    let total = prepared.y_test.len();
    writeln!(out, "\n{}", "-".repeat(60))?;
    writeln!(out, "Total hits: {correct}/{total}")?;

    section(out, "SAVING TRAINED MODEL")?;
    let report = TrainingReport {
        backend: model.backend(),
        depth: model.depth(),
        n_leaves: model.n_leaves(),
        accuracy,
        correct,
        total,
    };
    let prediction_count = predictions.len();
    TrainedModelArtifact::new(model, options.seed, predictions).save(&options.model_out)?;
    writeln!(out, "\nModel saved to '{}'", options.model_out.display())?;
    writeln!(out, "\nFile contents:")?;
    writeln!(out, "  - model: {} decision tree", report.backend)?;
    writeln!(out, "  - test_predictions: ({prediction_count},) predictions")?;
    Ok(report)
}

fn report_prepared<W: Write>(
    out: &mut W,
    options: &TrainOptions,
    prepared: &PreparedDataset,
) -> std::io::Result<()> {
    let features = prepared.feature_names.len();
    writeln!(out, "\nFile '{}' loaded", options.prepared.display())?;
    writeln!(out, "\nLoaded data:")?;
    writeln!(out, "  - x_train: ({}, {features}) (train)", prepared.x_train.len())?;
    writeln!(out, "  - x_test: ({}, {features}) (test)", prepared.x_test.len())?;
    writeln!(out, "  - y_train: ({},) (train)", prepared.y_train.len())?;
    writeln!(out, "  - y_test: ({},) (test)", prepared.y_test.len())?;
    writeln!(out, "  - Features: {:?}", prepared.feature_names)?;
    writeln!(out, "  - Species map: {}", prepared.species_map)?;
    writeln!(out, "\n--- Class distribution in train ---")?;
    for share in class_distribution(&prepared.y_train) {
        writeln!(
            out,
            "  Class {} ({}): {} samples",
            share.label,
            prepared.species_map.name(share.label).unwrap_or(UNKNOWN_SPECIES),
            share.count
        )?;
    }
    Ok(())
}

fn write_preview<W: Write>(
    out: &mut W,
    truth: &[Label],
    predicted: &[Label],
    species: &SpeciesMap,
) -> std::io::Result<()> {
    writeln!(out, "\n--- First {PREVIEW_ROWS} predictions vs real values ---")?;
    writeln!(out, "{:<5} {:<20} {:<20} {:<10}", "ID", "Predicted", "Real", "Correct?")?;
    writeln!(out, "{}", &rule('-')[..60])?;
    for (idx, (real, pred)) in truth.iter().zip(predicted.iter()).take(PREVIEW_ROWS).enumerate() {
        writeln!(
            out,
            "{:<5} {:<20} {:<20} {:<10}",
            idx,
            species.name(*pred).unwrap_or(UNKNOWN_SPECIES),
            species.name(*real).unwrap_or(UNKNOWN_SPECIES),
            if pred == real { "YES" } else { "NO" }
        )?;
    }
    Ok(())
}
