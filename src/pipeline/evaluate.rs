//! Evaluation stage: metrics, classification report and heat-map.

use std::io::Write;
use std::path::PathBuf;

use super::{PipelineError, rule, section};
use crate::dataset::PreparedDataset;
use crate::ml::TrainedModelArtifact;
use crate::ml::metrics::{ClassificationReport, ConfusionMatrix, accuracy_score};
use crate::render::render_confusion_heatmap;

#[derive(Debug, Clone)]
pub struct EvaluateOptions {
    pub prepared: PathBuf,
    pub model: PathBuf,
    pub heatmap: PathBuf,
    pub dpi: u32,
}

#[derive(Debug, Clone)]
pub struct EvaluationReport {
    /// Accuracy on the test partition; NaN when it is empty.
    pub accuracy: f64,
    pub confusion: ConfusionMatrix,
    pub report: ClassificationReport,
    pub heatmap: PathBuf,
    /// Whether the predictions stored at training time disagreed with the recomputed ones.
    pub stale_predictions: bool,
}

/// Recompute test predictions from the saved model and report on them.
///
/// Both artifacts must load before anything is computed.
pub fn run_evaluation<W: Write>(
    options: &EvaluateOptions,
    out: &mut W,
) -> Result<EvaluationReport, PipelineError> {
    section(out, "EVALUATING MODEL")?;
    writeln!(out, "\nLoading data and model...")?;
    let prepared = PreparedDataset::load(&options.prepared)?;
    let artifact = TrainedModelArtifact::load(&options.model)?;

    writeln!(out, "Evaluating model...")?;
    let predictions = artifact.model.predict(&prepared.x_test);
    let stale_predictions = artifact.test_predictions != predictions;
    if stale_predictions {
        tracing::warn!(
            "Stored test predictions in {} differ from the recomputed ones; using recomputed values",
            options.model.display()
        );
    }
    let accuracy = accuracy_score(&prepared.y_test, &predictions);

    let labels = prepared.species_map.labels();
    let class_names = prepared.species_map.display_names();
    let confusion = ConfusionMatrix::from_labels(&labels, &prepared.y_test, &predictions);
    let report = ClassificationReport::new(&confusion, class_names.clone(), accuracy);

    writeln!(out, "\n--- Classification report ---")?;
    write!(out, "{report}")?;
    writeln!(out, "{}", &rule('-')[..34])?;
    write!(out, "\n{confusion}")?;

    writeln!(out, "\nRendering confusion matrix...")?;
    render_confusion_heatmap(&confusion, &class_names, &options.heatmap, options.dpi)?;
    writeln!(
        out,
        "Confusion matrix saved as '{}'",
        options.heatmap.display()
    )?;
    writeln!(out, "\n--- Reading the matrix ---")?;
    writeln!(
        out,
        "The main diagonal (top-left to bottom-right) holds the correct predictions."
    )?;
    writeln!(out, "Values off the diagonal are misclassifications.")?;
    writeln!(out, "\nFinal model accuracy: {accuracy:.4}")?;

    Ok(EvaluationReport {
        accuracy,
        confusion,
        report,
        heatmap: options.heatmap.clone(),
        stale_predictions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{LabelledDataset, SplitOptions, stratified_split};
    use crate::ml::{FittedModel, TrainDataset, TreeBackend};
    use crate::species::SpeciesMap;
    use tempfile::tempdir;

    fn fixtures(dir: &std::path::Path, tamper: bool) -> EvaluateOptions {
        let data = LabelledDataset {
            feature_names: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            x: (0..30)
                .map(|i| [(i % 3) as f64 + (i as f64) * 0.001, 0.0, 0.0, 0.0])
                .collect(),
            y: (0..30).map(|i| i % 3 + 1).collect(),
        };
        let split = stratified_split(&data, &SplitOptions::default()).unwrap();
        let prepared = PreparedDataset::new(&data, split, SpeciesMap::iris());
        let prepared_path = dir.join("prepared_data.json");
        prepared.save(&prepared_path).unwrap();

        let model = FittedModel::fit(
            TreeBackend::Cart,
            &TrainDataset {
                x: &prepared.x_train,
                y: &prepared.y_train,
            },
            42,
        )
        .unwrap();
        let mut predictions = model.predict(&prepared.x_test);
        if tamper {
            predictions.reverse();
            predictions[0] = 99;
        }
        let model_path = dir.join("trained_model.json");
        TrainedModelArtifact::new(model, 42, predictions)
            .save(&model_path)
            .unwrap();
        EvaluateOptions {
            prepared: prepared_path,
            model: model_path,
            heatmap: dir.join("confusion_matrix.png"),
            dpi: 50,
        }
    }

    #[test]
    fn reports_metrics_and_writes_heatmap() {
        let dir = tempdir().unwrap();
        let options = fixtures(dir.path(), false);
        let mut out = Vec::new();
        let report = run_evaluation(&options, &mut out).unwrap();
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.confusion.total(), 6);
        for class in 0..3 {
            assert_eq!(report.confusion.row_sum(class), 2);
        }
        assert!(!report.stale_predictions);
        assert!(options.heatmap.is_file());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Versicolor"));
        assert!(text.contains("Final model accuracy: 1.0000"));
    }

    #[test]
    fn stale_stored_predictions_are_flagged_not_used() {
        let dir = tempdir().unwrap();
        let options = fixtures(dir.path(), true);
        let report = run_evaluation(&options, &mut std::io::sink()).unwrap();
        assert!(report.stale_predictions);
        assert_eq!(report.accuracy, 1.0);
    }

    #[test]
    fn missing_model_is_fatal() {
        let dir = tempdir().unwrap();
        let options = fixtures(dir.path(), false);
        std::fs::remove_file(&options.model).unwrap();
        let err = run_evaluation(&options, &mut std::io::sink()).unwrap_err();
        assert_eq!(err.kind(), "MissingFile");
        assert!(!options.heatmap.exists());
    }
}
