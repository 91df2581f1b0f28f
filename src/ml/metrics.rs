//! Evaluation metrics for classification models.

use std::fmt;

use crate::species::Label;

#[derive(Debug, Clone, PartialEq)]
/// Confusion matrix for a `K`-class classifier over a fixed label order.
pub struct ConfusionMatrix {
    /// Class labels; row/column `i` corresponds to `labels[i]`.
    pub labels: Vec<Label>,
    /// Row-major `KxK` counts (`truth * K + predicted`).
    pub counts: Vec<u32>,
}

impl ConfusionMatrix {
    /// Create an empty matrix for the given label order.
    pub fn new(labels: &[Label]) -> Self {
        let k = labels.len();
        Self {
            labels: labels.to_vec(),
            counts: vec![0; k * k],
        }
    }

    /// Tally paired true/predicted labels. Pairs with a label outside the order are skipped.
    pub fn from_labels(labels: &[Label], truth: &[Label], predicted: &[Label]) -> Self {
        let mut cm = Self::new(labels);
        for (&t, &p) in truth.iter().zip(predicted.iter()) {
            cm.add(t, p);
        }
        cm
    }

    pub fn n_classes(&self) -> usize {
        self.labels.len()
    }

    pub fn add(&mut self, truth: Label, predicted: Label) {
        let (Some(t), Some(p)) = (self.index_of(truth), self.index_of(predicted)) else {
            return;
        };
        let idx = t * self.n_classes() + p;
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    /// Count at row `truth`, column `predicted` (indices, not labels).
    pub fn get(&self, truth: usize, predicted: usize) -> u32 {
        self.counts[truth * self.n_classes() + predicted]
    }

    pub fn row_sum(&self, truth: usize) -> u32 {
        (0..self.n_classes()).map(|p| self.get(truth, p)).sum()
    }

    pub fn column_sum(&self, predicted: usize) -> u32 {
        (0..self.n_classes()).map(|t| self.get(t, predicted)).sum()
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn max(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn trace(&self) -> u32 {
        (0..self.n_classes()).map(|i| self.get(i, i)).sum()
    }

    fn index_of(&self, label: Label) -> Option<usize> {
        self.labels.iter().position(|&l| l == label)
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "confusion matrix (rows=true, cols=pred):")?;
        for truth in 0..self.n_classes() {
            let mut row = String::new();
            for pred in 0..self.n_classes() {
                row.push_str(&format!("{:6}", self.get(truth, pred)));
            }
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Precision/recall statistics for a single class.
pub struct PerClassStats {
    pub label: Label,
    /// `TP / (TP + FP)`, 0 when nothing was predicted as this class.
    pub precision: f64,
    /// `TP / (TP + FN)`, 0 when the class has no true examples.
    pub recall: f64,
    /// Harmonic mean of precision and recall, 0 when both are 0.
    pub f1: f64,
    /// Total number of true examples for the class.
    pub support: u32,
}

/// Compute per-class precision, recall and F1 from a confusion matrix.
pub fn precision_recall_by_class(cm: &ConfusionMatrix) -> Vec<PerClassStats> {
    let k = cm.n_classes();
    let mut stats = Vec::with_capacity(k);
    for class_idx in 0..k {
        let tp = cm.get(class_idx, class_idx) as f64;
        let support = cm.row_sum(class_idx);
        let predicted = cm.column_sum(class_idx) as f64;
        let precision = if predicted == 0.0 { 0.0 } else { tp / predicted };
        let recall = if support == 0 {
            0.0
        } else {
            tp / support as f64
        };
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        stats.push(PerClassStats {
            label: cm.labels[class_idx],
            precision,
            recall,
            f1,
            support,
        });
    }
    stats
}

/// Fraction of positions where `predicted` equals `truth`; NaN for empty input.
pub fn accuracy_score(truth: &[Label], predicted: &[Label]) -> f64 {
    let total = truth.len().min(predicted.len());
    if total == 0 {
        return f64::NAN;
    }
    let correct = truth
        .iter()
        .zip(predicted.iter())
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / total as f64
}

/// Text report of per-class metrics with accuracy and averaged rows.
#[derive(Debug, Clone)]
pub struct ClassificationReport {
    pub class_names: Vec<String>,
    pub per_class: Vec<PerClassStats>,
    pub accuracy: f64,
}

impl ClassificationReport {
    pub fn new(cm: &ConfusionMatrix, class_names: Vec<String>, accuracy: f64) -> Self {
        Self {
            class_names,
            per_class: precision_recall_by_class(cm),
            accuracy,
        }
    }

    pub fn total_support(&self) -> u32 {
        self.per_class.iter().map(|s| s.support).sum()
    }

    /// Unweighted mean of (precision, recall, f1).
    pub fn macro_avg(&self) -> (f64, f64, f64) {
        let n = self.per_class.len();
        if n == 0 {
            return (0.0, 0.0, 0.0);
        }
        let sum = self.per_class.iter().fold((0.0, 0.0, 0.0), |acc, s| {
            (acc.0 + s.precision, acc.1 + s.recall, acc.2 + s.f1)
        });
        (sum.0 / n as f64, sum.1 / n as f64, sum.2 / n as f64)
    }

    /// Support-weighted mean of (precision, recall, f1).
    pub fn weighted_avg(&self) -> (f64, f64, f64) {
        let total = self.total_support();
        if total == 0 {
            return (0.0, 0.0, 0.0);
        }
        let sum = self.per_class.iter().fold((0.0, 0.0, 0.0), |acc, s| {
            let w = s.support as f64;
            (
                acc.0 + s.precision * w,
                acc.1 + s.recall * w,
                acc.2 + s.f1 * w,
            )
        });
        let total = total as f64;
        (sum.0 / total, sum.1 / total, sum.2 / total)
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .class_names
            .iter()
            .map(String::len)
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(12);
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (stats, name) in self.per_class.iter().zip(self.class_names.iter()) {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, stats.precision, stats.recall, stats.f1, stats.support
            )?;
        }
        writeln!(f)?;
        let total = self.total_support();
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, total
        )?;
        let (p, r, f1) = self.macro_avg();
        writeln!(
            f,
            "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
            "macro avg", p, r, f1, total
        )?;
        let (p, r, f1) = self.weighted_avg();
        writeln!(
            f,
            "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
            "weighted avg", p, r, f1, total
        )
    }
}
