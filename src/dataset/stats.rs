//! Descriptive statistics printed during data preparation.

use std::collections::BTreeMap;
use std::fmt;

use super::LabelledDataset;
use crate::species::{Label, SpeciesMap};

/// Summary statistics for a single measurement column.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (`n - 1` denominator); NaN below two rows.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Count and share of one class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassShare {
    pub label: Label,
    pub count: usize,
    /// Percentage of all rows, in `[0, 100]`.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub rows: usize,
    pub features: Vec<FeatureSummary>,
    pub classes: Vec<ClassShare>,
}

/// Compute per-feature statistics and the class distribution.
pub fn describe(data: &LabelledDataset) -> DatasetSummary {
    let features = data
        .feature_names
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let values: Vec<f64> = data.x.iter().map(|row| row[col]).collect();
            summarize(name, values)
        })
        .collect();
    DatasetSummary {
        rows: data.len(),
        features,
        classes: class_distribution(&data.y),
    }
}

/// Counts and percentages per label, ascending by label.
pub fn class_distribution(labels: &[Label]) -> Vec<ClassShare> {
    let mut counts = BTreeMap::<Label, usize>::new();
    for &label in labels {
        *counts.entry(label).or_default() += 1;
    }
    let total = labels.len();
    counts
        .into_iter()
        .map(|(label, count)| ClassShare {
            label,
            count,
            percent: if total == 0 {
                0.0
            } else {
                count as f64 * 100.0 / total as f64
            },
        })
        .collect()
}

fn summarize(name: &str, mut values: Vec<f64>) -> FeatureSummary {
    let count = values.len();
    values.sort_by(f64::total_cmp);
    let mean = if count == 0 {
        f64::NAN
    } else {
        values.iter().sum::<f64>() / count as f64
    };
    let std = if count < 2 {
        f64::NAN
    } else {
        let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        (ss / (count - 1) as f64).sqrt()
    };
    FeatureSummary {
        name: name.to_string(),
        count,
        mean,
        std,
        min: values.first().copied().unwrap_or(f64::NAN),
        q25: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q75: quantile(&values, 0.75),
        max: values.last().copied().unwrap_or(f64::NAN),
    }
}

/// Linear-interpolation quantile of already sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<6}", "")?;
        for feature in &self.features {
            write!(f, "{:>14}", feature.name)?;
        }
        writeln!(f)?;
        type Getter = fn(&FeatureSummary) -> f64;
        let rows: [(&str, Getter); 8] = [
            ("count", |s| s.count as f64),
            ("mean", |s| s.mean),
            ("std", |s| s.std),
            ("min", |s| s.min),
            ("25%", |s| s.q25),
            ("50%", |s| s.median),
            ("75%", |s| s.q75),
            ("max", |s| s.max),
        ];
        for (label, get) in rows {
            write!(f, "{label:<6}")?;
            for feature in &self.features {
                write!(f, "{:>14.6}", get(feature))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Render a distribution as `Class <label> (<name>): <n> samples (<pct>%)` lines.
pub fn format_distribution(shares: &[ClassShare], species: &SpeciesMap) -> String {
    shares
        .iter()
        .map(|share| {
            format!(
                "  Class {} ({}): {} samples ({:.1}%)",
                share.label,
                species.name(share.label).unwrap_or(crate::species::UNKNOWN_SPECIES),
                share.count,
                share.percent
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn summary_matches_hand_computed_values() {
        let data = LabelledDataset {
            feature_names: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            x: vec![
                [1.0, 0.0, 0.0, 0.0],
                [2.0, 0.0, 0.0, 0.0],
                [3.0, 0.0, 0.0, 0.0],
                [4.0, 0.0, 0.0, 0.0],
            ],
            y: vec![1, 1, 2, 3],
        };
        let summary = describe(&data);
        let a = &summary.features[0];
        assert_eq!(a.count, 4);
        assert!(approx(a.mean, 2.5));
        assert!(approx(a.std, (5.0f64 / 3.0).sqrt()));
        assert!(approx(a.q25, 1.75));
        assert!(approx(a.median, 2.5));
        assert!(approx(a.q75, 3.25));
        assert_eq!((a.min, a.max), (1.0, 4.0));
        assert_eq!(summary.classes[0].count, 2);
        assert!(approx(summary.classes[0].percent, 50.0));
    }

    #[test]
    fn empty_distribution_has_no_rows() {
        assert!(class_distribution(&[]).is_empty());
    }

    #[test]
    fn display_lists_every_statistic() {
        let data = LabelledDataset {
            feature_names: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            x: vec![[1.0; 4], [2.0; 4]],
            y: vec![1, 2],
        };
        let text = describe(&data).to_string();
        for label in ["count", "mean", "std", "min", "25%", "50%", "75%", "max"] {
            assert!(text.contains(label), "missing {label}");
        }
    }
}
