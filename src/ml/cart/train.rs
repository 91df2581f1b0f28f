use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use super::model::{CartModel, Node};
use crate::dataset::{FEATURE_COUNT, Measurements};
use crate::ml::{TrainDataset, TrainError};

/// Training options for the CART backend.
#[derive(Debug, Clone)]
pub struct CartOptions {
    /// Seed for the per-node feature order.
    pub seed: u64,
}

impl Default for CartOptions {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

/// Grow a full-depth CART tree on `dataset`.
///
/// Nodes split until they are pure or every feature is constant within the node.
pub fn train_cart(dataset: &TrainDataset<'_>, options: &CartOptions) -> Result<CartModel, TrainError> {
    dataset.check()?;
    let classes = dataset.classes();
    let y: Vec<usize> = dataset
        .y
        .iter()
        .map(|label| classes.binary_search(label).unwrap_or(0))
        .collect();

    let mut builder = TreeBuilder {
        x: dataset.x,
        y: &y,
        n_classes: classes.len(),
        rng: StdRng::seed_from_u64(options.seed),
        nodes: Vec::new(),
    };
    let samples: Vec<usize> = (0..dataset.x.len()).collect();
    builder.grow(&samples);

    let model = CartModel {
        classes,
        n_features: FEATURE_COUNT,
        nodes: builder.nodes,
    };
    tracing::debug!(
        "CART fitted: depth {}, {} leaves",
        model.depth(),
        model.n_leaves()
    );
    Ok(model)
}

struct TreeBuilder<'a> {
    x: &'a [Measurements],
    y: &'a [usize],
    n_classes: usize,
    rng: StdRng,
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Copy)]
struct BestSplit {
    /// Sample-weighted Gini impurity of the two children.
    impurity: f64,
    feature: usize,
    threshold: f64,
}

impl TreeBuilder<'_> {
    fn grow(&mut self, samples: &[usize]) -> usize {
        let counts = self.class_counts(samples);
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf {
            counts: counts.clone(),
        });
        if counts.iter().filter(|&&c| c > 0).count() <= 1 {
            return id;
        }
        let Some(split) = self.best_split(samples, &counts) else {
            return id;
        };

        let x = self.x;
        let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .partition(|&&i| x[i][split.feature] <= split.threshold);
        let left = self.grow(&left_samples);
        let right = self.grow(&right_samples);
        self.nodes[id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            counts,
        };
        id
    }

    fn class_counts(&self, samples: &[usize]) -> Vec<u32> {
        let mut counts = vec![0u32; self.n_classes];
        for &i in samples {
            counts[self.y[i]] += 1;
        }
        counts
    }

    fn best_split(&mut self, samples: &[usize], parent_counts: &[u32]) -> Option<BestSplit> {
        let x = self.x;
        let y = self.y;
        let n = samples.len() as f64;
        let mut features: Vec<usize> = (0..FEATURE_COUNT).collect();
        features.shuffle(&mut self.rng);

        let mut best: Option<BestSplit> = None;
        let mut order = samples.to_vec();
        for feature in features {
            order.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]).then(a.cmp(&b)));
            let mut left = vec![0u32; self.n_classes];
            let mut right = parent_counts.to_vec();
            for pos in 0..order.len() - 1 {
                let class = y[order[pos]];
                left[class] += 1;
                right[class] -= 1;

                let value = x[order[pos]][feature];
                let next = x[order[pos + 1]][feature];
                if !(next > value) {
                    continue;
                }
                let n_left = (pos + 1) as f64;
                let n_right = n - n_left;
                let impurity = (n_left * gini(&left, n_left) + n_right * gini(&right, n_right)) / n;
                if best.is_none_or(|b| impurity < b.impurity) {
                    let mut threshold = value + (next - value) / 2.0;
                    if !(threshold < next) {
                        threshold = value;
                    }
                    best = Some(BestSplit {
                        impurity,
                        feature,
                        threshold,
                    });
                }
            }
        }
        best
    }
}

fn gini(counts: &[u32], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    let sum_sq: f64 = counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum();
    1.0 - sum_sq
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(x: &[Measurements], y: &[usize], seed: u64) -> CartModel {
        train_cart(&TrainDataset { x, y }, &CartOptions { seed }).unwrap()
    }

    #[test]
    fn gini_of_pure_and_even_nodes() {
        assert_eq!(gini(&[4, 0], 4.0), 0.0);
        assert!((gini(&[2, 2], 4.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn separable_data_is_fitted_exactly() {
        let x = vec![
            [1.0, 0.0, 0.0, 0.0],
            [2.0, 0.0, 0.0, 0.0],
            [3.0, 0.0, 0.0, 0.0],
            [4.0, 0.0, 0.0, 0.0],
            [5.0, 0.0, 0.0, 0.0],
            [6.0, 0.0, 0.0, 0.0],
        ];
        let y = vec![1, 1, 2, 2, 3, 3];
        let model = fit(&x, &y, 42);
        model.validate().unwrap();
        for (row, &label) in x.iter().zip(y.iter()) {
            assert_eq!(model.predict(row), label);
        }
        assert_eq!(model.n_leaves(), 3);
        assert_eq!(model.depth(), 2);
        let first = match &model.nodes[0] {
            Node::Split { threshold, .. } => *threshold,
            other => panic!("expected split, got {other:?}"),
        };
        assert!(first == 2.5 || first == 4.5);
    }

    #[test]
    fn identical_rows_with_conflicting_labels_become_a_leaf() {
        let x = vec![[1.0; 4], [1.0; 4], [1.0; 4]];
        let y = vec![1, 2, 2];
        let model = fit(&x, &y, 0);
        assert_eq!(model.nodes.len(), 1);
        assert_eq!(model.predict(&[1.0; 4]), 2);
        let proba = model.predict_proba(&[1.0; 4]);
        assert!((proba[0] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn same_seed_same_tree() {
        let x: Vec<Measurements> = (0..40)
            .map(|i| {
                let v = i as f64;
                [v % 7.0, v % 5.0, v % 3.0, v % 2.0]
            })
            .collect();
        let y: Vec<usize> = (0..40).map(|i| i % 3 + 1).collect();
        assert_eq!(fit(&x, &y, 9), fit(&x, &y, 9));
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let err = train_cart(&TrainDataset { x: &[], y: &[] }, &CartOptions::default()).unwrap_err();
        assert!(matches!(err, TrainError::Empty));
    }
}
