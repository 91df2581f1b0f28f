use serde::{Deserialize, Serialize};

use crate::species::Label;

/// Tree node; children always have a larger index than their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Terminal node with training counts per class (aligned with `CartModel::classes`).
    Leaf { counts: Vec<u32> },
    /// Internal node: `row[feature] <= threshold` goes left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        counts: Vec<u32>,
    },
}

impl Node {
    pub fn counts(&self) -> &[u32] {
        match self {
            Node::Leaf { counts } | Node::Split { counts, .. } => counts,
        }
    }
}

/// Fitted CART classifier stored as a flat node arena rooted at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartModel {
    /// Ordered class labels seen during training.
    pub classes: Vec<Label>,
    /// Number of features per row.
    pub n_features: usize,
    pub nodes: Vec<Node>,
}

impl CartModel {
    /// Validate structural invariants of the model.
    pub fn validate(&self) -> Result<(), String> {
        if self.classes.is_empty() {
            return Err("Model must contain at least 1 class".to_string());
        }
        if self.nodes.is_empty() {
            return Err("Model has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            if node.counts().len() != self.classes.len() {
                return Err(format!(
                    "Node {idx} has {} class counts but expected {}",
                    node.counts().len(),
                    self.classes.len()
                ));
            }
            if let Node::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= self.n_features {
                    return Err(format!("Node {idx} splits on unknown feature {feature}"));
                }
                if *left <= idx || *right <= idx || *left >= self.nodes.len() || *right >= self.nodes.len() {
                    return Err(format!("Node {idx} has invalid children {left}/{right}"));
                }
            }
        }
        Ok(())
    }

    fn leaf_counts(&self, row: &[f64]) -> &[u32] {
        let mut idx = 0usize;
        while let Some(node) = self.nodes.get(idx) {
            match node {
                Node::Leaf { counts } => return counts,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    let value = row.get(*feature).copied().unwrap_or(0.0);
                    idx = if value <= *threshold { *left } else { *right };
                }
            }
        }
        &[]
    }

    /// Predict the class label for one row (ties go to the lowest label).
    pub fn predict(&self, row: &[f64]) -> Label {
        let counts = self.leaf_counts(row);
        let best = argmax(counts);
        self.classes.get(best).copied().unwrap_or_default()
    }

    /// Class probabilities for one row, aligned with `classes`.
    pub fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        let counts = self.leaf_counts(row);
        let total: u32 = counts.iter().sum();
        if total == 0 {
            return vec![0.0; self.classes.len()];
        }
        counts
            .iter()
            .map(|&c| c as f64 / total as f64)
            .collect()
    }

    /// Longest root-to-leaf path in edges (a single leaf has depth 0).
    pub fn depth(&self) -> usize {
        let mut max_depth = 0usize;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            match self.nodes.get(idx) {
                Some(Node::Split { left, right, .. }) => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
                Some(Node::Leaf { .. }) => max_depth = max_depth.max(depth),
                None => {}
            }
        }
        max_depth
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf { .. }))
            .count()
    }
}

fn argmax(counts: &[u32]) -> usize {
    let mut best_idx = 0usize;
    let mut best_val = 0u32;
    for (idx, &v) in counts.iter().enumerate() {
        if v > best_val {
            best_val = v;
            best_idx = idx;
        }
    }
    best_idx
}
