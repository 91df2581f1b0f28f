//! Deterministic CART decision tree (Gini impurity, unbounded depth).
//!
//! Leaves keep per-class sample counts, so the model exposes class
//! probabilities as well as point predictions. The training seed only changes
//! the order in which features are tried at each node, which decides between
//! equally good splits.

mod model;
mod train;

pub use model::{CartModel, Node};
pub use train::{CartOptions, train_cart};
