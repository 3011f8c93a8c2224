//! The rule engine — joins fact sets and walks XOR decision trees.

pub mod evaluator;
pub mod join;
pub mod walker;

pub use evaluator::{evaluate, EvalOutput};
pub use join::{join_facts, FactPair};
pub use walker::{walk, WalkResult};
