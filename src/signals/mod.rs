//! Signal evaluation interfaces.

pub mod evaluator;
pub mod scoring;

pub use evaluator::{evaluate, EvalMode};
pub use scoring::*;
