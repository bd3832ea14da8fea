//! Allocation-free evaluation of compiled mapping programs.

mod error;
mod eval;

#[cfg(test)]
mod eval_test;

pub use error::{EvalError, Side};
pub use eval::{EvalStatus, Evaluator};
