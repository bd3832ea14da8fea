//! Evaluation errors.
//!
//! These cover caller contract breaches only: a history buffer that does
//! not match what the program was compiled against. A gated conditional
//! producing no output is a normal outcome, not an error (see
//! [`EvalStatus`](super::EvalStatus)).

use crate::scalar::ScalarType;
use core::fmt;
use thiserror::Error;

/// Which history buffer violated the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Input,
    Output,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Input => write!(f, "input"),
            Side::Output => write!(f, "output"),
        }
    }
}

/// A history buffer handed to `evaluate` does not match the formats the
/// program was compiled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("{side} history holds {capacity} samples but the program needs {required}")]
    HistoryTooShallow {
        side: Side,
        required: usize,
        capacity: usize,
    },

    #[error("{side} history element type is {found} but the program was compiled for {expected}")]
    TypeMismatch {
        side: Side,
        expected: ScalarType,
        found: ScalarType,
    },

    #[error("{side} history sample length is {found} but the program was compiled for {expected}")]
    LengthMismatch {
        side: Side,
        expected: usize,
        found: usize,
    },
}
