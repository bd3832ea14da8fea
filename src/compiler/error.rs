//! Compilation errors.

use crate::lexer::LexError;
use crate::token::Var;
use thiserror::Error;

/// A compilation failure.
///
/// Every variant carries the byte offset in the source text nearest the
/// problem, recoverable through [`CompileError::offset`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("expression must start with `y =`")]
    MissingPrefix,

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("unmatched parenthesis or misplaced comma at offset {offset}")]
    UnmatchedParen { offset: usize },

    #[error("unmatched bracket or misplaced comma at offset {offset}")]
    UnmatchedBracket { offset: usize },

    #[error("unmatched brace at offset {offset}")]
    UnmatchedBrace { offset: usize },

    #[error("`:` without a matching `?` at offset {offset}")]
    UnmatchedColon { offset: usize },

    #[error("vector index must be an integer constant at offset {offset}")]
    NonIntegerIndex { offset: usize },

    #[error("vector index {index} exceeds length {length} of `{}` at offset {offset}", var.name())]
    IndexOutOfBounds {
        var: Var,
        index: i32,
        length: usize,
        offset: usize,
    },

    #[error("malformed vector index at offset {offset}")]
    MalformedIndex { offset: usize },

    #[error("history offset must be an integer constant at offset {offset}")]
    NonIntegerHistory { offset: usize },

    #[error("history offset {found} not allowed for `{}` (maximum {max}) at offset {offset}", var.name())]
    BadHistoryOffset {
        var: Var,
        found: i32,
        max: i32,
        offset: usize,
    },

    #[error("nested vector literals are not allowed at offset {offset}")]
    NestedVectorLiteral { offset: usize },

    #[error("vector length mismatch ({found} != {expected}) at offset {offset}")]
    VectorLengthMismatch {
        found: usize,
        expected: usize,
        offset: usize,
    },

    #[error("expression vector length {found} does not match output length {expected}")]
    OutputLengthMismatch { found: usize, expected: usize },

    #[error("expression too deep (stack limit {limit}) at offset {offset}")]
    StackOverflow { limit: usize, offset: usize },

    #[error("malformed expression at offset {offset}")]
    MalformedExpression { offset: usize },
}

impl CompileError {
    /// Byte offset in the source text nearest the failure.
    pub fn offset(&self) -> usize {
        match self {
            CompileError::MissingPrefix => 0,
            CompileError::Lex(e) => e.offset(),
            CompileError::OutputLengthMismatch { .. } => 0,
            CompileError::UnmatchedParen { offset }
            | CompileError::UnmatchedBracket { offset }
            | CompileError::UnmatchedBrace { offset }
            | CompileError::UnmatchedColon { offset }
            | CompileError::NonIntegerIndex { offset }
            | CompileError::IndexOutOfBounds { offset, .. }
            | CompileError::MalformedIndex { offset }
            | CompileError::NonIntegerHistory { offset }
            | CompileError::BadHistoryOffset { offset, .. }
            | CompileError::NestedVectorLiteral { offset }
            | CompileError::VectorLengthMismatch { offset, .. }
            | CompileError::StackOverflow { offset, .. }
            | CompileError::MalformedExpression { offset } => *offset,
        }
    }
}
