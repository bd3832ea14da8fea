//! Token representation shared by the lexer, compiler and evaluator.
//!
//! A token starts life as raw lexer output and is progressively annotated
//! by the compiler: resolved numeric type, vector length, length lock and
//! an optional runtime cast. The compiled program is simply a vector of
//! fully-annotated tokens in RPN order.

use crate::functions::Func;
use crate::ops::Op;
use crate::scalar::{Scalar, ScalarType};
use core::fmt;

/// Which signal a variable token reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Var {
    /// The input signal `x` (history offsets <= 0).
    X,
    /// The output signal `y` (history offsets < 0, feedback only).
    Y,
}

impl Var {
    pub const fn name(self) -> &'static str {
        match self {
            Var::X => "x",
            Var::Y => "y",
        }
    }
}

/// Discriminated token payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    /// A literal or folded constant, broadcast across the token's vector
    /// length at evaluation time.
    Constant(Scalar),
    /// A signal reference with time-history and vector addressing.
    Variable {
        var: Var,
        /// Samples back in time; 0 is the current input sample.
        history_offset: i32,
        /// First element read from the sample vector.
        vector_index: usize,
    },
    Op(Op),
    Func(Func),
    /// Vector-literal marker: concatenates its `arity` operand vectors.
    Vectorize { arity: usize },
    OpenParen,
    CloseParen,
    OpenSquare,
    CloseSquare,
    OpenCurly,
    CloseCurly,
    Comma,
    Question,
    Colon,
    /// Unary-negation marker, rewritten by the compiler to `0 - operand`.
    Negate,
    End,
}

/// A token plus the annotations the compiler resolves for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Resolved numeric type of the value this token produces.
    pub ty: ScalarType,
    /// Runtime cast applied to the produced value, if any.
    pub cast_to: Option<ScalarType>,
    /// Number of elements the produced value holds.
    pub vector_length: usize,
    /// Whether the vector length is fixed (indexing, slicing, literals)
    /// and must match exactly at combination points.
    pub length_locked: bool,
}

impl Token {
    /// A fresh token with default annotations, as produced by the lexer.
    pub fn new(kind: TokenKind) -> Token {
        Token {
            kind,
            ty: ScalarType::Int32,
            cast_to: None,
            vector_length: 1,
            length_locked: false,
        }
    }

    /// A constant token carrying `value`, typed after it.
    pub fn constant(value: Scalar) -> Token {
        Token {
            ty: value.ty(),
            ..Token::new(TokenKind::Constant(value))
        }
    }

    /// How many already-evaluated operands this token consumes.
    pub fn arity(&self) -> usize {
        match self.kind {
            TokenKind::Op(op) => op.arity(),
            TokenKind::Func(f) => f.arity(),
            TokenKind::Vectorize { arity } => arity,
            _ => 0,
        }
    }

    /// Type this token contributes at a combination point: the wider of
    /// its resolved type and its pending runtime cast.
    pub fn effective_ty(&self) -> ScalarType {
        match self.cast_to {
            Some(cast) => self.ty.max(cast),
            None => self.ty,
        }
    }
}

impl fmt::Display for Token {
    /// Compact debug rendering used by the RPN program listing, e.g.
    /// `3f32x1`, `x:f32x2'{-1}[0]`, `*f32x2`, `VECT(2)i32x3`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lock = if self.length_locked { "'" } else { "" };
        match self.kind {
            TokenKind::Constant(v) => {
                write!(f, "{}{}x{}{}", v, self.ty, self.vector_length, lock)?
            }
            TokenKind::Variable {
                var,
                history_offset,
                vector_index,
            } => write!(
                f,
                "{}:{}x{}{}{{{}}}[{}]",
                var.name(),
                self.ty,
                self.vector_length,
                lock,
                history_offset,
                vector_index
            )?,
            TokenKind::Op(op) => write!(f, "{}{}x{}{}", op, self.ty, self.vector_length, lock)?,
            TokenKind::Func(func) => {
                write!(f, "{}(){}x{}{}", func, self.ty, self.vector_length, lock)?
            }
            TokenKind::Vectorize { arity } => {
                write!(f, "VECT({}){}x{}", arity, self.ty, self.vector_length)?
            }
            TokenKind::OpenParen => write!(f, "(")?,
            TokenKind::CloseParen => write!(f, ")")?,
            TokenKind::OpenSquare => write!(f, "[")?,
            TokenKind::CloseSquare => write!(f, "]")?,
            TokenKind::OpenCurly => write!(f, "{{")?,
            TokenKind::CloseCurly => write!(f, "}}")?,
            TokenKind::Comma => write!(f, ",")?,
            TokenKind::Question => write!(f, "?")?,
            TokenKind::Colon => write!(f, ":")?,
            TokenKind::Negate => write!(f, "NEG")?,
            TokenKind::End => write!(f, "END")?,
        }
        if let Some(cast) = self.cast_to {
            write!(f, "->{}", cast)?;
        }
        Ok(())
    }
}
