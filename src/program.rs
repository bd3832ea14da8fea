//! The compiled form of a mapping expression.

use crate::scalar::ScalarType;
use crate::token::Token;
use core::fmt;

/// An immutable, fully-annotated RPN program.
///
/// Produced by [`compile`](crate::compile); consumed by
/// [`Evaluator`](crate::Evaluator). Every token carries its resolved
/// numeric type, vector length and any runtime cast, so evaluation never
/// consults the source text again.
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    tokens: Vec<Token>,
    vector_capacity: usize,
    input_history_depth: usize,
    output_history_depth: usize,
    input_type: ScalarType,
    output_type: ScalarType,
    input_vector_length: usize,
    output_vector_length: usize,
    uses_input: bool,
}

impl CompiledProgram {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        tokens: Vec<Token>,
        input_history_depth: usize,
        output_history_depth: usize,
        input_type: ScalarType,
        output_type: ScalarType,
        input_vector_length: usize,
        output_vector_length: usize,
        uses_input: bool,
    ) -> CompiledProgram {
        let vector_capacity = tokens
            .iter()
            .map(|t| t.vector_length)
            .max()
            .unwrap_or(1)
            .max(output_vector_length);
        CompiledProgram {
            tokens,
            vector_capacity,
            input_history_depth,
            output_history_depth,
            input_type,
            output_type,
            input_vector_length,
            output_vector_length,
            uses_input,
        }
    }

    /// Tokens in evaluation (RPN) order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Widest vector length any evaluation slot can hold.
    pub fn vector_capacity(&self) -> usize {
        self.vector_capacity
    }

    /// Minimum input-history capacity required to evaluate, in samples.
    ///
    /// Always at least 1: the current sample counts.
    pub fn input_history_depth(&self) -> usize {
        self.input_history_depth
    }

    /// Minimum output-history capacity required to evaluate, in samples.
    pub fn output_history_depth(&self) -> usize {
        self.output_history_depth
    }

    /// Declared element type of the input signal.
    pub fn input_type(&self) -> ScalarType {
        self.input_type
    }

    /// Declared element type of the output signal.
    pub fn output_type(&self) -> ScalarType {
        self.output_type
    }

    /// Declared vector length of the input signal.
    pub fn input_vector_length(&self) -> usize {
        self.input_vector_length
    }

    /// Declared vector length of the output signal.
    pub fn output_vector_length(&self) -> usize {
        self.output_vector_length
    }

    /// Whether any token reads the input signal. A mapping like
    /// `y = y{-1} + 1` is a pure generator and ignores `x` entirely.
    pub fn uses_input(&self) -> bool {
        self.uses_input
    }
}

impl fmt::Display for CompiledProgram {
    /// One token per line, in evaluation order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tok) in self.tokens.iter().enumerate() {
            writeln!(f, "{i:3}: {tok}")?;
        }
        Ok(())
    }
}
