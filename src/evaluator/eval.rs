//! The RPN stack machine.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use super::error::{EvalError, Side};
use crate::functions::Func;
use crate::history::History;
use crate::ops::Op;
use crate::program::CompiledProgram;
use crate::scalar::{Scalar, ScalarType};
use crate::token::{TokenKind, Var};

/// Outcome of a successful evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalStatus {
    /// A sample was appended to the output history.
    Output,
    /// A gated conditional was false; the output history is untouched.
    NoOutput,
}

/// Reusable evaluation scratch for one [`CompiledProgram`].
///
/// Construction allocates the slot matrix (one row per program token,
/// `vector_capacity` elements wide) and the RNG; [`evaluate`] itself
/// allocates nothing and may be called once per incoming sample.
///
/// The evaluator borrows the program, so one program can back many
/// evaluators, e.g. one per worker thread.
///
/// [`evaluate`]: Evaluator::evaluate
pub struct Evaluator<'p> {
    program: &'p CompiledProgram,
    /// Row-major slot matrix, `tokens.len() * vector_capacity` elements.
    slots: Vec<Scalar>,
    /// Filled element count per row.
    dims: Vec<usize>,
    rng: SmallRng,
}

impl<'p> Evaluator<'p> {
    /// Scratch for `program`, with an OS-seeded RNG for `uniform`.
    pub fn new(program: &'p CompiledProgram) -> Evaluator<'p> {
        Evaluator::with_rng(program, SmallRng::from_os_rng())
    }

    /// Scratch for `program` with a caller-provided RNG. Seeding the RNG
    /// makes `uniform` deterministic, which tests rely on.
    pub fn with_rng(program: &'p CompiledProgram, rng: SmallRng) -> Evaluator<'p> {
        let rows = program.tokens().len().max(1);
        let width = program.vector_capacity();
        Evaluator {
            program,
            slots: vec![Scalar::Int32(0); rows * width],
            dims: vec![0; rows],
            rng,
        }
    }

    /// The program this evaluator runs.
    pub fn program(&self) -> &'p CompiledProgram {
        self.program
    }

    fn check_contract(&self, input: &History, output: &History) -> Result<(), EvalError> {
        let p = self.program;
        for (side, hist, required, ty, len) in [
            (
                Side::Input,
                input,
                p.input_history_depth(),
                p.input_type(),
                p.input_vector_length(),
            ),
            (
                Side::Output,
                output,
                p.output_history_depth(),
                p.output_type(),
                p.output_vector_length(),
            ),
        ] {
            if hist.capacity() < required {
                return Err(EvalError::HistoryTooShallow {
                    side,
                    required,
                    capacity: hist.capacity(),
                });
            }
            if hist.scalar_type() != ty {
                return Err(EvalError::TypeMismatch {
                    side,
                    expected: ty,
                    found: hist.scalar_type(),
                });
            }
            if hist.vector_length() != len {
                return Err(EvalError::LengthMismatch {
                    side,
                    expected: len,
                    found: hist.vector_length(),
                });
            }
        }
        Ok(())
    }

    /// Run the program against the current input sample, appending one
    /// sample to `output` unless a gated conditional suppresses it.
    ///
    /// The input history's write position must already point at the
    /// sample to map; the output write position is advanced only when a
    /// sample is actually produced.
    pub fn evaluate(
        &mut self,
        input: &History,
        output: &mut History,
    ) -> Result<EvalStatus, EvalError> {
        self.check_contract(input, output)?;

        let program = self.program;
        let width = program.vector_capacity();
        // rows in use; the active row is sp - 1
        let mut sp = 0usize;

        for tok in program.tokens() {
            let row = match tok.kind {
                TokenKind::Constant(v) => {
                    let row = sp;
                    sp += 1;
                    self.dims[row] = tok.vector_length;
                    for i in 0..tok.vector_length {
                        self.slots[row * width + i] = v;
                    }
                    row
                }

                TokenKind::Variable {
                    var,
                    history_offset,
                    vector_index,
                } => {
                    let row = sp;
                    sp += 1;
                    self.dims[row] = tok.vector_length;
                    // the output's pending sample is not yet committed,
                    // so its reads are biased one slot back
                    let (hist, bias) = match var {
                        Var::X => (input, 0),
                        Var::Y => (&*output, 1),
                    };
                    let sample = hist.sample(hist.ring_index(history_offset, bias));
                    self.slots[row * width..row * width + tok.vector_length]
                        .copy_from_slice(&sample[vector_index..vector_index + tok.vector_length]);
                    row
                }

                TokenKind::Op(op) => {
                    let row = sp - op.arity();
                    sp = row + 1;
                    self.dims[row] = tok.vector_length;
                    match op {
                        Op::LogicalNot => {
                            for i in 0..tok.vector_length {
                                let a = self.slots[row * width + i];
                                self.slots[row * width + i] = from_bool(!a.is_truthy(), tok.ty);
                            }
                        }
                        Op::ConditionalIf => {
                            for i in 0..tok.vector_length {
                                if !self.slots[row * width + i].is_truthy() {
                                    trace!("conditional gate closed, no output");
                                    return Ok(EvalStatus::NoOutput);
                                }
                                self.slots[row * width + i] = self.slots[(row + 1) * width + i];
                            }
                        }
                        Op::ConditionalIfElse => {
                            for i in 0..tok.vector_length {
                                let branch = if self.slots[row * width + i].is_truthy() {
                                    row + 1
                                } else {
                                    row + 2
                                };
                                self.slots[row * width + i] = self.slots[branch * width + i];
                            }
                        }
                        _ => {
                            for i in 0..tok.vector_length {
                                let a = self.slots[row * width + i];
                                let b = self.slots[(row + 1) * width + i];
                                match binary(op, tok.ty, a, b) {
                                    Some(v) => self.slots[row * width + i] = v,
                                    // bit operations have no meaning on
                                    // floating-point operands
                                    None => return Ok(EvalStatus::NoOutput),
                                }
                            }
                        }
                    }
                    row
                }

                TokenKind::Func(f) => {
                    let row = sp - f.arity();
                    sp = row + 1;
                    self.dims[row] = tok.vector_length;
                    match f.arity() {
                        0 => {
                            let v = f.apply0(tok.ty);
                            for i in 0..tok.vector_length {
                                self.slots[row * width + i] = v;
                            }
                        }
                        1 if f == Func::Uniform => {
                            for i in 0..tok.vector_length {
                                let x = self.slots[row * width + i];
                                self.slots[row * width + i] = self.uniform(x);
                            }
                        }
                        1 => {
                            for i in 0..tok.vector_length {
                                let x = self.slots[row * width + i];
                                self.slots[row * width + i] = f.apply1(x);
                            }
                        }
                        _ => {
                            for i in 0..tok.vector_length {
                                let x = self.slots[row * width + i];
                                let y = self.slots[(row + 1) * width + i];
                                self.slots[row * width + i] = f.apply2(x, y);
                            }
                        }
                    }
                    row
                }

                TokenKind::Vectorize { arity } => {
                    let row = sp - arity;
                    sp = row + 1;
                    // the first sub-vector is already in place
                    let mut k = self.dims[row];
                    for sub in 1..arity {
                        for j in 0..self.dims[row + sub] {
                            self.slots[row * width + k] = self.slots[(row + sub) * width + j];
                            k += 1;
                        }
                    }
                    self.dims[row] = tok.vector_length;
                    row
                }

                _ => unreachable!("structural token in compiled program"),
            };

            if let Some(cast) = tok.cast_to {
                for i in 0..tok.vector_length {
                    self.slots[row * width + i] = self.slots[row * width + i].cast(cast);
                }
            }
        }

        let top = sp - 1;
        let start = top * width;
        output.push(&self.slots[start..start + output.vector_length()]);
        Ok(EvalStatus::Output)
    }

    /// Draw from `[0, x)`, scaled like the original `rand()/RAND_MAX * x`
    /// so a non-positive bound cannot panic.
    fn uniform(&mut self, x: Scalar) -> Scalar {
        match x {
            Scalar::Float(x) => Scalar::Float(self.rng.random::<f32>() * x),
            Scalar::Double(x) => Scalar::Double(self.rng.random::<f64>() * x),
            Scalar::Int32(_) => unreachable!("uniform never resolves to an integer"),
        }
    }
}

fn from_bool(b: bool, ty: ScalarType) -> Scalar {
    match ty {
        ScalarType::Int32 => Scalar::Int32(b as i32),
        ScalarType::Float => Scalar::Float(b as i32 as f32),
        ScalarType::Double => Scalar::Double(b as i32 as f64),
    }
}

/// Apply a binary operator in the resolved type. Returns `None` for the
/// integer-only operators applied to floating-point operands.
fn binary(op: Op, ty: ScalarType, a: Scalar, b: Scalar) -> Option<Scalar> {
    match ty {
        ScalarType::Int32 => Some(Scalar::Int32(binary_i32(op, a.as_i32(), b.as_i32()))),
        ScalarType::Float => binary_float(op, a.as_f64(), b.as_f64()).map(|v| Scalar::Float(v as f32)),
        ScalarType::Double => binary_float(op, a.as_f64(), b.as_f64()).map(Scalar::Double),
    }
}

fn binary_i32(op: Op, a: i32, b: i32) -> i32 {
    match op {
        Op::Add => a.wrapping_add(b),
        Op::Subtract => a.wrapping_sub(b),
        Op::Multiply => a.wrapping_mul(b),
        // division by zero yields zero rather than faulting mid-stream
        Op::Divide => {
            if b == 0 {
                0
            } else {
                a.wrapping_div(b)
            }
        }
        Op::Modulo => {
            if b == 0 {
                0
            } else {
                a.wrapping_rem(b)
            }
        }
        Op::Equal => (a == b) as i32,
        Op::NotEqual => (a != b) as i32,
        Op::Less => (a < b) as i32,
        Op::LessEqual => (a <= b) as i32,
        Op::Greater => (a > b) as i32,
        Op::GreaterEqual => (a >= b) as i32,
        Op::LeftShift => a.wrapping_shl(b as u32),
        Op::RightShift => a.wrapping_shr(b as u32),
        Op::BitAnd => a & b,
        Op::BitOr => a | b,
        Op::BitXor => a ^ b,
        Op::LogicalAnd => (a != 0 && b != 0) as i32,
        Op::LogicalOr => (a != 0 || b != 0) as i32,
        Op::LogicalNot | Op::ConditionalIf | Op::ConditionalIfElse | Op::Assign => {
            unreachable!("{op} is not a binary operator")
        }
    }
}

fn binary_float(op: Op, a: f64, b: f64) -> Option<f64> {
    Some(match op {
        Op::Add => a + b,
        Op::Subtract => a - b,
        Op::Multiply => a * b,
        Op::Divide => a / b,
        Op::Modulo => a % b,
        Op::Equal => (a == b) as i32 as f64,
        Op::NotEqual => (a != b) as i32 as f64,
        Op::Less => (a < b) as i32 as f64,
        Op::LessEqual => (a <= b) as i32 as f64,
        Op::Greater => (a > b) as i32 as f64,
        Op::GreaterEqual => (a >= b) as i32 as f64,
        Op::LogicalAnd => ((a != 0.0) && (b != 0.0)) as i32 as f64,
        Op::LogicalOr => ((a != 0.0) || (b != 0.0)) as i32 as f64,
        Op::LeftShift | Op::RightShift | Op::BitAnd | Op::BitOr | Op::BitXor => return None,
        Op::LogicalNot | Op::ConditionalIf | Op::ConditionalIfElse | Op::Assign => {
            unreachable!("{op} is not a binary operator")
        }
    })
}
