//! Expression engine for real-time signal mapping.
//!
//! A mapping expression relates one input signal to one output signal,
//! sample by sample: `y = (x + y{-1}) * 0.5` smooths the input, `y =
//! midiToHz(x[0])` converts a note number, `y = x > 0.5 ? 1` gates. The
//! engine compiles such an expression once, against the declared numeric
//! type and vector length of each signal, and then evaluates the compiled
//! program for every incoming sample without allocating.
//!
//! Compilation resolves everything the evaluator would otherwise have to
//! decide per sample: numeric promotion (`i32` < `f32` < `f64`), vector
//! lengths and broadcasts, runtime casts, history depths, and constant
//! subexpressions (folded by running the evaluator at compile time).
//!
//! ```
//! use mapexpr::{Evaluator, EvalStatus, History, Scalar, ScalarType, compile};
//!
//! let program = compile(
//!     "y = x * 2",
//!     ScalarType::Float,
//!     ScalarType::Float,
//!     1,
//!     1,
//! )?;
//!
//! let mut input = History::new(ScalarType::Float, 1, program.input_history_depth());
//! let mut output = History::new(ScalarType::Float, 1, program.output_history_depth());
//! let mut evaluator = Evaluator::new(&program);
//!
//! input.push(&[Scalar::Float(3.0)]);
//! assert_eq!(evaluator.evaluate(&input, &mut output)?, EvalStatus::Output);
//! assert_eq!(output.latest(), Some(&[Scalar::Float(6.0)][..]));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The caller owns the [`History`] ring buffers and drives the loop: push
//! an input sample, call [`Evaluator::evaluate`], read the output. Output
//! self-reference (`y{-n}`) makes feedback filters expressible; a gated
//! conditional (`cond ? value`) may leave the output untouched for a
//! sample, reported as [`EvalStatus::NoOutput`].

mod compiler;
mod evaluator;
mod functions;
mod history;
mod lexer;
mod ops;
mod program;
mod scalar;
mod token;

pub use compiler::{CompileError, MAX_STACK, compile};
pub use evaluator::{EvalError, EvalStatus, Evaluator, Side};
pub use functions::Func;
pub use history::History;
pub use lexer::{LexError, Lexer, tokenize};
pub use ops::Op;
pub use program::CompiledProgram;
pub use scalar::{Scalar, ScalarType};
pub use token::{Token, TokenKind, Var};
