//! Expression compiler.
//!
//! Turns a mapping expression like `y = (x + y{-1}) * 0.5` into a
//! [`CompiledProgram`](crate::CompiledProgram): an RPN token list with
//! every numeric type, vector length and runtime cast resolved against
//! the declared input and output signal formats.

mod error;
mod shunting_yard;
mod typing;


pub use error::CompileError;
pub use shunting_yard::{MAX_STACK, compile};
