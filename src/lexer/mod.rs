//! Single-pass tokenizer for the mapping expression language.
//!
//! The lexer is stateless apart from its cursor: each call to
//! [`Lexer::next_token`] consumes one token from the source text. The one
//! context-sensitive rule is `-`, which lexes as subtraction when the
//! preceding non-space character is alphanumeric or a closing bracket and
//! as a unary-negation marker otherwise.

mod lexer;

#[cfg(test)]
mod lexer_test;

pub use lexer::{LexError, Lexer, tokenize};
