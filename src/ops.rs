//! Operator catalog.
//!
//! Static table of the expression language's operators: symbol, arity and
//! precedence, consulted by both the compiler (shunting yard) and the
//! evaluator (elementwise application).

use core::fmt;

/// An operator of the expression language.
///
/// `ConditionalIf` is the else-less ternary (`cond ? then`, arity 2, gates
/// output at runtime); `ConditionalIfElse` is the full ternary (arity 3).
/// Both are synthesized by the compiler from `?` / `:`, never lexed
/// directly. `Assign` is lexed for the `y =` prefix but is rejected
/// anywhere inside an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    LogicalNot,
    Multiply,
    Divide,
    Modulo,
    Add,
    Subtract,
    LeftShift,
    RightShift,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Equal,
    NotEqual,
    BitAnd,
    BitXor,
    BitOr,
    LogicalAnd,
    LogicalOr,
    Assign,
    ConditionalIf,
    ConditionalIfElse,
}

impl Op {
    /// Number of operands consumed.
    pub const fn arity(self) -> usize {
        match self {
            Op::LogicalNot => 1,
            Op::ConditionalIfElse => 3,
            _ => 2,
        }
    }

    /// Binding strength, higher binds tighter.
    pub const fn precedence(self) -> u8 {
        match self {
            Op::LogicalNot => 11,
            Op::Multiply | Op::Divide | Op::Modulo => 10,
            Op::Add | Op::Subtract => 9,
            Op::LeftShift | Op::RightShift => 8,
            Op::Greater | Op::GreaterEqual | Op::Less | Op::LessEqual => 7,
            Op::Equal | Op::NotEqual => 6,
            Op::BitAnd => 5,
            Op::BitXor => 4,
            Op::BitOr => 3,
            Op::LogicalAnd => 2,
            Op::LogicalOr => 1,
            Op::Assign | Op::ConditionalIf | Op::ConditionalIfElse => 0,
        }
    }

    /// Source symbol (the conditionals render as pseudo-ops).
    pub const fn symbol(self) -> &'static str {
        match self {
            Op::LogicalNot => "!",
            Op::Multiply => "*",
            Op::Divide => "/",
            Op::Modulo => "%",
            Op::Add => "+",
            Op::Subtract => "-",
            Op::LeftShift => "<<",
            Op::RightShift => ">>",
            Op::Greater => ">",
            Op::GreaterEqual => ">=",
            Op::Less => "<",
            Op::LessEqual => "<=",
            Op::Equal => "==",
            Op::NotEqual => "!=",
            Op::BitAnd => "&",
            Op::BitXor => "^",
            Op::BitOr => "|",
            Op::LogicalAnd => "&&",
            Op::LogicalOr => "||",
            Op::Assign => "=",
            Op::ConditionalIf => "IF",
            Op::ConditionalIfElse => "IFELSE",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
