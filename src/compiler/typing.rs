//! Type and vector-length resolution over the RPN output stack.
//!
//! Every time an operator, function or vector-literal marker lands on the
//! output stack, [`combine`] resolves the numeric type and vector length
//! of the whole consumed operand span, rewrites annotations in place, and
//! folds the span down to a single constant when it is fully constant.

use super::error::CompileError;
use super::shunting_yard::Stack;
use crate::evaluator::{EvalStatus, Evaluator};
use crate::functions::Func;
use crate::history::History;
use crate::program::CompiledProgram;
use crate::scalar::ScalarType;
use crate::token::{Token, TokenKind};

/// Widen `tok` towards `ty`. Constants convert immediately; variables get
/// a runtime cast annotation; operators and functions simply retype.
/// Narrowing requests leave the token alone.
pub(super) fn promote(tok: &mut Token, ty: ScalarType) {
    if tok.ty == ty {
        return;
    }
    match tok.kind {
        TokenKind::Constant(v) => {
            if ty > tok.ty {
                tok.kind = TokenKind::Constant(v.cast(ty));
                tok.ty = ty;
            }
        }
        TokenKind::Variable { .. } => {
            if tok.ty == ScalarType::Int32 || ty == ScalarType::Double {
                tok.cast_to = Some(ty);
            }
        }
        _ => {
            if tok.ty == ScalarType::Int32 || ty == ScalarType::Double {
                tok.ty = ty;
            }
        }
    }
}

/// Lock the vector length of the compound operand ending at the top of
/// `out`, walking back through the arity tree.
pub(super) fn lock_lengths(out: &mut [Token]) {
    let mut i = out.len();
    let mut arity = 1usize;
    while i > 0 && arity > 0 {
        i -= 1;
        arity -= 1;
        out[i].length_locked = true;
        arity += out[i].arity();
    }
}

/// Resolve types and lengths for the token just pushed onto `out`.
///
/// The top token's operand span is scanned for the widest numeric type
/// and vector length, then re-walked to promote every token in range.
/// Locked lengths must match the resolved length exactly. An all-constant
/// span is evaluated now and replaced by a single constant.
pub(super) fn combine(out: &mut Stack, offset: usize) -> Result<(), CompileError> {
    let top = out.len() - 1;
    let top_tok = out[top];
    let arity = top_tok.arity();

    let mut can_fold = match top_tok.kind {
        TokenKind::Op(_) => true,
        TokenKind::Func(f) => f != Func::Uniform,
        TokenKind::Vectorize { .. } => false,
        _ => return Ok(()),
    };

    if arity == 0 {
        // zero-arity functions produce floats
        out[top].ty = ScalarType::Float;
    } else {
        let mut ty = top_tok.effective_ty();
        let mut vlen = top_tok.vector_length;

        // scan the operand span for the widest type and length
        let mut i = top;
        let mut skip = 0usize;
        let mut depth = arity;
        while i > 0 {
            i -= 1;
            let t = out[i];
            if !matches!(t.kind, TokenKind::Constant(_)) {
                can_fold = false;
            }
            if skip == 0 {
                ty = ty.max(t.effective_ty());
                vlen = vlen.max(t.vector_length);
                depth -= 1;
                if depth == 0 {
                    break;
                }
            } else {
                skip -= 1;
            }
            skip += t.arity();
        }
        if depth != 0 {
            return Err(CompileError::MalformedExpression { offset });
        }

        // promote everything in range; a vector-literal top only promotes
        // types, its operands keep their own (locked) lengths
        let mut i = top;
        let (mut skip, mut depth): (usize, isize) = match top_tok.kind {
            TokenKind::Vectorize { arity } => (arity, 0),
            _ => (0, arity as isize),
        };
        while i > 0 {
            i -= 1;
            let t = &mut out[i];
            promote(t, ty);
            if skip == 0 {
                if !t.length_locked {
                    t.vector_length = vlen;
                } else if t.vector_length != vlen {
                    return Err(CompileError::VectorLengthMismatch {
                        found: t.vector_length,
                        expected: vlen,
                        offset,
                    });
                }
            }
            let t = out[i];
            match t.kind {
                TokenKind::Op(_) | TokenKind::Func(_) => {
                    depth += t.arity() as isize;
                    if skip > 0 {
                        skip += t.arity();
                    }
                }
                TokenKind::Vectorize { arity } => skip = arity + 1,
                _ => {}
            }
            if skip > 0 {
                skip -= 1;
            } else {
                depth -= 1;
                if depth <= 0 {
                    break;
                }
            }
        }

        let top_tok = &mut out[top];
        top_tok.ty = ty;
        if !top_tok.length_locked {
            top_tok.vector_length = vlen;
        } else if top_tok.vector_length != vlen {
            return Err(CompileError::VectorLengthMismatch {
                found: top_tok.vector_length,
                expected: vlen,
                offset,
            });
        }
    }

    if can_fold {
        fold(out, arity);
    }
    Ok(())
}

/// Evaluate an all-constant span ending at the stack top and replace it
/// with a single constant. A span whose evaluation produces no output
/// (a gated conditional over constants) is left as is.
fn fold(out: &mut Stack, arity: usize) {
    let top = out.len() - 1;
    let start = top - arity;
    let ty = out[top].ty;
    let vlen = out[top].vector_length;

    let span: Vec<Token> = out[start..].to_vec();
    let program = CompiledProgram::new(span, 1, 1, ty, ty, 1, vlen, false);
    let input = History::new(ty, 1, 1);
    let mut output = History::new(ty, vlen, 1);
    let mut evaluator = Evaluator::new(&program);
    match evaluator.evaluate(&input, &mut output) {
        Ok(EvalStatus::Output) => {
            let Some(sample) = output.latest() else {
                return;
            };
            let value = sample[0];
            out.truncate(start);
            let mut tok = Token::constant(value);
            tok.ty = ty;
            tok.vector_length = vlen;
            out.push(tok);
        }
        Ok(EvalStatus::NoOutput) | Err(_) => {}
    }
}
