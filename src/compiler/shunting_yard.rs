//! Infix to RPN translation (Dijkstra's shunting yard).
//!
//! A single pass over the token stream, with two bounded stacks: finished
//! operands on the output stack, pending operators on the operator stack.
//! Type and length resolution happens eagerly, every time an operator
//! reaches the output stack (see [`super::typing`]).

use smallvec::SmallVec;
use tracing::trace;

use super::error::CompileError;
use super::typing::{combine, lock_lengths, promote};
use crate::lexer::Lexer;
use crate::ops::Op;
use crate::program::CompiledProgram;
use crate::scalar::{Scalar, ScalarType};
use crate::token::{Token, TokenKind, Var};

/// Hard limit on either parser stack. Deeper expressions are rejected.
pub const MAX_STACK: usize = 128;

/// Inline capacity; typical expressions never spill to the heap.
pub(super) const STACK_INLINE: usize = 32;

pub(super) type Stack = SmallVec<[Token; STACK_INLINE]>;

fn push(stack: &mut Stack, tok: Token, offset: usize) -> Result<(), CompileError> {
    if stack.len() >= MAX_STACK {
        return Err(CompileError::StackOverflow {
            limit: MAX_STACK,
            offset,
        });
    }
    stack.push(tok);
    Ok(())
}

/// Move the operator-stack top to the output stack and resolve its
/// types and lengths. Caller guarantees `ops` is non-empty.
fn pop_to_output(ops: &mut Stack, out: &mut Stack, offset: usize) -> Result<(), CompileError> {
    let tok = ops.pop().ok_or(CompileError::MalformedExpression { offset })?;
    push(out, tok, offset)?;
    combine(out, offset)
}

/// Compile a mapping expression of the form `y = <expr>` against the
/// declared input and output signal formats.
pub fn compile(
    source: &str,
    input_type: ScalarType,
    output_type: ScalarType,
    input_vector_length: usize,
    output_vector_length: usize,
) -> Result<CompiledProgram, CompileError> {
    let bytes = source.as_bytes();
    let mut pos = 0;
    if bytes.first() != Some(&b'y') {
        return Err(CompileError::MissingPrefix);
    }
    pos += 1;
    while bytes.get(pos) == Some(&b' ') {
        pos += 1;
    }
    if bytes.get(pos) != Some(&b'=') {
        return Err(CompileError::MissingPrefix);
    }
    pos += 1;

    let mut lexer = Lexer::new(source, pos);
    let mut out = Stack::new();
    let mut ops = Stack::new();
    let mut oldest_input: i32 = 0;
    let mut oldest_output: i32 = 0;
    let mut vectorizing = false;
    // whether the output-stack top is a variable still accepting `[` / `{`
    let mut variable = false;
    let mut var_offset = 0;
    let mut uses_input = false;

    loop {
        let offset = lexer.pos();
        let mut tok = lexer.next_token()?;

        if variable && !matches!(tok.kind, TokenKind::OpenSquare | TokenKind::OpenCurly) {
            finish_variable(&out, var_offset)?;
            variable = false;
        }

        // `?` enters the precedence ladder as the else-less conditional
        if tok.kind == TokenKind::Question {
            tok.kind = TokenKind::Op(Op::ConditionalIf);
        }

        match tok.kind {
            TokenKind::End => break,

            TokenKind::Constant(_) => push(&mut out, tok, offset)?,

            TokenKind::Variable { var, .. } => {
                tok.ty = match var {
                    Var::X => input_type,
                    Var::Y => output_type,
                };
                tok.vector_length = match var {
                    Var::X => input_vector_length,
                    Var::Y => output_vector_length,
                };
                tok.length_locked = true;
                push(&mut out, tok, offset)?;
                variable = true;
                var_offset = offset;
                uses_input |= var == Var::X;
            }

            TokenKind::Func(f) => {
                tok.ty = if f.has_int_impl() {
                    ScalarType::Int32
                } else {
                    ScalarType::Float
                };
                push(&mut ops, tok, offset)?;
                if f.arity() == 0 {
                    pop_to_output(&mut ops, &mut out, offset)?;
                }
            }

            TokenKind::Op(Op::Assign) => {
                return Err(CompileError::MalformedExpression { offset });
            }

            TokenKind::Op(op) => {
                while matches!(ops.last(), Some(t)
                    if matches!(t.kind, TokenKind::Op(stacked)
                        if stacked.precedence() >= op.precedence()))
                {
                    pop_to_output(&mut ops, &mut out, offset)?;
                }
                push(&mut ops, tok, offset)?;
            }

            TokenKind::OpenParen => push(&mut ops, tok, offset)?,

            TokenKind::CloseParen => {
                while matches!(ops.last(), Some(t) if t.kind != TokenKind::OpenParen) {
                    pop_to_output(&mut ops, &mut out, offset)?;
                }
                if ops.pop().is_none() {
                    return Err(CompileError::UnmatchedParen { offset });
                }
                if matches!(ops.last(), Some(t) if matches!(t.kind, TokenKind::Func(_))) {
                    pop_to_output(&mut ops, &mut out, offset)?;
                }
            }

            TokenKind::Comma => {
                while matches!(ops.last(), Some(t)
                    if !matches!(t.kind, TokenKind::OpenParen | TokenKind::Vectorize { .. }))
                {
                    pop_to_output(&mut ops, &mut out, offset)?;
                }
                match ops.last_mut() {
                    None => return Err(CompileError::UnmatchedParen { offset }),
                    Some(marker) => {
                        if let TokenKind::Vectorize { arity } = &mut marker.kind {
                            *arity += 1;
                            let sub = out
                                .last()
                                .ok_or(CompileError::MalformedExpression { offset })?;
                            marker.vector_length += sub.vector_length;
                            lock_lengths(&mut out);
                        }
                    }
                }
            }

            TokenKind::Colon => {
                // the matching `?` must live in the current grouping level
                loop {
                    match ops.last().map(|t| t.kind) {
                        Some(TokenKind::Op(Op::ConditionalIf)) => break,
                        None
                        | Some(TokenKind::OpenParen | TokenKind::Vectorize { .. }) => {
                            return Err(CompileError::UnmatchedColon { offset });
                        }
                        Some(_) => pop_to_output(&mut ops, &mut out, offset)?,
                    }
                }
                if let Some(cond) = ops.last_mut() {
                    cond.kind = TokenKind::Op(Op::ConditionalIfElse);
                }
            }

            TokenKind::OpenSquare => {
                if variable {
                    parse_vector_index(
                        &mut lexer,
                        &mut out,
                        input_vector_length,
                        output_vector_length,
                    )?;
                    // the token stays open to a following `{...}`
                } else {
                    if vectorizing {
                        return Err(CompileError::NestedVectorLiteral { offset });
                    }
                    tok.kind = TokenKind::Vectorize { arity: 0 };
                    tok.vector_length = 0;
                    push(&mut ops, tok, offset)?;
                    vectorizing = true;
                }
            }

            TokenKind::CloseSquare => {
                while matches!(ops.last(), Some(t)
                    if !matches!(t.kind, TokenKind::Vectorize { .. } | TokenKind::OpenParen))
                {
                    pop_to_output(&mut ops, &mut out, offset)?;
                }
                match ops.last_mut() {
                    None => return Err(CompileError::UnmatchedBracket { offset }),
                    Some(t) if t.kind == TokenKind::OpenParen => {
                        return Err(CompileError::UnmatchedParen { offset });
                    }
                    Some(marker) => {
                        let sub = out
                            .last()
                            .ok_or(CompileError::MalformedExpression { offset })?;
                        if let TokenKind::Vectorize { arity } = &mut marker.kind {
                            *arity += 1;
                        }
                        marker.vector_length += sub.vector_length;
                        marker.length_locked = true;
                        lock_lengths(&mut out);
                    }
                }
                pop_to_output(&mut ops, &mut out, offset)?;
                vectorizing = false;
            }

            TokenKind::OpenCurly => {
                if !variable {
                    return Err(CompileError::MalformedExpression { offset });
                }
                let (oi, oo) = parse_history_offset(&mut lexer, &mut out, offset)?;
                oldest_input = oldest_input.min(oi);
                oldest_output = oldest_output.min(oo);
            }

            TokenKind::Negate => {
                // rewrite `-a` as `0 - a`
                push(&mut out, Token::constant(Scalar::Int32(0)), offset)?;
                push(&mut ops, Token::new(TokenKind::Op(Op::Subtract)), offset)?;
            }

            // the lexer never produces these in expression position
            TokenKind::Question | TokenKind::CloseCurly | TokenKind::Vectorize { .. } => {
                return Err(CompileError::MalformedExpression { offset });
            }
        }
    }

    let end = lexer.pos();

    // drain pending operators, rejecting unterminated groupings
    while let Some(top) = ops.last() {
        match top.kind {
            TokenKind::OpenParen => return Err(CompileError::UnmatchedParen { offset: end }),
            TokenKind::Vectorize { .. } => {
                return Err(CompileError::UnmatchedBracket { offset: end });
            }
            _ => pop_to_output(&mut ops, &mut out, end)?,
        }
    }

    let top = *out.last().ok_or(CompileError::MalformedExpression { offset: end })?;
    if top.vector_length != output_vector_length {
        return Err(CompileError::OutputLengthMismatch {
            found: top.vector_length,
            expected: output_vector_length,
        });
    }

    // reconcile the result type with the declared output type
    if top.ty != output_type {
        let last = out
            .last_mut()
            .ok_or(CompileError::MalformedExpression { offset: end })?;
        promote(last, output_type);
        combine(&mut out, end)?;
        // combine may have folded the stack down, re-resolve the top
        let top = out
            .last_mut()
            .ok_or(CompileError::MalformedExpression { offset: end })?;
        if top.ty != output_type {
            match top.kind {
                TokenKind::Constant(v) => {
                    top.kind = TokenKind::Constant(v.cast(output_type));
                    top.ty = output_type;
                }
                _ => top.cast_to = Some(output_type),
            }
        }
    }

    let program = CompiledProgram::new(
        out.into_vec(),
        (1 - oldest_input) as usize,
        (1 - oldest_output) as usize,
        input_type,
        output_type,
        input_vector_length,
        output_vector_length,
        uses_input,
    );
    trace!(source, program = %program, "compiled");
    Ok(program)
}

/// Reject a variable reference that finished without the history offset
/// it requires. Output references may only read previous samples.
fn finish_variable(out: &Stack, var_offset: usize) -> Result<(), CompileError> {
    if let Some(Token {
        kind:
            TokenKind::Variable {
                var: Var::Y,
                history_offset: 0,
                ..
            },
        ..
    }) = out.last()
    {
        return Err(CompileError::BadHistoryOffset {
            var: Var::Y,
            found: 0,
            max: -1,
            offset: var_offset,
        });
    }
    Ok(())
}

/// Parse `i]` or `i:j]` after a variable's `[`, narrowing the variable
/// token on the output-stack top to the selected (inclusive) range.
fn parse_vector_index(
    lexer: &mut Lexer<'_>,
    out: &mut Stack,
    input_vector_length: usize,
    output_vector_length: usize,
) -> Result<(), CompileError> {
    let var_tok = out.last_mut().ok_or(CompileError::MalformedExpression {
        offset: lexer.pos(),
    })?;
    let TokenKind::Variable {
        var, vector_index, ..
    } = &mut var_tok.kind
    else {
        return Err(CompileError::MalformedExpression {
            offset: lexer.pos(),
        });
    };
    let declared = match var {
        Var::X => input_vector_length,
        Var::Y => output_vector_length,
    };

    let offset = lexer.pos();
    let tok = lexer.next_token()?;
    let TokenKind::Constant(Scalar::Int32(i)) = tok.kind else {
        return Err(CompileError::NonIntegerIndex { offset });
    };
    if i as usize >= declared {
        return Err(CompileError::IndexOutOfBounds {
            var: *var,
            index: i,
            length: declared,
            offset,
        });
    }
    *vector_index = i as usize;
    var_tok.vector_length = 1;
    var_tok.length_locked = true;

    let offset = lexer.pos();
    let mut tok = lexer.next_token()?;
    if tok.kind == TokenKind::Colon {
        let offset = lexer.pos();
        tok = lexer.next_token()?;
        let TokenKind::Constant(Scalar::Int32(j)) = tok.kind else {
            return Err(CompileError::MalformedIndex { offset });
        };
        if j as usize >= declared {
            return Err(CompileError::IndexOutOfBounds {
                var: *var,
                index: j,
                length: declared,
                offset,
            });
        }
        if j <= i {
            return Err(CompileError::MalformedIndex { offset });
        }
        var_tok.vector_length = (j - i + 1) as usize;
        tok = lexer.next_token()?;
    }
    if tok.kind != TokenKind::CloseSquare {
        return Err(CompileError::UnmatchedBracket { offset });
    }
    Ok(())
}

/// Parse `n}` or `-n}` after a variable's `{`, recording the history
/// offset on the output-stack top. Returns the (input, output) extremes
/// contributed by this reference.
fn parse_history_offset(
    lexer: &mut Lexer<'_>,
    out: &mut Stack,
    offset: usize,
) -> Result<(i32, i32), CompileError> {
    let mut tok = lexer.next_token()?;
    let mut sign = 1;
    if tok.kind == TokenKind::Negate {
        sign = -1;
        tok = lexer.next_token()?;
    }
    let TokenKind::Constant(Scalar::Int32(n)) = tok.kind else {
        return Err(CompileError::NonIntegerHistory { offset });
    };
    let value = sign * n;

    let var_tok = out
        .last_mut()
        .ok_or(CompileError::MalformedExpression { offset })?;
    let TokenKind::Variable {
        var,
        history_offset,
        ..
    } = &mut var_tok.kind
    else {
        return Err(CompileError::MalformedExpression { offset });
    };
    let max = match var {
        Var::X => 0,
        Var::Y => -1,
    };
    if value > max {
        return Err(CompileError::BadHistoryOffset {
            var: *var,
            found: value,
            max,
            offset,
        });
    }
    *history_offset = value;
    let extremes = match var {
        Var::X => (value, 0),
        Var::Y => (0, value),
    };

    if lexer.next_token()?.kind != TokenKind::CloseCurly {
        return Err(CompileError::UnmatchedBrace { offset });
    }
    Ok(extremes)
}
