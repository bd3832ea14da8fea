//! Tokenizer implementation.

use crate::functions::Func;
use crate::ops::Op;
use crate::scalar::Scalar;
use crate::token::{Token, TokenKind, Var};
use thiserror::Error;

/// A lexing failure, carrying the byte offset where it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unknown character `{found}` at offset {offset}")]
    UnknownCharacter { found: char, offset: usize },

    #[error("unknown variable or function name `{name}` at offset {offset}")]
    UnknownIdentifier { name: String, offset: usize },

    #[error("malformed numeric literal at offset {offset}")]
    MalformedNumber { offset: usize },
}

impl LexError {
    /// Byte offset of the failure in the source text.
    pub fn offset(&self) -> usize {
        match self {
            LexError::UnknownCharacter { offset, .. }
            | LexError::UnknownIdentifier { offset, .. }
            | LexError::MalformedNumber { offset } => *offset,
        }
    }
}

/// Cursor over expression source text.
///
/// The language is pure ASCII; any non-ASCII byte is an unknown character.
pub struct Lexer<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> Lexer<'s> {
    /// Lexer starting at byte offset `start` of `src`.
    pub fn new(src: &'s str, start: usize) -> Lexer<'s> {
        Lexer { src, pos: start }
    }

    /// Current byte offset.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn eat_digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    /// Consume and return the next token. Returns an `End` token at end
    /// of input, forever after.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_spaces();
        let Some(c) = self.peek() else {
            return Ok(Token::new(TokenKind::End));
        };
        let start = self.pos;

        if c.is_ascii_digit() || c == b'.' {
            return self.number(start);
        }
        if c.is_ascii_alphabetic() {
            return self.identifier(start);
        }

        self.pos += 1;
        let op = |op| Ok(Token::new(TokenKind::Op(op)));
        let tok = |kind| Ok(Token::new(kind));
        match c {
            b'+' => op(Op::Add),
            b'-' => {
                // Subtraction only when something just closed or a value
                // just ended; a leading or post-operator `-` negates.
                let prev = self.src.as_bytes()[..start]
                    .iter()
                    .rev()
                    .find(|c| !matches!(c, b' ' | b'\t' | b'\r' | b'\n'));
                match prev {
                    Some(&p) if p.is_ascii_alphanumeric() || matches!(p, b')' | b']' | b'}') => {
                        op(Op::Subtract)
                    }
                    _ => tok(TokenKind::Negate),
                }
            }
            b'*' => op(Op::Multiply),
            b'/' => op(Op::Divide),
            b'%' => op(Op::Modulo),
            b'^' => op(Op::BitXor),
            b'=' => {
                if self.peek() == Some(b'=') {
                    self.pos += 1;
                    op(Op::Equal)
                } else {
                    op(Op::Assign)
                }
            }
            b'<' => match self.peek() {
                Some(b'=') => {
                    self.pos += 1;
                    op(Op::LessEqual)
                }
                Some(b'<') => {
                    self.pos += 1;
                    op(Op::LeftShift)
                }
                _ => op(Op::Less),
            },
            b'>' => match self.peek() {
                Some(b'=') => {
                    self.pos += 1;
                    op(Op::GreaterEqual)
                }
                Some(b'>') => {
                    self.pos += 1;
                    op(Op::RightShift)
                }
                _ => op(Op::Greater),
            },
            b'!' => {
                if self.peek() == Some(b'=') {
                    self.pos += 1;
                    op(Op::NotEqual)
                } else {
                    op(Op::LogicalNot)
                }
            }
            b'&' => {
                if self.peek() == Some(b'&') {
                    self.pos += 1;
                    op(Op::LogicalAnd)
                } else {
                    op(Op::BitAnd)
                }
            }
            b'|' => {
                if self.peek() == Some(b'|') {
                    self.pos += 1;
                    op(Op::LogicalOr)
                } else {
                    op(Op::BitOr)
                }
            }
            b'(' => tok(TokenKind::OpenParen),
            b')' => tok(TokenKind::CloseParen),
            b'[' => tok(TokenKind::OpenSquare),
            b']' => tok(TokenKind::CloseSquare),
            b'{' => tok(TokenKind::OpenCurly),
            b'}' => tok(TokenKind::CloseCurly),
            b',' => tok(TokenKind::Comma),
            b'?' => tok(TokenKind::Question),
            b':' => tok(TokenKind::Colon),
            _ => Err(LexError::UnknownCharacter {
                found: self.src[start..].chars().next().unwrap_or('\u{fffd}'),
                offset: start,
            }),
        }
    }

    /// Numeric literal: integer, `12.`, `12.5`, `.5`, and `e`/`E`
    /// scientific notation. A bare literal is single-precision; only
    /// signal declarations introduce doubles.
    fn number(&mut self, start: usize) -> Result<Token, LexError> {
        let int_digits = self.eat_digits();
        let mut is_float = false;

        if self.peek() == Some(b'.') {
            self.pos += 1;
            let frac_digits = self.eat_digits();
            if int_digits == 0 && frac_digits == 0 {
                return Err(LexError::MalformedNumber { offset: start });
            }
            is_float = true;
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.eat_digits() == 0 {
                return Err(LexError::MalformedNumber { offset: start });
            }
            is_float = true;
        }

        let text = &self.src[start..self.pos];
        let value = if is_float {
            Scalar::Float(
                text.parse::<f32>()
                    .map_err(|_| LexError::MalformedNumber { offset: start })?,
            )
        } else {
            Scalar::Int32(
                text.parse::<i32>()
                    .map_err(|_| LexError::MalformedNumber { offset: start })?,
            )
        };
        Ok(Token::constant(value))
    }

    /// Identifier: variable names first, then the function catalog.
    fn identifier(&mut self, start: usize) -> Result<Token, LexError> {
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric()) {
            self.pos += 1;
        }
        let name = &self.src[start..self.pos];
        match name {
            "x" => Ok(Token::new(TokenKind::Variable {
                var: Var::X,
                history_offset: 0,
                vector_index: 0,
            })),
            "y" => Ok(Token::new(TokenKind::Variable {
                var: Var::Y,
                history_offset: 0,
                vector_index: 0,
            })),
            _ => match Func::from_name(name) {
                Some(func) => Ok(Token::new(TokenKind::Func(func))),
                None => Err(LexError::UnknownIdentifier {
                    name: name.to_string(),
                    offset: start,
                }),
            },
        }
    }
}

/// Lex a whole source string, excluding the terminating `End` token.
/// Mainly a test and debugging aid; the compiler drives [`Lexer`]
/// incrementally.
pub fn tokenize(src: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(src, 0);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token()?;
        if tok.kind == TokenKind::End {
            return Ok(tokens);
        }
        tokens.push(tok);
    }
}
