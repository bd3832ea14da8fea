//! Unit tests for the tokenizer.

use super::*;
use crate::functions::Func;
use crate::ops::Op;
use crate::scalar::Scalar;
use crate::token::{TokenKind, Var};
use pretty_assertions::assert_eq;

fn kinds(src: &str) -> Vec<TokenKind> {
    tokenize(src)
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn integer_literals() {
    assert_eq!(kinds("42"), vec![TokenKind::Constant(Scalar::Int32(42))]);
    assert_eq!(kinds("0"), vec![TokenKind::Constant(Scalar::Int32(0))]);
}

#[test]
fn float_literals_are_single_precision() {
    assert_eq!(kinds("2.5"), vec![TokenKind::Constant(Scalar::Float(2.5))]);
    assert_eq!(kinds("12."), vec![TokenKind::Constant(Scalar::Float(12.0))]);
    assert_eq!(kinds(".5"), vec![TokenKind::Constant(Scalar::Float(0.5))]);
}

#[test]
fn scientific_notation() {
    assert_eq!(kinds("1e3"), vec![TokenKind::Constant(Scalar::Float(1000.0))]);
    assert_eq!(
        kinds("2.5e-1"),
        vec![TokenKind::Constant(Scalar::Float(0.25))]
    );
    assert_eq!(kinds("1E2"), vec![TokenKind::Constant(Scalar::Float(100.0))]);
}

#[test]
fn incomplete_exponent_is_malformed() {
    assert_eq!(
        tokenize("1e"),
        Err(LexError::MalformedNumber { offset: 0 })
    );
    assert_eq!(
        tokenize("1e-"),
        Err(LexError::MalformedNumber { offset: 0 })
    );
}

#[test]
fn bare_e_is_the_euler_constant() {
    assert_eq!(kinds("e"), vec![TokenKind::Func(Func::E)]);
    assert_eq!(
        kinds("e + 1"),
        vec![
            TokenKind::Func(Func::E),
            TokenKind::Op(Op::Add),
            TokenKind::Constant(Scalar::Int32(1)),
        ]
    );
}

#[test]
fn two_char_operators_match_greedily() {
    assert_eq!(
        kinds("<= >= == != && || << >>"),
        vec![
            TokenKind::Op(Op::LessEqual),
            TokenKind::Op(Op::GreaterEqual),
            TokenKind::Op(Op::Equal),
            TokenKind::Op(Op::NotEqual),
            TokenKind::Op(Op::LogicalAnd),
            TokenKind::Op(Op::LogicalOr),
            TokenKind::Op(Op::LeftShift),
            TokenKind::Op(Op::RightShift),
        ]
    );
    assert_eq!(
        kinds("< > = ! & |"),
        vec![
            TokenKind::Op(Op::Less),
            TokenKind::Op(Op::Greater),
            TokenKind::Op(Op::Assign),
            TokenKind::Op(Op::LogicalNot),
            TokenKind::Op(Op::BitAnd),
            TokenKind::Op(Op::BitOr),
        ]
    );
}

#[test]
fn minus_after_value_is_subtraction() {
    assert_eq!(
        kinds("x - 1"),
        vec![
            TokenKind::Variable {
                var: Var::X,
                history_offset: 0,
                vector_index: 0
            },
            TokenKind::Op(Op::Subtract),
            TokenKind::Constant(Scalar::Int32(1)),
        ]
    );
    // also after a closing bracket
    let toks = kinds("(x) - 1");
    assert!(toks.contains(&TokenKind::Op(Op::Subtract)));
}

#[test]
fn minus_elsewhere_is_negation() {
    assert_eq!(
        kinds("-1"),
        vec![TokenKind::Negate, TokenKind::Constant(Scalar::Int32(1))]
    );
    assert_eq!(
        kinds("2 * -x"),
        vec![
            TokenKind::Constant(Scalar::Int32(2)),
            TokenKind::Op(Op::Multiply),
            TokenKind::Negate,
            TokenKind::Variable {
                var: Var::X,
                history_offset: 0,
                vector_index: 0
            },
        ]
    );
}

#[test]
fn identifiers_resolve_variables_then_functions() {
    assert!(matches!(
        kinds("y")[0],
        TokenKind::Variable { var: Var::Y, .. }
    ));
    assert_eq!(kinds("atan2")[0], TokenKind::Func(Func::Atan2));
    assert_eq!(kinds("hzToMidi")[0], TokenKind::Func(Func::HzToMidi));
    assert_eq!(
        tokenize("sinc"),
        Err(LexError::UnknownIdentifier {
            name: "sinc".to_string(),
            offset: 0
        })
    );
}

#[test]
fn structural_punctuation() {
    assert_eq!(
        kinds("( ) [ ] { } , ? :"),
        vec![
            TokenKind::OpenParen,
            TokenKind::CloseParen,
            TokenKind::OpenSquare,
            TokenKind::CloseSquare,
            TokenKind::OpenCurly,
            TokenKind::CloseCurly,
            TokenKind::Comma,
            TokenKind::Question,
            TokenKind::Colon,
        ]
    );
}

#[test]
fn unknown_character_reports_offset() {
    assert_eq!(
        tokenize("1 + $"),
        Err(LexError::UnknownCharacter {
            found: '$',
            offset: 4
        })
    );
}

#[test]
fn end_is_sticky() {
    let mut lexer = Lexer::new("x", 0);
    assert!(matches!(
        lexer.next_token().unwrap().kind,
        TokenKind::Variable { .. }
    ));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::End);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::End);
}
