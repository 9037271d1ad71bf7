//! Pratt expression parser for operator precedence.

use crate::ast::{BinaryOp, JsonOperator, UnaryOp};
use crate::lexer::{Keyword, TokenKind};

/// Binding power of prefix `-`, `+` and `~`.
pub const UNARY_BP: u8 = 17;

/// Binding power of prefix `NOT`.
pub const NOT_BP: u8 = 5;

/// Returns the infix binding power for a token.
///
/// Returns `(left_bp, right_bp)` where:
/// - Higher binding power = binds tighter
/// - Left associative: left_bp < right_bp
///
/// `NOT` is listed because it introduces `NOT IN`, `NOT BETWEEN` and
/// `NOT LIKE` in infix position.
///
/// Returns `None` if the token is not an infix operator.
#[must_use]
pub const fn infix_binding_power(kind: &TokenKind) -> Option<(u8, u8)> {
    match kind {
        // Logical OR (lowest precedence)
        TokenKind::Keyword(Keyword::Or) => Some((1, 2)),

        // Logical AND
        TokenKind::Keyword(Keyword::And) => Some((3, 4)),

        // Comparison operators
        TokenKind::Eq
        | TokenKind::NotEq
        | TokenKind::Lt
        | TokenKind::LtEq
        | TokenKind::Gt
        | TokenKind::GtEq => Some((5, 6)),

        // IS, IN, BETWEEN, LIKE, GLOB and their NOT forms
        TokenKind::Keyword(
            Keyword::Is
            | Keyword::In
            | Keyword::Between
            | Keyword::Like
            | Keyword::Glob
            | Keyword::Not,
        ) => Some((5, 6)),

        // Bitwise OR
        TokenKind::BitOr => Some((7, 8)),

        // Bitwise AND
        TokenKind::BitAnd => Some((9, 10)),

        // Bit shifts
        TokenKind::LeftShift | TokenKind::RightShift => Some((11, 12)),

        // Additive (string concat has same precedence as addition)
        TokenKind::Plus | TokenKind::Minus | TokenKind::Concat => Some((13, 14)),

        // Multiplicative
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some((15, 16)),

        // JSON extraction binds tighter than any arithmetic
        TokenKind::Arrow | TokenKind::LongArrow => Some((19, 20)),

        // COLLATE and `::` casts are postfix and bind tightest
        TokenKind::Keyword(Keyword::Collate) | TokenKind::DoubleColon => Some((21, 22)),

        _ => None,
    }
}

/// Converts a token to a binary operator.
#[must_use]
pub const fn token_to_binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        TokenKind::Percent => Some(BinaryOp::Mod),
        TokenKind::Eq => Some(BinaryOp::Eq),
        TokenKind::NotEq => Some(BinaryOp::NotEq),
        TokenKind::Lt => Some(BinaryOp::Lt),
        TokenKind::LtEq => Some(BinaryOp::LtEq),
        TokenKind::Gt => Some(BinaryOp::Gt),
        TokenKind::GtEq => Some(BinaryOp::GtEq),
        TokenKind::Keyword(Keyword::And) => Some(BinaryOp::And),
        TokenKind::Keyword(Keyword::Or) => Some(BinaryOp::Or),
        TokenKind::Concat => Some(BinaryOp::Concat),
        TokenKind::Keyword(Keyword::Like) => Some(BinaryOp::Like),
        TokenKind::Keyword(Keyword::Glob) => Some(BinaryOp::Glob),
        TokenKind::BitAnd => Some(BinaryOp::BitAnd),
        TokenKind::BitOr => Some(BinaryOp::BitOr),
        TokenKind::LeftShift => Some(BinaryOp::LeftShift),
        TokenKind::RightShift => Some(BinaryOp::RightShift),
        _ => None,
    }
}

/// Converts a token to a JSON operator.
#[must_use]
pub const fn token_to_json_op(kind: &TokenKind) -> Option<JsonOperator> {
    match kind {
        TokenKind::Arrow => Some(JsonOperator::Extract),
        TokenKind::LongArrow => Some(JsonOperator::ExtractText),
        _ => None,
    }
}

/// Converts a token to a unary operator, returning its binding power too.
#[must_use]
pub const fn token_to_unary_op(kind: &TokenKind) -> Option<(UnaryOp, u8)> {
    match kind {
        TokenKind::Minus => Some((UnaryOp::Neg, UNARY_BP)),
        TokenKind::Plus => Some((UnaryOp::Plus, UNARY_BP)),
        TokenKind::BitNot => Some((UnaryOp::BitNot, UNARY_BP)),
        TokenKind::Keyword(Keyword::Not) => Some((UnaryOp::Not, NOT_BP)),
        _ => None,
    }
}
