//! Read-only tables consulted while parsing: operator precedence, block
//! terminators for the alternative syntax, and surface-form equivalences.
//! The printer reads the same precedence table, so parentheses it emits
//! always reparse to the tree they came from.

use super::ast::{BinOp, CastType, IncludeKind, UnaryOp};
use crate::lexer::token::Token;

/// Binding powers, loosest first.
pub mod prec {
    pub const LOWEST: u8 = 0;
    pub const OR_KEYWORD: u8 = 1;
    pub const XOR_KEYWORD: u8 = 2;
    pub const AND_KEYWORD: u8 = 3;
    /// Assignment, and prefix forms whose operand runs to the right: `print`,
    /// `throw`, `include`, `fn () =>`.
    pub const ASSIGN: u8 = 4;
    pub const TERNARY: u8 = 5;
    pub const COALESCE: u8 = 6;
    pub const OR: u8 = 7;
    pub const AND: u8 = 8;
    pub const BIT_OR: u8 = 9;
    pub const BIT_XOR: u8 = 10;
    pub const BIT_AND: u8 = 11;
    pub const EQUALITY: u8 = 12;
    pub const COMPARISON: u8 = 13;
    pub const CONCAT: u8 = 14;
    pub const SHIFT: u8 = 15;
    pub const ADDITIVE: u8 = 16;
    pub const MULTIPLICATIVE: u8 = 17;
    pub const NOT: u8 = 18;
    pub const INSTANCEOF: u8 = 19;
    /// Unary `-` `+` `~` `@`, casts, `++`/`--`.
    pub const UNARY: u8 = 20;
    pub const POW: u8 = 21;
    /// `new`, `clone`, closures: need parentheses as a call or member target.
    pub const NEW: u8 = 22;
    pub const PRIMARY: u8 = 23;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
    /// Chaining without parentheses is not canonical.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Infix {
    Binary(BinOp),
    Coalesce,
    Ternary,
    InstanceOf,
}

/// Infix operator for `tok`, with its binding power and associativity.
/// The keyword forms `and`/`or` fold onto `&&`/`||` at their own, looser
/// binding power; the tree shape records the grouping.
pub fn infix(tok: &Token) -> Option<(Infix, u8, Assoc)> {
    use Infix::Binary as B;
    let entry = match tok {
        Token::LogicalOr => (B(BinOp::Or), prec::OR_KEYWORD, Assoc::Left),
        Token::LogicalXor => (B(BinOp::Xor), prec::XOR_KEYWORD, Assoc::Left),
        Token::LogicalAnd => (B(BinOp::And), prec::AND_KEYWORD, Assoc::Left),
        Token::Question => (Infix::Ternary, prec::TERNARY, Assoc::Right),
        Token::QuestionQuestion => (Infix::Coalesce, prec::COALESCE, Assoc::Right),
        Token::PipePipe => (B(BinOp::Or), prec::OR, Assoc::Left),
        Token::AmpAmp => (B(BinOp::And), prec::AND, Assoc::Left),
        Token::Pipe => (B(BinOp::BitOr), prec::BIT_OR, Assoc::Left),
        Token::Caret => (B(BinOp::BitXor), prec::BIT_XOR, Assoc::Left),
        Token::Amp => (B(BinOp::BitAnd), prec::BIT_AND, Assoc::Left),
        Token::EqEq => (B(BinOp::Eq), prec::EQUALITY, Assoc::None),
        Token::BangEq | Token::LtGt => (B(BinOp::NotEq), prec::EQUALITY, Assoc::None),
        Token::EqEqEq => (B(BinOp::Identical), prec::EQUALITY, Assoc::None),
        Token::BangEqEq => (B(BinOp::NotIdentical), prec::EQUALITY, Assoc::None),
        Token::Spaceship => (B(BinOp::Spaceship), prec::EQUALITY, Assoc::None),
        Token::Lt => (B(BinOp::Lt), prec::COMPARISON, Assoc::None),
        Token::Gt => (B(BinOp::Gt), prec::COMPARISON, Assoc::None),
        Token::LtEq => (B(BinOp::LtEq), prec::COMPARISON, Assoc::None),
        Token::GtEq => (B(BinOp::GtEq), prec::COMPARISON, Assoc::None),
        Token::Dot => (B(BinOp::Concat), prec::CONCAT, Assoc::Left),
        Token::Shl => (B(BinOp::Shl), prec::SHIFT, Assoc::Left),
        Token::Shr => (B(BinOp::Shr), prec::SHIFT, Assoc::Left),
        Token::Plus => (B(BinOp::Add), prec::ADDITIVE, Assoc::Left),
        Token::Minus => (B(BinOp::Sub), prec::ADDITIVE, Assoc::Left),
        Token::Star => (B(BinOp::Mul), prec::MULTIPLICATIVE, Assoc::Left),
        Token::Slash => (B(BinOp::Div), prec::MULTIPLICATIVE, Assoc::Left),
        Token::Percent => (B(BinOp::Mod), prec::MULTIPLICATIVE, Assoc::Left),
        Token::InstanceOf => (Infix::InstanceOf, prec::INSTANCEOF, Assoc::None),
        Token::StarStar => (B(BinOp::Pow), prec::POW, Assoc::Right),
        _ => return None,
    };
    Some(entry)
}

/// Binding power of a binary operator as printed in its canonical spelling.
pub fn binop_prec(op: BinOp) -> (u8, Assoc) {
    match op {
        BinOp::Xor => (prec::XOR_KEYWORD, Assoc::Left),
        BinOp::Coalesce => (prec::COALESCE, Assoc::Right),
        BinOp::Or => (prec::OR, Assoc::Left),
        BinOp::And => (prec::AND, Assoc::Left),
        BinOp::BitOr => (prec::BIT_OR, Assoc::Left),
        BinOp::BitXor => (prec::BIT_XOR, Assoc::Left),
        BinOp::BitAnd => (prec::BIT_AND, Assoc::Left),
        BinOp::Eq | BinOp::NotEq | BinOp::Identical | BinOp::NotIdentical | BinOp::Spaceship => {
            (prec::EQUALITY, Assoc::None)
        }
        BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq => (prec::COMPARISON, Assoc::None),
        BinOp::Concat => (prec::CONCAT, Assoc::Left),
        BinOp::Shl | BinOp::Shr => (prec::SHIFT, Assoc::Left),
        BinOp::Add | BinOp::Sub => (prec::ADDITIVE, Assoc::Left),
        BinOp::Mul | BinOp::Div | BinOp::Mod => (prec::MULTIPLICATIVE, Assoc::Left),
        BinOp::Pow => (prec::POW, Assoc::Right),
    }
}

pub fn compound_assign(tok: &Token) -> Option<BinOp> {
    let op = match tok {
        Token::PlusEq => BinOp::Add,
        Token::MinusEq => BinOp::Sub,
        Token::StarEq => BinOp::Mul,
        Token::SlashEq => BinOp::Div,
        Token::PercentEq => BinOp::Mod,
        Token::StarStarEq => BinOp::Pow,
        Token::DotEq => BinOp::Concat,
        Token::QuestionQuestionEq => BinOp::Coalesce,
        Token::AmpEq => BinOp::BitAnd,
        Token::PipeEq => BinOp::BitOr,
        Token::CaretEq => BinOp::BitXor,
        Token::ShlEq => BinOp::Shl,
        Token::ShrEq => BinOp::Shr,
        _ => return None,
    };
    Some(op)
}

pub fn prefix_unary(tok: &Token) -> Option<(UnaryOp, u8)> {
    let entry = match tok {
        Token::Bang => (UnaryOp::Not, prec::NOT),
        Token::Minus => (UnaryOp::Neg, prec::UNARY),
        Token::Plus => (UnaryOp::Plus, prec::UNARY),
        Token::Tilde => (UnaryOp::BitNot, prec::UNARY),
        Token::At => (UnaryOp::Silence, prec::UNARY),
        _ => return None,
    };
    Some(entry)
}

pub fn include_kind(tok: &Token) -> Option<IncludeKind> {
    match tok {
        Token::Include => Some(IncludeKind::Include),
        Token::IncludeOnce => Some(IncludeKind::IncludeOnce),
        Token::Require => Some(IncludeKind::Require),
        Token::RequireOnce => Some(IncludeKind::RequireOnce),
        _ => None,
    }
}

/// Cast spellings, folded onto their canonical names.
pub fn cast_type(name: &str) -> Option<CastType> {
    let ty = match name.to_ascii_lowercase().as_str() {
        "int" | "integer" => CastType::Int,
        "float" | "double" | "real" => CastType::Float,
        "string" | "binary" => CastType::String,
        "bool" | "boolean" => CastType::Bool,
        "array" => CastType::Array,
        "object" => CastType::Object,
        _ => return None,
    };
    Some(ty)
}

/// Which `end*` keyword closes an alternative-syntax block opened by `opener`.
pub fn terminator_for(opener: &Token) -> Option<Token> {
    match opener {
        Token::If => Some(Token::EndIf),
        Token::While => Some(Token::EndWhile),
        Token::For => Some(Token::EndFor),
        Token::Foreach => Some(Token::EndForeach),
        Token::Switch => Some(Token::EndSwitch),
        _ => None,
    }
}
