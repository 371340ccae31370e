//! Splitting of double-quoted string bodies into literal runs and embedded
//! expressions. Embedded expressions are re-tokenized with a nested lexer.

use super::token::{Number, Token};
use crate::span::{Span, Spanned};

#[derive(Debug, Clone, PartialEq)]
pub enum StringPart {
    /// Raw literal text, escapes undecoded.
    Lit(String),
    /// `$name`, `$name[key]` or `$name->prop`.
    Simple(Vec<Spanned<Token>>),
    /// `{$expr}`; tokens of the text between the braces.
    Braced(Vec<Spanned<Token>>),
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || b.is_ascii_digit()
}

fn name_len(bytes: &[u8], from: usize) -> usize {
    let mut i = from;
    if i < bytes.len() && is_name_start(bytes[i]) {
        i += 1;
        while i < bytes.len() && is_name_char(bytes[i]) {
            i += 1;
        }
    }
    i - from
}

/// Split the body of a double-quoted string. `rest` starts just after the
/// opening quote and `base` is its offset in the full source. Returns the
/// parts and the number of bytes consumed including the closing quote, or
/// `None` when the string is unterminated or an embedded `{$...}` is.
pub fn split(rest: &str, base: usize) -> Option<(Vec<StringPart>, usize)> {
    let bytes = rest.as_bytes();
    let mut parts = Vec::new();
    let mut lit_start = 0;
    let mut i = 0;

    let flush = |parts: &mut Vec<StringPart>, from: usize, to: usize| {
        if to > from {
            parts.push(StringPart::Lit(rest[from..to].to_string()));
        }
    };

    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                flush(&mut parts, lit_start, i);
                return Some((parts, i + 1));
            }
            b'\\' => {
                // Keep the escape raw; skip whichever char follows.
                i += 1;
                if i < bytes.len() {
                    i += utf8_len(bytes[i]);
                }
            }
            b'$' if i + 1 < bytes.len() && is_name_start(bytes[i + 1]) => {
                flush(&mut parts, lit_start, i);
                let (tokens, len) = simple(rest, i, base);
                parts.push(StringPart::Simple(tokens));
                i += len;
                lit_start = i;
            }
            b'{' if bytes.get(i + 1) == Some(&b'$') => {
                flush(&mut parts, lit_start, i);
                let inner_len = braced_len(&bytes[i + 1..])?;
                let inner = &rest[i + 1..i + 1 + inner_len];
                parts.push(StringPart::Braced(super::lex_fragment(inner, base + i + 1)));
                i += inner_len + 2;
                lit_start = i;
            }
            b => i += utf8_len(b),
        }
    }
    None
}

fn utf8_len(first: u8) -> usize {
    match first {
        0xF0..=0xFF => 4,
        0xE0..=0xEF => 3,
        0xC0..=0xDF => 2,
        _ => 1,
    }
}

/// Tokens for simple interpolation starting at the `$` at `at`.
fn simple(rest: &str, at: usize, base: usize) -> (Vec<Spanned<Token>>, usize) {
    let bytes = rest.as_bytes();
    let tok = |t: Token, s: usize, e: usize| Spanned::new(t, Span::new(base + s, base + e));

    let var_end = at + 1 + name_len(bytes, at + 1);
    let mut tokens = vec![tok(Token::Variable, at, var_end)];
    let mut end = var_end;

    match bytes.get(var_end) {
        Some(b'[') => {
            let key_start = var_end + 1;
            let key = match bytes.get(key_start) {
                Some(b'$') => {
                    let n = name_len(bytes, key_start + 1);
                    (n > 0).then(|| (Token::Variable, key_start + 1 + n))
                }
                Some(b) if b.is_ascii_digit() => {
                    let mut j = key_start;
                    while j < bytes.len() && bytes[j].is_ascii_digit() {
                        j += 1;
                    }
                    rest[key_start..j].parse::<i64>().ok().map(|n| (Token::IntLit(Number::Int(n)), j))
                }
                Some(_) => {
                    let n = name_len(bytes, key_start);
                    (n > 0).then(|| {
                        let key = rest[key_start..key_start + n].to_string();
                        (Token::SingleString(key), key_start + n)
                    })
                }
                None => None,
            };
            if let Some((key_tok, key_end)) = key.filter(|(_, e)| bytes.get(*e) == Some(&b']')) {
                tokens.push(tok(Token::LBracket, var_end, key_start));
                tokens.push(tok(key_tok, key_start, key_end));
                tokens.push(tok(Token::RBracket, key_end, key_end + 1));
                end = key_end + 1;
            }
        }
        Some(b'-') if bytes.get(var_end + 1) == Some(&b'>') => {
            let n = name_len(bytes, var_end + 2);
            if n > 0 {
                tokens.push(tok(Token::Arrow, var_end, var_end + 2));
                tokens.push(tok(Token::Ident, var_end + 2, var_end + 2 + n));
                end = var_end + 2 + n;
            }
        }
        _ => {}
    }
    (tokens, end - at)
}

/// Length of the text between `{` and its matching `}`; `bytes` starts just
/// after the `{`. Quoted strings inside are skipped.
fn braced_len(bytes: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' if depth == 0 => return Some(i),
            b'}' => depth -= 1,
            q @ (b'\'' | b'"') => {
                i += 1;
                while i < bytes.len() && bytes[i] != q {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}
