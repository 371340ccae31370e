pub mod interp;
pub mod token;

use logos::Logos;

use crate::span::{LineIndex, Span, Spanned};
use interp::StringPart;
use token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriviaKind {
    Whitespace,
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub span: Span,
}

/// Significant tokens plus the trivia that precedes each one.
///
/// `leading[i]` holds the whitespace and comments directly before
/// `tokens[i]`. The last token is always [`Token::Eof`], which carries any
/// trailing trivia.
#[derive(Debug, Clone)]
pub struct TokenStream {
    pub tokens: Vec<Spanned<Token>>,
    pub leading: Vec<Vec<Trivia>>,
}

impl TokenStream {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn trivia_before(&self, index: usize) -> &[Trivia] {
        self.leading.get(index).map_or(&[], Vec::as_slice)
    }

    /// Spans of every `Error` token, in source order.
    pub fn errors(&self) -> impl Iterator<Item = &Spanned<Token>> {
        self.tokens.iter().filter(|t| matches!(t.node, Token::Error(_)))
    }
}

/// Tokenize `source`. Never fails: unrecognized input becomes
/// [`Token::Error`] and the parser reports it.
pub fn lex(source: &str) -> TokenStream {
    let mut tokens = Vec::new();
    let mut leading = Vec::new();
    let mut pending = Vec::new();

    for tok in raw_tokens(source, 0) {
        let kind = match tok.node {
            Token::Whitespace => Some(TriviaKind::Whitespace),
            Token::Comment => Some(TriviaKind::Comment),
            _ => None,
        };
        match kind {
            Some(kind) => pending.push(Trivia { kind, span: tok.span }),
            None => {
                tokens.push(tok);
                leading.push(std::mem::take(&mut pending));
            }
        }
    }
    tokens.push(Spanned::new(Token::Eof, Span::new(source.len(), source.len())));
    leading.push(pending);

    let index = LineIndex::new(source);
    for tok in &mut tokens {
        locate(&index, tok);
    }
    for trivia in leading.iter_mut().flatten() {
        trivia.span = index.locate(trivia.span);
    }

    tracing::trace!(tokens = tokens.len(), "lexed source");
    TokenStream { tokens, leading }
}

/// Tokenize an embedded expression inside a double-quoted string. Spans are
/// shifted by `base`; trivia is dropped and no `Eof` is appended.
pub(crate) fn lex_fragment(fragment: &str, base: usize) -> Vec<Spanned<Token>> {
    crate::stack::ensure(|| raw_tokens(fragment, base).into_iter().filter(|t| !t.node.is_trivia()).collect())
}

fn raw_tokens(source: &str, base: usize) -> Vec<Spanned<Token>> {
    let mut out = Vec::new();
    let mut lexer = Token::lexer(source);
    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let span = Span::new(base + range.start, base + range.end);
        let tok = match result {
            Ok(tok) => tok,
            Err(()) => Token::Error(source[range].to_string()),
        };
        out.push(Spanned::new(tok, span));
    }
    out
}

fn locate(index: &LineIndex, tok: &mut Spanned<Token>) {
    tok.span = index.locate(tok.span);
    if let Token::DoubleString(parts) = &mut tok.node {
        for part in parts {
            if let StringPart::Simple(inner) | StringPart::Braced(inner) = part {
                for t in inner {
                    locate(index, t);
                }
            }
        }
    }
}
