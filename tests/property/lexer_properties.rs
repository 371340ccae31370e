// Property tests for the lexer.
//
// Invariants checked over random input:
// 1. Lexing is total: any string yields a stream ending in `Eof`
// 2. Lexing is deterministic
// 3. Tokens plus trivia cover the source exactly, in order
// 4. Line/column positions agree with byte offsets

use phpcanon::lexer::lex;
use phpcanon::lexer::token::Token;
use proptest::prelude::*;

/// Concatenation of every token and trivia slice, in stream order.
fn rebuild(source: &str) -> String {
    let stream = lex(source);
    let mut out = String::new();
    for (i, tok) in stream.tokens.iter().enumerate() {
        for trivia in stream.trivia_before(i) {
            out.push_str(&source[trivia.span.start..trivia.span.end]);
        }
        out.push_str(&source[tok.span.start..tok.span.end]);
    }
    out
}

// Fragments that exercise most token rules when glued together.
fn php_fragment() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "<?php ", "?>", "<p>", "$a", "$b1", "foo", "\\Ns\\Name", "0x1F", "1_000", "2.5e3", ".5",
        "'s\\'q'", "\"x $a y\"", "\"{$a->b[0]}\"", "\"${a}\"", "//c\n", "#c\n", "/* c */", " ", "\n",
        "\t", "(", ")", "{", "}", "[", "]", ";", ",", "=>", "->", "?->", "::", "??=", "**", "<=>",
        "!==", "...", "&", "@", "`", "\\", "if", "ENDIF", "function", "fn", "match", "(int)",
    ])
}

fn php_like_source() -> impl Strategy<Value = String> {
    prop::collection::vec(php_fragment(), 0..60).prop_map(|parts| parts.concat())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn lexing_is_total(source in "\\PC{0,400}") {
        let stream = lex(&source);
        prop_assert_eq!(stream.tokens.last().map(|t| &t.node), Some(&Token::Eof));
        prop_assert_eq!(stream.tokens.len(), stream.leading.len());
    }

    #[test]
    fn lexing_is_deterministic(source in php_like_source()) {
        let first: Vec<Token> = lex(&source).tokens.into_iter().map(|t| t.node).collect();
        let second: Vec<Token> = lex(&source).tokens.into_iter().map(|t| t.node).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn tokens_and_trivia_cover_the_source(source in php_like_source()) {
        prop_assert_eq!(rebuild(&source), source);
    }

    #[test]
    fn arbitrary_text_is_covered(source in "[ -~\n]{0,200}") {
        prop_assert_eq!(rebuild(&source), source);
    }

    #[test]
    fn positions_match_offsets(source in php_like_source()) {
        let stream = lex(&source);
        for tok in &stream.tokens {
            let before = &source[..tok.span.start];
            let line = before.matches('\n').count() as u32 + 1;
            let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) as u32 + 1;
            prop_assert_eq!((tok.span.line, tok.span.column), (line, column));
        }
    }
}
