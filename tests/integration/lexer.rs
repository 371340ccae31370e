mod common;

use common::fixture;
use phpcanon::lexer::interp::StringPart;
use phpcanon::lexer::token::{Number, Token};
use phpcanon::lexer::{lex, TriviaKind};

const FIXTURES: &[&str] = &[
    "arrays.php",
    "branching.php",
    "control_struct.php",
    "foreach.php",
    "match.php",
    "mysql-exec.php",
    "namespace.php",
    "property_declaration.php",
];

#[test]
fn fixtures_lex_without_errors() {
    for name in FIXTURES {
        let stream = lex(&fixture(name));
        assert_eq!(stream.errors().count(), 0, "{name} has unrecognized input");
        assert_eq!(stream.tokens.last().map(|t| &t.node), Some(&Token::Eof), "{name}");
        assert_eq!(stream.tokens.len(), stream.leading.len());
    }
}

#[test]
fn tokens_and_trivia_cover_the_source() {
    for name in FIXTURES {
        let source = fixture(name);
        let stream = lex(&source);
        let mut rebuilt = String::new();
        for (i, tok) in stream.tokens.iter().enumerate() {
            for trivia in stream.trivia_before(i) {
                rebuilt.push_str(&source[trivia.span.start..trivia.span.end]);
            }
            rebuilt.push_str(&source[tok.span.start..tok.span.end]);
        }
        assert_eq!(rebuilt, source, "{name}");
    }
}

#[test]
fn spans_are_ordered() {
    let source = fixture("branching.php");
    let stream = lex(&source);
    for pair in stream.tokens.windows(2) {
        assert!(pair[0].span.end <= pair[1].span.start);
    }
}

#[test]
fn positions_are_one_based() {
    let stream = lex("<?php\n\n  $total = 1;\n");
    let var = &stream.tokens[1];
    assert_eq!(var.node, Token::Variable);
    assert_eq!((var.span.line, var.span.column), (3, 3));
}

#[test]
fn comments_are_trivia_not_tokens() {
    let source = "<?php\n/*\n    Test\n*/\ndeclare(strict_types=1);";
    let stream = lex(source);
    assert_eq!(stream.tokens[1].node, Token::Declare);
    let kinds: Vec<TriviaKind> = stream.trivia_before(1).iter().map(|t| t.kind).collect();
    assert_eq!(kinds, [TriviaKind::Whitespace, TriviaKind::Comment, TriviaKind::Whitespace]);
}

#[test]
fn open_tag_is_case_insensitive() {
    assert_eq!(lex("<?PHP echo 1;").tokens[0].node, Token::OpenTag);
}

#[test]
fn cast_spellings_are_ordinary_tokens() {
    let kinds: Vec<Token> = lex("(int) (Boolean)").tokens.into_iter().map(|t| t.node).collect();
    assert_eq!(
        kinds,
        [Token::LParen, Token::Ident, Token::RParen, Token::LParen, Token::Ident, Token::RParen, Token::Eof]
    );
}

#[test]
fn interpolation_in_fixture() {
    let stream = lex(r#""Fruit: {$fruit->name}, Color: {$fruit->color}\n""#);
    let Token::DoubleString(parts) = &stream.tokens[0].node else { panic!("expected a string") };
    assert_eq!(parts.len(), 5);
    assert_eq!(parts[0], StringPart::Lit("Fruit: ".into()));
    assert!(matches!(&parts[1], StringPart::Braced(t) if t.len() == 3));
    assert_eq!(parts[4], StringPart::Lit(r"\n".into()));
}

#[test]
fn dollar_brace_stays_literal() {
    let stream = lex(r#""${name}""#);
    let Token::DoubleString(parts) = &stream.tokens[0].node else { panic!("expected a string") };
    assert_eq!(parts, &[StringPart::Lit("${name}".into())]);
}

#[test]
fn escaped_dollar_is_not_a_variable() {
    let stream = lex(r#""cost: \$5 and \$x""#);
    let Token::DoubleString(parts) = &stream.tokens[0].node else { panic!("expected a string") };
    assert_eq!(parts.len(), 1);
}

#[test]
fn numeric_separators_and_radix() {
    let kinds: Vec<Token> = lex("1_000_000 0o17 0XFF").tokens.into_iter().map(|t| t.node).collect();
    assert_eq!(
        kinds,
        [
            Token::IntLit(Number::Int(1_000_000)),
            Token::IntLit(Number::Int(15)),
            Token::IntLit(Number::Int(255)),
            Token::Eof,
        ]
    );
}

#[test]
fn lexing_is_total() {
    for source in ["", "?>", "\"", "'", "/*", "{$", "\u{0}", "<?php \"{$a", "\\\\\\", "$"] {
        let stream = lex(source);
        assert_eq!(stream.tokens.last().map(|t| &t.node), Some(&Token::Eof), "{source:?}");
    }
}
