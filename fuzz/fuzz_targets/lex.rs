#![no_main]
use libfuzzer_sys::fuzz_target;
use phpcanon::lexer::token::Token;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let stream = phpcanon::lexer::lex(s);
        assert!(matches!(stream.tokens.last().map(|t| &t.node), Some(Token::Eof)));
        for tok in &stream.tokens {
            assert!(tok.span.start <= tok.span.end && tok.span.end <= s.len());
        }
    }
});
