#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

/// Source fragments glued into a document, so the fuzzer spends its time
/// on token sequences rather than on finding `<?php`.
#[derive(Arbitrary, Debug)]
enum Fragment {
    Variable,
    Name,
    Int(u16),
    SingleString,
    DoubleString,
    Operator(u8),
    Open(u8),
    Close(u8),
    Semicolon,
    Comma,
    Colon,
    Keyword(u8),
    CloseTag,
}

const OPERATORS: &[&str] = &["+", "-", "*", "**", ".", "=", "+=", "??", "?", "!", "&&", "||", "==", "<", "=>", "->", "::", "&"];
const OPENERS: &[&str] = &["(", "[", "{"];
const CLOSERS: &[&str] = &[")", "]", "}"];
const KEYWORDS: &[&str] = &[
    "if", "elseif", "else", "endif", "while", "endwhile", "for", "foreach", "as", "switch", "case", "default",
    "break", "continue", "goto", "return", "echo", "function", "fn", "class", "public", "static", "match",
    "try", "catch", "finally", "new", "namespace", "use", "get", "set",
];

fn pick<'a>(table: &[&'a str], i: u8) -> &'a str {
    table[usize::from(i) % table.len()]
}

impl Fragment {
    fn write(&self, out: &mut String) {
        let text = match self {
            Fragment::Variable => "$v",
            Fragment::Name => "Foo",
            Fragment::Int(n) => {
                out.push_str(&n.to_string());
                out.push(' ');
                return;
            }
            Fragment::SingleString => "'s'",
            Fragment::DoubleString => "\"a $v {$w[0]}\"",
            Fragment::Operator(i) => pick(OPERATORS, *i),
            Fragment::Open(i) => pick(OPENERS, *i),
            Fragment::Close(i) => pick(CLOSERS, *i),
            Fragment::Semicolon => ";",
            Fragment::Comma => ",",
            Fragment::Colon => ":",
            Fragment::Keyword(i) => pick(KEYWORDS, *i),
            Fragment::CloseTag => "?>x<?php",
        };
        out.push_str(text);
        out.push(' ');
    }
}

fuzz_target!(|fragments: Vec<Fragment>| {
    let mut source = String::from("<?php ");
    for fragment in &fragments {
        fragment.write(&mut source);
    }
    // Anything that parses must print to text that parses to the same tree.
    if let Ok(program) = phpcanon::parse(&source) {
        let printed = phpcanon::print(&program);
        let reparsed = phpcanon::parse(&printed).expect("printed output must parse");
        assert_eq!(reparsed, program);
    }
});
