// Property tests for the parser and printer.
//
// Programs are generated from a small grammar with every compound
// expression fully parenthesized, so the source pins down one tree. The
// printer then drops whatever parentheses it can, and the checks are:
// 1. Parsing is deterministic
// 2. Printed output reparses to the same tree
// 3. Printing is idempotent
// 4. Arbitrary input is rejected with a diagnostic, never a panic

use phpcanon::parser::ast::Program;
use proptest::prelude::*;

fn parse(source: &str) -> Program {
    phpcanon::parse(source).unwrap_or_else(|e| panic!("generated program rejected: {e}\n{source}"))
}

fn variable() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["$a", "$b", "$c", "$item", "$total"]).prop_map(str::to_string)
}

/// Double-quoted string mixing literal text, braces and embedded variables.
fn interpolated() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        "[a-z ]{1,5}",
        Just("{ ".to_string()),
        Just("}".to_string()),
        variable(),
        variable().prop_map(|v| format!("{{{{{v}}}")),
        variable().prop_map(|v| format!("{{{v}->name}}")),
        variable().prop_map(|v| format!("{v}[0]")),
    ];
    prop::collection::vec(piece, 1..6).prop_map(|pieces| format!("\"{}\"", pieces.concat()))
}

fn leaf() -> impl Strategy<Value = String> {
    prop_oneof![
        variable(),
        interpolated(),
        (0..1000i64).prop_map(|n| n.to_string()),
        "[a-z ]{0,8}".prop_map(|s| format!("'{s}'")),
        prop::sample::select(vec!["true", "false", "null", "PHP_EOL", "Foo::BAR"]).prop_map(str::to_string),
    ]
}

fn binary_op() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "+", "-", "*", "/", "%", "**", ".", "<<", ">>", "&", "|", "^", "&&", "||", "==", "!=", "===",
        "!==", "<", ">", "<=", ">=", "<=>", "??", "and", "or", "xor",
    ])
}

fn expr() -> impl Strategy<Value = String> {
    leaf().prop_recursive(5, 48, 4, |inner| {
        prop_oneof![
            (inner.clone(), binary_op(), inner.clone()).prop_map(|(l, op, r)| format!("({l} {op} {r})")),
            (prop::sample::select(vec!["!", "-", "+", "~", "@"]), inner.clone())
                .prop_map(|(op, e)| format!("({op}{e})")),
            (inner.clone(), inner.clone(), inner.clone()).prop_map(|(c, t, e)| format!("({c} ? {t} : {e})")),
            (inner.clone(), inner.clone()).prop_map(|(c, e)| format!("({c} ?: {e})")),
            (variable(), inner.clone()).prop_map(|(v, e)| format!("({v} = {e})")),
            (variable(), inner.clone()).prop_map(|(v, e)| format!("({v} .= {e})")),
            prop::collection::vec(inner.clone(), 0..4).prop_map(|args| format!("f({})", args.join(", "))),
            (variable(), inner.clone()).prop_map(|(v, e)| format!("{v}->run({e})")),
            (variable(), inner.clone()).prop_map(|(v, e)| format!("{v}[{e}]")),
            prop::collection::vec(inner.clone(), 0..6).prop_map(|items| format!("[{}]", items.join(", "))),
            (inner.clone(), inner.clone()).prop_map(|(k, v)| format!("['k' => {k}, 2 => {v}]")),
            inner.clone().prop_map(|e| format!("((int) {e})")),
            inner.clone().prop_map(|e| format!("(fn($x) => {e})")),
            (inner.clone(), inner.clone()).prop_map(|(s, e)| format!("match ({s}) {{ 1, 2 => {e}, default => null }}")),
            inner.prop_map(|e| format!("(new Foo({e}))")),
        ]
    })
}

fn stmt() -> impl Strategy<Value = String> {
    let simple = prop_oneof![
        (variable(), expr()).prop_map(|(v, e)| format!("{v} = {e};")),
        expr().prop_map(|e| format!("echo {e};")),
        expr().prop_map(|e| format!("f({e});")),
        expr().prop_map(|e| format!("return {e};")),
    ];
    simple.prop_recursive(3, 24, 4, |inner| {
        let body = prop::collection::vec(inner, 0..4).prop_map(|stmts| stmts.join(" "));
        prop_oneof![
            (expr(), body.clone()).prop_map(|(c, b)| format!("if ({c}) {{ {b} }}")),
            (expr(), body.clone(), body.clone()).prop_map(|(c, t, e)| format!("if ({c}) {{ {t} }} else {{ {e} }}")),
            (expr(), body.clone()).prop_map(|(c, b)| format!("while ({c}) {{ {b} break; }}")),
            (variable(), body.clone()).prop_map(|(v, b)| format!("foreach ({v} as $k => &$v) {{ {b} continue; }}")),
            (expr(), body.clone()).prop_map(|(c, b)| format!("switch ({c}) {{ case 1: {b} break; default: {b} }}")),
            (body.clone(), body.clone()).prop_map(|(t, c)| format!("try {{ {t} }} catch (A | B $e) {{ {c} }}")),
            body.prop_map(|b| format!("function g() {{ {b} }}")),
        ]
    })
}

fn program() -> impl Strategy<Value = String> {
    prop::collection::vec(stmt(), 1..6).prop_map(|stmts| format!("<?php\n{}\n", stmts.join("\n")))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn parse_is_deterministic(source in program()) {
        prop_assert_eq!(parse(&source), parse(&source));
    }

    #[test]
    fn printed_output_reparses_to_the_same_tree(source in program()) {
        let program = parse(&source);
        let printed = phpcanon::print(&program);
        let reparsed = phpcanon::parse(&printed);
        prop_assert!(reparsed.is_ok(), "printed output rejected: {:?}\n{}", reparsed, printed);
        prop_assert_eq!(reparsed.ok(), Some(program), "tree changed after printing:\n{}", printed);
    }

    #[test]
    fn printing_is_idempotent(source in program()) {
        let once = phpcanon::print(&parse(&source));
        let twice = phpcanon::print(&parse(&once));
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn garbage_is_rejected_not_panicked(source in "<\\?php [ -~\n]{0,120}") {
        let _ = phpcanon::parse(&source);
    }
}
