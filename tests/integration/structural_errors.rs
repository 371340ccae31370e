mod common;

use common::{parse_err, structural_kind};
use phpcanon::config::{ParseOptions, DEFAULT_MAX_NESTING_DEPTH};
use phpcanon::diagnostics::{DiagnosticKind, StructuralKind};

#[test]
fn goto_targets() {
    assert_eq!(structural_kind("goto end; echo 1;"), Some(StructuralKind::DanglingGoto));
    assert_eq!(structural_kind("function f() { goto out; } out:"), Some(StructuralKind::DanglingGoto));
    assert!(phpcanon::parse("<?php goto end; echo 1; end: echo 2;").is_ok());
    assert!(phpcanon::parse("<?php function f() { back: goto back; }").is_ok());
}

#[test]
fn labels_are_unique_per_body() {
    assert_eq!(structural_kind("a: echo 1; a: echo 2;"), Some(StructuralKind::DuplicateLabel));
    assert!(phpcanon::parse("<?php a: function f() { a: }").is_ok());
}

#[test]
fn catch_and_finally_arity() {
    assert_eq!(structural_kind("try { f(); }"), Some(StructuralKind::TryWithoutHandler));
    assert_eq!(structural_kind("try { f(); } catch ($e) { }"), Some(StructuralKind::EmptyCatchTypes));
    assert!(phpcanon::parse("<?php try { f(); } finally { g(); }").is_ok());
}

#[test]
fn property_hooks() {
    for fragment in [
        "class A { public $a { get => 1; get => 2; } }",
        "class A { public $a { set => 1; set => 2; } }",
        "class A { public $a { fetch => 1; } }",
        "class A { public $a { } }",
    ] {
        assert_eq!(structural_kind(fragment), Some(StructuralKind::MalformedPropertyHook), "{fragment}");
    }
}

#[test]
fn alternative_syntax_terminators() {
    assert_eq!(structural_kind("while ($a): echo 1; endif;"), Some(StructuralKind::MismatchedTerminator));
    assert_eq!(
        structural_kind("if ($a): foreach ($b as $c): echo $c; endif;"),
        Some(StructuralKind::MismatchedTerminator)
    );
    assert_eq!(structural_kind("foreach ($a as $b): echo $b;"), Some(StructuralKind::UnterminatedBlock));
    assert_eq!(structural_kind("switch ($a): case 1: echo 1;"), Some(StructuralKind::UnterminatedBlock));
}

#[test]
fn stray_terminator_is_a_syntax_error() {
    let err = parse_err("<?php echo 1; endwhile;");
    assert_eq!(err.kind(), DiagnosticKind::SyntaxError);
    assert!(err.message().contains("without a matching opening block"), "{err}");
}

#[test]
fn jumps() {
    assert_eq!(structural_kind("break;"), Some(StructuralKind::JumpOutsideLoop));
    assert_eq!(structural_kind("foreach ($a as $b) { continue 3; }"), Some(StructuralKind::InvalidJumpLevel));
    assert_eq!(structural_kind("while (1) { break 0; }"), Some(StructuralKind::InvalidJumpLevel));
    assert!(phpcanon::parse("<?php while (1) { switch ($a) { case 1: continue 2; } }").is_ok());
}

#[test]
fn duplicate_defaults() {
    assert_eq!(
        structural_kind("switch ($a) { default: f(); case 1: g(); default: h(); }"),
        Some(StructuralKind::DuplicateDefault)
    );
    assert_eq!(
        structural_kind("$v = match ($a) { default => 1, 2 => 3, default => 4 };"),
        Some(StructuralKind::DuplicateDefault)
    );
}

#[test]
fn nesting_depth_is_configurable() {
    let deep = format!("<?php $x = {}1{};", "(".repeat(30), ")".repeat(30));
    assert!(phpcanon::parse(&deep).is_ok());
    let err = phpcanon::parse_with_options(&deep, &ParseOptions { max_nesting_depth: 8 }).unwrap_err();
    assert_eq!(err.structural_kind(), Some(StructuralKind::NestingTooDeep));

    let blocks = format!("<?php {}{}", "{".repeat(12), "}".repeat(12));
    let err = phpcanon::parse_with_options(&blocks, &ParseOptions { max_nesting_depth: 10 }).unwrap_err();
    assert_eq!(err.structural_kind(), Some(StructuralKind::NestingTooDeep));
}

/// Run `f` on a thread with a 2 MiB stack, the default for spawned threads.
fn on_small_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    std::thread::Builder::new().stack_size(2 << 20).spawn(f).unwrap().join().unwrap()
}

#[test]
fn default_depth_limit_fits_a_small_stack() {
    let parens = |n: usize| format!("<?php $x = {}1{};", "(".repeat(n), ")".repeat(n));
    // The statement's expression and the assigned value take two levels.
    let at_limit = parens(DEFAULT_MAX_NESTING_DEPTH - 2);
    let over_limit = parens(DEFAULT_MAX_NESTING_DEPTH - 1);
    let (formatted, err) =
        on_small_stack(move || (phpcanon::format_source(&at_limit), phpcanon::parse(&over_limit).unwrap_err()));
    assert_eq!(formatted.unwrap(), "<?php\n\n$x = 1;\n");
    assert_eq!(err.structural_kind(), Some(StructuralKind::NestingTooDeep));
}

#[test]
fn deeply_nested_blocks_fit_a_small_stack() {
    // Each `if` takes one level and its block another; the innermost echo one more.
    let depth = (DEFAULT_MAX_NESTING_DEPTH - 1) / 2;
    let ifs = format!("<?php {}echo 1;{}", "if ($a) { ".repeat(depth), " }".repeat(depth));
    let calls = format!("<?php {}1{};", "f(".repeat(DEFAULT_MAX_NESTING_DEPTH / 2), ")".repeat(DEFAULT_MAX_NESTING_DEPTH / 2));
    let too_deep = format!("<?php {}echo 1;{}", "if ($a) { ".repeat(depth + 1), " }".repeat(depth + 1));

    let (ifs_ok, calls_ok, err) = on_small_stack(move || {
        let fixed_point = |src: &str| {
            let once = phpcanon::format_source(src).unwrap();
            phpcanon::format_source(&once).unwrap() == once
        };
        (fixed_point(&ifs), fixed_point(&calls), phpcanon::parse(&too_deep).unwrap_err())
    });
    assert!(ifs_ok);
    assert!(calls_ok);
    assert_eq!(err.structural_kind(), Some(StructuralKind::NestingTooDeep));
}

#[test]
fn syntax_errors_name_what_was_expected() {
    let cases: &[(&str, &[&str])] = &[
        ("<?php $a = 1", &["';'"]),
        ("<?php if ($a { }", &["')'"]),
        ("<?php $x = 1 +;", &["expression"]),
        ("<?php function f {}", &["'('"]),
        ("<?php foreach ($a => $b) {}", &["'as'"]),
    ];
    for (src, expected) in cases {
        let err = parse_err(src);
        assert_eq!(err.kind(), DiagnosticKind::SyntaxError, "{src}");
        assert_eq!(err.expected_kinds(), *expected, "{src}: {err}");
    }
}

#[test]
fn unrecognized_input() {
    let err = parse_err("<?php $out = `ls`;");
    assert_eq!(err.message(), "unrecognized input '`'");
    assert_eq!((err.span().line, err.span().column), (1, 14));
}

#[test]
fn invalid_assignment_target() {
    assert_eq!(parse_err("<?php f() = 1;").message(), "invalid assignment target");
}

#[test]
fn first_error_wins() {
    let err = parse_err("<?php\nbreak;\ngoto nowhere;\n");
    assert_eq!(err.structural_kind(), Some(StructuralKind::JumpOutsideLoop));
    assert_eq!(err.span().line, 2);

    // Gotos resolve only once their scope is complete; the earlier one
    // is still the one reported.
    let err = parse_err("<?php
goto nowhere;
break;
");
    assert_eq!(err.structural_kind(), Some(StructuralKind::DanglingGoto));
    assert_eq!(err.span().line, 2);

    let err = parse_err("<?php
function f() {
    goto nowhere;
    continue;
}
");
    assert_eq!(err.structural_kind(), Some(StructuralKind::DanglingGoto));
    assert_eq!(err.span().line, 3);
}
