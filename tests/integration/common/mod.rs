#![allow(dead_code)]

use std::path::PathBuf;
use std::process::Command;

use phpcanon::diagnostics::{Diagnostic, StructuralKind};
use phpcanon::parser::ast::{Program, Stmt};

pub fn phpcanon() -> Command {
    Command::new(env!("CARGO_BIN_EXE_phpcanon"))
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join("corpus").join(name)
}

pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).unwrap()
}

pub fn parse_ok(source: &str) -> Program {
    phpcanon::parse(source).unwrap_or_else(|e| panic!("parse failed: {e}\n--- source ---\n{source}"))
}

pub fn parse_err(source: &str) -> Diagnostic {
    match phpcanon::parse(source) {
        Ok(program) => panic!("expected an error, got {program:#?}"),
        Err(e) => e,
    }
}

/// Statements of a `<?php`-prefixed fragment.
pub fn stmts(fragment: &str) -> Vec<Stmt> {
    parse_ok(&format!("<?php {fragment}")).stmts.into_iter().map(|s| s.node).collect()
}

pub fn structural_kind(fragment: &str) -> Option<StructuralKind> {
    parse_err(&format!("<?php {fragment}")).structural_kind()
}

/// Canonical form of a fragment, without the `<?php` header.
pub fn fmt(fragment: &str) -> String {
    let out = phpcanon::format_source(&format!("<?php\n{fragment}"))
        .unwrap_or_else(|e| panic!("format failed: {e}\n--- source ---\n{fragment}"));
    out.strip_prefix("<?php\n\n").unwrap_or(&out).to_string()
}

/// Printing is idempotent and reparsing the output gives the same tree.
pub fn assert_fixed_point(source: &str) {
    let program = parse_ok(source);
    let printed = phpcanon::print(&program);
    let reparsed = phpcanon::parse(&printed)
        .unwrap_or_else(|e| panic!("reparse failed: {e}\n--- printed ---\n{printed}"));
    assert_eq!(reparsed, program, "tree changed after printing:\n{printed}");
    assert_eq!(phpcanon::print(&reparsed), printed, "printing is not idempotent");
}
