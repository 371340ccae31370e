mod common;

use std::path::Path;
use std::process::Output;

use common::phpcanon;
use tempfile::TempDir;

const MESSY: &str = "<?php\nIF ($a) ECHO 1; else if ($b) { echo array(1,2); }\n";
const CANONICAL: &str = "<?php\n\nif ($a) {\n    echo 1;\n} elseif ($b) {\n    echo [1, 2];\n}\n";

/// A scratch directory that config discovery will not walk out of.
fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join(".git")).unwrap();
    dir
}

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

fn run(dir: &Path, args: &[&str]) -> Output {
    phpcanon().args(args).current_dir(dir).output().unwrap()
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn fmt_prints_canonical_text() {
    let dir = workspace();
    write(dir.path(), "a.php", MESSY);
    let out = run(dir.path(), &["fmt", "a.php"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out), CANONICAL);
}

#[test]
fn fmt_check_lists_files_that_would_change() {
    let dir = workspace();
    write(dir.path(), "messy.php", MESSY);
    write(dir.path(), "clean.php", CANONICAL);

    let out = run(dir.path(), &["fmt", "--check", "messy.php", "clean.php"]);
    assert!(!out.status.success());
    assert_eq!(stdout(&out).trim(), "messy.php");

    let out = run(dir.path(), &["fmt", "--check", "clean.php"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).is_empty());
}

#[test]
fn fmt_write_rewrites_in_place() {
    let dir = workspace();
    write(dir.path(), "a.php", MESSY);
    let out = run(dir.path(), &["fmt", "--write", "a.php"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).is_empty());
    assert_eq!(std::fs::read_to_string(dir.path().join("a.php")).unwrap(), CANONICAL);
}

#[test]
fn write_and_check_conflict() {
    let dir = workspace();
    write(dir.path(), "a.php", MESSY);
    let out = run(dir.path(), &["fmt", "--write", "--check", "a.php"]);
    assert!(!out.status.success());
    assert_eq!(std::fs::read_to_string(dir.path().join("a.php")).unwrap(), MESSY);
}

#[test]
fn directories_expand_to_php_files() {
    let dir = workspace();
    write(dir.path(), "src/b.php", MESSY);
    write(dir.path(), "src/a.php", CANONICAL);
    write(dir.path(), "src/notes.txt", "not php");
    write(dir.path(), "src/nested/c.php", MESSY);

    let out = run(dir.path(), &["fmt", "--check", "src"]);
    let listed: Vec<String> = stdout(&out).lines().map(|l| l.replace('\\', "/")).collect();
    assert_eq!(listed, ["src/b.php"]);

    let out = run(dir.path(), &["fmt", "--check", "--recursive", "src"]);
    let listed: Vec<String> = stdout(&out).lines().map(|l| l.replace('\\', "/")).collect();
    assert_eq!(listed, ["src/b.php", "src/nested/c.php"]);
}

#[test]
fn check_reports_rendered_diagnostics() {
    let dir = workspace();
    write(dir.path(), "good.php", CANONICAL);
    write(dir.path(), "bad.php", "<?php\nwhile ($a):\n    echo 1;\nendif;\n");

    let out = run(dir.path(), &["check", "good.php"]);
    assert!(out.status.success(), "{}", stderr(&out));

    let out = run(dir.path(), &["check", "good.php", "bad.php"]);
    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.contains("bad.php"), "{err}");
    assert!(err.contains("mismatched block terminator"), "{err}");
    assert!(!err.contains("good.php"), "{err}");
}

#[test]
fn ast_dumps_json() {
    let dir = workspace();
    write(dir.path(), "a.php", "<?php echo $x;");
    let out = run(dir.path(), &["ast", "a.php"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json["open_tag"], true);
    assert_eq!(json["stmts"][0]["node"]["Echo"][0]["node"]["Variable"], "x");
    assert_eq!(json["stmts"][0]["span"]["line"], 1);
}

#[test]
fn ast_writes_pretty_json_to_a_file() {
    let dir = workspace();
    write(dir.path(), "a.php", "<?php goto end; end:");
    let out = run(dir.path(), &["ast", "--pretty", "-o", "tree.json", "a.php"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).is_empty());
    let text = std::fs::read_to_string(dir.path().join("tree.json")).unwrap();
    assert!(text.contains("\n  \"stmts\""), "{text}");
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["stmts"][1]["node"]["Label"], "end");
}

#[test]
fn stats_counts_and_locates_kinds() {
    let dir = workspace();
    write(dir.path(), "a.php", "<?php\n$a->b();\n$c->d();\necho 1, 2;\n");

    let out = run(dir.path(), &["stats", "a.php"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let text = stdout(&out);
    for line in ["echo: 1", "expr-stmt: 2", "literal: 2", "method-call: 2", "variable: 2"] {
        assert!(text.lines().any(|l| l == line), "missing {line:?} in:\n{text}");
    }

    let out = run(dir.path(), &["stats", "a.php", "--kind", "method_call"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out), "a.php:2:1\na.php:3:1\n");
}

#[test]
fn stats_walks_directories() {
    let dir = workspace();
    write(dir.path(), "src/a.php", "<?php\necho 1;\n");
    write(dir.path(), "src/nested/b.php", "<?php\n\necho 2, 3;\n");

    let out = run(dir.path(), &["stats", "--kind", "echo", "src"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out).replace('\\', "/"), "src/a.php:2:1\n");

    let out = run(dir.path(), &["stats", "--kind", "echo", "--recursive", "src"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out).replace('\\', "/"), "src/a.php:2:1\nsrc/nested/b.php:3:1\n");

    let out = run(dir.path(), &["stats", "-r", "src"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let text = stdout(&out).replace('\\', "/");
    assert!(text.starts_with("src/a.php:\n"), "{text}");
    assert!(text.contains("\n\nsrc/nested/b.php:\n"), "{text}");
    assert!(text.contains("literal: 2\n"), "{text}");
}

#[test]
fn cfg_writes_dot_graphs() {
    let dir = workspace();
    write(dir.path(), "a.php", "<?php\nreturn;\necho 1;\n");
    write(dir.path(), "lib/b.php", "<?php\nwhile ($a) { echo 2; }\n");

    let out = run(dir.path(), &["cfg", "a.php"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let dot = stdout(&out);
    assert!(dot.starts_with("digraph CFG {\n"), "{dot}");
    assert!(dot.contains("  3 -> 2 [weight=10];\n"), "{dot}");
    assert!(dot.contains("BGCOLOR='lightgray'"), "{dot}");

    let out = run(dir.path(), &["cfg", "a.php", "-o", "a.dot"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).is_empty());
    assert_eq!(std::fs::read_to_string(dir.path().join("a.dot")).unwrap(), dot);

    let out = run(dir.path(), &["cfg", "a.php", "lib", "-o", "graphs"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let b = std::fs::read_to_string(dir.path().join("graphs/b.dot")).unwrap();
    assert!(b.contains("[label=\"True\"]"), "{b}");
    assert!(dir.path().join("graphs/a.dot").exists());
}

#[test]
fn stats_rejects_unknown_kind() {
    let dir = workspace();
    write(dir.path(), "a.php", "<?php echo 1;");
    let out = run(dir.path(), &["stats", "a.php", "--kind", "spaceship"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("spaceship"));
}

#[test]
fn max_depth_flag_and_config_file() {
    let dir = workspace();
    let deep = format!("<?php $x = {}1{};\n", "(".repeat(20), ")".repeat(20));
    write(dir.path(), "deep.php", &deep);

    assert!(run(dir.path(), &["check", "deep.php"]).status.success());

    let out = run(dir.path(), &["check", "--max-depth", "5", "deep.php"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("nesting too deep"), "{}", stderr(&out));

    write(dir.path(), "phpcanon.toml", "[parse]\nmax_nesting_depth = 5\n");
    let out = run(dir.path(), &["check", "deep.php"]);
    assert!(!out.status.success());

    let out = run(dir.path(), &["check", "--max-depth", "64", "deep.php"]);
    assert!(out.status.success(), "{}", stderr(&out));

    let out = run(dir.path(), &["check", "--max-depth", "0", "deep.php"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("--max-depth"));
}

#[test]
fn invalid_config_is_reported() {
    let dir = workspace();
    write(dir.path(), "a.php", CANONICAL);
    write(dir.path(), "custom.toml", "[parse]\nmax_depth = 3\n");
    let out = run(dir.path(), &["--config", "custom.toml", "check", "a.php"]);
    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.starts_with("error: "), "{err}");
    assert!(err.contains("custom.toml"), "{err}");
}

#[test]
fn missing_file_is_an_error() {
    let dir = workspace();
    let out = run(dir.path(), &["fmt", "missing.php"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("could not read missing.php"));
}
