//! Every corpus file parses, prints to a fixed point, and the canonical
//! text of the smaller files is pinned.

mod common;

use common::{assert_fixed_point, fixture};

const CORPUS: &[&str] = &[
    "arrays.php",
    "branching.php",
    "control_struct.php",
    "foreach.php",
    "match.php",
    "mysql-exec.php",
    "namespace.php",
    "property_declaration.php",
];

fn canonical(name: &str) -> String {
    phpcanon::format_source(&fixture(name)).unwrap_or_else(|e| panic!("{name}: {e}"))
}

#[test]
fn corpus_is_a_fixed_point() {
    for name in CORPUS {
        assert_fixed_point(&fixture(name));
    }
}

#[test]
fn formatting_is_idempotent() {
    for name in CORPUS {
        let once = canonical(name);
        let twice = phpcanon::format_source(&once).unwrap_or_else(|e| panic!("{name}: {e}\n{once}"));
        assert_eq!(twice, once, "{name}");
    }
}

#[test]
fn alternative_and_brace_halves_agree() {
    let program = common::parse_ok(&fixture("control_struct.php"));
    let loops: Vec<_> = program
        .stmts
        .iter()
        .filter(|s| matches!(s.node, phpcanon::parser::ast::Stmt::While { .. }))
        .collect();
    assert_eq!(loops.len(), 2);
    assert_eq!(loops[0], loops[1]);
}

#[test]
fn arrays() {
    insta::assert_snapshot!(canonical("arrays.php"), @r#"
<?php

$fruitsArray = ["Apple", "Banana", "Cherry"];
$fruitsShort = ["Apple", "Banana", "Cherry"];
$personArray = ["first_name" => "John", "last_name" => "Doe", "age" => 30];
$personShort = ["first_name" => "John", "last_name" => "Doe", "age" => 30];
$matrixArray = [[1, 2, 3], [4, 5, 6], [7, 8, 9]];
$matrixShort = [[1, 2, 3], [4, 5, 6], [7, 8, 9]];
$emptyArray = [];
$emptyShort = [];
"#);
}

#[test]
fn match_expression() {
    insta::assert_snapshot!(canonical("match.php"), @r#"
<?php

function getFruitColor(string $fruit): string {
    return match ($fruit) {
        'apple' => 'red',
        'banana' => 'yellow',
        'cherry' => 'red',
        'grape' => 'purple',
        'orange' => 'orange',
        default => 'unknown color',
    };
}

$fruits = [
    'apple',
    'banana',
    'cherry',
    'grape',
    'orange',
    'kiwi',
];
foreach ($fruits as $fruit) {
    echo "The color of $fruit is " . getFruitColor($fruit) . ".\n";
}
"#);
}

#[test]
fn class_with_constructor() {
    insta::assert_snapshot!(canonical("mysql-exec.php"), @r#"
<?php

class DBWrapper {
    public $mysql;

    public function __construct($dsn, $user, $pass) {
        $this->mysql = new PDO($dsn, $user, $pass);
    }
}

$object = new DBWrapper("mysql:host=localhost;dbname=testdb;charset=utf8", "root", "password");
$object->mysql->exec("DELETE FROM users WHERE last_login < NOW() - INTERVAL 1 YEAR");
"#);
}

#[test]
fn property_hooks() {
    insta::assert_snapshot!(canonical("property_declaration.php"), @r#"
<?php

class Example {
    private bool $modified = false;
    private float $x = 0.0;
    private int $y = 0;

    public string $foo = 'default value' {
        get => $this->foo . ($this->modified ? ' (modified)' : '');
        set {
            $this->foo = strtolower($value);
            $this->modified = true;
        }
    }
}
"#);
}
