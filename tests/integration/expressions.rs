mod common;

use common::{assert_fixed_point, fmt, stmts};
use phpcanon::parser::ast::*;

/// The expression of a single expression statement.
fn expr(src: &str) -> Expr {
    match stmts(&format!("{src};")).into_iter().next() {
        Some(Stmt::Expr(e)) => e.node,
        other => panic!("expected an expression statement, got {other:?}"),
    }
}

fn binary(e: &Expr) -> (BinOp, &Expr, &Expr) {
    match e {
        Expr::Binary { op, lhs, rhs } => (*op, &lhs.node, &rhs.node),
        other => panic!("expected a binary expression, got {other:?}"),
    }
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let e = expr("$a + $b * $c");
    let (op, _, rhs) = binary(&e);
    assert_eq!(op, BinOp::Add);
    assert_eq!(binary(rhs).0, BinOp::Mul);
}

#[test]
fn comparison_binds_tighter_than_logic() {
    let e = expr("$a < 1 || $b == 2 && $c");
    let (op, lhs, rhs) = binary(&e);
    assert_eq!(op, BinOp::Or);
    assert_eq!(binary(lhs).0, BinOp::Lt);
    assert_eq!(binary(rhs).0, BinOp::And);
}

#[test]
fn subtraction_is_left_associative() {
    let e = expr("$a - $b - $c");
    let (_, lhs, rhs) = binary(&e);
    assert_eq!(binary(lhs).0, BinOp::Sub);
    assert_eq!(*rhs, Expr::Variable("c".into()));
}

#[test]
fn coalesce_and_ternary() {
    assert!(matches!(expr("$a ?? $b ?? $c"), Expr::NullCoalesce { rhs, .. } if matches!(rhs.node, Expr::NullCoalesce { .. })));
    let Expr::Ternary { condition, then_expr, .. } = expr("$v > 0 ? 'p' : 'n'") else { panic!("expected ternary") };
    assert!(matches!(condition.node, Expr::Binary { op: BinOp::Gt, .. }));
    assert!(then_expr.is_some());
}

#[test]
fn ternary_is_right_associative() {
    let Expr::Ternary { condition, else_expr, .. } = expr("$a ? 1 : $b ? 2 : 3") else { panic!("expected ternary") };
    assert_eq!(condition.node, Expr::Variable("a".into()));
    let Expr::Ternary { condition, .. } = &else_expr.node else { panic!("else branch should be a ternary") };
    assert_eq!(condition.node, Expr::Variable("b".into()));
    assert_eq!(expr("$a ? 1 : $b ? 2 : 3"), expr("$a ? 1 : ($b ? 2 : 3)"));
    assert_ne!(expr("$a ? 1 : $b ? 2 : 3"), expr("($a ? 1 : $b) ? 2 : 3"));

    let Expr::Ternary { then_expr: None, else_expr, .. } = expr("$a ?: $b ?: $c") else { panic!("expected short ternary") };
    assert!(matches!(else_expr.node, Expr::Ternary { then_expr: None, .. }));
}

#[test]
fn member_access_chains() {
    let e = expr("$object->mysql->exec('q')");
    let Expr::MethodCall { object, method, args, nullsafe } = e else { panic!("expected method call") };
    assert_eq!(method.node, "exec");
    assert_eq!(args.len(), 1);
    assert!(!nullsafe);
    assert!(matches!(object.node, Expr::PropertyAccess { .. }));
    assert!(matches!(expr("$a?->b"), Expr::PropertyAccess { nullsafe: true, .. }));
}

#[test]
fn static_access() {
    assert!(matches!(expr("Foo::$bar"), Expr::StaticProperty { .. }));
    assert!(matches!(expr("Foo::BAR"), Expr::ClassConst { .. }));
    assert!(matches!(expr("Foo::class"), Expr::ClassConst { name, .. } if name.node == "class"));
    assert!(matches!(expr("parent::__construct()"), Expr::StaticCall { .. }));
    assert!(matches!(expr("static::make()"), Expr::StaticCall { .. }));
}

#[test]
fn index_and_append() {
    assert!(matches!(expr("$a[] = 1"), Expr::Assign { target, .. } if matches!(target.node, Expr::Index { index: None, .. })));
    assert!(matches!(expr("$a['k'][0]"), Expr::Index { base, .. } if matches!(base.node, Expr::Index { .. })));
}

#[test]
fn compound_assignments() {
    for (src, op) in [
        ("$a += 1", BinOp::Add),
        ("$a .= 'x'", BinOp::Concat),
        ("$a ??= []", BinOp::Coalesce),
        ("$a **= 2", BinOp::Pow),
        ("$a <<= 1", BinOp::Shl),
    ] {
        assert!(matches!(expr(src), Expr::CompoundAssign { op: o, .. } if o == op), "{src}");
    }
}

#[test]
fn interpolated_strings() {
    let Expr::Interpolated(parts) = expr(r#""Key: $key, Value: {$arr['v']}\n""#) else {
        panic!("expected interpolation")
    };
    assert_eq!(parts.len(), 5);
    assert_eq!(parts[0], InterpPart::Lit("Key: ".into()));
    assert!(matches!(&parts[1], InterpPart::Expr(e) if e.node == Expr::Variable("key".into())));
    assert!(matches!(&parts[3], InterpPart::Expr(e) if matches!(e.node, Expr::Index { .. })));
}

#[test]
fn literals() {
    assert_eq!(expr("0x1F"), Expr::Literal(Literal::Int(31)));
    assert_eq!(expr("1.5e3"), Expr::Literal(Literal::Float(1500.0)));
    assert_eq!(expr("'a\\'b'"), Expr::Literal(Literal::String { raw: "a\\'b".into(), quote: Quote::Single }));
    assert_eq!(expr("\"x\\n\""), Expr::Literal(Literal::String { raw: "x\\n".into(), quote: Quote::Double }));
}

#[test]
fn closures_capture_by_reference() {
    let Expr::Assign { value, .. } = expr("$f = function ($x) use ($a, &$b): int { return $x; }") else {
        panic!("expected assignment")
    };
    let Expr::Closure(closure) = &value.node else { panic!("expected closure") };
    assert_eq!(closure.uses, [ClosureUse { name: "a".into(), by_ref: false }, ClosureUse { name: "b".into(), by_ref: true }]);
    assert!(closure.return_type.is_some());
}

#[test]
fn special_forms() {
    assert!(matches!(expr("isset($a, $b['c'])"), Expr::Isset(v) if v.len() == 2));
    assert!(matches!(expr("empty($a)"), Expr::Empty(_)));
    assert!(matches!(expr("print 'x'"), Expr::Print(_)));
    assert!(matches!(expr("clone $a"), Expr::Clone(_)));
    assert!(matches!(expr("require_once 'a.php'"), Expr::Include { kind: IncludeKind::RequireOnce, .. }));
    assert!(matches!(expr("$a instanceof Foo"), Expr::InstanceOf { .. }));
    assert!(matches!(expr("@f()"), Expr::Unary { op: UnaryOp::Silence, .. }));
}

#[test]
fn canonical_parentheses() {
    let cases = [
        ("$x = ($a + $b) * $c;", "$x = ($a + $b) * $c;\n"),
        ("$x = $a * ($b + $c);", "$x = $a * ($b + $c);\n"),
        ("$x = ((($a)));", "$x = $a;\n"),
        ("$x = $a . ($b ? 'y' : 'n');", "$x = $a . ($b ? 'y' : 'n');\n"),
        ("$x = ($a ?? $b) ?? $c;", "$x = ($a ?? $b) ?? $c;\n"),
        ("$x = 2 ** 3 ** 2;", "$x = 2 ** 3 ** 2;\n"),
        ("$x = -2 ** 2;", "$x = -2 ** 2;\n"),
        ("$x = (-2) ** 2;", "$x = (-2) ** 2;\n"),
        ("$x = !($a && $b);", "$x = !($a && $b);\n"),
        ("$x = (clone $a)->b;", "$x = (clone $a)->b;\n"),
        ("$x = (function () { return 1; })();", "$x = (function () {\n    return 1;\n})();\n"),
        ("$x = $a ? ($b ? 1 : 2) : 3;", "$x = $a ? ($b ? 1 : 2) : 3;\n"),
        ("$x = $a ?: $b;", "$x = $a ?: $b;\n"),
        ("$x = $a ? 1 : ($b ? 2 : 3);", "$x = $a ? 1 : $b ? 2 : 3;\n"),
        ("$x = ($a ? 1 : $b) ? 2 : 3;", "$x = ($a ? 1 : $b) ? 2 : 3;\n"),
        ("$x = (int) ($a + 1);", "$x = (int) ($a + 1);\n"),
        ("$ok = $a && ($b = f());", "$ok = $a && ($b = f());\n"),
        ("$x = new $class($arg);", "$x = new $class($arg);\n"),
    ];
    for (src, want) in cases {
        assert_eq!(fmt(src), want, "{src}");
    }
}

#[test]
fn canonical_calls_and_arguments() {
    assert_eq!(fmt("f(...$args, name: 1);"), "f(...$args, name: 1);\n");
    assert_eq!(fmt("$o?->m(1)->n;"), "$o?->m(1)->n;\n");
    assert_eq!(fmt("Foo::$bar[0];"), "Foo::$bar[0];\n");
    assert_eq!(fmt("$a = [...$b, 'k' => &$c];"), "$a = [...$b, 'k' => &$c];\n");
}

#[test]
fn expressions_round_trip() {
    for src in [
        "<?php $x = $a - ($b - $c) - -$d;",
        "<?php $y = $a ? $b : ($c ? $d : $e);",
        "<?php $y = $a ? 1 : $b ? 2 : $c ?: 3;",
        "<?php echo \"{{$a} {{$b->c} ${{$d}}\";",
        "<?php $z = !$a instanceof B || $c <=> $d;",
        "<?php $s = \"{$a->b[0]} $c[1] {$d}e ${f}\";",
        "<?php $f = static fn($x) => fn($y) => $x + $y;",
        "<?php echo $a ?? throw new Exception('none');",
        "<?php $r = match (true) { $v > 0, $v < -5 => 'big', default => 'small' };",
        "<?php $q = $a = $b += 2;",
        "<?php $w = @$a[0] . ~$b . +$c . - -$d . -(--$e);",
    ] {
        assert_fixed_point(src);
    }
}
