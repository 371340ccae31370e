mod common;

use common::{fixture, fmt, parse_ok, stmts};
use phpcanon::parser::ast::*;

fn only_class(src: &str) -> ClassDecl {
    match stmts(src).into_iter().next() {
        Some(Stmt::Class(class)) => class,
        other => panic!("expected a class, got {other:?}"),
    }
}

fn only_function(src: &str) -> FunctionDecl {
    match stmts(src).into_iter().next() {
        Some(Stmt::Function(func)) => func,
        other => panic!("expected a function, got {other:?}"),
    }
}

#[test]
fn function_parameters() {
    let func = only_function("function &f(int $a, ?string $b = null, &$c, int|float ...$rest): ?array { return []; }");
    assert!(func.sig.by_ref);
    assert_eq!(func.sig.name.node, "f");
    let params = &func.sig.params;
    assert_eq!(params.len(), 4);
    assert_eq!(params[0].ty.as_ref().map(|t| t.node.clone()), Some(TypeNode::Named(QualifiedName::simple("int"))));
    assert!(matches!(params[1].ty.as_ref().map(|t| &t.node), Some(TypeNode::Nullable(_))));
    assert!(params[1].default.is_some());
    assert!(params[2].by_ref && params[2].ty.is_none());
    assert!(params[3].variadic);
    assert!(matches!(params[3].ty.as_ref().map(|t| &t.node), Some(TypeNode::Union(alts)) if alts.len() == 2));
    assert!(matches!(func.sig.return_type.as_ref().map(|t| &t.node), Some(TypeNode::Nullable(_))));
}

#[test]
fn nullable_inside_union_is_rejected() {
    let err = common::parse_err("<?php function f(?int|string $a) {}");
    assert!(err.message().contains("nullable"), "{err}");
}

#[test]
fn class_header() {
    let class = only_class("abstract class Repo extends Base\\Model implements \\Countable, Stringable { }");
    assert!(class.modifiers.is_abstract);
    assert_eq!(class.extends.map(|n| n.node.to_string()), Some("Base\\Model".to_string()));
    let implements: Vec<String> = class.implements.iter().map(|n| n.node.to_string()).collect();
    assert_eq!(implements, ["\\Countable", "Stringable"]);
}

#[test]
fn class_members() {
    let class = only_class(
        "final readonly class P {
            const A = 1, B = 2;
            private const C = 3;
            public static ?int $count = 0;
            protected $a, $b = 2;
            public function __construct(private readonly int $x, public $y = 1) {}
            abstract protected function area(): float;
            final public static function make(): static { return new static(); }
        }",
    );
    assert!(class.modifiers.is_final && class.modifiers.is_readonly);
    let kinds: Vec<&str> = class
        .members
        .iter()
        .map(|m| match &m.node {
            ClassMember::Const { .. } => "const",
            ClassMember::Property(_) => "property",
            ClassMember::Method(_) => "method",
        })
        .collect();
    assert_eq!(kinds, ["const", "const", "property", "property", "property", "method", "method", "method"]);

    let ClassMember::Property(count) = &class.members[2].node else { panic!("expected property") };
    assert!(count.is_static);
    assert_eq!(count.visibility, Some(Visibility::Public));

    let ClassMember::Property(b) = &class.members[4].node else { panic!("expected property") };
    assert_eq!(b.name.node, "b");
    assert_eq!(b.visibility, Some(Visibility::Protected));

    let ClassMember::Method(ctor) = &class.members[5].node else { panic!("expected method") };
    assert_eq!(ctor.sig.params[0].promote, Some(Visibility::Private));
    assert!(ctor.sig.params[0].readonly);

    let ClassMember::Method(area) = &class.members[6].node else { panic!("expected method") };
    assert!(area.modifiers.is_abstract);
    assert!(area.body.is_none());
}

#[test]
fn property_without_visibility_keeps_none() {
    let class = only_class("class A { static $s; }");
    let ClassMember::Property(prop) = &class.members[0].node else { panic!("expected property") };
    assert_eq!(prop.visibility, None);
    assert_eq!(fmt("class A { static $s; }"), "class A {\n    static $s;\n}\n");
}

#[test]
fn property_hooks_from_fixture() {
    let program = parse_ok(&fixture("property_declaration.php"));
    let Stmt::Class(class) = &program.stmts[0].node else { panic!("expected class") };
    let ClassMember::Property(foo) = &class.members[3].node else { panic!("expected property") };
    let hook = foo.hook.as_ref().expect("hooked property");
    assert!(matches!(hook.getter.as_ref().map(|g| &g.node), Some(HookBody::Expr(_))));
    let setter = hook.setter.as_ref().expect("setter");
    assert_eq!(setter.node.param, "value");
    assert!(matches!(setter.node.body, HookBody::Block(_)));
}

#[test]
fn namespace_forms() {
    let parsed = stmts("namespace App\\Models; namespace Other { echo 1; } namespace { echo 2; }");
    assert_eq!(
        parsed[0],
        Stmt::Namespace {
            name: Some(QualifiedName { parts: vec!["App".into(), "Models".into()], fully_qualified: false }),
            body: None,
        }
    );
    assert!(matches!(&parsed[1], Stmt::Namespace { name: Some(_), body: Some(b) } if b.stmts.len() == 1));
    assert!(matches!(&parsed[2], Stmt::Namespace { name: None, body: Some(_) }));
}

#[test]
fn namespace_fixture_imports() {
    let program = parse_ok(&fixture("namespace.php"));
    let imports: Vec<&UseImport> = program
        .stmts
        .iter()
        .filter_map(|s| match &s.node {
            Stmt::Use(import) => Some(import),
            _ => None,
        })
        .collect();
    let rendered: Vec<String> = imports
        .iter()
        .map(|i| format!("{:?} {} as {}", i.kind, i.path, i.alias))
        .collect();
    assert_eq!(
        rendered,
        [
            "Class some\\namespace\\ClassA as ClassA",
            "Class some\\namespace\\ClassB as ClassB",
            "Class some\\namespace\\ClassC as C",
            "Function App\\Helpers\\array_flatten as flatten",
            "Function App\\Helpers\\array_first as first",
            "Class parent as parentAlias",
            "Class self as selfAlias",
            "Class static as staticAlias",
        ]
    );
    assert!(matches!(
        &program.stmts[1].node,
        Stmt::Namespace { name: Some(name), body: None } if name.fully_qualified
    ));
}

#[test]
fn use_kinds() {
    let parsed = stmts("use function A\\{f, const B, g as h}; use const X\\Y;");
    let kinds: Vec<UseKind> = parsed
        .iter()
        .map(|s| match s {
            Stmt::Use(import) => import.kind,
            other => panic!("expected use, got {other:?}"),
        })
        .collect();
    assert_eq!(kinds, [UseKind::Function, UseKind::Const, UseKind::Function, UseKind::Const]);
}

#[test]
fn canonical_declarations() {
    assert_eq!(
        fmt("function f(int $a = 1, &...$rest): int|false { return $a; }"),
        "function f(int $a = 1, &...$rest): int|false {\n    return $a;\n}\n"
    );
    assert_eq!(
        fmt("class A extends B { public function __construct(private int $x) { } public function get(): int { return $this->x; } }"),
        "class A extends B {\n    public function __construct(private int $x) {\n    }\n\n    public function get(): int {\n        return $this->x;\n    }\n}\n"
    );
    assert_eq!(
        fmt("use some\\namespace\\{ClassA, ClassC as C};"),
        "use some\\namespace\\ClassA;\nuse some\\namespace\\ClassC as C;\n"
    );
}

#[test]
fn global_static_unset_const_declare() {
    assert_eq!(
        fmt("declare(strict_types=1); const A = 1, B = 'b'; function f() { global $x, $y; static $n = 0, $m; unset($x[1], $y); }"),
        "declare(strict_types=1);\nconst A = 1, B = 'b';\n\nfunction f() {\n    global $x, $y;\n    static $n = 0, $m;\n    unset($x[1], $y);\n}\n"
    );
}
