//! Node-kind statistics over a parsed program.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::parser::ast::*;
use crate::span::{Span, Spanned};
use crate::visit::{self, Visitor};

macro_rules! node_kinds {
    ($($variant:ident => $name:literal,)*) => {
        /// Every statement, expression and class-member variant, by name.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum NodeKind {
            $($variant,)*
        }

        impl NodeKind {
            pub const ALL: &'static [NodeKind] = &[$(NodeKind::$variant,)*];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(NodeKind::$variant => $name,)*
                }
            }
        }
    };
}

node_kinds! {
    // statements
    ExprStmt => "expr-stmt",
    Echo => "echo",
    If => "if",
    Switch => "switch",
    While => "while",
    DoWhile => "do-while",
    For => "for",
    Foreach => "foreach",
    Try => "try",
    Break => "break",
    Continue => "continue",
    Goto => "goto",
    Label => "label",
    Return => "return",
    Global => "global",
    StaticVars => "static-vars",
    Unset => "unset",
    Const => "const",
    Declare => "declare",
    Block => "block",
    InlineHtml => "inline-html",
    Function => "function",
    Class => "class",
    Namespace => "namespace",
    Use => "use",
    // class members
    ClassConstant => "class-constant",
    Property => "property",
    Method => "method",
    // expressions
    Literal => "literal",
    Interpolated => "interpolated",
    Variable => "variable",
    Name => "name",
    Array => "array",
    Binary => "binary",
    Unary => "unary",
    IncDec => "inc-dec",
    Assign => "assign",
    CompoundAssign => "compound-assign",
    NullCoalesce => "null-coalesce",
    Ternary => "ternary",
    Call => "call",
    MethodCall => "method-call",
    StaticCall => "static-call",
    PropertyAccess => "property-access",
    StaticProperty => "static-property",
    ClassConstFetch => "class-const-fetch",
    Index => "index",
    New => "new",
    Match => "match",
    Closure => "closure",
    ArrowFn => "arrow-fn",
    Cast => "cast",
    InstanceOf => "instanceof",
    Isset => "isset",
    Empty => "empty",
    Exit => "exit",
    Print => "print",
    Clone => "clone",
    Throw => "throw",
    Include => "include",
}

impl Serialize for NodeKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown node kind '{0}'")]
pub struct UnknownKind(pub String);

impl FromStr for NodeKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase().replace('_', "-");
        NodeKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

impl NodeKind {
    pub fn of_stmt(stmt: &Stmt) -> Self {
        match stmt {
            Stmt::Expr(_) => NodeKind::ExprStmt,
            Stmt::Echo(_) => NodeKind::Echo,
            Stmt::If { .. } => NodeKind::If,
            Stmt::Switch { .. } => NodeKind::Switch,
            Stmt::While { .. } => NodeKind::While,
            Stmt::DoWhile { .. } => NodeKind::DoWhile,
            Stmt::For { .. } => NodeKind::For,
            Stmt::Foreach { .. } => NodeKind::Foreach,
            Stmt::Try { .. } => NodeKind::Try,
            Stmt::Break(_) => NodeKind::Break,
            Stmt::Continue(_) => NodeKind::Continue,
            Stmt::Goto(_) => NodeKind::Goto,
            Stmt::Label(_) => NodeKind::Label,
            Stmt::Return(_) => NodeKind::Return,
            Stmt::Global(_) => NodeKind::Global,
            Stmt::StaticVars(_) => NodeKind::StaticVars,
            Stmt::Unset(_) => NodeKind::Unset,
            Stmt::Const(_) => NodeKind::Const,
            Stmt::Declare(_) => NodeKind::Declare,
            Stmt::Block(_) => NodeKind::Block,
            Stmt::InlineHtml(_) => NodeKind::InlineHtml,
            Stmt::Function(_) => NodeKind::Function,
            Stmt::Class(_) => NodeKind::Class,
            Stmt::Namespace { .. } => NodeKind::Namespace,
            Stmt::Use(_) => NodeKind::Use,
        }
    }

    pub fn of_member(member: &ClassMember) -> Self {
        match member {
            ClassMember::Const { .. } => NodeKind::ClassConstant,
            ClassMember::Property(_) => NodeKind::Property,
            ClassMember::Method(_) => NodeKind::Method,
        }
    }

    pub fn of_expr(expr: &Expr) -> Self {
        match expr {
            Expr::Literal(_) => NodeKind::Literal,
            Expr::Interpolated(_) => NodeKind::Interpolated,
            Expr::Variable(_) => NodeKind::Variable,
            Expr::Name(_) => NodeKind::Name,
            Expr::Array(_) => NodeKind::Array,
            Expr::Binary { .. } => NodeKind::Binary,
            Expr::Unary { .. } => NodeKind::Unary,
            Expr::IncDec { .. } => NodeKind::IncDec,
            Expr::Assign { .. } => NodeKind::Assign,
            Expr::CompoundAssign { .. } => NodeKind::CompoundAssign,
            Expr::NullCoalesce { .. } => NodeKind::NullCoalesce,
            Expr::Ternary { .. } => NodeKind::Ternary,
            Expr::Call { .. } => NodeKind::Call,
            Expr::MethodCall { .. } => NodeKind::MethodCall,
            Expr::StaticCall { .. } => NodeKind::StaticCall,
            Expr::PropertyAccess { .. } => NodeKind::PropertyAccess,
            Expr::StaticProperty { .. } => NodeKind::StaticProperty,
            Expr::ClassConst { .. } => NodeKind::ClassConstFetch,
            Expr::Index { .. } => NodeKind::Index,
            Expr::New { .. } => NodeKind::New,
            Expr::Match { .. } => NodeKind::Match,
            Expr::Closure(_) => NodeKind::Closure,
            Expr::ArrowFn { .. } => NodeKind::ArrowFn,
            Expr::Cast { .. } => NodeKind::Cast,
            Expr::InstanceOf { .. } => NodeKind::InstanceOf,
            Expr::Isset(_) => NodeKind::Isset,
            Expr::Empty(_) => NodeKind::Empty,
            Expr::Exit(_) => NodeKind::Exit,
            Expr::Print(_) => NodeKind::Print,
            Expr::Clone(_) => NodeKind::Clone,
            Expr::Throw(_) => NodeKind::Throw,
            Expr::Include { .. } => NodeKind::Include,
        }
    }
}

/// Calls `f` for every statement, member and expression node in source order.
struct KindWalker<F: FnMut(NodeKind, Span)> {
    f: F,
}

impl<F: FnMut(NodeKind, Span)> Visitor for KindWalker<F> {
    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) {
        (self.f)(NodeKind::of_stmt(&stmt.node), stmt.span);
        visit::walk_stmt(self, stmt);
    }

    fn visit_member(&mut self, member: &Spanned<ClassMember>) {
        (self.f)(NodeKind::of_member(&member.node), member.span);
        visit::walk_member(self, member);
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) {
        (self.f)(NodeKind::of_expr(&expr.node), expr.span);
        visit::walk_expr(self, expr);
    }
}

/// How many nodes of each kind `program` contains. Kinds that do not occur
/// are absent from the map.
pub fn count_kinds(program: &Program) -> BTreeMap<NodeKind, usize> {
    let mut counts = BTreeMap::new();
    KindWalker { f: |kind, _| *counts.entry(kind).or_insert(0) += 1 }.visit_program(program);
    counts
}

/// Spans of every node of `kind`, in source order.
pub fn find_kind(program: &Program, kind: NodeKind) -> Vec<Span> {
    let mut spans = Vec::new();
    KindWalker {
        f: |k, span| {
            if k == kind {
                spans.push(span);
            }
        },
    }
    .visit_program(program);
    spans
}
