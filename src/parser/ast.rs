use serde::Serialize;

use crate::span::Spanned;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    /// Whether the document started with `<?php`.
    pub open_tag: bool,
    pub stmts: Vec<Spanned<Stmt>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Block {
    pub stmts: Vec<Spanned<Stmt>>,
}

/// `Foo`, `App\Models\User`, `\Exception`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QualifiedName {
    pub parts: Vec<String>,
    pub fully_qualified: bool,
}

impl QualifiedName {
    pub fn simple(name: impl Into<String>) -> Self {
        Self { parts: vec![name.into()], fully_qualified: false }
    }

    pub fn last(&self) -> &str {
        self.parts.last().map_or("", String::as_str)
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.fully_qualified {
            f.write_str("\\")?;
        }
        f.write_str(&self.parts.join("\\"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    Expr(Spanned<Expr>),
    Echo(Vec<Spanned<Expr>>),
    If {
        condition: Spanned<Expr>,
        then_block: Spanned<Block>,
        elseif_branches: Vec<ElseIf>,
        else_block: Option<Spanned<Block>>,
    },
    Switch {
        subject: Spanned<Expr>,
        cases: Vec<SwitchCase>,
    },
    While {
        condition: Spanned<Expr>,
        body: Spanned<Block>,
    },
    DoWhile {
        body: Spanned<Block>,
        condition: Spanned<Expr>,
    },
    For {
        init: Vec<Spanned<Expr>>,
        condition: Vec<Spanned<Expr>>,
        update: Vec<Spanned<Expr>>,
        body: Spanned<Block>,
    },
    Foreach {
        collection: Spanned<Expr>,
        key: Option<Spanned<Expr>>,
        value: Spanned<Expr>,
        by_ref: bool,
        body: Spanned<Block>,
    },
    Try {
        body: Spanned<Block>,
        catches: Vec<CatchClause>,
        finally: Option<Spanned<Block>>,
    },
    Break(u32),
    Continue(u32),
    Goto(String),
    Label(String),
    Return(Option<Spanned<Expr>>),
    Global(Vec<Spanned<String>>),
    StaticVars(Vec<StaticVar>),
    Unset(Vec<Spanned<Expr>>),
    Const(Vec<ConstItem>),
    Declare(Vec<ConstItem>),
    Block(Block),
    InlineHtml(String),
    Function(FunctionDecl),
    Class(ClassDecl),
    Namespace {
        name: Option<QualifiedName>,
        /// `None` for the statement form `namespace A\B;`.
        body: Option<Block>,
    },
    Use(UseImport),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElseIf {
    pub condition: Spanned<Expr>,
    pub block: Spanned<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CaseLabel {
    Value(Spanned<Expr>),
    Default,
}

/// One or more consecutive `case`/`default` labels sharing a body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchCase {
    pub labels: Vec<CaseLabel>,
    pub body: Vec<Spanned<Stmt>>,
    /// Control reaches the next case after `body` runs.
    pub falls_through: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatchClause {
    pub types: Vec<Spanned<QualifiedName>>,
    pub var: Option<Spanned<String>>,
    pub body: Spanned<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticVar {
    pub name: Spanned<String>,
    pub default: Option<Spanned<Expr>>,
}

/// `NAME = value`, as in `const`, `declare` and class constants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstItem {
    pub name: Spanned<String>,
    pub value: Spanned<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UseKind {
    Class,
    Function,
    Const,
}

/// One imported symbol. Grouped and multi-clause `use` statements are
/// flattened into one of these per symbol; `alias` is always filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UseImport {
    pub kind: UseKind,
    pub path: QualifiedName,
    pub alias: String,
}

impl UseImport {
    pub fn has_explicit_alias(&self) -> bool {
        self.alias != self.path.last()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeNode {
    /// Class or builtin type name (`int`, `array`, `static`, `App\User`).
    Named(QualifiedName),
    Nullable(Box<TypeNode>),
    Union(Vec<TypeNode>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: Spanned<String>,
    pub ty: Option<Spanned<TypeNode>>,
    pub default: Option<Spanned<Expr>>,
    pub by_ref: bool,
    pub variadic: bool,
    /// Constructor promotion: `public readonly int $x`.
    pub promote: Option<Visibility>,
    pub readonly: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signature {
    pub name: Spanned<String>,
    pub by_ref: bool,
    pub params: Vec<Param>,
    pub return_type: Option<Spanned<TypeNode>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub sig: Signature,
    pub body: Spanned<Block>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ClassModifiers {
    pub is_abstract: bool,
    pub is_final: bool,
    pub is_readonly: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDecl {
    pub name: Spanned<String>,
    pub modifiers: ClassModifiers,
    pub extends: Option<Spanned<QualifiedName>>,
    pub implements: Vec<Spanned<QualifiedName>>,
    pub members: Vec<Spanned<ClassMember>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ClassMember {
    Const {
        visibility: Option<Visibility>,
        items: Vec<ConstItem>,
    },
    Property(PropertyDecl),
    Method(MethodDecl),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDecl {
    pub visibility: Option<Visibility>,
    pub is_static: bool,
    pub readonly: bool,
    pub ty: Option<Spanned<TypeNode>>,
    pub name: Spanned<String>,
    pub default: Option<Spanned<Expr>>,
    pub hook: Option<PropertyHook>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyHook {
    pub getter: Option<Spanned<HookBody>>,
    pub setter: Option<Spanned<SetHook>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum HookBody {
    /// `get => expr;`
    Expr(Spanned<Expr>),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetHook {
    /// Parameter name without `$`; `value` when the hook declares none.
    pub param: String,
    pub param_type: Option<Spanned<TypeNode>>,
    pub body: HookBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MethodModifiers {
    pub visibility: Option<Visibility>,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodDecl {
    pub modifiers: MethodModifiers,
    pub sig: Signature,
    /// `None` for abstract methods.
    pub body: Option<Spanned<Block>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Int(i64),
    Float(f64),
    /// Body as written between the quotes; escapes are not decoded.
    String { raw: String, quote: Quote },
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Quote {
    Single,
    Double,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InterpPart {
    Lit(String),
    Expr(Spanned<Expr>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayEntry {
    pub key: Option<Spanned<Expr>>,
    pub value: Spanned<Expr>,
    pub by_ref: bool,
    pub spread: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arg {
    /// Named argument label: `f(name: $v)`.
    pub name: Option<String>,
    pub value: Spanned<Expr>,
    pub spread: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MatchPattern {
    Values(Vec<Spanned<Expr>>),
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchArm {
    pub pattern: MatchPattern,
    pub result: Spanned<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosureUse {
    pub name: String,
    pub by_ref: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Closure {
    pub is_static: bool,
    pub by_ref: bool,
    pub params: Vec<Param>,
    pub uses: Vec<ClosureUse>,
    pub return_type: Option<Spanned<TypeNode>>,
    pub body: Spanned<Block>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Concat,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
    Xor,
    Eq,
    NotEq,
    Identical,
    NotIdentical,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Spaceship,
    /// Only appears in `??=`; a plain `??` is [`Expr::NullCoalesce`].
    Coalesce,
}

impl BinOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::Concat => ".",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Xor => "xor",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Identical => "===",
            BinOp::NotIdentical => "!==",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::LtEq => "<=",
            BinOp::GtEq => ">=",
            BinOp::Spaceship => "<=>",
            BinOp::Coalesce => "??",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
    BitNot,
    Silence,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::BitNot => "~",
            UnaryOp::Silence => "@",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IncDec {
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CastType {
    Int,
    Float,
    String,
    Bool,
    Array,
    Object,
}

impl CastType {
    pub fn as_str(self) -> &'static str {
        match self {
            CastType::Int => "int",
            CastType::Float => "float",
            CastType::String => "string",
            CastType::Bool => "bool",
            CastType::Array => "array",
            CastType::Object => "object",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IncludeKind {
    Include,
    IncludeOnce,
    Require,
    RequireOnce,
}

impl IncludeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IncludeKind::Include => "include",
            IncludeKind::IncludeOnce => "include_once",
            IncludeKind::Require => "require",
            IncludeKind::RequireOnce => "require_once",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Literal(Literal),
    /// Double-quoted string with embedded expressions.
    Interpolated(Vec<InterpPart>),
    /// Variable name without the `$`.
    Variable(String),
    /// Constant, function or class reference.
    Name(QualifiedName),
    Array(Vec<ArrayEntry>),
    Binary {
        op: BinOp,
        lhs: Box<Spanned<Expr>>,
        rhs: Box<Spanned<Expr>>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Spanned<Expr>>,
    },
    IncDec {
        op: IncDec,
        target: Box<Spanned<Expr>>,
    },
    Assign {
        target: Box<Spanned<Expr>>,
        value: Box<Spanned<Expr>>,
        by_ref: bool,
    },
    CompoundAssign {
        op: BinOp,
        target: Box<Spanned<Expr>>,
        value: Box<Spanned<Expr>>,
    },
    NullCoalesce {
        lhs: Box<Spanned<Expr>>,
        rhs: Box<Spanned<Expr>>,
    },
    /// `then_expr` is `None` for the short form `a ?: b`.
    Ternary {
        condition: Box<Spanned<Expr>>,
        then_expr: Option<Box<Spanned<Expr>>>,
        else_expr: Box<Spanned<Expr>>,
    },
    Call {
        callee: Box<Spanned<Expr>>,
        args: Vec<Arg>,
    },
    MethodCall {
        object: Box<Spanned<Expr>>,
        method: Spanned<String>,
        args: Vec<Arg>,
        nullsafe: bool,
    },
    StaticCall {
        class: Box<Spanned<Expr>>,
        method: Spanned<String>,
        args: Vec<Arg>,
    },
    PropertyAccess {
        object: Box<Spanned<Expr>>,
        property: Spanned<String>,
        nullsafe: bool,
    },
    /// `Foo::$bar`; the name is stored without `$`.
    StaticProperty {
        class: Box<Spanned<Expr>>,
        property: Spanned<String>,
    },
    /// `Foo::BAR` and `Foo::class`.
    ClassConst {
        class: Box<Spanned<Expr>>,
        name: Spanned<String>,
    },
    /// `$a[i]`; `index` is `None` for the append form `$a[]`.
    Index {
        base: Box<Spanned<Expr>>,
        index: Option<Box<Spanned<Expr>>>,
    },
    New {
        class: Box<Spanned<Expr>>,
        args: Vec<Arg>,
    },
    Match {
        subject: Box<Spanned<Expr>>,
        arms: Vec<MatchArm>,
    },
    Closure(Box<Closure>),
    ArrowFn {
        is_static: bool,
        params: Vec<Param>,
        return_type: Option<Spanned<TypeNode>>,
        body: Box<Spanned<Expr>>,
    },
    Cast {
        ty: CastType,
        expr: Box<Spanned<Expr>>,
    },
    InstanceOf {
        expr: Box<Spanned<Expr>>,
        class: Box<Spanned<Expr>>,
    },
    Isset(Vec<Spanned<Expr>>),
    Empty(Box<Spanned<Expr>>),
    Exit(Option<Box<Spanned<Expr>>>),
    Print(Box<Spanned<Expr>>),
    Clone(Box<Spanned<Expr>>),
    Throw(Box<Spanned<Expr>>),
    Include {
        kind: IncludeKind,
        path: Box<Spanned<Expr>>,
    },
}

impl Expr {
    /// Whether the expression can be assigned to.
    pub fn is_lvalue(&self) -> bool {
        matches!(
            self,
            Expr::Variable(_)
                | Expr::Index { .. }
                | Expr::PropertyAccess { nullsafe: false, .. }
                | Expr::StaticProperty { .. }
                | Expr::Array(_)
        )
    }
}

impl Stmt {
    /// Statements after which control never reaches the next switch case.
    pub fn ends_control_flow(&self) -> bool {
        match self {
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Return(_) | Stmt::Goto(_) => true,
            Stmt::Expr(e) => matches!(e.node, Expr::Throw(_) | Expr::Exit(_)),
            _ => false,
        }
    }
}
