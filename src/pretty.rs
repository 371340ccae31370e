//! Canonical printer: brace syntax only, 4-space indentation, opening
//! braces on the construct's line. Parentheses come from the same
//! precedence table the parser uses, so printed output reparses to the
//! tree it came from.

use crate::parser::ast::*;
use crate::parser::policy::{self, prec, Assoc};
use crate::span::Spanned;

/// Array literals with more entries than this go one entry per line.
const INLINE_ARRAY_MAX: usize = 3;

/// Pretty-print a `Program` AST as canonical PHP source.
pub fn pretty_print(program: &Program) -> String {
    let mut pp = PrettyPrinter::new();
    pp.emit_program(program);
    tracing::debug!(bytes = pp.buf.len(), "printed program");
    pp.buf
}

/// Print a single expression, as it would appear in statement position.
pub fn print_expr(expr: &Spanned<Expr>) -> String {
    let mut pp = PrettyPrinter::new();
    pp.emit_expr(expr, 0);
    pp.buf
}

/// Print a single statement at indentation zero.
pub fn print_stmt(stmt: &Spanned<Stmt>) -> String {
    let mut pp = PrettyPrinter::new();
    pp.emit_stmt(stmt, 0, false);
    pp.buf
}

/// Only the output buffer is shared between calls; indentation is passed
/// down explicitly.
struct PrettyPrinter {
    buf: String,
}

/// Binding power of `expr` as printed.
fn expr_prec(expr: &Expr) -> u8 {
    match expr {
        Expr::Binary { op, .. } => policy::binop_prec(*op).0,
        Expr::NullCoalesce { .. } => prec::COALESCE,
        Expr::Ternary { .. } => prec::TERNARY,
        Expr::Assign { .. }
        | Expr::CompoundAssign { .. }
        | Expr::Print(_)
        | Expr::Throw(_)
        | Expr::Include { .. }
        | Expr::ArrowFn { .. } => prec::ASSIGN,
        Expr::InstanceOf { .. } => prec::INSTANCEOF,
        Expr::Unary { op: UnaryOp::Not, .. } => prec::NOT,
        Expr::Unary { .. } | Expr::Cast { .. } | Expr::IncDec { .. } => prec::UNARY,
        Expr::New { .. } | Expr::Clone(_) | Expr::Closure(_) => prec::NEW,
        _ => prec::PRIMARY,
    }
}

/// Whether a statement gets blank lines around it.
fn is_declaration(stmt: &Stmt) -> bool {
    matches!(stmt, Stmt::Function(_) | Stmt::Class(_) | Stmt::Namespace { .. })
}

fn is_spaced_member(member: &ClassMember) -> bool {
    match member {
        ClassMember::Method(_) => true,
        ClassMember::Property(prop) => prop.hook.is_some(),
        ClassMember::Const { .. } => false,
    }
}

fn type_to_string(ty: &TypeNode) -> String {
    match ty {
        TypeNode::Named(name) => name.to_string(),
        TypeNode::Nullable(inner) => format!("?{}", type_to_string(inner)),
        TypeNode::Union(alternatives) => alternatives.iter().map(type_to_string).collect::<Vec<_>>().join("|"),
    }
}

fn float_to_string(v: f64) -> String {
    if v.is_infinite() {
        return "1e1000".to_string();
    }
    // Debug keeps a fractional part or exponent, so the literal stays a float.
    format!("{v:?}")
}

/// Whether a literal following `$name` in a string would extend the
/// variable reference.
fn continues_variable(next: Option<&InterpPart>) -> bool {
    let Some(InterpPart::Lit(text)) = next else { return false };
    text.starts_with('[')
        || text.starts_with("->")
        || text.chars().next().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii())
}

/// Whether a literal before `$name` would turn it into the start of `{$...}`.
fn opens_brace(prev: Option<&InterpPart>) -> bool {
    matches!(prev, Some(InterpPart::Lit(text)) if text.ends_with('{'))
}

impl PrettyPrinter {
    fn new() -> Self {
        Self { buf: String::new() }
    }

    fn write(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    fn newline(&mut self) {
        self.buf.push('\n');
    }

    fn write_indent(&mut self, indent: usize) {
        for _ in 0..indent {
            self.buf.push_str("    ");
        }
    }

    // ── Program ──────────────────────────────────────────────────────

    fn emit_program(&mut self, program: &Program) {
        if program.open_tag {
            self.write("<?php\n");
            if !program.stmts.is_empty() {
                self.newline();
            }
        }
        self.emit_stmts(&program.stmts, 0, true);
    }

    /// `top_level` marks the document's own statement list, where trailing
    /// inline HTML ends the output.
    fn emit_stmts(&mut self, stmts: &[Spanned<Stmt>], indent: usize, top_level: bool) {
        for (i, stmt) in stmts.iter().enumerate() {
            if i > 0 {
                let prev = &stmts[i - 1].node;
                let leaving_imports = matches!(prev, Stmt::Use(_)) && !matches!(stmt.node, Stmt::Use(_));
                if is_declaration(prev) || is_declaration(&stmt.node) || leaving_imports {
                    self.newline();
                }
            }
            let last = top_level && i + 1 == stmts.len();
            self.emit_stmt(stmt, indent, last);
        }
    }

    /// `{`, the statements one level deeper, then `}` at `indent`. No
    /// trailing newline.
    fn emit_block(&mut self, block: &Block, indent: usize) {
        self.write("{\n");
        self.emit_stmts(&block.stmts, indent + 1, false);
        self.write_indent(indent);
        self.write("}");
    }

    // ── Statements ───────────────────────────────────────────────────

    fn emit_stmt(&mut self, stmt: &Spanned<Stmt>, indent: usize, last_in_document: bool) {
        crate::stack::ensure(|| self.emit_stmt_node(stmt, indent, last_in_document))
    }

    fn emit_stmt_node(&mut self, stmt: &Spanned<Stmt>, indent: usize, last_in_document: bool) {
        self.write_indent(indent);
        match &stmt.node {
            Stmt::Expr(expr) => {
                self.emit_expr(expr, indent);
                self.write(";");
            }
            Stmt::Echo(exprs) => {
                self.write("echo ");
                self.emit_expr_list(exprs, indent);
                self.write(";");
            }
            Stmt::If { condition, then_block, elseif_branches, else_block } => {
                self.write("if (");
                self.emit_expr(condition, indent);
                self.write(") ");
                self.emit_block(&then_block.node, indent);
                for branch in elseif_branches {
                    self.write(" elseif (");
                    self.emit_expr(&branch.condition, indent);
                    self.write(") ");
                    self.emit_block(&branch.block.node, indent);
                }
                if let Some(block) = else_block {
                    self.write(" else ");
                    self.emit_block(&block.node, indent);
                }
            }
            Stmt::Switch { subject, cases } => {
                self.write("switch (");
                self.emit_expr(subject, indent);
                self.write(") {\n");
                for case in cases {
                    for label in &case.labels {
                        self.write_indent(indent + 1);
                        match label {
                            CaseLabel::Value(value) => {
                                self.write("case ");
                                self.emit_expr(value, indent + 1);
                                self.write(":\n");
                            }
                            CaseLabel::Default => self.write("default:\n"),
                        }
                    }
                    self.emit_stmts(&case.body, indent + 2, false);
                }
                self.write_indent(indent);
                self.write("}");
            }
            Stmt::While { condition, body } => {
                self.write("while (");
                self.emit_expr(condition, indent);
                self.write(") ");
                self.emit_block(&body.node, indent);
            }
            Stmt::DoWhile { body, condition } => {
                self.write("do ");
                self.emit_block(&body.node, indent);
                self.write(" while (");
                self.emit_expr(condition, indent);
                self.write(");");
            }
            Stmt::For { init, condition, update, body } => {
                self.write("for (");
                self.emit_expr_list(init, indent);
                for section in [condition, update] {
                    self.write(";");
                    if !section.is_empty() {
                        self.write(" ");
                        self.emit_expr_list(section, indent);
                    }
                }
                self.write(") ");
                self.emit_block(&body.node, indent);
            }
            Stmt::Foreach { collection, key, value, by_ref, body } => {
                self.write("foreach (");
                self.emit_expr(collection, indent);
                self.write(" as ");
                if let Some(key) = key {
                    self.emit_expr(key, indent);
                    self.write(" => ");
                }
                if *by_ref {
                    self.write("&");
                }
                self.emit_expr(value, indent);
                self.write(") ");
                self.emit_block(&body.node, indent);
            }
            Stmt::Try { body, catches, finally } => {
                self.write("try ");
                self.emit_block(&body.node, indent);
                for catch in catches {
                    self.write(" catch (");
                    let types: Vec<String> = catch.types.iter().map(|t| t.node.to_string()).collect();
                    self.write(&types.join(" | "));
                    if let Some(var) = &catch.var {
                        self.write(" $");
                        self.write(&var.node);
                    }
                    self.write(") ");
                    self.emit_block(&catch.body.node, indent);
                }
                if let Some(block) = finally {
                    self.write(" finally ");
                    self.emit_block(&block.node, indent);
                }
            }
            Stmt::Break(level) => self.emit_jump("break", *level),
            Stmt::Continue(level) => self.emit_jump("continue", *level),
            Stmt::Goto(label) => {
                self.write("goto ");
                self.write(label);
                self.write(";");
            }
            Stmt::Label(name) => {
                self.write(name);
                self.write(":");
            }
            Stmt::Return(value) => {
                self.write("return");
                if let Some(value) = value {
                    self.write(" ");
                    self.emit_expr(value, indent);
                }
                self.write(";");
            }
            Stmt::Global(names) => {
                self.write("global ");
                let names: Vec<String> = names.iter().map(|n| format!("${}", n.node)).collect();
                self.write(&names.join(", "));
                self.write(";");
            }
            Stmt::StaticVars(vars) => {
                self.write("static ");
                for (i, var) in vars.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.write("$");
                    self.write(&var.name.node);
                    if let Some(default) = &var.default {
                        self.write(" = ");
                        self.emit_expr(default, indent);
                    }
                }
                self.write(";");
            }
            Stmt::Unset(exprs) => {
                self.write("unset(");
                self.emit_expr_list(exprs, indent);
                self.write(");");
            }
            Stmt::Const(items) => {
                self.write("const ");
                self.emit_const_items(items, indent);
                self.write(";");
            }
            Stmt::Declare(items) => {
                self.write("declare(");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.write(&item.name.node);
                    self.write("=");
                    self.emit_expr(&item.value, indent);
                }
                self.write(");");
            }
            Stmt::Block(block) => self.emit_block(block, indent),
            Stmt::InlineHtml(text) => {
                self.write("?>\n");
                self.write(text);
                if last_in_document {
                    return;
                }
                self.write("<?php");
            }
            Stmt::Function(func) => {
                self.write("function ");
                self.emit_signature(&func.sig, indent);
                self.write(" ");
                self.emit_block(&func.body.node, indent);
            }
            Stmt::Class(class) => self.emit_class(class, indent),
            Stmt::Namespace { name, body } => {
                self.write("namespace");
                if let Some(name) = name {
                    self.write(" ");
                    self.write(&name.to_string());
                }
                match body {
                    Some(block) => {
                        self.write(" ");
                        self.emit_block(block, indent);
                    }
                    None => self.write(";"),
                }
            }
            Stmt::Use(import) => {
                self.write("use ");
                match import.kind {
                    UseKind::Class => {}
                    UseKind::Function => self.write("function "),
                    UseKind::Const => self.write("const "),
                }
                self.write(&import.path.to_string());
                if import.has_explicit_alias() {
                    self.write(" as ");
                    self.write(&import.alias);
                }
                self.write(";");
            }
        }
        self.newline();
    }

    fn emit_jump(&mut self, keyword: &str, level: u32) {
        self.write(keyword);
        if level != 1 {
            self.write(&format!(" {level}"));
        }
        self.write(";");
    }

    fn emit_const_items(&mut self, items: &[ConstItem], indent: usize) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(&item.name.node);
            self.write(" = ");
            self.emit_expr(&item.value, indent);
        }
    }

    // ── Declarations ─────────────────────────────────────────────────

    /// `[&]name(params)[: type]`
    fn emit_signature(&mut self, sig: &Signature, indent: usize) {
        if sig.by_ref {
            self.write("&");
        }
        self.write(&sig.name.node);
        self.emit_params(&sig.params, indent);
        self.emit_return_type(sig.return_type.as_ref());
    }

    fn emit_params(&mut self, params: &[Param], indent: usize) {
        self.write("(");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            if let Some(vis) = param.promote {
                self.write(vis.as_str());
                self.write(" ");
            }
            if param.readonly {
                self.write("readonly ");
            }
            if let Some(ty) = &param.ty {
                self.write(&type_to_string(&ty.node));
                self.write(" ");
            }
            if param.by_ref {
                self.write("&");
            }
            if param.variadic {
                self.write("...");
            }
            self.write("$");
            self.write(&param.name.node);
            if let Some(default) = &param.default {
                self.write(" = ");
                self.emit_expr(default, indent);
            }
        }
        self.write(")");
    }

    fn emit_return_type(&mut self, ty: Option<&Spanned<TypeNode>>) {
        if let Some(ty) = ty {
            self.write(": ");
            self.write(&type_to_string(&ty.node));
        }
    }

    fn emit_class(&mut self, class: &ClassDecl, indent: usize) {
        if class.modifiers.is_abstract {
            self.write("abstract ");
        }
        if class.modifiers.is_final {
            self.write("final ");
        }
        if class.modifiers.is_readonly {
            self.write("readonly ");
        }
        self.write("class ");
        self.write(&class.name.node);
        if let Some(parent) = &class.extends {
            self.write(" extends ");
            self.write(&parent.node.to_string());
        }
        if !class.implements.is_empty() {
            let names: Vec<String> = class.implements.iter().map(|n| n.node.to_string()).collect();
            self.write(" implements ");
            self.write(&names.join(", "));
        }
        self.write(" {\n");
        for (i, member) in class.members.iter().enumerate() {
            if i > 0 && (is_spaced_member(&class.members[i - 1].node) || is_spaced_member(&member.node)) {
                self.newline();
            }
            self.write_indent(indent + 1);
            self.emit_member(&member.node, indent + 1);
            self.newline();
        }
        self.write_indent(indent);
        self.write("}");
    }

    fn emit_member(&mut self, member: &ClassMember, indent: usize) {
        match member {
            ClassMember::Const { visibility, items } => {
                if let Some(vis) = visibility {
                    self.write(vis.as_str());
                    self.write(" ");
                }
                self.write("const ");
                self.emit_const_items(items, indent);
                self.write(";");
            }
            ClassMember::Property(prop) => self.emit_property(prop, indent),
            ClassMember::Method(method) => {
                let mods = &method.modifiers;
                if mods.is_abstract {
                    self.write("abstract ");
                }
                if mods.is_final {
                    self.write("final ");
                }
                if let Some(vis) = mods.visibility {
                    self.write(vis.as_str());
                    self.write(" ");
                }
                if mods.is_static {
                    self.write("static ");
                }
                self.write("function ");
                self.emit_signature(&method.sig, indent);
                match &method.body {
                    Some(body) => {
                        self.write(" ");
                        self.emit_block(&body.node, indent);
                    }
                    None => self.write(";"),
                }
            }
        }
    }

    fn emit_property(&mut self, prop: &PropertyDecl, indent: usize) {
        let mut mods = Vec::new();
        if let Some(vis) = prop.visibility {
            mods.push(vis.as_str());
        }
        if prop.is_static {
            mods.push("static");
        }
        if prop.readonly {
            mods.push("readonly");
        }
        for m in mods {
            self.write(m);
            self.write(" ");
        }
        if let Some(ty) = &prop.ty {
            self.write(&type_to_string(&ty.node));
            self.write(" ");
        }
        self.write("$");
        self.write(&prop.name.node);
        if let Some(default) = &prop.default {
            self.write(" = ");
            self.emit_expr(default, indent);
        }
        let Some(hook) = &prop.hook else {
            self.write(";");
            return;
        };

        self.write(" {\n");
        if let Some(getter) = &hook.getter {
            self.write_indent(indent + 1);
            self.write("get");
            self.emit_hook_body(&getter.node, indent + 1);
            self.newline();
        }
        if let Some(setter) = &hook.setter {
            let set = &setter.node;
            self.write_indent(indent + 1);
            self.write("set");
            if set.param != "value" || set.param_type.is_some() {
                self.write("(");
                if let Some(ty) = &set.param_type {
                    self.write(&type_to_string(&ty.node));
                    self.write(" ");
                }
                self.write("$");
                self.write(&set.param);
                self.write(")");
            }
            self.emit_hook_body(&set.body, indent + 1);
            self.newline();
        }
        self.write_indent(indent);
        self.write("}");
    }

    fn emit_hook_body(&mut self, body: &HookBody, indent: usize) {
        match body {
            HookBody::Expr(expr) => {
                self.write(" => ");
                self.emit_expr(expr, indent);
                self.write(";");
            }
            HookBody::Block(block) => {
                self.write(" ");
                self.emit_block(block, indent);
            }
        }
    }

    // ── Expressions ──────────────────────────────────────────────────

    fn emit_expr_list(&mut self, exprs: &[Spanned<Expr>], indent: usize) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_expr(expr, indent);
        }
    }

    /// `expr`, parenthesized when `parens` is set.
    fn emit_wrapped(&mut self, expr: &Spanned<Expr>, indent: usize, parens: bool) {
        if parens {
            self.write("(");
        }
        self.emit_expr(expr, indent);
        if parens {
            self.write(")");
        }
    }

    /// Operand that the parser reads at binding power `min`.
    fn emit_operand(&mut self, expr: &Spanned<Expr>, indent: usize, min: u8) {
        self.emit_wrapped(expr, indent, expr_prec(&expr.node) < min);
    }

    /// Base of a member access, call or index.
    fn emit_target(&mut self, expr: &Spanned<Expr>, indent: usize) {
        self.emit_operand(expr, indent, prec::PRIMARY);
    }

    /// Class operand of `new` and `instanceof`: a name or variable as is,
    /// anything else in parentheses.
    fn emit_class_ref(&mut self, expr: &Spanned<Expr>, indent: usize) {
        let bare = matches!(expr.node, Expr::Name(_) | Expr::Variable(_));
        self.emit_wrapped(expr, indent, !bare);
    }

    fn emit_args(&mut self, args: &[Arg], indent: usize) {
        self.write("(");
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            if let Some(name) = &arg.name {
                self.write(name);
                self.write(": ");
            }
            if arg.spread {
                self.write("...");
            }
            self.emit_expr(&arg.value, indent);
        }
        self.write(")");
    }

    fn emit_binary(&mut self, op: &str, p: u8, assoc: Assoc, lhs: &Spanned<Expr>, rhs: &Spanned<Expr>, indent: usize) {
        let lhs_prec = expr_prec(&lhs.node);
        let rhs_prec = expr_prec(&rhs.node);
        let lhs_parens = lhs_prec < p || (lhs_prec == p && assoc != Assoc::Left);
        let rhs_parens = rhs_prec < p || (rhs_prec == p && assoc != Assoc::Right);
        self.emit_wrapped(lhs, indent, lhs_parens);
        self.write(" ");
        self.write(op);
        self.write(" ");
        self.emit_wrapped(rhs, indent, rhs_parens);
    }

    fn emit_expr(&mut self, expr: &Spanned<Expr>, indent: usize) {
        crate::stack::ensure(|| self.emit_expr_node(expr, indent))
    }

    fn emit_expr_node(&mut self, expr: &Spanned<Expr>, indent: usize) {
        match &expr.node {
            Expr::Literal(lit) => self.emit_literal(lit),
            Expr::Interpolated(parts) => {
                self.write("\"");
                for (i, part) in parts.iter().enumerate() {
                    match part {
                        InterpPart::Lit(text) => self.write(text),
                        InterpPart::Expr(e) => match &e.node {
                            Expr::Variable(name)
                                if !continues_variable(parts.get(i + 1))
                                    && !opens_brace(i.checked_sub(1).and_then(|p| parts.get(p))) =>
                            {
                                self.write("$");
                                self.write(name);
                            }
                            _ => {
                                self.write("{");
                                self.emit_expr(e, indent);
                                self.write("}");
                            }
                        },
                    }
                }
                self.write("\"");
            }
            Expr::Variable(name) => {
                self.write("$");
                self.write(name);
            }
            Expr::Name(name) => self.write(&name.to_string()),
            Expr::Array(entries) => self.emit_array(entries, indent),
            Expr::Binary { op, lhs, rhs } => {
                let (p, assoc) = policy::binop_prec(*op);
                self.emit_binary(op.as_str(), p, assoc, lhs, rhs, indent);
            }
            Expr::NullCoalesce { lhs, rhs } => {
                self.emit_binary("??", prec::COALESCE, Assoc::Right, lhs, rhs, indent);
            }
            Expr::Unary { op, operand } => {
                self.write(op.as_str());
                let sign_clash = matches!(op, UnaryOp::Neg | UnaryOp::Plus)
                    && matches!(
                        operand.node,
                        Expr::Unary { op: UnaryOp::Neg | UnaryOp::Plus, .. }
                            | Expr::IncDec { op: IncDec::PreInc | IncDec::PreDec, .. }
                    );
                let min = if *op == UnaryOp::Not { prec::NOT } else { prec::UNARY };
                self.emit_wrapped(operand, indent, sign_clash || expr_prec(&operand.node) < min);
            }
            Expr::IncDec { op, target } => match op {
                IncDec::PreInc | IncDec::PreDec => {
                    self.write(if *op == IncDec::PreInc { "++" } else { "--" });
                    self.emit_target(target, indent);
                }
                IncDec::PostInc | IncDec::PostDec => {
                    self.emit_target(target, indent);
                    self.write(if *op == IncDec::PostInc { "++" } else { "--" });
                }
            },
            Expr::Assign { target, value, by_ref } => {
                self.emit_target(target, indent);
                self.write(if *by_ref { " = &" } else { " = " });
                self.emit_operand(value, indent, prec::ASSIGN);
            }
            Expr::CompoundAssign { op, target, value } => {
                self.emit_target(target, indent);
                self.write(" ");
                self.write(op.as_str());
                self.write("= ");
                self.emit_operand(value, indent, prec::ASSIGN);
            }
            Expr::Ternary { condition, then_expr, else_expr } => {
                self.emit_wrapped(condition, indent, expr_prec(&condition.node) <= prec::TERNARY);
                match then_expr {
                    Some(then_expr) => {
                        self.write(" ? ");
                        self.emit_wrapped(then_expr, indent, matches!(then_expr.node, Expr::Ternary { .. }));
                        self.write(" : ");
                    }
                    None => self.write(" ?: "),
                }
                self.emit_operand(else_expr, indent, prec::TERNARY);
            }
            Expr::Call { callee, args } => {
                self.emit_target(callee, indent);
                self.emit_args(args, indent);
            }
            Expr::MethodCall { object, method, args, nullsafe } => {
                self.emit_target(object, indent);
                self.write(if *nullsafe { "?->" } else { "->" });
                self.write(&method.node);
                self.emit_args(args, indent);
            }
            Expr::StaticCall { class, method, args } => {
                self.emit_target(class, indent);
                self.write("::");
                self.write(&method.node);
                self.emit_args(args, indent);
            }
            Expr::PropertyAccess { object, property, nullsafe } => {
                self.emit_target(object, indent);
                self.write(if *nullsafe { "?->" } else { "->" });
                self.write(&property.node);
            }
            Expr::StaticProperty { class, property } => {
                self.emit_target(class, indent);
                self.write("::$");
                self.write(&property.node);
            }
            Expr::ClassConst { class, name } => {
                self.emit_target(class, indent);
                self.write("::");
                self.write(&name.node);
            }
            Expr::Index { base, index } => {
                self.emit_target(base, indent);
                self.write("[");
                if let Some(index) = index {
                    self.emit_expr(index, indent);
                }
                self.write("]");
            }
            Expr::New { class, args } => {
                self.write("new ");
                self.emit_class_ref(class, indent);
                self.emit_args(args, indent);
            }
            Expr::Match { subject, arms } => {
                self.write("match (");
                self.emit_expr(subject, indent);
                self.write(") {\n");
                for arm in arms {
                    self.write_indent(indent + 1);
                    match &arm.pattern {
                        MatchPattern::Values(values) => self.emit_expr_list(values, indent + 1),
                        MatchPattern::Default => self.write("default"),
                    }
                    self.write(" => ");
                    self.emit_expr(&arm.result, indent + 1);
                    self.write(",\n");
                }
                self.write_indent(indent);
                self.write("}");
            }
            Expr::Closure(closure) => {
                if closure.is_static {
                    self.write("static ");
                }
                self.write("function ");
                if closure.by_ref {
                    self.write("&");
                }
                self.emit_params(&closure.params, indent);
                if !closure.uses.is_empty() {
                    let uses: Vec<String> = closure
                        .uses
                        .iter()
                        .map(|u| format!("{}${}", if u.by_ref { "&" } else { "" }, u.name))
                        .collect();
                    self.write(" use (");
                    self.write(&uses.join(", "));
                    self.write(")");
                }
                self.emit_return_type(closure.return_type.as_ref());
                self.write(" ");
                self.emit_block(&closure.body.node, indent);
            }
            Expr::ArrowFn { is_static, params, return_type, body } => {
                if *is_static {
                    self.write("static ");
                }
                self.write("fn");
                self.emit_params(params, indent);
                self.emit_return_type(return_type.as_ref());
                self.write(" => ");
                self.emit_operand(body, indent, prec::ASSIGN);
            }
            Expr::Cast { ty, expr: inner } => {
                self.write("(");
                self.write(ty.as_str());
                self.write(") ");
                self.emit_operand(inner, indent, prec::UNARY);
            }
            Expr::InstanceOf { expr: inner, class } => {
                self.emit_wrapped(inner, indent, expr_prec(&inner.node) <= prec::INSTANCEOF);
                self.write(" instanceof ");
                self.emit_class_ref(class, indent);
            }
            Expr::Isset(exprs) => {
                self.write("isset(");
                self.emit_expr_list(exprs, indent);
                self.write(")");
            }
            Expr::Empty(inner) => {
                self.write("empty(");
                self.emit_expr(inner, indent);
                self.write(")");
            }
            Expr::Exit(code) => {
                self.write("exit");
                if let Some(code) = code {
                    self.write("(");
                    self.emit_expr(code, indent);
                    self.write(")");
                }
            }
            Expr::Print(inner) => {
                self.write("print ");
                self.emit_operand(inner, indent, prec::ASSIGN);
            }
            Expr::Clone(inner) => {
                self.write("clone ");
                self.emit_operand(inner, indent, prec::PRIMARY);
            }
            Expr::Throw(inner) => {
                self.write("throw ");
                self.emit_operand(inner, indent, prec::ASSIGN);
            }
            Expr::Include { kind, path } => {
                self.write(kind.as_str());
                self.write(" ");
                self.emit_operand(path, indent, prec::ASSIGN);
            }
        }
    }

    fn emit_literal(&mut self, lit: &Literal) {
        match lit {
            Literal::Int(v) => self.write(&v.to_string()),
            Literal::Float(v) => self.write(&float_to_string(*v)),
            Literal::String { raw, quote: Quote::Single } => {
                self.write("'");
                self.write(raw);
                self.write("'");
            }
            Literal::String { raw, quote: Quote::Double } => {
                self.write("\"");
                self.write(raw);
                self.write("\"");
            }
            Literal::Bool(true) => self.write("true"),
            Literal::Bool(false) => self.write("false"),
            Literal::Null => self.write("null"),
        }
    }

    fn emit_array_entry(&mut self, entry: &ArrayEntry, indent: usize) {
        if entry.spread {
            self.write("...");
        }
        if let Some(key) = &entry.key {
            self.emit_expr(key, indent);
            self.write(" => ");
        }
        if entry.by_ref {
            self.write("&");
        }
        self.emit_expr(&entry.value, indent);
    }

    fn emit_array(&mut self, entries: &[ArrayEntry], indent: usize) {
        if entries.len() <= INLINE_ARRAY_MAX {
            self.write("[");
            for (i, entry) in entries.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.emit_array_entry(entry, indent);
            }
            self.write("]");
            return;
        }
        self.write("[\n");
        for entry in entries {
            self.write_indent(indent + 1);
            self.emit_array_entry(entry, indent + 1);
            self.write(",\n");
        }
        self.write_indent(indent);
        self.write("]");
    }
}
