//! Read-only AST traversal.
//!
//! Implement [`Visitor`] for a pass, overriding only the methods for the
//! nodes it cares about, and call the matching `walk_*` function inside an
//! override to continue into the children. Omitting the walk call prunes the
//! traversal at that node.
//!
//! ```
//! use phpcanon::parser::ast::Expr;
//! use phpcanon::span::Spanned;
//! use phpcanon::visit::{walk_expr, Visitor};
//!
//! #[derive(Default)]
//! struct Variables(Vec<String>);
//!
//! impl Visitor for Variables {
//!     fn visit_expr(&mut self, expr: &Spanned<Expr>) {
//!         if let Expr::Variable(name) = &expr.node {
//!             self.0.push(name.clone());
//!         }
//!         walk_expr(self, expr);
//!     }
//! }
//!
//! let program = phpcanon::parse("<?php $a = $b + 1;").unwrap();
//! let mut vars = Variables::default();
//! vars.visit_program(&program);
//! assert_eq!(vars.0, ["a", "b"]);
//! ```

use crate::parser::ast::*;
use crate::span::Spanned;

/// Default implementations recurse into all children in source order.
pub trait Visitor: Sized {
    fn visit_program(&mut self, program: &Program) {
        walk_program(self, program);
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) {
        walk_expr(self, expr);
    }

    // Function-like bodies: each starts a fresh label and loop scope.
    fn visit_function(&mut self, func: &FunctionDecl) {
        walk_function(self, func);
    }

    fn visit_method(&mut self, method: &MethodDecl) {
        walk_method(self, method);
    }

    fn visit_closure(&mut self, closure: &Closure) {
        walk_closure(self, closure);
    }

    fn visit_hook_body(&mut self, body: &HookBody) {
        walk_hook_body(self, body);
    }

    fn visit_class(&mut self, class: &ClassDecl) {
        walk_class(self, class);
    }

    fn visit_member(&mut self, member: &Spanned<ClassMember>) {
        walk_member(self, member);
    }

    fn visit_param(&mut self, param: &Param) {
        walk_param(self, param);
    }

    fn visit_type(&mut self, _ty: &Spanned<TypeNode>) {}
}

pub fn walk_program<V: Visitor>(v: &mut V, program: &Program) {
    for stmt in &program.stmts {
        v.visit_stmt(stmt);
    }
}

pub fn walk_block<V: Visitor>(v: &mut V, block: &Block) {
    for stmt in &block.stmts {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: Visitor>(v: &mut V, stmt: &Spanned<Stmt>) {
    crate::stack::ensure(|| walk_stmt_node(v, stmt))
}

fn walk_stmt_node<V: Visitor>(v: &mut V, stmt: &Spanned<Stmt>) {
    match &stmt.node {
        Stmt::Expr(expr) => v.visit_expr(expr),
        Stmt::Echo(exprs) | Stmt::Unset(exprs) => {
            for expr in exprs {
                v.visit_expr(expr);
            }
        }
        Stmt::If { condition, then_block, elseif_branches, else_block } => {
            v.visit_expr(condition);
            v.visit_block(&then_block.node);
            for branch in elseif_branches {
                v.visit_expr(&branch.condition);
                v.visit_block(&branch.block.node);
            }
            if let Some(block) = else_block {
                v.visit_block(&block.node);
            }
        }
        Stmt::Switch { subject, cases } => {
            v.visit_expr(subject);
            for case in cases {
                for label in &case.labels {
                    if let CaseLabel::Value(expr) = label {
                        v.visit_expr(expr);
                    }
                }
                for stmt in &case.body {
                    v.visit_stmt(stmt);
                }
            }
        }
        Stmt::While { condition, body } => {
            v.visit_expr(condition);
            v.visit_block(&body.node);
        }
        Stmt::DoWhile { body, condition } => {
            v.visit_block(&body.node);
            v.visit_expr(condition);
        }
        Stmt::For { init, condition, update, body } => {
            for expr in init.iter().chain(condition).chain(update) {
                v.visit_expr(expr);
            }
            v.visit_block(&body.node);
        }
        Stmt::Foreach { collection, key, value, body, .. } => {
            v.visit_expr(collection);
            if let Some(key) = key {
                v.visit_expr(key);
            }
            v.visit_expr(value);
            v.visit_block(&body.node);
        }
        Stmt::Try { body, catches, finally } => {
            v.visit_block(&body.node);
            for catch in catches {
                v.visit_block(&catch.body.node);
            }
            if let Some(block) = finally {
                v.visit_block(&block.node);
            }
        }
        Stmt::Return(value) => {
            if let Some(expr) = value {
                v.visit_expr(expr);
            }
        }
        Stmt::StaticVars(vars) => {
            for var in vars {
                if let Some(default) = &var.default {
                    v.visit_expr(default);
                }
            }
        }
        Stmt::Const(items) | Stmt::Declare(items) => {
            for item in items {
                v.visit_expr(&item.value);
            }
        }
        Stmt::Block(block) => v.visit_block(block),
        Stmt::Function(func) => v.visit_function(func),
        Stmt::Class(class) => v.visit_class(class),
        Stmt::Namespace { body, .. } => {
            if let Some(block) = body {
                v.visit_block(block);
            }
        }
        Stmt::Break(_)
        | Stmt::Continue(_)
        | Stmt::Goto(_)
        | Stmt::Label(_)
        | Stmt::Global(_)
        | Stmt::InlineHtml(_)
        | Stmt::Use(_) => {}
    }
}

fn walk_args<V: Visitor>(v: &mut V, args: &[Arg]) {
    for arg in args {
        v.visit_expr(&arg.value);
    }
}

pub fn walk_expr<V: Visitor>(v: &mut V, expr: &Spanned<Expr>) {
    crate::stack::ensure(|| walk_expr_node(v, expr))
}

fn walk_expr_node<V: Visitor>(v: &mut V, expr: &Spanned<Expr>) {
    match &expr.node {
        Expr::Literal(_) | Expr::Variable(_) | Expr::Name(_) => {}
        Expr::Interpolated(parts) => {
            for part in parts {
                if let InterpPart::Expr(e) = part {
                    v.visit_expr(e);
                }
            }
        }
        Expr::Array(entries) => {
            for entry in entries {
                if let Some(key) = &entry.key {
                    v.visit_expr(key);
                }
                v.visit_expr(&entry.value);
            }
        }
        Expr::Binary { lhs, rhs, .. } | Expr::NullCoalesce { lhs, rhs } => {
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        Expr::Assign { target, value, .. } | Expr::CompoundAssign { target, value, .. } => {
            v.visit_expr(target);
            v.visit_expr(value);
        }
        Expr::Unary { operand: inner, .. }
        | Expr::IncDec { target: inner, .. }
        | Expr::Cast { expr: inner, .. }
        | Expr::Empty(inner)
        | Expr::Print(inner)
        | Expr::Clone(inner)
        | Expr::Throw(inner)
        | Expr::Include { path: inner, .. }
        | Expr::PropertyAccess { object: inner, .. }
        | Expr::StaticProperty { class: inner, .. }
        | Expr::ClassConst { class: inner, .. } => v.visit_expr(inner),
        Expr::Ternary { condition, then_expr, else_expr } => {
            v.visit_expr(condition);
            if let Some(then_expr) = then_expr {
                v.visit_expr(then_expr);
            }
            v.visit_expr(else_expr);
        }
        Expr::Call { callee, args } => {
            v.visit_expr(callee);
            walk_args(v, args);
        }
        Expr::MethodCall { object, args, .. } => {
            v.visit_expr(object);
            walk_args(v, args);
        }
        Expr::StaticCall { class, args, .. } | Expr::New { class, args } => {
            v.visit_expr(class);
            walk_args(v, args);
        }
        Expr::Index { base, index } => {
            v.visit_expr(base);
            if let Some(index) = index {
                v.visit_expr(index);
            }
        }
        Expr::Match { subject, arms } => {
            v.visit_expr(subject);
            for arm in arms {
                if let MatchPattern::Values(values) = &arm.pattern {
                    for value in values {
                        v.visit_expr(value);
                    }
                }
                v.visit_expr(&arm.result);
            }
        }
        Expr::Closure(closure) => v.visit_closure(closure),
        Expr::ArrowFn { params, return_type, body, .. } => {
            for param in params {
                v.visit_param(param);
            }
            if let Some(ty) = return_type {
                v.visit_type(ty);
            }
            v.visit_expr(body);
        }
        Expr::InstanceOf { expr, class } => {
            v.visit_expr(expr);
            v.visit_expr(class);
        }
        Expr::Isset(exprs) => {
            for e in exprs {
                v.visit_expr(e);
            }
        }
        Expr::Exit(code) => {
            if let Some(code) = code {
                v.visit_expr(code);
            }
        }
    }
}

fn walk_signature<V: Visitor>(v: &mut V, sig: &Signature) {
    for param in &sig.params {
        v.visit_param(param);
    }
    if let Some(ty) = &sig.return_type {
        v.visit_type(ty);
    }
}

pub fn walk_function<V: Visitor>(v: &mut V, func: &FunctionDecl) {
    walk_signature(v, &func.sig);
    v.visit_block(&func.body.node);
}

pub fn walk_method<V: Visitor>(v: &mut V, method: &MethodDecl) {
    walk_signature(v, &method.sig);
    if let Some(body) = &method.body {
        v.visit_block(&body.node);
    }
}

pub fn walk_closure<V: Visitor>(v: &mut V, closure: &Closure) {
    for param in &closure.params {
        v.visit_param(param);
    }
    if let Some(ty) = &closure.return_type {
        v.visit_type(ty);
    }
    v.visit_block(&closure.body.node);
}

pub fn walk_hook_body<V: Visitor>(v: &mut V, body: &HookBody) {
    match body {
        HookBody::Expr(expr) => v.visit_expr(expr),
        HookBody::Block(block) => v.visit_block(block),
    }
}

pub fn walk_class<V: Visitor>(v: &mut V, class: &ClassDecl) {
    for member in &class.members {
        v.visit_member(member);
    }
}

pub fn walk_member<V: Visitor>(v: &mut V, member: &Spanned<ClassMember>) {
    match &member.node {
        ClassMember::Const { items, .. } => {
            for item in items {
                v.visit_expr(&item.value);
            }
        }
        ClassMember::Property(prop) => {
            if let Some(ty) = &prop.ty {
                v.visit_type(ty);
            }
            if let Some(default) = &prop.default {
                v.visit_expr(default);
            }
            if let Some(hook) = &prop.hook {
                if let Some(getter) = &hook.getter {
                    v.visit_hook_body(&getter.node);
                }
                if let Some(setter) = &hook.setter {
                    if let Some(ty) = &setter.node.param_type {
                        v.visit_type(ty);
                    }
                    v.visit_hook_body(&setter.node.body);
                }
            }
        }
        ClassMember::Method(method) => v.visit_method(method),
    }
}

pub fn walk_param<V: Visitor>(v: &mut V, param: &Param) {
    if let Some(ty) = &param.ty {
        v.visit_type(ty);
    }
    if let Some(default) = &param.default {
        v.visit_expr(default);
    }
}
