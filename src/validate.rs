//! Structural checks that need a whole statement or function body: label
//! tables, jump levels, catch arity and duplicate defaults.

use std::collections::HashMap;

use crate::diagnostics::{Diagnostic, StructuralKind};
use crate::parser::ast::*;
use crate::span::{Span, Spanned};
use crate::visit::{self, Visitor};

/// Label and loop bookkeeping for one function-like body.
#[derive(Default)]
struct Scope {
    labels: HashMap<String, Span>,
    gotos: Vec<(String, Span)>,
    /// Enclosing loops and switches.
    loop_depth: u32,
}

struct Validator {
    scopes: Vec<Scope>,
    /// Earliest violation in source order. Gotos are only resolved when
    /// their scope closes, so a later report can still replace it.
    error: Option<Diagnostic>,
}

impl Validator {
    fn new() -> Self {
        Self { scopes: vec![Scope::default()], error: None }
    }

    fn report(&mut self, kind: StructuralKind, msg: impl Into<String>, span: Span) {
        if self.error.as_ref().is_none_or(|first| span.start < first.span().start) {
            self.error = Some(Diagnostic::structural(kind, msg, span));
        }
    }

    fn scope(&mut self) -> &mut Scope {
        if self.scopes.is_empty() {
            self.scopes.push(Scope::default());
        }
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Run `f` inside a fresh function scope, then resolve its gotos.
    fn with_scope(&mut self, f: impl FnOnce(&mut Self)) {
        self.scopes.push(Scope::default());
        f(self);
        if let Some(scope) = self.scopes.pop() {
            self.close_scope(scope);
        }
    }

    fn close_scope(&mut self, scope: Scope) {
        for (label, span) in scope.gotos {
            if !scope.labels.contains_key(&label) {
                self.report(StructuralKind::DanglingGoto, format!("goto target '{label}' is not defined"), span);
            }
        }
    }

    fn in_loop(&mut self, f: impl FnOnce(&mut Self)) {
        self.scope().loop_depth += 1;
        f(self);
        self.scope().loop_depth -= 1;
    }

    fn check_jump(&mut self, keyword: &str, level: u32, span: Span) {
        let depth = self.scope().loop_depth;
        if depth == 0 {
            self.report(
                StructuralKind::JumpOutsideLoop,
                format!("'{keyword}' not in a loop or switch"),
                span,
            );
        } else if level == 0 {
            self.report(StructuralKind::InvalidJumpLevel, format!("'{keyword}' level must be positive"), span);
        } else if level > depth {
            let plural = if depth == 1 { "" } else { "s" };
            self.report(
                StructuralKind::InvalidJumpLevel,
                format!("cannot '{keyword} {level}' from {depth} enclosing loop{plural}"),
                span,
            );
        }
    }

    fn check_try(&mut self, catches: &[CatchClause], finally: bool, span: Span) {
        if catches.is_empty() && !finally {
            self.report(StructuralKind::TryWithoutHandler, "try without catch or finally", span);
        }
        for catch in catches {
            if catch.types.is_empty() {
                self.report(StructuralKind::EmptyCatchTypes, "catch clause names no exception type", catch.body.span);
            }
        }
    }
}

impl Visitor for Validator {
    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) {
        match &stmt.node {
            Stmt::Label(name) => {
                if let Some(first) = self.scope().labels.insert(name.clone(), stmt.span) {
                    self.report(
                        StructuralKind::DuplicateLabel,
                        format!("label '{name}' already defined on line {}", first.line),
                        stmt.span,
                    );
                }
            }
            Stmt::Goto(label) => self.scope().gotos.push((label.clone(), stmt.span)),
            Stmt::Break(level) => self.check_jump("break", *level, stmt.span),
            Stmt::Continue(level) => self.check_jump("continue", *level, stmt.span),
            Stmt::Try { catches, finally, .. } => {
                self.check_try(catches, finally.is_some(), stmt.span);
                visit::walk_stmt(self, stmt);
            }
            Stmt::Switch { cases, .. } => {
                let defaults = cases
                    .iter()
                    .flat_map(|c| &c.labels)
                    .filter(|l| matches!(l, CaseLabel::Default))
                    .count();
                if defaults > 1 {
                    self.report(StructuralKind::DuplicateDefault, "switch has more than one default case", stmt.span);
                }
                self.in_loop(|v| visit::walk_stmt(v, stmt));
            }
            Stmt::While { .. } | Stmt::DoWhile { .. } | Stmt::For { .. } | Stmt::Foreach { .. } => {
                self.in_loop(|v| visit::walk_stmt(v, stmt));
            }
            _ => visit::walk_stmt(self, stmt),
        }
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) {
        if let Expr::Match { arms, .. } = &expr.node {
            let defaults = arms.iter().filter(|a| a.pattern == MatchPattern::Default).count();
            if defaults > 1 {
                self.report(StructuralKind::DuplicateDefault, "match has more than one default arm", expr.span);
            }
        }
        visit::walk_expr(self, expr);
    }

    fn visit_function(&mut self, func: &FunctionDecl) {
        self.with_scope(|v| visit::walk_function(v, func));
    }

    fn visit_method(&mut self, method: &MethodDecl) {
        self.with_scope(|v| visit::walk_method(v, method));
    }

    fn visit_closure(&mut self, closure: &Closure) {
        self.with_scope(|v| visit::walk_closure(v, closure));
    }

    fn visit_hook_body(&mut self, body: &HookBody) {
        self.with_scope(|v| visit::walk_hook_body(v, body));
    }
}

/// Check `program`, returning the violation that comes first in the source.
pub fn validate(program: &Program) -> Result<(), Diagnostic> {
    let mut validator = Validator::new();
    validator.visit_program(program);
    let top = std::mem::take(&mut validator.scopes);
    for scope in top {
        validator.close_scope(scope);
    }
    tracing::trace!(ok = validator.error.is_none(), "structural validation");
    match validator.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
