//! Statement-level control-flow graphs.
//!
//! The program body and every function, method, closure and property hook
//! body get their own subgraph, running from an `Entry` node to an `Exit`
//! node. Nodes that no entry reaches are marked dead. [`Cfg::to_dot`]
//! renders the graph for Graphviz.

use std::collections::{HashMap, VecDeque};
use std::fmt::Write as _;

use crate::parser::ast::*;
use crate::pretty::{print_expr, print_stmt};
use crate::span::Spanned;
use crate::stats::NodeKind;
use crate::visit::{self, Visitor};

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// 1-based, in creation order.
    pub id: usize,
    /// Statement kind for statement nodes; `None` for join and scope markers.
    pub title: Option<&'static str>,
    pub label: String,
    pub dead: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    /// `True`/`False` on branches, `goto`, `throw`, `exit`, or empty.
    pub label: &'static str,
}

#[derive(Debug, Default)]
pub struct Cfg {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    entries: Vec<usize>,
}

impl Cfg {
    pub fn build(program: &Program) -> Self {
        let mut builder = Builder::default();
        builder.in_scope("main".to_string(), |b| visit::walk_program(b, program));
        let mut cfg = builder.cfg;
        cfg.mark_dead();
        tracing::debug!(nodes = cfg.nodes.len(), edges = cfg.edges.len(), "built control-flow graph");
        cfg
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: usize) -> Option<&Node> {
        id.checked_sub(1).and_then(|i| self.nodes.get(i))
    }

    /// Entry nodes, one per scope, in the order the scopes were entered.
    pub fn entries(&self) -> impl Iterator<Item = &Node> {
        self.entries.iter().filter_map(|&id| self.node(id))
    }

    pub fn successors(&self, id: usize) -> impl Iterator<Item = (&Node, &'static str)> {
        self.edges
            .iter()
            .filter(move |e| e.from == id)
            .filter_map(|e| self.node(e.to).map(|n| (n, e.label)))
    }

    pub fn dead_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.dead)
    }

    fn add(&mut self, title: Option<&'static str>, label: String) -> usize {
        let id = self.nodes.len() + 1;
        self.nodes.push(Node { id, title, label, dead: false });
        id
    }

    fn edge(&mut self, from: usize, to: usize, label: &'static str) {
        self.edges.push(Edge { from, to, label });
    }

    /// A node is live iff some scope entry reaches it.
    fn mark_dead(&mut self) {
        let mut adjacent = vec![Vec::new(); self.nodes.len() + 1];
        for edge in &self.edges {
            adjacent[edge.from].push(edge.to);
        }
        let mut reached = vec![false; self.nodes.len() + 1];
        let mut queue: VecDeque<usize> = self.entries.iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            if std::mem::replace(&mut reached[id], true) {
                continue;
            }
            queue.extend(adjacent[id].iter().copied());
        }
        for node in &mut self.nodes {
            node.dead = !reached[node.id];
        }
    }

    /// Graphviz source. Statement nodes render as a two-row table with the
    /// kind over the code; markers render as boxes. Dead nodes are grey.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph CFG {\n");
        out.push_str("  node [shape=none style=\"rounded,filled\" fillcolor=white fontname=\"Arial\" fontsize=12];\n");
        for node in &self.nodes {
            let (color, fill) = match (node.dead, node.title) {
                (true, _) => ("gray", "lightgray"),
                (false, Some(_)) => ("black", "white"),
                (false, None) => ("red", "white"),
            };
            let label = escape_html(&node.label);
            let _ = match node.title {
                Some(title) => writeln!(
                    out,
                    "  {id} [label=<<TABLE border='1' color='{color}' BGCOLOR='{fill}' cellspacing='0' cellpadding='10' style='rounded'>\
                     <TR><TD border='0'>{id}</TD><TD border='0'><B>{title}</B></TD></TR>\
                     <HR/><TR><TD border='0' colspan='2'>{label}</TD></TR></TABLE>>];",
                    id = node.id,
                ),
                None => writeln!(
                    out,
                    "  {id} [shape=box label=<{id}    <B>{label}</B>> color={color} fillcolor={fill}];",
                    id = node.id,
                ),
            };
        }
        for edge in &self.edges {
            let _ = if edge.label.is_empty() {
                writeln!(out, "  {} -> {} [weight=10];", edge.from, edge.to)
            } else {
                writeln!(out, "  {} -> {} [label=\"{}\"] [weight=10];", edge.from, edge.to, edge.label)
            };
        }
        out.push_str("}\n");
        out
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("<BR ALIGN=\"LEFT\"/>"),
            _ => out.push(c),
        }
    }
    out
}

/// A pending edge: the node it leaves from and its label.
type Pred = (usize, &'static str);

/// `break`/`continue` targets for one enclosing loop or switch.
#[derive(Default)]
struct Frame {
    switch: bool,
    breaks: Vec<Pred>,
    continues: Vec<Pred>,
}

/// State private to one function-like body.
#[derive(Default)]
struct Scope {
    exit: usize,
    frames: Vec<Frame>,
    /// Explicit throws inside each enclosing `try` body, innermost last.
    tries: Vec<Vec<Pred>>,
    labels: HashMap<String, usize>,
    gotos: Vec<(usize, String)>,
}

#[derive(Default)]
struct Builder {
    cfg: Cfg,
    scope: Scope,
    /// Edges into the next node. Empty when the current point is unreachable.
    preds: Vec<Pred>,
    class: Option<String>,
}

impl Builder {
    fn in_scope(&mut self, name: String, body: impl FnOnce(&mut Self)) {
        let entry = self.cfg.add(Some("entry"), name);
        let exit = self.cfg.add(None, "Exit".to_string());
        self.cfg.entries.push(entry);
        let outer = std::mem::replace(&mut self.scope, Scope { exit, ..Scope::default() });
        let outer_preds = std::mem::replace(&mut self.preds, vec![(entry, "")]);

        body(self);

        self.connect(exit);
        let scope = std::mem::replace(&mut self.scope, outer);
        for (from, name) in scope.gotos {
            if let Some(&to) = scope.labels.get(&name) {
                self.cfg.edge(from, to, "goto");
            }
        }
        self.preds = outer_preds;
    }

    /// Drain the pending edges into `to`.
    fn connect(&mut self, to: usize) {
        for (from, label) in std::mem::take(&mut self.preds) {
            self.cfg.edge(from, to, label);
        }
    }

    /// Add a node after the pending edges and make it the only predecessor.
    fn step(&mut self, title: &'static str, label: String) -> usize {
        let id = self.cfg.add(Some(title), label);
        self.connect(id);
        self.preds = vec![(id, "")];
        id
    }

    fn marker(&mut self, label: &str) -> usize {
        let id = self.cfg.add(None, label.to_string());
        self.connect(id);
        self.preds = vec![(id, "")];
        id
    }

    /// Current point flows nowhere after `from -> to`.
    fn jump(&mut self, from: usize, to: usize, label: &'static str) {
        self.cfg.edge(from, to, label);
        self.preds.clear();
    }

    /// The frame `level` loops out, if there is one.
    fn frame(&mut self, level: u32) -> Option<&mut Frame> {
        let depth = self.scope.frames.len().checked_sub(level.max(1) as usize)?;
        self.scope.frames.get_mut(depth)
    }

    fn stmt(&mut self, stmt: &Spanned<Stmt>) {
        match &stmt.node {
            Stmt::If { condition, then_block, elseif_branches, else_block } => {
                let mut test = self.step("if", print_expr(condition));
                self.visit_expr(condition);
                self.preds = vec![(test, "True")];
                self.visit_block(&then_block.node);
                let mut ends = std::mem::take(&mut self.preds);
                for branch in elseif_branches {
                    self.preds = vec![(test, "False")];
                    test = self.step("elseif", print_expr(&branch.condition));
                    self.visit_expr(&branch.condition);
                    self.preds = vec![(test, "True")];
                    self.visit_block(&branch.block.node);
                    ends.append(&mut self.preds);
                }
                self.preds = vec![(test, "False")];
                if let Some(block) = else_block {
                    self.visit_block(&block.node);
                }
                ends.append(&mut self.preds);
                self.preds = ends;
            }
            Stmt::Switch { subject, cases } => self.switch(subject, cases),
            Stmt::While { condition, body } => {
                let head = self.step("while", print_expr(condition));
                self.visit_expr(condition);
                self.preds = vec![(head, "True")];
                let frame = self.loop_body(&body.node);
                self.preds.extend(frame.continues);
                self.connect(head);
                self.preds = vec![(head, "False")];
                self.preds.extend(frame.breaks);
            }
            Stmt::DoWhile { body, condition } => {
                let head = self.marker("Do");
                let frame = self.loop_body(&body.node);
                self.preds.extend(frame.continues);
                let test = self.step("do-while", print_expr(condition));
                self.visit_expr(condition);
                self.cfg.edge(test, head, "True");
                self.preds = vec![(test, "False")];
                self.preds.extend(frame.breaks);
            }
            Stmt::For { init, condition, update, body } => {
                for expr in init {
                    self.step("for-init", print_expr(expr));
                    self.visit_expr(expr);
                }
                let head = self.step("for", join_exprs(condition));
                for expr in condition {
                    self.visit_expr(expr);
                }
                let bounded = !condition.is_empty();
                if bounded {
                    self.preds = vec![(head, "True")];
                }
                let frame = self.loop_body(&body.node);
                self.preds.extend(frame.continues);
                for expr in update {
                    self.step("for-update", print_expr(expr));
                    self.visit_expr(expr);
                }
                self.connect(head);
                if bounded {
                    self.preds.push((head, "False"));
                }
                self.preds.extend(frame.breaks);
            }
            Stmt::Foreach { collection, key, value, by_ref, body } => {
                let mut label = format!("{} as ", print_expr(collection));
                if let Some(key) = key {
                    let _ = write!(label, "{} => ", print_expr(key));
                }
                if *by_ref {
                    label.push('&');
                }
                label.push_str(&print_expr(value));
                let head = self.step("foreach", label);
                self.visit_expr(collection);
                self.preds = vec![(head, "True")];
                let frame = self.loop_body(&body.node);
                self.preds.extend(frame.continues);
                self.connect(head);
                self.preds = vec![(head, "False")];
                self.preds.extend(frame.breaks);
            }
            Stmt::Try { body, catches, finally } => {
                let head = self.marker("Try");
                self.scope.tries.push(Vec::new());
                self.visit_block(&body.node);
                let throws = self.scope.tries.pop().unwrap_or_default();
                let mut ends = std::mem::take(&mut self.preds);
                for catch in catches {
                    let types: Vec<String> = catch.types.iter().map(|t| t.node.to_string()).collect();
                    let mut label = types.join(" | ");
                    if let Some(var) = &catch.var {
                        let _ = write!(label, " ${}", var.node);
                    }
                    self.preds = vec![(head, "catch")];
                    self.preds.extend(throws.iter().copied());
                    self.step("catch", label);
                    self.visit_block(&catch.body.node);
                    ends.append(&mut self.preds);
                }
                if catches.is_empty() {
                    ends.extend(throws);
                }
                self.preds = ends;
                if let Some(block) = finally {
                    self.marker("Finally");
                    self.visit_block(&block.node);
                }
            }
            Stmt::Break(level) | Stmt::Continue(level) => {
                let is_break = matches!(stmt.node, Stmt::Break(_));
                let word = if is_break { "break" } else { "continue" };
                let label = if *level > 1 { format!("{word} {level}") } else { word.to_string() };
                let id = self.step(NodeKind::of_stmt(&stmt.node).as_str(), label);
                self.preds.clear();
                if let Some(frame) = self.frame(*level) {
                    if is_break || frame.switch {
                        frame.breaks.push((id, ""));
                    } else {
                        frame.continues.push((id, ""));
                    }
                }
            }
            Stmt::Goto(name) => {
                let id = self.step("goto", name.clone());
                self.preds.clear();
                self.scope.gotos.push((id, name.clone()));
            }
            Stmt::Label(name) => {
                let id = self.step("label", format!("{name}:"));
                self.scope.labels.insert(name.clone(), id);
            }
            Stmt::Return(value) => {
                let label = value.as_ref().map(print_expr).unwrap_or_default();
                let id = self.step("return", label);
                if let Some(expr) = value {
                    self.visit_expr(expr);
                }
                let exit = self.scope.exit;
                self.jump(id, exit, "");
            }
            Stmt::Expr(expr) => match &expr.node {
                Expr::Throw(inner) => {
                    let id = self.step("throw", print_expr(inner));
                    self.visit_expr(expr);
                    self.preds.clear();
                    match self.scope.tries.last_mut() {
                        Some(throws) => throws.push((id, "throw")),
                        None => {
                            let exit = self.scope.exit;
                            self.cfg.edge(id, exit, "throw");
                        }
                    }
                }
                Expr::Exit(_) => {
                    let id = self.step("exit", print_expr(expr));
                    self.visit_expr(expr);
                    let exit = self.scope.exit;
                    self.jump(id, exit, "exit");
                }
                _ => self.simple(stmt),
            },
            Stmt::Block(block) => self.visit_block(block),
            Stmt::Namespace { body: Some(block), .. } => self.visit_block(block),
            Stmt::Function(func) => self.visit_function(func),
            Stmt::Class(class) => self.visit_class(class),
            _ => self.simple(stmt),
        }
    }

    fn simple(&mut self, stmt: &Spanned<Stmt>) {
        let text = print_stmt(stmt);
        self.step(NodeKind::of_stmt(&stmt.node).as_str(), text.trim_end().to_string());
        visit::walk_stmt(self, stmt);
    }

    /// Visit a loop body inside a fresh frame and hand the frame back.
    fn loop_body(&mut self, body: &Block) -> Frame {
        self.scope.frames.push(Frame::default());
        self.visit_block(body);
        self.scope.frames.pop().unwrap_or_default()
    }

    /// Cases are tested in order, each reached from the previous test's
    /// `False` edge. Bodies fall through into the next case's body.
    /// `default` is taken only after every test fails.
    fn switch(&mut self, subject: &Spanned<Expr>, cases: &[SwitchCase]) {
        let head = self.step("switch", print_expr(subject));
        self.visit_expr(subject);
        self.scope.frames.push(Frame { switch: true, ..Frame::default() });
        let mut test: Pred = (head, "");
        let mut default = None;
        let mut fall = Vec::new();
        for case in cases {
            let mut entered = fall;
            for label in &case.labels {
                match label {
                    CaseLabel::Value(value) => {
                        self.preds = vec![test];
                        let id = self.step("case", print_expr(value));
                        self.visit_expr(value);
                        test = (id, "False");
                        entered.push((id, "True"));
                    }
                    CaseLabel::Default => {
                        let id = self.cfg.add(Some("default"), "default".to_string());
                        default = Some(id);
                        entered.push((id, ""));
                    }
                }
            }
            self.preds = entered;
            for stmt in &case.body {
                self.visit_stmt(stmt);
            }
            fall = std::mem::take(&mut self.preds);
        }
        let frame = self.scope.frames.pop().unwrap_or_default();
        self.preds = fall;
        match default {
            Some(id) => self.cfg.edge(test.0, id, test.1),
            None => self.preds.push(test),
        }
        self.preds.extend(frame.breaks);
    }
}

fn join_exprs(exprs: &[Spanned<Expr>]) -> String {
    exprs.iter().map(print_expr).collect::<Vec<_>>().join(", ")
}

impl Visitor for Builder {
    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) {
        crate::stack::ensure(|| self.stmt(stmt))
    }

    fn visit_function(&mut self, func: &FunctionDecl) {
        self.in_scope(func.sig.name.node.clone(), |b| b.visit_block(&func.body.node));
    }

    fn visit_class(&mut self, class: &ClassDecl) {
        let outer = self.class.replace(class.name.node.clone());
        visit::walk_class(self, class);
        self.class = outer;
    }

    fn visit_method(&mut self, method: &MethodDecl) {
        if let Some(body) = &method.body {
            let name = match &self.class {
                Some(class) => format!("{class}::{}", method.sig.name.node),
                None => method.sig.name.node.clone(),
            };
            self.in_scope(name, |b| b.visit_block(&body.node));
        }
    }

    fn visit_closure(&mut self, closure: &Closure) {
        self.in_scope("{closure}".to_string(), |b| b.visit_block(&closure.body.node));
    }

    fn visit_hook_body(&mut self, body: &HookBody) {
        match body {
            HookBody::Block(block) => self.in_scope("{hook}".to_string(), |b| b.visit_block(block)),
            HookBody::Expr(expr) => self.visit_expr(expr),
        }
    }
}
