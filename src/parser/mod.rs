pub mod ast;
mod decl;
mod expr;
pub mod policy;

use crate::config::ParseOptions;
use crate::diagnostics::{Diagnostic, StructuralKind};
use crate::lexer::token::{Number, Token};
use crate::span::{Span, Spanned};
use ast::*;

static EOF_TOKEN: Spanned<Token> = Spanned {
    node: Token::Eof,
    span: Span { start: 0, end: 0, line: 0, column: 0 },
};

fn same_kind(a: &Token, b: &Token) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

pub struct Parser<'a> {
    tokens: &'a [Spanned<Token>],
    source: &'a str,
    pos: usize,
    options: ParseOptions,
    depth: usize,
    /// Open alternative-syntax blocks: the expected `end*` keyword and the
    /// span of the construct that opened it.
    terminators: Vec<Spanned<Token>>,
}

/// An `if` with its folded `elseif`/`else if` chain.
struct IfChain {
    condition: Spanned<Expr>,
    then_block: Spanned<Block>,
    elseif_branches: Vec<ElseIf>,
    else_block: Option<Spanned<Block>>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Spanned<Token>], source: &'a str, options: ParseOptions) -> Self {
        Self { tokens, source, pos: 0, options, depth: 0, terminators: Vec::new() }
    }

    fn peek(&self) -> &'a Spanned<Token> {
        let tokens: &'a [Spanned<Token>] = self.tokens;
        tokens.get(self.pos).or_else(|| tokens.last()).unwrap_or(&EOF_TOKEN)
    }

    fn peek_nth(&self, n: usize) -> &'a Token {
        let tokens: &'a [Spanned<Token>] = self.tokens;
        tokens.get(self.pos + n).map_or(&EOF_TOKEN.node, |t| &t.node)
    }

    fn at(&self, tok: &Token) -> bool {
        same_kind(&self.peek().node, tok)
    }

    fn nth_is(&self, n: usize, tok: &Token) -> bool {
        same_kind(self.peek_nth(n), tok)
    }

    fn advance(&mut self) -> &'a Spanned<Token> {
        let tok = self.peek();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, tok: &Token) -> bool {
        if self.at(tok) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<&'a Spanned<Token>, Diagnostic> {
        let tok = self.peek();
        if same_kind(&tok.node, expected) {
            self.advance();
            Ok(tok)
        } else {
            Err(self.unexpected(tok, &[expected.to_string().as_str()]))
        }
    }

    fn unexpected(&self, tok: &Spanned<Token>, expected: &[&str]) -> Diagnostic {
        let msg = match &tok.node {
            Token::Error(text) => format!("unrecognized input '{text}'"),
            other => format!("expected {}, found {other}", expected.join(" or ")),
        };
        Diagnostic::expected(msg, tok.span, expected)
    }

    fn text(&self, span: Span) -> &'a str {
        let source: &'a str = self.source;
        source.get(span.start..span.end).unwrap_or("")
    }

    fn expect_ident(&mut self) -> Result<Spanned<String>, Diagnostic> {
        let tok = self.peek();
        if matches!(tok.node, Token::Ident) {
            self.advance();
            Ok(Spanned::new(self.text(tok.span).to_string(), tok.span))
        } else {
            Err(self.unexpected(tok, &["identifier"]))
        }
    }

    /// Identifier or keyword, for positions where reserved words are
    /// ordinary names (members, constants, labels after `::`).
    fn expect_member_name(&mut self) -> Result<Spanned<String>, Diagnostic> {
        let tok = self.peek();
        if matches!(tok.node, Token::Ident) || tok.node.is_keyword() {
            self.advance();
            Ok(Spanned::new(self.text(tok.span).to_string(), tok.span))
        } else {
            Err(self.unexpected(tok, &["identifier"]))
        }
    }

    /// `$name`, returned without the `$`.
    fn expect_variable(&mut self) -> Result<Spanned<String>, Diagnostic> {
        let tok = self.peek();
        if matches!(tok.node, Token::Variable) {
            self.advance();
            Ok(Spanned::new(self.text(tok.span)[1..].to_string(), tok.span))
        } else {
            Err(self.unexpected(tok, &["variable"]))
        }
    }

    fn prev_span(&self) -> Span {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .map_or(Span::dummy(), |t| t.span)
    }

    /// Span from `start` through the last consumed token.
    fn span_from(&self, start: Span) -> Span {
        start.to(self.prev_span())
    }

    fn enter(&mut self, at: Span) -> Result<(), Diagnostic> {
        self.depth += 1;
        if self.depth > self.options.max_nesting_depth {
            return Err(Diagnostic::structural(
                StructuralKind::NestingTooDeep,
                format!("nesting exceeds the maximum depth of {}", self.options.max_nesting_depth),
                at,
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// `;`, or a `?>` which ends the statement without being consumed.
    fn expect_stmt_end(&mut self) -> Result<(), Diagnostic> {
        if self.eat(&Token::Semicolon) || matches!(self.peek().node, Token::CloseTag(_)) {
            return Ok(());
        }
        Err(self.unexpected(self.peek(), &[Token::Semicolon.to_string().as_str()]))
    }

    pub fn parse_program(&mut self) -> Result<Program, Diagnostic> {
        let open_tag = self.eat(&Token::OpenTag);
        let mut stmts = Vec::new();
        while !self.at(&Token::Eof) {
            self.parse_stmt_into(&mut stmts)?;
        }
        Ok(Program { open_tag, stmts })
    }

    /// Statements up to (not including) one of `stops`.
    fn parse_stmts_until(&mut self, stops: &[Token]) -> Result<Vec<Spanned<Stmt>>, Diagnostic> {
        let mut stmts = Vec::new();
        loop {
            let tok = self.peek();
            if stops.iter().any(|s| same_kind(s, &tok.node)) {
                return Ok(stmts);
            }
            if matches!(tok.node, Token::Eof) {
                return Err(self.unterminated(stops));
            }
            self.parse_stmt_into(&mut stmts)?;
        }
    }

    fn unterminated(&self, stops: &[Token]) -> Diagnostic {
        let eof = self.peek();
        match self.terminators.last() {
            Some(open) if stops.iter().any(|s| same_kind(s, &open.node)) => Diagnostic::structural(
                StructuralKind::UnterminatedBlock,
                format!("end of input before {} closing this block", open.node),
                open.span,
            ),
            _ => {
                let expected: Vec<String> = stops.iter().map(Token::to_string).collect();
                let expected: Vec<&str> = expected.iter().map(String::as_str).collect();
                self.unexpected(eof, &expected)
            }
        }
    }

    fn mismatched(&self, found: &Spanned<Token>) -> Diagnostic {
        match self.terminators.last() {
            Some(open) => Diagnostic::structural(
                StructuralKind::MismatchedTerminator,
                format!("found {} but the open block expects {}", found.node, open.node),
                found.span,
            ),
            None => Diagnostic::syntax(format!("{} without a matching opening block", found.node), found.span),
        }
    }

    fn open_alt(&mut self, opener: &Spanned<Token>) {
        if let Some(end) = policy::terminator_for(&opener.node) {
            self.terminators.push(Spanned::new(end, opener.span));
        }
    }

    fn close_alt(&mut self) -> Result<(), Diagnostic> {
        if let Some(open) = self.terminators.last() {
            let end = open.node.clone();
            self.expect(&end)?;
            self.expect_stmt_end()?;
            self.terminators.pop();
        }
        Ok(())
    }

    fn parse_block(&mut self) -> Result<Spanned<Block>, Diagnostic> {
        let open = self.expect(&Token::LBrace)?;
        self.enter(open.span)?;
        let stmts = self.parse_stmts_until(&[Token::RBrace])?;
        self.expect(&Token::RBrace)?;
        self.leave();
        Ok(Spanned::new(Block { stmts }, self.span_from(open.span)))
    }

    /// Brace-form body: a block, or a single statement wrapped into one.
    fn parse_body(&mut self) -> Result<Spanned<Block>, Diagnostic> {
        if self.at(&Token::LBrace) {
            return self.parse_block();
        }
        let start = self.peek().span;
        self.enter(start)?;
        let mut stmts = Vec::new();
        self.parse_stmt_into(&mut stmts)?;
        self.leave();
        Ok(Spanned::new(Block { stmts }, self.span_from(start)))
    }

    /// Alternative-syntax body: statements up to one of `stops`.
    fn parse_alt_body(&mut self, stops: &[Token]) -> Result<Spanned<Block>, Diagnostic> {
        let start = self.peek().span;
        self.enter(start)?;
        let stmts = self.parse_stmts_until(stops)?;
        self.leave();
        Ok(Spanned::new(Block { stmts }, self.span_from(start)))
    }

    /// Loop body in either form; `opener` selects the `end*` keyword.
    fn parse_loop_body(&mut self, opener: &'a Spanned<Token>) -> Result<Spanned<Block>, Diagnostic> {
        if !self.eat(&Token::Colon) {
            return self.parse_body();
        }
        self.open_alt(opener);
        let stops: Vec<Token> = self.terminators.last().map(|t| t.node.clone()).into_iter().collect();
        let body = self.parse_alt_body(&stops)?;
        self.close_alt()?;
        Ok(body)
    }

    fn parse_paren_expr(&mut self) -> Result<Spanned<Expr>, Diagnostic> {
        self.expect(&Token::LParen)?;
        let expr = self.parse_expr()?;
        self.expect(&Token::RParen)?;
        Ok(expr)
    }

    fn parse_stmt_into(&mut self, out: &mut Vec<Spanned<Stmt>>) -> Result<(), Diagnostic> {
        crate::stack::ensure(|| self.dispatch_stmt(out))
    }

    fn dispatch_stmt(&mut self, out: &mut Vec<Spanned<Stmt>>) -> Result<(), Diagnostic> {
        let tok = self.peek();
        let stmt = match &tok.node {
            Token::Semicolon | Token::OpenTag => {
                self.advance();
                return Ok(());
            }
            Token::CloseTag(html) => {
                self.advance();
                self.eat(&Token::OpenTag);
                match inline_html(html) {
                    Some(text) => Spanned::new(Stmt::InlineHtml(text), tok.span),
                    None => return Ok(()),
                }
            }
            Token::Use => return self.parse_use(out),
            Token::LBrace => self.parse_block()?.map(Stmt::Block),
            Token::If => self.parse_if()?,
            Token::Switch => self.parse_switch()?,
            Token::While => self.parse_while()?,
            Token::Do => self.parse_do_while()?,
            Token::For => self.parse_for()?,
            Token::Foreach => self.parse_foreach()?,
            Token::Try => self.parse_try()?,
            Token::Break | Token::Continue => self.parse_jump()?,
            Token::Goto => self.parse_goto()?,
            Token::Return => self.parse_return()?,
            Token::Echo => self.parse_echo()?,
            Token::Global => self.parse_global()?,
            Token::Static if self.nth_is(1, &Token::Variable) => self.parse_static_vars()?,
            Token::Unset => self.parse_unset()?,
            Token::Const => self.parse_const()?,
            Token::Declare => self.parse_declare()?,
            Token::Function if self.is_function_decl() => self.parse_function_decl()?,
            Token::Abstract | Token::Final | Token::Class => self.parse_class()?,
            Token::Readonly if matches!(self.peek_nth(1), Token::Class | Token::Abstract | Token::Final) => {
                self.parse_class()?
            }
            Token::Namespace => self.parse_namespace()?,
            Token::Ident if self.nth_is(1, &Token::Colon) => {
                let name = self.expect_ident()?;
                self.advance();
                Spanned::new(Stmt::Label(name.node), self.span_from(tok.span))
            }
            t if t.is_block_terminator() => return Err(self.mismatched(tok)),
            _ => {
                let expr = self.parse_expr()?;
                self.expect_stmt_end()?;
                Spanned::new(Stmt::Expr(expr), self.span_from(tok.span))
            }
        };
        out.push(stmt);
        Ok(())
    }

    fn parse_if(&mut self) -> Result<Spanned<Stmt>, Diagnostic> {
        let start = self.peek().span;
        let chain = self.parse_if_chain()?;
        Ok(Spanned::new(
            Stmt::If {
                condition: chain.condition,
                then_block: chain.then_block,
                elseif_branches: chain.elseif_branches,
                else_block: chain.else_block,
            },
            self.span_from(start),
        ))
    }

    fn parse_if_chain(&mut self) -> Result<IfChain, Diagnostic> {
        let if_tok = self.expect(&Token::If)?;
        self.enter(if_tok.span)?;
        let condition = self.parse_paren_expr()?;
        let chain = if self.eat(&Token::Colon) {
            self.parse_if_alt(if_tok, condition)?
        } else {
            self.parse_if_braced(condition)?
        };
        self.leave();
        Ok(chain)
    }

    fn parse_if_braced(&mut self, condition: Spanned<Expr>) -> Result<IfChain, Diagnostic> {
        let then_block = self.parse_body()?;
        let mut elseif_branches = Vec::new();
        let mut else_block = None;
        loop {
            if self.eat(&Token::ElseIf) {
                let condition = self.parse_paren_expr()?;
                let block = self.parse_body()?;
                elseif_branches.push(ElseIf { condition, block });
            } else if self.eat(&Token::Else) {
                if self.at(&Token::If) {
                    // `else if` joins the same chain as `elseif`.
                    let nested = self.parse_if_chain()?;
                    elseif_branches.push(ElseIf { condition: nested.condition, block: nested.then_block });
                    elseif_branches.extend(nested.elseif_branches);
                    else_block = nested.else_block;
                } else {
                    else_block = Some(self.parse_body()?);
                }
                break;
            } else {
                break;
            }
        }
        Ok(IfChain { condition, then_block, elseif_branches, else_block })
    }

    fn parse_if_alt(&mut self, if_tok: &'a Spanned<Token>, condition: Spanned<Expr>) -> Result<IfChain, Diagnostic> {
        self.open_alt(if_tok);
        let stops = [Token::ElseIf, Token::Else, Token::EndIf];
        let then_block = self.parse_alt_body(&stops)?;
        let mut elseif_branches = Vec::new();
        let mut else_block = None;
        loop {
            if self.eat(&Token::ElseIf) {
                let condition = self.parse_paren_expr()?;
                self.expect(&Token::Colon)?;
                let block = self.parse_alt_body(&stops)?;
                elseif_branches.push(ElseIf { condition, block });
            } else if self.at(&Token::Else) {
                let else_tok = self.advance();
                if self.at(&Token::If) {
                    return Err(Diagnostic::expected(
                        "'else if' cannot continue an alternative-syntax if; use 'elseif'",
                        else_tok.span,
                        &["':'"],
                    ));
                }
                self.expect(&Token::Colon)?;
                else_block = Some(self.parse_alt_body(&[Token::EndIf])?);
                break;
            } else {
                break;
            }
        }
        self.close_alt()?;
        Ok(IfChain { condition, then_block, elseif_branches, else_block })
    }

    fn parse_while(&mut self) -> Result<Spanned<Stmt>, Diagnostic> {
        let while_tok = self.expect(&Token::While)?;
        let condition = self.parse_paren_expr()?;
        let body = self.parse_loop_body(while_tok)?;
        Ok(Spanned::new(Stmt::While { condition, body }, self.span_from(while_tok.span)))
    }

    fn parse_do_while(&mut self) -> Result<Spanned<Stmt>, Diagnostic> {
        let do_tok = self.expect(&Token::Do)?;
        let body = self.parse_body()?;
        self.expect(&Token::While)?;
        let condition = self.parse_paren_expr()?;
        self.expect_stmt_end()?;
        Ok(Spanned::new(Stmt::DoWhile { body, condition }, self.span_from(do_tok.span)))
    }

    /// Comma-separated expressions up to `end`, which is not consumed.
    fn parse_expr_list(&mut self, end: &Token) -> Result<Vec<Spanned<Expr>>, Diagnostic> {
        let mut exprs = Vec::new();
        while !self.at(end) {
            exprs.push(self.parse_expr()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(exprs)
    }

    fn parse_for(&mut self) -> Result<Spanned<Stmt>, Diagnostic> {
        let for_tok = self.expect(&Token::For)?;
        self.expect(&Token::LParen)?;
        let init = self.parse_expr_list(&Token::Semicolon)?;
        self.expect(&Token::Semicolon)?;
        let condition = self.parse_expr_list(&Token::Semicolon)?;
        self.expect(&Token::Semicolon)?;
        let update = self.parse_expr_list(&Token::RParen)?;
        self.expect(&Token::RParen)?;
        let body = self.parse_loop_body(for_tok)?;
        Ok(Spanned::new(Stmt::For { init, condition, update, body }, self.span_from(for_tok.span)))
    }

    fn parse_foreach(&mut self) -> Result<Spanned<Stmt>, Diagnostic> {
        let foreach_tok = self.expect(&Token::Foreach)?;
        self.expect(&Token::LParen)?;
        let collection = self.parse_expr()?;
        self.expect(&Token::As)?;
        let mut by_ref = self.eat(&Token::Amp);
        let first = self.parse_expr()?;
        let (key, value) = if !by_ref && self.eat(&Token::FatArrow) {
            by_ref = self.eat(&Token::Amp);
            (Some(first), self.parse_expr()?)
        } else {
            (None, first)
        };
        self.expect(&Token::RParen)?;
        let body = self.parse_loop_body(foreach_tok)?;
        Ok(Spanned::new(
            Stmt::Foreach { collection, key, value, by_ref, body },
            self.span_from(foreach_tok.span),
        ))
    }

    fn parse_switch(&mut self) -> Result<Spanned<Stmt>, Diagnostic> {
        let switch_tok = self.expect(&Token::Switch)?;
        let subject = self.parse_paren_expr()?;
        let alt = self.eat(&Token::Colon);
        let end = if alt {
            self.open_alt(switch_tok);
            Token::EndSwitch
        } else {
            self.expect(&Token::LBrace)?;
            Token::RBrace
        };
        self.enter(switch_tok.span)?;

        let mut cases = Vec::new();
        let mut labels = Vec::new();
        loop {
            let tok = self.peek();
            match &tok.node {
                Token::Case => {
                    self.advance();
                    labels.push(CaseLabel::Value(self.parse_expr()?));
                }
                Token::Default => {
                    self.advance();
                    labels.push(CaseLabel::Default);
                }
                t if same_kind(t, &end) => break,
                Token::Eof => return Err(self.unterminated(&[end])),
                _ => {
                    let end_name = end.to_string();
                    return Err(self.unexpected(tok, &["'case'", "'default'", end_name.as_str()]));
                }
            }
            if !self.eat(&Token::Colon) && !self.eat(&Token::Semicolon) {
                return Err(self.unexpected(self.peek(), &["':'"]));
            }
            let body = self.parse_stmts_until(&[Token::Case, Token::Default, end.clone()])?;
            // Consecutive labels with no statements share the next body.
            if body.is_empty() && !self.at(&end) {
                continue;
            }
            let falls_through = body.last().is_none_or(|s| !s.node.ends_control_flow());
            cases.push(SwitchCase { labels: std::mem::take(&mut labels), body, falls_through });
        }

        self.leave();
        if alt {
            self.close_alt()?;
        } else {
            self.expect(&Token::RBrace)?;
        }
        Ok(Spanned::new(Stmt::Switch { subject, cases }, self.span_from(switch_tok.span)))
    }

    fn parse_try(&mut self) -> Result<Spanned<Stmt>, Diagnostic> {
        let try_tok = self.expect(&Token::Try)?;
        let body = self.parse_block()?;
        let mut catches = Vec::new();
        while self.eat(&Token::Catch) {
            self.expect(&Token::LParen)?;
            let mut types = Vec::new();
            if !self.at(&Token::Variable) && !self.at(&Token::RParen) {
                loop {
                    let start = self.peek().span;
                    let name = self.parse_qualified_name(false)?;
                    types.push(Spanned::new(name, self.span_from(start)));
                    if !self.eat(&Token::Pipe) {
                        break;
                    }
                }
            }
            let var = if self.at(&Token::Variable) { Some(self.expect_variable()?) } else { None };
            self.expect(&Token::RParen)?;
            let body = self.parse_block()?;
            catches.push(CatchClause { types, var, body });
        }
        let finally = if self.eat(&Token::Finally) { Some(self.parse_block()?) } else { None };
        Ok(Spanned::new(Stmt::Try { body, catches, finally }, self.span_from(try_tok.span)))
    }

    fn parse_jump(&mut self) -> Result<Spanned<Stmt>, Diagnostic> {
        let tok = self.advance();
        let level = match self.peek().node {
            Token::IntLit(Number::Int(n)) => {
                let lit = self.advance();
                u32::try_from(n).map_err(|_| Diagnostic::syntax("jump level out of range", lit.span))?
            }
            _ => 1,
        };
        self.expect_stmt_end()?;
        let stmt = match tok.node {
            Token::Break => Stmt::Break(level),
            _ => Stmt::Continue(level),
        };
        Ok(Spanned::new(stmt, self.span_from(tok.span)))
    }

    fn parse_goto(&mut self) -> Result<Spanned<Stmt>, Diagnostic> {
        let goto_tok = self.expect(&Token::Goto)?;
        let label = self.expect_ident()?;
        self.expect_stmt_end()?;
        Ok(Spanned::new(Stmt::Goto(label.node), self.span_from(goto_tok.span)))
    }

    fn parse_return(&mut self) -> Result<Spanned<Stmt>, Diagnostic> {
        let ret_tok = self.expect(&Token::Return)?;
        let value = if self.at(&Token::Semicolon) || matches!(self.peek().node, Token::CloseTag(_)) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect_stmt_end()?;
        Ok(Spanned::new(Stmt::Return(value), self.span_from(ret_tok.span)))
    }

    fn parse_echo(&mut self) -> Result<Spanned<Stmt>, Diagnostic> {
        let echo_tok = self.expect(&Token::Echo)?;
        let mut exprs = vec![self.parse_expr()?];
        while self.eat(&Token::Comma) {
            exprs.push(self.parse_expr()?);
        }
        self.expect_stmt_end()?;
        Ok(Spanned::new(Stmt::Echo(exprs), self.span_from(echo_tok.span)))
    }

    fn parse_global(&mut self) -> Result<Spanned<Stmt>, Diagnostic> {
        let global_tok = self.expect(&Token::Global)?;
        let mut names = vec![self.expect_variable()?];
        while self.eat(&Token::Comma) {
            names.push(self.expect_variable()?);
        }
        self.expect_stmt_end()?;
        Ok(Spanned::new(Stmt::Global(names), self.span_from(global_tok.span)))
    }

    fn parse_static_vars(&mut self) -> Result<Spanned<Stmt>, Diagnostic> {
        let static_tok = self.expect(&Token::Static)?;
        let mut vars = Vec::new();
        loop {
            let name = self.expect_variable()?;
            let default = if self.eat(&Token::Eq) { Some(self.parse_expr()?) } else { None };
            vars.push(StaticVar { name, default });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect_stmt_end()?;
        Ok(Spanned::new(Stmt::StaticVars(vars), self.span_from(static_tok.span)))
    }

    fn parse_unset(&mut self) -> Result<Spanned<Stmt>, Diagnostic> {
        let unset_tok = self.expect(&Token::Unset)?;
        self.expect(&Token::LParen)?;
        let exprs = self.parse_expr_list(&Token::RParen)?;
        self.expect(&Token::RParen)?;
        self.expect_stmt_end()?;
        Ok(Spanned::new(Stmt::Unset(exprs), self.span_from(unset_tok.span)))
    }

    /// `NAME = expr (, NAME = expr)*`
    fn parse_const_items(&mut self) -> Result<Vec<ConstItem>, Diagnostic> {
        let mut items = Vec::new();
        loop {
            let name = self.expect_member_name()?;
            self.expect(&Token::Eq)?;
            let value = self.parse_expr()?;
            items.push(ConstItem { name, value });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(items)
    }

    fn parse_const(&mut self) -> Result<Spanned<Stmt>, Diagnostic> {
        let const_tok = self.expect(&Token::Const)?;
        let items = self.parse_const_items()?;
        self.expect_stmt_end()?;
        Ok(Spanned::new(Stmt::Const(items), self.span_from(const_tok.span)))
    }

    fn parse_declare(&mut self) -> Result<Spanned<Stmt>, Diagnostic> {
        let declare_tok = self.expect(&Token::Declare)?;
        self.expect(&Token::LParen)?;
        let items = self.parse_const_items()?;
        self.expect(&Token::RParen)?;
        self.expect_stmt_end()?;
        Ok(Spanned::new(Stmt::Declare(items), self.span_from(declare_tok.span)))
    }
}

/// Text after `?>`: PHP swallows one newline directly after the tag, and
/// whitespace-only runs produce no output worth keeping.
fn inline_html(raw: &str) -> Option<String> {
    let text = raw
        .strip_prefix("\r\n")
        .or_else(|| raw.strip_prefix('\n'))
        .unwrap_or(raw);
    if text.trim().is_empty() { None } else { Some(text.to_string()) }
}
