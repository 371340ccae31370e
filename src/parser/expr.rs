use super::ast::*;
use super::policy::{self, prec, Assoc, Infix};
use super::Parser;
use crate::diagnostics::Diagnostic;
use crate::lexer::interp::StringPart;
use crate::lexer::token::{Number, Token};
use crate::span::{Span, Spanned};

fn boxed(expr: Spanned<Expr>) -> Box<Spanned<Expr>> {
    Box::new(expr)
}

impl<'a> Parser<'a> {
    pub(super) fn parse_expr(&mut self) -> Result<Spanned<Expr>, Diagnostic> {
        self.parse_expr_bp(prec::LOWEST)
    }

    pub(super) fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Spanned<Expr>, Diagnostic> {
        crate::stack::ensure(|| self.climb(min_bp))
    }

    /// Precedence climbing over infix operators binding at least `min_bp`.
    fn climb(&mut self, min_bp: u8) -> Result<Spanned<Expr>, Diagnostic> {
        let start = self.peek().span;
        self.enter(start)?;
        let mut lhs = self.parse_unary()?;

        loop {
            let Some((infix, bp, assoc)) = policy::infix(&self.peek().node) else { break };
            if bp < min_bp {
                break;
            }
            self.advance();
            let rhs_bp = if assoc == Assoc::Right { bp } else { bp + 1 };

            let node = match infix {
                Infix::Binary(op) => {
                    let rhs = self.parse_expr_bp(rhs_bp)?;
                    Expr::Binary { op, lhs: boxed(lhs), rhs: boxed(rhs) }
                }
                Infix::Coalesce => {
                    let rhs = self.parse_expr_bp(rhs_bp)?;
                    Expr::NullCoalesce { lhs: boxed(lhs), rhs: boxed(rhs) }
                }
                Infix::Ternary => {
                    let then_expr = if self.eat(&Token::Colon) {
                        None
                    } else {
                        let then_expr = self.parse_expr()?;
                        self.expect(&Token::Colon)?;
                        Some(boxed(then_expr))
                    };
                    let else_expr = self.parse_expr_bp(rhs_bp)?;
                    Expr::Ternary { condition: boxed(lhs), then_expr, else_expr: boxed(else_expr) }
                }
                Infix::InstanceOf => {
                    let class = self.parse_class_ref()?;
                    Expr::InstanceOf { expr: boxed(lhs), class: boxed(class) }
                }
            };
            lhs = Spanned::new(node, self.span_from(start));
        }

        self.leave();
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Spanned<Expr>, Diagnostic> {
        let tok = self.peek();
        let start = tok.span;

        if let Some((op, bp)) = policy::prefix_unary(&tok.node) {
            self.advance();
            let operand = self.parse_expr_bp(bp)?;
            return Ok(Spanned::new(Expr::Unary { op, operand: boxed(operand) }, self.span_from(start)));
        }
        if let Some(kind) = policy::include_kind(&tok.node) {
            self.advance();
            let path = self.parse_expr_bp(prec::ASSIGN)?;
            return Ok(Spanned::new(Expr::Include { kind, path: boxed(path) }, self.span_from(start)));
        }

        if let Some(ty) = self.cast_ahead() {
            self.pos += 3;
            let operand = self.parse_expr_bp(prec::UNARY)?;
            return Ok(Spanned::new(Expr::Cast { ty, expr: boxed(operand) }, self.span_from(start)));
        }

        let node = match &tok.node {
            Token::PlusPlus | Token::MinusMinus => {
                self.advance();
                let target = self.parse_postfix_expr()?;
                let op = if matches!(tok.node, Token::PlusPlus) { IncDec::PreInc } else { IncDec::PreDec };
                Expr::IncDec { op, target: boxed(target) }
            }
            Token::Clone => {
                self.advance();
                let operand = self.parse_expr_bp(prec::PRIMARY)?;
                Expr::Clone(boxed(operand))
            }
            Token::Print => {
                self.advance();
                Expr::Print(boxed(self.parse_expr_bp(prec::ASSIGN)?))
            }
            Token::Throw => {
                self.advance();
                Expr::Throw(boxed(self.parse_expr_bp(prec::ASSIGN)?))
            }
            Token::Fn => return self.parse_arrow_fn(false),
            Token::Static if self.nth_is(1, &Token::Fn) => {
                self.advance();
                return self.parse_arrow_fn(true);
            }
            _ => {
                let target = self.parse_postfix_expr()?;
                return self.parse_assignment_tail(target);
            }
        };
        Ok(Spanned::new(node, self.span_from(start)))
    }

    /// `(int)`, `(string)`, ... at the current position.
    fn cast_ahead(&self) -> Option<CastType> {
        if !self.at(&Token::LParen) || !self.nth_is(2, &Token::RParen) {
            return None;
        }
        let inner = self.tokens.get(self.pos + 1)?;
        match inner.node {
            Token::Ident | Token::Array => policy::cast_type(self.text(inner.span)),
            _ => None,
        }
    }

    /// Assignment binds to the lvalue on its left whatever the surrounding
    /// binding power: `!$a = f()` is `!($a = f())`.
    fn parse_assignment_tail(&mut self, target: Spanned<Expr>) -> Result<Spanned<Expr>, Diagnostic> {
        let tok = self.peek();
        let compound = policy::compound_assign(&tok.node);
        if !matches!(tok.node, Token::Eq) && compound.is_none() {
            return Ok(target);
        }
        if !target.node.is_lvalue() {
            return Err(Diagnostic::syntax("invalid assignment target", target.span));
        }
        self.advance();
        let start = target.span;
        let node = match compound {
            Some(op) => {
                let value = self.parse_expr_bp(prec::ASSIGN)?;
                Expr::CompoundAssign { op, target: boxed(target), value: boxed(value) }
            }
            None => {
                let by_ref = self.eat(&Token::Amp);
                let value = self.parse_expr_bp(prec::ASSIGN)?;
                Expr::Assign { target: boxed(target), value: boxed(value), by_ref }
            }
        };
        Ok(Spanned::new(node, self.span_from(start)))
    }

    pub(super) fn parse_postfix_expr(&mut self) -> Result<Spanned<Expr>, Diagnostic> {
        let mut expr = self.parse_primary()?;
        let start = expr.span;

        loop {
            let node = match self.peek().node {
                Token::LBracket => {
                    self.advance();
                    let index = if self.at(&Token::RBracket) { None } else { Some(boxed(self.parse_expr()?)) };
                    self.expect(&Token::RBracket)?;
                    Expr::Index { base: boxed(expr), index }
                }
                Token::Arrow | Token::NullsafeArrow => {
                    let nullsafe = matches!(self.advance().node, Token::NullsafeArrow);
                    let name = self.expect_member_name()?;
                    if self.at(&Token::LParen) {
                        let args = self.parse_args()?;
                        Expr::MethodCall { object: boxed(expr), method: name, args, nullsafe }
                    } else {
                        Expr::PropertyAccess { object: boxed(expr), property: name, nullsafe }
                    }
                }
                Token::ColonColon => {
                    self.advance();
                    if self.at(&Token::Variable) {
                        let property = self.expect_variable()?;
                        Expr::StaticProperty { class: boxed(expr), property }
                    } else {
                        let name = self.expect_member_name()?;
                        if self.at(&Token::LParen) {
                            let args = self.parse_args()?;
                            Expr::StaticCall { class: boxed(expr), method: name, args }
                        } else {
                            Expr::ClassConst { class: boxed(expr), name }
                        }
                    }
                }
                Token::LParen => {
                    let args = self.parse_args()?;
                    Expr::Call { callee: boxed(expr), args }
                }
                Token::PlusPlus | Token::MinusMinus if expr.node.is_lvalue() => {
                    let op = if matches!(self.advance().node, Token::PlusPlus) { IncDec::PostInc } else { IncDec::PostDec };
                    Expr::IncDec { op, target: boxed(expr) }
                }
                _ => break,
            };
            expr = Spanned::new(node, self.span_from(start));
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Spanned<Expr>, Diagnostic> {
        let tok = self.peek();
        let start = tok.span;
        let node = match &tok.node {
            Token::Variable => Expr::Variable(self.expect_variable()?.node),
            Token::IntLit(n) => {
                self.advance();
                match *n {
                    Number::Int(v) => Expr::Literal(Literal::Int(v)),
                    Number::Float(v) => Expr::Literal(Literal::Float(v)),
                }
            }
            Token::FloatLit(v) => {
                self.advance();
                Expr::Literal(Literal::Float(*v))
            }
            Token::SingleString(raw) => {
                self.advance();
                Expr::Literal(Literal::String { raw: raw.clone(), quote: Quote::Single })
            }
            Token::DoubleString(parts) => {
                self.advance();
                self.parse_double_string(parts, tok.span)?
            }
            Token::True | Token::False => {
                self.advance();
                Expr::Literal(Literal::Bool(matches!(tok.node, Token::True)))
            }
            Token::Null => {
                self.advance();
                Expr::Literal(Literal::Null)
            }
            Token::Ident | Token::Backslash => Expr::Name(self.parse_qualified_name(false)?),
            Token::Static if !self.nth_is(1, &Token::Function) => {
                self.advance();
                Expr::Name(QualifiedName::simple("static"))
            }
            Token::LBracket => {
                self.advance();
                Expr::Array(self.parse_array_entries(&Token::RBracket)?)
            }
            Token::Array if self.nth_is(1, &Token::LParen) => {
                self.advance();
                self.advance();
                Expr::Array(self.parse_array_entries(&Token::RParen)?)
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                return Ok(inner);
            }
            Token::Isset => {
                self.advance();
                self.expect(&Token::LParen)?;
                let exprs = self.parse_expr_list(&Token::RParen)?;
                self.expect(&Token::RParen)?;
                Expr::Isset(exprs)
            }
            Token::Empty => {
                self.advance();
                Expr::Empty(boxed(self.parse_paren_expr()?))
            }
            Token::Exit => {
                self.advance();
                let code = if self.eat(&Token::LParen) {
                    let code = if self.at(&Token::RParen) { None } else { Some(boxed(self.parse_expr()?)) };
                    self.expect(&Token::RParen)?;
                    code
                } else {
                    None
                };
                Expr::Exit(code)
            }
            Token::New => return self.parse_new(),
            Token::Match => return self.parse_match(),
            Token::Function => return self.parse_closure(false),
            Token::Static => {
                self.advance();
                return self.parse_closure(true);
            }
            _ => return Err(self.unexpected(tok, &["expression"])),
        };
        Ok(Spanned::new(node, self.span_from(start)))
    }

    fn parse_double_string(&mut self, parts: &[StringPart], span: Span) -> Result<Expr, Diagnostic> {
        let has_exprs = parts.iter().any(|p| !matches!(p, StringPart::Lit(_)));
        if !has_exprs {
            let raw = self.text(span);
            let raw = raw.get(1..raw.len().saturating_sub(1)).unwrap_or("");
            return Ok(Expr::Literal(Literal::String { raw: raw.to_string(), quote: Quote::Double }));
        }

        let mut out = Vec::with_capacity(parts.len());
        for part in parts {
            match part {
                StringPart::Lit(text) => out.push(InterpPart::Lit(text.clone())),
                StringPart::Simple(tokens) | StringPart::Braced(tokens) => {
                    out.push(InterpPart::Expr(self.parse_embedded(tokens, span)?));
                }
            }
        }
        Ok(Expr::Interpolated(out))
    }

    /// Parse the tokens of one embedded expression with a nested parser.
    fn parse_embedded(&mut self, tokens: &[Spanned<Token>], string_span: Span) -> Result<Spanned<Expr>, Diagnostic> {
        let end = tokens.last().map_or(string_span, |t| t.span);
        let mut toks = tokens.to_vec();
        toks.push(Spanned::new(Token::Eof, Span { start: end.end, ..end }));

        let mut nested = Parser::new(&toks, self.source, self.options);
        nested.depth = self.depth;
        let expr = nested.parse_expr()?;
        if !nested.at(&Token::Eof) {
            let tok = nested.peek();
            return Err(Diagnostic::syntax(
                format!("unexpected {} in string interpolation", tok.node),
                tok.span,
            ));
        }
        Ok(expr)
    }

    /// Entries up to `close`, which is consumed.
    fn parse_array_entries(&mut self, close: &Token) -> Result<Vec<ArrayEntry>, Diagnostic> {
        let mut entries = Vec::new();
        while !self.at(close) {
            let entry = if self.eat(&Token::Ellipsis) {
                ArrayEntry { key: None, value: self.parse_expr()?, by_ref: false, spread: true }
            } else if self.eat(&Token::Amp) {
                ArrayEntry { key: None, value: self.parse_expr()?, by_ref: true, spread: false }
            } else {
                let first = self.parse_expr()?;
                if self.eat(&Token::FatArrow) {
                    let by_ref = self.eat(&Token::Amp);
                    ArrayEntry { key: Some(first), value: self.parse_expr()?, by_ref, spread: false }
                } else {
                    ArrayEntry { key: None, value: first, by_ref: false, spread: false }
                }
            };
            entries.push(entry);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(close)?;
        Ok(entries)
    }

    pub(super) fn parse_args(&mut self) -> Result<Vec<Arg>, Diagnostic> {
        self.expect(&Token::LParen)?;
        let mut args = Vec::new();
        while !self.at(&Token::RParen) {
            let spread = self.eat(&Token::Ellipsis);
            let named = !spread
                && self.nth_is(1, &Token::Colon)
                && (self.at(&Token::Ident) || self.peek().node.is_keyword());
            let name = if named {
                let name = self.expect_member_name()?;
                self.advance();
                Some(name.node)
            } else {
                None
            };
            let value = self.parse_expr()?;
            args.push(Arg { name, value, spread });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RParen)?;
        Ok(args)
    }

    /// Class operand of `new` and `instanceof`.
    fn parse_class_ref(&mut self) -> Result<Spanned<Expr>, Diagnostic> {
        let tok = self.peek();
        let node = match tok.node {
            Token::Ident | Token::Backslash => Expr::Name(self.parse_qualified_name(false)?),
            Token::Static => {
                self.advance();
                Expr::Name(QualifiedName::simple("static"))
            }
            Token::Variable => Expr::Variable(self.expect_variable()?.node),
            Token::LParen => return self.parse_paren_expr(),
            _ => return Err(self.unexpected(tok, &["class name"])),
        };
        Ok(Spanned::new(node, self.span_from(tok.span)))
    }

    fn parse_new(&mut self) -> Result<Spanned<Expr>, Diagnostic> {
        let new_tok = self.expect(&Token::New)?;
        let class = self.parse_class_ref()?;
        // `new Foo` and `new Foo()` are the same construction.
        let args = if self.at(&Token::LParen) { self.parse_args()? } else { Vec::new() };
        Ok(Spanned::new(Expr::New { class: boxed(class), args }, self.span_from(new_tok.span)))
    }

    fn parse_match(&mut self) -> Result<Spanned<Expr>, Diagnostic> {
        let match_tok = self.expect(&Token::Match)?;
        let subject = self.parse_paren_expr()?;
        self.expect(&Token::LBrace)?;
        let mut arms = Vec::new();
        while !self.at(&Token::RBrace) {
            let pattern = if self.eat(&Token::Default) {
                MatchPattern::Default
            } else {
                let mut values = vec![self.parse_expr()?];
                while self.eat(&Token::Comma) && !self.at(&Token::FatArrow) {
                    values.push(self.parse_expr()?);
                }
                MatchPattern::Values(values)
            };
            self.expect(&Token::FatArrow)?;
            let result = self.parse_expr()?;
            arms.push(MatchArm { pattern, result });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RBrace)?;
        Ok(Spanned::new(Expr::Match { subject: boxed(subject), arms }, self.span_from(match_tok.span)))
    }

    /// `function (...) use (...) { ... }`; `is_static` when `static` was consumed.
    fn parse_closure(&mut self, is_static: bool) -> Result<Spanned<Expr>, Diagnostic> {
        let start = if is_static { self.prev_span() } else { self.peek().span };
        self.expect(&Token::Function)?;
        let by_ref = self.eat(&Token::Amp);
        let params = self.parse_params()?;
        let mut uses = Vec::new();
        if self.eat(&Token::Use) {
            self.expect(&Token::LParen)?;
            while !self.at(&Token::RParen) {
                let by_ref = self.eat(&Token::Amp);
                let name = self.expect_variable()?.node;
                uses.push(ClosureUse { name, by_ref });
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(&Token::RParen)?;
        }
        let return_type = self.parse_return_type()?;
        let body = self.parse_block()?;
        let closure = Closure { is_static, by_ref, params, uses, return_type, body };
        Ok(Spanned::new(Expr::Closure(Box::new(closure)), self.span_from(start)))
    }

    /// `fn (...) => expr`; `is_static` when `static` was consumed.
    fn parse_arrow_fn(&mut self, is_static: bool) -> Result<Spanned<Expr>, Diagnostic> {
        let start = if is_static { self.prev_span() } else { self.peek().span };
        self.expect(&Token::Fn)?;
        let params = self.parse_params()?;
        let return_type = self.parse_return_type()?;
        self.expect(&Token::FatArrow)?;
        let body = self.parse_expr_bp(prec::ASSIGN)?;
        Ok(Spanned::new(
            Expr::ArrowFn { is_static, params, return_type, body: boxed(body) },
            self.span_from(start),
        ))
    }
}
