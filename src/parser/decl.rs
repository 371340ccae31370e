use super::ast::*;
use super::Parser;
use crate::diagnostics::{Diagnostic, StructuralKind};
use crate::lexer::token::Token;
use crate::span::{Span, Spanned};

/// Modifier keywords collected ahead of a class member.
#[derive(Default)]
struct MemberModifiers {
    visibility: Option<Visibility>,
    is_static: bool,
    is_abstract: bool,
    is_final: bool,
    readonly: bool,
    /// Span of the first modifier, if any.
    start: Option<Span>,
}

impl<'a> Parser<'a> {
    /// `function name(` or `function &name(`, as opposed to a closure.
    pub(super) fn is_function_decl(&self) -> bool {
        match self.peek_nth(1) {
            Token::Ident => true,
            Token::Amp => self.nth_is(2, &Token::Ident),
            _ => false,
        }
    }

    pub(super) fn parse_function_decl(&mut self) -> Result<Spanned<Stmt>, Diagnostic> {
        let fn_tok = self.expect(&Token::Function)?;
        let by_ref = self.eat(&Token::Amp);
        let name = self.expect_ident()?;
        let params = self.parse_params()?;
        let return_type = self.parse_return_type()?;
        let body = self.parse_block()?;
        let sig = Signature { name, by_ref, params, return_type };
        Ok(Spanned::new(Stmt::Function(FunctionDecl { sig, body }), self.span_from(fn_tok.span)))
    }

    pub(super) fn parse_params(&mut self) -> Result<Vec<Param>, Diagnostic> {
        self.expect(&Token::LParen)?;
        let mut params = Vec::new();
        while !self.at(&Token::RParen) {
            let mut promote = None;
            let mut readonly = false;
            loop {
                match self.peek().node {
                    Token::Public => promote = Some(Visibility::Public),
                    Token::Protected => promote = Some(Visibility::Protected),
                    Token::Private => promote = Some(Visibility::Private),
                    Token::Readonly => readonly = true,
                    _ => break,
                }
                self.advance();
            }
            let ty = match self.peek().node {
                Token::Variable | Token::Amp | Token::Ellipsis => None,
                _ => Some(self.parse_type()?),
            };
            let by_ref = self.eat(&Token::Amp);
            let variadic = self.eat(&Token::Ellipsis);
            let name = self.expect_variable()?;
            let default = if self.eat(&Token::Eq) { Some(self.parse_expr()?) } else { None };
            params.push(Param { name, ty, default, by_ref, variadic, promote, readonly });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RParen)?;
        Ok(params)
    }

    pub(super) fn parse_return_type(&mut self) -> Result<Option<Spanned<TypeNode>>, Diagnostic> {
        if self.eat(&Token::Colon) { Ok(Some(self.parse_type()?)) } else { Ok(None) }
    }

    /// `T`, `?T` or `A|B|...`.
    pub(super) fn parse_type(&mut self) -> Result<Spanned<TypeNode>, Diagnostic> {
        let start = self.peek().span;
        if self.eat(&Token::Question) {
            let inner = self.parse_named_type()?;
            return Ok(Spanned::new(TypeNode::Nullable(Box::new(inner)), self.span_from(start)));
        }
        let first = self.parse_named_type()?;
        if !self.at(&Token::Pipe) {
            return Ok(Spanned::new(first, self.span_from(start)));
        }
        let mut alternatives = vec![first];
        while self.eat(&Token::Pipe) {
            if self.at(&Token::Question) {
                return Err(Diagnostic::expected(
                    "a nullable type cannot be part of a union; add 'null' as an alternative",
                    self.peek().span,
                    &["type name"],
                ));
            }
            alternatives.push(self.parse_named_type()?);
        }
        Ok(Spanned::new(TypeNode::Union(alternatives), self.span_from(start)))
    }

    fn parse_named_type(&mut self) -> Result<TypeNode, Diagnostic> {
        let tok = self.peek();
        let builtin = match tok.node {
            Token::Array => Some("array"),
            Token::Static => Some("static"),
            Token::Null => Some("null"),
            Token::False => Some("false"),
            Token::True => Some("true"),
            _ => None,
        };
        if let Some(name) = builtin {
            self.advance();
            return Ok(TypeNode::Named(QualifiedName::simple(name)));
        }
        match tok.node {
            Token::Ident | Token::Backslash => Ok(TypeNode::Named(self.parse_qualified_name(false)?)),
            _ => Err(self.unexpected(tok, &["type name"])),
        }
    }

    /// `Foo`, `A\B\C` or `\A\B`. A group-use `\{` is left unconsumed.
    /// Keyword segments are accepted after a separator, and anywhere when
    /// `allow_keywords` is set.
    pub(super) fn parse_qualified_name(&mut self, allow_keywords: bool) -> Result<QualifiedName, Diagnostic> {
        let fully_qualified = self.eat(&Token::Backslash);
        let mut parts = vec![self.name_segment(allow_keywords || fully_qualified)?];
        while self.at(&Token::Backslash) && !self.nth_is(1, &Token::LBrace) {
            self.advance();
            parts.push(self.name_segment(true)?);
        }
        Ok(QualifiedName { parts, fully_qualified })
    }

    fn name_segment(&mut self, allow_keywords: bool) -> Result<String, Diagnostic> {
        if allow_keywords {
            Ok(self.expect_member_name()?.node)
        } else {
            Ok(self.expect_ident()?.node)
        }
    }

    pub(super) fn parse_namespace(&mut self) -> Result<Spanned<Stmt>, Diagnostic> {
        let ns_tok = self.expect(&Token::Namespace)?;
        let name = if self.at(&Token::LBrace) { None } else { Some(self.parse_qualified_name(true)?) };
        let body = if self.at(&Token::LBrace) || name.is_none() {
            Some(self.parse_block()?.node)
        } else {
            self.expect_stmt_end()?;
            None
        };
        Ok(Spanned::new(Stmt::Namespace { name, body }, self.span_from(ns_tok.span)))
    }

    fn parse_use_kind(&mut self) -> UseKind {
        if self.eat(&Token::Function) {
            UseKind::Function
        } else if self.eat(&Token::Const) {
            UseKind::Const
        } else {
            UseKind::Class
        }
    }

    fn parse_use_alias(&mut self, path: &QualifiedName) -> Result<String, Diagnostic> {
        if self.eat(&Token::As) {
            Ok(self.expect_member_name()?.node)
        } else {
            Ok(path.last().to_string())
        }
    }

    /// `use` statement, flattened into one [`Stmt::Use`] per imported symbol.
    pub(super) fn parse_use(&mut self, out: &mut Vec<Spanned<Stmt>>) -> Result<(), Diagnostic> {
        self.expect(&Token::Use)?;
        let stmt_kind = self.parse_use_kind();
        loop {
            let clause_start = self.peek().span;
            let kind = match self.parse_use_kind() {
                UseKind::Class => stmt_kind,
                explicit => explicit,
            };
            let prefix = self.parse_qualified_name(true)?;

            if self.at(&Token::Backslash) && self.nth_is(1, &Token::LBrace) {
                self.advance();
                self.advance();
                while !self.at(&Token::RBrace) {
                    let item_start = self.peek().span;
                    let item_kind = match self.parse_use_kind() {
                        UseKind::Class => kind,
                        explicit => explicit,
                    };
                    let suffix = self.parse_qualified_name(true)?;
                    let mut parts = prefix.parts.clone();
                    parts.extend(suffix.parts);
                    let path = QualifiedName { parts, fully_qualified: prefix.fully_qualified };
                    let alias = self.parse_use_alias(&path)?;
                    let import = UseImport { kind: item_kind, path, alias };
                    out.push(Spanned::new(Stmt::Use(import), self.span_from(item_start)));
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
                self.expect(&Token::RBrace)?;
            } else {
                let alias = self.parse_use_alias(&prefix)?;
                let import = UseImport { kind, path: prefix, alias };
                out.push(Spanned::new(Stmt::Use(import), self.span_from(clause_start)));
            }

            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect_stmt_end()
    }

    pub(super) fn parse_class(&mut self) -> Result<Spanned<Stmt>, Diagnostic> {
        let start = self.peek().span;
        let mut modifiers = ClassModifiers::default();
        loop {
            match self.peek().node {
                Token::Abstract => modifiers.is_abstract = true,
                Token::Final => modifiers.is_final = true,
                Token::Readonly => modifiers.is_readonly = true,
                _ => break,
            }
            self.advance();
        }
        self.expect(&Token::Class)?;
        let name = self.expect_ident()?;

        let extends = if self.eat(&Token::Extends) { Some(self.parse_spanned_name()?) } else { None };
        let mut implements = Vec::new();
        if self.eat(&Token::Implements) {
            loop {
                implements.push(self.parse_spanned_name()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }

        let open = self.expect(&Token::LBrace)?;
        self.enter(open.span)?;
        let mut members = Vec::new();
        while !self.at(&Token::RBrace) {
            if self.at(&Token::Eof) {
                return Err(self.unexpected(self.peek(), &["'}'"]));
            }
            self.parse_member_into(&mut members)?;
        }
        self.expect(&Token::RBrace)?;
        self.leave();

        let decl = ClassDecl { name, modifiers, extends, implements, members };
        Ok(Spanned::new(Stmt::Class(decl), self.span_from(start)))
    }

    fn parse_spanned_name(&mut self) -> Result<Spanned<QualifiedName>, Diagnostic> {
        let start = self.peek().span;
        let name = self.parse_qualified_name(false)?;
        Ok(Spanned::new(name, self.span_from(start)))
    }

    fn parse_member_modifiers(&mut self) -> MemberModifiers {
        let mut mods = MemberModifiers::default();
        loop {
            let tok = self.peek();
            match tok.node {
                Token::Public | Token::Var => mods.visibility = Some(Visibility::Public),
                Token::Protected => mods.visibility = Some(Visibility::Protected),
                Token::Private => mods.visibility = Some(Visibility::Private),
                Token::Static => mods.is_static = true,
                Token::Abstract => mods.is_abstract = true,
                Token::Final => mods.is_final = true,
                Token::Readonly => mods.readonly = true,
                _ => break,
            }
            mods.start.get_or_insert(tok.span);
            self.advance();
        }
        mods
    }

    fn parse_member_into(&mut self, out: &mut Vec<Spanned<ClassMember>>) -> Result<(), Diagnostic> {
        if self.eat(&Token::Semicolon) {
            return Ok(());
        }
        let first = self.peek().span;
        let mods = self.parse_member_modifiers();
        let start = mods.start.unwrap_or(first);

        match self.peek().node {
            Token::Const => {
                self.advance();
                let items = self.parse_const_items()?;
                self.expect(&Token::Semicolon)?;
                let member = ClassMember::Const { visibility: mods.visibility, items };
                out.push(Spanned::new(member, self.span_from(start)));
            }
            Token::Function => {
                let method = self.parse_method(&mods)?;
                out.push(Spanned::new(ClassMember::Method(method), self.span_from(start)));
            }
            _ => {
                if mods.is_abstract || mods.is_final {
                    return Err(Diagnostic::syntax("properties cannot be abstract or final", start));
                }
                self.parse_properties_into(&mods, start, out)?;
            }
        }
        Ok(())
    }

    fn parse_method(&mut self, mods: &MemberModifiers) -> Result<MethodDecl, Diagnostic> {
        self.expect(&Token::Function)?;
        let by_ref = self.eat(&Token::Amp);
        let name = self.expect_member_name()?;
        let params = self.parse_params()?;
        let return_type = self.parse_return_type()?;
        let body = if self.eat(&Token::Semicolon) { None } else { Some(self.parse_block()?) };
        let modifiers = MethodModifiers {
            visibility: mods.visibility,
            is_static: mods.is_static,
            is_abstract: mods.is_abstract,
            is_final: mods.is_final,
        };
        Ok(MethodDecl { modifiers, sig: Signature { name, by_ref, params, return_type }, body })
    }

    /// `[type] $a [= x], $b;` or a single property with a hook block.
    fn parse_properties_into(
        &mut self,
        mods: &MemberModifiers,
        start: Span,
        out: &mut Vec<Spanned<ClassMember>>,
    ) -> Result<(), Diagnostic> {
        let ty = if self.at(&Token::Variable) { None } else { Some(self.parse_type()?) };
        loop {
            let name = self.expect_variable()?;
            let default = if self.eat(&Token::Eq) { Some(self.parse_expr()?) } else { None };
            let hook = if self.at(&Token::LBrace) { Some(self.parse_property_hook()?) } else { None };
            let has_hook = hook.is_some();
            let decl = PropertyDecl {
                visibility: mods.visibility,
                is_static: mods.is_static,
                readonly: mods.readonly,
                ty: ty.clone(),
                name,
                default,
                hook,
            };
            out.push(Spanned::new(ClassMember::Property(decl), self.span_from(start)));
            if has_hook {
                return Ok(());
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::Semicolon)?;
        Ok(())
    }

    fn parse_property_hook(&mut self) -> Result<PropertyHook, Diagnostic> {
        let open = self.expect(&Token::LBrace)?;
        let mut getter = None;
        let mut setter = None;

        while !self.at(&Token::RBrace) {
            let tok = self.peek();
            if !matches!(tok.node, Token::Ident) {
                return Err(self.unexpected(tok, &["'get'", "'set'", "'}'"]));
            }
            let name = self.text(tok.span).to_ascii_lowercase();
            self.advance();
            match name.as_str() {
                "get" => {
                    if getter.is_some() {
                        return Err(malformed_hook("duplicate 'get' hook", tok.span));
                    }
                    let body = self.parse_hook_body()?;
                    getter = Some(Spanned::new(body, self.span_from(tok.span)));
                }
                "set" => {
                    if setter.is_some() {
                        return Err(malformed_hook("duplicate 'set' hook", tok.span));
                    }
                    let (param, param_type) = if self.eat(&Token::LParen) {
                        let param_type = if self.at(&Token::Variable) { None } else { Some(self.parse_type()?) };
                        let param = self.expect_variable()?.node;
                        self.expect(&Token::RParen)?;
                        (param, param_type)
                    } else {
                        ("value".to_string(), None)
                    };
                    let body = self.parse_hook_body()?;
                    let hook = SetHook { param, param_type, body };
                    setter = Some(Spanned::new(hook, self.span_from(tok.span)));
                }
                other => {
                    return Err(malformed_hook(format!("unknown property hook '{other}'"), tok.span));
                }
            }
        }
        self.expect(&Token::RBrace)?;

        if getter.is_none() && setter.is_none() {
            return Err(malformed_hook("property hook list is empty", self.span_from(open.span)));
        }
        Ok(PropertyHook { getter, setter })
    }

    /// `=> expr;` or `{ ... }`.
    fn parse_hook_body(&mut self) -> Result<HookBody, Diagnostic> {
        if self.eat(&Token::FatArrow) {
            let expr = self.parse_expr()?;
            self.expect(&Token::Semicolon)?;
            return Ok(HookBody::Expr(expr));
        }
        if self.at(&Token::LBrace) {
            return Ok(HookBody::Block(self.parse_block()?.node));
        }
        Err(self.unexpected(self.peek(), &["'=>'", "'{'"]))
    }
}

fn malformed_hook(msg: impl Into<String>, span: Span) -> Diagnostic {
    Diagnostic::structural(StructuralKind::MalformedPropertyHook, msg, span)
}
