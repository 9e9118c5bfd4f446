//! Declaration parsing: functions, externs, macros, structs, impls,
//! traits, enums, type aliases, imports — and type expressions.

use wyn_common::token::TokenKind;

use crate::ast::{
    EnumDecl, EnumVariant, ExternDecl, FnDecl, ImplDecl, Param, Stmt, StmtKind, StructDecl,
    TraitDecl, TraitMethod, TypeExpr, TypeExprKind,
};

use super::Parser;

impl<'src> Parser<'src> {
    /// `pub fn …`, `pub struct …`, or a plain `fn …`.
    pub(crate) fn parse_fn_or_decl(&mut self) -> Stmt {
        let is_public = self.eat(TokenKind::Pub);
        match self.peek() {
            TokenKind::Struct | TokenKind::Object => {
                let mut stmt = self.parse_struct();
                if let StmtKind::Struct(ref mut decl) = stmt.kind {
                    decl.is_public = is_public;
                }
                stmt
            }
            _ => {
                let start = self.current().span;
                let decl = self.parse_fn_decl(is_public);
                let end = decl.body.as_ref().map(|b| b.span).unwrap_or(decl.name_span);
                Stmt {
                    span: start.merge(end),
                    kind: StmtKind::Fn(decl),
                }
            }
        }
    }

    /// Parse a `fn` declaration. The `fn` keyword is still in the stream.
    pub(crate) fn parse_fn_decl(&mut self, is_public: bool) -> FnDecl {
        self.expect(TokenKind::Fn, "`fn`");

        // Extension receiver: `fn (self: TypeName) name(...)`.
        let receiver = if self.at(TokenKind::LParen) && self.peek_nth(1) == TokenKind::SelfKw {
            self.bump(); // (
            self.bump(); // self
            self.expect(TokenKind::Colon, "`:` after `self`");
            let (ty_name, ty_span) = self.expect_ident("a receiver type name");
            self.expect(TokenKind::RParen, "`)` after receiver");
            Some((ty_name, ty_span))
        } else {
            None
        };

        let (name, name_span) = self.expect_ident("a function name");

        let generics = self.parse_generic_params();

        self.expect(TokenKind::LParen, "`(` after function name");
        let (params, is_variadic) = self.parse_params();
        self.expect(TokenKind::RParen, "`)` after parameters");

        let ret = if self.eat(TokenKind::Arrow) {
            Some(self.parse_type_expr())
        } else {
            None
        };

        let body = if self.at(TokenKind::LBrace) {
            Some(Box::new(self.parse_block_stmt()))
        } else {
            None
        };

        FnDecl {
            name,
            name_span,
            generics,
            params,
            ret,
            body,
            is_public,
            receiver,
            is_variadic,
        }
    }

    /// `<T, U>` after a declaration name; empty when absent.
    pub(crate) fn parse_generic_params(&mut self) -> Vec<String> {
        let mut generics = Vec::new();
        if self.eat(TokenKind::Lt) {
            loop {
                let (name, _) = self.expect_ident("a type parameter name");
                if !name.is_empty() {
                    generics.push(name);
                }
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::Gt, "`>` to close type parameters");
        }
        generics
    }

    /// Comma-separated parameters; trailing `...` marks a variadic tail.
    fn parse_params(&mut self) -> (Vec<Param>, bool) {
        let mut params = Vec::new();
        let mut is_variadic = false;
        while !self.at(TokenKind::RParen) && !self.at_eof() {
            if self.eat(TokenKind::DotDotDot) {
                is_variadic = true;
                break;
            }
            // Impl and trait methods take `self` as their first parameter.
            let (name, span) = if self.at(TokenKind::SelfKw) {
                let tok = self.bump();
                ("self".to_string(), tok.span)
            } else {
                self.expect_ident("a parameter name")
            };
            let ty = if self.eat(TokenKind::Colon) {
                Some(self.parse_type_expr())
            } else {
                None
            };
            let default = if self.eat(TokenKind::Eq) {
                Some(self.parse_expr())
            } else {
                None
            };
            params.push(Param { name, span, ty, default });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        (params, is_variadic)
    }

    pub(crate) fn parse_extern(&mut self) -> Stmt {
        let start = self.expect(TokenKind::Extern, "`extern`").span;
        self.expect(TokenKind::Fn, "`fn` after `extern`");
        let (name, name_span) = self.expect_ident("an extern function name");
        self.expect(TokenKind::LParen, "`(` after extern name");

        let mut params = Vec::new();
        let mut is_variadic = false;
        while !self.at(TokenKind::RParen) && !self.at_eof() {
            if self.eat(TokenKind::DotDotDot) {
                is_variadic = true;
                break;
            }
            // Optional `name:` prefix before the type.
            if self.at(TokenKind::Ident) && self.peek_nth(1) == TokenKind::Colon {
                self.bump();
                self.bump();
            }
            params.push(self.parse_type_expr());
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let mut end = self.expect(TokenKind::RParen, "`)` after extern parameters").span;

        let ret = if self.eat(TokenKind::Arrow) {
            let ty = self.parse_type_expr();
            end = ty.span;
            Some(ty)
        } else {
            None
        };

        Stmt {
            span: start.merge(end),
            kind: StmtKind::Extern(ExternDecl { name, name_span, params, ret, is_variadic }),
        }
    }

    pub(crate) fn parse_macro(&mut self) -> Stmt {
        let start = self.expect(TokenKind::Macro, "`macro`").span;
        let (name, name_span) = self.expect_ident("a macro name");
        self.expect(TokenKind::LParen, "`(` after macro name");
        let mut params = Vec::new();
        while !self.at(TokenKind::RParen) && !self.at_eof() {
            let (param, _) = self.expect_ident("a macro parameter");
            params.push(param);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "`)` after macro parameters");
        let body = Box::new(self.parse_block_stmt());
        let span = start.merge(body.span);
        Stmt {
            span,
            kind: StmtKind::Macro { name, name_span, params, body },
        }
    }

    /// `struct Name<T> { field: Type, ... }`; `object` is a synonym.
    pub(crate) fn parse_struct(&mut self) -> Stmt {
        let start = if self.at(TokenKind::Object) {
            self.bump().span
        } else {
            self.expect(TokenKind::Struct, "`struct`").span
        };
        let (name, name_span) = self.expect_ident("a struct name");
        let generics = self.parse_generic_params();

        self.expect(TokenKind::LBrace, "`{` to open struct body");
        let mut fields = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at_eof() {
            let (field, field_span) = self.expect_ident("a field name");
            self.expect(TokenKind::Colon, "`:` after field name");
            let ty = self.parse_type_expr();
            fields.push((field, field_span, ty));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(TokenKind::RBrace, "`}` to close struct body").span;

        Stmt {
            span: start.merge(end),
            kind: StmtKind::Struct(StructDecl {
                name,
                name_span,
                generics,
                fields,
                is_public: false,
            }),
        }
    }

    pub(crate) fn parse_impl(&mut self) -> Stmt {
        let start = self.expect(TokenKind::Impl, "`impl`").span;
        let (target, target_span) = self.expect_ident("a type name after `impl`");
        self.expect(TokenKind::LBrace, "`{` to open impl body");
        let mut methods = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at_eof() {
            let is_public = self.eat(TokenKind::Pub);
            if self.at(TokenKind::Fn) {
                methods.push(self.parse_fn_decl(is_public));
            } else {
                let tok = self.bump();
                self.error("expected a method in impl block", tok.span);
            }
        }
        let end = self.expect(TokenKind::RBrace, "`}` to close impl body").span;
        Stmt {
            span: start.merge(end),
            kind: StmtKind::Impl(ImplDecl { target, target_span, methods }),
        }
    }

    pub(crate) fn parse_trait(&mut self) -> Stmt {
        let start = self.expect(TokenKind::Trait, "`trait`").span;
        let (name, name_span) = self.expect_ident("a trait name");
        self.expect(TokenKind::LBrace, "`{` to open trait body");
        let mut methods = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at_eof() {
            if self.at(TokenKind::Fn) {
                let decl = self.parse_fn_decl(false);
                let has_default = decl.body.is_some();
                methods.push(TraitMethod { decl, has_default });
            } else {
                let tok = self.bump();
                self.error("expected a method signature in trait", tok.span);
            }
        }
        let end = self.expect(TokenKind::RBrace, "`}` to close trait body").span;
        Stmt {
            span: start.merge(end),
            kind: StmtKind::Trait(TraitDecl { name, name_span, methods }),
        }
    }

    pub(crate) fn parse_enum(&mut self) -> Stmt {
        let start = self.expect(TokenKind::Enum, "`enum`").span;
        let (name, name_span) = self.expect_ident("an enum name");
        self.expect(TokenKind::LBrace, "`{` to open enum body");

        let mut variants = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at_eof() {
            let (vname, vspan) = self.expect_ident("a variant name");
            let mut fields = Vec::new();
            if self.eat(TokenKind::LParen) {
                while !self.at(TokenKind::RParen) && !self.at_eof() {
                    fields.push(self.parse_type_expr());
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RParen, "`)` after variant data");
            }
            variants.push(EnumVariant { name: vname, span: vspan, fields });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(TokenKind::RBrace, "`}` to close enum body").span;

        Stmt {
            span: start.merge(end),
            kind: StmtKind::Enum(EnumDecl { name, name_span, variants }),
        }
    }

    pub(crate) fn parse_type_alias(&mut self) -> Stmt {
        let start = self.expect(TokenKind::Type, "`type`").span;
        let (name, name_span) = self.expect_ident("an alias name");
        self.expect(TokenKind::Eq, "`=` after alias name");
        let aliased = self.parse_type_expr();
        let span = start.merge(aliased.span);
        Stmt {
            span,
            kind: StmtKind::TypeAlias { name, name_span, aliased },
        }
    }

    /// `import a::b::c [as alias]`
    pub(crate) fn parse_import(&mut self) -> Stmt {
        let start = self.expect(TokenKind::Import, "`import`").span;
        let (first, first_span) = self.expect_ident("a module path");
        let mut path = first;
        let mut end = first_span;
        while self.eat(TokenKind::ColonColon) {
            let (seg, seg_span) = self.expect_ident("a module path segment");
            path.push_str("::");
            path.push_str(&seg);
            end = seg_span;
        }
        let path_span = first_span.merge(end);

        let alias = if self.eat(TokenKind::As) {
            let (alias, alias_span) = self.expect_ident("an import alias");
            end = alias_span;
            Some(alias)
        } else {
            None
        };

        Stmt {
            span: start.merge(end),
            kind: StmtKind::Import { path, path_span, alias },
        }
    }

    // ── Type expressions ───────────────────────────────────────────────

    /// Parse a type expression, including `|` unions and `?` optionals.
    pub(crate) fn parse_type_expr(&mut self) -> TypeExpr {
        let first = self.parse_type_postfix();

        if !self.at(TokenKind::Pipe) {
            return first;
        }

        let mut members = vec![first];
        while self.eat(TokenKind::Pipe) {
            members.push(self.parse_type_postfix());
        }
        let span = members
            .first()
            .map(|t| t.span)
            .unwrap_or_else(|| self.current().span)
            .merge(members.last().map(|t| t.span).unwrap_or_else(|| self.current().span));
        TypeExpr {
            span,
            kind: TypeExprKind::Union(members),
        }
    }

    /// A primary type with trailing `?` markers.
    fn parse_type_postfix(&mut self) -> TypeExpr {
        let mut ty = self.parse_type_primary();
        while self.at(TokenKind::Question) {
            let q = self.bump().span;
            let span = ty.span.merge(q);
            ty = TypeExpr {
                span,
                kind: TypeExprKind::Optional(Box::new(ty)),
            };
        }
        ty
    }

    fn parse_type_primary(&mut self) -> TypeExpr {
        match self.peek() {
            // `[T]`
            TokenKind::LBracket => {
                let start = self.bump().span;
                let elem = self.parse_type_expr();
                let end = self.expect(TokenKind::RBracket, "`]` to close array type").span;
                TypeExpr {
                    span: start.merge(end),
                    kind: TypeExprKind::Array(Box::new(elem)),
                }
            }
            // `fn(T1, T2) -> R`
            TokenKind::Fn => {
                let start = self.bump().span;
                self.expect(TokenKind::LParen, "`(` in function type");
                let mut params = Vec::new();
                while !self.at(TokenKind::RParen) && !self.at_eof() {
                    params.push(self.parse_type_expr());
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RParen, "`)` in function type");
                self.expect(TokenKind::Arrow, "`->` in function type");
                let ret = self.parse_type_postfix();
                let span = start.merge(ret.span);
                TypeExpr {
                    span,
                    kind: TypeExprKind::Function {
                        params,
                        ret: Box::new(ret),
                    },
                }
            }
            // Named type, possibly with generic arguments.
            TokenKind::Ident => {
                let tok = self.bump();
                let name = self.text(tok).to_string();
                let mut span = tok.span;
                let mut args = Vec::new();
                if self.at(TokenKind::Lt) && self.type_args_follow() {
                    self.bump();
                    while !self.at(TokenKind::Gt) && !self.at_eof() {
                        args.push(self.parse_type_expr());
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                    span = span.merge(self.expect(TokenKind::Gt, "`>` to close type arguments").span);
                }
                TypeExpr {
                    span,
                    kind: TypeExprKind::Named { name, args },
                }
            }
            _ => {
                let tok = self.current();
                self.error("expected a type", tok.span);
                TypeExpr {
                    span: tok.span,
                    kind: TypeExprKind::Named { name: "Int".into(), args: Vec::new() },
                }
            }
        }
    }

    /// In type position a `<` always begins a type-argument list; this
    /// exists so callers reading from expression context can ask first.
    fn type_args_follow(&self) -> bool {
        // After `<` a type argument starts with an identifier, `[`, or `fn`.
        matches!(
            self.peek_nth(1),
            TokenKind::Ident | TokenKind::LBracket | TokenKind::Fn
        )
    }
}
