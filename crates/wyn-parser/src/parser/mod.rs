//! Parser core: token bookkeeping, statement dispatch, and the simple
//! statement forms. Declarations live in `items`, expression parsing in
//! `expressions`, patterns in `patterns`.

mod expressions;
mod items;
mod patterns;

use wyn_common::span::Span;
use wyn_common::token::{Token, TokenKind};

use crate::ast::{
    CatchClause, Expr, ExprId, ExprKind, Program, Stmt, StmtKind, VarBinding,
};
use crate::error::ParseError;

pub(crate) struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<ParseError>,
    next_id: u32,
    /// When true, `Name { ... }` is not parsed as a struct initializer.
    /// Set while parsing conditions and match scrutinees, where a brace
    /// begins the body instead.
    pub(crate) no_struct: bool,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(source: &'src str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            errors: Vec::new(),
            next_id: 0,
            no_struct: false,
        }
    }

    pub(crate) fn finish(self) -> (Vec<ParseError>, u32) {
        (self.errors, self.next_id)
    }

    // ── Token helpers ──────────────────────────────────────────────────

    pub(crate) fn current(&self) -> Token {
        self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek(&self) -> TokenKind {
        self.current().kind
    }

    pub(crate) fn peek_nth(&self, n: usize) -> TokenKind {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        self.tokens[idx].kind
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.at(TokenKind::Eof)
    }

    pub(crate) fn bump(&mut self) -> Token {
        let tok = self.current();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume a token of the given kind, or report an error and leave
    /// the stream untouched so the caller can recover.
    pub(crate) fn expect(&mut self, kind: TokenKind, what: &str) -> Token {
        if self.at(kind) {
            return self.bump();
        }
        let tok = self.current();
        self.error(format!("expected {what}"), tok.span);
        tok
    }

    pub(crate) fn text(&self, token: Token) -> &'src str {
        token.text(self.source)
    }

    pub(crate) fn error(&mut self, message: impl Into<String>, span: Span) {
        self.errors.push(ParseError::new(message, span));
    }

    /// Allocate the next expression id.
    pub(crate) fn fresh_id(&mut self) -> ExprId {
        let id = ExprId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn mk_expr(&mut self, kind: ExprKind, span: Span) -> Expr {
        Expr {
            id: self.fresh_id(),
            span,
            kind,
        }
    }

    /// An `Int 0` placeholder expression used after a parse error.
    pub(crate) fn error_expr(&mut self, span: Span) -> Expr {
        self.mk_expr(ExprKind::IntLit(0), span)
    }

    /// Consume an identifier token and return its text.
    pub(crate) fn expect_ident(&mut self, what: &str) -> (String, Span) {
        if self.at(TokenKind::Ident) {
            let tok = self.bump();
            (self.text(tok).to_string(), tok.span)
        } else {
            let tok = self.current();
            self.error(format!("expected {what}"), tok.span);
            (String::new(), tok.span)
        }
    }

    /// Skip tokens until a likely statement start, for error recovery.
    fn synchronize(&mut self) {
        use TokenKind::*;
        while !self.at_eof() {
            match self.peek() {
                Fn | Var | Const | Struct | Object | Enum | Impl | Trait | Import | Export
                | Extern | Macro | Return | If | While | For | Match | Try | Type | Pub
                | RBrace => return,
                _ => {
                    self.bump();
                }
            }
        }
    }

    // ── Program and statements ─────────────────────────────────────────

    pub(crate) fn parse_program(&mut self) -> Program {
        let mut stmts = Vec::new();
        while !self.at_eof() {
            let before = self.pos;
            stmts.push(self.parse_stmt());
            while self.eat(TokenKind::Semicolon) {}
            if self.pos == before {
                // No progress; drop the offending token to avoid looping.
                let tok = self.bump();
                self.error("unexpected token", tok.span);
                self.synchronize();
            }
        }
        Program { stmts }
    }

    pub(crate) fn parse_stmt(&mut self) -> Stmt {
        use TokenKind::*;
        match self.peek() {
            Var => self.parse_var(),
            Const => self.parse_const(),
            Return => self.parse_return(),
            LBrace => self.parse_block_stmt(),
            If => self.parse_if(),
            While => self.parse_while(),
            For => self.parse_for(),
            Fn | Pub => self.parse_fn_or_decl(),
            Extern => self.parse_extern(),
            Macro => self.parse_macro(),
            Struct | Object => self.parse_struct(),
            Impl => self.parse_impl(),
            Trait => self.parse_trait(),
            Enum => self.parse_enum(),
            Type => self.parse_type_alias(),
            Import => self.parse_import(),
            Export => self.parse_export(),
            Match => self.parse_match_stmt(),
            Try => self.parse_try(),
            Throw => self.parse_throw(),
            Break => {
                let tok = self.bump();
                Stmt { span: tok.span, kind: StmtKind::Break }
            }
            Continue => {
                let tok = self.bump();
                Stmt { span: tok.span, kind: StmtKind::Continue }
            }
            Defer => {
                let start = self.bump().span;
                let expr = self.parse_expr();
                let span = start.merge(expr.span);
                Stmt { span, kind: StmtKind::Defer(expr) }
            }
            Unsafe => {
                let start = self.bump().span;
                let body = self.parse_block_stmt();
                let span = start.merge(body.span);
                Stmt { span, kind: StmtKind::Unsafe(Box::new(body)) }
            }
            Test => self.parse_test(),
            Spawn => {
                let start = self.bump().span;
                let expr = self.parse_expr();
                let span = start.merge(expr.span);
                Stmt { span, kind: StmtKind::Spawn(expr) }
            }
            _ => {
                let expr = self.parse_expr();
                let span = expr.span;
                Stmt { span, kind: StmtKind::Expr(expr) }
            }
        }
    }

    fn parse_var(&mut self) -> Stmt {
        let start = self.expect(TokenKind::Var, "`var`").span;

        let binding = if self.at(TokenKind::LParen) || self.at(TokenKind::LBracket) {
            VarBinding::Pattern(self.parse_pattern())
        } else {
            let (name, span) = self.expect_ident("a variable name");
            VarBinding::Name(name, span)
        };

        let ty = if self.eat(TokenKind::Colon) {
            Some(self.parse_type_expr())
        } else {
            None
        };

        let init = if self.eat(TokenKind::Eq) {
            Some(self.parse_expr())
        } else {
            None
        };

        let end = init
            .as_ref()
            .map(|e| e.span)
            .or_else(|| ty.as_ref().map(|t| t.span))
            .unwrap_or(start);
        Stmt {
            span: start.merge(end),
            kind: StmtKind::Var { binding, ty, init },
        }
    }

    fn parse_const(&mut self) -> Stmt {
        let start = self.expect(TokenKind::Const, "`const`").span;
        let (name, name_span) = self.expect_ident("a constant name");
        self.expect(TokenKind::Eq, "`=` after constant name");
        let init = self.parse_expr();
        let span = start.merge(init.span);
        Stmt {
            span,
            kind: StmtKind::Const { name, name_span, init },
        }
    }

    fn parse_return(&mut self) -> Stmt {
        use TokenKind::*;
        let start = self.expect(Return, "`return`").span;
        // `return` with no value: next token cannot start an expression.
        let value = match self.peek() {
            RBrace | Eof | Semicolon | Var | Const | If | While | For | Fn | Struct | Enum
            | Import | Export | Match | Try | Throw | Break | Continue | Return => None,
            _ => Some(self.parse_expr()),
        };
        let span = value.as_ref().map(|e| start.merge(e.span)).unwrap_or(start);
        Stmt {
            span,
            kind: StmtKind::Return(value),
        }
    }

    pub(crate) fn parse_block_stmt(&mut self) -> Stmt {
        let start = self.expect(TokenKind::LBrace, "`{`").span;
        let mut stmts = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at_eof() {
            let before = self.pos;
            stmts.push(self.parse_stmt());
            while self.eat(TokenKind::Semicolon) {}
            if self.pos == before {
                let tok = self.bump();
                self.error("unexpected token in block", tok.span);
            }
        }
        let end = self.expect(TokenKind::RBrace, "`}` to close block").span;
        Stmt {
            span: start.merge(end),
            kind: StmtKind::Block(stmts),
        }
    }

    /// Parse a condition expression with struct initializers disabled, so
    /// the following `{` is taken as the body.
    pub(crate) fn parse_cond_expr(&mut self) -> Expr {
        let saved = self.no_struct;
        self.no_struct = true;
        let expr = self.parse_expr();
        self.no_struct = saved;
        expr
    }

    fn parse_if(&mut self) -> Stmt {
        let start = self.expect(TokenKind::If, "`if`").span;
        let cond = self.parse_cond_expr();
        let then_branch = Box::new(self.parse_block_stmt());
        let else_branch = if self.eat(TokenKind::Else) {
            let branch = if self.at(TokenKind::If) {
                self.parse_if()
            } else {
                self.parse_block_stmt()
            };
            Some(Box::new(branch))
        } else {
            None
        };
        let end = else_branch
            .as_ref()
            .map(|b| b.span)
            .unwrap_or(then_branch.span);
        Stmt {
            span: start.merge(end),
            kind: StmtKind::If { cond, then_branch, else_branch },
        }
    }

    fn parse_while(&mut self) -> Stmt {
        let start = self.expect(TokenKind::While, "`while`").span;
        let cond = self.parse_cond_expr();
        let body = Box::new(self.parse_block_stmt());
        let span = start.merge(body.span);
        Stmt {
            span,
            kind: StmtKind::While { cond, body },
        }
    }

    fn parse_for(&mut self) -> Stmt {
        let start = self.expect(TokenKind::For, "`for`").span;

        if self.eat(TokenKind::LParen) {
            // C-style: for (init; cond; step) { ... }
            let init = if self.at(TokenKind::Semicolon) {
                None
            } else {
                Some(Box::new(self.parse_stmt()))
            };
            self.expect(TokenKind::Semicolon, "`;` after for-loop initializer");
            let cond = if self.at(TokenKind::Semicolon) {
                None
            } else {
                Some(self.parse_expr())
            };
            self.expect(TokenKind::Semicolon, "`;` after for-loop condition");
            let step = if self.at(TokenKind::RParen) {
                None
            } else {
                Some(self.parse_expr())
            };
            self.expect(TokenKind::RParen, "`)` after for-loop header");
            let body = Box::new(self.parse_block_stmt());
            let span = start.merge(body.span);
            return Stmt {
                span,
                kind: StmtKind::ForC { init, cond, step, body },
            };
        }

        // Range/array form: for item in expr { ... }
        let (var, var_span) = self.expect_ident("a loop variable");
        self.expect(TokenKind::In, "`in` after loop variable");
        let iter = self.parse_cond_expr();
        let body = Box::new(self.parse_block_stmt());
        let span = start.merge(body.span);
        Stmt {
            span,
            kind: StmtKind::ForIn { var, var_span, iter, body },
        }
    }

    fn parse_export(&mut self) -> Stmt {
        let start = self.expect(TokenKind::Export, "`export`").span;
        let inner = self.parse_stmt();
        let span = start.merge(inner.span);
        Stmt {
            span,
            kind: StmtKind::Export(Box::new(inner)),
        }
    }

    fn parse_match_stmt(&mut self) -> Stmt {
        let start = self.expect(TokenKind::Match, "`match`").span;
        let scrutinee = self.parse_cond_expr();
        let (arms, end) = self.parse_match_arms();
        Stmt {
            span: start.merge(end),
            kind: StmtKind::Match { scrutinee, arms },
        }
    }

    fn parse_try(&mut self) -> Stmt {
        let start = self.expect(TokenKind::Try, "`try`").span;
        let body = Box::new(self.parse_block_stmt());
        let mut catches = Vec::new();
        let mut end = body.span;

        while self.eat(TokenKind::Catch) {
            self.expect(TokenKind::LParen, "`(` after `catch`");
            // `catch (name)` or `catch (Type name)`.
            let ty = if self.at(TokenKind::Ident) && self.peek_nth(1) == TokenKind::Ident {
                Some(self.parse_type_expr())
            } else {
                None
            };
            let (name, name_span) = self.expect_ident("an exception variable");
            self.expect(TokenKind::RParen, "`)` after catch binding");
            let catch_body = self.parse_block_stmt();
            end = catch_body.span;
            catches.push(CatchClause { ty, name, name_span, body: catch_body });
        }

        let finally = if self.eat(TokenKind::Finally) {
            let block = self.parse_block_stmt();
            end = block.span;
            Some(Box::new(block))
        } else {
            None
        };

        Stmt {
            span: start.merge(end),
            kind: StmtKind::Try { body, catches, finally },
        }
    }

    fn parse_throw(&mut self) -> Stmt {
        let start = self.expect(TokenKind::Throw, "`throw`").span;
        let value = self.parse_expr();
        let span = start.merge(value.span);
        Stmt {
            span,
            kind: StmtKind::Throw(value),
        }
    }

    fn parse_test(&mut self) -> Stmt {
        let start = self.expect(TokenKind::Test, "`test`").span;
        let name = if self.at(TokenKind::Str) {
            let tok = self.bump();
            let text = self.text(tok);
            text[1..text.len() - 1].to_string()
        } else {
            self.error("expected a test name string", self.current().span);
            String::new()
        };
        let body = Box::new(self.parse_block_stmt());
        let span = start.merge(body.span);
        Stmt {
            span,
            kind: StmtKind::Test { name, body },
        }
    }
}
