//! Expression parsing: precedence climbing over the binary operator
//! tiers, postfix chains, and the primary forms.

use wyn_common::span::Span;
use wyn_common::token::TokenKind;

use crate::ast::expr::{BinaryOp, UnaryOp};
use crate::ast::{Expr, ExprKind, InterpPart, MatchArm, Param};

use super::Parser;

impl<'src> Parser<'src> {
    /// Entry point: assignment is the lowest tier and right-associative.
    pub(crate) fn parse_expr(&mut self) -> Expr {
        let lhs = self.parse_pipeline();

        if !self.at(TokenKind::Eq) {
            return lhs;
        }
        self.bump();
        let value = Box::new(self.parse_expr());
        let span = lhs.span.merge(value.span);

        match lhs.kind {
            ExprKind::Ident(target) => self.mk_expr(
                ExprKind::Assign { target, target_span: lhs.span, value },
                span,
            ),
            ExprKind::Field { object, field, field_span } => self.mk_expr(
                ExprKind::FieldAssign { object, field, field_span, value },
                span,
            ),
            ExprKind::Index { object, index } => self.mk_expr(
                ExprKind::IndexAssign { object, index, value },
                span,
            ),
            _ => {
                self.error("invalid assignment target", lhs.span);
                self.error_expr(span)
            }
        }
    }

    fn parse_pipeline(&mut self) -> Expr {
        let mut lhs = self.parse_range();
        while self.at(TokenKind::PipeGt) {
            self.bump();
            let callee = self.parse_range();
            let span = lhs.span.merge(callee.span);
            lhs = self.mk_expr(
                ExprKind::Pipeline { value: Box::new(lhs), callee: Box::new(callee) },
                span,
            );
        }
        lhs
    }

    fn parse_range(&mut self) -> Expr {
        let lhs = self.parse_binary(0);
        let inclusive = match self.peek() {
            TokenKind::DotDot => false,
            TokenKind::DotDotDot => true,
            _ => return lhs,
        };
        self.bump();
        let end = self.parse_binary(0);
        let span = lhs.span.merge(end.span);
        self.mk_expr(
            ExprKind::Range { start: Box::new(lhs), end: Box::new(end), inclusive },
            span,
        )
    }

    /// Binary operator tiers, lowest first.
    fn binary_op(kind: TokenKind, level: u8) -> Option<BinaryOp> {
        use TokenKind::*;
        let op = match (level, kind) {
            (0, QuestionQuestion) => BinaryOp::Coalesce,
            (1, PipePipe) => BinaryOp::Or,
            (2, AmpAmp) => BinaryOp::And,
            (3, Pipe) => BinaryOp::BitOr,
            (4, Caret) => BinaryOp::BitXor,
            (5, Amp) => BinaryOp::BitAnd,
            (6, EqEq) => BinaryOp::Eq,
            (6, BangEq) => BinaryOp::NotEq,
            (7, Lt) => BinaryOp::Lt,
            (7, Gt) => BinaryOp::Gt,
            (7, LtEq) => BinaryOp::LtEq,
            (7, GtEq) => BinaryOp::GtEq,
            (8, Shl) => BinaryOp::Shl,
            (8, Shr) => BinaryOp::Shr,
            (9, Plus) => BinaryOp::Add,
            (9, Minus) => BinaryOp::Sub,
            (10, Star) => BinaryOp::Mul,
            (10, Slash) => BinaryOp::Div,
            (10, Percent) => BinaryOp::Rem,
            _ => return None,
        };
        Some(op)
    }

    const MAX_BINARY_LEVEL: u8 = 10;

    fn parse_binary(&mut self, level: u8) -> Expr {
        if level > Self::MAX_BINARY_LEVEL {
            return self.parse_unary();
        }
        let mut lhs = self.parse_binary(level + 1);
        while let Some(op) = Self::binary_op(self.peek(), level) {
            let op_span = self.bump().span;
            let rhs = self.parse_binary(level + 1);
            let span = lhs.span.merge(rhs.span);
            lhs = self.mk_expr(
                ExprKind::Binary { op, op_span, lhs: Box::new(lhs), rhs: Box::new(rhs) },
                span,
            );
        }
        lhs
    }

    pub(crate) fn parse_unary(&mut self) -> Expr {
        let op = match self.peek() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            let start = self.bump().span;
            let operand = self.parse_unary();
            let span = start.merge(operand.span);
            return self.mk_expr(ExprKind::Unary { op, operand: Box::new(operand) }, span);
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Expr {
        let mut expr = self.parse_primary();
        loop {
            match self.peek() {
                TokenKind::LParen => {
                    self.bump();
                    let args = self.parse_call_args();
                    let end = self.expect(TokenKind::RParen, "`)` to close call").span;
                    let span = expr.span.merge(end);
                    expr = self.mk_expr(
                        ExprKind::Call { callee: Box::new(expr), args },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.bump();
                    let index = self.parse_expr();
                    let end = self.expect(TokenKind::RBracket, "`]` to close index").span;
                    let span = expr.span.merge(end);
                    expr = self.mk_expr(
                        ExprKind::Index { object: Box::new(expr), index: Box::new(index) },
                        span,
                    );
                }
                TokenKind::Dot => {
                    self.bump();
                    if self.at(TokenKind::Int) {
                        let tok = self.bump();
                        let index: u32 = self.text(tok).parse().unwrap_or(0);
                        let span = expr.span.merge(tok.span);
                        expr = self.mk_expr(
                            ExprKind::TupleIndex { object: Box::new(expr), index },
                            span,
                        );
                        continue;
                    }
                    let (name, name_span) = self.expect_ident("a field or method name");
                    if self.at(TokenKind::LParen) {
                        self.bump();
                        let args = self.parse_call_args();
                        let end = self.expect(TokenKind::RParen, "`)` to close call").span;
                        let span = expr.span.merge(end);
                        expr = self.mk_expr(
                            ExprKind::MethodCall {
                                receiver: Box::new(expr),
                                method: name,
                                method_span: name_span,
                                args,
                            },
                            span,
                        );
                    } else {
                        let span = expr.span.merge(name_span);
                        expr = self.mk_expr(
                            ExprKind::Field {
                                object: Box::new(expr),
                                field: name,
                                field_span: name_span,
                            },
                            span,
                        );
                    }
                }
                TokenKind::Question => {
                    let end = self.bump().span;
                    let span = expr.span.merge(end);
                    expr = self.mk_expr(ExprKind::Try(Box::new(expr)), span);
                }
                _ => break,
            }
        }
        expr
    }

    fn parse_call_args(&mut self) -> Vec<Expr> {
        let mut args = Vec::new();
        while !self.at(TokenKind::RParen) && !self.at_eof() {
            args.push(self.parse_expr());
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        args
    }

    fn parse_primary(&mut self) -> Expr {
        use TokenKind::*;
        match self.peek() {
            Int => {
                let tok = self.bump();
                let text = self.text(tok).replace('_', "");
                let value = text.parse::<i64>().unwrap_or_else(|_| {
                    self.errors.push(crate::error::ParseError::new(
                        format!("integer literal out of range: {text}"),
                        tok.span,
                    ));
                    0
                });
                self.mk_expr(ExprKind::IntLit(value), tok.span)
            }
            Float => {
                let tok = self.bump();
                let text = self.text(tok).replace('_', "");
                let value = text.parse::<f64>().unwrap_or(0.0);
                self.mk_expr(ExprKind::FloatLit(value), tok.span)
            }
            Str => {
                let tok = self.bump();
                self.parse_string_literal(tok.span)
            }
            Char => {
                let tok = self.bump();
                let inner = &self.text(tok)[1..self.text(tok).len() - 1];
                let c = decode_char(inner).unwrap_or('\0');
                self.mk_expr(ExprKind::CharLit(c), tok.span)
            }
            True => {
                let tok = self.bump();
                self.mk_expr(ExprKind::BoolLit(true), tok.span)
            }
            False => {
                let tok = self.bump();
                self.mk_expr(ExprKind::BoolLit(false), tok.span)
            }
            SelfKw => {
                let tok = self.bump();
                self.mk_expr(ExprKind::Ident("self".into()), tok.span)
            }
            Ident => self.parse_ident_expr(),
            LParen => self.parse_paren(),
            LBracket => self.parse_array_or_comprehension(),
            LBrace => self.parse_map_or_set(),
            If => self.parse_if_expr(),
            Match => self.parse_match_expr(),
            Pipe | PipePipe => self.parse_lambda(),
            Fn => self.parse_fn_lambda(),
            Await => {
                let start = self.bump().span;
                let inner = self.parse_unary();
                let span = start.merge(inner.span);
                self.mk_expr(ExprKind::Await(Box::new(inner)), span)
            }
            Spawn => {
                let start = self.bump().span;
                let inner = self.parse_unary();
                let span = start.merge(inner.span);
                self.mk_expr(ExprKind::Spawn(Box::new(inner)), span)
            }
            _ => {
                let tok = self.current();
                self.error("expected an expression", tok.span);
                self.bump();
                self.error_expr(tok.span)
            }
        }
    }

    /// Identifier-led forms: plain references, `mod::name` qualified
    /// references, `Ok`/`Err`/`Some`/`None` constructors, and struct
    /// initializers.
    fn parse_ident_expr(&mut self) -> Expr {
        let tok = self.bump();
        let mut name = self.text(tok).to_string();
        let mut span = tok.span;

        // Collapse `a::b::c` into one qualified name.
        while self.at(TokenKind::ColonColon) && self.peek_nth(1) == TokenKind::Ident {
            self.bump();
            let seg = self.bump();
            name.push_str("::");
            name.push_str(self.text(seg));
            span = span.merge(seg.span);
        }

        // Option/Result constructors.
        match name.as_str() {
            "Ok" | "Err" | "Some" if self.at(TokenKind::LParen) => {
                self.bump();
                let mut args = self.parse_call_args();
                let end = self.expect(TokenKind::RParen, "`)` to close constructor").span;
                let full = span.merge(end);
                if args.len() != 1 {
                    self.error(
                        format!("`{name}` takes exactly one argument"),
                        full,
                    );
                    return self.error_expr(full);
                }
                let inner = Box::new(args.remove(0));
                let kind = match name.as_str() {
                    "Ok" => ExprKind::OkCtor(inner),
                    "Err" => ExprKind::ErrCtor(inner),
                    _ => ExprKind::SomeCtor(inner),
                };
                return self.mk_expr(kind, full);
            }
            "None" if !self.at(TokenKind::LParen) => {
                return self.mk_expr(ExprKind::NoneCtor, span);
            }
            _ => {}
        }

        // Struct initializer: `Name { field: value, ... }`.
        let starts_upper = name.chars().next().is_some_and(|c| c.is_uppercase());
        if starts_upper && self.at(TokenKind::LBrace) && !self.no_struct {
            self.bump();
            let mut fields = Vec::new();
            while !self.at(TokenKind::RBrace) && !self.at_eof() {
                let (field, field_span) = self.expect_ident("a field name");
                self.expect(TokenKind::Colon, "`:` after field name");
                let value = self.parse_expr();
                fields.push((field, field_span, value));
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            let end = self.expect(TokenKind::RBrace, "`}` to close initializer").span;
            let full = span.merge(end);
            return self.mk_expr(
                ExprKind::StructInit { name, name_span: span, fields },
                full,
            );
        }

        self.mk_expr(ExprKind::Ident(name), span)
    }

    /// `(e)` grouping or `(a, b)` tuple literal.
    fn parse_paren(&mut self) -> Expr {
        let start = self.bump().span;
        if self.at(TokenKind::RParen) {
            let end = self.bump().span;
            return self.mk_expr(ExprKind::TupleLit(Vec::new()), start.merge(end));
        }
        let saved = self.no_struct;
        self.no_struct = false;
        let first = self.parse_expr();
        if self.eat(TokenKind::Comma) {
            let mut elems = vec![first];
            while !self.at(TokenKind::RParen) && !self.at_eof() {
                elems.push(self.parse_expr());
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            let end = self.expect(TokenKind::RParen, "`)` to close tuple").span;
            self.no_struct = saved;
            return self.mk_expr(ExprKind::TupleLit(elems), start.merge(end));
        }
        let end = self.expect(TokenKind::RParen, "`)` to close expression").span;
        self.no_struct = saved;
        // Re-span the grouped expression to cover the parens.
        let mut inner = first;
        inner.span = start.merge(end);
        inner
    }

    /// `[a, b]` array literal or `[e for x in xs if c]` comprehension.
    fn parse_array_or_comprehension(&mut self) -> Expr {
        let start = self.bump().span;
        let saved = self.no_struct;
        self.no_struct = false;

        if self.at(TokenKind::RBracket) {
            let end = self.bump().span;
            self.no_struct = saved;
            return self.mk_expr(ExprKind::ArrayLit(Vec::new()), start.merge(end));
        }

        let first = self.parse_expr();

        if self.at(TokenKind::For) {
            self.bump();
            let (var, var_span) = self.expect_ident("a comprehension variable");
            self.expect(TokenKind::In, "`in` in comprehension");
            let iter = self.parse_expr();
            let cond = if self.eat(TokenKind::If) {
                Some(Box::new(self.parse_expr()))
            } else {
                None
            };
            let end = self.expect(TokenKind::RBracket, "`]` to close comprehension").span;
            self.no_struct = saved;
            return self.mk_expr(
                ExprKind::ListComp {
                    element: Box::new(first),
                    var,
                    var_span,
                    iter: Box::new(iter),
                    cond,
                },
                start.merge(end),
            );
        }

        let mut elems = vec![first];
        while self.eat(TokenKind::Comma) {
            if self.at(TokenKind::RBracket) {
                break;
            }
            elems.push(self.parse_expr());
        }
        let end = self.expect(TokenKind::RBracket, "`]` to close array").span;
        self.no_struct = saved;
        self.mk_expr(ExprKind::ArrayLit(elems), start.merge(end))
    }

    /// `{}` / `{k: v}` map literal or `{a, b}` set literal.
    fn parse_map_or_set(&mut self) -> Expr {
        let start = self.bump().span;
        let saved = self.no_struct;
        self.no_struct = false;

        if self.at(TokenKind::RBrace) {
            let end = self.bump().span;
            self.no_struct = saved;
            return self.mk_expr(ExprKind::MapLit(Vec::new()), start.merge(end));
        }

        let first = self.parse_expr();
        if self.eat(TokenKind::Colon) {
            let value = self.parse_expr();
            let mut entries = vec![(first, value)];
            while self.eat(TokenKind::Comma) {
                if self.at(TokenKind::RBrace) {
                    break;
                }
                let k = self.parse_expr();
                self.expect(TokenKind::Colon, "`:` in map entry");
                let v = self.parse_expr();
                entries.push((k, v));
            }
            let end = self.expect(TokenKind::RBrace, "`}` to close map").span;
            self.no_struct = saved;
            return self.mk_expr(ExprKind::MapLit(entries), start.merge(end));
        }

        let mut elems = vec![first];
        while self.eat(TokenKind::Comma) {
            if self.at(TokenKind::RBrace) {
                break;
            }
            elems.push(self.parse_expr());
        }
        let end = self.expect(TokenKind::RBrace, "`}` to close set").span;
        self.no_struct = saved;
        self.mk_expr(ExprKind::SetLit(elems), start.merge(end))
    }

    /// A `{ ... }` block in expression position; the last expression
    /// statement (if any) becomes the block's value.
    pub(crate) fn parse_block_expr(&mut self) -> Expr {
        let stmt = self.parse_block_stmt();
        let span = stmt.span;
        let mut stmts = match stmt.kind {
            crate::ast::StmtKind::Block(stmts) => stmts,
            _ => Vec::new(),
        };
        let tail = match stmts.last() {
            Some(s) if matches!(s.kind, crate::ast::StmtKind::Expr(_)) => {
                let last = stmts.pop().expect("just checked non-empty");
                match last.kind {
                    crate::ast::StmtKind::Expr(e) => Some(Box::new(e)),
                    _ => unreachable!(),
                }
            }
            _ => None,
        };
        self.mk_expr(ExprKind::Block { stmts, tail }, span)
    }

    fn parse_if_expr(&mut self) -> Expr {
        let start = self.expect(TokenKind::If, "`if`").span;
        let cond = self.parse_cond_expr();
        let then_branch = self.parse_block_expr();
        let else_branch = if self.eat(TokenKind::Else) {
            let e = if self.at(TokenKind::If) {
                self.parse_if_expr()
            } else {
                self.parse_block_expr()
            };
            Some(Box::new(e))
        } else {
            None
        };
        let end = else_branch
            .as_ref()
            .map(|e| e.span)
            .unwrap_or(then_branch.span);
        self.mk_expr(
            ExprKind::If {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch,
            },
            start.merge(end),
        )
    }

    fn parse_match_expr(&mut self) -> Expr {
        let start = self.expect(TokenKind::Match, "`match`").span;
        let scrutinee = self.parse_cond_expr();
        let (arms, end) = self.parse_match_arms();
        self.mk_expr(
            ExprKind::Match { scrutinee: Box::new(scrutinee), arms },
            start.merge(end),
        )
    }

    /// `{ pattern [if guard] => body, ... }`; shared by the statement and
    /// expression forms of `match`.
    pub(crate) fn parse_match_arms(&mut self) -> (Vec<MatchArm>, Span) {
        self.expect(TokenKind::LBrace, "`{` to open match arms");
        let mut arms = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at_eof() {
            let before = self.pos;
            let pattern = self.parse_match_pattern();
            self.expect(TokenKind::FatArrow, "`=>` after pattern");
            let body = if self.at(TokenKind::LBrace) {
                self.parse_block_expr()
            } else {
                self.parse_expr()
            };
            let span = pattern.span.merge(body.span);
            arms.push(MatchArm { pattern, body, span });
            self.eat(TokenKind::Comma);
            if self.pos == before {
                self.bump();
            }
        }
        let end = self.expect(TokenKind::RBrace, "`}` to close match").span;
        (arms, end)
    }

    /// `|x, y| body` — a lambda. `||` is an empty parameter list.
    fn parse_lambda(&mut self) -> Expr {
        let start = self.current().span;
        let mut params = Vec::new();

        if self.at(TokenKind::PipePipe) {
            self.bump();
        } else {
            self.expect(TokenKind::Pipe, "`|` to open lambda parameters");
            while !self.at(TokenKind::Pipe) && !self.at_eof() {
                let (name, span) = self.expect_ident("a lambda parameter");
                let ty = if self.eat(TokenKind::Colon) {
                    Some(self.parse_type_expr())
                } else {
                    None
                };
                params.push(Param { name, span, ty, default: None });
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::Pipe, "`|` to close lambda parameters");
        }

        let body = if self.at(TokenKind::LBrace) {
            self.parse_block_expr()
        } else {
            self.parse_expr()
        };
        let span = start.merge(body.span);
        self.mk_expr(ExprKind::Lambda { params, body: Box::new(body) }, span)
    }

    /// `fn (x, y) { ... }` — the keyword lambda form.
    fn parse_fn_lambda(&mut self) -> Expr {
        let start = self.expect(TokenKind::Fn, "`fn`").span;
        self.expect(TokenKind::LParen, "`(` after `fn`");
        let mut params = Vec::new();
        while !self.at(TokenKind::RParen) && !self.at_eof() {
            let (name, span) = self.expect_ident("a parameter name");
            let ty = if self.eat(TokenKind::Colon) {
                Some(self.parse_type_expr())
            } else {
                None
            };
            params.push(Param { name, span, ty, default: None });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "`)` after parameters");
        let body = self.parse_block_expr();
        let span = start.merge(body.span);
        self.mk_expr(ExprKind::Lambda { params, body: Box::new(body) }, span)
    }

    // ── String literals and interpolation ──────────────────────────────

    /// Decode a string token into a `StrLit` or, when `${...}` segments
    /// are present, a `StringInterp` whose embedded expressions are parsed
    /// at their real source offsets.
    fn parse_string_literal(&mut self, span: Span) -> Expr {
        let content_start = span.start + 1;
        let raw = self.source[span.range()].to_string();
        let raw = &raw[1..raw.len() - 1];

        let mut parts: Vec<InterpPart> = Vec::new();
        let mut text = String::new();
        let mut chars = raw.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            if c == '\\' {
                if let Some((_, esc)) = chars.next() {
                    text.push(unescape(esc));
                }
                continue;
            }
            if c == '$' && matches!(chars.peek(), Some((_, '{'))) {
                chars.next(); // consume '{'
                let expr_start = chars.peek().map(|(j, _)| *j).unwrap_or(raw.len());
                let mut depth = 1u32;
                let mut expr_end = raw.len();
                for (j, ic) in chars.by_ref() {
                    match ic {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                expr_end = j;
                                break;
                            }
                        }
                        _ => {}
                    }
                }
                if !text.is_empty() {
                    parts.push(InterpPart::Text(std::mem::take(&mut text)));
                }
                let abs_start = content_start + expr_start as u32;
                let abs_end = content_start + expr_end as u32;
                let inner = self.parse_embedded_expr(abs_start, abs_end);
                parts.push(InterpPart::Expr(Box::new(inner)));
                continue;
            }
            let _ = i;
            text.push(c);
        }

        if parts.is_empty() {
            return self.mk_expr(ExprKind::StrLit(text), span);
        }
        if !text.is_empty() {
            parts.push(InterpPart::Text(text));
        }
        self.mk_expr(ExprKind::StringInterp { parts }, span)
    }

    /// Parse an expression embedded at absolute byte offsets in the source
    /// (used for `${...}` segments). The token stream is temporarily
    /// swapped; expression ids stay globally unique.
    fn parse_embedded_expr(&mut self, start: u32, end: u32) -> Expr {
        let slice = &self.source[start as usize..end as usize];
        let lexed = wyn_lexer::tokenize(slice);
        for e in lexed.errors {
            let span = Span::new(e.span.start + start, e.span.end + start);
            self.error(e.to_string(), span);
        }
        let mut tokens = lexed.tokens;
        for t in &mut tokens {
            t.span = Span::new(t.span.start + start, t.span.end + start);
        }

        let saved_tokens = std::mem::replace(&mut self.tokens, tokens);
        let saved_pos = std::mem::replace(&mut self.pos, 0);
        let expr = self.parse_expr();
        self.tokens = saved_tokens;
        self.pos = saved_pos;
        expr
    }
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        other => other,
    }
}

fn decode_char(inner: &str) -> Option<char> {
    let mut chars = inner.chars();
    match chars.next()? {
        '\\' => Some(unescape(chars.next()?)),
        c => Some(c),
    }
}
