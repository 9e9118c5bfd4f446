//! Pattern parsing for match arms and destructuring declarations.

use wyn_common::token::TokenKind;

use crate::ast::{Pattern, PatternKind};

use super::Parser;

impl<'src> Parser<'src> {
    /// A full match-arm pattern: or-alternatives plus an optional guard.
    pub(crate) fn parse_match_pattern(&mut self) -> Pattern {
        let first = self.parse_pattern();

        let pattern = if self.at(TokenKind::Pipe) {
            let mut alts = vec![first];
            while self.eat(TokenKind::Pipe) {
                alts.push(self.parse_pattern());
            }
            let span = alts
                .first()
                .map(|p| p.span)
                .unwrap_or_else(|| self.current().span)
                .merge(alts.last().map(|p| p.span).unwrap_or_else(|| self.current().span));
            Pattern {
                span,
                kind: PatternKind::Or(alts),
            }
        } else {
            first
        };

        if self.eat(TokenKind::If) {
            let cond = self.parse_cond_expr();
            let span = pattern.span.merge(cond.span);
            return Pattern {
                span,
                kind: PatternKind::Guard {
                    inner: Box::new(pattern),
                    cond: Box::new(cond),
                },
            };
        }
        pattern
    }

    /// A single pattern without or-alternatives or guards.
    pub(crate) fn parse_pattern(&mut self) -> Pattern {
        use TokenKind::*;
        match self.peek() {
            LParen => {
                let start = self.bump().span;
                let mut elems = Vec::new();
                while !self.at(RParen) && !self.at_eof() {
                    elems.push(self.parse_pattern());
                    if !self.eat(Comma) {
                        break;
                    }
                }
                let end = self.expect(RParen, "`)` to close tuple pattern").span;
                Pattern {
                    span: start.merge(end),
                    kind: PatternKind::Tuple(elems),
                }
            }
            LBracket => {
                let start = self.bump().span;
                let mut elements = Vec::new();
                let mut rest = None;
                while !self.at(RBracket) && !self.at_eof() {
                    if self.eat(DotDot) {
                        if self.at(Ident) {
                            let tok = self.bump();
                            rest = Some(Some(self.text(tok).to_string()));
                        } else {
                            rest = Some(None);
                        }
                    } else {
                        elements.push(self.parse_pattern());
                    }
                    if !self.eat(Comma) {
                        break;
                    }
                }
                let end = self.expect(RBracket, "`]` to close array pattern").span;
                Pattern {
                    span: start.merge(end),
                    kind: PatternKind::Array { elements, rest },
                }
            }
            Int | Float | Str | Char | True | False | Minus => self.parse_literal_pattern(),
            Ident => self.parse_name_pattern(),
            _ => {
                let tok = self.bump();
                self.error("expected a pattern", tok.span);
                Pattern {
                    span: tok.span,
                    kind: PatternKind::Wildcard,
                }
            }
        }
    }

    /// Literal and range patterns: `1`, `"x"`, `'a'`, `true`, `1..5`.
    fn parse_literal_pattern(&mut self) -> Pattern {
        let start_expr = self.parse_unary();
        let start_span = start_expr.span;

        let inclusive = match self.peek() {
            TokenKind::DotDot => false,
            TokenKind::DotDotDot => true,
            _ => {
                return Pattern {
                    span: start_span,
                    kind: PatternKind::Literal(Box::new(start_expr)),
                }
            }
        };
        self.bump();
        let end_expr = self.parse_unary();
        let span = start_span.merge(end_expr.span);
        Pattern {
            span,
            kind: PatternKind::Range {
                start: Box::new(start_expr),
                end: Box::new(end_expr),
                inclusive,
            },
        }
    }

    /// Identifier-led patterns: `_`, bindings, struct patterns, and
    /// variant forms (`Color.Red`, `Color::Red`, `Some(x)`, bare `Red`).
    fn parse_name_pattern(&mut self) -> Pattern {
        let tok = self.bump();
        let name = self.text(tok).to_string();
        let mut span = tok.span;

        if name == "_" {
            return Pattern {
                span,
                kind: PatternKind::Wildcard,
            };
        }
        // `None` is the nullary option constructor, not a binding.
        if name == "None" {
            return Pattern {
                span,
                kind: PatternKind::Variant {
                    enum_name: None,
                    variant: name,
                    variant_span: span,
                    args: Vec::new(),
                },
            };
        }

        // `Enum.Variant` / `Enum::Variant`.
        let mut enum_name = None;
        let mut variant = name;
        let mut variant_span = span;
        if (self.at(TokenKind::Dot) || self.at(TokenKind::ColonColon))
            && self.peek_nth(1) == TokenKind::Ident
        {
            self.bump();
            let vtok = self.bump();
            enum_name = Some(variant);
            variant = self.text(vtok).to_string();
            variant_span = vtok.span;
            span = span.merge(vtok.span);
        }

        // Variant payload: `Variant(p1, p2)`.
        if self.at(TokenKind::LParen) {
            self.bump();
            let mut args = Vec::new();
            while !self.at(TokenKind::RParen) && !self.at_eof() {
                args.push(self.parse_pattern());
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            let end = self.expect(TokenKind::RParen, "`)` to close variant pattern").span;
            return Pattern {
                span: span.merge(end),
                kind: PatternKind::Variant { enum_name, variant, variant_span, args },
            };
        }

        // Struct pattern: `Name { field, field: p }` (only in struct-allowed
        // positions; a match scrutinee's `{` belongs to the arms).
        if enum_name.is_none() && self.at(TokenKind::LBrace) && !self.no_struct {
            self.bump();
            let mut fields = Vec::new();
            while !self.at(TokenKind::RBrace) && !self.at_eof() {
                let (field, field_span) = self.expect_ident("a field name");
                let sub = if self.eat(TokenKind::Colon) {
                    Some(self.parse_pattern())
                } else {
                    None
                };
                fields.push((field, field_span, sub));
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            let end = self.expect(TokenKind::RBrace, "`}` to close struct pattern").span;
            return Pattern {
                span: span.merge(end),
                kind: PatternKind::Struct {
                    name: variant,
                    name_span: variant_span,
                    fields,
                },
            };
        }

        if enum_name.is_some() {
            return Pattern {
                span,
                kind: PatternKind::Variant { enum_name, variant, variant_span, args: Vec::new() },
            };
        }

        // A bare identifier: binding, or a variant name the analyzer will
        // recognize against the scrutinee's enum.
        Pattern {
            span,
            kind: PatternKind::Binding(variant),
        }
    }
}
