//! Wyn parser: recursive-descent parser producing an owned typed AST.
//!
//! The parser consumes the token stream from `wyn-lexer` and builds a
//! [`Program`](ast::Program). Every expression node is stamped with an
//! [`ExprId`](ast::ExprId) so later phases can attach information without
//! mutating the tree. Errors are accumulated on the [`Parse`] result.

pub mod ast;
pub mod error;
mod parser;

use wyn_common::error::LexError;

use crate::ast::Program;
use crate::error::ParseError;

/// The result of parsing a source buffer.
#[derive(Debug)]
pub struct Parse {
    pub program: Program,
    pub errors: Vec<ParseError>,
    pub lex_errors: Vec<LexError>,
    /// The source text the program was parsed from; spans index into it.
    pub source: String,
    /// One past the highest `ExprId` assigned while parsing.
    pub expr_count: u32,
}

impl Parse {
    /// Whether lexing or parsing produced any errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || !self.lex_errors.is_empty()
    }
}

/// Parse a Wyn source buffer into a [`Parse`] result.
pub fn parse(source: &str) -> Parse {
    let lexed = wyn_lexer::tokenize(source);
    let mut p = parser::Parser::new(source, lexed.tokens);
    let program = p.parse_program();
    let (errors, expr_count) = p.finish();
    Parse {
        program,
        errors,
        lex_errors: lexed.errors,
        source: source.to_string(),
        expr_count,
    }
}
