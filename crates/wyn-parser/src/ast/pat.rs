//! Pattern nodes for `match` arms and destructuring declarations.

use wyn_common::span::Span;

use crate::ast::expr::Expr;

/// A pattern: created by the parser, consumed by the analyzer to bind arm
/// scopes and check exhaustiveness. Never mutated.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub span: Span,
    pub kind: PatternKind,
}

/// Every pattern form.
#[derive(Debug, Clone)]
pub enum PatternKind {
    /// `_`
    Wildcard,
    /// A bare lowercase-or-any identifier. In an enum match this may name
    /// a variant; the analyzer decides.
    Binding(String),
    /// A literal value: `1`, `"x"`, `true`.
    Literal(Box<Expr>),
    /// `(p1, p2)`
    Tuple(Vec<Pattern>),
    /// `[p1, p2, ..rest]`. `rest` is `Some(None)` for a bare `..`,
    /// `Some(Some(name))` for `..name`.
    Array {
        elements: Vec<Pattern>,
        rest: Option<Option<String>>,
    },
    /// `Name { field, field: p, ... }`. A field with no sub-pattern binds
    /// the field name itself.
    Struct {
        name: String,
        name_span: Span,
        fields: Vec<(String, Span, Option<Pattern>)>,
    },
    /// `Type.Variant(p)`, `Type::Variant`, bare `Variant(p)`, and the
    /// option/result constructors `Some(p)` / `None` / `Ok(p)` / `Err(p)`.
    Variant {
        enum_name: Option<String>,
        variant: String,
        variant_span: Span,
        args: Vec<Pattern>,
    },
    /// `a..b` / `a..=b`
    Range {
        start: Box<Expr>,
        end: Box<Expr>,
        inclusive: bool,
    },
    /// `p1 | p2 | ...`
    Or(Vec<Pattern>),
    /// `p if cond`
    Guard {
        inner: Box<Pattern>,
        cond: Box<Expr>,
    },
}

impl Pattern {
    /// Whether this pattern (or any or-alternative) is a wildcard.
    pub fn has_wildcard(&self) -> bool {
        match &self.kind {
            PatternKind::Wildcard => true,
            PatternKind::Or(alts) => alts.iter().any(Pattern::has_wildcard),
            PatternKind::Guard { inner, .. } => inner.has_wildcard(),
            _ => false,
        }
    }
}
