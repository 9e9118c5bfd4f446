//! Type expression nodes.
//!
//! Type annotations get their own small tree rather than being parsed as
//! value expressions. The analyzer resolves these into semantic types.

use wyn_common::span::Span;

/// A type annotation as written in source.
#[derive(Debug, Clone)]
pub struct TypeExpr {
    pub span: Span,
    pub kind: TypeExprKind,
}

/// Every type-expression form.
#[derive(Debug, Clone)]
pub enum TypeExprKind {
    /// `Int`, `Point`, `Result<Int, String>`, `Map<String, Int>`, ...
    Named {
        name: String,
        args: Vec<TypeExpr>,
    },
    /// `[T]`
    Array(Box<TypeExpr>),
    /// `fn(T1, T2) -> R`
    Function {
        params: Vec<TypeExpr>,
        ret: Box<TypeExpr>,
    },
    /// `T?`
    Optional(Box<TypeExpr>),
    /// `A | B | C`
    Union(Vec<TypeExpr>),
}

impl TypeExpr {
    /// The bare name if this is a plain (argument-free) named type.
    pub fn as_plain_name(&self) -> Option<&str> {
        match &self.kind {
            TypeExprKind::Named { name, args } if args.is_empty() => Some(name),
            _ => None,
        }
    }
}
