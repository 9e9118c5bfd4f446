//! The Wyn abstract syntax tree.
//!
//! An owned tree: a [`Program`] is a list of statements, statements contain
//! expressions, expressions carry a parser-assigned [`ExprId`] and a source
//! [`Span`]. The analyzer records inferred types in a side table keyed by
//! `ExprId`; the tree itself is never mutated after parsing.

pub mod expr;
pub mod pat;
pub mod stmt;
pub mod ty;

pub use expr::{Expr, ExprId, ExprKind, InterpPart, MatchArm};
pub use pat::{Pattern, PatternKind};
pub use stmt::{
    CatchClause, EnumDecl, EnumVariant, ExternDecl, FnDecl, ImplDecl, Param, Stmt, StmtKind,
    StructDecl, TraitDecl, TraitMethod, VarBinding,
};
pub use ty::{TypeExpr, TypeExprKind};

/// A parsed compilation unit: the top-level statement list.
#[derive(Debug, Clone)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}
