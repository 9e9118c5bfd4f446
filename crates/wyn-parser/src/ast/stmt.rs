//! Statement and declaration nodes.

use wyn_common::span::Span;

use crate::ast::expr::{Expr, MatchArm};
use crate::ast::pat::Pattern;
use crate::ast::ty::TypeExpr;

/// A statement node: source span plus the syntactic form.
#[derive(Debug, Clone)]
pub struct Stmt {
    pub span: Span,
    pub kind: StmtKind,
}

/// A function parameter: name, optional annotation, optional default value.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub span: Span,
    pub ty: Option<TypeExpr>,
    pub default: Option<Expr>,
}

/// A function declaration (top level, impl method, or trait method).
#[derive(Debug, Clone)]
pub struct FnDecl {
    pub name: String,
    pub name_span: Span,
    /// Generic type parameter names, e.g. `["T"]` for `fn id<T>(x: T)`.
    pub generics: Vec<String>,
    pub params: Vec<Param>,
    pub ret: Option<TypeExpr>,
    /// `None` for bodyless trait-method signatures.
    pub body: Option<Box<Stmt>>,
    pub is_public: bool,
    /// `fn (self: Point) norm()` — the receiver type name.
    pub receiver: Option<(String, Span)>,
    /// Trailing `...` in the parameter list.
    pub is_variadic: bool,
}

/// An `extern fn` declaration: types only, no body.
#[derive(Debug, Clone)]
pub struct ExternDecl {
    pub name: String,
    pub name_span: Span,
    pub params: Vec<TypeExpr>,
    pub ret: Option<TypeExpr>,
    pub is_variadic: bool,
}

/// A struct (or `object`) declaration.
#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: String,
    pub name_span: Span,
    pub generics: Vec<String>,
    pub fields: Vec<(String, Span, TypeExpr)>,
    pub is_public: bool,
}

/// One variant of an enum: nullary or data-carrying.
#[derive(Debug, Clone)]
pub struct EnumVariant {
    pub name: String,
    pub span: Span,
    pub fields: Vec<TypeExpr>,
}

/// An enum declaration.
#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub name: String,
    pub name_span: Span,
    pub variants: Vec<EnumVariant>,
}

/// An `impl TypeName { ... }` block.
#[derive(Debug, Clone)]
pub struct ImplDecl {
    pub target: String,
    pub target_span: Span,
    pub methods: Vec<FnDecl>,
}

/// A trait method: signature plus whether a default body is present.
#[derive(Debug, Clone)]
pub struct TraitMethod {
    pub decl: FnDecl,
    pub has_default: bool,
}

/// A trait declaration.
#[derive(Debug, Clone)]
pub struct TraitDecl {
    pub name: String,
    pub name_span: Span,
    pub methods: Vec<TraitMethod>,
}

/// A `catch (Type name)` clause of a try statement.
#[derive(Debug, Clone)]
pub struct CatchClause {
    pub ty: Option<TypeExpr>,
    pub name: String,
    pub name_span: Span,
    pub body: Stmt,
}

/// The left-hand side of a `var` declaration: a plain name or a
/// destructuring pattern.
#[derive(Debug, Clone)]
pub enum VarBinding {
    Name(String, Span),
    Pattern(Pattern),
}

/// Every statement form in the Wyn language.
#[derive(Debug, Clone)]
pub enum StmtKind {
    Var {
        binding: VarBinding,
        ty: Option<TypeExpr>,
        init: Option<Expr>,
    },
    Const {
        name: String,
        name_span: Span,
        init: Expr,
    },
    Expr(Expr),
    Return(Option<Expr>),
    Block(Vec<Stmt>),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    /// C-style `for (var i = 0; i < n; i = i + 1) { ... }`.
    ForC {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Box<Stmt>,
    },
    /// `for item in expr { ... }`.
    ForIn {
        var: String,
        var_span: Span,
        iter: Expr,
        body: Box<Stmt>,
    },
    Fn(FnDecl),
    Extern(ExternDecl),
    Macro {
        name: String,
        name_span: Span,
        params: Vec<String>,
        body: Box<Stmt>,
    },
    Struct(StructDecl),
    Impl(ImplDecl),
    Trait(TraitDecl),
    Enum(EnumDecl),
    TypeAlias {
        name: String,
        name_span: Span,
        aliased: TypeExpr,
    },
    Import {
        path: String,
        path_span: Span,
        alias: Option<String>,
    },
    Export(Box<Stmt>),
    Match {
        scrutinee: Expr,
        arms: Vec<MatchArm>,
    },
    Try {
        body: Box<Stmt>,
        catches: Vec<CatchClause>,
        finally: Option<Box<Stmt>>,
    },
    Throw(Expr),
    Break,
    Continue,
    Defer(Expr),
    Unsafe(Box<Stmt>),
    Test {
        name: String,
        body: Box<Stmt>,
    },
    Spawn(Expr),
}
