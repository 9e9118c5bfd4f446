//! Expression nodes.

use wyn_common::span::Span;

use crate::ast::pat::Pattern;
use crate::ast::stmt::{Param, Stmt};
use crate::ast::ty::TypeExpr;

/// Identity of an expression node, assigned by the parser in creation
/// order. The analyzer's `ExprId -> Type` side table is keyed by this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(pub u32);

/// An expression node: id, source span, and the syntactic form.
#[derive(Debug, Clone)]
pub struct Expr {
    pub id: ExprId,
    pub span: Span,
    pub kind: ExprKind,
}

/// Binary operators, grouped the way the checker treats them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    /// `??` nil-coalescing.
    Coalesce,
}

impl BinaryOp {
    /// Whether this operator is a comparison (`==`, `!=`, `<`, …).
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::Lt | BinaryOp::Gt | BinaryOp::LtEq | BinaryOp::GtEq
        )
    }

    /// Whether this operator is `&&` or `||`.
    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    /// Source text of the operator, for diagnostics.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Coalesce => "??",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `!`
    Not,
}

/// A `literal text` / `${expr}` segment of an interpolated string.
#[derive(Debug, Clone)]
pub enum InterpPart {
    Text(String),
    Expr(Box<Expr>),
}

/// One arm of a `match` expression or statement.
#[derive(Debug, Clone)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub body: Expr,
    pub span: Span,
}

/// Every expression form in the Wyn language.
#[derive(Debug, Clone)]
pub enum ExprKind {
    // ── Literals ───────────────────────────────────────────────────────
    IntLit(i64),
    FloatLit(f64),
    StrLit(String),
    CharLit(char),
    BoolLit(bool),

    /// An identifier reference. Module-qualified forms (`math::pi`) are
    /// collapsed into a single name containing `::`.
    Ident(String),

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        op_span: Span,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    MethodCall {
        receiver: Box<Expr>,
        method: String,
        method_span: Span,
        args: Vec<Expr>,
    },
    Field {
        object: Box<Expr>,
        field: String,
        field_span: Span,
    },
    TupleIndex {
        object: Box<Expr>,
        index: u32,
    },

    ArrayLit(Vec<Expr>),
    /// `{k: v, ...}`
    MapLit(Vec<(Expr, Expr)>),
    /// `{a, b, c}`
    SetLit(Vec<Expr>),
    /// `(a, b)` tuple literal.
    TupleLit(Vec<Expr>),

    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    IndexAssign {
        object: Box<Expr>,
        index: Box<Expr>,
        value: Box<Expr>,
    },
    /// `name = value`
    Assign {
        target: String,
        target_span: Span,
        value: Box<Expr>,
    },
    FieldAssign {
        object: Box<Expr>,
        field: String,
        field_span: Span,
        value: Box<Expr>,
    },

    /// `Name { field: value, ... }`
    StructInit {
        name: String,
        name_span: Span,
        fields: Vec<(String, Span, Expr)>,
    },

    Range {
        start: Box<Expr>,
        end: Box<Expr>,
        inclusive: bool,
    },

    /// `|x, y| body` or `fn(x, y) { ... }`. Captured names are recorded by
    /// the analyzer in a side table keyed by this node's id.
    Lambda {
        params: Vec<Param>,
        body: Box<Expr>,
    },

    Block {
        stmts: Vec<Stmt>,
        tail: Option<Box<Expr>>,
    },
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
    },
    Match {
        scrutinee: Box<Expr>,
        arms: Vec<MatchArm>,
    },

    StringInterp {
        parts: Vec<InterpPart>,
    },

    Await(Box<Expr>),
    Spawn(Box<Expr>),
    /// `value |> callee` — sugar for prepending `value` to the call.
    Pipeline {
        value: Box<Expr>,
        callee: Box<Expr>,
    },
    /// `expr?`
    Try(Box<Expr>),

    /// `Ok(e)`, `Err(e)`, `Some(e)`, `None`.
    OkCtor(Box<Expr>),
    ErrCtor(Box<Expr>),
    SomeCtor(Box<Expr>),
    NoneCtor,

    /// `[elem for var in iter if cond]`
    ListComp {
        element: Box<Expr>,
        var: String,
        var_span: Span,
        iter: Box<Expr>,
        cond: Option<Box<Expr>>,
    },

    /// A type used in expression position (e.g. an argument to `typeof`-style
    /// builtins, or a generic argument list parsed as an expression).
    TypeRef(TypeExpr),
}
