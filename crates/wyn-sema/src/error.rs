//! Semantic error taxonomy.
//!
//! Every variant carries the span of the offending construct plus enough
//! context to render a precise message. Errors are accumulated in the
//! analyzer's sink; checking continues with a sentinel type so one
//! mistake does not hide the rest.

use std::fmt;

use wyn_common::span::Span;

use crate::ty::Type;

/// A semantic error found during analysis.
#[derive(Debug, Clone)]
pub enum SemaError {
    /// A name not bound in any enclosing scope, with fuzzy suggestions.
    UndefinedIdentifier {
        name: String,
        span: Span,
        suggestions: Vec<String>,
    },
    /// A call site with no matching callee.
    UndefinedFunction {
        name: String,
        span: Span,
        closest: Option<String>,
    },
    /// `compatible(expected, actual)` failed in a checked position.
    TypeMismatch {
        expected: Type,
        found: Type,
        context: String,
        span: Span,
    },
    /// A type annotation naming an unknown type.
    UnknownType {
        name: String,
        span: Span,
    },
    /// Non-variadic call with the wrong number of arguments.
    WrongArgCount {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },
    /// Overload insertion with an existing identical signature.
    DuplicateSignature {
        name: String,
        span: Span,
    },
    /// Two or more overloads scored the same at a call site.
    AmbiguousOverload {
        name: String,
        span: Span,
    },
    /// A short module name resolving to two distinct imports.
    AmbiguousModule {
        name: String,
        span: Span,
        first_path: String,
        first_line: u32,
        second_path: String,
        second_line: u32,
    },
    /// Cross-module call of a non-public function.
    PrivateFunction {
        module: String,
        name: String,
        span: Span,
    },
    /// A module file that could not be loaded.
    ModuleLoad {
        path: String,
        message: String,
        span: Span,
    },
    /// An enum match with uncovered variants and no wildcard.
    NonExhaustiveMatch {
        enum_name: String,
        missing: Vec<String>,
        span: Span,
    },
    /// Assigning `Optional<T>` into a slot typed `T`.
    NullabilityMismatch {
        expected: Type,
        found: Type,
        span: Span,
    },
    /// A struct initializer naming a field the struct does not declare.
    UnknownField {
        struct_name: String,
        field: String,
        span: Span,
    },
    /// A field access on a struct with no such field.
    NoSuchField {
        ty: Type,
        field: String,
        span: Span,
    },
    /// Indexing a value that is not a string, array, or map.
    NotIndexable {
        ty: Type,
        span: Span,
    },
    /// Structurally invalid code: nested `fn`, union arity < 2, etc.
    IllegalConstruct {
        message: String,
        span: Span,
    },
}

impl SemaError {
    /// The primary span of the error.
    pub fn span(&self) -> Span {
        match self {
            SemaError::UndefinedIdentifier { span, .. }
            | SemaError::UndefinedFunction { span, .. }
            | SemaError::TypeMismatch { span, .. }
            | SemaError::UnknownType { span, .. }
            | SemaError::WrongArgCount { span, .. }
            | SemaError::DuplicateSignature { span, .. }
            | SemaError::AmbiguousOverload { span, .. }
            | SemaError::AmbiguousModule { span, .. }
            | SemaError::PrivateFunction { span, .. }
            | SemaError::ModuleLoad { span, .. }
            | SemaError::NonExhaustiveMatch { span, .. }
            | SemaError::NullabilityMismatch { span, .. }
            | SemaError::UnknownField { span, .. }
            | SemaError::NoSuchField { span, .. }
            | SemaError::NotIndexable { span, .. }
            | SemaError::IllegalConstruct { span, .. } => *span,
        }
    }
}

impl fmt::Display for SemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemaError::UndefinedIdentifier { name, suggestions, .. } => {
                write!(f, "undefined identifier `{name}`")?;
                if !suggestions.is_empty() {
                    write!(f, " (did you mean {}?)", suggestions.join(", "))?;
                }
                Ok(())
            }
            SemaError::UndefinedFunction { name, closest, .. } => {
                write!(f, "undefined function `{name}`")?;
                if let Some(c) = closest {
                    write!(f, " (did you mean `{c}`?)")?;
                }
                Ok(())
            }
            SemaError::TypeMismatch { expected, found, context, .. } => {
                write!(f, "type mismatch in {context}: expected `{expected}`, found `{found}`")
            }
            SemaError::UnknownType { name, .. } => {
                write!(f, "unknown type `{name}`")
            }
            SemaError::WrongArgCount { name, expected, found, .. } => {
                write!(f, "`{name}` expects {expected} argument(s), got {found}")
            }
            SemaError::DuplicateSignature { name, .. } => {
                write!(f, "duplicate signature for function `{name}`")
            }
            SemaError::AmbiguousOverload { name, .. } => {
                write!(f, "ambiguous call to overloaded function `{name}`")
            }
            SemaError::AmbiguousModule {
                name,
                first_path,
                first_line,
                second_path,
                second_line,
                ..
            } => {
                write!(
                    f,
                    "ambiguous module name `{name}`: could refer to `{first_path}` (imported at line {first_line}) or `{second_path}` (imported at line {second_line})"
                )
            }
            SemaError::PrivateFunction { module, name, .. } => {
                write!(f, "function `{name}` in module `{module}` is private")
            }
            SemaError::ModuleLoad { path, message, .. } => {
                write!(f, "cannot load module `{path}`: {message}")
            }
            SemaError::NonExhaustiveMatch { missing, .. } => {
                write!(f, "non-exhaustive match, missing case: {}", missing.join(", "))
            }
            SemaError::NullabilityMismatch { expected, found, .. } => {
                write!(
                    f,
                    "cannot assign optional `{found}` where `{expected}` is expected; unwrap it explicitly"
                )
            }
            SemaError::UnknownField { struct_name, field, .. } => {
                write!(f, "struct `{struct_name}` has no field `{field}`")
            }
            SemaError::NoSuchField { ty, field, .. } => {
                write!(f, "type `{ty}` has no field `{field}`")
            }
            SemaError::NotIndexable { ty, .. } => {
                write!(f, "type `{ty}` cannot be indexed")
            }
            SemaError::IllegalConstruct { message, .. } => {
                write!(f, "{message}")
            }
        }
    }
}

impl std::error::Error for SemaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_both_sides_of_mismatch() {
        let err = SemaError::TypeMismatch {
            expected: Type::Int,
            found: Type::String,
            context: "argument 2 of `f`".into(),
            span: Span::new(0, 1),
        };
        let msg = err.to_string();
        assert!(msg.contains("Int"));
        assert!(msg.contains("String"));
        assert!(msg.contains("argument 2 of `f`"));
    }

    #[test]
    fn display_missing_cases() {
        let err = SemaError::NonExhaustiveMatch {
            enum_name: "Color".into(),
            missing: vec!["Blue".into()],
            span: Span::new(0, 1),
        };
        assert_eq!(err.to_string(), "non-exhaustive match, missing case: Blue");
    }
}
