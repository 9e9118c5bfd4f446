//! Ariadne-based diagnostic rendering for semantic errors.
//!
//! Renders `SemaError` variants into formatted, labeled messages with
//! stable error codes. Output is colorless so tests and logs stay clean.

use std::ops::Range;

use ariadne::{Config, Label, Report, ReportKind, Source};

use crate::error::SemaError;
use crate::ty::Type;

/// Assign a stable error code to each variant.
pub fn error_code(err: &SemaError) -> &'static str {
    match err {
        SemaError::UndefinedIdentifier { .. } => "E0001",
        SemaError::UndefinedFunction { .. } => "E0002",
        SemaError::TypeMismatch { .. } => "E0003",
        SemaError::UnknownType { .. } => "E0004",
        SemaError::WrongArgCount { .. } => "E0005",
        SemaError::DuplicateSignature { .. } => "E0006",
        SemaError::AmbiguousOverload { .. } => "E0007",
        SemaError::AmbiguousModule { .. } => "E0008",
        SemaError::PrivateFunction { .. } => "E0009",
        SemaError::ModuleLoad { .. } => "E0010",
        SemaError::NonExhaustiveMatch { .. } => "E0011",
        SemaError::NullabilityMismatch { .. } => "E0012",
        SemaError::UnknownField { .. } | SemaError::NoSuchField { .. } => "E0013",
        SemaError::NotIndexable { .. } => "E0014",
        SemaError::IllegalConstruct { .. } => "E0015",
    }
}

/// Generate a fix suggestion for a mismatch when a plausible one exists.
fn fix_suggestion(expected: &Type, found: &Type) -> Option<String> {
    match (expected, found) {
        (Type::Optional(inner), f) if **inner == *f => Some("wrap the value in Some(...)".into()),
        (Type::Result(ok, _), f) if **ok == *f => Some("wrap the value in Ok(...)".into()),
        (Type::Int, Type::Float) => Some("convert with .to_int()".into()),
        (Type::Float, Type::Int) => Some("convert with .to_float()".into()),
        (Type::String, Type::Int) | (Type::String, Type::Float) => {
            Some("convert with .to_string()".into())
        }
        _ => None,
    }
}

/// Render a semantic error into a formatted diagnostic string.
pub fn render_diagnostic(error: &SemaError, source: &str, _filename: &str) -> String {
    let config = Config::default().with_color(false);
    let source_len = source.len();

    // Clamp a range into source bounds; ariadne wants non-empty spans.
    let clamp = |r: Range<usize>| -> Range<usize> {
        let s = r.start.min(source_len);
        let e = r.end.min(source_len).max(s);
        if s == e {
            s..e.saturating_add(1).min(source_len)
        } else {
            s..e
        }
    };

    let code = error_code(error);
    let span = clamp(error.span().range());
    let msg = error.to_string();

    let mut builder = Report::build(ReportKind::Error, span.clone())
        .with_code(code)
        .with_message(&msg)
        .with_config(config);

    match error {
        SemaError::UndefinedIdentifier { suggestions, .. } => {
            builder.add_label(Label::new(span).with_message("not found in this scope"));
            if !suggestions.is_empty() {
                builder.set_help(format!("similar names in scope: {}", suggestions.join(", ")));
            }
        }
        SemaError::UndefinedFunction { closest, .. } => {
            builder.add_label(Label::new(span).with_message("no matching function"));
            if let Some(c) = closest {
                builder.set_help(format!("did you mean `{c}`?"));
            }
        }
        SemaError::TypeMismatch { expected, found, .. } => {
            builder.add_label(
                Label::new(span).with_message(format!("expected `{expected}`, found `{found}`")),
            );
            if let Some(fix) = fix_suggestion(expected, found) {
                builder.set_help(fix);
            }
        }
        SemaError::WrongArgCount { expected, found, .. } => {
            builder.add_label(
                Label::new(span).with_message(format!("expected {expected} argument(s)")),
            );
            if found < expected {
                builder.set_help(format!("missing {} argument(s)", expected - found));
            } else {
                builder.set_help(format!("{} extra argument(s)", found - expected));
            }
        }
        SemaError::AmbiguousModule {
            first_path,
            first_line,
            second_path,
            second_line,
            name,
            ..
        } => {
            builder.add_label(Label::new(span).with_message("ambiguous short name"));
            builder.set_help(format!(
                "`{name}` was imported as `{first_path}` (line {first_line}) and `{second_path}` (line {second_line}); use the full path to disambiguate"
            ));
        }
        SemaError::PrivateFunction { .. } => {
            builder.add_label(Label::new(span).with_message("private to its module"));
            builder.set_help("only `pub` functions can be called from outside their module");
        }
        SemaError::NonExhaustiveMatch { missing, .. } => {
            builder.add_label(
                Label::new(span).with_message(format!("missing: {}", missing.join(", "))),
            );
            builder.set_help("add arms for the missing variants or a `_` arm");
        }
        SemaError::NullabilityMismatch { .. } => {
            builder.add_label(Label::new(span).with_message("optional value in a non-optional slot"));
            builder.set_help("match on the value or use `??` to provide a default");
        }
        _ => {
            builder.add_label(Label::new(span).with_message(msg.clone()));
        }
    }

    let report = builder.finish();
    let mut buf = Vec::new();
    let cache = Source::from(source);
    report
        .write(cache, &mut buf)
        .expect("diagnostic rendering never fails on an in-memory buffer");
    String::from_utf8(buf).expect("diagnostic output is valid UTF-8")
}
