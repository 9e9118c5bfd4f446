//! Enum match exhaustiveness checking.
//!
//! The check is a coverage scan, not a usefulness computation: it fires
//! only when the matched value's type is an enum and no arm carries a
//! wildcard. Arms cover a variant when they name it — as a bare
//! identifier, a qualified `Enum::Variant` / `Enum.Variant` form, or a
//! payload pattern `Variant(..)` — including through or-patterns and
//! guards. Every declared variant left uncovered is reported.
//!
//! Union, option, and result scrutinees are exempt; bindings and guards
//! are assumed to cover them.

use wyn_parser::ast::{Pattern, PatternKind};

use crate::registry::EnumDefInfo;

/// Scan the arms of a match over `enum_def` and return the uncovered
/// variant names, in declaration order. An empty result means the match
/// is exhaustive.
pub fn missing_variants(enum_def: &EnumDefInfo, patterns: &[&Pattern]) -> Vec<String> {
    if patterns.iter().any(|p| p.has_wildcard()) {
        return Vec::new();
    }

    let mut covered = vec![false; enum_def.variants.len()];
    for pattern in patterns {
        mark_covered(enum_def, pattern, &mut covered);
    }

    enum_def
        .variants
        .iter()
        .zip(&covered)
        .filter(|(_, c)| !**c)
        .map(|(v, _)| v.name.clone())
        .collect()
}

/// Mark every variant this pattern names, descending through guards and
/// or-alternatives.
fn mark_covered(enum_def: &EnumDefInfo, pattern: &Pattern, covered: &mut [bool]) {
    match &pattern.kind {
        PatternKind::Binding(name) => {
            mark_by_name(enum_def, name, covered);
        }
        PatternKind::Variant { enum_name, variant, .. } => {
            // A qualifier naming a different enum covers nothing here.
            if enum_name.as_deref().map_or(true, |q| q == enum_def.name) {
                mark_by_name(enum_def, variant, covered);
            }
        }
        PatternKind::Or(alts) => {
            for alt in alts {
                mark_covered(enum_def, alt, covered);
            }
        }
        PatternKind::Guard { inner, .. } => {
            mark_covered(enum_def, inner, covered);
        }
        _ => {}
    }
}

fn mark_by_name(enum_def: &EnumDefInfo, name: &str, covered: &mut [bool]) {
    if let Some(idx) = enum_def.variants.iter().position(|v| v.name == name) {
        covered[idx] = true;
    }
}
