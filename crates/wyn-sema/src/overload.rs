//! Overload resolution by scoring.
//!
//! Each candidate signature is scored against the actual argument types:
//! +10 per exact match, +5 per Int-to-Float widening, no score on any
//! other mismatch. Variadic candidates accept extra arguments past their
//! declared minimum and get a +1 tiebreaker. The highest score wins;
//! ties among distinct candidates are an ambiguity.

use crate::env::Symbol;
use crate::ty::Type;

const EXACT_MATCH: i32 = 10;
const WIDENING_MATCH: i32 = 5;
const VARIADIC_BONUS: i32 = 1;

/// Outcome of resolving a call against an overload chain.
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Index of the winning candidate.
    Best(usize),
    /// Two or more candidates tied at the top score.
    Ambiguous(Vec<usize>),
    /// No candidate accepted the arguments.
    NoMatch,
}

/// Score one candidate, or `None` when it cannot accept the arguments.
pub fn score_candidate(candidate: &Type, args: &[Type]) -> Option<i32> {
    let ft = candidate.as_function()?;

    if ft.is_variadic {
        if args.len() < ft.params.len() {
            return None;
        }
    } else if args.len() != ft.params.len() {
        return None;
    }

    let mut score = 0;
    for (param, arg) in ft.params.iter().zip(args) {
        if param == arg {
            score += EXACT_MATCH;
        } else if can_widen(arg, param) {
            score += WIDENING_MATCH;
        } else {
            return None;
        }
    }

    if ft.is_variadic && args.len() > ft.params.len() {
        score += VARIADIC_BONUS;
    }
    Some(score)
}

/// Implicit conversions accepted in call arguments. Only Int widens to
/// Float; nothing else converts.
fn can_widen(from: &Type, to: &Type) -> bool {
    matches!((from, to), (Type::Int, Type::Float))
}

/// Resolve a call against the overload chain for a name.
pub fn resolve(overloads: &[Symbol], args: &[Type]) -> Resolution {
    let mut best_score = i32::MIN;
    let mut best: Vec<usize> = Vec::new();

    for (i, sym) in overloads.iter().enumerate() {
        let Some(score) = score_candidate(&sym.ty, args) else {
            continue;
        };
        if score > best_score {
            best_score = score;
            best = vec![i];
        } else if score == best_score {
            best.push(i);
        }
    }

    match best.len() {
        0 => Resolution::NoMatch,
        1 => Resolution::Best(best[0]),
        _ => Resolution::Ambiguous(best),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Symbol;

    fn sym(params: Vec<Type>, ret: Type) -> Symbol {
        Symbol::function("f", Type::function(params, ret))
    }

    #[test]
    fn exact_match_beats_widening() {
        let overloads = vec![
            sym(vec![Type::Int], Type::Int),
            sym(vec![Type::Float], Type::Int),
        ];
        // f(3) resolves to the Int overload with score 10.
        assert_eq!(resolve(&overloads, &[Type::Int]), Resolution::Best(0));
        assert_eq!(
            score_candidate(&overloads[0].ty, &[Type::Int]),
            Some(10)
        );
        assert_eq!(
            score_candidate(&overloads[1].ty, &[Type::Int]),
            Some(5)
        );
    }

    #[test]
    fn float_argument_picks_float_overload() {
        let overloads = vec![
            sym(vec![Type::Int], Type::Int),
            sym(vec![Type::Float], Type::Int),
        ];
        assert_eq!(resolve(&overloads, &[Type::Float]), Resolution::Best(1));
    }

    #[test]
    fn mismatch_is_disqualifying() {
        let candidate = Type::function(vec![Type::Int, Type::String], Type::Void);
        assert_eq!(score_candidate(&candidate, &[Type::Int, Type::Int]), None);
        assert_eq!(score_candidate(&candidate, &[Type::Int]), None);
    }

    #[test]
    fn variadic_needs_min_arity_and_gets_bonus() {
        let variadic = Symbol::function("f", Type::variadic(vec![Type::String], Type::Void));
        assert_eq!(score_candidate(&variadic.ty, &[]), None);
        assert_eq!(score_candidate(&variadic.ty, &[Type::String]), Some(10));
        assert_eq!(
            score_candidate(&variadic.ty, &[Type::String, Type::Int]),
            Some(11)
        );
    }

    #[test]
    fn ties_are_ambiguous() {
        // Two unrelated nominal params cannot tie, so force a tie with
        // two widening candidates.
        let overloads = vec![
            sym(vec![Type::Float, Type::Int], Type::Int),
            sym(vec![Type::Int, Type::Float], Type::Int),
        ];
        // Both score 15 for (Int, Int).
        assert_eq!(
            resolve(&overloads, &[Type::Int, Type::Int]),
            Resolution::Ambiguous(vec![0, 1])
        );
    }

    #[test]
    fn no_candidate_matches() {
        let overloads = vec![sym(vec![Type::Int], Type::Int)];
        assert_eq!(resolve(&overloads, &[Type::String]), Resolution::NoMatch);
    }
}
