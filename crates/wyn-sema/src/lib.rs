//! Wyn semantic analyzer.
//!
//! Consumes the parser's AST and (a) builds a typed symbol environment,
//! (b) resolves identifiers through nested scopes with cross-module
//! visibility, (c) infers and checks types, (d) resolves overloads and
//! methods, and (e) checks pattern-match exhaustiveness.
//!
//! # Architecture
//!
//! - [`ty`]: the type representation (display, parsing, equality rules)
//! - [`env`]: scope stack with overload-aware symbol insertion
//! - [`registry`]: type/trait/generic/import/visibility registries
//! - [`builtins`]: the seeded standard-library surface
//! - [`methods`]: built-in method dispatch by receiver kind
//! - [`overload`]: call-site overload scoring
//! - [`exhaustiveness`]: enum match coverage
//! - [`infer`]: the three-pass analyzer driver
//! - [`loader`]: module loading with a canonical-path cache
//! - [`error`] / [`diagnostics`]: the taxonomy and its rendering

pub mod builtins;
pub mod diagnostics;
pub mod env;
pub mod error;
pub mod exhaustiveness;
pub mod infer;
pub mod loader;
pub mod methods;
pub mod overload;
pub mod registry;
pub mod ty;

use rustc_hash::FxHashMap;

use wyn_parser::ast::ExprId;
use wyn_parser::Parse;

use crate::error::SemaError;
use crate::registry::Instantiation;
use crate::ty::Type;

pub use crate::infer::{compatible, Analyzer};

/// The result of analyzing a Wyn program.
pub struct SemaResult {
    /// Resolved type per expression node. Populated write-once during
    /// analysis; an id may be absent only when `had_error` is set.
    pub types: FxHashMap<ExprId, Type>,
    /// Captured identifiers per lambda node, by reference, in first-use
    /// order.
    pub captures: FxHashMap<ExprId, Vec<String>>,
    /// Every diagnostic found, in discovery order.
    pub errors: Vec<SemaError>,
    /// Every generic instantiation observed, for monomorphization.
    pub instantiations: Vec<Instantiation>,
    /// Exported functions merged in from imported modules.
    pub merged_functions: Vec<String>,
    /// The sticky error flag; code generation must refuse when set.
    pub had_error: bool,
}

impl SemaResult {
    /// The resolved type of an expression, if analysis reached it.
    pub fn type_of(&self, id: ExprId) -> Option<&Type> {
        self.types.get(&id)
    }

    /// Render all diagnostics as formatted strings.
    pub fn render_errors(&self, source: &str, filename: &str) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| diagnostics::render_diagnostic(e, source, filename))
            .collect()
    }
}

/// Analyze a parsed Wyn program. Module imports resolve relative to the
/// current directory; use [`check_in_dir`] to point them elsewhere.
pub fn check(parse: &Parse) -> SemaResult {
    let mut analyzer = Analyzer::new();
    analyzer.check_program(parse);
    analyzer.into_result()
}

/// Analyze with module imports resolved under `base_dir`.
pub fn check_in_dir(parse: &Parse, base_dir: impl Into<std::path::PathBuf>) -> SemaResult {
    let mut analyzer = Analyzer::with_base_dir(base_dir);
    analyzer.check_program(parse);
    analyzer.into_result()
}
