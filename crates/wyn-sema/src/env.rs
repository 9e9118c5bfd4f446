//! Symbol environment: a stack of scopes with overload-aware insertion.
//!
//! Each scope maps identifiers to a vector of symbols; plain values and
//! types occupy a single slot, functions may accumulate overloads.
//! Lookup searches from the innermost scope outward; insertion always
//! targets the innermost scope.

use rustc_hash::FxHashMap;

use crate::ty::Type;

/// A declared symbol: its type, mutability, a used flag maintained on
/// lookup, and the mangled name functions get for overload-resolved
/// emission.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub ty: Type,
    pub is_mutable: bool,
    pub used: bool,
    pub mangled_name: Option<String>,
}

impl Symbol {
    pub fn value(ty: Type, is_mutable: bool) -> Self {
        Symbol {
            ty,
            is_mutable,
            used: false,
            mangled_name: None,
        }
    }

    pub fn function(name: &str, ty: Type) -> Self {
        let mangled_name = mangle(name, &ty);
        Symbol {
            ty,
            is_mutable: false,
            used: false,
            mangled_name,
        }
    }
}

/// Failure modes of overload insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    /// A function with an identical parameter list already exists.
    DuplicateSignature,
}

/// The scope stack. Index 0 is the global scope; it is never popped.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<FxHashMap<String, Vec<Symbol>>>,
}

impl SymbolTable {
    /// Create a table with a single empty global scope.
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![FxHashMap::default()],
        }
    }

    /// Push a new empty scope.
    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Pop the innermost scope.
    ///
    /// # Panics
    ///
    /// Panics if only the global scope remains.
    pub fn pop_scope(&mut self) {
        assert!(self.scopes.len() > 1, "cannot pop the global scope");
        self.scopes.pop();
    }

    /// Number of scopes on the stack.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Insert a value symbol into the innermost scope, shadowing any
    /// earlier binding of the same name in that scope.
    pub fn insert(&mut self, name: impl Into<String>, symbol: Symbol) {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .insert(name.into(), vec![symbol]);
    }

    /// Insert a value symbol into the global scope regardless of nesting.
    pub fn insert_global(&mut self, name: impl Into<String>, symbol: Symbol) {
        self.scopes[0].insert(name.into(), vec![symbol]);
    }

    /// Insert a function symbol, appending to the overload vector when a
    /// function of the same name but a different signature exists.
    /// Identical signatures are rejected.
    pub fn insert_overload(
        &mut self,
        name: impl Into<String>,
        symbol: Symbol,
    ) -> Result<(), InsertError> {
        let name = name.into();
        let scope = self.scopes.last_mut().expect("scope stack is never empty");
        let slot = scope.entry(name).or_default();

        if slot.is_empty() || !matches!(slot[0].ty, Type::Function(_)) {
            // First binding, or a non-function being replaced by a function.
            slot.clear();
            slot.push(symbol);
            return Ok(());
        }

        for existing in slot.iter() {
            if signatures_equal(&existing.ty, &symbol.ty) {
                return Err(InsertError::DuplicateSignature);
            }
        }
        slot.push(symbol);
        Ok(())
    }

    /// Insert a function overload into the global scope.
    pub fn insert_overload_global(
        &mut self,
        name: impl Into<String>,
        symbol: Symbol,
    ) -> Result<(), InsertError> {
        let name = name.into();
        let slot = self.scopes[0].entry(name).or_default();
        if slot.is_empty() || !matches!(slot[0].ty, Type::Function(_)) {
            slot.clear();
            slot.push(symbol);
            return Ok(());
        }
        for existing in slot.iter() {
            if signatures_equal(&existing.ty, &symbol.ty) {
                return Err(InsertError::DuplicateSignature);
            }
        }
        slot.push(symbol);
        Ok(())
    }

    /// Look up a name, innermost scope first. Returns the primary symbol.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        for scope in self.scopes.iter().rev() {
            if let Some(syms) = scope.get(name) {
                return syms.first();
            }
        }
        None
    }

    /// Look up the full overload vector for a name.
    pub fn lookup_overloads(&self, name: &str) -> Option<&[Symbol]> {
        for scope in self.scopes.iter().rev() {
            if let Some(syms) = scope.get(name) {
                return Some(syms.as_slice());
            }
        }
        None
    }

    /// Whether a name is bound anywhere on the stack.
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Mark the nearest binding of `name` as used.
    pub fn mark_used(&mut self, name: &str) {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(syms) = scope.get_mut(name) {
                for s in syms {
                    s.used = true;
                }
                return;
            }
        }
    }

    /// Iterate over the names visible in every scope, innermost last.
    /// Used for fuzzy suggestions on unresolved identifiers.
    pub fn visible_names(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().flat_map(|s| s.keys().map(|k| k.as_str()))
    }

    /// Iterate over the global scope's symbols (for downstream phases).
    pub fn globals(&self) -> impl Iterator<Item = (&str, &[Symbol])> {
        self.scopes[0].iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Two function types have equal signatures when their parameter lists
/// match pairwise. Return types do not participate.
pub fn signatures_equal(a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::Function(fa), Type::Function(fb)) => {
            fa.params.len() == fb.params.len()
                && fa.params.iter().zip(&fb.params).all(|(x, y)| x == y)
        }
        _ => false,
    }
}

/// Mangled name for a function symbol: the name followed by `_`-joined
/// parameter types. Non-functions get no mangled name.
pub fn mangle(name: &str, ty: &Type) -> Option<String> {
    let ft = ty.as_function()?;
    let mut out = String::from(name);
    for p in &ft.params {
        out.push('_');
        out.push_str(&p.to_string());
    }
    Some(out)
}
