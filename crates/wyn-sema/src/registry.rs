//! Registries owned by the analyzer context: named types, generic
//! templates and their instantiations, traits, imports, and cross-module
//! function visibility.
//!
//! The type registry is the arena that breaks type-level cycles: a struct
//! field of struct type stores only the name, and layout questions go
//! through the registry.

use rustc_hash::FxHashMap;

use crate::ty::Type;

// ── Named types ─────────────────────────────────────────────────────────

/// A registered struct definition with its fields and generic parameters.
#[derive(Debug, Clone)]
pub struct StructDefInfo {
    pub name: String,
    /// Names of generic type parameters (e.g. `["T"]` for `Box<T>`).
    pub generic_params: Vec<String>,
    /// Field names and their types. Types may reference generic params.
    pub fields: Vec<(String, Type)>,
}

/// A single variant of an enum: nullary or data-carrying.
#[derive(Debug, Clone)]
pub struct VariantInfo {
    pub name: String,
    pub params: Vec<Type>,
}

/// A registered enum definition with its variants.
#[derive(Debug, Clone)]
pub struct EnumDefInfo {
    pub name: String,
    pub variants: Vec<VariantInfo>,
}

impl EnumDefInfo {
    pub fn variant(&self, name: &str) -> Option<&VariantInfo> {
        self.variants.iter().find(|v| v.name == name)
    }
}

/// Registry of named types: built-ins seeded at startup, user structs and
/// enums registered in Pass 0, and type aliases.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    pub struct_defs: FxHashMap<String, StructDefInfo>,
    pub enum_defs: FxHashMap<String, EnumDefInfo>,
    pub aliases: FxHashMap<String, Type>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_struct(&mut self, info: StructDefInfo) {
        self.struct_defs.insert(info.name.clone(), info);
    }

    pub fn register_enum(&mut self, info: EnumDefInfo) {
        self.enum_defs.insert(info.name.clone(), info);
    }

    pub fn register_alias(&mut self, name: impl Into<String>, ty: Type) {
        self.aliases.insert(name.into(), ty);
    }

    pub fn struct_def(&self, name: &str) -> Option<&StructDefInfo> {
        self.struct_defs.get(name)
    }

    pub fn enum_def(&self, name: &str) -> Option<&EnumDefInfo> {
        self.enum_defs.get(name)
    }

    pub fn alias(&self, name: &str) -> Option<&Type> {
        self.aliases.get(name)
    }

    /// The field type of a named struct, looked up through the registry.
    pub fn field_type(&self, struct_name: &str, field: &str) -> Option<&Type> {
        self.struct_defs
            .get(struct_name)?
            .fields
            .iter()
            .find(|(n, _)| n == field)
            .map(|(_, t)| t)
    }
}

// ── Generics ────────────────────────────────────────────────────────────

/// A generic function template: parameter and return types may contain
/// `Type::Generic` placeholders.
#[derive(Debug, Clone)]
pub struct GenericFnTemplate {
    pub name: String,
    pub type_params: Vec<String>,
    pub params: Vec<Type>,
    pub ret: Type,
}

/// A generic struct template.
#[derive(Debug, Clone)]
pub struct GenericStructTemplate {
    pub name: String,
    pub type_params: Vec<String>,
    pub fields: Vec<(String, Type)>,
}

/// A recorded monomorphization request.
#[derive(Debug, Clone, PartialEq)]
pub struct Instantiation {
    pub template: String,
    pub type_args: Vec<Type>,
}

/// Registry of generic templates plus every instantiation observed during
/// analysis, for a later monomorphization pass.
#[derive(Debug, Default)]
pub struct GenericRegistry {
    pub fn_templates: FxHashMap<String, GenericFnTemplate>,
    pub struct_templates: FxHashMap<String, GenericStructTemplate>,
    pub instantiations: Vec<Instantiation>,
}

impl GenericRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_fn(&mut self, template: GenericFnTemplate) {
        self.fn_templates.insert(template.name.clone(), template);
    }

    pub fn register_struct(&mut self, template: GenericStructTemplate) {
        self.struct_templates.insert(template.name.clone(), template);
    }

    pub fn is_generic_fn(&self, name: &str) -> bool {
        self.fn_templates.contains_key(name)
    }

    pub fn is_generic_struct(&self, name: &str) -> bool {
        self.struct_templates.contains_key(name)
    }

    /// Record `(template, type_args)`, deduplicating repeats.
    pub fn record_instantiation(&mut self, template: &str, type_args: Vec<Type>) {
        let inst = Instantiation {
            template: template.to_string(),
            type_args,
        };
        if !self.instantiations.contains(&inst) {
            self.instantiations.push(inst);
        }
    }

    /// The mangled name of a monomorphized instance, e.g. `id_Int`.
    pub fn monomorphic_name(template: &str, type_args: &[Type]) -> String {
        let mut out = String::from(template);
        for arg in type_args {
            out.push('_');
            out.push_str(&arg.to_string());
        }
        out
    }
}

// ── Traits ──────────────────────────────────────────────────────────────

/// A trait method signature.
#[derive(Debug, Clone)]
pub struct TraitMethodSig {
    pub name: String,
    pub params: Vec<Type>,
    pub ret: Type,
    pub has_default: bool,
}

/// A registered trait definition.
#[derive(Debug, Clone)]
pub struct TraitDef {
    pub name: String,
    pub methods: Vec<TraitMethodSig>,
}

/// Registry of trait definitions and `(type, trait) -> methods` impls.
#[derive(Debug, Default)]
pub struct TraitRegistry {
    traits: FxHashMap<String, TraitDef>,
    impls: FxHashMap<(String, String), Vec<String>>,
}

impl TraitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_trait(&mut self, def: TraitDef) {
        self.traits.insert(def.name.clone(), def);
    }

    pub fn get_trait(&self, name: &str) -> Option<&TraitDef> {
        self.traits.get(name)
    }

    pub fn register_impl(
        &mut self,
        type_name: impl Into<String>,
        trait_name: impl Into<String>,
        methods: Vec<String>,
    ) {
        self.impls
            .insert((type_name.into(), trait_name.into()), methods);
    }

    pub fn implements(&self, type_name: &str, trait_name: &str) -> bool {
        self.impls
            .contains_key(&(type_name.to_string(), trait_name.to_string()))
    }
}

// ── Imports ─────────────────────────────────────────────────────────────

/// One registered import: short name, canonical path, source line.
#[derive(Debug, Clone)]
pub struct ImportedModule {
    pub short_name: String,
    pub full_path: String,
    pub line: u32,
}

/// The import table. Ambiguity is detected lazily at use sites: two
/// imports may share a short name until someone references it.
#[derive(Debug, Default)]
pub struct ImportTable {
    imports: Vec<ImportedModule>,
}

impl ImportTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, short_name: impl Into<String>, full_path: impl Into<String>, line: u32) {
        self.imports.push(ImportedModule {
            short_name: short_name.into(),
            full_path: full_path.into(),
            line,
        });
    }

    /// Whether any import registered this short name.
    pub fn is_registered(&self, short_name: &str) -> bool {
        self.imports.iter().any(|m| m.short_name == short_name)
    }

    /// If `short_name` maps to two distinct full paths, return both
    /// imports so the diagnostic can cite their lines.
    pub fn ambiguity(&self, short_name: &str) -> Option<(&ImportedModule, &ImportedModule)> {
        let mut first: Option<&ImportedModule> = None;
        for m in self.imports.iter().filter(|m| m.short_name == short_name) {
            match first {
                None => first = Some(m),
                Some(f) if f.full_path != m.full_path => return Some((f, m)),
                Some(_) => {}
            }
        }
        None
    }
}

// ── Visibility ──────────────────────────────────────────────────────────

/// `(module, function) -> public?` table recorded while functions are
/// declared; consulted at cross-module call sites.
#[derive(Debug, Default)]
pub struct VisibilityTable {
    entries: FxHashMap<(String, String), bool>,
}

impl VisibilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, module: impl Into<String>, func: impl Into<String>, is_public: bool) {
        self.entries.insert((module.into(), func.into()), is_public);
    }

    /// Whether `module::func` may be called from `current_module`. Calls
    /// within the declaring module are always allowed; unknown functions
    /// are assumed public.
    pub fn is_callable_from(&self, current_module: &str, module: &str, func: &str) -> bool {
        if current_module == module {
            return true;
        }
        self.entries
            .get(&(module.to_string(), func.to_string()))
            .copied()
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instantiations_deduplicate() {
        let mut g = GenericRegistry::new();
        g.record_instantiation("id", vec![Type::Int]);
        g.record_instantiation("id", vec![Type::Int]);
        g.record_instantiation("id", vec![Type::String]);
        assert_eq!(g.instantiations.len(), 2);
        assert_eq!(
            GenericRegistry::monomorphic_name("id", &[Type::Int]),
            "id_Int"
        );
    }

    #[test]
    fn import_ambiguity_requires_distinct_paths() {
        let mut t = ImportTable::new();
        t.register("m", "math", 1);
        t.register("m", "math", 2);
        assert!(t.ambiguity("m").is_none(), "same path twice is a duplicate, not ambiguous");
        t.register("m", "geometry::math", 3);
        let (a, b) = t.ambiguity("m").expect("distinct paths are ambiguous");
        assert_eq!(a.full_path, "math");
        assert_eq!(b.full_path, "geometry::math");
    }

    #[test]
    fn visibility_defaults_to_public() {
        let mut v = VisibilityTable::new();
        v.record("math", "helper", false);
        v.record("math", "pi", true);
        assert!(v.is_callable_from("", "math", "pi"));
        assert!(!v.is_callable_from("", "math", "helper"));
        // Same-module calls always allowed.
        assert!(v.is_callable_from("math", "math", "helper"));
        // Unknown functions assumed public.
        assert!(v.is_callable_from("", "math", "unknown"));
    }

    #[test]
    fn trait_impls_key_by_type_and_trait() {
        let mut t = TraitRegistry::new();
        t.register_trait(TraitDef {
            name: "Printable".into(),
            methods: vec![TraitMethodSig {
                name: "describe".into(),
                params: vec![],
                ret: Type::String,
                has_default: false,
            }],
        });
        t.register_impl("Point", "Printable", vec!["describe".into()]);
        assert!(t.implements("Point", "Printable"));
        assert!(!t.implements("Size", "Printable"));
        assert_eq!(t.get_trait("Printable").unwrap().methods.len(), 1);
    }

    #[test]
    fn field_lookup_goes_through_registry() {
        let mut r = TypeRegistry::new();
        r.register_struct(StructDefInfo {
            name: "Node".into(),
            generic_params: vec![],
            fields: vec![
                ("value".into(), Type::Int),
                // A self-referential field stores only the name.
                ("next".into(), Type::optional(Type::Struct("Node".into()))),
            ],
        });
        assert_eq!(r.field_type("Node", "value"), Some(&Type::Int));
        assert!(r.field_type("Node", "missing").is_none());
    }
}
