//! The analyzer: a three-pass traversal that builds the symbol
//! environment, resolves identifiers, infers and checks types, resolves
//! overloads and methods, and checks pattern exhaustiveness.
//!
//! All state lives in the [`Analyzer`] context struct: the scope stack,
//! the registries, the current module, and the error sink. Checking
//! functions push diagnostics and return a sentinel `Type::Int` so that
//! analysis continues past the first mistake; `had_error` is the sticky
//! verdict.

use rustc_hash::FxHashMap;

use wyn_common::span::{LineIndex, Span};
use wyn_parser::ast::expr::{BinaryOp, UnaryOp};
use wyn_parser::ast::{
    EnumDecl, Expr, ExprId, ExprKind, FnDecl, InterpPart, MatchArm, Param, Pattern, PatternKind,
    Stmt, StmtKind, StructDecl, TypeExpr, TypeExprKind, VarBinding,
};
use wyn_parser::Parse;

use crate::builtins::{self, ContractRet};
use crate::env::{InsertError, Symbol, SymbolTable};
use crate::error::SemaError;
use crate::exhaustiveness;
use crate::loader::ModuleLoader;
use crate::methods::{self, ReceiverKind};
use crate::overload::{self, Resolution};
use crate::registry::{
    EnumDefInfo, GenericFnTemplate, GenericRegistry, GenericStructTemplate, ImportTable,
    StructDefInfo, TraitDef, TraitMethodSig, TraitRegistry, TypeRegistry, VariantInfo,
    VisibilityTable,
};
use crate::ty::Type;
use crate::SemaResult;

/// The analyzer context. One per compilation; no process-wide state.
pub struct Analyzer {
    env: SymbolTable,
    pub types: TypeRegistry,
    pub traits: TraitRegistry,
    pub generics: GenericRegistry,
    imports: ImportTable,
    visibility: VisibilityTable,
    loader: ModuleLoader,
    /// Import alias -> full module path.
    module_aliases: FxHashMap<String, String>,
    /// The module currently being analyzed; empty at top level.
    current_module: String,
    /// Declared return type of the enclosing function, when annotated.
    current_fn_return: Option<Type>,
    /// Receiver type inside extension methods and impl methods.
    current_self: Option<Type>,
    /// Nesting depth of function bodies, for the nested-`fn` check.
    fn_depth: u32,
    /// Names of exported functions merged in from imported modules.
    merged_functions: Vec<String>,
    expr_types: FxHashMap<ExprId, Type>,
    captures: FxHashMap<ExprId, Vec<String>>,
    pub errors: Vec<SemaError>,
    had_error: bool,
    line_index: Option<LineIndex>,
}

impl Analyzer {
    /// Initialize the analyzer: registries plus the built-in symbols of
    /// the standard-library surface.
    pub fn new() -> Self {
        Self::with_base_dir(".")
    }

    /// Like [`Analyzer::new`], resolving module imports under `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<std::path::PathBuf>) -> Self {
        let mut env = SymbolTable::new();
        let mut types = TypeRegistry::new();
        builtins::seed(&mut env, &mut types);
        Analyzer {
            env,
            types,
            traits: TraitRegistry::new(),
            generics: GenericRegistry::new(),
            imports: ImportTable::new(),
            visibility: VisibilityTable::new(),
            loader: ModuleLoader::new(base_dir),
            module_aliases: FxHashMap::default(),
            current_module: String::new(),
            current_fn_return: None,
            current_self: None,
            fn_depth: 0,
            merged_functions: Vec::new(),
            expr_types: FxHashMap::default(),
            captures: FxHashMap::default(),
            errors: Vec::new(),
            had_error: false,
            line_index: None,
        }
    }

    /// Whether any diagnostic has been recorded. Sticky.
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    /// The global scope, for downstream phases.
    pub fn global_scope(&self) -> &SymbolTable {
        &self.env
    }

    /// The resolved type of an expression, if analysis reached it.
    pub fn type_of(&self, id: ExprId) -> Option<&Type> {
        self.expr_types.get(&id)
    }

    /// Consume the analyzer into its result.
    pub fn into_result(self) -> SemaResult {
        SemaResult {
            types: self.expr_types,
            captures: self.captures,
            errors: self.errors,
            instantiations: self.generics.instantiations.clone(),
            merged_functions: self.merged_functions,
            had_error: self.had_error,
        }
    }

    fn error(&mut self, err: SemaError) {
        self.had_error = true;
        self.errors.push(err);
    }

    /// Record an expression's resolved type. Write-once: a second write
    /// for the same id is ignored.
    fn record(&mut self, id: ExprId, ty: Type) -> Type {
        self.expr_types.entry(id).or_insert_with(|| ty.clone());
        ty
    }

    fn line_of(&self, span: Span) -> u32 {
        self.line_index
            .as_ref()
            .map(|ix| ix.line(span.start))
            .unwrap_or(0)
    }

    // ── Driver ─────────────────────────────────────────────────────────

    /// Run the three passes over a parsed program.
    pub fn check_program(&mut self, parse: &Parse) {
        self.line_index = Some(LineIndex::new(&parse.source));
        let program = &parse.program;

        // Pass 0: declarations. Names first so definitions can refer to
        // each other, then the definitions themselves.
        for stmt in &program.stmts {
            self.declare_shell(unwrap_export(stmt).0);
        }
        for stmt in &program.stmts {
            let (inner, _) = unwrap_export(stmt);
            self.declare_types(inner);
        }

        // Pass 1: imports, then function signatures.
        for stmt in &program.stmts {
            let (inner, _) = unwrap_export(stmt);
            if let StmtKind::Import { path, path_span, alias } = &inner.kind {
                self.process_import(path, *path_span, alias.as_deref());
            }
        }
        for stmt in &program.stmts {
            let (inner, exported) = unwrap_export(stmt);
            self.declare_signatures(inner, exported);
        }

        // Pass 2: bodies, then every other top-level statement.
        for stmt in &program.stmts {
            self.check_top_stmt(stmt);
        }
    }

    // ── Pass 0: declarations ───────────────────────────────────────────

    /// Register the bare names of nominal types so later resolution in
    /// this pass sees forward references.
    fn declare_shell(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Struct(decl) if decl.generics.is_empty() => {
                self.types.register_struct(StructDefInfo {
                    name: decl.name.clone(),
                    generic_params: vec![],
                    fields: vec![],
                });
            }
            StmtKind::Enum(decl) => {
                self.types.register_enum(EnumDefInfo {
                    name: decl.name.clone(),
                    variants: vec![],
                });
            }
            _ => {}
        }
    }

    fn declare_types(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Struct(decl) => self.declare_struct(decl),
            StmtKind::Enum(decl) => self.declare_enum(decl),
            StmtKind::Extern(decl) => {
                let params: Vec<Type> = decl
                    .params
                    .iter()
                    .map(|t| self.resolve_type_expr(t, &[]))
                    .collect();
                let ret = decl
                    .ret
                    .as_ref()
                    .map(|t| self.resolve_type_expr(t, &[]))
                    .unwrap_or(Type::Int);
                let ty = if decl.is_variadic {
                    Type::variadic(params, ret)
                } else {
                    Type::function(params, ret)
                };
                self.insert_fn(&decl.name, ty, decl.name_span);
            }
            StmtKind::Macro { name, name_span, params, .. } => {
                // Macros are registered as ordinary functions.
                let ty = Type::function(vec![Type::Int; params.len()], Type::Int);
                self.insert_fn(name, ty, *name_span);
            }
            StmtKind::Const { name, init, .. } => {
                let ty = literal_type(init);
                self.env.insert_global(name.clone(), Symbol::value(ty, false));
            }
            StmtKind::TypeAlias { name, aliased, .. } => {
                let ty = self.resolve_type_expr(aliased, &[]);
                self.types.register_alias(name.clone(), ty);
            }
            _ => {}
        }
    }

    fn declare_struct(&mut self, decl: &StructDecl) {
        let fields: Vec<(String, Type)> = decl
            .fields
            .iter()
            .map(|(n, _, t)| (n.clone(), self.resolve_type_expr(t, &decl.generics)))
            .collect();

        if decl.generics.is_empty() {
            self.types.register_struct(StructDefInfo {
                name: decl.name.clone(),
                generic_params: vec![],
                fields,
            });
            self.env.insert_global(
                decl.name.clone(),
                Symbol::value(Type::Struct(decl.name.clone()), false),
            );
        } else {
            self.generics.register_struct(GenericStructTemplate {
                name: decl.name.clone(),
                type_params: decl.generics.clone(),
                fields,
            });
        }
    }

    fn declare_enum(&mut self, decl: &EnumDecl) {
        let variants: Vec<VariantInfo> = decl
            .variants
            .iter()
            .map(|v| VariantInfo {
                name: v.name.clone(),
                params: v.fields.iter().map(|t| self.resolve_type_expr(t, &[])).collect(),
            })
            .collect();
        let has_data = variants.iter().any(|v| !v.params.is_empty());

        self.types.register_enum(EnumDefInfo {
            name: decl.name.clone(),
            variants: variants.clone(),
        });

        let enum_ty = Type::Enum(decl.name.clone());
        self.env
            .insert_global(decl.name.clone(), Symbol::value(enum_ty.clone(), false));

        for variant in &variants {
            // Bare and qualified variant constants, under both `.` and
            // `::` spellings.
            self.env
                .insert_global(variant.name.clone(), Symbol::value(enum_ty.clone(), false));
            self.env.insert_global(
                format!("{}.{}", decl.name, variant.name),
                Symbol::value(enum_ty.clone(), false),
            );
            self.env.insert_global(
                format!("{}::{}", decl.name, variant.name),
                Symbol::value(enum_ty.clone(), false),
            );

            // Tagged-union enums get a constructor per variant.
            if has_data {
                let ctor = format!("{}_{}", decl.name, variant.name);
                let ty = Type::function(variant.params.clone(), enum_ty.clone());
                self.env.insert_global(ctor.clone(), Symbol::function(&ctor, ty));
            }
        }

        // The implicit toString helper: (Enum) -> String.
        let tostring = format!("{}_toString", decl.name);
        let ty = Type::function(vec![enum_ty], Type::String);
        self.env
            .insert_global(tostring.clone(), Symbol::function(&tostring, ty));
    }

    // ── Pass 1: imports and signatures ─────────────────────────────────

    fn process_import(&mut self, path: &str, path_span: Span, alias: Option<&str>) {
        let short = alias
            .map(String::from)
            .unwrap_or_else(|| path.rsplit("::").next().unwrap_or(path).to_string());
        let line = self.line_of(path_span);
        self.imports.register(short.clone(), path, line);
        self.module_aliases.insert(short.clone(), path.to_string());
        // The module name itself becomes a benign symbol so bare
        // references to it do not read as undefined identifiers.
        self.env.insert_global(short.clone(), Symbol::value(Type::Int, false));

        let parse = match self.loader.load_module(path) {
            Ok(p) => p,
            Err(e) => {
                self.error(SemaError::ModuleLoad {
                    path: path.to_string(),
                    message: e.message,
                    span: path_span,
                });
                return;
            }
        };

        // Merge the module's functions: exported ones become callable
        // symbols; every function's visibility is recorded so private
        // ones are rejected at qualified call sites.
        for stmt in &parse.program.stmts {
            let (inner, exported) = unwrap_export(stmt);
            if let StmtKind::Fn(decl) = &inner.kind {
                let is_public = exported || decl.is_public;
                self.visibility.record(short.clone(), decl.name.clone(), is_public);
                if is_public && decl.generics.is_empty() && decl.receiver.is_none() {
                    let ty = self.fn_signature_quiet(decl);
                    let _ = self
                        .env
                        .insert_overload_global(decl.name.clone(), Symbol::function(&decl.name, ty));
                    self.merged_functions.push(decl.name.clone());
                }
            }
        }
    }

    fn declare_signatures(&mut self, stmt: &Stmt, exported: bool) {
        match &stmt.kind {
            StmtKind::Fn(decl) => self.declare_fn_signature(decl, exported),
            StmtKind::Impl(imp) => {
                for method in &imp.methods {
                    let name = format!("{}_{}", imp.target, method.name);
                    let params = self.method_param_types(method);
                    let ret = method
                        .ret
                        .as_ref()
                        .map(|t| self.resolve_type_expr(t, &method.generics))
                        .unwrap_or(Type::Int);
                    self.insert_fn(&name, Type::function(params, ret), method.name_span);
                }
            }
            StmtKind::Trait(decl) => {
                let methods = decl
                    .methods
                    .iter()
                    .map(|m| TraitMethodSig {
                        name: m.decl.name.clone(),
                        params: self.method_param_types(&m.decl),
                        ret: m
                            .decl
                            .ret
                            .as_ref()
                            .map(|t| self.resolve_type_expr(t, &[]))
                            .unwrap_or(Type::Int),
                        has_default: m.has_default,
                    })
                    .collect();
                self.traits.register_trait(TraitDef {
                    name: decl.name.clone(),
                    methods,
                });
            }
            _ => {}
        }
    }

    fn declare_fn_signature(&mut self, decl: &FnDecl, exported: bool) {
        if !decl.generics.is_empty() {
            // Generic functions register the template only.
            let params: Vec<Type> = decl
                .params
                .iter()
                .map(|p| self.param_type(p, &decl.generics))
                .collect();
            let ret = decl
                .ret
                .as_ref()
                .map(|t| self.resolve_type_expr(t, &decl.generics))
                .unwrap_or(Type::Int);
            self.generics.register_fn(GenericFnTemplate {
                name: decl.name.clone(),
                type_params: decl.generics.clone(),
                params,
                ret,
            });
            return;
        }

        let name = match &decl.receiver {
            Some((recv, _)) => format!("{}_{}", recv, decl.name),
            None => decl.name.clone(),
        };

        let ty = self.fn_signature(decl);
        self.insert_fn(&name, ty, decl.name_span);

        if !self.current_module.is_empty() {
            let module = self.current_module.clone();
            self.visibility
                .record(module, name.clone(), exported || decl.is_public);
        }
    }

    fn fn_signature(&mut self, decl: &FnDecl) -> Type {
        let params: Vec<Type> = decl.params.iter().map(|p| self.param_type(p, &[])).collect();
        let ret = decl
            .ret
            .as_ref()
            .map(|t| self.resolve_type_expr(t, &[]))
            .unwrap_or(Type::Int);
        if decl.is_variadic {
            Type::variadic(params, ret)
        } else {
            Type::function(params, ret)
        }
    }

    /// Resolve a merged module function's signature without reporting
    /// unknown types (the module's own nominal types are not imported).
    fn fn_signature_quiet(&mut self, decl: &FnDecl) -> Type {
        let suppressed = std::mem::take(&mut self.errors);
        let had = self.had_error;
        let ty = self.fn_signature(decl);
        self.errors = suppressed;
        self.had_error = had;
        ty
    }

    fn param_type(&mut self, param: &Param, generics: &[String]) -> Type {
        param
            .ty
            .as_ref()
            .map(|t| self.resolve_type_expr(t, generics))
            .unwrap_or(Type::Int)
    }

    /// Parameter types of an impl/trait method, excluding a leading
    /// `self` parameter (the receiver is bound separately).
    fn method_param_types(&mut self, decl: &FnDecl) -> Vec<Type> {
        decl.params
            .iter()
            .filter(|p| p.name != "self")
            .map(|p| self.param_type(p, &decl.generics))
            .collect()
    }

    fn insert_fn(&mut self, name: &str, ty: Type, span: Span) {
        let symbol = Symbol::function(name, ty);
        if let Err(InsertError::DuplicateSignature) = self.env.insert_overload_global(name, symbol)
        {
            self.error(SemaError::DuplicateSignature {
                name: name.to_string(),
                span,
            });
        }
    }

    // ── Pass 2: bodies ─────────────────────────────────────────────────

    fn check_top_stmt(&mut self, stmt: &Stmt) {
        let (inner, _) = unwrap_export(stmt);
        match &inner.kind {
            StmtKind::Fn(decl) => {
                if let Some(body) = &decl.body {
                    let receiver_ty = decl.receiver.as_ref().map(|(recv, _)| {
                        self.named_type(recv).unwrap_or(Type::Int)
                    });
                    self.check_fn_body(decl, body, receiver_ty);
                }
            }
            StmtKind::Impl(imp) => {
                let target_ty = self.named_type(&imp.target).unwrap_or(Type::Int);
                for method in &imp.methods {
                    if let Some(body) = &method.body {
                        self.check_fn_body(method, body, Some(target_ty.clone()));
                    }
                }
            }
            StmtKind::Trait(decl) => {
                for method in &decl.methods {
                    if let Some(body) = &method.decl.body {
                        self.check_fn_body(&method.decl, body, None);
                    }
                }
            }
            // Declarations already handled in earlier passes.
            StmtKind::Struct(_)
            | StmtKind::Enum(_)
            | StmtKind::Extern(_)
            | StmtKind::Macro { .. }
            | StmtKind::TypeAlias { .. }
            | StmtKind::Import { .. }
            | StmtKind::Const { .. } => {}
            _ => self.check_stmt(inner),
        }
    }

    fn check_fn_body(&mut self, decl: &FnDecl, body: &Stmt, receiver_ty: Option<Type>) {
        self.env.push_scope();
        for param in &decl.params {
            if param.name == "self" {
                continue;
            }
            let ty = self.param_type(param, &decl.generics);
            if let Some(default) = &param.default {
                let dt = self.check_expr(default);
                if !compatible(&ty, &dt) {
                    self.error(SemaError::TypeMismatch {
                        expected: ty.clone(),
                        found: dt,
                        context: format!("default value of `{}`", param.name),
                        span: default.span,
                    });
                }
            }
            self.env.insert(param.name.clone(), Symbol::value(ty, true));
        }

        let saved_ret = self.current_fn_return.take();
        self.current_fn_return = decl
            .ret
            .as_ref()
            .map(|t| self.resolve_type_expr(t, &decl.generics));
        let saved_self = self.current_self.take();
        self.current_self = receiver_ty;
        self.fn_depth += 1;

        self.check_stmt(body);

        self.fn_depth -= 1;
        self.current_self = saved_self;
        self.current_fn_return = saved_ret;
        self.env.pop_scope();
    }

    // ── Statement checking ─────────────────────────────────────────────

    fn check_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Var { binding, ty, init } => self.check_var(binding, ty.as_ref(), init.as_ref()),
            StmtKind::Const { name, init, .. } => {
                self.check_expr(init);
                let ty = literal_type(init);
                self.env.insert(name.clone(), Symbol::value(ty, false));
            }
            StmtKind::Expr(expr) => {
                self.check_expr(expr);
            }
            StmtKind::Return(value) => self.check_return(value.as_ref(), stmt.span),
            StmtKind::Block(stmts) => {
                self.env.push_scope();
                for s in stmts {
                    self.check_stmt(s);
                }
                self.env.pop_scope();
            }
            StmtKind::If { cond, then_branch, else_branch } => {
                self.check_expr(cond);
                self.check_stmt(then_branch);
                if let Some(e) = else_branch {
                    self.check_stmt(e);
                }
            }
            StmtKind::While { cond, body } => {
                self.check_expr(cond);
                self.check_stmt(body);
            }
            StmtKind::ForC { init, cond, step, body } => {
                self.env.push_scope();
                if let Some(i) = init {
                    self.check_stmt(i);
                }
                if let Some(c) = cond {
                    self.check_expr(c);
                }
                if let Some(s) = step {
                    self.check_expr(s);
                }
                self.check_stmt(body);
                self.env.pop_scope();
            }
            StmtKind::ForIn { var, iter, body, .. } => {
                self.env.push_scope();
                let it = self.check_expr(iter);
                let elem = element_type(&it);
                self.env.insert(var.clone(), Symbol::value(elem, false));
                self.check_stmt(body);
                self.env.pop_scope();
            }
            StmtKind::Fn(decl) => {
                if self.fn_depth > 0 {
                    self.error(SemaError::IllegalConstruct {
                        message: format!(
                            "nested function declarations are not allowed (`{}`)",
                            decl.name
                        ),
                        span: decl.name_span,
                    });
                } else if let Some(body) = &decl.body {
                    self.check_fn_body(decl, body, None);
                }
            }
            StmtKind::Match { scrutinee, arms } => {
                self.check_match(scrutinee, arms, false);
            }
            StmtKind::Try { body, catches, finally } => {
                self.check_stmt(body);
                for catch in catches {
                    self.env.push_scope();
                    // The caught value's runtime representation is its
                    // message string.
                    self.env
                        .insert(catch.name.clone(), Symbol::value(Type::String, false));
                    self.check_stmt(&catch.body);
                    self.env.pop_scope();
                }
                if let Some(f) = finally {
                    self.check_stmt(f);
                }
            }
            StmtKind::Throw(expr) | StmtKind::Defer(expr) | StmtKind::Spawn(expr) => {
                self.check_expr(expr);
            }
            StmtKind::Unsafe(inner) => self.check_stmt(inner),
            StmtKind::Test { body, .. } => {
                self.env.push_scope();
                self.check_stmt(body);
                self.env.pop_scope();
            }
            StmtKind::Export(inner) => self.check_stmt(inner),
            // Declarations were handled by the earlier passes.
            StmtKind::Struct(_)
            | StmtKind::Enum(_)
            | StmtKind::Impl(_)
            | StmtKind::Trait(_)
            | StmtKind::Extern(_)
            | StmtKind::Macro { .. }
            | StmtKind::TypeAlias { .. }
            | StmtKind::Import { .. }
            | StmtKind::Break
            | StmtKind::Continue => {}
        }
    }

    fn check_var(&mut self, binding: &VarBinding, ann: Option<&TypeExpr>, init: Option<&Expr>) {
        let declared = ann.map(|t| self.resolve_type_expr(t, &[]));
        let actual = init.map(|e| self.check_expr(e));

        let var_ty = match (&declared, &actual) {
            (Some(d), Some(a)) => {
                if !compatible(d, a) {
                    let span = init.map(|e| e.span).unwrap_or(Span::point(0));
                    if is_optional_of(a, d) {
                        self.error(SemaError::NullabilityMismatch {
                            expected: d.clone(),
                            found: a.clone(),
                            span,
                        });
                    } else {
                        let context = match binding {
                            VarBinding::Name(name, _) => {
                                format!("variable declaration of `{name}`")
                            }
                            VarBinding::Pattern(_) => "variable declaration".to_string(),
                        };
                        self.error(SemaError::TypeMismatch {
                            expected: d.clone(),
                            found: a.clone(),
                            context,
                            span,
                        });
                    }
                }
                d.clone()
            }
            (Some(d), None) => d.clone(),
            (None, Some(a)) => a.clone(),
            (None, None) => Type::Int,
        };

        match binding {
            VarBinding::Name(name, _) => {
                self.env.insert(name.clone(), Symbol::value(var_ty, true));
            }
            VarBinding::Pattern(pattern) => {
                // Destructuring lowers to one binding per element against
                // the initializer's type.
                self.bind_pattern(pattern, &var_ty);
            }
        }
    }

    fn check_return(&mut self, value: Option<&Expr>, span: Span) {
        let Some(value) = value else {
            // Bare `return` is always accepted; fall-through of a typed
            // function is the code generator's concern.
            return;
        };
        let actual = self.check_expr(value);
        let Some(expected) = self.current_fn_return.clone() else {
            return;
        };

        // Structured results returned from result-typed functions pass
        // through; the concrete instantiation check happens in
        // `compatible` for the struct-named forms.
        if matches!(actual, Type::Result(_, _))
            && matches!(expected, Type::Result(_, _) | Type::Optional(_))
        {
            if let (Type::Result(eo, ee), Type::Result(ao, ae)) = (&expected, &actual) {
                let ok_fits = matches!(**ao, Type::Generic(_)) || compatible(eo, ao);
                let err_fits = matches!(**ae, Type::Generic(_)) || compatible(ee, ae);
                if !ok_fits || !err_fits {
                    self.error(SemaError::TypeMismatch {
                        expected,
                        found: actual,
                        context: "return value".into(),
                        span,
                    });
                }
            }
            return;
        }

        if !compatible(&expected, &actual) {
            if is_optional_of(&actual, &expected) {
                self.error(SemaError::NullabilityMismatch {
                    expected,
                    found: actual,
                    span: value.span,
                });
            } else {
                self.error(SemaError::TypeMismatch {
                    expected,
                    found: actual,
                    context: "return value".into(),
                    span: value.span,
                });
            }
        }
    }

    // ── Expression checking ────────────────────────────────────────────

    fn check_expr(&mut self, expr: &Expr) -> Type {
        let ty = self.infer_expr(expr);
        self.record(expr.id, ty)
    }

    fn infer_expr(&mut self, expr: &Expr) -> Type {
        match &expr.kind {
            ExprKind::IntLit(_) => Type::Int,
            ExprKind::FloatLit(_) => Type::Float,
            ExprKind::StrLit(_) => Type::String,
            ExprKind::CharLit(_) => Type::Char,
            ExprKind::BoolLit(_) => Type::Bool,

            ExprKind::Ident(name) => self.infer_ident(name, expr.span),

            ExprKind::Unary { op, operand } => {
                let ot = self.check_expr(operand);
                match op {
                    UnaryOp::Not => Type::Bool,
                    UnaryOp::Neg => ot,
                }
            }
            ExprKind::Binary { op, op_span, lhs, rhs } => {
                self.infer_binary(*op, *op_span, lhs, rhs)
            }

            ExprKind::Call { callee, args } => self.infer_call(expr, callee, args),
            ExprKind::MethodCall { receiver, method, method_span, args } => {
                self.infer_method_call(receiver, method, *method_span, args)
            }
            ExprKind::Field { object, field, field_span } => {
                self.infer_field(object, field, *field_span)
            }
            ExprKind::TupleIndex { object, .. } => {
                self.check_expr(object);
                Type::Int
            }

            ExprKind::ArrayLit(elems) => self.infer_array_lit(elems),
            ExprKind::MapLit(entries) => {
                if entries.is_empty() {
                    return Type::map(Type::Int, Type::Int);
                }
                let k = self.check_expr(&entries[0].0);
                let v = self.check_expr(&entries[0].1);
                for (ek, ev) in &entries[1..] {
                    self.check_expr(ek);
                    self.check_expr(ev);
                }
                Type::map(k, v)
            }
            ExprKind::SetLit(elems) => {
                let Some((first, rest)) = elems.split_first() else {
                    return Type::set(Type::Int);
                };
                let first = self.check_expr(first);
                for e in rest {
                    self.check_expr(e);
                }
                Type::set(first)
            }
            ExprKind::TupleLit(elems) => {
                for e in elems {
                    self.check_expr(e);
                }
                Type::Int
            }

            ExprKind::Index { object, index } => self.infer_index(object, index, expr.span),
            ExprKind::IndexAssign { object, index, value } => {
                self.check_expr(object);
                self.check_expr(index);
                self.check_expr(value);
                Type::Int
            }
            ExprKind::Assign { target, target_span, value } => {
                self.infer_assign(target, *target_span, value)
            }
            ExprKind::FieldAssign { object, field, value, .. } => {
                let ot = self.check_expr(object);
                let vt = self.check_expr(value);
                if let Type::Struct(name) = &ot {
                    if let Some(ft) = self.types.field_type(name, field).cloned() {
                        if !compatible(&ft, &vt) {
                            self.error(SemaError::TypeMismatch {
                                expected: ft,
                                found: vt.clone(),
                                context: format!("assignment to field `{field}`"),
                                span: value.span,
                            });
                        }
                    }
                }
                vt
            }

            ExprKind::StructInit { name, name_span, fields } => {
                self.infer_struct_init(name, *name_span, fields)
            }

            ExprKind::Range { start, end, .. } => {
                self.check_expr(start);
                self.check_expr(end);
                Type::Int
            }

            ExprKind::Lambda { params, body } => self.infer_lambda(expr.id, params, body),

            ExprKind::Block { stmts, tail } => {
                self.env.push_scope();
                for s in stmts {
                    self.check_stmt(s);
                }
                let ty = tail.as_ref().map(|t| self.check_expr(t)).unwrap_or(Type::Void);
                self.env.pop_scope();
                ty
            }

            ExprKind::If { cond, then_branch, else_branch } => {
                self.check_expr(cond);
                let tt = self.check_expr(then_branch);
                if let Some(else_branch) = else_branch {
                    let et = self.check_expr(else_branch);
                    if tt != et && !matches!(tt, Type::Void) && !matches!(et, Type::Void) {
                        self.error(SemaError::TypeMismatch {
                            expected: tt.clone(),
                            found: et,
                            context: "if branches".into(),
                            span: else_branch.span,
                        });
                    }
                }
                tt
            }

            ExprKind::Match { scrutinee, arms } => self.check_match(scrutinee, arms, true),

            ExprKind::StringInterp { parts } => {
                for part in parts {
                    if let InterpPart::Expr(e) = part {
                        self.check_expr(e);
                    }
                }
                Type::String
            }

            ExprKind::Await(inner) => self.check_expr(inner),
            ExprKind::Spawn(inner) => {
                self.check_expr(inner);
                // A spawn handle is an integer task id.
                Type::Int
            }
            ExprKind::Pipeline { value, callee } => self.infer_pipeline(value, callee),
            ExprKind::Try(inner) => self.infer_try(inner, expr.span),

            ExprKind::OkCtor(inner) => {
                let t = self.check_expr(inner);
                Type::result(t, Type::String)
            }
            ExprKind::ErrCtor(inner) => {
                let t = self.check_expr(inner);
                Type::result(Type::Generic("T".into()), t)
            }
            ExprKind::SomeCtor(inner) => {
                let t = self.check_expr(inner);
                Type::optional(t)
            }
            ExprKind::NoneCtor => Type::optional(Type::Generic("T".into())),

            ExprKind::ListComp { element, var, iter, cond, .. } => {
                self.env.push_scope();
                let it = self.check_expr(iter);
                let elem = element_type(&it);
                self.env.insert(var.clone(), Symbol::value(elem, false));
                if let Some(c) = cond {
                    self.check_expr(c);
                }
                let et = self.check_expr(element);
                self.env.pop_scope();
                Type::array(et)
            }

            ExprKind::TypeRef(te) => self.resolve_type_expr(te, &[]),
        }
    }

    fn infer_ident(&mut self, name: &str, span: Span) -> Type {
        if name == "self" {
            if let Some(ty) = self.current_self.clone() {
                return ty;
            }
        }

        // Built-in type names read back as their types.
        if let Some(ty) = primitive_type_name(name) {
            return ty;
        }

        if let Some(sym) = self.env.lookup(name) {
            let ty = sym.ty.clone();
            self.env.mark_used(name);
            return ty;
        }

        // Module-qualified or alias-prefixed names defer resolution.
        if name.contains("::") {
            return self.check_qualified_ref(name, span);
        }
        if self.module_aliases.contains_key(name) {
            return Type::Int;
        }

        let suggestions = self.fuzzy_suggestions(name, 3);
        self.error(SemaError::UndefinedIdentifier {
            name: name.to_string(),
            span,
            suggestions,
        });
        Type::Int
    }

    fn infer_binary(&mut self, op: BinaryOp, op_span: Span, lhs: &Expr, rhs: &Expr) -> Type {
        let lt = self.check_expr(lhs);
        let rt = self.check_expr(rhs);

        if op == BinaryOp::Coalesce {
            // `a ?? b`: a is Optional<T>, b is T; the result is T.
            match &lt {
                Type::Optional(inner) => {
                    if !compatible(inner, &rt) {
                        self.error(SemaError::TypeMismatch {
                            expected: (**inner).clone(),
                            found: rt.clone(),
                            context: "nil-coalescing operator".into(),
                            span: rhs.span,
                        });
                    }
                }
                _ => {
                    self.error(SemaError::TypeMismatch {
                        expected: Type::optional(rt.clone()),
                        found: lt.clone(),
                        context: "nil-coalescing operator".into(),
                        span: lhs.span,
                    });
                }
            }
            return rt;
        }

        // Logical and comparison results are integer-represented; the
        // `Int` they produce satisfies `Bool` contexts through
        // `compatible` and exact-matches `Int` parameters at call sites.
        if op.is_logical() {
            if !lt.is_bool_like() || !rt.is_bool_like() {
                let offender = if lt.is_bool_like() { rt.clone() } else { lt.clone() };
                self.error(SemaError::TypeMismatch {
                    expected: Type::Bool,
                    found: offender,
                    context: "boolean operation".into(),
                    span: op_span,
                });
            }
            return Type::Int;
        }

        if op.is_comparison() {
            if !comparable(&lt, &rt) {
                self.error(SemaError::TypeMismatch {
                    expected: lt.clone(),
                    found: rt.clone(),
                    context: "comparison".into(),
                    span: op_span,
                });
            }
            return Type::Int;
        }

        // String concatenation: `+` with at least one string operand.
        if op == BinaryOp::Add {
            let string_pair = matches!(
                (&lt, &rt),
                (Type::String, Type::String) | (Type::String, Type::Int) | (Type::Int, Type::String)
            );
            if string_pair {
                return Type::String;
            }
        }

        // Remaining arithmetic and bitwise operators require operands of
        // the same kind and produce that kind. No coercions are inserted
        // here; Int only widens in call arguments.
        if std::mem::discriminant(&lt) != std::mem::discriminant(&rt) {
            self.error(SemaError::TypeMismatch {
                expected: lt.clone(),
                found: rt,
                context: "binary expression".into(),
                span: op_span,
            });
            return lt;
        }
        lt
    }

    fn infer_array_lit(&mut self, elems: &[Expr]) -> Type {
        if elems.is_empty() {
            // Fresh placeholder element type; defaults to Int.
            return Type::array(Type::Int);
        }
        let first = self.check_expr(&elems[0]);
        for e in &elems[1..] {
            let et = self.check_expr(e);
            if std::mem::discriminant(&et) != std::mem::discriminant(&first) {
                self.error(SemaError::TypeMismatch {
                    expected: first.clone(),
                    found: et,
                    context: "array literal".into(),
                    span: e.span,
                });
            }
        }
        Type::array(first)
    }

    fn infer_index(&mut self, object: &Expr, index: &Expr, span: Span) -> Type {
        let ot = self.check_expr(object);
        let it = self.check_expr(index);
        match &ot {
            Type::String => {
                if !matches!(it, Type::Int) {
                    self.error(SemaError::TypeMismatch {
                        expected: Type::Int,
                        found: it,
                        context: "string index".into(),
                        span: index.span,
                    });
                }
                // Indexing a string yields a one-character string.
                Type::String
            }
            Type::Array(elem) => {
                if !matches!(it, Type::Int) {
                    self.error(SemaError::TypeMismatch {
                        expected: Type::Int,
                        found: it,
                        context: "array index".into(),
                        span: index.span,
                    });
                }
                (**elem).clone()
            }
            Type::Map(key, value) => {
                if !compatible(key, &it) {
                    self.error(SemaError::TypeMismatch {
                        expected: (**key).clone(),
                        found: it,
                        context: "map key".into(),
                        span: index.span,
                    });
                }
                (**value).clone()
            }
            _ => {
                self.error(SemaError::NotIndexable { ty: ot, span });
                Type::Int
            }
        }
    }

    fn infer_assign(&mut self, target: &str, target_span: Span, value: &Expr) -> Type {
        let vt = self.check_expr(value);
        let Some(sym) = self.env.lookup(target) else {
            let suggestions = self.fuzzy_suggestions(target, 3);
            self.error(SemaError::UndefinedIdentifier {
                name: target.to_string(),
                span: target_span,
                suggestions,
            });
            return vt;
        };
        let expected = sym.ty.clone();
        self.env.mark_used(target);
        if !compatible(&expected, &vt) {
            if is_optional_of(&vt, &expected) {
                self.error(SemaError::NullabilityMismatch {
                    expected,
                    found: vt.clone(),
                    span: value.span,
                });
            } else {
                self.error(SemaError::TypeMismatch {
                    expected,
                    found: vt.clone(),
                    context: format!("assignment to `{target}`"),
                    span: value.span,
                });
            }
        }
        vt
    }

    fn infer_struct_init(
        &mut self,
        name: &str,
        name_span: Span,
        fields: &[(String, Span, Expr)],
    ) -> Type {
        // Generic struct: infer the type argument from the first field
        // whose declared type is the parameter, then record the
        // instantiation for monomorphization.
        if let Some(template) = self.generics.struct_templates.get(name).cloned() {
            let mut value_types: Vec<(String, Type)> = Vec::new();
            for (fname, _, value) in fields {
                let vt = self.check_expr(value);
                value_types.push((fname.clone(), vt));
            }
            let type_args: Vec<Type> = template
                .type_params
                .iter()
                .map(|p| {
                    template
                        .fields
                        .iter()
                        .find(|(_, ft)| matches!(ft, Type::Generic(g) if g == p))
                        .and_then(|(fname, _)| {
                            value_types.iter().find(|(n, _)| n == fname).map(|(_, t)| t.clone())
                        })
                        .unwrap_or(Type::Int)
                })
                .collect();
            self.generics.record_instantiation(name, type_args);
            return Type::Struct(name.to_string());
        }

        let Some(def) = self.types.struct_def(name).cloned() else {
            self.error(SemaError::UnknownType {
                name: name.to_string(),
                span: name_span,
            });
            for (_, _, value) in fields {
                self.check_expr(value);
            }
            return Type::Struct(name.to_string());
        };

        for (fname, fspan, value) in fields {
            let vt = self.check_expr(value);
            match def.fields.iter().find(|(n, _)| n == fname) {
                Some((_, ft)) => {
                    if !compatible(ft, &vt) {
                        self.error(SemaError::TypeMismatch {
                            expected: ft.clone(),
                            found: vt,
                            context: format!("field `{fname}` of `{name}`"),
                            span: value.span,
                        });
                    }
                }
                None => {
                    self.error(SemaError::UnknownField {
                        struct_name: name.to_string(),
                        field: fname.clone(),
                        span: *fspan,
                    });
                }
            }
        }
        Type::Struct(name.to_string())
    }

    fn infer_lambda(&mut self, id: ExprId, params: &[Param], body: &Expr) -> Type {
        self.env.push_scope();
        let mut param_tys = Vec::new();
        for param in params {
            // Untyped lambda parameters default to Int.
            let ty = self.param_type(param, &[]);
            self.env.insert(param.name.clone(), Symbol::value(ty.clone(), true));
            param_tys.push(ty);
        }
        let body_ty = self.check_expr(body);
        self.env.pop_scope();

        // Capture analysis: free identifiers of the body, by reference.
        let param_names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        let mut captures = Vec::new();
        collect_free_idents(body, &param_names, &mut captures);
        self.captures.insert(id, captures);

        Type::function(param_tys, body_ty)
    }

    fn infer_try(&mut self, inner: &Expr, span: Span) -> Type {
        let t = self.check_expr(inner);
        match &t {
            Type::Result(ok, _) => (**ok).clone(),
            Type::Struct(name) if name == "ResultInt" => Type::Int,
            Type::Struct(name) if name == "ResultString" => Type::String,
            _ => {
                self.error(SemaError::IllegalConstruct {
                    message: format!("the `?` operator requires a Result value, found `{t}`"),
                    span,
                });
                Type::Int
            }
        }
    }

    fn infer_pipeline(&mut self, value: &Expr, callee: &Expr) -> Type {
        // `a |> f` / `a |> f(b)`: the piped value becomes the first
        // argument of the call.
        let vt = self.check_expr(value);
        match &callee.kind {
            ExprKind::Ident(name) => {
                let ty = self.resolve_call_by_types(name, callee.span, &[vt]);
                self.record(callee.id, ty.clone());
                ty
            }
            ExprKind::Call { callee: inner, args } => {
                let mut arg_tys = vec![vt];
                for a in args {
                    arg_tys.push(self.check_expr(a));
                }
                match &inner.kind {
                    ExprKind::Ident(name) => {
                        let ty = self.resolve_call_by_types(name, inner.span, &arg_tys);
                        self.record(callee.id, ty.clone());
                        ty
                    }
                    _ => {
                        let ct = self.check_expr(inner);
                        let ty = ct
                            .as_function()
                            .map(|f| (*f.ret).clone())
                            .unwrap_or(Type::Int);
                        self.record(callee.id, ty.clone());
                        ty
                    }
                }
            }
            _ => {
                let ct = self.check_expr(callee);
                ct.as_function().map(|f| (*f.ret).clone()).unwrap_or(Type::Int)
            }
        }
    }

    // ── Calls ──────────────────────────────────────────────────────────

    fn infer_call(&mut self, call: &Expr, callee: &Expr, args: &[Expr]) -> Type {
        if let ExprKind::Ident(name) = &callee.kind {
            let name = name.clone();

            // 1. Builtin shortcut with a hardcoded contract.
            if !name.contains("::") {
                if let Some((arity, ret)) = builtins::call_contract(&name) {
                    let arg_tys: Vec<Type> = args.iter().map(|a| self.check_expr(a)).collect();
                    if !arity.accepts(args.len()) {
                        let expected = match arity {
                            builtins::Arity::Exact(k) => k,
                            builtins::Arity::AtLeast(k) => k,
                            builtins::Arity::Between(lo, _) => lo,
                            builtins::Arity::Any => 0,
                        };
                        self.error(SemaError::WrongArgCount {
                            name: name.clone(),
                            expected,
                            found: args.len(),
                            span: call.span,
                        });
                    }
                    let ty = contract_ret_type(ret, &arg_tys);
                    self.record(callee.id, ty.clone());
                    return ty;
                }
            }

            // 2. Generic template instantiation.
            if self.generics.is_generic_fn(&name) {
                let arg_tys: Vec<Type> = args.iter().map(|a| self.check_expr(a)).collect();
                let ty = self.infer_generic_call(&name, &arg_tys, call.span);
                self.record(callee.id, ty.clone());
                return ty;
            }

            // 3. Module-qualified calls check ambiguity and visibility.
            if name.contains("::") {
                let arg_tys: Vec<Type> = args.iter().map(|a| self.check_expr(a)).collect();
                let ty = self.check_qualified_call(&name, callee.span, &arg_tys);
                self.record(callee.id, ty.clone());
                return ty;
            }

            // 4. Overload resolution.
            let arg_tys: Vec<Type> = args.iter().map(|a| self.check_expr(a)).collect();
            let ty = self.resolve_call_by_types(&name, callee.span, &arg_tys);
            self.record(callee.id, ty.clone());
            return ty;
        }

        // Calling the result of an arbitrary expression.
        let callee_ty = self.check_expr(callee);
        let arg_tys: Vec<Type> = args.iter().map(|a| self.check_expr(a)).collect();
        match callee_ty.as_function() {
            Some(ft) => {
                self.check_args_against("closure", call.span, &ft.params, ft.is_variadic, args, &arg_tys);
                (*ft.ret).clone()
            }
            None => Type::Int,
        }
    }

    /// Overload resolution over already-computed argument types.
    fn resolve_call_by_types(&mut self, name: &str, span: Span, arg_tys: &[Type]) -> Type {
        let Some(chain) = self.env.lookup_overloads(name).map(|c| c.to_vec()) else {
            let closest = self.fuzzy_suggestions(name, 1).into_iter().next();
            self.error(SemaError::UndefinedFunction {
                name: name.to_string(),
                span,
                closest,
            });
            return Type::Int;
        };

        // A non-function symbol called as a function.
        if !matches!(chain[0].ty, Type::Function(_)) {
            return Type::Int;
        }

        match overload::resolve(&chain, arg_tys) {
            Resolution::Best(i) => {
                self.env.mark_used(name);
                let ft = chain[i].ty.as_function().expect("resolved candidate is a function");
                (*ft.ret).clone()
            }
            Resolution::Ambiguous(_) => {
                self.error(SemaError::AmbiguousOverload {
                    name: name.to_string(),
                    span,
                });
                Type::Int
            }
            Resolution::NoMatch => {
                if chain.len() == 1 {
                    self.diagnose_single_candidate(name, span, &chain[0], arg_tys)
                } else {
                    self.error(SemaError::UndefinedFunction {
                        name: name.to_string(),
                        span,
                        closest: None,
                    });
                    Type::Int
                }
            }
        }
    }

    /// Precise diagnostics when the one candidate did not match: arity
    /// first, then the first incompatible argument.
    fn diagnose_single_candidate(
        &mut self,
        name: &str,
        span: Span,
        candidate: &Symbol,
        arg_tys: &[Type],
    ) -> Type {
        let Some(ft) = candidate.ty.as_function() else {
            return Type::Int;
        };
        let arity_ok = if ft.is_variadic {
            arg_tys.len() >= ft.params.len()
        } else {
            arg_tys.len() == ft.params.len()
        };
        if !arity_ok {
            self.error(SemaError::WrongArgCount {
                name: name.to_string(),
                expected: ft.params.len(),
                found: arg_tys.len(),
                span,
            });
        } else {
            for (i, (param, arg)) in ft.params.iter().zip(arg_tys).enumerate() {
                if !compatible(param, arg) {
                    self.error(SemaError::TypeMismatch {
                        expected: param.clone(),
                        found: arg.clone(),
                        context: format!("argument {} of `{name}`", i + 1),
                        span,
                    });
                    break;
                }
            }
        }
        (*ft.ret).clone()
    }

    fn check_args_against(
        &mut self,
        name: &str,
        span: Span,
        params: &[Type],
        is_variadic: bool,
        args: &[Expr],
        arg_tys: &[Type],
    ) {
        let arity_ok = if is_variadic {
            arg_tys.len() >= params.len()
        } else {
            arg_tys.len() == params.len()
        };
        if !arity_ok {
            self.error(SemaError::WrongArgCount {
                name: name.to_string(),
                expected: params.len(),
                found: arg_tys.len(),
                span,
            });
            return;
        }
        for (i, (param, arg)) in params.iter().zip(arg_tys).enumerate() {
            if !compatible(param, arg) {
                let arg_span = args.get(i).map(|a| a.span).unwrap_or(span);
                self.error(SemaError::TypeMismatch {
                    expected: param.clone(),
                    found: arg.clone(),
                    context: format!("argument {} of `{name}`", i + 1),
                    span: arg_span,
                });
            }
        }
    }

    fn infer_generic_call(&mut self, name: &str, arg_tys: &[Type], span: Span) -> Type {
        let template = self.generics.fn_templates[name].clone();
        if arg_tys.len() != template.params.len() {
            self.error(SemaError::WrongArgCount {
                name: name.to_string(),
                expected: template.params.len(),
                found: arg_tys.len(),
                span,
            });
        }

        // Bind each type parameter at its first occurrence in the
        // parameter list; later occurrences do not re-unify.
        let mut bindings: FxHashMap<String, Type> = FxHashMap::default();
        for (param, arg) in template.params.iter().zip(arg_tys) {
            if let Type::Generic(p) = param {
                bindings.entry(p.clone()).or_insert_with(|| arg.clone());
            }
        }

        let type_args: Vec<Type> = template
            .type_params
            .iter()
            .map(|p| bindings.get(p).cloned().unwrap_or(Type::Int))
            .collect();
        self.generics.record_instantiation(name, type_args);

        substitute(&template.ret, &bindings)
    }

    /// Ambiguity and visibility checks for `mod::name` references, then
    /// resolution against seeded or merged symbols.
    fn check_qualified_ref(&mut self, name: &str, span: Span) -> Type {
        let (short, item) = match name.split_once("::") {
            Some(pair) => pair,
            None => return Type::Int,
        };

        if let Some((first, second)) = self.imports.ambiguity(short) {
            let err = SemaError::AmbiguousModule {
                name: short.to_string(),
                span,
                first_path: first.full_path.clone(),
                first_line: first.line,
                second_path: second.full_path.clone(),
                second_line: second.line,
            };
            self.error(err);
            return Type::Int;
        }

        let current = self.current_module.clone();
        if !self.visibility.is_callable_from(&current, short, item) {
            self.error(SemaError::PrivateFunction {
                module: short.to_string(),
                name: item.to_string(),
                span,
            });
            return Type::Int;
        }

        // Seeded module surface (`File::read`) or merged module function.
        if let Some(sym) = self.env.lookup(name) {
            return sym.ty.clone();
        }
        if self.imports.is_registered(short) {
            if let Some(sym) = self.env.lookup(item) {
                return sym.ty.clone();
            }
        }

        // Deferred: accepted as module-qualified with a placeholder type.
        Type::Int
    }

    fn check_qualified_call(&mut self, name: &str, span: Span, arg_tys: &[Type]) -> Type {
        let before = self.errors.len();
        let ty = self.check_qualified_ref(name, span);
        if self.errors.len() > before {
            return Type::Int;
        }
        match ty.as_function() {
            Some(ft) => {
                let arity_ok = if ft.is_variadic {
                    arg_tys.len() >= ft.params.len()
                } else {
                    arg_tys.len() == ft.params.len()
                };
                if !arity_ok {
                    self.error(SemaError::WrongArgCount {
                        name: name.to_string(),
                        expected: ft.params.len(),
                        found: arg_tys.len(),
                        span,
                    });
                    return (*ft.ret).clone();
                }
                for (i, (param, arg)) in ft.params.iter().zip(arg_tys).enumerate() {
                    if !compatible(param, arg) {
                        self.error(SemaError::TypeMismatch {
                            expected: param.clone(),
                            found: arg.clone(),
                            context: format!("argument {} of `{name}`", i + 1),
                            span,
                        });
                        break;
                    }
                }
                (*ft.ret).clone()
            }
            None => ty,
        }
    }

    // ── Method calls ───────────────────────────────────────────────────

    fn infer_method_call(
        &mut self,
        receiver: &Expr,
        method: &str,
        method_span: Span,
        args: &[Expr],
    ) -> Type {
        // Builtin module receivers desugar to `Module::method`.
        if let ExprKind::Ident(module) = &receiver.kind {
            if builtins::is_builtin_module(module) {
                self.record(receiver.id, Type::Int);
                let qualified = format!("{module}::{method}");
                let arg_tys: Vec<Type> = args.iter().map(|a| self.check_expr(a)).collect();
                if let Some(sym) = self.env.lookup(&qualified) {
                    if let Some(ft) = sym.ty.as_function() {
                        let params = ft.params.clone();
                        let variadic = ft.is_variadic;
                        let ret = (*ft.ret).clone();
                        self.check_args_against(&qualified, method_span, &params, variadic, args, &arg_tys);
                        return ret;
                    }
                }
                // Unknown builtin-module method: deferred, placeholder.
                return Type::Int;
            }
        }

        let rt = self.check_expr(receiver);
        let arg_tys: Vec<Type> = args.iter().map(|a| self.check_expr(a)).collect();

        // The dispatch table keyed by receiver kind.
        if let Some(kind) = ReceiverKind::of(&rt) {
            if let Some(sig) = methods::lookup(kind, method) {
                if let Some(expected) = sig.param_count {
                    if args.len() != expected as usize {
                        self.error(SemaError::WrongArgCount {
                            name: method.to_string(),
                            expected: expected as usize,
                            found: args.len(),
                            span: method_span,
                        });
                    }
                }
                return methods::resolve_ret(sig.ret, &rt);
            }
        }

        // User extension methods: a free function named `Type_method`.
        if let Some(type_name) = rt.nominal_name() {
            let ext = format!("{type_name}_{method}");
            if let Some(sym) = self.env.lookup(&ext) {
                if let Some(ft) = sym.ty.as_function() {
                    let params = ft.params.clone();
                    let variadic = ft.is_variadic;
                    let ret = (*ft.ret).clone();
                    self.env.mark_used(&ext);
                    self.check_args_against(&ext, method_span, &params, variadic, args, &arg_tys);
                    return ret;
                }
            }
        }

        // No table entry and no extension: the method is unknown to the
        // analyzer; downstream phases may still resolve it.
        Type::Int
    }

    // ── Field access ───────────────────────────────────────────────────

    fn infer_field(&mut self, object: &Expr, field: &str, field_span: Span) -> Type {
        if let ExprKind::Ident(name) = &object.kind {
            // Enum variant access: `Color.Red`.
            if let Some(def) = self.types.enum_def(name) {
                if def.variant(field).is_some() {
                    let ty = Type::Enum(name.clone());
                    self.record(object.id, ty.clone());
                    return ty;
                }
            }
            // Module constant access through an import alias: deferred.
            if self.module_aliases.contains_key(name.as_str())
                && self.env.lookup(name).map(|s| s.ty.clone()) == Some(Type::Int)
            {
                self.record(object.id, Type::Int);
                return Type::Int;
            }
            // A qualified symbol registered under `obj.field`.
            if let Some(sym) = self.env.lookup(&format!("{name}.{field}")) {
                let ty = sym.ty.clone();
                self.record(object.id, ty.clone());
                return ty;
            }
        }

        let ot = self.check_expr(object);
        if let Type::Struct(sname) = &ot {
            if let Some(ft) = self.types.field_type(sname, field) {
                return ft.clone();
            }
            if self.types.struct_def(sname).is_some_and(|d| !d.fields.is_empty()) {
                self.error(SemaError::NoSuchField {
                    ty: ot.clone(),
                    field: field.to_string(),
                    span: field_span,
                });
            }
        }
        Type::Int
    }

    // ── Match checking ─────────────────────────────────────────────────

    fn check_match(&mut self, scrutinee: &Expr, arms: &[MatchArm], as_expr: bool) -> Type {
        let st = self.check_expr(scrutinee);
        let mut result: Option<Type> = None;

        for arm in arms {
            self.env.push_scope();
            self.bind_pattern(&arm.pattern, &st);
            let bt = self.check_expr(&arm.body);
            self.env.pop_scope();

            if as_expr {
                match &result {
                    None => result = Some(bt),
                    Some(rt) => {
                        if *rt != bt {
                            self.error(SemaError::TypeMismatch {
                                expected: rt.clone(),
                                found: bt,
                                context: "match arms".into(),
                                span: arm.span,
                            });
                        }
                    }
                }
            }
        }

        // Exhaustiveness fires only for enum scrutinees.
        if let Type::Enum(name) = &st {
            if let Some(def) = self.types.enum_def(name).cloned() {
                let patterns: Vec<&Pattern> = arms.iter().map(|a| &a.pattern).collect();
                let missing = exhaustiveness::missing_variants(&def, &patterns);
                if !missing.is_empty() {
                    self.error(SemaError::NonExhaustiveMatch {
                        enum_name: name.clone(),
                        missing,
                        span: scrutinee.span,
                    });
                }
            }
        }

        result.unwrap_or(Type::Void)
    }

    /// Bind a pattern's names into the current (arm) scope against the
    /// matched value's type, then check any guard.
    fn bind_pattern(&mut self, pattern: &Pattern, matched: &Type) {
        match &pattern.kind {
            PatternKind::Wildcard => {}
            PatternKind::Binding(name) => {
                // In an enum match a bare variant name is a constant
                // pattern, not a binding.
                if let Type::Enum(ename) = matched {
                    if self
                        .types
                        .enum_def(ename)
                        .is_some_and(|d| d.variant(name).is_some())
                    {
                        return;
                    }
                }
                self.env.insert(name.clone(), Symbol::value(matched.clone(), false));
            }
            PatternKind::Literal(expr) => {
                self.check_expr(expr);
            }
            PatternKind::Tuple(elems) => {
                for elem in elems {
                    self.bind_pattern(elem, &Type::Int);
                }
            }
            PatternKind::Array { elements, rest } => {
                let elem = match matched {
                    Type::Array(e) => (**e).clone(),
                    _ => Type::Int,
                };
                for p in elements {
                    self.bind_pattern(p, &elem);
                }
                if let Some(Some(rest_name)) = rest {
                    self.env.insert(
                        rest_name.clone(),
                        Symbol::value(Type::array(elem), false),
                    );
                }
            }
            PatternKind::Struct { name, fields, .. } => {
                let sname = match matched {
                    Type::Struct(s) => s.clone(),
                    _ => name.clone(),
                };
                for (fname, _, sub) in fields {
                    let ft = self
                        .types
                        .field_type(&sname, fname)
                        .cloned()
                        .unwrap_or(Type::Int);
                    match sub {
                        None => {
                            self.env.insert(fname.clone(), Symbol::value(ft, false));
                        }
                        Some(p) => self.bind_pattern(p, &ft),
                    }
                }
            }
            PatternKind::Variant { enum_name, variant, args, .. } => {
                self.bind_variant_pattern(enum_name.as_deref(), variant, args, matched);
            }
            PatternKind::Range { start, end, .. } => {
                self.check_expr(start);
                self.check_expr(end);
            }
            PatternKind::Or(alts) => {
                for alt in alts {
                    self.bind_pattern(alt, matched);
                }
            }
            PatternKind::Guard { inner, cond } => {
                self.bind_pattern(inner, matched);
                self.check_expr(cond);
            }
        }
    }

    fn bind_variant_pattern(
        &mut self,
        enum_name: Option<&str>,
        variant: &str,
        args: &[Pattern],
        matched: &Type,
    ) {
        // Option and result constructor patterns bind their payloads
        // from the matched type's structure.
        match (variant, matched) {
            ("Some", Type::Optional(inner)) => {
                if let Some(p) = args.first() {
                    let inner = (**inner).clone();
                    self.bind_pattern(p, &inner);
                }
                return;
            }
            ("None", _) => return,
            ("Ok", Type::Result(ok, _)) => {
                if let Some(p) = args.first() {
                    let ok = (**ok).clone();
                    self.bind_pattern(p, &ok);
                }
                return;
            }
            ("Err", Type::Result(_, err)) => {
                if let Some(p) = args.first() {
                    let err = (**err).clone();
                    self.bind_pattern(p, &err);
                }
                return;
            }
            _ => {}
        }

        // Enum variant: inner types come from the declared signature.
        let ename = enum_name
            .map(String::from)
            .or_else(|| match matched {
                Type::Enum(n) => Some(n.clone()),
                _ => None,
            });
        let params: Vec<Type> = ename
            .as_deref()
            .and_then(|e| self.types.enum_def(e))
            .and_then(|d| d.variant(variant))
            .map(|v| v.params.clone())
            .unwrap_or_default();

        for (i, p) in args.iter().enumerate() {
            let ty = params.get(i).cloned().unwrap_or(Type::Int);
            self.bind_pattern(p, &ty);
        }
    }

    // ── Shared helpers ─────────────────────────────────────────────────

    /// Resolve a surface type expression into a semantic type.
    fn resolve_type_expr(&mut self, te: &TypeExpr, generics: &[String]) -> Type {
        match &te.kind {
            TypeExprKind::Named { name, args } => {
                self.resolve_named_type(name, args, generics, te.span)
            }
            TypeExprKind::Array(elem) => Type::array(self.resolve_type_expr(elem, generics)),
            TypeExprKind::Function { params, ret } => {
                let params = params.iter().map(|p| self.resolve_type_expr(p, generics)).collect();
                let ret = self.resolve_type_expr(ret, generics);
                Type::function(params, ret)
            }
            TypeExprKind::Optional(inner) => {
                Type::optional(self.resolve_type_expr(inner, generics))
            }
            TypeExprKind::Union(members) => {
                if members.len() < 2 {
                    self.error(SemaError::IllegalConstruct {
                        message: "a union type needs at least two members".into(),
                        span: te.span,
                    });
                }
                let mut resolved: Vec<Type> = Vec::new();
                for m in members {
                    let ty = self.resolve_type_expr(m, generics);
                    if !resolved.contains(&ty) {
                        resolved.push(ty);
                    }
                }
                if resolved.len() == 1 {
                    resolved.pop().expect("checked non-empty")
                } else {
                    Type::Union(resolved)
                }
            }
        }
    }

    fn resolve_named_type(
        &mut self,
        name: &str,
        args: &[TypeExpr],
        generics: &[String],
        span: Span,
    ) -> Type {
        if let Some(prim) = primitive_type_name(name) {
            return prim;
        }

        match (name, args.len()) {
            ("Option", 1) => {
                let inner = self.resolve_type_expr(&args[0], generics);
                return Type::optional(inner);
            }
            ("Result", 2) => {
                let ok = self.resolve_type_expr(&args[0], generics);
                let err = self.resolve_type_expr(&args[1], generics);
                return Type::result(ok, err);
            }
            ("Map" | "HashMap", 2) => {
                let k = self.resolve_type_expr(&args[0], generics);
                let v = self.resolve_type_expr(&args[1], generics);
                return Type::map(k, v);
            }
            ("Map" | "HashMap", 0) => return Type::map(Type::Int, Type::Int),
            ("Set" | "HashSet", 1) => {
                let elem = self.resolve_type_expr(&args[0], generics);
                return Type::set(elem);
            }
            ("Set" | "HashSet", 0) => return Type::set(Type::Int),
            ("Array", 1) => {
                let elem = self.resolve_type_expr(&args[0], generics);
                return Type::array(elem);
            }
            _ => {}
        }

        if generics.contains(&name.to_string()) {
            return Type::Generic(name.to_string());
        }
        if let Some(aliased) = self.types.alias(name).cloned() {
            return aliased;
        }
        if self.types.struct_def(name).is_some() {
            return Type::Struct(name.to_string());
        }
        if self.types.enum_def(name).is_some() {
            return Type::Enum(name.to_string());
        }
        if self.generics.is_generic_struct(name) {
            return Type::Struct(name.to_string());
        }

        self.error(SemaError::UnknownType {
            name: name.to_string(),
            span,
        });
        Type::Int
    }

    /// A user-declared nominal type by name.
    fn named_type(&self, name: &str) -> Option<Type> {
        if self.types.struct_def(name).is_some() || self.generics.is_generic_struct(name) {
            return Some(Type::Struct(name.to_string()));
        }
        if self.types.enum_def(name).is_some() {
            return Some(Type::Enum(name.to_string()));
        }
        primitive_type_name(name)
    }

    /// Up to `limit` in-scope names within Hamming-style distance 2.
    fn fuzzy_suggestions(&self, name: &str, limit: usize) -> Vec<String> {
        let mut scored: Vec<(usize, String)> = Vec::new();
        for candidate in self.env.visible_names() {
            if candidate == name || candidate.contains("::") || candidate.contains('.') {
                continue;
            }
            if let Some(d) = name_distance(name, candidate) {
                scored.push((d, candidate.to_string()));
            }
        }
        scored.sort();
        scored.dedup_by(|a, b| a.1 == b.1);
        scored.into_iter().take(limit).map(|(_, n)| n).collect()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

// ── Free helpers ────────────────────────────────────────────────────────

/// Unwrap an `export` wrapper; the flag reports whether it was present.
fn unwrap_export(stmt: &Stmt) -> (&Stmt, bool) {
    match &stmt.kind {
        StmtKind::Export(inner) => (inner, true),
        _ => (stmt, false),
    }
}

/// The compatibility relation of checked positions.
///
/// Exact equality; Int widening to Float; Bool and Int interchangeable;
/// concrete `ResultX`/`OptionX` struct instantiations satisfying the
/// structured forms; `Generic` placeholders satisfying anything; and
/// containers compared recursively so placeholders nest.
pub fn compatible(expected: &Type, actual: &Type) -> bool {
    if matches!(expected, Type::Generic(_)) || matches!(actual, Type::Generic(_)) {
        return true;
    }
    if expected == actual {
        return true;
    }
    if matches!(expected, Type::Float) && matches!(actual, Type::Int) {
        return true;
    }
    if expected.is_bool_like() && actual.is_bool_like() {
        return true;
    }
    match (expected, actual) {
        (Type::Result(_, _), Type::Struct(n)) if n.starts_with("Result") => true,
        (Type::Optional(_), Type::Struct(n)) if n.starts_with("Option") => true,
        (Type::Optional(a), Type::Optional(b)) => compatible(a, b),
        (Type::Array(a), Type::Array(b)) => compatible(a, b),
        (Type::Set(a), Type::Set(b)) => compatible(a, b),
        (Type::Map(k1, v1), Type::Map(k2, v2)) => compatible(k1, k2) && compatible(v1, v2),
        (Type::Result(o1, e1), Type::Result(o2, e2)) => {
            compatible(o1, o2) && compatible(e1, e2)
        }
        _ => false,
    }
}

/// Whether `actual` is exactly `Optional<expected>` — the non-optional
/// nullability case that gets its own diagnostic.
fn is_optional_of(actual: &Type, expected: &Type) -> bool {
    matches!(actual, Type::Optional(inner) if **inner == *expected)
}

/// Operands a comparison accepts: same kind, Int/Bool mixes, and enums
/// against ints or other enums (enums are integer-represented).
fn comparable(l: &Type, r: &Type) -> bool {
    if std::mem::discriminant(l) == std::mem::discriminant(r) {
        return true;
    }
    matches!(
        (l, r),
        (Type::Int, Type::Bool)
            | (Type::Bool, Type::Int)
            | (Type::Enum(_), Type::Int)
            | (Type::Int, Type::Enum(_))
    )
}

/// Element type when iterating a value.
fn element_type(iter: &Type) -> Type {
    match iter {
        Type::Array(e) | Type::Set(e) => (**e).clone(),
        Type::Map(k, _) => (**k).clone(),
        Type::String => Type::String,
        _ => Type::Int,
    }
}

/// The type a module-level constant takes from its initializer's literal
/// form; non-literal initializers default to Int.
fn literal_type(expr: &Expr) -> Type {
    match &expr.kind {
        ExprKind::IntLit(_) => Type::Int,
        ExprKind::FloatLit(_) => Type::Float,
        ExprKind::StrLit(_) | ExprKind::StringInterp { .. } => Type::String,
        ExprKind::CharLit(_) => Type::Char,
        ExprKind::BoolLit(_) => Type::Bool,
        _ => Type::Int,
    }
}

/// Built-in type names usable in annotations and expressions.
fn primitive_type_name(name: &str) -> Option<Type> {
    Some(match name {
        "Int" | "int" => Type::Int,
        "Float" | "float" => Type::Float,
        "String" | "string" | "str" => Type::String,
        "Bool" | "bool" => Type::Bool,
        "Void" | "void" => Type::Void,
        "Char" | "char" => Type::Char,
        _ => return None,
    })
}

/// Replace generic placeholders with their inferred bindings.
fn substitute(ty: &Type, bindings: &FxHashMap<String, Type>) -> Type {
    match ty {
        Type::Generic(name) => bindings.get(name).cloned().unwrap_or_else(|| ty.clone()),
        Type::Array(e) => Type::array(substitute(e, bindings)),
        Type::Set(e) => Type::set(substitute(e, bindings)),
        Type::Optional(e) => Type::optional(substitute(e, bindings)),
        Type::Map(k, v) => Type::map(substitute(k, bindings), substitute(v, bindings)),
        Type::Result(o, e) => Type::result(substitute(o, bindings), substitute(e, bindings)),
        Type::Function(ft) => {
            let params = ft.params.iter().map(|p| substitute(p, bindings)).collect();
            let ret = substitute(&ft.ret, bindings);
            if ft.is_variadic {
                Type::variadic(params, ret)
            } else {
                Type::function(params, ret)
            }
        }
        other => other.clone(),
    }
}

/// The result type of a builtin call contract.
fn contract_ret_type(ret: ContractRet, arg_tys: &[Type]) -> Type {
    match ret {
        ContractRet::Int => Type::Int,
        ContractRet::Float => Type::Float,
        ContractRet::Str => Type::String,
        ContractRet::Bool => Type::Bool,
        ContractRet::Void => Type::Void,
        ContractRet::Json => Type::Struct("Json".into()),
        ContractRet::StrArray => Type::array(Type::String),
        ContractRet::ArgType(i) => arg_tys.get(i).cloned().unwrap_or(Type::Int),
    }
}

/// The length-aware character distance used for fuzzy suggestions: a
/// candidate within total distance 2 (position mismatches over the common
/// prefix length plus the length difference) qualifies.
fn name_distance(a: &str, b: &str) -> Option<usize> {
    let (al, bl) = (a.len(), b.len());
    let diff = al.abs_diff(bl);
    if diff > 2 || bl <= 1 {
        return None;
    }
    let common = al.min(bl);
    let mismatches = a
        .bytes()
        .take(common)
        .zip(b.bytes().take(common))
        .filter(|(x, y)| x != y)
        .count();
    let d = mismatches + diff;
    (d > 0 && d <= 2).then_some(d)
}

/// Collect the free identifiers of a lambda body: every identifier that
/// is not one of the lambda's own parameters and not already collected.
/// Capture is by reference; classification is downstream's concern.
fn collect_free_idents(expr: &Expr, params: &[&str], out: &mut Vec<String>) {
    let mut push = |name: &str, out: &mut Vec<String>| {
        if !params.contains(&name) && !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    };

    match &expr.kind {
        ExprKind::Ident(name) => push(name, out),
        ExprKind::Assign { target, value, .. } => {
            push(target, out);
            collect_free_idents(value, params, out);
        }
        ExprKind::Unary { operand, .. } => collect_free_idents(operand, params, out),
        ExprKind::Binary { lhs, rhs, .. } => {
            collect_free_idents(lhs, params, out);
            collect_free_idents(rhs, params, out);
        }
        ExprKind::Call { callee, args } => {
            collect_free_idents(callee, params, out);
            for a in args {
                collect_free_idents(a, params, out);
            }
        }
        ExprKind::MethodCall { receiver, args, .. } => {
            collect_free_idents(receiver, params, out);
            for a in args {
                collect_free_idents(a, params, out);
            }
        }
        ExprKind::Field { object, .. } | ExprKind::TupleIndex { object, .. } => {
            collect_free_idents(object, params, out);
        }
        ExprKind::ArrayLit(items) | ExprKind::SetLit(items) | ExprKind::TupleLit(items) => {
            for item in items {
                collect_free_idents(item, params, out);
            }
        }
        ExprKind::MapLit(entries) => {
            for (k, v) in entries {
                collect_free_idents(k, params, out);
                collect_free_idents(v, params, out);
            }
        }
        ExprKind::Index { object, index } => {
            collect_free_idents(object, params, out);
            collect_free_idents(index, params, out);
        }
        ExprKind::IndexAssign { object, index, value } => {
            collect_free_idents(object, params, out);
            collect_free_idents(index, params, out);
            collect_free_idents(value, params, out);
        }
        ExprKind::FieldAssign { object, value, .. } => {
            collect_free_idents(object, params, out);
            collect_free_idents(value, params, out);
        }
        ExprKind::StructInit { fields, .. } => {
            for (_, _, v) in fields {
                collect_free_idents(v, params, out);
            }
        }
        ExprKind::Range { start, end, .. } => {
            collect_free_idents(start, params, out);
            collect_free_idents(end, params, out);
        }
        ExprKind::Lambda { body, .. } => collect_free_idents(body, params, out),
        ExprKind::Block { stmts, tail } => {
            for s in stmts {
                collect_free_idents_stmt(s, params, out);
            }
            if let Some(t) = tail {
                collect_free_idents(t, params, out);
            }
        }
        ExprKind::If { cond, then_branch, else_branch } => {
            collect_free_idents(cond, params, out);
            collect_free_idents(then_branch, params, out);
            if let Some(e) = else_branch {
                collect_free_idents(e, params, out);
            }
        }
        ExprKind::Match { scrutinee, arms } => {
            collect_free_idents(scrutinee, params, out);
            for arm in arms {
                collect_free_idents(&arm.body, params, out);
            }
        }
        ExprKind::StringInterp { parts } => {
            for part in parts {
                if let InterpPart::Expr(e) = part {
                    collect_free_idents(e, params, out);
                }
            }
        }
        ExprKind::Await(inner)
        | ExprKind::Spawn(inner)
        | ExprKind::Try(inner)
        | ExprKind::OkCtor(inner)
        | ExprKind::ErrCtor(inner)
        | ExprKind::SomeCtor(inner) => collect_free_idents(inner, params, out),
        ExprKind::Pipeline { value, callee } => {
            collect_free_idents(value, params, out);
            collect_free_idents(callee, params, out);
        }
        ExprKind::ListComp { element, iter, cond, .. } => {
            collect_free_idents(element, params, out);
            collect_free_idents(iter, params, out);
            if let Some(c) = cond {
                collect_free_idents(c, params, out);
            }
        }
        _ => {}
    }
}

fn collect_free_idents_stmt(stmt: &Stmt, params: &[&str], out: &mut Vec<String>) {
    match &stmt.kind {
        StmtKind::Var { init, .. } => {
            if let Some(e) = init {
                collect_free_idents(e, params, out);
            }
        }
        StmtKind::Const { init, .. } => collect_free_idents(init, params, out),
        StmtKind::Expr(e)
        | StmtKind::Throw(e)
        | StmtKind::Defer(e)
        | StmtKind::Spawn(e) => collect_free_idents(e, params, out),
        StmtKind::Return(Some(e)) => collect_free_idents(e, params, out),
        StmtKind::Block(stmts) => {
            for s in stmts {
                collect_free_idents_stmt(s, params, out);
            }
        }
        StmtKind::If { cond, then_branch, else_branch } => {
            collect_free_idents(cond, params, out);
            collect_free_idents_stmt(then_branch, params, out);
            if let Some(e) = else_branch {
                collect_free_idents_stmt(e, params, out);
            }
        }
        StmtKind::While { cond, body } => {
            collect_free_idents(cond, params, out);
            collect_free_idents_stmt(body, params, out);
        }
        StmtKind::ForIn { iter, body, .. } => {
            collect_free_idents(iter, params, out);
            collect_free_idents_stmt(body, params, out);
        }
        StmtKind::Match { scrutinee, arms } => {
            collect_free_idents(scrutinee, params, out);
            for arm in arms {
                collect_free_idents(&arm.body, params, out);
            }
        }
        _ => {}
    }
}
