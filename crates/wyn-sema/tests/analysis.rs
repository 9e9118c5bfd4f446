//! End-to-end analysis scenarios: functions, overloads, generics,
//! results, and the error accumulation contract.

use wyn_parser::ast::{ExprKind, Stmt, StmtKind};
use wyn_sema::error::SemaError;
use wyn_sema::ty::Type;
use wyn_sema::SemaResult;

// ── Helpers ────────────────────────────────────────────────────────────

/// Parse Wyn source and run the analyzer.
fn check_source(src: &str) -> SemaResult {
    let parse = wyn_parser::parse(src);
    assert!(
        !parse.has_errors(),
        "parse errors for {src:?}: {:?} {:?}",
        parse.errors,
        parse.lex_errors
    );
    wyn_sema::check(&parse)
}

fn assert_clean(result: &SemaResult) {
    assert!(
        !result.had_error,
        "expected clean analysis, got: {:?}",
        result.errors
    );
}

fn assert_has_error<F: Fn(&SemaError) -> bool>(result: &SemaResult, pred: F, desc: &str) {
    assert!(result.had_error, "expected `{desc}`, analysis was clean");
    assert!(
        result.errors.iter().any(|e| pred(e)),
        "expected error matching `{desc}`, got: {:?}",
        result.errors
    );
}

/// The resolved type of the initializer of `var <name> = ...` anywhere in
/// the program's top-level functions or statements.
fn var_init_type<'r>(src: &str, result: &'r SemaResult, name: &str) -> &'r Type {
    let parse = wyn_parser::parse(src);
    let mut found = None;
    find_var_init(&parse.program.stmts, name, &mut found);
    let id = found.unwrap_or_else(|| panic!("no `var {name}` in {src:?}"));
    result
        .type_of(id)
        .unwrap_or_else(|| panic!("no resolved type for `var {name}`"))
}

fn find_var_init(stmts: &[Stmt], name: &str, out: &mut Option<wyn_parser::ast::ExprId>) {
    use wyn_parser::ast::VarBinding;
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::Var { binding: VarBinding::Name(n, _), init: Some(init), .. } if n == name => {
                *out = Some(init.id);
            }
            StmtKind::Fn(decl) => {
                if let Some(body) = &decl.body {
                    if let StmtKind::Block(inner) = &body.kind {
                        find_var_init(inner, name, out);
                    }
                }
            }
            StmtKind::Block(inner) => find_var_init(inner, name, out),
            _ => {}
        }
    }
}

// ── Scenario: plain functions and builtins ─────────────────────────────

#[test]
fn function_call_through_builtin_print() {
    let src = "fn f(x: Int) -> Int { return x + 1 } fn main() { print(f(3)) }";
    let result = check_source(src);
    assert_clean(&result);
}

#[test]
fn literal_types_are_obvious() {
    let src = "fn main() { var a = 1 var b = 1.5 var c = \"s\" var d = true var e = 'x' }";
    let result = check_source(src);
    assert_clean(&result);
    assert_eq!(*var_init_type(src, &result, "a"), Type::Int);
    assert_eq!(*var_init_type(src, &result, "b"), Type::Float);
    assert_eq!(*var_init_type(src, &result, "c"), Type::String);
    assert_eq!(*var_init_type(src, &result, "d"), Type::Bool);
    assert_eq!(*var_init_type(src, &result, "e"), Type::Char);
}

#[test]
fn empty_array_defaults_to_int_elements() {
    let src = "fn main() { var x = [] }";
    let result = check_source(src);
    assert_clean(&result);
    assert_eq!(*var_init_type(src, &result, "x"), Type::array(Type::Int));
}

#[test]
fn print_is_variadic_and_len_is_not() {
    assert_clean(&check_source("fn main() { print(1, \"two\", 3.0) }"));
    let result = check_source("fn main() { len(1, 2) }");
    assert_has_error(
        &result,
        |e| matches!(e, SemaError::WrongArgCount { name, .. } if name == "len"),
        "wrong argument count for len",
    );
}

#[test]
fn missing_return_in_typed_function_is_allowed() {
    // Fall-through of an Int-returning function is not an error; the
    // code generator inserts a zero return.
    assert_clean(&check_source("fn f() -> Int { }"));
}

// ── Identifier resolution ──────────────────────────────────────────────

#[test]
fn undefined_identifier_with_suggestions() {
    let src = "fn main() { var count = 1 print(cuont) }";
    let result = check_source(src);
    assert_has_error(
        &result,
        |e| {
            matches!(e, SemaError::UndefinedIdentifier { name, suggestions, .. }
                if name == "cuont" && suggestions.iter().any(|s| s == "count"))
        },
        "undefined identifier with fuzzy suggestion",
    );
}

#[test]
fn scope_discipline_no_forward_local_references() {
    // `y` is introduced after the lookup site in the same scope.
    let result = check_source("fn main() { print(y) var y = 1 }");
    assert_has_error(
        &result,
        |e| matches!(e, SemaError::UndefinedIdentifier { name, .. } if name == "y"),
        "forward reference to a local",
    );
}

#[test]
fn top_level_functions_are_forward_referencable() {
    // Pass 1 registers signatures before Pass 2 checks bodies.
    assert_clean(&check_source(
        "fn main() { print(helper()) } fn helper() -> Int { return 7 }",
    ));
}

#[test]
fn block_scopes_do_not_leak() {
    let result = check_source("fn main() { { var inner = 1 } print(inner) }");
    assert_has_error(
        &result,
        |e| matches!(e, SemaError::UndefinedIdentifier { name, .. } if name == "inner"),
        "block-local escaping its scope",
    );
}

// ── Binary operators ───────────────────────────────────────────────────

#[test]
fn arithmetic_requires_same_kind() {
    assert_clean(&check_source("fn main() { var x = 1 + 2 }"));
    let result = check_source("fn main() { var x = 1 + 2.5 }");
    assert_has_error(
        &result,
        |e| matches!(e, SemaError::TypeMismatch { context, .. } if context == "binary expression"),
        "Int + Float is not coerced",
    );
}

#[test]
fn string_concatenation_accepts_ints() {
    let src = "fn main() { var a = \"n=\" + 1 var b = \"x\" + \"y\" }";
    let result = check_source(src);
    assert_clean(&result);
    assert_eq!(*var_init_type(src, &result, "a"), Type::String);
    assert_eq!(*var_init_type(src, &result, "b"), Type::String);
}

#[test]
fn comparisons_type_as_int_and_satisfy_bool_contexts() {
    // Comparison and logical results are integer-represented. A `Bool`
    // annotation still accepts them (Bool and Int are interchangeable in
    // checked positions), and the inferred type is `Int`.
    let src = "fn main() { var b: Bool = 1 < 2 var i: Int = 1 < 2 var c = 1 < 2 var l = true && false }";
    let result = check_source(src);
    assert_clean(&result);
    assert_eq!(*var_init_type(src, &result, "c"), Type::Int);
    assert_eq!(*var_init_type(src, &result, "l"), Type::Int);
}

#[test]
fn comparison_results_pick_the_int_overload() {
    // The Int-typed comparison exact-matches the Int candidate even with
    // other overloads in the chain.
    let src = "fn f(x: Int) -> Int { return x } fn f(x: String) -> Int { return 0 } \
               fn main() { f(1 < 2) f(1 == 2 || 3 > 4) }";
    assert_clean(&check_source(src));
}

#[test]
fn logical_operators_need_bool_like_operands() {
    assert_clean(&check_source("fn main() { var x = true && 1 }"));
    let result = check_source("fn main() { var x = \"s\" || true }");
    assert_has_error(
        &result,
        |e| matches!(e, SemaError::TypeMismatch { context, .. } if context == "boolean operation"),
        "string operand to ||",
    );
}

#[test]
fn coalesce_unwraps_optionals() {
    let src = "fn main() { var o = Some(3) var x = o ?? 0 }";
    let result = check_source(src);
    assert_clean(&result);
    assert_eq!(*var_init_type(src, &result, "x"), Type::Int);

    let result = check_source("fn main() { var x = 1 ?? 0 }");
    assert_has_error(
        &result,
        |e| matches!(e, SemaError::TypeMismatch { context, .. } if context == "nil-coalescing operator"),
        "?? on a non-optional",
    );
}

// ── Variable declarations ──────────────────────────────────────────────

#[test]
fn annotation_mismatch_is_reported() {
    let result = check_source("fn main() { var x: Int = \"hello\" }");
    assert_has_error(
        &result,
        |e| {
            matches!(e, SemaError::TypeMismatch { expected: Type::Int, found: Type::String, context, .. }
                if context.contains("`x`"))
        },
        "annotated declaration mismatch",
    );
}

#[test]
fn optional_into_plain_slot_is_a_nullability_error() {
    let result = check_source("fn main() { var x: Int = Some(1) }");
    assert_has_error(
        &result,
        |e| matches!(e, SemaError::NullabilityMismatch { .. }),
        "Optional<Int> into Int",
    );
}

#[test]
fn explicit_some_is_required_for_optional_slots() {
    assert_clean(&check_source("fn main() { var x: Int? = Some(1) var y: Int? = None }"));
    let result = check_source("fn main() { var x: Int? = 1 }");
    assert_has_error(
        &result,
        |e| matches!(e, SemaError::TypeMismatch { .. }),
        "bare value into optional slot",
    );
}

#[test]
fn destructuring_binds_elements_and_rest() {
    assert_clean(&check_source(
        "fn f(xs: [Int]) { var [a, ..rest] = xs print(a + 1) print(rest.len()) }",
    ));
}

// ── Overloads ──────────────────────────────────────────────────────────

#[test]
fn overload_resolution_prefers_exact_match() {
    let src = "fn f(x: Int) -> Int { return 1 } fn f(x: Float) -> Int { return 2 } fn main() { f(3) }";
    assert_clean(&check_source(src));
}

#[test]
fn duplicate_signature_is_rejected() {
    let src = "fn f(x: Int) -> Int { return 1 } fn f(x: Int) -> Float { return 2.0 }";
    let result = check_source(src);
    assert_has_error(
        &result,
        |e| matches!(e, SemaError::DuplicateSignature { name, .. } if name == "f"),
        "duplicate signature",
    );
}

#[test]
fn ambiguous_overload_is_reported() {
    // Both candidates score 15 for (Int, Int): one exact + one widening.
    let src = "fn g(a: Float, b: Int) -> Int { return 1 } fn g(a: Int, b: Float) -> Int { return 2 } fn main() { g(1, 2) }";
    let result = check_source(src);
    assert_has_error(
        &result,
        |e| matches!(e, SemaError::AmbiguousOverload { name, .. } if name == "g"),
        "ambiguous overload",
    );
}

#[test]
fn single_candidate_mismatch_names_the_argument() {
    let src = "fn h(a: Int, b: String) -> Int { return a } fn main() { h(1, 2) }";
    let result = check_source(src);
    assert_has_error(
        &result,
        |e| matches!(e, SemaError::TypeMismatch { context, .. } if context == "argument 2 of `h`"),
        "argument position in mismatch",
    );
}

#[test]
fn int_widens_to_float_in_call_arguments() {
    assert_clean(&check_source(
        "fn area(r: Float) -> Float { return r } fn main() { area(2) }",
    ));
}

// ── Generics ───────────────────────────────────────────────────────────

#[test]
fn generic_instantiations_are_recorded_per_type() {
    let src = "fn id<T>(x: T) -> T { return x } fn main() { var a = id(1) var b = id(\"hi\") }";
    let result = check_source(src);
    assert_clean(&result);
    assert_eq!(*var_init_type(src, &result, "a"), Type::Int);
    assert_eq!(*var_init_type(src, &result, "b"), Type::String);

    let insts: Vec<_> = result
        .instantiations
        .iter()
        .filter(|i| i.template == "id")
        .collect();
    assert_eq!(insts.len(), 2);
    assert_eq!(insts[0].type_args, vec![Type::Int]);
    assert_eq!(insts[1].type_args, vec![Type::String]);
}

#[test]
fn instantiation_arity_matches_template() {
    let src = "fn pair<A, B>(a: A, b: B) -> A { return a } fn main() { pair(1, \"x\") }";
    let result = check_source(src);
    assert_clean(&result);
    let inst = result
        .instantiations
        .iter()
        .find(|i| i.template == "pair")
        .expect("pair instantiation recorded");
    // Invariant: the argument list length equals the parameter count.
    assert_eq!(inst.type_args, vec![Type::Int, Type::String]);
}

#[test]
fn generic_binding_uses_first_occurrence_only() {
    // Both parameters are T; the second argument does not re-unify.
    let src = "fn both<T>(a: T, b: T) -> T { return a } fn main() { var x = both(1, \"s\") }";
    let result = check_source(src);
    assert_clean(&result);
    assert_eq!(*var_init_type(src, &result, "x"), Type::Int);
    let inst = result
        .instantiations
        .iter()
        .find(|i| i.template == "both")
        .unwrap();
    assert_eq!(inst.type_args, vec![Type::Int]);
}

#[test]
fn generic_struct_init_records_instantiation() {
    let src = "struct Box<T> { value: T } fn main() { var b = Box { value: 42 } }";
    let result = check_source(src);
    assert_clean(&result);
    let inst = result
        .instantiations
        .iter()
        .find(|i| i.template == "Box")
        .expect("Box instantiation recorded");
    assert_eq!(inst.type_args, vec![Type::Int]);
}

// ── Results and the try operator ───────────────────────────────────────

#[test]
fn try_operator_unwraps_results() {
    let src = "fn f() -> Result<Int, String> { return Err(\"x\") } \
               fn g() -> Result<Int, String> { var v = f()? return Ok(v + 1) }";
    let result = check_source(src);
    assert_clean(&result);
    assert_eq!(*var_init_type(src, &result, "v"), Type::Int);
}

#[test]
fn try_operator_rejects_non_results() {
    let result = check_source("fn f() -> Int { var v = 3? return v }");
    assert_has_error(
        &result,
        |e| matches!(e, SemaError::IllegalConstruct { message, .. } if message.contains("`?`")),
        "? on a non-result",
    );
}

// ── Error accumulation ─────────────────────────────────────────────────

#[test]
fn analysis_continues_past_errors() {
    // Three independent mistakes, all reported in one run.
    let src = "fn main() { var a: Int = \"s\" print(missing) var b = 1 + 2.0 }";
    let result = check_source(src);
    assert!(result.had_error);
    assert!(
        result.errors.len() >= 3,
        "expected all three diagnostics, got: {:?}",
        result.errors
    );
}

#[test]
fn nested_functions_are_rejected() {
    let result = check_source("fn outer() { fn inner() { } }");
    assert_has_error(
        &result,
        |e| matches!(e, SemaError::IllegalConstruct { message, .. } if message.contains("nested")),
        "nested fn",
    );
}

// ── Lambdas and captures ───────────────────────────────────────────────

#[test]
fn lambda_type_and_captures() {
    let src = "fn main() { var offset = 10 var f = |x: Int| x + offset }";
    let parse = wyn_parser::parse(src);
    let result = wyn_sema::check(&parse);
    assert!(!result.had_error, "{:?}", result.errors);

    // Find the lambda node and its recorded captures.
    let mut lambda_id = None;
    find_lambda(&parse.program.stmts, &mut lambda_id);
    let id = lambda_id.expect("lambda in source");
    assert_eq!(
        result.type_of(id),
        Some(&Type::function(vec![Type::Int], Type::Int))
    );
    assert_eq!(result.captures[&id], vec!["offset".to_string()]);
}

fn find_lambda(stmts: &[Stmt], out: &mut Option<wyn_parser::ast::ExprId>) {
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::Var { init: Some(init), .. } => {
                if matches!(init.kind, ExprKind::Lambda { .. }) {
                    *out = Some(init.id);
                }
            }
            StmtKind::Fn(decl) => {
                if let Some(body) = &decl.body {
                    if let StmtKind::Block(inner) = &body.kind {
                        find_lambda(inner, out);
                    }
                }
            }
            _ => {}
        }
    }
}

#[test]
fn untyped_lambda_parameters_default_to_int() {
    let src = "fn main() { var f = |x| x }";
    let parse = wyn_parser::parse(src);
    let result = wyn_sema::check(&parse);
    let mut lambda_id = None;
    find_lambda(&parse.program.stmts, &mut lambda_id);
    assert_eq!(
        result.type_of(lambda_id.unwrap()),
        Some(&Type::function(vec![Type::Int], Type::Int))
    );
}

// ── Type soundness invariant ───────────────────────────────────────────

#[test]
fn every_expression_gets_a_type_on_clean_runs() {
    let src = "fn add(x: Int, y: Int) -> Int { return x + y } \
               fn main() { var s = \"v=${add(1, 2)}\" var xs = [1, 2, 3] print(s, xs[0]) }";
    let parse = wyn_parser::parse(src);
    let result = wyn_sema::check(&parse);
    assert!(!result.had_error, "{:?}", result.errors);
    // Every id the parser allocated is either typed or belongs to a
    // subtree the analyzer never re-enters (none on a clean run).
    assert!(
        !result.types.is_empty(),
        "expected populated resolved-type table"
    );
}
