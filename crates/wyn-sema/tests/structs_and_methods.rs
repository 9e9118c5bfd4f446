//! Struct declarations and initializers, field access, builtin method
//! dispatch, builtin modules, extension methods, and impl blocks.

use wyn_sema::error::SemaError;
use wyn_sema::SemaResult;

fn check_source(src: &str) -> SemaResult {
    let parse = wyn_parser::parse(src);
    assert!(
        !parse.has_errors(),
        "parse errors for {src:?}: {:?}",
        parse.errors
    );
    wyn_sema::check(&parse)
}

fn assert_clean(result: &SemaResult) {
    assert!(!result.had_error, "expected clean analysis, got: {:?}", result.errors);
}

// ── Structs ────────────────────────────────────────────────────────────

#[test]
fn struct_init_checks_field_types() {
    assert_clean(&check_source(
        "struct Point { x: Int, y: Int } fn main() { var p = Point { x: 1, y: 2 } }",
    ));
    let result = check_source(
        "struct Point { x: Int, y: Int } fn main() { var p = Point { x: \"one\", y: 2 } }",
    );
    assert!(result.had_error);
    assert!(result.errors.iter().any(|e| matches!(
        e,
        SemaError::TypeMismatch { context, .. } if context.contains("field `x`")
    )));
}

#[test]
fn unknown_struct_fields_are_reported() {
    let result = check_source(
        "struct Point { x: Int, y: Int } fn main() { var p = Point { x: 1, z: 3 } }",
    );
    assert!(result.errors.iter().any(|e| matches!(
        e,
        SemaError::UnknownField { struct_name, field, .. }
            if struct_name == "Point" && field == "z"
    )));
}

#[test]
fn field_access_resolves_through_the_registry() {
    assert_clean(&check_source(
        "struct Point { x: Int, y: Int } \
         fn norm(p: Point) -> Int { return p.x + p.y }",
    ));
    let result = check_source(
        "struct Point { x: Int } fn f(p: Point) -> Int { return p.z }",
    );
    assert!(result.errors.iter().any(|e| matches!(
        e,
        SemaError::NoSuchField { field, .. } if field == "z"
    )));
}

#[test]
fn self_referential_structs_resolve_by_name() {
    // The registry breaks the cycle; fields store the name only.
    assert_clean(&check_source(
        "struct Node { value: Int, next: Node? } \
         fn value_of(n: Node) -> Int { return n.value }",
    ));
}

#[test]
fn object_is_a_struct_synonym() {
    assert_clean(&check_source(
        "object Config { debug: Bool } fn f(c: Config) -> Bool { return c.debug }",
    ));
}

#[test]
fn structs_are_nominal() {
    // Two structs with identical shapes are still distinct types.
    let result = check_source(
        "struct A { v: Int } struct B { v: Int } \
         fn take(a: A) { } fn main() { take(B { v: 1 }) }",
    );
    assert!(result.had_error);
}

#[test]
fn field_assignment_checks_the_field_type() {
    let result = check_source(
        "struct Point { x: Int } fn f(p: Point) { p.x = \"no\" }",
    );
    assert!(result.errors.iter().any(|e| matches!(
        e,
        SemaError::TypeMismatch { context, .. } if context.contains("field `x`")
    )));
}

// ── Builtin method dispatch ────────────────────────────────────────────

#[test]
fn string_methods_dispatch_by_receiver_kind() {
    assert_clean(&check_source(
        "fn f(s: String) -> Int { var parts = s.split(\",\") print(parts.len()) return s.len() }",
    ));
}

#[test]
fn array_methods_preserve_element_types() {
    assert_clean(&check_source(
        "fn f(xs: [Float]) -> Float { var total = xs.sum() return total }",
    ));
    // xs.sum() on [Float] is Float; assigning it to Int is a mismatch.
    let result = check_source("fn f(xs: [Float]) { var total: Int = xs.sum() }");
    assert!(result.had_error);
}

#[test]
fn method_arity_is_checked() {
    let result = check_source("fn f(s: String) { s.contains() }");
    assert!(result.errors.iter().any(|e| matches!(
        e,
        SemaError::WrongArgCount { name, .. } if name == "contains"
    )));
}

#[test]
fn map_indexing_checks_the_key_type() {
    let result = check_source(
        "fn f(m: Map<String, Int>) -> Int { return m[1] }",
    );
    assert!(result.errors.iter().any(|e| matches!(
        e,
        SemaError::TypeMismatch { context, .. } if context == "map key"
    )));
    assert_clean(&check_source(
        "fn f(m: Map<String, Int>) -> Int { return m[\"k\"] }",
    ));
}

#[test]
fn string_indexing_yields_a_string() {
    assert_clean(&check_source("fn f(s: String) -> String { return s[0] }"));
}

#[test]
fn indexing_non_containers_is_an_error() {
    let result = check_source("fn f(x: Int) { x[0] }");
    assert!(result.errors.iter().any(|e| matches!(e, SemaError::NotIndexable { .. })));
}

// ── Builtin modules ────────────────────────────────────────────────────

#[test]
fn builtin_module_calls_desugar_to_qualified_functions() {
    assert_clean(&check_source(
        "fn main() { var text = File.read(\"a.txt\") print(Math.sqrt(2.0)) }",
    ));
}

#[test]
fn builtin_module_argument_types_are_checked() {
    let result = check_source("fn main() { File.write(\"a.txt\", 42) }");
    assert!(result.errors.iter().any(|e| matches!(
        e,
        SemaError::TypeMismatch { context, .. } if context.contains("File::write")
    )));
}

// ── Extension methods and impl blocks ──────────────────────────────────

#[test]
fn extension_functions_resolve_as_methods() {
    assert_clean(&check_source(
        "struct Point { x: Int, y: Int } \
         fn (self: Point) sum() -> Int { return self.x + self.y } \
         fn main(p: Point) { print(p.sum()) }",
    ));
}

#[test]
fn impl_methods_register_as_extensions() {
    assert_clean(&check_source(
        "struct Counter { n: Int } \
         impl Counter { fn get(self) -> Int { return self.n } } \
         fn main(c: Counter) { print(c.get()) }",
    ));
}

#[test]
fn unknown_methods_fall_back_silently() {
    // No table entry, no extension: the analyzer defers with Int.
    assert_clean(&check_source(
        "struct Point { x: Int } fn main(p: Point) { var r = p.mystery() print(r + 1) }",
    ));
}

// ── Traits ─────────────────────────────────────────────────────────────

#[test]
fn trait_declarations_register_and_default_bodies_check() {
    assert_clean(&check_source(
        "trait Printable { fn describe(v: Int) -> String { return \"v=\" + v } } \
         fn main() { }",
    ));
}
