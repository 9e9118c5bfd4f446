//! The standard-library surface seeded into the global scope at
//! initialization, the builtin module table (`File`, `Math`, ...), and
//! the hardcoded contracts for the builtin call shortcut.
//!
//! Everything here is configuration data; the rules that consume it live
//! in `infer`.

use crate::env::{Symbol, SymbolTable};
use crate::registry::{StructDefInfo, TypeRegistry};
use crate::ty::Type;

/// Modules whose names resolve method calls (`File.read(...)`) to seeded
/// `Module::method` signatures instead of variables.
pub const BUILTIN_MODULES: &[&str] = &[
    "File", "System", "Math", "Time", "Net", "Json", "HashMap", "HashSet", "Http", "Crypto",
];

pub fn is_builtin_module(name: &str) -> bool {
    BUILTIN_MODULES.contains(&name)
}

/// Seed the global scope and type registry with the standard-library
/// surface: free functions, module-qualified functions, and the nominal
/// helper types (`Json`, the concrete `ResultInt`-style instantiations).
pub fn seed(env: &mut SymbolTable, types: &mut TypeRegistry) {
    for (name, params, ret, variadic) in signatures() {
        let ty = Type::Function(crate::ty::FunctionType {
            params,
            ret: Box::new(ret),
            is_variadic: variadic,
        });
        let _ = env.insert_overload(name, Symbol::function(name, ty));
    }

    for (name, params, ret) in module_signatures() {
        let ty = Type::function(params, ret);
        env.insert(name, Symbol::function(name, ty));
    }

    // Nominal helper types. The concrete Option/Result instantiations are
    // structs by convention (`Result<Int, _>` lowers to `ResultInt`).
    for name in ["Json", "ResultInt", "ResultString", "OptionInt", "OptionString"] {
        types.register_struct(StructDefInfo {
            name: name.into(),
            generic_params: vec![],
            fields: vec![],
        });
        env.insert(name, Symbol::value(Type::Struct(name.into()), false));
    }

    // Collection type names usable in annotations and static calls.
    env.insert("HashMap", Symbol::value(Type::map(Type::Int, Type::Int), false));
    env.insert("HashSet", Symbol::value(Type::set(Type::Int), false));
}

/// How many arguments a builtin accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    Between(usize, usize),
    Any,
}

impl Arity {
    pub fn accepts(&self, n: usize) -> bool {
        match *self {
            Arity::Exact(k) => n == k,
            Arity::AtLeast(k) => n >= k,
            Arity::Between(lo, hi) => n >= lo && n <= hi,
            Arity::Any => true,
        }
    }

    /// Human-readable expectation for diagnostics.
    pub fn describe(&self) -> String {
        match *self {
            Arity::Exact(k) => k.to_string(),
            Arity::AtLeast(k) => format!("at least {k}"),
            Arity::Between(lo, hi) => format!("{lo} to {hi}"),
            Arity::Any => "any number of".into(),
        }
    }
}

/// The result rule of a builtin call contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractRet {
    Int,
    Float,
    Str,
    Bool,
    Void,
    Json,
    StrArray,
    /// The type of argument `n` (the `some`/`ok`/`err` constructors
    /// return their payload's type).
    ArgType(usize),
}

/// The hardcoded contract applied when a call's callee is a plain
/// identifier naming one of the builtin shortcut functions.
pub fn call_contract(name: &str) -> Option<(Arity, ContractRet)> {
    use Arity::*;
    use ContractRet::*;
    Some(match name {
        // I/O.
        "print" | "println" => (Any, Void),
        "print_debug" | "print_error" => (Any, Void),
        "input" => (Between(0, 1), Str),
        "input_line" => (Exact(0), Str),
        "input_float" => (Between(0, 1), Float),

        // Assertions and control.
        "assert" => (Between(1, 2), Void),
        "assert_eq" => (Exact(2), Void),
        "assert_true" | "assert_false" => (Exact(1), Void),
        "panic" => (Exact(1), Void),
        "todo" => (Between(0, 1), Void),
        "exit" | "exit_program" => (Exact(1), Void),
        "sleep" | "sleep_ms" => (Exact(1), Void),

        // Introspection.
        "len" => (Exact(1), Int),
        "typeof" => (Exact(1), Str),

        // Arithmetic.
        "min" | "max" => (Exact(2), Int),
        "abs" | "abs_val" => (Exact(1), Int),
        "pow_int" => (Exact(2), Int),
        "clamp" => (Exact(3), Int),
        "sign" | "gcd" | "lcm" => (Between(1, 2), Int),
        "rand" | "random_int" => (Between(0, 2), Int),
        "random_range" => (Exact(2), Int),
        "random_float" => (Exact(0), Float),
        "seed_random" => (Exact(1), Void),
        "time_now" => (Exact(0), Int),
        "time_format" => (Between(1, 2), Str),
        "system" => (Exact(1), Int),

        // Strings.
        "str_concat" | "str_upper" | "str_lower" | "str_trim" | "str_repeat" | "str_reverse"
        | "str_replace" => (AtLeast(1), Str),
        "str_len" | "str_eq" | "string_length" | "str_contains" | "str_count"
        | "str_starts_with" | "str_ends_with" => (AtLeast(1), Int),
        "char_at" | "string_char_at" | "split_get" => (AtLeast(1), Str),
        "split_count" => (Exact(2), Int),
        "int_to_str" => (Exact(1), Str),
        "str_to_int" | "str_parse_int" => (Exact(1), Int),
        "str_parse_float" => (Exact(1), Float),
        "string_format" => (AtLeast(1), Str),
        "str_split" => (Exact(2), StrArray),
        "str_join" => (Exact(2), Str),

        // Filesystem.
        "file_read" => (Exact(1), Str),
        "file_write" | "file_append" => (Exact(2), Int),
        "file_exists" | "file_delete" | "file_size" => (Exact(1), Int),
        "file_copy" | "file_move" => (Exact(2), Int),
        "file_mkdir" | "file_rmdir" | "file_is_file" | "file_is_dir" => (Exact(1), Int),
        "file_list_dir" => (Exact(1), StrArray),

        // JSON.
        "json_parse" => (Exact(1), Json),
        "json_stringify" => (Exact(1), Str),

        // Option/Result constructors. `some`/`ok`/`err` return their
        // payload's type; `none` is an int-represented placeholder.
        "some" | "ok" | "err" => (Exact(1), ArgType(0)),
        "none" => (Exact(0), Int),

        _ => return None,
    })
}

/// The full standard-library signature table:
/// `(name, parameter types, return type, variadic)`.
///
/// Seeded into the global scope at initialization so plain calls resolve
/// through normal overload lookup; the shortcut contracts above take
/// precedence for the names they cover.
pub fn signatures() -> Vec<(&'static str, Vec<Type>, Type, bool)> {
    use Type::*;
    let s = || String;
    let sa = || Type::array(String);
    let ia = || Type::array(Int);

    vec![
        // ── I/O ────────────────────────────────────────────────────────
        ("print", vec![], Void, true),
        ("println", vec![], Void, true),
        ("print_float", vec![Float], Void, false),
        ("print_str", vec![s()], Void, false),
        ("print_bool", vec![Bool], Void, false),
        ("print_hex", vec![Int], Void, false),
        ("print_bin", vec![Int], Void, false),
        ("print_debug", vec![], Void, true),
        ("print_error", vec![s()], Void, false),
        ("printf_wyn", vec![s()], Void, true),
        ("input", vec![], s(), false),
        ("input_line", vec![], s(), false),
        ("input_float", vec![], Float, false),

        // ── Assertions, process, environment ───────────────────────────
        ("assert", vec![Bool], Void, true),
        ("assert_eq", vec![Int, Int], Void, false),
        ("assert_true", vec![Bool], Void, false),
        ("assert_false", vec![Bool], Void, false),
        ("panic", vec![s()], Void, false),
        ("todo", vec![], Void, true),
        ("exit", vec![Int], Void, false),
        ("exit_program", vec![Int], Void, false),
        ("sleep", vec![Int], Void, false),
        ("sleep_ms", vec![Int], Void, false),
        ("getenv_var", vec![s()], s(), false),
        ("setenv_var", vec![s(), s()], Int, false),
        ("get_argc", vec![], Int, false),
        ("get_argv", vec![Int], s(), false),
        ("system", vec![s()], Int, false),

        // ── Introspection ──────────────────────────────────────────────
        ("len", vec![Int], Int, false),
        ("typeof", vec![Int], s(), false),

        // ── Math ───────────────────────────────────────────────────────
        ("abs", vec![Int], Int, false),
        ("abs_val", vec![Int], Int, false),
        ("abs_float", vec![Float], Float, false),
        ("min", vec![Int, Int], Int, false),
        ("max", vec![Int, Int], Int, false),
        ("pow_int", vec![Int, Int], Int, false),
        ("clamp", vec![Int, Int, Int], Int, false),
        ("clamp_float", vec![Float, Float, Float], Float, false),
        ("sign", vec![Int], Int, false),
        ("gcd", vec![Int, Int], Int, false),
        ("lcm", vec![Int, Int], Int, false),
        ("is_even", vec![Int], Bool, false),
        ("is_odd", vec![Int], Bool, false),
        ("sqrt_int", vec![Int], Int, false),
        ("ceil_int", vec![Float], Int, false),
        ("floor_int", vec![Float], Int, false),
        ("round_int", vec![Float], Int, false),
        ("lerp", vec![Float, Float, Float], Float, false),
        ("map_range", vec![Float, Float, Float, Float, Float], Float, false),
        ("sin_approx", vec![Float], Float, false),
        ("cos_approx", vec![Float], Float, false),
        ("pi_const", vec![], Float, false),
        ("e_const", vec![], Float, false),
        ("random_int", vec![], Int, false),
        ("random_range", vec![Int, Int], Int, false),
        ("random_float", vec![], Float, false),
        ("seed_random", vec![Int], Void, false),

        // ── Bit operations ─────────────────────────────────────────────
        ("bit_set", vec![Int, Int], Int, false),
        ("bit_clear", vec![Int, Int], Int, false),
        ("bit_toggle", vec![Int, Int], Int, false),
        ("bit_check", vec![Int, Int], Bool, false),
        ("bit_count", vec![Int], Int, false),

        // ── Strings ────────────────────────────────────────────────────
        ("str_len", vec![s()], Int, false),
        ("str_eq", vec![s(), s()], Bool, false),
        ("str_concat", vec![s(), s()], s(), false),
        ("str_upper", vec![s()], s(), false),
        ("str_lower", vec![s()], s(), false),
        ("str_contains", vec![s(), s()], Bool, false),
        ("str_starts_with", vec![s(), s()], Bool, false),
        ("str_ends_with", vec![s(), s()], Bool, false),
        ("str_trim", vec![s()], s(), false),
        ("str_replace", vec![s(), s(), s()], s(), false),
        ("str_split", vec![s(), s()], sa(), false),
        ("str_join", vec![sa(), s()], s(), false),
        ("str_repeat", vec![s(), Int], s(), false),
        ("str_reverse", vec![s()], s(), false),
        ("str_count", vec![s(), s()], Int, false),
        ("str_to_int", vec![s()], Int, false),
        ("str_parse_int", vec![s()], Int, false),
        ("str_parse_float", vec![s()], Float, false),
        ("int_to_str", vec![Int], s(), false),
        ("char_at", vec![s(), Int], s(), false),
        ("string_char_at", vec![s(), Int], s(), false),
        ("string_length", vec![s()], Int, false),
        ("string_format", vec![s()], s(), true),
        ("split_get", vec![s(), s(), Int], s(), false),
        ("split_count", vec![s(), s()], Int, false),
        ("is_numeric", vec![s()], Bool, false),

        // ── Arrays ─────────────────────────────────────────────────────
        ("range", vec![Int, Int], ia(), false),
        ("array_new", vec![], ia(), false),
        ("array_push", vec![ia(), Int], Void, false),
        ("array_pop", vec![ia()], Int, false),
        ("array_length_dyn", vec![ia()], Int, false),
        ("arr_sum", vec![ia()], Int, false),
        ("arr_max", vec![ia()], Int, false),
        ("arr_min", vec![ia()], Int, false),
        ("arr_contains", vec![ia(), Int], Bool, false),
        ("arr_find", vec![ia(), Int], Int, false),
        ("arr_reverse", vec![ia()], ia(), false),
        ("arr_sort", vec![ia()], ia(), false),
        ("arr_count", vec![ia(), Int], Int, false),
        ("arr_fill", vec![ia(), Int], ia(), false),
        ("arr_all", vec![ia()], Bool, false),
        ("arr_join", vec![ia(), s()], s(), false),

        // ── Filesystem ─────────────────────────────────────────────────
        ("file_read", vec![s()], s(), false),
        ("file_write", vec![s(), s()], Int, false),
        ("file_append", vec![s(), s()], Int, false),
        ("file_exists", vec![s()], Int, false),
        ("file_size", vec![s()], Int, false),
        ("file_delete", vec![s()], Int, false),
        ("file_copy", vec![s(), s()], Int, false),
        ("file_move", vec![s(), s()], Int, false),
        ("file_list_dir", vec![s()], sa(), false),
        ("file_mkdir", vec![s()], Int, false),
        ("file_rmdir", vec![s()], Int, false),
        ("file_is_file", vec![s()], Int, false),
        ("file_is_dir", vec![s()], Int, false),
        ("read_file_content", vec![s()], s(), false),
        ("check_file_exists", vec![s()], Bool, false),
        ("last_error_get", vec![], s(), false),

        // ── Time ───────────────────────────────────────────────────────
        ("time_now", vec![], Int, false),
        ("time_now_millis", vec![], Int, false),
        ("time_format", vec![Int], s(), false),
        ("time_parse", vec![s()], Int, false),
        ("time_year", vec![Int], Int, false),
        ("time_month", vec![Int], Int, false),
        ("time_day", vec![Int], Int, false),
        ("time_hour", vec![Int], Int, false),
        ("time_minute", vec![Int], Int, false),
        ("time_second", vec![Int], Int, false),

        // ── HTTP ───────────────────────────────────────────────────────
        ("http_get", vec![s()], s(), false),
        ("http_post", vec![s(), s()], s(), false),
        ("http_put", vec![s(), s()], s(), false),
        ("http_delete", vec![s()], s(), false),
        ("http_set_header", vec![s(), s()], Void, false),
        ("http_clear_headers", vec![], Void, false),
        ("http_status", vec![], Int, false),
        ("http_error", vec![], s(), false),
        ("https_get", vec![s()], s(), false),
        ("https_post", vec![s(), s()], s(), false),
        ("url_encode", vec![s()], s(), false),
        ("url_decode", vec![s()], s(), false),

        // ── Crypto ─────────────────────────────────────────────────────
        ("hash_string", vec![s()], Int, false),
        ("crypto_hash32", vec![s()], Int, false),
        ("crypto_hash64", vec![s()], Int, false),
        ("crypto_md5", vec![s()], s(), false),
        ("crypto_sha256", vec![s()], s(), false),
        ("base64_encode", vec![s()], s(), false),
        ("base64_decode", vec![s()], s(), false),
        ("crypto_random_bytes", vec![Int], ia(), false),
        ("crypto_random_hex", vec![Int], s(), false),
        ("crypto_xor_cipher", vec![s(), s()], s(), false),

        // ── JSON ───────────────────────────────────────────────────────
        ("json_parse", vec![s()], Struct("Json".into()), false),
        ("json_stringify", vec![Struct("Json".into())], s(), false),
        ("json_get_string", vec![Struct("Json".into()), s()], s(), false),
        ("json_get_int", vec![Struct("Json".into()), s()], Int, false),
        ("json_get_bool", vec![Struct("Json".into()), s()], Bool, false),
        ("json_has_key", vec![Struct("Json".into()), s()], Bool, false),
        ("json_array_length", vec![Struct("Json".into())], Int, false),
        ("json_free", vec![Struct("Json".into())], Void, false),

        // ── Maps and sets ──────────────────────────────────────────────
        ("hashmap_new", vec![], Type::map(Int, Int), false),
        ("hashmap_insert", vec![Type::map(Int, Int), Int, Int], Void, false),
        ("hashmap_get", vec![Type::map(Int, Int), Int], Int, false),
        ("hashmap_has", vec![Type::map(Int, Int), Int], Bool, false),
        ("hashmap_remove", vec![Type::map(Int, Int), Int], Bool, false),
        ("hashmap_len", vec![Type::map(Int, Int)], Int, false),
        ("hashset_new", vec![], Type::set(Int), false),
        ("hashset_add", vec![Type::set(Int), Int], Void, false),
        ("hashset_contains", vec![Type::set(Int), Int], Bool, false),
        ("hashset_remove", vec![Type::set(Int), Int], Bool, false),
        ("set_len", vec![Type::set(Int)], Int, false),
        ("set_is_empty", vec![Type::set(Int)], Bool, false),
        ("set_clear", vec![Type::set(Int)], Void, false),
        ("set_union", vec![Type::set(Int), Type::set(Int)], Type::set(Int), false),
        ("set_intersection", vec![Type::set(Int), Type::set(Int)], Type::set(Int), false),
        ("set_difference", vec![Type::set(Int), Type::set(Int)], Type::set(Int), false),
        ("set_is_subset", vec![Type::set(Int), Type::set(Int)], Bool, false),
        ("set_is_superset", vec![Type::set(Int), Type::set(Int)], Bool, false),

        // ── Terminal ───────────────────────────────────────────────────
        ("term_clear", vec![], Void, false),
        ("term_set_color", vec![Int], Void, false),
        ("term_reset_color", vec![], Void, false),
        ("term_cursor_to", vec![Int, Int], Void, false),
        ("term_width", vec![], Int, false),
        ("term_height", vec![], Int, false),

        // ── Error constructors ─────────────────────────────────────────
        ("Error", vec![s()], s(), false),
        ("TypeError", vec![s()], s(), false),
        ("ValueError", vec![s()], s(), false),
        ("DivisionByZeroError", vec![], s(), false),
    ]
}

/// Module-qualified signatures seeded under their `Module::method` names.
pub fn module_signatures() -> Vec<(&'static str, Vec<Type>, Type)> {
    use Type::*;
    let s = || String;
    let sa = || Type::array(String);

    vec![
        // File.
        ("File::read", vec![s()], s()),
        ("File::write", vec![s(), s()], Int),
        ("File::append", vec![s(), s()], Int),
        ("File::exists", vec![s()], Int),
        ("File::delete", vec![s()], Int),
        ("File::list_dir", vec![s()], sa()),
        ("File::is_file", vec![s()], Int),
        ("File::is_dir", vec![s()], Int),
        ("File::get_cwd", vec![], s()),
        ("File::create_dir", vec![s()], Int),
        ("File::file_size", vec![s()], Int),
        ("File::path_join", vec![s(), s()], s()),
        ("File::basename", vec![s()], s()),
        ("File::dirname", vec![s()], s()),
        ("File::extension", vec![s()], s()),
        ("File::move", vec![s(), s()], Int),
        ("File::mkdir", vec![s()], Int),
        ("File::rmdir", vec![s()], Int),
        // System.
        ("System::exec", vec![s()], s()),
        ("System::exec_code", vec![s()], Int),
        ("System::exit", vec![Int], Void),
        ("System::args", vec![], sa()),
        ("System::env", vec![s()], s()),
        ("System::set_env", vec![s(), s()], Int),
        // Math.
        ("Math::pow", vec![Float, Float], Float),
        ("Math::sqrt", vec![Float], Float),
        ("Math::floor", vec![Float], Float),
        ("Math::ceil", vec![Float], Float),
        ("Math::round", vec![Float], Float),
        ("Math::abs", vec![Float], Float),
        ("Math::min", vec![Float, Float], Float),
        ("Math::max", vec![Float, Float], Float),
        // Time.
        ("Time::now", vec![], Int),
        ("Time::sleep", vec![Int], Void),
        ("Time::format", vec![Int], s()),
        // Net.
        ("Net::listen", vec![Int], Int),
        ("Net::connect", vec![s(), Int], Int),
        ("Net::send", vec![Int, s()], Int),
        ("Net::recv", vec![Int], s()),
        ("Net::close", vec![Int], Void),
        // Http.
        ("Http::get", vec![s()], s()),
        ("Http::post", vec![s(), s()], s()),
        // Json.
        ("Json::parse", vec![s()], Struct("Json".into())),
        ("Json::stringify", vec![Struct("Json".into())], s()),
        // Crypto.
        ("Crypto::sha256", vec![s()], s()),
        ("Crypto::md5", vec![s()], s()),
        ("Crypto::base64_encode", vec![s()], s()),
        ("Crypto::base64_decode", vec![s()], s()),
        // HashMap / HashSet statics.
        ("HashMap::new", vec![], Type::map(Int, Int)),
        ("HashSet::new", vec![], Type::set(Int)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_populates_global_scope() {
        let mut env = SymbolTable::new();
        let mut types = TypeRegistry::new();
        seed(&mut env, &mut types);

        assert!(env.lookup("print").is_some());
        assert!(env.lookup("file_read").is_some());
        assert!(env.lookup("File::read").is_some());
        assert!(env.lookup("Math::sqrt").is_some());
        assert!(types.struct_def("Json").is_some());

        // The surface is large; the exact count is configuration, but it
        // must stay in the standard-library ballpark.
        let count = env.globals().count();
        assert!(count > 200, "expected a full stdlib surface, got {count} names");
    }

    #[test]
    fn print_is_variadic() {
        let mut env = SymbolTable::new();
        let mut types = TypeRegistry::new();
        seed(&mut env, &mut types);
        let print = env.lookup("print").unwrap();
        assert!(print.ty.as_function().unwrap().is_variadic);
    }

    #[test]
    fn contracts_check_arity() {
        let (arity, _) = call_contract("len").unwrap();
        assert!(arity.accepts(1));
        assert!(!arity.accepts(2));
        let (arity, _) = call_contract("assert").unwrap();
        assert!(arity.accepts(1));
        assert!(arity.accepts(2));
        assert!(!arity.accepts(3));
        assert!(call_contract("not_a_builtin").is_none());
    }
}
