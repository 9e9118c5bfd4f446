//! Built-in method dispatch.
//!
//! One table keyed by `(ReceiverKind, method name)` replaces the original
//! per-receiver switches. Each entry carries the C-level function the
//! code generator would call, the receiver-passing convention, the
//! parameter count (excluding the receiver), and a result rule that may
//! refer back to the receiver's type (element, key, value, ...).

use crate::ty::Type;

/// The receiver classification used by the dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReceiverKind {
    Str,
    Int,
    Float,
    Bool,
    Char,
    Array,
    Map,
    Set,
    Option,
    Result,
    Json,
}

impl ReceiverKind {
    /// Classify a semantic type for method dispatch. `Json` is the seeded
    /// nominal struct the JSON builtins produce.
    pub fn of(ty: &Type) -> Option<ReceiverKind> {
        Some(match ty {
            Type::String => ReceiverKind::Str,
            Type::Int => ReceiverKind::Int,
            Type::Float => ReceiverKind::Float,
            Type::Bool => ReceiverKind::Bool,
            Type::Char => ReceiverKind::Char,
            Type::Array(_) => ReceiverKind::Array,
            Type::Map(_, _) => ReceiverKind::Map,
            Type::Set(_) => ReceiverKind::Set,
            Type::Optional(_) => ReceiverKind::Option,
            Type::Result(_, _) => ReceiverKind::Result,
            Type::Struct(name) if name == "Json" => ReceiverKind::Json,
            _ => return None,
        })
    }

    fn prefix(&self) -> &'static str {
        match self {
            ReceiverKind::Str => "string",
            ReceiverKind::Int => "int",
            ReceiverKind::Float => "float",
            ReceiverKind::Bool => "bool",
            ReceiverKind::Char => "char",
            ReceiverKind::Array => "array",
            ReceiverKind::Map => "map",
            ReceiverKind::Set => "set",
            ReceiverKind::Option => "option",
            ReceiverKind::Result => "result",
            ReceiverKind::Json => "json",
        }
    }
}

/// How a method's result type derives from the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodRet {
    Int,
    Float,
    Str,
    Bool,
    Void,
    Char,
    Json,
    /// `[String]` — split/chars/words/lines.
    StrArray,
    /// The receiver's own type (trim on strings, sorted on arrays, ...).
    Receiver,
    /// The payload type: array/set element, optional inner, result ok.
    Elem,
    /// A map's key type / value type.
    Key,
    Value,
    /// `[Elem]`, `[Key]`, `[Value]`.
    ElemArray,
    KeyArray,
    ValueArray,
    /// `Elem?` — array.find, set.pick.
    OptionElem,
    /// `Value?` — map.get.
    OptionValue,
    /// The result's error type.
    ErrType,
}

/// A dispatch-table entry.
#[derive(Debug, Clone)]
pub struct MethodSig {
    /// The C-level function name the emitter would call.
    pub c_function: String,
    /// Whether the receiver is passed by reference at the C ABI level.
    pub pass_by_ref: bool,
    /// Number of parameters excluding the receiver; `None` is variadic.
    pub param_count: Option<u8>,
    pub ret: MethodRet,
}

/// Look up `(receiver kind, method)`; `None` when the table has no entry.
pub fn lookup(receiver: ReceiverKind, method: &str) -> Option<MethodSig> {
    use MethodRet::*;
    let (pass_by_ref, params, ret): (bool, i8, MethodRet) = match (receiver, method) {
        // ── String ─────────────────────────────────────────────────────
        (ReceiverKind::Str, "len" | "length") => (false, 0, Int),
        (ReceiverKind::Str, "upper" | "lower" | "trim" | "trim_left" | "trim_right") => {
            (false, 0, Str)
        }
        (ReceiverKind::Str, "capitalize" | "title" | "reverse") => (false, 0, Str),
        (ReceiverKind::Str, "is_empty") => (false, 0, Bool),
        (ReceiverKind::Str, "contains" | "starts_with" | "ends_with" | "equals") => {
            (false, 1, Bool)
        }
        (ReceiverKind::Str, "index_of" | "last_index_of" | "count") => (false, 1, Int),
        (ReceiverKind::Str, "replace" | "replace_all" | "slice" | "substring") => (false, 2, Str),
        (ReceiverKind::Str, "char_at" | "charAt") => (false, 1, Str),
        (ReceiverKind::Str, "repeat") => (false, 1, Str),
        (ReceiverKind::Str, "concat") => (false, 1, Str),
        (ReceiverKind::Str, "pad_left" | "pad_right") => (false, 2, Str),
        (ReceiverKind::Str, "split") => (false, 1, StrArray),
        (ReceiverKind::Str, "chars" | "words" | "lines") => (false, 0, StrArray),
        (ReceiverKind::Str, "is_alpha" | "is_digit" | "is_alnum" | "is_whitespace"
        | "is_numeric") => (false, 0, Bool),
        (ReceiverKind::Str, "to_int" | "parse_int") => (false, 0, Int),
        (ReceiverKind::Str, "to_float" | "parse_float") => (false, 0, Float),
        (ReceiverKind::Str, "parse_json") => (false, 0, Json),
        (ReceiverKind::Str, "format") => (false, -1, Str),
        (ReceiverKind::Str, "exists" | "is_file" | "is_dir") => (false, 0, Bool),
        (ReceiverKind::Str, "http_get") => (false, 0, Str),
        (ReceiverKind::Str, "http_post") => (false, 1, Str),

        // ── Int ────────────────────────────────────────────────────────
        (ReceiverKind::Int, "to_string" | "to_binary" | "to_hex") => (false, 0, Str),
        (ReceiverKind::Int, "to_float") => (false, 0, Float),
        (ReceiverKind::Int, "abs" | "sign") => (false, 0, Int),
        (ReceiverKind::Int, "pow" | "min" | "max") => (false, 1, Int),
        (ReceiverKind::Int, "clamp") => (false, 2, Int),
        (ReceiverKind::Int, "is_even" | "is_odd" | "is_positive" | "is_negative" | "is_zero") => {
            (false, 0, Bool)
        }

        // ── Float ──────────────────────────────────────────────────────
        (ReceiverKind::Float, "to_string") => (false, 0, Str),
        (ReceiverKind::Float, "to_int") => (false, 0, Int),
        (
            ReceiverKind::Float,
            "round" | "floor" | "ceil" | "abs" | "sqrt" | "sin" | "cos" | "tan" | "asin"
            | "acos" | "atan" | "log" | "log10" | "log2" | "exp" | "sign",
        ) => (false, 0, Float),
        (ReceiverKind::Float, "pow" | "min" | "max" | "round_to") => (false, 1, Float),
        (ReceiverKind::Float, "clamp") => (false, 2, Float),
        (
            ReceiverKind::Float,
            "is_nan" | "is_infinite" | "is_finite" | "is_positive" | "is_negative",
        ) => (false, 0, Bool),

        // ── Bool / Char ────────────────────────────────────────────────
        (ReceiverKind::Bool, "to_string") => (false, 0, Str),
        (ReceiverKind::Bool, "to_int") => (false, 0, Int),
        (ReceiverKind::Char, "to_string") => (false, 0, Str),
        (ReceiverKind::Char, "to_int") => (false, 0, Int),
        (ReceiverKind::Char, "is_alpha" | "is_digit" | "is_whitespace" | "is_upper"
        | "is_lower") => (false, 0, Bool),
        (ReceiverKind::Char, "to_upper" | "to_lower") => (false, 0, Char),

        // ── Array ──────────────────────────────────────────────────────
        (ReceiverKind::Array, "len" | "length" | "count") => (true, 0, Int),
        (ReceiverKind::Array, "is_empty") => (true, 0, Bool),
        (ReceiverKind::Array, "sum" | "min" | "max") => (true, 0, Elem),
        (ReceiverKind::Array, "average") => (true, 0, Float),
        (ReceiverKind::Array, "get" | "at") => (true, 1, Elem),
        (ReceiverKind::Array, "first" | "last" | "pop") => (true, 0, Elem),
        (ReceiverKind::Array, "push") => (true, 1, Void),
        (ReceiverKind::Array, "contains") => (true, 1, Bool),
        (ReceiverKind::Array, "index_of" | "last_index_of") => (true, 1, Int),
        (ReceiverKind::Array, "reverse" | "sort" | "unique") => (true, 0, Receiver),
        (ReceiverKind::Array, "slice") => (true, 2, Receiver),
        (ReceiverKind::Array, "concat") => (true, 1, Receiver),
        (ReceiverKind::Array, "fill") => (true, 1, Receiver),
        (ReceiverKind::Array, "join") => (true, 1, Str),
        (ReceiverKind::Array, "find") => (true, 1, OptionElem),
        (ReceiverKind::Array, "find_index") => (true, 1, Int),
        (ReceiverKind::Array, "any" | "all") => (true, 1, Bool),

        // ── Map ────────────────────────────────────────────────────────
        (ReceiverKind::Map, "len" | "length" | "count") => (true, 0, Int),
        (ReceiverKind::Map, "is_empty") => (true, 0, Bool),
        (ReceiverKind::Map, "get") => (true, 1, OptionValue),
        (ReceiverKind::Map, "insert" | "set") => (true, 2, Void),
        (ReceiverKind::Map, "remove") => (true, 1, Bool),
        (ReceiverKind::Map, "has" | "contains_key") => (true, 1, Bool),
        (ReceiverKind::Map, "keys") => (true, 0, KeyArray),
        (ReceiverKind::Map, "values") => (true, 0, ValueArray),
        (ReceiverKind::Map, "clear") => (true, 0, Void),

        // ── Set ────────────────────────────────────────────────────────
        (ReceiverKind::Set, "len" | "length" | "count") => (true, 0, Int),
        (ReceiverKind::Set, "is_empty") => (true, 0, Bool),
        (ReceiverKind::Set, "add") => (true, 1, Void),
        (ReceiverKind::Set, "remove") => (true, 1, Bool),
        (ReceiverKind::Set, "contains") => (true, 1, Bool),
        (ReceiverKind::Set, "clear") => (true, 0, Void),
        (ReceiverKind::Set, "union" | "intersection" | "difference") => (true, 1, Receiver),
        (ReceiverKind::Set, "is_subset" | "is_superset") => (true, 1, Bool),
        (ReceiverKind::Set, "to_array") => (true, 0, ElemArray),

        // ── Option ─────────────────────────────────────────────────────
        (ReceiverKind::Option, "is_some" | "is_none") => (false, 0, Bool),
        (ReceiverKind::Option, "unwrap") => (false, 0, Elem),
        (ReceiverKind::Option, "unwrap_or") => (false, 1, Elem),
        (ReceiverKind::Option, "expect") => (false, 1, Elem),

        // ── Result ─────────────────────────────────────────────────────
        (ReceiverKind::Result, "is_ok" | "is_err") => (false, 0, Bool),
        (ReceiverKind::Result, "unwrap") => (false, 0, Elem),
        (ReceiverKind::Result, "unwrap_or") => (false, 1, Elem),
        (ReceiverKind::Result, "unwrap_err") => (false, 0, ErrType),

        // ── Json ───────────────────────────────────────────────────────
        (ReceiverKind::Json, "get_string") => (true, 1, Str),
        (ReceiverKind::Json, "get_int") => (true, 1, Int),
        (ReceiverKind::Json, "get_float") => (true, 1, Float),
        (ReceiverKind::Json, "get_bool") => (true, 1, Bool),
        (ReceiverKind::Json, "has_key") => (true, 1, Bool),
        (ReceiverKind::Json, "stringify") => (true, 0, Str),
        (ReceiverKind::Json, "free") => (true, 0, Void),

        _ => return None,
    };

    Some(MethodSig {
        c_function: format!("wyn_{}_{}", receiver.prefix(), method),
        pass_by_ref,
        param_count: (params >= 0).then_some(params as u8),
        ret,
    })
}

/// Resolve a result rule against the concrete receiver type.
pub fn resolve_ret(ret: MethodRet, receiver: &Type) -> Type {
    match ret {
        MethodRet::Int => Type::Int,
        MethodRet::Float => Type::Float,
        MethodRet::Str => Type::String,
        MethodRet::Bool => Type::Bool,
        MethodRet::Void => Type::Void,
        MethodRet::Char => Type::Char,
        MethodRet::Json => Type::Struct("Json".into()),
        MethodRet::StrArray => Type::array(Type::String),
        MethodRet::Receiver => receiver.clone(),
        MethodRet::Elem => elem_of(receiver),
        MethodRet::Key => key_of(receiver),
        MethodRet::Value => value_of(receiver),
        MethodRet::ElemArray => Type::array(elem_of(receiver)),
        MethodRet::KeyArray => Type::array(key_of(receiver)),
        MethodRet::ValueArray => Type::array(value_of(receiver)),
        MethodRet::OptionElem => Type::optional(elem_of(receiver)),
        MethodRet::OptionValue => Type::optional(value_of(receiver)),
        MethodRet::ErrType => match receiver {
            Type::Result(_, err) => (**err).clone(),
            _ => Type::Int,
        },
    }
}

/// The payload type of a container-like receiver; `Int` when unknown.
fn elem_of(receiver: &Type) -> Type {
    match receiver {
        Type::Array(elem) | Type::Set(elem) | Type::Optional(elem) => (**elem).clone(),
        Type::Result(ok, _) => (**ok).clone(),
        _ => Type::Int,
    }
}

fn key_of(receiver: &Type) -> Type {
    match receiver {
        Type::Map(key, _) => (**key).clone(),
        _ => Type::Int,
    }
}

fn value_of(receiver: &Type) -> Type {
    match receiver {
        Type::Map(_, value) => (**value).clone(),
        _ => Type::Int,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_methods_dispatch() {
        let sig = lookup(ReceiverKind::Str, "upper").unwrap();
        assert_eq!(sig.c_function, "wyn_string_upper");
        assert!(!sig.pass_by_ref);
        assert_eq!(resolve_ret(sig.ret, &Type::String), Type::String);

        let split = lookup(ReceiverKind::Str, "split").unwrap();
        assert_eq!(
            resolve_ret(split.ret, &Type::String),
            Type::array(Type::String)
        );
    }

    #[test]
    fn array_methods_track_element_type() {
        let arr = Type::array(Type::Float);
        let sum = lookup(ReceiverKind::Array, "sum").unwrap();
        assert!(sum.pass_by_ref);
        assert_eq!(resolve_ret(sum.ret, &arr), Type::Float);

        let find = lookup(ReceiverKind::Array, "find").unwrap();
        assert_eq!(resolve_ret(find.ret, &arr), Type::optional(Type::Float));
    }

    #[test]
    fn map_methods_track_key_and_value() {
        let map = Type::map(Type::String, Type::Int);
        let get = lookup(ReceiverKind::Map, "get").unwrap();
        assert_eq!(resolve_ret(get.ret, &map), Type::optional(Type::Int));
        let keys = lookup(ReceiverKind::Map, "keys").unwrap();
        assert_eq!(resolve_ret(keys.ret, &map), Type::array(Type::String));
    }

    #[test]
    fn result_methods_pick_sides() {
        let res = Type::result(Type::Int, Type::String);
        let unwrap = lookup(ReceiverKind::Result, "unwrap").unwrap();
        assert_eq!(resolve_ret(unwrap.ret, &res), Type::Int);
        let unwrap_err = lookup(ReceiverKind::Result, "unwrap_err").unwrap();
        assert_eq!(resolve_ret(unwrap_err.ret, &res), Type::String);
    }

    #[test]
    fn variadic_format_has_no_fixed_arity() {
        let sig = lookup(ReceiverKind::Str, "format").unwrap();
        assert_eq!(sig.param_count, None);
    }

    #[test]
    fn unknown_method_returns_none() {
        assert!(lookup(ReceiverKind::Int, "frobnicate").is_none());
    }

    #[test]
    fn receiver_kind_classification() {
        assert_eq!(ReceiverKind::of(&Type::String), Some(ReceiverKind::Str));
        assert_eq!(
            ReceiverKind::of(&Type::array(Type::Int)),
            Some(ReceiverKind::Array)
        );
        assert_eq!(
            ReceiverKind::of(&Type::Struct("Json".into())),
            Some(ReceiverKind::Json)
        );
        assert_eq!(ReceiverKind::of(&Type::Struct("Point".into())), None);
    }
}
