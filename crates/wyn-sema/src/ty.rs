//! Type representation for the Wyn type system.
//!
//! A discriminated union over the primitives, containers, optionals,
//! results, unions, nominal structs/enums, function types, and generic
//! placeholders. Nominal types carry only their name; field and variant
//! layouts live in the type registry, which acts as the arena that breaks
//! type-level cycles.

use std::fmt;

/// A Wyn type.
#[derive(Debug, Clone, Eq)]
pub enum Type {
    Int,
    Float,
    String,
    Bool,
    Void,
    Char,
    /// `[T]`
    Array(Box<Type>),
    /// `Map<K, V>`
    Map(Box<Type>, Box<Type>),
    /// `Set<T>`
    Set(Box<Type>),
    /// `T?`
    Optional(Box<Type>),
    /// `Result<T, E>`
    Result(Box<Type>, Box<Type>),
    /// `A | B | ...` — structural, deduplicated, order-irrelevant.
    Union(Vec<Type>),
    /// Nominal struct, identity by name. Fields live in the registry.
    Struct(String),
    /// Nominal enum, identity by name. Variants live in the registry.
    Enum(String),
    Function(FunctionType),
    /// A placeholder inside a generic template, e.g. `T`.
    Generic(String),
}

/// A function type: parameter types, return type, variadic tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionType {
    pub params: Vec<Type>,
    pub ret: Box<Type>,
    pub is_variadic: bool,
}

impl Type {
    pub fn array(elem: Type) -> Type {
        Type::Array(Box::new(elem))
    }

    pub fn map(key: Type, value: Type) -> Type {
        Type::Map(Box::new(key), Box::new(value))
    }

    pub fn set(elem: Type) -> Type {
        Type::Set(Box::new(elem))
    }

    pub fn optional(inner: Type) -> Type {
        Type::Optional(Box::new(inner))
    }

    pub fn result(ok: Type, err: Type) -> Type {
        Type::Result(Box::new(ok), Box::new(err))
    }

    pub fn function(params: Vec<Type>, ret: Type) -> Type {
        Type::Function(FunctionType {
            params,
            ret: Box::new(ret),
            is_variadic: false,
        })
    }

    pub fn variadic(params: Vec<Type>, ret: Type) -> Type {
        Type::Function(FunctionType {
            params,
            ret: Box::new(ret),
            is_variadic: true,
        })
    }

    /// Whether this is `Bool` or `Int` (interchangeable in boolean
    /// contexts; comparisons compile to ints).
    pub fn is_bool_like(&self) -> bool {
        matches!(self, Type::Bool | Type::Int)
    }

    /// The function type, if this is one.
    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Type::Function(f) => Some(f),
            _ => None,
        }
    }

    /// The nominal name of a struct or enum type.
    pub fn nominal_name(&self) -> Option<&str> {
        match self {
            Type::Struct(n) | Type::Enum(n) => Some(n),
            _ => None,
        }
    }
}

/// Equality per the type rules: nominal types compare by name, structural
/// types by shape, unions as sets.
impl PartialEq for Type {
    fn eq(&self, other: &Type) -> bool {
        use Type::*;
        match (self, other) {
            (Int, Int) | (Float, Float) | (String, String) | (Bool, Bool) | (Void, Void)
            | (Char, Char) => true,
            (Array(a), Array(b)) => a == b,
            (Map(k1, v1), Map(k2, v2)) => k1 == k2 && v1 == v2,
            (Set(a), Set(b)) => a == b,
            (Optional(a), Optional(b)) => a == b,
            (Result(o1, e1), Result(o2, e2)) => o1 == o2 && e1 == e2,
            (Union(a), Union(b)) => {
                a.len() == b.len()
                    && a.iter().all(|m| b.contains(m))
                    && b.iter().all(|m| a.contains(m))
            }
            (Struct(a), Struct(b)) => a == b,
            (Enum(a), Enum(b)) => a == b,
            (Function(a), Function(b)) => a == b,
            (Generic(a), Generic(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "Int"),
            Type::Float => write!(f, "Float"),
            Type::String => write!(f, "String"),
            Type::Bool => write!(f, "Bool"),
            Type::Void => write!(f, "Void"),
            Type::Char => write!(f, "Char"),
            Type::Array(elem) => write!(f, "[{elem}]"),
            Type::Map(k, v) => write!(f, "Map<{k}, {v}>"),
            Type::Set(elem) => write!(f, "Set<{elem}>"),
            Type::Optional(inner) => write!(f, "{inner}?"),
            Type::Result(ok, err) => write!(f, "Result<{ok}, {err}>"),
            Type::Union(members) => {
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{m}")?;
                }
                Ok(())
            }
            Type::Struct(name) | Type::Enum(name) | Type::Generic(name) => {
                write!(f, "{name}")
            }
            Type::Function(ft) => {
                write!(f, "fn(")?;
                for (i, p) in ft.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                if ft.is_variadic {
                    if !ft.params.is_empty() {
                        write!(f, ", ")?;
                    }
                    write!(f, "...")?;
                }
                write!(f, ") -> {}", ft.ret)
            }
        }
    }
}

impl Type {
    /// Parse a type from its display form. The inverse of `Display` for
    /// every form the analyzer itself produces; bare names parse as
    /// nominal structs.
    pub fn parse(s: &str) -> Option<Type> {
        let mut p = TypeParser { s, pos: 0 };
        let ty = p.parse_union()?;
        p.skip_ws();
        if p.pos == s.len() {
            Some(ty)
        } else {
            None
        }
    }
}

struct TypeParser<'a> {
    s: &'a str,
    pos: usize,
}

impl<'a> TypeParser<'a> {
    fn rest(&self) -> &'a str {
        &self.s[self.pos..]
    }

    fn skip_ws(&mut self) {
        while self.rest().starts_with(' ') {
            self.pos += 1;
        }
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    fn parse_union(&mut self) -> Option<Type> {
        let first = self.parse_postfix()?;
        self.skip_ws();
        if !self.rest().starts_with('|') {
            return Some(first);
        }
        let mut members = vec![first];
        loop {
            self.skip_ws();
            if !self.eat("|") {
                break;
            }
            self.skip_ws();
            members.push(self.parse_postfix()?);
        }
        Some(Type::Union(members))
    }

    fn parse_postfix(&mut self) -> Option<Type> {
        let mut ty = self.parse_primary()?;
        while self.eat("?") {
            ty = Type::optional(ty);
        }
        Some(ty)
    }

    fn parse_primary(&mut self) -> Option<Type> {
        self.skip_ws();
        if self.eat("[") {
            let elem = self.parse_union()?;
            self.skip_ws();
            self.eat("]").then_some(())?;
            return Some(Type::array(elem));
        }
        if self.rest().starts_with("fn(") {
            self.eat("fn(");
            let mut params = Vec::new();
            let mut is_variadic = false;
            self.skip_ws();
            if !self.rest().starts_with(')') {
                loop {
                    self.skip_ws();
                    if self.eat("...") {
                        is_variadic = true;
                        break;
                    }
                    params.push(self.parse_union()?);
                    self.skip_ws();
                    if !self.eat(",") {
                        break;
                    }
                }
            }
            self.skip_ws();
            self.eat(")").then_some(())?;
            self.skip_ws();
            self.eat("->").then_some(())?;
            self.skip_ws();
            let ret = self.parse_postfix()?;
            return Some(Type::Function(FunctionType {
                params,
                ret: Box::new(ret),
                is_variadic,
            }));
        }

        let name_len = self
            .rest()
            .find(|c: char| !c.is_alphanumeric() && c != '_')
            .unwrap_or(self.rest().len());
        if name_len == 0 {
            return None;
        }
        let name = &self.rest()[..name_len];
        self.pos += name_len;

        match name {
            "Int" => return Some(Type::Int),
            "Float" => return Some(Type::Float),
            "String" => return Some(Type::String),
            "Bool" => return Some(Type::Bool),
            "Void" => return Some(Type::Void),
            "Char" => return Some(Type::Char),
            _ => {}
        }

        if self.eat("<") {
            let mut args = Vec::new();
            loop {
                args.push(self.parse_union()?);
                self.skip_ws();
                if !self.eat(",") {
                    break;
                }
            }
            self.eat(">").then_some(())?;
            return match (name, args.len()) {
                ("Map", 2) => {
                    let v = args.pop()?;
                    let k = args.pop()?;
                    Some(Type::map(k, v))
                }
                ("Set", 1) => Some(Type::set(args.pop()?)),
                ("Result", 2) => {
                    let e = args.pop()?;
                    let o = args.pop()?;
                    Some(Type::result(o, e))
                }
                _ => None,
            };
        }

        Some(Type::Struct(name.to_string()))
    }
}
