//! Parser integration tests using insta snapshots.
//!
//! Each test parses a Wyn snippet, renders the tree through a compact
//! s-expression formatter, and snapshots the output to verify precedence,
//! associativity, and tree structure. A handful of structural assertions
//! at the bottom cover properties a snapshot cannot express (id
//! uniqueness, error recovery).

use insta::assert_snapshot;

use wyn_parser::ast::{
    Expr, ExprKind, FnDecl, InterpPart, MatchArm, Pattern, PatternKind, Stmt, StmtKind, TypeExpr,
    TypeExprKind, VarBinding,
};
use wyn_parser::ast::expr::UnaryOp;

/// Parse a snippet and render every statement, appending parse errors
/// the way the reference formatter does.
fn render(source: &str) -> String {
    let parse = wyn_parser::parse(source);
    let mut lines: Vec<String> = parse.program.stmts.iter().map(render_stmt).collect();
    if !parse.errors.is_empty() {
        lines.push("errors:".into());
        for e in &parse.errors {
            lines.push(format!("  - {}", e.message));
        }
    }
    lines.join("\n")
}

fn render_stmt(stmt: &Stmt) -> String {
    match &stmt.kind {
        StmtKind::Var { binding, ty, init } => {
            let name = match binding {
                VarBinding::Name(n, _) => n.clone(),
                VarBinding::Pattern(p) => render_pattern(p),
            };
            let ty = ty.as_ref().map(render_type).unwrap_or_else(|| "_".into());
            let init = init.as_ref().map(render_expr).unwrap_or_else(|| "_".into());
            format!("(var {name} {ty} {init})")
        }
        StmtKind::Const { name, init, .. } => format!("(const {name} {})", render_expr(init)),
        StmtKind::Expr(e) => render_expr(e),
        StmtKind::Return(None) => "(return)".into(),
        StmtKind::Return(Some(e)) => format!("(return {})", render_expr(e)),
        StmtKind::Block(stmts) => format!(
            "(block{})",
            stmts.iter().map(|s| format!(" {}", render_stmt(s))).collect::<String>()
        ),
        StmtKind::If { cond, then_branch, else_branch } => format!(
            "(if {} {}{})",
            render_expr(cond),
            render_stmt(then_branch),
            else_branch
                .as_ref()
                .map(|e| format!(" {}", render_stmt(e)))
                .unwrap_or_default()
        ),
        StmtKind::While { cond, body } => {
            format!("(while {} {})", render_expr(cond), render_stmt(body))
        }
        StmtKind::ForC { init, cond, step, body } => format!(
            "(for-c {} {} {} {})",
            init.as_ref().map(|s| render_stmt(s)).unwrap_or_else(|| "_".into()),
            cond.as_ref().map(render_expr).unwrap_or_else(|| "_".into()),
            step.as_ref().map(render_expr).unwrap_or_else(|| "_".into()),
            render_stmt(body)
        ),
        StmtKind::ForIn { var, iter, body, .. } => {
            format!("(for {var} {} {})", render_expr(iter), render_stmt(body))
        }
        StmtKind::Fn(decl) => render_fn(decl),
        StmtKind::Extern(decl) => format!("(extern {})", decl.name),
        StmtKind::Macro { name, .. } => format!("(macro {name})"),
        StmtKind::Struct(decl) => {
            let generics = if decl.generics.is_empty() {
                String::new()
            } else {
                format!("<{}>", decl.generics.join(", "))
            };
            let fields: String = decl
                .fields
                .iter()
                .map(|(n, _, t)| format!(" {n}:{}", render_type(t)))
                .collect();
            format!("(struct {}{generics}{fields})", decl.name)
        }
        StmtKind::Impl(decl) => format!(
            "(impl {}{})",
            decl.target,
            decl.methods.iter().map(|m| format!(" {}", render_fn(m))).collect::<String>()
        ),
        StmtKind::Trait(decl) => format!(
            "(trait {}{})",
            decl.name,
            decl.methods
                .iter()
                .map(|m| format!(" {}", render_fn(&m.decl)))
                .collect::<String>()
        ),
        StmtKind::Enum(decl) => {
            let variants: String = decl
                .variants
                .iter()
                .map(|v| {
                    if v.fields.is_empty() {
                        format!(" {}", v.name)
                    } else {
                        format!(
                            " {}({})",
                            v.name,
                            v.fields.iter().map(render_type).collect::<Vec<_>>().join(", ")
                        )
                    }
                })
                .collect();
            format!("(enum {}{variants})", decl.name)
        }
        StmtKind::TypeAlias { name, aliased, .. } => {
            format!("(type {name} {})", render_type(aliased))
        }
        StmtKind::Import { path, alias, .. } => match alias {
            Some(a) => format!("(import {path} as {a})"),
            None => format!("(import {path})"),
        },
        StmtKind::Export(inner) => format!("(export {})", render_stmt(inner)),
        StmtKind::Match { scrutinee, arms } => {
            format!("(match {}{})", render_expr(scrutinee), render_arms(arms))
        }
        StmtKind::Try { body, catches, finally } => format!(
            "(try {}{}{})",
            render_stmt(body),
            catches
                .iter()
                .map(|c| format!(" (catch {} {})", c.name, render_stmt(&c.body)))
                .collect::<String>(),
            finally
                .as_ref()
                .map(|f| format!(" (finally {})", render_stmt(f)))
                .unwrap_or_default()
        ),
        StmtKind::Throw(e) => format!("(throw {})", render_expr(e)),
        StmtKind::Break => "(break)".into(),
        StmtKind::Continue => "(continue)".into(),
        StmtKind::Defer(e) => format!("(defer {})", render_expr(e)),
        StmtKind::Unsafe(inner) => format!("(unsafe {})", render_stmt(inner)),
        StmtKind::Test { name, body } => format!("(test {name:?} {})", render_stmt(body)),
        StmtKind::Spawn(e) => format!("(spawn {})", render_expr(e)),
    }
}

fn render_fn(decl: &FnDecl) -> String {
    let mut out = String::from("(fn ");
    if decl.is_public {
        out.push_str("pub ");
    }
    if let Some((recv, _)) = &decl.receiver {
        out.push_str(recv);
        out.push('.');
    }
    out.push_str(&decl.name);
    if !decl.generics.is_empty() {
        out.push_str(&format!("<{}>", decl.generics.join(", ")));
    }
    let params = decl
        .params
        .iter()
        .map(|p| {
            let mut s = p.name.clone();
            if let Some(t) = &p.ty {
                s.push(':');
                s.push_str(&render_type(t));
            }
            if let Some(d) = &p.default {
                s.push('=');
                s.push_str(&render_expr(d));
            }
            s
        })
        .collect::<Vec<_>>()
        .join(" ");
    out.push_str(&format!(" ({params})"));
    if let Some(ret) = &decl.ret {
        out.push_str(&format!(" -> {}", render_type(ret)));
    }
    if let Some(body) = &decl.body {
        out.push_str(&format!(" {}", render_stmt(body)));
    }
    out.push(')');
    out
}

fn render_type(ty: &TypeExpr) -> String {
    match &ty.kind {
        TypeExprKind::Named { name, args } => {
            if args.is_empty() {
                name.clone()
            } else {
                format!(
                    "{name}<{}>",
                    args.iter().map(render_type).collect::<Vec<_>>().join(", ")
                )
            }
        }
        TypeExprKind::Array(elem) => format!("[{}]", render_type(elem)),
        TypeExprKind::Function { params, ret } => format!(
            "fn({}) -> {}",
            params.iter().map(render_type).collect::<Vec<_>>().join(", "),
            render_type(ret)
        ),
        TypeExprKind::Optional(inner) => format!("{}?", render_type(inner)),
        TypeExprKind::Union(members) => members
            .iter()
            .map(render_type)
            .collect::<Vec<_>>()
            .join(" | "),
    }
}

fn render_pattern(pat: &Pattern) -> String {
    match &pat.kind {
        PatternKind::Wildcard => "_".into(),
        PatternKind::Binding(n) => n.clone(),
        PatternKind::Literal(e) => render_expr(e),
        PatternKind::Tuple(ps) => format!(
            "(pat-tuple{})",
            ps.iter().map(|p| format!(" {}", render_pattern(p))).collect::<String>()
        ),
        PatternKind::Array { elements, rest } => {
            let rest = match rest {
                None => String::new(),
                Some(None) => " ..".into(),
                Some(Some(n)) => format!(" ..{n}"),
            };
            format!(
                "(pat-array{}{rest})",
                elements
                    .iter()
                    .map(|p| format!(" {}", render_pattern(p)))
                    .collect::<String>()
            )
        }
        PatternKind::Struct { name, fields, .. } => format!(
            "(pat-struct {name}{})",
            fields
                .iter()
                .map(|(f, _, sub)| match sub {
                    None => format!(" {f}"),
                    Some(p) => format!(" {f}:{}", render_pattern(p)),
                })
                .collect::<String>()
        ),
        PatternKind::Variant { enum_name, variant, args, .. } => {
            let base = match enum_name {
                Some(e) => format!("{e}::{variant}"),
                None => variant.clone(),
            };
            if args.is_empty() {
                base
            } else {
                format!(
                    "({base}{})",
                    args.iter().map(|p| format!(" {}", render_pattern(p))).collect::<String>()
                )
            }
        }
        PatternKind::Range { start, end, .. } => {
            format!("(pat-range {} {})", render_expr(start), render_expr(end))
        }
        PatternKind::Or(alts) => format!(
            "(or{})",
            alts.iter().map(|p| format!(" {}", render_pattern(p))).collect::<String>()
        ),
        PatternKind::Guard { inner, cond } => {
            format!("(guard {} {})", render_pattern(inner), render_expr(cond))
        }
    }
}

fn render_arms(arms: &[MatchArm]) -> String {
    arms.iter()
        .map(|a| format!(" (arm {} {})", render_pattern(&a.pattern), render_expr(&a.body)))
        .collect()
}

fn render_expr(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::IntLit(v) => format!("Int({v})"),
        ExprKind::FloatLit(v) => format!("Float({v:?})"),
        ExprKind::StrLit(s) => format!("Str({s:?})"),
        ExprKind::CharLit(c) => format!("Char({c:?})"),
        ExprKind::BoolLit(b) => format!("Bool({b})"),
        ExprKind::Ident(n) => n.clone(),
        ExprKind::Unary { op, operand } => {
            let op = match op {
                UnaryOp::Neg => "neg",
                UnaryOp::Not => "not",
            };
            format!("({op} {})", render_expr(operand))
        }
        ExprKind::Binary { op, lhs, rhs, .. } => {
            format!("({} {} {})", op.symbol(), render_expr(lhs), render_expr(rhs))
        }
        ExprKind::Call { callee, args } => format!(
            "(call {}{})",
            render_expr(callee),
            args.iter().map(|a| format!(" {}", render_expr(a))).collect::<String>()
        ),
        ExprKind::MethodCall { receiver, method, args, .. } => format!(
            "(method {} {method}{})",
            render_expr(receiver),
            args.iter().map(|a| format!(" {}", render_expr(a))).collect::<String>()
        ),
        ExprKind::Field { object, field, .. } => {
            format!("(field {} {field})", render_expr(object))
        }
        ExprKind::TupleIndex { object, index } => {
            format!("(tuple-index {} {index})", render_expr(object))
        }
        ExprKind::ArrayLit(xs) => format!(
            "(array{})",
            xs.iter().map(|x| format!(" {}", render_expr(x))).collect::<String>()
        ),
        ExprKind::MapLit(entries) => format!(
            "(map{})",
            entries
                .iter()
                .map(|(k, v)| format!(" ({} {})", render_expr(k), render_expr(v)))
                .collect::<String>()
        ),
        ExprKind::SetLit(xs) => format!(
            "(set{})",
            xs.iter().map(|x| format!(" {}", render_expr(x))).collect::<String>()
        ),
        ExprKind::TupleLit(xs) => format!(
            "(tuple{})",
            xs.iter().map(|x| format!(" {}", render_expr(x))).collect::<String>()
        ),
        ExprKind::Index { object, index } => {
            format!("(index {} {})", render_expr(object), render_expr(index))
        }
        ExprKind::IndexAssign { object, index, value } => format!(
            "(index-set {} {} {})",
            render_expr(object),
            render_expr(index),
            render_expr(value)
        ),
        ExprKind::Assign { target, value, .. } => {
            format!("(assign {target} {})", render_expr(value))
        }
        ExprKind::FieldAssign { object, field, value, .. } => format!(
            "(field-set {} {field} {})",
            render_expr(object),
            render_expr(value)
        ),
        ExprKind::StructInit { name, fields, .. } => format!(
            "(init {name}{})",
            fields
                .iter()
                .map(|(f, _, v)| format!(" ({f} {})", render_expr(v)))
                .collect::<String>()
        ),
        ExprKind::Range { start, end, inclusive } => format!(
            "({} {} {})",
            if *inclusive { "range-incl" } else { "range" },
            render_expr(start),
            render_expr(end)
        ),
        ExprKind::Lambda { params, body } => format!(
            "(lambda ({}) {})",
            params.iter().map(|p| p.name.clone()).collect::<Vec<_>>().join(" "),
            render_expr(body)
        ),
        ExprKind::Block { stmts, tail } => format!(
            "(block{}{})",
            stmts.iter().map(|s| format!(" {}", render_stmt(s))).collect::<String>(),
            tail.as_ref().map(|t| format!(" {}", render_expr(t))).unwrap_or_default()
        ),
        ExprKind::If { cond, then_branch, else_branch } => format!(
            "(if {} {}{})",
            render_expr(cond),
            render_expr(then_branch),
            else_branch
                .as_ref()
                .map(|e| format!(" {}", render_expr(e)))
                .unwrap_or_default()
        ),
        ExprKind::Match { scrutinee, arms } => {
            format!("(match {}{})", render_expr(scrutinee), render_arms(arms))
        }
        ExprKind::StringInterp { parts } => format!(
            "(interp{})",
            parts
                .iter()
                .map(|p| match p {
                    InterpPart::Text(t) => format!(" {t:?}"),
                    InterpPart::Expr(e) => format!(" {}", render_expr(e)),
                })
                .collect::<String>()
        ),
        ExprKind::Await(e) => format!("(await {})", render_expr(e)),
        ExprKind::Spawn(e) => format!("(spawn {})", render_expr(e)),
        ExprKind::Pipeline { value, callee } => {
            format!("(|> {} {})", render_expr(value), render_expr(callee))
        }
        ExprKind::Try(e) => format!("(try {})", render_expr(e)),
        ExprKind::OkCtor(e) => format!("(Ok {})", render_expr(e)),
        ExprKind::ErrCtor(e) => format!("(Err {})", render_expr(e)),
        ExprKind::SomeCtor(e) => format!("(Some {})", render_expr(e)),
        ExprKind::NoneCtor => "None".into(),
        ExprKind::ListComp { element, var, iter, cond, .. } => format!(
            "(comp {} {var} {}{})",
            render_expr(element),
            render_expr(iter),
            cond.as_ref().map(|c| format!(" {}", render_expr(c))).unwrap_or_default()
        ),
        ExprKind::TypeRef(t) => format!("(type {})", render_type(t)),
    }
}

// ── Precedence and associativity ───────────────────────────────────────

#[test]
fn precedence_chain() {
    // 1 + 2 * 3 - 4 / 2 => (1 + (2 * 3)) - (4 / 2)
    assert_snapshot!(
        render("1 + 2 * 3 - 4 / 2"),
        @"(- (+ Int(1) (* Int(2) Int(3))) (/ Int(4) Int(2)))"
    );
}

#[test]
fn comparison_binds_tighter_than_logical() {
    assert_snapshot!(render("a < b && c"), @"(&& (< a b) c)");
}

#[test]
fn unary_binds_tighter_than_binary() {
    assert_snapshot!(render("-x + !y"), @"(+ (neg x) (not y))");
}

#[test]
fn postfix_chain() {
    assert_snapshot!(render("xs[0].len()"), @"(method (index xs Int(0)) len)");
}

#[test]
fn coalesce_is_loosest() {
    assert_snapshot!(render("o ?? a + b"), @"(?? o (+ a b))");
}

// ── Expression forms ───────────────────────────────────────────────────

#[test]
fn call_with_struct_initializer() {
    assert_snapshot!(
        render("f(Point { x: 1 })"),
        @"(call f (init Point (x Int(1))))"
    );
}

#[test]
fn pipeline_and_try_operator() {
    assert_snapshot!(render("a |> f(b) g()?"), @r#"
(|> a (call f b))
(try (call g))
"#);
}

#[test]
fn lambda_renders() {
    assert_snapshot!(render("var f = |x, y| x + y"), @"(var f _ (lambda (x y) (+ x y)))");
}

#[test]
fn string_interpolation_renders() {
    assert_snapshot!(
        render("var s = \"v=${x}!\""),
        @r#"(var s _ (interp "v=" x "!"))"#
    );
}

#[test]
fn constructors_render() {
    assert_snapshot!(render("var r = Ok(Some(1)) var n = None"), @r#"
(var r _ (Ok (Some Int(1))))
(var n _ None)
"#);
}

// ── Statements and declarations ────────────────────────────────────────

#[test]
fn function_declaration_renders() {
    assert_snapshot!(
        render("fn add(x: Int, y: Int = 0) -> Int { return x + y }"),
        @"(fn add (x:Int y:Int=Int(0)) -> Int (block (return (+ x y))))"
    );
}

#[test]
fn generic_function_renders() {
    assert_snapshot!(
        render("fn id<T>(x: T) -> T { return x }"),
        @"(fn id<T> (x:T) -> T (block (return x)))"
    );
}

#[test]
fn enum_and_annotated_var_render() {
    assert_snapshot!(render("enum Shape { Circle(Float), Point } var s: Result<Int, String> = f()"), @r#"
(enum Shape Circle(Float) Point)
(var s Result<Int, String> (call f))
"#);
}

#[test]
fn match_statement_arms_render() {
    assert_snapshot!(
        render("match c { Red => 1, Color::Green => 2, Some(x) => x, _ => 0 }"),
        @"(match c (arm Red Int(1)) (arm Color::Green Int(2)) (arm (Some x) x) (arm _ Int(0)))"
    );
}

#[test]
fn or_pattern_and_guard_render() {
    assert_snapshot!(
        render("match x { 1 | 2 => 0, n if n > 3 => n, _ => 1 }"),
        @"(match x (arm (or Int(1) Int(2)) Int(0)) (arm (guard n (> n Int(3))) n) (arm _ Int(1)))"
    );
}

#[test]
fn destructuring_var_renders() {
    assert_snapshot!(render("var (a, b) = pair var [x, ..rest] = xs"), @r#"
(var (pat-tuple a b) _ pair)
(var (pat-array x ..rest) _ xs)
"#);
}

#[test]
fn import_forms_render() {
    assert_snapshot!(render("import math import geometry::math as m"), @r#"
(import math)
(import geometry::math as m)
"#);
}

#[test]
fn qualified_identifier_renders() {
    assert_snapshot!(render("var x = m::pi"), @"(var x _ m::pi)");
}

#[test]
fn type_expressions_render() {
    assert_snapshot!(render("var a: [Int] var b: Int? var c: Int | String var d: fn(Int) -> Bool"), @r#"
(var a [Int] _)
(var b Int? _)
(var c Int | String _)
(var d fn(Int) -> Bool _)
"#);
}

#[test]
fn try_catch_finally_renders() {
    assert_snapshot!(
        render("try { risky() } catch (IoError e) { print(e) } finally { done() }"),
        @"(try (block (call risky)) (catch e (block (call print e))) (finally (block (call done))))"
    );
}

#[test]
fn condition_brace_is_body_not_struct_init() {
    // `c` is followed by `{`; in condition position that brace opens the
    // body instead of a struct initializer.
    assert_snapshot!(
        render("fn f(c: Bool) { if c { return } }"),
        @"(fn f (c:Bool) (block (if c (block (return)))))"
    );
}

#[test]
fn for_forms_render() {
    assert_snapshot!(render("fn f(xs: [Int]) { for x in xs { print(x) } for (var i = 0; i < 3; i = i + 1) { } }"), @"(fn f (xs:[Int]) (block (for x xs (block (call print x))) (for-c (var i _ Int(0)) (< i Int(3)) (assign i (+ i Int(1))) (block))))");
}

#[test]
fn pub_and_export_render() {
    assert_snapshot!(render("pub fn f() { } export fn g() { }"), @r#"
(fn pub f () (block))
(export (fn g () (block)))
"#);
}

// ── Structural properties ──────────────────────────────────────────────

#[test]
fn expr_ids_are_unique() {
    let parse = wyn_parser::parse("fn f() { var x = 1 + 2 var s = \"v=${x}\" }");
    assert!(!parse.has_errors(), "{:?}", parse.errors);
    let mut seen = std::collections::HashSet::new();
    collect_ids(&parse.program.stmts, &mut |id| {
        assert!(seen.insert(id), "duplicate expr id {id:?}");
    });
    assert!(seen.len() as u32 <= parse.expr_count);
}

#[test]
fn error_recovery_continues_parsing() {
    let parse = wyn_parser::parse("fn f( { } fn g() { }");
    assert!(!parse.errors.is_empty());
    // The second function is still in the tree.
    let fns = parse
        .program
        .stmts
        .iter()
        .filter(|s| matches!(s.kind, StmtKind::Fn(_)))
        .count();
    assert!(fns >= 1);
}

/// Walk all expressions in the tree, calling `f` on each id.
fn collect_ids(stmts: &[Stmt], f: &mut impl FnMut(wyn_parser::ast::ExprId)) {
    fn walk_expr(e: &Expr, f: &mut impl FnMut(wyn_parser::ast::ExprId)) {
        f(e.id);
        use ExprKind::*;
        match &e.kind {
            Unary { operand, .. } => walk_expr(operand, f),
            Binary { lhs, rhs, .. } => {
                walk_expr(lhs, f);
                walk_expr(rhs, f);
            }
            Call { callee, args } => {
                walk_expr(callee, f);
                args.iter().for_each(|a| walk_expr(a, f));
            }
            MethodCall { receiver, args, .. } => {
                walk_expr(receiver, f);
                args.iter().for_each(|a| walk_expr(a, f));
            }
            Field { object, .. } | TupleIndex { object, .. } => walk_expr(object, f),
            ArrayLit(xs) | SetLit(xs) | TupleLit(xs) => xs.iter().for_each(|x| walk_expr(x, f)),
            MapLit(entries) => entries.iter().for_each(|(k, v)| {
                walk_expr(k, f);
                walk_expr(v, f);
            }),
            Index { object, index } => {
                walk_expr(object, f);
                walk_expr(index, f);
            }
            IndexAssign { object, index, value } => {
                walk_expr(object, f);
                walk_expr(index, f);
                walk_expr(value, f);
            }
            Assign { value, .. } => walk_expr(value, f),
            FieldAssign { object, value, .. } => {
                walk_expr(object, f);
                walk_expr(value, f);
            }
            StructInit { fields, .. } => fields.iter().for_each(|(_, _, v)| walk_expr(v, f)),
            Range { start, end, .. } => {
                walk_expr(start, f);
                walk_expr(end, f);
            }
            Lambda { body, .. } => walk_expr(body, f),
            Block { stmts, tail } => {
                walk_stmts(stmts, f);
                if let Some(t) = tail {
                    walk_expr(t, f);
                }
            }
            If { cond, then_branch, else_branch } => {
                walk_expr(cond, f);
                walk_expr(then_branch, f);
                if let Some(e) = else_branch {
                    walk_expr(e, f);
                }
            }
            Match { scrutinee, arms } => {
                walk_expr(scrutinee, f);
                arms.iter().for_each(|a| walk_expr(&a.body, f));
            }
            StringInterp { parts } => parts.iter().for_each(|p| {
                if let InterpPart::Expr(e) = p {
                    walk_expr(e, f);
                }
            }),
            Await(e) | Spawn(e) | Try(e) | OkCtor(e) | ErrCtor(e) | SomeCtor(e) => walk_expr(e, f),
            Pipeline { value, callee } => {
                walk_expr(value, f);
                walk_expr(callee, f);
            }
            ListComp { element, iter, cond, .. } => {
                walk_expr(element, f);
                walk_expr(iter, f);
                if let Some(c) = cond {
                    walk_expr(c, f);
                }
            }
            _ => {}
        }
    }
    fn walk_stmts(stmts: &[Stmt], f: &mut impl FnMut(wyn_parser::ast::ExprId)) {
        for s in stmts {
            use StmtKind::*;
            match &s.kind {
                Var { init, .. } => {
                    if let Some(e) = init {
                        walk_expr(e, f);
                    }
                }
                Const { init, .. } => walk_expr(init, f),
                Expr(e) | Throw(e) | Defer(e) | Spawn(e) => walk_expr(e, f),
                Return(Some(e)) => walk_expr(e, f),
                Block(inner) => walk_stmts(inner, f),
                If { cond, then_branch, else_branch } => {
                    walk_expr(cond, f);
                    walk_stmts(std::slice::from_ref(then_branch.as_ref()), f);
                    if let Some(e) = else_branch {
                        walk_stmts(std::slice::from_ref(e.as_ref()), f);
                    }
                }
                While { cond, body } => {
                    walk_expr(cond, f);
                    walk_stmts(std::slice::from_ref(body.as_ref()), f);
                }
                Fn(decl) => {
                    if let Some(body) = &decl.body {
                        walk_stmts(std::slice::from_ref(body.as_ref()), f);
                    }
                }
                Match { scrutinee, arms } => {
                    walk_expr(scrutinee, f);
                    arms.iter().for_each(|a| walk_expr(&a.body, f));
                }
                _ => {}
            }
        }
    }
    walk_stmts(stmts, f);
}
