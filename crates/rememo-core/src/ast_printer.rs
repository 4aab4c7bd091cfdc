//! JavaScript printer for the host AST.
//!
//! Prints `JsModule` / `JsFunction` / `JsStmt` / `JsExpr` back to source.
//! Parenthesization is operand-position based: any compound expression used
//! as an operand is wrapped, which never changes meaning even when the
//! parentheses are redundant.

use std::fmt::Write;

use crate::js_ast::{
    ArrowBody, Declarator, ExportKind, ImportDecl, ImportSpecifier, JsExpr, JsFunction, JsModule,
    JsPattern, JsStmt, Literal, MemberProp, ModuleItem, ObjectMember, PropKey,
};

const INDENT: &str = "  ";

// ---------------------------------------------------------------------------
// Module / function printing
// ---------------------------------------------------------------------------

/// Print a whole module.
pub fn print_module(module: &JsModule) -> String {
    let mut out = String::new();
    let mut prev_was_import = None;
    for item in &module.items {
        let is_import = matches!(item, ModuleItem::Import(_));
        if let Some(prev) = prev_was_import {
            if !(prev && is_import) {
                out.push('\n');
            }
        }
        match item {
            ModuleItem::Import(import) => print_import(import, &mut out),
            ModuleItem::Function(func) => print_function(func, &mut out),
            ModuleItem::Raw(text) => {
                out.push_str(text.trim_end());
                out.push('\n');
            }
        }
        prev_was_import = Some(is_import);
    }
    out
}

fn print_import(import: &ImportDecl, out: &mut String) {
    let source = escape_js_string(&import.source);
    if import.specifiers.is_empty() {
        let _ = writeln!(out, "import \"{source}\";");
        return;
    }
    let mut parts = Vec::new();
    let mut named = Vec::new();
    for spec in &import.specifiers {
        match spec {
            ImportSpecifier::Default(local) => parts.push(local.clone()),
            ImportSpecifier::Namespace(local) => parts.push(format!("* as {local}")),
            ImportSpecifier::Named { imported, local } => {
                if imported == local {
                    named.push(imported.clone());
                } else {
                    named.push(format!("{imported} as {local}"));
                }
            }
        }
    }
    if !named.is_empty() {
        parts.push(format!("{{ {} }}", named.join(", ")));
    }
    let _ = writeln!(out, "import {} from \"{source}\";", parts.join(", "));
}

/// Print a function declaration.
pub fn print_function(func: &JsFunction, out: &mut String) {
    let export = match func.export {
        ExportKind::None => "",
        ExportKind::Named => "export ",
        ExportKind::Default => "export default ",
    };
    let async_kw = if func.is_async { "async " } else { "" };
    let star = if func.is_generator { "*" } else { "" };
    let _ = writeln!(
        out,
        "{export}{async_kw}function{star} {}({}) {{",
        func.name,
        print_params(&func.params),
    );
    print_stmts(&func.body, out, INDENT);
    let _ = writeln!(out, "}}");
}

fn print_params(params: &[JsPattern]) -> String {
    params
        .iter()
        .map(print_pattern)
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Statement printing
// ---------------------------------------------------------------------------

pub fn print_stmts(stmts: &[JsStmt], out: &mut String, indent: &str) {
    for stmt in stmts {
        print_stmt(stmt, out, indent);
    }
}

pub fn print_stmt(stmt: &JsStmt, out: &mut String, indent: &str) {
    match stmt {
        JsStmt::VarDecl {
            kind, declarators, ..
        } => {
            let decls: Vec<_> = declarators
                .iter()
                .map(|d| print_declarator(d, indent))
                .collect();
            let _ = writeln!(out, "{indent}{} {};", kind.keyword(), decls.join(", "));
        }
        JsStmt::Return { value, .. } => match value {
            Some(e) => {
                let _ = writeln!(out, "{indent}return {};", print_expr_in(e, indent));
            }
            None => {
                let _ = writeln!(out, "{indent}return;");
            }
        },
        JsStmt::Expr { expr, .. } => {
            let s = print_expr_in(expr, indent);
            if s.starts_with('{') || s.starts_with("function") {
                let _ = writeln!(out, "{indent}({s});");
            } else {
                let _ = writeln!(out, "{indent}{s};");
            }
        }
        JsStmt::Opaque { text, .. } => {
            let _ = writeln!(out, "{indent}{}", text.trim());
        }
    }
}

fn print_declarator(decl: &Declarator, indent: &str) -> String {
    let target = print_pattern(&decl.target);
    match &decl.init {
        Some(init) => format!("{target} = {}", print_expr_in(init, indent)),
        None => target,
    }
}

// ---------------------------------------------------------------------------
// Pattern printing
// ---------------------------------------------------------------------------

pub fn print_pattern(pat: &JsPattern) -> String {
    match pat {
        JsPattern::Ident(name) => name.clone(),
        JsPattern::Array(elems) => {
            let parts: Vec<_> = elems
                .iter()
                .map(|e| e.as_ref().map(print_pattern).unwrap_or_default())
                .collect();
            format!("[{}]", parts.join(", "))
        }
        JsPattern::Object { props, rest } => {
            let mut parts: Vec<_> = props
                .iter()
                .map(|p| {
                    if p.shorthand {
                        print_pattern(&p.value)
                    } else {
                        format!("{}: {}", print_prop_key(&p.key), print_pattern(&p.value))
                    }
                })
                .collect();
            if let Some(rest) = rest {
                parts.push(format!("...{}", print_pattern(rest)));
            }
            if parts.is_empty() {
                "{}".to_string()
            } else {
                format!("{{ {} }}", parts.join(", "))
            }
        }
        JsPattern::Assign { target, default } => {
            format!("{} = {}", print_pattern(target), print_expr(default))
        }
        JsPattern::Rest(target) => format!("...{}", print_pattern(target)),
    }
}

// ---------------------------------------------------------------------------
// Expression printing
// ---------------------------------------------------------------------------

/// Print an expression at the top level (no surrounding indentation).
pub fn print_expr(expr: &JsExpr) -> String {
    print_expr_in(expr, "")
}

fn print_expr_in(expr: &JsExpr, indent: &str) -> String {
    match expr {
        JsExpr::Literal(lit) => print_literal(lit),

        JsExpr::Ident(name) => name.clone(),

        JsExpr::Member { object, property } => {
            let obj = print_callee(object, indent);
            match property {
                MemberProp::Name(name) if is_valid_js_ident(name) => format!("{obj}.{name}"),
                MemberProp::Name(name) => format!("{obj}[\"{}\"]", escape_js_string(name)),
                MemberProp::Computed(index) => format!("{obj}[{}]", print_expr_in(index, indent)),
            }
        }

        JsExpr::Call { callee, args } => {
            format!("{}({})", print_callee(callee, indent), print_args(args, indent))
        }

        JsExpr::OptionalMember { object, property } => {
            let obj = print_callee(object, indent);
            match property {
                MemberProp::Name(name) if is_valid_js_ident(name) => format!("{obj}?.{name}"),
                MemberProp::Name(name) => format!("{obj}?.[\"{}\"]", escape_js_string(name)),
                MemberProp::Computed(index) => format!("{obj}?.[{}]", print_expr_in(index, indent)),
            }
        }

        JsExpr::OptionalCall { callee, args } => {
            format!("{}?.({})", print_callee(callee, indent), print_args(args, indent))
        }

        JsExpr::Template { quasis, exprs } => {
            let mut out = String::from("`");
            for (i, quasi) in quasis.iter().enumerate() {
                out.push_str(quasi);
                if let Some(e) = exprs.get(i) {
                    let _ = write!(out, "${{{}}}", print_expr_in(e, indent));
                }
            }
            out.push('`');
            out
        }

        JsExpr::New { callee, args } => {
            // `new f(a)()` would bind the call to `new`; wrap call callees.
            let callee_str = match callee.as_ref() {
                JsExpr::Call { .. } => format!("({})", print_expr_in(callee, indent)),
                _ => print_callee(callee, indent),
            };
            format!("new {callee_str}({})", print_args(args, indent))
        }

        JsExpr::Object(members) => {
            if members.is_empty() {
                return "{}".to_string();
            }
            let parts: Vec<_> = members
                .iter()
                .map(|m| match m {
                    ObjectMember::Property {
                        key,
                        value,
                        shorthand,
                    } => {
                        if *shorthand {
                            print_expr_in(value, indent)
                        } else {
                            format!("{}: {}", print_prop_key(key), print_expr_in(value, indent))
                        }
                    }
                    ObjectMember::Spread(inner) => {
                        format!("...{}", print_expr_operand(inner, indent))
                    }
                    ObjectMember::Opaque(text) => text.clone(),
                })
                .collect();
            format!("{{ {} }}", parts.join(", "))
        }

        JsExpr::Array(elems) => {
            let parts: Vec<_> = elems
                .iter()
                .map(|e| {
                    e.as_ref()
                        .map(|e| print_expr_in(e, indent))
                        .unwrap_or_default()
                })
                .collect();
            format!("[{}]", parts.join(", "))
        }

        JsExpr::Arrow {
            params,
            body,
            is_async,
        } => {
            let async_kw = if *is_async { "async " } else { "" };
            let params_str = match params.as_slice() {
                [JsPattern::Ident(name)] => name.clone(),
                _ => format!("({})", print_params(params)),
            };
            match body {
                ArrowBody::Expr(e) => {
                    let body_str = print_expr_in(e, indent);
                    if body_str.starts_with('{') {
                        format!("{async_kw}{params_str} => ({body_str})")
                    } else {
                        format!("{async_kw}{params_str} => {body_str}")
                    }
                }
                ArrowBody::Block(stmts) => {
                    format!("{async_kw}{params_str} => {}", print_block(stmts, indent))
                }
            }
        }

        JsExpr::Function {
            name,
            params,
            body,
            is_async,
            is_generator,
        } => {
            let async_kw = if *is_async { "async " } else { "" };
            let star = if *is_generator { "*" } else { "" };
            let name = name.as_deref().map(|n| format!(" {n}")).unwrap_or_default();
            format!(
                "{async_kw}function{star}{name}({}) {}",
                print_params(params),
                print_block(body, indent),
            )
        }

        JsExpr::Unary { op, expr: inner } => {
            let operand = print_expr_operand(inner, indent);
            if op.chars().all(|c| c.is_ascii_alphabetic()) {
                format!("{op} {operand}")
            } else {
                format!("{op}{operand}")
            }
        }

        JsExpr::Binary { op, lhs, rhs } => format!(
            "{} {op} {}",
            print_expr_operand(lhs, indent),
            print_expr_operand(rhs, indent),
        ),

        JsExpr::Conditional {
            test,
            consequent,
            alternate,
        } => format!(
            "{} ? {} : {}",
            print_expr_operand(test, indent),
            print_expr_operand(consequent, indent),
            print_expr_operand(alternate, indent),
        ),

        JsExpr::Assign { op, target, value } => format!(
            "{} {op} {}",
            print_expr_in(target, indent),
            print_expr_in(value, indent),
        ),

        JsExpr::Spread(inner) => format!("...{}", print_expr_operand(inner, indent)),

        JsExpr::Opaque(text) => text.clone(),
    }
}

fn print_block(stmts: &[JsStmt], indent: &str) -> String {
    if stmts.is_empty() {
        return "{}".to_string();
    }
    let inner = format!("{indent}{INDENT}");
    let mut out = String::from("{\n");
    print_stmts(stmts, &mut out, &inner);
    out.push_str(indent);
    out.push('}');
    out
}

fn print_args(args: &[JsExpr], indent: &str) -> String {
    args.iter()
        .map(|a| print_expr_in(a, indent))
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_prop_key(key: &PropKey) -> String {
    match key {
        PropKey::Ident(name) => name.clone(),
        PropKey::String(s) => format!("\"{}\"", escape_js_string(s)),
        PropKey::Number(n) => format_number(*n),
        PropKey::Computed(e) => format!("[{}]", print_expr(e)),
    }
}

/// Print an expression in callee / member-object position.
fn print_callee(expr: &JsExpr, indent: &str) -> String {
    let wrap = needs_parens(expr)
        || matches!(
            expr,
            JsExpr::Literal(Literal::Number(_)) | JsExpr::Object(_) | JsExpr::New { .. }
        );
    if wrap {
        format!("({})", print_expr_in(expr, indent))
    } else {
        print_expr_in(expr, indent)
    }
}

/// Print an expression as an operand (may need parenthesization).
fn print_expr_operand(expr: &JsExpr, indent: &str) -> String {
    if needs_parens(expr) {
        format!("({})", print_expr_in(expr, indent))
    } else {
        print_expr_in(expr, indent)
    }
}

/// Whether an expression needs parentheses when used as an operand.
fn needs_parens(expr: &JsExpr) -> bool {
    matches!(
        expr,
        JsExpr::Binary { .. }
            | JsExpr::Conditional { .. }
            | JsExpr::Assign { .. }
            | JsExpr::Unary { .. }
            | JsExpr::Arrow { .. }
            | JsExpr::Function { .. }
            | JsExpr::Opaque(_)
    )
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn print_literal(lit: &Literal) -> String {
    match lit {
        Literal::Null => "null".into(),
        Literal::Bool(b) => b.to_string(),
        Literal::Number(n) => format_number(*n),
        Literal::String(s) => format!("\"{}\"", escape_js_string(s)),
    }
}

/// JS-style number text: integral values print without a fraction.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

pub fn is_valid_js_ident(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

pub fn escape_js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::js_ast::DeclKind;

    #[test]
    fn print_method_call_with_arrow() {
        let e = JsExpr::method_call(
            JsExpr::ident("a"),
            "map",
            vec![JsExpr::arrow(
                vec![JsPattern::ident("x")],
                JsExpr::binary("*", JsExpr::ident("x"), JsExpr::ident("b")),
            )],
        );
        assert_eq!(print_expr(&e), "a.map(x => x * b)");
    }

    #[test]
    fn arrow_returning_object_is_wrapped() {
        let e = JsExpr::arrow(vec![], JsExpr::object(vec![("value", JsExpr::ident("a"))]));
        assert_eq!(print_expr(&e), "() => ({ value: a })");
    }

    #[test]
    fn nested_binary_is_parenthesized() {
        let e = JsExpr::binary(
            "*",
            JsExpr::binary("+", JsExpr::ident("a"), JsExpr::num(1.0)),
            JsExpr::ident("b"),
        );
        assert_eq!(print_expr(&e), "(a + 1) * b");
    }

    #[test]
    fn numeric_member_is_computed() {
        let e = JsExpr::index(JsExpr::ident("xs"), JsExpr::num(0.0));
        assert_eq!(print_expr(&e), "xs[0]");
        let e = JsExpr::member(JsExpr::ident("o"), "not-ident");
        assert_eq!(print_expr(&e), "o[\"not-ident\"]");
    }

    #[test]
    fn print_function_with_array_pattern() {
        let func = JsFunction {
            export: ExportKind::Default,
            ..JsFunction::new(
                "Counter",
                vec![],
                vec![
                    JsStmt::decl(
                        DeclKind::Const,
                        JsPattern::Array(vec![
                            Some(JsPattern::ident("count")),
                            Some(JsPattern::ident("setCount")),
                        ]),
                        JsExpr::call(JsExpr::ident("useState"), vec![JsExpr::num(0.0)]),
                    ),
                    JsStmt::ret(Some(JsExpr::ident("count"))),
                ],
            )
        };
        let mut out = String::new();
        print_function(&func, &mut out);
        assert_eq!(
            out,
            "export default function Counter() {\n  const [count, setCount] = useState(0);\n  return count;\n}\n"
        );
    }

    #[test]
    fn print_module_separates_imports() {
        let module = JsModule {
            items: vec![
                ModuleItem::Import(ImportDecl {
                    source: "react".into(),
                    specifiers: vec![
                        ImportSpecifier::Default("React".into()),
                        ImportSpecifier::named("useMemo"),
                    ],
                }),
                ModuleItem::Raw("const x = 1;".into()),
            ],
        };
        assert_eq!(
            print_module(&module),
            "import React, { useMemo } from \"react\";\n\nconst x = 1;\n"
        );
    }

    #[test]
    fn template_and_optional_chain_print_back() {
        // `${x}-${b}` and x?.[b]?.(1)
        let tpl = JsExpr::Template {
            quasis: vec!["".into(), "-".into(), "".into()],
            exprs: vec![JsExpr::ident("x"), JsExpr::ident("b")],
        };
        assert_eq!(print_expr(&tpl), "`${x}-${b}`");
        let chain = JsExpr::OptionalCall {
            callee: Box::new(JsExpr::OptionalMember {
                object: Box::new(JsExpr::ident("x")),
                property: MemberProp::Computed(Box::new(JsExpr::ident("b"))),
            }),
            args: vec![JsExpr::num(1.0)],
        };
        assert_eq!(print_expr(&chain), "x?.[b]?.(1)");
    }

    #[test]
    fn block_arrow_indents_body() {
        let e = JsExpr::Arrow {
            params: vec![],
            body: ArrowBody::Block(vec![JsStmt::ret(Some(JsExpr::num(1.0)))]),
            is_async: false,
        };
        let mut out = String::new();
        print_stmt(&JsStmt::const_decl("f", e), &mut out, "  ");
        assert_eq!(out, "  const f = () => {\n    return 1;\n  };\n");
    }
}
