//! Direct rewrite over the original statements.
//!
//! Independent of the IR: every top-level `const x = recv.method(...)` whose
//! method is expensive has its initializer wrapped in place, with the
//! dependency list taken from the identifiers the initializer references.

use crate::ast_printer::print_pattern;
use crate::js_ast::{ArrowBody, JsExpr, JsPattern, JsStmt, MemberProp, ObjectMember, PropKey};
use crate::log::LogSink;
use crate::pipeline::MemoConfig;

use super::memo_call;

/// Rewrite expensive method-call initializers. Returns the new statements
/// and how many declarators were wrapped.
pub fn direct_rewrite(
    stmts: &[JsStmt],
    config: &MemoConfig,
    sink: &mut LogSink,
) -> (Vec<JsStmt>, usize) {
    let mut wrapped = 0;
    let out = stmts
        .iter()
        .map(|stmt| {
            let JsStmt::VarDecl {
                kind,
                declarators,
                span,
            } = stmt
            else {
                return stmt.clone();
            };
            let declarators = declarators
                .iter()
                .map(|decl| {
                    let mut decl = decl.clone();
                    let Some(init) = decl.init.take() else {
                        return decl;
                    };
                    if !is_expensive_method_call(&init, config) {
                        decl.init = Some(init);
                        return decl;
                    }
                    let scan = scan_identifiers(&init, config);
                    if scan.saw_opaque {
                        sink.warn(format!(
                            "skipped `{}`: initializer has source the dependency scan cannot read",
                            print_pattern(&decl.target)
                        ));
                        decl.init = Some(init);
                        return decl;
                    }
                    let deps = scan.found;
                    if deps.is_empty() {
                        decl.init = Some(init);
                        return decl;
                    }
                    sink.info(format!(
                        "wrapped `{}` in {} [{}]",
                        print_pattern(&decl.target),
                        config.memo_primitive,
                        deps.join(", ")
                    ));
                    wrapped += 1;
                    decl.init = Some(memo_call(init, &deps, config));
                    decl
                })
                .collect();
            JsStmt::VarDecl {
                kind: *kind,
                declarators,
                span: span.clone(),
            }
        })
        .collect();
    (out, wrapped)
}

fn is_expensive_method_call(expr: &JsExpr, config: &MemoConfig) -> bool {
    match expr {
        JsExpr::Call { callee, .. } => matches!(
            callee.as_ref(),
            JsExpr::Member { property: MemberProp::Name(name), .. } if config.is_expensive_method(name)
        ),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Free identifiers
// ---------------------------------------------------------------------------

/// Identifiers an expression reads from its enclosing scope, in order of
/// first occurrence.
///
/// Member property names, object keys and names bound by nested function
/// parameters do not count, nor do blacklisted globals.
pub fn free_identifiers(expr: &JsExpr, config: &MemoConfig) -> Vec<String> {
    scan_identifiers(expr, config).found
}

fn scan_identifiers<'a>(expr: &JsExpr, config: &'a MemoConfig) -> FreeIdents<'a> {
    let mut walker = FreeIdents {
        config,
        bound: Vec::new(),
        found: Vec::new(),
        saw_opaque: false,
    };
    walker.expr(expr);
    walker
}

struct FreeIdents<'a> {
    config: &'a MemoConfig,
    /// Names bound by enclosing nested functions (a stack).
    bound: Vec<String>,
    found: Vec<String>,
    /// Source text was reached that the walk cannot see into, so `found`
    /// may be incomplete.
    saw_opaque: bool,
}

impl FreeIdents<'_> {
    fn reference(&mut self, name: &str) {
        if self.bound.iter().any(|b| b == name)
            || self.config.is_blacklisted(name)
            || self.found.iter().any(|f| f == name)
        {
            return;
        }
        self.found.push(name.to_string());
    }

    fn expr(&mut self, expr: &JsExpr) {
        match expr {
            JsExpr::Literal(_) => {}
            JsExpr::Opaque(_) => self.saw_opaque = true,
            JsExpr::Ident(name) => self.reference(name),
            JsExpr::Member { object, property }
            | JsExpr::OptionalMember { object, property } => {
                self.expr(object);
                if let MemberProp::Computed(index) = property {
                    self.expr(index);
                }
            }
            JsExpr::Call { callee, args }
            | JsExpr::OptionalCall { callee, args }
            | JsExpr::New { callee, args } => {
                self.expr(callee);
                for arg in args {
                    self.expr(arg);
                }
            }
            JsExpr::Template { exprs, .. } => {
                for e in exprs {
                    self.expr(e);
                }
            }
            JsExpr::Object(members) => {
                for member in members {
                    match member {
                        ObjectMember::Property { key, value, .. } => {
                            if let PropKey::Computed(key) = key {
                                self.expr(key);
                            }
                            self.expr(value);
                        }
                        ObjectMember::Spread(inner) => self.expr(inner),
                        ObjectMember::Opaque(_) => self.saw_opaque = true,
                    }
                }
            }
            JsExpr::Array(elems) => {
                for elem in elems.iter().flatten() {
                    self.expr(elem);
                }
            }
            JsExpr::Arrow { params, body, .. } => {
                let mark = self.bind_params(params);
                match body {
                    ArrowBody::Expr(e) => self.expr(e),
                    ArrowBody::Block(stmts) => self.stmts(stmts),
                }
                self.bound.truncate(mark);
            }
            JsExpr::Function {
                name, params, body, ..
            } => {
                let mark = self.bound.len();
                if let Some(name) = name {
                    self.bound.push(name.clone());
                }
                self.bind_params(params);
                self.stmts(body);
                self.bound.truncate(mark);
            }
            JsExpr::Unary { expr, .. } | JsExpr::Spread(expr) => self.expr(expr),
            JsExpr::Binary { lhs, rhs, .. } => {
                self.expr(lhs);
                self.expr(rhs);
            }
            JsExpr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.expr(test);
                self.expr(consequent);
                self.expr(alternate);
            }
            JsExpr::Assign { target, value, .. } => {
                self.expr(target);
                self.expr(value);
            }
        }
    }

    /// Bind parameter names; returns the stack height to restore.
    fn bind_params(&mut self, params: &[JsPattern]) -> usize {
        let mark = self.bound.len();
        for param in params {
            self.pattern_defaults(param);
            self.bound.extend(param.bound_names());
        }
        mark
    }

    fn pattern_defaults(&mut self, pattern: &JsPattern) {
        match pattern {
            JsPattern::Ident(_) => {}
            JsPattern::Array(elems) => {
                for elem in elems.iter().flatten() {
                    self.pattern_defaults(elem);
                }
            }
            JsPattern::Object { props, rest } => {
                for prop in props {
                    if let PropKey::Computed(key) = &prop.key {
                        self.expr(key);
                    }
                    self.pattern_defaults(&prop.value);
                }
                if let Some(rest) = rest {
                    self.pattern_defaults(rest);
                }
            }
            JsPattern::Assign { target, default } => {
                self.expr(default);
                self.pattern_defaults(target);
            }
            JsPattern::Rest(target) => self.pattern_defaults(target),
        }
    }

    /// Statements of a nested function body. Local declarations shadow for
    /// the rest of the body.
    fn stmts(&mut self, stmts: &[JsStmt]) {
        for stmt in stmts {
            match stmt {
                JsStmt::VarDecl { declarators, .. } => {
                    for decl in declarators {
                        if let Some(init) = &decl.init {
                            self.expr(init);
                        }
                        self.bound.extend(decl.target.bound_names());
                    }
                }
                JsStmt::Return { value, .. } => {
                    if let Some(value) = value {
                        self.expr(value);
                    }
                }
                JsStmt::Expr { expr, .. } => self.expr(expr),
                JsStmt::Opaque { .. } => self.saw_opaque = true,
            }
        }
    }
}
