//! Host AST → IR lowering.
//!
//! Lowers one function's parameters and top-level statements into a flat
//! [`FunctionBody`]. Shapes the IR does not model become opaque
//! `LoadConstant` placeholders with a warning; only forms that cannot be
//! represented at all (a non-identifier destructured parameter key, a
//! declaration without initializer) abort with a structural error.

use crate::error::CoreError;
use crate::js_ast::{
    Declarator, DeclKind, JsExpr, JsFunction, JsPattern, JsStmt, MemberProp, ObjectMember,
    PropKey, Span,
};
use crate::log::LogSink;

use super::builder::FunctionBuilder;
use super::func::FunctionBody;
use super::inst::{InstId, Operand, Property};

/// Lower a function declaration to IR.
pub fn lower_function(func: &JsFunction, sink: &mut LogSink) -> Result<FunctionBody, CoreError> {
    let mut ctx = LowerCtx {
        fb: FunctionBuilder::new(&func.name),
        sink,
    };
    ctx.fb.set_span(func.span.clone());
    for param in &func.params {
        ctx.lower_param(param)?;
    }
    for stmt in &func.body {
        ctx.lower_stmt(stmt)?;
    }
    let body = ctx.fb.build();
    ctx.sink.info(format!(
        "lowered `{}`: {} instructions",
        body.name,
        body.len()
    ));
    Ok(body)
}

struct LowerCtx<'a> {
    fb: FunctionBuilder,
    sink: &'a mut LogSink,
}

impl LowerCtx<'_> {
    fn structural(&mut self, message: impl Into<String>) -> CoreError {
        let err = CoreError::structural(self.fb.name(), message);
        self.sink.fatal(err.to_string());
        err
    }

    fn unsupported(&mut self, kind: &str, expr: Option<&JsExpr>, span: Option<&Span>) -> InstId {
        let at = span.map(|s| format!(" at {s}")).unwrap_or_default();
        self.sink.warn(format!(
            "unsupported {kind} in `{}`{at}; kept opaque",
            self.fb.name()
        ));
        self.fb.unsupported(kind, expr.cloned())
    }

    // ── Parameters ─────────────────────────────────────────────────────

    fn lower_param(&mut self, param: &JsPattern) -> Result<(), CoreError> {
        match param {
            JsPattern::Ident(name) => {
                self.fb.param(name);
            }
            JsPattern::Assign { target, .. } | JsPattern::Rest(target) => {
                self.lower_param(target)?;
            }
            JsPattern::Object { props, rest } => {
                for prop in props {
                    let key = match &prop.key {
                        PropKey::Ident(key) => key,
                        _ => {
                            return Err(
                                self.structural("destructured parameter key is not an identifier")
                            )
                        }
                    };
                    let local = match &prop.value {
                        JsPattern::Ident(local) => local,
                        JsPattern::Assign { target, .. } => match target.as_ref() {
                            JsPattern::Ident(local) => local,
                            _ => key,
                        },
                        _ => key,
                    };
                    self.fb.param(local);
                }
                if let Some(rest) = rest {
                    self.lower_param(rest)?;
                }
            }
            JsPattern::Array(_) => {
                for name in param.bound_names() {
                    self.fb.param(name);
                }
            }
        }
        Ok(())
    }

    // ── Statements ─────────────────────────────────────────────────────

    fn lower_stmt(&mut self, stmt: &JsStmt) -> Result<(), CoreError> {
        self.fb.set_span(stmt.span().cloned());
        match stmt {
            JsStmt::VarDecl {
                kind,
                declarators,
                span,
            } => {
                for decl in declarators {
                    self.lower_declarator(*kind, decl, span.as_ref())?;
                }
            }
            JsStmt::Return { value, .. } => {
                let value = value.as_ref().map(|e| self.lower_expr(e));
                self.fb.ret(value);
            }
            JsStmt::Expr { expr, .. } => {
                self.lower_expr(expr);
            }
            JsStmt::Opaque { kind, span, .. } => {
                self.unsupported(kind, None, span.as_ref());
            }
        }
        Ok(())
    }

    fn lower_declarator(
        &mut self,
        kind: DeclKind,
        decl: &Declarator,
        span: Option<&Span>,
    ) -> Result<(), CoreError> {
        let Some(init) = &decl.init else {
            let names = decl.target.bound_names().join(", ");
            return Err(self.structural(format!("declaration of `{names}` has no initializer")));
        };
        let value = self.lower_expr(init);
        match &decl.target {
            JsPattern::Ident(_) | JsPattern::Array(_) => {
                self.fb.declare(kind, decl.target.clone(), value);
            }
            _ => {
                self.unsupported("destructuring declaration", None, span);
            }
        }
        Ok(())
    }

    // ── Expressions ────────────────────────────────────────────────────

    fn lower_expr(&mut self, expr: &JsExpr) -> InstId {
        match expr {
            JsExpr::Literal(lit) => self.fb.literal(lit.clone()),
            JsExpr::Ident(name) => match self.fb.body().resolve(name) {
                Some(id) => id,
                None => self.fb.global(name),
            },
            JsExpr::Member { object, property } => match resolve_property(property) {
                Some(property) => {
                    let object = self.lower_expr(object);
                    self.fb.read_property(object, property)
                }
                None => self.unsupported_expr("computed member access", expr),
            },
            JsExpr::Call { callee, args } => self.lower_call(callee, args),
            JsExpr::Object(members) => self.lower_object(members, expr),
            JsExpr::Arrow { .. } | JsExpr::Function { .. } => {
                self.fb.function_placeholder(expr.clone())
            }
            JsExpr::OptionalMember { .. } | JsExpr::OptionalCall { .. } => {
                self.unsupported_expr("optional chain", expr)
            }
            JsExpr::New { .. } => self.unsupported_expr("`new` expression", expr),
            JsExpr::Template { .. } => self.unsupported_expr("template literal", expr),
            JsExpr::Array(_) => self.unsupported_expr("array literal", expr),
            JsExpr::Unary { .. } => self.unsupported_expr("unary expression", expr),
            JsExpr::Binary { .. } => self.unsupported_expr("binary expression", expr),
            JsExpr::Conditional { .. } => self.unsupported_expr("conditional expression", expr),
            JsExpr::Assign { .. } => self.unsupported_expr("assignment", expr),
            JsExpr::Spread(_) => self.unsupported_expr("spread", expr),
            JsExpr::Opaque(_) => self.unsupported_expr("expression", expr),
        }
    }

    fn unsupported_expr(&mut self, kind: &str, expr: &JsExpr) -> InstId {
        let span = self.fb.span().cloned();
        self.unsupported(kind, Some(expr), span.as_ref())
    }

    fn lower_operand(&mut self, expr: &JsExpr) -> Operand {
        match expr {
            JsExpr::Literal(lit) => Operand::Literal(lit.clone()),
            _ => Operand::Value(self.lower_expr(expr)),
        }
    }

    fn lower_call(&mut self, callee: &JsExpr, args: &[JsExpr]) -> InstId {
        let (receiver, property) = match callee {
            JsExpr::Member { object, property } => match resolve_property(property) {
                Some(property) => (self.lower_expr(object), Some(property)),
                None => (self.lower_expr(callee), None),
            },
            _ => (self.lower_expr(callee), None),
        };
        let args = args.iter().map(|a| self.lower_operand(a)).collect();
        self.fb.call(receiver, property, args)
    }

    fn lower_object(&mut self, members: &[ObjectMember], expr: &JsExpr) -> InstId {
        let all_ident_keys = members.iter().all(|m| {
            matches!(
                m,
                ObjectMember::Property {
                    key: PropKey::Ident(_),
                    ..
                }
            )
        });
        if !all_ident_keys {
            return self.unsupported_expr("object literal with non-identifier keys", expr);
        }
        let mut props = Vec::with_capacity(members.len());
        for member in members {
            if let ObjectMember::Property {
                key: PropKey::Ident(key),
                value,
                ..
            } = member
            {
                props.push((key.clone(), self.lower_operand(value)));
            }
        }
        self.fb.object(props)
    }
}

/// Resolve a member property to a static name or index, if it has one.
fn resolve_property(property: &MemberProp) -> Option<Property> {
    match property {
        MemberProp::Name(name) => Some(Property::Named(name.clone())),
        MemberProp::Computed(expr) => match expr.as_literal()? {
            crate::js_ast::Literal::String(s) => Some(Property::Named(s.clone())),
            crate::js_ast::Literal::Number(n) if *n >= 0.0 && n.fract() == 0.0 => {
                Some(Property::Index(*n as u64))
            }
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityRef;
    use crate::ir::inst::{Constant, Op};
    use crate::js_ast::{Literal, PatternProp};
    use crate::log::Level;

    fn lower(func: &JsFunction) -> (FunctionBody, LogSink) {
        let mut sink = LogSink::new();
        let body = lower_function(func, &mut sink).expect("lowering failed");
        (body, sink)
    }

    fn id(n: u32) -> InstId {
        InstId::new(n)
    }

    #[test]
    fn lower_method_call_over_param() {
        // function F(a, b) { const c = a.map(x => x * b); return c; }
        let arrow = JsExpr::arrow(
            vec![JsPattern::ident("x")],
            JsExpr::binary("*", JsExpr::ident("x"), JsExpr::ident("b")),
        );
        let func = JsFunction::new(
            "F",
            vec![JsPattern::ident("a"), JsPattern::ident("b")],
            vec![
                JsStmt::const_decl("c", JsExpr::method_call(JsExpr::ident("a"), "map", vec![arrow])),
                JsStmt::ret(Some(JsExpr::ident("c"))),
            ],
        );
        let (body, _) = lower(&func);
        assert_eq!(body.len(), 6);
        assert!(matches!(&body.insts[id(0)].op, Op::Param { name } if name == "a"));
        assert!(matches!(&body.insts[id(1)].op, Op::Param { name } if name == "b"));
        assert!(matches!(&body.insts[id(2)].op, Op::LoadConstant(Constant::Function(_))));
        match &body.insts[id(3)].op {
            Op::Call {
                receiver,
                property,
                args,
            } => {
                assert_eq!(*receiver, id(0));
                assert_eq!(property, &Some(Property::Named("map".into())));
                assert_eq!(args, &vec![Operand::Value(id(2))]);
            }
            other => panic!("expected call, got {other:?}"),
        }
        assert!(matches!(&body.insts[id(4)].op, Op::Declare { name, value, .. } if name == "c" && *value == id(3)));
        assert!(matches!(&body.insts[id(5)].op, Op::Return { value: Some(v) } if *v == id(4)));
    }

    #[test]
    fn literals_are_inlined_into_calls_and_objects() {
        let func = JsFunction::new(
            "F",
            vec![],
            vec![JsStmt::expr(JsExpr::call(
                JsExpr::ident("draw"),
                vec![
                    JsExpr::num(1.0),
                    JsExpr::object(vec![("x", JsExpr::num(2.0)), ("label", JsExpr::str("hi"))]),
                ],
            ))],
        );
        let (body, _) = lower(&func);
        // global `draw`, object, call
        assert_eq!(body.len(), 3);
        match &body.insts[id(1)].op {
            Op::Object { props } => {
                assert_eq!(props[0], ("x".to_string(), Operand::Literal(Literal::Number(2.0))));
                assert_eq!(props[1], ("label".to_string(), Operand::Literal(Literal::String("hi".into()))));
            }
            other => panic!("expected object, got {other:?}"),
        }
        match &body.insts[id(2)].op {
            Op::Call { args, .. } => {
                assert_eq!(args[0], Operand::Literal(Literal::Number(1.0)));
                assert_eq!(args[1], Operand::Value(id(1)));
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn unresolved_identifier_becomes_global() {
        let func = JsFunction::new("F", vec![], vec![JsStmt::ret(Some(JsExpr::ident("window")))]);
        let (body, _) = lower(&func);
        assert!(matches!(&body.insts[id(0)].op, Op::LoadConstant(Constant::Global(n)) if n == "window"));
    }

    #[test]
    fn computed_member_resolves_literals() {
        let func = JsFunction::new(
            "F",
            vec![JsPattern::ident("xs")],
            vec![
                JsStmt::const_decl("first", JsExpr::index(JsExpr::ident("xs"), JsExpr::num(0.0))),
                JsStmt::const_decl("len", JsExpr::index(JsExpr::ident("xs"), JsExpr::str("length"))),
            ],
        );
        let (body, _) = lower(&func);
        assert!(matches!(&body.insts[id(1)].op, Op::ReadProperty { property: Property::Index(0), .. }));
        assert!(
            matches!(&body.insts[id(3)].op, Op::ReadProperty { property: Property::Named(n), .. } if n == "length")
        );
    }

    #[test]
    fn unsupported_expression_degrades_with_warning() {
        let func = JsFunction::new(
            "F",
            vec![JsPattern::ident("a")],
            vec![JsStmt::ret(Some(JsExpr::binary("+", JsExpr::ident("a"), JsExpr::num(1.0))))],
        );
        let (body, sink) = lower(&func);
        assert!(matches!(
            &body.insts[id(1)].op,
            Op::LoadConstant(Constant::Unsupported { kind, expr: Some(_) }) if kind == "binary expression"
        ));
        assert_eq!(sink.count(Level::Warn), 1);
    }

    #[test]
    fn opaque_statement_degrades() {
        let func = JsFunction::new(
            "F",
            vec![],
            vec![JsStmt::Opaque {
                kind: "if statement".into(),
                text: "if (x) {}".into(),
                span: None,
            }],
        );
        let (body, sink) = lower(&func);
        assert_eq!(body.len(), 1);
        assert_eq!(sink.count(Level::Warn), 1);
    }

    #[test]
    fn object_param_yields_one_param_per_key() {
        let func = JsFunction::new(
            "F",
            vec![JsPattern::Object {
                props: vec![
                    PatternProp {
                        key: PropKey::Ident("items".into()),
                        value: JsPattern::ident("items"),
                        shorthand: true,
                    },
                    PatternProp {
                        key: PropKey::Ident("limit".into()),
                        value: JsPattern::ident("max"),
                        shorthand: false,
                    },
                ],
                rest: None,
            }],
            vec![],
        );
        let (body, _) = lower(&func);
        assert!(matches!(&body.insts[id(0)].op, Op::Param { name } if name == "items"));
        assert!(matches!(&body.insts[id(1)].op, Op::Param { name } if name == "max"));
    }

    #[test]
    fn non_identifier_param_key_is_structural() {
        let func = JsFunction::new(
            "F",
            vec![JsPattern::Object {
                props: vec![PatternProp {
                    key: PropKey::String("a-b".into()),
                    value: JsPattern::ident("ab"),
                    shorthand: false,
                }],
                rest: None,
            }],
            vec![],
        );
        let mut sink = LogSink::new();
        let err = lower_function(&func, &mut sink).unwrap_err();
        assert!(matches!(err, CoreError::Structural { .. }));
        assert_eq!(sink.count(Level::Fatal), 1);
    }

    #[test]
    fn declaration_without_initializer_is_structural() {
        let func = JsFunction::new(
            "F",
            vec![],
            vec![JsStmt::VarDecl {
                kind: DeclKind::Let,
                declarators: vec![Declarator {
                    target: JsPattern::ident("x"),
                    init: None,
                }],
                span: None,
            }],
        );
        let mut sink = LogSink::new();
        assert!(lower_function(&func, &mut sink).is_err());
    }

    #[test]
    fn hook_result_names_resolve_through_array_pattern() {
        let func = JsFunction::new(
            "F",
            vec![],
            vec![
                JsStmt::decl(
                    DeclKind::Const,
                    JsPattern::Array(vec![
                        Some(JsPattern::ident("items")),
                        Some(JsPattern::ident("setItems")),
                    ]),
                    JsExpr::call(JsExpr::ident("useState"), vec![]),
                ),
                JsStmt::ret(Some(JsExpr::ident("items"))),
            ],
        );
        let (body, _) = lower(&func);
        // global, call, declare, return
        assert_eq!(body.len(), 4);
        assert!(matches!(&body.insts[id(3)].op, Op::Return { value: Some(v) } if *v == id(2)));
    }
}
