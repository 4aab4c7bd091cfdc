//! IR → host AST reconstruction and memo declaration emission.

pub mod direct;
pub mod imports;

use crate::ast_printer::is_valid_js_ident;
use crate::entity::EntityRef;
use crate::ir::{Constant, FunctionBody, InstId, Op, Operand, Property};
use crate::js_ast::{DeclKind, Declarator, JsExpr, JsPattern, JsStmt, ObjectMember, PropKey};
use crate::log::LogSink;
use crate::pipeline::MemoConfig;
use crate::transforms::{Analysis, PartitionItem, ReactiveBlock};

pub use direct::{direct_rewrite, free_identifiers};
pub use imports::ensure_runtime_import;

/// Hands out `memoized<N>` names, starting from 0 for each compilation.
#[derive(Debug, Default)]
pub struct MemoNames {
    next: u32,
}

impl MemoNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> String {
        let name = format!("memoized{}", self.next);
        self.next += 1;
        name
    }
}

/// `useMemo(() => expr, [deps...])`.
pub fn memo_call(expr: JsExpr, deps: &[String], config: &MemoConfig) -> JsExpr {
    JsExpr::call(
        JsExpr::ident(&config.memo_primitive),
        vec![
            JsExpr::arrow(vec![], expr),
            JsExpr::array(deps.iter().map(JsExpr::ident).collect()),
        ],
    )
}

// ---------------------------------------------------------------------------
// Expression reconstruction
// ---------------------------------------------------------------------------

fn rebuild_operand(body: &FunctionBody, op: &Operand) -> JsExpr {
    match op {
        Operand::Literal(lit) => JsExpr::Literal(lit.clone()),
        Operand::Value(id) => rebuild_expr(body, *id),
    }
}

fn rebuild_member(object: JsExpr, property: &Property) -> JsExpr {
    match property {
        Property::Named(name) if is_valid_js_ident(name) => JsExpr::member(object, name),
        Property::Named(name) => JsExpr::index(object, JsExpr::str(name)),
        Property::Index(i) => JsExpr::index(object, JsExpr::num(*i as f64)),
    }
}

/// Rebuild the expression an instruction computes.
///
/// Bindings (`Param`, `Declare`) come back as the identifier they bind, so
/// consumers reference the binding instead of re-evaluating its initializer.
/// An array-pattern `Declare` comes back as its first bound name.
pub fn rebuild_expr(body: &FunctionBody, id: InstId) -> JsExpr {
    match &body.insts[id].op {
        Op::Param { name } => JsExpr::ident(name),
        Op::Declare { pattern, name, .. } => match pattern {
            JsPattern::Ident(_) => JsExpr::ident(name),
            _ => pattern
                .bound_names()
                .into_iter()
                .next()
                .map(JsExpr::Ident)
                .unwrap_or_else(|| JsExpr::ident("undefined")),
        },
        Op::LoadConstant(c) => match c {
            Constant::Literal(lit) => JsExpr::Literal(lit.clone()),
            Constant::Global(name) => JsExpr::ident(name),
            Constant::Function(expr) => (**expr).clone(),
            Constant::Unsupported { expr: Some(expr), .. } => (**expr).clone(),
            Constant::Unsupported { expr: None, .. } => JsExpr::ident("undefined"),
        },
        Op::ReadProperty { object, property } => {
            rebuild_member(rebuild_expr(body, *object), property)
        }
        Op::Object { props } => JsExpr::Object(
            props
                .iter()
                .map(|(key, value)| ObjectMember::Property {
                    key: PropKey::Ident(key.clone()),
                    value: rebuild_operand(body, value),
                    shorthand: false,
                })
                .collect(),
        ),
        Op::Call {
            receiver,
            property,
            args,
        } => {
            let receiver = rebuild_expr(body, *receiver);
            let callee = match property {
                Some(p) => rebuild_member(receiver, p),
                None => receiver,
            };
            JsExpr::call(callee, args.iter().map(|a| rebuild_operand(body, a)).collect())
        }
        Op::Return { value } => value
            .map(|v| rebuild_expr(body, v))
            .unwrap_or_else(|| JsExpr::ident("undefined")),
    }
}

/// Rebuild the statement an instruction stands for, if it is one.
///
/// `Declare` and `Return` always are; a `Call` is when `is_root` says no
/// later instruction consumes it.
pub fn rebuild_stmt(body: &FunctionBody, id: InstId, is_root: bool) -> Option<JsStmt> {
    let inst = &body.insts[id];
    let span = inst.span.clone();
    match &inst.op {
        Op::Declare {
            kind,
            pattern,
            value,
            ..
        } => Some(JsStmt::VarDecl {
            kind: *kind,
            declarators: vec![Declarator {
                target: pattern.clone(),
                init: Some(rebuild_expr(body, *value)),
            }],
            span,
        }),
        Op::Return { value } => Some(JsStmt::Return {
            value: value.map(|v| rebuild_expr(body, v)),
            span,
        }),
        Op::Call { .. } if is_root => Some(JsStmt::Expr {
            expr: rebuild_expr(body, id),
            span,
        }),
        _ => None,
    }
}

/// The IR's statement view of a whole body.
pub fn reconstruct_body(body: &FunctionBody) -> Vec<JsStmt> {
    let consumed = body.consumed();
    body.insts
        .keys()
        .filter_map(|id| rebuild_stmt(body, id, !consumed[id.index() as usize]))
        .collect()
}

// ---------------------------------------------------------------------------
// Memo declarations
// ---------------------------------------------------------------------------

/// Source names of a block's external dependencies, in id order.
pub fn dependency_names(body: &FunctionBody, block: &ReactiveBlock) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for &dep in &block.deps {
        for name in body.dependency_names(dep) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// `const memoized<N> = useMemo(...)` for every qualifying block, in
/// ascending block order.
pub fn memo_decls(
    body: &FunctionBody,
    analysis: &Analysis,
    items: &[PartitionItem],
    config: &MemoConfig,
    names: &mut MemoNames,
    sink: &mut LogSink,
) -> Vec<JsStmt> {
    let mut decls = Vec::new();
    for item in items {
        let PartitionItem::Block(block) = item else {
            continue;
        };
        if block.deps.is_empty() {
            sink.info(format!(
                "`{}`: block v{}..v{} has no changing inputs",
                body.name,
                block.start.index(),
                block.end.index()
            ));
            continue;
        }
        let Some(&target) = block
            .insts
            .keys()
            .find(|&&id| analysis.info(id).should_memo)
        else {
            sink.warn(format!(
                "`{}`: block v{}..v{} has no memoizable member; skipped",
                body.name,
                block.start.index(),
                block.end.index()
            ));
            continue;
        };

        let deps = dependency_names(body, block);
        let name = names.fresh();
        sink.info(format!(
            "`{}`: {name} wraps v{} [{}]",
            body.name,
            target.index(),
            deps.join(", ")
        ));
        decls.push(JsStmt::VarDecl {
            kind: DeclKind::Const,
            declarators: vec![Declarator {
                target: JsPattern::Ident(name),
                init: Some(memo_call(rebuild_expr(body, target), &deps, config)),
            }],
            span: body.insts[target].span.clone(),
        });
    }
    decls
}
