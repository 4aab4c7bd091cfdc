use std::fmt;

use crate::define_entity;
use crate::js_ast::{DeclKind, JsExpr, JsPattern, Literal, Span};

define_entity!(InstId);

/// Payload of a `LoadConstant` instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// A literal value.
    Literal(Literal),
    /// An identifier that did not resolve to a local binding.
    Global(String),
    /// A function or arrow expression; its body is not analyzed.
    Function(Box<JsExpr>),
    /// A node kind the IR does not model. `expr` is kept so codegen can put
    /// the original expression back; statements have none.
    Unsupported {
        kind: String,
        expr: Option<Box<JsExpr>>,
    },
}

/// An argument or object-property value: either inlined or a prior value.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Literal),
    Value(InstId),
}

impl Operand {
    pub fn value(&self) -> Option<InstId> {
        match self {
            Operand::Value(id) => Some(*id),
            Operand::Literal(_) => None,
        }
    }
}

/// A resolved property name on a member access or method call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    /// `obj.name` / `obj["name"]`.
    Named(String),
    /// `obj[3]`.
    Index(u64),
}

impl Property {
    pub fn name(&self) -> String {
        match self {
            Property::Named(n) => n.clone(),
            Property::Index(i) => i.to_string(),
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Named(n) => write!(f, ".{n}"),
            Property::Index(i) => write!(f, "[{i}]"),
        }
    }
}

/// IR operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// A function parameter (or one binding of a destructured parameter).
    Param { name: String },
    /// A literal, an unresolved global, or an opaque placeholder.
    LoadConstant(Constant),
    /// `const <pattern> = value`. `name` is the identifier, or the synthetic
    /// combined name (`[a, b]`) for an array pattern.
    Declare {
        kind: DeclKind,
        pattern: JsPattern,
        name: String,
        value: InstId,
    },
    /// `object.property`.
    ReadProperty { object: InstId, property: Property },
    /// Object literal with identifier keys.
    Object { props: Vec<(String, Operand)> },
    /// `receiver(args)` or `receiver.property(args)`.
    Call {
        receiver: InstId,
        property: Option<Property>,
        args: Vec<Operand>,
    },
    Return { value: Option<InstId> },
}

/// An IR instruction. Its id is its position in program order.
#[derive(Debug, Clone, PartialEq)]
pub struct Inst {
    pub op: Op,
    /// Source location for diagnostics.
    pub span: Option<Span>,
}

impl Inst {
    /// Ids this instruction consumes, in operand order.
    pub fn operands(&self) -> Vec<InstId> {
        match &self.op {
            Op::Param { .. } | Op::LoadConstant(_) => vec![],
            Op::Declare { value, .. } => vec![*value],
            Op::ReadProperty { object, .. } => vec![*object],
            Op::Object { props } => props.iter().filter_map(|(_, v)| v.value()).collect(),
            Op::Call { receiver, args, .. } => {
                let mut ops = vec![*receiver];
                ops.extend(args.iter().filter_map(Operand::value));
                ops
            }
            Op::Return { value } => value.iter().copied().collect(),
        }
    }

    /// Names this instruction binds for identifier resolution.
    pub fn bound_names(&self) -> Vec<String> {
        match &self.op {
            Op::Param { name } => vec![name.clone()],
            Op::Declare { pattern, .. } => pattern.bound_names(),
            _ => vec![],
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self.op {
            Op::Param { .. } => "param",
            Op::LoadConstant(_) => "const",
            Op::Declare { .. } => "declare",
            Op::ReadProperty { .. } => "read",
            Op::Object { .. } => "object",
            Op::Call { .. } => "call",
            Op::Return { .. } => "return",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityRef;

    #[test]
    fn call_operands_skip_inlined_literals() {
        let inst = Inst {
            op: Op::Call {
                receiver: InstId::new(0),
                property: Some(Property::Named("map".into())),
                args: vec![
                    Operand::Literal(Literal::Number(1.0)),
                    Operand::Value(InstId::new(2)),
                ],
            },
            span: None,
        };
        assert_eq!(inst.operands(), vec![InstId::new(0), InstId::new(2)]);
    }

    #[test]
    fn array_declare_binds_each_name() {
        let inst = Inst {
            op: Op::Declare {
                kind: DeclKind::Const,
                pattern: JsPattern::Array(vec![
                    Some(JsPattern::ident("count")),
                    Some(JsPattern::ident("setCount")),
                ]),
                name: "[count, setCount]".into(),
                value: InstId::new(1),
            },
            span: None,
        };
        assert_eq!(inst.bound_names(), vec!["count", "setCount"]);
    }
}
