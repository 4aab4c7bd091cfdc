use crate::js_ast::{DeclKind, JsExpr, JsPattern, Literal, Span};

use super::func::FunctionBody;
use super::inst::{Constant, Inst, InstId, Op, Operand, Property};

/// Builder for a single [`FunctionBody`].
///
/// Appends instructions in program order. Every instruction emitted is
/// stamped with the current span cursor (the statement being lowered).
pub struct FunctionBuilder {
    body: FunctionBody,
    span: Option<Span>,
}

impl FunctionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            body: FunctionBody::new(name),
            span: None,
        }
    }

    /// Set the span stamped on subsequently emitted instructions.
    pub fn set_span(&mut self, span: Option<Span>) {
        self.span = span;
    }

    pub fn span(&self) -> Option<&Span> {
        self.span.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.body.name
    }

    /// View of what has been built so far (for identifier resolution).
    pub fn body(&self) -> &FunctionBody {
        &self.body
    }

    /// Consume the builder and return the constructed body.
    pub fn build(self) -> FunctionBody {
        self.body
    }

    fn emit(&mut self, op: Op) -> InstId {
        debug_assert!(
            {
                let next = self.body.insts.next_key();
                Inst { op: op.clone(), span: None }
                    .operands()
                    .iter()
                    .all(|&o| o < next)
            },
            "operand refers forward"
        );
        self.body.insts.push(Inst {
            op,
            span: self.span.clone(),
        })
    }

    // ========================================================================
    // Values
    // ========================================================================

    pub fn param(&mut self, name: impl Into<String>) -> InstId {
        self.emit(Op::Param { name: name.into() })
    }

    pub fn literal(&mut self, lit: Literal) -> InstId {
        self.emit(Op::LoadConstant(Constant::Literal(lit)))
    }

    pub fn global(&mut self, name: impl Into<String>) -> InstId {
        self.emit(Op::LoadConstant(Constant::Global(name.into())))
    }

    pub fn function_placeholder(&mut self, expr: JsExpr) -> InstId {
        self.emit(Op::LoadConstant(Constant::Function(Box::new(expr))))
    }

    pub fn unsupported(&mut self, kind: impl Into<String>, expr: Option<JsExpr>) -> InstId {
        self.emit(Op::LoadConstant(Constant::Unsupported {
            kind: kind.into(),
            expr: expr.map(Box::new),
        }))
    }

    pub fn declare(&mut self, kind: DeclKind, pattern: JsPattern, value: InstId) -> InstId {
        let name = match &pattern {
            JsPattern::Ident(name) => name.clone(),
            other => format!("[{}]", other.bound_names().join(", ")),
        };
        self.emit(Op::Declare {
            kind,
            pattern,
            name,
            value,
        })
    }

    pub fn read_property(&mut self, object: InstId, property: Property) -> InstId {
        self.emit(Op::ReadProperty { object, property })
    }

    pub fn object(&mut self, props: Vec<(String, Operand)>) -> InstId {
        self.emit(Op::Object { props })
    }

    pub fn call(&mut self, receiver: InstId, property: Option<Property>, args: Vec<Operand>) -> InstId {
        self.emit(Op::Call {
            receiver,
            property,
            args,
        })
    }

    pub fn ret(&mut self, value: Option<InstId>) -> InstId {
        self.emit(Op::Return { value })
    }
}
