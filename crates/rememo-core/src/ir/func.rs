use crate::entity::{EntityRef, PrimaryMap};

use super::inst::{Constant, Inst, InstId, Op, Property};

/// The lowered body of one function: instructions in program order.
///
/// Every operand an instruction holds refers to a strictly smaller id, so a
/// single forward sweep sees each value's producers before its consumers.
#[derive(Debug, Clone, Default)]
pub struct FunctionBody {
    pub name: String,
    pub insts: PrimaryMap<InstId, Inst>,
}

impl FunctionBody {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            insts: PrimaryMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    /// Most recent `Param`/`Declare` binding `name`, if any.
    ///
    /// Last declaration wins; there is no block scoping.
    pub fn resolve(&self, name: &str) -> Option<InstId> {
        self.insts
            .iter()
            .rev()
            .find(|(_, inst)| inst.bound_names().iter().any(|n| n == name))
            .map(|(id, _)| id)
    }

    /// Source-level names a dependency on `id` is spelled as.
    ///
    /// A `Param` yields its name and a `Declare` every identifier it binds.
    /// Anything else has no name and is left out of dependency lists.
    pub fn dependency_names(&self, id: InstId) -> Vec<String> {
        match &self.insts[id].op {
            Op::Param { .. } | Op::Declare { .. } => self.insts[id].bound_names(),
            _ => vec![],
        }
    }

    /// Dotted access path of a value, when it has one: `a`, `Math`,
    /// `props.items`.
    pub fn value_path(&self, id: InstId) -> Option<String> {
        match &self.insts[id].op {
            Op::Param { name } => Some(name.clone()),
            Op::Declare { name, .. } => Some(name.clone()),
            Op::LoadConstant(Constant::Global(name)) => Some(name.clone()),
            Op::ReadProperty { object, property } => {
                let base = self.value_path(*object)?;
                Some(format!("{base}.{}", property.name()))
            }
            _ => None,
        }
    }

    /// Resolved callee name of a call: the receiver's path, extended by the
    /// method name when there is one (`Math.sqrt`, `useState`, `a.map`).
    pub fn callee_name(&self, receiver: InstId, property: Option<&Property>) -> Option<String> {
        let base = self.value_path(receiver);
        match (base, property) {
            (Some(base), Some(p)) => Some(format!("{base}.{}", p.name())),
            (Some(base), None) => Some(base),
            (None, Some(p)) => Some(p.name()),
            (None, None) => None,
        }
    }

    /// Callee name of a call whose receiver path starts at a global constant
    /// (`Math.sqrt`); `None` for calls on params and local bindings.
    pub fn global_callee_name(
        &self,
        receiver: InstId,
        property: Option<&Property>,
    ) -> Option<String> {
        let mut root = receiver;
        while let Op::ReadProperty { object, .. } = &self.insts[root].op {
            root = *object;
        }
        match &self.insts[root].op {
            Op::LoadConstant(Constant::Global(_)) => self.callee_name(receiver, property),
            _ => None,
        }
    }

    /// Ids consumed by any instruction.
    pub fn consumed(&self) -> Vec<bool> {
        let mut used = vec![false; self.len()];
        for inst in self.insts.values() {
            for op in inst.operands() {
                used[op.index() as usize] = true;
            }
        }
        used
    }
}
