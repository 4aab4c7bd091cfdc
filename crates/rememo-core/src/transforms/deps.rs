//! Dependency analysis: may-change and writable sweeps.
//!
//! Both sweeps walk the body once in ascending id order. Because operands
//! always refer backward, a value's flag is final by the time any consumer
//! is visited, so no fixpoint iteration is needed.

use std::collections::BTreeSet;

use crate::entity::SecondaryMap;
use crate::ir::{FunctionBody, Inst, InstId, Op, Property};
use crate::pipeline::MemoConfig;

/// Per-instruction analysis result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueInfo {
    /// Consumed ids that may change between invocations.
    pub dependencies: BTreeSet<InstId>,
    /// Calls that consume this value while it is writable.
    pub mutators: BTreeSet<InstId>,
    /// Expensive with at least one changing input.
    pub should_memo: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub infos: SecondaryMap<InstId, ValueInfo>,
    pub may_change: SecondaryMap<InstId, bool>,
    pub writable: SecondaryMap<InstId, bool>,
}

impl Analysis {
    pub fn info(&self, id: InstId) -> &ValueInfo {
        self.infos.get(id)
    }
}

/// Run both sweeps and derive a [`ValueInfo`] for every instruction.
pub fn analyze(body: &FunctionBody, config: &MemoConfig) -> Analysis {
    let len = body.len();
    let mut may_change: SecondaryMap<InstId, bool> = SecondaryMap::with_len(len);
    let mut writable: SecondaryMap<InstId, bool> = SecondaryMap::with_len(len);

    for (id, inst) in body.insts.iter() {
        let operands = inst.operands();
        let seeded = match &inst.op {
            Op::Param { .. } => true,
            Op::Call {
                receiver, property, ..
            } => body
                .callee_name(*receiver, property.as_ref())
                .is_some_and(|name| config.is_hook(&name)),
            _ => false,
        };
        let changes = seeded || operands.iter().any(|&o| may_change[o]);
        may_change.insert(id, changes);

        let seeded = matches!(inst.op, Op::Object { .. } | Op::Call { .. });
        let fresh = seeded || operands.iter().any(|&o| writable[o]);
        writable.insert(id, fresh);
    }

    let mut infos: SecondaryMap<InstId, ValueInfo> = SecondaryMap::with_len(len);
    for (id, inst) in body.insts.iter() {
        let dependencies: BTreeSet<InstId> = inst
            .operands()
            .into_iter()
            .filter(|&o| may_change[o])
            .collect();
        let info = infos.get_mut(id);
        info.should_memo = is_expensive(body, inst, config) && !dependencies.is_empty();
        info.dependencies = dependencies;

        if matches!(inst.op, Op::Call { .. }) {
            for o in inst.operands() {
                if writable[o] {
                    infos.get_mut(o).mutators.insert(id);
                }
            }
        }
    }

    tracing::trace!(
        function = %body.name,
        memo = body.insts.keys().filter(|&id| infos[id].should_memo).count(),
        "dependency analysis done"
    );

    Analysis {
        infos,
        may_change,
        writable,
    }
}

/// Expensive: array traversal methods, math helpers, and object literals.
pub fn is_expensive(body: &FunctionBody, inst: &Inst, config: &MemoConfig) -> bool {
    match &inst.op {
        Op::Object { .. } => true,
        Op::Call {
            receiver, property, ..
        } => {
            if let Some(Property::Named(name)) = property {
                if config.is_expensive_method(name) {
                    return true;
                }
            }
            body.global_callee_name(*receiver, property.as_ref())
                .is_some_and(|name| config.is_expensive_callee(&name))
        }
        _ => false,
    }
}
