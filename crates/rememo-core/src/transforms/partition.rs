//! Block partitioning.
//!
//! Each memoizable value is grouped with the calls that mutate it, so a
//! memoized result is never shared with code that changes it in place. The
//! groups become contiguous id spans, overlapping spans are merged, and the
//! result is a sequence of reactive blocks and pass-through instructions in
//! program order.

use std::collections::{BTreeMap, BTreeSet};

use crate::entity::EntityRef;
use crate::ir::{FunctionBody, Inst, InstId, Op};

use super::deps::Analysis;

// ---------------------------------------------------------------------------
// Union-find
// ---------------------------------------------------------------------------

/// Disjoint sets over instruction ids.
struct UnionFind {
    parent: Vec<u32>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len as u32).collect(),
            rank: vec![0; len],
        }
    }

    /// Find the representative of `x` with path compression.
    fn find(&mut self, x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        let mut cur = x;
        while cur != root {
            let next = self.parent[cur as usize];
            self.parent[cur as usize] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, a: u32, b: u32) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        // Union by rank.
        if self.rank[ra as usize] < self.rank[rb as usize] {
            self.parent[ra as usize] = rb;
        } else {
            self.parent[rb as usize] = ra;
            if self.rank[ra as usize] == self.rank[rb as usize] {
                self.rank[ra as usize] += 1;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Partition
// ---------------------------------------------------------------------------

/// A contiguous span of instructions memoized as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactiveBlock {
    pub start: InstId,
    pub end: InstId,
    pub insts: BTreeMap<InstId, Inst>,
    /// Changing inputs produced outside the span.
    pub deps: BTreeSet<InstId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartitionItem {
    PassThrough(InstId),
    Block(ReactiveBlock),
}

/// Inclusive `[start, end]` spans of the non-trivial groups, merged where
/// they overlap or touch, ascending by start.
pub fn merged_spans(body: &FunctionBody, analysis: &Analysis) -> Vec<(InstId, InstId)> {
    let mut uf = UnionFind::new(body.len());
    for id in body.insts.keys() {
        let info = analysis.info(id);
        if info.should_memo {
            for m in &info.mutators {
                uf.union(id.index(), m.index());
            }
        }
    }

    // root -> (min, max, size)
    let mut classes: BTreeMap<u32, (u32, u32, usize)> = BTreeMap::new();
    for i in 0..body.len() as u32 {
        let root = uf.find(i);
        let entry = classes.entry(root).or_insert((i, i, 0));
        entry.0 = entry.0.min(i);
        entry.1 = entry.1.max(i);
        entry.2 += 1;
    }

    let mut spans: Vec<(u32, u32)> = classes
        .into_values()
        .filter(|&(_, _, size)| size > 1)
        .map(|(lo, hi, _)| (lo, hi))
        .collect();
    spans.sort();

    let mut merged: Vec<(u32, u32)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some(prev) if prev.1 >= start => prev.1 = prev.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
        .into_iter()
        .map(|(s, e)| (InstId::new(s), InstId::new(e)))
        .collect()
}

/// Turn merged spans into the final item sequence.
///
/// A span holding nothing but a single `Declare` has nothing to memoize and
/// is emitted as a pass-through instead.
pub fn partition_spans(
    body: &FunctionBody,
    analysis: &Analysis,
    spans: &[(InstId, InstId)],
) -> Vec<PartitionItem> {
    let mut items = Vec::new();
    let mut spans = spans.iter().peekable();
    let mut next = 0u32;
    let len = body.len() as u32;

    while next < len {
        let Some(&&(start, end)) = spans.peek() else {
            items.push(PartitionItem::PassThrough(InstId::new(next)));
            next += 1;
            continue;
        };
        if next < start.index() {
            items.push(PartitionItem::PassThrough(InstId::new(next)));
            next += 1;
            continue;
        }
        spans.next();
        next = end.index() + 1;

        if start == end && matches!(body.insts[start].op, Op::Declare { .. }) {
            items.push(PartitionItem::PassThrough(start));
            continue;
        }

        let ids = (start.index()..=end.index()).map(InstId::new);
        let insts: BTreeMap<InstId, Inst> = ids.clone().map(|id| (id, body.insts[id].clone())).collect();
        let deps = ids
            .flat_map(|id| analysis.info(id).dependencies.iter().copied())
            .filter(|d| !insts.contains_key(d))
            .collect();
        items.push(PartitionItem::Block(ReactiveBlock {
            start,
            end,
            insts,
            deps,
        }));
    }
    items
}

/// Group a function body into reactive blocks and pass-through items.
pub fn partition(body: &FunctionBody, analysis: &Analysis) -> Vec<PartitionItem> {
    let spans = merged_spans(body, analysis);
    partition_spans(body, analysis, &spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FunctionBuilder, Operand, Property};
    use crate::js_ast::{DeclKind, JsExpr, JsPattern, Literal};
    use crate::pipeline::MemoConfig;
    use crate::transforms::deps::analyze;

    fn named(n: &str) -> Option<Property> {
        Some(Property::Named(n.into()))
    }

    fn id(n: u32) -> InstId {
        InstId::new(n)
    }

    #[test]
    fn union_find_merges_and_compresses() {
        let mut uf = UnionFind::new(6);
        uf.union(0, 1);
        uf.union(2, 3);
        uf.union(1, 3);
        let root = uf.find(0);
        assert!([0, 1, 2, 3].iter().all(|&x| uf.find(x) == root));
        assert_ne!(uf.find(4), root);
        assert_ne!(uf.find(4), uf.find(5));
        // Every member now points straight at the root.
        assert!([0, 1, 2, 3].iter().all(|&x| uf.parent[x as usize] == root));
    }

    #[test]
    fn filter_then_sort_forms_one_block() {
        // function f(a) { const s = a.filter(cb).sort(); return s; }
        let mut fb = FunctionBuilder::new("f");
        let a = fb.param("a");
        let cb = fb.function_placeholder(JsExpr::ident("keep"));
        let filtered = fb.call(a, named("filter"), vec![Operand::Value(cb)]);
        let sorted = fb.call(filtered, named("sort"), vec![]);
        let s = fb.declare(DeclKind::Const, JsPattern::ident("s"), sorted);
        fb.ret(Some(s));
        let body = fb.build();
        let analysis = analyze(&body, &MemoConfig::default());

        assert_eq!(merged_spans(&body, &analysis), vec![(filtered, sorted)]);
        let items = partition(&body, &analysis);
        assert_eq!(items.len(), 5);
        assert_eq!(items[0], PartitionItem::PassThrough(a));
        assert_eq!(items[1], PartitionItem::PassThrough(cb));
        match &items[2] {
            PartitionItem::Block(block) => {
                assert_eq!((block.start, block.end), (filtered, sorted));
                assert_eq!(block.insts.len(), 2);
                assert_eq!(block.deps, BTreeSet::from([a]));
            }
            other => panic!("expected block, got {other:?}"),
        }
        assert_eq!(items[3], PartitionItem::PassThrough(s));
        assert_eq!(items[4], PartitionItem::PassThrough(id(5)));
    }

    #[test]
    fn memoizable_value_without_mutators_stays_pass_through() {
        let mut fb = FunctionBuilder::new("f");
        let a = fb.param("a");
        let cb = fb.function_placeholder(JsExpr::ident("g"));
        fb.call(a, named("map"), vec![Operand::Value(cb)]);
        let body = fb.build();
        let analysis = analyze(&body, &MemoConfig::default());
        assert!(merged_spans(&body, &analysis).is_empty());
        assert!(partition(&body, &analysis)
            .iter()
            .all(|item| matches!(item, PartitionItem::PassThrough(_))));
    }

    #[test]
    fn overlapping_spans_merge() {
        // v1 = object {value: a}; v2 = call g(v1); v3 = object {value: a};
        // v4 = call g(v3, v1)
        let mut fb = FunctionBuilder::new("f");
        let a = fb.param("a");
        let first = fb.object(vec![("value".into(), Operand::Value(a))]);
        let g = fb.global("g");
        fb.call(g, None, vec![Operand::Value(first)]);
        let second = fb.object(vec![("value".into(), Operand::Value(a))]);
        let last = fb.call(g, None, vec![Operand::Value(second), Operand::Value(first)]);
        let body = fb.build();
        let analysis = analyze(&body, &MemoConfig::default());
        assert_eq!(merged_spans(&body, &analysis), vec![(first, last)]);
        match &partition(&body, &analysis)[1] {
            PartitionItem::Block(block) => {
                assert_eq!(block.insts.len(), 5);
                assert_eq!(block.deps, BTreeSet::from([a]));
            }
            other => panic!("expected block, got {other:?}"),
        }
    }

    #[test]
    fn single_declare_span_is_demoted() {
        let mut fb = FunctionBuilder::new("f");
        let one = fb.literal(Literal::Number(1.0));
        let x = fb.declare(DeclKind::Const, JsPattern::ident("x"), one);
        let body = fb.build();
        let analysis = analyze(&body, &MemoConfig::default());
        let items = partition_spans(&body, &analysis, &[(x, x)]);
        assert_eq!(
            items,
            vec![PartitionItem::PassThrough(one), PartitionItem::PassThrough(x)]
        );
    }

    #[test]
    fn no_params_means_no_blocks() {
        let mut fb = FunctionBuilder::new("f");
        let obj = fb.object(vec![("n".into(), Operand::Literal(Literal::Number(1.0)))]);
        let g = fb.global("process");
        fb.call(g, None, vec![Operand::Value(obj)]);
        let body = fb.build();
        let analysis = analyze(&body, &MemoConfig::default());
        assert!(partition(&body, &analysis)
            .iter()
            .all(|item| matches!(item, PartitionItem::PassThrough(_))));
    }
}
