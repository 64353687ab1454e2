//! Post-extraction fold pass: collapses runs of trivial adjacent nodes.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::constants::{
    get_ctor_label_re, get_getter_label_re, get_qualifier_re, get_setter_label_re,
};
use crate::ir::{CallMeta, Edge, EdgeKind, Node, NodeId, NodeKind, NodeMeta};

use super::Builder;

/// Call-shape classification. Pairs of different kinds never merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    Setter,
    Getter,
    Ctor,
    Other,
}

impl Builder<'_> {
    /// Repeatedly merges fold-eligible `A -> B` pairs until a fixed point,
    /// then reconciles edges against the pre-fold snapshot so no edge is
    /// lost or duplicated by merge ordering.
    pub(crate) fn fold_linear_actions(&mut self) {
        let snapshot = self.edges.clone();
        while let Some((a_idx, b_idx)) = self.find_fold_pair() {
            self.merge_pair(a_idx, b_idx);
        }
        self.reconcile_edges(&snapshot);
    }

    fn find_fold_pair(&self) -> Option<(usize, usize)> {
        let index: FxHashMap<&str, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();

        for (a_idx, a) in self.nodes.iter().enumerate() {
            if !is_foldable(a) {
                continue;
            }
            let outs: Vec<&Edge> = self.edges.iter().filter(|e| e.from == a.id).collect();
            if outs.len() != 1 {
                continue;
            }
            let out = outs[0];
            if out.kind != EdgeKind::Normal {
                continue;
            }
            // only a node entered by plain sequential flow may fold forward;
            // branch entries (true/false/break targets) keep their own node
            let ins: Vec<&Edge> = self.edges.iter().filter(|e| e.to == a.id).collect();
            if ins.len() != 1 || ins[0].kind != EdgeKind::Normal {
                continue;
            }
            let Some(&b_idx) = index.get(out.to.as_str()) else {
                continue;
            };
            let b = &self.nodes[b_idx];
            if !is_foldable(b) {
                continue;
            }
            // keeps for-update nodes visible instead of folding them into
            // the last body statement
            let leads_to_loop_head = self.edges.iter().any(|e| {
                e.from == b.id
                    && index
                        .get(e.to.as_str())
                        .is_some_and(|&i| self.nodes[i].kind == NodeKind::LoopHead)
            });
            if leads_to_loop_head {
                continue;
            }
            let b_in_normal = self
                .edges
                .iter()
                .filter(|e| e.to == b.id && e.kind == EdgeKind::Normal)
                .count();
            let getter_pair = self.options.fold_sequential_getters
                && is_getterish(a)
                && is_getterish(b);
            if b_in_normal != 1 && !getter_pair {
                continue;
            }
            if self.allow_merge(a, b) {
                return Some((a_idx, b_idx));
            }
        }
        None
    }

    fn merge_pair(&mut self, a_idx: usize, b_idx: usize) {
        let merged = merge_nodes(&self.nodes[a_idx], &self.nodes[b_idx]);
        let a_id = self.nodes[a_idx].id.clone();
        let b_id = self.nodes[b_idx].id.clone();
        self.nodes[a_idx] = merged;
        self.nodes.remove(b_idx);

        let mut seen = FxHashSet::default();
        let mut rewritten = Vec::with_capacity(self.edges.len());
        for edge in &self.edges {
            // normal edges into the absorbed node disappear; everything else
            // is re-homed onto the surviving node
            if edge.to == b_id && edge.kind == EdgeKind::Normal {
                continue;
            }
            let from = if edge.from == b_id { &a_id } else { &edge.from };
            let to = if edge.to == b_id { &a_id } else { &edge.to };
            if from == to {
                continue;
            }
            let next = Edge {
                from: from.clone(),
                to: to.clone(),
                kind: edge.kind,
                label: edge.label.clone(),
            };
            if seen.insert(next.dedup_key()) {
                rewritten.push(next);
            }
        }
        self.edges = rewritten;
    }

    fn allow_merge(&self, a: &Node, b: &Node) -> bool {
        let kind_a = call_kind(a);
        if kind_a != call_kind(b) {
            return false;
        }
        if self.blank_line_between(a, b) {
            return false;
        }
        match kind_a {
            CallKind::Setter => {
                self.options.fold_sequential_calls && self.options.fold_sequential_setters
            }
            CallKind::Getter => self.options.fold_sequential_getters,
            CallKind::Ctor => self.options.fold_sequential_ctors,
            CallKind::Other => {
                let qa = qualifier_of(&a.label);
                let qb = qualifier_of(&b.label);
                let same_qualifier = qa.is_some() && qa == qb;
                same_qualifier
                    && (self.options.fold_fluent_calls
                        || (self.options.fold_nested_calls
                            && is_call_like(&a.label)
                            && is_call_like(&b.label)))
            }
        }
    }

    /// A blank source line between two statements keeps them apart.
    fn blank_line_between(&self, a: &Node, b: &Node) -> bool {
        let Some(source) = &self.source else {
            return false;
        };
        let a_last = a.meta.end_line.or(a.meta.line);
        let b_first = b.meta.line;
        match (a_last, b_first) {
            (Some(last), Some(first)) => source.has_blank_between(last, first),
            _ => false,
        }
    }

    /// Re-derives edges from the pre-fold snapshot through the `merged_from`
    /// alias table, adding any that the incremental rewrites dropped.
    fn reconcile_edges(&mut self, snapshot: &[Edge]) {
        if snapshot.is_empty() {
            return;
        }
        let mut alias: FxHashMap<NodeId, NodeId> = FxHashMap::default();
        for node in &self.nodes {
            for source in &node.meta.merged_from {
                alias.insert(source.clone(), node.id.clone());
            }
            alias.insert(node.id.clone(), node.id.clone());
        }
        let mut existing: FxHashSet<String> =
            self.edges.iter().map(Edge::dedup_key).collect();
        for edge in snapshot {
            let (Some(from), Some(to)) = (alias.get(&edge.from), alias.get(&edge.to)) else {
                continue;
            };
            if from == to {
                continue;
            }
            let candidate = Edge {
                from: from.clone(),
                to: to.clone(),
                kind: edge.kind,
                label: edge.label.clone(),
            };
            if existing.insert(candidate.dedup_key()) {
                self.edges.push(candidate);
            }
        }
    }
}

fn is_foldable(node: &Node) -> bool {
    matches!(node.kind, NodeKind::Action | NodeKind::Call)
        && !node.meta.no_fold
        && !node.meta.chain_split
}

fn merge_nodes(a: &Node, b: &Node) -> Node {
    let label = merge_labels(&a.label, &b.label);
    let mut merged_from: Vec<NodeId> = Vec::new();
    for id in merged_sources(a).into_iter().chain(merged_sources(b)) {
        if !merged_from.contains(&id) {
            merged_from.push(id);
        }
    }
    let (call, inline_calls) = merge_call_meta(&a.meta, &b.meta);
    let meta = NodeMeta {
        line: a.meta.line.or(b.meta.line),
        end_line: last_line(b).max(last_line(a)),
        no_fold: a.meta.no_fold || b.meta.no_fold,
        chain_split: false,
        fluent_chain_id: a.meta.fluent_chain_id.or(b.meta.fluent_chain_id),
        is_getter: a.meta.is_getter || b.meta.is_getter,
        is_setter: a.meta.is_setter || b.meta.is_setter,
        is_ctor: a.meta.is_ctor || b.meta.is_ctor,
        merged_from,
        call,
        inline_calls,
    };
    Node {
        id: a.id.clone(),
        kind: a.kind,
        label,
        meta,
    }
}

fn last_line(node: &Node) -> Option<u32> {
    node.meta.end_line.or(node.meta.line)
}

fn merged_sources(node: &Node) -> Vec<NodeId> {
    if node.meta.merged_from.is_empty() {
        vec![node.id.clone()]
    } else {
        node.meta.merged_from.clone()
    }
}

/// Picks a primary call for the merged node; the loser and all inline calls
/// are collected into one list deduplicated by callee identity.
fn merge_call_meta(a: &NodeMeta, b: &NodeMeta) -> (Option<CallMeta>, Vec<CallMeta>) {
    let mut inline: Vec<CallMeta> = Vec::new();
    let mut keys: FxHashSet<String> = FxHashSet::default();
    let mut push_inline = |call: CallMeta, inline: &mut Vec<CallMeta>| {
        if keys.insert(inline_key(&call)) {
            inline.push(call);
        }
    };

    for call in a.inline_calls.iter().chain(&b.inline_calls) {
        push_inline(call.clone(), &mut inline);
    }

    let both_skip = a.call.as_ref().is_some_and(|c| c.skip_render)
        && b.call.as_ref().is_some_and(|c| c.skip_render);
    let mut primary: Option<CallMeta> = None;
    for candidate in [&a.call, &b.call].into_iter().flatten() {
        if primary.is_none() {
            let mut kept = candidate.clone();
            kept.skip_render = both_skip;
            primary = Some(kept);
        } else {
            let mut demoted = candidate.clone();
            let nested = std::mem::take(&mut demoted.inline_calls);
            demoted.inline = true;
            push_inline(demoted, &mut inline);
            for call in nested {
                push_inline(call, &mut inline);
            }
        }
    }
    (primary, inline)
}

fn inline_key(call: &CallMeta) -> String {
    if !call.callee_key.is_empty() {
        return format!("calleeKey:{}", call.callee_key);
    }
    if !call.callee.is_empty() {
        return format!("callee:{}", call.callee);
    }
    if let Some(display) = &call.callee_display {
        return format!("display:{display}");
    }
    format!("label:{}", call.label)
}

fn merge_labels(a: &str, b: &str) -> String {
    if a.trim().is_empty() {
        return b.to_owned();
    }
    if b.trim().is_empty() {
        return a.to_owned();
    }
    format!("{a}</br>{b}")
}

fn call_kind(node: &Node) -> CallKind {
    let normalized = normalize_label(&node.label);
    if node.meta.is_setter || get_setter_label_re().is_match(&normalized) {
        return CallKind::Setter;
    }
    if is_getterish(node) {
        return CallKind::Getter;
    }
    if node.meta.is_ctor || get_ctor_label_re().is_match(&normalized) {
        return CallKind::Ctor;
    }
    CallKind::Other
}

fn is_getterish(node: &Node) -> bool {
    node.meta.is_getter || get_getter_label_re().is_match(&normalize_label(&node.label))
}

fn qualifier_of(label: &str) -> Option<String> {
    get_qualifier_re()
        .captures(label)
        .map(|c| c[1].to_owned())
}

fn is_call_like(label: &str) -> bool {
    label.contains('(') && label.contains(')')
}

fn normalize_label(label: &str) -> String {
    label
        .replace("\\n", " ")
        .replace("<br/>", " ")
        .replace("</br>", " ")
        .replace('\n', " ")
        .trim()
        .to_owned()
}
