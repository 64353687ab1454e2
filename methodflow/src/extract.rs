//! Flow extraction: statement tree -> [`ControlFlowGraph`].
//!
//! The traversal threads *open endpoints* through the statement list: each
//! handler consumes the endpoints that should flow into its statement and
//! returns the endpoints left open after it. An empty endpoint set means
//! control cannot fall through (unconditional return/throw/break/continue),
//! which short-circuits the rest of the block.

mod calls;
mod fold;
mod statements;

use compact_str::format_compact;
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::{smallvec, SmallVec};

use crate::ast::{CallResolver, Method};
use crate::ir::{ControlFlowGraph, Edge, EdgeKind, Node, NodeId, NodeKind, NodeMeta};
use crate::options::ExtractOptions;
use crate::utils::{doc_summary, safe_label, SourceText};

/// Extracts the control-flow graph of `method`.
///
/// `resolver` supplies callee declarations for call inlining; pass
/// [`crate::ast::NoopResolver`] to keep every call a leaf.
#[must_use]
pub fn extract(
    method: &Method,
    options: &ExtractOptions,
    resolver: &dyn CallResolver,
) -> ControlFlowGraph {
    let options = options.clone().normalized();
    let skip_regexes = options.compiled_skip_regexes();
    let mut visited = FxHashSet::default();
    visited.insert(method.qualified_signature());
    Builder::new(options, skip_regexes, resolver, method, visited).build()
}

/// One pending edge: where it comes from and what kind/label it should
/// transfer onto whatever it gets linked to.
#[derive(Debug, Clone)]
pub(crate) struct Endpoint {
    pub(crate) from: NodeId,
    pub(crate) kind: EdgeKind,
    pub(crate) label: Option<String>,
}

impl Endpoint {
    pub(crate) fn normal(from: NodeId) -> Self {
        Self {
            from,
            kind: EdgeKind::Normal,
            label: None,
        }
    }

    pub(crate) fn new(from: NodeId, kind: EdgeKind, label: impl Into<String>) -> Self {
        Self {
            from,
            kind,
            label: Some(label.into()),
        }
    }
}

/// Open endpoints after a statement. Almost always one or two.
pub(crate) type Endpoints = SmallVec<[Endpoint; 2]>;

/// Targets `break` and `continue` resolve against.
#[derive(Debug, Clone)]
pub(crate) struct LoopContext {
    pub(crate) continue_target: NodeId,
    pub(crate) break_target: NodeId,
}

pub(crate) struct Builder<'a> {
    pub(crate) options: ExtractOptions,
    pub(crate) skip_regexes: Vec<Regex>,
    pub(crate) resolver: &'a dyn CallResolver,
    pub(crate) visited: FxHashSet<String>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) loop_stack: Vec<LoopContext>,
    pub(crate) switch_merge_stack: Vec<NodeId>,
    pub(crate) id_sequence: u32,
    pub(crate) chain_sequence: u32,
    pub(crate) end_id: NodeId,
    pub(crate) force_no_fold: bool,
    pub(crate) line_counters: FxHashMap<u32, u32>,
    pub(crate) source: Option<SourceText>,
    pub(crate) recursive: bool,
    pub(crate) method: &'a Method,
}

impl<'a> Builder<'a> {
    pub(crate) fn new(
        options: ExtractOptions,
        skip_regexes: Vec<Regex>,
        resolver: &'a dyn CallResolver,
        method: &'a Method,
        visited: FxHashSet<String>,
    ) -> Self {
        Self {
            options,
            skip_regexes,
            resolver,
            visited,
            nodes: Vec::new(),
            edges: Vec::new(),
            loop_stack: Vec::new(),
            switch_merge_stack: Vec::new(),
            id_sequence: 0,
            chain_sequence: 0,
            end_id: NodeId::default(),
            force_no_fold: false,
            line_counters: FxHashMap::default(),
            source: method.source.as_deref().map(SourceText::new),
            recursive: false,
            method,
        }
    }

    pub(crate) fn build(mut self) -> ControlFlowGraph {
        let start_label = self
            .method
            .doc
            .as_deref()
            .and_then(doc_summary)
            .unwrap_or_else(|| self.method.name.clone());
        let start_id = self.add_node(
            NodeKind::Start,
            start_label,
            Some(self.method.line),
            NodeMeta::default(),
        );
        self.end_id = self.add_node(
            NodeKind::End,
            format!("End {}", self.method.name),
            Some(self.method.line),
            NodeMeta::default(),
        );
        let mut tails: Endpoints = smallvec![Endpoint::normal(start_id.clone())];
        let method = self.method;
        if let Some(body) = &method.body {
            tails = self.process_statements(&body.statements, tails);
        }
        self.connect_to_end(tails);
        if self.options.any_fold() {
            self.fold_linear_actions();
        }
        ControlFlowGraph {
            entry_id: start_id,
            exit_id: self.end_id,
            nodes: self.nodes,
            edges: self.edges,
            recursive: self.recursive,
        }
    }

    pub(crate) fn safe(&self, raw: &str) -> String {
        safe_label(raw, self.options.label_max_length)
    }

    pub(crate) fn add_node(
        &mut self,
        kind: NodeKind,
        label: impl Into<String>,
        line: Option<u32>,
        mut meta: NodeMeta,
    ) -> NodeId {
        let id = self.next_id(line);
        meta.line = line;
        if self.force_no_fold {
            meta.no_fold = true;
        }
        self.nodes.push(Node {
            id: id.clone(),
            kind,
            label: label.into(),
            meta,
        });
        id
    }

    fn next_id(&mut self, line: Option<u32>) -> NodeId {
        if let Some(line) = line {
            let count = self.line_counters.entry(line).or_insert(0);
            *count += 1;
            if *count == 1 {
                return format_compact!("L{line}");
            }
            return format_compact!("L{line}_{count}");
        }
        self.id_sequence += 1;
        format_compact!("n{}", self.id_sequence)
    }

    /// Closes every endpoint onto `to`, transferring the endpoint's kind and
    /// label unless an explicit override is given.
    pub(crate) fn link(
        &mut self,
        incoming: &[Endpoint],
        to: &NodeId,
        kind: Option<EdgeKind>,
        label: Option<&str>,
    ) {
        for endpoint in incoming {
            self.edges.push(Edge {
                from: endpoint.from.clone(),
                to: to.clone(),
                kind: kind.unwrap_or(endpoint.kind),
                label: label
                    .map(str::to_owned)
                    .or_else(|| endpoint.label.clone())
                    .unwrap_or_default(),
            });
        }
    }

    pub(crate) fn edge(&mut self, from: &NodeId, to: &NodeId, kind: EdgeKind, label: &str) {
        self.edges.push(Edge {
            from: from.clone(),
            to: to.clone(),
            kind,
            label: label.to_owned(),
        });
    }

    pub(crate) fn connect_to_end(&mut self, exits: Endpoints) {
        let end_id = self.end_id.clone();
        for exit in &exits {
            self.edges.push(Edge {
                from: exit.from.clone(),
                to: end_id.clone(),
                kind: exit.kind,
                label: exit.label.clone().unwrap_or_default(),
            });
        }
    }

    pub(crate) fn with_no_fold<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let prev = self.force_no_fold;
        self.force_no_fold = true;
        let result = f(self);
        self.force_no_fold = prev;
        result
    }

    pub(crate) fn next_chain_id(&mut self) -> u32 {
        self.chain_sequence += 1;
        self.chain_sequence
    }

}

#[cfg(test)]
mod tests;
