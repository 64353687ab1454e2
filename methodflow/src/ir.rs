//! Graph IR produced by [`crate::extract`] and consumed by [`crate::render`].

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Node identifier.
///
/// Ids derived from source lines look like `L12` / `L12_2`; nodes without
/// a line get sequential `n<k>` ids. Short enough to stay inline.
pub type NodeId = CompactString;

/// What a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Method entry.
    Start,
    /// Method exit.
    End,
    /// A plain statement.
    Action,
    /// A branch condition.
    Decision,
    /// A loop header.
    LoopHead,
    /// A join point; blank merges are spliced out during rendering.
    Merge,
    /// A statement whose dominant content is a resolved call.
    Call,
    /// A `return` statement.
    Return,
    /// A `throw` statement.
    Throw,
}

/// How control reaches an edge's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Sequential flow.
    Normal,
    /// Condition evaluated to true.
    True,
    /// Condition evaluated to false.
    False,
    /// `break` out of a loop or switch.
    Break,
    /// `continue` to the next iteration.
    Continue,
    /// Propagated exception; rendered dashed.
    Exception,
    /// Informational annotation (ternary `=`, switch type links); rendered
    /// dashed, never part of the control-flow lattice.
    Return,
}

impl EdgeKind {
    /// Default label text shown when the edge carries no explicit label.
    #[must_use]
    pub fn default_label(self) -> &'static str {
        match self {
            EdgeKind::True => "true",
            EdgeKind::False => "false",
            EdgeKind::Break => "break",
            EdgeKind::Continue => "continue",
            EdgeKind::Normal | EdgeKind::Exception | EdgeKind::Return => "",
        }
    }
}

/// One graph node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Stable id, unique within one graph.
    pub id: NodeId,
    /// Node kind.
    pub kind: NodeKind,
    /// Display label, already whitespace-collapsed and truncated.
    pub label: String,
    /// Extraction metadata.
    #[serde(default)]
    pub meta: NodeMeta,
}

/// One directed edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Source node id.
    pub from: NodeId,
    /// Target node id.
    pub to: NodeId,
    /// Edge kind.
    pub kind: EdgeKind,
    /// Explicit label; empty means the kind's default applies.
    #[serde(default)]
    pub label: String,
}

impl Edge {
    /// Deduplication key covering everything that makes two edges equal.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        format!("{}|{}|{:?}|{}", self.from, self.to, self.kind, self.label)
    }
}

/// Per-node extraction metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeMeta {
    /// 1-based source line the node came from.
    #[serde(default)]
    pub line: Option<u32>,
    /// Last source line covered after folding.
    #[serde(default)]
    pub end_line: Option<u32>,
    /// Excluded from the fold pass (break/continue markers, type stubs).
    #[serde(default)]
    pub no_fold: bool,
    /// Part of a split fluent chain.
    #[serde(default)]
    pub chain_split: bool,
    /// Identifies which fluent chain a split segment belongs to.
    #[serde(default)]
    pub fluent_chain_id: Option<u32>,
    /// Label matches the getter shape.
    #[serde(default)]
    pub is_getter: bool,
    /// Label matches the setter shape.
    #[serde(default)]
    pub is_setter: bool,
    /// Label matches the constructor shape.
    #[serde(default)]
    pub is_ctor: bool,
    /// Ids of nodes folded into this one, in merge order.
    #[serde(default)]
    pub merged_from: Vec<NodeId>,
    /// Primary resolved call, for `Call` nodes.
    #[serde(default)]
    pub call: Option<CallMeta>,
    /// Secondary calls attached to this node (nested args, folded peers).
    #[serde(default)]
    pub inline_calls: Vec<CallMeta>,
}

/// A resolved (or resolution-attempted) call site.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallMeta {
    /// Node label text for the call site.
    pub label: String,
    /// Bare callee signature: `name(Ty1, Ty2)`.
    pub callee: String,
    /// Qualified identity: `pkg.Type#name(Ty1,Ty2)`. Drives recursion
    /// detection, skip matching and render-time deduplication.
    pub callee_key: String,
    /// Display text for the callee subgraph title or stub leaf.
    #[serde(default)]
    pub callee_display: Option<String>,
    /// One-line body summary for unexpanded leaves.
    #[serde(default)]
    pub callee_body: Option<String>,
    /// Expanded callee graph, when inlining was allowed.
    #[serde(default)]
    pub callee_graph: Option<Box<ControlFlowGraph>>,
    /// Callee lives in a platform package.
    #[serde(default)]
    pub is_jdk: bool,
    /// Suppress any render output for this call.
    #[serde(default)]
    pub skip_render: bool,
    /// Render as a bare entry node instead of a full subgraph.
    #[serde(default)]
    pub inline: bool,
    /// 1-based call-site line.
    #[serde(default)]
    pub line: Option<u32>,
    /// Calls nested inside this call's arguments.
    #[serde(default)]
    pub inline_calls: Vec<CallMeta>,
}

/// An extracted control-flow graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControlFlowGraph {
    /// Id of the method-entry node.
    pub entry_id: NodeId,
    /// Id of the method-exit node.
    pub exit_id: NodeId,
    /// Nodes in creation order.
    pub nodes: Vec<Node>,
    /// Edges in creation order.
    pub edges: Vec<Edge>,
    /// Whether the method (transitively) calls itself.
    #[serde(default)]
    pub recursive: bool,
}

impl ControlFlowGraph {
    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Edges leaving `id`.
    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |e| e.from == id)
    }

    /// Edges entering `id`.
    pub fn incoming<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |e| e.to == id)
    }
}
