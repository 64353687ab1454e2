//! Mermaid flowchart emitter.

use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHashSet, FxHasher};

use crate::ir::{CallMeta, ControlFlowGraph, Edge, EdgeKind, Node, NodeId, NodeKind};

use super::RenderOptions;

/// Renders `graph` as Mermaid flowchart text.
///
/// Pure function of its inputs: the same graph and options always produce
/// byte-identical output.
#[must_use]
pub fn render(graph: &ControlFlowGraph, options: &RenderOptions) -> String {
    let view = remap_start_end(simplify(graph));
    let mut out = String::new();
    out.push_str(
        "%%{init: {\"flowchart\": {\"defaultRenderer\": \"elk\",\"wrappingWidth\": 9999}} }%%\n",
    );
    out.push_str("flowchart ");
    out.push_str(options.direction.as_str());
    out.push('\n');
    for node in &view.nodes {
        out.push_str(&format!("  {}{}\n", node.id, node_shape(node)));
    }
    out.push('\n');
    render_edges_compact(&view, &mut out);
    out.push('\n');

    let mut annotations = CallAnnotations::new(options.merge_calls);
    annotations.call_chain_extras(&view);
    for line in &annotations.lines {
        out.push_str("  ");
        out.push_str(line);
        out.push('\n');
    }
    for line in recursive_hints(&view) {
        out.push_str("  ");
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');
    out.push_str("  classDef startEnd fill:#f9f;\n");
    out.push_str("  class n_start,n_end startEnd;\n");
    out
}

struct GraphView {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    entry_id: NodeId,
    exit_id: NodeId,
}

/// Splices out every unlabeled `MERGE` node, joining its in-edges to its
/// out-edges. A non-NORMAL incoming kind wins over the outgoing kind; an
/// incoming label wins over the outgoing one.
fn simplify(graph: &ControlFlowGraph) -> GraphView {
    let mut nodes = graph.nodes.clone();
    let mut edges = graph.edges.clone();
    let entry_id = graph.entry_id.clone();
    let exit_id = graph.exit_id.clone();

    // one merge at a time so adjacency is never stale
    loop {
        let Some(pos) = nodes
            .iter()
            .position(|n| n.kind == NodeKind::Merge && n.label.trim().is_empty())
        else {
            break;
        };
        let id = nodes[pos].id.clone();
        nodes.remove(pos);

        let (ins, rest): (Vec<Edge>, Vec<Edge>) = edges.into_iter().partition(|e| e.to == id);
        let (outs, mut kept): (Vec<Edge>, Vec<Edge>) = rest.into_iter().partition(|e| e.from == id);
        let mut existing: FxHashSet<String> = kept.iter().map(Edge::dedup_key).collect();
        for incoming in &ins {
            for outgoing in &outs {
                let kind = if incoming.kind != EdgeKind::Normal {
                    incoming.kind
                } else {
                    outgoing.kind
                };
                let label = if incoming.label.trim().is_empty() {
                    outgoing.label.clone()
                } else {
                    incoming.label.clone()
                };
                let combined = Edge {
                    from: incoming.from.clone(),
                    to: outgoing.to.clone(),
                    kind,
                    label,
                };
                if combined.from != combined.to && existing.insert(combined.dedup_key()) {
                    kept.push(combined);
                }
            }
        }
        edges = kept;
    }

    GraphView {
        nodes,
        edges,
        entry_id,
        exit_id,
    }
}

/// Renames the entry and exit nodes to fixed anchors (`n_start`/`n_end`).
fn remap_start_end(view: GraphView) -> GraphView {
    let mut remap: FxHashMap<NodeId, NodeId> = FxHashMap::default();
    if !view.entry_id.is_empty() {
        remap.insert(view.entry_id.clone(), NodeId::from("n_start"));
    }
    if !view.exit_id.is_empty() {
        remap.insert(view.exit_id.clone(), NodeId::from("n_end"));
    }
    if remap.is_empty() {
        return view;
    }
    let rename = |id: &NodeId| remap.get(id).cloned().unwrap_or_else(|| id.clone());
    let nodes = view
        .nodes
        .into_iter()
        .map(|mut n| {
            n.id = rename(&n.id);
            n
        })
        .collect();
    let edges = view
        .edges
        .into_iter()
        .map(|mut e| {
            e.from = rename(&e.from);
            e.to = rename(&e.to);
            e
        })
        .collect();
    let entry_id = rename(&view.entry_id);
    let exit_id = rename(&view.exit_id);
    GraphView {
        nodes,
        edges,
        entry_id,
        exit_id,
    }
}

/// Emits structural edges; maximal 1-in/1-out chains collapse onto one line,
/// and chains sharing a start/end anchor pair are padded to equal arrow
/// length so alternative paths stay visually aligned.
fn render_edges_compact(view: &GraphView, out: &mut String) {
    let mut outgoing: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
    let mut incoming: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
    for (i, e) in view.edges.iter().enumerate() {
        if e.kind != EdgeKind::Normal {
            continue;
        }
        outgoing.entry(e.from.as_str()).or_default().push(i);
        incoming.entry(e.to.as_str()).or_default().push(i);
    }
    let node_map: FxHashMap<&str, &Node> =
        view.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    let mut used: FxHashSet<usize> = FxHashSet::default();
    let mut chains: Vec<Vec<usize>> = Vec::new();
    for (i, edge) in view.edges.iter().enumerate() {
        if edge.kind != EdgeKind::Normal || used.contains(&i) {
            continue;
        }
        let degree = |map: &FxHashMap<&str, Vec<usize>>, id: &str| {
            map.get(id).map_or(0, Vec::len)
        };
        let is_start = degree(&incoming, &edge.from) != 1 || degree(&outgoing, &edge.from) != 1;
        if !is_start {
            continue;
        }
        let mut seq = Vec::new();
        let mut current = i;
        loop {
            seq.push(current);
            used.insert(current);
            let to = view.edges[current].to.as_str();
            let outs = outgoing.get(to).map_or(&[] as &[usize], Vec::as_slice);
            let ins = incoming.get(to).map_or(&[] as &[usize], Vec::as_slice);
            if outs.len() == 1 && ins.len() == 1 {
                let next = outs[0];
                if used.contains(&next) {
                    break;
                }
                current = next;
            } else {
                break;
            }
        }
        chains.push(seq);
    }

    let mut max_len_by_pair: FxHashMap<String, usize> = FxHashMap::default();
    for chain in &chains {
        let first = &view.edges[chain[0]];
        let last = &view.edges[chain[chain.len() - 1]];
        let key = format!("{}->{}", first.from, last.to);
        let entry = max_len_by_pair.entry(key).or_insert(0);
        *entry = (*entry).max(chain.len());
    }
    for chain in &chains {
        let first = &view.edges[chain[0]];
        let last = &view.edges[chain[chain.len() - 1]];
        let key = format!("{}->{}", first.from, last.to);
        let max_len = max_len_by_pair.get(&key).copied().unwrap_or(chain.len());
        let missing = max_len.saturating_sub(chain.len());
        let mut line = format!("  {}", first.from);
        for (j, &edge_idx) in chain.iter().enumerate() {
            let e = &view.edges[edge_idx];
            let is_last = j == chain.len() - 1;
            let chain_edge = is_chain_edge(
                node_map.get(e.from.as_str()).copied(),
                node_map.get(e.to.as_str()).copied(),
            );
            let mut edge_text = format_edge(e, chain_edge);
            if is_last && missing > 0 {
                edge_text = format!("--{}>", "-".repeat(missing));
            }
            line.push_str(&edge_text);
            line.push_str(&e.to);
        }
        out.push_str(&line);
        out.push('\n');
    }
    for (i, edge) in view.edges.iter().enumerate() {
        if edge.kind == EdgeKind::Normal && used.contains(&i) {
            continue;
        }
        let chain_edge = edge.kind == EdgeKind::Normal
            && is_chain_edge(
                node_map.get(edge.from.as_str()).copied(),
                node_map.get(edge.to.as_str()).copied(),
            );
        out.push_str(&format!(
            "  {}{}{}\n",
            edge.from,
            format_edge(edge, chain_edge),
            edge.to
        ));
    }
}

fn node_shape(node: &Node) -> String {
    let label = escape(&node.label);
    match node.kind {
        NodeKind::Start | NodeKind::End => format!("([\"{label}\"])"),
        NodeKind::Decision | NodeKind::LoopHead => format!("{{\"{label}\"}}"),
        _ => format!("[\"{label}\"]"),
    }
}

fn format_edge(edge: &Edge, chain_edge: bool) -> String {
    let label = edge_label_text(edge);
    match edge.kind {
        EdgeKind::Return => {
            let text = if label.is_empty() || label.eq_ignore_ascii_case("throw") {
                "exception"
            } else {
                &label
            };
            format!("-. \"{text}\" .->")
        }
        EdgeKind::Exception => {
            let text = if label.is_empty() { "exception" } else { &label };
            format!("-. \"{text}\" .->")
        }
        _ if chain_edge => {
            if label.is_empty() {
                "-->".to_owned()
            } else {
                format!("--{label}-->")
            }
        }
        _ => {
            if label.is_empty() {
                "-->".to_owned()
            } else {
                format!("-- \"{label}\" -->")
            }
        }
    }
}

fn edge_label_text(edge: &Edge) -> String {
    let label = if edge.label.trim().is_empty() {
        edge.kind.default_label()
    } else {
        &edge.label
    };
    if label.trim().is_empty() {
        String::new()
    } else {
        escape(label)
    }
}

fn recursive_hints(view: &GraphView) -> Vec<String> {
    view.nodes
        .iter()
        .filter(|n| {
            n.kind == NodeKind::Call && n.label.to_lowercase().contains("recursive call")
        })
        .map(|n| format!("{} -. \"recursive call\" .-> {}", n.id, view.entry_id))
        .collect()
}

fn sort_by_line(nodes: &mut [&Node]) {
    nodes.sort_by(|a, b| {
        let la = a.meta.line.unwrap_or(u32::MAX);
        let lb = b.meta.line.unwrap_or(u32::MAX);
        la.cmp(&lb).then_with(|| a.id.cmp(&b.id))
    });
}

fn is_chain_edge(from: Option<&Node>, to: Option<&Node>) -> bool {
    let (Some(from), Some(to)) = (from, to) else {
        return false;
    };
    // only edges between two chain-split nodes of the same chain count
    from.meta.chain_split
        && to.meta.chain_split
        && from.meta.fluent_chain_id.is_some()
        && from.meta.fluent_chain_id == to.meta.fluent_chain_id
}

fn sanitize_id(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn escape(label: &str) -> String {
    label
        .replace('\\', "\\\\")
        // Mermaid renders \" as a quote terminator; use an entity instead
        .replace('"', "&quot;")
        .replace('\n', "<br/>")
}

/// The primary call of a node merged with the node-level inline list, the
/// shape [`render_call`](CallAnnotations::render_call) walks.
fn effective_call(node: &Node) -> Option<CallMeta> {
    let mut call = node.meta.call.clone()?;
    let mut inline = node.meta.inline_calls.clone();
    inline.extend(std::mem::take(&mut call.inline_calls));
    call.inline_calls = inline;
    Some(call)
}

/// State for the dashed `calls:N` annotation pass.
struct CallAnnotations {
    lines: Vec<String>,
    merged_targets: FxHashMap<String, String>,
    rendered_graphs: FxHashSet<String>,
    counters: FxHashMap<String, u32>,
    merge_calls: bool,
}

impl CallAnnotations {
    fn new(merge_calls: bool) -> Self {
        Self {
            lines: Vec::new(),
            merged_targets: FxHashMap::default(),
            rendered_graphs: FxHashSet::default(),
            counters: FxHashMap::default(),
            merge_calls,
        }
    }

    fn call_chain_extras(&mut self, view: &GraphView) {
        let mut seen = FxHashSet::default();
        let mut ordered: Vec<&Node> = view.nodes.iter().collect();
        sort_by_line(&mut ordered);
        for node in ordered {
            if node.kind == NodeKind::Call && !node.label.to_lowercase().contains("recursive call")
            {
                if let Some(call) = effective_call(node) {
                    self.render_call(&node.id, &call, "", &mut seen);
                }
            } else {
                let mut first = true;
                for inline in &node.meta.inline_calls {
                    if first && !self.lines.is_empty() {
                        self.lines.push(String::new());
                    }
                    self.render_call(&node.id, inline, "", &mut seen);
                    first = false;
                }
            }
        }
    }

    fn render_call(
        &mut self,
        source_id: &str,
        meta: &CallMeta,
        call_prefix: &str,
        seen: &mut FxHashSet<String>,
    ) {
        if meta.callee.trim().is_empty() {
            return;
        }
        // inline calls first so numbering follows evaluation order
        for inline in &meta.inline_calls {
            self.render_call(source_id, inline, call_prefix, seen);
        }
        let idx = {
            let counter = self.counters.entry(call_prefix.to_owned()).or_insert(0);
            *counter += 1;
            *counter
        };
        let base_label = if call_prefix.is_empty() {
            idx.to_string()
        } else {
            format!("{call_prefix}{idx}")
        };
        let callee_key = if meta.callee_key.is_empty() {
            meta.callee.clone()
        } else {
            meta.callee_key.clone()
        };
        let base_id = match meta.line {
            Some(line) => format!("cL{line}"),
            None => {
                let mut hasher = FxHasher::default();
                sanitize_id(&callee_key).hash(&mut hasher);
                format!("c{}", hasher.finish())
            }
        };
        let mut target_id = if self.merge_calls {
            self.merged_targets.get(&callee_key).cloned()
        } else {
            None
        };
        let skip_edge = meta.skip_render;

        let child_prefix = format!("{base_label}.");
        self.counters.remove(&child_prefix);

        if let (Some(graph), None) = (&meta.callee_graph, &target_id) {
            if meta.inline {
                let entry_id = graph.entry_id.clone();
                let target = format!("{base_id}_{entry_id}");
                match graph.node(&entry_id) {
                    Some(entry_node) => {
                        self.lines.push(format!("{target}{}", node_shape(entry_node)));
                    }
                    None => self.lines.push(format!("{target}[\"start\"]")),
                }
                self.remember_target(&callee_key, &target);
                target_id = Some(target);
            } else {
                let prefix = format!("{base_id}_");
                let entry = self.render_sub_graph(graph, &prefix, &child_prefix);
                self.remember_target(&callee_key, &entry);
                target_id = Some(entry);
            }
        }
        if !skip_edge && target_id.is_none() {
            let target = format!("{base_id}_stub");
            let display = meta.callee_display.as_deref().unwrap_or("");
            let label = if !display.trim().is_empty() {
                display
            } else {
                match meta.callee_body.as_deref() {
                    Some(body) if !body.trim().is_empty() => body,
                    _ => meta.callee.as_str(),
                }
            };
            self.lines.push(format!("{target}[\"{}\"]", escape(label)));
            self.remember_target(&callee_key, &target);
            target_id = Some(target);
        }
        if !skip_edge {
            if let Some(target) = &target_id {
                let edge_key = format!("{source_id}|{target}|{callee_key}");
                if seen.insert(edge_key) {
                    self.lines
                        .push(format!("{source_id} -. \"calls:{base_label}\" .-> {target}"));
                }
            }
        }
    }

    fn remember_target(&mut self, callee_key: &str, target: &str) {
        if self.merge_calls {
            self.merged_targets
                .entry(callee_key.to_owned())
                .or_insert_with(|| target.to_owned());
        }
    }

    /// Renders a callee graph under an id prefix; every node and edge id is
    /// namespaced so inlined graphs can never collide.
    fn render_sub_graph(
        &mut self,
        graph: &ControlFlowGraph,
        prefix: &str,
        call_prefix: &str,
    ) -> String {
        let entry_id = graph.entry_id.clone();
        let entry_target = format!("{prefix}{entry_id}");
        if !self.rendered_graphs.insert(entry_target.clone()) {
            return entry_target;
        }
        let mut edge_touched: FxHashSet<&str> = FxHashSet::default();
        for e in &graph.edges {
            edge_touched.insert(e.from.as_str());
            edge_touched.insert(e.to.as_str());
        }
        self.lines.push(String::new());
        let mut ordered: Vec<&Node> = graph.nodes.iter().collect();
        sort_by_line(&mut ordered);
        let mut rendered: FxHashSet<&str> = FxHashSet::default();
        for node in &ordered {
            // inline-only call nodes never touched by an edge stay hidden
            if node.kind == NodeKind::Call && !edge_touched.contains(node.id.as_str()) {
                continue;
            }
            rendered.insert(node.id.as_str());
            self.lines
                .push(format!("{prefix}{}{}", node.id, node_shape(node)));
        }
        self.lines.push(String::new());
        let node_map: FxHashMap<&str, &Node> =
            graph.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        for edge in &graph.edges {
            if !rendered.contains(edge.from.as_str()) || !rendered.contains(edge.to.as_str()) {
                continue;
            }
            let chain_edge = edge.kind == EdgeKind::Normal
                && is_chain_edge(
                    node_map.get(edge.from.as_str()).copied(),
                    node_map.get(edge.to.as_str()).copied(),
                );
            self.lines.push(format!(
                "{prefix}{}{}{prefix}{}",
                edge.from,
                format_edge(edge, chain_edge),
                edge.to
            ));
        }
        let mut seen = FxHashSet::default();
        for node in &ordered {
            if node.kind != NodeKind::Call {
                continue;
            }
            if let Some(call) = effective_call(node) {
                let source = format!("{prefix}{}", node.id);
                self.render_call(&source, &call, call_prefix, &mut seen);
            }
        }
        entry_target
    }
}
