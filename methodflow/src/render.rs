//! Diagram rendering: [`ControlFlowGraph`] -> Mermaid flowchart text.

mod mermaid;

use serde::{Deserialize, Serialize};

use crate::ir::ControlFlowGraph;

pub use mermaid::render;

/// Flowchart layout direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Top to bottom.
    #[default]
    Td,
    /// Left to right.
    Lr,
    /// Bottom to top.
    Bt,
    /// Right to left.
    Rl,
}

impl Direction {
    /// Mermaid direction keyword.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Td => "TD",
            Direction::Lr => "LR",
            Direction::Bt => "BT",
            Direction::Rl => "RL",
        }
    }
}

/// Rendering options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderOptions {
    /// Layout direction.
    pub direction: Direction,
    /// Reuse one rendered subgraph/leaf per distinct callee signature
    /// across the whole render.
    pub merge_calls: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Td,
            merge_calls: true,
        }
    }
}

/// Convenience wrapper rendering with default options.
#[must_use]
pub fn render_default(graph: &ControlFlowGraph) -> String {
    render(graph, &RenderOptions::default())
}
