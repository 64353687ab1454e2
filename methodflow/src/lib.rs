//! `methodflow` turns the body of a single method into a control-flow
//! diagram.
//!
//! The pipeline has two halves:
//!
//! 1. [`extract`](crate::extract) walks a method's statement tree (the
//!    [`ast`] types, supplied by a host frontend) and builds a
//!    [`ControlFlowGraph`](crate::ir::ControlFlowGraph): nodes for actions,
//!    decisions, loops, calls, returns and throws, plus typed edges.
//!    Resolved calls can be recursively inlined up to a configurable depth,
//!    and a post-pass folds chains of trivial nodes.
//! 2. [`render`](crate::render) serializes the graph as Mermaid flowchart
//!    text: blank merge points are spliced out, linear edge runs are
//!    compacted, and call metadata becomes dashed `calls:N` annotations.
//!
//! ```
//! use methodflow::ast::{Block, Method, NoopResolver, ReturnStmt, Statement};
//! use methodflow::options::ExtractOptions;
//! use methodflow::render::{self, RenderOptions};
//!
//! let method = Method {
//!     name: "answer".into(),
//!     body: Some(Block {
//!         statements: vec![Statement::Return(ReturnStmt {
//!             value: None,
//!             text: "return;".into(),
//!             line: 2,
//!         })],
//!     }),
//!     line: 1,
//!     ..Method::default()
//! };
//! let graph = methodflow::extract::extract(&method, &ExtractOptions::default(), &NoopResolver);
//! let text = render::render(&graph, &RenderOptions::default());
//! assert!(text.starts_with("%%{init:"));
//! ```

/// Syntax facade: the statement/expression tree a host frontend supplies.
pub mod ast;
/// Loads extraction/render defaults from a `.methodflow.toml` file.
pub mod config;
/// Compiled regexes and fixed tables shared across modules.
pub mod constants;
/// Flow extraction: statement tree -> control-flow graph.
pub mod extract;
/// Graph IR: nodes, edges and the immutable `ControlFlowGraph`.
pub mod ir;
/// Extraction options and their parent/child normalization.
pub mod options;
/// Diagram rendering: control-flow graph -> Mermaid flowchart text.
pub mod render;
/// Label and source-text helpers.
pub mod utils;
