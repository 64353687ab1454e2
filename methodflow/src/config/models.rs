use serde::Deserialize;

use crate::options::ExtractOptions;
use crate::render::{Direction, RenderOptions};

#[derive(Debug, Deserialize, Default, Clone)]
/// Top-level configuration struct.
pub struct Config {
    #[serde(default)]
    /// The main configuration section.
    pub methodflow: MethodflowConfig,
    /// The path to the configuration file this was loaded from.
    /// `None` when using defaults or programmatic config.
    #[serde(skip)]
    pub config_file_path: Option<std::path::PathBuf>,
}

/// Configuration options, all optional so a file only overrides what it names.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct MethodflowConfig {
    /// Keep fluent chains as one node.
    pub fold_fluent_calls: Option<bool>,
    /// Merge nested same-receiver calls into their parent node.
    pub fold_nested_calls: Option<bool>,
    /// Merge adjacent trivial statements into one node.
    pub fold_sequential_calls: Option<bool>,
    /// Allow setter runs to merge.
    pub fold_sequential_setters: Option<bool>,
    /// Allow getter runs to merge.
    pub fold_sequential_getters: Option<bool>,
    /// Allow constructor runs to merge.
    pub fold_sequential_ctors: Option<bool>,
    /// Inlining budget for platform-package callees.
    pub jdk_api_depth: Option<i32>,
    /// Ternary expansion depth.
    pub ternary_expand_level: Option<i32>,
    /// Inlining budget for project callees.
    pub call_depth: Option<i32>,
    /// Label call nodes with doc-comment summaries.
    pub use_doc_labels: Option<bool>,
    /// Maximum label length in characters.
    pub label_max_length: Option<i32>,
    /// Skip patterns replacing the built-in defaults.
    pub skip_patterns: Option<Vec<String>>,
    /// Reuse one rendered subgraph per distinct callee.
    pub merge_calls: Option<bool>,
    /// Flowchart direction (`td` or `lr`).
    pub direction: Option<Direction>,
}

impl MethodflowConfig {
    /// Extraction options with this file's overrides applied to `base`.
    #[must_use]
    pub fn extract_options(&self, base: ExtractOptions) -> ExtractOptions {
        let mut opts = base;
        if let Some(v) = self.fold_fluent_calls {
            opts.fold_fluent_calls = v;
        }
        if let Some(v) = self.fold_nested_calls {
            opts.fold_nested_calls = v;
        }
        if let Some(v) = self.fold_sequential_calls {
            opts.fold_sequential_calls = v;
        }
        if let Some(v) = self.fold_sequential_setters {
            opts.fold_sequential_setters = v;
        }
        if let Some(v) = self.fold_sequential_getters {
            opts.fold_sequential_getters = v;
        }
        if let Some(v) = self.fold_sequential_ctors {
            opts.fold_sequential_ctors = v;
        }
        if let Some(v) = self.jdk_api_depth {
            opts.jdk_api_depth = v;
        }
        if let Some(v) = self.ternary_expand_level {
            opts.ternary_expand_level = v;
        }
        if let Some(v) = self.call_depth {
            opts.call_depth = v;
        }
        if let Some(v) = self.use_doc_labels {
            opts.use_doc_labels = v;
        }
        if let Some(v) = self.label_max_length {
            opts.label_max_length = v;
        }
        if let Some(v) = &self.skip_patterns {
            opts.skip_patterns.clone_from(v);
        }
        opts.normalized()
    }

    /// Render options with this file's overrides applied to `base`.
    #[must_use]
    pub fn render_options(&self, base: RenderOptions) -> RenderOptions {
        let mut opts = base;
        if let Some(v) = self.merge_calls {
            opts.merge_calls = v;
        }
        if let Some(v) = self.direction {
            opts.direction = v;
        }
        opts
    }
}
