//! Extraction options.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SKIP_PATTERNS;

/// Knobs controlling flow extraction.
///
/// The fold family is hierarchical: when `fold_sequential_calls` is off,
/// the per-shape sub-folds are forced off too (see [`ExtractOptions::normalized`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExtractOptions {
    /// Keep fluent chains (`a.b().c().d()`) as one node.
    pub fold_fluent_calls: bool,
    /// Merge nested same-receiver calls into their parent node.
    pub fold_nested_calls: bool,
    /// Merge adjacent trivial statements into one node.
    pub fold_sequential_calls: bool,
    /// Allow setter runs to merge.
    pub fold_sequential_setters: bool,
    /// Allow getter runs to merge.
    pub fold_sequential_getters: bool,
    /// Allow constructor runs to merge.
    pub fold_sequential_ctors: bool,
    /// Remaining inlining budget for platform-package callees.
    ///
    /// `0` keeps platform calls as raw text, negative drops them entirely.
    pub jdk_api_depth: i32,
    /// Ternary expansion depth. Negative expands without limit, `0`
    /// keeps ternaries as plain text.
    pub ternary_expand_level: i32,
    /// Remaining inlining budget for project callees. `0` disables
    /// expansion, negative means unlimited.
    pub call_depth: i32,
    /// Label call nodes with the callee's doc-comment summary when present.
    pub use_doc_labels: bool,
    /// Maximum label length in characters; negative disables truncation.
    pub label_max_length: i32,
    /// Full-match regexes over `Qualified#name(paramTypes)` signatures;
    /// matched calls are never expanded.
    pub skip_patterns: Vec<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            fold_fluent_calls: true,
            fold_nested_calls: true,
            fold_sequential_calls: true,
            fold_sequential_setters: true,
            fold_sequential_getters: true,
            fold_sequential_ctors: true,
            jdk_api_depth: 0,
            ternary_expand_level: -1,
            call_depth: 1,
            use_doc_labels: true,
            label_max_length: 80,
            skip_patterns: DEFAULT_SKIP_PATTERNS
                .iter()
                .map(|p| (*p).to_owned())
                .collect(),
        }
    }
}

impl ExtractOptions {
    /// Applies the fold hierarchy: sub-folds cannot outlive their parent.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if !self.fold_sequential_calls {
            self.fold_sequential_setters = false;
            self.fold_sequential_getters = false;
            self.fold_sequential_ctors = false;
        }
        self
    }

    /// Whether any fold flag is on, i.e. the fold pass should run at all.
    #[must_use]
    pub fn any_fold(&self) -> bool {
        self.fold_fluent_calls
            || self.fold_nested_calls
            || self.fold_sequential_calls
            || self.fold_sequential_setters
            || self.fold_sequential_getters
            || self.fold_sequential_ctors
    }

    /// Compiles `skip_patterns` as full-match regexes.
    ///
    /// Invalid patterns are logged and dropped rather than failing the
    /// whole extraction.
    #[must_use]
    pub fn compiled_skip_regexes(&self) -> Vec<Regex> {
        self.skip_patterns
            .iter()
            .filter(|p| !p.trim().is_empty())
            .filter_map(|p| match Regex::new(&format!("^(?:{p})$")) {
                Ok(re) => Some(re),
                Err(err) => {
                    tracing::warn!(pattern = %p, %err, "ignoring invalid skip pattern");
                    None
                }
            })
            .collect()
    }

    /// Budgets for one level deeper, entering `is_jdk` or project code.
    ///
    /// The platform budget only burns down while inside platform code;
    /// a negative project budget never burns down (unlimited).
    #[must_use]
    pub fn descend(&self, is_jdk: bool) -> Self {
        let mut next = self.clone();
        if is_jdk {
            next.jdk_api_depth -= 1;
        }
        if next.call_depth > 0 {
            next.call_depth -= 1;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_disables_sub_folds() {
        let opts = ExtractOptions {
            fold_sequential_calls: false,
            ..ExtractOptions::default()
        }
        .normalized();
        assert!(!opts.fold_sequential_setters);
        assert!(!opts.fold_sequential_getters);
        assert!(!opts.fold_sequential_ctors);
        assert!(opts.fold_fluent_calls);
    }

    #[test]
    fn skip_regexes_are_full_match() {
        let opts = ExtractOptions::default();
        let regexes = opts.compiled_skip_regexes();
        assert!(regexes.iter().any(|r| r.is_match("com.acme.Foo#getBar()")));
        assert!(!regexes
            .iter()
            .any(|r| r.is_match("com.acme.Foo#computeBar(int)")));
    }

    #[test]
    fn invalid_skip_pattern_is_dropped() {
        let opts = ExtractOptions {
            skip_patterns: vec!["(".to_owned(), r".*#toString\(\)".to_owned()],
            ..ExtractOptions::default()
        };
        assert_eq!(opts.compiled_skip_regexes().len(), 1);
    }

    #[test]
    fn descend_burns_budgets() {
        let opts = ExtractOptions {
            call_depth: 2,
            jdk_api_depth: 1,
            ..ExtractOptions::default()
        };
        let project = opts.descend(false);
        assert_eq!(project.call_depth, 1);
        assert_eq!(project.jdk_api_depth, 1);
        let platform = opts.descend(true);
        assert_eq!(platform.jdk_api_depth, 0);

        let unlimited = ExtractOptions {
            call_depth: -1,
            ..ExtractOptions::default()
        };
        assert_eq!(unlimited.descend(false).call_depth, -1);
    }
}
