/// Collapses all whitespace runs in `raw` to single spaces and trims.
///
/// Labels are built from source snippets which may span several lines;
/// diagram text wants them on one line.
#[must_use]
pub fn collapse_ws(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapses whitespace and truncates to `max` characters with an ellipsis.
///
/// `max < 0` disables truncation.
#[must_use]
pub fn safe_label(raw: &str, max: i32) -> String {
    let single_line = collapse_ws(raw);
    if max >= 0 {
        #[allow(clippy::cast_sign_loss)]
        let max = max as usize;
        if single_line.chars().count() > max {
            let truncated: String = single_line.chars().take(max).collect();
            return format!("{truncated}...");
        }
    }
    single_line
}

/// Extracts the first sentence of a doc comment, collapsed to one line.
///
/// Returns `None` when the comment has no usable description text.
#[must_use]
pub fn doc_summary(doc: &str) -> Option<String> {
    let desc = collapse_ws(
        &doc.lines()
            .map(|l| {
                l.trim_start()
                    .trim_start_matches("/**")
                    .trim_start_matches('*')
                    .trim_end_matches("*/")
            })
            .collect::<Vec<_>>()
            .join(" "),
    );
    if desc.is_empty() {
        return None;
    }
    match desc.find('.') {
        Some(dot) if dot > 0 => Some(desc[..=dot].trim().to_owned()),
        _ => Some(desc),
    }
}

/// Line-indexed view over a method's surrounding source text.
///
/// The extractor only needs it for one thing: deciding whether a blank
/// source line separates two statements, which blocks folding them.
#[derive(Debug, Clone)]
pub struct SourceText {
    lines: Vec<String>,
}

impl SourceText {
    /// Splits `source` into 1-indexed lines.
    #[must_use]
    pub fn new(source: &str) -> Self {
        Self {
            lines: source.lines().map(str::to_owned).collect(),
        }
    }

    /// Returns `true` when 1-indexed `line` exists and holds only whitespace.
    #[must_use]
    pub fn is_blank_line(&self, line: u32) -> bool {
        let idx = line.checked_sub(1).map(|l| l as usize);
        idx.and_then(|i| self.lines.get(i))
            .is_some_and(|l| l.trim().is_empty())
    }

    /// Returns `true` when any line strictly between `a` and `b` is blank.
    #[must_use]
    pub fn has_blank_between(&self, a: u32, b: u32) -> bool {
        if b <= a + 1 {
            return false;
        }
        (a + 1..b).any(|line| self.is_blank_line(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_label_collapses_and_truncates() {
        assert_eq!(safe_label("a  b\n   c", -1), "a b c");
        assert_eq!(safe_label("abcdef", 4), "abcd...");
        assert_eq!(safe_label("abcd", 4), "abcd");
    }

    #[test]
    fn doc_summary_takes_first_sentence() {
        assert_eq!(
            doc_summary("Finds the answer. Then explains it."),
            Some("Finds the answer.".to_owned())
        );
        assert_eq!(doc_summary("   "), None);
        assert_eq!(
            doc_summary("* no trailing dot here"),
            Some("no trailing dot here".to_owned())
        );
    }

    #[test]
    fn blank_line_detection() {
        let src = SourceText::new("int a;\n\nint b;\nint c;");
        assert!(src.is_blank_line(2));
        assert!(src.has_blank_between(1, 3));
        assert!(!src.has_blank_between(3, 4));
        assert!(!src.has_blank_between(3, 3));
    }
}
