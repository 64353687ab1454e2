use regex::Regex;
use std::sync::OnceLock;

/// Returns the compiled regex for setter-style call labels (`x.setFoo(v)`).
pub fn get_setter_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| {
        Regex::new(r"^.*\bset[A-Z].*\(.*\)$").expect("Invalid setter label regex pattern")
    })
}

/// Returns the compiled regex for getter-style call labels (`x.getFoo()`, `x.isBar()`).
pub fn get_getter_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| {
        Regex::new(r"^.*\b(?:get|is)[A-Z].*\(.*\)$").expect("Invalid getter label regex pattern")
    })
}

/// Returns the compiled regex for constructor-style labels (`x = new Foo(..)`).
pub fn get_ctor_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| {
        Regex::new(r"^(?:.*=\s*new\s+.+\(.*\)|\bnew\s+.+\(.*\))$")
            .expect("Invalid ctor label regex pattern")
    })
}

/// Returns the compiled regex extracting the receiver qualifier of a call label.
///
/// For `builder.append(x)` the first capture group is `builder`.
pub fn get_qualifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| {
        Regex::new(r"([A-Za-z_][\w$.]*)\.[A-Za-z_][\w$]*\(")
            .expect("Invalid qualifier regex pattern")
    })
}
