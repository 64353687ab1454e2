mod regexes;

pub use regexes::{get_ctor_label_re, get_getter_label_re, get_qualifier_re, get_setter_label_re};

/// Config file looked up by [`crate::config`].
pub const CONFIG_FILENAME: &str = ".methodflow.toml";

/// Package prefixes treated as platform/standard-library code.
///
/// Calls into these are governed by `jdk_api_depth` instead of `call_depth`.
pub const PLATFORM_PACKAGE_PREFIXES: &[&str] = &["java.", "javax.", "jdk.", "sun.", "com.sun."];

/// Default skip patterns: trivial accessors nobody wants a call edge for.
///
/// Matched as full regexes against `Qualified#name(paramTypes)` signatures.
pub const DEFAULT_SKIP_PATTERNS: &[&str] = &[
    r"^.*[.#]get[A-Z]\w*\(\)$",
    r"^.*[.#]set[A-Z]\w*\([^(),]+\)$",
    r"^.*[.#]is[A-Z]\w*\(\)$",
    r"^.*[.#]toString\(\)$",
    r"^.*[.#]hashCode\(\)$",
];
