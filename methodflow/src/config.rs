mod loader;
mod models;

use std::path::Path;

pub use models::{Config, MethodflowConfig};

impl Config {
    /// Loads configuration from default locations (`.methodflow.toml` in the
    /// current directory or any ancestor).
    #[must_use]
    pub fn load() -> Self {
        Self::load_from_path(Path::new("."))
    }

    /// Loads configuration starting from a specific path and traversing up.
    #[must_use]
    pub fn load_from_path(path: &Path) -> Self {
        loader::load_from_path(path)
    }
}
