use std::fs;
use std::path::Path;

use crate::constants::CONFIG_FILENAME;

use super::models::Config;

pub(super) fn load_from_path(path: &Path) -> Config {
    let mut current = path.to_path_buf();
    if current.is_file() {
        current.pop();
    }

    loop {
        let methodflow_toml = current.join(CONFIG_FILENAME);
        if methodflow_toml.exists() {
            if let Ok(content) = fs::read_to_string(&methodflow_toml) {
                match toml::from_str::<Config>(&content) {
                    Ok(mut config) => {
                        config.config_file_path = Some(methodflow_toml);
                        return config;
                    }
                    Err(err) => {
                        tracing::warn!(path = %methodflow_toml.display(), %err, "ignoring unreadable config file");
                    }
                }
            }
        }

        if !current.pop() {
            break;
        }
    }

    Config::default()
}
