use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::constants::CONFIG_FILENAME;

#[derive(Debug, Deserialize, Default, Clone)]
/// Top-level configuration struct.
pub struct Config {
    #[serde(default)]
    /// The main configuration section.
    pub throwstrip: ThrowstripConfig,
    /// The path to the configuration file this was loaded from.
    /// Set during `load_from_path`, `None` if using defaults or programmatic config.
    #[serde(skip)]
    pub config_file_path: Option<std::path::PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone)]
/// Defaults for a run. Every field can be overridden on the command line.
pub struct ThrowstripConfig {
    /// Method signature pattern, e.g. `com.example.A foo(..)`.
    pub method_pattern: Option<String>,
    /// Fully-qualified exception type to remove.
    pub exception_type: Option<String>,
    /// Whether overriding methods are rewritten too.
    pub match_overrides: Option<bool>,
    /// List of folders to exclude.
    pub exclude_folders: Option<Vec<String>>,
    /// List of folders to include even when excluded by default.
    pub include_folders: Option<Vec<String>>,
}

impl Config {
    /// Loads configuration from the current directory or one of its parents.
    #[must_use]
    pub fn load() -> Self {
        Self::load_from_path(Path::new("."))
    }

    /// Loads configuration starting from a specific path and traversing up.
    ///
    /// A file that exists but does not parse is skipped with a warning, and the
    /// search continues in the parent directory.
    #[must_use]
    pub fn load_from_path(path: &Path) -> Self {
        let mut current = path.to_path_buf();
        if current.is_file() {
            current.pop();
        }

        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                match fs::read_to_string(&candidate)
                    .map_err(|e| e.to_string())
                    .and_then(|content| toml::from_str::<Config>(&content).map_err(|e| e.to_string()))
                {
                    Ok(mut config) => {
                        tracing::debug!(path = %candidate.display(), "loaded configuration");
                        config.config_file_path = Some(candidate);
                        return config;
                    }
                    Err(err) => {
                        tracing::warn!(path = %candidate.display(), error = %err, "ignoring unreadable configuration");
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        Config::default()
    }
}
