use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE: &str = "phpcanon.toml";
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 256;

/// Knobs the parser consults. Read-only for the duration of a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest allowed nesting of blocks and expressions.
    pub max_nesting_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{}: could not read file: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: invalid syntax: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{}: {msg}", path.display())]
    Invalid { path: PathBuf, msg: String },
}

// ---- TOML deserialization types ----

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    #[serde(default)]
    parse: TomlParse,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlParse {
    max_nesting_depth: Option<usize>,
}

/// Settings from `phpcanon.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub parse: ParseOptions,
    /// File the settings came from; `None` when defaults are in effect.
    pub source: Option<PathBuf>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml(&content, path)
    }

    /// Parse `content`; `path` is only used in error messages.
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw: TomlConfig = toml::from_str(content)
            .map_err(|source| ConfigError::Toml { path: path.to_path_buf(), source })?;

        let mut parse = ParseOptions::default();
        if let Some(depth) = raw.parse.max_nesting_depth {
            if depth == 0 {
                return Err(ConfigError::Invalid {
                    path: path.to_path_buf(),
                    msg: "parse.max_nesting_depth must be at least 1".to_string(),
                });
            }
            parse.max_nesting_depth = depth;
        }
        Ok(Self { parse, source: Some(path.to_path_buf()) })
    }

    /// Load the nearest `phpcanon.toml` at or above `start_dir`, or defaults
    /// when there is none.
    pub fn discover(start_dir: &Path) -> Result<Self, ConfigError> {
        match find_config_walk(start_dir) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }
}

/// Walk from `start_dir` up to a `.git` boundary or the filesystem root.
fn find_config_walk(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = start_dir.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if dir.join(".git").exists() {
            return None;
        }
        if !dir.pop() {
            return None;
        }
    }
}
