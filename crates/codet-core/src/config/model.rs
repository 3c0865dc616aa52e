use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::consts::{language, library, DEFAULT_IMPORTS};

/// codet.toml schema
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub handler: HandlerConfig,
}

/// Defaults the parser falls back on when directives are absent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParserConfig {
    #[serde(default = "default_language")]
    pub default_language: String,
    #[serde(default = "default_imports")]
    pub default_imports: Vec<String>,
    #[serde(default = "default_library_suffix")]
    pub library_suffix: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_language: default_language(),
            default_imports: default_imports(),
            library_suffix: default_library_suffix(),
        }
    }
}

fn default_language() -> String {
    language::DEFAULT.to_string()
}

fn default_imports() -> Vec<String> {
    DEFAULT_IMPORTS.iter().map(|s| s.to_string()).collect()
}

fn default_library_suffix() -> String {
    library::DEFAULT_SUFFIX.to_string()
}

/// Settings language handlers read when compiling and running artifacts
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Directory relative references resolve against.
    /// `None` means the directory of the running executable.
    #[serde(default)]
    pub library_dir: Option<PathBuf>,

    /// Upper bound in bytes for memory an artifact may allocate
    #[serde(default)]
    pub memory_limit: Option<usize>,
}

impl HandlerConfig {
    /// The directory relative references resolve against
    pub fn runtime_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.library_dir {
            return Some(dir.clone());
        }

        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
    }
}
