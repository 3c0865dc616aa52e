//! Configuration loading (`codet.toml`)

pub mod consts;
pub mod model;

pub use model::{Config, HandlerConfig, ParserConfig};

use crate::error::{CodetError, Result};
use std::fs;
use std::path::{Path, PathBuf};

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            CodetError::ConfigParse(format!("failed to read {}: {}", path.display(), e))
        })?;
        let mut config = Self::from_toml_str(&text)?;

        // library_dir is relative to the file that declared it
        if let (Some(dir), Some(base)) = (&config.handler.library_dir, path.parent()) {
            if dir.is_relative() {
                config.handler.library_dir = Some(base.join(dir));
            }
        }

        Ok(config)
    }

    /// Find `codet.toml` in `start` or any parent directory
    pub fn find_file(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(consts::CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Load the nearest `codet.toml`, or the defaults when none exists
    pub fn discover(start: &Path) -> Result<Self> {
        match Self::find_file(start) {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.parser.default_language, "Lua5.4");
        assert_eq!(config.parser.library_suffix, ".lua");
        assert_eq!(config.parser.default_imports, vec!["string", "table", "codet"]);
        assert!(config.handler.library_dir.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml_str(
            r#"
[parser]
library_suffix = ".dll"

[handler]
memory_limit = 1024
"#,
        )
        .unwrap();

        assert_eq!(config.parser.library_suffix, ".dll");
        assert_eq!(config.parser.default_language, "Lua5.4");
        assert_eq!(config.handler.memory_limit, Some(1024));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = Config::from_toml_str("[parser\nfoo = ");
        assert!(matches!(result, Err(CodetError::ConfigParse(_))));
    }

    #[test]
    fn test_discover_walks_up_and_resolves_library_dir() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("codet.toml"),
            "[handler]\nlibrary_dir = \"lib\"\n",
        )
        .unwrap();
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let config = Config::discover(&nested).unwrap();
        assert_eq!(config.handler.library_dir, Some(temp.path().join("lib")));
    }

    #[test]
    fn test_discover_without_file_returns_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::discover(temp.path()).unwrap();
        assert_eq!(config.parser, ParserConfig::default());
    }

    #[test]
    fn test_runtime_dir_prefers_configured_dir() {
        let handler = HandlerConfig {
            library_dir: Some(PathBuf::from("/opt/lib")),
            memory_limit: None,
        };
        assert_eq!(handler.runtime_dir(), Some(PathBuf::from("/opt/lib")));
        assert!(HandlerConfig::default().runtime_dir().is_some());
    }
}
