//! Shared setup for CLI commands

use anyhow::{Context as _, Result, anyhow, bail};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use codet_core::config::Config;
use codet_core::{ExecutionContext, HandlerRegistry, StateType};

use crate::cli::StateArgs;

/// Template, configuration and handlers for one command
pub struct Context {
    pub template: PathBuf,
    pub content: String,
    pub config: Config,
    pub registry: HandlerRegistry,
}

impl Context {
    /// Read the template and load configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The template cannot be read
    /// - The config file cannot be read or parsed
    pub fn new(template: &Path, config_path: Option<&Path>) -> Result<Self> {
        let content = fs::read_to_string(template)
            .with_context(|| format!("Failed to read template {}", template.display()))?;

        let config = match config_path {
            Some(path) => Config::load(path)?,
            None => {
                let start = template
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or(std::env::current_dir()?);
                Config::discover(&start)?
            }
        };

        let mut registry = HandlerRegistry::new();
        codet_lua::register(&mut registry, config.handler.clone());

        Ok(Self {
            template: template.to_path_buf(),
            content,
            config,
            registry,
        })
    }

    /// Execution context configured from `codet.toml`
    pub fn execution_context(&self) -> ExecutionContext {
        ExecutionContext::new().with_parser_config(self.config.parser.clone())
    }

    /// Compile the template for `state` into `exec`
    pub fn compile(
        &self,
        exec: &mut ExecutionContext,
        state: &Value,
        args: &StateArgs,
    ) -> codet_core::Result<()> {
        let state_type = StateType::of_value(state)?;
        exec.compile(&self.content, &self.registry, &state_type, &args.param)
    }
}

/// Read a state file; JSON unless the extension is `.toml`. No file means an
/// empty state.
pub fn load_state(path: Option<&Path>) -> Result<Value> {
    let Some(path) = path else {
        return Ok(Value::Object(Default::default()));
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file {}", path.display()))?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let value = if is_toml {
        let table: toml::Value = toml::from_str(&text)
            .map_err(|e| anyhow!("Invalid TOML in {}: {}", path.display(), e))?;
        serde_json::to_value(table)?
    } else {
        serde_json::from_str(&text)
            .map_err(|e| anyhow!("Invalid JSON in {}: {}", path.display(), e))?
    };

    Ok(value)
}

/// Split `NAME=FILE` include arguments and read each file
pub fn load_includes(args: &[String]) -> Result<Vec<(String, String)>> {
    args.iter()
        .map(|arg| {
            let Some((name, file)) = arg.split_once('=') else {
                bail!("Invalid include '{}': expected NAME=FILE", arg);
            };
            if name.trim().is_empty() {
                bail!("Invalid include '{}': name is empty", arg);
            }
            let content = fs::read_to_string(file)
                .with_context(|| format!("Failed to read include file {}", file))?;
            Ok((name.trim().to_string(), content))
        })
        .collect()
}
