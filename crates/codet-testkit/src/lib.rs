//! Test utilities for codet
//!
//! This crate provides shared testing utilities used across the codet workspace:
//! temporary directories, template fixtures, and mock language handlers that
//! exercise the handler contract without a real compiler backend.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;

use codet_core::handler::{
    CompiledArtifact, Diagnostic, HandlerInput, LanguageHandler, LibraryReference,
};
use codet_core::include::{IncludeResolver, resolve_include};
use codet_core::template::directive::{self, DirectiveKind};
use codet_core::template::parser::BLOCK_START;
use codet_core::{HandlerRegistry, Result};
use serde_json::Value;
use tempfile::TempDir;

/// Language identifier the mock handlers are registered under
pub const MOCK_LANGUAGE: &str = "Mock";

/// Creates a temporary directory within `.tmp/` at the project root
///
/// # Panics
///
/// Panics if the current directory is unavailable or `.tmp/` cannot be
/// created.
///
/// # Examples
///
/// ```rust
/// use codet_testkit::temp_dir_in_workspace;
///
/// let temp = temp_dir_in_workspace();
/// let file_path = temp.path().join("page.tmpl");
/// std::fs::write(&file_path, "Hello").unwrap();
/// ```
pub fn temp_dir_in_workspace() -> TempDir {
    let workspace_root = std::env::current_dir().expect("Failed to get current directory");

    let tmp_base = workspace_root.join(".tmp");
    std::fs::create_dir_all(&tmp_base).expect("Failed to create .tmp directory");

    TempDir::new_in(&tmp_base).expect("Failed to create temporary directory in .tmp/")
}

/// Write `content` to `dir/name` and return the path
pub fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    std::fs::write(&path, content).expect("Failed to write fixture");
    path
}

/// Registry with [`EchoHandler`] under [`MOCK_LANGUAGE`] and
/// [`FailingHandler`] under `"Failing"`
pub fn mock_registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry
        .register_default::<EchoHandler>(MOCK_LANGUAGE)
        .register_default::<FailingHandler>("Failing");
    registry
}

/// Handler whose program is the code parts as a JSON array and whose
/// artifact writes literal parts, resolves includes, and renders every
/// other code part as `[code]`
///
/// A state with `"panic": true` makes the artifact panic; `"silent": true`
/// makes it return no output.
#[derive(Default)]
pub struct EchoHandler;

impl LanguageHandler for EchoHandler {
    fn generate_program(&self, input: &HandlerInput<'_>) -> Result<String> {
        Ok(serde_json::to_string_pretty(input.code_parts)?)
    }

    fn compile_program(
        &self,
        _language: &str,
        program: &str,
        _references: &[LibraryReference],
    ) -> std::result::Result<Box<dyn CompiledArtifact>, Vec<Diagnostic>> {
        let parts: Vec<String> = serde_json::from_str(program).map_err(|e| {
            vec![Diagnostic::error(format!("program is not a part list: {}", e)).at_line(e.line())]
        })?;
        Ok(Box::new(EchoArtifact { parts }))
    }
}

/// Artifact produced by [`EchoHandler`]
pub struct EchoArtifact {
    parts: Vec<String>,
}

impl CompiledArtifact for EchoArtifact {
    fn render(
        &self,
        state: &Value,
        includes: Option<Arc<dyn IncludeResolver>>,
    ) -> Result<Option<String>> {
        if state.get("panic").and_then(Value::as_bool) == Some(true) {
            panic!("echo artifact asked to panic");
        }
        if state.get("silent").and_then(Value::as_bool) == Some(true) {
            return Ok(None);
        }

        let mut out = String::new();
        for part in &self.parts {
            if !part.starts_with(BLOCK_START) {
                out.push_str(part);
                continue;
            }

            let is_include = directive::classify_text(part) == Some(DirectiveKind::Include);
            match directive::include_name(part) {
                Some(name) if is_include => {
                    out.push_str(&resolve_include(includes.as_deref(), name)?);
                }
                _ => out.push_str("[code]"),
            }
        }
        Ok(Some(out))
    }
}

/// Handler that always fails compilation with two diagnostics
#[derive(Default)]
pub struct FailingHandler;

impl LanguageHandler for FailingHandler {
    fn generate_program(&self, input: &HandlerInput<'_>) -> Result<String> {
        Ok(format!("-- failing program for {}", input.state_type.name))
    }

    fn compile_program(
        &self,
        _language: &str,
        _program: &str,
        _references: &[LibraryReference],
    ) -> std::result::Result<Box<dyn CompiledArtifact>, Vec<Diagnostic>> {
        Err(vec![
            Diagnostic::error("mock backend rejected the program").at_line(1),
            Diagnostic::warning("mock backend warning"),
        ])
    }
}

/// Handler that records the references it was asked to compile against,
/// then compiles like [`EchoHandler`]
pub struct RecordingHandler {
    pub seen: Arc<Mutex<Vec<LibraryReference>>>,
    pub runtime_dir: Option<PathBuf>,
}

impl RecordingHandler {
    /// Registry with a recording handler under [`MOCK_LANGUAGE`]; the
    /// returned list fills up on every compile
    pub fn registry(runtime_dir: Option<PathBuf>) -> (HandlerRegistry, Arc<Mutex<Vec<LibraryReference>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let shared = Arc::clone(&seen);

        let mut registry = HandlerRegistry::new();
        registry.register(MOCK_LANGUAGE, move || {
            Box::new(RecordingHandler {
                seen: Arc::clone(&shared),
                runtime_dir: runtime_dir.clone(),
            })
        });
        (registry, seen)
    }
}

impl LanguageHandler for RecordingHandler {
    fn generate_program(&self, input: &HandlerInput<'_>) -> Result<String> {
        EchoHandler.generate_program(input)
    }

    fn compile_program(
        &self,
        language: &str,
        program: &str,
        references: &[LibraryReference],
    ) -> std::result::Result<Box<dyn CompiledArtifact>, Vec<Diagnostic>> {
        self.seen
            .lock()
            .expect("recording lock poisoned")
            .extend(references.iter().cloned());
        EchoHandler.compile_program(language, program, references)
    }

    fn runtime_dir(&self) -> Option<PathBuf> {
        self.runtime_dir.clone()
    }
}
