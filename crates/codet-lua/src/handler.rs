//! Lua 5.4 language handler

use mlua::{Function, Lua, LuaOptions, StdLib, Table, Value};
use std::fs;
use std::path::{Path, PathBuf};

use codet_core::config::HandlerConfig;
use codet_core::config::consts::library;
use codet_core::handler::{
    CompiledArtifact, Diagnostic, HandlerInput, LanguageHandler, LibraryReference,
};
use codet_core::Result;

use crate::artifact::LuaArtifact;
use crate::codegen;

/// Chunk name of generated programs; error messages start with `template:N:`
pub const CHUNK_NAME: &str = "template";

/// Globals removed from every sandbox
const BLOCKED_GLOBALS: &[&str] = &["load", "loadfile", "dofile"];

/// Compiles templates into sandboxed Lua functions
#[derive(Debug, Clone, Default)]
pub struct LuaHandler {
    config: HandlerConfig,
}

impl LuaHandler {
    pub fn new(config: HandlerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }
}

impl LanguageHandler for LuaHandler {
    fn generate_program(&self, input: &HandlerInput<'_>) -> Result<String> {
        codegen::generate(input)
    }

    fn compile_program(
        &self,
        language: &str,
        program: &str,
        references: &[LibraryReference],
    ) -> std::result::Result<Box<dyn CompiledArtifact>, Vec<Diagnostic>> {
        tracing::debug!("Compiling {} program in a fresh sandbox", language);

        let lua = sandbox(self.config.memory_limit).map_err(|e| single(&e))?;
        let support = support_library(&lua).map_err(|e| single(&e))?;
        let modules = lua.create_table().map_err(|e| single(&e))?;
        modules
            .set(library::SUPPORT, support.clone())
            .map_err(|e| single(&e))?;

        let mut diagnostics = Vec::new();
        for reference in references.iter().filter(|r| !r.is_host()) {
            if let Err(diagnostic) = load_reference(&lua, &modules, reference) {
                diagnostics.push(diagnostic);
            }
        }

        let chunk = lua.load(program).set_name(format!("={}", CHUNK_NAME));
        let chunk = match chunk.into_function() {
            Ok(chunk) => chunk,
            Err(e) => {
                diagnostics.push(diagnostic_from(&e));
                return Err(diagnostics);
            }
        };
        if !diagnostics.is_empty() {
            return Err(diagnostics);
        }

        let entry: Function = chunk.call(modules).map_err(|e| single(&e))?;
        Ok(Box::new(LuaArtifact::new(lua, entry, support)))
    }

    fn runtime_dir(&self) -> Option<PathBuf> {
        self.config.runtime_dir()
    }
}

/// Fresh Lua state with only the string, table, math and utf8 libraries
pub fn sandbox(memory_limit: Option<usize>) -> mlua::Result<Lua> {
    let lua = Lua::new_with(
        StdLib::STRING | StdLib::TABLE | StdLib::MATH | StdLib::UTF8,
        LuaOptions::default(),
    )?;

    let globals = lua.globals();
    for name in BLOCKED_GLOBALS {
        globals.set(*name, Value::Nil)?;
    }

    if let Some(limit) = memory_limit {
        lua.set_memory_limit(limit)?;
    }

    Ok(lua)
}

/// The `codet` table generated programs import. `include` is replaced for
/// the duration of each render.
fn support_library(lua: &Lua) -> mlua::Result<Table> {
    let support = lua.create_table()?;
    support.set("version", env!("CARGO_PKG_VERSION"))?;
    support.set(
        "include",
        lua.create_function(|_, _name: String| -> mlua::Result<String> {
            Err(mlua::Error::runtime("include is only available while rendering"))
        })?,
    )?;
    Ok(support)
}

/// Run a referenced Lua file and register its result under the file stem
fn load_reference(
    lua: &Lua,
    modules: &Table,
    reference: &LibraryReference,
) -> std::result::Result<(), Diagnostic> {
    let fail = |message: String| Diagnostic::error(format!("reference '{}': {}", reference.name, message));

    let source = fs::read_to_string(&reference.path)
        .map_err(|e| fail(format!("cannot read {}: {}", reference.path.display(), e)))?;
    let value: Value = lua
        .load(source)
        .set_name(format!("@{}", reference.path.display()))
        .call(())
        .map_err(|e| fail(first_line(&e.to_string()).to_string()))?;

    let key = module_key(&reference.path);
    let value = if value.is_nil() { Value::Boolean(true) } else { value };
    modules
        .set(key.as_str(), value)
        .map_err(|e| fail(e.to_string()))?;

    tracing::debug!("Loaded reference '{}' as module '{}'", reference.name, key);
    Ok(())
}

fn module_key(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

fn single(err: &mlua::Error) -> Vec<Diagnostic> {
    vec![diagnostic_from(err)]
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or(text)
}

/// Convert a Lua error into a diagnostic, lifting `template:N:` into the
/// line field
pub fn diagnostic_from(err: &mlua::Error) -> Diagnostic {
    let text = err.to_string();
    let message = first_line(&text);
    match split_location(message) {
        Some((line, rest)) => Diagnostic::error(rest).at_line(line),
        None => Diagnostic::error(message),
    }
}

/// `"template:3: unexpected symbol"` → `(3, "unexpected symbol")`
fn split_location(message: &str) -> Option<(usize, &str)> {
    let prefix = format!("{}:", CHUNK_NAME);
    let start = message.find(&prefix)? + prefix.len();
    let rest = &message[start..];
    let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let line = rest[..digits].parse().ok()?;
    let tail = rest[digits..].trim_start_matches(':').trim_start();
    Some((line, tail))
}
