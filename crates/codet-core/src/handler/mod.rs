//! Language handler contract
//!
//! A [`LanguageHandler`] turns a parsed template into a program for one
//! target language and compiles it into a [`CompiledArtifact`]. Handlers are
//! looked up by normalized language identifier in a [`HandlerRegistry`].

pub mod diagnostic;
pub mod references;
pub mod registry;
pub mod state;

pub use diagnostic::{CompilationError, Diagnostic, Severity};
pub use references::{resolve_references, LibraryReference, ReferenceOrigin};
pub use registry::{HandlerFactory, HandlerRegistry};
pub use state::StateType;

use serde_json::Value;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::HandlerConfig;
use crate::error::{CodetError, Result};
use crate::include::IncludeResolver;
use crate::template::CompilationUnit;

/// Everything a handler needs to generate a program
#[derive(Debug, Clone, Copy)]
pub struct HandlerInput<'a> {
    pub language: &'a str,
    pub imports: &'a BTreeSet<String>,
    pub references: &'a BTreeSet<String>,
    pub code_parts: &'a [String],
    pub state_type: &'a StateType,
    /// Name the whole state is bound to. Empty means one parameter per
    /// property of `state_type`.
    pub parameter_name: &'a str,
}

impl<'a> HandlerInput<'a> {
    pub fn from_unit(
        unit: &'a CompilationUnit,
        state_type: &'a StateType,
        parameter_name: &'a str,
    ) -> Self {
        Self {
            language: &unit.language,
            imports: &unit.imports,
            references: &unit.references,
            code_parts: &unit.code_parts,
            state_type,
            parameter_name,
        }
    }

    /// True when state properties are exposed as individual parameters
    pub fn is_property_mode(&self) -> bool {
        self.parameter_name.trim().is_empty()
    }
}

/// A compiled template, ready to render
pub trait CompiledArtifact {
    /// Run the render entry point against `state`
    ///
    /// `includes` receives every include request the template makes. `None`
    /// means the artifact produced no output at all.
    fn render(
        &self,
        state: &Value,
        includes: Option<Arc<dyn IncludeResolver>>,
    ) -> Result<Option<String>>;
}

/// Successful compilation: the program text and its artifact
pub struct CompiledProgram {
    pub program: String,
    pub artifact: Box<dyn CompiledArtifact>,
}

/// Capability implemented once per target language
pub trait LanguageHandler {
    /// Turn the parsed template into program text
    fn generate_program(&self, input: &HandlerInput<'_>) -> Result<String>;

    /// Compile `program` against `references`
    ///
    /// Ordinary compilation failures are returned as diagnostics, never as a
    /// panic.
    fn compile_program(
        &self,
        language: &str,
        program: &str,
        references: &[LibraryReference],
    ) -> std::result::Result<Box<dyn CompiledArtifact>, Vec<Diagnostic>>;

    /// Directory relative references are resolved against
    fn runtime_dir(&self) -> Option<PathBuf> {
        HandlerConfig::default().runtime_dir()
    }

    /// Generate, resolve references, and compile
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a blank language or state type name
    /// - `Compilation` carrying the program and diagnostics when the backend
    ///   rejects the program
    /// - whatever [`LanguageHandler::generate_program`] returns
    fn rewrite_and_compile(&self, input: &HandlerInput<'_>) -> Result<CompiledProgram> {
        if input.language.trim().is_empty() {
            return Err(CodetError::invalid_argument("language", "must not be blank"));
        }
        if input.state_type.name.trim().is_empty() {
            return Err(CodetError::invalid_argument(
                "state_type",
                "type name must not be blank",
            ));
        }

        let program = self.generate_program(input)?;
        tracing::debug!("Generated {} bytes of {} program", program.len(), input.language);

        let runtime_dir = self.runtime_dir();
        let references =
            resolve_references(input.state_type, input.references, runtime_dir.as_deref());
        tracing::debug!(
            "Compiling against {} references: {}",
            references.len(),
            references
                .iter()
                .map(|r| r.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        match self.compile_program(input.language, &program, &references) {
            Ok(artifact) => Ok(CompiledProgram { program, artifact }),
            Err(diagnostics) => {
                tracing::debug!("Compilation reported {} diagnostics", diagnostics.len());
                Err(CompilationError::new(program, diagnostics).into())
            }
        }
    }
}
