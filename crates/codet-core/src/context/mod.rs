//! Execution context: owns one compiled template and renders it
//!
//! Compiled template code runs through an [`IsolatedRunner`], so the host
//! decides how far the code is kept away from its own state. The default
//! [`UnwindIsolation`] stops panics at the boundary; the Lua handler adds a
//! sandboxed VM per artifact on top.

mod runner;

pub use runner::{InProcess, IsolatedRunner, RenderTask, UnwindIsolation};

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::config::ParserConfig;
use crate::error::{CodetError, Result};
use crate::handler::{CompiledArtifact, HandlerInput, HandlerRegistry, StateType};
use crate::include::IncludeResolver;
use crate::template::TemplateParser;

/// Holder of at most one compiled template
pub struct ExecutionContext {
    runner: Box<dyn IsolatedRunner>,
    parser_config: ParserConfig,
    includes: Option<Arc<dyn IncludeResolver>>,
    artifact: Option<Box<dyn CompiledArtifact>>,
    source: Option<String>,
    language: Option<String>,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionContext {
    /// Context using [`UnwindIsolation`] and the default parser configuration
    pub fn new() -> Self {
        Self {
            runner: Box::new(UnwindIsolation),
            parser_config: ParserConfig::default(),
            includes: None,
            artifact: None,
            source: None,
            language: None,
        }
    }

    pub fn with_runner(mut self, runner: impl IsolatedRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    pub fn with_parser_config(mut self, config: ParserConfig) -> Self {
        self.parser_config = config;
        self
    }

    /// Resolver for `include` directives evaluated during [`Self::execute`]
    pub fn set_include_resolver(&mut self, resolver: Arc<dyn IncludeResolver>) {
        self.includes = Some(resolver);
    }

    pub fn clear_include_resolver(&mut self) {
        self.includes = None;
    }

    /// Parse `content`, pick its handler from `registry`, and compile it
    ///
    /// Any previously compiled template is discarded first. On a
    /// compilation failure the generated program stays available through
    /// [`Self::generated_source`].
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a state type without a name
    /// - `Syntax` when the template does not parse
    /// - `UnsupportedLanguage` when no handler is registered for the
    ///   template's language
    /// - `Compilation` when the handler rejects the generated program
    pub fn compile(
        &mut self,
        content: &str,
        registry: &HandlerRegistry,
        state_type: &StateType,
        parameter_name: &str,
    ) -> Result<()> {
        self.artifact = None;
        self.source = None;
        self.language = None;

        if state_type.name.trim().is_empty() {
            return Err(CodetError::invalid_argument(
                "state_type",
                "type name must not be blank",
            ));
        }

        let unit = TemplateParser::with_config(content, &self.parser_config).parse()?;

        let handler =
            registry
                .create(&unit.language)
                .ok_or_else(|| CodetError::UnsupportedLanguage {
                    requested: unit.language.clone(),
                    supported: registry.languages(),
                })?;

        let input = HandlerInput::from_unit(&unit, state_type, parameter_name);
        match handler.rewrite_and_compile(&input) {
            Ok(compiled) => {
                tracing::info!("Compiled {} template", unit.language);
                self.source = Some(compiled.program);
                self.artifact = Some(compiled.artifact);
                self.language = Some(unit.language);
                Ok(())
            }
            Err(CodetError::Compilation(err)) => {
                self.source = Some(err.program.clone());
                Err(CodetError::Compilation(err))
            }
            Err(e) => Err(e),
        }
    }

    /// Render the compiled template against `state`
    ///
    /// # Errors
    ///
    /// - `NotCompiled` before a successful [`Self::compile`]
    /// - `StateSerialization` when `state` cannot be serialized
    /// - `UnresolvedInclude` or `RenderFailed` from the template itself
    pub fn execute<S: Serialize + ?Sized>(&self, state: &S) -> Result<String> {
        let value = serde_json::to_value(state)?;
        self.execute_value(&value)
    }

    /// [`Self::execute`] for an already serialized state
    pub fn execute_value(&self, state: &Value) -> Result<String> {
        let artifact = self.artifact.as_ref().ok_or(CodetError::NotCompiled)?;
        let includes = self.includes.clone();

        let output = self
            .runner
            .run(&mut || artifact.render(state, includes.clone()))?;
        Ok(output.unwrap_or_default())
    }

    /// Program text produced by the last compile, successful or not
    pub fn generated_source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Language of the compiled template
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn is_compiled(&self) -> bool {
        self.artifact.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_before_compile_is_not_compiled() {
        let context = ExecutionContext::new();
        assert!(!context.is_compiled());
        assert!(context.generated_source().is_none());
        assert!(matches!(context.execute(&()), Err(CodetError::NotCompiled)));
    }

    #[test]
    fn test_blank_state_type_is_rejected_before_parsing() {
        let mut context = ExecutionContext::new();
        let result = context.compile("<% unterminated", &HandlerRegistry::new(), &StateType::new(" ", "app"), "");
        assert!(matches!(result, Err(CodetError::InvalidArgument { name: "state_type", .. })));
    }

    #[test]
    fn test_syntax_error_comes_before_language_lookup() {
        let mut context = ExecutionContext::new();
        let result = context.compile("<% unterminated", &HandlerRegistry::new(), &StateType::new("Row", "app"), "");
        assert!(matches!(result, Err(CodetError::Syntax(_))));
    }

    #[test]
    fn test_unknown_language_names_requested_identifier() {
        let mut context = ExecutionContext::new();
        let result = context.compile(
            "<%@ language Ruby2 %>x",
            &HandlerRegistry::new(),
            &StateType::new("Row", "app"),
            "row",
        );
        match result {
            Err(CodetError::UnsupportedLanguage { requested, supported }) => {
                assert_eq!(requested, "Ruby2");
                assert!(supported.is_empty());
            }
            _ => panic!("Expected UnsupportedLanguage error"),
        }
    }
}
