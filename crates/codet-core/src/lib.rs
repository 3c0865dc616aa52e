// Core modules
pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod include;
pub mod template;

// Re-export commonly used types
pub use context::{ExecutionContext, InProcess, IsolatedRunner, UnwindIsolation};
pub use error::{CodetError, Result};
pub use handler::{
    CompilationError, CompiledArtifact, Diagnostic, HandlerInput, HandlerRegistry,
    LanguageHandler, StateType,
};
pub use include::{IncludeRequest, IncludeResolver, StaticIncludes};
