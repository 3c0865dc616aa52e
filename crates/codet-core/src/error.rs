use crate::handler::diagnostic::CompilationError;
use crate::template::error::SyntaxError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodetError {
    // Parse errors
    #[error("TEMPLATE_SYNTAX: {0}")]
    Syntax(#[from] SyntaxError),

    // Compile errors
    #[error(
        "UNSUPPORTED_LANGUAGE: language '{requested}' is not supported as a template language (known: {})",
        .supported.join(", ")
    )]
    UnsupportedLanguage {
        requested: String,
        supported: Vec<String>,
    },

    #[error("COMPILATION_FAILED: {0}")]
    Compilation(#[from] CompilationError),

    // Render errors
    #[error("UNRESOLVED_INCLUDE: include '{name}' was not handled")]
    UnresolvedInclude { name: String },

    #[error("NOT_COMPILED: execution context holds no compiled template")]
    NotCompiled,

    #[error("RENDER_FAILED: {0}")]
    RenderFailed(String),

    #[error("STATE_SERIALIZATION: {0}")]
    StateSerialization(String),

    // Argument errors
    #[error("INVALID_ARGUMENT: {name}: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    // Config errors
    #[error("CONFIG_PARSE_ERROR: {0}")]
    ConfigParse(String),

    // IO errors
    #[error("IO_ERROR: {0}")]
    Io(#[from] std::io::Error),
}

impl CodetError {
    /// Shorthand for [`CodetError::InvalidArgument`]
    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        CodetError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for CodetError {
    fn from(err: serde_json::Error) -> Self {
        CodetError::StateSerialization(err.to_string())
    }
}

impl From<toml::de::Error> for CodetError {
    fn from(err: toml::de::Error) -> Self {
        CodetError::ConfigParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CodetError>;
