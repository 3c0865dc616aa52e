//! Template module - front end of the pipeline
//!
//! Turns template source into a [`CompilationUnit`] a language handler can
//! compile.
//!
//! ## Syntax
//!
//! - Literal text is emitted verbatim
//! - Statement blocks: `<% code %>` (a line break right after the block is
//!   swallowed so code-only lines leave no blank output line)
//! - Expression blocks: `<%= expr %>` (the following line break is kept)
//! - Directives: `<%@ key value %>` with keys `use`/`using`/`import`,
//!   `language`, `ref`/`reference`/`references`
//! - Includes: `<%@ include NAME %>`, left for the compiled program to resolve
//!   through the include extension point

pub mod directive;
pub mod error;
pub mod parser;
pub mod tokenize;

pub use directive::{Directive, DirectiveKind};
pub use error::SyntaxError;
pub use parser::{parse, split_parts, CompilationUnit, TemplateParser, TemplatePart};
pub use tokenize::{ScanState, Token, TokenKind, Tokenizer};

#[cfg(test)]
mod tests;
