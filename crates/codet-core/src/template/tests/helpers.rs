//! Shared test helpers for template tests

use crate::config::ParserConfig;
use crate::template::{parse, TemplateParser, TokenKind, Tokenizer};

/// Kinds of every token up to and including `End`
pub(super) fn kinds(source: &str) -> Vec<TokenKind> {
    Tokenizer::new(source).map(|t| t.kind).collect()
}

/// Residual code parts of a template parsed with the default configuration
pub(super) fn code_parts(source: &str) -> Vec<String> {
    parse(source).expect("template should parse").code_parts
}

/// Parser configuration that mirrors a `.dll`-based toolchain
pub(super) fn dll_config() -> ParserConfig {
    ParserConfig {
        default_language: "C#v3.5".to_string(),
        default_imports: vec!["System".to_string(), "System.Text".to_string()],
        library_suffix: ".dll".to_string(),
    }
}

/// Parse with [`dll_config`]
pub(super) fn parse_with_dll_config(
    source: &str,
) -> Result<crate::template::CompilationUnit, crate::template::SyntaxError> {
    TemplateParser::with_config(source, &dll_config()).parse()
}
