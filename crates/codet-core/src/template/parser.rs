//! Structural parsing: tokens → ordered template parts → compilation unit
//!
//! Parsing runs in two passes. [`split_parts`] is purely structural and knows
//! nothing about directive semantics; [`super::directive::extract`] then
//! classifies the parts and derives the compilation configuration.

use serde::Serialize;
use std::collections::BTreeSet;

use super::directive::{self, Directive};
use super::error::SyntaxError;
use super::tokenize::{Token, TokenKind, Tokenizer};
use crate::config::ParserConfig;

/// Start marker of a code block
pub const BLOCK_START: &str = "<%";
/// End marker of a code block
pub const BLOCK_END: &str = "%>";

/// One literal or code segment of a template, in source order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplatePart {
    /// Verbatim text; code segments include their `<%` and `%>` markers
    pub text: String,
    /// Line break swallowed after a statement block, kept so the source can be
    /// reconstructed
    pub skipped_line_break: Option<String>,
    /// Byte offset of the first character
    pub position: usize,
    /// Line of the first character
    pub line: usize,
}

impl TemplatePart {
    /// True for a `<% ... %>` segment
    pub fn is_code(&self) -> bool {
        self.text.starts_with(BLOCK_START)
    }

    /// True for a `<%@ ... %>` segment
    pub fn is_directive(&self) -> bool {
        self.text.starts_with(directive::DIRECTIVE_START)
    }

    /// Text exactly as it appeared in the source
    pub fn raw_text(&self) -> String {
        match &self.skipped_line_break {
            Some(line_break) => format!("{}{}", self.text, line_break),
            None => self.text.clone(),
        }
    }
}

/// Result of parsing one template: the configuration its directives declare
/// plus the parts a language handler turns into a program
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilationUnit {
    /// Normalized language identifier
    pub language: String,
    /// Default imports plus every declared one
    pub imports: BTreeSet<String>,
    /// Declared library references, suffix applied
    pub references: BTreeSet<String>,
    /// Literals, code blocks and include directives in source order;
    /// configuration directives removed
    pub code_parts: Vec<String>,
    /// Configuration directives, in source order
    pub directives: Vec<Directive>,
    /// Every parsed part, directives included
    #[serde(skip)]
    pub parts: Vec<TemplatePart>,
}

/// Parses template content into a [`CompilationUnit`]
pub struct TemplateParser<'a> {
    content: &'a str,
    config: ParserConfig,
}

impl<'a> TemplateParser<'a> {
    /// Create a parser with the default configuration
    pub fn new(content: &'a str) -> Self {
        Self::with_config(content, &ParserConfig::default())
    }

    /// Create a parser with explicit defaults for language, imports and suffix
    pub fn with_config(content: &'a str, config: &ParserConfig) -> Self {
        Self {
            content,
            config: config.clone(),
        }
    }

    /// Parse the whole template
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError`] for an unterminated code block, a malformed
    /// directive or an unknown directive key.
    pub fn parse(&self) -> Result<CompilationUnit, SyntaxError> {
        let parts = split_parts(self.content)?;
        tracing::debug!("Split template into {} parts", parts.len());

        let unit = directive::extract(parts, &self.config)?;
        tracing::debug!(
            language = %unit.language,
            imports = unit.imports.len(),
            references = unit.references.len(),
            code_parts = unit.code_parts.len(),
            "Extracted template configuration"
        );
        Ok(unit)
    }
}

/// Convenience function to parse a template with the default configuration
pub fn parse(content: &str) -> Result<CompilationUnit, SyntaxError> {
    TemplateParser::new(content).parse()
}

/// Group tokens into literal and code parts
pub fn split_parts(content: &str) -> Result<Vec<TemplatePart>, SyntaxError> {
    let mut tokens = Tokenizer::new(content);
    let mut parts = Vec::new();

    while tokens.has_more() {
        let part = if tokens.peek().kind == TokenKind::CodeBlockStart {
            read_code_block(&mut tokens)?
        } else {
            read_literal(&mut tokens)?
        };
        parts.push(part);
    }

    Ok(parts)
}

/// Read from `<%` through the matching `%>`
fn read_code_block(tokens: &mut Tokenizer<'_>) -> Result<TemplatePart, SyntaxError> {
    let start = tokens.next_token();

    // `<%=` keeps the line break that follows the block
    let skip_line_break = !tokens.peek().is_char('=');

    let mut block = String::from(start.text);
    loop {
        let token = tokens.peek();
        match token.kind {
            TokenKind::Character | TokenKind::LineBreak => {
                block.push_str(token.text);
                tokens.next_token();
            }
            TokenKind::CodeBlockEnd => {
                block.push_str(token.text);
                tokens.next_token();
                break;
            }
            TokenKind::End => {
                return Err(SyntaxError::UnterminatedCodeBlock {
                    position: start.position,
                    line: start.line,
                });
            }
            TokenKind::CodeBlockStart => return Err(unexpected(token)),
        }
    }

    let skipped_line_break = if skip_line_break && tokens.peek().kind == TokenKind::LineBreak {
        Some(tokens.next_token().text.to_string())
    } else {
        None
    };

    Ok(TemplatePart {
        text: block,
        skipped_line_break,
        position: start.position,
        line: start.line,
    })
}

/// Read literal text up to the next `<%` or the end of the source
fn read_literal(tokens: &mut Tokenizer<'_>) -> Result<TemplatePart, SyntaxError> {
    let first = tokens.peek();
    let mut literal = String::new();

    loop {
        let token = tokens.peek();
        match token.kind {
            TokenKind::Character | TokenKind::LineBreak => {
                literal.push_str(token.text);
                tokens.next_token();
            }
            TokenKind::CodeBlockStart | TokenKind::End => break,
            TokenKind::CodeBlockEnd => return Err(unexpected(token)),
        }
    }

    Ok(TemplatePart {
        text: literal,
        skipped_line_break: None,
        position: first.position,
        line: first.line,
    })
}

fn unexpected(token: Token<'_>) -> SyntaxError {
    SyntaxError::UnexpectedToken {
        token: token.text.to_string(),
        position: token.position,
        line: token.line,
    }
}
