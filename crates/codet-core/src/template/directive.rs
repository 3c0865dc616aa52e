//! Directive classification and configuration extraction

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

use super::error::SyntaxError;
use super::parser::{CompilationUnit, TemplatePart, BLOCK_END};
use crate::config::consts::language;
use crate::config::ParserConfig;

/// Start marker of a directive block
pub const DIRECTIVE_START: &str = "<%@";

const INCLUDE_PREFIX: &str = "include ";

/// One configuration directive: `<%@ key value %>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    pub key: String,
    pub value: String,
}

/// How a `<%@ ... %>` part is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `<%@ include NAME %>`, resolved by the compiled program at render time
    Include,
    /// Any other directive, consumed by the parser
    Configuration,
}

/// Text between `<%@` and `%>`, trimmed
pub fn interior(text: &str) -> &str {
    text.strip_prefix(DIRECTIVE_START)
        .map(|rest| rest.strip_suffix(BLOCK_END).unwrap_or(rest))
        .unwrap_or("")
        .trim()
}

/// Classify a part; `None` for literals and ordinary code blocks
pub fn classify(part: &TemplatePart) -> Option<DirectiveKind> {
    classify_text(&part.text)
}

/// [`classify`] for the text of a code part
pub fn classify_text(text: &str) -> Option<DirectiveKind> {
    if !text.starts_with(DIRECTIVE_START) {
        return None;
    }

    let body = interior(text);
    let is_include = body
        .get(..INCLUDE_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(INCLUDE_PREFIX));

    if is_include {
        Some(DirectiveKind::Include)
    } else {
        Some(DirectiveKind::Configuration)
    }
}

/// The name an include directive asks for, with surrounding quotes removed
pub fn include_name(text: &str) -> Option<&str> {
    let body = interior(text);
    let rest = body.get(INCLUDE_PREFIX.len()..)?;
    let name = rest.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|q| name.strip_prefix(*q).and_then(|n| n.strip_suffix(*q)))
        .unwrap_or(name);
    Some(unquoted)
}

/// Split a configuration directive into its `key value` pair
pub fn parse_directive(part: &TemplatePart) -> Result<Directive, SyntaxError> {
    let body = interior(&part.text);
    let tokens: Vec<&str> = body.split_whitespace().collect();

    match tokens.as_slice() {
        [key, value] => Ok(Directive {
            key: key.to_string(),
            value: value.to_string(),
        }),
        _ => Err(SyntaxError::InvalidDirective {
            directive: body.to_string(),
            position: part.position,
            line: part.line,
        }),
    }
}

/// Map known language aliases onto canonical identifiers
pub fn normalize_language(value: &str) -> String {
    match value.to_uppercase().as_str() {
        "C#" | "C#V3.5" | "C#3.5" => language::CSHARP_3_5.to_string(),
        "C#V4.0" | "C#4" | "C#V4" | "C#4.0" => language::CSHARP_4_0.to_string(),
        "LUA" | "LUA5.4" | "LUA54" => language::LUA_5_4.to_string(),
        _ => value.to_string(),
    }
}

/// Append `suffix` unless `reference` already carries it (case-insensitive)
pub fn with_library_suffix(reference: &str, suffix: &str) -> String {
    let has_suffix = Path::new(reference)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .is_some_and(|ext| ext.eq_ignore_ascii_case(suffix));

    if has_suffix || suffix.is_empty() {
        reference.to_string()
    } else {
        format!("{}{}", reference, suffix)
    }
}

/// Second pass: separate configuration directives from the code parts and
/// apply them
pub fn extract(
    parts: Vec<TemplatePart>,
    config: &ParserConfig,
) -> Result<CompilationUnit, SyntaxError> {
    let mut language = config.default_language.clone();
    let mut imports: BTreeSet<String> = config.default_imports.iter().cloned().collect();
    let mut references = BTreeSet::new();
    let mut directives = Vec::new();
    let mut code_parts = Vec::new();

    for part in &parts {
        if classify(part) != Some(DirectiveKind::Configuration) {
            code_parts.push(part.text.clone());
            continue;
        }

        let directive = parse_directive(part)?;
        match directive.key.as_str() {
            "use" | "using" | "import" => {
                imports.insert(directive.value.clone());
            }
            "language" => {
                language = normalize_language(&directive.value);
            }
            "ref" | "reference" | "references" => {
                references.insert(with_library_suffix(&directive.value, &config.library_suffix));
            }
            other => {
                return Err(SyntaxError::UnknownDirective {
                    key: other.to_string(),
                    directive: interior(&part.text).to_string(),
                    position: part.position,
                    line: part.line,
                });
            }
        }
        directives.push(directive);
    }

    Ok(CompilationUnit {
        language,
        imports,
        references,
        code_parts,
        directives,
        parts,
    })
}
