//! Parse command - show what the parser extracts from a template

use anyhow::{Result, anyhow};
use colored::Colorize;
use codet_core::template::TemplateParser;
use std::path::Path;

use crate::context::Context;
use crate::output::print_json;

/// Print language, imports, references and code parts
///
/// # Arguments
///
/// * `template` - Template file
/// * `config` - Explicit configuration file, if any
/// * `json` - Output as JSON
/// * `verbose` - Enable verbose output if true
pub fn run(template: &Path, config: Option<&Path>, json: bool, verbose: bool) -> Result<()> {
    let ctx = Context::new(template, config)?;

    if verbose {
        eprintln!("{} Parsing {}", "→".cyan(), ctx.template.display());
    }

    let unit = TemplateParser::with_config(&ctx.content, &ctx.config.parser)
        .parse()
        .map_err(|e| anyhow!("{}: {}", ctx.template.display(), e))?;

    if json {
        print_json(&serde_json::to_string_pretty(&unit)?)?;
        return Ok(());
    }

    let list = |items: &std::collections::BTreeSet<String>| {
        if items.is_empty() {
            "(none)".to_string()
        } else {
            items.iter().cloned().collect::<Vec<_>>().join(", ")
        }
    };

    println!("{} {}", "Language:".bold(), unit.language);
    println!("{} {}", "Imports:".bold(), list(&unit.imports));
    println!("{} {}", "References:".bold(), list(&unit.references));
    println!("{} {}", "Code parts:".bold(), unit.code_parts.len());
    for (index, part) in unit.code_parts.iter().enumerate() {
        println!("  [{}] {:?}", index, part);
    }

    Ok(())
}
