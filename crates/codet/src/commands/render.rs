//! Render command - compile a template and write its output to stdout

use anyhow::{Result, anyhow};
use colored::Colorize;
use codet_core::{CodetError, StaticIncludes};
use std::path::Path;
use std::sync::Arc;

use crate::cli::StateArgs;
use crate::context::{Context, load_includes, load_state};
use crate::output::print_raw;

/// Render `template` against the state file
///
/// # Arguments
///
/// * `template` - Template file
/// * `config` - Explicit configuration file, if any
/// * `args` - State file and parameter name
/// * `includes` - `NAME=FILE` pairs answering include directives
/// * `verbose` - Enable verbose output if true
pub fn run(
    template: &Path,
    config: Option<&Path>,
    args: &StateArgs,
    includes: &[String],
    verbose: bool,
) -> Result<()> {
    let ctx = Context::new(template, config)?;
    let state = load_state(args.state.as_deref())?;

    let mut table = StaticIncludes::new();
    for (name, content) in load_includes(includes)? {
        table.insert(name, content);
    }

    let mut exec = ctx.execution_context();
    exec.set_include_resolver(Arc::new(table));

    if let Err(e) = ctx.compile(&mut exec, &state, args) {
        if let CodetError::Compilation(err) = &e {
            for diagnostic in &err.diagnostics {
                eprintln!("{} {}", "✗".red().bold(), diagnostic);
            }
        }
        return Err(anyhow!("{}: {}", ctx.template.display(), e));
    }

    if verbose {
        eprintln!("{} Rendering {}", "→".cyan(), ctx.template.display());
    }

    let output = exec.execute_value(&state)?;
    print_raw(&output)?;
    Ok(())
}
