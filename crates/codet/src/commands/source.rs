//! Source command - print the program generated for a template

use anyhow::{Result, anyhow};
use colored::Colorize;
use codet_core::CodetError;
use std::path::Path;

use crate::cli::StateArgs;
use crate::context::{Context, load_state};
use crate::output::print_raw;

/// Print the generated program; on a compilation failure print it anyway,
/// followed by the diagnostics on stderr
pub fn run(template: &Path, config: Option<&Path>, args: &StateArgs, verbose: bool) -> Result<()> {
    let ctx = Context::new(template, config)?;
    let state = load_state(args.state.as_deref())?;
    let mut exec = ctx.execution_context();

    match ctx.compile(&mut exec, &state, args) {
        Ok(()) => {
            if verbose {
                eprintln!("{} Compiled {}", "✓".green().bold(), ctx.template.display());
            }
            print_raw(exec.generated_source().unwrap_or_default())?;
            Ok(())
        }
        Err(CodetError::Compilation(err)) => {
            print_raw(&err.program)?;
            for diagnostic in &err.diagnostics {
                eprintln!("{} {}", "✗".red().bold(), diagnostic);
            }
            Err(anyhow!(
                "compilation of {} failed with {} diagnostic(s)",
                ctx.template.display(),
                err.diagnostics.len()
            ))
        }
        Err(e) => Err(e.into()),
    }
}
