mod cli;
mod commands;
mod context;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Parse { template, json } => {
            commands::parse::run(&template, cli.config.as_deref(), json, cli.verbose)
        }
        Commands::Source { template, state } => {
            commands::source::run(&template, cli.config.as_deref(), &state, cli.verbose)
        }
        Commands::Render {
            template,
            state,
            includes,
        } => commands::render::run(&template, cli.config.as_deref(), &state, &includes, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
