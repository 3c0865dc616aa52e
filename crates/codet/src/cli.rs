//! CLI command structure using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "codet")]
#[command(version, about = "Compile and render code templates", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: nearest codet.toml above the template)
    #[arg(short, long, global = true, env = "CODET_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the language, imports, references and code parts of a template
    Parse {
        /// Template file
        template: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the program generated for a template
    Source {
        /// Template file
        template: PathBuf,

        #[command(flatten)]
        state: StateArgs,
    },

    /// Render a template to stdout
    Render {
        /// Template file
        template: PathBuf,

        #[command(flatten)]
        state: StateArgs,

        /// Content for an include directive (e.g., header=parts/header.html)
        #[arg(short, long = "include", value_name = "NAME=FILE")]
        includes: Vec<String>,
    },
}

#[derive(clap::Args)]
pub struct StateArgs {
    /// State file (.json or .toml)
    #[arg(short, long)]
    pub state: Option<PathBuf>,

    /// Name the state is bound to in the template; empty exposes each
    /// top-level field as its own variable
    #[arg(short, long, default_value = "state")]
    pub param: String,
}
