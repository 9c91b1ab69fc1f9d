//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;

use project_patcher::output::OutputConfig;

use crate::commands;

/// Project Patcher - Rebuild and re-capture patched project sources
#[derive(Parser, Debug)]
#[command(name = "project-patcher")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new project_metadata.json
    Init(commands::init::InitArgs),

    /// Build the clean and working directories from the metadata
    Setup(commands::setup::SetupArgs),

    /// Capture edits in the working directory as patches and output files
    Output(commands::output::OutputArgs),

    /// List the registered source providers and post-processors
    Plugins(commands::plugins::PluginsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let output = OutputConfig::from_env_and_flag(&self.color);

        match self.command {
            Commands::Init(args) => commands::init::execute(args, &output),
            Commands::Setup(args) => commands::setup::execute(args, &output),
            Commands::Output(args) => commands::output::execute(args, &output),
            Commands::Plugins(args) => commands::plugins::execute(args, &output),
        }
    }
}

fn init_logging(level: &str) {
    // A logger may already be installed when running under tests.
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}
