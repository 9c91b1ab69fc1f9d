//! # Project Patcher CLI
//!
//! This is the binary entry point for the `project-patcher` command-line tool.
//!
//! It parses the command line with `clap`, sets up logging and terminal
//! output, and runs the selected command. The reconciliation logic itself
//! lives in the `project_patcher` library crate.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
