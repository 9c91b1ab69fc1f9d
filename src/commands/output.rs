//! Output command implementation
//!
//! Captures the edits made in the working directory: every modified text
//! file becomes a patch, and every new or modified binary file is copied to
//! the output directory. Both directories are regenerated from scratch.

use anyhow::{Context, Result};
use clap::Args;

use project_patcher::output::OutputConfig;
use project_patcher::workspace;

use super::{DirArgs, Session};

/// Arguments for the output command
#[derive(Args, Debug)]
pub struct OutputArgs {
    #[command(flatten)]
    pub dirs: DirArgs,

    /// List every captured file
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the output command
pub fn execute(args: OutputArgs, output: &OutputConfig) -> Result<()> {
    let output = output.quiet(args.quiet);
    let session = Session::open(&args.dirs)?;
    let dirs = &session.dirs;

    output.step(format!(
        "Capturing {} against {}",
        dirs.working.display(),
        dirs.clean.display()
    ));
    let summary = workspace::capture(&dirs.clean, &dirs.working, &dirs.patches, &dirs.output)
        .context("Failed to capture the working directory")?;

    if args.verbose {
        for path in &summary.patched {
            output.detail(format!("patched  {}", path.display()));
        }
        for path in &summary.output {
            output.detail(format!("output   {}", path.display()));
        }
    }

    if summary.is_empty() {
        output.success("No changes against the clean directory");
    } else {
        output.success(format!(
            "Wrote {} patches to {} and {} files to {}",
            summary.patched.len(),
            dirs.patches.display(),
            summary.output.len(),
            dirs.output.display()
        ));
    }
    Ok(())
}
