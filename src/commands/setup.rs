//! Setup command implementation
//!
//! The setup command rebuilds a workspace from its metadata:
//! 1. Load the metadata, or import it from a path or URL
//! 2. Build the clean directory (reused unless the cache is invalidated)
//! 3. Run the post-processors over a freshly built clean directory
//! 4. Rebuild the working directory from clean, output and patches

use anyhow::{Context, Result};
use clap::Args;

use project_patcher::metadata;
use project_patcher::network::HttpDownloader;
use project_patcher::output::OutputConfig;
use project_patcher::postprocess::OnFailure;
use project_patcher::workspace::{self, CleanBuild};

use super::{DirArgs, Session};

/// Arguments for the setup command
#[derive(Args, Debug)]
pub struct SetupArgs {
    #[command(flatten)]
    pub dirs: DirArgs,

    /// Import project_metadata.json from a local path or an HTTP(S) URL
    #[arg(long, value_name = "PATH_OR_URL")]
    pub import: Option<String>,

    /// Delete and rebuild the clean directory
    #[arg(long)]
    pub invalidate_cache: bool,

    /// Keep going when a post-processor is missing or fails
    #[arg(long)]
    pub keep_going: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the setup command
pub fn execute(args: SetupArgs, output: &OutputConfig) -> Result<()> {
    let output = output.quiet(args.quiet);
    let session = Session::open(&args.dirs)?;
    let dirs = &session.dirs;

    let workspace_metadata = metadata::read_metadata(
        &session.registrar,
        &session.workspace,
        args.import.as_deref(),
        &HttpDownloader::default(),
    )
    .context("Failed to load workspace metadata")?;

    output.step(format!("Building clean directory {}", dirs.clean.display()));
    let on_failure = if args.keep_going {
        OnFailure::Continue
    } else {
        OnFailure::Abort
    };
    let clean = workspace::build_clean(
        &session.registrar,
        &workspace_metadata,
        &dirs.clean,
        args.invalidate_cache,
        on_failure,
    )
    .context("Failed to build the clean directory")?;

    match clean {
        CleanBuild::Cached => {
            output.detail("Using the existing copy (pass --invalidate-cache to rebuild)");
        }
        CleanBuild::Built(report) => {
            for name in &report.applied {
                output.detail(format!("Ran post-processor '{}'", name));
            }
            for (name, e) in &report.failed {
                output.warn(format!("Post-processor '{}' skipped: {}", name, e));
            }
        }
    }

    output.step(format!("Building working directory {}", dirs.working.display()));
    let build = workspace::build_working(&dirs.clean, &dirs.working, &dirs.patches, &dirs.output)
        .context("Failed to build the working directory")?;

    output.success(format!(
        "{} is ready ({} files, {} output files, {} patches applied)",
        dirs.working.display(),
        build.clean_files,
        build.output_files,
        build.patches_applied
    ));
    Ok(())
}
