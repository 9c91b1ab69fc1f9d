//! # Init Command Implementation
//!
//! This module implements the `init` subcommand, which writes a new
//! `project_metadata.json` into the workspace.
//!
//! ## Functionality
//!
//! - **Flags**: one source from `--git`, `--url` or `--path`, placed under
//!   `--dir`, plus any number of `--post-processor` names
//! - **Interactive**: prompts for one or more sources and the post-processors
//! - **Force Mode**: overwrites an existing metadata document when specified

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Select};

use project_patcher::metadata::{self, WorkspaceMetadata};
use project_patcher::output::OutputConfig;
use project_patcher::registry::Registrar;
use project_patcher::source::git::{GitSource, ReferenceKind, REFERENCE_KINDS};
use project_patcher::source::path::PathSource;
use project_patcher::source::url::UrlSource;
use project_patcher::source::{self, SourceDescriptor, DEFAULT_DIR};

use super::{DirArgs, Session};

/// Create a new project_metadata.json
#[derive(Args, Debug)]
pub struct InitArgs {
    #[command(flatten)]
    pub dirs: DirArgs,

    /// Clone a git repository
    #[arg(long, value_name = "URL", conflicts_with_all = ["url", "path"])]
    pub git: Option<String>,

    /// Branch to check out
    #[arg(long, requires = "git", conflicts_with_all = ["commit", "tag"])]
    pub branch: Option<String>,

    /// Commit to check out
    #[arg(long, requires = "git", conflicts_with = "tag")]
    pub commit: Option<String>,

    /// Tag to check out
    #[arg(long, requires = "git")]
    pub tag: Option<String>,

    /// Download a single file
    #[arg(long, value_name = "URL", conflicts_with = "path")]
    pub url: Option<String>,

    /// File name for the download (defaults to the last URL segment)
    #[arg(long, requires = "url")]
    pub filename: Option<String>,

    /// Copy a local file or directory
    #[arg(long, value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Subdirectory of the clean directory the source populates
    #[arg(long, value_name = "DIR", default_value = DEFAULT_DIR)]
    pub dir: String,

    /// Post-processor to run over the clean directory (repeatable)
    #[arg(long = "post-processor", value_name = "NAME")]
    pub post_processors: Vec<String>,

    /// Prompt for the sources and post-processors
    #[arg(short, long, conflicts_with_all = ["git", "url", "path"])]
    pub interactive: bool,

    /// Overwrite an existing metadata document
    #[arg(short, long)]
    pub force: bool,
}

/// Execute the `init` command.
pub fn execute(args: InitArgs, output: &OutputConfig) -> Result<()> {
    let session = Session::open(&args.dirs)?;
    let path = metadata::metadata_path(&session.workspace);

    if path.exists() && !args.force {
        bail!(
            "'{}' already exists. Use --force to overwrite.",
            path.display()
        );
    }

    let workspace_metadata = if args.interactive {
        prompt_metadata(&session.registrar)?
    } else {
        metadata_from_args(&args)?
    };

    for name in &workspace_metadata.post_processors {
        if let Err(e) = session.registrar.post_processor(name) {
            output.warn(e);
        }
    }

    metadata::write_to_file(&session.registrar, &workspace_metadata, &path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    output.success(format!("Created {}", path.display()));
    output.detail("Run `project-patcher setup` to build the workspace");
    Ok(())
}

/// Build the metadata described by the command-line flags.
fn metadata_from_args(args: &InitArgs) -> Result<WorkspaceMetadata> {
    let source: Box<dyn SourceDescriptor> = if let Some(repository) = &args.git {
        let reference = [
            (ReferenceKind::Branch, &args.branch),
            (ReferenceKind::Commit, &args.commit),
            (ReferenceKind::Tag, &args.tag),
        ]
        .into_iter()
        .find_map(|(kind, reference)| reference.as_deref().map(|r| (kind, r)));

        let source = GitSource::new(repository, &args.dir);
        Box::new(match reference {
            Some((kind, reference)) => source.with_reference(kind, reference),
            None => source,
        })
    } else if let Some(url) = &args.url {
        if let Some(filename) = &args.filename {
            source::url::validate_filename(filename)?;
        }
        Box::new(UrlSource::new(url, args.filename.clone(), &args.dir))
    } else if let Some(path) = &args.path {
        Box::new(PathSource::new(path.clone(), &args.dir))
    } else {
        bail!("No source given. Pass --git, --url or --path, or use --interactive.");
    };

    metadata::validate_dir(source.dir(), source.kind())?;

    let mut workspace_metadata = WorkspaceMetadata::new(vec![source]);
    workspace_metadata.post_processors = args.post_processors.clone();
    Ok(workspace_metadata)
}

/// Ask for sources and post-processors on the terminal.
fn prompt_metadata(registrar: &Registrar) -> Result<WorkspaceMetadata> {
    let theme = ColorfulTheme::default();
    let kinds = [
        source::git::NAME,
        source::url::NAME,
        source::path::NAME,
    ];

    let mut sources: Vec<Box<dyn SourceDescriptor>> = Vec::new();
    loop {
        let kind = Select::with_theme(&theme)
            .with_prompt("Source type")
            .items(&kinds)
            .default(0)
            .interact()?;

        let dir = loop {
            let dir: String = Input::with_theme(&theme)
                .with_prompt("Directory inside the clean directory")
                .default(DEFAULT_DIR.to_string())
                .interact_text()?;
            match metadata::validate_dir(&dir, kinds[kind]) {
                Ok(()) => break dir,
                Err(e) => println!("{}", e),
            }
        };

        let source: Box<dyn SourceDescriptor> = match kinds[kind] {
            source::git::NAME => {
                let repository: String = Input::with_theme(&theme)
                    .with_prompt("Repository URL")
                    .interact_text()?;
                let choices = ["default branch", "branch", "commit", "tag"];
                let choice = Select::with_theme(&theme)
                    .with_prompt("Check out")
                    .items(&choices)
                    .default(0)
                    .interact()?;
                let source = GitSource::new(repository.trim(), &dir);
                if choice == 0 {
                    Box::new(source)
                } else {
                    let kind = REFERENCE_KINDS[choice - 1];
                    let reference: String = Input::with_theme(&theme)
                        .with_prompt(format!("{} name", kind))
                        .interact_text()?;
                    Box::new(source.with_reference(kind, reference.trim()))
                }
            }
            source::url::NAME => {
                let url: String = Input::with_theme(&theme)
                    .with_prompt("Download URL")
                    .interact_text()?;
                let filename: String = Input::with_theme(&theme)
                    .with_prompt("File name (leave empty to use the URL)")
                    .allow_empty(true)
                    .interact_text()?;
                let filename = Some(filename.trim().to_string()).filter(|f| !f.is_empty());
                if let Some(filename) = &filename {
                    source::url::validate_filename(filename)?;
                }
                Box::new(UrlSource::new(url.trim(), filename, &dir))
            }
            _ => {
                let path: String = Input::with_theme(&theme)
                    .with_prompt("Local file or directory")
                    .interact_text()?;
                Box::new(PathSource::new(path.trim(), &dir))
            }
        };
        sources.push(source);

        let another = Confirm::with_theme(&theme)
            .with_prompt("Add another source?")
            .default(false)
            .interact()?;
        if !another {
            break;
        }
    }

    let available = registrar.available_post_processors();
    let selected = if available.is_empty() {
        Vec::new()
    } else {
        MultiSelect::with_theme(&theme)
            .with_prompt("Post-processors to run (space to toggle)")
            .items(&available)
            .interact()?
    };

    let mut workspace_metadata = WorkspaceMetadata::new(sources);
    workspace_metadata.post_processors = selected
        .into_iter()
        .map(|index| available[index].to_string())
        .collect();
    Ok(workspace_metadata)
}
