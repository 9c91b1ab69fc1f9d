//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `project-patcher` command-line tool, one file per command.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic by calling into the `project_patcher` library.
//!
//! The workspace-related flags shared by every command live in [`DirArgs`],
//! and [`Session`] turns them into a loaded configuration and a frozen
//! registrar.

pub mod init;
pub mod output;
pub mod plugins;
pub mod setup;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use project_patcher::config::Config;
use project_patcher::plugins::{setup as setup_plugins, ConfiguredMessages, Plugin};
use project_patcher::registry::Registrar;
use project_patcher::workspace::WorkspaceDirs;

/// Workspace location and directory overrides
#[derive(Args, Debug, Clone)]
pub struct DirArgs {
    /// Workspace root holding project_metadata.json
    #[arg(short, long, value_name = "PATH", default_value = ".")]
    pub workspace: PathBuf,

    /// Path to config file (defaults to <workspace>/.project-patcher.toml)
    #[arg(long, value_name = "PATH", env = "PROJECT_PATCHER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Clean directory, relative to the workspace
    #[arg(long, value_name = "PATH")]
    pub clean_dir: Option<PathBuf>,

    /// Working directory, relative to the workspace
    #[arg(long, value_name = "PATH")]
    pub working_dir: Option<PathBuf>,

    /// Patch directory, relative to the workspace
    #[arg(long, value_name = "PATH")]
    pub patch_dir: Option<PathBuf>,

    /// Output directory, relative to the workspace
    #[arg(long, value_name = "PATH")]
    pub output_dir: Option<PathBuf>,
}

impl DirArgs {
    /// Flags for `workspace` with no overrides.
    #[cfg(test)]
    pub fn for_workspace(workspace: &std::path::Path) -> Self {
        Self {
            workspace: workspace.to_path_buf(),
            config: None,
            clean_dir: None,
            working_dir: None,
            patch_dir: None,
            output_dir: None,
        }
    }

    /// Apply the directory flags over the configured layout and root the
    /// result at the workspace.
    pub fn resolve(&self, configured: &WorkspaceDirs) -> WorkspaceDirs {
        let pick = |flag: &Option<PathBuf>, configured: &PathBuf| {
            flag.clone().unwrap_or_else(|| configured.clone())
        };
        WorkspaceDirs {
            clean: pick(&self.clean_dir, &configured.clean),
            working: pick(&self.working_dir, &configured.working),
            patches: pick(&self.patch_dir, &configured.patches),
            output: pick(&self.output_dir, &configured.output),
        }
        .rooted_at(&self.workspace)
    }
}

/// Everything a command needs to operate on one workspace.
pub struct Session {
    pub workspace: PathBuf,
    pub dirs: WorkspaceDirs,
    pub registrar: Registrar,
}

impl Session {
    pub fn open(args: &DirArgs) -> Result<Self> {
        let config = Config::load(&args.workspace, args.config.as_deref())
            .context("Failed to load configuration")?;

        let configured = ConfiguredMessages(&config.missing);
        let external: [&dyn Plugin; 1] = [&configured];
        let registrar = setup_plugins(&external).context("Failed to register plugins")?;

        Ok(Self {
            workspace: args.workspace.clone(),
            dirs: args.resolve(&config.directories),
            registrar,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_defaults() {
        let args = DirArgs::for_workspace(Path::new("/work"));
        let dirs = args.resolve(&WorkspaceDirs::default());
        assert_eq!(dirs.clean, PathBuf::from("/work/_clean"));
        assert_eq!(dirs.working, PathBuf::from("/work/_src"));
        assert_eq!(dirs.patches, PathBuf::from("/work/_patches"));
        assert_eq!(dirs.output, PathBuf::from("/work/_out"));
    }

    #[test]
    fn test_resolve_flags_override_config() {
        let mut args = DirArgs::for_workspace(Path::new("/work"));
        args.patch_dir = Some(PathBuf::from("diffs"));
        let configured = WorkspaceDirs {
            patches: PathBuf::from("from-config"),
            working: PathBuf::from("src"),
            ..WorkspaceDirs::default()
        };

        let dirs = args.resolve(&configured);
        assert_eq!(dirs.patches, PathBuf::from("/work/diffs"));
        assert_eq!(dirs.working, PathBuf::from("/work/src"));
    }

    #[test]
    fn test_session_reads_workspace_config() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(".project-patcher.toml"),
            "[directories]\nworking = \"source\"\n\n[missing.providers]\n\"osf:storage\" = \"Install the OSF plugin\"\n",
        )
        .unwrap();

        let session = Session::open(&DirArgs::for_workspace(temp_dir.path())).unwrap();
        assert_eq!(session.dirs.working, temp_dir.path().join("source"));
        let err = session.registrar.source_builder("osf:storage").err().unwrap();
        assert!(err.to_string().contains("Install the OSF plugin"));
    }

    #[test]
    fn test_session_rejects_bad_config() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".project-patcher.toml"), "not = [toml").unwrap();

        let err = Session::open(&DirArgs::for_workspace(temp_dir.path()))
            .err()
            .unwrap();
        assert!(err.to_string().contains("Failed to load configuration"));
    }
}
