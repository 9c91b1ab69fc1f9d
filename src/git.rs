//! Git command wrappers used by the `git` provider

use std::fs;
use std::path::Path;
use std::process::Command;

use log::debug;

use crate::error::{Error, Result};

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Clone `url` into `target_dir`, which must not exist or be empty.
    fn clone_repository(&self, url: &str, target_dir: &Path) -> Result<()>;

    /// Check out `reference` (a branch, commit or tag) inside `repo_dir`.
    fn checkout(&self, url: &str, repo_dir: &Path, reference: &str) -> Result<()>;
}

/// The default implementation of `GitOperations`, which runs the system
/// `git` command.
///
/// Using the system command picks up:
/// - SSH keys from ~/.ssh/
/// - Git credential helpers
/// - Personal access tokens
/// - Any authentication configured in ~/.gitconfig
pub struct SystemGit;

impl GitOperations for SystemGit {
    fn clone_repository(&self, url: &str, target_dir: &Path) -> Result<()> {
        clone(url, target_dir)
    }

    fn checkout(&self, url: &str, repo_dir: &Path, reference: &str) -> Result<()> {
        checkout(url, repo_dir, reference)
    }
}

/// Clone a repository with full history so any commit can be checked out.
pub fn clone(url: &str, target_dir: &Path) -> Result<()> {
    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    debug!("git clone {} {}", url, target_dir.display());
    let output = Command::new("git")
        .args(["clone", "--quiet", url])
        .arg(target_dir)
        .output()
        .map_err(|e| Error::GitClone {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);

        // Common auth failures get a longer explanation
        let message = if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("Could not read from remote repository")
        {
            format!(
                "Authentication failed. Make sure you have access to the repository.\n\
                For private repos, ensure you have:\n\
                - SSH key added to ssh-agent\n\
                - Git credentials configured\n\
                - Personal access token set up\n\
                Error: {}",
                stderr
            )
        } else {
            stderr.trim().to_string()
        };

        return Err(Error::GitClone {
            url: url.to_string(),
            message,
        });
    }

    Ok(())
}

/// Check out a branch, commit or tag in an existing clone.
pub fn checkout(url: &str, repo_dir: &Path, reference: &str) -> Result<()> {
    let command = format!("checkout {}", reference);
    debug!("git -C {} {}", repo_dir.display(), command);

    let output = Command::new("git")
        .arg("-C")
        .arg(repo_dir)
        .args(["checkout", "--quiet", reference])
        .output()
        .map_err(|e| Error::GitCommand {
            command: command.clone(),
            url: url.to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(Error::GitCommand {
            command,
            url: url.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}
