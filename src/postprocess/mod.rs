//! # Post-Processors
//!
//! A post-processor is a named, in-place transform over a built directory.
//! The workspace metadata lists the processors to run, and [`run`] applies
//! them in that order after the clean directory is populated.
//!
//! Each invocation is independent. Whether a failure stops the remaining
//! processors is decided by the caller through [`OnFailure`].
//!
//! ## Built-in post-processors
//!
//! - [`unpack`]: extracts `.zip`, `.tar`, `.tar.gz` and `.tgz` archives in place.
//! - [`notebook`]: strips outputs and execution counts from Jupyter notebooks.

pub mod notebook;
pub mod unpack;

use std::path::Path;

use log::{info, warn};

use crate::error::{Error, Result};
use crate::registry::Registrar;

/// A named transform applied to a directory in place.
pub trait PostProcessor: Send + Sync {
    fn process(&self, dir: &Path) -> Result<()>;
}

impl<F> PostProcessor for F
where
    F: Fn(&Path) -> Result<()> + Send + Sync,
{
    fn process(&self, dir: &Path) -> Result<()> {
        self(dir)
    }
}

/// What [`run`] does when a post-processor cannot be found or fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnFailure {
    /// Stop and return the error.
    #[default]
    Abort,
    /// Record the error and try the next post-processor.
    Continue,
}

/// The outcome of a [`run`] that did not abort.
#[derive(Debug, Default)]
pub struct PostProcessReport {
    /// Post-processors that completed, in order.
    pub applied: Vec<String>,
    /// Post-processors that could not be found or failed.
    pub failed: Vec<(String, Error)>,
}

impl PostProcessReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run the named post-processors over `dir`, in order.
pub fn run(
    registrar: &Registrar,
    names: &[String],
    dir: &Path,
    on_failure: OnFailure,
) -> Result<PostProcessReport> {
    let mut report = PostProcessReport::default();

    for name in names {
        let result = registrar
            .post_processor(name)
            .and_then(|post_processor| {
                info!("Running post-processor '{}' on {}", name, dir.display());
                post_processor.process(dir)
            });

        match result {
            Ok(()) => report.applied.push(name.clone()),
            Err(e) => match on_failure {
                OnFailure::Abort => return Err(e),
                OnFailure::Continue => {
                    warn!("Post-processor '{}' failed: {}", name, e);
                    report.failed.push((name.clone(), e));
                }
            },
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn registrar() -> Registrar {
        let mut registrar = Registrar::new();
        registrar
            .register_post_processor("touch", |dir: &Path| -> Result<()> {
                fs::write(dir.join("touched"), "yes")?;
                Ok(())
            })
            .unwrap();
        registrar
            .register_post_processor("fail", |_dir: &Path| -> Result<()> {
                Err(Error::PostProcessor {
                    name: "fail".to_string(),
                    message: "always fails".to_string(),
                })
            })
            .unwrap();
        registrar
            .add_post_processor_missing_message("lint", "Install the lint plugin")
            .unwrap();
        registrar
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_run_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let report = run(
            &registrar(),
            &names(&["touch"]),
            temp_dir.path(),
            OnFailure::Abort,
        )
        .unwrap();

        assert!(report.is_success());
        assert_eq!(report.applied, ["touch"]);
        assert!(temp_dir.path().join("touched").exists());
    }

    #[test]
    fn test_abort_stops_at_first_failure() {
        let temp_dir = TempDir::new().unwrap();
        let err = run(
            &registrar(),
            &names(&["fail", "touch"]),
            temp_dir.path(),
            OnFailure::Abort,
        )
        .unwrap_err();

        assert!(matches!(err, Error::PostProcessor { .. }));
        assert!(!temp_dir.path().join("touched").exists());
    }

    #[test]
    fn test_continue_attempts_every_processor() {
        let temp_dir = TempDir::new().unwrap();
        let report = run(
            &registrar(),
            &names(&["fail", "lint", "unknown", "touch"]),
            temp_dir.path(),
            OnFailure::Continue,
        )
        .unwrap();

        assert_eq!(report.applied, ["touch"]);
        assert_eq!(report.failed.len(), 3);
        assert!(matches!(report.failed[1].1, Error::MissingPlugin { .. }));
        assert!(matches!(report.failed[2].1, Error::NotRegistered { .. }));
        assert!(temp_dir.path().join("touched").exists());
    }

    #[test]
    fn test_missing_message_is_surfaced() {
        let temp_dir = TempDir::new().unwrap();
        let err = run(
            &registrar(),
            &names(&["lint"]),
            temp_dir.path(),
            OnFailure::Abort,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Install the lint plugin"));
    }
}
