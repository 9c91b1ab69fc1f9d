//! # Workspace Reconciliation
//!
//! A workspace is four directories:
//!
//! - **clean**: the pristine files, built from the metadata's sources;
//! - **working**: the tree a user edits, always derivable from the other three;
//! - **patches**: one unified diff per modified file, at `<path>.patch`;
//! - **output**: files with no textual patch, copied verbatim.
//!
//! ## Key Components
//!
//! - **`build_clean`**: materializes the sources into the clean directory and
//!   runs the post-processors over it. An existing clean directory is a cache
//!   hit unless invalidated.
//! - **`build_working`**: clean, overlaid with output, overlaid with patches.
//! - **`apply_patches`**: applies every patch under the patch directory to
//!   the matching file of a tree.
//! - **`capture`**: diffs working against clean and regenerates the patch
//!   and output directories from scratch.
//!
//! `build_clean` and `build_working` assemble their result in a hidden
//! sibling directory and move it into place once every step succeeded, so a
//! failure leaves the previous directory untouched.
//!
//! Per-file work in `capture` and `apply_patches` runs on the `rayon` pool.
//! Directory removal and creation always happen before or after it, never
//! during.

use std::fs;
use std::path::{Path, PathBuf};
use std::str;

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

use crate::error::{Error, Result};
use crate::filesystem::{self, copy_file, walk_files, write_file};
use crate::metadata::WorkspaceMetadata;
use crate::patch;
use crate::postprocess::{self, OnFailure, PostProcessReport};
use crate::registry::Registrar;
use crate::source;

/// The four directories of a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceDirs {
    pub clean: PathBuf,
    pub working: PathBuf,
    pub patches: PathBuf,
    pub output: PathBuf,
}

impl Default for WorkspaceDirs {
    fn default() -> Self {
        Self {
            clean: PathBuf::from("_clean"),
            working: PathBuf::from("_src"),
            patches: PathBuf::from("_patches"),
            output: PathBuf::from("_out"),
        }
    }
}

impl WorkspaceDirs {
    /// Resolve relative directories against `root`.
    pub fn rooted_at(&self, root: &Path) -> Self {
        Self {
            clean: root.join(&self.clean),
            working: root.join(&self.working),
            patches: root.join(&self.patches),
            output: root.join(&self.output),
        }
    }
}

/// The outcome of [`build_clean`].
#[derive(Debug)]
pub enum CleanBuild {
    /// The clean directory already existed and was kept.
    Cached,
    /// The clean directory was built from the sources.
    Built(PostProcessReport),
}

/// What [`build_working`] put into the working directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkingBuild {
    pub clean_files: usize,
    pub output_files: usize,
    pub patches_applied: usize,
}

/// What [`capture`] wrote, as paths relative to the working directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureSummary {
    pub patched: Vec<PathBuf>,
    pub output: Vec<PathBuf>,
    pub unchanged: usize,
}

impl CaptureSummary {
    pub fn is_empty(&self) -> bool {
        self.patched.is_empty() && self.output.is_empty()
    }
}

enum Captured {
    Unchanged,
    Patched,
    Output,
}

/// Build the clean directory from `metadata`.
///
/// With `invalidate`, an existing clean directory is deleted first;
/// otherwise it is kept as is. Provider failures are returned unchanged.
pub fn build_clean(
    registrar: &Registrar,
    metadata: &WorkspaceMetadata,
    clean_dir: &Path,
    invalidate: bool,
    on_failure: OnFailure,
) -> Result<CleanBuild> {
    if invalidate && filesystem::remove_dir_if_exists(clean_dir)? {
        info!("Invalidated cached clean directory {}", clean_dir.display());
    }
    if clean_dir.exists() {
        info!("Using cached clean directory {}", clean_dir.display());
        return Ok(CleanBuild::Cached);
    }

    let staging = staging_dir(clean_dir)?;
    for source in &metadata.sources {
        let builder = registrar.source_builder(source.kind())?;
        let target = source::target_dir(source.as_ref(), staging.path());
        fs::create_dir_all(&target)?;
        info!(
            "Building '{}' source into {}",
            source.kind(),
            clean_dir.join(source.dir()).display()
        );
        builder.build(source.as_ref(), staging.path())?;
    }

    let report = postprocess::run(
        registrar,
        &metadata.post_processors,
        staging.path(),
        on_failure,
    )?;
    swap_into_place(staging, clean_dir)?;
    Ok(CleanBuild::Built(report))
}

/// Rebuild the working directory: clean, then output, then patches.
pub fn build_working(
    clean_dir: &Path,
    working_dir: &Path,
    patch_dir: &Path,
    output_dir: &Path,
) -> Result<WorkingBuild> {
    require_dir("clean", clean_dir)?;

    let staging = staging_dir(working_dir)?;
    let mut build = WorkingBuild {
        clean_files: filesystem::copy_tree(clean_dir, staging.path())?,
        ..WorkingBuild::default()
    };
    if output_dir.is_dir() {
        build.output_files = filesystem::copy_tree(output_dir, staging.path())?;
    }
    if patch_dir.is_dir() {
        build.patches_applied = apply_patches(staging.path(), patch_dir)?;
    }

    swap_into_place(staging, working_dir)?;
    info!(
        "Rebuilt {} ({} clean files, {} output files, {} patches)",
        working_dir.display(),
        build.clean_files,
        build.output_files,
        build.patches_applied
    );
    Ok(build)
}

/// Apply every patch under `patch_dir` to the matching file under
/// `working_dir`, in place. Files without the patch extension are skipped.
///
/// Returns the number of patches applied. The first patch that does not
/// apply aborts the pass.
pub fn apply_patches(working_dir: &Path, patch_dir: &Path) -> Result<usize> {
    require_dir("patch", patch_dir)?;

    let artifacts: Vec<(PathBuf, PathBuf)> = walk_files(patch_dir)?
        .into_iter()
        .filter_map(|artifact| match patch::target_path_for(&artifact) {
            Some(target) => Some((artifact, target)),
            None => {
                warn!(
                    "Skipping {}: not a .{} file",
                    patch_dir.join(&artifact).display(),
                    patch::PATCH_EXTENSION
                );
                None
            }
        })
        .collect();

    artifacts
        .par_iter()
        .try_for_each(|(artifact, target)| -> Result<()> {
            let path = working_dir.join(target);
            if !path.is_file() {
                return Err(Error::PatchApply {
                    path: target.clone(),
                    message: "the patched file does not exist".to_string(),
                });
            }
            let patch_text = fs::read_to_string(patch_dir.join(artifact))?;
            let base = fs::read_to_string(&path)?;
            let patched = patch::apply_patch(&base, &patch_text, target)?;
            fs::write(&path, patched)?;
            debug!("Applied {}", artifact.display());
            Ok(())
        })?;

    Ok(artifacts.len())
}

/// Regenerate the patch and output directories from the difference between
/// working and clean.
///
/// Both directories are deleted first. Each working file then falls in one
/// of three cases:
///
/// - absent from clean: copied to output;
/// - identical to clean: nothing is written;
/// - different: a patch is written, unless either side is not UTF-8 text, in
///   which case the working file is copied to output.
pub fn capture(
    clean_dir: &Path,
    working_dir: &Path,
    patch_dir: &Path,
    output_dir: &Path,
) -> Result<CaptureSummary> {
    require_dir("clean", clean_dir)?;
    require_dir("working", working_dir)?;

    filesystem::remove_dir_if_exists(output_dir)?;
    filesystem::remove_dir_if_exists(patch_dir)?;
    fs::create_dir_all(patch_dir)?;
    fs::create_dir_all(output_dir)?;

    let captured = walk_files(working_dir)?
        .into_par_iter()
        .map(|relative| {
            capture_file(clean_dir, working_dir, patch_dir, output_dir, &relative)
                .map(|captured| (relative, captured))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut summary = CaptureSummary::default();
    for (relative, captured) in captured {
        match captured {
            Captured::Unchanged => summary.unchanged += 1,
            Captured::Patched => summary.patched.push(relative),
            Captured::Output => summary.output.push(relative),
        }
    }
    info!(
        "Captured {} patches and {} output files ({} unchanged)",
        summary.patched.len(),
        summary.output.len(),
        summary.unchanged
    );
    Ok(summary)
}

fn capture_file(
    clean_dir: &Path,
    working_dir: &Path,
    patch_dir: &Path,
    output_dir: &Path,
    relative: &Path,
) -> Result<Captured> {
    let working_path = working_dir.join(relative);
    let clean_path = clean_dir.join(relative);

    if !clean_path.is_file() {
        debug!("{}: new file", relative.display());
        copy_file(&working_path, &output_dir.join(relative))?;
        return Ok(Captured::Output);
    }

    let original = fs::read(&clean_path)?;
    let modified = fs::read(&working_path)?;
    if original == modified {
        return Ok(Captured::Unchanged);
    }

    match (str::from_utf8(&original), str::from_utf8(&modified)) {
        (Ok(original), Ok(modified)) => match patch::create_patch(original, modified) {
            Some(patch_text) => {
                debug!("{}: modified", relative.display());
                write_file(
                    &patch_dir.join(patch::patch_path_for(relative)),
                    patch_text.as_bytes(),
                )?;
                Ok(Captured::Patched)
            }
            None => Ok(Captured::Unchanged),
        },
        _ => {
            debug!("{}: modified binary file", relative.display());
            write_file(&output_dir.join(relative), &modified)?;
            Ok(Captured::Output)
        }
    }
}

fn require_dir(role: &str, path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(Error::MissingDirectory {
            role: role.to_string(),
            path: path.to_path_buf(),
        })
    }
}

/// An empty hidden directory next to `target`, on the same filesystem.
fn staging_dir(target: &Path) -> Result<TempDir> {
    let name = target
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::Filesystem {
            message: format!("'{}' does not name a directory", target.display()),
        })?;
    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    tempfile::Builder::new()
        .prefix(&format!(".{}-", name))
        .tempdir_in(parent)
        .map_err(|e| Error::Filesystem {
            message: format!(
                "Failed to create a staging directory in '{}': {}",
                parent.display(),
                e
            ),
        })
}

/// Replace `target` with the staged tree.
fn swap_into_place(staging: TempDir, target: &Path) -> Result<()> {
    filesystem::remove_dir_if_exists(target)?;
    let staged = staging.keep();
    fs::rename(&staged, target).map_err(|e| {
        let _ = fs::remove_dir_all(&staged);
        Error::Filesystem {
            message: format!(
                "Failed to move '{}' into place at '{}': {}",
                staged.display(),
                target.display(),
                e
            ),
        }
    })
}
