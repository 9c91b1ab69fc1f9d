//! Unified-diff creation and application
//!
//! Patches are produced with `diffy` and stored one per modified file. An
//! unchanged file produces no patch at all, which is how the capture pass
//! tells modified files from untouched ones.

use std::path::Path;

use crate::error::{Error, Result};

/// The extension appended to a file's relative path to name its patch.
pub const PATCH_EXTENSION: &str = "patch";

/// Diff `original` against `modified`.
///
/// Returns `None` when the two are identical.
pub fn create_patch(original: &str, modified: &str) -> Option<String> {
    let patch = diffy::create_patch(original, modified);
    if patch.hunks().is_empty() {
        None
    } else {
        Some(patch.to_string())
    }
}

/// Apply `patch_text` to `base`. `path` names the target in errors.
pub fn apply_patch(base: &str, patch_text: &str, path: &Path) -> Result<String> {
    let patch = diffy::Patch::from_str(patch_text).map_err(|e| Error::PatchParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    diffy::apply(base, &patch).map_err(|e| Error::PatchApply {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// The patch artifact path for a file at `relative`.
pub fn patch_path_for(relative: &Path) -> std::path::PathBuf {
    let mut name = relative.as_os_str().to_os_string();
    name.push(".");
    name.push(PATCH_EXTENSION);
    name.into()
}

/// The file a patch artifact at `relative` targets, or `None` when the name
/// does not carry the patch extension.
pub fn target_path_for(relative: &Path) -> Option<std::path::PathBuf> {
    let name = relative.to_str()?;
    let stem = name.strip_suffix(PATCH_EXTENSION)?.strip_suffix('.')?;
    if stem.is_empty() || stem.ends_with('/') || stem.ends_with('\\') {
        return None;
    }
    Some(stem.into())
}
