//! Directory tree helpers shared by the providers and the workspace engine

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// List every regular file under `root`, as paths relative to `root`.
///
/// Symlinks are followed and listed under the link's own path, so copying
/// the result copies what each link points to. Directories are not listed.
/// The result is sorted.
pub fn walk_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| Error::Filesystem {
                message: format!(
                    "'{}' is not inside '{}'",
                    entry.path().display(),
                    root.display()
                ),
            })?;
        files.push(relative.to_path_buf());
    }
    Ok(files)
}

/// Copy every file under `src` into `dst`, overwriting same-path files.
///
/// Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<usize> {
    let files = walk_files(src)?;
    fs::create_dir_all(dst)?;
    for relative in &files {
        copy_file(&src.join(relative), &dst.join(relative))?;
    }
    Ok(files.len())
}

/// Copy one file, creating the destination's parent directories.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
            message: format!("Failed to create directory '{}': {}", parent.display(), e),
        })?;
    }
    fs::copy(src, dst).map_err(|e| Error::Filesystem {
        message: format!(
            "Failed to copy '{}' to '{}': {}",
            src.display(),
            dst.display(),
            e
        ),
    })?;
    Ok(())
}

/// Write a file, creating its parent directories.
pub fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
            message: format!("Failed to create directory '{}': {}", parent.display(), e),
        })?;
    }
    fs::write(path, content).map_err(|e| Error::Filesystem {
        message: format!("Failed to write file '{}': {}", path.display(), e),
    })
}

/// Delete a directory and everything in it. Missing directories are fine.
///
/// Returns whether anything was removed.
pub fn remove_dir_if_exists(path: &Path) -> Result<bool> {
    if !path.is_dir() {
        return Ok(false);
    }
    fs::remove_dir_all(path).map_err(|e| Error::Filesystem {
        message: format!("Failed to remove directory '{}': {}", path.display(), e),
    })?;
    Ok(true)
}

/// A snapshot of the files in a directory: relative path to content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTree {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every file under `root` into a snapshot.
    pub fn load(root: &Path) -> Result<Self> {
        let mut tree = Self::new();
        for relative in walk_files(root)? {
            let content = fs::read(root.join(&relative))?;
            tree.files.insert(relative, content);
        }
        Ok(tree)
    }

    /// Write every file of the snapshot under `root`.
    pub fn write_to(&self, root: &Path) -> Result<()> {
        for (relative, content) in &self.files {
            write_file(&root.join(relative), content)?;
        }
        Ok(())
    }

    pub fn add_file<P: AsRef<Path>>(&mut self, path: P, content: Vec<u8>) {
        self.files.insert(path.as_ref().to_path_buf(), content);
    }

    pub fn add_file_string<P: AsRef<Path>>(&mut self, path: P, content: &str) {
        self.add_file(path, content.as_bytes().to_vec());
    }

    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<&[u8]> {
        self.files.get(path.as_ref()).map(Vec::as_slice)
    }

    pub fn get_string<P: AsRef<Path>>(&self, path: P) -> Option<&str> {
        self.get(path).and_then(|content| std::str::from_utf8(content).ok())
    }

    pub fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        self.files.contains_key(path.as_ref())
    }

    /// Relative paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.keys()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
