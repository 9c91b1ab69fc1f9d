//! The `path` provider: copies a local file or directory into the clean
//! directory.
//!
//! ```json
//! { "type": "path", "path": "../upstream", "dir": "vendor" }
//! ```
//!
//! Relative paths are resolved against the current directory of the process.

use std::any::Any;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{Error, Result};
use crate::filesystem;
use crate::registry::Registrar;
use crate::source::{
    downcast, required_str, target_dir, Document, SourceBuilder, SourceCodec, SourceDescriptor,
};

pub const NAME: &str = "path";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSource {
    /// The file or directory to copy.
    pub path: PathBuf,
    dir: String,
}

impl PathSource {
    pub fn new<P: Into<PathBuf>>(path: P, dir: &str) -> Self {
        Self {
            path: path.into(),
            dir: dir.to_string(),
        }
    }
}

impl SourceDescriptor for PathSource {
    fn kind(&self) -> &str {
        NAME
    }

    fn dir(&self) -> &str {
        &self.dir
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct PathCodec;

impl SourceCodec for PathCodec {
    fn decode(&self, dir: &str, doc: &Document) -> Result<Box<dyn SourceDescriptor>> {
        let path = required_str(doc, "path", NAME)?;
        Ok(Box::new(PathSource::new(path, dir)))
    }

    fn encode(&self, source: &dyn SourceDescriptor, doc: &mut Document) -> Result<()> {
        let source = downcast::<PathSource>(source, NAME)?;
        doc.insert(
            "path".to_string(),
            source.path.to_string_lossy().into_owned().into(),
        );
        Ok(())
    }
}

pub struct PathBuilder;

impl SourceBuilder for PathBuilder {
    fn build(&self, source: &dyn SourceDescriptor, root_dir: &Path) -> Result<()> {
        let source = downcast::<PathSource>(source, NAME)?;
        let target = target_dir(source, root_dir);
        info!(
            "Copying {} into {}",
            source.path.display(),
            target.display()
        );

        if source.path.is_dir() {
            filesystem::copy_tree(&source.path, &target)?;
            Ok(())
        } else if source.path.is_file() {
            let file_name = source.path.file_name().ok_or_else(|| Error::Filesystem {
                message: format!("'{}' has no file name", source.path.display()),
            })?;
            fs::create_dir_all(&target)?;
            filesystem::copy_file(&source.path, &target.join(file_name))
        } else {
            Err(Error::Filesystem {
                message: format!("Source path '{}' does not exist", source.path.display()),
            })
        }
    }
}

/// Register the `path` provider.
pub fn register(registrar: &mut Registrar) -> Result<()> {
    registrar.register_provider(NAME, PathCodec, PathBuilder)
}
