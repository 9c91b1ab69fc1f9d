//! # Source Descriptors
//!
//! A source descriptor says where a project's files come from. Each provider
//! contributes one descriptor type together with:
//!
//! - a **`SourceCodec`**, which converts the descriptor to and from a JSON
//!   object in the workspace metadata document, and
//! - a **`SourceBuilder`**, which materializes the descriptor into the clean
//!   directory.
//!
//! Both are registered under the provider's name in the
//! [`Registrar`](crate::registry::Registrar). The metadata codec writes the
//! provider name under the `type` key and the target subdirectory under
//! `dir`; everything else in the object belongs to the provider's codec.
//!
//! Codecs emit a field only when it differs from its default, so documents
//! stay sparse and easy to edit by hand.
//!
//! ## Built-in providers
//!
//! - [`path`]: copies a local file or directory.
//! - [`url`]: downloads a single file over HTTP(S).
//! - [`git`]: clones a repository and checks out a branch, commit or tag.

pub mod git;
pub mod path;
pub mod url;

use std::any::Any;
use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Error, Result};

/// A JSON object, the generic form every codec reads and writes.
pub type Document = serde_json::Map<String, Value>;

/// The default target subdirectory: the clean directory itself.
pub const DEFAULT_DIR: &str = ".";

/// Where a project's files come from.
pub trait SourceDescriptor: fmt::Debug + Send + Sync {
    /// The registered name of the provider that handles this descriptor.
    fn kind(&self) -> &str;

    /// The subdirectory of the clean directory this source populates.
    fn dir(&self) -> &str;

    fn as_any(&self) -> &dyn Any;
}

/// Converts one provider's descriptors to and from JSON objects.
pub trait SourceCodec: Send + Sync {
    /// Build a descriptor from `doc`, targeting `dir`.
    fn decode(&self, dir: &str, doc: &Document) -> Result<Box<dyn SourceDescriptor>>;

    /// Write the provider-specific fields of `source` into `doc`.
    fn encode(&self, source: &dyn SourceDescriptor, doc: &mut Document) -> Result<()>;
}

/// Materializes one provider's descriptors on disk.
pub trait SourceBuilder: Send + Sync {
    /// Populate `root_dir.join(source.dir())` from the source.
    fn build(&self, source: &dyn SourceDescriptor, root_dir: &Path) -> Result<()>;
}

impl<F> SourceBuilder for F
where
    F: Fn(&dyn SourceDescriptor, &Path) -> Result<()> + Send + Sync,
{
    fn build(&self, source: &dyn SourceDescriptor, root_dir: &Path) -> Result<()> {
        self(source, root_dir)
    }
}

/// Recover the concrete descriptor type a codec or builder expects.
pub fn downcast<'a, T: 'static>(source: &'a dyn SourceDescriptor, expected: &str) -> Result<&'a T> {
    source
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| Error::SourceMismatch {
            expected: expected.to_string(),
            found: source.kind().to_string(),
        })
}

/// The directory a source populates under `root_dir`.
pub fn target_dir(source: &dyn SourceDescriptor, root_dir: &Path) -> PathBuf {
    if source.dir() == DEFAULT_DIR {
        root_dir.to_path_buf()
    } else {
        root_dir.join(source.dir())
    }
}

/// Read a required string field of a source object.
pub fn required_str(doc: &Document, key: &str, kind: &str) -> Result<String> {
    match doc.get(key) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(wrong_type(key, kind, other)),
        None => Err(Error::MetadataParse {
            message: format!("The '{}' source is missing the '{}' field", kind, key),
            hint: Some(format!("Add \"{}\": \"...\" to the source object", key)),
        }),
    }
}

/// Read an optional string field of a source object.
pub fn optional_str(doc: &Document, key: &str, kind: &str) -> Result<Option<String>> {
    match doc.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(other) => Err(wrong_type(key, kind, other)),
    }
}

fn wrong_type(key: &str, kind: &str, value: &Value) -> Error {
    Error::MetadataParse {
        message: format!(
            "The '{}' field of the '{}' source must be a string, found {}",
            key, kind, value
        ),
        hint: None,
    }
}
