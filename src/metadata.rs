//! # Workspace Metadata
//!
//! The metadata document describes one workspace: where its files come from
//! and which post-processors run over the clean directory. It is stored as
//! `project_metadata.json` in the workspace root.
//!
//! ```json
//! {
//!   "sources": [
//!     { "type": "git", "repository": "https://example.com/x.git", "tag": "v1.0" },
//!     { "type": "url", "url": "https://example.com/data.zip", "dir": "data" }
//!   ],
//!   "post_processors": ["unpack"]
//! }
//! ```
//!
//! ## Key Components
//!
//! - **`WorkspaceMetadata`**: the decoded document.
//! - **`decode` / `encode`**: conversion between the document and JSON. Each
//!   source object is dispatched on its `type` key to the codec registered
//!   under that name in the [`Registrar`].
//! - **`read_metadata`**: loads the workspace document, or imports one from a
//!   local path or an HTTP(S) URL and stores it in the workspace.

use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{debug, info};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::filesystem;
use crate::network::{self, Downloader};
use crate::registry::Registrar;
use crate::source::{optional_str, Document, SourceDescriptor, DEFAULT_DIR};

/// The file name of the metadata document inside a workspace.
pub const METADATA_FILE_NAME: &str = "project_metadata.json";

const SOURCES_KEY: &str = "sources";
const POST_PROCESSORS_KEY: &str = "post_processors";
const TYPE_KEY: &str = "type";
const DIR_KEY: &str = "dir";

/// Everything needed to rebuild a workspace's clean directory.
#[derive(Debug, Default)]
pub struct WorkspaceMetadata {
    /// Sources, materialized in order.
    pub sources: Vec<Box<dyn SourceDescriptor>>,
    /// Names of the post-processors to run over the clean directory, in order.
    pub post_processors: Vec<String>,
}

impl WorkspaceMetadata {
    pub fn new(sources: Vec<Box<dyn SourceDescriptor>>) -> Self {
        Self {
            sources,
            post_processors: Vec::new(),
        }
    }

    pub fn with_post_processor(mut self, name: &str) -> Self {
        self.post_processors.push(name.to_string());
        self
    }
}

/// The path of the metadata document in `workspace_dir`.
pub fn metadata_path(workspace_dir: &Path) -> PathBuf {
    workspace_dir.join(METADATA_FILE_NAME)
}

/// Decode a metadata document.
pub fn decode(registrar: &Registrar, value: &Value) -> Result<WorkspaceMetadata> {
    let object = value.as_object().ok_or_else(|| Error::MetadataParse {
        message: "The metadata document must be a JSON object".to_string(),
        hint: Some(format!("Wrap the document in {{ \"{}\": [...] }}", SOURCES_KEY)),
    })?;

    let sources = match object.get(SOURCES_KEY) {
        Some(Value::Array(sources)) if !sources.is_empty() => sources,
        Some(Value::Array(_)) | None => {
            return Err(Error::MetadataParse {
                message: "The metadata document does not list any sources".to_string(),
                hint: Some(format!(
                    "Add at least one source object to \"{}\"",
                    SOURCES_KEY
                )),
            })
        }
        Some(other) => {
            return Err(Error::MetadataParse {
                message: format!("\"{}\" must be an array, found {}", SOURCES_KEY, other),
                hint: None,
            })
        }
    };

    let sources = sources
        .iter()
        .enumerate()
        .map(|(index, source)| decode_source(registrar, index, source))
        .collect::<Result<Vec<_>>>()?;

    let post_processors = match object.get(POST_PROCESSORS_KEY) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(names)) => names
            .iter()
            .map(|name| {
                name.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| Error::MetadataParse {
                        message: format!("Post-processor names must be strings, found {}", name),
                        hint: None,
                    })
            })
            .collect::<Result<Vec<_>>>()?,
        Some(other) => {
            return Err(Error::MetadataParse {
                message: format!(
                    "\"{}\" must be an array of names, found {}",
                    POST_PROCESSORS_KEY, other
                ),
                hint: None,
            })
        }
    };

    Ok(WorkspaceMetadata {
        sources,
        post_processors,
    })
}

fn decode_source(
    registrar: &Registrar,
    index: usize,
    value: &Value,
) -> Result<Box<dyn SourceDescriptor>> {
    let doc = value.as_object().ok_or_else(|| Error::MetadataParse {
        message: format!("Source #{} must be a JSON object, found {}", index + 1, value),
        hint: None,
    })?;

    let kind = match doc.get(TYPE_KEY) {
        Some(Value::String(kind)) => kind.as_str(),
        _ => {
            return Err(Error::MetadataParse {
                message: format!("Source #{} has no \"{}\"", index + 1, TYPE_KEY),
                hint: Some(format!(
                    "Available providers: {}",
                    registrar.available_providers().join(", ")
                )),
            })
        }
    };

    let dir = optional_str(doc, DIR_KEY, kind)?.unwrap_or_else(|| DEFAULT_DIR.to_string());
    validate_dir(&dir, kind)?;

    debug!("Decoding source #{} with the '{}' provider", index + 1, kind);
    registrar.source_codec(kind)?.decode(&dir, doc)
}

/// A source's `dir` must be a relative path that stays inside the clean
/// directory.
pub fn validate_dir(dir: &str, kind: &str) -> Result<()> {
    let escapes = Path::new(dir)
        .components()
        .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
    if dir.is_empty() || escapes {
        return Err(Error::MetadataParse {
            message: format!(
                "The '{}' source has an invalid dir '{}': it must be a relative path inside the clean directory",
                kind, dir
            ),
            hint: Some(format!("Use \"{}\" for the clean directory itself", DEFAULT_DIR)),
        });
    }
    Ok(())
}

/// Encode a metadata document. Empty post-processor lists and default
/// source dirs are omitted.
pub fn encode(registrar: &Registrar, metadata: &WorkspaceMetadata) -> Result<Value> {
    let mut sources = Vec::with_capacity(metadata.sources.len());
    for source in &metadata.sources {
        let mut doc = Document::new();
        doc.insert(TYPE_KEY.to_string(), Value::from(source.kind()));
        if source.dir() != DEFAULT_DIR {
            doc.insert(DIR_KEY.to_string(), Value::from(source.dir()));
        }
        registrar
            .source_codec(source.kind())?
            .encode(source.as_ref(), &mut doc)?;
        sources.push(Value::Object(doc));
    }

    let mut object = Map::new();
    object.insert(SOURCES_KEY.to_string(), Value::Array(sources));
    if !metadata.post_processors.is_empty() {
        object.insert(
            POST_PROCESSORS_KEY.to_string(),
            Value::from(metadata.post_processors.clone()),
        );
    }
    Ok(Value::Object(object))
}

pub fn from_str(registrar: &Registrar, content: &str) -> Result<WorkspaceMetadata> {
    let value: Value = serde_json::from_str(content).map_err(|e| Error::MetadataParse {
        message: format!("Invalid JSON: {}", e),
        hint: None,
    })?;
    decode(registrar, &value)
}

pub fn to_string(registrar: &Registrar, metadata: &WorkspaceMetadata) -> Result<String> {
    let mut content = serde_json::to_string_pretty(&encode(registrar, metadata)?)?;
    content.push('\n');
    Ok(content)
}

pub fn read_from_file(registrar: &Registrar, path: &Path) -> Result<WorkspaceMetadata> {
    let content = fs::read_to_string(path).map_err(|e| Error::Filesystem {
        message: format!("Failed to read metadata '{}': {}", path.display(), e),
    })?;
    from_str(registrar, &content)
}

pub fn write_to_file(registrar: &Registrar, metadata: &WorkspaceMetadata, path: &Path) -> Result<()> {
    let content = to_string(registrar, metadata)?;
    filesystem::write_file(path, content.as_bytes())
}

/// Load the metadata for `workspace_dir`.
///
/// With `import`, the document is read from that local path or fetched from
/// that HTTP(S) URL instead, and then written to the workspace, replacing
/// any existing document.
pub fn read_metadata(
    registrar: &Registrar,
    workspace_dir: &Path,
    import: Option<&str>,
    downloader: &dyn Downloader,
) -> Result<WorkspaceMetadata> {
    let target = metadata_path(workspace_dir);

    let Some(location) = import else {
        if !target.is_file() {
            return Err(Error::MetadataParse {
                message: format!("No {} found in {}", METADATA_FILE_NAME, workspace_dir.display()),
                hint: Some(
                    "Run 'project-patcher init' or pass --import <path-or-url>".to_string(),
                ),
            });
        }
        debug!("Reading metadata from {}", target.display());
        return read_from_file(registrar, &target);
    };

    let content = if network::is_remote(location) {
        info!("Importing metadata from {}", location);
        let bytes = downloader.fetch(location)?;
        String::from_utf8(bytes).map_err(|_| Error::MetadataParse {
            message: format!("The metadata at {} is not UTF-8 text", location),
            hint: None,
        })?
    } else {
        info!("Importing metadata from {}", location);
        fs::read_to_string(location).map_err(|e| Error::Filesystem {
            message: format!("Failed to read metadata '{}': {}", location, e),
        })?
    };

    let metadata = from_str(registrar, &content)?;
    write_to_file(registrar, &metadata, &target)?;
    Ok(metadata)
}
