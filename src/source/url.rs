//! The `url` provider: downloads a single file into the clean directory.
//!
//! ```json
//! { "type": "url", "url": "https://example.com/release.zip" }
//! ```
//!
//! The file is saved under `filename`, which defaults to the last segment of
//! the URL path. Pair it with the `unpack` post-processor to expand archives.

use std::any::Any;
use std::path::{Component, Path};

use log::info;

use crate::error::{Error, Result};
use crate::filesystem;
use crate::network::{Downloader, HttpDownloader};
use crate::registry::Registrar;
use crate::source::{
    downcast, optional_str, required_str, target_dir, Document, SourceBuilder, SourceCodec,
    SourceDescriptor,
};

pub const NAME: &str = "url";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlSource {
    pub url: String,
    /// Overrides the name the download is saved under.
    pub filename: Option<String>,
    dir: String,
}

impl UrlSource {
    pub fn new(url: &str, filename: Option<String>, dir: &str) -> Self {
        Self {
            url: url.to_string(),
            filename,
            dir: dir.to_string(),
        }
    }

    /// The name the download is saved under.
    pub fn file_name(&self) -> Result<String> {
        if let Some(filename) = &self.filename {
            validate_filename(filename)?;
            return Ok(filename.clone());
        }
        let parsed = url::Url::parse(&self.url)?;
        parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .ok_or_else(|| Error::MetadataParse {
                message: format!("Cannot derive a file name from '{}'", self.url),
                hint: Some("Add \"filename\": \"...\" to the url source".to_string()),
            })
    }
}

/// A `filename` must be a single plain path segment, so the download lands
/// directly in the source's directory.
pub fn validate_filename(filename: &str) -> Result<()> {
    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(Error::MetadataParse {
            message: format!(
                "The '{}' source has an invalid filename '{}': it must be a plain file name",
                NAME, filename
            ),
            hint: Some(
                "Drop any directories from filename and use \"dir\" instead".to_string(),
            ),
        }),
    }
}

impl SourceDescriptor for UrlSource {
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

pub struct UrlCodec;

impl SourceCodec for UrlCodec {
    fn decode(&self, dir: &str, doc: &Document) -> Result<Box<dyn SourceDescriptor>> {
        let url = required_str(doc, "url", NAME)?;
        let filename = optional_str(doc, "filename", NAME)?;
        if let Some(filename) = &filename {
            validate_filename(filename)?;
        }
        Ok(Box::new(UrlSource::new(&url, filename, dir)))
    }

    fn encode(&self, source: &dyn SourceDescriptor, doc: &mut Document) -> Result<()> {
        let source = downcast::<UrlSource>(source, NAME)?;
        doc.insert("url".to_string(), source.url.clone().into());
        if let Some(filename) = &source.filename {
            doc.insert("filename".to_string(), filename.clone().into());
        }
        Ok(())
    }
}

pub struct UrlBuilder {
    downloader: Box<dyn Downloader>,
}

impl UrlBuilder {
    pub fn new(downloader: Box<dyn Downloader>) -> Self {
        Self { downloader }
    }
}

impl Default for UrlBuilder {
    fn default() -> Self {
        Self::new(Box::new(HttpDownloader::default()))
    }
}

impl SourceBuilder for UrlBuilder {
    fn build(&self, source: &dyn SourceDescriptor, root_dir: &Path) -> Result<()> {
        let source = downcast::<UrlSource>(source, NAME)?;
        let destination = target_dir(source, root_dir).join(source.file_name()?);
        info!("Downloading {} to {}", source.url, destination.display());

        let bytes = self.downloader.fetch(&source.url)?;
        filesystem::write_file(&destination, &bytes)
    }
}

/// Register the `url` provider.
pub fn register(registrar: &mut Registrar) -> Result<()> {
    registrar.register_provider(NAME, UrlCodec, UrlBuilder::default())
}
