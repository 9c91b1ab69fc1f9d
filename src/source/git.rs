//! The `git` provider: clones a repository into the clean directory and
//! optionally checks out a branch, commit or tag.
//!
//! ```json
//! { "type": "git", "repository": "https://github.com/org/repo.git", "tag": "v1.2.0" }
//! ```
//!
//! At most one of `branch`, `commit` and `tag` is meaningful. When a document
//! carries several, the first one in [`REFERENCE_KINDS`] order wins; this
//! order is part of the document format and must not change.

use std::any::Any;
use std::fmt;
use std::path::Path;

use log::info;

use crate::error::{Error, Result};
use crate::git::{GitOperations, SystemGit};
use crate::registry::Registrar;
use crate::source::{
    downcast, required_str, target_dir, Document, SourceBuilder, SourceCodec, SourceDescriptor,
};

pub const NAME: &str = "git";

/// How a checkout reference is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceKind {
    #[default]
    Branch,
    Commit,
    Tag,
}

/// Discriminator keys in decode priority order.
pub const REFERENCE_KINDS: [ReferenceKind; 3] =
    [ReferenceKind::Branch, ReferenceKind::Commit, ReferenceKind::Tag];

impl ReferenceKind {
    /// The document key holding a reference of this kind.
    pub fn key(self) -> &'static str {
        match self {
            ReferenceKind::Branch => "branch",
            ReferenceKind::Commit => "commit",
            ReferenceKind::Tag => "tag",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        REFERENCE_KINDS.into_iter().find(|kind| kind.key() == key)
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitSource {
    pub repository: String,
    /// The checkout location; `None` keeps the repository's default branch.
    pub reference: Option<String>,
    pub reference_kind: ReferenceKind,
    dir: String,
}

impl GitSource {
    pub fn new(repository: &str, dir: &str) -> Self {
        Self {
            repository: repository.to_string(),
            reference: None,
            reference_kind: ReferenceKind::default(),
            dir: dir.to_string(),
        }
    }

    pub fn with_reference(mut self, kind: ReferenceKind, reference: &str) -> Self {
        self.reference = Some(reference.to_string());
        self.reference_kind = kind;
        self
    }
}

impl SourceDescriptor for GitSource {
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

pub struct GitCodec;

impl SourceCodec for GitCodec {
    fn decode(&self, dir: &str, doc: &Document) -> Result<Box<dyn SourceDescriptor>> {
        let repository = required_str(doc, "repository", NAME)?;
        let source = GitSource::new(&repository, dir);

        for kind in REFERENCE_KINDS {
            if doc.contains_key(kind.key()) {
                let reference = required_str(doc, kind.key(), NAME)?;
                return Ok(Box::new(source.with_reference(kind, &reference)));
            }
        }
        Ok(Box::new(source))
    }

    fn encode(&self, source: &dyn SourceDescriptor, doc: &mut Document) -> Result<()> {
        let source = downcast::<GitSource>(source, NAME)?;
        doc.insert("repository".to_string(), source.repository.clone().into());
        if let Some(reference) = &source.reference {
            doc.insert(
                source.reference_kind.key().to_string(),
                reference.clone().into(),
            );
        }
        Ok(())
    }
}

pub struct GitBuilder {
    git: Box<dyn GitOperations>,
}

impl GitBuilder {
    pub fn new(git: Box<dyn GitOperations>) -> Self {
        Self { git }
    }
}

impl Default for GitBuilder {
    fn default() -> Self {
        Self::new(Box::new(SystemGit))
    }
}

impl SourceBuilder for GitBuilder {
    fn build(&self, source: &dyn SourceDescriptor, root_dir: &Path) -> Result<()> {
        let source = downcast::<GitSource>(source, NAME)?;
        let target = target_dir(source, root_dir);
        if target.is_dir() && target.read_dir()?.next().is_some() {
            return Err(Error::GitClone {
                url: source.repository.clone(),
                message: format!("'{}' already exists and is not empty", target.display()),
            });
        }

        info!("Cloning {} into {}", source.repository, target.display());
        self.git.clone_repository(&source.repository, &target)?;

        if let Some(reference) = &source.reference {
            info!("Checking out {} {}", source.reference_kind, reference);
            self.git.checkout(&source.repository, &target, reference)?;
        }
        Ok(())
    }
}

/// Register the `git` provider.
pub fn register(registrar: &mut Registrar) -> Result<()> {
    registrar.register_provider(NAME, GitCodec, GitBuilder::default())
}
