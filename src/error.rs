//! # Error Handling
//!
//! This module defines the centralized error type for `project-patcher`. It
//! uses `thiserror` to build a single `Error` enum that covers every failure
//! the library can report, each with a descriptive message.
//!
//! ## Key Components
//!
//! - **`Error`**: The enum of all failures. Variants fall into a few groups:
//!   - registry violations (`RegistryFrozen`, `InvalidName`, `Duplicate`,
//!     `AlreadyRegistered`), raised synchronously when a plugin registers;
//!   - lookup failures (`NotRegistered`, `MissingPlugin`), where
//!     `MissingPlugin` carries the guidance message a plugin author left
//!     for users who have not installed it;
//!   - provider and transform failures (`GitClone`, `GitCommand`, `Network`,
//!     `Archive`, `PostProcessor`), propagated unchanged;
//!   - patch failures (`PatchParse`, `PatchApply`);
//!   - precondition and document problems (`MissingDirectory`,
//!     `MetadataParse`, `ConfigParse`, `SourceMismatch`);
//!   - wrapped foreign errors (`Io`, `Json`, `UrlParse`, `Walk`).
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for project-patcher operations
#[derive(Error, Debug)]
pub enum Error {
    /// A registration was attempted after the registrar was frozen.
    #[error("{name} could not be registered; the registry has been frozen")]
    RegistryFrozen { name: String },

    /// A plugin registered a name without a namespace separator after the
    /// built-in stage had ended.
    #[error("{name} must contain a ':', where the prefix identifies the plugin that registers it")]
    InvalidName { name: String },

    /// The name is already present in the target registry.
    #[error("{name} already has a registered {registry}")]
    Duplicate { name: String, registry: String },

    /// A "missing" message and a concrete registration were both requested
    /// for the same name.
    #[error("{name} {message}")]
    AlreadyRegistered { name: String, message: String },

    /// A lookup found nothing registered under the name.
    #[error("No {registry} is registered for '{name}'")]
    NotRegistered { registry: String, name: String },

    /// A lookup found no implementation, but a plugin left instructions.
    #[error("No {registry} is available for '{name}': {message}")]
    MissingPlugin {
        registry: String,
        name: String,
        message: String,
    },

    /// The workspace metadata document is malformed.
    #[error("Metadata parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    MetadataParse {
        message: String,
        /// Optional hint for how to fix the document
        hint: Option<String>,
    },

    /// A codec or builder received a descriptor of another provider.
    #[error("Source descriptor mismatch: expected '{expected}', found '{found}'")]
    SourceMismatch { expected: String, found: String },

    /// An error occurred while cloning a Git repository.
    #[error("Git clone error for {url}: {message}")]
    GitClone { url: String, message: String },

    /// An error occurred while executing a Git command.
    #[error("Git command failed for {url}: {command} - {stderr}")]
    GitCommand {
        command: String,
        url: String,
        stderr: String,
    },

    /// An error occurred during a network operation.
    #[error("Network operation error: {url} - {message}")]
    Network { url: String, message: String },

    /// An archive could not be read or extracted.
    #[error("Archive error: {path}: {message}")]
    Archive { path: PathBuf, message: String },

    /// A stored patch artifact is not a valid unified diff.
    #[error("Patch parsing error for {path}: {message}")]
    PatchParse { path: PathBuf, message: String },

    /// A patch no longer matches the content it is applied to.
    #[error("Patch for {path} does not apply: {message}")]
    PatchApply { path: PathBuf, message: String },

    /// A post-processor failed while transforming a directory.
    #[error("Post-processor '{name}' failed: {message}")]
    PostProcessor { name: String, message: String },

    /// A directory an engine operation reads from does not exist.
    #[error("The {role} directory {} does not exist", path.display())]
    MissingDirectory { role: String, path: PathBuf },

    /// An error occurred with a filesystem operation.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// The configuration file is malformed.
    #[error("Configuration parsing error: {message}")]
    ConfigParse { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A directory walk error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
