//! # Project Patcher Library
//!
//! This library rebuilds a project's working tree from three artifacts: a
//! pristine copy fetched from the project's sources, one patch per modified
//! text file, and a directory of extra or binary files. After the tree is
//! edited, the same artifacts are regenerated from the edits.
//!
//! ## Quick Example
//!
//! ```
//! use std::path::Path;
//!
//! use project_patcher::source::SourceDescriptor;
//! use project_patcher::{metadata, patch, plugins};
//!
//! // Built-in providers and post-processors, frozen for use
//! let registrar = plugins::setup(&[]).unwrap();
//!
//! let meta = metadata::from_str(
//!     &registrar,
//!     r#"{"sources": [{"type": "git", "repository": "https://example.com/x.git", "tag": "v1.0"}]}"#,
//! )
//! .unwrap();
//! assert_eq!(meta.sources[0].kind(), "git");
//!
//! let diff = patch::create_patch("hello\n", "hello world\n").unwrap();
//! let patched = patch::apply_patch("hello\n", &diff, Path::new("a.txt")).unwrap();
//! assert_eq!(patched, "hello world\n");
//! ```
//!
//! ## Core Concepts
//!
//! - **Registrar (`registry`)**: the named source providers and
//!   post-processors available to a run. Registration happens in stages:
//!   built-ins first, then namespaced external plugins, then the registrar
//!   is frozen.
//! - **Plugins (`plugins`)**: the built-in plugin table and the routine that
//!   walks a registrar through its stages.
//! - **Sources (`source`)**: where a project's files come from (`path`,
//!   `url`, `git`), each with a JSON codec and a builder.
//! - **Metadata (`metadata`)**: the `project_metadata.json` document listing
//!   a workspace's sources and post-processors.
//! - **Post-processors (`postprocess`)**: in-place transforms run over the
//!   freshly built clean directory.
//! - **Workspace (`workspace`)**: the clean, working, patch and output
//!   directories and the operations that move files between them.
//!
//! ## Execution Flow
//!
//! 1.  **Load**: read, import or create the metadata document.
//! 2.  **Build clean**: materialize every source, then run the
//!     post-processors. An existing clean directory is reused.
//! 3.  **Build working**: copy clean, overlay output, apply patches.
//! 4.  **Capture**: after edits, diff working against clean to regenerate
//!     the patch and output directories.

pub mod config;
pub mod error;
pub mod filesystem;
pub mod git;
pub mod metadata;
pub mod network;
pub mod output;
pub mod patch;
pub mod plugins;
pub mod postprocess;
pub mod registry;
pub mod source;
pub mod workspace;

#[cfg(test)]
mod patch_proptest;
