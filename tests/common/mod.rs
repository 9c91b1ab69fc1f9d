//! Shared test utilities for integration and E2E tests.
//!
//! Each fixture holds two temporary directories: an `upstream` tree that a
//! `path` source copies from, and a `workspace` where the metadata and the
//! clean, working, patch and output directories live.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new()
//!         .with_upstream_file("a.txt", "hello\n")
//!         .with_path_metadata();
//!     fixture.command().arg("setup").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    pub use super::TestFixture;
}

pub struct TestFixture {
    upstream: assert_fs::TempDir,
    workspace: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    pub fn new() -> Self {
        Self {
            upstream: assert_fs::TempDir::new().expect("Failed to create upstream directory"),
            workspace: assert_fs::TempDir::new().expect("Failed to create workspace directory"),
        }
    }

    /// Add a text file to the upstream tree.
    pub fn with_upstream_file(self, path: &str, content: &str) -> Self {
        self.upstream
            .child(path)
            .write_str(content)
            .expect("Failed to write upstream file");
        self
    }

    /// Add a binary file to the upstream tree.
    pub fn with_upstream_binary(self, path: &str, content: &[u8]) -> Self {
        self.upstream
            .child(path)
            .write_binary(content)
            .expect("Failed to write upstream file");
        self
    }

    /// Write `project_metadata.json` with the given content.
    pub fn with_metadata(self, content: &str) -> Self {
        self.workspace
            .child("project_metadata.json")
            .write_str(content)
            .expect("Failed to write metadata");
        self
    }

    /// Write metadata with a single `path` source copying the upstream tree.
    pub fn with_path_metadata(self) -> Self {
        let content = self.path_metadata(&[]);
        self.with_metadata(&content)
    }

    /// A metadata document copying the upstream tree, followed by
    /// `post_processors`.
    pub fn path_metadata(&self, post_processors: &[&str]) -> String {
        serde_json::json!({
            "sources": [{"type": "path", "path": self.upstream.path()}],
            "post_processors": post_processors,
        })
        .to_string()
    }

    /// Write `.project-patcher.toml` with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.workspace
            .child(".project-patcher.toml")
            .write_str(content)
            .expect("Failed to write config");
        self
    }

    pub fn upstream(&self) -> &Path {
        self.upstream.path()
    }

    pub fn workspace(&self) -> &Path {
        self.workspace.path()
    }

    /// A path inside the workspace.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.workspace.child(path)
    }

    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.workspace.path().join(path))
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path, e))
    }

    pub fn write(&self, path: &str, content: &str) {
        self.workspace
            .child(path)
            .write_str(content)
            .expect("Failed to write workspace file");
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.workspace.path().join("project_metadata.json")
    }

    /// The CLI binary, run from the workspace.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("project-patcher");
        cmd.current_dir(self.workspace.path())
            .env_remove("PROJECT_PATCHER_CONFIG")
            .env_remove("RUST_LOG")
            .arg("--color")
            .arg("never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
