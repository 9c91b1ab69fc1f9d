//! # Configuration
//!
//! This module reads the optional `.project-patcher.toml` file from the
//! workspace root. Every key is optional.
//!
//! ```toml
//! [directories]
//! clean = "_clean"
//! working = "_src"
//! patches = "_patches"
//! output = "_out"
//!
//! [missing.providers]
//! "osf:storage" = "Install the OSF plugin to download OSF projects."
//!
//! [missing.post_processors]
//! "lint:black" = "Install the lint plugin to format sources."
//! ```
//!
//! ## Key Components
//!
//! - **`Config`**: the parsed file. `directories` gives the default workspace
//!   layout; command-line flags override it.
//! - **`MissingMessages`**: guidance for plugins that are not installed. The
//!   messages are registered while external plugins register, so their names
//!   must carry a `plugin:` namespace.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::workspace::WorkspaceDirs;

/// The configuration file name looked up in the workspace root.
pub const CONFIG_FILE_NAME: &str = ".project-patcher.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub directories: WorkspaceDirs,
    pub missing: MissingMessages,
}

/// Guidance shown when a metadata document names an unavailable plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MissingMessages {
    pub providers: BTreeMap<String, String>,
    pub post_processors: BTreeMap<String, String>,
}

impl Config {
    /// Parse a configuration document.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse {
            message: e.to_string(),
        })
    }

    /// Read a configuration file. The file must exist.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigParse {
            message: format!("Cannot read '{}': {}", path.display(), e),
        })?;
        Self::parse(&content).map_err(|e| match e {
            Error::ConfigParse { message } => Error::ConfigParse {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })
    }

    /// Load `explicit` if given, else the workspace's config file if present,
    /// else the defaults.
    pub fn load(workspace_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            debug!("Loading configuration from {}", path.display());
            return Self::from_file(path);
        }
        let path = workspace_dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            debug!("Loading configuration from {}", path.display());
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }
}
