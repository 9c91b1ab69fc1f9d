//! # Plugin Registry
//!
//! This module holds the plugin host used by every workspace operation.
//!
//! ## Key Components
//!
//! - **`Registry<T>`**: An insertion-ordered map from names to values that
//!   rejects duplicate names.
//! - **`Stage`**: The registration lifecycle. Built-in plugins register while
//!   the registrar is `Internal`; external plugins register while it is
//!   `Dynamic` and must namespace their names with `:`; once `Frozen`, every
//!   registration fails.
//! - **`Registrar`**: Five registries (source codecs, source builders,
//!   missing-provider messages, post-processors, missing-post-processor
//!   messages) behind the stage guard.
//!
//! A registrar is an ordinary value: the binary builds one with
//! [`crate::plugins::setup`] and passes it down, and tests build their own.

use std::fmt;

use indexmap::IndexMap;
use log::debug;

use crate::error::{Error, Result};
use crate::postprocess::PostProcessor;
use crate::source::{SourceBuilder, SourceCodec};

/// Separates a plugin's namespace from the rest of a registered name.
pub const NAMESPACE_SEPARATOR: char = ':';

/// An insertion-ordered mapping of unique names to values.
pub struct Registry<T> {
    /// What the registry holds, used in error messages.
    label: &'static str,
    entries: IndexMap<String, T>,
}

impl<T> Registry<T> {
    /// Create an empty registry described by `label` in error messages.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            entries: IndexMap::new(),
        }
    }

    /// Insert a value, failing if `name` is already present.
    pub fn insert(&mut self, name: &str, value: T) -> Result<()> {
        if self.entries.contains_key(name) {
            return Err(self.duplicate(name));
        }
        self.entries.insert(name.to_string(), value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    fn duplicate(&self, name: &str) -> Error {
        Error::Duplicate {
            name: name.to_string(),
            registry: self.label.to_string(),
        }
    }
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("label", &self.label)
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The registration lifecycle of a [`Registrar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Built-in plugins are registering; any name is accepted.
    Internal,
    /// External plugins are registering; names must be namespaced.
    Dynamic,
    /// No further registration is accepted.
    Frozen,
}

impl Stage {
    /// The stage that follows this one. `Frozen` is terminal.
    pub fn next(self) -> Self {
        match self {
            Stage::Internal => Stage::Dynamic,
            Stage::Dynamic | Stage::Frozen => Stage::Frozen,
        }
    }

    /// Check whether `name` may be registered in this stage.
    pub fn check_registration(self, name: &str) -> Result<()> {
        match self {
            Stage::Frozen => Err(Error::RegistryFrozen {
                name: name.to_string(),
            }),
            Stage::Dynamic if !name.contains(NAMESPACE_SEPARATOR) => Err(Error::InvalidName {
                name: name.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Internal => "internal",
            Stage::Dynamic => "dynamic",
            Stage::Frozen => "frozen",
        };
        f.write_str(name)
    }
}

const PROVIDER: &str = "source provider";
const POST_PROCESSOR: &str = "post-processor";

/// Host of the pluggable source providers and post-processors.
pub struct Registrar {
    stage: Stage,
    source_codecs: Registry<Box<dyn SourceCodec>>,
    source_builders: Registry<Box<dyn SourceBuilder>>,
    provider_messages: Registry<String>,
    post_processors: Registry<Box<dyn PostProcessor>>,
    post_processor_messages: Registry<String>,
}

impl Registrar {
    /// Create an empty registrar in the `Internal` stage.
    pub fn new() -> Self {
        Self {
            stage: Stage::Internal,
            source_codecs: Registry::new(PROVIDER),
            source_builders: Registry::new("source builder"),
            provider_messages: Registry::new("missing-provider message"),
            post_processors: Registry::new(POST_PROCESSOR),
            post_processor_messages: Registry::new("missing-post-processor message"),
        }
    }

    pub fn current_stage(&self) -> Stage {
        self.stage
    }

    /// Advance to the next stage and return it.
    pub fn stage(&mut self) -> Stage {
        self.stage = self.stage.next();
        debug!("Registrar advanced to the {} stage", self.stage);
        self.stage
    }

    /// Register a source provider: its codec and builder under one name.
    ///
    /// Either both are stored or neither is.
    pub fn register_provider<C, B>(&mut self, name: &str, codec: C, builder: B) -> Result<()>
    where
        C: SourceCodec + 'static,
        B: SourceBuilder + 'static,
    {
        self.stage.check_registration(name)?;
        if self.source_codecs.contains(name) {
            return Err(self.source_codecs.duplicate(name));
        }
        if self.source_builders.contains(name) {
            return Err(self.source_builders.duplicate(name));
        }
        if self.provider_messages.contains(name) {
            return Err(message_conflict(name));
        }

        self.source_codecs.insert(name, Box::new(codec))?;
        self.source_builders.insert(name, Box::new(builder))?;
        debug!("Registered source provider '{}'", name);
        Ok(())
    }

    /// Register guidance shown when a metadata document names a provider
    /// that is not installed.
    pub fn add_provider_missing_message(&mut self, name: &str, message: &str) -> Result<()> {
        self.stage.check_registration(name)?;
        if self.provider_messages.contains(name) {
            return Err(self.provider_messages.duplicate(name));
        }
        if self.source_codecs.contains(name) {
            return Err(provider_conflict(name));
        }

        self.provider_messages.insert(name, message.to_string())
    }

    /// Register a post-processor.
    pub fn register_post_processor<P>(&mut self, name: &str, post_processor: P) -> Result<()>
    where
        P: PostProcessor + 'static,
    {
        self.stage.check_registration(name)?;
        if self.post_processors.contains(name) {
            return Err(self.post_processors.duplicate(name));
        }
        if self.post_processor_messages.contains(name) {
            return Err(message_conflict(name));
        }

        self.post_processors.insert(name, Box::new(post_processor))?;
        debug!("Registered post-processor '{}'", name);
        Ok(())
    }

    /// Register guidance shown when a metadata document names a
    /// post-processor that is not installed.
    pub fn add_post_processor_missing_message(&mut self, name: &str, message: &str) -> Result<()> {
        self.stage.check_registration(name)?;
        if self.post_processor_messages.contains(name) {
            return Err(self.post_processor_messages.duplicate(name));
        }
        if self.post_processors.contains(name) {
            return Err(provider_conflict(name));
        }

        self.post_processor_messages.insert(name, message.to_string())
    }

    pub fn source_codec(&self, name: &str) -> Result<&dyn SourceCodec> {
        match self.source_codecs.get(name) {
            Some(codec) => Ok(codec.as_ref()),
            None => Err(lookup_error(PROVIDER, name, &self.provider_messages)),
        }
    }

    pub fn source_builder(&self, name: &str) -> Result<&dyn SourceBuilder> {
        match self.source_builders.get(name) {
            Some(builder) => Ok(builder.as_ref()),
            None => Err(lookup_error(PROVIDER, name, &self.provider_messages)),
        }
    }

    pub fn post_processor(&self, name: &str) -> Result<&dyn PostProcessor> {
        match self.post_processors.get(name) {
            Some(post_processor) => Ok(post_processor.as_ref()),
            None => Err(lookup_error(
                POST_PROCESSOR,
                name,
                &self.post_processor_messages,
            )),
        }
    }

    /// Names of registered source providers, in registration order.
    pub fn available_providers(&self) -> Vec<&str> {
        self.source_builders.names().collect()
    }

    /// Names of registered post-processors, in registration order.
    pub fn available_post_processors(&self) -> Vec<&str> {
        self.post_processors.names().collect()
    }

    pub fn provider_missing_messages(&self) -> impl Iterator<Item = (&str, &String)> {
        self.provider_messages.iter()
    }

    pub fn post_processor_missing_messages(&self) -> impl Iterator<Item = (&str, &String)> {
        self.post_processor_messages.iter()
    }
}

impl Default for Registrar {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registrar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registrar")
            .field("stage", &self.stage)
            .field("providers", &self.available_providers())
            .field("post_processors", &self.available_post_processors())
            .finish()
    }
}

fn message_conflict(name: &str) -> Error {
    Error::AlreadyRegistered {
        name: name.to_string(),
        message: "has a missing message registered, so it cannot also be registered"
            .to_string(),
    }
}

fn provider_conflict(name: &str) -> Error {
    Error::AlreadyRegistered {
        name: name.to_string(),
        message: "is registered, a missing message is not needed".to_string(),
    }
}

fn lookup_error(registry: &str, name: &str, messages: &Registry<String>) -> Error {
    match messages.get(name) {
        Some(message) => Error::MissingPlugin {
            registry: registry.to_string(),
            name: name.to_string(),
            message: message.clone(),
        },
        None => Error::NotRegistered {
            registry: registry.to_string(),
            name: name.to_string(),
        },
    }
}
