//! # Plugins
//!
//! Every provider and post-processor reaches the [`Registrar`] through a
//! [`Plugin`]. Built-in plugins register first, while bare names are still
//! allowed; external plugins register after the first [`Registrar::stage`]
//! call and must namespace their names (`acme:thing`). A second `stage()`
//! freezes the registrar before any workspace operation runs.

use log::debug;

use crate::config::MissingMessages;
use crate::error::Result;
use crate::postprocess;
use crate::registry::Registrar;
use crate::source;

/// A unit of registration.
pub trait Plugin {
    fn name(&self) -> &str;

    fn register(&self, registrar: &mut Registrar) -> Result<()>;
}

struct Builtin {
    name: &'static str,
    register: fn(&mut Registrar) -> Result<()>,
}

impl Plugin for Builtin {
    fn name(&self) -> &str {
        self.name
    }

    fn register(&self, registrar: &mut Registrar) -> Result<()> {
        (self.register)(registrar)
    }
}

const BUILTINS: &[Builtin] = &[
    Builtin {
        name: source::path::NAME,
        register: source::path::register,
    },
    Builtin {
        name: source::url::NAME,
        register: source::url::register,
    },
    Builtin {
        name: source::git::NAME,
        register: source::git::register,
    },
    Builtin {
        name: postprocess::unpack::NAME,
        register: postprocess::unpack::register,
    },
    Builtin {
        name: postprocess::notebook::NAME,
        register: postprocess::notebook::register,
    },
];

/// Names of the built-in plugins, in registration order.
pub fn builtin_names() -> Vec<&'static str> {
    BUILTINS.iter().map(|builtin| builtin.name).collect()
}

/// Register "missing" messages declared in the configuration file.
pub struct ConfiguredMessages<'a>(pub &'a MissingMessages);

impl Plugin for ConfiguredMessages<'_> {
    fn name(&self) -> &str {
        "config"
    }

    fn register(&self, registrar: &mut Registrar) -> Result<()> {
        for (name, message) in &self.0.providers {
            registrar.add_provider_missing_message(name, message)?;
        }
        for (name, message) in &self.0.post_processors {
            registrar.add_post_processor_missing_message(name, message)?;
        }
        Ok(())
    }
}

/// Build a frozen registrar holding the built-ins and `external`.
pub fn setup(external: &[&dyn Plugin]) -> Result<Registrar> {
    let mut registrar = Registrar::new();
    for builtin in BUILTINS {
        debug!("Registering built-in plugin '{}'", builtin.name());
        builtin.register(&mut registrar)?;
    }
    registrar.stage();

    for plugin in external {
        debug!("Registering plugin '{}'", plugin.name());
        plugin.register(&mut registrar)?;
    }
    registrar.stage();
    Ok(registrar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::registry::Stage;
    use std::path::Path;

    struct Acme;

    impl Plugin for Acme {
        fn name(&self) -> &str {
            "acme"
        }

        fn register(&self, registrar: &mut Registrar) -> Result<()> {
            registrar.register_post_processor("acme:noop", |_dir: &Path| -> Result<()> { Ok(()) })
        }
    }

    struct Unnamespaced;

    impl Plugin for Unnamespaced {
        fn name(&self) -> &str {
            "bad"
        }

        fn register(&self, registrar: &mut Registrar) -> Result<()> {
            registrar.register_post_processor("noop", |_dir: &Path| -> Result<()> { Ok(()) })
        }
    }

    #[test]
    fn test_setup_registers_builtins_and_freezes() {
        let registrar = setup(&[]).unwrap();
        assert_eq!(registrar.current_stage(), Stage::Frozen);
        assert_eq!(registrar.available_providers(), ["path", "url", "git"]);
        assert_eq!(registrar.available_post_processors(), ["unpack", "notebook"]);
    }

    #[test]
    fn test_builtin_names() {
        assert_eq!(
            builtin_names(),
            ["path", "url", "git", "unpack", "notebook"]
        );
    }

    #[test]
    fn test_external_plugin_registers_in_dynamic_stage() {
        let plugins: [&dyn Plugin; 1] = [&Acme];
        let registrar = setup(&plugins).unwrap();
        assert!(registrar.post_processor("acme:noop").is_ok());
    }

    #[test]
    fn test_external_plugin_needs_namespace() {
        let plugins: [&dyn Plugin; 1] = [&Unnamespaced];
        let err = setup(&plugins).unwrap_err();
        assert!(matches!(err, Error::InvalidName { ref name } if name == "noop"));
    }

    #[test]
    fn test_configured_messages() {
        let mut messages = MissingMessages::default();
        messages
            .providers
            .insert("osf:storage".to_string(), "Install the OSF plugin".to_string());
        messages
            .post_processors
            .insert("lint:black".to_string(), "Install the lint plugin".to_string());

        let configured = ConfiguredMessages(&messages);
        let plugins: [&dyn Plugin; 1] = [&configured];
        let registrar = setup(&plugins).unwrap();

        let err = registrar.source_codec("osf:storage").err().unwrap();
        assert!(matches!(err, Error::MissingPlugin { ref message, .. } if message == "Install the OSF plugin"));
        let err = registrar.post_processor("lint:black").err().unwrap();
        assert!(err.to_string().contains("Install the lint plugin"));
    }

    #[test]
    fn test_configured_message_needs_namespace() {
        let mut messages = MissingMessages::default();
        messages
            .providers
            .insert("git".to_string(), "never shown".to_string());
        let configured = ConfiguredMessages(&messages);
        let plugins: [&dyn Plugin; 1] = [&configured];
        assert!(matches!(setup(&plugins), Err(Error::InvalidName { .. })));
    }
}
