//! Plugins command implementation
//!
//! Lists what the registrar holds after setup: source providers,
//! post-processors, and the names that only carry an installation hint.

use anyhow::Result;
use clap::Args;

use project_patcher::output::OutputConfig;
use project_patcher::registry::Registrar;

use super::{DirArgs, Session};

/// Arguments for the plugins command
#[derive(Args, Debug)]
pub struct PluginsArgs {
    #[command(flatten)]
    pub dirs: DirArgs,
}

/// Execute the plugins command
pub fn execute(args: PluginsArgs, _output: &OutputConfig) -> Result<()> {
    let session = Session::open(&args.dirs)?;
    print!("{}", render(&session.registrar));
    Ok(())
}

fn render(registrar: &Registrar) -> String {
    let mut text = String::new();

    text.push_str("Source providers:\n");
    for name in registrar.available_providers() {
        text.push_str(&format!("  {}\n", name));
    }
    text.push_str("Post-processors:\n");
    for name in registrar.available_post_processors() {
        text.push_str(&format!("  {}\n", name));
    }

    let missing: Vec<_> = registrar
        .provider_missing_messages()
        .chain(registrar.post_processor_missing_messages())
        .collect();
    if !missing.is_empty() {
        text.push_str("Not installed:\n");
        for (name, message) in missing {
            text.push_str(&format!("  {}: {}\n", name, message));
        }
    }
    text
}
