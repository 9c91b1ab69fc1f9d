//! # Terminal Output
//!
//! Progress messages printed by the `project-patcher` commands. Logging goes
//! through `log`; this module covers what a user reads on a normal run.
//!
//! Colour follows, in order: the `--color=always|never|auto` flag, then
//! `NO_COLOR`, `CLICOLOR=0`, `CLICOLOR_FORCE=1` and `TERM=dumb`, then
//! whether stdout is a terminal.

use std::env;
use std::fmt::Display;

use console::style;

#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    pub use_color: bool,
    /// Suppress everything except errors.
    pub quiet: bool,
}

impl OutputConfig {
    /// Build from the `--color` flag value and the environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };
        console::set_colors_enabled(use_color);

        Self {
            use_color,
            quiet: false,
        }
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }
        console::Term::stdout().features().colors_supported()
    }

    /// A step that is about to run.
    pub fn step(&self, message: impl Display) {
        if !self.quiet {
            println!("{} {}", self.marker("==>", "cyan"), message);
        }
    }

    pub fn success(&self, message: impl Display) {
        if !self.quiet {
            println!("{} {}", self.marker("ok", "green"), message);
        }
    }

    /// Printed even when quiet, to stderr.
    pub fn warn(&self, message: impl Display) {
        eprintln!("{} {}", self.marker("warning:", "yellow"), message);
    }

    /// Plain detail line under a step.
    pub fn detail(&self, message: impl Display) {
        if !self.quiet {
            println!("    {}", message);
        }
    }

    fn marker(&self, text: &str, color: &str) -> String {
        if !self.use_color {
            return text.to_string();
        }
        let styled = style(text).bold();
        match color {
            "green" => styled.green(),
            "yellow" => styled.yellow(),
            _ => styled.cyan(),
        }
        .force_styling(true)
        .to_string()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}
