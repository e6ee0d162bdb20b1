//! Usage text rendering.
//!
//! One row per flag in registration order, `--help` first. Every help
//! column starts at the same offset: the widest synopsis plus five spaces,
//! behind a two-space left margin.

use std::fmt::Write;

use crate::registry::{Flag, FlagSet};

impl FlagSet {
    /// Renders the usage text: a header line, a blank line, and one row per
    /// flag. The header is `Usage: <program> [options]` unless replaced via
    /// [`set_usage_message`](Self::set_usage_message).
    pub fn usage(&self) -> String {
        let rows: Vec<(String, String)> = self
            .iter()
            .map(|(_, flag)| (synopsis(flag), help_text(flag)))
            .collect();
        let column = rows
            .iter()
            .map(|(synopsis, _)| synopsis.len())
            .max()
            .unwrap_or(0)
            + 5;

        let mut out = match self.usage_message() {
            Some(message) => message.to_string(),
            None => format!("Usage: {} [options]", self.program_name()),
        };
        out.push_str("\n\n");
        for (synopsis, help) in rows {
            let _ = writeln!(out, "  {synopsis:<column$}{help}");
        }
        out
    }

    /// Renders [`usage`](Self::usage) with a caller-supplied preamble and a
    /// blank line in front, for wrapping an error in context:
    ///
    /// ```text
    /// Something went wrong
    ///
    /// Usage: program [options]
    /// ...
    /// ```
    pub fn usage_with_message(&self, message: &str) -> String {
        format!("{message}\n\n{}", self.usage())
    }
}

// "--[no-]name" or "--name=VALUE", with active aliases appended the same
// way. Deprecated aliases stay out of usage text.
fn synopsis(flag: &Flag) -> String {
    let mut forms = vec![form(flag.name(), flag.is_boolean())];
    for alias in flag.aliases() {
        if !alias.is_deprecated() {
            forms.push(form(alias.name(), flag.is_boolean()));
        }
    }
    forms.join(", ")
}

fn form(name: &str, boolean: bool) -> String {
    if boolean {
        format!("--[no-]{name}")
    } else {
        format!("--{name}=VALUE")
    }
}

fn help_text(flag: &Flag) -> String {
    match flag.default_text() {
        Some(text) => format!("{} (default: {text})", flag.help()),
        None if flag.is_required() => format!("{} (required)", flag.help()),
        None => flag.help().to_string(),
    }
}
