use owo_colors::{AnsiColors, OwoColorize};

use crate::validate::Status;

// ---------------------------------------------------------------------------
// Status → terminal colour / icon
// ---------------------------------------------------------------------------

pub fn status_color(status: Status) -> AnsiColors {
    match status {
        Status::Success => AnsiColors::Green,
        Status::Caution => AnsiColors::Yellow,
        Status::Warning => AnsiColors::BrightRed,
        Status::Failed => AnsiColors::Red,
        Status::NoData => AnsiColors::BrightBlack,
    }
}

pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Caution => "⚠",
        Status::Warning | Status::Failed => "✗",
        Status::NoData => "?",
    }
}

/// Colours status text when writing to a terminal, passes it through otherwise.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    pub fn new(enabled: bool) -> Self {
        Painter { enabled }
    }

    /// Enable colour when stdout is a terminal and `NO_COLOR` is unset.
    pub fn for_stdout() -> Self {
        use std::io::IsTerminal;
        let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Painter::new(!no_color && std::io::stdout().is_terminal())
    }

    pub fn status(&self, status: Status, text: &str) -> String {
        if self.enabled {
            text.color(status_color(status)).to_string()
        } else {
            text.to_string()
        }
    }

    /// `✓ SUCCESS` in the status colour.
    pub fn badge(&self, status: Status) -> String {
        let label = format!("{} {}", status_icon(status), status.as_str().to_uppercase());
        self.status(status, &label)
    }

    pub fn dim(&self, text: &str) -> String {
        if self.enabled {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn bold(&self, text: &str) -> String {
        if self.enabled {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }
}
