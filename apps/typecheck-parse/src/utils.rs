//! Coloured message prefixes for stderr output.

use owo_colors::OwoColorize;

/// Colours are on unless `NO_COLOR` is set.
pub fn use_colors() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

fn prefix(label: &str, paint: fn(&str) -> String) -> String {
    let text = format!("⟦{}⟧", label);
    if use_colors() {
        paint(&text)
    } else {
        text
    }
}

pub fn error_prefix() -> String {
    prefix("error", |s| s.red().bold().to_string())
}

pub fn note_prefix() -> String {
    prefix("note", |s| s.yellow().bold().to_string())
}

pub fn info_prefix() -> String {
    prefix("info", |s| s.blue().bold().to_string())
}

pub fn debug_prefix() -> String {
    prefix("debug", |s| s.bright_black().to_string())
}
