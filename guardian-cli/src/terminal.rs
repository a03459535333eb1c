//! Terminal output for the guardian binary.
//!
//! Logs go to stderr through `log`; this module prints the user-facing
//! lines: errors, warnings and the end-of-run summary. Color is disabled
//! when `NO_COLOR` is set.

use console::style;
use unicode_width::UnicodeWidthStr;

/// Applies `NO_COLOR` to both output streams.
pub fn init_colors() {
    if should_disable_color() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
}

fn should_disable_color() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty())
}

/// Print a section header
pub fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("===== {} =====", title.to_uppercase())).cyan().bold());
}

pub fn print_success(message: &str) {
    println!("{} {message}", style("✓").green().bold());
}

pub fn print_warning(message: &str) {
    eprintln!("{} {message}", style("Warning:").yellow().bold());
}

/// Print a fatal error on stderr.
pub fn print_error(message: &str) {
    eprintln!("{} {message}", style("Error:").red().bold());
}

/// Print aligned key/value lines.
pub fn print_fields(fields: &[(&str, String)]) {
    let width = fields.iter().map(|(k, _)| k.width()).max().unwrap_or(0);
    for (key, value) in fields {
        println!("  {}  {value}", style(pad_to_width(key, width)).bold());
    }
}

/// Right-pads `text` with spaces to `width` display columns.
pub fn pad_to_width(text: &str, width: usize) -> String {
    let current = text.width();
    if current >= width {
        text.to_string()
    } else {
        format!("{text}{}", " ".repeat(width - current))
    }
}
