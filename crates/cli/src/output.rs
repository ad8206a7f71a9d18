//! Terminal output helpers.

use colored::*;
use std::env;

/// Check if colored output should be used
pub fn use_colored_output() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    if let Ok(term) = env::var("TERM") {
        if term == "dumb" || term == "unknown" {
            return false;
        }
    }
    if env::var("CI").is_ok() || env::var("CONTINUOUS_INTEGRATION").is_ok() {
        return false;
    }
    true
}

/// Plugin or codec name, highlighted when colors are on.
pub fn name(s: &str) -> String {
    if use_colored_output() {
        s.bright_blue().bold().to_string()
    } else {
        s.to_string()
    }
}

/// Secondary text such as sources and help lines.
pub fn dim(s: &str) -> String {
    if use_colored_output() {
        s.dimmed().to_string()
    } else {
        s.to_string()
    }
}

/// Print a colored message with fallback for basic terminals
pub fn print_tag(tag: &str, message: &str) {
    if use_colored_output() {
        println!("[{}] {message}", tag.bright_yellow().bold());
    } else {
        println!("[{tag}] {message}");
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
