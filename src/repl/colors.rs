//! ANSI color helpers for pretty terminal output
//!
//! Simple, tasteful colors that work on most terminals.

/// ANSI escape codes
pub mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

use ansi::*;

/// Format an error message (red)
pub fn error(msg: &str) -> String {
    format!("{}{}{}", RED, msg, RESET)
}

/// Format a warning message (yellow)
pub fn warning(msg: &str) -> String {
    format!("{}{}{}", YELLOW, msg, RESET)
}

/// Format a status/info message (cyan)
pub fn status(msg: &str) -> String {
    format!("{}{}{}", CYAN, msg, RESET)
}

/// Format a quiet/dim note (gray)
pub fn note(msg: &str) -> String {
    format!("{}{}{}", GRAY, msg, RESET)
}

/// Format the readline prompt
pub fn prompt() -> String {
    format!("{}{}You: {}", BOLD, GREEN, RESET)
}

/// Header printed before each thinking step in verbose mode
pub fn thinking_header(step: u32, max: u32) -> String {
    format!("{}Thinking (Step {}/{}): {}", YELLOW, step, max, RESET)
}

/// Label printed before the final answer
pub fn answer_label() -> String {
    format!("{}Answer: {}", BLUE, RESET)
}

/// Format a horizontal separator
pub fn separator(width: usize) -> String {
    format!("{}{}{}", DIM, "─".repeat(width), RESET)
}

/// Format a startup banner line
pub fn banner_line(label: &str, value: &str) -> String {
    format!("{}{:<12}{} {}", DIM, label, RESET, value)
}

/// Format the startup banner title
pub fn banner_accent(text: &str) -> String {
    format!("{}{}{}{}", BOLD, BLUE, text, RESET)
}
