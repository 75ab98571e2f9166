//! Coloured user-facing output.
//!
//! Announcements and success lines go to stdout, warnings and errors to
//! stderr. Diagnostics belong in `tracing`, not here.

use crossterm::style::Stylize;

/// Print a blue progress line, e.g. `=> Running command: ...`.
pub fn announce(message: &str) {
    println!("{}", message.blue());
}

/// Print a plain line.
pub fn info(message: &str) {
    println!("{}", message);
}

/// Print a green success line.
pub fn success(message: &str) {
    println!("{}", message.green());
}

/// Print a yellow warning to stderr.
pub fn warn(message: &str) {
    eprintln!("{}", message.yellow());
}

/// Print a red error to stderr.
pub fn error(message: &str) {
    eprintln!("{}", message.red());
}
