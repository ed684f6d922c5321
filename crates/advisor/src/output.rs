//! Prefixed status lines on stderr. Listing output goes to stdout; anything
//! about the progress of a request comes through here.

use colored::*;

use crate::dashboard::Status;

/// Format a colored prefix for status lines
fn format_prefix(color: Color, prefix: &str) -> String {
  format!("[{}]{:<width$}", prefix.color(color).bold(), "", width = 7 - prefix.len() - 2)
}

fn emit(color: Color, prefix: &str, message: &str) {
  let prefix = format_prefix(color, prefix);
  for line in message.lines() {
    eprintln!("{prefix} {line}");
  }
}

pub fn info(message: &str) {
  emit(Color::Blue, "info", message);
}

pub fn warn(message: &str) {
  emit(Color::Yellow, "warn", message);
}

pub fn error(message: &str) {
  emit(Color::Red, "error", message);
}

pub fn success(message: &str) {
  emit(Color::Green, "sccs", message);
}

/// Create a banner line of the specified length and character
pub fn banner_line(length: usize, ch: char) -> String {
  ch.to_string().repeat(length)
}

/// Report the dashboard status the way the user should see it
pub fn report_status(status: &Status) {
  match status {
    Status::Idle | Status::Ready => {}
    Status::Loading(op) => info(&format!("{op}...")),
    Status::Empty => warn(status.message().unwrap_or_default()),
    Status::Failed(message) => error(message),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_banner_line() {
    assert_eq!(banner_line(5, '='), "=====");
    assert_eq!(banner_line(0, '-'), "");
  }

  #[test]
  fn test_prefix_pads_to_fixed_width() {
    colored::control::set_override(false);
    assert_eq!(format_prefix(Color::Blue, "info"), "[info] ");
    assert_eq!(format_prefix(Color::Red, "error"), "[error]");
    colored::control::unset_override();
  }
}
