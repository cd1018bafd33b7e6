//! Indentation scan over pretty-printed JSON.
//!
//! Walks the lines once per path, tracking the indentation a matching line
//! must have and how many path segments are already matched. Tolerates
//! text that no longer parses, at the cost of trusting the indentation.

use super::TextPosition;
use crate::diff::is_index;

pub(crate) fn locate(lines: &[&str], segments: &[String], indent_width: usize) -> Option<TextPosition> {
  if segments.is_empty() {
    return None;
  }

  let mut expected = indent_width;
  let mut matched = 0;
  let mut elements_seen = 0;

  for (index, line) in lines.iter().enumerate().skip(body_start(lines)) {
    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }

    let lead = leading_whitespace(line);
    if lead < expected {
      // The enclosing block closed before the segment showed up
      return None;
    }
    if lead > expected {
      continue;
    }

    let segment = &segments[matched];
    let hit = if is_index(segment) {
      if is_closing(trimmed) {
        false
      } else {
        let hit = segment.parse::<usize>().is_ok_and(|target| target == elements_seen);
        elements_seen += 1;
        hit
      }
    } else {
      trimmed.starts_with(&key_token(segment))
    };

    if !hit {
      continue;
    }

    matched += 1;
    if matched == segments.len() {
      return Some(TextPosition { line: index + 1, column: lead + 1, length: trimmed.chars().count() });
    }

    if !opens_block(trimmed) {
      return None;
    }
    expected += indent_width;
    elements_seen = 0;
  }

  None
}

/// Width of the first indented line; 2 when nothing is indented.
pub(crate) fn detect_indent_width(text: &str) -> usize {
  text
    .lines()
    .filter(|line| !line.trim().is_empty())
    .map(leading_whitespace)
    .find(|lead| *lead > 0)
    .unwrap_or(2)
}

pub(crate) fn leading_whitespace(line: &str) -> usize {
  line.chars().take_while(|c| c.is_whitespace()).count()
}

// Skip the line opening the root object
fn body_start(lines: &[&str]) -> usize {
  match lines.iter().position(|line| !line.trim().is_empty()) {
    Some(first) if lines[first].trim() == "{" => first + 1,
    _ => 0
  }
}

fn key_token(key: &str) -> String {
  let quoted = serde_json::to_string(key).unwrap_or_else(|_| format!("\"{key}\""));
  format!("{quoted}:")
}

fn is_closing(trimmed: &str) -> bool {
  trimmed.starts_with('}') || trimmed.starts_with(']')
}

fn opens_block(trimmed: &str) -> bool {
  trimmed.ends_with('{') || trimmed.ends_with('[')
}
