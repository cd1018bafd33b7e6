//! Maps changes onto the pretty-printed text of the after document.
//!
//! Each change gets an anchor (line, column of its key or element) and a
//! single-line highlight range running to the end of that line. Changes
//! whose path is not in the text keep `text_position: None`; one missing
//! anchor never fails the batch.

mod heuristic;
mod parser;

use serde::{Deserialize, Serialize};

use crate::diff::{AsChange, Change, ChangeType, Path};

/// 1-based anchor plus the length of the rest of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextPosition {
  pub line:   usize,
  pub column: usize,
  pub length: usize
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightRange {
  pub start_line:   usize,
  pub start_column: usize,
  pub end_line:     usize,
  pub end_column:   usize
}

impl From<&TextPosition> for HighlightRange {
  fn from(position: &TextPosition) -> Self {
    Self {
      start_line:   position.line,
      start_column: position.column,
      end_line:     position.line,
      end_column:   position.column + position.length
    }
  }
}

/// A [`Change`] plus where it sits in the text, when that is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightableChange {
  #[serde(flatten)]
  pub change:          Change,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub text_position:   Option<TextPosition>,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub highlight_range: Option<HighlightRange>
}

impl HighlightableChange {
  pub fn new(change: Change, text_position: Option<TextPosition>) -> Self {
    let highlight_range = text_position.as_ref().map(HighlightRange::from);
    Self { change, text_position, highlight_range }
  }

  pub fn is_located(&self) -> bool {
    self.text_position.is_some()
  }
}

impl AsChange for HighlightableChange {
  fn change(&self) -> &Change {
    &self.change
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocatorStrategy {
  /// Indentation scan only.
  Heuristic,
  /// Tokenize the text once; fall back to the scan when it does not parse.
  #[default]
  Parsed
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatorOptions {
  /// Spaces per nesting level; 0 detects it from the text.
  pub indent_width: usize,
  pub strategy:     LocatorStrategy
}

impl Default for LocatorOptions {
  fn default() -> Self {
    Self { indent_width: 2, strategy: LocatorStrategy::default() }
  }
}

impl LocatorOptions {
  fn resolve_indent(&self, text: &str) -> usize {
    match self.indent_width {
      0 => heuristic::detect_indent_width(text),
      width => width
    }
  }
}

pub fn map_changes_to_text(changes: &[Change], text: &str) -> Vec<HighlightableChange> {
  map_changes_to_text_with(changes, text, &LocatorOptions::default())
}

pub fn map_changes_to_text_with(changes: &[Change], text: &str, options: &LocatorOptions) -> Vec<HighlightableChange> {
  profile!("Map changes to text");
  let lines: Vec<&str> = text.lines().collect();

  let anchors = match options.strategy {
    LocatorStrategy::Parsed => {
      let anchors = parser::index_anchors(text);
      if anchors.is_none() {
        log::debug!("Text does not tokenize, falling back to indentation scan");
      }
      anchors
    },
    LocatorStrategy::Heuristic => None
  };
  let indent_width = options.resolve_indent(text);

  let located: Vec<HighlightableChange> = changes
    .iter()
    .map(|change| {
      let position = match &anchors {
        Some(anchors) => anchors.get(&change.path).map(|&(line, column)| position_at(&lines, line, column)),
        None => heuristic::locate(&lines, change.path.segments(), indent_width)
      };
      HighlightableChange::new(change.clone(), position)
    })
    .collect();

  log::debug!(
    "Located {} of {} changes in {} lines",
    located.iter().filter(|c| c.is_located()).count(),
    changes.len(),
    lines.len()
  );
  located
}

/// Anchor for a single path, or `None` when the text does not contain it.
pub fn locate_path(path: &Path, text: &str, options: &LocatorOptions) -> Option<TextPosition> {
  let change = Change {
    change_type: ChangeType::Modified,
    path:        path.clone(),
    old_value:   None,
    new_value:   None,
    description: String::new()
  };
  map_changes_to_text_with(std::slice::from_ref(&change), text, options)
    .pop()
    .and_then(|located| located.text_position)
}

fn position_at(lines: &[&str], line: usize, column: usize) -> TextPosition {
  let rest = lines
    .get(line - 1)
    .map(|text| text.chars().skip(column - 1).collect::<String>())
    .unwrap_or_default();
  TextPosition { line, column, length: rest.trim_end().chars().count() }
}
