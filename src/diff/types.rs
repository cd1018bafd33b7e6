use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
  Added,
  Modified,
  Removed
}

impl ChangeType {
  pub const ALL: [ChangeType; 3] = [ChangeType::Added, ChangeType::Modified, ChangeType::Removed];

  pub fn as_str(&self) -> &'static str {
    match self {
      ChangeType::Added => "added",
      ChangeType::Modified => "modified",
      ChangeType::Removed => "removed"
    }
  }

  pub fn verb(&self) -> &'static str {
    match self {
      ChangeType::Added => "Added",
      ChangeType::Modified => "Modified",
      ChangeType::Removed => "Removed"
    }
  }
}

impl fmt::Display for ChangeType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for ChangeType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "added" | "add" => Ok(ChangeType::Added),
      "modified" | "modify" | "changed" => Ok(ChangeType::Modified),
      "removed" | "remove" | "deleted" => Ok(ChangeType::Removed),
      other => Err(format!("unknown change type '{other}'"))
    }
  }
}

/// Location of a node inside a document: object keys and stringified
/// array indices, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<String>);

impl Path {
  pub fn root() -> Self {
    Self(Vec::new())
  }

  pub fn segments(&self) -> &[String] {
    &self.0
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn last(&self) -> Option<&str> {
    self.0.last().map(String::as_str)
  }

  /// New path with `segment` appended.
  pub fn child(&self, segment: impl ToString) -> Self {
    let mut segments = self.0.clone();
    segments.push(segment.to_string());
    Self(segments)
  }

  /// All but the last segment.
  pub fn parent(&self) -> Self {
    let end = self.0.len().saturating_sub(1);
    Self(self.0[..end].to_vec())
  }

  pub fn starts_with<S: AsRef<str>>(&self, prefix: &[S]) -> bool {
    prefix.len() <= self.0.len() && self.0.iter().zip(prefix).all(|(a, b)| a == b.as_ref())
  }

  /// Label of the terminal segment: `duration`, or `windows[0]` for an index.
  pub fn leaf_label(&self) -> String {
    match self.0.as_slice() {
      [] => String::new(),
      [.., parent, last] if is_index(last) && !is_index(parent) => format!("{parent}[{last}]"),
      [.., last] if is_index(last) => format!("[{last}]"),
      [.., last] => last.clone()
    }
  }
}

impl fmt::Display for Path {
  /// `jobs[2].windows[0].from`
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, segment) in self.0.iter().enumerate() {
      if is_index(segment) {
        write!(f, "[{segment}]")?;
      } else if i == 0 {
        f.write_str(segment)?;
      } else {
        write!(f, ".{segment}")?;
      }
    }
    Ok(())
  }
}

impl<S: Into<String>> FromIterator<S> for Path {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    Self(iter.into_iter().map(Into::into).collect())
  }
}

impl From<Vec<String>> for Path {
  fn from(segments: Vec<String>) -> Self {
    Self(segments)
  }
}

impl From<&[&str]> for Path {
  fn from(segments: &[&str]) -> Self {
    segments.iter().copied().collect()
  }
}

impl<const N: usize> From<[&str; N]> for Path {
  fn from(segments: [&str; N]) -> Self {
    segments.into_iter().collect()
  }
}

/// Segments carry no type information; an all-digit segment is an index.
pub fn is_index(segment: &str) -> bool {
  !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// One semantic difference between two documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
  #[serde(rename = "type")]
  pub change_type: ChangeType,
  pub path:        Path,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub old_value:   Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub new_value:   Option<Value>,
  pub description: String
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
  pub added:    usize,
  pub modified: usize,
  pub removed:  usize
}

impl ChangeSummary {
  pub fn total(&self) -> usize {
    self.added + self.modified + self.removed
  }
}
