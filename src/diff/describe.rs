//! Human readable sentences for changes.

use serde_json::Value;

use super::types::{ChangeType, Path};

const MAX_VALUE_CHARS: usize = 40;

/// What a change belongs to: a labelled list element (`job "A"`) or a
/// free-form section (`options`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Scope {
  Entity(String),
  Section(String)
}

pub(crate) fn describe(change_type: ChangeType, path: &Path, scope: &Scope, old: Option<&Value>, new: Option<&Value>) -> String {
  let leaf = path.leaf_label();
  let values = value_suffix(old, new);

  match (scope, change_type) {
    // The element or section itself
    (Scope::Entity(label), ChangeType::Added) | (Scope::Section(label), ChangeType::Added) if is_scope_root(scope, path) => format!("Added {label}"),
    (Scope::Entity(label), ChangeType::Removed) | (Scope::Section(label), ChangeType::Removed) if is_scope_root(scope, path) => format!("Removed {label}"),
    (Scope::Entity(label), ChangeType::Modified) | (Scope::Section(label), ChangeType::Modified) if is_scope_root(scope, path) => format!("Changed {label}{values}"),

    (Scope::Entity(label), ChangeType::Added) | (Scope::Section(label), ChangeType::Added) => format!("Added {leaf} to {label}"),
    (Scope::Entity(label), ChangeType::Removed) | (Scope::Section(label), ChangeType::Removed) => format!("Removed {leaf} from {label}"),
    (Scope::Entity(label), ChangeType::Modified) => format!("Changed {leaf} of {label}{values}"),
    (Scope::Section(name), ChangeType::Modified) => format!("Changed {leaf} in {name}{values}")
  }
}

fn is_scope_root(scope: &Scope, path: &Path) -> bool {
  match scope {
    Scope::Entity(_) => path.len() == 2,
    Scope::Section(_) => path.len() == 1
  }
}

// Only scalar pairs are spelled out
fn value_suffix(old: Option<&Value>, new: Option<&Value>) -> String {
  match (old, new) {
    (Some(old), Some(new)) if is_scalar(old) && is_scalar(new) => format!(" from {} to {}", short(old), short(new)),
    _ => String::new()
  }
}

fn is_scalar(value: &Value) -> bool {
  !matches!(value, Value::Array(_) | Value::Object(_))
}

fn short(value: &Value) -> String {
  let text = value.to_string();
  if text.chars().count() <= MAX_VALUE_CHARS {
    return text;
  }
  let truncated: String = text.chars().take(MAX_VALUE_CHARS - 3).collect();
  format!("{truncated}...")
}
