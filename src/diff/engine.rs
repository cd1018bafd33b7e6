//! Positional structural diff over routing documents.
//!
//! Lists are compared index by index. Inserting an element in the middle
//! of a list therefore reports every later element as modified instead of
//! one insertion; consumers rely on `Modified` meaning "same index, other
//! content".

use serde_json::{Map, Value};

use super::describe::{describe, Scope};
use super::types::{Change, ChangeType, Path};
use crate::document::{entity_label, Document, COLLECTIONS, SECTIONS};

/// Computes every difference between `before` and `after`, in collection
/// order and then field declaration order. Never fails: missing or
/// ill-typed sections compare as absent.
pub fn detect_changes(before: &Value, after: &Value) -> Vec<Change> {
  profile!("Detect changes");
  let before = Document::new(before);
  let after = Document::new(after);
  let mut differ = Differ::default();

  for collection in COLLECTIONS {
    differ.compare_collection(collection, before.collection(collection), after.collection(collection));
  }

  for section in SECTIONS {
    differ.compare_section(section, before.get(section), after.get(section));
  }

  for key in other_keys(&before, &after) {
    differ.compare_section(key, before.get(key), after.get(key));
  }

  log::debug!("Detected {} changes", differ.changes.len());
  differ.changes
}

/// Deep equality with canonical number comparison, so `1` equals `1.0`.
/// Two integers are compared exactly.
pub fn values_equal(a: &Value, b: &Value) -> bool {
  match (a, b) {
    (Value::Number(x), Value::Number(y)) if x.is_f64() || y.is_f64() => x.as_f64() == y.as_f64(),
    (Value::Array(x), Value::Array(y)) => x.len() == y.len() && x.iter().zip(y).all(|(a, b)| values_equal(a, b)),
    (Value::Object(x), Value::Object(y)) => {
      x.len() == y.len() && x.iter().all(|(key, a)| y.get(key).is_some_and(|b| values_equal(a, b)))
    },
    _ => a == b
  }
}

#[derive(Default)]
struct Differ {
  changes: Vec<Change>
}

impl Differ {
  fn compare_collection(&mut self, name: &str, before: &[Value], after: &[Value]) {
    let base = Path::root().child(name);

    for index in 0..before.len().max(after.len()) {
      let old = before.get(index);
      let new = after.get(index);
      let scope = Scope::Entity(entity_label(name, new.or(old), index));
      self.compare_present(&base.child(index), old, new, &scope);
    }
  }

  fn compare_section(&mut self, name: &str, before: Option<&Value>, after: Option<&Value>) {
    let scope = Scope::Section(name.to_string());
    self.compare_present(&Path::root().child(name), before, after, &scope);
  }

  fn compare_present(&mut self, path: &Path, old: Option<&Value>, new: Option<&Value>, scope: &Scope) {
    match (old, new) {
      (None, None) => {},
      (None, Some(_)) => self.push(ChangeType::Added, path, old, new, scope),
      (Some(_), None) => self.push(ChangeType::Removed, path, old, new, scope),
      (Some(old), Some(new)) => self.compare_values(path, old, new, scope)
    }
  }

  fn compare_values(&mut self, path: &Path, old: &Value, new: &Value, scope: &Scope) {
    match (old, new) {
      (Value::Object(a), Value::Object(b)) => {
        for key in union_keys(a, b) {
          self.compare_present(&path.child(key), a.get(key), b.get(key), scope);
        }
      },
      (Value::Array(a), Value::Array(b)) => {
        for index in 0..a.len().max(b.len()) {
          self.compare_present(&path.child(index), a.get(index), b.get(index), scope);
        }
      },
      _ if values_equal(old, new) => {},
      _ => self.push(ChangeType::Modified, path, Some(old), Some(new), scope)
    }
  }

  fn push(&mut self, change_type: ChangeType, path: &Path, old: Option<&Value>, new: Option<&Value>, scope: &Scope) {
    self.changes.push(Change {
      change_type,
      path: path.clone(),
      old_value: old.cloned(),
      new_value: new.cloned(),
      description: describe(change_type, path, scope, old, new)
    });
  }
}

// Keys of `a` in order, then keys only `b` has
fn union_keys<'a>(a: &'a Map<String, Value>, b: &'a Map<String, Value>) -> Vec<&'a str> {
  a.keys()
    .chain(b.keys().filter(|key| !a.contains_key(*key)))
    .map(String::as_str)
    .collect()
}

fn other_keys<'a>(before: &Document<'a>, after: &Document<'a>) -> Vec<&'a str> {
  let known = |key: &&str| !COLLECTIONS.contains(key) && !SECTIONS.contains(key);
  let mut keys: Vec<&str> = before.keys().into_iter().filter(known).collect();
  for key in after.keys().into_iter().filter(known) {
    if !keys.contains(&key) {
      keys.push(key);
    }
  }
  keys
}
