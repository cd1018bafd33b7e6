//! Read-only view over a routing problem document.
//!
//! Documents are plain JSON. Sections that are absent or carry the wrong
//! shape read as empty instead of failing, so the diff engine can compare
//! partially filled drafts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const JOBS: &str = "jobs";
pub const RESOURCES: &str = "resources";
pub const OPTIONS: &str = "options";
pub const WEIGHTS: &str = "weights";
pub const RELATIONS: &str = "relations";

/// Sections with list semantics and per-element labels, in diff order.
pub const COLLECTIONS: [&str; 2] = [JOBS, RESOURCES];
/// Free-form sections, in diff order.
pub const SECTIONS: [&str; 3] = [OPTIONS, WEIGHTS, RELATIONS];

static EMPTY: Vec<Value> = Vec::new();

#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
  root: &'a Value
}

impl<'a> Document<'a> {
  pub fn new(root: &'a Value) -> Self {
    Self { root }
  }

  pub fn root(&self) -> &'a Value {
    self.root
  }

  pub fn get(&self, key: &str) -> Option<&'a Value> {
    self.root.as_object().and_then(|map| map.get(key))
  }

  /// Elements of a list section; empty when absent or not an array.
  pub fn collection(&self, key: &str) -> &'a [Value] {
    self.get(key).and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&EMPTY)
  }

  pub fn jobs(&self) -> &'a [Value] {
    self.collection(JOBS)
  }

  pub fn resources(&self) -> &'a [Value] {
    self.collection(RESOURCES)
  }

  pub fn options(&self) -> Option<&'a Map<String, Value>> {
    self.get(OPTIONS).and_then(Value::as_object)
  }

  pub fn weights(&self) -> Option<&'a Map<String, Value>> {
    self.get(WEIGHTS).and_then(Value::as_object)
  }

  pub fn relations(&self) -> &'a [Value] {
    self.collection(RELATIONS)
  }

  /// Top-level keys in document order.
  pub fn keys(&self) -> Vec<&'a str> {
    self
      .root
      .as_object()
      .map(|map| map.keys().map(String::as_str).collect())
      .unwrap_or_default()
  }

  pub fn entity_label(&self, collection: &str, index: usize) -> String {
    entity_label(collection, self.collection(collection).get(index), index)
  }
}

/// `job "Alice"` when the element has a string name, `job #3` otherwise.
pub fn entity_label(collection: &str, element: Option<&Value>, index: usize) -> String {
  let kind = singular(collection);
  match element.and_then(|e| e.get("name")).and_then(Value::as_str) {
    Some(name) if !name.is_empty() => format!("{kind} \"{name}\""),
    _ => format!("{kind} #{index}")
  }
}

pub fn singular(collection: &str) -> &str {
  match collection {
    JOBS => "job",
    RESOURCES => "resource",
    RELATIONS => "relation",
    other => other.strip_suffix('s').unwrap_or(other)
  }
}

/// Limits a problem must stay within to be accepted for solving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexityLimits {
  pub max_jobs:                 usize,
  pub max_resources:            usize,
  pub max_time_windows_per_job: usize,
  pub max_breaks_per_resource:  usize
}

pub const DEMO_LIMITS: ComplexityLimits = ComplexityLimits {
  max_jobs:                 250,
  max_resources:            30,
  max_time_windows_per_job: 5,
  max_breaks_per_resource:  3
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualComplexity {
  pub job_count:          usize,
  pub resource_count:     usize,
  pub max_time_windows:   usize,
  pub total_time_windows: usize
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityReport {
  pub valid:    bool,
  pub errors:   Vec<String>,
  pub warnings: Vec<String>,
  pub actual:   ActualComplexity
}

pub fn check_complexity(doc: &Document<'_>, limits: &ComplexityLimits) -> ComplexityReport {
  let mut errors = Vec::new();
  let mut warnings = Vec::new();

  let jobs = doc.jobs();
  let resources = doc.resources();

  if jobs.len() > limits.max_jobs {
    errors.push(format!("Too many jobs: {} (maximum {})", jobs.len(), limits.max_jobs));
  }
  if jobs.is_empty() {
    errors.push("At least 1 job is required".to_string());
  }
  if resources.len() > limits.max_resources {
    errors.push(format!("Too many resources: {} (maximum {})", resources.len(), limits.max_resources));
  }
  if resources.is_empty() {
    errors.push("At least 1 resource is required".to_string());
  }

  let mut max_time_windows = 0;
  let mut total_time_windows = 0;
  for (index, job) in jobs.iter().enumerate() {
    let count = job.get("windows").and_then(Value::as_array).map_or(0, Vec::len);
    total_time_windows += count;
    max_time_windows = max_time_windows.max(count);

    if count > limits.max_time_windows_per_job {
      errors.push(format!(
        "{} has {} time windows (maximum {})",
        entity_label(JOBS, Some(job), index),
        count,
        limits.max_time_windows_per_job
      ));
    }
  }

  for (index, resource) in resources.iter().enumerate() {
    let shifts = resource.get("shifts").and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&EMPTY);
    for (shift_index, shift) in shifts.iter().enumerate() {
      let breaks = shift.get("breaks").and_then(Value::as_array).map_or(0, Vec::len);
      if breaks > limits.max_breaks_per_resource {
        errors.push(format!(
          "{} shift {} has {} breaks (maximum {})",
          entity_label(RESOURCES, Some(resource), index),
          shift_index,
          breaks,
          limits.max_breaks_per_resource
        ));
      }
    }
  }

  if jobs.len() * 5 > limits.max_jobs * 4 {
    warnings.push(format!("Approaching job limit ({}/{})", jobs.len(), limits.max_jobs));
  }
  if resources.len() * 5 > limits.max_resources * 4 {
    warnings.push(format!("Approaching resource limit ({}/{})", resources.len(), limits.max_resources));
  }

  ComplexityReport {
    valid: errors.is_empty(),
    errors,
    warnings,
    actual: ActualComplexity {
      job_count: jobs.len(),
      resource_count: resources.len(),
      max_time_windows,
      total_time_windows
    }
  }
}

/// Rough solve time in seconds.
pub fn estimate_solve_time(doc: &Document<'_>) -> f64 {
  2.0 + doc.jobs().len() as f64 * 0.1 + doc.resources().len() as f64 * 0.5
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_missing_sections_read_as_empty() {
    let value = json!({ "jobs": "not a list" });
    let doc = Document::new(&value);
    assert!(doc.jobs().is_empty());
    assert!(doc.resources().is_empty());
    assert!(doc.options().is_none());
  }

  #[test]
  fn test_entity_label_prefers_name() {
    let value = json!({ "jobs": [{ "name": "Depot pickup" }, { "duration": 30 }] });
    let doc = Document::new(&value);
    assert_eq!(doc.entity_label(JOBS, 0), "job \"Depot pickup\"");
    assert_eq!(doc.entity_label(JOBS, 1), "job #1");
    assert_eq!(doc.entity_label(RESOURCES, 4), "resource #4");
  }

  #[test]
  fn test_check_complexity_counts_windows() {
    let value = json!({
      "jobs": [
        { "name": "a", "windows": [{}, {}] },
        { "name": "b", "windows": [{}] }
      ],
      "resources": [{ "name": "van" }]
    });
    let report = check_complexity(&Document::new(&value), &DEMO_LIMITS);
    assert!(report.valid);
    assert_eq!(report.actual.max_time_windows, 2);
    assert_eq!(report.actual.total_time_windows, 3);
  }

  #[test]
  fn test_check_complexity_flags_limits() {
    let limits = ComplexityLimits { max_jobs: 1, max_resources: 5, max_time_windows_per_job: 1, max_breaks_per_resource: 0 };
    let value = json!({
      "jobs": [{ "name": "a", "windows": [{}, {}] }, { "name": "b" }],
      "resources": [{ "name": "van", "shifts": [{ "breaks": [{}] }] }]
    });
    let report = check_complexity(&Document::new(&value), &limits);
    assert!(!report.valid);
    assert_eq!(report.errors.len(), 3);
    assert!(report.errors[0].starts_with("Too many jobs"));
    assert!(report.errors.iter().any(|e| e.contains("job \"a\" has 2 time windows")));
    assert!(report.errors.iter().any(|e| e.contains("resource \"van\" shift 0 has 1 breaks")));
  }

  #[test]
  fn test_empty_problem_is_invalid() {
    let value = json!({});
    let report = check_complexity(&Document::new(&value), &DEMO_LIMITS);
    assert_eq!(report.errors, vec!["At least 1 job is required", "At least 1 resource is required"]);
  }

  #[test]
  fn test_estimate_solve_time() {
    let value = json!({ "jobs": [{}, {}], "resources": [{}] });
    let estimate = estimate_solve_time(&Document::new(&value));
    assert!((estimate - 2.7).abs() < 1e-9);
  }
}
