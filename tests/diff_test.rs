use highlight::{detect_changes, filter_changes_by_path, filter_changes_by_type, get_change_summary, ChangeSummary, ChangeType, Path};
use serde_json::{json, Value};

mod common;

use common::{base_document, job, resource};

fn leaf_paths(value: &Value, path: Path, out: &mut Vec<(Path, Value)>) {
  match value {
    Value::Object(map) => map.iter().for_each(|(key, child)| leaf_paths(child, path.child(key), out)),
    Value::Array(items) => items.iter().enumerate().for_each(|(i, child)| leaf_paths(child, path.child(i), out)),
    scalar => out.push((path, scalar.clone()))
  }
}

fn resolve<'a>(value: &'a Value, path: &Path) -> Option<&'a Value> {
  path.segments().iter().try_fold(value, |node, segment| match node {
    Value::Object(map) => map.get(segment),
    Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
    _ => None
  })
}

fn sample_pairs() -> Vec<(Value, Value)> {
  let mut edited = base_document();
  edited["jobs"][0]["duration"] = json!(600);
  edited["jobs"][1]["windows"] = json!([{ "from": "09:00", "to": "12:00" }]);
  edited["resources"][0]["shift"]["end"] = json!("20:00");
  edited["options"] = json!({ "traffic": 1.1, "balance": true });

  let mut shrunk = base_document();
  shrunk["jobs"].as_array_mut().unwrap().pop();
  shrunk["resources"][0].as_object_mut().unwrap().remove("capacity");
  shrunk["weights"] = json!({ "distance": 1, "time": 2 });

  vec![(base_document(), edited), (base_document(), shrunk), (json!({}), base_document())]
}

#[test]
fn test_identical_documents_have_no_changes() {
  for (before, after) in sample_pairs() {
    assert!(detect_changes(&before, &before).is_empty());
    assert!(detect_changes(&after, &after).is_empty());
  }
  assert!(detect_changes(&Value::Null, &Value::Null).is_empty());
}

#[test]
fn test_presence_is_symmetric() {
  for (before, after) in sample_pairs() {
    let forward = detect_changes(&before, &after);
    let backward = detect_changes(&after, &before);

    for added in filter_changes_by_type(&forward, ChangeType::Added) {
      assert!(
        backward.iter().any(|c| c.path == added.path && c.change_type == ChangeType::Removed),
        "no matching removal for {}",
        added.path
      );
    }
    for removed in filter_changes_by_type(&forward, ChangeType::Removed) {
      assert!(backward.iter().any(|c| c.path == removed.path && c.change_type == ChangeType::Added));
    }
  }
}

#[test]
fn test_every_differing_leaf_has_one_modified_change() {
  for (before, after) in sample_pairs() {
    let changes = detect_changes(&before, &after);
    let mut leaves = Vec::new();
    leaf_paths(&before, Path::root(), &mut leaves);

    for (path, old) in leaves {
      let Some(new) = resolve(&after, &path) else { continue };
      if new.is_object() || new.is_array() || *new == old {
        continue;
      }
      let matching = changes.iter().filter(|c| c.change_type == ChangeType::Modified && c.path == path).count();
      assert_eq!(matching, 1, "expected one modification at {path}");
    }
  }
}

#[test]
fn test_add_job_scenario() {
  let before = base_document();
  let mut after = base_document();
  after["jobs"].as_array_mut().unwrap().push(job("C"));

  let changes = detect_changes(&before, &after);
  assert_eq!(changes.len(), 1);
  assert_eq!(changes[0].change_type, ChangeType::Added);
  assert_eq!(changes[0].path, Path::from(["jobs", "2"]));
  assert_eq!(changes[0].description, "Added job \"C\"");
  assert_eq!(changes[0].new_value.as_ref(), Some(&job("C")));
  assert_eq!(get_change_summary(&changes), ChangeSummary { added: 1, modified: 0, removed: 0 });
}

#[test]
fn test_nested_window_scenario() {
  let before = base_document();
  let mut after = base_document();
  after["jobs"][0]["windows"] = json!([{ "from": "09:00", "to": "17:00" }]);

  let changes = detect_changes(&before, &after);
  assert_eq!(changes.len(), 1);
  assert_eq!(changes[0].change_type, ChangeType::Added);
  assert_eq!(changes[0].path, Path::from(["jobs", "0", "windows", "0"]));
  assert_eq!(changes[0].old_value, None);
}

#[test]
fn test_removed_resource_carries_old_value() {
  let before = json!({ "resources": [resource("R"), resource("S")] });
  let after = json!({ "resources": [resource("R")] });

  let changes = detect_changes(&before, &after);
  assert_eq!(changes.len(), 1);
  assert_eq!(changes[0].change_type, ChangeType::Removed);
  assert_eq!(changes[0].description, "Removed resource \"S\"");
  assert_eq!(changes[0].old_value.as_ref(), Some(&resource("S")));
}

#[test]
fn test_collections_come_before_sections() {
  let before = base_document();
  let mut after = base_document();
  after["options"] = json!({ "traffic": 1.0 });
  after["resources"][0]["name"] = json!("Van");
  after["jobs"][1]["duration"] = json!(10);

  let paths: Vec<String> = detect_changes(&before, &after).iter().map(|c| c.path.to_string()).collect();
  assert_eq!(paths, vec!["jobs[1].duration", "resources[0].name", "options"]);
}

#[test]
fn test_filters_by_type_and_path() {
  let (before, after) = sample_pairs().remove(0);
  let changes = detect_changes(&before, &after);

  let jobs = filter_changes_by_path(&changes, &["jobs"]);
  assert!(!jobs.is_empty());
  assert!(jobs.iter().all(|c| c.path.starts_with(&["jobs"])));

  let summary = get_change_summary(&changes);
  assert_eq!(summary.total(), changes.len());
  assert_eq!(filter_changes_by_type(&changes, ChangeType::Modified).len(), summary.modified);
}
