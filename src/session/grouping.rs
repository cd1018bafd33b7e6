//! Smart grouping of sibling changes.
//!
//! Changes that share a parent path are collapsed into one summary when
//! they all have the same type. Mixed groups keep every change and tag the
//! description with the shared parent instead.

use std::collections::HashMap;

use crate::diff::{is_index, Change, ChangeType, Path};
use crate::locator::HighlightableChange;

pub fn group_changes(changes: Vec<HighlightableChange>) -> Vec<HighlightableChange> {
  profile!("Group changes");
  let mut groups: Vec<(Path, Vec<HighlightableChange>)> = Vec::new();
  let mut slot: HashMap<Path, usize> = HashMap::new();

  for change in changes {
    let prefix = change.change.path.parent();
    match slot.get(&prefix) {
      Some(&index) => groups[index].1.push(change),
      None => {
        slot.insert(prefix.clone(), groups.len());
        groups.push((prefix, vec![change]));
      }
    }
  }

  let mut grouped = Vec::new();
  for (prefix, mut members) in groups {
    if members.len() < 2 {
      grouped.append(&mut members);
      continue;
    }

    let change_type = members[0].change.change_type;
    if members.iter().all(|m| m.change.change_type == change_type) {
      grouped.push(summarize(&prefix, change_type, &members));
    } else {
      let label = prefix_label(&prefix);
      for mut member in members {
        member.change.description = format!("{} (part of {} changes)", member.change.description, label);
        grouped.push(member);
      }
    }
  }

  log::debug!("Grouped changes into {} entries", grouped.len());
  grouped
}

fn summarize(prefix: &Path, change_type: ChangeType, members: &[HighlightableChange]) -> HighlightableChange {
  let noun = if members.iter().all(|m| m.change.path.last().is_some_and(is_index)) { "items" } else { "properties" };
  let description = format!("{} {} {} in {}", change_type.verb(), members.len(), noun, prefix_label(prefix));
  let anchor = members.iter().find(|m| m.is_located()).unwrap_or(&members[0]);

  HighlightableChange {
    change:          Change {
      change_type,
      path: prefix.clone(),
      old_value: None,
      new_value: None,
      description
    },
    text_position:   anchor.text_position,
    highlight_range: anchor.highlight_range
  }
}

fn prefix_label(prefix: &Path) -> String {
  if prefix.is_empty() {
    "document".to_string()
  } else {
    prefix.to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::locator::TextPosition;

  fn located(change_type: ChangeType, path: &[&str], line: Option<usize>) -> HighlightableChange {
    let change = Change {
      change_type,
      path: Path::from(path),
      old_value: None,
      new_value: None,
      description: format!("{change_type} {}", path.join("."))
    };
    HighlightableChange::new(change, line.map(|line| TextPosition { line, column: 7, length: 10 }))
  }

  #[test]
  fn test_same_type_siblings_collapse() {
    let grouped = group_changes(vec![
      located(ChangeType::Modified, &["resources", "0", "name"], Some(30)),
      located(ChangeType::Modified, &["resources", "0", "capacity"], Some(31)),
      located(ChangeType::Added, &["jobs", "2"], Some(12)),
    ]);

    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped[0].change.path, Path::from(["resources", "0"]));
    assert_eq!(grouped[0].change.description, "Modified 2 properties in resources[0]");
    assert_eq!(grouped[0].text_position.map(|p| p.line), Some(30));
    assert_eq!(grouped[1].change.path, Path::from(["jobs", "2"]));
  }

  #[test]
  fn test_mixed_types_are_annotated() {
    let grouped = group_changes(vec![
      located(ChangeType::Modified, &["jobs", "2", "duration"], Some(20)),
      located(ChangeType::Added, &["jobs", "2", "priority"], Some(21)),
    ]);

    assert_eq!(grouped.len(), 2);
    assert!(grouped.iter().all(|c| c.change.description.ends_with("(part of jobs[2] changes)")));
  }

  #[test]
  fn test_summary_anchors_on_first_located_member() {
    let grouped = group_changes(vec![
      located(ChangeType::Added, &["jobs", "3"], None),
      located(ChangeType::Added, &["jobs", "4"], Some(40)),
    ]);

    assert_eq!(grouped.len(), 1);
    assert_eq!(grouped[0].change.description, "Added 2 items in jobs");
    assert_eq!(grouped[0].text_position.map(|p| p.line), Some(40));
    assert!(grouped[0].highlight_range.is_some());
  }

  #[test]
  fn test_group_order_follows_first_member() {
    let grouped = group_changes(vec![
      located(ChangeType::Removed, &["options", "a"], None),
      located(ChangeType::Modified, &["jobs", "0", "x"], None),
      located(ChangeType::Removed, &["options", "b"], None),
    ]);
    let paths: Vec<String> = grouped.iter().map(|c| c.change.path.to_string()).collect();
    assert_eq!(paths, vec!["options", "jobs[0].x"]);
  }
}
