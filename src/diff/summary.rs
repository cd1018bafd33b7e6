//! Counting and filtering helpers over change lists.

use super::types::{Change, ChangeSummary, ChangeType};

/// Anything that wraps a [`Change`], so the helpers work on located
/// changes too.
pub trait AsChange {
  fn change(&self) -> &Change;
}

impl AsChange for Change {
  fn change(&self) -> &Change {
    self
  }
}

pub fn get_change_summary<C: AsChange>(changes: &[C]) -> ChangeSummary {
  changes.iter().fold(ChangeSummary::default(), |mut summary, c| {
    match c.change().change_type {
      ChangeType::Added => summary.added += 1,
      ChangeType::Modified => summary.modified += 1,
      ChangeType::Removed => summary.removed += 1
    }
    summary
  })
}

pub fn filter_changes_by_type<C: AsChange + Clone>(changes: &[C], change_type: ChangeType) -> Vec<C> {
  changes
    .iter()
    .filter(|c| c.change().change_type == change_type)
    .cloned()
    .collect()
}

/// Changes at or below `prefix`, e.g. everything under `["jobs", "2"]`.
pub fn filter_changes_by_path<C: AsChange + Clone, S: AsRef<str>>(changes: &[C], prefix: &[S]) -> Vec<C> {
  changes
    .iter()
    .filter(|c| c.change().path.starts_with(prefix))
    .cloned()
    .collect()
}
