//! Highlight sessions: one diff, its located changes, and the state needed
//! to draw and navigate them in a live editing surface.

mod grouping;
mod manager;
mod persistence;
mod store;
pub mod traits;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::diff::ChangeSummary;
use crate::locator::HighlightableChange;

pub use grouping::group_changes;
pub use manager::SessionManager;
pub use persistence::SessionMetadata;
pub use traits::{CursorPosition, Decoration, DecorationHandle, DecorationRenderer, Storage, Subscription, TextSource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightSession {
  pub id:                String,
  /// Unix milliseconds.
  pub timestamp:         u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description:       Option<String>,
  pub changes:           Vec<HighlightableChange>,
  pub original_document: Value,
  pub modified_document: Value
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
  pub added:    usize,
  pub modified: usize,
  pub removed:  usize,
  pub total:    usize
}

impl From<ChangeSummary> for SessionStats {
  fn from(summary: ChangeSummary) -> Self {
    Self { added: summary.added, modified: summary.modified, removed: summary.removed, total: summary.total() }
  }
}

/// Lifecycle of a session id. Evicted is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
  Active,
  Inactive,
  Evicted
}
