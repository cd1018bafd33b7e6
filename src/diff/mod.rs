//! Semantic diff between two routing documents.
//!
//! The engine walks the known collections (jobs, resources) element by
//! element and the free-form sections key by key, producing one targeted
//! [`Change`] per differing node.

mod describe;
pub mod engine;
pub mod summary;
pub mod types;

pub use engine::{detect_changes, values_equal};
pub use summary::{filter_changes_by_path, filter_changes_by_type, get_change_summary, AsChange};
pub use types::{is_index, Change, ChangeSummary, ChangeType, Path};
