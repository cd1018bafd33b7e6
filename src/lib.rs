#[macro_export]
macro_rules! profile {
  ($name:expr) => {
    let _span = tracing::span!(tracing::Level::DEBUG, $name);
    let _enter = _span.enter();
  };
}

pub mod config;
pub mod diff;
pub mod document;
pub mod error;
pub mod locator;
pub mod profiling;
pub mod render;
pub mod session;
pub mod storage;
pub mod theme;

// Re-exports
pub use diff::{detect_changes, filter_changes_by_path, filter_changes_by_type, get_change_summary, Change, ChangeSummary, ChangeType, Path};
pub use document::Document;
pub use error::HighlightError;
pub use locator::{map_changes_to_text, HighlightRange, HighlightableChange, TextPosition};
pub use profiling::Profile;
pub use session::{HighlightSession, SessionManager};
