use serde::{Deserialize, Serialize};

use super::traits::Storage;
use crate::error::HighlightError;

/// What survives a reload. Documents are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
  pub id:           String,
  pub timestamp:    u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description:  Option<String>,
  pub change_count: usize
}

pub(crate) fn load(storage: &dyn Storage, key: &str) -> Result<Vec<SessionMetadata>, HighlightError> {
  match storage.get(key)? {
    Some(raw) => Ok(serde_json::from_str(&raw)?),
    None => Ok(Vec::new())
  }
}

pub(crate) fn save(storage: &dyn Storage, key: &str, sessions: &[SessionMetadata]) -> Result<(), HighlightError> {
  let raw = serde_json::to_string(sessions)?;
  storage.set(key, &raw)?;
  Ok(())
}

pub(crate) fn clear(storage: &dyn Storage, key: &str) -> Result<(), HighlightError> {
  storage.remove(key)?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::storage::MemoryStorage;

  #[test]
  fn test_save_then_load() {
    let storage = MemoryStorage::default();
    let sessions = vec![SessionMetadata {
      id:           "session_1_abc".to_string(),
      timestamp:    1,
      description:  Some("move job".to_string()),
      change_count: 3
    }];

    save(&storage, "key", &sessions).unwrap();
    assert_eq!(load(&storage, "key").unwrap(), sessions);
    assert!(storage.get("key").unwrap().unwrap().contains("\"changeCount\":3"));
  }

  #[test]
  fn test_missing_key_is_empty() {
    assert!(load(&MemoryStorage::default(), "key").unwrap().is_empty());
  }

  #[test]
  fn test_corrupt_data_is_an_error() {
    let storage = MemoryStorage::default();
    storage.set("key", "{not json").unwrap();
    assert!(matches!(load(&storage, "key"), Err(HighlightError::Metadata(_))));
  }
}
