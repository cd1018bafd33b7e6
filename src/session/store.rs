use std::collections::{HashMap, VecDeque};

use crate::diff::Change;

use super::HighlightSession;

/// How many evicted ids are remembered. Older ones are reported as unknown.
pub(crate) const RETIRED_LIMIT: usize = 256;

/// A session plus the ungrouped change list it was built from.
#[derive(Debug, Clone)]
pub(crate) struct StoredSession {
  pub session:  HighlightSession,
  pub detected: Vec<Change>,
  sequence:     u64
}

/// Sessions keyed by id with an explicit recency list. Inserting past
/// `capacity` evicts the least recently used sessions.
#[derive(Debug)]
pub(crate) struct SessionStore {
  entries:       HashMap<String, StoredSession>,
  recency:       VecDeque<String>,
  retired:       VecDeque<String>,
  capacity:      usize,
  next_sequence: u64
}

impl SessionStore {
  pub fn new(capacity: usize) -> Self {
    Self {
      entries:       HashMap::new(),
      recency:       VecDeque::new(),
      retired:       VecDeque::new(),
      capacity:      capacity.max(1),
      next_sequence: 0
    }
  }

  /// Stores `session` as the most recently used one and returns the ids
  /// evicted to stay within capacity.
  pub fn insert(&mut self, session: HighlightSession, detected: Vec<Change>) -> Vec<String> {
    let id = session.id.clone();
    let sequence = self.next_sequence;
    self.next_sequence += 1;

    self.recency.retain(|existing| existing != &id);
    self.recency.push_back(id.clone());
    self.entries.insert(id, StoredSession { session, detected, sequence });

    let mut evicted = Vec::new();
    while self.recency.len() > self.capacity {
      if let Some(oldest) = self.recency.pop_front() {
        self.entries.remove(&oldest);
        self.retire(oldest.clone());
        evicted.push(oldest);
      }
    }
    evicted
  }

  /// Marks `id` most recently used.
  pub fn touch(&mut self, id: &str) -> bool {
    if !self.entries.contains_key(id) {
      return false;
    }
    self.recency.retain(|existing| existing != id);
    self.recency.push_back(id.to_string());
    true
  }

  pub fn get(&self, id: &str) -> Option<&StoredSession> {
    self.entries.get(id)
  }

  pub fn get_mut(&mut self, id: &str) -> Option<&mut StoredSession> {
    self.entries.get_mut(id)
  }

  pub fn contains(&self, id: &str) -> bool {
    self.entries.contains_key(id)
  }

  pub fn was_retired(&self, id: &str) -> bool {
    self.retired.iter().any(|retired| retired == id)
  }

  /// Sessions in creation order.
  pub fn sessions(&self) -> Vec<&StoredSession> {
    let mut sessions: Vec<&StoredSession> = self.entries.values().collect();
    sessions.sort_by_key(|stored| stored.sequence);
    sessions
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn clear(&mut self) {
    for id in std::mem::take(&mut self.recency) {
      self.retire(id);
    }
    self.entries.clear();
  }

  fn retire(&mut self, id: String) {
    if self.retired.len() == RETIRED_LIMIT {
      self.retired.pop_front();
    }
    self.retired.push_back(id);
  }
}
