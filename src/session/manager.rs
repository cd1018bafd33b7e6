use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::distr::Alphanumeric;
use rand::Rng;
use serde_json::Value;

use super::grouping::group_changes;
use super::persistence::{self, SessionMetadata};
use super::store::SessionStore;
use super::traits::{CursorPosition, Decoration, DecorationHandle, DecorationRenderer, Storage, Subscription, TextSource};
use super::{HighlightSession, SessionState, SessionStats};
use crate::config::Settings;
use crate::diff::{detect_changes, get_change_summary, Change, ChangeType};
use crate::locator::{map_changes_to_text_with, HighlightableChange, LocatorOptions, TextPosition};
use crate::theme::Theme;

const SESSION_SUFFIX_LEN: usize = 9;

/// Owns the highlight sessions of one editing surface.
///
/// Creating a session diffs two documents, locates the changes in the
/// surface's current text and decorates them. Content changes in the
/// surface re-run the locator (never the diff) so decorations follow edits.
/// Persistence failures are logged and otherwise ignored.
pub struct SessionManager {
  inner:        Rc<RefCell<Inner>>,
  subscription: Option<Subscription>
}

struct Inner {
  text_source: Rc<dyn TextSource>,
  renderer:    Box<dyn DecorationRenderer>,
  storage:     Option<Box<dyn Storage>>,
  settings:    Settings,
  locator:     LocatorOptions,
  theme:       Theme,
  store:       SessionStore,
  current:     Option<String>,
  handles:     Vec<DecorationHandle>,
  filter:      Option<Vec<ChangeType>>,
  last_jump:   Option<JumpMark>,
  restored:    Vec<SessionMetadata>,
  disposed:    bool
}

// Where the last jump landed, so repeated jumps step past changes that
// share an anchor
#[derive(Debug, Clone, Copy)]
struct JumpMark {
  index:    usize,
  position: TextPosition
}

impl SessionManager {
  pub fn new(
    text_source: Rc<dyn TextSource>,
    renderer: Box<dyn DecorationRenderer>,
    storage: Option<Box<dyn Storage>>,
    settings: Settings
  ) -> Self {
    let theme = Theme::builtin(&settings.theme).unwrap_or_else(|| {
      log::warn!("Unknown theme '{}', using default", settings.theme);
      Theme::default()
    });

    let mut inner = Inner {
      text_source: text_source.clone(),
      renderer,
      storage,
      locator: LocatorOptions { indent_width: settings.indent_width, ..LocatorOptions::default() },
      theme,
      store: SessionStore::new(settings.max_sessions),
      settings,
      current: None,
      handles: Vec::new(),
      filter: None,
      last_jump: None,
      restored: Vec::new(),
      disposed: false
    };
    inner.restored = inner.load_metadata();
    inner.renderer.set_theme(&inner.theme);

    let inner = Rc::new(RefCell::new(inner));
    let weak = Rc::downgrade(&inner);
    let subscription = text_source.on_content_changed(Box::new(move || on_content_changed(&weak)));

    Self { inner, subscription: Some(subscription) }
  }

  /// Diffs, locates, stores and decorates. The new session becomes current.
  pub fn create_session(&mut self, before: &Value, after: &Value, description: Option<&str>) -> String {
    self.inner.borrow_mut().create_session(before, after, description)
  }

  /// Makes `id` current and redraws it; `false` for unknown ids.
  pub fn switch_to_session(&mut self, id: &str) -> bool {
    self.inner.borrow_mut().switch_to_session(id)
  }

  /// Live sessions in creation order.
  pub fn get_sessions(&self) -> Vec<HighlightSession> {
    self.inner.borrow().store.sessions().into_iter().map(|stored| stored.session.clone()).collect()
  }

  pub fn get_current_session(&self) -> Option<HighlightSession> {
    let inner = self.inner.borrow();
    inner.current_stored().map(|stored| stored.session.clone())
  }

  /// Counts over the ungrouped changes of the current session.
  pub fn get_session_stats(&self) -> Option<SessionStats> {
    let inner = self.inner.borrow();
    inner.current_stored().map(|stored| get_change_summary(&stored.detected).into())
  }

  /// `None` for ids never issued and for ids evicted before the last 256
  /// evictions.
  pub fn session_state(&self, id: &str) -> Option<SessionState> {
    let inner = self.inner.borrow();
    if inner.current.as_deref() == Some(id) {
      Some(SessionState::Active)
    } else if inner.store.contains(id) {
      Some(SessionState::Inactive)
    } else if inner.store.was_retired(id) {
      Some(SessionState::Evicted)
    } else {
      None
    }
  }

  /// Metadata that was persisted by an earlier manager.
  pub fn restored_sessions(&self) -> Vec<SessionMetadata> {
    self.inner.borrow().restored.clone()
  }

  pub fn clear_current_highlights(&mut self) {
    self.inner.borrow_mut().clear_decorations();
  }

  /// Drops every session and the persisted metadata.
  pub fn clear_all_sessions(&mut self) {
    self.inner.borrow_mut().clear_all_sessions();
  }

  /// Moves to the first change anchored after the cursor, wrapping to the
  /// first one. `None` when nothing is navigable.
  pub fn jump_to_next_change(&mut self) -> Option<HighlightableChange> {
    self.inner.borrow_mut().jump(true)
  }

  /// Moves to the last change anchored before the cursor, wrapping to the
  /// last one.
  pub fn jump_to_previous_change(&mut self) -> Option<HighlightableChange> {
    self.inner.borrow_mut().jump(false)
  }

  pub fn filter_highlights_by_type(&mut self, types: &[ChangeType]) {
    let mut inner = self.inner.borrow_mut();
    if inner.disposed {
      return;
    }
    inner.filter = Some(types.to_vec());
    inner.last_jump = None;
    inner.render();
  }

  pub fn show_all_highlights(&mut self) {
    let mut inner = self.inner.borrow_mut();
    if inner.disposed {
      return;
    }
    inner.filter = None;
    inner.last_jump = None;
    inner.render();
  }

  pub fn active_filter(&self) -> Option<Vec<ChangeType>> {
    self.inner.borrow().filter.clone()
  }

  /// Swaps the style mapping and redraws; session data is untouched.
  pub fn update_theme(&mut self, theme: Theme) {
    let mut inner = self.inner.borrow_mut();
    if inner.disposed {
      return;
    }
    log::debug!("Switching theme to {}", theme.name);
    inner.renderer.set_theme(&theme);
    inner.theme = theme;
    inner.render();
  }

  pub fn update_theme_by_name(&mut self, name: &str) -> bool {
    match Theme::builtin(name) {
      Some(theme) => {
        self.update_theme(theme);
        true
      },
      None => false
    }
  }

  pub fn current_theme(&self) -> Theme {
    self.inner.borrow().theme.clone()
  }

  pub fn available_themes(&self) -> Vec<String> {
    self.inner.borrow().renderer.themes()
  }

  /// Number of decorations currently applied.
  pub fn decoration_count(&self) -> usize {
    self.inner.borrow().handles.len()
  }

  /// Unsubscribes from the text source and clears all decorations and
  /// sessions. Persisted metadata is kept. Safe to call more than once.
  pub fn dispose(&mut self) {
    if let Some(subscription) = self.subscription.take() {
      subscription.unsubscribe();
    }
    if let Ok(mut inner) = self.inner.try_borrow_mut() {
      inner.dispose();
    }
  }

  pub fn is_disposed(&self) -> bool {
    self.inner.borrow().disposed
  }
}

impl Drop for SessionManager {
  fn drop(&mut self) {
    self.dispose();
  }
}

fn on_content_changed(inner: &Weak<RefCell<Inner>>) {
  let Some(shared) = inner.upgrade() else {
    return;
  };
  let Ok(mut inner) = shared.try_borrow_mut() else {
    log::debug!("Content changed during a session update, skipping re-locate");
    return;
  };
  inner.refresh();
}

impl Inner {
  fn create_session(&mut self, before: &Value, after: &Value, description: Option<&str>) -> String {
    profile!("Create highlight session");
    let timestamp = now_millis();
    let id = new_session_id(timestamp);

    if self.disposed {
      log::warn!("Session manager is disposed, session {id} was not stored");
      return id;
    }

    let detected = detect_changes(before, after);
    let changes = self.present(&detected, &self.text_source.current_text());
    log::debug!("Session {id}: {} changes, {} highlight entries", detected.len(), changes.len());

    let session = HighlightSession {
      id: id.clone(),
      timestamp,
      description: description.map(String::from),
      changes,
      original_document: before.clone(),
      modified_document: after.clone()
    };

    for evicted in self.store.insert(session, detected) {
      log::debug!("Evicted session {evicted}");
      if self.current.as_deref() == Some(evicted.as_str()) {
        self.current = None;
      }
    }

    log::debug!("{} live sessions", self.store.len());
    self.current = Some(id.clone());
    self.filter = None;
    self.last_jump = None;
    self.persist();
    self.render();
    id
  }

  fn switch_to_session(&mut self, id: &str) -> bool {
    if self.disposed || !self.store.touch(id) {
      log::debug!("Cannot switch to unknown session {id}");
      return false;
    }

    self.current = Some(id.to_string());
    self.last_jump = None;
    self.relocate_current();
    self.persist();
    self.render();
    true
  }

  fn clear_all_sessions(&mut self) {
    self.clear_decorations();
    self.store.clear();
    self.current = None;
    self.filter = None;
    self.last_jump = None;
    self.restored.clear();

    if let Some(storage) = self.persistent_storage() {
      if let Err(err) = persistence::clear(storage, &self.settings.storage_key) {
        log::warn!("Failed to clear persisted sessions: {err}");
      }
    }
  }

  fn refresh(&mut self) {
    if self.disposed || self.current.is_none() {
      return;
    }
    self.relocate_current();
    self.last_jump = None;
    self.render();
  }

  fn dispose(&mut self) {
    if self.disposed {
      return;
    }
    self.clear_decorations();
    self.store.clear();
    self.current = None;
    self.disposed = true;
    log::debug!("Session manager disposed");
  }

  fn current_stored(&self) -> Option<&super::store::StoredSession> {
    self.current.as_deref().and_then(|id| self.store.get(id))
  }

  fn present(&self, detected: &[Change], text: &str) -> Vec<HighlightableChange> {
    let located = map_changes_to_text_with(detected, text, &self.locator);
    if self.settings.smart_grouping {
      group_changes(located)
    } else {
      located
    }
  }

  // Positions only; the detected change list never changes
  fn relocate_current(&mut self) {
    let Some(id) = self.current.clone() else {
      return;
    };
    let text = self.text_source.current_text();
    let changes = match self.store.get(&id) {
      Some(stored) => self.present(&stored.detected, &text),
      None => return
    };
    if let Some(stored) = self.store.get_mut(&id) {
      stored.session.changes = changes;
    }
  }

  fn visible_changes(&self) -> Vec<HighlightableChange> {
    let Some(stored) = self.current_stored() else {
      return Vec::new();
    };
    stored
      .session
      .changes
      .iter()
      .filter(|c| self.filter.as_ref().map_or(true, |types| types.contains(&c.change.change_type)))
      .cloned()
      .collect()
  }

  fn render(&mut self) {
    self.clear_decorations();
    let visible = self.visible_changes();

    for change_type in ChangeType::ALL {
      let decorations: Vec<Decoration> = visible
        .iter()
        .filter(|c| c.change.change_type == change_type)
        .filter_map(|c| {
          c.highlight_range.map(|range| Decoration { range, change_type, hover_message: c.change.description.clone() })
        })
        .collect();

      if decorations.is_empty() {
        continue;
      }
      let handles = self.renderer.apply_decorations(&decorations, self.theme.style(change_type));
      self.handles.extend(handles);
    }
  }

  fn clear_decorations(&mut self) {
    if self.handles.is_empty() {
      return;
    }
    let handles = std::mem::take(&mut self.handles);
    self.renderer.clear_decorations(&handles);
  }

  fn jump(&mut self, forward: bool) -> Option<HighlightableChange> {
    if self.disposed {
      return None;
    }

    let mut targets: Vec<HighlightableChange> = self.visible_changes().into_iter().filter(HighlightableChange::is_located).collect();
    if targets.is_empty() {
      log::debug!("No navigable changes");
      return None;
    }
    targets.sort_by_key(anchor_of);

    let index = self.jump_index(&targets, self.text_source.cursor_position(), forward);
    let position = targets[index].text_position?;
    self.last_jump = Some(JumpMark { index, position });
    self.renderer.reveal_position(&position);
    Some(targets.swap_remove(index))
  }

  fn jump_index(&self, targets: &[HighlightableChange], cursor: Option<CursorPosition>, forward: bool) -> usize {
    let count = targets.len();

    if let (Some(mark), Some(cursor)) = (self.last_jump, cursor) {
      let at_mark = CursorPosition::from(&mark.position) == cursor;
      let unchanged = targets.get(mark.index).and_then(|c| c.text_position) == Some(mark.position);
      if at_mark && unchanged {
        return if forward { (mark.index + 1) % count } else { (mark.index + count - 1) % count };
      }
    }

    match (forward, cursor) {
      (true, Some(cursor)) => targets.iter().position(|c| anchor_of(c) > cursor).unwrap_or(0),
      (true, None) => 0,
      (false, Some(cursor)) => targets.iter().rposition(|c| anchor_of(c) < cursor).unwrap_or(count - 1),
      (false, None) => count - 1
    }
  }

  fn persistent_storage(&self) -> Option<&dyn Storage> {
    if self.settings.enable_persistence {
      self.storage.as_deref()
    } else {
      None
    }
  }

  fn persist(&self) {
    let Some(storage) = self.persistent_storage() else {
      return;
    };

    let metadata: Vec<SessionMetadata> = self
      .store
      .sessions()
      .into_iter()
      .map(|stored| SessionMetadata {
        id:           stored.session.id.clone(),
        timestamp:    stored.session.timestamp,
        description:  stored.session.description.clone(),
        change_count: stored.detected.len()
      })
      .collect();

    if let Err(err) = persistence::save(storage, &self.settings.storage_key, &metadata) {
      log::warn!("Failed to persist session metadata: {err}");
    }
  }

  fn load_metadata(&self) -> Vec<SessionMetadata> {
    let Some(storage) = self.persistent_storage() else {
      return Vec::new();
    };

    match persistence::load(storage, &self.settings.storage_key) {
      Ok(restored) => {
        log::debug!("Restored metadata for {} sessions", restored.len());
        restored
      },
      Err(err) => {
        log::warn!("Ignoring persisted sessions: {err}");
        Vec::new()
      }
    }
  }
}

fn anchor_of(change: &HighlightableChange) -> CursorPosition {
  change.text_position.as_ref().map(CursorPosition::from).unwrap_or(CursorPosition::new(0, 0))
}

fn now_millis() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|elapsed| elapsed.as_millis() as u64)
    .unwrap_or(0)
}

fn new_session_id(timestamp: u64) -> String {
  let suffix: String = rand::rng()
    .sample_iter(&Alphanumeric)
    .take(SESSION_SUFFIX_LEN)
    .map(char::from)
    .collect();
  format!("session_{timestamp}_{}", suffix.to_lowercase())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_session_id_format() {
    let id = new_session_id(1_700_000_000_000);
    let parts: Vec<&str> = id.split('_').collect();
    assert_eq!(parts[0], "session");
    assert_eq!(parts[1], "1700000000000");
    assert_eq!(parts[2].len(), SESSION_SUFFIX_LEN);
    assert!(parts[2].chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
  }

  #[test]
  fn test_session_ids_differ() {
    assert_ne!(new_session_id(1), new_session_id(1));
  }
}
