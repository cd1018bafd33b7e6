//! Capabilities the session manager needs from its host.
//!
//! The manager never talks to a concrete editor widget or storage backend.
//! Hosts hand it a text source, a decoration renderer and optionally a
//! key/value store, and tests substitute in-memory fakes.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::diff::ChangeType;
use crate::locator::{HighlightRange, TextPosition};
use crate::theme::{DecorationStyle, Theme};

/// 1-based cursor location in the editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CursorPosition {
  pub line:   usize,
  pub column: usize
}

impl CursorPosition {
  pub fn new(line: usize, column: usize) -> Self {
    Self { line, column }
  }
}

impl From<&TextPosition> for CursorPosition {
  fn from(position: &TextPosition) -> Self {
    Self { line: position.line, column: position.column }
  }
}

/// Unsubscribes when dropped or when [`Subscription::unsubscribe`] is called.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
  unsubscribe: Option<Box<dyn FnOnce()>>
}

impl Subscription {
  pub fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
    Self { unsubscribe: Some(Box::new(unsubscribe)) }
  }

  /// For sources whose content never changes.
  pub fn noop() -> Self {
    Self { unsubscribe: None }
  }

  pub fn unsubscribe(mut self) {
    self.run();
  }

  fn run(&mut self) {
    if let Some(unsubscribe) = self.unsubscribe.take() {
      unsubscribe();
    }
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    self.run();
  }
}

impl std::fmt::Debug for Subscription {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscription").field("active", &self.unsubscribe.is_some()).finish()
  }
}

/// The editing surface's text and cursor.
pub trait TextSource {
  fn current_text(&self) -> String;

  /// `None` when the surface has no cursor (e.g. not focused).
  fn cursor_position(&self) -> Option<CursorPosition>;

  /// Registers a callback fired after every content change.
  fn on_content_changed(&self, callback: Box<dyn FnMut()>) -> Subscription;
}

impl<T: TextSource + ?Sized> TextSource for Rc<T> {
  fn current_text(&self) -> String {
    (**self).current_text()
  }

  fn cursor_position(&self) -> Option<CursorPosition> {
    (**self).cursor_position()
  }

  fn on_content_changed(&self, callback: Box<dyn FnMut()>) -> Subscription {
    (**self).on_content_changed(callback)
  }
}

/// Opaque id of one applied decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DecorationHandle(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decoration {
  pub range:         HighlightRange,
  pub change_type:   ChangeType,
  pub hover_message: String
}

pub trait DecorationRenderer {
  /// Draws `decorations` with `style` and returns one handle per decoration.
  fn apply_decorations(&mut self, decorations: &[Decoration], style: &DecorationStyle) -> Vec<DecorationHandle>;

  fn clear_decorations(&mut self, handles: &[DecorationHandle]);

  /// Scrolls to `position` and places the cursor on it. Navigation reads
  /// the cursor back from the [`TextSource`], so a renderer that cannot
  /// move it makes repeated jumps land on the same change.
  fn reveal_position(&mut self, position: &TextPosition);

  /// Names of the themes this renderer can draw.
  fn themes(&self) -> Vec<String> {
    Theme::builtin_names().into_iter().map(String::from).collect()
  }

  fn set_theme(&mut self, _theme: &Theme) {}
}

impl<T: DecorationRenderer + ?Sized> DecorationRenderer for Box<T> {
  fn apply_decorations(&mut self, decorations: &[Decoration], style: &DecorationStyle) -> Vec<DecorationHandle> {
    (**self).apply_decorations(decorations, style)
  }

  fn clear_decorations(&mut self, handles: &[DecorationHandle]) {
    (**self).clear_decorations(handles)
  }

  fn reveal_position(&mut self, position: &TextPosition) {
    (**self).reveal_position(position)
  }

  fn themes(&self) -> Vec<String> {
    (**self).themes()
  }

  fn set_theme(&mut self, theme: &Theme) {
    (**self).set_theme(theme)
  }
}

// Shared renderers let the host keep reading what was drawn
impl<T: DecorationRenderer + ?Sized> DecorationRenderer for Rc<RefCell<T>> {
  fn apply_decorations(&mut self, decorations: &[Decoration], style: &DecorationStyle) -> Vec<DecorationHandle> {
    self.borrow_mut().apply_decorations(decorations, style)
  }

  fn clear_decorations(&mut self, handles: &[DecorationHandle]) {
    self.borrow_mut().clear_decorations(handles)
  }

  fn reveal_position(&mut self, position: &TextPosition) {
    self.borrow_mut().reveal_position(position)
  }

  fn themes(&self) -> Vec<String> {
    self.borrow().themes()
  }

  fn set_theme(&mut self, theme: &Theme) {
    self.borrow_mut().set_theme(theme)
  }
}

/// String key/value persistence, e.g. browser local storage or a directory.
pub trait Storage {
  fn get(&self, key: &str) -> Result<Option<String>>;
  fn set(&self, key: &str, value: &str) -> Result<()>;
  fn remove(&self, key: &str) -> Result<()>;
}

impl<T: Storage + ?Sized> Storage for Rc<T> {
  fn get(&self, key: &str) -> Result<Option<String>> {
    (**self).get(key)
  }

  fn set(&self, key: &str, value: &str) -> Result<()> {
    (**self).set(key, value)
  }

  fn remove(&self, key: &str) -> Result<()> {
    (**self).remove(key)
  }
}

impl<T: Storage + ?Sized> Storage for Arc<T> {
  fn get(&self, key: &str) -> Result<Option<String>> {
    (**self).get(key)
  }

  fn set(&self, key: &str, value: &str) -> Result<()> {
    (**self).set(key, value)
  }

  fn remove(&self, key: &str) -> Result<()> {
    (**self).remove(key)
  }
}
