#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::{bail, Result};
use highlight::config::Settings;
use highlight::session::{CursorPosition, Decoration, DecorationHandle, DecorationRenderer, Storage, Subscription, TextSource};
use highlight::theme::{DecorationStyle, Theme};
use highlight::{SessionManager, TextPosition};
use serde_json::{json, Value};

pub fn job(name: &str) -> Value {
  json!({ "name": name, "duration": 300, "windows": [] })
}

pub fn resource(name: &str) -> Value {
  json!({ "name": name, "capacity": [10], "shift": { "start": "08:00", "end": "18:00" } })
}

/// `{jobs:[A,B], resources:[R]}`
pub fn base_document() -> Value {
  json!({ "jobs": [job("A"), job("B")], "resources": [resource("R")] })
}

pub fn pretty(value: &Value) -> String {
  serde_json::to_string_pretty(value).unwrap()
}

#[derive(Default)]
pub struct EditorState {
  pub text:        String,
  pub cursor:      Option<CursorPosition>,
  pub decorations: BTreeMap<DecorationHandle, (Decoration, String)>,
  pub revealed:    Vec<TextPosition>,
  pub theme:       Option<String>,
  next_handle:     u64,
  next_listener:   u64,
  listeners:       Vec<(u64, Box<dyn FnMut()>)>
}

/// In-memory editing surface. Revealing a position moves the cursor there,
/// like a real editor.
#[derive(Clone, Default)]
pub struct FakeEditor {
  pub state: Rc<RefCell<EditorState>>
}

impl FakeEditor {
  pub fn with_text(text: impl Into<String>) -> Self {
    let editor = Self::default();
    editor.state.borrow_mut().text = text.into();
    editor
  }

  /// Replaces the text and notifies content listeners.
  pub fn set_text(&self, text: impl Into<String>) {
    self.state.borrow_mut().text = text.into();

    let mut listeners = std::mem::take(&mut self.state.borrow_mut().listeners);
    for (_, listener) in listeners.iter_mut() {
      listener();
    }
    let mut state = self.state.borrow_mut();
    listeners.append(&mut state.listeners);
    state.listeners = listeners;
  }

  pub fn set_cursor(&self, cursor: Option<CursorPosition>) {
    self.state.borrow_mut().cursor = cursor;
  }

  pub fn listener_count(&self) -> usize {
    self.state.borrow().listeners.len()
  }

  pub fn decoration_count(&self) -> usize {
    self.state.borrow().decorations.len()
  }

  /// Class names of applied decorations, sorted.
  pub fn decoration_classes(&self) -> Vec<String> {
    let mut classes: Vec<String> = self.state.borrow().decorations.values().map(|(_, class)| class.clone()).collect();
    classes.sort();
    classes
  }

  pub fn decorated_lines(&self) -> Vec<usize> {
    let mut lines: Vec<usize> = self.state.borrow().decorations.values().map(|(d, _)| d.range.start_line).collect();
    lines.sort();
    lines
  }

  pub fn line(&self, line: usize) -> String {
    self.state.borrow().text.lines().nth(line - 1).unwrap_or_default().to_string()
  }
}

impl TextSource for FakeEditor {
  fn current_text(&self) -> String {
    self.state.borrow().text.clone()
  }

  fn cursor_position(&self) -> Option<CursorPosition> {
    self.state.borrow().cursor
  }

  fn on_content_changed(&self, callback: Box<dyn FnMut()>) -> Subscription {
    let mut state = self.state.borrow_mut();
    let id = state.next_listener;
    state.next_listener += 1;
    state.listeners.push((id, callback));

    let weak = Rc::downgrade(&self.state);
    Subscription::new(move || {
      if let Some(state) = weak.upgrade() {
        state.borrow_mut().listeners.retain(|(existing, _)| *existing != id);
      }
    })
  }
}

impl DecorationRenderer for FakeEditor {
  fn apply_decorations(&mut self, decorations: &[Decoration], style: &DecorationStyle) -> Vec<DecorationHandle> {
    let mut state = self.state.borrow_mut();
    decorations
      .iter()
      .map(|decoration| {
        let handle = DecorationHandle(state.next_handle);
        state.next_handle += 1;
        state.decorations.insert(handle, (decoration.clone(), style.class_name.clone()));
        handle
      })
      .collect()
  }

  fn clear_decorations(&mut self, handles: &[DecorationHandle]) {
    let mut state = self.state.borrow_mut();
    for handle in handles {
      state.decorations.remove(handle);
    }
  }

  fn reveal_position(&mut self, position: &TextPosition) {
    let mut state = self.state.borrow_mut();
    state.revealed.push(*position);
    state.cursor = Some(CursorPosition::from(position));
  }

  fn set_theme(&mut self, theme: &Theme) {
    self.state.borrow_mut().theme = Some(theme.name.clone());
  }
}

/// Storage whose every operation fails.
#[derive(Default)]
pub struct FailingStorage {
  pub attempts: Cell<usize>
}

impl Storage for FailingStorage {
  fn get(&self, _key: &str) -> Result<Option<String>> {
    self.attempts.set(self.attempts.get() + 1);
    bail!("storage unavailable")
  }

  fn set(&self, _key: &str, _value: &str) -> Result<()> {
    self.attempts.set(self.attempts.get() + 1);
    bail!("quota exceeded")
  }

  fn remove(&self, _key: &str) -> Result<()> {
    self.attempts.set(self.attempts.get() + 1);
    bail!("storage unavailable")
  }
}

pub fn manager_with(editor: &FakeEditor, storage: Option<Box<dyn Storage>>, settings: Settings) -> SessionManager {
  SessionManager::new(Rc::new(editor.clone()), Box::new(editor.clone()), storage, settings)
}

pub fn manager(editor: &FakeEditor) -> SessionManager {
  manager_with(editor, None, Settings::default())
}
