//! Terminal implementations of the host capabilities.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use colored::Colorize;

use crate::locator::TextPosition;
use crate::session::{CursorPosition, Decoration, DecorationHandle, DecorationRenderer, Subscription, TextSource};
use crate::theme::{parse_hex, DecorationStyle, Theme};

#[derive(Debug, Clone)]
struct Applied {
  decoration: Decoration,
  style:      DecorationStyle
}

type SharedCursor = Rc<Cell<Option<CursorPosition>>>;

/// Records decorations and paints them onto text with ANSI colors.
#[derive(Debug, Default)]
pub struct AnsiRenderer {
  applied:  BTreeMap<DecorationHandle, Applied>,
  next_id:  u64,
  revealed: Option<TextPosition>,
  theme:    Option<String>,
  cursor:   Option<SharedCursor>
}

impl AnsiRenderer {
  pub fn new() -> Self {
    Self::default()
  }

  /// A renderer whose reveals move the cursor of `text`.
  pub fn following(text: &StaticText) -> Self {
    Self { cursor: Some(text.cursor.clone()), ..Self::default() }
  }

  pub fn decorations(&self) -> impl Iterator<Item = &Decoration> {
    self.applied.values().map(|applied| &applied.decoration)
  }

  pub fn len(&self) -> usize {
    self.applied.len()
  }

  pub fn is_empty(&self) -> bool {
    self.applied.is_empty()
  }

  pub fn revealed(&self) -> Option<TextPosition> {
    self.revealed
  }

  pub fn theme_name(&self) -> Option<&str> {
    self.theme.as_deref()
  }

  /// `text` with a gutter column and painted highlight ranges. The line
  /// of the last revealed position is marked with `>`.
  pub fn render(&self, text: &str) -> String {
    let mut by_line: BTreeMap<usize, Vec<&Applied>> = BTreeMap::new();
    for applied in self.applied.values() {
      by_line.entry(applied.decoration.range.start_line).or_default().push(applied);
    }

    let mut out = String::new();
    for (index, line) in text.lines().enumerate() {
      let number = index + 1;
      let first = by_line.get(&number).and_then(|applied| applied.first().copied());
      let marker = if self.revealed.map(|p| p.line) == Some(number) { ">" } else { " " };
      let gutter = match first {
        Some(applied) => paint_fg(&applied.style.gutter_glyph, &applied.style.border),
        None => " ".to_string()
      };

      out.push_str(&format!("{marker}{gutter} {number:>4} | "));
      match first {
        Some(applied) => out.push_str(&paint_line(line, applied)),
        None => out.push_str(line)
      }
      out.push('\n');
    }
    out
  }

  /// One `line:column  description` entry per decoration, in text order.
  pub fn legend(&self) -> Vec<String> {
    let mut entries: Vec<&Applied> = self.applied.values().collect();
    entries.sort_by_key(|applied| (applied.decoration.range.start_line, applied.decoration.range.start_column));
    entries
      .into_iter()
      .map(|applied| {
        let range = &applied.decoration.range;
        let location = format!("{}:{}", range.start_line, range.start_column);
        format!("{:>8}  {}", location, paint_fg(&applied.decoration.hover_message, &applied.style.border))
      })
      .collect()
  }
}

impl DecorationRenderer for AnsiRenderer {
  fn apply_decorations(&mut self, decorations: &[Decoration], style: &DecorationStyle) -> Vec<DecorationHandle> {
    decorations
      .iter()
      .map(|decoration| {
        let handle = DecorationHandle(self.next_id);
        self.next_id += 1;
        self.applied.insert(handle, Applied { decoration: decoration.clone(), style: style.clone() });
        handle
      })
      .collect()
  }

  fn clear_decorations(&mut self, handles: &[DecorationHandle]) {
    for handle in handles {
      self.applied.remove(handle);
    }
  }

  fn reveal_position(&mut self, position: &TextPosition) {
    self.revealed = Some(*position);
    if let Some(cursor) = &self.cursor {
      cursor.set(Some(CursorPosition::from(position)));
    }
  }

  fn set_theme(&mut self, theme: &Theme) {
    self.theme = Some(theme.name.clone());
  }
}

fn paint_fg(text: &str, hex: &str) -> String {
  match parse_hex(hex) {
    Some((r, g, b)) => text.truecolor(r, g, b).to_string(),
    None => text.to_string()
  }
}

fn paint_line(line: &str, applied: &Applied) -> String {
  let range = &applied.decoration.range;
  let chars: Vec<char> = line.chars().collect();
  let start = range.start_column.saturating_sub(1).min(chars.len());
  let end = range.end_column.saturating_sub(1).clamp(start, chars.len());

  let head: String = chars[..start].iter().collect();
  let body: String = chars[start..end].iter().collect();
  let tail: String = chars[end..].iter().collect();

  let body = match applied.style.background_rgb() {
    Some((r, g, b)) => body.on_truecolor(r, g, b).to_string(),
    None => body.reversed().to_string()
  };
  format!("{head}{body}{tail}")
}

/// A fixed text with a settable cursor. It never reports content changes.
#[derive(Debug, Default)]
pub struct StaticText {
  text:   RefCell<String>,
  cursor: SharedCursor
}

impl StaticText {
  pub fn new(text: impl Into<String>) -> Self {
    Self { text: RefCell::new(text.into()), cursor: Rc::new(Cell::new(None)) }
  }

  pub fn set_cursor(&self, cursor: Option<CursorPosition>) {
    self.cursor.set(cursor);
  }

  pub fn replace(&self, text: impl Into<String>) {
    *self.text.borrow_mut() = text.into();
  }
}

impl TextSource for StaticText {
  fn current_text(&self) -> String {
    self.text.borrow().clone()
  }

  fn cursor_position(&self) -> Option<CursorPosition> {
    self.cursor.get()
  }

  fn on_content_changed(&self, _callback: Box<dyn FnMut()>) -> Subscription {
    Subscription::noop()
  }
}
