//! Color and style mapping used when decorating changes.

use std::collections::HashMap;

use maplit::hashmap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::diff::ChangeType;

/// How one kind of change is drawn. Colors are `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecorationStyle {
  pub class_name:     String,
  pub background:     String,
  pub border:         String,
  pub gutter_glyph:   String,
  pub overview_ruler: String
}

impl DecorationStyle {
  fn new(class_name: &str, background: &str, border: &str, gutter_glyph: &str) -> Self {
    Self {
      class_name:     class_name.to_string(),
      background:     background.to_string(),
      border:         border.to_string(),
      gutter_glyph:   gutter_glyph.to_string(),
      overview_ruler: border.to_string()
    }
  }

  /// `#rrggbb` background as an RGB triple.
  pub fn background_rgb(&self) -> Option<(u8, u8, u8)> {
    parse_hex(&self.background)
  }
}

/// A style for every [`ChangeType`]. Deserializing a theme that leaves one
/// out is an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ThemeSpec")]
pub struct Theme {
  pub name: String,
  styles:   HashMap<ChangeType, DecorationStyle>
}

#[derive(Deserialize)]
struct ThemeSpec {
  name:   String,
  styles: HashMap<ChangeType, DecorationStyle>
}

impl TryFrom<ThemeSpec> for Theme {
  type Error = String;

  fn try_from(spec: ThemeSpec) -> Result<Self, Self::Error> {
    let missing: Vec<&str> = ChangeType::ALL.iter().filter(|t| !spec.styles.contains_key(*t)).map(|t| t.as_str()).collect();
    if !missing.is_empty() {
      return Err(format!("theme '{}' has no style for {}", spec.name, missing.join(", ")));
    }
    Ok(Self { name: spec.name, styles: spec.styles })
  }
}

impl Theme {
  pub fn new(name: impl Into<String>, added: DecorationStyle, modified: DecorationStyle, removed: DecorationStyle) -> Self {
    Self {
      name:   name.into(),
      styles: hashmap! {
        ChangeType::Added => added,
        ChangeType::Modified => modified,
        ChangeType::Removed => removed
      }
    }
  }

  pub fn style(&self, change_type: ChangeType) -> &DecorationStyle {
    &self.styles[&change_type]
  }

  pub fn builtin(name: &str) -> Option<Theme> {
    BUILTIN.iter().find(|theme| theme.name == name).cloned()
  }

  pub fn builtin_names() -> Vec<&'static str> {
    BUILTIN.iter().map(|theme| theme.name.as_str()).collect()
  }
}

impl Default for Theme {
  fn default() -> Self {
    BUILTIN[0].clone()
  }
}

static BUILTIN: Lazy<Vec<Theme>> = Lazy::new(|| {
  vec![
    Theme::new(
      "default",
      DecorationStyle::new("change-added", "#1f3d2b", "#22c55e", "+"),
      DecorationStyle::new("change-modified", "#3d3516", "#eab308", "~"),
      DecorationStyle::new("change-removed", "#3d1f1f", "#ef4444", "-")
    ),
    Theme::new(
      "high-contrast",
      DecorationStyle::new("change-added hc", "#006400", "#00ff00", "+"),
      DecorationStyle::new("change-modified hc", "#7a5c00", "#ffd700", "~"),
      DecorationStyle::new("change-removed hc", "#8b0000", "#ff0000", "-")
    ),
    Theme::new(
      "subtle",
      DecorationStyle::new("change-added subtle", "#222a25", "#4d7c5f", "·"),
      DecorationStyle::new("change-modified subtle", "#2a2820", "#8c7a3c", "·"),
      DecorationStyle::new("change-removed subtle", "#2a2222", "#8c4a4a", "·")
    ),
  ]
});

pub(crate) fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
  let hex = color.strip_prefix('#')?;
  if hex.len() != 6 {
    return None;
  }
  let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
  Some((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_builtin_themes_cover_every_change_type() {
    for name in Theme::builtin_names() {
      let theme = Theme::builtin(name).unwrap();
      for change_type in ChangeType::ALL {
        assert!(theme.style(change_type).background_rgb().is_some(), "{name} {change_type}");
      }
    }
  }

  #[test]
  fn test_unknown_theme() {
    assert!(Theme::builtin("neon").is_none());
    assert_eq!(Theme::default().name, "default");
  }

  #[test]
  fn test_partial_theme_is_rejected() {
    let error = serde_json::from_str::<Theme>(r#"{"name":"custom","styles":{}}"#).unwrap_err();
    assert!(error.to_string().contains("theme 'custom' has no style for added, modified, removed"));

    let mut value = serde_json::to_value(Theme::default()).unwrap();
    value["styles"].as_object_mut().unwrap().remove("removed");
    let error = serde_json::from_value::<Theme>(value).unwrap_err();
    assert!(error.to_string().contains("no style for removed"));
  }

  #[test]
  fn test_theme_round_trips_through_json() {
    let theme = Theme::builtin("subtle").unwrap();
    let parsed: Theme = serde_json::from_str(&serde_json::to_string(&theme).unwrap()).unwrap();
    assert_eq!(parsed, theme);
    assert_eq!(parsed.style(ChangeType::Added).class_name, "change-added subtle");
  }

  #[test]
  fn test_parse_hex() {
    assert_eq!(parse_hex("#ff8000"), Some((255, 128, 0)));
    assert_eq!(parse_hex("ff8000"), None);
    assert_eq!(parse_hex("#fff"), None);
  }
}
