use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use config::{Config, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::HighlightError;

// Constants
pub const DEFAULT_MAX_SESSIONS: usize = 10;
pub const DEFAULT_INDENT_WIDTH: usize = 2;
pub const DEFAULT_STORAGE_KEY: &str = "vrp-highlight-sessions";
pub const DEFAULT_THEME: &str = "default";
const ENV_PREFIX: &str = "VRP_HIGHLIGHT";

/// Tunables for a [`crate::SessionManager`].
///
/// An `indent_width` of 0 asks the locator to detect the width from the text.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Serialize)]
pub struct Settings {
  pub max_sessions:       usize,
  pub enable_persistence: bool,
  pub smart_grouping:     bool,
  pub indent_width:       usize,
  pub storage_key:        String,
  pub theme:              String
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      max_sessions:       DEFAULT_MAX_SESSIONS,
      enable_persistence: true,
      smart_grouping:     true,
      indent_width:       DEFAULT_INDENT_WIDTH,
      storage_key:        DEFAULT_STORAGE_KEY.to_string(),
      theme:              DEFAULT_THEME.to_string()
    }
  }
}

impl Settings {
  /// Default INI location, `~/.config/vrp-highlight/config.ini`.
  pub fn config_file() -> anyhow::Result<PathBuf> {
    let home = home::home_dir().context("Failed to determine home directory")?;
    Ok(home.join(".config/vrp-highlight").join("config.ini"))
  }

  /// Layers defaults, the optional INI file and `VRP_HIGHLIGHT_*` variables.
  /// A missing file is not an error.
  pub fn load(file: Option<&Path>) -> Result<Self, HighlightError> {
    let mut builder = Config::builder()
      .set_default("max_sessions", DEFAULT_MAX_SESSIONS as i64)?
      .set_default("enable_persistence", true)?
      .set_default("smart_grouping", true)?
      .set_default("indent_width", DEFAULT_INDENT_WIDTH as i64)?
      .set_default("storage_key", DEFAULT_STORAGE_KEY)?
      .set_default("theme", DEFAULT_THEME)?;

    if let Some(path) = file {
      log::debug!("Reading settings from {}", path.display());
      builder = builder.add_source(config::File::new(path.to_string_lossy().as_ref(), FileFormat::Ini).required(false));
    }

    let settings: Settings = builder
      .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
      .build()?
      .try_deserialize()?;

    Ok(settings.normalized())
  }

  pub fn save(&self, path: &Path) -> Result<(), HighlightError> {
    let contents = serde_ini::to_string(self).map_err(|e| HighlightError::ConfigWrite(e.to_string()))?;

    if let Some(dir) = path.parent() {
      std::fs::create_dir_all(dir).map_err(|e| HighlightError::storage("creating settings directory", dir, e))?;
    }

    let mut file = File::create(path).map_err(|e| HighlightError::storage("creating settings file", path, e))?;
    file
      .write_all(contents.as_bytes())
      .map_err(|e| HighlightError::storage("writing settings file", path, e))
  }

  // A cap of zero would evict every session the moment it is created
  fn normalized(mut self) -> Self {
    if self.max_sessions == 0 {
      log::warn!("max_sessions = 0 is not usable, falling back to {}", DEFAULT_MAX_SESSIONS);
      self.max_sessions = DEFAULT_MAX_SESSIONS;
    }
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_defaults_match_constants() {
    let settings = Settings::default();
    assert_eq!(settings.max_sessions, 10);
    assert!(settings.enable_persistence);
    assert!(settings.smart_grouping);
    assert_eq!(settings.indent_width, 2);
    assert_eq!(settings.storage_key, "vrp-highlight-sessions");
    assert_eq!(settings.theme, "default");
  }

  #[test]
  fn test_load_reads_ini_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.ini");
    std::fs::write(&path, "max_sessions=3\nsmart_grouping=false\ntheme=subtle\n").unwrap();

    let settings = Settings::load(Some(&path)).unwrap();
    assert_eq!(settings.max_sessions, 3);
    assert!(!settings.smart_grouping);
    assert_eq!(settings.theme, "subtle");
    assert!(settings.enable_persistence);
  }

  #[test]
  fn test_load_missing_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let settings = Settings::load(Some(&dir.path().join("absent.ini"))).unwrap();
    assert_eq!(settings.indent_width, 2);
    assert_eq!(settings.storage_key, DEFAULT_STORAGE_KEY);
  }

  #[test]
  fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.ini");
    let settings = Settings { max_sessions: 4, indent_width: 4, ..Settings::default() };

    settings.save(&path).unwrap();
    assert_eq!(Settings::load(Some(&path)).unwrap(), settings);
  }

  #[test]
  fn test_zero_max_sessions_is_normalized() {
    let settings = Settings { max_sessions: 0, ..Settings::default() }.normalized();
    assert_eq!(settings.max_sessions, DEFAULT_MAX_SESSIONS);
  }
}
