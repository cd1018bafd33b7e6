//! Built-in [`Storage`] backends.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::Mutex;

use crate::error::HighlightError;
use crate::session::Storage;

/// Process-local storage, mostly for tests and one-shot CLI runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, String>>
}

impl MemoryStorage {
  pub fn len(&self) -> usize {
    self.entries.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.lock().is_empty()
  }
}

impl Storage for MemoryStorage {
  fn get(&self, key: &str) -> Result<Option<String>> {
    Ok(self.entries.lock().get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> Result<()> {
    self.entries.lock().insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<()> {
    self.entries.lock().remove(key);
    Ok(())
  }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
  dir: PathBuf
}

impl FileStorage {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  /// `~/.config/vrp-highlight/sessions`
  pub fn default_location() -> Result<Self> {
    let home = home::home_dir().context("Failed to determine home directory")?;
    Ok(Self::new(home.join(".config/vrp-highlight").join("sessions")))
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  fn file(&self, key: &str) -> PathBuf {
    let name: String = key
      .chars()
      .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
      .collect();
    self.dir.join(format!("{name}.json"))
  }
}

impl Storage for FileStorage {
  fn get(&self, key: &str) -> Result<Option<String>> {
    profile!("Read stored key");
    let path = self.file(key);
    match fs::read_to_string(&path) {
      Ok(contents) => Ok(Some(contents)),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
      Err(e) => Err(HighlightError::storage("reading key", path, e).into())
    }
  }

  fn set(&self, key: &str, value: &str) -> Result<()> {
    profile!("Write stored key");
    fs::create_dir_all(&self.dir).map_err(|e| HighlightError::storage("creating storage directory", &self.dir, e))?;

    let path = self.file(key);
    log::debug!("Writing {} bytes to {}", value.len(), path.display());
    fs::write(&path, value).map_err(|e| HighlightError::storage("writing key", path, e))?;
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<()> {
    let path = self.file(key);
    match fs::remove_file(&path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      Err(e) => Err(HighlightError::storage("removing key", path, e).into())
    }
  }
}
