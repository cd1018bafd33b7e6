//! Error types for the highlight pipeline.
//!
//! Diffing, locating and session queries never fail. Errors only come
//! from the edges: storage backends, persisted metadata, configuration
//! and the documents the CLI reads from disk.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HighlightError {
  #[error("Storage I/O error while {operation} at {path}: {source}")]
  Storage {
    operation: &'static str,
    path:      PathBuf,
    #[source]
    source:    io::Error
  },

  #[error("Failed to (de)serialize session metadata: {0}")]
  Metadata(#[from] serde_json::Error),

  #[error("Failed to load settings: {0}")]
  Config(#[from] config::ConfigError),

  #[error("Failed to write settings: {0}")]
  ConfigWrite(String),

  #[error("Failed to read document {path}: {reason}")]
  Document { path: PathBuf, reason: String },

  #[error(transparent)]
  Anyhow(#[from] anyhow::Error)
}

impl HighlightError {
  #[must_use]
  pub fn storage(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
    Self::Storage { operation, path: path.into(), source }
  }

  #[must_use]
  pub fn document(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
    Self::Document { path: path.into(), reason: reason.to_string() }
  }
}
