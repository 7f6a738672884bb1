//! Error types for `materia-store`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The persisted document violates the store's own invariants: a
  /// dangling foreign key, a duplicate slug, or an id counter behind an
  /// existing id. Never auto-repaired.
  #[error("corrupt store document: {0}")]
  CorruptStore(#[source] materia_core::Error),

  #[error("malformed document: {0}")]
  Json(#[from] serde_json::Error),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
