//! Error types for `materia-engine`.

use std::fmt;

use thiserror::Error;

use crate::validate::Violation;

/// Which kind of slug reference failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
  Recipe,
  Ingredient,
}

impl fmt::Display for RefKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Recipe => f.write_str("recipe"),
      Self::Ingredient => f.write_str("ingredient"),
    }
  }
}

#[derive(Debug, Error)]
pub enum Error {
  /// The diff failed schema or reference validation; nothing was merged.
  /// Each violation names the offending path and the expected constraint.
  #[error("diff failed validation with {} violation(s)", .0.len())]
  Validation(Vec<Violation>),

  /// The diff declares a recipe whose slug is already in the corpus.
  /// Recipes are never silently merged.
  #[error("recipe slug already present: {slug}")]
  DuplicateRecipe { slug: String },

  /// A diff was already merged under this source label; re-merging the same
  /// submission is detectable, not silent.
  #[error("source already merged: {label}")]
  DuplicateSource { label: String },

  /// An alias or entry points at a slug that resolves nowhere.
  #[error("unresolved {kind} slug {slug:?} at index {index}")]
  UnresolvedReference {
    kind:  RefKind,
    slug:  String,
    index: usize,
  },

  /// Removal targeted a source label with no recorded provenance.
  #[error("no provenance recorded for source: {key}")]
  UnknownProvenance { key: String },

  #[error(transparent)]
  Store(#[from] materia_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
