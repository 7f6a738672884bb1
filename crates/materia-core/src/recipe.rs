//! Recipe: a sourced preparation from the historical corpus.

use serde::{Deserialize, Serialize};

use crate::{diff::DiffRecipe, ids::RecipeId};

/// A recipe as stored in the canonical corpus.
///
/// The slug is unique and immutable once assigned; the only way to change a
/// recipe is to remove the diff that introduced it and re-merge a corrected
/// one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
  pub recipe_id: RecipeId,
  pub slug:      String,
  pub label:     String,
  /// Source citation, e.g. an edition and section reference.
  pub source:    Option<String>,
  pub language:  Option<String>,
  /// Year of attestation; negative values are BCE.
  pub date:      Option<i32>,
}

impl Recipe {
  /// Whether a diff-declared recipe restates this one field for field.
  /// Used by the restated-recipe merge policy to distinguish a harmless
  /// resubmission from a genuine slug collision.
  pub fn restates(&self, d: &DiffRecipe) -> bool {
    self.slug == d.slug
      && self.label == d.label
      && self.source == d.source
      && self.language == d.language
      && self.date == d.date
  }
}
