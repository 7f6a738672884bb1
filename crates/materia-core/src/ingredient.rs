//! Ingredient and alias types.
//!
//! Ingredient slugs are lemmatic: they identify one written form of a name
//! in one language, not the underlying substance. Two Greek spellings of the
//! same plant get two slugs; asserting that they denote the same thing is
//! the job of the equivalence index, not the corpus.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::ids::{AliasId, IngredientId};

/// An ingredient as stored in the canonical corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
  pub ingredient_id: IngredientId,
  pub slug:          String,
  /// Original-language form, e.g. `σμύρνη`.
  pub label:         String,
  pub language:      Option<String>,
}

// ─── Aliases ─────────────────────────────────────────────────────────────────

/// How an alias relates to its ingredient's original form.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SourceKind {
  Translation,
  Transliteration,
  Identification,
  Variant,
}

/// A variant name for an ingredient: a translation, a transliteration, a
/// scholarly identification, or a spelling variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alias {
  pub alias_id:      AliasId,
  pub ingredient_id: IngredientId,
  pub variant_label: String,
  pub language:      Option<String>,
  pub source:        SourceKind,
}

impl Alias {
  /// Key under which duplicate aliases are suppressed on merge.
  pub fn dedup_key(&self) -> (IngredientId, &str, Option<&str>) {
    (self.ingredient_id, &self.variant_label, self.language.as_deref())
  }
}
