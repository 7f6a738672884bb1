//! The slug-keyed diff document, the input format for incremental
//! submissions.
//!
//! Diffs reference everything by human-readable slug; ids exist only inside
//! the corpus. A diff is self-contained: an alias or entry may reference an
//! ingredient declared earlier in the same diff or one already merged.

use serde::{Deserialize, Serialize};

use crate::ingredient::SourceKind;

/// An incremental submission, as authored by a human or an assistant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diff {
  #[serde(default)]
  pub recipes:     Vec<DiffRecipe>,
  #[serde(default)]
  pub ingredients: Vec<DiffIngredient>,
  #[serde(default)]
  pub aliases:     Vec<DiffAlias>,
  #[serde(default)]
  pub entries:     Vec<DiffEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffRecipe {
  pub slug:     String,
  pub label:    String,
  #[serde(default)]
  pub source:   Option<String>,
  #[serde(default)]
  pub language: Option<String>,
  #[serde(default)]
  pub date:     Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffIngredient {
  pub slug:     String,
  pub label:    String,
  #[serde(default)]
  pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffAlias {
  pub ingredient_slug: String,
  pub variant_label:   String,
  #[serde(default)]
  pub language:        Option<String>,
  pub source:          SourceKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffEntry {
  pub recipe_slug:     String,
  pub ingredient_slug: String,
  #[serde(default)]
  pub amount_raw:      Option<String>,
  #[serde(default)]
  pub amount_value:    Option<f64>,
  #[serde(default)]
  pub amount_unit:     Option<String>,
  #[serde(default)]
  pub preparation:     Option<String>,
  #[serde(default)]
  pub notes:           Option<String>,
  #[serde(default)]
  pub source_citation: Option<String>,
  #[serde(default)]
  pub source_span:     Option<String>,
}
