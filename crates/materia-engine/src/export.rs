//! Flat export: the denormalized, label-resolved projection consumed by
//! the read-only viewer.

use materia_core::Corpus;
use serde::Serialize;

/// One entry with its recipe and ingredient resolved to human-readable
/// fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatRow {
  pub recipe_slug:     String,
  pub recipe:          String,
  pub recipe_source:   Option<String>,
  pub recipe_language: Option<String>,
  pub recipe_date:     Option<i32>,
  pub ingredient_slug: String,
  pub ingredient:      String,
  pub amount_raw:      Option<String>,
  pub amount_value:    Option<f64>,
  pub amount_unit:     Option<String>,
  pub preparation:     Option<String>,
  pub notes:           Option<String>,
  pub source_citation: Option<String>,
  pub source_span:     Option<String>,
}

/// Project the corpus into flat rows, one per entry.
///
/// Rows are ordered by (recipe id, entry id); exporting the same corpus
/// twice yields identical sequences.
pub fn export(corpus: &Corpus) -> Vec<FlatRow> {
  let mut entries: Vec<_> = corpus.entries().collect();
  entries.sort_by_key(|e| (e.recipe_id, e.entry_id));

  let mut rows = Vec::with_capacity(entries.len());
  for entry in entries {
    // Corpus invariants guarantee both lookups; a miss would mean the
    // corpus was built outside its own insert primitives.
    let (Some(recipe), Some(ingredient)) = (
      corpus.recipe(entry.recipe_id),
      corpus.ingredient(entry.ingredient_id),
    ) else {
      continue;
    };
    rows.push(FlatRow {
      recipe_slug:     recipe.slug.clone(),
      recipe:          recipe.label.clone(),
      recipe_source:   recipe.source.clone(),
      recipe_language: recipe.language.clone(),
      recipe_date:     recipe.date,
      ingredient_slug: ingredient.slug.clone(),
      ingredient:      ingredient.label.clone(),
      amount_raw:      entry.amount_raw.clone(),
      amount_value:    entry.amount_value,
      amount_unit:     entry.amount_unit.clone(),
      preparation:     entry.preparation.clone(),
      notes:           entry.notes.clone(),
      source_citation: entry.source_citation.clone(),
      source_span:     entry.source_span.clone(),
    });
  }
  rows
}
