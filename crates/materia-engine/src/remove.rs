//! Diff removal: reverse one merge using its provenance record.
//!
//! Removal is not a replay of the insert list in reverse. Entries recorded
//! under the key always go; everything else is decided by recomputed
//! liveness against what remains, so an ingredient another diff still
//! depends on survives, together with its aliases.

use std::collections::BTreeSet;

use chrono::Utc;
use materia_core::{
  Corpus,
  ids::IngredientId,
  provenance::RemovalNote,
};
use serde::Serialize;

use crate::{Result, error::Error};

/// What one removal did, by the numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemoveReport {
  pub entries_removed:      usize,
  pub aliases_removed:      usize,
  pub ingredients_removed:  usize,
  /// Recorded ingredients kept because other data still references or
  /// claims them.
  pub ingredients_retained: usize,
  pub recipes_removed:      usize,
}

/// Remove the diff merged under `key` from `corpus`, appending a note to
/// the audit trail. Freed ids are never reallocated.
pub fn remove(
  corpus: &mut Corpus,
  key: &str,
  reason: Option<String>,
) -> Result<RemoveReport> {
  let Some(record) = corpus.provenance(key).cloned() else {
    return Err(Error::UnknownProvenance {
      key: key.to_string(),
    });
  };

  // 1. Entries recorded under this key go unconditionally.
  let mut entries_removed = Vec::new();
  for entry_id in &record.entries {
    if corpus.remove_entry(*entry_id).is_some() {
      entries_removed.push(*entry_id);
    }
  }

  // 2. Decide ingredient fate. A recorded ingredient (created or reused) is
  // deletable only when no remaining entry references it and no other
  // remaining provenance record claims it; a claim from elsewhere covers
  // both that diff's aliases and its entries.
  let candidates: BTreeSet<IngredientId> = record
    .ingredients
    .iter()
    .chain(&record.ingredients_reused)
    .copied()
    .collect();
  let mut doomed = BTreeSet::new();
  let mut retained = Vec::new();
  for ingredient_id in candidates {
    let used_by_entry =
      corpus.entries().any(|e| e.ingredient_id == ingredient_id);
    let claimed_elsewhere = corpus
      .provenance_map()
      .iter()
      .any(|(other, rec)| other != key && rec.claims_ingredient(ingredient_id));
    if used_by_entry || claimed_elsewhere {
      retained.push(ingredient_id);
    } else {
      doomed.insert(ingredient_id);
    }
  }

  // 3. Aliases die with their ingredient; an alias on a retained
  // ingredient survives even though this diff introduced it, because the
  // data that keeps the ingredient alive still wants its names resolvable.
  let alias_ids: Vec<_> = corpus
    .aliases()
    .filter(|alias| doomed.contains(&alias.ingredient_id))
    .map(|alias| alias.alias_id)
    .collect();
  let mut aliases_removed = Vec::new();
  for alias_id in alias_ids {
    if corpus.remove_alias(alias_id).is_some() {
      aliases_removed.push(alias_id);
    }
  }

  // 4. Ingredients.
  let mut ingredients_removed = Vec::new();
  for ingredient_id in doomed {
    if corpus.remove_ingredient(ingredient_id).is_some() {
      ingredients_removed.push(ingredient_id);
    }
  }

  // 5. Recorded recipes with no remaining entries.
  let mut recipes_removed = Vec::new();
  for recipe_id in &record.recipes {
    let still_used = corpus.entries().any(|e| e.recipe_id == *recipe_id);
    if !still_used && corpus.remove_recipe(*recipe_id).is_some() {
      recipes_removed.push(*recipe_id);
    }
  }

  // 6. Drop the record, keep the note.
  corpus.take_provenance(key);
  let report = RemoveReport {
    entries_removed:      entries_removed.len(),
    aliases_removed:      aliases_removed.len(),
    ingredients_removed:  ingredients_removed.len(),
    ingredients_retained: retained.len(),
    recipes_removed:      recipes_removed.len(),
  };
  corpus.push_removal(RemovalNote {
    source: key.to_string(),
    reason,
    recipes_removed,
    ingredients_removed,
    ingredients_retained: retained,
    aliases_removed,
    entries_removed,
    removed_at: Utc::now(),
  });

  Ok(report)
}
