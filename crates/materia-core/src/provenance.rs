//! Provenance and removal audit records.
//!
//! Every merge records exactly which ids it created (and which existing
//! ingredients it leaned on) under its source label. Removal reverses a
//! merge from that record alone and leaves a note behind; the record itself
//! is dropped, the note is permanent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AliasId, EntryId, IngredientId, RecipeId};

/// What one merged diff contributed to the corpus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
  pub recipes:            Vec<RecipeId>,
  pub ingredients:        Vec<IngredientId>,
  pub aliases:            Vec<AliasId>,
  pub entries:            Vec<EntryId>,
  /// Pre-existing ingredients this diff referenced (restated, aliased, or
  /// used in an entry). Needed so removal can tell when the last diff that
  /// depended on an ingredient is gone.
  #[serde(default)]
  pub ingredients_reused: Vec<IngredientId>,
  pub merged_at:          DateTime<Utc>,
  pub merged_by:          String,
}

impl ProvenanceRecord {
  /// Whether this record claims the ingredient, either as its creator or as
  /// a reuser.
  pub fn claims_ingredient(&self, id: IngredientId) -> bool {
    self.ingredients.contains(&id) || self.ingredients_reused.contains(&id)
  }
}

/// Audit-trail note appended by every successful removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalNote {
  /// The provenance key that was removed.
  pub source:                String,
  pub reason:                Option<String>,
  pub recipes_removed:       Vec<RecipeId>,
  pub ingredients_removed:   Vec<IngredientId>,
  /// Recorded ingredients that survived because other data still needs them.
  pub ingredients_retained:  Vec<IngredientId>,
  pub aliases_removed:       Vec<AliasId>,
  pub entries_removed:       Vec<EntryId>,
  pub removed_at:            DateTime<Utc>,
}
