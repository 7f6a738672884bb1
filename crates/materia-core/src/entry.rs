//! Entry: one ingredient's usage within one recipe.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{EntryId, IngredientId, RecipeId};

/// One recorded usage of an ingredient in a recipe.
///
/// The same (recipe, ingredient) pair may appear in several entries; an
/// ingredient listed twice with different preparations is two entries.
/// Entries are therefore never deduplicated on that pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
  pub entry_id:        EntryId,
  pub recipe_id:       RecipeId,
  pub ingredient_id:   IngredientId,
  /// Verbatim amount text from the source, e.g. `δραχμὰς 16`.
  pub amount_raw:      Option<String>,
  pub amount_value:    Option<f64>,
  pub amount_unit:     Option<String>,
  pub preparation:     Option<String>,
  pub notes:           Option<String>,
  pub source_citation: Option<String>,
  pub source_span:     Option<String>,
  /// Stamped by the merger; never accepted from the diff itself.
  pub added_at:        DateTime<Utc>,
  pub added_by:        String,
}
