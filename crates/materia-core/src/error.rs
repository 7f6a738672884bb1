//! Error types for `materia-core`.

use thiserror::Error;

use crate::ids::{IngredientId, RecipeId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("duplicate recipe slug: {0}")]
  DuplicateRecipeSlug(String),

  #[error("duplicate ingredient slug: {0}")]
  DuplicateIngredientSlug(String),

  #[error("{entity} id {id} already present")]
  IdInUse { entity: &'static str, id: u64 },

  #[error("unknown recipe id: {0}")]
  UnknownRecipeId(RecipeId),

  #[error("unknown ingredient id: {0}")]
  UnknownIngredientId(IngredientId),

  #[error("{entity} id counter {next_id} is behind existing id {max_id}")]
  StaleCounter {
    entity:  &'static str,
    next_id: u64,
    max_id:  u64,
  },

  #[error("provenance already recorded for source: {0}")]
  ProvenanceExists(String),

  #[error("equivalence group already exists: {0}")]
  GroupExists(String),

  #[error("equivalence group not found: {0}")]
  GroupNotFound(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
