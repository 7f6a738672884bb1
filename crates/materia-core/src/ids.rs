//! Typed entity identifiers and the per-type id allocator.
//!
//! Ids are small monotonic integers, allocated from counters that are
//! persisted with the store. A retired id is never handed out again, so
//! removing a diff and re-merging it always yields strictly greater ids.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
  ($(#[$doc:meta])* $name:ident) => {
    $(#[$doc])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
      Serialize, Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub u64);

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
      }
    }
  };
}

id_type!(
  /// Identifier of a [`crate::recipe::Recipe`].
  RecipeId
);
id_type!(
  /// Identifier of an [`crate::ingredient::Ingredient`].
  IngredientId
);
id_type!(
  /// Identifier of an [`crate::ingredient::Alias`].
  AliasId
);
id_type!(
  /// Identifier of an [`crate::entry::Entry`].
  EntryId
);

// ─── Allocator ───────────────────────────────────────────────────────────────

/// The next unused id for each entity type.
///
/// Counters are explicit persisted state, never derived from the maximum
/// existing id at load time. Deriving them would reuse ids after a removal
/// and silently corrupt foreign keys recorded elsewhere (provenance,
/// equivalence tooling, external exports).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
  pub recipes:     u64,
  pub ingredients: u64,
  pub aliases:     u64,
  pub entries:     u64,
}

impl Default for IdAllocator {
  fn default() -> Self {
    Self {
      recipes:     1,
      ingredients: 1,
      aliases:     1,
      entries:     1,
    }
  }
}

impl IdAllocator {
  pub fn allocate_recipe(&mut self) -> RecipeId {
    let id = RecipeId(self.recipes);
    self.recipes += 1;
    id
  }

  pub fn allocate_ingredient(&mut self) -> IngredientId {
    let id = IngredientId(self.ingredients);
    self.ingredients += 1;
    id
  }

  pub fn allocate_alias(&mut self) -> AliasId {
    let id = AliasId(self.aliases);
    self.aliases += 1;
    id
  }

  pub fn allocate_entry(&mut self) -> EntryId {
    let id = EntryId(self.entries);
    self.entries += 1;
    id
  }
}
