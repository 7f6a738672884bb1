//! The persisted corpus document shape.

use std::collections::BTreeMap;

use materia_core::{
  Corpus,
  entry::Entry,
  ids::IdAllocator,
  ingredient::{Alias, Ingredient},
  provenance::{ProvenanceRecord, RemovalNote},
  recipe::Recipe,
};
use serde::{Deserialize, Serialize};

/// On-disk form of the corpus: flat entity arrays plus the per-type id
/// counters, the provenance map, and the removal audit trail.
///
/// `next_ids` is authoritative state, not a cache; see
/// [`materia_core::ids::IdAllocator`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusDocument {
  #[serde(default)]
  pub recipes:     Vec<Recipe>,
  #[serde(default)]
  pub ingredients: Vec<Ingredient>,
  #[serde(default)]
  pub aliases:     Vec<Alias>,
  #[serde(default)]
  pub entries:     Vec<Entry>,
  #[serde(default)]
  pub next_ids:    IdAllocator,
  #[serde(default)]
  pub provenance:  BTreeMap<String, ProvenanceRecord>,
  #[serde(default)]
  pub removals:    Vec<RemovalNote>,
}

impl CorpusDocument {
  /// Snapshot a live corpus. Entity arrays come out in id order, so the
  /// same corpus always produces the same document.
  pub fn from_corpus(corpus: &Corpus) -> Self {
    Self {
      recipes:     corpus.recipes().cloned().collect(),
      ingredients: corpus.ingredients().cloned().collect(),
      aliases:     corpus.aliases().cloned().collect(),
      entries:     corpus.entries().cloned().collect(),
      next_ids:    corpus.ids().clone(),
      provenance:  corpus.provenance_map().clone(),
      removals:    corpus.removals().to_vec(),
    }
  }

  /// Rebuild the in-memory corpus, re-running every integrity check.
  pub fn into_corpus(self) -> materia_core::Result<Corpus> {
    Corpus::from_parts(
      self.recipes,
      self.ingredients,
      self.aliases,
      self.entries,
      self.next_ids,
      self.provenance,
      self.removals,
    )
  }
}
