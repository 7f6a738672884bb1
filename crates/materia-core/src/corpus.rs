//! The in-memory canonical store.
//!
//! Tables are keyed by stable integer ids; slugs exist only in the two
//! maintained slug→id indexes. Foreign keys are always ids; a slug never
//! crosses into a stored record. Insert and remove primitives defend the
//! referential invariants so that higher layers cannot construct a corpus
//! that fails them.

use std::collections::{BTreeMap, HashMap};

use crate::{
  entry::Entry,
  error::{Error, Result},
  ids::{AliasId, EntryId, IdAllocator, IngredientId, RecipeId},
  ingredient::{Alias, Ingredient},
  provenance::{ProvenanceRecord, RemovalNote},
  recipe::Recipe,
};

/// The full dataset: recipes, ingredients, aliases, entries, plus the id
/// counters, the provenance map, and the removal audit trail.
///
/// Construct an empty corpus with [`Corpus::default`] or rebuild one from
/// persisted parts with [`Corpus::from_parts`]; the latter re-runs every
/// integrity check, so a corrupt document can never become a live corpus.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
  recipes:     BTreeMap<RecipeId, Recipe>,
  ingredients: BTreeMap<IngredientId, Ingredient>,
  aliases:     BTreeMap<AliasId, Alias>,
  entries:     BTreeMap<EntryId, Entry>,

  recipe_slugs:     HashMap<String, RecipeId>,
  ingredient_slugs: HashMap<String, IngredientId>,

  ids:        IdAllocator,
  provenance: BTreeMap<String, ProvenanceRecord>,
  removals:   Vec<RemovalNote>,
}

impl Corpus {
  // ── Construction ──────────────────────────────────────────────────────

  /// Rebuild a corpus from persisted parts, re-validating every invariant.
  ///
  /// Fails on duplicate slugs, dangling foreign keys, or an id counter that
  /// is not strictly ahead of every existing id of its type.
  pub fn from_parts(
    recipes: Vec<Recipe>,
    ingredients: Vec<Ingredient>,
    aliases: Vec<Alias>,
    entries: Vec<Entry>,
    ids: IdAllocator,
    provenance: BTreeMap<String, ProvenanceRecord>,
    removals: Vec<RemovalNote>,
  ) -> Result<Self> {
    let mut corpus = Self {
      ids,
      provenance,
      removals,
      ..Self::default()
    };
    for recipe in recipes {
      corpus.check_counter("recipe", corpus.ids.recipes, recipe.recipe_id.0)?;
      corpus.insert_recipe(recipe)?;
    }
    for ingredient in ingredients {
      corpus.check_counter(
        "ingredient",
        corpus.ids.ingredients,
        ingredient.ingredient_id.0,
      )?;
      corpus.insert_ingredient(ingredient)?;
    }
    for alias in aliases {
      corpus.check_counter("alias", corpus.ids.aliases, alias.alias_id.0)?;
      corpus.insert_alias(alias)?;
    }
    for entry in entries {
      corpus.check_counter("entry", corpus.ids.entries, entry.entry_id.0)?;
      corpus.insert_entry(entry)?;
    }
    Ok(corpus)
  }

  fn check_counter(
    &self,
    entity: &'static str,
    next_id: u64,
    id: u64,
  ) -> Result<()> {
    if id >= next_id {
      return Err(Error::StaleCounter {
        entity,
        next_id,
        max_id: id,
      });
    }
    Ok(())
  }

  // ── Id allocation ─────────────────────────────────────────────────────

  pub fn allocate_recipe_id(&mut self) -> RecipeId {
    self.ids.allocate_recipe()
  }

  pub fn allocate_ingredient_id(&mut self) -> IngredientId {
    self.ids.allocate_ingredient()
  }

  pub fn allocate_alias_id(&mut self) -> AliasId {
    self.ids.allocate_alias()
  }

  pub fn allocate_entry_id(&mut self) -> EntryId {
    self.ids.allocate_entry()
  }

  pub fn ids(&self) -> &IdAllocator {
    &self.ids
  }

  // ── Slug resolution ───────────────────────────────────────────────────

  pub fn recipe_id_for(&self, slug: &str) -> Option<RecipeId> {
    self.recipe_slugs.get(slug).copied()
  }

  pub fn ingredient_id_for(&self, slug: &str) -> Option<IngredientId> {
    self.ingredient_slugs.get(slug).copied()
  }

  pub fn recipe_by_slug(&self, slug: &str) -> Option<&Recipe> {
    self.recipe_id_for(slug).and_then(|id| self.recipes.get(&id))
  }

  pub fn ingredient_by_slug(&self, slug: &str) -> Option<&Ingredient> {
    self
      .ingredient_id_for(slug)
      .and_then(|id| self.ingredients.get(&id))
  }

  // ── Lookups and iteration (id order) ──────────────────────────────────

  pub fn recipe(&self, id: RecipeId) -> Option<&Recipe> {
    self.recipes.get(&id)
  }

  pub fn ingredient(&self, id: IngredientId) -> Option<&Ingredient> {
    self.ingredients.get(&id)
  }

  pub fn alias(&self, id: AliasId) -> Option<&Alias> {
    self.aliases.get(&id)
  }

  pub fn entry(&self, id: EntryId) -> Option<&Entry> {
    self.entries.get(&id)
  }

  pub fn recipes(&self) -> impl Iterator<Item = &Recipe> {
    self.recipes.values()
  }

  pub fn ingredients(&self) -> impl Iterator<Item = &Ingredient> {
    self.ingredients.values()
  }

  pub fn aliases(&self) -> impl Iterator<Item = &Alias> {
    self.aliases.values()
  }

  pub fn entries(&self) -> impl Iterator<Item = &Entry> {
    self.entries.values()
  }

  pub fn recipe_count(&self) -> usize {
    self.recipes.len()
  }

  pub fn ingredient_count(&self) -> usize {
    self.ingredients.len()
  }

  pub fn alias_count(&self) -> usize {
    self.aliases.len()
  }

  pub fn entry_count(&self) -> usize {
    self.entries.len()
  }

  // ── Inserts ───────────────────────────────────────────────────────────

  pub fn insert_recipe(&mut self, recipe: Recipe) -> Result<()> {
    if self.recipes.contains_key(&recipe.recipe_id) {
      return Err(Error::IdInUse {
        entity: "recipe",
        id:     recipe.recipe_id.0,
      });
    }
    if self.recipe_slugs.contains_key(&recipe.slug) {
      return Err(Error::DuplicateRecipeSlug(recipe.slug));
    }
    self.recipe_slugs.insert(recipe.slug.clone(), recipe.recipe_id);
    self.recipes.insert(recipe.recipe_id, recipe);
    Ok(())
  }

  pub fn insert_ingredient(&mut self, ingredient: Ingredient) -> Result<()> {
    if self.ingredients.contains_key(&ingredient.ingredient_id) {
      return Err(Error::IdInUse {
        entity: "ingredient",
        id:     ingredient.ingredient_id.0,
      });
    }
    if self.ingredient_slugs.contains_key(&ingredient.slug) {
      return Err(Error::DuplicateIngredientSlug(ingredient.slug));
    }
    self
      .ingredient_slugs
      .insert(ingredient.slug.clone(), ingredient.ingredient_id);
    self.ingredients.insert(ingredient.ingredient_id, ingredient);
    Ok(())
  }

  pub fn insert_alias(&mut self, alias: Alias) -> Result<()> {
    if self.aliases.contains_key(&alias.alias_id) {
      return Err(Error::IdInUse {
        entity: "alias",
        id:     alias.alias_id.0,
      });
    }
    if !self.ingredients.contains_key(&alias.ingredient_id) {
      return Err(Error::UnknownIngredientId(alias.ingredient_id));
    }
    self.aliases.insert(alias.alias_id, alias);
    Ok(())
  }

  pub fn insert_entry(&mut self, entry: Entry) -> Result<()> {
    if self.entries.contains_key(&entry.entry_id) {
      return Err(Error::IdInUse {
        entity: "entry",
        id:     entry.entry_id.0,
      });
    }
    if !self.recipes.contains_key(&entry.recipe_id) {
      return Err(Error::UnknownRecipeId(entry.recipe_id));
    }
    if !self.ingredients.contains_key(&entry.ingredient_id) {
      return Err(Error::UnknownIngredientId(entry.ingredient_id));
    }
    self.entries.insert(entry.entry_id, entry);
    Ok(())
  }

  // ── Removes ───────────────────────────────────────────────────────────
  //
  // Removal never touches the id counters: a retired id stays retired.

  pub fn remove_recipe(&mut self, id: RecipeId) -> Option<Recipe> {
    let recipe = self.recipes.remove(&id)?;
    self.recipe_slugs.remove(&recipe.slug);
    Some(recipe)
  }

  pub fn remove_ingredient(&mut self, id: IngredientId) -> Option<Ingredient> {
    let ingredient = self.ingredients.remove(&id)?;
    self.ingredient_slugs.remove(&ingredient.slug);
    Some(ingredient)
  }

  pub fn remove_alias(&mut self, id: AliasId) -> Option<Alias> {
    self.aliases.remove(&id)
  }

  pub fn remove_entry(&mut self, id: EntryId) -> Option<Entry> {
    self.entries.remove(&id)
  }

  // ── Provenance and audit trail ────────────────────────────────────────

  pub fn provenance(&self, key: &str) -> Option<&ProvenanceRecord> {
    self.provenance.get(key)
  }

  pub fn provenance_map(&self) -> &BTreeMap<String, ProvenanceRecord> {
    &self.provenance
  }

  pub fn record_provenance(
    &mut self,
    key: String,
    record: ProvenanceRecord,
  ) -> Result<()> {
    if self.provenance.contains_key(&key) {
      return Err(Error::ProvenanceExists(key));
    }
    self.provenance.insert(key, record);
    Ok(())
  }

  pub fn take_provenance(&mut self, key: &str) -> Option<ProvenanceRecord> {
    self.provenance.remove(key)
  }

  pub fn removals(&self) -> &[RemovalNote] {
    &self.removals
  }

  pub fn push_removal(&mut self, note: RemovalNote) {
    self.removals.push(note);
  }
}
