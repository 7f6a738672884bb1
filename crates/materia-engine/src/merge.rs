//! Diff merge: resolve slugs, allocate ids, record provenance.
//!
//! The merge runs in two phases. The planning phase resolves every slug in
//! the diff against the corpus and the diff itself, decides what is new,
//! reused, or a duplicate, and can fail; the apply phase allocates ids and
//! inserts, and cannot. A bad reference in the last entry therefore leaves
//! the corpus exactly as it was.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::Utc;
use materia_core::{
  Corpus,
  diff::{Diff, DiffAlias, DiffEntry, DiffIngredient, DiffRecipe},
  entry::Entry,
  ids::{IngredientId, RecipeId},
  ingredient::{Alias, Ingredient},
  provenance::ProvenanceRecord,
  recipe::Recipe,
};
use serde::Serialize;
use serde_json::Value;

use crate::{
  Result,
  error::{Error, RefKind},
  validate::validate_diff,
};

// ─── Options and report ──────────────────────────────────────────────────────

/// Caller-supplied merge parameters.
#[derive(Debug, Clone)]
pub struct MergeOptions {
  /// Provenance key for this merge; usually the diff file's name. Must not
  /// have been used before.
  pub source_label: String,
  /// Operator stamped onto new entries and the provenance record.
  pub added_by: String,
  /// Permit a recipe whose slug already exists, provided the diff restates
  /// it field for field; it is then skipped rather than rejected.
  pub allow_restated_recipes: bool,
}

/// What one merge did, by the numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
  pub recipes_added:      usize,
  pub ingredients_added:  usize,
  pub aliases_added:      usize,
  pub entries_added:      usize,
  /// Distinct pre-existing ingredients the diff leaned on.
  pub ingredients_reused: usize,
  pub recipes_skipped:    usize,
  pub aliases_skipped:    usize,
}

// ─── Plan types ──────────────────────────────────────────────────────────────

/// A reference resolved during planning: either an id already in the corpus
/// or an index into this diff's list of to-be-created rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Planned<Id> {
  Existing(Id),
  New(usize),
}

struct Plan<'d> {
  new_recipes:     Vec<&'d DiffRecipe>,
  new_ingredients: Vec<&'d DiffIngredient>,
  new_aliases:     Vec<(Planned<IngredientId>, &'d DiffAlias)>,
  new_entries:     Vec<(Planned<RecipeId>, Planned<IngredientId>, &'d DiffEntry)>,
  reused:          BTreeSet<IngredientId>,
  recipes_skipped: usize,
  aliases_skipped: usize,
}

// ─── Entry point ─────────────────────────────────────────────────────────────

/// Merge a raw diff document into `corpus` under `options.source_label`.
///
/// All-or-nothing: on any error the corpus is unmodified.
pub fn merge(
  corpus: &mut Corpus,
  doc: &Value,
  options: &MergeOptions,
) -> Result<MergeReport> {
  let violations = validate_diff(doc, corpus);
  if !violations.is_empty() {
    return Err(Error::Validation(violations));
  }
  let diff: Diff =
    serde_json::from_value(doc.clone()).map_err(materia_core::Error::from)?;

  if corpus.provenance(&options.source_label).is_some() {
    return Err(Error::DuplicateSource {
      label: options.source_label.clone(),
    });
  }

  let plan = plan(corpus, &diff, options)?;
  apply(corpus, plan, options)
}

// ─── Planning ────────────────────────────────────────────────────────────────

fn plan<'d>(
  corpus: &Corpus,
  diff: &'d Diff,
  options: &MergeOptions,
) -> Result<Plan<'d>> {
  let mut plan = Plan {
    new_recipes:     Vec::new(),
    new_ingredients: Vec::new(),
    new_aliases:     Vec::new(),
    new_entries:     Vec::new(),
    reused:          BTreeSet::new(),
    recipes_skipped: 0,
    aliases_skipped: 0,
  };
  let mut recipe_refs: HashMap<&str, Planned<RecipeId>> = HashMap::new();
  let mut ingredient_refs: HashMap<&str, Planned<IngredientId>> =
    HashMap::new();

  // Recipes are never silently merged: a slug collision is an error unless
  // the diff restates the stored recipe exactly and the caller opted in.
  for declared in &diff.recipes {
    match corpus.recipe_by_slug(&declared.slug) {
      Some(existing)
        if options.allow_restated_recipes && existing.restates(declared) =>
      {
        recipe_refs
          .insert(&declared.slug, Planned::Existing(existing.recipe_id));
        plan.recipes_skipped += 1;
      }
      Some(_) => {
        return Err(Error::DuplicateRecipe {
          slug: declared.slug.clone(),
        });
      }
      None => {
        recipe_refs.insert(&declared.slug, Planned::New(plan.new_recipes.len()));
        plan.new_recipes.push(declared);
      }
    }
  }

  // Ingredients are reused defensively: a restated slug maps onto the
  // existing id instead of failing the whole diff.
  for declared in &diff.ingredients {
    match corpus.ingredient_by_slug(&declared.slug) {
      Some(existing) => {
        if existing.label != declared.label {
          tracing::warn!(
            slug = %declared.slug,
            existing = %existing.label,
            declared = %declared.label,
            "label collision on reused ingredient"
          );
        }
        ingredient_refs
          .insert(&declared.slug, Planned::Existing(existing.ingredient_id));
        plan.reused.insert(existing.ingredient_id);
      }
      None => {
        ingredient_refs
          .insert(&declared.slug, Planned::New(plan.new_ingredients.len()));
        plan.new_ingredients.push(declared);
      }
    }
  }

  // A helper that also counts corpus-resolved slugs as reuse.
  let resolve_ingredient = |slug: &str,
                            reused: &mut BTreeSet<IngredientId>|
   -> Option<Planned<IngredientId>> {
    if let Some(planned) = ingredient_refs.get(slug) {
      return Some(*planned);
    }
    let id = corpus.ingredient_id_for(slug)?;
    reused.insert(id);
    Some(Planned::Existing(id))
  };

  // Aliases: resolve, then suppress exact duplicates against both the
  // corpus and the aliases planned so far.
  let mut seen: HashSet<(Planned<IngredientId>, &str, Option<&str>)> = corpus
    .aliases()
    .map(|alias| {
      let (id, label, language) = alias.dedup_key();
      (Planned::Existing(id), label, language)
    })
    .collect();
  for (index, alias) in diff.aliases.iter().enumerate() {
    let Some(target) = resolve_ingredient(&alias.ingredient_slug, &mut plan.reused)
    else {
      return Err(Error::UnresolvedReference {
        kind:  RefKind::Ingredient,
        slug:  alias.ingredient_slug.clone(),
        index,
      });
    };
    let key = (target, alias.variant_label.as_str(), alias.language.as_deref());
    if seen.insert(key) {
      plan.new_aliases.push((target, alias));
    } else {
      plan.aliases_skipped += 1;
    }
  }

  // Entries: both references must resolve; no deduplication.
  for (index, entry) in diff.entries.iter().enumerate() {
    let recipe = recipe_refs
      .get(entry.recipe_slug.as_str())
      .copied()
      .or_else(|| corpus.recipe_id_for(&entry.recipe_slug).map(Planned::Existing))
      .ok_or_else(|| Error::UnresolvedReference {
        kind:  RefKind::Recipe,
        slug:  entry.recipe_slug.clone(),
        index,
      })?;
    let ingredient = resolve_ingredient(&entry.ingredient_slug, &mut plan.reused)
      .ok_or_else(|| Error::UnresolvedReference {
        kind:  RefKind::Ingredient,
        slug:  entry.ingredient_slug.clone(),
        index,
      })?;
    plan.new_entries.push((recipe, ingredient, entry));
  }

  Ok(plan)
}

// ─── Apply ───────────────────────────────────────────────────────────────────

/// Allocate ids and insert everything the plan resolved. Planning has
/// already established that no insert below can violate a corpus invariant.
fn apply(
  corpus: &mut Corpus,
  plan: Plan<'_>,
  options: &MergeOptions,
) -> Result<MergeReport> {
  let now = Utc::now();
  let mut record = ProvenanceRecord {
    merged_at: now,
    merged_by: options.added_by.clone(),
    ..ProvenanceRecord::default()
  };

  let mut recipe_ids = Vec::with_capacity(plan.new_recipes.len());
  for declared in &plan.new_recipes {
    let recipe_id = corpus.allocate_recipe_id();
    corpus.insert_recipe(Recipe {
      recipe_id,
      slug: declared.slug.clone(),
      label: declared.label.clone(),
      source: declared.source.clone(),
      language: declared.language.clone(),
      date: declared.date,
    })?;
    recipe_ids.push(recipe_id);
    record.recipes.push(recipe_id);
  }

  let mut ingredient_ids = Vec::with_capacity(plan.new_ingredients.len());
  for declared in &plan.new_ingredients {
    let ingredient_id = corpus.allocate_ingredient_id();
    corpus.insert_ingredient(Ingredient {
      ingredient_id,
      slug: declared.slug.clone(),
      label: declared.label.clone(),
      language: declared.language.clone(),
    })?;
    ingredient_ids.push(ingredient_id);
    record.ingredients.push(ingredient_id);
  }

  let recipe_id = |planned: Planned<RecipeId>| match planned {
    Planned::Existing(id) => id,
    Planned::New(index) => recipe_ids[index],
  };
  let ingredient_id = |planned: Planned<IngredientId>| match planned {
    Planned::Existing(id) => id,
    Planned::New(index) => ingredient_ids[index],
  };

  for (target, alias) in &plan.new_aliases {
    let alias_id = corpus.allocate_alias_id();
    corpus.insert_alias(Alias {
      alias_id,
      ingredient_id: ingredient_id(*target),
      variant_label: alias.variant_label.clone(),
      language: alias.language.clone(),
      source: alias.source,
    })?;
    record.aliases.push(alias_id);
  }

  for (recipe, ingredient, entry) in &plan.new_entries {
    let entry_id = corpus.allocate_entry_id();
    corpus.insert_entry(Entry {
      entry_id,
      recipe_id: recipe_id(*recipe),
      ingredient_id: ingredient_id(*ingredient),
      amount_raw: entry.amount_raw.clone(),
      amount_value: entry.amount_value,
      amount_unit: entry.amount_unit.clone(),
      preparation: entry.preparation.clone(),
      notes: entry.notes.clone(),
      source_citation: entry.source_citation.clone(),
      source_span: entry.source_span.clone(),
      added_at: now,
      added_by: options.added_by.clone(),
    })?;
    record.entries.push(entry_id);
  }

  record.ingredients_reused = plan.reused.iter().copied().collect();

  let report = MergeReport {
    recipes_added:      record.recipes.len(),
    ingredients_added:  record.ingredients.len(),
    aliases_added:      record.aliases.len(),
    entries_added:      record.entries.len(),
    ingredients_reused: record.ingredients_reused.len(),
    recipes_skipped:    plan.recipes_skipped,
    aliases_skipped:    plan.aliases_skipped,
  };
  corpus.record_provenance(options.source_label.clone(), record)?;
  Ok(report)
}
