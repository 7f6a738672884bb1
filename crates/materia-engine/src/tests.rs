//! Scenario tests for merge, removal, reconciliation, and export.

use materia_core::{Corpus, diff::Diff, equivalence::EquivalenceIndex};
use serde_json::{Value, json};

use crate::{
  Error, MergeOptions, export,
  merge::merge,
  reconcile::{self, ProblemKind},
  remove::remove,
  validate::validate_diff,
};

fn options(label: &str) -> MergeOptions {
  MergeOptions {
    source_label:           label.to_string(),
    added_by:               "test".to_string(),
    allow_restated_recipes: false,
  }
}

/// The Dioscorides myrrh diff: one recipe, one ingredient, one alias, one
/// entry.
fn smyrne_diff() -> Value {
  json!({
    "recipes": [{
      "slug": "dioscorides-130",
      "label": "Dioscorides 1.30",
      "source": "De materia medica 1.30",
      "language": "grc",
      "date": -60
    }],
    "ingredients": [{
      "slug": "smyrne",
      "label": "σμύρνη",
      "language": "grc"
    }],
    "aliases": [{
      "ingredient_slug": "smyrne",
      "variant_label": "myrrh",
      "language": "en",
      "source": "translation"
    }],
    "entries": [{
      "recipe_slug": "dioscorides-130",
      "ingredient_slug": "smyrne",
      "amount_raw": "δραχμὰς 16",
      "amount_value": 16,
      "amount_unit": "drachm"
    }]
  })
}

// ─── Merge ───────────────────────────────────────────────────────────────────

#[test]
fn merge_into_empty_corpus_counts_and_exports() {
  let mut corpus = Corpus::default();
  let report = merge(&mut corpus, &smyrne_diff(), &options("d-130")).unwrap();

  assert_eq!(report.recipes_added, 1);
  assert_eq!(report.ingredients_added, 1);
  assert_eq!(report.aliases_added, 1);
  assert_eq!(report.entries_added, 1);
  assert_eq!(report.ingredients_reused, 0);

  let rows = export(&corpus);
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].recipe, "Dioscorides 1.30");
  assert_eq!(rows[0].ingredient, "σμύρνη");
  assert_eq!(rows[0].amount_raw.as_deref(), Some("δραχμὰς 16"));
  assert_eq!(rows[0].amount_value, Some(16.0));
}

#[test]
fn second_diff_reuses_existing_ingredient() {
  let mut corpus = Corpus::default();
  merge(&mut corpus, &smyrne_diff(), &options("d-130")).unwrap();
  let smyrne_id = corpus.ingredient_id_for("smyrne").unwrap();

  let second = json!({
    "recipes": [{
      "slug": "galen-theriac",
      "label": "Galen, Theriac",
      "language": "grc"
    }],
    "entries": [{
      "recipe_slug": "galen-theriac",
      "ingredient_slug": "smyrne",
      "amount_raw": "ὀλίγον"
    }]
  });
  let report = merge(&mut corpus, &second, &options("galen")).unwrap();

  assert_eq!(report.ingredients_added, 0);
  assert_eq!(report.ingredients_reused, 1);
  assert_eq!(report.entries_added, 1);
  assert_eq!(corpus.ingredient_id_for("smyrne"), Some(smyrne_id));
  assert_eq!(corpus.ingredient_count(), 1);
}

#[test]
fn restated_ingredient_in_diff_is_reused_not_rejected() {
  let mut corpus = Corpus::default();
  merge(&mut corpus, &smyrne_diff(), &options("d-130")).unwrap();

  // The submitter restates σμύρνη wholesale; the merge maps it back onto
  // the existing id instead of failing.
  let second = json!({
    "recipes": [{ "slug": "r2", "label": "Second recipe" }],
    "ingredients": [{ "slug": "smyrne", "label": "σμύρνη", "language": "grc" }],
    "entries": [{ "recipe_slug": "r2", "ingredient_slug": "smyrne" }]
  });
  let report = merge(&mut corpus, &second, &options("second")).unwrap();
  assert_eq!(report.ingredients_added, 0);
  assert_eq!(report.ingredients_reused, 1);
}

#[test]
fn duplicate_recipe_slug_is_rejected() {
  let mut corpus = Corpus::default();
  merge(&mut corpus, &smyrne_diff(), &options("d-130")).unwrap();

  let err = merge(&mut corpus, &smyrne_diff(), &options("again")).unwrap_err();
  assert!(
    matches!(err, Error::DuplicateRecipe { slug } if slug == "dioscorides-130")
  );
}

#[test]
fn restated_recipe_is_skipped_when_policy_allows() {
  let mut corpus = Corpus::default();
  merge(&mut corpus, &smyrne_diff(), &options("d-130")).unwrap();
  let entries_before = corpus.entry_count();

  let mut opts = options("again");
  opts.allow_restated_recipes = true;
  let report = merge(&mut corpus, &smyrne_diff(), &opts).unwrap();

  assert_eq!(report.recipes_added, 0);
  assert_eq!(report.recipes_skipped, 1);
  // The restated alias is suppressed, the entry is not: entries are never
  // deduplicated.
  assert_eq!(report.aliases_skipped, 1);
  assert_eq!(report.entries_added, 1);
  assert_eq!(corpus.entry_count(), entries_before + 1);

  // A divergent payload under the same slug is still a collision.
  let mut divergent = smyrne_diff();
  divergent["recipes"][0]["label"] = json!("Different label");
  let mut opts = options("third");
  opts.allow_restated_recipes = true;
  assert!(matches!(
    merge(&mut corpus, &divergent, &opts),
    Err(Error::DuplicateRecipe { .. })
  ));
}

#[test]
fn same_source_label_cannot_merge_twice() {
  let mut corpus = Corpus::default();
  merge(&mut corpus, &smyrne_diff(), &options("d-130")).unwrap();

  let second = json!({
    "recipes": [{ "slug": "other", "label": "Other" }]
  });
  let err = merge(&mut corpus, &second, &options("d-130")).unwrap_err();
  assert!(matches!(err, Error::DuplicateSource { label } if label == "d-130"));
}

#[test]
fn alias_duplicates_suppressed_but_language_distinguishes() {
  let mut corpus = Corpus::default();
  merge(&mut corpus, &smyrne_diff(), &options("d-130")).unwrap();

  let second = json!({
    "aliases": [
      // Exact duplicate of the merged alias.
      { "ingredient_slug": "smyrne", "variant_label": "myrrh",
        "language": "en", "source": "translation" },
      // Same label, different language: a distinct alias.
      { "ingredient_slug": "smyrne", "variant_label": "myrrh",
        "language": "la", "source": "translation" }
    ]
  });
  let report = merge(&mut corpus, &second, &options("aliases")).unwrap();
  assert_eq!(report.aliases_skipped, 1);
  assert_eq!(report.aliases_added, 1);
  assert_eq!(corpus.alias_count(), 2);
}

// ─── Atomicity ───────────────────────────────────────────────────────────────

#[test]
fn merge_with_one_bad_reference_changes_nothing() {
  let mut corpus = Corpus::default();
  merge(&mut corpus, &smyrne_diff(), &options("d-130")).unwrap();

  let ids_before = corpus.ids().clone();
  let rows_before = export(&corpus);

  let mut bad = json!({
    "recipes": [{ "slug": "r2", "label": "Second recipe" }],
    "ingredients": [{ "slug": "kasia", "label": "κασία" }],
    "aliases": [{ "ingredient_slug": "kasia", "variant_label": "cassia",
                  "source": "translation" }],
    "entries": [
      { "recipe_slug": "r2", "ingredient_slug": "kasia" },
      { "recipe_slug": "r2", "ingredient_slug": "kasia-misspelt" }
    ]
  });
  let err = merge(&mut corpus, &bad, &options("bad")).unwrap_err();
  let Error::Validation(violations) = err else {
    panic!("expected validation failure");
  };
  assert_eq!(violations.len(), 1);
  assert_eq!(violations[0].path, "entries[1].ingredient_slug");

  // Nothing moved: no rows, no ids, no provenance.
  assert_eq!(corpus.ids(), &ids_before);
  assert_eq!(export(&corpus), rows_before);
  assert_eq!(corpus.recipe_count(), 1);
  assert_eq!(corpus.ingredient_count(), 1);
  assert!(corpus.provenance("bad").is_none());

  // The corrected diff merges cleanly afterwards.
  bad["entries"][1]["ingredient_slug"] = json!("kasia");
  merge(&mut corpus, &bad, &options("bad")).unwrap();
  assert_eq!(corpus.recipe_count(), 2);
}

// ─── Removal ─────────────────────────────────────────────────────────────────

#[test]
fn remove_reverses_a_merge() {
  let mut corpus = Corpus::default();
  merge(&mut corpus, &smyrne_diff(), &options("d-130")).unwrap();

  let report = remove(&mut corpus, "d-130", Some("bad OCR".into())).unwrap();
  assert_eq!(report.entries_removed, 1);
  assert_eq!(report.aliases_removed, 1);
  assert_eq!(report.ingredients_removed, 1);
  assert_eq!(report.recipes_removed, 1);

  assert_eq!(corpus.recipe_count(), 0);
  assert_eq!(corpus.entry_count(), 0);
  assert!(corpus.provenance("d-130").is_none());
  // The audit trail keeps the note.
  assert_eq!(corpus.removals().len(), 1);
  assert_eq!(corpus.removals()[0].reason.as_deref(), Some("bad OCR"));
}

#[test]
fn remove_unknown_key_fails() {
  let mut corpus = Corpus::default();
  let err = remove(&mut corpus, "nothing", None).unwrap_err();
  assert!(matches!(err, Error::UnknownProvenance { key } if key == "nothing"));
}

#[test]
fn removal_retains_ingredients_other_diffs_depend_on() {
  let mut corpus = Corpus::default();
  // Diff A introduces σμύρνη with an alias.
  merge(&mut corpus, &smyrne_diff(), &options("a")).unwrap();
  // Diff B's entries also reference it.
  let b = json!({
    "recipes": [{ "slug": "galen-theriac", "label": "Galen, Theriac" }],
    "entries": [{ "recipe_slug": "galen-theriac", "ingredient_slug": "smyrne" }]
  });
  merge(&mut corpus, &b, &options("b")).unwrap();

  // Removing A keeps σμύρνη and its alias alive for B.
  let report = remove(&mut corpus, "a", None).unwrap();
  assert_eq!(report.ingredients_removed, 0);
  assert_eq!(report.ingredients_retained, 1);
  assert_eq!(report.aliases_removed, 0);
  assert!(corpus.ingredient_id_for("smyrne").is_some());
  assert_eq!(corpus.alias_count(), 1);

  // Removing B takes the last dependency with it.
  remove(&mut corpus, "b", None).unwrap();
  assert_eq!(corpus.ingredient_count(), 0);
  assert_eq!(corpus.alias_count(), 0);
  assert_eq!(corpus.entry_count(), 0);
}

#[test]
fn referential_closure_holds_after_any_sequence() {
  let mut corpus = Corpus::default();
  merge(&mut corpus, &smyrne_diff(), &options("a")).unwrap();
  let b = json!({
    "recipes": [{ "slug": "r2", "label": "Second" }],
    "ingredients": [{ "slug": "kasia", "label": "κασία" }],
    "entries": [
      { "recipe_slug": "r2", "ingredient_slug": "smyrne" },
      { "recipe_slug": "r2", "ingredient_slug": "kasia" }
    ]
  });
  merge(&mut corpus, &b, &options("b")).unwrap();
  remove(&mut corpus, "a", None).unwrap();

  for entry in corpus.entries() {
    assert!(corpus.recipe(entry.recipe_id).is_some());
    assert!(corpus.ingredient(entry.ingredient_id).is_some());
  }
  for alias in corpus.aliases() {
    assert!(corpus.ingredient(alias.ingredient_id).is_some());
  }
}

// ─── Tombstones ──────────────────────────────────────────────────────────────

#[test]
fn re_merging_after_removal_allocates_strictly_greater_ids() {
  let mut corpus = Corpus::default();
  merge(&mut corpus, &smyrne_diff(), &options("d-130")).unwrap();

  let first_recipe_id = corpus.recipe_id_for("dioscorides-130").unwrap();
  let first_ingredient_id = corpus.ingredient_id_for("smyrne").unwrap();
  let rows_before = export(&corpus);

  remove(&mut corpus, "d-130", None).unwrap();
  merge(&mut corpus, &smyrne_diff(), &options("d-130-redo")).unwrap();

  let second_recipe_id = corpus.recipe_id_for("dioscorides-130").unwrap();
  let second_ingredient_id = corpus.ingredient_id_for("smyrne").unwrap();
  assert!(second_recipe_id > first_recipe_id);
  assert!(second_ingredient_id > first_ingredient_id);

  // Content is equal to the first merge; only the ids moved on.
  assert_eq!(export(&corpus), rows_before);
}

// ─── Export determinism ──────────────────────────────────────────────────────

#[test]
fn export_is_deterministic() {
  let mut corpus = Corpus::default();
  merge(&mut corpus, &smyrne_diff(), &options("a")).unwrap();
  let b = json!({
    "recipes": [{ "slug": "r2", "label": "Second" }],
    "entries": [
      { "recipe_slug": "r2", "ingredient_slug": "smyrne", "preparation": "ground" },
      { "recipe_slug": "r2", "ingredient_slug": "smyrne", "preparation": "whole" }
    ]
  });
  merge(&mut corpus, &b, &options("b")).unwrap();

  let first = export(&corpus);
  let second = export(&corpus);
  assert_eq!(first, second);

  // Ordered by recipe id, then entry id.
  assert_eq!(first[0].recipe_slug, "dioscorides-130");
  assert_eq!(first[1].preparation.as_deref(), Some("ground"));
  assert_eq!(first[2].preparation.as_deref(), Some("whole"));
}

// ─── Validation details ──────────────────────────────────────────────────────

#[test]
fn violations_carry_paths_and_constraints() {
  let corpus = Corpus::default();
  let doc = json!({
    "recipes": [{ "label": 7 }],
    "aliases": [{ "ingredient_slug": "ghost", "variant_label": "x",
                  "source": "folk etymology" }],
    "entrees": []
  });
  let violations = validate_diff(&doc, &corpus);
  let paths: Vec<&str> =
    violations.iter().map(|v| v.path.as_str()).collect();

  // Unrecognized top-level key, missing slug, mistyped label, bad source
  // kind, unresolved alias reference.
  assert!(paths.contains(&"entrees"));
  assert!(paths.contains(&"recipes[0].slug"));
  assert!(paths.contains(&"recipes[0].label"));
  assert!(paths.contains(&"aliases[0].source"));
  assert!(paths.contains(&"aliases[0].ingredient_slug"));

  let label = violations
    .iter()
    .find(|v| v.path == "recipes[0].label")
    .unwrap();
  assert_eq!(label.expected, "a string");
  assert_eq!(label.found, "a number");
}

#[test]
fn duplicate_slugs_within_a_diff_are_violations() {
  let corpus = Corpus::default();
  let doc = json!({
    "ingredients": [
      { "slug": "smyrne", "label": "σμύρνη" },
      { "slug": "smyrne", "label": "σμύρνα" }
    ]
  });
  let violations = validate_diff(&doc, &corpus);
  assert_eq!(violations.len(), 1);
  assert_eq!(violations[0].path, "ingredients[1].slug");
}

#[test]
fn entry_may_reference_ingredient_declared_later_in_the_diff() {
  let corpus = Corpus::default();
  let doc = json!({
    "recipes": [{ "slug": "r", "label": "R" }],
    "entries": [{ "recipe_slug": "r", "ingredient_slug": "late" }],
    "ingredients": [{ "slug": "late", "label": "Late" }]
  });
  assert!(validate_diff(&doc, &corpus).is_empty());
}

// ─── Equivalence reconciliation ──────────────────────────────────────────────

#[test]
fn unresolved_equivalence_term_is_reported() {
  let mut corpus = Corpus::default();
  merge(&mut corpus, &smyrne_diff(), &options("d-130")).unwrap();

  let mut index = EquivalenceIndex::default();
  index
    .create_group(
      "Myrrh",
      ["smyrne", "myrrh", "xyz-nonexistent"].map(String::from),
    )
    .unwrap();

  let problems = reconcile::check(&corpus, &index);
  assert_eq!(problems.len(), 1);
  assert_eq!(problems[0].group, "Myrrh");
  assert_eq!(problems[0].term, "xyz-nonexistent");
  assert_eq!(problems[0].problem, ProblemKind::Unresolved);
}

#[test]
fn labels_and_variants_resolve_equivalence_terms() {
  let mut corpus = Corpus::default();
  merge(&mut corpus, &smyrne_diff(), &options("d-130")).unwrap();

  let mut index = EquivalenceIndex::default();
  index
    .create_group("Myrrh", ["σμύρνη", "myrrh", "smyrne"].map(String::from))
    .unwrap();
  assert!(reconcile::check(&corpus, &index).is_empty());
}

#[test]
fn suggestions_rank_by_overlap_then_name() {
  let mut index = EquivalenceIndex::default();
  index
    .create_group("Cassia", ["kasia", "cassia"].map(String::from))
    .unwrap();
  index
    .create_group("Cinnamon", ["kinnamomon", "cassia"].map(String::from))
    .unwrap();
  index
    .create_group("Myrrh", ["smyrne", "myrrh"].map(String::from))
    .unwrap();

  // Diacritics and case fold away during comparison.
  let candidates = ["KASIA".to_string(), "cássia".to_string()];
  let suggestions = reconcile::suggest_groups(&candidates, &index);
  assert_eq!(suggestions.len(), 2);
  assert_eq!(suggestions[0].group, "Cassia");
  assert_eq!(suggestions[0].overlap, 2);
  assert_eq!(suggestions[1].group, "Cinnamon");
  assert_eq!(suggestions[1].overlap, 1);

  // Equal overlap: lexical order decides.
  let tied = ["cassia".to_string()];
  let suggestions = reconcile::suggest_groups(&tied, &index);
  assert_eq!(suggestions[0].group, "Cassia");
  assert_eq!(suggestions[1].group, "Cinnamon");

  // No overlap at all: empty, the caller offers "create new group".
  let none = ["λίβανος".to_string()];
  assert!(reconcile::suggest_groups(&none, &index).is_empty());
}

#[test]
fn diff_term_sets_gather_slug_label_and_variants() {
  let diff: Diff = serde_json::from_value(smyrne_diff()).unwrap();
  let sets = reconcile::diff_term_sets(&diff);
  assert_eq!(sets.len(), 1);
  let (slug, terms) = &sets[0];
  assert_eq!(slug, "smyrne");
  assert_eq!(terms, &["smyrne", "σμύρνη", "myrrh"]);
}
