//! Equivalence reconciliation: check the index against the corpus and rank
//! group suggestions for newly submitted terms.
//!
//! The index and the corpus evolve independently: a group may be edited
//! before its ingredient is merged, or reference data that a removal has
//! since taken away. Reconciliation reports problems; it never edits the
//! index, because deciding whether two historical names denote the same
//! substance is scholarly judgment, not bookkeeping.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use materia_core::{Corpus, diff::Diff, equivalence::EquivalenceIndex};
use serde::Serialize;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

// ─── Checking ────────────────────────────────────────────────────────────────

/// Why a term was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemKind {
  /// The term matches no slug, ingredient label, or alias variant label in
  /// the corpus.
  Unresolved,
}

impl fmt::Display for ProblemKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Unresolved => f.write_str("unresolved"),
    }
  }
}

/// One flagged term in one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquivalenceProblem {
  pub group:   String,
  pub term:    String,
  pub problem: ProblemKind,
}

/// Check every term of every group against the corpus.
///
/// Output is deterministic: groups in name order, terms in list order.
pub fn check(
  corpus: &Corpus,
  index: &EquivalenceIndex,
) -> Vec<EquivalenceProblem> {
  let mut known: HashSet<&str> = HashSet::new();
  for ingredient in corpus.ingredients() {
    known.insert(&ingredient.slug);
    known.insert(&ingredient.label);
  }
  for alias in corpus.aliases() {
    known.insert(&alias.variant_label);
  }

  let mut problems = Vec::new();
  for (group, terms) in index.groups() {
    for term in terms {
      if !known.contains(term.as_str()) {
        problems.push(EquivalenceProblem {
          group:   group.to_string(),
          term:    term.clone(),
          problem: ProblemKind::Unresolved,
        });
      }
    }
  }
  problems
}

/// Find the group containing `term`, compared case- and
/// diacritic-insensitively.
pub fn find_group_for<'i>(
  term: &str,
  index: &'i EquivalenceIndex,
) -> Option<&'i str> {
  let needle = fold(term);
  index
    .groups()
    .find(|(_, terms)| terms.iter().any(|t| fold(t) == needle))
    .map(|(name, _)| name)
}

// ─── Suggestions ─────────────────────────────────────────────────────────────

/// An existing group that shares terms with a candidate set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSuggestion {
  pub group:   String,
  /// How many of the group's terms the candidate set matched.
  pub overlap: usize,
}

/// Rank existing groups by overlap with `terms`.
///
/// Comparison is case- and diacritic-insensitive. Groups with no overlap are
/// omitted; ties are broken by group name, so the ranking is stable.
pub fn suggest_groups(
  terms: &[String],
  index: &EquivalenceIndex,
) -> Vec<GroupSuggestion> {
  let folded: BTreeSet<String> = terms.iter().map(|t| fold(t)).collect();

  let mut suggestions: Vec<GroupSuggestion> = index
    .groups()
    .filter_map(|(name, group_terms)| {
      let group_folded: BTreeSet<String> =
        group_terms.iter().map(|t| fold(t)).collect();
      let overlap = group_folded.intersection(&folded).count();
      (overlap > 0).then(|| GroupSuggestion {
        group: name.to_string(),
        overlap,
      })
    })
    .collect();
  suggestions.sort_by(|a, b| {
    b.overlap.cmp(&a.overlap).then_with(|| a.group.cmp(&b.group))
  });
  suggestions
}

/// The term sets a diff introduces, one per referenced ingredient slug:
/// the slug itself, the declared label, and every alias variant. This is
/// what gets fed to [`suggest_groups`] during ingestion.
pub fn diff_term_sets(diff: &Diff) -> Vec<(String, Vec<String>)> {
  let mut order = Vec::new();
  let mut sets: BTreeMap<&str, Vec<String>> = BTreeMap::new();

  for ingredient in &diff.ingredients {
    let slug = ingredient.slug.as_str();
    if !sets.contains_key(slug) {
      order.push(slug);
    }
    let terms = sets.entry(slug).or_default();
    for term in [ingredient.slug.clone(), ingredient.label.clone()] {
      if !terms.contains(&term) {
        terms.push(term);
      }
    }
  }
  for alias in &diff.aliases {
    let slug = alias.ingredient_slug.as_str();
    if !sets.contains_key(slug) {
      order.push(slug);
      sets.entry(slug).or_default().push(alias.ingredient_slug.clone());
    }
    let terms = sets.entry(slug).or_default();
    if !terms.contains(&alias.variant_label) {
      terms.push(alias.variant_label.clone());
    }
  }

  order
    .into_iter()
    .filter_map(|slug| sets.remove(slug).map(|terms| (slug.to_string(), terms)))
    .collect()
}

// ─── Folding ─────────────────────────────────────────────────────────────────

/// Lowercased, diacritic-stripped form used for matching: NFD
/// decomposition with combining marks removed.
pub fn fold(text: &str) -> String {
  text
    .nfd()
    .filter(|c| !is_combining_mark(*c))
    .collect::<String>()
    .to_lowercase()
    .trim()
    .to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fold_strips_greek_diacritics() {
    assert_eq!(fold("σμύρνη"), "σμυρνη");
    assert_eq!(fold("  Myrrh "), "myrrh");
  }

  #[test]
  fn find_group_is_diacritic_insensitive() {
    let mut index = EquivalenceIndex::default();
    index
      .create_group("Myrrh", ["σμύρνη".to_string()])
      .unwrap();
    assert_eq!(find_group_for("σμυρνη", &index), Some("Myrrh"));
    assert_eq!(find_group_for("cassia", &index), None);
  }
}
