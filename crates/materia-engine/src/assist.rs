//! Ingestion assists: slug suggestion and fuzzy lookup.
//!
//! Both are best-effort collaborators for a human (or assistant) deciding
//! whether a name is new or a variant of something already merged. Their
//! output is advisory; nothing downstream validates it beyond display.

use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use materia_core::Corpus;
use serde::Serialize;

use crate::reconcile::fold;

// ─── Slug suggestion ─────────────────────────────────────────────────────────

/// Suggest a slug for a new ingredient label.
///
/// Greek (`grc`) labels are transliterated after diacritic stripping;
/// Egyptian (`egy`) transcriptions keep their hyphens but shed editorial
/// brackets; everything else is kebab-cased.
pub fn suggest_slug(label: &str, language: Option<&str>) -> String {
  match language {
    Some("grc") => {
      let mut slug = String::new();
      for c in fold(label).chars() {
        match greek_letter(c) {
          Some(latin) => slug.push_str(latin),
          None if c.is_ascii_alphabetic() => slug.push(c),
          None => slug.push('-'),
        }
      }
      collapse_hyphens(&slug)
    }
    Some("egy") => {
      let cleaned: String = label
        .to_lowercase()
        .chars()
        .map(|c| match c {
          '.' | '(' | ')' | '{' | '}' | '[' | ']' => '\0',
          c if c.is_ascii_alphanumeric() || c == '-' => c,
          _ => '-',
        })
        .filter(|c| *c != '\0')
        .collect();
      collapse_hyphens(&cleaned)
    }
    _ => {
      let cleaned: String = label
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
      collapse_hyphens(&cleaned)
    }
  }
}

fn greek_letter(c: char) -> Option<&'static str> {
  Some(match c {
    'α' => "a",
    'β' => "b",
    'γ' => "g",
    'δ' => "d",
    'ε' => "e",
    'ζ' => "z",
    'η' => "e",
    'θ' => "th",
    'ι' => "i",
    'κ' => "k",
    'λ' => "l",
    'μ' => "m",
    'ν' => "n",
    'ξ' => "x",
    'ο' => "o",
    'π' => "p",
    'ρ' => "r",
    'σ' | 'ς' => "s",
    'τ' => "t",
    'υ' => "y",
    'φ' => "ph",
    'χ' => "ch",
    'ψ' => "ps",
    'ω' => "o",
    _ => return None,
  })
}

fn collapse_hyphens(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut last_hyphen = true;
  for c in s.chars() {
    if c == '-' {
      if !last_hyphen {
        out.push('-');
      }
      last_hyphen = true;
    } else {
      out.push(c);
      last_hyphen = false;
    }
  }
  while out.ends_with('-') {
    out.pop();
  }
  out
}

// ─── Fuzzy lookup ────────────────────────────────────────────────────────────

/// A fuzzy match against an ingredient, directly or through one of its
/// aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlugMatch {
  pub slug:     String,
  pub label:    String,
  pub language: Option<String>,
  pub score:    i64,
  /// Set when the match came through an alias rather than the label.
  pub via:      Option<String>,
}

/// Rank corpus ingredients by fuzzy similarity to `query`.
///
/// Matches against labels, slugs, and alias variant labels (all folded);
/// each slug appears once with its best score; results are sorted by score
/// descending, then slug, so ranking is stable.
pub fn rank_similar(query: &str, corpus: &Corpus) -> Vec<SlugMatch> {
  let matcher = SkimMatcherV2::default();
  let needle = fold(query);

  let mut best: Vec<SlugMatch> = Vec::new();
  let mut consider = |candidate: SlugMatch| {
    match best.iter_mut().find(|m| m.slug == candidate.slug) {
      Some(existing) if existing.score < candidate.score => {
        *existing = candidate;
      }
      Some(_) => {}
      None => best.push(candidate),
    }
  };

  for ingredient in corpus.ingredients() {
    for haystack in [&ingredient.label, &ingredient.slug] {
      if let Some(score) = matcher.fuzzy_match(&fold(haystack), &needle) {
        consider(SlugMatch {
          slug:     ingredient.slug.clone(),
          label:    ingredient.label.clone(),
          language: ingredient.language.clone(),
          score,
          via:      None,
        });
      }
    }
  }
  for alias in corpus.aliases() {
    let Some(ingredient) = corpus.ingredient(alias.ingredient_id) else {
      continue;
    };
    if let Some(score) = matcher.fuzzy_match(&fold(&alias.variant_label), &needle)
    {
      consider(SlugMatch {
        slug:     ingredient.slug.clone(),
        label:    ingredient.label.clone(),
        language: alias.language.clone(),
        score,
        via:      Some(alias.variant_label.clone()),
      });
    }
  }

  best.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.slug.cmp(&b.slug)));
  best
}

#[cfg(test)]
mod tests {
  use materia_core::{
    ids::{AliasId, IngredientId},
    ingredient::{Alias, Ingredient, SourceKind},
  };

  use super::*;

  #[test]
  fn rank_similar_matches_through_aliases_once_per_slug() {
    let mut corpus = Corpus::default();
    for (slug, label) in [("smyrne", "σμύρνη"), ("kasia", "κασία")] {
      let ingredient_id = corpus.allocate_ingredient_id();
      corpus
        .insert_ingredient(Ingredient {
          ingredient_id,
          slug: slug.into(),
          label: label.into(),
          language: Some("grc".into()),
        })
        .unwrap();
    }
    corpus
      .insert_alias(Alias {
        alias_id:      AliasId(1),
        ingredient_id: IngredientId(1),
        variant_label: "myrrh".into(),
        language:      Some("en".into()),
        source:        SourceKind::Translation,
      })
      .unwrap();

    let matches = rank_similar("myrrh", &corpus);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].slug, "smyrne");
    assert_eq!(matches[0].via.as_deref(), Some("myrrh"));

    // A slug query hits the ingredient directly, not through the alias.
    let matches = rank_similar("smyrne", &corpus);
    assert_eq!(matches[0].slug, "smyrne");
    assert_eq!(matches[0].via, None);
  }

  #[test]
  fn greek_labels_transliterate() {
    assert_eq!(suggest_slug("σμύρνη", Some("grc")), "smyrne");
    assert_eq!(suggest_slug("λιβανωτός", Some("grc")), "libanotos");
  }

  #[test]
  fn egyptian_transcriptions_keep_hyphens() {
    assert_eq!(suggest_slug("ꜥntyw.w (šps)", Some("egy")), "ntyww-ps");
  }

  #[test]
  fn default_is_kebab_case() {
    assert_eq!(suggest_slug("Sweet Flag root", None), "sweet-flag-root");
    assert_eq!(suggest_slug("sweet--flag", Some("en")), "sweet-flag");
  }
}
