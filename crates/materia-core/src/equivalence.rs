//! The equivalence index: named groups of terms asserted to denote the
//! same real-world substance across languages and sources.
//!
//! The index is an independent document with its own lifecycle: equivalence
//! judgments are human-paced and may lead or lag the corpus merge they refer
//! to. Edits here are pure data operations; checking that every term still
//! resolves against the corpus is a separate, explicit reconciliation pass.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Group name → ordered list of terms (slugs, labels, alias variants).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EquivalenceIndex {
  groups: BTreeMap<String, Vec<String>>,
}

impl EquivalenceIndex {
  pub fn is_empty(&self) -> bool {
    self.groups.is_empty()
  }

  pub fn len(&self) -> usize {
    self.groups.len()
  }

  /// Iterate groups in name order.
  pub fn groups(&self) -> impl Iterator<Item = (&str, &[String])> {
    self.groups.iter().map(|(name, terms)| (name.as_str(), terms.as_slice()))
  }

  pub fn group(&self, name: &str) -> Option<&[String]> {
    self.groups.get(name).map(Vec::as_slice)
  }

  /// Create a new group. Terms are deduplicated preserving first occurrence.
  pub fn create_group(
    &mut self,
    name: &str,
    terms: impl IntoIterator<Item = String>,
  ) -> Result<()> {
    if self.groups.contains_key(name) {
      return Err(Error::GroupExists(name.to_string()));
    }
    let mut list = Vec::new();
    push_unique(&mut list, terms);
    self.groups.insert(name.to_string(), list);
    Ok(())
  }

  /// Append terms to an existing group, skipping ones already present.
  /// Returns how many terms were actually added.
  pub fn add_terms(
    &mut self,
    name: &str,
    terms: impl IntoIterator<Item = String>,
  ) -> Result<usize> {
    let list = self
      .groups
      .get_mut(name)
      .ok_or_else(|| Error::GroupNotFound(name.to_string()))?;
    let before = list.len();
    push_unique(list, terms);
    Ok(list.len() - before)
  }
}

fn push_unique(list: &mut Vec<String>, terms: impl IntoIterator<Item = String>) {
  for term in terms {
    if !list.contains(&term) {
      list.push(term);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn create_group_dedups_preserving_order() {
    let mut index = EquivalenceIndex::default();
    index
      .create_group(
        "Myrrh",
        ["smyrne", "myrrh", "smyrne"].map(String::from),
      )
      .unwrap();
    assert_eq!(index.group("Myrrh").unwrap(), ["smyrne", "myrrh"]);
  }

  #[test]
  fn create_existing_group_fails() {
    let mut index = EquivalenceIndex::default();
    index.create_group("Myrrh", ["smyrne".to_string()]).unwrap();
    assert!(matches!(
      index.create_group("Myrrh", ["myrrh".to_string()]),
      Err(Error::GroupExists(_))
    ));
  }

  #[test]
  fn add_terms_reports_how_many_were_new() {
    let mut index = EquivalenceIndex::default();
    index.create_group("Myrrh", ["smyrne".to_string()]).unwrap();
    let added = index
      .add_terms("Myrrh", ["smyrne", "σμύρνη", "myrrh"].map(String::from))
      .unwrap();
    assert_eq!(added, 2);
    assert!(matches!(
      index.add_terms("Cassia", ["cassia".to_string()]),
      Err(Error::GroupNotFound(_))
    ));
  }
}
