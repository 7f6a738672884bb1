//! The Materia operations layer: diff validation, merge, removal,
//! equivalence reconciliation, flat export, and ingestion assists.
//!
//! Every operation here works against an in-memory
//! [`materia_core::Corpus`]; persistence is the caller's concern
//! (`materia-store`). Merge and removal are all-or-nothing: they plan the
//! whole mutation against the current corpus first and apply it only once
//! every reference has resolved.

pub mod assist;
pub mod error;
pub mod export;
pub mod merge;
pub mod reconcile;
pub mod remove;
pub mod validate;

#[cfg(test)]
mod tests;

pub use error::{Error, Result};
pub use export::{FlatRow, export};
pub use merge::{MergeOptions, MergeReport, merge};
pub use reconcile::{EquivalenceProblem, GroupSuggestion};
pub use remove::{RemoveReport, remove};
pub use validate::{Violation, validate_diff};
