//! Whole-document persistence for the Materia corpus and equivalence index.
//!
//! The corpus lives in a single JSON document; the equivalence index in a
//! second, independent one. Loading re-validates every referential
//! invariant, so a hand-edited or truncated file surfaces as a
//! [`Error::CorruptStore`] instead of a quietly wrong dataset. Writes go
//! through a temp file and an atomic rename, so a crashed persist leaves
//! the previous document intact.

pub mod document;
pub mod error;
mod store;


pub use document::CorpusDocument;
pub use error::{Error, Result};
pub use store::{
  load_corpus, load_equivalences, save_corpus, save_equivalences,
  write_document,
};
