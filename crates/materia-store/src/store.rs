//! Load and persist entry points.

use std::{fs, io::Write as _, path::Path};

use materia_core::{Corpus, equivalence::EquivalenceIndex};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::{CorpusDocument, Error, Result};

// ─── Corpus ──────────────────────────────────────────────────────────────────

/// Load the corpus document at `path`, re-validating every invariant.
///
/// A missing file is an empty corpus; the dataset starts from nothing and
/// grows by merges. Any integrity failure in an existing file is
/// [`Error::CorruptStore`].
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Corpus> {
  let raw = match fs::read_to_string(path) {
    Ok(raw) => raw,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
      return Ok(Corpus::default());
    }
    Err(e) => return Err(e.into()),
  };
  let document: CorpusDocument = serde_json::from_str(&raw)?;
  document.into_corpus().map_err(Error::CorruptStore)
}

/// Persist the corpus to `path` atomically.
pub fn save_corpus(path: impl AsRef<Path>, corpus: &Corpus) -> Result<()> {
  write_document(path, &CorpusDocument::from_corpus(corpus))
}

// ─── Equivalence index ───────────────────────────────────────────────────────

/// Load the equivalence index at `path`; a missing file is an empty index.
pub fn load_equivalences(path: impl AsRef<Path>) -> Result<EquivalenceIndex> {
  let raw = match fs::read_to_string(path) {
    Ok(raw) => raw,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
      return Ok(EquivalenceIndex::default());
    }
    Err(e) => return Err(e.into()),
  };
  Ok(serde_json::from_str(&raw)?)
}

/// Persist the equivalence index to `path` atomically.
pub fn save_equivalences(
  path: impl AsRef<Path>,
  index: &EquivalenceIndex,
) -> Result<()> {
  write_document(path, index)
}

// ─── Shared writer ───────────────────────────────────────────────────────────

/// Serialize `value` as pretty-printed JSON and move it into place with a
/// temp file + rename, so a crash mid-write never truncates the previous
/// document.
pub fn write_document<T: Serialize>(
  path: impl AsRef<Path>,
  value: &T,
) -> Result<()> {
  let path = path.as_ref();
  let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
  if let Some(dir) = dir {
    fs::create_dir_all(dir)?;
  }
  let mut tmp = match dir {
    Some(dir) => NamedTempFile::new_in(dir)?,
    None => NamedTempFile::new_in(".")?,
  };
  serde_json::to_writer_pretty(&mut tmp, value)?;
  tmp.write_all(b"\n")?;
  tmp.persist(path).map_err(|e| Error::Io(e.error))?;
  Ok(())
}
