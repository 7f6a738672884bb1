//! One function per subcommand.
//!
//! Every command follows the same shape: load the documents it needs, run
//! one engine operation, and persist only on success; a failed validation
//! or merge never writes anything back.

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context as _, bail};
use materia_core::Corpus;
use materia_engine::{MergeOptions, assist, reconcile};
use materia_store as store;

use crate::Settings;

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn load_corpus(settings: &Settings) -> anyhow::Result<Corpus> {
  store::load_corpus(&settings.corpus_path).with_context(|| {
    format!("loading corpus {}", settings.corpus_path.display())
  })
}

fn read_diff(path: &Path) -> anyhow::Result<serde_json::Value> {
  let raw = fs::read_to_string(path)
    .with_context(|| format!("reading diff {}", path.display()))?;
  serde_json::from_str(&raw)
    .with_context(|| format!("parsing diff {}", path.display()))
}

fn source_label_for(path: &Path, explicit: Option<String>) -> String {
  explicit.unwrap_or_else(|| {
    path
      .file_stem()
      .map(|stem| stem.to_string_lossy().into_owned())
      .unwrap_or_else(|| path.to_string_lossy().into_owned())
  })
}

// ─── Merge / remove ──────────────────────────────────────────────────────────

pub fn merge(
  settings: &Settings,
  diff_path: &Path,
  source: Option<String>,
  added_by: Option<String>,
  allow_restated_recipes: bool,
) -> anyhow::Result<()> {
  let mut corpus = load_corpus(settings)?;
  let doc = read_diff(diff_path)?;
  let options = MergeOptions {
    source_label: source_label_for(diff_path, source),
    added_by: added_by.unwrap_or_else(|| settings.operator.clone()),
    allow_restated_recipes,
  };

  match materia_engine::merge(&mut corpus, &doc, &options) {
    Ok(report) => {
      store::save_corpus(&settings.corpus_path, &corpus).with_context(|| {
        format!("saving corpus {}", settings.corpus_path.display())
      })?;
      println!("merged {} as {:?}:", diff_path.display(), options.source_label);
      println!(
        "  added   {} recipes, {} ingredients, {} aliases, {} entries",
        report.recipes_added,
        report.ingredients_added,
        report.aliases_added,
        report.entries_added
      );
      if report.ingredients_reused > 0 {
        println!("  reused  {} ingredients", report.ingredients_reused);
      }
      if report.recipes_skipped + report.aliases_skipped > 0 {
        println!(
          "  skipped {} recipes, {} aliases",
          report.recipes_skipped, report.aliases_skipped
        );
      }
      println!(
        "corpus now holds {} recipes, {} ingredients, {} aliases, {} entries",
        corpus.recipe_count(),
        corpus.ingredient_count(),
        corpus.alias_count(),
        corpus.entry_count()
      );
      Ok(())
    }
    Err(materia_engine::Error::Validation(violations)) => {
      for violation in &violations {
        eprintln!("  {violation}");
      }
      bail!(
        "{}: {} validation violation(s), nothing merged",
        diff_path.display(),
        violations.len()
      );
    }
    Err(e) => Err(e).context("merge failed"),
  }
}

pub fn remove(
  settings: &Settings,
  source: &str,
  reason: Option<String>,
) -> anyhow::Result<()> {
  let mut corpus = load_corpus(settings)?;
  let report = materia_engine::remove(&mut corpus, source, reason)
    .with_context(|| format!("removing {source:?}"))?;
  store::save_corpus(&settings.corpus_path, &corpus).with_context(|| {
    format!("saving corpus {}", settings.corpus_path.display())
  })?;

  println!("removed {source:?}:");
  println!(
    "  {} entries, {} aliases, {} ingredients, {} recipes",
    report.entries_removed,
    report.aliases_removed,
    report.ingredients_removed,
    report.recipes_removed
  );
  if report.ingredients_retained > 0 {
    println!(
      "  retained {} ingredients still referenced elsewhere",
      report.ingredients_retained
    );
  }
  Ok(())
}

// ─── Validate ────────────────────────────────────────────────────────────────

pub fn validate(settings: &Settings, diffs: &[std::path::PathBuf]) -> anyhow::Result<()> {
  let corpus = load_corpus(settings)?;
  let mut failed = 0usize;

  for path in diffs {
    let doc = read_diff(path)?;
    let violations = materia_engine::validate_diff(&doc, &corpus);
    if violations.is_empty() {
      println!("{}: ok", path.display());
    } else {
      failed += 1;
      println!("{}: {} violation(s)", path.display(), violations.len());
      for violation in &violations {
        println!("  {violation}");
      }
    }
  }

  if failed > 0 {
    bail!("{failed} of {} diff(s) failed validation", diffs.len());
  }
  Ok(())
}

// ─── Export ──────────────────────────────────────────────────────────────────

pub fn export(
  settings: &Settings,
  output: Option<std::path::PathBuf>,
) -> anyhow::Result<()> {
  let corpus = load_corpus(settings)?;
  let rows = materia_engine::export(&corpus);
  let output = output.unwrap_or_else(|| settings.export_path.clone());
  store::write_document(&output, &rows)
    .with_context(|| format!("writing export {}", output.display()))?;
  println!("wrote {} rows to {}", rows.len(), output.display());
  Ok(())
}

// ─── Equivalences ────────────────────────────────────────────────────────────

fn load_equivalences(
  settings: &Settings,
) -> anyhow::Result<materia_core::equivalence::EquivalenceIndex> {
  store::load_equivalences(&settings.equivalences_path).with_context(|| {
    format!(
      "loading equivalence index {}",
      settings.equivalences_path.display()
    )
  })
}

pub fn equiv_check(settings: &Settings) -> anyhow::Result<()> {
  let corpus = load_corpus(settings)?;
  let index = load_equivalences(settings)?;

  let problems = reconcile::check(&corpus, &index);
  if problems.is_empty() {
    println!("{} group(s), all terms resolve", index.len());
    return Ok(());
  }
  for problem in &problems {
    println!("{}: {:?} is {}", problem.group, problem.term, problem.problem);
  }
  bail!("{} unresolved term(s)", problems.len());
}

pub fn equiv_suggest(settings: &Settings, diff_path: &Path) -> anyhow::Result<()> {
  let index = load_equivalences(settings)?;
  let doc = read_diff(diff_path)?;
  let diff: materia_core::diff::Diff = serde_json::from_value(doc)
    .with_context(|| format!("decoding diff {}", diff_path.display()))?;

  let sets = reconcile::diff_term_sets(&diff);
  if sets.is_empty() {
    println!("no ingredients or aliases to analyze");
    return Ok(());
  }

  for (slug, terms) in sets {
    println!("{slug}: {}", terms.join(", "));
    let suggestions = reconcile::suggest_groups(&terms, &index);
    if suggestions.is_empty() {
      println!("  no overlapping group; consider creating a new one");
      continue;
    }
    for suggestion in suggestions {
      println!(
        "  {} ({} overlapping term(s))",
        suggestion.group, suggestion.overlap
      );
    }
  }
  Ok(())
}

pub fn equiv_create(
  settings: &Settings,
  group: &str,
  terms: Vec<String>,
) -> anyhow::Result<()> {
  let mut index = load_equivalences(settings)?;
  index
    .create_group(group, terms)
    .with_context(|| format!("creating group {group:?}"))?;
  store::save_equivalences(&settings.equivalences_path, &index)?;
  println!(
    "created {group:?}; run `materia equiv check` once the corpus has the terms"
  );
  Ok(())
}

pub fn equiv_add(
  settings: &Settings,
  group: &str,
  terms: Vec<String>,
) -> anyhow::Result<()> {
  let mut index = load_equivalences(settings)?;
  let added = index
    .add_terms(group, terms)
    .with_context(|| format!("updating group {group:?}"))?;
  store::save_equivalences(&settings.equivalences_path, &index)?;
  println!("added {added} term(s) to {group:?}");
  Ok(())
}

pub fn equiv_find(settings: &Settings, term: &str) -> anyhow::Result<()> {
  let index = load_equivalences(settings)?;
  match reconcile::find_group_for(term, &index) {
    Some(group) => {
      println!("{term:?} is in {group:?}:");
      for t in index.group(group).unwrap_or_default() {
        println!("  {t}");
      }
    }
    None => println!("{term:?} is not in any equivalence group"),
  }
  Ok(())
}

// ─── Search / assist ─────────────────────────────────────────────────────────

pub fn search(settings: &Settings, query: &str, limit: usize) -> anyhow::Result<()> {
  let corpus = load_corpus(settings)?;
  let index = load_equivalences(settings)?;

  let matches = assist::rank_similar(query, &corpus);
  if matches.is_empty() {
    println!("no similar ingredients");
    return Ok(());
  }
  for m in matches.iter().take(limit) {
    let language = m.language.as_deref().unwrap_or("?");
    let group = reconcile::find_group_for(&m.slug, &index)
      .map(|g| format!("  [{g}]"))
      .unwrap_or_default();
    match &m.via {
      Some(via) => println!(
        "{:>5}  {} ({language})  {} via alias {via:?}{group}",
        m.score, m.slug, m.label
      ),
      None => {
        println!("{:>5}  {} ({language})  {}{group}", m.score, m.slug, m.label)
      }
    }
  }
  Ok(())
}

pub fn suggest_slug(
  settings: &Settings,
  label: &str,
  language: Option<&str>,
) -> anyhow::Result<()> {
  let corpus = load_corpus(settings)?;
  let slug = assist::suggest_slug(label, language);
  println!("{slug}");
  if corpus.ingredient_id_for(&slug).is_some() {
    tracing::warn!(%slug, "slug already exists in the corpus");
  }
  Ok(())
}

// ─── Stats ───────────────────────────────────────────────────────────────────

pub fn stats(settings: &Settings) -> anyhow::Result<()> {
  let corpus = load_corpus(settings)?;

  println!("recipes:     {}", corpus.recipe_count());
  println!("ingredients: {}", corpus.ingredient_count());
  println!("aliases:     {}", corpus.alias_count());
  println!("entries:     {}", corpus.entry_count());
  println!("merges:      {}", corpus.provenance_map().len());
  println!("removals:    {}", corpus.removals().len());

  let mut languages: BTreeMap<&str, usize> = BTreeMap::new();
  for ingredient in corpus.ingredients() {
    *languages
      .entry(ingredient.language.as_deref().unwrap_or("?"))
      .or_default() += 1;
  }
  if !languages.is_empty() {
    println!("ingredient languages:");
    for (language, count) in languages {
      println!("  {language}: {count}");
    }
  }

  let mut usage: BTreeMap<&str, usize> = BTreeMap::new();
  for entry in corpus.entries() {
    if let Some(ingredient) = corpus.ingredient(entry.ingredient_id) {
      *usage.entry(ingredient.slug.as_str()).or_default() += 1;
    }
  }
  let mut ranked: Vec<_> = usage.into_iter().collect();
  ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
  if !ranked.is_empty() {
    println!("most used ingredients:");
    for (slug, count) in ranked.into_iter().take(10) {
      println!("  {slug}: {count}");
    }
  }
  Ok(())
}
