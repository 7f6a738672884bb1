//! `materia`: operator CLI for the Materia recipe corpus.
//!
//! # Usage
//!
//! ```
//! materia merge diffs/dioscorides-130.json
//! materia validate diffs/*.json
//! materia remove dioscorides-130 --reason "bad OCR"
//! materia export -o docs/flat.json
//! materia equiv check
//! materia search myrrh
//! ```
//!
//! Paths and the default operator name come from `materia.toml` (or the
//! file given with `--config`) and `MATERIA_*` environment variables.

mod commands;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "materia", about = "Curate the Materia recipe corpus")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "materia.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Validate and merge a diff into the corpus.
  Merge {
    /// Diff file to merge.
    diff: PathBuf,
    /// Provenance key for this merge; defaults to the diff file's stem.
    #[arg(long)]
    source: Option<String>,
    /// Operator stamped onto new entries; defaults to the configured one.
    #[arg(long)]
    added_by: Option<String>,
    /// Skip recipes that restate an already-merged recipe exactly.
    #[arg(long)]
    allow_restated_recipes: bool,
  },

  /// Remove a previously merged diff by its provenance key.
  Remove {
    /// Provenance key (see `materia merge --source`).
    source: String,
    /// Reason recorded in the audit trail.
    #[arg(long)]
    reason: Option<String>,
  },

  /// Validate diff files without touching the corpus.
  Validate {
    /// One or more diff files.
    #[arg(required = true)]
    diffs: Vec<PathBuf>,
  },

  /// Write the flat, label-resolved export.
  Export {
    /// Output path; defaults to the configured one.
    #[arg(short, long)]
    output: Option<PathBuf>,
  },

  /// Inspect and edit the equivalence index.
  Equiv {
    #[command(subcommand)]
    command: EquivCommand,
  },

  /// Fuzzy-search ingredients by label, slug, or alias.
  Search {
    query: String,
    /// Show at most this many matches.
    #[arg(long, default_value_t = 5)]
    limit: usize,
  },

  /// Suggest a slug for a new ingredient label.
  SuggestSlug {
    label: String,
    /// Language code driving the transliteration rules (e.g. grc, egy).
    #[arg(long)]
    language: Option<String>,
  },

  /// Print corpus statistics.
  Stats,
}

#[derive(Subcommand)]
enum EquivCommand {
  /// Report equivalence terms that resolve nowhere in the corpus.
  Check,
  /// Suggest groups for the terms a diff introduces.
  Suggest { diff: PathBuf },
  /// Create a new group.
  Create {
    group: String,
    #[arg(required = true)]
    terms: Vec<String>,
  },
  /// Add terms to an existing group.
  Add {
    group: String,
    #[arg(required = true)]
    terms: Vec<String>,
  },
  /// Show which group contains a term.
  Find { term: String },
}

// ─── Settings ─────────────────────────────────────────────────────────────────

/// Shape of `materia.toml`, overridable via `MATERIA_*` env vars.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct Settings {
  /// The canonical corpus document.
  corpus_path:       PathBuf,
  /// The equivalence index document.
  equivalences_path: PathBuf,
  /// Default output of `materia export`.
  export_path:       PathBuf,
  /// Default operator stamped onto merges.
  operator:          String,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      corpus_path:       PathBuf::from("data/corpus.json"),
      equivalences_path: PathBuf::from("data/equivalences.json"),
      export_path:       PathBuf::from("docs/flat.json"),
      operator:          "manual".to_string(),
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("MATERIA"))
    .build()
    .context("failed to read configuration")?;
  let settings: Settings = settings
    .try_deserialize()
    .context("failed to deserialise settings")?;

  match cli.command {
    Command::Merge {
      diff,
      source,
      added_by,
      allow_restated_recipes,
    } => commands::merge(
      &settings,
      &diff,
      source,
      added_by,
      allow_restated_recipes,
    ),
    Command::Remove { source, reason } => {
      commands::remove(&settings, &source, reason)
    }
    Command::Validate { diffs } => commands::validate(&settings, &diffs),
    Command::Export { output } => commands::export(&settings, output),
    Command::Equiv { command } => match command {
      EquivCommand::Check => commands::equiv_check(&settings),
      EquivCommand::Suggest { diff } => commands::equiv_suggest(&settings, &diff),
      EquivCommand::Create { group, terms } => {
        commands::equiv_create(&settings, &group, terms)
      }
      EquivCommand::Add { group, terms } => {
        commands::equiv_add(&settings, &group, terms)
      }
      EquivCommand::Find { term } => commands::equiv_find(&settings, &term),
    },
    Command::Search { query, limit } => {
      commands::search(&settings, &query, limit)
    }
    Command::SuggestSlug { label, language } => {
      commands::suggest_slug(&settings, &label, language.as_deref())
    }
    Command::Stats => commands::stats(&settings),
  }
}
