//! Schema and reference validation for diff documents.
//!
//! Validation runs on the raw JSON value, before any typed deserialization,
//! so that every problem can be reported with the offending path and the
//! expected constraint. The validator never repairs anything; a diff with
//! violations is rejected whole.

use std::collections::HashSet;
use std::fmt;

use materia_core::Corpus;
use serde_json::Value;

/// One schema or reference problem, with enough detail for the author to
/// correct the diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
  pub path:     String,
  pub expected: String,
  pub found:    String,
}

impl Violation {
  fn new(
    path: impl Into<String>,
    expected: impl Into<String>,
    found: impl Into<String>,
  ) -> Self {
    Self {
      path:     path.into(),
      expected: expected.into(),
      found:    found.into(),
    }
  }
}

impl fmt::Display for Violation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: expected {}, found {}", self.path, self.expected, self.found)
  }
}

// ─── Field schema ────────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum FieldKind {
  /// Non-null string.
  Str,
  /// String or null.
  OptStr,
  /// Integer or null.
  OptInt,
  /// Number or null.
  OptNum,
  /// One of the four alias source kinds.
  SourceKind,
}

impl FieldKind {
  fn expected(self) -> &'static str {
    match self {
      Self::Str => "a string",
      Self::OptStr => "a string or null",
      Self::OptInt => "an integer or null",
      Self::OptNum => "a number or null",
      Self::SourceKind => {
        "one of \"translation\", \"transliteration\", \"identification\", \
         \"variant\""
      }
    }
  }

  fn accepts(self, value: &Value) -> bool {
    match self {
      Self::Str => value.is_string(),
      Self::OptStr => value.is_string() || value.is_null(),
      Self::OptInt => value.is_i64() || value.is_u64() || value.is_null(),
      Self::OptNum => value.is_number() || value.is_null(),
      Self::SourceKind => matches!(
        value.as_str(),
        Some("translation" | "transliteration" | "identification" | "variant")
      ),
    }
  }
}

struct FieldSpec {
  name:     &'static str,
  kind:     FieldKind,
  required: bool,
}

impl FieldSpec {
  const fn required(name: &'static str, kind: FieldKind) -> Self {
    Self { name, kind, required: true }
  }

  const fn optional(name: &'static str, kind: FieldKind) -> Self {
    Self { name, kind, required: false }
  }
}

const RECIPE_FIELDS: &[FieldSpec] = &[
  FieldSpec::required("slug", FieldKind::Str),
  FieldSpec::required("label", FieldKind::Str),
  FieldSpec::optional("source", FieldKind::OptStr),
  FieldSpec::optional("language", FieldKind::OptStr),
  FieldSpec::optional("date", FieldKind::OptInt),
];

const INGREDIENT_FIELDS: &[FieldSpec] = &[
  FieldSpec::required("slug", FieldKind::Str),
  FieldSpec::required("label", FieldKind::Str),
  FieldSpec::optional("language", FieldKind::OptStr),
];

const ALIAS_FIELDS: &[FieldSpec] = &[
  FieldSpec::required("ingredient_slug", FieldKind::Str),
  FieldSpec::required("variant_label", FieldKind::Str),
  FieldSpec::optional("language", FieldKind::OptStr),
  FieldSpec::required("source", FieldKind::SourceKind),
];

const ENTRY_FIELDS: &[FieldSpec] = &[
  FieldSpec::required("recipe_slug", FieldKind::Str),
  FieldSpec::required("ingredient_slug", FieldKind::Str),
  FieldSpec::optional("amount_raw", FieldKind::OptStr),
  FieldSpec::optional("amount_value", FieldKind::OptNum),
  FieldSpec::optional("amount_unit", FieldKind::OptStr),
  FieldSpec::optional("preparation", FieldKind::OptStr),
  FieldSpec::optional("notes", FieldKind::OptStr),
  FieldSpec::optional("source_citation", FieldKind::OptStr),
  FieldSpec::optional("source_span", FieldKind::OptStr),
];

const SECTIONS: &[(&str, &[FieldSpec])] = &[
  ("recipes", RECIPE_FIELDS),
  ("ingredients", INGREDIENT_FIELDS),
  ("aliases", ALIAS_FIELDS),
  ("entries", ENTRY_FIELDS),
];

// ─── Entry point ─────────────────────────────────────────────────────────────

/// Validate `doc` as a diff against the schema and against `corpus`.
///
/// Returns all violations in document order: shape and type problems first,
/// then intra-diff duplicate slugs, then unresolvable references. An alias
/// or entry reference is resolvable if the slug is declared earlier in the
/// diff itself or already present in the corpus.
pub fn validate_diff(doc: &Value, corpus: &Corpus) -> Vec<Violation> {
  let mut out = Vec::new();

  let Some(root) = doc.as_object() else {
    out.push(Violation::new("$", "an object", type_name(doc)));
    return out;
  };

  for key in root.keys() {
    if !SECTIONS.iter().any(|(name, _)| name == key) {
      out.push(Violation::new(
        key.clone(),
        "one of \"recipes\", \"ingredients\", \"aliases\", \"entries\"",
        "unrecognized key",
      ));
    }
  }

  for (section, fields) in SECTIONS {
    if let Some(value) = root.get(*section) {
      check_section(section, value, fields, &mut out);
    }
  }

  check_duplicate_slugs(root, &mut out);
  check_references(root, corpus, &mut out);

  out
}

// ─── Shape checks ────────────────────────────────────────────────────────────

fn check_section(
  section: &str,
  value: &Value,
  fields: &[FieldSpec],
  out: &mut Vec<Violation>,
) {
  let Some(items) = value.as_array() else {
    out.push(Violation::new(section, "an array", type_name(value)));
    return;
  };

  for (index, item) in items.iter().enumerate() {
    let path = format!("{section}[{index}]");
    let Some(object) = item.as_object() else {
      out.push(Violation::new(path, "an object", type_name(item)));
      continue;
    };

    for spec in fields {
      match object.get(spec.name) {
        None if spec.required => {
          out.push(Violation::new(
            format!("{path}.{}", spec.name),
            spec.kind.expected(),
            "nothing",
          ));
        }
        None => {}
        Some(value) if !spec.kind.accepts(value) => {
          out.push(Violation::new(
            format!("{path}.{}", spec.name),
            spec.kind.expected(),
            found_text(value),
          ));
        }
        Some(_) => {}
      }
    }

    for key in object.keys() {
      if !fields.iter().any(|spec| spec.name == key) {
        out.push(Violation::new(
          format!("{path}.{key}"),
          "a recognized field",
          "unrecognized key",
        ));
      }
    }
  }
}

// ─── Duplicate and reference checks ──────────────────────────────────────────

/// String slugs declared in `section` with their item indexes, skipping
/// malformed items (those already produced shape violations).
fn declared_slugs<'a>(
  root: &'a serde_json::Map<String, Value>,
  section: &str,
) -> Vec<(usize, &'a str)> {
  root
    .get(section)
    .and_then(Value::as_array)
    .map(|items| {
      items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
          item.get("slug").and_then(Value::as_str).map(|slug| (index, slug))
        })
        .collect()
    })
    .unwrap_or_default()
}

fn check_duplicate_slugs(
  root: &serde_json::Map<String, Value>,
  out: &mut Vec<Violation>,
) {
  for section in ["recipes", "ingredients"] {
    let mut seen = HashSet::new();
    for (index, slug) in declared_slugs(root, section) {
      if !seen.insert(slug) {
        out.push(Violation::new(
          format!("{section}[{index}].slug"),
          "a slug unique within this diff",
          format!("{slug:?}"),
        ));
      }
    }
  }
}

fn check_references(
  root: &serde_json::Map<String, Value>,
  corpus: &Corpus,
  out: &mut Vec<Violation>,
) {
  let recipe_slugs: HashSet<&str> = declared_slugs(root, "recipes")
    .into_iter()
    .map(|(_, slug)| slug)
    .collect();
  let ingredient_slugs: HashSet<&str> = declared_slugs(root, "ingredients")
    .into_iter()
    .map(|(_, slug)| slug)
    .collect();

  let ingredient_resolves = |slug: &str| {
    ingredient_slugs.contains(slug)
      || corpus.ingredient_id_for(slug).is_some()
  };
  let recipe_resolves = |slug: &str| {
    recipe_slugs.contains(slug) || corpus.recipe_id_for(slug).is_some()
  };

  if let Some(aliases) = root.get("aliases").and_then(Value::as_array) {
    for (index, alias) in aliases.iter().enumerate() {
      if let Some(slug) = alias.get("ingredient_slug").and_then(Value::as_str)
        && !ingredient_resolves(slug)
      {
        out.push(Violation::new(
          format!("aliases[{index}].ingredient_slug"),
          "an ingredient declared in this diff or already merged",
          format!("{slug:?}"),
        ));
      }
    }
  }

  if let Some(entries) = root.get("entries").and_then(Value::as_array) {
    for (index, entry) in entries.iter().enumerate() {
      if let Some(slug) = entry.get("recipe_slug").and_then(Value::as_str)
        && !recipe_resolves(slug)
      {
        out.push(Violation::new(
          format!("entries[{index}].recipe_slug"),
          "a recipe declared in this diff or already merged",
          format!("{slug:?}"),
        ));
      }
      if let Some(slug) = entry.get("ingredient_slug").and_then(Value::as_str)
        && !ingredient_resolves(slug)
      {
        out.push(Violation::new(
          format!("entries[{index}].ingredient_slug"),
          "an ingredient declared in this diff or already merged",
          format!("{slug:?}"),
        ));
      }
    }
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn type_name(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

fn found_text(value: &Value) -> String {
  match value {
    Value::String(s) => format!("{s:?}"),
    other => type_name(other).to_string(),
  }
}
