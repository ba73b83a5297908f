//! Department name resolution.
//!
//! Department names arrive as free text and are frequently misspelled.
//! [`DepartmentResolver`] maps them onto a canonical label through a single
//! alias table and decides whether two spellings refer to the same
//! department.
//!
//! Loose equality is tolerant of known typo families: two strings are
//! equivalent when their canonical forms agree, or when both contain a token
//! from the same family (e.g. `"electronic"` and `"eletronic"`). Families are
//! an explicit, finite token list supplied through [`DepartmentConfig`].

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Alias table and typo families, typically loaded from the `[departments]`
/// section of the server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DepartmentConfig {
  /// Raw spelling → canonical label. Keys are matched case-insensitively
  /// after trimming and collapsing internal whitespace.
  pub aliases:  BTreeMap<String, String>,
  /// Each inner list is one family of interchangeable substrings.
  pub families: Vec<Vec<String>>,
}

const DEFAULT_ALIASES: &[(&str, &str)] = &[
  ("eletronic enigneering", "Electronics Engineering"),
  ("eletronics engineering", "Electronics Engineering"),
  ("electronic engineering", "Electronics Engineering"),
  ("electronics engg", "Electronics Engineering"),
  ("electronics", "Electronics Engineering"),
  ("ece", "Electronics and Communication Engineering"),
  ("electronics and communication", "Electronics and Communication Engineering"),
  ("cse", "Computer Science and Engineering"),
  ("computer science", "Computer Science and Engineering"),
  ("comp sci", "Computer Science and Engineering"),
  ("computer enginering", "Computer Engineering"),
  ("computer engg", "Computer Engineering"),
  ("mech", "Mechanical Engineering"),
  ("mechnical engineering", "Mechanical Engineering"),
  ("mechanical engg", "Mechanical Engineering"),
  ("civil engg", "Civil Engineering"),
  ("civl engineering", "Civil Engineering"),
  ("eee", "Electrical Engineering"),
  ("electrical engg", "Electrical Engineering"),
  ("electircal engineering", "Electrical Engineering"),
  ("it", "Information Technology"),
  ("information tech", "Information Technology"),
  ("infomation technology", "Information Technology"),
];

const DEFAULT_FAMILIES: &[&[&str]] = &[
  &["electronic", "eletronic", "electonic", "elecronic"],
  &["computer", "comptuer", "compter"],
  &["mechanic", "mechnic", "mecanic"],
  &["civil", "civl"],
  &["electrical", "electircal", "elctrical"],
  &["information tech", "infomation tech", "informaton tech"],
];

impl Default for DepartmentConfig {
  fn default() -> Self {
    Self {
      aliases:  DEFAULT_ALIASES
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect(),
      families: DEFAULT_FAMILIES
        .iter()
        .map(|f| f.iter().map(|t| (*t).to_owned()).collect())
        .collect(),
    }
  }
}

// ─── Resolver ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DepartmentResolver {
  aliases:  HashMap<String, String>,
  families: Vec<Vec<String>>,
}

impl Default for DepartmentResolver {
  fn default() -> Self { Self::new(DepartmentConfig::default()) }
}

impl DepartmentResolver {
  pub fn new(config: DepartmentConfig) -> Self {
    let aliases = config
      .aliases
      .into_iter()
      .map(|(k, v)| (lookup_key(&k), v))
      .collect();
    let families = config
      .families
      .into_iter()
      .map(|family| {
        family
          .into_iter()
          .map(|t| t.trim().to_lowercase())
          .filter(|t| !t.is_empty())
          .collect::<Vec<_>>()
      })
      .filter(|family| !family.is_empty())
      .collect();
    Self { aliases, families }
  }

  /// Canonical label for `raw`: the alias target if one exists, otherwise
  /// the input in Title Case.
  pub fn normalize(&self, raw: &str) -> String {
    let key = lookup_key(raw);
    match self.aliases.get(&key) {
      Some(canonical) => canonical.clone(),
      None => title_case(&key),
    }
  }

  /// Whether `a` and `b` name the same department. Blank input never matches.
  pub fn loosely_equal(&self, a: &str, b: &str) -> bool {
    if a.trim().is_empty() || b.trim().is_empty() {
      return false;
    }
    if self.normalize(a).eq_ignore_ascii_case(&self.normalize(b)) {
      return true;
    }
    let families_b = self.families_of(b);
    self.families_of(a).iter().any(|f| families_b.contains(f))
  }

  /// Indices of every family with a token in either the raw or the
  /// canonical spelling.
  fn families_of(&self, raw: &str) -> Vec<usize> {
    let raw = raw.to_lowercase();
    let canonical = self.normalize(&raw).to_lowercase();
    self
      .families
      .iter()
      .enumerate()
      .filter(|(_, tokens)| {
        tokens
          .iter()
          .any(|t| raw.contains(t.as_str()) || canonical.contains(t.as_str()))
      })
      .map(|(idx, _)| idx)
      .collect()
  }
}

fn lookup_key(raw: &str) -> String {
  raw
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

fn title_case(s: &str) -> String {
  s.split_whitespace()
    .map(|word| {
      let mut chars = word.chars();
      match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
      }
    })
    .collect::<Vec<String>>()
    .join(" ")
}

#[cfg(test)]
mod tests {
  use super::*;

  fn resolver() -> DepartmentResolver { DepartmentResolver::default() }

  #[test]
  fn normalize_uses_alias_table() {
    let r = resolver();
    assert_eq!(r.normalize("eletronic enigneering"), "Electronics Engineering");
    assert_eq!(
      r.normalize("  Eletronic   ENIGNEERING "),
      "Electronics Engineering"
    );
    assert_eq!(r.normalize("CSE"), "Computer Science and Engineering");
  }

  #[test]
  fn normalize_title_cases_unknown_names() {
    let r = resolver();
    assert_eq!(r.normalize("  applied   physics "), "Applied Physics");
    assert_eq!(r.normalize("MATHEMATICS"), "Mathematics");
  }

  #[test]
  fn loosely_equal_on_canonical_form() {
    let r = resolver();
    assert!(r.loosely_equal("Mechanical Engineering", "mech"));
    assert!(r.loosely_equal("applied physics", "Applied Physics"));
    assert!(!r.loosely_equal("Applied Physics", "Mathematics"));
  }

  #[test]
  fn loosely_equal_tolerates_typo_family() {
    let r = resolver();
    assert!(r.loosely_equal("Electronics Engineering", "eletronic dept"));
    assert!(r.loosely_equal("Electronics", "Electronics Engineering"));
    assert!(r.loosely_equal("elecronic engg", "ELECTRONICS"));
    assert!(!r.loosely_equal("Electronics Engineering", "Electrical Engineering"));
  }

  #[test]
  fn loosely_equal_rejects_blank() {
    let r = resolver();
    assert!(!r.loosely_equal("", ""));
    assert!(!r.loosely_equal("  ", "Civil Engineering"));
  }

  #[test]
  fn families_overlap_without_a_common_canonical_form() {
    let r = resolver();
    assert!(r.loosely_equal(
      "Computer Engineering",
      "Electronics and Computer Engineering"
    ));
    assert!(r.loosely_equal(
      "Electronics and Computer Engineering",
      "Electronics Engineering"
    ));
    assert!(!r.loosely_equal("Computer Engineering", "Electronics Engineering"));
  }

  #[test]
  fn injected_table_replaces_defaults() {
    let r = DepartmentResolver::new(DepartmentConfig {
      aliases:  [("phy".to_owned(), "Physics".to_owned())].into(),
      families: vec![vec!["physic".into(), "phyisc".into()]],
    });
    assert_eq!(r.normalize("PHY"), "Physics");
    assert_eq!(r.normalize("eletronic enigneering"), "Eletronic Enigneering");
    assert!(r.loosely_equal("phyiscs lab", "Physics"));
    assert!(!r.loosely_equal("Electronics", "eletronic"));
  }

  #[test]
  fn config_deserializes_with_defaults() {
    let cfg: DepartmentConfig =
      serde_json::from_str(r#"{"aliases":{"bio":"Biology"}}"#).unwrap();
    assert_eq!(cfg.aliases.get("bio").map(String::as_str), Some("Biology"));
    assert!(!cfg.families.is_empty());
  }
}
