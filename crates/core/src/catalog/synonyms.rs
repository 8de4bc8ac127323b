//! Keyword table used to broaden free-text queries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Maps a domain term to the brand/product tokens it should also match.
///
/// Keys and tokens are stored lower-cased.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SynonymTable {
    entries: BTreeMap<String, Vec<String>>,
}

/// On-disk layout: a single `[synonyms]` table.
#[derive(Debug, Deserialize)]
struct SynonymFile {
    #[serde(default)]
    synonyms: BTreeMap<String, Vec<String>>,
}

const FRENCH_RETAIL: &[(&str, &[&str])] = &[
    ("montre", &["apple watch", "watch"]),
    ("telephone", &["iphone", "phone", "smartphone"]),
    ("tel", &["iphone", "phone", "smartphone"]),
    ("portable", &["iphone", "phone", "smartphone"]),
    ("ordinateur", &["macbook", "laptop", "computer"]),
    ("pc", &["computer", "desktop"]),
    ("carte graphique", &["rtx", "nvidia", "gpu"]),
    ("gpu", &["rtx", "nvidia", "graphics"]),
    ("processeur", &["amd", "ryzen", "cpu"]),
    ("cpu", &["amd", "ryzen", "processor"]),
    ("ecran", &["samsung", "odyssey", "monitor"]),
    ("console", &["playstation", "ps5", "sony"]),
    ("souris", &["logitech", "mouse"]),
    ("apple", &["apple", "iphone", "macbook", "apple watch"]),
    ("samsung", &["samsung", "odyssey"]),
    ("sony", &["sony", "playstation", "ps5"]),
    ("nvidia", &["nvidia", "rtx"]),
    ("amd", &["amd", "ryzen"]),
    ("logitech", &["logitech", "mouse"]),
    ("gaming", &["playstation", "ps5", "rtx"]),
    ("jeux", &["playstation", "ps5", "gaming"]),
];

impl SynonymTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default French retail keyword map.
    pub fn french_retail() -> Self {
        let mut table = Self::new();
        for (term, related) in FRENCH_RETAIL {
            table.insert(*term, related.iter().copied());
        }
        table
    }

    /// Parse a `[synonyms]` TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        let file: SynonymFile = toml::from_str(raw)?;
        let mut table = Self::new();
        for (term, related) in file.synonyms {
            table.insert(term, related);
        }
        Ok(table)
    }

    /// Replaces any existing entry for `term`.
    pub fn insert<I, S>(&mut self, term: impl Into<String>, related: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let term = term.into().trim().to_lowercase();
        if term.is_empty() {
            return;
        }
        let related =
            related.into_iter().map(|token| token.into().trim().to_lowercase()).collect();
        self.entries.insert(term, related);
    }

    /// Entries from `other` win over existing ones.
    pub fn extend(&mut self, other: SynonymTable) {
        self.entries.extend(other.entries);
    }

    pub fn get(&self, term: &str) -> Option<&[String]> {
        self.entries.get(term).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(term, related)| (term.as_str(), related.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
