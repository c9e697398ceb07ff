//! Oracle Index
//!
//! Dictionary entries keyed by canonical lexical key. Homonyms that
//! canonicalize to the same key are merged into one entry.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::canon::LexicalKey;
use super::scoring::AuthorTier;

/// One scored quotation attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Greek excerpt in native script
    pub excerpt: String,
    /// Bibliographic reference as printed (`Il. 5.3`)
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    pub tier: AuthorTier,
    pub score: u32,
}

impl Citation {
    pub fn word_count(&self) -> usize {
        self.excerpt.split_whitespace().count()
    }

    /// Ranking order: score, then excerpt length (both descending), then
    /// text fields ascending. Total, so ranking never depends on the order
    /// citations were collected in.
    pub fn rank(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| other.word_count().cmp(&self.word_count()))
            .then_with(|| self.excerpt.cmp(&other.excerpt))
            .then_with(|| self.author.cmp(&other.author))
            .then_with(|| self.translation.cmp(&other.translation))
            .then_with(|| self.tier.cmp(&other.tier))
    }
}

/// A merged lexicon entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub key: LexicalKey,
    /// Native-script headwords of every homonym merged into this entry
    pub headwords: Vec<String>,
    pub definitions: Vec<String>,
    /// Kept in rank order
    pub citations: Vec<Citation>,
    /// Aorist forms when the entry names one
    #[serde(default)]
    pub aorists: Vec<String>,
    /// Sum of citation scores
    pub score: u64,
}

impl DictionaryEntry {
    pub fn new(key: LexicalKey, headword: impl Into<String>) -> Self {
        let headword = headword.into();
        Self {
            key,
            headwords: if headword.is_empty() {
                Vec::new()
            } else {
                vec![headword]
            },
            definitions: Vec::new(),
            citations: Vec::new(),
            aorists: Vec::new(),
            score: 0,
        }
    }

    pub fn add_definition(&mut self, definition: &str) {
        let definition = definition.trim();
        if !definition.is_empty() && !self.definitions.iter().any(|d| d == definition) {
            self.definitions.push(definition.to_string());
        }
    }

    pub fn add_aorist(&mut self, aorist: &str) {
        if !aorist.is_empty() && !self.aorists.iter().any(|a| a == aorist) {
            self.aorists.push(aorist.to_string());
        }
    }

    pub fn add_citations(&mut self, citations: impl IntoIterator<Item = Citation>) {
        for citation in citations {
            self.score += u64::from(citation.score);
            self.citations.push(citation);
        }
        self.citations.sort_by(Citation::rank);
    }

    /// Fold a homonym into this entry.
    ///
    /// Definitions, headwords and aorists are unioned in arrival order,
    /// citations are concatenated and re-ranked, scores add up.
    pub fn merge(&mut self, other: DictionaryEntry) {
        for headword in other.headwords {
            if !self.headwords.contains(&headword) {
                self.headwords.push(headword);
            }
        }
        for definition in &other.definitions {
            self.add_definition(definition);
        }
        for aorist in &other.aorists {
            self.add_aorist(aorist);
        }
        self.add_citations(other.citations);
    }

    pub fn primary_definition(&self) -> Option<&str> {
        self.definitions.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty() && self.citations.is_empty() && self.aorists.is_empty()
    }
}

/// Mapping from lexical key to merged entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OracleIndex {
    entries: BTreeMap<LexicalKey, DictionaryEntry>,
}

impl OracleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, merging with an existing homonym. Returns `true`
    /// when the key was already present.
    pub fn insert(&mut self, entry: DictionaryEntry) -> bool {
        match self.entries.get_mut(&entry.key) {
            Some(existing) => {
                existing.merge(entry);
                true
            }
            None => {
                self.entries.insert(entry.key.clone(), entry);
                false
            }
        }
    }

    pub fn get(&self, key: &LexicalKey) -> Option<&DictionaryEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &LexicalKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &LexicalKey> {
        self.entries.keys()
    }

    pub fn entries(&self) -> impl Iterator<Item = &DictionaryEntry> {
        self.entries.values()
    }

    pub fn citation_count(&self) -> usize {
        self.entries.values().map(|e| e.citations.len()).sum()
    }
}

impl FromIterator<DictionaryEntry> for OracleIndex {
    fn from_iter<I: IntoIterator<Item = DictionaryEntry>>(iter: I) -> Self {
        let mut index = Self::new();
        for entry in iter {
            index.insert(entry);
        }
        index
    }
}
