//! Citation Gallery
//!
//! Renders the best citations of an entry for display, expanding author
//! abbreviations through an optional lookup table.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::error::LexiconResult;
use super::index::DictionaryEntry;

/// Abbreviation table entries are either a plain expansion or a record.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AbbreviationValue {
    Plain(String),
    Record {
        author: Option<String>,
        work: Option<String>,
        expanded: Option<String>,
    },
}

impl AbbreviationValue {
    fn expansion(self) -> Option<String> {
        match self {
            AbbreviationValue::Plain(s) => Some(s),
            AbbreviationValue::Record {
                author,
                work,
                expanded,
            } => author.or(work).or(expanded),
        }
        .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Abbreviations {
    map: HashMap<String, String>,
}

impl Abbreviations {
    pub fn from_json(json: &str) -> LexiconResult<Self> {
        let raw: HashMap<String, AbbreviationValue> = serde_json::from_str(json)?;
        let map = raw
            .into_iter()
            .filter_map(|(k, v)| v.expansion().map(|e| (k, e)))
            .collect();
        Ok(Self { map })
    }

    /// Load the table, or an empty one when the file does not exist.
    pub fn load(path: &Path) -> LexiconResult<Self> {
        if !path.exists() {
            log::debug!("No abbreviation table at {}", path.display());
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)?;
        let table = Self::from_json(&json)?;
        log::info!("Loaded {} abbreviations from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Expand each token of a reference; unknown tokens stay as they are.
    pub fn expand(&self, reference: &str) -> String {
        reference
            .split_whitespace()
            .map(|token| {
                let dotted = format!("{}.", token.trim_matches(|c| matches!(c, '.' | ',' | ';')));
                self.map
                    .get(&dotted)
                    .or_else(|| self.map.get(token))
                    .map(String::as_str)
                    .unwrap_or(token)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Render up to `limit` citations as `excerpt 'translation' (reference)`
/// joined by ` | `. When more candidates exist than fit, a second citation
/// from an already shown author is passed over.
pub fn render(entry: &DictionaryEntry, abbreviations: &Abbreviations, limit: usize) -> String {
    let crowded = entry.citations.len() > limit;
    let mut seen = HashSet::new();
    let mut shown = Vec::new();

    for citation in &entry.citations {
        if shown.len() >= limit {
            break;
        }
        let reference = abbreviations.expand(&citation.author);
        let main_author = reference
            .split_whitespace()
            .next()
            .unwrap_or("Unknown")
            .to_string();
        if crowded && seen.contains(&main_author) {
            continue;
        }

        let mut line = citation.excerpt.clone();
        if let Some(translation) = &citation.translation {
            line.push_str(&format!(" '{translation}'"));
        }
        line.push_str(&format!(" ({reference})"));
        shown.push(line);
        seen.insert(main_author);
    }

    shown.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lexicon::canon::LexicalKey;
    use crate::core::lexicon::index::Citation;
    use crate::core::lexicon::scoring::AuthorTier;

    fn cit(excerpt: &str, author: &str, translation: Option<&str>, score: u32) -> Citation {
        Citation {
            excerpt: excerpt.to_string(),
            author: author.to_string(),
            translation: translation.map(str::to_string),
            tier: AuthorTier::Standard,
            score,
        }
    }

    #[test]
    fn test_abbreviation_values() {
        let table = Abbreviations::from_json(
            r#"{"Il.": "Homer Iliad", "Pl.": {"author": "Plato"}, "R.": {"work": "Republic"}, "X.": {}}"#,
        )
        .unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.expand("Il. 5.3"), "Homer Iliad 5.3");
        assert_eq!(table.expand("Pl. R, 332a"), "Plato Republic 332a");
    }

    #[test]
    fn test_missing_table_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table = Abbreviations::load(&dir.path().join("none.json")).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_render_format_and_limit() {
        let mut entry = DictionaryEntry::new(LexicalKey::derive("logos"), "λόγος");
        entry.add_citations(vec![
            cit("α", "Il. 1", Some("one"), 110),
            cit("β", "Il. 2", None, 60),
            cit("γ", "Pl. 3", None, 30),
            cit("δ", "Hdt. 4", None, 10),
        ]);
        let table = Abbreviations::default();
        assert_eq!(render(&entry, &table, 3), "α 'one' (Il. 1) | γ (Pl. 3) | δ (Hdt. 4)");
        assert_eq!(render(&entry, &table, 4), "α 'one' (Il. 1) | β (Il. 2) | γ (Pl. 3) | δ (Hdt. 4)");
    }

    #[test]
    fn test_render_empty() {
        let entry = DictionaryEntry::new(LexicalKey::derive("a"), "α");
        assert_eq!(render(&entry, &Abbreviations::default(), 3), "");
    }
}
