//! Oracle Query Service
//!
//! Read-only exact-key access to the index. Anything that answers
//! [`Oracle::lookup`] can back the resolver, which keeps tests free of a
//! real corpus.

use std::sync::Arc;

use super::canon::LexicalKey;
use super::index::{DictionaryEntry, OracleIndex};

pub trait Oracle: Send + Sync {
    /// Exact-key lookup; a miss is `None`, never an error.
    fn lookup(&self, key: &LexicalKey) -> Option<&DictionaryEntry>;

    /// Derive the key of a surface form (either script) and look it up.
    fn lookup_surface(&self, surface: &str) -> Option<&DictionaryEntry> {
        let key = LexicalKey::derive(surface);
        if key.is_empty() {
            return None;
        }
        self.lookup(&key)
    }
}

impl Oracle for OracleIndex {
    fn lookup(&self, key: &LexicalKey) -> Option<&DictionaryEntry> {
        self.get(key)
    }
}

impl<T: Oracle + ?Sized> Oracle for &T {
    fn lookup(&self, key: &LexicalKey) -> Option<&DictionaryEntry> {
        (**self).lookup(key)
    }
}

impl<T: Oracle + ?Sized> Oracle for Arc<T> {
    fn lookup(&self, key: &LexicalKey) -> Option<&DictionaryEntry> {
        (**self).lookup(key)
    }
}

/// Nearest keys to a surface form by normalized Levenshtein similarity.
///
/// Diagnostics only: resolution never accepts a fuzzy match.
pub fn suggest(index: &OracleIndex, surface: &str, limit: usize) -> Vec<(LexicalKey, f64)> {
    let query = LexicalKey::derive(surface);
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(LexicalKey, f64)> = index
        .keys()
        .map(|key| (key.clone(), strsim::normalized_levenshtein(query.as_str(), key.as_str())))
        .filter(|(_, score)| *score > 0.0)
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> OracleIndex {
        ["lo/gos", "qeo/s", "a)gapa/w"]
            .into_iter()
            .map(|k| {
                let mut e = DictionaryEntry::new(LexicalKey::derive(k), k);
                e.add_definition("x");
                e
            })
            .collect()
    }

    #[test]
    fn test_lookup_exact_only() {
        let index = index();
        assert!(index.lookup(&LexicalKey::derive("logos")).is_some());
        assert!(index.lookup(&LexicalKey::derive("logo")).is_none());
    }

    #[test]
    fn test_lookup_surface_either_script() {
        let index = index();
        assert!(index.lookup_surface("Λόγος").is_some());
        assert!(index.lookup_surface("ἀγαπάω").is_some());
        assert!(index.lookup_surface("--").is_none());
    }

    #[test]
    fn test_shared_across_threads() {
        let shared = Arc::new(index());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let oracle = Arc::clone(&shared);
                std::thread::spawn(move || oracle.lookup_surface("θεός").is_some())
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
    }

    #[test]
    fn test_suggest_ranks_by_similarity() {
        let suggestions = suggest(&index(), "λογοι", 2);
        assert_eq!(suggestions[0].0.as_str(), "logos");
        assert!(suggestions.len() <= 2);
        assert!(suggest(&index(), "", 3).is_empty());
    }
}
