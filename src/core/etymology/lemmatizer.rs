//! Lemmatizer Capability
//!
//! The resolver's last resort is an external lemmatizer, treated as a
//! synchronous black box. Failures and slow calls degrade to an unresolved
//! result instead of stalling the batch.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::core::lexicon::canon::bare;

#[derive(Error, Debug)]
pub enum LemmatizerError {
    #[error("Lemmatizer timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("No lemma known for '{0}'")]
    Unknown(String),

    #[error("Lemmatizer backend failed: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid lemma table: {0}")]
    Table(#[from] serde_json::Error),
}

pub type LemmatizerResult<T> = std::result::Result<T, LemmatizerError>;

pub trait Lemmatizer: Send + Sync {
    fn lemmatize(&self, surface: &str, language: &str) -> LemmatizerResult<String>;
}

impl<F> Lemmatizer for F
where
    F: Fn(&str, &str) -> LemmatizerResult<String> + Send + Sync,
{
    fn lemmatize(&self, surface: &str, language: &str) -> LemmatizerResult<String> {
        self(surface, language)
    }
}

/// Lookup-table lemmatizer for one language.
///
/// Forms are matched in bare form, so accents and case in the table or the
/// query do not matter.
#[derive(Debug, Clone, Default)]
pub struct TableLemmatizer {
    language: String,
    table: HashMap<String, String>,
}

impl TableLemmatizer {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            table: HashMap::new(),
        }
    }

    pub fn insert(&mut self, form: &str, lemma: &str) {
        let key = bare(form);
        if !key.is_empty() {
            self.table.insert(key, lemma.nfc().collect());
        }
    }

    pub fn from_pairs<'a>(language: &str, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut lemmatizer = Self::new(language);
        for (form, lemma) in pairs {
            lemmatizer.insert(form, lemma);
        }
        lemmatizer
    }

    pub fn from_json(language: &str, json: &str) -> LemmatizerResult<Self> {
        let raw: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(Self::from_pairs(
            language,
            raw.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        ))
    }

    pub fn load(language: &str, path: &Path) -> LemmatizerResult<Self> {
        let json = fs::read_to_string(path)?;
        let lemmatizer = Self::from_json(language, &json)?;
        log::info!("Loaded {} lemma mappings from {}", lemmatizer.len(), path.display());
        Ok(lemmatizer)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Lemmatizer for TableLemmatizer {
    fn lemmatize(&self, surface: &str, language: &str) -> LemmatizerResult<String> {
        if language != self.language {
            return Err(LemmatizerError::UnsupportedLanguage(language.to_string()));
        }
        self.table
            .get(&bare(surface))
            .cloned()
            .ok_or_else(|| LemmatizerError::Unknown(surface.to_string()))
    }
}

/// Runs each call on a worker thread and gives up after `timeout`.
///
/// A call that times out keeps running in the background; its result is
/// dropped.
pub struct TimeoutLemmatizer<L> {
    inner: Arc<L>,
    timeout: Duration,
}

impl<L: Lemmatizer + 'static> TimeoutLemmatizer<L> {
    pub fn new(inner: L, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(inner),
            timeout,
        }
    }
}

impl<L: Lemmatizer + 'static> Lemmatizer for TimeoutLemmatizer<L> {
    fn lemmatize(&self, surface: &str, language: &str) -> LemmatizerResult<String> {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let inner = Arc::clone(&self.inner);
        let surface = surface.to_string();
        let language = language.to_string();

        thread::Builder::new()
            .name("lemmatizer".to_string())
            .spawn(move || {
                let _ = tx.send(inner.lemmatize(&surface, &language));
            })
            .map_err(|e| LemmatizerError::Backend(format!("failed to spawn worker: {e}")))?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(LemmatizerError::Timeout(self.timeout)),
            Err(RecvTimeoutError::Disconnected) => {
                Err(LemmatizerError::Backend("worker exited without a result".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lookup_ignores_accents() {
        let lemmatizer = TableLemmatizer::from_pairs("grc", [("ωραία", "ωραίος")]);
        assert_eq!(lemmatizer.lemmatize("Ωραια", "grc").unwrap(), "ωραίος");
        assert!(matches!(
            lemmatizer.lemmatize("άγνωστο", "grc"),
            Err(LemmatizerError::Unknown(_))
        ));
        assert!(matches!(
            lemmatizer.lemmatize("ωραία", "el"),
            Err(LemmatizerError::UnsupportedLanguage(_))
        ));
    }

    #[test]
    fn test_table_from_json() {
        let lemmatizer = TableLemmatizer::from_json("grc", r#"{"λόγου": "λόγος"}"#).unwrap();
        assert_eq!(lemmatizer.len(), 1);
        assert!(TableLemmatizer::from_json("grc", "[1, 2]").is_err());
    }

    #[test]
    fn test_closure_lemmatizer() {
        let upper = |s: &str, _: &str| -> LemmatizerResult<String> { Ok(s.to_uppercase()) };
        assert_eq!(upper.lemmatize("abc", "grc").unwrap(), "ABC");
    }

    #[test]
    fn test_timeout_passes_fast_results() {
        let inner = TableLemmatizer::from_pairs("grc", [("α", "β")]);
        let wrapped = TimeoutLemmatizer::new(inner, Duration::from_secs(5));
        assert_eq!(wrapped.lemmatize("α", "grc").unwrap(), "β");
    }

    #[test]
    fn test_timeout_degrades_slow_backend() {
        let slow = |s: &str, _: &str| -> LemmatizerResult<String> {
            thread::sleep(Duration::from_millis(500));
            Ok(s.to_string())
        };
        let wrapped = TimeoutLemmatizer::new(slow, Duration::from_millis(20));
        assert!(matches!(
            wrapped.lemmatize("x", "grc"),
            Err(LemmatizerError::Timeout(_))
        ));
    }
}
