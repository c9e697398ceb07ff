//! Text Canonicalization
//!
//! Collapses orthographic variants of a word into one fuzzy lookup key:
//! diacritics, capitalization, homonym digits and punctuation are removed so
//! that spellings differing only in those respects collide.

use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::translit;

/// Canonical, diacritic-free form of a word used as an index key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LexicalKey(String);

impl LexicalKey {
    /// Key of any surface form, Greek script or Beta Code.
    ///
    /// The surface is first flattened to Beta Code and then canonicalized, so
    /// `λόγος`, `Λόγος` and `lo/gos1` all derive `logos`.
    pub fn derive(surface: &str) -> Self {
        canonicalize(&translit::to_flat(surface))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for LexicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LexicalKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonicalize a surface string.
///
/// Total and idempotent: lowercases, decomposes, keeps only alphabetic base
/// characters and folds the Greek sigma variants to `σ`.
pub fn canonicalize(surface: &str) -> LexicalKey {
    let key = surface
        .to_lowercase()
        .nfd()
        .filter(|c| c.is_alphabetic() && !is_combining_mark(*c))
        .map(fold_sigma)
        .collect();
    LexicalKey(key)
}

/// Lowercased Greek-script form with marks removed, used by the resolver for
/// morpheme and suffix matching.
pub fn bare(surface: &str) -> String {
    canonicalize(surface).into_string()
}

fn fold_sigma(c: char) -> char {
    match c {
        'ς' | 'ϲ' => 'σ',
        other => other,
    }
}

/// Whether the text contains at least one Greek-script letter.
pub fn is_greek(text: &str) -> bool {
    text.chars()
        .any(|c| ('\u{0370}'..='\u{03ff}').contains(&c) || ('\u{1f00}'..='\u{1fff}').contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_accents_and_case() {
        assert_eq!(canonicalize("Λόγος").as_str(), "λογοσ");
        assert_eq!(canonicalize("λογος"), canonicalize("ΛΌΓΟΣ"));
    }

    #[test]
    fn test_strips_homonym_digits_and_punctuation() {
        assert_eq!(canonicalize("lo/gos1").as_str(), "logos");
        assert_eq!(canonicalize("a)gapa/w").as_str(), "agapaw");
        assert_eq!(canonicalize("θεολόγος2,").as_str(), "θεολογοσ");
    }

    #[test]
    fn test_empty_is_defined() {
        assert!(canonicalize("").is_empty());
        assert!(canonicalize("123 ,.;").is_empty());
    }

    #[test]
    fn test_breathing_and_iota_subscript_removed() {
        assert_eq!(canonicalize("ᾠδή").as_str(), "ωδη");
        assert_eq!(canonicalize("ἁρμονία").as_str(), "αρμονια");
    }

    #[test]
    fn test_derive_bridges_scripts() {
        assert_eq!(LexicalKey::derive("λόγος"), LexicalKey::derive("lo/gos"));
        assert_eq!(LexicalKey::derive("ἀγαπάω").as_str(), "agapaw");
        assert_eq!(LexicalKey::derive("*)aga/qwn").as_str(), "agaqwn");
    }

    #[test]
    fn test_idempotent_on_samples() {
        for s in ["Ἄνθρωπος", "İstanbul", "ǅemal", "lo/gos1", ""] {
            let once = canonicalize(s);
            assert_eq!(canonicalize(once.as_str()), once, "not idempotent for {s}");
        }
    }

    #[test]
    fn test_is_greek() {
        assert!(is_greek("abc λ"));
        assert!(is_greek("ἀ"));
        assert!(!is_greek("logos"));
    }
}
