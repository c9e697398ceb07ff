//! Property-based tests for lookup key derivation
//!
//! Tests invariants:
//! - Canonicalization is idempotent
//! - Keys ignore case
//! - Keys ignore accents and breathings
//! - Greek script and its Beta Code derive the same key

use proptest::prelude::*;

use crate::core::lexicon::{canonicalize, to_flat, LexicalKey};

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

/// Unaccented lowercase Greek words
fn arb_greek_word() -> impl Strategy<Value = String> {
    "[αβγδεζηθικλμνξοπρστυφχψω]{1,14}"
}

/// Mixed Greek, Beta Code and punctuation, as found in dictionary keys
fn arb_surface() -> impl Strategy<Value = String> {
    "[αβγδεζηθικλμνξοπρστυφχψωςάέήίόύώἀἁὁῆΑΒΓΔΛΟΣΩa-zA-Z0-9/\\\\()=|+*' -]{0,24}"
}

/// One of the combining marks a polytonic word may carry
fn arb_mark() -> impl Strategy<Value = char> {
    prop_oneof![
        Just('\u{0301}'), // acute
        Just('\u{0300}'), // grave
        Just('\u{0342}'), // circumflex
        Just('\u{0313}'), // smooth breathing
        Just('\u{0314}'), // rough breathing
        Just('\u{0345}'), // iota subscript
    ]
}

/// A word with marks sprinkled after some of its letters
fn arb_accented_pair() -> impl Strategy<Value = (String, String)> {
    arb_greek_word().prop_flat_map(|word| {
        let len = word.chars().count();
        (
            Just(word),
            proptest::collection::vec(proptest::option::of(arb_mark()), len),
        )
            .prop_map(|(word, marks)| {
                let accented: String = word
                    .chars()
                    .zip(marks)
                    .flat_map(|(c, mark)| std::iter::once(c).chain(mark))
                    .collect();
                (word, accented)
            })
    })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: canonicalize(canonicalize(s)) == canonicalize(s)
    #[test]
    fn prop_canonicalize_idempotent(surface in arb_surface()) {
        let once = canonicalize(&surface);
        let twice = canonicalize(once.as_str());
        prop_assert_eq!(once, twice);
    }

    /// Property: keys contain only lowercase letters and no final sigma
    #[test]
    fn prop_key_is_bare(surface in arb_surface()) {
        let key = LexicalKey::derive(&surface);
        prop_assert!(key.as_str().chars().all(|c| c.is_alphabetic() && !c.is_uppercase()));
        prop_assert!(!key.as_str().contains('ς'));
    }

    /// Property: case does not change the key
    #[test]
    fn prop_case_insensitive(word in arb_greek_word()) {
        prop_assert_eq!(
            LexicalKey::derive(&word.to_uppercase()),
            LexicalKey::derive(&word)
        );
    }

    /// Property: diacritics do not change the key
    #[test]
    fn prop_diacritic_insensitive((plain, accented) in arb_accented_pair()) {
        prop_assert_eq!(LexicalKey::derive(&accented), LexicalKey::derive(&plain));
    }

    /// Property: a Greek word and its Beta Code spelling share a key
    #[test]
    fn prop_script_independent((_, accented) in arb_accented_pair()) {
        let flat = to_flat(&accented);
        prop_assert_eq!(LexicalKey::derive(&flat), LexicalKey::derive(&accented));
    }

    /// Property: homonym digits never split a key
    #[test]
    fn prop_homonym_digits_ignored(word in arb_greek_word(), n in 1u8..10) {
        let flat = to_flat(&word);
        let numbered = format!("{flat}{n}");
        prop_assert_eq!(LexicalKey::derive(&numbered), LexicalKey::derive(&word));
    }
}
