//! Property-based tests for homonym merging and citation scoring
//!
//! Tests invariants:
//! - Merging homonyms in any order yields the same citations and score
//! - An entry's score is the sum of its citation scores
//! - Adding citations never lowers a score
//! - Citations are always kept in rank order

use std::cmp::Ordering;

use proptest::prelude::*;

use crate::core::lexicon::{AuthorTier, Citation, DictionaryEntry, LexicalKey, OracleIndex};

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

fn arb_tier() -> impl Strategy<Value = AuthorTier> {
    prop_oneof![
        Just(AuthorTier::Top),
        Just(AuthorTier::Philosopher),
        Just(AuthorTier::Historian),
        Just(AuthorTier::Standard),
    ]
}

fn arb_citation() -> impl Strategy<Value = Citation> {
    (
        "[αβγδεζλογοσ ]{1,30}",
        prop_oneof![Just("Il.1.1"), Just("Pl.R.332a"), Just("Hdt.1.2"), Just("Th.2.4")],
        proptest::option::of("[a-z ]{1,12}"),
        arb_tier(),
        0u32..=110,
    )
        .prop_map(|(excerpt, author, translation, tier, score)| Citation {
            excerpt,
            author: author.to_string(),
            translation,
            tier,
            score,
        })
}

/// Homonyms of one word: Beta Code keys that differ only by digit
fn arb_homonyms() -> impl Strategy<Value = Vec<DictionaryEntry>> {
    proptest::collection::vec(
        (
            proptest::collection::vec(arb_citation(), 0..5),
            proptest::option::of("[a-z]{3,8}"),
        ),
        1..5,
    )
    .prop_map(|parts| {
        parts
            .into_iter()
            .enumerate()
            .map(|(n, (citations, definition))| {
                let surface = format!("lo/gos{}", n + 1);
                let mut entry = DictionaryEntry::new(LexicalKey::derive(&surface), "λόγος");
                if let Some(definition) = definition {
                    entry.add_definition(&definition);
                }
                entry.add_citations(citations);
                entry
            })
            .collect()
    })
}

fn is_ranked(citations: &[Citation]) -> bool {
    citations
        .windows(2)
        .all(|pair| pair[0].rank(&pair[1]) != Ordering::Greater)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: merge order does not change citations or score
    #[test]
    fn prop_merge_order_independent(entries in arb_homonyms()) {
        let forward: OracleIndex = entries.clone().into_iter().collect();
        let backward: OracleIndex = entries.into_iter().rev().collect();

        prop_assert_eq!(forward.len(), 1);
        let key = LexicalKey::derive("λόγος");
        let a = forward.get(&key).unwrap();
        let b = backward.get(&key).unwrap();

        prop_assert_eq!(&a.citations, &b.citations);
        prop_assert_eq!(a.score, b.score);

        let mut defs_a = a.definitions.clone();
        let mut defs_b = b.definitions.clone();
        defs_a.sort();
        defs_b.sort();
        prop_assert_eq!(defs_a, defs_b);
    }

    /// Property: score is the sum of citation scores after any merge
    #[test]
    fn prop_score_is_citation_sum(entries in arb_homonyms()) {
        let index: OracleIndex = entries.into_iter().collect();
        for entry in index.entries() {
            let sum: u64 = entry.citations.iter().map(|c| u64::from(c.score)).sum();
            prop_assert_eq!(entry.score, sum);
        }
    }

    /// Property: adding citations never lowers the score
    #[test]
    fn prop_score_monotonic(
        first in proptest::collection::vec(arb_citation(), 0..6),
        more in proptest::collection::vec(arb_citation(), 0..6),
    ) {
        let mut entry = DictionaryEntry::new(LexicalKey::derive("logos"), "λόγος");
        entry.add_citations(first);
        let before = entry.score;
        entry.add_citations(more);
        prop_assert!(entry.score >= before);
    }

    /// Property: citations stay ranked after every addition and merge
    #[test]
    fn prop_citations_ranked(entries in arb_homonyms()) {
        for entry in &entries {
            prop_assert!(is_ranked(&entry.citations));
        }
        let index: OracleIndex = entries.into_iter().collect();
        for entry in index.entries() {
            prop_assert!(is_ranked(&entry.citations));
        }
    }

    /// Property: rank is antisymmetric
    #[test]
    fn prop_rank_antisymmetric(a in arb_citation(), b in arb_citation()) {
        prop_assert_eq!(a.rank(&b), b.rank(&a).reverse());
    }
}
