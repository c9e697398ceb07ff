//! Property-based tests for the etymology resolver
//!
//! Tests invariants:
//! - Every entry yields exactly one terminal result
//! - Blacklisted keys are never returned, whatever strategy finds them
//! - A returned key is always present in the index
//! - Direct hits carry a one-step path and win over every other strategy
//! - Unresolved results carry no key and no path
//! - Following modern parents terminates and keeps results well formed

use proptest::prelude::*;

use crate::core::etymology::{Confidence, ResolutionStep, Resolver, ResolverConfig};
use crate::core::ingest::ModernEntry;
use crate::core::lexicon::{DictionaryEntry, LexicalKey, Oracle, OracleIndex};

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

/// Stems built from common Greek syllables so morpheme strips and rewrites
/// get real chances to fire.
fn arb_stem() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            Just("απο"), Just("συν"), Just("δια"), Just("λογ"), Just("γραφ"),
            Just("ον"), Just("ω"), Just("ος"), Just("ια"), Just("θε"),
            Just("δηλ"), Just("ωνω"), Just("ευ"), Just("κατα"), Just("ικος"),
        ],
        1..5,
    )
    .prop_map(|parts| parts.concat())
}

fn arb_entry() -> impl Strategy<Value = ModernEntry> {
    (arb_stem(), any::<bool>(), proptest::option::of(arb_stem()))
        .prop_map(|(lemma, compound, etymology)| {
            let mut entry = ModernEntry::new(lemma).with_compound(compound);
            if let Some(ancestor) = etymology {
                entry = entry.with_etymology(format!("από την αρχαία ελληνική {ancestor}"));
            }
            entry
        })
}

fn arb_index() -> impl Strategy<Value = OracleIndex> {
    proptest::collection::vec(arb_stem(), 0..12).prop_map(|words| {
        words
            .iter()
            .map(|w| {
                let mut e = DictionaryEntry::new(LexicalKey::derive(w), w.as_str());
                e.add_definition("gloss");
                e
            })
            .collect()
    })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: resolution is total and well formed
    #[test]
    fn prop_single_well_formed_result(index in arb_index(), entry in arb_entry()) {
        let resolver = Resolver::new(&index, &ResolverConfig::default());
        let result = resolver.resolve(&entry);

        prop_assert_eq!(&result.lemma, &entry.lemma);
        match &result.key {
            Some(key) => {
                prop_assert!(index.lookup(key).is_some());
                prop_assert!(!result.path.is_empty());
                prop_assert_ne!(result.confidence, Confidence::Unresolved);
            }
            None => {
                prop_assert!(result.path.is_empty());
                prop_assert_eq!(result.confidence, Confidence::Unresolved);
            }
        }
    }

    /// Property: an indexed lemma always resolves directly in one step
    #[test]
    fn prop_direct_hit_one_step(index in arb_index(), entry in arb_entry()) {
        let mut index = index;
        let key = LexicalKey::derive(&entry.lemma);
        index.insert(DictionaryEntry::new(key.clone(), entry.lemma.as_str()));

        let resolver = Resolver::new(&index, &ResolverConfig::default());
        let result = resolver.resolve(&entry);

        prop_assert_eq!(result.confidence, Confidence::Direct);
        prop_assert_eq!(result.path, vec![ResolutionStep::Direct { key: key.clone() }]);
        prop_assert_eq!(result.key, Some(key));
    }

    /// Property: blacklisted keys are never returned
    #[test]
    fn prop_blacklist_respected(
        index in arb_index(),
        entry in arb_entry(),
        banned in proptest::collection::vec(arb_stem(), 1..4),
    ) {
        let mut index = index;
        for word in &banned {
            index.insert(DictionaryEntry::new(LexicalKey::derive(word), word.as_str()));
        }
        let config = ResolverConfig {
            blacklist: banned.clone(),
            ..ResolverConfig::default()
        };
        let resolver = Resolver::new(&index, &config);
        let result = resolver.resolve(&entry);

        if let Some(key) = result.key {
            for word in &banned {
                prop_assert_ne!(&key, &LexicalKey::derive(word));
            }
        }
    }

    /// Property: batch resolution matches one-by-one resolution
    #[test]
    fn prop_batch_matches_sequential(
        index in arb_index(),
        entries in proptest::collection::vec(arb_entry(), 0..8),
    ) {
        let resolver = Resolver::new(&index, &ResolverConfig::default());
        let batch = resolver.resolve_all(&entries);
        let single: Vec<_> = entries.iter().map(|e| resolver.resolve(e)).collect();
        prop_assert_eq!(batch, single);
    }

    /// Property: modern parents, cycles included, never break totality
    #[test]
    fn prop_modern_parents_terminate(
        index in arb_index(),
        entries in proptest::collection::vec(arb_entry(), 1..8),
    ) {
        let resolver = Resolver::new(&index, &ResolverConfig::default())
            .with_modern_entries(&entries);
        for entry in &entries {
            let result = resolver.resolve(entry);
            match &result.key {
                Some(key) => {
                    prop_assert!(index.lookup(key).is_some());
                    prop_assert!(!result.path.is_empty());
                }
                None => prop_assert!(result.path.is_empty()),
            }
        }
    }
}
