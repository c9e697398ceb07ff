//! Etymology Resolver
//!
//! Maps a Modern Greek lemma to the Ancient Greek dictionary entry it
//! descends from.
//!
//! # Resolution Order
//!
//! Stages run in a fixed order and the first accepted candidate is final:
//!
//! ```text
//! 1. Direct           canonical lemma is an index key
//! 2. Decompounded     strip known morphemes (breadth-first, bounded depth)
//! 3. Phonetic         rewrite table over the lemma and every strip residual
//! 4. Etymology        ancestor named after an anchor in the etymology text
//! 5. Lemmatizer       external lemma, looked up directly
//! 6. Modern parent    an ingested word named in the etymology text,
//!                     resolved in turn (bounded depth)
//! 7. Unresolved       terminal result with no key
//! ```
//!
//! Every candidate passes the blacklist before acceptance; a blacklisted
//! hit is skipped and the search continues.
//!
//! An entry without etymology text borrows its parent's. Anchor candidates
//! that are not indexed get one lemmatizer pass before they are dropped.
//!
//! # Working Forms
//!
//! Stems are bare Greek (lowercase, no diacritics, medial sigma only).
//! Morphemes, rules and blacklist entries from configuration are brought
//! into the same form once, at construction.

use std::collections::{HashMap, HashSet, VecDeque};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::config::ResolverConfig;
use super::lemmatizer::Lemmatizer;
use super::rules::{MorphemePosition, PhoneticRule};
use crate::core::ingest::ModernEntry;
use crate::core::lexicon::canon::{bare, LexicalKey};
use crate::core::lexicon::Oracle;

// ============================================================================
// Result Types
// ============================================================================

/// How much to trust a resolution, from strongest to none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Confidence {
    Direct,
    Decompounded,
    PhoneticReconstructed,
    EtymologyAttested,
    LemmatizerAssisted,
    Unresolved,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Direct => "direct",
            Confidence::Decompounded => "decompounded",
            Confidence::PhoneticReconstructed => "phonetic-reconstructed",
            Confidence::EtymologyAttested => "etymology-attested",
            Confidence::LemmatizerAssisted => "lemmatizer-assisted",
            Confidence::Unresolved => "unresolved",
        }
    }
}

/// One step of a resolution path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ResolutionStep {
    /// Exact lookup hit
    Direct { key: LexicalKey },
    /// A morpheme was removed, leaving `residual`
    Strip {
        morpheme: String,
        position: MorphemePosition,
        residual: String,
    },
    /// A phonetic rule rewrote `from` into `to`
    Rewrite { rule: String, from: String, to: String },
    /// Candidate named after an ancestry anchor in the etymology text
    Etymology { anchor: String, candidate: String },
    /// The lemmatizer proposed `lemma`
    Lemmatize { lemma: String },
    /// Followed the etymology to the modern word `lemma`
    Parent { lemma: String },
}

/// Terminal outcome of resolving one entry. An unresolved result has no key
/// and an empty path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub lemma: String,
    pub key: Option<LexicalKey>,
    pub path: Vec<ResolutionStep>,
    pub confidence: Confidence,
}

impl ResolutionResult {
    fn resolved(lemma: &str, key: LexicalKey, path: Vec<ResolutionStep>, confidence: Confidence) -> Self {
        Self {
            lemma: lemma.to_string(),
            key: Some(key),
            path,
            confidence,
        }
    }

    fn unresolved(lemma: &str) -> Self {
        Self {
            lemma: lemma.to_string(),
            key: None,
            path: Vec::new(),
            confidence: Confidence::Unresolved,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.key.is_some()
    }
}

type Found = (LexicalKey, Vec<ResolutionStep>, Confidence);

/// Similarity credited to an anchor candidate found through the lemmatizer
const LEMMATIZED_CANDIDATE_SIMILARITY: f64 = 0.9;

/// A stem reached by decompounding, with the strips that produced it.
#[derive(Debug, Clone)]
struct Visited {
    stem: String,
    path: Vec<ResolutionStep>,
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolves modern entries against a read-only oracle.
///
/// `Send + Sync` whenever the oracle is, so one resolver serves a whole
/// rayon batch.
pub struct Resolver<O> {
    oracle: O,
    lemmatizer: Option<Box<dyn Lemmatizer>>,
    leading: Vec<String>,
    trailing: Vec<String>,
    rules: Vec<PhoneticRule>,
    blacklist: HashSet<LexicalKey>,
    anchors: Vec<String>,
    anchor_window: usize,
    max_depth: usize,
    min_residual: usize,
    compound_length: usize,
    parent_depth: usize,
    /// Ingested entries by bare lemma
    modern: HashMap<String, ModernEntry>,
    language: String,
}

impl<O: Oracle> Resolver<O> {
    pub fn new(oracle: O, config: &ResolverConfig) -> Self {
        let morphemes = |list: &[String]| -> Vec<String> {
            list.iter().map(|m| bare(m)).filter(|m| !m.is_empty()).collect()
        };

        Self {
            oracle,
            lemmatizer: None,
            leading: morphemes(&config.leading_morphemes),
            trailing: morphemes(&config.trailing_morphemes),
            rules: config.rules.iter().map(PhoneticRule::canonical).collect(),
            blacklist: config
                .blacklist
                .iter()
                .map(|w| LexicalKey::derive(w))
                .filter(|k| !k.is_empty())
                .collect(),
            anchors: config.etymology_anchors.iter().map(|a| anchor_form(a)).collect(),
            anchor_window: config.anchor_window,
            max_depth: config.max_depth,
            min_residual: config.min_residual,
            compound_length: config.compound_length,
            parent_depth: config.parent_depth,
            modern: HashMap::new(),
            language: config.language.clone(),
        }
    }

    pub fn with_lemmatizer(mut self, lemmatizer: impl Lemmatizer + 'static) -> Self {
        self.lemmatizer = Some(Box::new(lemmatizer));
        self
    }

    /// Make ingested entries visible as modern parents. The first entry
    /// for a bare lemma wins.
    pub fn with_modern_entries<'a>(
        mut self,
        entries: impl IntoIterator<Item = &'a ModernEntry>,
    ) -> Self {
        for entry in entries {
            let stem = bare(&entry.lemma);
            if !stem.is_empty() {
                self.modern.entry(stem).or_insert_with(|| entry.clone());
            }
        }
        self
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Resolve one entry. Always terminates with exactly one result.
    pub fn resolve(&self, entry: &ModernEntry) -> ResolutionResult {
        let lemma = entry.lemma.as_str();
        let mut visited = HashSet::new();
        match self.hunt(entry, 0, &mut visited) {
            Some((key, path, confidence)) => ResolutionResult::resolved(lemma, key, path, confidence),
            None => {
                log::debug!("Unresolved: {}", lemma);
                ResolutionResult::unresolved(lemma)
            }
        }
    }

    /// Every stage for one entry; `depth` counts modern parents followed.
    fn hunt(&self, entry: &ModernEntry, depth: usize, visited: &mut HashSet<String>) -> Option<Found> {
        let lemma = entry.lemma.as_str();
        let stem = bare(lemma);
        if stem.is_empty() || !visited.insert(stem.clone()) {
            return None;
        }

        if let Some(key) = self.accept(&stem) {
            let path = vec![ResolutionStep::Direct { key: key.clone() }];
            return Some((key, path, Confidence::Direct));
        }

        let visited_stems = if self.looks_compound(entry, &stem) {
            match self.decompound(&stem) {
                Ok((key, path)) => return Some((key, path, Confidence::Decompounded)),
                Err(stems) => stems,
            }
        } else {
            vec![Visited {
                stem: stem.clone(),
                path: Vec::new(),
            }]
        };

        if let Some((key, path)) = self.reconstruct(&visited_stems) {
            return Some((key, path, Confidence::PhoneticReconstructed));
        }

        let etymology = self.etymology_of(entry);
        if let Some((key, path)) = self.attest(etymology, &stem) {
            return Some((key, path, Confidence::EtymologyAttested));
        }

        if let Some((key, path)) = self.lemmatize(lemma, &stem) {
            return Some((key, path, Confidence::LemmatizerAssisted));
        }

        if depth < self.parent_depth {
            return self.via_parent(etymology, depth, visited);
        }
        None
    }

    /// Resolve a batch in parallel, preserving input order.
    pub fn resolve_all(&self, entries: &[ModernEntry]) -> Vec<ResolutionResult> {
        entries.par_iter().map(|e| self.resolve(e)).collect()
    }

    /// Key of `form` when it is indexed and not blacklisted.
    fn accept(&self, form: &str) -> Option<LexicalKey> {
        let key = LexicalKey::derive(form);
        if key.is_empty() || self.oracle.lookup(&key).is_none() {
            return None;
        }
        if self.blacklist.contains(&key) {
            log::debug!("Rejected blacklisted candidate {}", form);
            return None;
        }
        Some(key)
    }

    fn looks_compound(&self, entry: &ModernEntry, stem: &str) -> bool {
        entry.compound || stem.chars().count() >= self.compound_length
    }

    /// Breadth-first morpheme stripping. Returns the first accepted residual
    /// with its strip path, or every stem visited (the lemma first) when no
    /// residual is indexed.
    fn decompound(&self, stem: &str) -> Result<(LexicalKey, Vec<ResolutionStep>), Vec<Visited>> {
        let mut seen: HashSet<String> = HashSet::from([stem.to_string()]);
        let mut visited = vec![Visited {
            stem: stem.to_string(),
            path: Vec::new(),
        }];
        let mut queue = VecDeque::from([(stem.to_string(), Vec::new(), 0usize)]);

        while let Some((current, path, depth)) = queue.pop_front() {
            if depth >= self.max_depth {
                continue;
            }
            for (residual, step) in self.strips(&current) {
                if !seen.insert(residual.clone()) {
                    continue;
                }
                let mut next_path: Vec<ResolutionStep> = path.clone();
                next_path.push(step);

                if let Some(key) = self.accept(&residual) {
                    return Ok((key, next_path));
                }
                visited.push(Visited {
                    stem: residual.clone(),
                    path: next_path.clone(),
                });
                queue.push_back((residual, next_path, depth + 1));
            }
        }

        Err(visited)
    }

    /// Every single-morpheme strip of `stem` that leaves a long enough,
    /// strictly shorter residual.
    fn strips(&self, stem: &str) -> Vec<(String, ResolutionStep)> {
        let length = stem.chars().count();
        let long_enough = |residual: &str| {
            let n = residual.chars().count();
            n >= self.min_residual && n < length
        };

        let leading = self.leading.iter().filter_map(|m| {
            let residual = stem.strip_prefix(m.as_str())?;
            long_enough(residual).then(|| (residual.to_string(), m, MorphemePosition::Leading))
        });
        let trailing = self.trailing.iter().filter_map(|m| {
            let residual = stem.strip_suffix(m.as_str())?;
            long_enough(residual).then(|| (residual.to_string(), m, MorphemePosition::Trailing))
        });

        leading
            .chain(trailing)
            .map(|(residual, morpheme, position)| {
                let step = ResolutionStep::Strip {
                    morpheme: morpheme.clone(),
                    position,
                    residual: residual.clone(),
                };
                (residual, step)
            })
            .collect()
    }

    /// Apply the rewrite table to each visited stem in visit order.
    fn reconstruct(&self, visited: &[Visited]) -> Option<(LexicalKey, Vec<ResolutionStep>)> {
        for Visited { stem, path } in visited {
            for rule in &self.rules {
                let Some(candidate) = rule.apply(stem) else {
                    continue;
                };
                if let Some(key) = self.accept(&candidate) {
                    let mut path = path.clone();
                    path.push(ResolutionStep::Rewrite {
                        rule: rule.to_string(),
                        from: stem.clone(),
                        to: candidate,
                    });
                    return Some((key, path));
                }
            }
        }
        None
    }

    /// Ancestor named in the etymology text: the indexed candidate after an
    /// anchor most similar to the lemma. A candidate that is not indexed
    /// may still qualify through its lemma.
    fn attest(&self, etymology: &str, stem: &str) -> Option<(LexicalKey, Vec<ResolutionStep>)> {
        let tokens: Vec<&str> = etymology.split_whitespace().collect();
        let mut best: Option<(f64, LexicalKey, Vec<ResolutionStep>)> = None;

        for (i, token) in tokens.iter().enumerate() {
            let anchor = anchor_form(token);
            if anchor.is_empty() || !self.anchors.contains(&anchor) {
                continue;
            }
            for raw in tokens.iter().skip(i + 1).take(self.anchor_window) {
                let candidate = raw.trim_matches(|c: char| !c.is_alphabetic());
                let candidate_stem = bare(candidate);
                if candidate_stem.chars().count() < 2 || self.is_blacklisted(candidate) {
                    continue;
                }
                let step = ResolutionStep::Etymology {
                    anchor: token.to_string(),
                    candidate: candidate.to_string(),
                };
                let found = match self.accept(candidate) {
                    Some(key) => Some((
                        strsim::normalized_levenshtein(stem, &candidate_stem),
                        key,
                        vec![step],
                    )),
                    None => self.lemmatize_candidate(candidate, &candidate_stem).map(|(key, lemma)| {
                        (
                            LEMMATIZED_CANDIDATE_SIMILARITY,
                            key,
                            vec![step, ResolutionStep::Lemmatize { lemma }],
                        )
                    }),
                };
                if let Some((similarity, key, path)) = found {
                    if best.as_ref().map_or(true, |(s, _, _)| similarity > *s) {
                        best = Some((similarity, key, path));
                    }
                }
            }
        }

        best.map(|(_, key, path)| (key, path))
    }

    /// Lemmatize an anchor candidate once; the lemma must be indexed.
    fn lemmatize_candidate(
        &self,
        candidate: &str,
        candidate_stem: &str,
    ) -> Option<(LexicalKey, String)> {
        let lemmatizer = self.lemmatizer.as_ref()?;
        let lemma = lemmatizer.lemmatize(candidate, &self.language).ok()?;
        let lemma_stem = bare(&lemma);
        if lemma_stem.is_empty() || lemma_stem == candidate_stem {
            return None;
        }
        self.accept(&lemma_stem).map(|key| (key, lemma))
    }

    /// Resolve the first ingested word named in `etymology` that resolves,
    /// one level further down.
    fn via_parent(
        &self,
        etymology: &str,
        depth: usize,
        visited: &mut HashSet<String>,
    ) -> Option<Found> {
        if self.modern.is_empty() {
            return None;
        }
        for token in etymology.split(|c: char| !c.is_alphabetic()) {
            let token_stem = bare(token);
            if token_stem.chars().count() < 3 || self.is_blacklisted(token) {
                continue;
            }
            let Some(parent) = self.modern.get(&token_stem) else {
                continue;
            };
            if let Some((key, path, _)) = self.hunt(parent, depth + 1, visited) {
                let mut steps = vec![ResolutionStep::Parent {
                    lemma: parent.lemma.clone(),
                }];
                steps.extend(path);
                return Some((key, steps, Confidence::EtymologyAttested));
            }
        }
        None
    }

    /// The entry's etymology text, or its parent's when it has none.
    fn etymology_of<'a>(&'a self, entry: &'a ModernEntry) -> &'a str {
        let own = entry.etymology_text();
        if !own.trim().is_empty() {
            return own;
        }
        entry
            .parent
            .as_deref()
            .and_then(|parent| self.modern.get(&bare(parent)))
            .map(ModernEntry::etymology_text)
            .unwrap_or(own)
    }

    fn is_blacklisted(&self, form: &str) -> bool {
        self.blacklist.contains(&LexicalKey::derive(form))
    }

    /// One lemmatizer call; errors and unchanged output count as a miss.
    fn lemmatize(&self, lemma: &str, stem: &str) -> Option<(LexicalKey, Vec<ResolutionStep>)> {
        let lemmatizer = self.lemmatizer.as_ref()?;
        let proposed = match lemmatizer.lemmatize(lemma, &self.language) {
            Ok(proposed) => proposed,
            Err(e) => {
                log::debug!("Lemmatizer gave no lemma for {}: {}", lemma, e);
                return None;
            }
        };
        let proposed_stem = bare(&proposed);
        if proposed_stem.is_empty() || proposed_stem == stem {
            return None;
        }
        let key = self.accept(&proposed_stem)?;
        Some((
            key.clone(),
            vec![
                ResolutionStep::Lemmatize { lemma: proposed },
                ResolutionStep::Direct { key },
            ],
        ))
    }
}

/// Anchor comparison form: lowercase, no diacritics, surrounding punctuation
/// other than an abbreviation dot trimmed.
fn anchor_form(token: &str) -> String {
    use unicode_normalization::char::is_combining_mark;
    use unicode_normalization::UnicodeNormalization;

    token
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .trim_matches(|c: char| !c.is_alphabetic() && c != '.')
        .trim_start_matches('.')
        .to_string()
}
