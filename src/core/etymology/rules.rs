//! Phonetic Rewrite Rules and Morpheme Tables
//!
//! Default tables used to walk a Modern Greek form back to its ancient
//! ancestor. Everything here is written in bare form (lowercase, no
//! diacritics); the resolver canonicalizes configured values again before
//! use, so accented entries in a config file work too.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::lexicon::canon::bare;

/// Where a rewrite pattern must occur in the stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAnchor {
    Suffix,
    Prefix,
    /// First occurrence anywhere
    Infix,
}

/// One modern → ancient rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneticRule {
    pub anchor: RuleAnchor,
    pub from: String,
    pub to: String,
}

impl PhoneticRule {
    pub fn suffix(from: &str, to: &str) -> Self {
        Self::new(RuleAnchor::Suffix, from, to)
    }

    pub fn prefix(from: &str, to: &str) -> Self {
        Self::new(RuleAnchor::Prefix, from, to)
    }

    pub fn infix(from: &str, to: &str) -> Self {
        Self::new(RuleAnchor::Infix, from, to)
    }

    fn new(anchor: RuleAnchor, from: &str, to: &str) -> Self {
        Self {
            anchor,
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// The same rule with both patterns in bare form.
    pub fn canonical(&self) -> Self {
        Self {
            anchor: self.anchor,
            from: bare(&self.from),
            to: bare(&self.to),
        }
    }

    /// Rewrite `stem`, or `None` when the pattern does not occur or the
    /// rewrite changes nothing.
    pub fn apply(&self, stem: &str) -> Option<String> {
        let rewritten = match self.anchor {
            RuleAnchor::Suffix => stem
                .strip_suffix(self.from.as_str())
                .map(|head| format!("{head}{}", self.to)),
            RuleAnchor::Prefix => stem
                .strip_prefix(self.from.as_str())
                .map(|tail| format!("{}{tail}", self.to)),
            RuleAnchor::Infix if !self.from.is_empty() && stem.contains(self.from.as_str()) => {
                Some(stem.replacen(self.from.as_str(), &self.to, 1))
            }
            RuleAnchor::Infix => None,
        }?;
        (rewritten != stem && !rewritten.is_empty()).then_some(rewritten)
    }
}

impl fmt::Display for PhoneticRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.anchor {
            RuleAnchor::Suffix => write!(f, "-{}→-{}", self.from, self.to),
            RuleAnchor::Prefix => write!(f, "{}-→{}-", self.from, self.to),
            RuleAnchor::Infix => write!(f, "{}→{}", self.from, self.to),
        }
    }
}

/// Side of the stem a morpheme was removed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MorphemePosition {
    Leading,
    Trailing,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Rewrite table in priority order.
pub fn default_rules() -> Vec<PhoneticRule> {
    vec![
        PhoneticRule::suffix("ιωνω", "οεω"),
        PhoneticRule::suffix("ωνω", "οω"),
        PhoneticRule::suffix("ωνω", "εω"),
        PhoneticRule::suffix("νυω", "νυμι"),
        PhoneticRule::suffix("αω", "ω"),
        PhoneticRule::suffix("ω", "εω"),
        PhoneticRule::suffix("ω", "οω"),
        PhoneticRule::suffix("ω", "αω"),
        PhoneticRule::suffix("ον", "ος"),
        PhoneticRule::suffix("ο", "ος"),
        // Apheresis: restore a lost initial vowel
        PhoneticRule::prefix("", "ε"),
        PhoneticRule::prefix("", "α"),
        PhoneticRule::prefix("", "ο"),
        PhoneticRule::prefix("", "η"),
    ]
}

/// Preverbs and prefixes, longest first where they overlap.
pub fn default_leading_morphemes() -> Vec<String> {
    strings(&[
        "αντι", "αμφι", "υπερ", "κατα", "μετα", "παρα", "περι", "δια", "απο", "επι", "ανα",
        "προσ", "προ", "συν", "συμ", "συγ", "εκ", "εξ", "εν", "εμ", "υπο", "αν", "α",
    ])
}

/// Diminutive and derivational endings.
pub fn default_trailing_morphemes() -> Vec<String> {
    strings(&["ακι", "ουλα", "ουλι", "ιτσα", "ακια"])
}

/// Generic words that look like ancestors in etymology text but never are.
pub fn default_blacklist() -> Vec<String> {
    strings(&[
        "ελληνικός",
        "ελληνική",
        "αρχαίος",
        "αρχαία",
        "κοινός",
        "κοινή",
        "νέα",
        "νέος",
        "μεσαιωνικός",
    ])
}

/// Markers in etymology text that introduce an ancient ancestor.
pub fn default_anchors() -> Vec<String> {
    strings(&["αρχαία", "αρχ.", "ελληνική", "ελλ.", "grc"])
}
