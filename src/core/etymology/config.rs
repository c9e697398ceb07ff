//! Resolver and Lemmatizer Configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::rules::{
    default_anchors, default_blacklist, default_leading_morphemes, default_rules,
    default_trailing_morphemes, PhoneticRule,
};

/// Resolution strategy tables and limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub leading_morphemes: Vec<String>,
    pub trailing_morphemes: Vec<String>,
    /// Tried in order; first hit wins
    pub rules: Vec<PhoneticRule>,
    /// Keys never accepted as an ancestor
    pub blacklist: Vec<String>,
    pub etymology_anchors: Vec<String>,
    /// Tokens after an anchor considered as candidates
    pub anchor_window: usize,
    /// Morpheme strips per decomposition path
    pub max_depth: usize,
    /// Shortest stem a strip may leave, in letters
    pub min_residual: usize,
    /// Lemmas at least this long are decompounded without a compound hint
    pub compound_length: usize,
    /// Modern parents followed through etymology texts before giving up
    pub parent_depth: usize,
    /// Language code handed to the lemmatizer
    pub language: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            leading_morphemes: default_leading_morphemes(),
            trailing_morphemes: default_trailing_morphemes(),
            rules: default_rules(),
            blacklist: default_blacklist(),
            etymology_anchors: default_anchors(),
            anchor_window: 3,
            max_depth: 3,
            min_residual: 3,
            compound_length: 7,
            parent_depth: 2,
            language: "grc".to_string(),
        }
    }
}

/// Optional lemmatizer backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LemmatizerConfig {
    /// JSON object mapping surface forms to lemmas. No lemmatizer is used
    /// when unset.
    pub table_path: Option<PathBuf>,
    /// Per-call budget in milliseconds; 0 disables the timeout
    pub timeout_ms: u64,
}

impl Default for LemmatizerConfig {
    fn default() -> Self {
        Self {
            table_path: None,
            timeout_ms: 2000,
        }
    }
}
