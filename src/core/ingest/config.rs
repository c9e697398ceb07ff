//! Ingestion Configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// JSONL dumps of modern records, read in order
    pub sources: Vec<PathBuf>,
    /// JSONL dumps read after `sources`; they add English glosses to
    /// existing entries and never create new ones
    pub gloss_sources: Vec<PathBuf>,
    /// One lemma per line; only these are ingested when set
    pub targets_path: Option<PathBuf>,
    /// Records with another `lang_code` are ignored
    pub language_code: String,
    /// Substrings of the etymology text that mark a compound
    pub compound_markers: Vec<String>,
    /// Enriched JSONL output. Defaults to the data directory.
    pub output_path: Option<PathBuf>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            gloss_sources: Vec::new(),
            targets_path: None,
            language_code: "el".to_string(),
            compound_markers: vec!["σύνθετ".to_string(), "compound".to_string(), " + ".to_string()],
            output_path: None,
        }
    }
}
