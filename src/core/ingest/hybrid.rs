//! Hybrid Ingestor
//!
//! Reads wiktionary-style JSONL dumps (one JSON record per line) and merges
//! every record for the same word into one [`ModernEntry`]. Malformed lines
//! are counted and skipped; only unreadable sources are errors.
//!
//! Core sources create entries. Gloss sources (English-language dumps of
//! the same words) only add English glosses to entries that already exist.

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use super::config::IngestConfig;
use super::entry::{ModernEntry, ParadigmForm};
use super::error::{IngestError, IngestResult};

#[derive(Debug, Deserialize)]
struct RawRecord {
    word: Option<String>,
    #[serde(default)]
    pos: Option<String>,
    #[serde(default)]
    lang_code: Option<String>,
    #[serde(default)]
    etymology_text: Option<String>,
    #[serde(default)]
    forms: Vec<RawForm>,
    #[serde(default)]
    senses: Vec<RawSense>,
    #[serde(default)]
    synonyms: Vec<RawSynonym>,
    #[serde(default)]
    parent_lemma: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSynonym {
    #[serde(default)]
    word: String,
}

#[derive(Debug, Deserialize)]
struct RawForm {
    #[serde(default)]
    form: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    raw_tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawSense {
    #[serde(default)]
    glosses: Vec<String>,
    #[serde(default)]
    examples: Vec<RawExample>,
}

#[derive(Debug, Deserialize)]
struct RawExample {
    #[serde(default)]
    text: String,
}

/// Counters for one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub lines_read: usize,
    pub malformed_lines: usize,
    /// Other language, not a target, or no word
    pub records_ignored: usize,
    pub records_merged: usize,
    /// Gloss-source records that enriched an existing entry
    pub glosses_merged: usize,
    pub entries: usize,
}

/// What happened to one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Merged,
    Glossed,
    Ignored,
    Malformed,
    Blank,
}

/// NFC-normalized, trimmed form used to merge records.
pub fn normalize_word(word: &str) -> String {
    word.trim().nfc().collect()
}

/// Parse a target list: one lemma per line, text after a comma ignored,
/// quotes and blank lines dropped.
pub fn parse_targets(text: &str) -> HashSet<String> {
    text.lines()
        .filter_map(|line| line.split(',').next())
        .map(|lemma| normalize_word(&lemma.replace(['"', '\''], "")))
        .filter(|lemma| !lemma.is_empty())
        .collect()
}

pub struct HybridIngestor {
    language: String,
    compound_markers: Vec<String>,
    targets: Option<HashSet<String>>,
    entries: BTreeMap<String, ModernEntry>,
    report: IngestReport,
}

impl HybridIngestor {
    pub fn new(config: &IngestConfig) -> Self {
        Self {
            language: config.language_code.clone(),
            compound_markers: config
                .compound_markers
                .iter()
                .map(|m| m.to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
            targets: None,
            entries: BTreeMap::new(),
            report: IngestReport::default(),
        }
    }

    /// Restrict ingestion to the given lemmas.
    pub fn with_targets(mut self, targets: HashSet<String>) -> Self {
        log::info!("Targets identified: {}", targets.len());
        self.targets = Some(targets);
        self
    }

    pub fn load_targets(path: &Path) -> IngestResult<HashSet<String>> {
        let text = std::fs::read_to_string(path).map_err(|source| IngestError::Source {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(parse_targets(&text))
    }

    pub fn ingest_file(&mut self, path: &Path) -> IngestResult<()> {
        let file = File::open(path).map_err(|source| IngestError::Source {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Scanning {}", path.display());
        let before = self.report.records_merged;
        self.ingest_reader(BufReader::new(file))?;
        log::info!(
            "Merged {} records from {}",
            self.report.records_merged - before,
            path.display()
        );
        Ok(())
    }

    pub fn ingest_reader<R: BufRead>(&mut self, reader: R) -> IngestResult<()> {
        for line in reader.lines() {
            self.ingest_line(&line?);
        }
        Ok(())
    }

    /// Read a gloss source after the core sources.
    pub fn ingest_gloss_file(&mut self, path: &Path) -> IngestResult<()> {
        let file = File::open(path).map_err(|source| IngestError::Source {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Scanning glosses in {}", path.display());
        let before = self.report.glosses_merged;
        self.ingest_gloss_reader(BufReader::new(file))?;
        log::info!(
            "Glossed {} entries from {}",
            self.report.glosses_merged - before,
            path.display()
        );
        Ok(())
    }

    pub fn ingest_gloss_reader<R: BufRead>(&mut self, reader: R) -> IngestResult<()> {
        for line in reader.lines() {
            self.ingest_gloss_line(&line?);
        }
        Ok(())
    }

    pub fn ingest_line(&mut self, line: &str) -> LineOutcome {
        let Some(record) = self.parse(line) else {
            return self.skipped(line);
        };
        if self.merge(record) {
            self.report.records_merged += 1;
            LineOutcome::Merged
        } else {
            self.report.records_ignored += 1;
            LineOutcome::Ignored
        }
    }

    /// Add English glosses to an existing entry. Never creates one.
    pub fn ingest_gloss_line(&mut self, line: &str) -> LineOutcome {
        let Some(record) = self.parse(line) else {
            return self.skipped(line);
        };
        let Some(word) = self.accepted_word(&record) else {
            self.report.records_ignored += 1;
            return LineOutcome::Ignored;
        };
        match self.entries.get_mut(&word) {
            Some(entry) => {
                for gloss in record.senses.iter().flat_map(|s| &s.glosses) {
                    entry.add_gloss(gloss);
                }
                self.report.glosses_merged += 1;
                LineOutcome::Glossed
            }
            None => {
                self.report.records_ignored += 1;
                LineOutcome::Ignored
            }
        }
    }

    fn parse(&mut self, line: &str) -> Option<RawRecord> {
        if line.trim().is_empty() {
            return None;
        }
        self.report.lines_read += 1;
        match serde_json::from_str(line) {
            Ok(record) => Some(record),
            Err(e) => {
                log::debug!("Skipping malformed line {}: {}", self.report.lines_read, e);
                self.report.malformed_lines += 1;
                None
            }
        }
    }

    fn skipped(&self, line: &str) -> LineOutcome {
        if line.trim().is_empty() {
            LineOutcome::Blank
        } else {
            LineOutcome::Malformed
        }
    }

    /// Normalized word of a record in the configured language that passes
    /// the target filter. Records without a language code are rejected.
    fn accepted_word(&self, record: &RawRecord) -> Option<String> {
        if record.lang_code.as_deref() != Some(self.language.as_str()) {
            return None;
        }
        let word = normalize_word(record.word.as_deref().unwrap_or_default());
        if word.is_empty() {
            return None;
        }
        match &self.targets {
            Some(targets) if !targets.contains(&word) => None,
            _ => Some(word),
        }
    }

    fn merge(&mut self, record: RawRecord) -> bool {
        let Some(word) = self.accepted_word(&record) else {
            return false;
        };

        let entry = self
            .entries
            .entry(word.clone())
            .or_insert_with(|| ModernEntry::new(word));

        if entry.pos.is_empty() {
            entry.pos = record.pos.unwrap_or_default();
        }
        if entry.etymology.is_none() {
            entry.etymology = record.etymology_text.filter(|t| !t.trim().is_empty());
        }
        if entry.parent.is_none() {
            entry.parent = record
                .parent_lemma
                .map(|p| normalize_word(&p))
                .filter(|p| !p.is_empty());
        }
        for synonym in &record.synonyms {
            entry.add_synonym(&normalize_word(&synonym.word));
        }
        for sense in record.senses {
            for gloss in &sense.glosses {
                entry.add_sense(gloss);
            }
            for example in &sense.examples {
                entry.add_example(&example.text);
            }
        }
        for raw in record.forms {
            if raw.form.starts_with("Formed using") || raw.form.contains("el-conjug") {
                continue;
            }
            let tags = raw.tags.iter().chain(raw.raw_tags.iter());
            entry.add_form(ParadigmForm::new(&raw.form, tags));
        }

        let etymology = entry.etymology_text().to_lowercase();
        entry.compound = self.compound_markers.iter().any(|m| etymology.contains(m.as_str()));
        true
    }

    pub fn report(&self) -> &IngestReport {
        &self.report
    }

    /// Entries sorted by lemma, with the final report.
    pub fn finish(mut self) -> (Vec<ModernEntry>, IngestReport) {
        self.report.entries = self.entries.len();
        if self.report.malformed_lines > 0 {
            log::warn!("Skipped {} malformed lines", self.report.malformed_lines);
        }
        (self.entries.into_values().collect(), self.report)
    }
}
