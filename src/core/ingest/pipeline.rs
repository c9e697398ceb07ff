//! Enrichment Pipeline
//!
//! End-to-end batch: load or build the oracle, ingest modern records,
//! resolve every entry against the oracle and write one enriched JSON line
//! per entry.
//!
//! Only configuration failures are fatal (no corpus, no readable source,
//! unwritable output). Skipped volumes, malformed lines and unresolved
//! entries are counted in the [`PipelineSummary`].

use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use super::entry::ModernEntry;
use super::error::IngestError;
use super::hybrid::{HybridIngestor, IngestReport};
use crate::config::AppConfig;
use crate::core::etymology::{
    Confidence, LemmatizerError, ResolutionResult, ResolutionStep, Resolver, TableLemmatizer,
    TimeoutLemmatizer,
};
use crate::core::lexicon::paths::ensure_parent_dir;
use crate::core::lexicon::{
    gallery, load_or_build, Abbreviations, BuildReport, IndexBuilder, IndexOrigin, LexicalKey,
    LexiconError, Oracle, OracleIndex,
};
use crate::core::logging::ProgressManager;

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Lexicon(#[from] LexiconError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Lemmatizer setup failed: {0}")]
    Lemmatizer(#[from] LemmatizerError),

    #[error("No ingestion sources configured")]
    NoSources,

    #[error("Cannot write output {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

// ============================================================================
// Output Types
// ============================================================================

/// One line of the enriched output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub lemma: String,
    pub pos: String,
    pub key: Option<LexicalKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headwords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aorist: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub glosses: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
    pub confidence: Confidence,
    pub path: Vec<ResolutionStep>,
}

impl EnrichedRecord {
    /// Join a resolution with the dictionary entry it points at.
    pub fn new(
        entry: &ModernEntry,
        result: ResolutionResult,
        oracle: &impl Oracle,
        abbreviations: &Abbreviations,
        gallery_size: usize,
    ) -> Self {
        let found = result.key.as_ref().and_then(|key| oracle.lookup(key));

        let gallery = found
            .map(|e| gallery::render(e, abbreviations, gallery_size))
            .filter(|g| !g.is_empty());

        Self {
            lemma: entry.lemma.clone(),
            pos: entry.pos.clone(),
            headwords: found.map(|e| e.headwords.clone()).unwrap_or_default(),
            definition: found.and_then(|e| e.primary_definition()).map(str::to_string),
            aorist: found.and_then(|e| e.aorists.first().cloned()),
            gallery,
            glosses: entry.glosses.clone(),
            synonyms: entry.synonyms.clone(),
            key: result.key,
            confidence: result.confidence,
            path: result.path,
        }
    }
}

/// Batch outcome shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSummary {
    pub entries: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub by_confidence: BTreeMap<Confidence, usize>,
    pub index_origin: IndexOrigin,
    pub keys_indexed: usize,
    pub volumes_skipped: usize,
    pub skipped_volumes: Vec<String>,
    pub malformed_lines: usize,
    pub output_path: PathBuf,
}

impl PipelineSummary {
    /// Multi-line text for a summary panel.
    pub fn render(&self) -> String {
        let origin = match self.index_origin {
            IndexOrigin::Snapshot => "snapshot",
            IndexOrigin::Rebuilt => "rebuilt",
        };
        let mut lines = vec![
            format!("Oracle keys:      {} ({})", self.keys_indexed, origin),
            format!("Entries:          {}", self.entries),
            format!("Resolved:         {}", self.resolved),
            format!("Unresolved:       {}", self.unresolved),
        ];
        for (confidence, count) in &self.by_confidence {
            lines.push(format!("  {:<22}{}", confidence.as_str(), count));
        }
        if self.volumes_skipped > 0 {
            lines.push(format!(
                "Skipped volumes:  {} ({})",
                self.volumes_skipped,
                self.skipped_volumes.join(", ")
            ));
        }
        if self.malformed_lines > 0 {
            lines.push(format!("Malformed lines:  {}", self.malformed_lines));
        }
        lines.push(format!("Output:           {}", self.output_path.display()));
        lines.join("\n")
    }
}

// ============================================================================
// Pipeline
// ============================================================================

pub struct EnrichmentPipeline {
    config: AppConfig,
    progress: Option<ProgressManager>,
}

impl EnrichmentPipeline {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            config: config.clone(),
            progress: None,
        }
    }

    /// Show progress bars for volume parsing and resolution.
    pub fn with_progress(mut self, mut progress: ProgressManager) -> Self {
        progress.set_total(3, "Enrichment");
        self.progress = Some(progress);
        self
    }

    pub fn run(&self) -> PipelineResult<PipelineSummary> {
        if self.config.ingest.sources.is_empty() {
            return Err(PipelineError::NoSources);
        }

        let (oracle, origin, build) = self.load_oracle()?;
        self.advance();

        let abbreviations = match self.config.abbreviations_path() {
            Some(path) => Abbreviations::load(&path)?,
            None => Abbreviations::default(),
        };
        log::info!("Loaded {} abbreviations", abbreviations.len());

        let (entries, ingest_report) = self.ingest()?;
        log::info!("Ingested {} entries", entries.len());
        self.advance();

        let records = self.resolve(&oracle, &entries, &abbreviations)?;
        self.advance();

        let output_path = self.config.output_path();
        write_records(&output_path, &records)?;
        log::info!("Wrote {} records to {}", records.len(), output_path.display());
        if let Some(progress) = &self.progress {
            progress.finish("Enrichment complete");
        }

        let mut by_confidence = BTreeMap::new();
        for record in &records {
            *by_confidence.entry(record.confidence).or_insert(0) += 1;
        }
        let unresolved = by_confidence.get(&Confidence::Unresolved).copied().unwrap_or(0);

        Ok(PipelineSummary {
            entries: records.len(),
            resolved: records.len() - unresolved,
            unresolved,
            by_confidence,
            index_origin: origin,
            keys_indexed: oracle.len(),
            volumes_skipped: build.volumes_skipped,
            skipped_volumes: build.skipped_volumes,
            malformed_lines: ingest_report.malformed_lines,
            output_path,
        })
    }

    fn advance(&self) {
        if let Some(progress) = &self.progress {
            progress.inc_overall();
        }
    }

    fn load_oracle(&self) -> PipelineResult<(OracleIndex, IndexOrigin, BuildReport)> {
        let oracle = &self.config.oracle;
        let mut builder = IndexBuilder::new(oracle);
        if let Some(progress) = &self.progress {
            builder = builder.with_progress(progress.add_task("Volumes", 0));
        }

        let corpus_dir = self.config.corpus_dir();
        let snapshot_path = self.config.snapshot_path();
        log::info!("Oracle corpus: {}", corpus_dir.display());

        let (snapshot, origin) =
            load_or_build(&corpus_dir, &snapshot_path, &builder, oracle.force_rebuild)?;
        match origin {
            IndexOrigin::Snapshot => log::info!("Loaded snapshot {}", snapshot_path.display()),
            IndexOrigin::Rebuilt => log::info!(
                "Built {} keys, saved to {}",
                snapshot.entries.len(),
                snapshot_path.display()
            ),
        }
        Ok((snapshot.entries, origin, snapshot.report))
    }

    fn ingest(&self) -> PipelineResult<(Vec<ModernEntry>, IngestReport)> {
        let config = &self.config.ingest;
        let mut ingestor = HybridIngestor::new(config);
        if let Some(path) = &config.targets_path {
            ingestor = ingestor.with_targets(HybridIngestor::load_targets(path)?);
        }
        for source in &config.sources {
            ingestor.ingest_file(source)?;
        }
        for source in &config.gloss_sources {
            ingestor.ingest_gloss_file(source)?;
        }
        Ok(ingestor.finish())
    }

    fn resolve(
        &self,
        oracle: &OracleIndex,
        entries: &[ModernEntry],
        abbreviations: &Abbreviations,
    ) -> PipelineResult<Vec<EnrichedRecord>> {
        let mut resolver =
            Resolver::new(oracle, &self.config.resolver).with_modern_entries(entries);

        let lemmatizer = &self.config.lemmatizer;
        if let Some(path) = &lemmatizer.table_path {
            let table = TableLemmatizer::load(&self.config.resolver.language, path)?;
            log::info!("Lemmatizer table: {} forms", table.len());
            resolver = if lemmatizer.timeout_ms > 0 {
                let timeout = Duration::from_millis(lemmatizer.timeout_ms);
                resolver.with_lemmatizer(TimeoutLemmatizer::new(table, timeout))
            } else {
                resolver.with_lemmatizer(table)
            };
        }

        let spinner = self
            .progress
            .as_ref()
            .map(|p| p.add_spinner(&format!("Resolving {} entries", entries.len())));

        let results = resolver.resolve_all(entries);

        if let Some(spinner) = spinner {
            spinner.finish_with_message("Resolution complete");
        }

        let gallery_size = self.config.oracle.gallery_size;
        Ok(entries
            .iter()
            .zip(results)
            .map(|(entry, result)| {
                EnrichedRecord::new(entry, result, oracle, abbreviations, gallery_size)
            })
            .collect())
    }
}

/// Write records as JSON lines, replacing `path` only once everything is
/// written.
pub fn write_records(path: &Path, records: &[EnrichedRecord]) -> PipelineResult<()> {
    let output_err = |source| PipelineError::Output {
        path: path.to_path_buf(),
        source,
    };

    ensure_parent_dir(path).map_err(output_err)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let tmp = NamedTempFile::new_in(dir).map_err(output_err)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        for record in records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n").map_err(output_err)?;
        }
        writer.flush().map_err(output_err)?;
    }
    tmp.as_file().sync_all().map_err(output_err)?;
    tmp.persist(path).map_err(|e| output_err(e.error))?;
    Ok(())
}
