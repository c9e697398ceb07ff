//! Index Snapshot Persistence
//!
//! A snapshot is one JSON document holding the built index together with
//! the corpus fingerprint it was built from. Writes go to a temporary file
//! next to the target and are renamed into place, so an interrupted or
//! failed build never replaces a good snapshot.

use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::builder::{BuildReport, Corpus, IndexBuilder};
use super::error::{LexiconError, LexiconResult};
use super::index::OracleIndex;
use super::paths::ensure_parent_dir;

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleSnapshot {
    pub format_version: u32,
    pub built_at: DateTime<Utc>,
    #[serde(default)]
    pub corpus_fingerprint: Option<String>,
    #[serde(default)]
    pub report: BuildReport,
    pub entries: OracleIndex,
}

/// Where a loaded index came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexOrigin {
    Snapshot,
    Rebuilt,
}

impl OracleSnapshot {
    pub fn new(entries: OracleIndex, report: BuildReport, corpus_fingerprint: Option<String>) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            built_at: Utc::now(),
            corpus_fingerprint,
            report,
            entries,
        }
    }

    /// Atomically write the snapshot to `path`.
    pub fn save(&self, path: &Path) -> LexiconResult<()> {
        ensure_parent_dir(path)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer(&mut writer, self)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(path)
            .map_err(|e| LexiconError::Snapshot(format!("failed to persist {}: {}", path.display(), e)))?;

        log::info!("Saved index snapshot ({} keys) to {}", self.entries.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> LexiconResult<Self> {
        let file = fs::File::open(path)?;
        let snapshot: Self = serde_json::from_reader(BufReader::new(file))?;
        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(LexiconError::SnapshotVersion {
                found: snapshot.format_version,
                expected: SNAPSHOT_FORMAT_VERSION,
            });
        }
        log::info!(
            "Loaded index snapshot ({} keys, built {}) from {}",
            snapshot.entries.len(),
            snapshot.built_at.to_rfc3339(),
            path.display()
        );
        Ok(snapshot)
    }
}

/// Reuse the snapshot at `snapshot_path` when it was built from the same
/// corpus, otherwise rebuild and save.
///
/// The corpus is discovered first, so an unavailable corpus fails before
/// anything is written. An unreadable or outdated snapshot is rebuilt.
pub fn load_or_build(
    corpus_dir: &Path,
    snapshot_path: &Path,
    builder: &IndexBuilder,
    force_rebuild: bool,
) -> LexiconResult<(OracleSnapshot, IndexOrigin)> {
    let corpus = Corpus::discover(corpus_dir)?;
    let fingerprint = corpus.fingerprint()?;

    if !force_rebuild && snapshot_path.exists() {
        match OracleSnapshot::load(snapshot_path) {
            Ok(snapshot) if snapshot.corpus_fingerprint.as_deref() == Some(fingerprint.as_str()) => {
                return Ok((snapshot, IndexOrigin::Snapshot));
            }
            Ok(_) => log::info!("Corpus changed since last snapshot; rebuilding"),
            Err(e) => log::warn!("Ignoring unusable snapshot {}: {}", snapshot_path.display(), e),
        }
    }

    let (index, report) = builder.build_corpus(&corpus);
    let snapshot = OracleSnapshot::new(index, report, Some(fingerprint));
    snapshot.save(snapshot_path)?;
    Ok((snapshot, IndexOrigin::Rebuilt))
}
