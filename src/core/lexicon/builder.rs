//! Oracle Index Builder
//!
//! Parses dictionary volumes into entries and folds them into an
//! [`OracleIndex`]. Volumes are parsed in parallel; merging happens in
//! sorted volume order so the result does not depend on scheduling.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use super::config::OracleConfig;
use super::error::{LexiconError, LexiconResult};
use super::extract::EntryExtractor;
use super::index::{DictionaryEntry, OracleIndex};
use super::markup::parse_document;

/// Counters for one index build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub volumes_parsed: usize,
    pub volumes_skipped: usize,
    /// Names of volumes that failed to parse
    #[serde(default)]
    pub skipped_volumes: Vec<String>,
    pub entries_extracted: usize,
    pub entries_skipped: usize,
    /// Entries folded into an existing key
    pub homonyms_merged: usize,
    pub keys_indexed: usize,
    pub citations: usize,
}

/// One in-memory dictionary volume.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub name: String,
    pub xml: String,
}

impl RawDocument {
    pub fn new(name: impl Into<String>, xml: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            xml: xml.into(),
        }
    }
}

/// Entries extracted from one volume.
#[derive(Debug, Default)]
pub struct VolumeExtraction {
    pub entries: Vec<DictionaryEntry>,
    pub skipped: usize,
}

/// The set of volumes found under a corpus directory, sorted by path.
#[derive(Debug, Clone)]
pub struct Corpus {
    root: PathBuf,
    volumes: Vec<PathBuf>,
}

impl Corpus {
    /// Find every `*.xml` volume below `dir`.
    ///
    /// A missing or unreadable directory, or one without volumes, is
    /// [`LexiconError::CorpusUnavailable`].
    pub fn discover(dir: &Path) -> LexiconResult<Self> {
        let unavailable = |reason: String| LexiconError::CorpusUnavailable {
            path: dir.to_path_buf(),
            reason,
        };

        if !dir.is_dir() {
            return Err(unavailable("not a directory".to_string()));
        }

        let mut volumes = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(unavailable(e.to_string())),
                Err(e) => {
                    log::warn!("Skipping unreadable corpus path: {}", e);
                    continue;
                }
            };
            let is_xml = entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
            if entry.file_type().is_file() && is_xml {
                volumes.push(entry.into_path());
            }
        }

        if volumes.is_empty() {
            return Err(unavailable("no *.xml volumes found".to_string()));
        }
        volumes.sort();

        log::info!("Found {} dictionary volumes in {}", volumes.len(), dir.display());
        Ok(Self {
            root: dir.to_path_buf(),
            volumes,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn volumes(&self) -> &[PathBuf] {
        &self.volumes
    }

    /// Volume name relative to the corpus root.
    pub fn volume_name(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }

    /// BLAKE3 digest over every volume's relative name and contents.
    pub fn fingerprint(&self) -> LexiconResult<String> {
        let mut hasher = blake3::Hasher::new();
        for path in &self.volumes {
            let name = self.volume_name(path);
            hasher.update(&(name.len() as u64).to_le_bytes());
            hasher.update(name.as_bytes());

            let mut file = File::open(path)?;
            let size = file.metadata()?.len();
            hasher.update(&size.to_le_bytes());
            io::copy(&mut file, &mut hasher)?;
        }
        Ok(hasher.finalize().to_hex().to_string())
    }
}

pub struct IndexBuilder {
    extractor: EntryExtractor,
    entry_tag: String,
    progress: Option<ProgressBar>,
}

impl IndexBuilder {
    pub fn new(config: &OracleConfig) -> Self {
        Self {
            extractor: EntryExtractor::new(config),
            entry_tag: config.entry_tag.clone(),
            progress: None,
        }
    }

    /// Tick `progress` once per finished volume.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Extract every entry of one volume. Entries that yield nothing are
    /// counted, not reported.
    pub fn extract_volume(&self, xml: &str) -> LexiconResult<VolumeExtraction> {
        let document = parse_document(xml)?;
        let mut out = VolumeExtraction::default();
        for node in document.find_all(&self.entry_tag) {
            match self.extractor.extract(node) {
                Ok(entry) => out.entries.push(entry),
                Err(reason) => {
                    log::trace!("Skipped entry {:?}: {:?}", node.key, reason);
                    out.skipped += 1;
                }
            }
        }
        Ok(out)
    }

    /// Build from in-memory documents, merging in the order given.
    pub fn build(&self, documents: impl IntoIterator<Item = RawDocument>) -> (OracleIndex, BuildReport) {
        let mut index = OracleIndex::new();
        let mut report = BuildReport::default();
        for document in documents {
            let result = self.extract_volume(&document.xml);
            self.absorb(&mut index, &mut report, &document.name, result);
        }
        self.finish(&index, &mut report);
        (index, report)
    }

    /// Build from every volume of a corpus.
    ///
    /// Volumes are read and parsed on the rayon pool; a volume that cannot
    /// be read or parsed is logged and skipped.
    pub fn build_corpus(&self, corpus: &Corpus) -> (OracleIndex, BuildReport) {
        if let Some(pb) = &self.progress {
            pb.set_length(corpus.volumes().len() as u64);
        }

        let extracted: Vec<(String, LexiconResult<VolumeExtraction>)> = corpus
            .volumes()
            .par_iter()
            .map(|path| {
                let name = corpus.volume_name(path);
                let result = fs::read_to_string(path)
                    .map_err(LexiconError::from)
                    .and_then(|xml| self.extract_volume(&xml));
                if let Some(pb) = &self.progress {
                    pb.inc(1);
                }
                (name, result)
            })
            .collect();

        let mut index = OracleIndex::new();
        let mut report = BuildReport::default();
        for (name, result) in extracted {
            self.absorb(&mut index, &mut report, &name, result);
        }
        self.finish(&index, &mut report);

        if let Some(pb) = &self.progress {
            pb.finish_with_message(format!("{} keys indexed", report.keys_indexed));
        }
        (index, report)
    }

    fn absorb(
        &self,
        index: &mut OracleIndex,
        report: &mut BuildReport,
        name: &str,
        result: LexiconResult<VolumeExtraction>,
    ) {
        match result {
            Ok(volume) => {
                report.volumes_parsed += 1;
                report.entries_skipped += volume.skipped;
                report.entries_extracted += volume.entries.len();
                for entry in volume.entries {
                    if index.insert(entry) {
                        report.homonyms_merged += 1;
                    }
                }
                log::debug!("Processed {}", name);
            }
            Err(e) => {
                log::error!("Skipping volume {}: {}", name, e);
                report.volumes_skipped += 1;
                report.skipped_volumes.push(name.to_string());
            }
        }
    }

    fn finish(&self, index: &OracleIndex, report: &mut BuildReport) {
        report.keys_indexed = index.len();
        report.citations = index.citation_count();
        log::info!(
            "Indexed {} keys from {} volumes ({} skipped), {} citations",
            report.keys_indexed,
            report.volumes_parsed,
            report.volumes_skipped,
            report.citations
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lexicon::canon::LexicalKey;

    const VOLUME_A: &str = r#"<TEI.2><text><body>
        <entryFree key="lo/gos1"><sense><tr>word</tr>
          <cit><quote>lo/gon</quote><tr>a word</tr><bibl>Il. 1.1</bibl></cit></sense></entryFree>
        <entryFree key="12"><sense><tr>nothing</tr></sense></entryFree>
        </body></text></TEI.2>"#;

    const VOLUME_B: &str = r#"<TEI.2><text><body>
        <entryFree key="lo/gos2"><sense><tr>reckoning</tr></sense></entryFree>
        </body></text></TEI.2>"#;

    fn builder() -> IndexBuilder {
        IndexBuilder::new(&OracleConfig::default())
    }

    #[test]
    fn test_build_merges_homonyms_across_volumes() {
        let (index, report) = builder().build(vec![
            RawDocument::new("a.xml", VOLUME_A),
            RawDocument::new("b.xml", VOLUME_B),
        ]);
        assert_eq!(index.len(), 1);
        let entry = index.get(&LexicalKey::derive("λόγος")).unwrap();
        assert_eq!(entry.definitions, vec!["word", "reckoning"]);
        assert_eq!(report.volumes_parsed, 2);
        assert_eq!(report.entries_extracted, 2);
        assert_eq!(report.entries_skipped, 1);
        assert_eq!(report.homonyms_merged, 1);
        assert_eq!(report.citations, 1);
    }

    #[test]
    fn test_malformed_volume_is_skipped() {
        let (index, report) = builder().build(vec![
            RawDocument::new("broken.xml", "<entryFree key='a'><sense>"),
            RawDocument::new("b.xml", VOLUME_B),
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(report.volumes_skipped, 1);
        assert_eq!(report.skipped_volumes, vec!["broken.xml".to_string()]);
    }

    #[test]
    fn test_corpus_discovery_and_parallel_build() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.xml"), VOLUME_B).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("a.xml"), VOLUME_A).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let corpus = Corpus::discover(dir.path()).unwrap();
        assert_eq!(corpus.volumes().len(), 2);

        let (index, report) = builder().build_corpus(&corpus);
        let (sequential, _) = builder().build(vec![
            RawDocument::new("b.xml", VOLUME_B),
            RawDocument::new("nested/a.xml", VOLUME_A),
        ]);
        assert_eq!(index, sequential);
        assert_eq!(report.volumes_parsed, 2);
    }

    #[test]
    fn test_missing_or_empty_corpus_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Corpus::discover(&dir.path().join("missing")),
            Err(LexiconError::CorpusUnavailable { .. })
        ));
        assert!(matches!(
            Corpus::discover(dir.path()),
            Err(LexiconError::CorpusUnavailable { .. })
        ));
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let dir = tempfile::tempdir().unwrap();
        let volume = dir.path().join("a.xml");
        fs::write(&volume, VOLUME_A).unwrap();
        let first = Corpus::discover(dir.path()).unwrap().fingerprint().unwrap();
        let again = Corpus::discover(dir.path()).unwrap().fingerprint().unwrap();
        assert_eq!(first, again);

        fs::write(&volume, VOLUME_B).unwrap();
        let changed = Corpus::discover(dir.path()).unwrap().fingerprint().unwrap();
        assert_ne!(first, changed);
    }

    #[test]
    fn test_single_translated_top_tier_citation() {
        let (index, _) = builder().build(vec![RawDocument::new(
            "k.xml",
            r#"<body><entryFree key="k"><sense>
               <cit><quote>X</quote><tr>Y</tr><bibl>Il. 1.1</bibl></cit></sense></entryFree></body>"#,
        )]);
        let entry = index.get(&LexicalKey::derive("k")).unwrap();
        assert_eq!(entry.citations.len(), 1);
        assert_eq!(entry.citations[0].translation.as_deref(), Some("Y"));
        assert_eq!(entry.score, 110);
    }

    #[test]
    fn test_historian_and_philosopher_merge() {
        let (index, report) = builder().build(vec![
            RawDocument::new(
                "a.xml",
                r#"<body><entryFree key="k"><sense><foreign>a</foreign> <bibl>Hdt. 1.1</bibl></sense></entryFree></body>"#,
            ),
            RawDocument::new(
                "b.xml",
                r#"<body><entryFree key="k1"><sense><foreign>b</foreign> <bibl>Pl. R. 1</bibl></sense></entryFree></body>"#,
            ),
        ]);
        let entry = index.get(&LexicalKey::derive("k")).unwrap();
        assert_eq!(report.homonyms_merged, 1);
        assert_eq!(entry.score, 40);
        let authors: Vec<_> = entry.citations.iter().map(|c| c.author.as_str()).collect();
        assert_eq!(authors, vec!["Pl. R. 1", "Hdt. 1.1"]);
    }
}
