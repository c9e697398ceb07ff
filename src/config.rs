use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::etymology::{LemmatizerConfig, ResolverConfig};
use crate::core::ingest::IngestConfig;
use crate::core::lexicon::paths::{
    self, ABBREVIATIONS_FILENAME, CORPUS_DIRNAME, SNAPSHOT_FILENAME,
};
use crate::core::lexicon::OracleConfig;

const OUTPUT_FILENAME: &str = "enriched_lexicon.jsonl";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub oracle: OracleConfig,
    pub resolver: ResolverConfig,
    pub ingest: IngestConfig,
    pub lemmatizer: LemmatizerConfig,
}

/// Data directory configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Override the default data directory. Unset paths in other sections
    /// resolve beneath it.
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from `~/.config/etymon/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &std::path::Path) -> Self {
        match std::fs::read_to_string(config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse config at {}: {e}; using defaults",
                        config_path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!(
                    "No config file at {}; using defaults",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    /// Resolved data directory (override or XDG default).
    pub fn data_dir(&self) -> PathBuf {
        self.data
            .data_dir
            .clone()
            .or_else(paths::get_user_data_dir)
            .unwrap_or_else(|| PathBuf::from("data"))
    }

    pub fn corpus_dir(&self) -> PathBuf {
        match (&self.oracle.corpus_dir, &self.data.data_dir) {
            (Some(dir), _) => dir.clone(),
            (None, Some(data)) => data.join(CORPUS_DIRNAME),
            (None, None) => paths::resolve_corpus_dir(None),
        }
    }

    pub fn snapshot_path(&self) -> PathBuf {
        match (&self.oracle.snapshot_path, &self.data.data_dir) {
            (Some(path), _) => path.clone(),
            (None, Some(data)) => data.join(SNAPSHOT_FILENAME),
            (None, None) => paths::resolve_snapshot_path(None),
        }
    }

    pub fn abbreviations_path(&self) -> Option<PathBuf> {
        match (&self.oracle.abbreviations_path, &self.data.data_dir) {
            (Some(path), _) => Some(path.clone()),
            (None, Some(data)) => Some(data.join(ABBREVIATIONS_FILENAME)).filter(|p| p.exists()),
            (None, None) => paths::resolve_abbreviations_path(None),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.ingest
            .output_path
            .clone()
            .unwrap_or_else(|| self.data_dir().join(OUTPUT_FILENAME))
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("etymon").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.data.data_dir.is_none());
        assert_eq!(config.oracle.entry_tag, "entryFree");
        assert_eq!(config.resolver.max_depth, 3);
        assert_eq!(config.ingest.language_code, "el");
        assert!(config.lemmatizer.table_path.is_none());
    }

    #[test]
    fn test_config_load_missing_file() {
        // Should return defaults without panicking
        let config = AppConfig::load_from(std::path::Path::new("/nonexistent/etymon.toml"));
        assert_eq!(config.oracle.gallery_size, 3);
    }

    #[test]
    fn test_config_load_unparseable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "oracle = [not toml").unwrap();
        let config = AppConfig::load_from(&path);
        assert_eq!(config.oracle.scan_window, 5);
    }

    #[test]
    fn test_partial_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[ingest]
sources = ["kaikki.jsonl"]
gloss_sources = ["kaikki-en.jsonl"]

[resolver]
blacklist = ["ὁ"]
"#,
        )
        .unwrap();
        let config = AppConfig::load_from(&path);
        assert_eq!(config.ingest.sources, vec![PathBuf::from("kaikki.jsonl")]);
        assert_eq!(config.ingest.gloss_sources, vec![PathBuf::from("kaikki-en.jsonl")]);
        assert_eq!(config.ingest.language_code, "el");
        assert_eq!(config.resolver.blacklist, vec!["ὁ"]);
        assert_eq!(config.resolver.min_residual, 3);
    }

    #[test]
    fn test_data_dir_override() {
        let mut config = AppConfig::default();
        config.data.data_dir = Some(PathBuf::from("/tmp/custom"));
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/custom"));
        assert_eq!(config.corpus_dir(), PathBuf::from("/tmp/custom/lsj_xml"));
        assert_eq!(config.snapshot_path(), PathBuf::from("/tmp/custom/lsj_index.json"));
        assert_eq!(config.output_path(), PathBuf::from("/tmp/custom/enriched_lexicon.jsonl"));
    }

    #[test]
    fn test_abbreviations_optional_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.data.data_dir = Some(dir.path().to_path_buf());
        assert_eq!(config.abbreviations_path(), None);

        std::fs::write(dir.path().join("abbreviations.json"), "{}").unwrap();
        assert_eq!(
            config.abbreviations_path(),
            Some(dir.path().join("abbreviations.json"))
        );
    }

    #[test]
    fn test_section_paths_win_over_data_dir() {
        let mut config = AppConfig::default();
        config.data.data_dir = Some(PathBuf::from("/tmp/custom"));
        config.oracle.corpus_dir = Some(PathBuf::from("/srv/lsj"));
        config.ingest.output_path = Some(PathBuf::from("out.jsonl"));
        assert_eq!(config.corpus_dir(), PathBuf::from("/srv/lsj"));
        assert_eq!(config.output_path(), PathBuf::from("out.jsonl"));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = AppConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.resolver.rules.len(), config.resolver.rules.len());
        assert_eq!(deserialized.oracle.tiers.weights, config.oracle.tiers.weights);
    }
}
