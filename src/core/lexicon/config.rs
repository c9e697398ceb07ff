//! Oracle Configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Oracle index build and snapshot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Directory holding the dictionary volumes (`*.xml`). Resolved through
    /// [`super::paths`] when unset.
    pub corpus_dir: Option<PathBuf>,
    /// Snapshot location. Defaults to the user data directory.
    pub snapshot_path: Option<PathBuf>,
    /// Optional JSON map of bibliographic abbreviations to full names.
    pub abbreviations_path: Option<PathBuf>,
    /// Element that holds one dictionary entry.
    pub entry_tag: String,
    /// Element that holds one sense of an entry.
    pub sense_tag: String,
    /// How many siblings the citation scan looks past a quotation.
    pub scan_window: usize,
    /// Citations shown in a rendered gallery.
    pub gallery_size: usize,
    /// Rebuild even when the snapshot fingerprint matches the corpus.
    pub force_rebuild: bool,
    pub tiers: TierConfig,
}

/// Author prestige tiers used by citation scoring.
///
/// Members are bibliographic abbreviations as they appear at the start of a
/// reference (`Il.5.3`, `Pl.R.332a`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    /// Poets and dramatists
    pub top: Vec<String>,
    pub philosophers: Vec<String>,
    pub historians: Vec<String>,
    /// Inscriptions and scholia; citations from these are discarded.
    pub noise: Vec<String>,
    pub weights: TierWeights,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierWeights {
    pub top: u32,
    pub philosopher: u32,
    pub historian: u32,
    pub standard: u32,
    pub translation_bonus: u32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            corpus_dir: None,
            snapshot_path: None,
            abbreviations_path: None,
            entry_tag: "entryFree".to_string(),
            sense_tag: "sense".to_string(),
            scan_window: 5,
            gallery_size: 3,
            force_rebuild: false,
            tiers: TierConfig::default(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            top: strings(&[
                "Soph.", "S.", "Aesch.", "A.", "Eur.", "E.", "Hom.", "Il.", "Od.", "Pind.", "Pi.",
                "Hes.",
            ]),
            philosophers: strings(&["Pl.", "Arist.", "X."]),
            historians: strings(&["Hdt.", "Th.", "D.H.", "Plb."]),
            noise: strings(&["IG", "Schol."]),
            weights: TierWeights::default(),
        }
    }
}

impl Default for TierWeights {
    fn default() -> Self {
        Self {
            top: 60,
            philosopher: 30,
            historian: 10,
            standard: 0,
            translation_bonus: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let w = TierWeights::default();
        assert_eq!((w.top, w.philosopher, w.historian, w.translation_bonus), (60, 30, 10, 50));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: OracleConfig = toml::from_str(
            r#"
            scan_window = 3
            [tiers]
            historians = ["Hdt."]
            "#,
        )
        .unwrap();
        assert_eq!(config.scan_window, 3);
        assert_eq!(config.entry_tag, "entryFree");
        assert_eq!(config.tiers.historians, vec!["Hdt.".to_string()]);
        assert!(config.tiers.top.contains(&"Il.".to_string()));
        assert_eq!(config.tiers.weights.top, 60);
    }
}
