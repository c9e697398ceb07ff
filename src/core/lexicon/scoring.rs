//! Citation Scoring
//!
//! Ranks citations by the prestige of the cited author and by whether an
//! English translation accompanies the quotation.

use serde::{Deserialize, Serialize};

use super::config::TierConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorTier {
    Top,
    Philosopher,
    Historian,
    Standard,
    /// Inscriptions, scholia and similar; never kept.
    Noise,
}

impl AuthorTier {
    /// Authors whose bare references are trusted as implicit citations of
    /// the headword itself.
    pub fn is_canonical(&self) -> bool {
        matches!(self, AuthorTier::Top | AuthorTier::Philosopher)
    }
}

/// Classifies bibliographic references into tiers and scores citations.
#[derive(Debug, Clone)]
pub struct CitationScorer {
    tiers: TierConfig,
}

impl CitationScorer {
    pub fn new(tiers: TierConfig) -> Self {
        Self { tiers }
    }

    /// Tier of the author named in a bibliographic reference.
    ///
    /// Noise is checked first, then tiers from most to least prestigious.
    pub fn tier(&self, bibliography: &str) -> AuthorTier {
        let tokens = reference_tokens(bibliography);
        let hit = |list: &[String]| {
            list.iter()
                .any(|abbrev| tokens.iter().any(|t| t.starts_with(abbrev.as_str())))
        };

        if hit(&self.tiers.noise) {
            AuthorTier::Noise
        } else if hit(&self.tiers.top) {
            AuthorTier::Top
        } else if hit(&self.tiers.philosophers) {
            AuthorTier::Philosopher
        } else if hit(&self.tiers.historians) {
            AuthorTier::Historian
        } else {
            AuthorTier::Standard
        }
    }

    pub fn score(&self, tier: AuthorTier, has_translation: bool) -> u32 {
        let w = &self.tiers.weights;
        let base = match tier {
            AuthorTier::Top => w.top,
            AuthorTier::Philosopher => w.philosopher,
            AuthorTier::Historian => w.historian,
            AuthorTier::Standard | AuthorTier::Noise => w.standard,
        };
        if has_translation {
            base + w.translation_bonus
        } else {
            base
        }
    }
}

fn reference_tokens(bibliography: &str) -> Vec<&str> {
    bibliography
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '(' | ')'))
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn scorer() -> CitationScorer {
        CitationScorer::new(TierConfig::default())
    }

    #[rstest]
    #[case("Il. 5.3", AuthorTier::Top)]
    #[case("S. OT 12", AuthorTier::Top)]
    #[case("Pl. R. 332a", AuthorTier::Philosopher)]
    #[case("(Arist. Pol. 1253a)", AuthorTier::Philosopher)]
    #[case("Hdt. 1.1", AuthorTier::Historian)]
    #[case("Luc. Tim. 3", AuthorTier::Standard)]
    #[case("IG 1.2", AuthorTier::Noise)]
    #[case("Schol. Ar. Nu. 3", AuthorTier::Noise)]
    #[case("Schol. Il. 1.1", AuthorTier::Noise)]
    #[case("", AuthorTier::Standard)]
    fn test_tier_classification(#[case] bibl: &str, #[case] expected: AuthorTier) {
        assert_eq!(scorer().tier(bibl), expected);
    }

    #[test]
    fn test_score_weights() {
        let s = scorer();
        assert_eq!(s.score(AuthorTier::Top, false), 60);
        assert_eq!(s.score(AuthorTier::Top, true), 110);
        assert_eq!(s.score(AuthorTier::Philosopher, false), 30);
        assert_eq!(s.score(AuthorTier::Historian, true), 60);
        assert_eq!(s.score(AuthorTier::Standard, false), 0);
        assert_eq!(s.score(AuthorTier::Standard, true), 50);
    }

    #[test]
    fn test_canonical_tiers() {
        assert!(AuthorTier::Top.is_canonical());
        assert!(AuthorTier::Philosopher.is_canonical());
        assert!(!AuthorTier::Historian.is_canonical());
    }
}
