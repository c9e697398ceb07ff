//! Ancient Greek Lexicon Oracle
//!
//! Builds a canonical-key index over the LSJ dictionary corpus:
//!
//! - **canon**: fuzzy lookup keys
//! - **translit**: Beta Code and Greek script conversion
//! - **markup**: typed document tree over the TEI volumes
//! - **extract** / **scoring**: definitions and ranked citations per entry
//! - **builder** / **snapshot**: corpus build and persisted snapshots
//! - **oracle**: read-only lookup service

pub mod builder;
pub mod canon;
pub mod config;
pub mod error;
pub mod extract;
pub mod gallery;
pub mod index;
pub mod markup;
pub mod oracle;
pub mod paths;
pub mod scoring;
pub mod snapshot;
pub mod translit;

pub use builder::{BuildReport, Corpus, IndexBuilder, RawDocument};
pub use canon::{canonicalize, LexicalKey};
pub use config::{OracleConfig, TierConfig, TierWeights};
pub use error::{LexiconError, LexiconResult};
pub use gallery::Abbreviations;
pub use index::{Citation, DictionaryEntry, OracleIndex};
pub use oracle::{suggest, Oracle};
pub use scoring::{AuthorTier, CitationScorer};
pub use snapshot::{load_or_build, IndexOrigin, OracleSnapshot};
pub use translit::{to_flat, to_native};
