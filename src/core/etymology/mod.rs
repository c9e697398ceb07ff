//! Etymology Resolution
//!
//! Links Modern Greek lemmas to their Ancient Greek ancestors in the
//! lexicon oracle through a fixed chain of strategies.

pub mod config;
pub mod lemmatizer;
pub mod resolver;
pub mod rules;

pub use config::{LemmatizerConfig, ResolverConfig};
pub use lemmatizer::{Lemmatizer, LemmatizerError, LemmatizerResult, TableLemmatizer, TimeoutLemmatizer};
pub use resolver::{Confidence, ResolutionResult, ResolutionStep, Resolver};
pub use rules::{MorphemePosition, PhoneticRule, RuleAnchor};
