//! Modern Lexicon Ingestion
//!
//! Turns JSONL dumps of Modern Greek records into deduplicated
//! [`ModernEntry`] values and drives the enrichment batch.

pub mod config;
pub mod entry;
pub mod error;
pub mod hybrid;
pub mod pipeline;

pub use config::IngestConfig;
pub use entry::{ModernEntry, ParadigmForm};
pub use error::{IngestError, IngestResult};
pub use hybrid::{HybridIngestor, IngestReport, LineOutcome};
pub use pipeline::{
    EnrichedRecord, EnrichmentPipeline, PipelineError, PipelineResult, PipelineSummary,
};
