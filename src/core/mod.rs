pub mod logging;

// LSJ index: canonical keys, corpus extraction, snapshots, lookup
pub mod lexicon;

// Modern -> Ancient resolution strategies
pub mod etymology;

// Modern record ingestion and the enrichment batch
pub mod ingest;
