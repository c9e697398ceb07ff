use std::path::PathBuf;

use etymon::config::AppConfig;
use etymon::core::ingest::{EnrichmentPipeline, PipelineError};
use etymon::core::lexicon::LexiconError;
use etymon::core::logging::{self, FatalError, ProgressManager};

fn main() -> miette::Result<()> {
    let _log_guard = logging::init();
    log::info!("Etymon v{} starting", etymon::VERSION);

    // Optional argument: path to a config file
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load_from(&PathBuf::from(path)),
        None => AppConfig::load(),
    };

    let pipeline = EnrichmentPipeline::new(&config).with_progress(ProgressManager::new());
    let summary = pipeline.run().map_err(|e| {
        log::error!("Enrichment failed: {}", e);
        miette::Report::new(diagnose(&e))
    })?;

    logging::print_panel("Enrichment Summary", &summary.render());
    if summary.volumes_skipped > 0 {
        logging::print_warning(&format!(
            "{} dictionary volumes could not be parsed",
            summary.volumes_skipped
        ));
    }
    if summary.unresolved > 0 {
        logging::print_info(&format!("{} entries left unresolved", summary.unresolved));
    }
    logging::print_success(&format!("Wrote {}", summary.output_path.display()));
    Ok(())
}

fn diagnose(err: &PipelineError) -> FatalError {
    let fatal = FatalError::new(err.to_string());
    match err {
        PipelineError::Lexicon(LexiconError::CorpusUnavailable { .. }) => fatal.with_help(format!(
            "Point oracle.corpus_dir in {} at the directory of LSJ XML volumes",
            AppConfig::config_path().display()
        )),
        PipelineError::NoSources => fatal.with_help(format!(
            "Add JSONL dumps to ingest.sources in {}",
            AppConfig::config_path().display()
        )),
        PipelineError::Ingest(_) => fatal.with_help("Check that every ingest source is readable"),
        PipelineError::Lemmatizer(_) => {
            fatal.with_help("Check lemmatizer.table_path or remove it to run without one")
        }
        PipelineError::Output { .. } => {
            fatal.with_help("Set ingest.output_path to a writable location")
        }
        _ => fatal,
    }
}
