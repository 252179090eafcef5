mod bootstrap;

use std::sync::Arc;

use anyhow::Result;
use bankflow_core::config::Config;
use bankflow_core::settings::Settings;
use bankflow_data::adapter::AdapterRegistry;
use bankflow_data::sinks::{CsvReportWriter, LogAlertSink};
use bankflow_runtime::coordinator::PipelineCoordinator;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::parse();

    let mut config = Config::load(&settings.config)?;
    if let Some(input_dir) = settings.input_dir {
        config.paths.input_dir = input_dir;
    }
    if let Some(workers) = settings.workers {
        config.processing.parallel_workers = usize::from(workers);
    }

    let log_level = if settings.debug {
        "DEBUG"
    } else if settings.log_level != "INFO" {
        settings.log_level.as_str()
    } else {
        config.logging.level.as_str()
    };
    bootstrap::setup_logging(log_level)?;
    bootstrap::ensure_directories(&config)?;

    tracing::info!("bankflow v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "input: {}, workers: {}",
        config.paths.input_dir.display(),
        config.processing.parallel_workers
    );

    let report_sink = CsvReportWriter::new(config.paths.output_dir.clone());
    let coordinator = PipelineCoordinator::new(
        config,
        Arc::new(AdapterRegistry::builtin()),
        Box::new(report_sink),
        Box::new(LogAlertSink),
    )?;

    let summary = coordinator.run().await?;

    tracing::info!(
        "{} files processed, {} skipped, {} valid, {} invalid, {} anomalies",
        summary.files_processed,
        summary.files_skipped,
        summary.valid_count,
        summary.invalid_count,
        summary.anomaly_count
    );
    for file_error in &summary.per_file_errors {
        tracing::warn!(
            "incomplete: {} ({}); will retry next run",
            file_error.path.display(),
            file_error.message
        );
    }

    if summary.per_file_errors.is_empty() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
