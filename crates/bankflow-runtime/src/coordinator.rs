//! The pipeline coordinator: one batch run from directory scan to report.
//!
//! Run phases: Scanning (enumerate candidates, drop ledger entries),
//! Processing (consume dispatcher outcomes, validate, quarantine, ledger),
//! Aggregating (concatenate valid rows once the channel closes), Reporting
//! (categorize, detect anomalies, hand off to the sinks).
//!
//! Per-file failures never abort the run; a file that fails anywhere before
//! its ledger append is simply retried on the next run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bankflow_core::anomaly::{self, DEFAULT_THRESHOLD};
use bankflow_core::categorize::Categorizer;
use bankflow_core::config::Config;
use bankflow_core::error::Result;
use bankflow_core::masking::mask_default;
use bankflow_core::models::{CategorizedTransaction, RuleSet, Transaction};
use bankflow_core::rules;
use bankflow_data::adapter::AdapterRegistry;
use bankflow_data::ledger::RecoveryLedger;
use bankflow_data::sinks::{AlertSink, QuarantineWriter, ReportSink};
use tracing::{error, info, warn};

use crate::dispatcher::Dispatcher;

// ── Public types ──────────────────────────────────────────────────────────────

/// One file that could not be fully processed this run.
#[derive(Debug, Clone)]
pub struct FileError {
    pub path: PathBuf,
    pub message: String,
}

/// What one run did, for logging and exit-status decisions.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Files fully processed and appended to the ledger this run.
    pub files_processed: usize,
    /// Candidate files skipped because the ledger already listed them.
    pub files_skipped: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub anomaly_count: usize,
    /// Files excluded from the ledger by an error; retried next run.
    pub per_file_errors: Vec<FileError>,
}

// ── PipelineCoordinator ───────────────────────────────────────────────────────

/// Owns one run of the pipeline. Construct per run; holds no state between
/// runs besides what the ledger file persists.
pub struct PipelineCoordinator {
    config: Config,
    rules: RuleSet,
    categorizer: Categorizer,
    adapters: Arc<AdapterRegistry>,
    report_sink: Box<dyn ReportSink>,
    alert_sink: Box<dyn AlertSink>,
}

impl PipelineCoordinator {
    pub fn new(
        config: Config,
        adapters: Arc<AdapterRegistry>,
        report_sink: Box<dyn ReportSink>,
        alert_sink: Box<dyn AlertSink>,
    ) -> Result<Self> {
        let rules = config.rule_set();
        let categorizer = match config.keyword_table()? {
            Some(table) => Categorizer::new(&table),
            None => Categorizer::with_defaults(),
        };
        Ok(Self {
            config,
            rules,
            categorizer,
            adapters,
            report_sink,
            alert_sink,
        })
    }

    /// Execute one batch run.
    pub async fn run(&self) -> Result<RunSummary> {
        std::fs::create_dir_all(&self.config.paths.output_dir)?;
        std::fs::create_dir_all(&self.config.paths.quarantine_dir)?;

        let mut ledger = RecoveryLedger::load(&self.config.paths.ledger_file)?;
        let mut summary = RunSummary::default();

        // ── Scanning ──────────────────────────────────────────────────────
        let candidates = self.scan(&mut summary, &ledger)?;
        if candidates.is_empty() {
            info!(
                "no new files to process ({} already in ledger)",
                summary.files_skipped
            );
            return Ok(summary);
        }
        info!(
            "processing {} files ({} skipped via ledger)",
            candidates.len(),
            summary.files_skipped
        );

        // ── Processing ────────────────────────────────────────────────────
        let quarantine = QuarantineWriter::new(self.config.paths.quarantine_dir.clone());
        let dispatcher = Dispatcher::new(
            Arc::clone(&self.adapters),
            self.config.processing.parallel_workers,
        );
        let mut rx = dispatcher.dispatch(candidates);

        let mut all_valid: Vec<Transaction> = Vec::new();
        while let Some(outcome) = rx.recv().await {
            let rows = match outcome.result {
                Ok(rows) => rows,
                Err(message) => {
                    error!("{}: {}", outcome.path.display(), message);
                    summary.per_file_errors.push(FileError {
                        path: outcome.path,
                        message,
                    });
                    continue;
                }
            };

            match self.finish_file(&outcome.path, rows, &quarantine, &mut ledger) {
                Ok((valid, invalid_count)) => {
                    summary.files_processed += 1;
                    summary.valid_count += valid.len();
                    summary.invalid_count += invalid_count;
                    all_valid.extend(valid);
                }
                Err(e) => {
                    error!("{}: {}", outcome.path.display(), e);
                    summary.per_file_errors.push(FileError {
                        path: outcome.path,
                        message: e.to_string(),
                    });
                }
            }
        }

        // ── Aggregating ───────────────────────────────────────────────────
        if all_valid.is_empty() {
            info!("run produced no valid transactions");
            return Ok(summary);
        }

        // ── Reporting ─────────────────────────────────────────────────────
        let anomalies = anomaly::detect(&all_valid, "amount", DEFAULT_THRESHOLD);
        summary.anomaly_count = anomalies.len();

        let categorized: Vec<CategorizedTransaction> = all_valid
            .into_iter()
            .map(|tx| {
                let category = self
                    .categorizer
                    .categorize(tx.description_or_empty(), tx.amount)
                    .to_string();
                CategorizedTransaction {
                    transaction: tx,
                    category,
                }
            })
            .collect();

        if let Err(e) = self.report_sink.write_report(&categorized) {
            error!("report writing failed: {}", e);
        }
        if let Err(e) = self.alert_sink.alert(&anomalies) {
            error!("alert delivery failed: {}", e);
        }

        info!(
            "run complete: {} valid, {} invalid, {} anomalies, {} file errors",
            summary.valid_count,
            summary.invalid_count,
            summary.anomaly_count,
            summary.per_file_errors.len()
        );
        Ok(summary)
    }

    // ── Private implementation ────────────────────────────────────────────

    /// Enumerate candidate files: supported extension, not yet in the
    /// ledger. Non-recursive; sorted for deterministic dispatch order.
    fn scan(&self, summary: &mut RunSummary, ledger: &RecoveryLedger) -> Result<Vec<PathBuf>> {
        let input_dir = &self.config.paths.input_dir;
        let mut candidates = Vec::new();
        for entry in std::fs::read_dir(input_dir)? {
            let path = entry?.path();
            if !path.is_file() || !self.adapters.supports(&path) {
                continue;
            }
            if ledger.contains(&file_id(input_dir, &path)) {
                summary.files_skipped += 1;
                continue;
            }
            candidates.push(path);
        }
        candidates.sort();
        Ok(candidates)
    }

    /// Validate, mask, quarantine and ledger one successfully parsed file.
    /// Returns the masked valid rows and the invalid-row count.
    fn finish_file(
        &self,
        path: &Path,
        rows: Vec<Transaction>,
        quarantine: &QuarantineWriter,
        ledger: &mut RecoveryLedger,
    ) -> Result<(Vec<Transaction>, usize)> {
        let mut valid = Vec::new();
        let mut invalid = Vec::new();
        for tx in rows {
            match rules::validate(&tx, &self.rules) {
                outcome if outcome.is_valid() => valid.push(mask_ibans(tx)),
                outcome => {
                    let reason = outcome.reason().unwrap_or_default().to_string();
                    invalid.push((mask_ibans(tx), reason));
                }
            }
        }

        if !invalid.is_empty() {
            warn!(
                "{}: {} invalid rows quarantined",
                path.display(),
                invalid.len()
            );
            quarantine.write(path, &invalid)?;
        }

        ledger.append(&file_id(&self.config.paths.input_dir, path))?;
        Ok((valid, invalid.len()))
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// Ledger identifier for a source file: its path relative to the input
/// directory.
fn file_id(input_dir: &Path, path: &Path) -> String {
    path.strip_prefix(input_dir)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

/// Mask both IBAN fields. Applied after validation, before any sink.
fn mask_ibans(mut tx: Transaction) -> Transaction {
    if let Some(iban) = tx.issuer_iban.take() {
        tx.issuer_iban = Some(mask_default(&iban));
    }
    if let Some(iban) = tx.beneficiary_iban.take() {
        tx.beneficiary_iban = Some(mask_default(&iban));
    }
    tx
}

// ── Tests ─────────────────────────────────────────────────────────────────────
