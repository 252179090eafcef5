//! Output sinks: quarantine files, the valid-transactions report, and
//! anomaly alerts.
//!
//! The report and alert surfaces are traits so the coordinator never knows
//! whether output lands in a CSV, a PDF renderer, or a paging system. The
//! in-tree implementations are the CSV writer and a log-based alert sink.

use std::path::{Path, PathBuf};

use bankflow_core::error::{BankflowError, Result};
use bankflow_core::models::{CategorizedTransaction, Transaction};
use tracing::{info, warn};

// ── Column layout ─────────────────────────────────────────────────────────────

const TYPED_COLUMNS: &[&str] = &[
    "date",
    "amount",
    "currency",
    "issuer_iban",
    "beneficiary_iban",
    "bic",
    "description",
];

/// Sorted union of the extra column names across all rows, so every row in
/// one output file shares a single header.
fn extra_columns(rows: &[Transaction]) -> Vec<String> {
    let mut names: Vec<String> = rows
        .iter()
        .flat_map(|tx| tx.extra.keys().cloned())
        .collect();
    names.sort();
    names.dedup();
    names
}

fn typed_values(tx: &Transaction) -> Vec<String> {
    vec![
        tx.date.map(|d| d.to_string()).unwrap_or_default(),
        tx.amount.map(|a| a.to_string()).unwrap_or_default(),
        tx.currency.clone().unwrap_or_default(),
        tx.issuer_iban.clone().unwrap_or_default(),
        tx.beneficiary_iban.clone().unwrap_or_default(),
        tx.bic.clone().unwrap_or_default(),
        tx.description.clone().unwrap_or_default(),
    ]
}

fn write_csv(
    path: &Path,
    extras: &[String],
    trailing: &str,
    rows: impl Iterator<Item = (Vec<String>, String)>,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header: Vec<&str> = TYPED_COLUMNS.to_vec();
    header.extend(extras.iter().map(String::as_str));
    header.push(trailing);
    writer.write_record(&header)?;

    for (fields, last) in rows {
        let mut record = fields;
        record.push(last);
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn row_record(tx: &Transaction, extras: &[String]) -> Vec<String> {
    let mut record = typed_values(tx);
    record.extend(
        extras
            .iter()
            .map(|name| tx.extra.get(name).cloned().unwrap_or_default()),
    );
    record
}

// ── QuarantineWriter ──────────────────────────────────────────────────────────

/// Writes one quarantine CSV per source file, with a trailing `reason`
/// column explaining each rejection.
pub struct QuarantineWriter {
    quarantine_dir: PathBuf,
}

impl QuarantineWriter {
    pub fn new(quarantine_dir: PathBuf) -> Self {
        Self { quarantine_dir }
    }

    /// The deterministic quarantine path for a source file.
    pub fn target_path(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown");
        self.quarantine_dir
            .join(format!("invalid_transactions_{}.csv", stem))
    }

    /// Write the invalid rows of one source file. No file is written when
    /// there are no invalid rows.
    pub fn write(&self, source: &Path, rows: &[(Transaction, String)]) -> Result<PathBuf> {
        let target = self.target_path(source);
        let transactions: Vec<Transaction> = rows.iter().map(|(tx, _)| tx.clone()).collect();
        let extras = extra_columns(&transactions);
        write_csv(
            &target,
            &extras,
            "reason",
            rows.iter()
                .map(|(tx, reason)| (row_record(tx, &extras), reason.clone())),
        )?;
        info!("quarantined {} rows to {}", rows.len(), target.display());
        Ok(target)
    }
}

// ── ReportSink ────────────────────────────────────────────────────────────────

/// Receives the full categorized valid set at the end of a run.
pub trait ReportSink: Send + Sync {
    fn write_report(&self, rows: &[CategorizedTransaction]) -> Result<()>;
}

/// Writes `valid_transactions.csv` to the output directory, with a trailing
/// `category` column.
pub struct CsvReportWriter {
    output_dir: PathBuf,
}

impl CsvReportWriter {
    pub const FILE_NAME: &'static str = "valid_transactions.csv";

    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn target_path(&self) -> PathBuf {
        self.output_dir.join(Self::FILE_NAME)
    }
}

impl ReportSink for CsvReportWriter {
    fn write_report(&self, rows: &[CategorizedTransaction]) -> Result<()> {
        let target = self.target_path();
        let transactions: Vec<Transaction> =
            rows.iter().map(|r| r.transaction.clone()).collect();
        let extras = extra_columns(&transactions);
        write_csv(
            &target,
            &extras,
            "category",
            rows.iter()
                .map(|r| (row_record(&r.transaction, &extras), r.category.clone())),
        )
        .map_err(|e| BankflowError::Report(format!("{}: {}", target.display(), e)))?;
        info!("wrote {} valid rows to {}", rows.len(), target.display());
        Ok(())
    }
}

// ── AlertSink ─────────────────────────────────────────────────────────────────

/// Receives the anomalies flagged for one run.
pub trait AlertSink: Send + Sync {
    fn alert(&self, anomalies: &[Transaction]) -> Result<()>;
}

/// Logs a warning carrying the anomaly count and flagged amounts. Actual
/// delivery (email, chat) lives outside the pipeline.
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn alert(&self, anomalies: &[Transaction]) -> Result<()> {
        if anomalies.is_empty() {
            return Ok(());
        }
        let amounts: Vec<String> = anomalies
            .iter()
            .map(|tx| {
                tx.amount
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "?".to_string())
            })
            .collect();
        warn!(
            "{} anomalous transactions flagged (amounts: {})",
            anomalies.len(),
            amounts.join(", ")
        );
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tx(amount: f64, currency: &str) -> Transaction {
        Transaction {
            amount: Some(amount),
            currency: Some(currency.to_string()),
            description: Some("test".to_string()),
            ..Default::default()
        }
    }

    // ── QuarantineWriter ──────────────────────────────────────────────────────

    #[test]
    fn test_quarantine_path_from_source_stem() {
        let writer = QuarantineWriter::new(PathBuf::from("/q"));
        assert_eq!(
            writer.target_path(Path::new("/in/statements_jan.csv")),
            PathBuf::from("/q/invalid_transactions_statements_jan.csv")
        );
    }

    #[test]
    fn test_quarantine_writes_reason_column() {
        let dir = TempDir::new().unwrap();
        let writer = QuarantineWriter::new(dir.path().to_path_buf());

        let rows = vec![
            (tx(50.0, "EUR"), "missing required field: bic".to_string()),
            (tx(99.0, "USD"), "BIC: invalid length".to_string()),
        ];
        let target = writer.write(Path::new("jan.csv"), &rows).unwrap();

        let content = std::fs::read_to_string(target).unwrap();
        let mut lines = content.lines();
        let header = lines.next().unwrap();
        assert!(header.ends_with(",reason"));
        assert!(content.contains("missing required field: bic"));
        assert!(content.contains("BIC: invalid length"));
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn test_quarantine_includes_extra_columns() {
        let dir = TempDir::new().unwrap();
        let writer = QuarantineWriter::new(dir.path().to_path_buf());

        let mut one = tx(1.0, "EUR");
        one.extra
            .insert("Branch_Code".to_string(), "00123".to_string());
        let rows = vec![(one, "missing required field: bic".to_string())];
        let target = writer.write(Path::new("jan.csv"), &rows).unwrap();

        let content = std::fs::read_to_string(target).unwrap();
        assert!(content.lines().next().unwrap().contains("Branch_Code"));
        assert!(content.contains("00123"));
    }

    // ── CsvReportWriter ───────────────────────────────────────────────────────

    #[test]
    fn test_report_writes_category_column() {
        let dir = TempDir::new().unwrap();
        let writer = CsvReportWriter::new(dir.path().to_path_buf());

        let rows = vec![
            CategorizedTransaction {
                transaction: tx(3000.0, "EUR"),
                category: "salary".to_string(),
            },
            CategorizedTransaction {
                transaction: tx(12.5, "EUR"),
                category: "other".to_string(),
            },
        ];
        writer.write_report(&rows).unwrap();

        let content = std::fs::read_to_string(writer.target_path()).unwrap();
        assert!(content.lines().next().unwrap().ends_with(",category"));
        assert!(content.contains("salary"));
        assert!(content.contains("other"));
    }

    #[test]
    fn test_report_empty_set_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let writer = CsvReportWriter::new(dir.path().to_path_buf());
        writer.write_report(&[]).unwrap();

        let content = std::fs::read_to_string(writer.target_path()).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    // ── LogAlertSink ──────────────────────────────────────────────────────────

    #[test]
    fn test_log_alert_sink_accepts_anomalies() {
        let sink = LogAlertSink;
        assert!(sink.alert(&[]).is_ok());
        assert!(sink.alert(&[tx(1_000_000.0, "EUR")]).is_ok());
    }
}
