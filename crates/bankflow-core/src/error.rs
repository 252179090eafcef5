use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the bankflow pipeline.
///
/// Row-level validation failures are deliberately *not* represented here:
/// they are classification outcomes (see [`crate::models::Outcome`]), never
/// errors. Only failures that exclude a whole file, or abort the run, appear
/// in this taxonomy.
#[derive(Error, Debug)]
pub enum BankflowError {
    /// A configuration value is missing or invalid. Always fatal: the run
    /// aborts before any source file is touched.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A source file could not be opened or read from disk.
    #[error("Failed to read file {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source file was read but could not be parsed into rows.
    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// No adapter is registered for the file's extension.
    #[error("Unsupported file type: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Writing the valid-transaction report or an anomaly handoff failed.
    /// Non-fatal to the run; committed ledger and quarantine state stands.
    #[error("Report generation failed: {0}")]
    Report(String),

    /// An error from the CSV encoder/decoder.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the bankflow crates.
pub type Result<T> = std::result::Result<T, BankflowError>;
