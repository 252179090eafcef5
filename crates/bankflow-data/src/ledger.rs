//! Append-only ledger of already-processed source files.
//!
//! The ledger is what makes reruns idempotent: a file is appended only after
//! its rows have been fully validated and quarantined, so a crash mid-file
//! leaves the file out of the ledger and it is retried on the next run.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use bankflow_core::error::Result;
use tracing::debug;

// ── RecoveryLedger ────────────────────────────────────────────────────────────

/// Newline-delimited file of processed-source identifiers.
///
/// Identifiers are paths relative to the input directory; no escaping is
/// applied, so identifiers must not contain newlines.
pub struct RecoveryLedger {
    path: PathBuf,
    entries: HashSet<String>,
}

impl RecoveryLedger {
    /// Load the ledger from disk. A missing file is an empty ledger.
    pub fn load(path: &Path) -> Result<Self> {
        let entries = match std::fs::read_to_string(path) {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(e.into()),
        };
        debug!("loaded ledger with {} entries from {}", entries.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Whether `id` has already been processed.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains(id)
    }

    /// Record `id` as processed. Appends one line to the file and dedupes in
    /// memory; re-appending a known id is a no-op.
    pub fn append(&mut self, id: &str) -> Result<()> {
        if !self.entries.insert(id.to_string()) {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", id)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
