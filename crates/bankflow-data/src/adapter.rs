//! Format adapters: one capability, "parse file → ordered rows, may fail".
//!
//! The pipeline never looks inside a file itself; everything byte-level lives
//! behind [`FormatAdapter`]. A CSV adapter ships in-tree; spreadsheet, PDF
//! and OCR adapters are external collaborators that plug in through the same
//! trait.

use std::path::Path;
use std::sync::Arc;

use bankflow_core::error::{BankflowError, Result};
use bankflow_core::models::RawRow;
use tracing::debug;

// ── FormatAdapter ─────────────────────────────────────────────────────────────

/// Parses one source file into ordered raw rows.
///
/// Implementations must be `Send + Sync`: the dispatcher shares one adapter
/// registry across all concurrent file tasks.
pub trait FormatAdapter: Send + Sync {
    /// Whether this adapter handles the given extension (lowercase, no dot).
    fn supports(&self, extension: &str) -> bool;

    /// Parse the file into rows, preserving row and column order.
    fn parse(&self, path: &Path) -> Result<Vec<RawRow>>;
}

// ── CsvAdapter ────────────────────────────────────────────────────────────────

/// Built-in adapter for comma-separated statement extracts.
pub struct CsvAdapter;

impl FormatAdapter for CsvAdapter {
    fn supports(&self, extension: &str) -> bool {
        extension == "csv"
    }

    fn parse(&self, path: &Path) -> Result<Vec<RawRow>> {
        let file = std::fs::File::open(path).map_err(|e| BankflowError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| BankflowError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| BankflowError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            let fields = headers
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    (
                        name.clone(),
                        record.get(i).unwrap_or_default().to_string(),
                    )
                })
                .collect();
            rows.push(RawRow::new(fields));
        }

        debug!("parsed {} rows from {}", rows.len(), path.display());
        Ok(rows)
    }
}

// ── AdapterRegistry ───────────────────────────────────────────────────────────

/// Maps file extensions to adapters. Shared read-only across file tasks.
#[derive(Clone)]
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn FormatAdapter>>,
}

impl AdapterRegistry {
    pub fn new(adapters: Vec<Arc<dyn FormatAdapter>>) -> Self {
        Self { adapters }
    }

    /// Registry containing only the built-in CSV adapter.
    pub fn builtin() -> Self {
        Self::new(vec![Arc::new(CsvAdapter)])
    }

    /// Whether any registered adapter supports this path's extension.
    pub fn supports(&self, path: &Path) -> bool {
        self.adapter_for(path).is_some()
    }

    /// The adapter for this path's extension, if any.
    pub fn adapter_for(&self, path: &Path) -> Option<Arc<dyn FormatAdapter>> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        self.adapters.iter().find(|a| a.supports(&ext)).cloned()
    }

    /// Parse `path` with the matching adapter.
    pub fn parse(&self, path: &Path) -> Result<Vec<RawRow>> {
        match self.adapter_for(path) {
            Some(adapter) => adapter.parse(path),
            None => Err(BankflowError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", content).unwrap();
        path
    }

    // ── CsvAdapter ────────────────────────────────────────────────────────────

    #[test]
    fn test_csv_adapter_parses_rows_in_order() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "statement.csv",
            "Amount,Currency,Description\n100,EUR,first\n200,USD,second\n",
        );

        let rows = CsvAdapter.parse(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Amount"), Some("100"));
        assert_eq!(rows[0].get("Description"), Some("first"));
        assert_eq!(rows[1].get("Currency"), Some("USD"));
        // Column order preserved.
        assert_eq!(rows[0].fields[0].0, "Amount");
        assert_eq!(rows[0].fields[2].0, "Description");
    }

    #[test]
    fn test_csv_adapter_short_record_pads_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "short.csv", "A,B,C\n1,2\n");

        let rows = CsvAdapter.parse(&path).unwrap();
        assert_eq!(rows[0].get("C"), Some(""));
    }

    #[test]
    fn test_csv_adapter_missing_file_is_file_read_error() {
        let dir = TempDir::new().unwrap();
        let err = CsvAdapter.parse(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, BankflowError::FileRead { .. }));
    }

    #[test]
    fn test_csv_adapter_empty_file_yields_no_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "empty.csv", "");
        let rows = CsvAdapter.parse(&path).unwrap();
        assert!(rows.is_empty());
    }

    // ── AdapterRegistry ───────────────────────────────────────────────────────

    #[test]
    fn test_registry_supports_by_extension() {
        let registry = AdapterRegistry::builtin();
        assert!(registry.supports(Path::new("a.csv")));
        assert!(registry.supports(Path::new("a.CSV")));
        assert!(!registry.supports(Path::new("a.pdf")));
        assert!(!registry.supports(Path::new("no_extension")));
    }

    #[test]
    fn test_registry_unsupported_extension_error() {
        let registry = AdapterRegistry::builtin();
        let err = registry.parse(Path::new("statement.xlsx")).unwrap_err();
        assert!(matches!(err, BankflowError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_registry_dispatches_to_custom_adapter() {
        struct FixedAdapter;
        impl FormatAdapter for FixedAdapter {
            fn supports(&self, extension: &str) -> bool {
                extension == "fix"
            }
            fn parse(&self, _path: &Path) -> Result<Vec<RawRow>> {
                Ok(vec![RawRow::new(vec![(
                    "Amount".to_string(),
                    "1".to_string(),
                )])])
            }
        }

        let registry = AdapterRegistry::new(vec![Arc::new(FixedAdapter)]);
        let rows = registry.parse(Path::new("anything.fix")).unwrap();
        assert_eq!(rows.len(), 1);
    }
}
