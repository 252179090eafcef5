//! Bounded-concurrency file dispatch.
//!
//! One tokio task per candidate file, gated by a semaphore so no more than
//! `parallel_workers` files are parsed at once. Each task parses and cleans
//! its file and sends the outcome through an `mpsc` channel as it completes,
//! in completion order. A file that fails to parse is isolated: its error is
//! sent as a value, never propagated to the other tasks. The channel closing
//! is the completion barrier.

use std::path::PathBuf;
use std::sync::Arc;

use bankflow_core::models::Transaction;
use bankflow_data::adapter::AdapterRegistry;
use bankflow_data::cleaner::Cleaner;
use tokio::sync::{mpsc, Semaphore};
use tracing::debug;

// ── Public types ──────────────────────────────────────────────────────────────

/// The outcome of one file task, sent over the dispatch channel.
#[derive(Debug)]
pub struct FileOutcome {
    /// Absolute path of the source file.
    pub path: PathBuf,
    /// Cleaned rows, or a description of why the file could not be parsed.
    pub result: std::result::Result<Vec<Transaction>, String>,
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

/// Spawns the per-file parse/clean tasks for one run.
pub struct Dispatcher {
    adapters: Arc<AdapterRegistry>,
    parallel_workers: usize,
}

impl Dispatcher {
    pub fn new(adapters: Arc<AdapterRegistry>, parallel_workers: usize) -> Self {
        Self {
            adapters,
            parallel_workers: parallel_workers.max(1),
        }
    }

    /// Dispatch all `files` and return the receiving end of the outcome
    /// channel. The channel closes once every file task has completed.
    pub fn dispatch(&self, files: Vec<PathBuf>) -> mpsc::Receiver<FileOutcome> {
        let (tx, rx) = mpsc::channel(self.parallel_workers.max(files.len().min(64)));
        let semaphore = Arc::new(Semaphore::new(self.parallel_workers));

        for path in files {
            let tx = tx.clone();
            let semaphore = Arc::clone(&semaphore);
            let adapters = Arc::clone(&self.adapters);

            tokio::spawn(async move {
                // Closed semaphore is impossible here; holder lives until all
                // tasks finish.
                let Ok(_permit) = semaphore.acquire().await else {
                    return;
                };
                debug!("processing {}", path.display());

                let result = tokio::task::spawn_blocking({
                    let path = path.clone();
                    move || adapters.parse(&path).map(Cleaner::clean)
                })
                .await;

                let result = match result {
                    Ok(Ok(rows)) => Ok(rows),
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(e) => Err(format!("task panicked: {}", e)),
                };

                // Receiver dropped means the run was abandoned; nothing to do.
                let _ = tx.send(FileOutcome { path, result }).await;
            });
        }

        // Every task holds a clone; dropping this sender closes the channel
        // once the last task finishes.
        drop(tx);
        rx
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", content).unwrap();
        path
    }

    async fn collect(mut rx: mpsc::Receiver<FileOutcome>) -> Vec<FileOutcome> {
        let mut out = Vec::new();
        while let Some(outcome) = rx.recv().await {
            out.push(outcome);
        }
        out
    }

    #[tokio::test]
    async fn test_dispatch_empty_file_list_closes_channel() {
        let dispatcher = Dispatcher::new(Arc::new(AdapterRegistry::builtin()), 2);
        let outcomes = collect(dispatcher.dispatch(vec![])).await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_parses_and_cleans_all_files() {
        let dir = TempDir::new().unwrap();
        let a = write_csv(dir.path(), "a.csv", "Amount,Currency\n100,EUR\n200,EUR\n");
        let b = write_csv(dir.path(), "b.csv", "Amount,Currency\n5,USD\n");

        let dispatcher = Dispatcher::new(Arc::new(AdapterRegistry::builtin()), 2);
        let outcomes = collect(dispatcher.dispatch(vec![a.clone(), b.clone()])).await;

        assert_eq!(outcomes.len(), 2);
        let paths: HashSet<PathBuf> = outcomes.iter().map(|o| o.path.clone()).collect();
        assert!(paths.contains(&a));
        assert!(paths.contains(&b));
        for outcome in &outcomes {
            let rows = outcome.result.as_ref().unwrap();
            if outcome.path == a {
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0].amount, Some(100.0));
            } else {
                assert_eq!(rows.len(), 1);
            }
        }
    }

    #[tokio::test]
    async fn test_dispatch_isolates_unreadable_file() {
        let dir = TempDir::new().unwrap();
        let good = write_csv(dir.path(), "good.csv", "Amount\n10\n");
        let missing = dir.path().join("missing.csv");

        let dispatcher = Dispatcher::new(Arc::new(AdapterRegistry::builtin()), 2);
        let outcomes = collect(dispatcher.dispatch(vec![good.clone(), missing.clone()])).await;

        assert_eq!(outcomes.len(), 2);
        for outcome in &outcomes {
            if outcome.path == good {
                assert!(outcome.result.is_ok());
            } else {
                assert!(outcome.result.is_err());
            }
        }
    }

    #[tokio::test]
    async fn test_dispatch_single_worker_processes_everything() {
        let dir = TempDir::new().unwrap();
        let files: Vec<PathBuf> = (0..5)
            .map(|i| {
                write_csv(
                    dir.path(),
                    &format!("f{}.csv", i),
                    &format!("Amount\n{}\n", i),
                )
            })
            .collect();

        let dispatcher = Dispatcher::new(Arc::new(AdapterRegistry::builtin()), 1);
        let outcomes = collect(dispatcher.dispatch(files)).await;
        assert_eq!(outcomes.len(), 5);
        assert!(outcomes.iter().all(|o| o.result.is_ok()));
    }
}
