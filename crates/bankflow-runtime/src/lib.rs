//! Runtime orchestration layer for bankflow.
//!
//! Drives one batch run: scans the input directory, dispatches per-file
//! parse/clean tasks under a bounded worker pool, and coordinates
//! validation, quarantine, ledger bookkeeping, and reporting.

pub mod coordinator;
pub mod dispatcher;

pub use bankflow_core as core;
pub use bankflow_data as data;
