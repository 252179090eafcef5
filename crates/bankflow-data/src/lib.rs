//! Data ingestion and persistence layer for bankflow.
//!
//! Responsible for turning source files into raw rows (format adapters),
//! cleaning rows into typed transactions, tracking which files have already
//! been processed (recovery ledger), and writing quarantine/report output.

pub mod adapter;
pub mod cleaner;
pub mod ledger;
pub mod sinks;

pub use bankflow_core as core;
