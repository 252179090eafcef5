//! Domain layer for bankflow.
//!
//! Holds the transaction data model, the banking-format and business
//! validation rules, keyword categorization, statistical anomaly detection,
//! sensitive-field masking, and the configuration/CLI surface shared by the
//! other crates.

pub mod anomaly;
pub mod categorize;
pub mod config;
pub mod error;
pub mod masking;
pub mod models;
pub mod rules;
pub mod settings;
