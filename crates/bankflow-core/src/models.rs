//! Core data model for the bankflow pipeline.
//!
//! A row starts life as a [`RawRow`] produced by a format adapter, becomes a
//! typed [`Transaction`] in the cleaner, receives exactly one [`Outcome`]
//! from the rule validator, and, when valid, ends as a
//! [`CategorizedTransaction`] handed to the report sink.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── RawRow ────────────────────────────────────────────────────────────────────

/// One uncleaned tabular row as emitted by a [`FormatAdapter`].
///
/// Column order is preserved so that exact-duplicate detection and
/// deterministic output are possible before any typing has happened.
///
/// [`FormatAdapter`]: https://docs.rs/bankflow-data
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawRow {
    /// `(column name, raw string value)` pairs in source order.
    pub fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    /// Look up a value by exact column name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

// ── Transaction ───────────────────────────────────────────────────────────────

/// A cleaned transaction row.
///
/// The fields validation depends on are typed; every other source column is
/// carried untouched in `extra` so unknown bank-specific columns survive the
/// pipeline without weakening type safety where it matters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Transaction {
    /// Parsed amount; `None` when absent or unparsable (the row is kept and
    /// fails validation with a reason, it is never silently dropped).
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub issuer_iban: Option<String>,
    pub beneficiary_iban: Option<String>,
    pub bic: Option<String>,
    pub description: Option<String>,
    /// Parsed booking date; `None` when absent or unparsable.
    pub date: Option<NaiveDate>,
    /// Pass-through columns, keyed by normalized column name.
    pub extra: BTreeMap<String, String>,
}

impl Transaction {
    /// Numeric view of a named column, used by the anomaly detector.
    ///
    /// `"amount"` resolves to the typed field; any other name is parsed out
    /// of `extra`. Returns `None` for absent or non-numeric values.
    pub fn numeric_value(&self, column: &str) -> Option<f64> {
        if column.eq_ignore_ascii_case("amount") {
            return self.amount;
        }
        self.extra.get(column).and_then(|v| v.parse::<f64>().ok())
    }

    /// The description, or `""` when absent.
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

// ── Outcome ───────────────────────────────────────────────────────────────────

/// The validation decision for a single row: valid XOR invalid, never both,
/// never neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Valid,
    /// Invalid, with a human-readable reason for the quarantine record.
    Invalid(String),
}

impl Outcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Outcome::Valid)
    }

    /// The rejection reason, or `None` for valid rows.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Valid => None,
            Outcome::Invalid(reason) => Some(reason),
        }
    }
}

// ── RuleSet ───────────────────────────────────────────────────────────────────

/// Business rules applied by the validator. Read-only and shared across
/// worker tasks for the lifetime of one run.
#[derive(Debug, Clone)]
pub struct RuleSet {
    /// Upper bound on a single transaction amount.
    pub max_transaction_amount: f64,
    /// Allowed currency codes, stored trimmed and uppercased. An empty set
    /// disables the currency check.
    pub allowed_currencies: HashSet<String>,
}

impl RuleSet {
    /// Build a rule set, normalizing currency codes to trimmed uppercase.
    pub fn new(max_transaction_amount: f64, allowed_currencies: &[String]) -> Self {
        Self {
            max_transaction_amount,
            allowed_currencies: allowed_currencies
                .iter()
                .map(|c| c.trim().to_uppercase())
                .collect(),
        }
    }
}

// ── CategorizedTransaction ────────────────────────────────────────────────────

/// A valid transaction with its assigned category label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub category: String,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
