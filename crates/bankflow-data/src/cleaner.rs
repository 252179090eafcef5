//! Row cleaning: raw adapter output to typed [`Transaction`]s.
//!
//! Cleaning is lossless with respect to rows: a value that cannot be parsed
//! becomes `None` on the typed field and the row continues to validation,
//! where it is rejected with a reason. Only exact duplicate rows are dropped.

use std::collections::HashSet;
use std::sync::OnceLock;

use bankflow_core::models::{RawRow, Transaction};
use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

// ── Column names ──────────────────────────────────────────────────────────────

fn non_identifier() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]").unwrap())
}

/// Normalize a source column name: trim, then replace every character
/// outside `[A-Za-z0-9_]` with `_`.
pub fn normalize_column(name: &str) -> String {
    non_identifier().replace_all(name.trim(), "_").into_owned()
}

// ── Value parsing ─────────────────────────────────────────────────────────────

/// Parse an amount string, accepting a comma as the decimal separator.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.replace(',', ".").parse::<f64>().ok()
}

/// Parse a booking date from the formats bank extracts actually use.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%d",
        "%d/%m/%Y",
        "%d-%m-%Y",
        "%d.%m.%Y",
        "%Y/%m/%d",
        "%d %b %Y",
    ];
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }
    None
}

// ── Cleaner ───────────────────────────────────────────────────────────────────

/// Cleans one file's worth of raw rows.
pub struct Cleaner;

impl Cleaner {
    /// Drop exact duplicates, then type each remaining row.
    pub fn clean(rows: Vec<RawRow>) -> Vec<Transaction> {
        let total = rows.len();
        let mut seen: HashSet<RawRow> = HashSet::with_capacity(total);
        let mut unique = Vec::with_capacity(total);
        for row in rows {
            if seen.insert(row.clone()) {
                unique.push(row);
            }
        }
        if unique.len() < total {
            debug!("dropped {} duplicate rows", total - unique.len());
        }
        unique.into_iter().map(Self::clean_row).collect()
    }

    /// Type a single raw row.
    pub fn clean_row(row: RawRow) -> Transaction {
        let mut tx = Transaction::default();
        for (name, value) in row.fields {
            let column = normalize_column(&name);
            let value = value.trim();
            match column.to_lowercase().as_str() {
                "amount" => tx.amount = parse_amount(value),
                "currency" => tx.currency = non_empty(value),
                "issuer_iban" => tx.issuer_iban = non_empty(value),
                "beneficiary_iban" => tx.beneficiary_iban = non_empty(value),
                "bic" | "bic_swift" => tx.bic = non_empty(value),
                "description" => tx.description = non_empty(value),
                "date" => tx.date = parse_date(value),
                _ => {
                    tx.extra.insert(column, value.to_string());
                }
            }
        }
        tx
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
