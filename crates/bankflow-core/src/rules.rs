//! Per-row structural and business validation.
//!
//! Checks run in a fixed order and the first failure wins, so a row's
//! rejection reason is deterministic: required fields, amount ceiling,
//! currency whitelist, issuer IBAN, beneficiary IBAN, BIC.
//!
//! IBAN and BIC checks are structural only. Full mod-97 checksum validation
//! is intentionally not performed.

use crate::models::{Outcome, RuleSet, Transaction};

/// Official IBAN lengths for the countries this system commonly sees.
/// Unknown country codes are accepted without a length constraint so that
/// statements from new corridors keep flowing.
const IBAN_COUNTRY_LENGTHS: &[(&str, usize)] = &[
    ("FR", 27),
    ("DE", 22),
    ("GB", 22),
    ("CI", 28),
    ("SN", 28),
    ("JP", 24),
    ("US", 24),
];

// ── IBAN ──────────────────────────────────────────────────────────────────────

/// Structural IBAN check.
///
/// The input is normalized (spaces stripped, uppercased) before checking:
/// length ≥ 5, two alphabetic country chars, two numeric check digits, an
/// alphanumeric remainder, and, when the country code is known, an exact
/// per-country total length.
pub fn check_iban(iban: &str) -> Result<(), String> {
    let iban: String = iban
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    if !iban.is_ascii() {
        return Err("IBAN contains non-ASCII characters".to_string());
    }
    if iban.len() < 5 {
        return Err(format!("IBAN too short: {} characters", iban.len()));
    }

    let bytes = iban.as_bytes();
    if !bytes[..2].iter().all(|b| b.is_ascii_alphabetic()) {
        return Err(format!("invalid IBAN country code: {}", &iban[..2]));
    }
    if !bytes[2..4].iter().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid IBAN check digits: {}", &iban[2..4]));
    }
    if !bytes[4..].iter().all(|b| b.is_ascii_alphanumeric()) {
        return Err(format!("invalid BBAN characters: {}", &iban[4..]));
    }

    let country = &iban[..2];
    if let Some(&(_, expected)) = IBAN_COUNTRY_LENGTHS.iter().find(|(c, _)| *c == country) {
        if iban.len() != expected {
            return Err(format!(
                "invalid IBAN length for {}: {} characters (expected {})",
                country,
                iban.len(),
                expected
            ));
        }
    }

    Ok(())
}

// ── BIC ───────────────────────────────────────────────────────────────────────

/// Structural BIC/SWIFT check: `BANKCCLL` or `BANKCCLLBBB`.
///
/// Four alphabetic bank chars, two alphabetic country chars, two
/// alphanumeric location chars, and an optional three-char alphanumeric
/// branch code. Input is normalized the same way as IBANs.
pub fn check_bic(bic: &str) -> Result<(), String> {
    let bic: String = bic
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    if !bic.is_ascii() {
        return Err("BIC contains non-ASCII characters".to_string());
    }
    if bic.len() != 8 && bic.len() != 11 {
        return Err(format!(
            "invalid BIC length: {} characters (expected 8 or 11)",
            bic.len()
        ));
    }

    let bytes = bic.as_bytes();
    if !bytes[..4].iter().all(|b| b.is_ascii_alphabetic()) {
        return Err(format!("invalid BIC bank code: {}", &bic[..4]));
    }
    if !bytes[4..6].iter().all(|b| b.is_ascii_alphabetic()) {
        return Err(format!("invalid BIC country code: {}", &bic[4..6]));
    }
    if !bytes[6..8].iter().all(|b| b.is_ascii_alphanumeric()) {
        return Err(format!("invalid BIC location code: {}", &bic[6..8]));
    }
    if bic.len() == 11 && !bytes[8..].iter().all(|b| b.is_ascii_alphanumeric()) {
        return Err(format!("invalid BIC branch code: {}", &bic[8..]));
    }

    Ok(())
}

// ── Transaction validation ────────────────────────────────────────────────────

/// Validate one cleaned transaction against the rule set.
///
/// Returns exactly one [`Outcome`] per row. Missing or null required fields
/// reject first; afterwards the business and structural checks run in fixed
/// order with the first failure winning.
pub fn validate(tx: &Transaction, rules: &RuleSet) -> Outcome {
    // 1. Required fields must be present and non-null.
    if tx.amount.is_none() {
        return Outcome::Invalid("missing required field: amount".to_string());
    }
    let missing_text = [
        ("currency", &tx.currency),
        ("issuer_iban", &tx.issuer_iban),
        ("beneficiary_iban", &tx.beneficiary_iban),
        ("bic", &tx.bic),
    ]
    .into_iter()
    .find(|(_, v)| v.as_deref().map_or(true, |s| s.is_empty()));
    if let Some((name, _)) = missing_text {
        return Outcome::Invalid(format!("missing required field: {}", name));
    }

    // Required-field presence was just established.
    let amount = tx.amount.unwrap_or_default();
    let currency = tx.currency.as_deref().unwrap_or_default();
    let issuer = tx.issuer_iban.as_deref().unwrap_or_default();
    let beneficiary = tx.beneficiary_iban.as_deref().unwrap_or_default();
    let bic = tx.bic.as_deref().unwrap_or_default();

    // 2. Amount ceiling.
    if amount > rules.max_transaction_amount {
        return Outcome::Invalid(format!(
            "amount {} exceeds maximum {}",
            amount, rules.max_transaction_amount
        ));
    }

    // 3. Currency whitelist (skipped when the whitelist is empty).
    let currency_norm = currency.trim().to_uppercase();
    if !rules.allowed_currencies.is_empty() && !rules.allowed_currencies.contains(&currency_norm) {
        return Outcome::Invalid(format!("currency {} not allowed", currency_norm));
    }

    // 4-6. Structural checks, issuer first.
    if let Err(reason) = check_iban(issuer) {
        return Outcome::Invalid(format!("issuer IBAN: {}", reason));
    }
    if let Err(reason) = check_iban(beneficiary) {
        return Outcome::Invalid(format!("beneficiary IBAN: {}", reason));
    }
    if let Err(reason) = check_bic(bic) {
        return Outcome::Invalid(format!("BIC: {}", reason));
    }

    Outcome::Valid
}

// ── Tests ─────────────────────────────────────────────────────────────────────
