//! Statistical outlier flagging over valid transactions.
//!
//! A row is flagged when the absolute z-score of its value in the chosen
//! column exceeds the threshold. Mean and standard deviation are population
//! figures (divide by N). The detector only returns the flagged subset; any
//! alerting on it happens elsewhere.

use crate::models::Transaction;

/// Default z-score threshold.
pub const DEFAULT_THRESHOLD: f64 = 3.0;

/// Population mean and standard deviation of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationStats {
    pub mean: f64,
    pub stddev: f64,
    pub count: usize,
}

/// Compute population statistics over `values`. Returns `None` for an empty
/// slice.
pub fn population_stats(values: &[f64]) -> Option<PopulationStats> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(PopulationStats {
        mean,
        stddev: variance.sqrt(),
        count: values.len(),
    })
}

// ── Detection ─────────────────────────────────────────────────────────────────

/// Return clones of the rows whose `column` value deviates from the mean by
/// more than `threshold` standard deviations.
///
/// Rows with a null value in `column` neither contribute to the statistics
/// nor get flagged. A missing or all-null column yields an empty result, not
/// an error. A zero standard deviation (all values identical) flags nothing;
/// the guard also keeps the division well-defined.
pub fn detect(rows: &[Transaction], column: &str, threshold: f64) -> Vec<Transaction> {
    let values: Vec<f64> = rows
        .iter()
        .filter_map(|row| row.numeric_value(column))
        .collect();

    let Some(stats) = population_stats(&values) else {
        return Vec::new();
    };
    if stats.stddev == 0.0 {
        return Vec::new();
    }

    rows.iter()
        .filter(|row| {
            row.numeric_value(column)
                .is_some_and(|v| ((v - stats.mean) / stats.stddev).abs() > threshold)
        })
        .cloned()
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
