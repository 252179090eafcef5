//! Keyword-based transaction categorization.
//!
//! Labels are matched in table order against the description with
//! case-insensitive whole-word patterns; the first matching label wins and
//! [`DEFAULT_CATEGORY`] is returned when nothing matches. Each keyword is
//! compiled into a [`Regex`] once at construction, and the description is
//! case-folded by the regex engine rather than per keyword.

use regex::Regex;
use tracing::warn;

/// Label returned when no keyword matches or the description is empty.
pub const DEFAULT_CATEGORY: &str = "other";

/// The built-in label table, applied when the configuration does not supply
/// its own. A configured table replaces this one wholesale, it is never
/// merged.
pub fn default_keyword_table() -> Vec<(String, Vec<String>)> {
    let table: &[(&str, &[&str])] = &[
        ("salary", &["salary", "payroll", "remuneration"]),
        ("rent", &["rent", "lease", "landlord"]),
        (
            "groceries",
            &["supermarket", "grocery", "bakery", "restaurant", "market"],
        ),
        (
            "transport",
            &["train", "taxi", "uber", "fuel", "gas station", "toll"],
        ),
        ("health", &["pharmacy", "doctor", "hospital", "insurance"]),
        (
            "entertainment",
            &["cinema", "netflix", "spotify", "concert", "games"],
        ),
    ];
    table
        .iter()
        .map(|(label, keywords)| {
            (
                label.to_string(),
                keywords.iter().map(|k| k.to_string()).collect(),
            )
        })
        .collect()
}

// ── Categorizer ───────────────────────────────────────────────────────────────

/// Compiled label table. Build once per run, share read-only across rows.
pub struct Categorizer {
    /// `(label, compiled keyword patterns)` in priority order.
    labels: Vec<(String, Vec<Regex>)>,
}

impl Categorizer {
    /// Compile a keyword table into a categorizer.
    ///
    /// Keywords that fail to compile (pathological configuration input) are
    /// skipped with a warning rather than aborting the run.
    pub fn new(table: &[(String, Vec<String>)]) -> Self {
        let labels = table
            .iter()
            .map(|(label, keywords)| {
                let patterns = keywords
                    .iter()
                    .filter_map(|kw| {
                        let pattern = format!(r"(?i)\b{}\b", regex::escape(kw));
                        match Regex::new(&pattern) {
                            Ok(re) => Some(re),
                            Err(e) => {
                                warn!("skipping unusable keyword {:?}: {}", kw, e);
                                None
                            }
                        }
                    })
                    .collect();
                (label.clone(), patterns)
            })
            .collect();
        Self { labels }
    }

    /// Categorizer backed by the built-in table.
    pub fn with_defaults() -> Self {
        Self::new(&default_keyword_table())
    }

    /// Assign a label to a description.
    ///
    /// The amount is part of the signature for forward compatibility with
    /// amount-sensitive rules; the current table matches on text only.
    pub fn categorize(&self, description: &str, _amount: Option<f64>) -> &str {
        if description.is_empty() {
            return DEFAULT_CATEGORY;
        }
        for (label, patterns) in &self.labels {
            if patterns.iter().any(|re| re.is_match(description)) {
                return label;
            }
        }
        DEFAULT_CATEGORY
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_description_gets_default_label() {
        let c = Categorizer::with_defaults();
        assert_eq!(c.categorize("", Some(1_000_000.0)), DEFAULT_CATEGORY);
        assert_eq!(c.categorize("", None), DEFAULT_CATEGORY);
    }

    #[test]
    fn test_no_match_gets_default_label() {
        let c = Categorizer::with_defaults();
        assert_eq!(c.categorize("zzz unmatched text", None), DEFAULT_CATEGORY);
    }

    #[test]
    fn test_whole_word_match_case_insensitive() {
        let c = Categorizer::with_defaults();
        assert_eq!(c.categorize("Monthly SALARY payment", None), "salary");
        assert_eq!(c.categorize("uber ride downtown", None), "transport");
    }

    #[test]
    fn test_substring_is_not_a_word_match() {
        let c = Categorizer::with_defaults();
        // "rents" contains "rent" but is not the whole word.
        assert_eq!(c.categorize("parents meeting", None), DEFAULT_CATEGORY);
    }

    #[test]
    fn test_first_matching_label_wins() {
        let table = vec![
            ("a".to_string(), vec!["shared".to_string()]),
            ("b".to_string(), vec!["shared".to_string()]),
        ];
        let c = Categorizer::new(&table);
        assert_eq!(c.categorize("shared keyword", None), "a");
    }

    #[test]
    fn test_custom_table_replaces_defaults() {
        let table = vec![("custom".to_string(), vec!["netflix".to_string()])];
        let c = Categorizer::new(&table);
        // "salary" is only in the default table, which is replaced wholesale.
        assert_eq!(c.categorize("salary payment", None), DEFAULT_CATEGORY);
        assert_eq!(c.categorize("netflix subscription", None), "custom");
    }

    #[test]
    fn test_keywords_with_regex_metacharacters_are_escaped() {
        let table = vec![("odd".to_string(), vec!["a+b".to_string()])];
        let c = Categorizer::new(&table);
        assert_eq!(c.categorize("payment a+b today", None), "odd");
        assert_eq!(c.categorize("payment aab today", None), DEFAULT_CATEGORY);
    }
}
