//! Masking of sensitive account identifiers.
//!
//! Masking happens only after the validation decision; the structural IBAN
//! and BIC checks always see the unmasked value.

/// Number of trailing characters left visible by default.
pub const DEFAULT_VISIBLE: usize = 4;

/// Replace all but the last `keep` characters of `value` with `*`.
///
/// Values no longer than `keep` are fully masked so that short identifiers
/// never leak, and an empty input stays empty.
pub fn mask(value: &str, keep: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    if chars.len() <= keep {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - keep..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - keep), visible)
}

/// [`mask`] with the default number of visible characters.
pub fn mask_default(value: &str) -> String {
    mask(value, DEFAULT_VISIBLE)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_keeps_last_four() {
        let iban = "FR1420041010050500013M02606";
        let masked = mask(iban, 4);
        assert!(masked.ends_with("2606"));
        assert_eq!(masked.len(), iban.len());
        // Everything before the visible tail is asterisks only.
        let hidden = &masked[..masked.len() - 4];
        assert!(hidden.chars().all(|c| c == '*'));
    }

    #[test]
    fn test_mask_short_value_fully_hidden() {
        assert_eq!(mask("abc", 4), "***");
        assert_eq!(mask("abcd", 4), "****");
    }

    #[test]
    fn test_mask_empty() {
        assert_eq!(mask("", 4), "");
    }

    #[test]
    fn test_mask_zero_keep_hides_everything() {
        assert_eq!(mask("secret", 0), "******");
    }

    #[test]
    fn test_mask_default_visible() {
        assert_eq!(mask_default("1234567890"), "******7890");
    }
}
