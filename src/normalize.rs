//! Canonicalization and dedup of raw extracted contact strings.
//!
//! Both routines are pure, order-independent, and idempotent: re-normalizing
//! an already-normalized set is a no-op.

use std::collections::BTreeSet;

/// Normalize phone candidates into canonical `(XXX) XXX-XXXX` form.
///
/// Exactly 10 recoverable digits format directly; 11 digits with a leading
/// "1" drop the country code first. Anything else with at least 10 digits is
/// kept verbatim rather than discarded, so plausibly valid international or
/// extension-bearing numbers survive. Fewer than 10 digits is noise.
pub fn normalize_phones<I>(raw: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = String>,
{
    let mut normalized = BTreeSet::new();
    for value in raw {
        let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() == 10 {
            normalized.insert(format_ten_digits(&digits));
        } else if digits.len() == 11 && digits.starts_with('1') {
            normalized.insert(format_ten_digits(&digits[1..]));
        } else if digits.len() >= 10 {
            normalized.insert(value);
        }
    }
    normalized
}

fn format_ten_digits(digits: &str) -> String {
    format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
}

/// Trim and validate email candidates: accepted iff the value contains both
/// "@" and "." and is longer than 5 characters.
pub fn normalize_emails<I>(raw: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = String>,
{
    raw.into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| value.contains('@') && value.contains('.') && value.len() > 5)
        .collect()
}
