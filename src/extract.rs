//! Fuzzy field extraction from arbitrarily shaped JSON payloads.
//!
//! Contact-lookup responses carry phone/email data at unpredictable nesting
//! depths and under provider-specific key names, so extraction is driven by
//! key-indicator substrings rather than a fixed schema path: a key whose
//! lowercase form contains an indicator triggers a candidate check on its
//! string value, and nested values are recursed into regardless of whether
//! their key matched. Indicator matching is a heuristic trigger, not a
//! schema.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Key substrings that suggest a phone-bearing field.
pub const PHONE_INDICATORS: &[&str] = &["phone", "tel", "mobile", "landline", "number", "linktext"];

/// Key substrings that suggest an email-bearing field.
pub const EMAIL_INDICATORS: &[&str] = &["email", "mail", "linktext"];

// Accepts dashed, dotted, spaced, and parenthesized forms; the canonical
// shape is imposed later by the normalizer.
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap());

/// Collect raw phone candidates from a payload. Only the matched digit
/// pattern is recorded, not the whole field value. Pure function of its
/// input; duplicates are left for the normalizer to collapse.
pub fn extract_phones(payload: &Value) -> Vec<String> {
    let mut found = Vec::new();
    walk(payload, PHONE_INDICATORS, &phone_candidate, &mut found);
    found
}

/// Collect raw email candidates from a payload. The whole field value is
/// recorded; validation and dedup happen in the normalizer.
pub fn extract_emails(payload: &Value) -> Vec<String> {
    let mut found = Vec::new();
    walk(payload, EMAIL_INDICATORS, &email_candidate, &mut found);
    found
}

fn phone_candidate(value: &str) -> Option<String> {
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    PHONE_PATTERN.find(value).map(|m| m.as_str().to_string())
}

fn email_candidate(value: &str) -> Option<String> {
    if value.contains('@') && value.contains('.') {
        Some(value.to_string())
    } else {
        None
    }
}

fn walk(
    value: &Value,
    indicators: &[&str],
    candidate: &dyn Fn(&str) -> Option<String>,
    found: &mut Vec<String>,
) {
    match value {
        Value::Object(entries) => {
            for (key, nested) in entries {
                let key_lower = key.to_lowercase();
                if indicators.iter().any(|ind| key_lower.contains(ind)) {
                    if let Value::String(text) = nested {
                        if let Some(hit) = candidate(text) {
                            found.push(hit);
                        }
                    }
                }
                // Nested values are explored regardless of the key match, so
                // an indicator-keyed object like {"Phone": {"number": ..}} is
                // still descended into.
                if nested.is_object() || nested.is_array() {
                    walk(nested, indicators, candidate, found);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, indicators, candidate, found);
            }
        }
        _ => {}
    }
}
