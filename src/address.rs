//! Free-text postal address parsing and classification.
//!
//! Addresses arrive as whatever text a board item happens to carry, e.g.
//! `"400 LAS COLINAS BLVD E, IRVING, TX 75039"` or the looser
//! `"1521 S Frontage Rd, Columbus, Ms 39701"`. Parsing tries a primary
//! comma-split pattern first and falls back to treating the second segment
//! as a combined "city, state zip". Street abbreviations and unit suffixes
//! are passed through verbatim.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::boundary::BoardItem;

static STATE_ZIP: Lazy<Regex> = Lazy::new(|| {
    // Mixed-case states like "Ms", "Tx", "TX" are accepted and uppercased
    Regex::new(r"^([A-Za-z]{2})\s+(\d{5})").unwrap()
});

static CITY_STATE_ZIP: Lazy<Regex> = Lazy::new(|| {
    // "Columbus, Ms 39701" or "Columbus Ms 39701"
    Regex::new(r"^(.+?),?\s+([A-Za-z]{2})\s+(\d{5})").unwrap()
});

/// Street-type keywords used to decide whether a piece of board text looks
/// like an address at all.
const STREET_TYPE_KEYWORDS: &[&str] = &["st", "rd", "ave", "blvd", "ln", "dr", "way", "ct", "pl"];

const COMMERCIAL_KEYWORDS: &[&str] = &[
    "highway", "hwy", "interstate", "business", "industrial", "commerce", "corporate", "office",
    "plaza", "center", "mall", "store", "shop", "warehouse", "facility", "building", "complex",
    "park", "blvd", "frontage", "service", "commercial",
];

const RESIDENTIAL_KEYWORDS: &[&str] = &[
    "st", "street", "ave", "avenue", "rd", "road", "ln", "lane", "dr", "drive", "way", "ct",
    "court", "pl", "place", "cir", "circle", "apt", "apartment", "unit", "#",
];

/// Structured components of a parsed postal address. Immutable after parse;
/// state is always uppercase, zip is always five digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponents {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// Parse a free-text address into components.
///
/// Primary pattern: `<street>, <city>, <ST> <5 digits>`. If the third
/// segment does not match (or there are only two segments), the second
/// segment is retried as a combined `<city>, <ST> <5 digits>`. Returns
/// `None` when neither pattern applies; such addresses are excluded from
/// property matching.
pub fn parse(raw: &str) -> Option<AddressComponents> {
    let parts: Vec<&str> = raw.split(',').collect();

    if parts.len() >= 3 {
        let street = parts[0].trim();
        let city = parts[1].trim();
        if let Some(caps) = STATE_ZIP.captures(parts[2].trim()) {
            return Some(AddressComponents {
                street: street.to_string(),
                city: city.to_string(),
                state: caps[1].to_uppercase(),
                zip: caps[2].to_string(),
            });
        }
    }

    // Fallback: second segment carries "city ST zip" in one piece
    if parts.len() >= 2 {
        let street = parts[0].trim();
        if let Some(caps) = CITY_STATE_ZIP.captures(parts[1].trim()) {
            return Some(AddressComponents {
                street: street.to_string(),
                city: caps[1].trim().to_string(),
                state: caps[2].to_uppercase(),
                zip: caps[3].to_string(),
            });
        }
    }

    None
}

/// Advisory residential/commercial classification inferred from street-type
/// keywords. Never authoritative; used only for logging and the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyClass {
    LikelyResidential,
    LikelyCommercial,
    Unknown,
}

impl std::fmt::Display for PropertyClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyClass::LikelyResidential => write!(f, "likely residential"),
            PropertyClass::LikelyCommercial => write!(f, "likely commercial"),
            PropertyClass::Unknown => write!(f, "unknown"),
        }
    }
}

/// Classify an address string by keyword. Commercial indicators win over
/// residential ones ("blvd" appears in both lists on purpose).
pub fn classify(address: &str) -> PropertyClass {
    if address.is_empty() {
        return PropertyClass::Unknown;
    }
    let lower = address.to_lowercase();
    if COMMERCIAL_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return PropertyClass::LikelyCommercial;
    }
    if RESIDENTIAL_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return PropertyClass::LikelyResidential;
    }
    PropertyClass::Unknown
}

fn looks_like_address(text: &str) -> bool {
    let lower = text.to_lowercase();
    STREET_TYPE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Derive a candidate address string from a board item.
///
/// The item label wins when it contains a street-type keyword; otherwise the
/// first column text containing one is used; otherwise the raw label is
/// returned as-is. The board's "New address" placeholder and empty labels
/// yield `None`.
pub fn candidate_from_item(item: &BoardItem) -> Option<String> {
    if item.name == "New address" {
        return None;
    }

    if looks_like_address(&item.name) {
        return Some(item.name.clone());
    }

    for column in &item.columns {
        if !column.text.is_empty() && looks_like_address(&column.text) {
            return Some(column.text.clone());
        }
    }

    if item.name.is_empty() {
        None
    } else {
        Some(item.name.clone())
    }
}
