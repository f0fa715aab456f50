//! Run report types and the end-of-run JSON dump.
//!
//! One `ReportRecord` per input address, appended in order by the pipeline
//! and serialized once at the end of a run. The ordered record list is the
//! only durable artifact.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::boundary::OwnerRecord;

/// Terminal state reached for one address. Closed enumeration; the serialized
/// strings are part of the report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    #[serde(rename = "no address")]
    NoAddress,
    #[serde(rename = "property not found")]
    PropertyNotFound,
    #[serde(rename = "no owners found")]
    NoOwnersFound,
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "no contact info found")]
    NoContactInfo,
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ReportStatus::NoAddress => "no address",
            ReportStatus::PropertyNotFound => "property not found",
            ReportStatus::NoOwnersFound => "no owners found",
            ReportStatus::Success => "success",
            ReportStatus::NoContactInfo => "no contact info found",
        };
        write!(f, "{}", text)
    }
}

/// One owner's enrichment outcome: identity fields from owner resolution
/// plus the deduplicated contacts and the cost incurred obtaining them.
/// Cost is zero when contacts came from already-purchased data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerReport {
    pub name: String,
    pub person_key: Option<String>,
    pub ownership_role: String,
    pub person_type: String,
    pub phones: BTreeSet<String>,
    pub emails: BTreeSet<String>,
    pub phone_cost: f64,
    pub email_cost: f64,
}

impl OwnerReport {
    /// An owner record before (or without) contact lookup.
    pub fn from_owner(owner: &OwnerRecord) -> Self {
        Self {
            name: owner.name.clone(),
            person_key: owner.person_key.clone(),
            ownership_role: owner.ownership_role.clone(),
            person_type: owner.person_type.clone(),
            phones: BTreeSet::new(),
            emails: BTreeSet::new(),
            phone_cost: 0.0,
            email_cost: 0.0,
        }
    }
}

/// One report entry per input address. `phones`/`emails` are the
/// deduplicated union over all owners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub address: String,
    pub owners: Vec<OwnerReport>,
    pub phones: BTreeSet<String>,
    pub emails: BTreeSet<String>,
    pub status: ReportStatus,
}

impl ReportRecord {
    /// A record that terminated before any owner was enriched.
    pub fn terminal(address: &str, status: ReportStatus) -> Self {
        Self {
            address: address.to_string(),
            owners: Vec::new(),
            phones: BTreeSet::new(),
            emails: BTreeSet::new(),
            status,
        }
    }
}

/// Aggregate counts and cost totals over a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total_addresses: usize,
    pub addresses_with_contact: usize,
    pub addresses_with_phones: usize,
    pub addresses_with_emails: usize,
    pub total_phones: usize,
    pub total_emails: usize,
    pub total_phone_cost: f64,
    pub total_email_cost: f64,
    pub total_cost: f64,
}

impl RunSummary {
    pub fn from_records(records: &[ReportRecord]) -> Self {
        let total_phone_cost: f64 = records
            .iter()
            .flat_map(|r| r.owners.iter())
            .map(|o| o.phone_cost)
            .sum();
        let total_email_cost: f64 = records
            .iter()
            .flat_map(|r| r.owners.iter())
            .map(|o| o.email_cost)
            .sum();

        Self {
            total_addresses: records.len(),
            addresses_with_contact: records
                .iter()
                .filter(|r| !r.phones.is_empty() || !r.emails.is_empty())
                .count(),
            addresses_with_phones: records.iter().filter(|r| !r.phones.is_empty()).count(),
            addresses_with_emails: records.iter().filter(|r| !r.emails.is_empty()).count(),
            total_phones: records.iter().map(|r| r.phones.len()).sum(),
            total_emails: records.iter().map(|r| r.emails.len()).sum(),
            total_phone_cost,
            total_email_cost,
            total_cost: total_phone_cost + total_email_cost,
        }
    }
}

/// Write the ordered record list as pretty-printed JSON. This is the only
/// persisted output of a run.
pub fn export_json(records: &[ReportRecord], output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    let json_string = serde_json::to_string_pretty(records)?;
    fs::write(output_path, json_string)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;
    info!(
        "exported {} record(s) to {}",
        records.len(),
        output_path.display()
    );
    Ok(())
}
