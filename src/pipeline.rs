//! The enrichment pipeline: Address -> Property Match -> Owner Resolution ->
//! Contact Lookup.
//!
//! Strictly sequential: one address is fully processed, including all nested
//! owner and contact calls, before the next begins. Per-owner contact lookup
//! follows the cost-avoidance protocol: cached data first, then read-only
//! alternate endpoints, and only as a last resort a paid purchase. A paid
//! call is never the first attempt, and each owner is charged at most once
//! per category per run.
//!
//! No boundary failure aborts a run. Transport errors, bad status codes, and
//! malformed bodies all degrade to "no data from this call" and the pipeline
//! proceeds to the next address.

use std::collections::BTreeSet;
use std::time::Duration;

use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::address;
use crate::boundary::{
    BoundaryError, ContactCategory, ContactLookup, CostMode, OwnerRecord, OwnerResolution,
    PropertySearch,
};
use crate::extract::{extract_emails, extract_phones};
use crate::logger::RunLogger;
use crate::normalize::{normalize_emails, normalize_phones};
use crate::report::{OwnerReport, ReportRecord, ReportStatus};

pub struct Pipeline<'a, P> {
    provider: &'a P,
    logger: &'a RunLogger,
    /// Scheduling delay between addresses, out of courtesy to the provider's
    /// implicit rate limit. Not a retry or backoff.
    pause: Duration,
    /// Cost mode for property search. Owner and contact lookups manage their
    /// own modes.
    search_mode: CostMode,
}

impl<'a, P> Pipeline<'a, P>
where
    P: PropertySearch + OwnerResolution + ContactLookup + Sync,
{
    pub fn new(
        provider: &'a P,
        logger: &'a RunLogger,
        pause: Duration,
        search_mode: CostMode,
    ) -> Self {
        Self {
            provider,
            logger,
            pause,
            search_mode,
        }
    }

    /// Process every address in order, emitting one report record each.
    pub async fn run(&self, addresses: &[String]) -> Vec<ReportRecord> {
        let mut records = Vec::with_capacity(addresses.len());
        for (index, raw) in addresses.iter().enumerate() {
            if index > 0 && !self.pause.is_zero() {
                sleep(self.pause).await;
            }
            self.logger.info(&format!(
                "Address {}/{}: {}",
                index + 1,
                addresses.len(),
                raw
            ));
            let record = self.enrich_address(raw).await;
            self.logger.advance_progress(&record.status.to_string());
            self.logger.info(&format!("  -> {}", record.status));
            records.push(record);
        }
        records
    }

    async fn enrich_address(&self, raw: &str) -> ReportRecord {
        let components = match address::parse(raw) {
            Some(components) => components,
            None => {
                self.logger.warn(&format!("Could not parse address: {}", raw));
                return ReportRecord::terminal(raw, ReportStatus::NoAddress);
            }
        };

        let matches = match self
            .provider
            .search_properties(&components, self.search_mode)
            .await
        {
            Ok(matches) => matches,
            Err(error) => {
                warn!("property search failed for '{}': {}", raw, error);
                self.logger
                    .warn(&format!("Property search failed: {}", error));
                Vec::new()
            }
        };
        if matches.is_empty() {
            return ReportRecord::terminal(raw, ReportStatus::PropertyNotFound);
        }

        let mut owners: Vec<OwnerRecord> = Vec::new();
        for property in &matches {
            self.logger.debug(&format!(
                "Property {} ({})",
                property.radar_id, property.property_class
            ));
            // The provider does not bill owner listings
            match self
                .provider
                .resolve_owners(&property.radar_id, CostMode::Purchase)
                .await
            {
                Ok(found) => owners.extend(found),
                Err(error) => {
                    warn!(
                        "owner resolution failed for property {}: {}",
                        property.radar_id, error
                    );
                    self.logger
                        .warn(&format!("Owner resolution failed: {}", error));
                }
            }
        }
        if owners.is_empty() {
            return ReportRecord::terminal(raw, ReportStatus::NoOwnersFound);
        }

        let mut owner_reports = Vec::with_capacity(owners.len());
        let mut all_phones = BTreeSet::new();
        let mut all_emails = BTreeSet::new();

        for owner in &owners {
            let mut report = OwnerReport::from_owner(owner);
            match &owner.person_key {
                Some(person_key) => {
                    self.logger
                        .debug(&format!("Owner {} ({})", owner.name, owner.person_type));
                    let (phones, phone_cost) =
                        self.lookup_category(person_key, ContactCategory::Phone).await;
                    let (emails, email_cost) =
                        self.lookup_category(person_key, ContactCategory::Email).await;
                    report.phones = phones;
                    report.emails = emails;
                    report.phone_cost = phone_cost;
                    report.email_cost = email_cost;
                }
                None => {
                    // Entities without a person key cannot be looked up
                    self.logger.warn(&format!(
                        "No person key for {}; skipping contact lookup",
                        owner.name
                    ));
                }
            }
            all_phones.extend(report.phones.iter().cloned());
            all_emails.extend(report.emails.iter().cloned());
            owner_reports.push(report);
        }

        let status = if !all_phones.is_empty() || !all_emails.is_empty() {
            ReportStatus::Success
        } else {
            ReportStatus::NoContactInfo
        };

        ReportRecord {
            address: raw.to_string(),
            owners: owner_reports,
            phones: all_phones,
            emails: all_emails,
            status,
        }
    }

    /// Cost-avoidance sub-protocol for one owner and one contact category:
    /// cached -> alternates -> purchase. Returns the normalized contact set
    /// and the cost incurred (zero unless the purchase step ran and was
    /// billed).
    async fn lookup_category(
        &self,
        person_key: &str,
        category: ContactCategory,
    ) -> (BTreeSet<String>, f64) {
        // Step 1: already-purchased data on the primary endpoint
        match self
            .provider
            .lookup_contact(person_key, category, CostMode::CachedOnly)
            .await
        {
            Ok(payload) => {
                let found = extract_and_normalize(category, &payload.body);
                if !found.is_empty() {
                    self.logger.debug(&format!(
                        "Found {} cached {}(s) for {}",
                        found.len(),
                        category.label(),
                        person_key
                    ));
                    return (found, 0.0);
                }
            }
            Err(error) => {
                debug!(
                    "cached {} lookup failed for {}: {}",
                    category.label(),
                    person_key,
                    error
                );
            }
        }

        // Step 2: read-only alternates that may expose previously purchased
        // data under a different shape
        for suffix in self.provider.alternate_endpoints() {
            match self.provider.lookup_alternate(person_key, suffix).await {
                Ok(payload) => {
                    let found = extract_and_normalize(category, &payload.body);
                    if !found.is_empty() {
                        self.logger.debug(&format!(
                            "Found {} {}(s) for {} via alternate '{}'",
                            found.len(),
                            category.label(),
                            person_key,
                            suffix
                        ));
                        return (found, 0.0);
                    }
                }
                Err(error) => {
                    debug!(
                        "alternate '{}' failed for {}: {}",
                        suffix, person_key, error
                    );
                }
            }
        }

        // Step 3: last resort, purchase new data
        match self
            .provider
            .lookup_contact(person_key, category, CostMode::Purchase)
            .await
        {
            Ok(payload) => {
                let found = extract_and_normalize(category, &payload.body);
                if payload.total_cost > 0.0 {
                    self.logger.info(&format!(
                        "Purchased {} data for {}: {} result(s), ${:.2}",
                        category.label(),
                        person_key,
                        found.len(),
                        payload.total_cost
                    ));
                }
                (found, payload.total_cost)
            }
            Err(BoundaryError::AlreadyPurchased) => {
                // Soft failure: data exists but was not retrievable through
                // any endpoint we know. Empty set, zero cost, no retry.
                self.logger.warn(&format!(
                    "{} data for {} already purchased but not retrievable",
                    category.label(),
                    person_key
                ));
                (BTreeSet::new(), 0.0)
            }
            Err(error) => {
                warn!(
                    "{} purchase failed for {}: {}",
                    category.label(),
                    person_key,
                    error
                );
                self.logger.warn(&format!(
                    "{} purchase failed for {}: {}",
                    category.label(),
                    person_key,
                    error
                ));
                (BTreeSet::new(), 0.0)
            }
        }
    }
}

fn extract_and_normalize(category: ContactCategory, body: &Value) -> BTreeSet<String> {
    match category {
        ContactCategory::Phone => normalize_phones(extract_phones(body)),
        ContactCategory::Email => normalize_emails(extract_emails(body)),
    }
}
