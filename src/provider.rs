//! Property data provider client.
//!
//! Implements the property-search, owner-resolution, and contact-lookup
//! boundaries against a single HTTP provider. Responses share an envelope
//! shape `{results, totalCost, resultCount}`; missing envelope fields
//! degrade to empty/zero rather than failing the call. The `Purchase`
//! query parameter selects the cost mode on every endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::address::AddressComponents;
use crate::boundary::{
    BoundaryError, BoundaryResult, ContactCategory, ContactLookup, ContactPayload, CostMode,
    OwnerRecord, OwnerResolution, PropertyMatch, PropertySearch,
};
use crate::config::ProviderConfig;

pub struct ProviderClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
    alternate_endpoints: Vec<String>,
}

impl ProviderClient {
    pub fn new(config: &ProviderConfig, alternate_endpoints: Vec<String>) -> Self {
        Self {
            client: build_http_client(config),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            alternate_endpoints,
        }
    }

    async fn read_envelope(&self, response: reqwest::Response) -> BoundaryResult<Envelope> {
        let status = response.status();
        if !status.is_success() {
            return Err(BoundaryError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        let body: Value = response.json().await?;
        Ok(Envelope::from_body(body))
    }
}

fn build_http_client(config: &ProviderConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .expect("Failed to create HTTP client")
}

/// Common provider response envelope. `results` carries the payload;
/// `totalCost` is the charge incurred by this call.
struct Envelope {
    body: Value,
    results: Vec<Value>,
    total_cost: f64,
    result_count: u64,
}

impl Envelope {
    fn from_body(body: Value) -> Self {
        let results = body
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let total_cost = body
            .get("totalCost")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        let result_count = body
            .get("resultCount")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        Self {
            body,
            results,
            total_cost,
            result_count,
        }
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key) {
        Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    }
}

#[async_trait]
impl PropertySearch for ProviderClient {
    async fn search_properties(
        &self,
        components: &AddressComponents,
        mode: CostMode,
    ) -> BoundaryResult<Vec<PropertyMatch>> {
        let url = format!("{}/properties", self.base_url);
        let criteria = json!({
            "Criteria": [
                { "name": "Address", "value": [components.street] },
                { "name": "City",    "value": [components.city] },
                { "name": "State",   "value": [components.state] },
                { "name": "ZipFive", "value": [components.zip] },
            ]
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .query(&[("Purchase", mode.as_query_value())])
            .json(&criteria)
            .send()
            .await?;
        let envelope = self.read_envelope(response).await?;

        debug!(
            "property search for '{}' returned {} result(s), cost ${}",
            components.street, envelope.result_count, envelope.total_cost
        );

        let property_class = crate::address::classify(&components.street);
        let matches = envelope
            .results
            .iter()
            .filter_map(|result| {
                let radar_id = string_field(result, "RadarID")?;
                Some(PropertyMatch {
                    radar_id,
                    property_class,
                })
            })
            .collect();
        Ok(matches)
    }
}

#[async_trait]
impl OwnerResolution for ProviderClient {
    async fn resolve_owners(
        &self,
        radar_id: &str,
        mode: CostMode,
    ) -> BoundaryResult<Vec<OwnerRecord>> {
        let url = format!("{}/properties/{}/persons", self.base_url, radar_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .query(&[("Purchase", mode.as_query_value())])
            .send()
            .await?;
        let envelope = self.read_envelope(response).await?;

        let owners: Vec<OwnerRecord> = envelope
            .results
            .iter()
            .map(|result| OwnerRecord {
                person_key: string_field(result, "PersonKey"),
                name: string_field(result, "EntityName")
                    .or_else(|| string_field(result, "Name"))
                    .unwrap_or_else(|| "Unknown Owner".to_string()),
                ownership_role: string_field(result, "OwnershipRole")
                    .unwrap_or_else(|| "Unknown".to_string()),
                person_type: string_field(result, "PersonType")
                    .unwrap_or_else(|| "Unknown".to_string()),
            })
            .collect();

        debug!("property {} resolved {} owner(s)", radar_id, owners.len());
        Ok(owners)
    }
}

/// Phrases the provider uses in a 400 body when data was already bought and
/// cannot be re-purchased.
const ALREADY_PURCHASED_MARKERS: &[&str] = &["already purchased", "not available for purchase"];

#[async_trait]
impl ContactLookup for ProviderClient {
    async fn lookup_contact(
        &self,
        person_key: &str,
        category: ContactCategory,
        mode: CostMode,
    ) -> BoundaryResult<ContactPayload> {
        let url = format!(
            "{}/persons/{}/{}",
            self.base_url,
            person_key,
            category.endpoint_segment()
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .query(&[("Purchase", mode.as_query_value())])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 400 {
            let body = response.text().await.unwrap_or_default();
            if ALREADY_PURCHASED_MARKERS.iter().any(|m| body.contains(m)) {
                return Err(BoundaryError::AlreadyPurchased);
            }
            return Err(BoundaryError::Status {
                status: 400,
                body,
            });
        }
        if !status.is_success() {
            return Err(BoundaryError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body: Value = response.json().await?;
        let envelope = Envelope::from_body(body);
        if envelope.result_count > 0 {
            debug!(
                "{} lookup for {} returned {} record(s), cost ${}",
                category.label(),
                person_key,
                envelope.result_count,
                envelope.total_cost
            );
        }
        Ok(ContactPayload {
            body: envelope.body,
            total_cost: envelope.total_cost,
        })
    }

    async fn lookup_alternate(
        &self,
        person_key: &str,
        endpoint_suffix: &str,
    ) -> BoundaryResult<ContactPayload> {
        let url = if endpoint_suffix.is_empty() {
            format!("{}/persons/{}", self.base_url, person_key)
        } else {
            format!("{}/persons/{}/{}", self.base_url, person_key, endpoint_suffix)
        };
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .query(&[("Purchase", CostMode::CachedOnly.as_query_value())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                "alternate endpoint '{}' for {} returned {}",
                endpoint_suffix, person_key, status
            );
            return Err(BoundaryError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body: Value = response.json().await?;
        // Alternate reads expose previously purchased data; never a charge
        Ok(ContactPayload {
            body,
            total_cost: 0.0,
        })
    }

    fn alternate_endpoints(&self) -> &[String] {
        &self.alternate_endpoints
    }
}
