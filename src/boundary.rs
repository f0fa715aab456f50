//! Boundary contracts for the external APIs the pipeline calls.
//!
//! Each real-world API is treated as an opaque contract: the pipeline only
//! depends on these traits, and one conformance exists per provider
//! (selected by configuration), instead of trial-and-error field probing at
//! runtime. Wire formats live entirely inside the implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::address::{AddressComponents, PropertyClass};

/// Selects between reading already-purchased data and purchasing new data
/// (incurring a charge). Serialized as the provider's `Purchase` query
/// parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostMode {
    /// Read already-purchased data only, never incur a charge
    CachedOnly,
    /// Purchase new data, incur the provider's reported charge
    Purchase,
}

impl CostMode {
    pub fn as_query_value(&self) -> &'static str {
        match self {
            CostMode::CachedOnly => "0",
            CostMode::Purchase => "1",
        }
    }
}

/// Which contact category a lookup targets. The provider exposes one
/// endpoint per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactCategory {
    Phone,
    Email,
}

impl ContactCategory {
    /// Path segment under `/persons/{key}/` for this category.
    pub fn endpoint_segment(&self) -> &'static str {
        match self {
            ContactCategory::Phone => "Phone",
            ContactCategory::Email => "Email",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContactCategory::Phone => "phone",
            ContactCategory::Email => "email",
        }
    }
}

#[derive(Debug, Error)]
pub enum BoundaryError {
    /// The provider refused a purchase because the data was already bought.
    /// Soft failure: the caller records an empty result at zero cost.
    #[error("contact data already purchased and not retrievable through this endpoint")]
    AlreadyPurchased,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
}

pub type BoundaryResult<T> = Result<T, BoundaryError>;

/// One item from the address source board: an identifier, a primary label,
/// and the item's text columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardItem {
    pub id: String,
    pub name: String,
    pub columns: Vec<BoardColumn>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardColumn {
    pub id: String,
    pub text: String,
}

/// A candidate property returned by the search boundary. The identifier
/// drives owner resolution; the class is advisory only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMatch {
    pub radar_id: String,
    pub property_class: PropertyClass,
}

/// An owner associated with a property match. `person_key` absent means
/// contact lookup cannot proceed for this owner. Legal entities commonly
/// yield no phone/email data at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRecord {
    pub person_key: Option<String>,
    pub name: String,
    pub ownership_role: String,
    pub person_type: String,
}

/// Raw contact-lookup response: an arbitrarily shaped payload that may
/// contain phone/email data at any nesting depth, plus the cost the
/// provider reported for the call.
#[derive(Debug, Clone)]
pub struct ContactPayload {
    pub body: Value,
    pub total_cost: f64,
}

/// Supplies candidate address strings from an external work board.
#[async_trait]
pub trait AddressSource {
    async fn fetch_items(&self, board_id: &str, limit: usize) -> BoundaryResult<Vec<BoardItem>>;
}

/// Matches structured address components to zero or more properties.
#[async_trait]
pub trait PropertySearch {
    async fn search_properties(
        &self,
        components: &AddressComponents,
        mode: CostMode,
    ) -> BoundaryResult<Vec<PropertyMatch>>;
}

/// Resolves the owners of a matched property.
#[async_trait]
pub trait OwnerResolution {
    async fn resolve_owners(
        &self,
        radar_id: &str,
        mode: CostMode,
    ) -> BoundaryResult<Vec<OwnerRecord>>;
}

/// Looks up phone/email payloads for an owner's person key.
#[async_trait]
pub trait ContactLookup {
    /// Primary category endpoint, in the given cost mode.
    async fn lookup_contact(
        &self,
        person_key: &str,
        category: ContactCategory,
        mode: CostMode,
    ) -> BoundaryResult<ContactPayload>;

    /// Read-only alternate endpoint that may expose previously purchased
    /// data under a different shape. Never incurs a charge.
    async fn lookup_alternate(
        &self,
        person_key: &str,
        endpoint_suffix: &str,
    ) -> BoundaryResult<ContactPayload>;

    /// Alternate endpoint suffixes to probe, in order.
    fn alternate_endpoints(&self) -> &[String];
}
