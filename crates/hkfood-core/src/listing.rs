use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One restaurant listing, normalized from the provider's loosely-typed
/// vendor payload.
///
/// Only `id` and `name` are guaranteed; both are non-empty for every record
/// that leaves the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Provider-assigned vendor code, e.g. `"a1b2"`.
    pub id: String,
    pub name: String,
    /// Label of the search coordinate that first surfaced this listing.
    pub area: String,
    /// Average review score on a 0–5 scale.
    pub rating: Option<f64>,
    pub rating_count: Option<u64>,
    /// Minimum basket value in the provider's currency (HKD).
    pub minimum_order: Option<Decimal>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_open: bool,
    /// Comma-joined cuisine names; empty when the provider lists none.
    pub cuisines: String,
    /// Provider price band, `1` (cheap) upward.
    pub budget_range: Option<i64>,
    pub chain_name: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    /// Meters from the query coordinate, as reported by the provider.
    pub distance: Option<f64>,
    pub is_delivery_enabled: bool,
    pub is_pickup_enabled: bool,
    pub delivery_provider: Option<String>,
    pub hero_image_url: Option<String>,
    pub website: Option<String>,
    pub legal_name: Option<String>,
    pub availability_note: Option<String>,
    /// Comma-joined tag texts; empty when there are none.
    pub tags: String,
}

impl ListingRecord {
    /// A record with only the required fields set and every optional field
    /// at its "absent" value.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, area: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            area: area.into(),
            rating: None,
            rating_count: None,
            minimum_order: None,
            address: None,
            phone: None,
            is_open: true,
            cuisines: String::new(),
            budget_range: None,
            chain_name: None,
            longitude: None,
            latitude: None,
            distance: None,
            is_delivery_enabled: true,
            is_pickup_enabled: true,
            delivery_provider: None,
            hero_image_url: None,
            website: None,
            legal_name: None,
            availability_note: None,
            tags: String::new(),
        }
    }

    /// Returns `true` when both GPS coordinates are present.
    #[must_use]
    pub fn has_coordinates(&self) -> bool {
        self.longitude.is_some() && self.latitude.is_some()
    }
}
