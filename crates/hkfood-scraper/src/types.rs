//! Listing API response types for the vendors endpoint.
//!
//! ## Observed shape
//!
//! ```text
//! { "data": { "items": [ { "code": "a1b2", "name": "...", ... }, ... ] } }
//! ```
//!
//! The envelope is decoded loosely (`items` stays a list of raw JSON values)
//! so that one bad vendor cannot fail the whole page. Each item is then
//! decoded on its own into [`RawVendor`].
//!
//! ### `code`
//! Usually a short string such as `"a1b2"`. Kept as a raw value and accepted
//! as a number too.
//!
//! ### `rating` / `review_number`
//! Numbers when the vendor has reviews; `null` or absent otherwise. Kept as
//! raw values so a stray string does not sink the vendor.
//!
//! ### `chain` / `vendor_legal_information`
//! Objects when set, but observed as `null` and occasionally as an empty
//! list. Only the object form is read.
//!
//! ### `characteristics.cuisines` / `cuisines` / `tags`
//! Lists of objects (`{"name": ...}` for cuisines, `{"text": ...}` for tags).
//! Entries that are not objects are skipped.
//!
//! ### `metadata`
//! Availability flags. Every flag is optional; the normalizer supplies the
//! defaults.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ScraperError;

/// One vendor item from `data.items`.
///
/// Absent and `null` fields both decode to `None`. A field present with an
/// incompatible type fails the decode of the whole item.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawVendor {
    pub code: Option<Value>,
    pub name: Option<String>,
    pub rating: Option<Value>,
    pub review_number: Option<Value>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    /// Meters from the query point.
    pub distance: Option<f64>,
    pub minimum_order_amount: Option<f64>,
    pub metadata: Option<RawMetadata>,
    pub address: Option<String>,
    pub address_line2: Option<String>,
    pub customer_phone: Option<String>,
    /// Price tier; usually an integer, occasionally `2.0` or `"2"`.
    pub budget: Option<Value>,
    pub chain: Option<Value>,
    pub characteristics: Option<RawCharacteristics>,
    pub cuisines: Option<Vec<Value>>,
    pub tags: Option<Value>,
    pub delivery_provider: Option<String>,
    pub hero_image: Option<String>,
    pub website: Option<String>,
    pub vendor_legal_information: Option<Value>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawMetadata {
    pub available_in: Option<String>,
    pub is_delivery_available: Option<bool>,
    pub is_pickup_available: Option<bool>,
    pub is_temporary_closed: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawCharacteristics {
    pub cuisines: Option<Vec<Value>>,
}

/// Pulls the `data.items` array out of a decoded response body.
///
/// # Errors
///
/// Returns [`ScraperError::MalformedResponse`] if `data` or `data.items` is
/// missing or `items` is not an array.
pub fn page_items(body: Value, context: &str) -> Result<Vec<Value>, ScraperError> {
    let malformed = |reason: &str| ScraperError::MalformedResponse {
        context: context.to_owned(),
        reason: reason.to_owned(),
    };

    let Value::Object(mut envelope) = body else {
        return Err(malformed("response body is not a JSON object"));
    };
    let Some(Value::Object(mut data)) = envelope.remove("data") else {
        return Err(malformed("missing `data` object"));
    };
    match data.remove("items") {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(malformed("`data.items` is not an array")),
        None => Err(malformed("missing `data.items`")),
    }
}
