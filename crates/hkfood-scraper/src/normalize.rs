//! Normalization from raw vendor items to [`hkfood_core::ListingRecord`].
//!
//! Each field is looked up independently and left unset when absent. The
//! only hard requirement is a non-empty `code` and `name`. An item whose
//! strictly-typed fields carry the wrong JSON type is logged and dropped on
//! its own; the rest of the page is unaffected.

use hkfood_core::ListingRecord;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::types::{RawMetadata, RawVendor};

/// Normalizes every item of one page, dropping the ones that do not survive.
#[must_use]
pub fn normalize_page(items: &[Value], area: &str) -> Vec<ListingRecord> {
    items
        .iter()
        .filter_map(|item| normalize_vendor(item, area))
        .collect()
}

/// Normalizes one raw vendor item discovered under `area`.
///
/// Returns `None` when the item lacks a `code` or `name`, or when it cannot
/// be decoded at all.
#[must_use]
pub fn normalize_vendor(item: &Value, area: &str) -> Option<ListingRecord> {
    match RawVendor::deserialize(item) {
        Ok(raw) => from_raw(raw, area),
        Err(error) => {
            let vendor = item.get("name").and_then(Value::as_str).unwrap_or("unknown");
            tracing::warn!(
                vendor,
                area,
                %error,
                "skipping vendor with incompatible field types"
            );
            None
        }
    }
}

fn from_raw(raw: RawVendor, area: &str) -> Option<ListingRecord> {
    let id = raw.code.as_ref().and_then(value_as_string).and_then(non_blank)?;
    let name = raw.name.and_then(non_blank)?;

    let metadata = raw.metadata.unwrap_or_default();
    let is_open = raw.is_active.unwrap_or(true) && !metadata.is_temporary_closed.unwrap_or(false);

    let mut cuisines = entry_texts(
        raw.characteristics
            .and_then(|c| c.cuisines)
            .as_deref()
            .unwrap_or_default(),
        "name",
    );
    if cuisines.is_empty() {
        cuisines = entry_texts(raw.cuisines.as_deref().unwrap_or_default(), "name");
    }

    let tags = raw
        .tags
        .as_ref()
        .and_then(Value::as_array)
        .map(|entries| entry_texts(entries, "text"))
        .unwrap_or_default();

    let RawMetadata {
        available_in,
        is_delivery_available,
        is_pickup_available,
        ..
    } = metadata;

    Some(ListingRecord {
        id,
        name,
        area: area.to_owned(),
        rating: raw
            .rating
            .as_ref()
            .and_then(value_as_f64)
            .filter(|r| (0.0..=5.0).contains(r)),
        rating_count: raw.review_number.as_ref().and_then(value_as_u64),
        minimum_order: raw.minimum_order_amount.and_then(money),
        address: join_address(raw.address, raw.address_line2),
        phone: raw.customer_phone.and_then(non_blank),
        is_open,
        cuisines: cuisines.join(", "),
        budget_range: raw.budget.as_ref().and_then(value_as_i64),
        chain_name: object_field(raw.chain.as_ref(), "name"),
        longitude: raw.longitude,
        latitude: raw.latitude,
        distance: raw.distance,
        is_delivery_enabled: is_delivery_available.unwrap_or(true),
        is_pickup_enabled: is_pickup_available.unwrap_or(true),
        delivery_provider: raw.delivery_provider.and_then(non_blank),
        hero_image_url: raw.hero_image.and_then(non_blank),
        website: raw.website.and_then(non_blank),
        legal_name: object_field(raw.vendor_legal_information.as_ref(), "legal_name"),
        availability_note: available_in.and_then(non_blank),
        tags: tags.join(", "),
    })
}

/// Trims `value`, returning `None` when nothing is left.
fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_owned())
    }
}

/// Appends `address_line2` after `", "` when it has content.
fn join_address(primary: Option<String>, secondary: Option<String>) -> Option<String> {
    match (primary.and_then(non_blank), secondary.and_then(non_blank)) {
        (Some(primary), Some(secondary)) => Some(format!("{primary}, {secondary}")),
        (primary, secondary) => primary.or(secondary),
    }
}

/// Reads `parent.field` as a non-blank string, only when `parent` is an object.
fn object_field(parent: Option<&Value>, field: &str) -> Option<String> {
    parent
        .and_then(Value::as_object)
        .and_then(|object| object.get(field))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Collects the trimmed `field` string of every object entry, skipping
/// entries that are not objects or whose field is missing or blank.
fn entry_texts(entries: &[Value], field: &str) -> Vec<String> {
    entries
        .iter()
        .filter_map(|entry| object_field(Some(entry), field))
        .collect()
}

fn money(amount: f64) -> Option<Decimal> {
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }
    Decimal::try_from(amount).ok().map(|d| d.round_dp(2))
}

fn value_as_f64(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|raw| raw.trim().parse::<f64>().ok()))
        .filter(|v| v.is_finite())
}

fn value_as_u64(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|raw| raw.trim().parse::<u64>().ok()))
}

/// Integers, integral floats, and numeric strings; anything fractional is
/// dropped rather than rounded.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn value_as_i64(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let n = value_as_f64(value)?;
    (n.fract() == 0.0 && n.abs() < 9.0e15).then_some(n as i64)
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
