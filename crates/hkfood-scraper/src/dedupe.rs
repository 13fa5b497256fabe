//! Composite-identity deduplication of listings collected across coordinates.
//!
//! Overlapping search radii surface the same vendor many times. A record is
//! identified by its vendor code; only when the code is empty does the
//! name + address pair stand in for it.

use std::collections::HashSet;

use hkfood_core::ListingRecord;

fn primary_key(record: &ListingRecord) -> Option<String> {
    let id = record.id.trim();
    (!id.is_empty()).then(|| id.to_lowercase())
}

fn secondary_key(record: &ListingRecord) -> Option<String> {
    let name = record.name.trim();
    let address = record.address.as_deref().map_or("", str::trim);
    if name.is_empty() || address.is_empty() {
        return None;
    }
    Some(format!("{}|{}", name.to_lowercase(), address.to_lowercase()))
}

/// Removes duplicate listings, keeping the first occurrence of each.
///
/// Order of the surviving records is preserved and the operation is
/// idempotent. Records with neither key are always kept.
#[must_use]
pub fn dedupe(records: Vec<ListingRecord>) -> Vec<ListingRecord> {
    let before = records.len();
    let mut seen: HashSet<String> = HashSet::with_capacity(before * 2);
    let mut kept = Vec::with_capacity(before);

    for record in records {
        let primary = primary_key(&record);
        let secondary = secondary_key(&record);

        let duplicate = match (&primary, &secondary) {
            (Some(key), _) => seen.contains(key),
            (None, Some(key)) => seen.contains(key),
            (None, None) => false,
        };
        if duplicate {
            continue;
        }

        seen.extend(primary);
        seen.extend(secondary);
        kept.push(record);
    }

    tracing::info!(
        before,
        after = kept.len(),
        removed = before - kept.len(),
        "deduplicated listings"
    );
    kept
}
