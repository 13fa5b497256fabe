//! Summary and per-area statistics over a deduplicated record set.

use std::collections::BTreeMap;

use hkfood_core::{AreaStats, ListingRecord, SummaryStats};

/// Running sums for one area label.
#[derive(Default)]
struct AreaAccumulator {
    count: usize,
    rated: usize,
    rating_sum: f64,
    budgeted: usize,
    budget_sum: f64,
}

/// Computes overall and per-area statistics for `records`.
///
/// Means are rounded to 2 dp and are `0.0` when nothing qualifies. Area
/// stats are ordered by label.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(records: &[ListingRecord]) -> (SummaryStats, Vec<AreaStats>) {
    let mut summary = SummaryStats {
        total: records.len(),
        ..SummaryStats::default()
    };
    let mut rating_sum = 0.0;
    let mut areas: BTreeMap<&str, AreaAccumulator> = BTreeMap::new();

    for record in records {
        let area = areas.entry(record.area.as_str()).or_default();
        area.count += 1;

        if let Some(rating) = record.rating {
            summary.rated += 1;
            rating_sum += rating;
            area.rated += 1;
            area.rating_sum += rating;
        }
        if let Some(budget) = record.budget_range {
            area.budgeted += 1;
            area.budget_sum += budget as f64;
        }
        if record.has_coordinates() {
            summary.with_coordinates += 1;
        }
        if record.phone.as_deref().is_some_and(|p| !p.trim().is_empty()) {
            summary.with_phone += 1;
        }
        if record
            .chain_name
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
        {
            summary.chains += 1;
        }
    }

    summary.mean_rating = mean(rating_sum, summary.rated);
    summary.areas = areas.len();

    let area_stats = areas
        .into_iter()
        .map(|(label, acc)| AreaStats {
            area: label.to_owned(),
            count: acc.count,
            rated: acc.rated,
            mean_rating: mean(acc.rating_sum, acc.rated),
            mean_budget: mean(acc.budget_sum, acc.budgeted),
        })
        .collect();

    (summary, area_stats)
}

#[allow(clippy::cast_precision_loss)]
fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    round2(sum / count as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
