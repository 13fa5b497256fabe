use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::listing::ListingRecord;

/// Whole-dataset counts and means.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total: usize,
    pub rated: usize,
    /// Rounded to 2 dp; `0.0` when nothing is rated.
    pub mean_rating: f64,
    /// Distinct area labels.
    pub areas: usize,
    pub with_coordinates: usize,
    pub with_phone: usize,
    pub chains: usize,
}

/// Counts and means for the records attributed to one area label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaStats {
    pub area: String,
    pub count: usize,
    pub rated: usize,
    pub mean_rating: f64,
    pub mean_budget: f64,
}

/// The finished output of a crawl, handed to export as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub collected_at: DateTime<Utc>,
    /// Records collected before deduplication.
    pub raw_count: usize,
    pub summary: SummaryStats,
    pub areas: Vec<AreaStats>,
    /// Deduplicated records in discovery order.
    pub records: Vec<ListingRecord>,
}

impl Dataset {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records removed as duplicates.
    #[must_use]
    pub fn duplicates_removed(&self) -> usize {
        self.raw_count.saturating_sub(self.records.len())
    }
}
