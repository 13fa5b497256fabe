//! Offset pagination plan for the vendors endpoint.
//!
//! Pages are requested at offsets `0, page_size, 2 * page_size, ...`. The
//! first pages sort by rating so the best-rated vendors are seen first; once
//! the offset reaches [`RATING_PHASE_END`] the remaining pages fill in by
//! proximity instead. When a region holds more vendors than the result
//! limit, this ordering decides which ones are kept.

use std::time::Duration;

/// Offsets below this value request `rating_desc`; the rest `distance_asc`.
pub const RATING_PHASE_END: u32 = 100;

pub const DEFAULT_PAGE_SIZE: u32 = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    RatingDesc,
    DistanceAsc,
}

impl SortOrder {
    /// The sort order used for the page starting at `offset`.
    #[must_use]
    pub fn for_offset(offset: u32) -> Self {
        if offset < RATING_PHASE_END {
            SortOrder::RatingDesc
        } else {
            SortOrder::DistanceAsc
        }
    }

    #[must_use]
    pub fn as_query_value(self) -> &'static str {
        match self {
            SortOrder::RatingDesc => "rating_desc",
            SortOrder::DistanceAsc => "distance_asc",
        }
    }
}

/// A single page request: `limit` vendors starting at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u32,
    pub limit: u32,
    pub sort: SortOrder,
}

/// How far to paginate one coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPlan {
    /// Maximum records to collect for the coordinate.
    pub result_limit: u32,
    pub page_size: u32,
    /// Pause between consecutive page requests.
    pub inter_page_delay: Duration,
}

impl FetchPlan {
    /// A plan with the default page size and no inter-page delay.
    #[must_use]
    pub fn new(result_limit: u32) -> Self {
        Self {
            result_limit,
            page_size: DEFAULT_PAGE_SIZE,
            inter_page_delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_inter_page_delay(mut self, delay: Duration) -> Self {
        self.inter_page_delay = delay;
        self
    }

    /// The request for the page at `offset` after `accumulated` records
    /// have been collected, or `None` when nothing more may be requested.
    ///
    /// The requested count never exceeds the page size, the records still
    /// missing, or the room left between `offset` and the result limit.
    #[must_use]
    pub fn page_at(&self, offset: u32, accumulated: usize) -> Option<PageRequest> {
        let accumulated = u32::try_from(accumulated).unwrap_or(u32::MAX);
        let limit = self
            .page_size
            .min(self.result_limit.saturating_sub(accumulated))
            .min(self.result_limit.saturating_sub(offset));
        if limit == 0 {
            return None;
        }
        Some(PageRequest {
            offset,
            limit,
            sort: SortOrder::for_offset(offset),
        })
    }
}
