//! Per-coordinate pagination loop for `ListingClient`.

use hkfood_core::{Coordinate, ListingRecord};

use crate::cancel::CancelToken;
use crate::normalize::normalize_page;
use crate::query::{FetchPlan, PageRequest};

use super::ListingClient;
use super::MAX_PAGES;

/// Why pagination for a coordinate stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The result limit was reached.
    LimitReached,
    /// The provider returned a page with no items.
    Exhausted,
    /// A page had items but none normalized into a record.
    NoUsableRecords,
    /// Transport failure, timeout, or non-2xx status.
    Failed,
    /// The response body was not the expected `data.items` shape.
    Malformed,
    Cancelled,
    /// [`MAX_PAGES`] pages were fetched without reaching another stop.
    PageCap,
}

impl StopReason {
    /// `true` when the stop was caused by an error rather than normal
    /// exhaustion or the limit.
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, StopReason::Failed | StopReason::Malformed)
    }
}

/// Records collected for one coordinate, in discovery order.
#[derive(Debug)]
pub struct CoordinateHarvest {
    pub records: Vec<ListingRecord>,
    pub pages_fetched: usize,
    pub stop: StopReason,
}

impl ListingClient {
    /// Paginates the vendors endpoint around `coordinate` until `plan` is
    /// satisfied or the provider runs dry.
    ///
    /// Never fails: transport and schema errors end pagination and the
    /// records gathered so far are returned with the matching
    /// [`StopReason`]. The inter-page delay is only slept when another page
    /// will actually be requested.
    pub async fn fetch_listings(
        &self,
        coordinate: &Coordinate,
        plan: &FetchPlan,
        cancel: &CancelToken,
    ) -> CoordinateHarvest {
        let mut records: Vec<ListingRecord> = Vec::new();
        let mut pages_fetched = 0usize;

        tracing::info!(
            area = %coordinate.label,
            longitude = coordinate.longitude,
            latitude = coordinate.latitude,
            "collecting listings"
        );

        let mut next = plan.page_at(0, 0);
        let stop = loop {
            let Some(request) = next else {
                break StopReason::LimitReached;
            };
            if cancel.is_cancelled() {
                break StopReason::Cancelled;
            }

            let items = match self.fetch_page(coordinate, request).await {
                Ok(items) => items,
                Err(error) => {
                    tracing::warn!(
                        area = %coordinate.label,
                        offset = request.offset,
                        error = %error,
                        "listing page failed; ending pagination for this coordinate"
                    );
                    break if error.is_malformed() {
                        StopReason::Malformed
                    } else {
                        StopReason::Failed
                    };
                }
            };
            pages_fetched += 1;

            if items.is_empty() {
                break StopReason::Exhausted;
            }

            let mut batch = normalize_page(&items, &coordinate.label);
            let room = usize::try_from(plan.result_limit)
                .unwrap_or(usize::MAX)
                .saturating_sub(records.len());
            batch.truncate(room);
            let batch_len = batch.len();
            records.extend(batch);

            tracing::debug!(
                area = %coordinate.label,
                offset = request.offset,
                sort = request.sort.as_query_value(),
                batch = batch_len,
                fetched = records.len(),
                "collected listing page"
            );

            if batch_len == 0 {
                break StopReason::NoUsableRecords;
            }

            next = next_request(plan, request, records.len());
            if next.is_none() {
                break StopReason::LimitReached;
            }
            if pages_fetched >= MAX_PAGES {
                break StopReason::PageCap;
            }

            if !plan.inter_page_delay.is_zero() {
                tokio::time::sleep(plan.inter_page_delay).await;
            }
        };

        tracing::info!(
            area = %coordinate.label,
            fetched = records.len(),
            pages = pages_fetched,
            stop = ?stop,
            "finished collecting listings"
        );

        CoordinateHarvest {
            records,
            pages_fetched,
            stop,
        }
    }
}

fn next_request(plan: &FetchPlan, previous: PageRequest, accumulated: usize) -> Option<PageRequest> {
    let offset = previous.offset.checked_add(plan.page_size)?;
    plan.page_at(offset, accumulated)
}
