//! Multi-coordinate crawl: paginate each coordinate in turn, then
//! deduplicate and aggregate the merged records into a [`Dataset`].

use std::time::Duration;

use chrono::Utc;
use hkfood_core::{AppConfig, BoundingBox, Coordinate, CrawlTiming, Dataset, ListingRecord};

use crate::aggregate::aggregate;
use crate::cancel::CancelToken;
use crate::client::{ListingClient, StopReason};
use crate::dedupe::dedupe;
use crate::query::FetchPlan;

/// Everything the crawler needs besides the HTTP client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrawlSettings {
    pub bounds: BoundingBox,
    pub plan: FetchPlan,
    pub timing: CrawlTiming,
}

impl CrawlSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            bounds: config.bounds,
            plan: FetchPlan::new(config.result_limit)
                .with_page_size(config.page_size)
                .with_inter_page_delay(config.timing.inter_page_delay),
            timing: config.timing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateStatus {
    /// Pagination ran and ended for `stop`.
    Collected { stop: StopReason },
    /// Outside the bounding box; no request was made.
    Rejected,
    /// The crawl was cancelled before this coordinate was reached.
    Cancelled,
}

/// What happened at one submitted coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateOutcome {
    pub label: String,
    /// Records collected before deduplication.
    pub records: usize,
    pub status: CoordinateStatus,
}

#[derive(Debug)]
pub struct CrawlReport {
    pub dataset: Dataset,
    /// One entry per submitted coordinate, in submission order.
    pub outcomes: Vec<CoordinateOutcome>,
    pub cancelled: bool,
}

impl CrawlReport {
    /// Coordinates whose pagination ended on a transport or schema error.
    #[must_use]
    pub fn failed(&self) -> impl Iterator<Item = &CoordinateOutcome> {
        self.outcomes.iter().filter(|o| {
            matches!(o.status, CoordinateStatus::Collected { stop } if stop.is_failure())
        })
    }
}

/// Mutable state for a single [`Crawler::run`].
#[derive(Default)]
struct CrawlState {
    raw: Vec<ListingRecord>,
    outcomes: Vec<CoordinateOutcome>,
    /// Coordinates for which a request was attempted.
    processed: usize,
}

/// Sequential crawler over a list of coordinates.
pub struct Crawler<'a> {
    client: &'a ListingClient,
    settings: CrawlSettings,
}

impl<'a> Crawler<'a> {
    #[must_use]
    pub fn new(client: &'a ListingClient, settings: CrawlSettings) -> Self {
        Self { client, settings }
    }

    /// Collects listings for every coordinate, in order, and builds the
    /// deduplicated dataset.
    ///
    /// A coordinate that fails mid-pagination keeps the records it already
    /// produced and the crawl moves on to the next one. Cancellation stops
    /// the crawl between pages or coordinates; whatever was collected up to
    /// then still goes into the dataset.
    pub async fn run(&self, coordinates: &[Coordinate], cancel: &CancelToken) -> CrawlReport {
        let mut state = CrawlState::default();
        let total = coordinates.len();

        for (index, coordinate) in coordinates.iter().enumerate() {
            if cancel.is_cancelled() {
                state.outcomes.push(CoordinateOutcome {
                    label: coordinate.label.clone(),
                    records: 0,
                    status: CoordinateStatus::Cancelled,
                });
                continue;
            }

            if !self
                .settings
                .bounds
                .contains(coordinate.longitude, coordinate.latitude)
            {
                tracing::warn!(
                    area = %coordinate.label,
                    longitude = coordinate.longitude,
                    latitude = coordinate.latitude,
                    "coordinate outside bounding box; skipping"
                );
                state.outcomes.push(CoordinateOutcome {
                    label: coordinate.label.clone(),
                    records: 0,
                    status: CoordinateStatus::Rejected,
                });
                continue;
            }

            tracing::info!(
                area = %coordinate.label,
                position = index + 1,
                total,
                "crawling coordinate"
            );
            let harvest = self
                .client
                .fetch_listings(coordinate, &self.settings.plan, cancel)
                .await;
            state.processed += 1;

            if harvest.stop.is_failure() {
                tracing::warn!(
                    area = %coordinate.label,
                    fetched = harvest.records.len(),
                    stop = ?harvest.stop,
                    "coordinate ended early; keeping partial results"
                );
            }
            state.outcomes.push(CoordinateOutcome {
                label: coordinate.label.clone(),
                records: harvest.records.len(),
                status: CoordinateStatus::Collected { stop: harvest.stop },
            });
            state.raw.extend(harvest.records);

            // Trailing out-of-bounds coordinates send no request, so they
            // need no pause in front of them.
            let more_to_fetch = coordinates[index + 1..]
                .iter()
                .any(|next| self.settings.bounds.contains(next.longitude, next.latitude));
            if more_to_fetch && !cancel.is_cancelled() {
                let pause = self.pause_after(state.processed);
                if !pause.is_zero() {
                    tracing::debug!(pause_ms = pause.as_millis(), "pausing between coordinates");
                    tokio::time::sleep(pause).await;
                }
            }
        }

        let cancelled = cancel.is_cancelled();
        if cancelled {
            tracing::warn!(collected = state.raw.len(), "crawl cancelled");
        }

        let raw_count = state.raw.len();
        let records = dedupe(state.raw);
        let (summary, areas) = aggregate(&records);

        CrawlReport {
            dataset: Dataset {
                collected_at: Utc::now(),
                raw_count,
                summary,
                areas,
                records,
            },
            outcomes: state.outcomes,
            cancelled,
        }
    }

    /// The pause after the `processed`-th coordinate: the batch pause on
    /// every `batch_size`-th, otherwise the inter-coordinate delay.
    fn pause_after(&self, processed: usize) -> Duration {
        let timing = &self.settings.timing;
        if timing.batch_size > 0 && processed % timing.batch_size == 0 {
            timing.batch_pause
        } else {
            timing.inter_coordinate_delay
        }
    }
}
