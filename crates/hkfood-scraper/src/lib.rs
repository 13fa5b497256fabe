pub mod aggregate;
pub mod cancel;
pub mod client;
pub mod crawl;
pub mod dedupe;
pub mod error;
pub mod normalize;
pub mod query;
pub(crate) mod rate_limit;
pub mod types;

pub use aggregate::aggregate;
pub use cancel::CancelToken;
pub use client::{CoordinateHarvest, ListingClient, StopReason};
pub use crawl::{CoordinateOutcome, CoordinateStatus, CrawlReport, CrawlSettings, Crawler};
pub use dedupe::dedupe;
pub use error::ScraperError;
pub use normalize::{normalize_page, normalize_vendor};
pub use query::{FetchPlan, PageRequest, SortOrder};
