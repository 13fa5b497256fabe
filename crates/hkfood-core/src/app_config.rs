use std::path::PathBuf;
use std::time::Duration;

use crate::coordinates::BoundingBox;

/// Provider-specific request settings for the listing endpoint.
///
/// The header values emulate a browser session; the provider answers bare
/// clients with an empty or blocked response, so every value here is
/// configurable rather than baked into the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiProfile {
    pub endpoint: String,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    /// Sent as the `x-disco-client-id` header.
    pub client_id: String,
    pub referer: String,
    pub origin: String,
    pub language_id: u32,
    pub country: String,
    pub customer_type: String,
}

impl Default for ApiProfile {
    fn default() -> Self {
        Self {
            endpoint: "https://disco.deliveryhero.io/listing/api/v1/pandora/vendors".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            accept: "application/json, text/plain, */*".to_string(),
            accept_language: "zh-HK,zh;q=0.9,en;q=0.8".to_string(),
            client_id: "web".to_string(),
            referer: "https://www.foodpanda.hk/".to_string(),
            origin: "https://www.foodpanda.hk".to_string(),
            language_id: 10,
            country: "hk".to_string(),
            customer_type: "regular".to_string(),
        }
    }
}

/// Courtesy delays applied by the crawler between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlTiming {
    pub inter_page_delay: Duration,
    pub inter_coordinate_delay: Duration,
    /// A longer pause is taken after every `batch_size`-th coordinate.
    pub batch_size: usize,
    pub batch_pause: Duration,
}

impl Default for CrawlTiming {
    fn default() -> Self {
        Self {
            inter_page_delay: Duration::from_millis(1_000),
            inter_coordinate_delay: Duration::from_millis(1_500),
            batch_size: 5,
            batch_pause: Duration::from_millis(3_000),
        }
    }
}

impl CrawlTiming {
    /// No delays at all. Used by tests against local mock servers.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            inter_page_delay: Duration::ZERO,
            inter_coordinate_delay: Duration::ZERO,
            batch_size: 5,
            batch_pause: Duration::ZERO,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub coordinates_path: PathBuf,
    pub output_dir: PathBuf,
    pub api: ApiProfile,
    pub bounds: BoundingBox,
    pub timing: CrawlTiming,
    pub request_timeout_secs: u64,
    pub page_size: u32,
    pub result_limit: u32,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("coordinates_path", &self.coordinates_path)
            .field("output_dir", &self.output_dir)
            .field("endpoint", &self.api.endpoint)
            .field("client_id", &self.api.client_id)
            .field("country", &self.api.country)
            .field("bounds", &self.bounds)
            .field("timing", &self.timing)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("page_size", &self.page_size)
            .field("result_limit", &self.result_limit)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .finish_non_exhaustive()
    }
}
