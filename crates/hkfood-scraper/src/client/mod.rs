//! HTTP client for the listing API's vendors endpoint.

mod paginate;

use std::time::Duration;

use hkfood_core::{ApiProfile, Coordinate};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::ScraperError;
use crate::query::PageRequest;
use crate::rate_limit::retry_with_backoff;
use crate::types::page_items;

pub use paginate::{CoordinateHarvest, StopReason};

/// Hard cap on pages per coordinate, in case the provider ignores `limit`.
pub(super) const MAX_PAGES: usize = 200;

/// HTTP client for the vendors listing endpoint.
///
/// Sends the configured browser-like headers on every request. Non-2xx
/// responses and bodies without `data.items` come back as typed errors;
/// HTTP 429 is retried with backoff up to `max_retries` times.
pub struct ListingClient {
    pub(super) client: Client,
    pub(super) endpoint: Url,
    pub(super) profile: ApiProfile,
    /// Maximum number of retry attempts after a rate-limited response.
    pub(super) max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    pub(super) backoff_base_secs: u64,
}

impl ListingClient {
    /// Creates a `ListingClient` for `profile` with a per-request timeout and
    /// retry policy.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidEndpoint`] if `profile.endpoint` is not a URL.
    /// - [`ScraperError::InvalidHeader`] if a header value contains
    ///   characters HTTP does not allow.
    /// - [`ScraperError::Http`] if the underlying `reqwest::Client` cannot be
    ///   constructed.
    pub fn new(
        profile: &ApiProfile,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let endpoint =
            Url::parse(&profile.endpoint).map_err(|e| ScraperError::InvalidEndpoint {
                endpoint: profile.endpoint.clone(),
                reason: e.to_string(),
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(header_value("User-Agent", &profile.user_agent)?)
            .default_headers(default_headers(profile)?)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            profile: profile.clone(),
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches one page of raw vendor items around `coordinate`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries exhausted.
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`ScraperError::Http`]: timeout, connection or TLS failure.
    /// - [`ScraperError::Deserialize`]: body is not JSON.
    /// - [`ScraperError::MalformedResponse`]: JSON without a `data.items` array.
    pub async fn fetch_page(
        &self,
        coordinate: &Coordinate,
        request: PageRequest,
    ) -> Result<Vec<Value>, ScraperError> {
        let url = self.vendors_url(coordinate, request);
        let context = format!("{} at offset {}", coordinate.label, request.offset);

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            let context = context.clone();
            async move {
                let response = self.client.get(url).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.trim().parse::<u64>().ok())
                        .unwrap_or(0);
                    return Err(ScraperError::RateLimited { retry_after_secs });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: self.endpoint.to_string(),
                    });
                }

                let body = response.text().await?;
                let parsed = serde_json::from_str::<Value>(&body).map_err(|e| {
                    ScraperError::Deserialize {
                        context: context.clone(),
                        source: e,
                    }
                })?;

                page_items(parsed, &context)
            }
        })
        .await
    }

    /// Builds the full vendors URL for one page around `coordinate`.
    fn vendors_url(&self, coordinate: &Coordinate, request: PageRequest) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("longitude", &coordinate.longitude.to_string())
            .append_pair("latitude", &coordinate.latitude.to_string())
            .append_pair("language_id", &self.profile.language_id.to_string())
            .append_pair("include", "characteristics")
            .append_pair("dynamic_pricing", "0")
            .append_pair("configuration", "Variant1")
            .append_pair("country", &self.profile.country)
            .append_pair("sort", request.sort.as_query_value())
            .append_pair("use_free_delivery_label", "false")
            .append_pair("vertical", "restaurants")
            .append_pair("limit", &request.limit.to_string())
            .append_pair("offset", &request.offset.to_string())
            .append_pair("customer_type", &self.profile.customer_type);
        url
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, ScraperError> {
    HeaderValue::from_str(value).map_err(|e| ScraperError::InvalidHeader {
        name,
        reason: e.to_string(),
    })
}

/// The static headers the endpoint expects from a browser session.
fn default_headers(profile: &ApiProfile) -> Result<HeaderMap, ScraperError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        header_value("Accept", &profile.accept)?,
    );
    headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        header_value("Accept-Language", &profile.accept_language)?,
    );
    headers.insert(
        HeaderName::from_static("x-disco-client-id"),
        header_value("x-disco-client-id", &profile.client_id)?,
    );
    headers.insert(
        reqwest::header::REFERER,
        header_value("Referer", &profile.referer)?,
    );
    headers.insert(
        reqwest::header::ORIGIN,
        header_value("Origin", &profile.origin)?,
    );
    Ok(headers)
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
