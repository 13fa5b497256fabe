use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed listing response for {context}: {reason}")]
    MalformedResponse { context: String, reason: String },

    #[error("rate limited by listing API (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid listing endpoint \"{endpoint}\": {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("invalid value for header {name}: {reason}")]
    InvalidHeader { name: &'static str, reason: String },
}

impl ScraperError {
    /// Returns `true` when the provider answered but the body was not the
    /// expected `data.items` shape.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            ScraperError::Deserialize { .. } | ScraperError::MalformedResponse { .. }
        )
    }
}
