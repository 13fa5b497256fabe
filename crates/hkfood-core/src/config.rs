use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::app_config::{ApiProfile, AppConfig, CrawlTiming};
use crate::coordinates::BoundingBox;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value cannot be parsed or fails validation.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value cannot be parsed or fails validation.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields the stock
/// Hong Kong crawl profile.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let stock = ApiProfile::default();
    let api = ApiProfile {
        endpoint: or_default("HKFOOD_LISTING_ENDPOINT", &stock.endpoint),
        user_agent: or_default("HKFOOD_USER_AGENT", &stock.user_agent),
        accept: or_default("HKFOOD_ACCEPT", &stock.accept),
        accept_language: or_default("HKFOOD_ACCEPT_LANGUAGE", &stock.accept_language),
        client_id: or_default("HKFOOD_CLIENT_ID", &stock.client_id),
        referer: or_default("HKFOOD_REFERER", &stock.referer),
        origin: or_default("HKFOOD_ORIGIN", &stock.origin),
        language_id: parse_var(&lookup, "HKFOOD_LANGUAGE_ID", stock.language_id)?,
        country: or_default("HKFOOD_COUNTRY", &stock.country),
        customer_type: or_default("HKFOOD_CUSTOMER_TYPE", &stock.customer_type),
    };

    let stock_bounds = BoundingBox::default();
    let bounds = BoundingBox {
        min_longitude: parse_var(&lookup, "HKFOOD_MIN_LONGITUDE", stock_bounds.min_longitude)?,
        max_longitude: parse_var(&lookup, "HKFOOD_MAX_LONGITUDE", stock_bounds.max_longitude)?,
        min_latitude: parse_var(&lookup, "HKFOOD_MIN_LATITUDE", stock_bounds.min_latitude)?,
        max_latitude: parse_var(&lookup, "HKFOOD_MAX_LATITUDE", stock_bounds.max_latitude)?,
    };
    if !(bounds.min_longitude <= bounds.max_longitude && bounds.min_latitude <= bounds.max_latitude)
    {
        return Err(ConfigError::Validation(format!(
            "bounding box is inverted or not finite: {bounds:?}"
        )));
    }

    let timing = CrawlTiming {
        inter_page_delay: Duration::from_millis(parse_var(
            &lookup,
            "HKFOOD_INTER_PAGE_DELAY_MS",
            1_000u64,
        )?),
        inter_coordinate_delay: Duration::from_millis(parse_var(
            &lookup,
            "HKFOOD_INTER_COORDINATE_DELAY_MS",
            1_500u64,
        )?),
        batch_size: parse_var(&lookup, "HKFOOD_BATCH_SIZE", 5usize)?,
        batch_pause: Duration::from_millis(parse_var(&lookup, "HKFOOD_BATCH_PAUSE_MS", 3_000u64)?),
    };

    let page_size: u32 = parse_var(&lookup, "HKFOOD_PAGE_SIZE", 48)?;
    let result_limit: u32 = parse_var(&lookup, "HKFOOD_RESULT_LIMIT", 150)?;
    if page_size == 0 {
        return Err(ConfigError::Validation(
            "HKFOOD_PAGE_SIZE must be greater than zero".to_string(),
        ));
    }
    if result_limit == 0 {
        return Err(ConfigError::Validation(
            "HKFOOD_RESULT_LIMIT must be greater than zero".to_string(),
        ));
    }

    Ok(AppConfig {
        log_level: or_default("HKFOOD_LOG_LEVEL", "info"),
        coordinates_path: PathBuf::from(or_default(
            "HKFOOD_COORDINATES_PATH",
            "./config/coordinates.yaml",
        )),
        output_dir: PathBuf::from(or_default("HKFOOD_OUTPUT_DIR", ".")),
        api,
        bounds,
        timing,
        request_timeout_secs: parse_var(&lookup, "HKFOOD_REQUEST_TIMEOUT_SECS", 15u64)?,
        page_size,
        result_limit,
        max_retries: parse_var(&lookup, "HKFOOD_MAX_RETRIES", 0u32)?,
        retry_backoff_base_secs: parse_var(&lookup, "HKFOOD_RETRY_BACKOFF_BASE_SECS", 5u64)?,
    })
}

/// Parse `var` with `FromStr`, falling back to `default` when it is unset.
fn parse_var<F, T>(lookup: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
