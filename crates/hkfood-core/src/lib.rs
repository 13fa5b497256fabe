pub mod app_config;
pub mod config;
pub mod coordinates;
pub mod dataset;
pub mod listing;

pub use app_config::{ApiProfile, AppConfig, CrawlTiming};
pub use config::{load_app_config, load_app_config_from_env};
pub use coordinates::{
    load_coordinates, parse_coordinate_text, BoundingBox, Coordinate, CoordinatesFile,
    CUSTOM_LOCATION_LABEL,
};
pub use dataset::{AreaStats, Dataset, SummaryStats};
pub use listing::ListingRecord;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read coordinates file {path}: {source}")]
    CoordinatesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse coordinates file: {0}")]
    CoordinatesFileParse(#[from] serde_yaml::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
