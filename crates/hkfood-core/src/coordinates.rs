//! Search coordinates: the bounding-box check, free-text parsing, and the
//! YAML coordinates file.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Label given to a parsed coordinate when the text carries no name.
pub const CUSTOM_LOCATION_LABEL: &str = "Custom Location";

/// Closed longitude/latitude interval a coordinate must fall within.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_longitude: f64,
    pub max_longitude: f64,
    pub min_latitude: f64,
    pub max_latitude: f64,
}

impl Default for BoundingBox {
    /// Hong Kong, approximately.
    fn default() -> Self {
        Self {
            min_longitude: 113.8,
            max_longitude: 114.5,
            min_latitude: 22.0,
            max_latitude: 22.6,
        }
    }
}

impl BoundingBox {
    /// Returns `true` iff both values lie within the closed intervals.
    /// NaN never does.
    #[must_use]
    pub fn contains(&self, longitude: f64, latitude: f64) -> bool {
        (self.min_longitude..=self.max_longitude).contains(&longitude)
            && (self.min_latitude..=self.max_latitude).contains(&latitude)
    }
}

/// A search anchor: one listing query is issued per coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
    /// Area label propagated onto every record discovered from here.
    pub label: String,
}

impl Coordinate {
    #[must_use]
    pub fn new(longitude: f64, latitude: f64, label: impl Into<String>) -> Self {
        Self {
            longitude,
            latitude,
            label: label.into(),
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({:.4}, {:.4})",
            self.label, self.longitude, self.latitude
        )
    }
}

/// Parse free-form coordinate text such as `"114.1578,22.2842,Central"` or
/// `"114.1578 22.2842 Central"`.
///
/// Text containing a comma is split on commas, anything else on whitespace.
/// An empty comma field still counts as a token, so `"114.1,,22.3"` has a
/// blank latitude.
/// The first two tokens are longitude and latitude; the rest, joined with a
/// single space, is the label ([`CUSTOM_LOCATION_LABEL`] when absent).
///
/// Returns `None` for fewer than two tokens, unparseable numbers, or a point
/// outside `bounds`. Never panics, so callers can loop on retry.
#[must_use]
pub fn parse_coordinate_text(text: &str, bounds: &BoundingBox) -> Option<Coordinate> {
    let text = text.trim();
    let parts: Vec<&str> = if text.contains(',') {
        text.split(',').map(str::trim).collect()
    } else {
        text.split_whitespace().collect()
    };

    let [longitude, latitude, rest @ ..] = parts.as_slice() else {
        return None;
    };
    let longitude = longitude.parse::<f64>().ok()?;
    let latitude = latitude.parse::<f64>().ok()?;
    if !bounds.contains(longitude, latitude) {
        return None;
    }

    let label = rest
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let label = label.trim();
    let label = if label.is_empty() {
        CUSTOM_LOCATION_LABEL
    } else {
        label
    };

    Some(Coordinate::new(longitude, latitude, label))
}

#[derive(Debug, Deserialize)]
pub struct CoordinatesFile {
    pub coordinates: Vec<Coordinate>,
}

/// Load and validate a coordinates YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed, or if any
/// entry has a blank label, a duplicate label, or lies outside `bounds`.
pub fn load_coordinates(path: &Path, bounds: &BoundingBox) -> Result<CoordinatesFile, ConfigError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::CoordinatesFileIo {
            path: path.display().to_string(),
            source: e,
        })?;

    let file: CoordinatesFile = serde_yaml::from_str(&content)?;
    validate_coordinates(&file, bounds)?;

    Ok(file)
}

fn validate_coordinates(file: &CoordinatesFile, bounds: &BoundingBox) -> Result<(), ConfigError> {
    let mut seen_labels = HashSet::new();

    for coordinate in &file.coordinates {
        if coordinate.label.trim().is_empty() {
            return Err(ConfigError::Validation(
                "coordinate label must be non-empty".to_string(),
            ));
        }

        if !bounds.contains(coordinate.longitude, coordinate.latitude) {
            return Err(ConfigError::Validation(format!(
                "coordinate '{}' ({}, {}) is outside the configured bounding box",
                coordinate.label, coordinate.longitude, coordinate.latitude
            )));
        }

        if !seen_labels.insert(coordinate.label.trim().to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate coordinate label: '{}'",
                coordinate.label
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "coordinates_test.rs"]
mod tests;
