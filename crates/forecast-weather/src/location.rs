//! Coordinates and user-entered location input.

use serde::{Deserialize, Serialize};

use crate::types::LocationInputError;

/// Which half of a coordinate pair an input error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateField {
    Latitude,
    Longitude,
}

impl std::fmt::Display for CoordinateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinateField::Latitude => write!(f, "latitude"),
            CoordinateField::Longitude => write!(f, "longitude"),
        }
    }
}

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationInputError> {
        check_range(CoordinateField::Latitude, latitude, 90.0)?;
        check_range(CoordinateField::Longitude, longitude, 180.0)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse the two text fields of the location prompt.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, LocationInputError> {
        let latitude = parse_field(CoordinateField::Latitude, latitude)?;
        let longitude = parse_field(CoordinateField::Longitude, longitude)?;
        Self::new(latitude, longitude)
    }

    /// Squared distance in degrees; only meaningful for ranking.
    pub(crate) fn squared_distance(&self, other: &Coordinates) -> f64 {
        let d_lat = self.latitude - other.latitude;
        let d_lon = self.longitude - other.longitude;
        d_lat * d_lat + d_lon * d_lon
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}, {:.2}", self.latitude, self.longitude)
    }
}

fn parse_field(field: CoordinateField, text: &str) -> Result<f64, LocationInputError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(LocationInputError::Empty(field));
    }
    text.parse::<f64>()
        .map_err(|_| LocationInputError::NotANumber {
            field,
            value: text.to_string(),
        })
}

fn check_range(field: CoordinateField, value: f64, limit: f64) -> Result<(), LocationInputError> {
    if !value.is_finite() || value.abs() > limit {
        return Err(LocationInputError::OutOfRange { field, value });
    }
    Ok(())
}

/// Which location the forecast should be loaded for
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LocationRequest {
    /// Wherever the device currently is
    #[default]
    Current,
    /// Explicit coordinates entered by the user
    Coordinates(Coordinates),
}
