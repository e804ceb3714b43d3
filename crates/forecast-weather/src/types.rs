use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::location::CoordinateField;

/// One weather condition attached to a forecast entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Condition {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub description: String,
    /// Icon identifier, e.g. `"01d"`
    #[serde(default)]
    pub icon: String,
}

/// Temperatures for a forecast interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MainInformation {
    #[serde(rename = "temp")]
    pub temperature: f64,
    #[serde(rename = "temp_min")]
    pub temperature_min: f64,
    #[serde(rename = "temp_max")]
    pub temperature_max: f64,
}

/// Forecast entry for one future time slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalWeatherInfo {
    #[serde(rename = "dt", with = "chrono::serde::ts_seconds")]
    pub date: DateTime<Utc>,
    pub main: MainInformation,
    /// Ordered, most significant first
    #[serde(rename = "weather", default)]
    pub conditions: Vec<Condition>,
}

impl IntervalWeatherInfo {
    /// Icon of the leading condition, if it has one
    pub fn icon_name(&self) -> Option<&str> {
        self.conditions
            .first()
            .map(|c| c.icon.as_str())
            .filter(|icon| !icon.is_empty())
    }
}

/// Current conditions shown in the screen header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    #[serde(default)]
    pub address: String,
    pub temperature: f64,
    pub temperature_min: f64,
    pub temperature_max: f64,
    #[serde(default)]
    pub icon: String,
}

impl CurrentWeather {
    pub fn icon_name(&self) -> Option<&str> {
        Some(self.icon.as_str()).filter(|icon| !icon.is_empty())
    }
}

/// Everything the screen needs for one render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub current: CurrentWeather,
    #[serde(default)]
    pub intervals: Vec<IntervalWeatherInfo>,
}

/// Format a temperature to one decimal place with a degree sign.
pub fn format_tenths(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    // avoid "-0.0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:.1}º", rounded)
}

/// Forecast source errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Location required: device location is unknown")]
    LocationRequired,
    #[error("No forecast available: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// The load task panicked or was aborted.
    #[error("Forecast load task failed: {0}")]
    Task(String),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::LocationRequired => "Enter a latitude and longitude to see the weather.",
            Self::NotFound(_) => "No forecast is available for this location.",
            Self::Io(_) => "Forecast data could not be read.",
            Self::Parse(_) => "Forecast data is malformed.",
            Self::Task(_) => "The forecast could not be loaded.",
        }
    }
}

/// Rejected coordinate input
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationInputError {
    #[error("{0} is empty")]
    Empty(CoordinateField),
    #[error("{field} is not a number: {value:?}")]
    NotANumber { field: CoordinateField, value: String },
    #[error("{field} out of range: {value}")]
    OutOfRange { field: CoordinateField, value: f64 },
}
