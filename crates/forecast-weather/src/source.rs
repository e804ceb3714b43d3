//! Forecast data sources.

use std::future::Future;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::instrument;

use crate::location::{Coordinates, LocationRequest};
use crate::types::{ForecastSnapshot, WeatherError};

/// Produces the forecast shown on the screen.
///
/// `WeatherError::LocationRequired` tells the caller to ask the user for
/// coordinates instead of treating the failure as fatal.
pub trait ForecastSource: Send + Sync + 'static {
    fn load(
        &self,
        request: LocationRequest,
    ) -> impl Future<Output = Result<ForecastSnapshot, WeatherError>> + Send;
}

/// On-disk snapshot file layout
#[derive(Debug, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    device_location: Option<Coordinates>,
    #[serde(default)]
    snapshots: Vec<LocatedSnapshot>,
}

#[derive(Debug, Deserialize)]
struct LocatedSnapshot {
    location: Coordinates,
    forecast: ForecastSnapshot,
}

/// Serves forecasts from a JSON snapshot file.
///
/// The file is re-read on every load so edits show up on refresh. A
/// request resolves to the snapshot nearest to the requested position.
#[derive(Debug, Clone)]
pub struct OfflineForecastSource {
    path: PathBuf,
}

impl OfflineForecastSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<SnapshotFile, WeatherError> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl ForecastSource for OfflineForecastSource {
    #[instrument(skip(self), fields(path = %self.path.display()), level = "info")]
    async fn load(&self, request: LocationRequest) -> Result<ForecastSnapshot, WeatherError> {
        let file = self.read().await?;

        let target = match request {
            LocationRequest::Coordinates(c) => c,
            LocationRequest::Current => file.device_location.ok_or(WeatherError::LocationRequired)?,
        };

        let nearest = file
            .snapshots
            .into_iter()
            .min_by(|a, b| {
                a.location
                    .squared_distance(&target)
                    .total_cmp(&b.location.squared_distance(&target))
            })
            .ok_or_else(|| WeatherError::NotFound(format!("no snapshots near {}", target)))?;

        let mut forecast = nearest.forecast;
        if forecast.current.address.is_empty() {
            forecast.current.address = nearest.location.to_string();
        }

        tracing::info!(
            "Loaded forecast for {} ({} intervals)",
            forecast.current.address,
            forecast.intervals.len()
        );
        Ok(forecast)
    }
}
