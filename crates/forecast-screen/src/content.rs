use std::fmt::Write;

use chrono::{DateTime, Local, Utc};
use forecast_icons::CachedImage;
use forecast_weather::{format_tenths, CurrentWeather, IntervalWeatherInfo};

pub(crate) const DEFAULT_DATE_FORMAT: &str = "%m/%d (%a) %H:%M";

/// Display content for one forecast interval
#[derive(Debug, Clone)]
pub struct RowContent {
    pub date: String,
    pub temperature: String,
    /// `None` until the icon is available, or when there is none
    pub icon: Option<CachedImage>,
}

impl RowContent {
    pub(crate) fn new(info: &IntervalWeatherInfo, date_format: &str, icon: Option<CachedImage>) -> Self {
        Self {
            date: format_date(&info.date, date_format),
            temperature: format_tenths(info.main.temperature),
            icon,
        }
    }
}

/// Display content for the current conditions
#[derive(Debug, Clone)]
pub struct HeaderContent {
    pub address: String,
    pub temperature_range: String,
    pub temperature: String,
    pub icon: Option<CachedImage>,
}

impl HeaderContent {
    pub(crate) fn new(current: &CurrentWeather, icon: Option<CachedImage>) -> Self {
        Self {
            address: current.address.clone(),
            temperature_range: format!(
                "Min {} Max {}",
                format_tenths(current.temperature_min),
                format_tenths(current.temperature_max)
            ),
            temperature: format_tenths(current.temperature),
            icon,
        }
    }
}

/// Local-time rendering of `date`; falls back to the default pattern when
/// `pattern` isn't valid strftime.
pub(crate) fn format_date(date: &DateTime<Utc>, pattern: &str) -> String {
    let local = date.with_timezone(&Local);
    let mut out = String::new();
    if write!(out, "{}", local.format(pattern)).is_ok() {
        return out;
    }

    tracing::warn!("Invalid date format {:?}, using default", pattern);
    out.clear();
    let _ = write!(out, "{}", local.format(DEFAULT_DATE_FORMAT));
    out
}
