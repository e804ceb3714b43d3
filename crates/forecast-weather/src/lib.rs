//! Forecast data for the weather screen.
//!
//! The data model handed to the screen, the icon URL builder, parsing of
//! user-entered coordinates and the `ForecastSource` seam with an offline
//! snapshot implementation.

pub mod icon_url;
pub mod location;
pub mod source;
pub mod types;

pub use icon_url::IconUrlBuilder;
pub use location::{CoordinateField, Coordinates, LocationRequest};
pub use source::{ForecastSource, OfflineForecastSource};
pub use types::*;
