//! Headless presenter for the forecast screen.
//!
//! Owns the current forecast, hands out display content for the header and
//! each interval row, and binds weather icons to those targets. Background
//! work (forecast loads, icon downloads) reports back over a channel that
//! the owning thread drains with `pump`.

pub mod action;
pub mod bindings;
pub mod content;
pub mod screen;

pub use action::{LocationPrompt, ScreenAction, ScreenUpdate};
pub use bindings::IconTarget;
pub use content::{HeaderContent, RowContent};
pub use screen::ForecastScreen;
