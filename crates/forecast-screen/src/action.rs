//! User actions the screen accepts and the updates it announces.

/// Commands bound to the screen's controls
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenAction {
    /// Pull-to-refresh
    Refresh,
    /// The "change location" button
    RequestLocationChange,
    /// Coordinates submitted from the location prompt, as typed
    ChangeLocation { latitude: String, longitude: String },
    /// Go back to the device location
    ResetToCurrentLocation,
    /// Location prompt dismissed without input
    CancelLocationPrompt,
}

/// Why the user is being asked for a location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationPrompt {
    /// The user asked to change it
    Change,
    /// No device location is available
    Required,
}

impl LocationPrompt {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Change => "Change location",
            Self::Required => "Location needed",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Change => "Enter the coordinates to show the weather for.",
            Self::Required => "Enter the latitude and longitude to load the weather for.",
        }
    }

    /// Label of the extra "use device location" option, when offered.
    pub fn reset_option(&self) -> Option<&'static str> {
        match self {
            Self::Change => Some("Reset to current location"),
            Self::Required => None,
        }
    }

    /// Whether dismissing the prompt should retry the load.
    pub fn reloads_on_cancel(&self) -> bool {
        matches!(self, Self::Required)
    }
}

/// Notifications for whoever renders the screen
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenUpdate {
    /// New forecast data; header and rows need redrawing
    DataReloaded,
    /// A load finished, successfully or not
    RefreshFinished,
    HeaderIconChanged,
    RowIconChanged(usize),
    LocationPrompt(LocationPrompt),
    /// A load failed; carries a user-facing message
    LoadFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_prompt_offers_reset() {
        assert!(LocationPrompt::Change.reset_option().is_some());
        assert!(!LocationPrompt::Change.reloads_on_cancel());
    }

    #[test]
    fn test_required_prompt_reloads_on_cancel() {
        assert!(LocationPrompt::Required.reset_option().is_none());
        assert!(LocationPrompt::Required.reloads_on_cancel());
    }

    #[test]
    fn test_prompt_texts_non_empty() {
        for prompt in [LocationPrompt::Change, LocationPrompt::Required] {
            assert!(!prompt.title().is_empty());
            assert!(!prompt.message().is_empty());
        }
    }
}
