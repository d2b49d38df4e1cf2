//! Application view state
//!
//! Everything a view layer needs to render either screen. It holds no places;
//! those live in the store and are read through the controller.

use crate::entities::{Coordinates, Region};
use crate::error::{
    Error, INVALID_INPUT, LOCATION_TIMEOUT, LOCATION_UNAVAILABLE, MISSING_LOCATION,
    PERMISSION_DENIED,
};

/// Which of the two screens is showing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Map,
    List,
}

/// How the save form is drawn on top of the map
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FormPresentation {
    #[default]
    Modal,
    BottomSheet,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SaveForm {
    pub name: String,
    pub description: String,
    pub visible: bool,
    pub presentation: FormPresentation,
}

impl SaveForm {
    pub fn new(presentation: FormPresentation) -> Self {
        Self {
            presentation,
            ..Self::default()
        }
    }

    /// Clears the fields and shows the form.
    pub fn open(&mut self) {
        self.name.clear();
        self.description.clear();
        self.visible = true;
    }

    pub fn close(&mut self) {
        self.visible = false;
    }
}

/// User-visible message raised by an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    /// Location access was refused; the map still works but saving does not.
    LocationPermissionRequired,
    /// No fix could be obtained (no GPS, timeout).
    LocationNotFound,
    /// Save attempted before any position was known.
    LocationUnknown,
    /// Save attempted with a blank name.
    NameRequired,
}

impl Notice {
    /// Maps an error to the notice the user should see. Storage errors map to
    /// nothing: they are only logged.
    pub fn for_error(err: &Error) -> Option<Self> {
        match err.code {
            PERMISSION_DENIED => Some(Self::LocationPermissionRequired),
            LOCATION_UNAVAILABLE | LOCATION_TIMEOUT => Some(Self::LocationNotFound),
            MISSING_LOCATION => Some(Self::LocationUnknown),
            INVALID_INPUT => Some(Self::NameRequired),
            _ => None,
        }
    }

    /// Blocking notices need an explicit acknowledgement before the form can be used again.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::LocationUnknown | Self::NameRequired)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::LocationPermissionRequired => "Location permission required",
            Self::LocationNotFound => "Current location not found",
            Self::LocationUnknown => "Location not known yet",
            Self::NameRequired => "Enter a place name",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::LocationPermissionRequired => "Allow location access to use the map fully.",
            Self::LocationNotFound => "Turn on GPS/Location and try again.",
            Self::LocationUnknown => "Tap \"Locate me\" before saving a place.",
            Self::NameRequired => "Please give the place a name.",
        }
    }
}

/// Explicit view state for both screens
#[derive(Clone, Debug, PartialEq)]
pub struct AppState {
    pub screen: Screen,
    pub region: Region,
    /// Last known device position; `None` until the first fix.
    pub current: Option<Coordinates>,
    pub form: SaveForm,
    /// Place awaiting delete confirmation.
    pub pending_delete: Option<String>,
    notices: Vec<Notice>,
    location_notice_shown: bool,
}

impl AppState {
    pub fn new(region: Region, presentation: FormPresentation) -> Self {
        Self {
            screen: Screen::Map,
            region,
            current: None,
            form: SaveForm::new(presentation),
            pending_delete: None,
            notices: Vec::new(),
            location_notice_shown: false,
        }
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Queues the notice for `err`, if any.
    ///
    /// Location failures are shown once per failure streak; `location_acquired`
    /// re-arms them.
    pub fn notify(&mut self, err: &Error) {
        let notice = match Notice::for_error(err) {
            Some(notice) => notice,
            None => return,
        };

        if err.is_location_failure() {
            if self.location_notice_shown {
                return;
            }
            self.location_notice_shown = true;
        }

        self.notices.push(notice);
    }

    pub fn location_acquired(&mut self, position: Coordinates, region: Region) {
        self.current = Some(position);
        self.region = region;
        self.location_notice_shown = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{
        corrupt_state_error, invalid_input_error, location_timeout_error,
        location_unavailable_error, permission_denied_error,
    };

    fn state() -> AppState {
        AppState::new(
            Region::centered(Coordinates::new(0.0, 0.0), 0.05),
            FormPresentation::Modal,
        )
    }

    #[test]
    fn starts_on_map_without_position() {
        let state = state();
        assert_eq!(state.screen, Screen::Map);
        assert_eq!(state.current, None);
        assert!(!state.form.visible);
    }

    #[test]
    fn location_failures_notify_once_per_streak() {
        let mut state = state();

        state.notify(&location_unavailable_error());
        state.notify(&location_timeout_error());
        state.notify(&permission_denied_error());
        assert_eq!(state.take_notices(), [Notice::LocationNotFound]);

        state.location_acquired(
            Coordinates::new(1.0, 1.0),
            Region::centered(Coordinates::new(1.0, 1.0), 0.01),
        );
        state.notify(&location_unavailable_error());
        assert_eq!(state.take_notices(), [Notice::LocationNotFound]);
    }

    #[test]
    fn user_errors_always_notify() {
        let mut state = state();

        state.notify(&invalid_input_error());
        state.notify(&invalid_input_error());
        assert_eq!(state.notices(), &[Notice::NameRequired, Notice::NameRequired]);
        assert!(state.notices()[0].is_blocking());
    }

    #[test]
    fn storage_errors_stay_silent() {
        let mut state = state();
        state.notify(&corrupt_state_error("eof"));
        assert!(state.notices().is_empty());
    }

    #[test]
    fn open_resets_fields() {
        let mut form = SaveForm::new(FormPresentation::BottomSheet);
        form.name = "old".into();
        form.open();

        assert!(form.visible);
        assert!(form.name.is_empty());
        assert_eq!(form.presentation, FormPresentation::BottomSheet);
    }
}
