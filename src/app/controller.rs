//! Application controller
//!
//! Turns user actions into store mutations and viewport requests, and keeps
//! `AppState` in step with both.

use std::time::Duration;

use crate::app::state::{AppState, Screen};
use crate::config::Config;
use crate::entities::{Coordinates, Place, Region};
use crate::error::{missing_location_error, Error};
use crate::location::{locate, DynLocationProvider};
use crate::map::DynMap;
use crate::storage::DynStore;
use crate::store::PlacesStore;
use crate::viewport::ViewportController;

pub struct App {
    state: AppState,
    store: PlacesStore,
    viewport: ViewportController,
    location: DynLocationProvider,
    location_timeout: Duration,
}

impl App {
    /// Builds storage and the location provider from `config`, then starts.
    pub async fn from_config(config: &Config, map: DynMap) -> Result<Self, Error> {
        let storage = config.storage.open().await?;
        let location = config.location.provider()?;

        Ok(Self::start(config, storage, location, map).await)
    }

    /// Loads saved places and asks for location access at the same time, then
    /// tries for a first fix unless access was refused.
    #[tracing::instrument(name = "App::start", skip_all)]
    pub async fn start(
        config: &Config,
        storage: DynStore,
        location: DynLocationProvider,
        map: DynMap,
    ) -> Self {
        let viewport = ViewportController::new(map, config.viewport.clone());
        let state = AppState::new(viewport.initial_region(), config.save_form);

        let (store, permission) = futures::join!(
            PlacesStore::open(storage, config.storage_key.clone()),
            location.request_permission()
        );

        let mut app = Self {
            state,
            store,
            viewport,
            location,
            location_timeout: config.location_timeout,
        };

        app.refresh_markers();

        match permission {
            Ok(()) => {
                app.locate_me().await;
            }
            Err(err) => {
                tracing::warn!("location permission not granted: {}", err);
                app.state.notify(&err);
            }
        }

        app
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn store(&self) -> &PlacesStore {
        &self.store
    }

    pub fn places(&self) -> &[Place] {
        self.store.places()
    }

    /// Saving needs a known position.
    pub fn can_save(&self) -> bool {
        self.state.current.is_some()
    }

    pub fn take_notices(&mut self) -> Vec<crate::app::Notice> {
        self.state.take_notices()
    }

    /// Acquires a fresh fix and centers the map on it.
    ///
    /// On failure the last known position, if any, is kept.
    #[tracing::instrument(skip(self))]
    pub async fn locate_me(&mut self) -> Option<Coordinates> {
        match locate(self.location.as_ref(), self.location_timeout).await {
            Ok(position) => {
                let region = self.viewport.region_for_position(position);
                self.state.location_acquired(position, region);
                self.viewport.request_animate(&region);
                Some(position)
            }
            Err(err) => {
                tracing::warn!("failed to get current position: {}", err);
                self.state.notify(&err);
                None
            }
        }
    }

    /// Shows an empty save form, trying for a fix first if none is known yet.
    pub async fn open_save_form(&mut self) {
        if self.state.current.is_none() {
            self.locate_me().await;
        }

        self.state.form.open();
    }

    pub fn update_form(&mut self, name: &str, description: &str) {
        self.state.form.name = name.into();
        self.state.form.description = description.into();
    }

    pub fn cancel_save_form(&mut self) {
        self.state.form.close();
    }

    /// Saves the form contents at the current position.
    ///
    /// Validation failures raise a blocking notice and leave the form open.
    #[tracing::instrument(skip(self))]
    pub fn save_place(&mut self) -> Result<Place, Error> {
        let result = match self.state.current {
            Some(position) => self.store.add(
                &self.state.form.name,
                &self.state.form.description,
                Some(position),
            ),
            None => Err(missing_location_error()),
        };

        let place = match result {
            Ok(place) => place,
            Err(err) => {
                self.state.notify(&err);
                return Err(err);
            }
        };

        self.state.form.close();
        self.refresh_markers();

        let region = self.viewport.region_for_place(&place);
        self.state.region = region;
        self.viewport.request_animate(&region);
        self.state.screen = Screen::Map;

        Ok(place)
    }

    /// Switches to the map and zooms onto the place. Unknown ids are ignored.
    #[tracing::instrument(skip(self))]
    pub fn focus_place(&mut self, id: &str) -> bool {
        let region = match self.store.get(id) {
            Some(place) => self.viewport.region_for_place(place),
            None => return false,
        };

        self.state.screen = Screen::Map;
        self.state.region = region;
        self.viewport.request_animate(&region);

        true
    }

    pub fn on_marker_selected(&mut self, id: &str) -> bool {
        self.focus_place(id)
    }

    /// The user panned or zoomed the map.
    pub fn on_region_change(&mut self, region: Region) {
        self.state.region = region;
    }

    /// Asks for confirmation before deleting.
    pub fn request_delete(&mut self, id: &str) {
        self.state.pending_delete = Some(id.into());
    }

    pub fn cancel_delete(&mut self) {
        self.state.pending_delete = None;
    }

    /// Deletes the place awaiting confirmation. Returns whether one was removed.
    pub fn confirm_delete(&mut self) -> bool {
        let id = match self.state.pending_delete.take() {
            Some(id) => id,
            None => return false,
        };

        let removed = self.store.remove(&id);
        self.refresh_markers();

        removed
    }

    pub fn show_list(&mut self) {
        self.state.screen = Screen::List;
    }

    pub fn show_map(&mut self) {
        self.state.screen = Screen::Map;
    }

    pub async fn flush(&self) {
        self.store.flush().await
    }

    /// Drains pending write-backs.
    pub async fn shutdown(self) {
        self.store.close().await
    }

    fn refresh_markers(&self) {
        self.viewport.show_markers(&self.store.markers());
    }
}
