use std::time::Duration;

use crate::entities::{Coordinates, Place, Region};
use crate::map::{DynMap, Marker};

#[derive(Clone, Debug, PartialEq)]
pub struct ViewportConfig {
    /// Span used when zooming onto a single coordinate.
    pub focus_delta: f64,
    pub animation: Duration,
    /// Shown before the first position fix.
    pub initial_region: Region,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            focus_delta: 0.01,
            animation: Duration::from_millis(600),
            initial_region: Region::centered(Coordinates::new(13.7563, 100.5018), 0.05),
        }
    }
}

pub struct ViewportController {
    map: DynMap,
    config: ViewportConfig,
}

impl ViewportController {
    pub fn new(map: DynMap, config: ViewportConfig) -> Self {
        Self { map, config }
    }

    pub fn initial_region(&self) -> Region {
        self.config.initial_region
    }

    pub fn region_for_position(&self, coordinate: Coordinates) -> Region {
        Region::centered(coordinate, self.config.focus_delta)
    }

    pub fn region_for_place(&self, place: &Place) -> Region {
        self.region_for_position(place.coordinate)
    }

    #[tracing::instrument(skip(self))]
    pub fn request_animate(&self, region: &Region) {
        self.map.animate_to_region(region, self.config.animation);
    }

    pub fn show_markers(&self, markers: &[Marker]) {
        self.map.show_markers(markers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapSurface;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorder {
        animations: Mutex<Vec<(Region, Duration)>>,
    }

    impl MapSurface for Recorder {
        fn animate_to_region(&self, region: &Region, duration: Duration) {
            self.animations.lock().unwrap().push((*region, duration));
        }

        fn show_markers(&self, _markers: &[Marker]) {}
    }

    #[test]
    fn tight_region_around_position() {
        let controller =
            ViewportController::new(Arc::new(Recorder::default()), ViewportConfig::default());
        let region = controller.region_for_position(Coordinates::new(13.75, 100.5));

        assert_eq!(region.center(), Coordinates::new(13.75, 100.5));
        assert_eq!(region.latitude_delta, 0.01);
        assert_eq!(region.longitude_delta, 0.01);
    }

    #[test]
    fn place_region_matches_position_region() {
        let controller =
            ViewportController::new(Arc::new(Recorder::default()), ViewportConfig::default());
        let place = Place::new("Cafe", "", Some(Coordinates::new(13.76, 100.51))).unwrap();

        assert_eq!(
            controller.region_for_place(&place),
            controller.region_for_position(place.coordinate)
        );
    }

    #[test]
    fn animate_uses_configured_duration() {
        let map = Arc::new(Recorder::default());
        let controller = ViewportController::new(map.clone(), ViewportConfig::default());
        let region = controller.region_for_position(Coordinates::new(1.0, 2.0));

        controller.request_animate(&region);

        assert_eq!(
            map.animations.lock().unwrap().as_slice(),
            &[(region, Duration::from_millis(600))]
        );
    }
}
