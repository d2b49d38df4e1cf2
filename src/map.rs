use std::sync::Arc;
use std::time::Duration;

use crate::entities::{Coordinates, Place, Region};

#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub id: String,
    pub coordinate: Coordinates,
    pub title: String,
    pub description: String,
}

impl From<&Place> for Marker {
    fn from(place: &Place) -> Self {
        Self {
            id: place.id.clone(),
            coordinate: place.coordinate,
            title: place.name.clone(),
            description: place.description.clone(),
        }
    }
}

/// The map widget. Both calls are requests; nothing waits for them to finish.
pub trait MapSurface {
    fn animate_to_region(&self, region: &Region, duration: Duration);

    fn show_markers(&self, markers: &[Marker]);
}

pub type DynMap = Arc<dyn MapSurface + Send + Sync>;

/// Logs what a real map would draw.
#[derive(Debug, Default)]
pub struct TracingMap;

impl MapSurface for TracingMap {
    fn animate_to_region(&self, region: &Region, duration: Duration) {
        tracing::info!(
            latitude = region.latitude,
            longitude = region.longitude,
            delta = region.latitude_delta,
            "animate map over {}ms",
            duration.as_millis()
        );
    }

    fn show_markers(&self, markers: &[Marker]) {
        tracing::info!("showing {} markers", markers.len());

        for marker in markers {
            let position: String = marker.coordinate.into();
            tracing::debug!(id = %marker.id, "{} @ {}", marker.title, position);
        }
    }
}
