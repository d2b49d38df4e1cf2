use std::collections::HashSet;

use crate::entities::Place;
use crate::error::{corrupt_state_error, persistence_error, Error};

pub fn encode(places: &[Place]) -> Result<String, Error> {
    serde_json::to_string(places).map_err(persistence_error)
}

/// Parses a stored snapshot. A missing or blank value is an empty collection.
pub fn decode(raw: Option<&str>) -> Result<Vec<Place>, Error> {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok(Vec::new()),
    };

    let places: Vec<Place> = serde_json::from_str(raw)?;

    let mut seen = HashSet::with_capacity(places.len());
    for place in &places {
        if !seen.insert(place.id.as_str()) {
            return Err(corrupt_state_error(format!("duplicate id {}", place.id)));
        }
    }

    Ok(places)
}
