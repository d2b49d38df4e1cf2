use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Coordinates;
use crate::error::{invalid_input_error, missing_location_error, Error};

/// A saved location bookmark. Serialized field names match the persisted snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub coordinate: Coordinates,
    pub created_at: DateTime<Utc>,
}

impl Place {
    /// Builds a new place from raw form input.
    ///
    /// The position is checked before the name, so a save attempted without a
    /// known location reports the missing location even if the name is empty too.
    /// Non-finite or out-of-range coordinates are invalid input: they would not
    /// survive the JSON snapshot.
    pub fn new(
        name: &str,
        description: &str,
        coordinate: Option<Coordinates>,
    ) -> Result<Self, Error> {
        let coordinate = coordinate.ok_or_else(|| missing_location_error())?;
        if !coordinate.is_valid() {
            return Err(invalid_input_error());
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(invalid_input_error());
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.trim().into(),
            coordinate,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{INVALID_INPUT, MISSING_LOCATION};

    #[test]
    fn trims_input() {
        let place = Place::new(
            "  Home ",
            "\tporch light on\n",
            Some(Coordinates::new(1.0, 2.0)),
        )
        .unwrap();

        assert_eq!(place.name, "Home");
        assert_eq!(place.description, "porch light on");
        assert_eq!(place.coordinate, Coordinates::new(1.0, 2.0));
    }

    #[test]
    fn rejects_blank_name() {
        let err = Place::new("   ", "", Some(Coordinates::new(0.0, 0.0))).unwrap_err();
        assert_eq!(err.code, INVALID_INPUT);
    }

    #[test]
    fn rejects_non_finite_coordinate() {
        for coordinate in [
            Coordinates::new(f64::NAN, 100.5),
            Coordinates::new(13.75, f64::INFINITY),
            Coordinates::new(120.0, 0.0),
        ] {
            let err = Place::new("Home", "", Some(coordinate)).unwrap_err();
            assert_eq!(err.code, INVALID_INPUT);
        }
    }

    #[test]
    fn missing_location_wins_over_blank_name() {
        let err = Place::new("", "", None).unwrap_err();
        assert_eq!(err.code, MISSING_LOCATION);
    }

    #[test]
    fn wire_format() {
        let raw = r#"{
            "id": "1718000000000",
            "name": "Cafe",
            "description": "Good coffee",
            "coordinate": { "latitude": 13.76, "longitude": 100.51 },
            "createdAt": "2024-06-10T06:13:20.000Z"
        }"#;

        let place: Place = serde_json::from_str(raw).unwrap();
        assert_eq!(place.id, "1718000000000");
        assert_eq!(place.coordinate.latitude, 13.76);

        let value = serde_json::to_value(&place).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("created_at").is_none());
    }
}
