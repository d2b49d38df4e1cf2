use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl From<Coordinates> for String {
    fn from(coordinates: Coordinates) -> Self {
        format!("{:.6}, {:.6}", coordinates.latitude, coordinates.longitude)
    }
}

#[test]
fn formats_with_six_decimals() {
    let s: String = Coordinates::new(13.75, 100.5).into();
    assert_eq!(s, "13.750000, 100.500000");
}

#[test]
fn rejects_out_of_range() {
    assert!(Coordinates::new(13.75, 100.5).is_valid());
    assert!(!Coordinates::new(91.0, 0.0).is_valid());
    assert!(!Coordinates::new(0.0, f64::NAN).is_valid());
}
