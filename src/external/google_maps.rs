use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::{
    entities::Coordinates,
    error::{location_unavailable_error, permission_denied_error, upstream_error, Error},
    location::LocationProvider,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct GeolocateRequest {
    #[serde(rename = "considerIp")]
    consider_ip: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct GeolocateResponse {
    location: LatLng,
    accuracy: f64,
}

/// Position from the Google Geolocation API, for hosts without a GPS receiver.
#[derive(Clone, Debug)]
pub struct GoogleGeolocation {
    client: reqwest::Client,
    api_base: String,
    key: String,
}

impl GoogleGeolocation {
    pub fn new(api_base: String, key: String, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_base,
            key,
        })
    }

    pub fn from_env() -> Result<Self, Error> {
        let api_base = env::var("GOOGLE_MAPS_API_BASE")?;
        let key = env::var("GOOGLE_MAPS_API_KEY")?;

        Self::new(api_base, key, Duration::from_secs(10))
    }

    fn url(&self) -> String {
        format!("https://{}/geolocation/v1/geolocate", self.api_base)
    }
}

#[async_trait]
impl LocationProvider for GoogleGeolocation {
    #[tracing::instrument(skip(self))]
    async fn current_position(&self) -> Result<Coordinates, Error> {
        let res = self
            .client
            .post(self.url())
            .query(&[("key", &self.key)])
            .json(&GeolocateRequest { consider_ip: true })
            .send()
            .await?;

        check_status(res.status().as_u16())?;

        let data: GeolocateResponse = res.json().await?;

        tracing::debug!("geolocation fix with accuracy {}m", data.accuracy);

        let coordinates = Coordinates::new(data.location.lat, data.location.lng);
        if !coordinates.is_valid() {
            return Err(upstream_error());
        }

        Ok(coordinates)
    }
}

/// Google answers 404 when it cannot place the device, and 401/403 when the key is refused.
fn check_status(status_code: u16) -> Result<(), Error> {
    match status_code {
        200 => Ok(()),
        401 | 403 => Err(permission_denied_error()),
        404 => Err(location_unavailable_error()),
        _ => Err(upstream_error()),
    }
}

#[test]
fn maps_status_codes() {
    use crate::error::{LOCATION_UNAVAILABLE, PERMISSION_DENIED};

    assert!(check_status(200).is_ok());
    assert_eq!(check_status(401).unwrap_err().code, PERMISSION_DENIED);
    assert_eq!(check_status(403).unwrap_err().code, PERMISSION_DENIED);
    assert_eq!(check_status(404).unwrap_err().code, LOCATION_UNAVAILABLE);
    assert!(!check_status(500).unwrap_err().is_location_failure());
    assert!(!check_status(429).unwrap_err().is_location_failure());
}

#[test]
fn parses_geolocate_response() {
    let raw = r#"{ "location": { "lat": 13.7563, "lng": 100.5018 }, "accuracy": 1200.0 }"#;
    let data: GeolocateResponse = serde_json::from_str(raw).unwrap();

    assert_eq!(data.location.lat, 13.7563);
    assert_eq!(data.location.lng, 100.5018);
}

#[test]
fn builds_url_from_base() {
    let google = GoogleGeolocation::new(
        "www.googleapis.com".into(),
        "key".into(),
        Duration::from_secs(1),
    )
    .unwrap();

    assert_eq!(
        google.url(),
        "https://www.googleapis.com/geolocation/v1/geolocate"
    );
}
