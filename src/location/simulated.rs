use async_trait::async_trait;
use rand_distr::{Distribution, Normal};

use super::LocationProvider;
use crate::entities::Coordinates;
use crate::error::{location_unavailable_error, Error};

const METERS_PER_DEGREE: f64 = 111_320.0;

/// GPS stand-in for running without a device: fixes scatter around `center`
/// with a Gaussian error of `accuracy_m` meters.
#[derive(Clone, Debug)]
pub struct SimulatedProvider {
    center: Coordinates,
    accuracy_m: f64,
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new(Coordinates::new(13.7563, 100.5018), 15.0)
    }
}

impl SimulatedProvider {
    pub fn new(center: Coordinates, accuracy_m: f64) -> Self {
        Self { center, accuracy_m }
    }

    fn sample(&self) -> Result<Coordinates, Error> {
        let lat_sigma = self.accuracy_m / METERS_PER_DEGREE;
        let lon_scale = self.center.latitude.to_radians().cos().max(0.01);
        let lon_sigma = self.accuracy_m / (METERS_PER_DEGREE * lon_scale);

        let lat_dist = Normal::new(0.0, lat_sigma).map_err(|_| location_unavailable_error())?;
        let lon_dist = Normal::new(0.0, lon_sigma).map_err(|_| location_unavailable_error())?;

        let mut rng = rand::thread_rng();
        let latitude = (self.center.latitude + lat_dist.sample(&mut rng)).clamp(-90.0, 90.0);
        let mut longitude = self.center.longitude + lon_dist.sample(&mut rng);
        if longitude > 180.0 {
            longitude -= 360.0;
        } else if longitude < -180.0 {
            longitude += 360.0;
        }

        Ok(Coordinates::new(latitude, longitude))
    }
}

#[async_trait]
impl LocationProvider for SimulatedProvider {
    #[tracing::instrument(skip(self))]
    async fn current_position(&self) -> Result<Coordinates, Error> {
        self.sample()
    }
}
