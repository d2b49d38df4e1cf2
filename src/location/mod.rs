//! Device position sources.
//!
//! Every provider yields a single best-effort fix or fails with one of
//! `PermissionDenied`, `LocationUnavailable` or `LocationTimeout`. Callers treat
//! all three as "no current position".

mod fixed;
mod simulated;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::entities::Coordinates;
use crate::error::{location_timeout_error, location_unavailable_error, Error};

pub use crate::external::google_maps::GoogleGeolocation;
pub use fixed::FixedProvider;
pub use simulated::SimulatedProvider;

#[async_trait]
pub trait LocationProvider {
    /// Asks for foreground location access. Providers without a permission model grant it.
    async fn request_permission(&self) -> Result<(), Error> {
        Ok(())
    }

    async fn current_position(&self) -> Result<Coordinates, Error>;
}

pub type DynLocationProvider = Arc<dyn LocationProvider + Send + Sync>;

/// Which provider the app reads positions from.
#[derive(Clone, Debug, PartialEq)]
pub enum LocationSource {
    Fixed(Coordinates),
    Simulated,
    GoogleGeolocation,
}

impl LocationSource {
    pub fn provider(&self) -> Result<DynLocationProvider, Error> {
        let provider: DynLocationProvider = match self {
            Self::Fixed(coordinates) => Arc::new(FixedProvider::new(*coordinates)),
            Self::Simulated => Arc::new(SimulatedProvider::default()),
            Self::GoogleGeolocation => Arc::new(GoogleGeolocation::from_env()?),
        };

        Ok(provider)
    }
}

/// Reads the current position, giving up after `timeout`.
///
/// Only `PermissionDenied`, `LocationUnavailable` and `LocationTimeout` leave
/// this function; any other provider error, or an out-of-range fix, is
/// reported as `LocationUnavailable`.
#[tracing::instrument(skip(provider))]
pub async fn locate(
    provider: &(dyn LocationProvider + Send + Sync),
    timeout: Duration,
) -> Result<Coordinates, Error> {
    let result = match tokio::time::timeout(timeout, provider.current_position()).await {
        Ok(result) => result,
        Err(_) => return Err(location_timeout_error()),
    };

    match result {
        Ok(position) if position.is_valid() => Ok(position),
        Ok(position) => {
            tracing::warn!("provider returned an invalid fix: {:?}", position);
            Err(location_unavailable_error())
        }
        Err(err) if err.is_location_failure() => Err(err),
        Err(err) => {
            tracing::warn!("location provider failed: {}", err);
            Err(location_unavailable_error())
        }
    }
}
