use async_trait::async_trait;

use super::LocationProvider;
use crate::entities::Coordinates;
use crate::error::{location_unavailable_error, permission_denied_error, Error};

/// Reports the same position every time, or a fixed failure.
#[derive(Clone, Debug)]
pub struct FixedProvider {
    position: Option<Coordinates>,
    permission_granted: bool,
}

impl FixedProvider {
    pub fn new(position: Coordinates) -> Self {
        Self {
            position: Some(position),
            permission_granted: true,
        }
    }

    /// Permission granted, but the device never produces a fix.
    pub fn unavailable() -> Self {
        Self {
            position: None,
            permission_granted: true,
        }
    }

    pub fn denied() -> Self {
        Self {
            position: None,
            permission_granted: false,
        }
    }
}

#[async_trait]
impl LocationProvider for FixedProvider {
    async fn request_permission(&self) -> Result<(), Error> {
        match self.permission_granted {
            true => Ok(()),
            false => Err(permission_denied_error()),
        }
    }

    async fn current_position(&self) -> Result<Coordinates, Error> {
        if !self.permission_granted {
            return Err(permission_denied_error());
        }

        self.position.ok_or_else(|| location_unavailable_error())
    }
}
