//! Location acquisition for address creation.
//!
//! Creating an address needs the device position. Providers are pluggable;
//! [`acquire`] applies the single timeout the flow allows and never retries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A position fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius in meters, when the provider reports one
    pub accuracy: Option<f64>,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
        }
    }

    /// Rounds both axes to 6 decimal places.
    pub fn rounded(self) -> Self {
        Self {
            latitude: round6(self.latitude),
            longitude: round6(self.longitude),
            accuracy: self.accuracy,
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

fn round6(v: f64) -> f64 {
    (v * 1_000_000.0).round() / 1_000_000.0
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("Geolocation is not supported by this device.")]
    Unsupported,

    #[error("Location permission denied. Please enable location access in settings.")]
    PermissionDenied,

    #[error("Location information is unavailable.")]
    Unavailable,

    #[error("Location request timed out.")]
    Timeout,

    #[error("{0}")]
    Other(String),
}

/// Source of the current device position
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// Waits at most `timeout` for a fix. The result is rounded.
pub async fn acquire(
    provider: &dyn LocationProvider,
    timeout: Duration,
) -> Result<Coordinates, LocationError> {
    let coords = tokio::time::timeout(timeout, provider.current_position())
        .await
        .map_err(|_| LocationError::Timeout)??;

    if !coords.is_valid() {
        return Err(LocationError::Unavailable);
    }
    Ok(coords.rounded())
}

/// Always answers with the same position.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

impl FixedLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self(Coordinates::new(latitude, longitude))
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// A provider with no positioning hardware.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stalled;

    #[async_trait]
    impl LocationProvider for Stalled {
        async fn current_position(&self) -> Result<Coordinates, LocationError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Coordinates::new(0.0, 0.0))
        }
    }

    struct Denied;

    #[async_trait]
    impl LocationProvider for Denied {
        async fn current_position(&self) -> Result<Coordinates, LocationError> {
            Err(LocationError::PermissionDenied)
        }
    }

    #[tokio::test]
    async fn rounds_to_six_decimals() {
        let provider = FixedLocation::new(12.971598712, 77.594562345);
        let coords = acquire(&provider, Duration::from_secs(10)).await.unwrap();
        assert_eq!(coords.latitude, 12.971599);
        assert_eq!(coords.longitude, 77.594562);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_without_retry() {
        let err = acquire(&Stalled, Duration::from_secs(10)).await.unwrap_err();
        assert_eq!(err, LocationError::Timeout);
    }

    #[tokio::test]
    async fn passes_provider_errors_through() {
        let err = acquire(&Denied, Duration::from_secs(10)).await.unwrap_err();
        assert_eq!(err, LocationError::PermissionDenied);
        let err = acquire(&NoLocation, Duration::from_secs(10)).await.unwrap_err();
        assert_eq!(err, LocationError::Unsupported);
    }

    #[tokio::test]
    async fn rejects_out_of_range_fix() {
        let provider = FixedLocation::new(123.0, 10.0);
        let err = acquire(&provider, Duration::from_secs(1)).await.unwrap_err();
        assert_eq!(err, LocationError::Unavailable);
    }
}
