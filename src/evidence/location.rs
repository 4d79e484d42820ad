use std::{future::Future, time::Duration};

use thiserror::Error;
use tracing::{debug, warn};

use crate::protocol::Coordinate;

/// Options passed to a location provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationRequest {
    /// Ask for the most precise fix the device can give.
    pub high_accuracy: bool,
    /// Give up after this long.
    pub timeout: Duration,
    /// Oldest cached fix that may be returned. Zero disables the cache.
    pub maximum_age: Duration,
}

impl LocationRequest {
    /// The request used for evidence capture: high accuracy, 10s timeout, no cache.
    pub const EVIDENCE: LocationRequest = LocationRequest {
        high_accuracy: true,
        timeout: Duration::from_secs(10),
        maximum_age: Duration::ZERO,
    };
}

/// A raw position fix, before rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Accuracy radius in meters.
    pub accuracy: Option<f64>,
}

/// Why no position was obtained. None of these block the capture flow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocationError {
    /// The user or platform refused location access.
    #[error("location permission denied")]
    PermissionDenied,
    /// No fix arrived within the request timeout.
    #[error("location request timed out")]
    Timeout,
    /// The device has no location source.
    #[error("location is not supported on this device")]
    Unsupported,
    /// Any other provider failure.
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// A source of device position.
pub trait LocationProvider {
    /// Resolve the current position.
    fn current_position(
        &self,
        request: &LocationRequest,
    ) -> impl Future<Output = Result<PositionFix, LocationError>>;
}

/// Best-effort lookup: any failure, including timeout, yields `None`.
pub async fn acquire_location<L: LocationProvider>(provider: &L) -> Option<Coordinate> {
    let request = LocationRequest::EVIDENCE;

    let outcome = tokio::time::timeout(request.timeout, provider.current_position(&request))
        .await
        .unwrap_or(Err(LocationError::Timeout));

    match outcome {
        Ok(fix) => {
            let mut coordinate = Coordinate::new(fix.latitude, fix.longitude);
            if let Some(accuracy) = fix.accuracy {
                coordinate = coordinate.with_accuracy(accuracy);
            }
            debug!(
                latitude = coordinate.latitude,
                longitude = coordinate.longitude,
                accuracy = ?coordinate.accuracy,
                "Acquired location"
            );
            Some(coordinate)
        }
        Err(e) => {
            warn!(error = %e, "Continuing without location");
            None
        }
    }
}

/// Always reports the same position. Used when coordinates come from the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLocation(pub PositionFix);

impl FixedLocation {
    /// A provider that always reports this position.
    pub fn new(latitude: f64, longitude: f64, accuracy: Option<f64>) -> Self {
        Self(PositionFix {
            latitude,
            longitude,
            accuracy,
        })
    }
}

impl LocationProvider for FixedLocation {
    async fn current_position(
        &self,
        _request: &LocationRequest,
    ) -> Result<PositionFix, LocationError> {
        Ok(self.0)
    }
}

/// A device without location capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

impl LocationProvider for NoLocation {
    async fn current_position(
        &self,
        _request: &LocationRequest,
    ) -> Result<PositionFix, LocationError> {
        Err(LocationError::Unsupported)
    }
}
