//! Geolocation provider seam.
//!
//! Position sampling is a platform concern (GPS, browser API, fused
//! provider); the location session only needs a way to ask for the current
//! fix. Implementations resolve asynchronously and may fail per sample —
//! the session logs and skips failed samples without stopping its schedule.

use async_trait::async_trait;
use thiserror::Error;

/// One position fix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Meters above sea level.
    pub altitude: Option<f64>,
    /// Fix accuracy in meters.
    pub accuracy: Option<f64>,
    /// Heading in degrees (0–360).
    pub heading: Option<f64>,
    /// Speed in meters per second.
    pub speed: Option<f64>,
}

impl Position {
    /// A bare fix with no motion or quality metadata.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            accuracy: None,
            heading: None,
            speed: None,
        }
    }
}

/// Errors a position provider can report for a single sample.
#[derive(Debug, Error)]
pub enum GeolocationError {
    /// The platform could not produce a fix.
    #[error("position unavailable: {0}")]
    Unavailable(String),
    /// The user has not granted location access.
    #[error("location permission denied")]
    PermissionDenied,
    /// The platform did not answer in time.
    #[error("timed out waiting for a position fix")]
    Timeout,
}

/// Source of position fixes.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    /// Sample the current position once.
    async fn current_position(&self) -> Result<Position, GeolocationError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_new_has_no_metadata() {
        let p = Position::new(35.0, -97.0);
        assert_eq!(p.latitude, 35.0);
        assert!(p.altitude.is_none());
        assert!(p.speed.is_none());
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            GeolocationError::Unavailable("no signal".into()).to_string(),
            "position unavailable: no signal"
        );
        assert_eq!(
            GeolocationError::PermissionDenied.to_string(),
            "location permission denied"
        );
    }
}
