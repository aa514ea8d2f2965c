use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Service radius applied to an official's jurisdiction when none is given.
pub const DEFAULT_OFFICIAL_RADIUS_KM: f64 = 10.0;
/// Service radius applied around a citizen's own location.
pub const DEFAULT_CITIZEN_RADIUS_KM: f64 = 5.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
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

    /// Check both components are finite and within their valid ranges.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ValidationError::InvalidLocation(format!(
                "latitude {} out of range",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ValidationError::InvalidLocation(format!(
                "longitude {} out of range",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// A place, attached both to issues and to viewer profiles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
}

/// An official's declared service area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Jurisdiction {
    #[serde(flatten)]
    pub location: Location,
    #[serde(default = "default_service_radius")]
    pub service_radius: f64,
}

fn default_service_radius() -> f64 {
    DEFAULT_OFFICIAL_RADIUS_KM
}

impl Jurisdiction {
    /// The radius to match against. Non-positive or non-finite radii fall back to the default.
    pub fn effective_radius(&self) -> f64 {
        if self.service_radius.is_finite() && self.service_radius > 0.0 {
            self.service_radius
        } else {
            warn!(
                "Ignoring invalid service radius {} in favour of {DEFAULT_OFFICIAL_RADIUS_KM}km",
                self.service_radius
            );
            DEFAULT_OFFICIAL_RADIUS_KM
        }
    }
}
