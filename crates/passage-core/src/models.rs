//! Core data models for passage planning.

use crate::error::RouteError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A validated geographic position.
///
/// Latitude is checked against [-90, 90]; longitude is normalized into
/// (-180, 180]. Construction is the only way to obtain one, so every
/// `Position` in the system satisfies both invariants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPosition")]
pub struct Position {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct RawPosition {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawPosition> for Position {
    type Error = RouteError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Position::new(raw.lat, raw.lon)
    }
}

impl Position {
    pub fn new(lat: f64, lon: f64) -> Result<Self, RouteError> {
        if !lat.is_finite() || !lon.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(RouteError::InvalidPosition { lat, lon });
        }
        Ok(Self {
            lat,
            lon: normalize_longitude(lon),
        })
    }

    /// Internal constructor for coordinates produced by our own geometry,
    /// which cannot leave the valid range.
    pub(crate) fn from_calculated(lat: f64, lon: f64) -> Self {
        debug_assert!((-90.0..=90.0).contains(&lat), "calculated lat {lat}");
        Self {
            lat: lat.clamp(-90.0, 90.0),
            lon: normalize_longitude(lon),
        }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

/// Normalize a longitude into (-180, 180].
fn normalize_longitude(lon: f64) -> f64 {
    let wrapped = lon.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// A single point on a planned route.
///
/// Avoidance passes may replace the position and append a descriptive
/// suffix to the name (e.g. "WP3 (Avoid Shallow)"); they never remove or
/// reorder waypoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: Position,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub speed_knots: Option<f64>,
    #[serde(default)]
    pub course_deg: Option<f64>,
    #[serde(default)]
    pub distance_to_next_nm: Option<f64>,
    #[serde(default)]
    pub eta: Option<DateTime<Utc>>,
    /// Set when an avoidance search exhausted its budget and left this
    /// waypoint at a best-effort, possibly non-compliant position.
    #[serde(default)]
    pub advisory: bool,
}

impl Waypoint {
    pub fn new(position: Position, name: impl Into<String>) -> Self {
        Self {
            position,
            name: Some(name.into()),
            speed_knots: None,
            course_deg: None,
            distance_to_next_nm: None,
            eta: None,
            advisory: false,
        }
    }

    /// Replace the position and record which pass moved it.
    pub fn relocate(&mut self, position: Position, reason: &str) {
        self.position = position;
        let base = self.name.take().unwrap_or_default();
        self.name = Some(format!("{base} ({reason})"));
    }
}

/// A finalized route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub waypoints: Vec<Waypoint>,
    pub total_distance_nm: f64,
    pub estimated_duration_hours: f64,
    pub fuel_consumption_tonnes: f64,
    /// Safety score in [0, 1].
    pub safety_score: f64,
    pub weather_impact_score: f64,
    /// Non-fatal advisories collected during planning, e.g. a shallow-water
    /// search that could not reach a compliant depth.
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub constraints: Option<RouteConstraints>,
}

/// Constraints applied during route optimization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConstraints {
    pub max_speed_knots: f64,
    pub min_speed_knots: f64,
    pub max_wave_height_m: f64,
    pub max_wind_speed_kts: f64,
    pub vessel_draft_m: f64,
    /// Minimum under-keel clearance in meters.
    pub ukc_m: f64,
    /// Apply speed-dependent squat when computing required depth.
    pub apply_squat: bool,
}

impl Default for RouteConstraints {
    fn default() -> Self {
        Self {
            max_speed_knots: 20.0,
            min_speed_knots: 5.0,
            max_wave_height_m: 4.0,
            max_wind_speed_kts: 35.0,
            vessel_draft_m: 10.5,
            ukc_m: 0.6,
            apply_squat: true,
        }
    }
}

impl RouteConstraints {
    pub fn validate(&self) -> Result<(), RouteError> {
        if self.min_speed_knots <= 0.0 || self.max_speed_knots <= 0.0 {
            return Err(RouteError::InvalidConstraints(format!(
                "speeds must be positive ({} / {} kts)",
                self.min_speed_knots, self.max_speed_knots
            )));
        }
        if self.min_speed_knots > self.max_speed_knots {
            return Err(RouteError::InvalidConstraints(format!(
                "min speed {} kts exceeds max speed {} kts",
                self.min_speed_knots, self.max_speed_knots
            )));
        }
        if self.vessel_draft_m < 0.0 || self.ukc_m < 0.0 {
            return Err(RouteError::InvalidConstraints(
                "draft and UKC must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Optimization objectives for route planning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteObjective {
    FuelEfficiency,
    TimeOptimization,
    SafetyFirst,
    #[default]
    Balanced,
}

/// Vessel identity and characteristics relevant to depth planning.
///
/// The vessel type code follows the AIS ship-type table; it drives the
/// squat coefficient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VesselProfile {
    pub mmsi: u32,
    #[serde(default)]
    pub vessel_type: Option<u16>,
    pub draft_m: f64,
}

impl VesselProfile {
    pub fn new(mmsi: u32, vessel_type: Option<u16>, draft_m: f64) -> Self {
        Self {
            mmsi,
            vessel_type,
            draft_m,
        }
    }
}

/// Human-readable name for an AIS vessel type code.
pub fn vessel_type_name(code: u16) -> &'static str {
    match code {
        0 => "Not available",
        20 => "Wing in ground",
        30 => "Fishing",
        31 => "Towing",
        36 => "Sailing",
        37 => "Pleasure craft",
        40 => "High-speed craft",
        50 => "Pilot vessel",
        52 => "Tug",
        60 => "Passenger",
        62 => "Cargo",
        64 => "Tanker",
        66 => "Other",
        _ => "Unknown",
    }
}

/// Maritime unit conversions.
pub mod units {
    pub const KNOTS_TO_KMH: f64 = 1.852;

    pub fn knots_to_kmh(speed_knots: f64) -> f64 {
        speed_knots * KNOTS_TO_KMH
    }

    pub fn kmh_to_knots(speed_kmh: f64) -> f64 {
        speed_kmh / KNOTS_TO_KMH
    }

    pub fn meters_to_feet(meters: f64) -> f64 {
        meters * 3.28084
    }

    pub fn feet_to_meters(feet: f64) -> f64 {
        feet / 3.28084
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_rejects_out_of_range_latitude() {
        assert!(Position::new(90.01, 0.0).is_err());
        assert!(Position::new(-91.0, 0.0).is_err());
        assert!(Position::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn position_normalizes_longitude_into_half_open_range() {
        let p = Position::new(0.0, 190.0).unwrap();
        assert!((p.lon() - -170.0).abs() < 1e-12);

        let p = Position::new(0.0, -180.0).unwrap();
        assert!((p.lon() - 180.0).abs() < 1e-12);

        let p = Position::new(0.0, 180.0).unwrap();
        assert!((p.lon() - 180.0).abs() < 1e-12);

        let p = Position::new(0.0, 540.0).unwrap();
        assert!((p.lon() - 180.0).abs() < 1e-12);
    }

    #[test]
    fn constraints_validation_rejects_inverted_speed_band() {
        let constraints = RouteConstraints {
            min_speed_knots: 18.0,
            max_speed_knots: 12.0,
            ..Default::default()
        };
        assert!(constraints.validate().is_err());
        assert!(RouteConstraints::default().validate().is_ok());
    }

    #[test]
    fn waypoint_relocate_appends_reason() {
        let mut wp = Waypoint::new(Position::new(37.0, -122.0).unwrap(), "WP1");
        let moved = Position::new(37.1, -122.1).unwrap();
        wp.relocate(moved, "Avoid Land");
        assert_eq!(wp.name.as_deref(), Some("WP1 (Avoid Land)"));
        assert_eq!(wp.position, moved);
    }
}
