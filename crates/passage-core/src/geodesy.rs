//! Spherical-earth navigation math.
//!
//! All distances are nautical miles on a sphere of mean radius
//! [`EARTH_RADIUS_NM`]; all bearings are true degrees in [0, 360).
//! These are pure functions with no external state.

use crate::error::RouteError;
use crate::models::Position;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Mean earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3440.065;

/// Great-circle distance between two positions (haversine), in nm.
///
/// Symmetric within floating-point tolerance: `distance_nm(a, b)` equals
/// `distance_nm(b, a)`.
pub fn distance_nm(a: Position, b: Position) -> f64 {
    let phi1 = a.lat().to_radians();
    let phi2 = b.lat().to_radians();
    let dphi = (b.lat() - a.lat()).to_radians();
    let dlambda = (b.lon() - a.lon()).to_radians();

    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_NM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Initial great-circle bearing from `a` to `b`, degrees in [0, 360).
///
/// Note that `bearing(a, b)` and `bearing(b, a)` differ by exactly 180°
/// only for short near-meridional segments; on a sphere the reverse
/// bearing generally differs. That is expected, not a bug.
pub fn initial_bearing_deg(a: Position, b: Position) -> f64 {
    let phi1 = a.lat().to_radians();
    let phi2 = b.lat().to_radians();
    let dlambda = (b.lon() - a.lon()).to_radians();

    let x = dlambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();

    normalize_bearing(x.atan2(y).to_degrees())
}

/// Rhumb-line (constant bearing, Mercator projection) distance in nm.
pub fn rhumb_distance_nm(a: Position, b: Position) -> f64 {
    let phi1 = a.lat().to_radians();
    let phi2 = b.lat().to_radians();
    let dphi = phi2 - phi1;
    let mut dlambda = (b.lon() - a.lon()).to_radians();

    // Take the short way across the antimeridian.
    if dlambda.abs() > std::f64::consts::PI {
        dlambda -= 2.0 * std::f64::consts::PI * dlambda.signum();
    }

    let dpsi = ((phi2 / 2.0 + std::f64::consts::FRAC_PI_4).tan()
        / (phi1 / 2.0 + std::f64::consts::FRAC_PI_4).tan())
    .ln();
    let q = if dphi.abs() < 1e-10 {
        phi1.cos()
    } else {
        dphi / dpsi
    };

    (dphi * dphi + q * q * dlambda * dlambda).sqrt() * EARTH_RADIUS_NM
}

/// Rhumb-line course from `a` to `b`, degrees in [0, 360).
pub fn rhumb_bearing_deg(a: Position, b: Position) -> f64 {
    let phi1 = a.lat().to_radians();
    let phi2 = b.lat().to_radians();
    let mut dlambda = (b.lon() - a.lon()).to_radians();

    if dlambda.abs() > std::f64::consts::PI {
        dlambda -= 2.0 * std::f64::consts::PI * dlambda.signum();
    }

    let dpsi = ((phi2 / 2.0 + std::f64::consts::FRAC_PI_4).tan()
        / (phi1 / 2.0 + std::f64::consts::FRAC_PI_4).tan())
    .ln();

    normalize_bearing(dlambda.atan2(dpsi).to_degrees())
}

/// Spherical linear interpolation along the great-circle arc from `a`
/// to `b` at `fraction` in [0, 1].
///
/// Fails when the endpoints coincide: the arc has zero angular distance
/// and no defined direction.
pub fn interpolate_great_circle(
    a: Position,
    b: Position,
    fraction: f64,
) -> Result<Position, RouteError> {
    let angular = distance_nm(a, b) / EARTH_RADIUS_NM;
    if angular < 1e-12 {
        return Err(RouteError::DegenerateSegment);
    }

    let sin_angular = angular.sin();
    let f1 = ((1.0 - fraction) * angular).sin() / sin_angular;
    let f2 = (fraction * angular).sin() / sin_angular;

    let phi1 = a.lat().to_radians();
    let lambda1 = a.lon().to_radians();
    let phi2 = b.lat().to_radians();
    let lambda2 = b.lon().to_radians();

    let x = f1 * phi1.cos() * lambda1.cos() + f2 * phi2.cos() * lambda2.cos();
    let y = f1 * phi1.cos() * lambda1.sin() + f2 * phi2.cos() * lambda2.sin();
    let z = f1 * phi1.sin() + f2 * phi2.sin();

    let lat = z.atan2((x * x + y * y).sqrt()).to_degrees();
    let lon = y.atan2(x).to_degrees();
    Ok(Position::from_calculated(lat, lon))
}

/// Destination point a given distance and bearing from `origin`.
pub fn offset_nm(origin: Position, bearing_deg: f64, distance_nm: f64) -> Position {
    if distance_nm.abs() <= f64::EPSILON {
        return origin;
    }

    let phi1 = origin.lat().to_radians();
    let lambda1 = origin.lon().to_radians();
    let theta = bearing_deg.to_radians();
    let delta = distance_nm / EARTH_RADIUS_NM;

    let sin_phi2 = phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos();
    let phi2 = sin_phi2.clamp(-1.0, 1.0).asin();

    let y = theta.sin() * delta.sin() * phi1.cos();
    let x = delta.cos() - phi1.sin() * sin_phi2;
    let lambda2 = lambda1 + y.atan2(x);

    Position::from_calculated(phi2.to_degrees(), lambda2.to_degrees())
}

/// Result of a cross-track error calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossTrack {
    /// Signed perpendicular distance from the track; positive means the
    /// position is right of track.
    pub error_nm: f64,
    /// Bearing to steer to regain the track, degrees.
    pub bearing_to_route_deg: f64,
    /// Closest point on the track (clamped to the segment endpoints).
    pub closest_point: Position,
}

/// Cross-track error of `current` relative to the great-circle path from
/// `route_start` to `route_end`.
///
/// `route_start == route_end` is undefined input; callers must guard.
pub fn cross_track_error(current: Position, route_start: Position, route_end: Position) -> CrossTrack {
    debug_assert!(
        distance_nm(route_start, route_end) > 0.0,
        "cross_track_error requires a non-degenerate route"
    );

    let route_course = initial_bearing_deg(route_start, route_end);
    let route_distance = distance_nm(route_start, route_end);
    let to_current_course = initial_bearing_deg(route_start, current);
    let to_current_distance = distance_nm(route_start, current);

    let angle_diff = signed_angle_deg(to_current_course - route_course);
    let error_nm = to_current_distance * angle_diff.to_radians().sin();

    let along_track = to_current_distance * angle_diff.to_radians().cos();
    let closest_point = if along_track <= 0.0 {
        route_start
    } else if along_track >= route_distance {
        route_end
    } else {
        let fraction = along_track / route_distance;
        // Non-degenerate by the guard above.
        interpolate_great_circle(route_start, route_end, fraction).unwrap_or(route_start)
    };

    let bearing_to_route_deg = if error_nm.abs() < 1e-9 {
        route_course
    } else {
        initial_bearing_deg(current, closest_point)
    };

    CrossTrack {
        error_nm,
        bearing_to_route_deg,
        closest_point,
    }
}

/// Progress report for a vessel between a start and a target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseMadeGood {
    pub course_made_good_deg: f64,
    pub distance_made_good_nm: f64,
    pub course_to_target_deg: f64,
    pub distance_to_target_nm: f64,
    pub total_distance_nm: f64,
    /// May exceed 100 when the vessel has overshot the target; that is
    /// surfaced as-is, never clamped.
    pub progress_percent: f64,
}

pub fn course_made_good(start: Position, current: Position, target: Position) -> CourseMadeGood {
    let distance_made_good_nm = distance_nm(start, current);
    let distance_to_target_nm = distance_nm(current, target);
    let total_distance_nm = distance_nm(start, target);

    let progress_percent = if total_distance_nm > 0.0 {
        distance_made_good_nm / total_distance_nm * 100.0
    } else if distance_to_target_nm <= 0.0 {
        100.0
    } else {
        0.0
    };

    CourseMadeGood {
        course_made_good_deg: initial_bearing_deg(start, current),
        distance_made_good_nm,
        course_to_target_deg: initial_bearing_deg(current, target),
        distance_to_target_nm,
        total_distance_nm,
        progress_percent,
    }
}

/// Estimated time of arrival at `target` from `current`, starting now.
pub fn eta(current: Position, target: Position, speed_knots: f64) -> Result<DateTime<Utc>, RouteError> {
    eta_from(Utc::now(), current, target, speed_knots)
}

/// Estimated time of arrival with an explicit departure instant.
pub fn eta_from(
    departure: DateTime<Utc>,
    current: Position,
    target: Position,
    speed_knots: f64,
) -> Result<DateTime<Utc>, RouteError> {
    if speed_knots <= 0.0 {
        return Err(RouteError::InvalidSpeed(speed_knots));
    }
    let hours = distance_nm(current, target) / speed_knots;
    Ok(departure + Duration::milliseconds((hours * 3_600_000.0) as i64))
}

/// Normalize a bearing into [0, 360).
pub fn normalize_bearing(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

/// Fold an angle difference into [-180, 180].
pub fn signed_angle_deg(deg: f64) -> f64 {
    let folded = (deg + 180.0).rem_euclid(360.0) - 180.0;
    if folded == -180.0 {
        180.0
    } else {
        folded
    }
}
