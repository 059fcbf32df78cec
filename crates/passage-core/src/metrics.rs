//! Route finalization: transit speed, per-leg courses and ETAs, fuel
//! and scoring.

use crate::error::RouteError;
use crate::geodesy;
use crate::models::{Route, RouteConstraints, RouteObjective, Waypoint};
use chrono::{DateTime, Utc};

/// Nominal fuel burn per nautical mile, in tonnes. A single-figure
/// fleet average; per-vessel consumption curves are out of scope.
pub const FUEL_TONNES_PER_NM: f64 = 0.02;

/// Baseline weather impact until a forecast provider is wired in.
pub const WEATHER_IMPACT_PLACEHOLDER: f64 = 0.8;

/// Transit speed for an objective, within the constraint speed band.
pub fn transit_speed_knots(objective: RouteObjective, constraints: &RouteConstraints) -> f64 {
    let min = constraints.min_speed_knots;
    let max = constraints.max_speed_knots;
    match objective {
        // Slow steaming, but not so slow the passage drags: 70% up the band.
        RouteObjective::FuelEfficiency => min + (max - min) * 0.7,
        RouteObjective::TimeOptimization => max,
        RouteObjective::SafetyFirst => max * 0.8,
        RouteObjective::Balanced => (min + max) / 2.0,
    }
}

/// Turn an avoided track into a finalized [`Route`]: assign the transit
/// speed, fill per-leg course, distance, and ETA, and score the result.
///
/// `warnings` are the advisories collected during avoidance; they feed
/// the safety score and are carried on the route verbatim.
pub fn finalize_route(
    mut waypoints: Vec<Waypoint>,
    objective: RouteObjective,
    constraints: &RouteConstraints,
    departure: DateTime<Utc>,
    warnings: Vec<String>,
) -> Result<Route, RouteError> {
    constraints.validate()?;
    let speed = transit_speed_knots(objective, constraints);
    if speed <= 0.0 {
        return Err(RouteError::InvalidSpeed(speed));
    }

    let mut total_distance_nm = 0.0;
    let mut clock = departure;
    for i in 0..waypoints.len() {
        waypoints[i].speed_knots = Some(speed);
        waypoints[i].eta = Some(clock);

        if i + 1 < waypoints.len() {
            let from = waypoints[i].position;
            let to = waypoints[i + 1].position;
            let leg_nm = geodesy::distance_nm(from, to);
            waypoints[i].course_deg = Some(geodesy::initial_bearing_deg(from, to));
            waypoints[i].distance_to_next_nm = Some(leg_nm);
            total_distance_nm += leg_nm;
            clock = geodesy::eta_from(clock, from, to, speed)?;
        }
    }

    let estimated_duration_hours = total_distance_nm / speed;
    let safety_score = safety_score(&waypoints);

    Ok(Route {
        waypoints,
        total_distance_nm,
        estimated_duration_hours,
        fuel_consumption_tonnes: total_distance_nm * FUEL_TONNES_PER_NM,
        safety_score,
        weather_impact_score: WEATHER_IMPACT_PLACEHOLDER,
        warnings,
        constraints: Some(constraints.clone()),
    })
}

/// Safety score in [0.1, 0.8]: start from 0.8, shed up to 0.2 as the
/// waypoint count grows (more turns, more exposure), and 0.1 more per
/// waypoint left in an advisory (non-compliant) position.
fn safety_score(waypoints: &[Waypoint]) -> f64 {
    let advisories = waypoints.iter().filter(|w| w.advisory).count();

    let score = 0.8 - (waypoints.len() as f64 / 20.0).min(0.2) - advisories as f64 * 0.1;
    score.max(0.1)
}
