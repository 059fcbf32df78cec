//! Initial waypoint generation.
//!
//! Produces the base great-circle track the avoidance pipeline then
//! refines. Endpoints inside pilotage waters are snapped to the nearest
//! sea buoy first: the open-water planner does not route inside harbor
//! approaches, it hands over at the pilot boarding area.

use crate::charts::ChartStore;
use crate::error::RouteError;
use crate::geodesy;
use crate::models::{Position, Waypoint};

/// Generate `intermediate_count` evenly spaced waypoints between `start`
/// and `end`, bracketed by a Departure and a Destination waypoint.
///
/// Intermediate points sit at great-circle fractions `i / (count + 1)`.
/// Fails with [`RouteError::DegenerateSegment`] when the (possibly
/// snapped) endpoints coincide.
pub fn generate_waypoints(
    store: &ChartStore,
    start: Position,
    end: Position,
    intermediate_count: usize,
) -> Result<Vec<Waypoint>, RouteError> {
    let mut departure = Waypoint::new(start, "Departure");
    let mut destination = Waypoint::new(end, "Destination");

    if !store.config().optimize_inside_pilotage {
        snap_to_sea_buoy(store, &mut departure);
        snap_to_sea_buoy(store, &mut destination);
    }

    let from = departure.position;
    let to = destination.position;
    if geodesy::distance_nm(from, to) <= 0.0 {
        return Err(RouteError::DegenerateSegment);
    }

    let mut waypoints = Vec::with_capacity(intermediate_count + 2);
    waypoints.push(departure);
    for i in 1..=intermediate_count {
        let fraction = i as f64 / (intermediate_count + 1) as f64;
        let position = geodesy::interpolate_great_circle(from, to, fraction)?;
        waypoints.push(Waypoint::new(position, format!("WP{i}")));
    }
    waypoints.push(destination);

    Ok(waypoints)
}

/// Relocate an endpoint inside pilotage waters to the nearest sea buoy.
/// No-op when the point is in open water or no buoys are charted.
fn snap_to_sea_buoy(store: &ChartStore, waypoint: &mut Waypoint) {
    if !store.in_pilotage_zone(waypoint.position) {
        return;
    }
    let Some(buoy) = store.nearest_sea_buoy(waypoint.position) else {
        tracing::warn!(
            lat = waypoint.position.lat(),
            lon = waypoint.position.lon(),
            "endpoint in pilotage waters but no sea buoys charted"
        );
        return;
    };
    tracing::debug!(
        buoy = %buoy.name,
        lat = buoy.position.lat(),
        lon = buoy.position.lon(),
        "snapping pilotage endpoint to sea buoy"
    );
    waypoint.relocate(buoy.position, &buoy.name);
}
