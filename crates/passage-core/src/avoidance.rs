//! Hazard avoidance pipeline.
//!
//! Runs a fixed sequence of passes over the generated track: land,
//! restricted areas, shallow water, point hazards, then traffic
//! separation. Passes relocate interior waypoints or, for TSS, insert
//! new ones; they never remove or reorder waypoints, and the first and
//! last waypoint are never moved. Each relocation pushes the point far
//! enough past the offending boundary that re-running a pass leaves the
//! track unchanged.

use crate::charts::{ChartStore, TssCorridor};
use crate::config::TssEnforcement;
use crate::geodesy;
use crate::models::{Position, RouteConstraints, VesselProfile, Waypoint};
use crate::spatial;
use crate::ukc;

/// Eight-point compass scan used by the shallow-water search.
const SEARCH_BEARINGS_DEG: [f64; 8] = [0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0];

/// Waypoints after avoidance, plus any advisories raised on the way.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub waypoints: Vec<Waypoint>,
    pub warnings: Vec<String>,
}

/// The avoidance pass sequence over a chart snapshot.
pub struct AvoidancePipeline<'a> {
    store: &'a ChartStore,
}

impl<'a> AvoidancePipeline<'a> {
    pub fn new(store: &'a ChartStore) -> Self {
        Self { store }
    }

    /// Run every pass in order. Interior waypoints may move, TSS may
    /// insert, endpoints stay where generation (and pilotage snapping)
    /// put them.
    pub fn run(
        &self,
        mut waypoints: Vec<Waypoint>,
        vessel: &VesselProfile,
        constraints: &RouteConstraints,
    ) -> PipelineOutcome {
        let mut warnings = Vec::new();

        self.avoid_land(&mut waypoints, &mut warnings);
        self.avoid_restricted(&mut waypoints);
        self.avoid_shallow(&mut waypoints, vessel, constraints, &mut warnings);
        self.avoid_hazards(&mut waypoints);
        self.apply_tss(&mut waypoints, &mut warnings);

        PipelineOutcome {
            waypoints,
            warnings,
        }
    }

    /// Push interior waypoints out of the land mass and its offing
    /// buffer, perpendicular to the nearest boundary.
    fn avoid_land(&self, waypoints: &mut [Waypoint], warnings: &mut Vec<String>) {
        let config = self.store.config();
        // Pre-buffered land already includes the offing; raw coastlines
        // need the full standoff re-applied past the boundary.
        let standoff = if self.store.layers().land_prebuffered {
            config.boundary_margin_nm
        } else {
            config.min_offing_nm + config.boundary_margin_nm
        };

        for waypoint in interior(waypoints) {
            let p = waypoint.position;
            if !self.store.in_land_buffer(p) {
                continue;
            }
            let Some(boundary) = self.store.nearest_land_boundary(p) else {
                continue;
            };
            let Some(outward) = outward_bearing(p, boundary.point, boundary.inside) else {
                warnings.push(format!(
                    "{}: on a land boundary with no defined seaward direction, left in place",
                    waypoint.name.as_deref().unwrap_or("waypoint")
                ));
                continue;
            };
            let relocated = geodesy::offset_nm(boundary.point, outward, standoff);
            tracing::debug!(
                name = waypoint.name.as_deref().unwrap_or(""),
                standoff_nm = standoff,
                "relocating waypoint off land"
            );
            waypoint.relocate(relocated, "Avoid Land");
        }
    }

    /// Push interior waypoints out of restricted areas.
    fn avoid_restricted(&self, waypoints: &mut [Waypoint]) {
        let clearance = self.store.config().restricted_clearance_nm;

        for waypoint in interior(waypoints) {
            let p = waypoint.position;
            let Some(zone) = self.store.restricted_area_at(p) else {
                continue;
            };
            let Some((boundary, _)) = spatial::closest_boundary_point(&zone.polygon, p) else {
                continue;
            };
            let Some(outward) = outward_bearing(p, boundary, true) else {
                continue;
            };
            let relocated = geodesy::offset_nm(boundary, outward, clearance);
            tracing::debug!(
                name = waypoint.name.as_deref().unwrap_or(""),
                zone = %zone.name,
                "relocating waypoint out of restricted area"
            );
            waypoint.relocate(relocated, "Avoid Restricted Area");
        }
    }

    /// Greedy 8-direction search out of water shallower than the
    /// vessel's required depth at planned speed.
    ///
    /// Each iteration first looks for a compliant candidate one step
    /// away; failing that it moves to the first strictly deeper one and
    /// tries again. A waypoint still shallow when the budget runs out is
    /// flagged advisory rather than failing the plan.
    fn avoid_shallow(
        &self,
        waypoints: &mut [Waypoint],
        vessel: &VesselProfile,
        constraints: &RouteConstraints,
        warnings: &mut Vec<String>,
    ) {
        let config = self.store.config();
        let fallback_speed = (constraints.min_speed_knots + constraints.max_speed_knots) / 2.0;

        for waypoint in interior(waypoints) {
            let speed = waypoint.speed_knots.unwrap_or(fallback_speed);
            let required = ukc::required_depth_for(vessel, speed, constraints);

            let start = waypoint.position;
            let mut current = start;
            if self.store.depth_at(current) >= required {
                continue;
            }

            for _ in 0..config.shallow_search_max_iterations {
                let here = self.store.depth_at(current);
                if here >= required {
                    break;
                }

                let candidates: Vec<Position> = SEARCH_BEARINGS_DEG
                    .iter()
                    .map(|b| geodesy::offset_nm(current, *b, config.shallow_search_step_nm))
                    .filter(|c| !self.store.in_land_buffer(*c))
                    .collect();

                if let Some(safe) = candidates
                    .iter()
                    .find(|c| self.store.depth_at(**c) >= required)
                {
                    current = *safe;
                    break;
                }
                match candidates.iter().find(|c| self.store.depth_at(**c) > here) {
                    Some(deeper) => current = *deeper,
                    // Local depth maximum; searching further is pointless.
                    None => break,
                }
            }

            if current != start {
                waypoint.relocate(current, "Avoid Shallow");
            }
            if self.store.depth_at(current) < required {
                waypoint.advisory = true;
                let name = waypoint.name.as_deref().unwrap_or("waypoint").to_string();
                warnings.push(format!(
                    "{name}: could not reach {required:.1} m of water within the search budget, \
                     position is advisory"
                ));
                tracing::warn!(name = %name, required_m = required, "shallow-water search exhausted");
            }
        }
    }

    /// Push interior waypoints outside the standoff radius of charted
    /// wrecks and obstructions.
    fn avoid_hazards(&self, waypoints: &mut [Waypoint]) {
        let config = self.store.config();
        let buffer = config.hazard_buffer_nm;

        for waypoint in interior(waypoints) {
            let p = waypoint.position;
            let Some((hazard, dist)) = self.store.nearest_hazard(p, buffer) else {
                continue;
            };
            // Directly on top of the hazard the outward direction is
            // undefined; push due north.
            let outward = if dist > 1e-6 {
                geodesy::initial_bearing_deg(hazard.position, p)
            } else {
                0.0
            };
            let relocated =
                geodesy::offset_nm(hazard.position, outward, buffer + config.boundary_margin_nm);
            tracing::debug!(
                name = waypoint.name.as_deref().unwrap_or(""),
                hazard = %hazard.name,
                "relocating waypoint clear of hazard"
            );
            waypoint.relocate(relocated, "Avoid Hazard");
        }
    }

    /// Bias segments onto traffic separation corridors.
    ///
    /// A leg belongs to a corridor when any of its endpoints or its
    /// midpoint passes within half the corridor width of the
    /// centerline; the midpoint's projection is then inserted. Under
    /// `Enforce`, a leg opposed to a one-way lane is left alone and a
    /// warning is raised instead.
    fn apply_tss(&self, waypoints: &mut Vec<Waypoint>, warnings: &mut Vec<String>) {
        let config = self.store.config();
        let corridors = self.store.tss_corridors();
        if corridors.is_empty() || waypoints.len() < 2 {
            return;
        }

        let mut insertions: Vec<(usize, Waypoint)> = Vec::new();
        for i in 0..waypoints.len() - 1 {
            let from = waypoints[i].position;
            let to = waypoints[i + 1].position;
            let Ok(midpoint) = geodesy::interpolate_great_circle(from, to, 0.5) else {
                continue;
            };

            let Some(fix) = nearest_corridor(corridors, from, midpoint, to) else {
                continue;
            };
            let (corridor, projected) = (fix.corridor, fix.projected_midpoint);
            if fix.segment_distance_nm() > corridor.corridor_width_nm / 2.0 {
                continue;
            }
            // A vertex already riding the centerline means this leg was
            // placed by an earlier alignment; nothing to add.
            if fix.distances_nm.iter().any(|d| *d <= config.boundary_margin_nm) {
                continue;
            }

            let leg_bearing = geodesy::initial_bearing_deg(from, to);
            if config.tss_enforcement == TssEnforcement::Enforce {
                if let Some(flow) = corridor.flow_bearing_deg() {
                    let off_flow = geodesy::signed_angle_deg(leg_bearing - flow).abs();
                    if off_flow > config.tss_opposed_bearing_deg {
                        warnings.push(format!(
                            "leg near {} runs against the lane ({off_flow:.0}\u{b0} off flow), \
                             not aligned",
                            corridor.name
                        ));
                        continue;
                    }
                }
            }

            insertions.push((
                i + 1,
                Waypoint::new(projected, format!("{} (TSS)", corridor.name)),
            ));
        }

        for (index, waypoint) in insertions.into_iter().rev() {
            waypoints.insert(index, waypoint);
        }
    }
}

fn interior(waypoints: &mut [Waypoint]) -> impl Iterator<Item = &mut Waypoint> + '_ {
    let len = waypoints.len();
    waypoints
        .iter_mut()
        .enumerate()
        .filter(move |(i, _)| *i > 0 && *i + 1 < len)
        .map(|(_, w)| w)
}

/// Seaward bearing at a boundary point: away from the feature when the
/// position is outside it, continuing outward when it is inside. `None`
/// when the position sits exactly on the boundary.
fn outward_bearing(p: Position, boundary: Position, inside: bool) -> Option<f64> {
    if geodesy::distance_nm(p, boundary) <= 1e-6 {
        return None;
    }
    Some(if inside {
        geodesy::initial_bearing_deg(p, boundary)
    } else {
        geodesy::initial_bearing_deg(boundary, p)
    })
}

/// A leg's relation to the corridor it runs closest to.
struct CorridorFix<'c> {
    corridor: &'c TssCorridor,
    projected_midpoint: Position,
    /// Centerline distances of the leg start, midpoint, and end.
    distances_nm: [f64; 3],
}

impl CorridorFix<'_> {
    fn segment_distance_nm(&self) -> f64 {
        self.distances_nm.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

fn nearest_corridor<'c>(
    corridors: &'c [TssCorridor],
    from: Position,
    midpoint: Position,
    to: Position,
) -> Option<CorridorFix<'c>> {
    corridors
        .iter()
        .filter_map(|corridor| {
            let (projected_midpoint, mid_dist) =
                spatial::project_onto_polyline(&corridor.centerline, midpoint)?;
            let (_, from_dist) = spatial::project_onto_polyline(&corridor.centerline, from)?;
            let (_, to_dist) = spatial::project_onto_polyline(&corridor.centerline, to)?;
            Some(CorridorFix {
                corridor,
                projected_midpoint,
                distances_nm: [from_dist, mid_dist, to_dist],
            })
        })
        .min_by(|a, b| a.segment_distance_nm().total_cmp(&b.segment_distance_nm()))
}
