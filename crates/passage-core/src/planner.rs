//! High-level route planner tying generation, avoidance, and
//! finalization together.

use crate::avoidance::AvoidancePipeline;
use crate::charts::ChartStore;
use crate::error::RouteError;
use crate::generator;
use crate::metrics;
use crate::models::{Position, Route, RouteConstraints, RouteObjective, VesselProfile};
use chrono::{DateTime, Utc};

/// Default number of intermediate waypoints between the endpoints.
pub const DEFAULT_INTERMEDIATE_WAYPOINTS: usize = 5;

/// A single passage-planning request.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub start: Position,
    pub end: Position,
    pub vessel: VesselProfile,
    pub objective: RouteObjective,
    pub constraints: RouteConstraints,
    pub intermediate_waypoints: usize,
    /// Departure instant; `None` means now.
    pub departure: Option<DateTime<Utc>>,
}

impl PlanRequest {
    pub fn new(start: Position, end: Position, vessel: VesselProfile) -> Self {
        Self {
            start,
            end,
            vessel,
            objective: RouteObjective::default(),
            constraints: RouteConstraints::default(),
            intermediate_waypoints: DEFAULT_INTERMEDIATE_WAYPOINTS,
            departure: None,
        }
    }
}

/// Plans routes against one chart snapshot. Cheap to share: all state
/// is the immutable store.
pub struct RoutePlanner {
    store: ChartStore,
}

impl RoutePlanner {
    pub fn new(store: ChartStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ChartStore {
        &self.store
    }

    /// Plan a passage: generate the base track, run the avoidance
    /// passes, then finalize speeds, ETAs, and scores.
    pub fn plan(&self, request: &PlanRequest) -> Result<Route, RouteError> {
        request.constraints.validate()?;

        let waypoints = generator::generate_waypoints(
            &self.store,
            request.start,
            request.end,
            request.intermediate_waypoints,
        )?;

        let outcome = AvoidancePipeline::new(&self.store).run(
            waypoints,
            &request.vessel,
            &request.constraints,
        );

        let departure = request.departure.unwrap_or_else(Utc::now);
        let route = metrics::finalize_route(
            outcome.waypoints,
            request.objective,
            &request.constraints,
            departure,
            outcome.warnings,
        )?;

        tracing::info!(
            mmsi = request.vessel.mmsi,
            waypoints = route.waypoints.len(),
            distance_nm = route.total_distance_nm,
            duration_h = route.estimated_duration_hours,
            warnings = route.warnings.len(),
            "route planned"
        );
        Ok(route)
    }
}
