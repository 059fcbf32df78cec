pub mod avoidance;
pub mod charts;
pub mod config;
pub mod error;
pub mod generator;
pub mod geodesy;
pub mod metrics;
pub mod models;
pub mod planner;
pub mod spatial;
pub mod ukc;

pub use avoidance::{AvoidancePipeline, PipelineOutcome};
pub use charts::{
    CableRoute, ChartLayers, ChartStore, DepthArea, LandBoundary, NamedZone, PointHazard,
    SeaBuoy, TssCorridor, TssDirection, NO_DATA_DEPTH_M,
};
pub use config::{RoutingConfig, TssEnforcement};
pub use error::RouteError;
pub use generator::generate_waypoints;
pub use geodesy::{
    course_made_good, cross_track_error, distance_nm, eta, eta_from, initial_bearing_deg,
    interpolate_great_circle, offset_nm, rhumb_bearing_deg, rhumb_distance_nm, CourseMadeGood,
    CrossTrack, EARTH_RADIUS_NM,
};
pub use metrics::{finalize_route, transit_speed_knots};
pub use models::{
    vessel_type_name, Position, Route, RouteConstraints, RouteObjective, VesselProfile, Waypoint,
};
pub use planner::{PlanRequest, RoutePlanner, DEFAULT_INTERMEDIATE_WAYPOINTS};
pub use ukc::{required_depth_for, squat_coefficient, squat_m};
