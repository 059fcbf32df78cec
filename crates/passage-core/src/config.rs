//! Routing configuration.
//!
//! Passed explicitly into `ChartStore` and the avoidance pipeline at
//! construction time; there is no ambient global settings object.

use serde::{Deserialize, Serialize};

/// How traffic separation schemes influence routing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TssEnforcement {
    /// Bias segments onto corridor centerlines regardless of direction.
    Prefer,
    /// Bias onto corridors, but never against a one-way lane.
    #[default]
    Enforce,
}

/// Tunable policy for chart queries and the avoidance pipeline.
///
/// The directional and search constants are empirically chosen values
/// carried over from operational use; they are named fields here so a
/// deployment can override them rather than re-derive them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Minimum offing (standoff from the coastline) in nautical miles.
    pub min_offing_nm: f64,
    /// Company-policy default vessel draft in meters.
    pub default_vessel_draft_m: f64,
    /// Default under-keel clearance in meters.
    pub default_ukc_m: f64,
    pub tss_enforcement: TssEnforcement,
    /// When false, route endpoints inside pilotage waters snap to the
    /// nearest sea buoy before any optimization.
    pub optimize_inside_pilotage: bool,
    /// Margin added beyond the shallow contour to form the safety contour.
    pub safety_depth_margin_m: f64,

    /// A segment is "opposed" to a one-way corridor when its bearing
    /// differs from the corridor bearing by more than this many degrees.
    pub tss_opposed_bearing_deg: f64,
    /// Extra clearance pushed past a boundary after repulsion, so the
    /// relocated point sits strictly outside the buffer rather than on it.
    pub boundary_margin_nm: f64,
    /// Standoff radius around wrecks and obstructions.
    pub hazard_buffer_nm: f64,
    /// Clearance pushed past a restricted-area boundary.
    pub restricted_clearance_nm: f64,
    /// Step size of the 8-direction shallow-water search.
    pub shallow_search_step_nm: f64,
    /// Iteration cap for the shallow-water search.
    pub shallow_search_max_iterations: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            min_offing_nm: 3.0,
            default_vessel_draft_m: 10.5,
            default_ukc_m: 0.6,
            tss_enforcement: TssEnforcement::Enforce,
            optimize_inside_pilotage: false,
            safety_depth_margin_m: 2.0,
            tss_opposed_bearing_deg: 120.0,
            boundary_margin_nm: 0.1,
            hazard_buffer_nm: 1.0,
            restricted_clearance_nm: 1.0,
            shallow_search_step_nm: 0.5,
            shallow_search_max_iterations: 12,
        }
    }
}
