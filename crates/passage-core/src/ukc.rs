//! Under-keel clearance: squat, required depth, and depth contours.
//!
//! Deterministic, side-effect-free functions of vessel profile, speed,
//! and constraints. Tide is assumed zero, which keeps the contours
//! conservative.

use crate::models::{RouteConstraints, VesselProfile};

/// Squat coefficient by AIS vessel type code.
///
/// Tankers and cargo ships sit deepest at speed; passenger vessels and
/// high-speed craft are finer-hulled. Unknown codes fall back to a
/// conservative middle value rather than erroring.
pub fn squat_coefficient(vessel_type: Option<u16>) -> f64 {
    match vessel_type {
        Some(62) | Some(64) => 1.0,
        Some(40) | Some(60) => 0.6,
        Some(20) | Some(30) | Some(31) | Some(36) | Some(37) | Some(50) | Some(52) | Some(66) => {
            0.8
        }
        _ => 0.7,
    }
}

/// Estimated squat in meters at the given speed.
pub fn squat_m(vessel_type: Option<u16>, speed_knots: f64) -> f64 {
    squat_coefficient(vessel_type) * speed_knots * speed_knots / 100.0
}

/// Depth the vessel needs under it: draft plus the larger of the UKC
/// minimum and the squat at speed.
pub fn required_depth_m(draft_m: f64, ukc_m: f64, squat_m: f64) -> f64 {
    draft_m + ukc_m.max(squat_m)
}

/// Required depth for a vessel at speed under the given constraints.
pub fn required_depth_for(vessel: &VesselProfile, speed_knots: f64, constraints: &RouteConstraints) -> f64 {
    let squat = if constraints.apply_squat {
        squat_m(vessel.vessel_type, speed_knots)
    } else {
        0.0
    };
    required_depth_m(vessel.draft_m, constraints.ukc_m, squat)
}

/// Shallow contour: water shallower than this is unsafe at the given
/// speed (draft + UKC + squat, tide zero).
pub fn shallow_contour_m(draft_m: f64, ukc_m: f64, squat_m: f64) -> f64 {
    draft_m + ukc_m + squat_m
}

/// Safety contour: shallow contour plus a fixed planning margin.
pub fn safety_contour_m(shallow_contour_m: f64, safety_margin_m: f64) -> f64 {
    shallow_contour_m + safety_margin_m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tanker_squat_at_twelve_knots() {
        // coefficient 1.0 * 12^2 / 100
        let squat = squat_m(Some(64), 12.0);
        assert!((squat - 1.44).abs() < 1e-9);
    }

    #[test]
    fn required_depth_uses_larger_of_ukc_and_squat() {
        let squat = squat_m(Some(64), 12.0);
        let required = required_depth_m(10.5, 0.6, squat);
        assert!((required - 11.94).abs() < 1e-9);

        // At low speed squat falls below the UKC minimum, which governs.
        let slow_squat = squat_m(Some(64), 5.0); // 0.25 m
        let required = required_depth_m(10.5, 0.6, slow_squat);
        assert!((required - 11.1).abs() < 1e-9);
    }

    #[test]
    fn coefficient_table_covers_known_and_unknown_codes() {
        assert_eq!(squat_coefficient(Some(62)), 1.0);
        assert_eq!(squat_coefficient(Some(64)), 1.0);
        assert_eq!(squat_coefficient(Some(60)), 0.6);
        assert_eq!(squat_coefficient(Some(40)), 0.6);
        assert_eq!(squat_coefficient(Some(52)), 0.8);
        assert_eq!(squat_coefficient(Some(0)), 0.7);
        assert_eq!(squat_coefficient(Some(999)), 0.7);
        assert_eq!(squat_coefficient(None), 0.7);
    }

    #[test]
    fn contours_stack_draft_ukc_squat_and_margin() {
        let squat = squat_m(Some(62), 15.0); // 2.25 m
        let shallow = shallow_contour_m(8.5, 0.6, squat);
        assert!((shallow - 11.35).abs() < 1e-9);
        let safety = safety_contour_m(shallow, 2.0);
        assert!((safety - 13.35).abs() < 1e-9);
    }

    #[test]
    fn squat_can_be_disabled_by_constraints() {
        let vessel = VesselProfile::new(123456, Some(64), 10.5);
        let constraints = RouteConstraints {
            apply_squat: false,
            ..Default::default()
        };
        let required = required_depth_for(&vessel, 18.0, &constraints);
        assert!((required - 11.1).abs() < 1e-9);
    }
}
