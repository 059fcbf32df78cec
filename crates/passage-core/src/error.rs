//! Error types for passage planning.

use thiserror::Error;

/// Errors surfaced by geodesy and route planning operations.
///
/// Invalid geometric input is never silently clamped: a latitude out of
/// range or a non-positive speed would corrupt route integrity downstream,
/// so callers get a distinct error instead.
#[derive(Debug, Error)]
pub enum RouteError {
    /// Latitude outside [-90, 90] or a non-finite coordinate.
    #[error("invalid position: latitude {lat} / longitude {lon}")]
    InvalidPosition { lat: f64, lon: f64 },

    /// Speed must be strictly positive for ETA and leg-time calculations.
    #[error("invalid speed: {0} kts (must be > 0)")]
    InvalidSpeed(f64),

    /// Great-circle interpolation between identical endpoints has no
    /// defined direction.
    #[error("degenerate segment: endpoints coincide, direction undefined")]
    DegenerateSegment,

    /// Constraint set fails validation (e.g. min speed above max speed).
    #[error("invalid constraints: {0}")]
    InvalidConstraints(String),

    /// Chart layer data that cannot be interpreted at query time.
    #[error("chart data error: {0}")]
    ChartData(String),
}
