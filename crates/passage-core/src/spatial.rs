//! Spatial index and planar geometry predicates for chart queries.
//!
//! Chart features live in lon/lat degree space as `geo` primitives. A
//! coarse grid-cell index over feature bounding boxes prefilters
//! candidates; exact containment/projection runs on the survivors. Query
//! radii are converted from nautical miles with latitude-aware scaling
//! (one degree of latitude is ~60 nm, longitude shrinks with cos(lat)).

use crate::geodesy;
use crate::models::Position;
use geo::{BoundingRect, Closest, ClosestPoint, Contains, LineString, Point, Polygon, Rect};
use std::collections::HashMap;

/// Default index cell edge in degrees.
pub const DEFAULT_CELL_SIZE_DEG: f64 = 0.5;

const NM_PER_DEG_LAT: f64 = 60.0;

/// Grid-cell prefilter over feature bounding boxes.
///
/// Each feature id is registered in every cell its bounding box overlaps,
/// so a point query only needs the cells covering the query disc.
#[derive(Debug, Clone, Default)]
pub struct CellIndex {
    cell_size_deg: f64,
    cells: HashMap<(i32, i32), Vec<usize>>,
    len: usize,
}

impl CellIndex {
    pub fn build(bounds: &[Option<Rect<f64>>], cell_size_deg: f64) -> Self {
        let cell_size_deg = cell_size_deg.max(1e-3);
        let mut cells: HashMap<(i32, i32), Vec<usize>> = HashMap::new();

        for (id, rect) in bounds.iter().enumerate() {
            let Some(rect) = rect else { continue };
            let (min_cx, min_cy) = cell_of(rect.min().x, rect.min().y, cell_size_deg);
            let (max_cx, max_cy) = cell_of(rect.max().x, rect.max().y, cell_size_deg);
            for cx in min_cx..=max_cx {
                for cy in min_cy..=max_cy {
                    cells.entry((cx, cy)).or_default().push(id);
                }
            }
        }

        Self {
            cell_size_deg,
            cells,
            len: bounds.len(),
        }
    }

    /// Feature ids whose bounding box may lie within `radius_nm` of `p`.
    /// Sorted and deduplicated; exact tests are the caller's job.
    pub fn query(&self, p: Position, radius_nm: f64) -> Vec<usize> {
        if self.cells.is_empty() {
            return Vec::new();
        }

        let radius_nm = radius_nm.max(0.0);
        let dlat_deg = radius_nm / NM_PER_DEG_LAT;
        let cos_lat = p.lat().to_radians().cos().abs().max(0.01);
        let dlon_deg = radius_nm / (NM_PER_DEG_LAT * cos_lat);

        let (min_cx, min_cy) = cell_of(p.lon() - dlon_deg, p.lat() - dlat_deg, self.cell_size_deg);
        let (max_cx, max_cy) = cell_of(p.lon() + dlon_deg, p.lat() + dlat_deg, self.cell_size_deg);

        let mut ids = Vec::new();
        for cx in min_cx..=max_cx {
            for cy in min_cy..=max_cy {
                if let Some(entries) = self.cells.get(&(cx, cy)) {
                    ids.extend_from_slice(entries);
                }
            }
        }
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn cell_of(x: f64, y: f64, cell_size_deg: f64) -> (i32, i32) {
    (
        (x / cell_size_deg).floor() as i32,
        (y / cell_size_deg).floor() as i32,
    )
}

/// Lon/lat point for a position (`geo` convention: x = lon, y = lat).
pub fn to_point(p: Position) -> Point<f64> {
    Point::new(p.lon(), p.lat())
}

fn from_point(p: Point<f64>) -> Position {
    Position::from_calculated(p.y(), p.x())
}

/// Build a ring from `[lon, lat]` coordinate pairs (GeoJSON order).
pub fn ring_from_coords(coords: &[[f64; 2]]) -> LineString<f64> {
    LineString::from(
        coords
            .iter()
            .map(|c| (c[0], c[1]))
            .collect::<Vec<(f64, f64)>>(),
    )
}

pub fn point_in_polygon(polygon: &Polygon<f64>, p: Position) -> bool {
    polygon.contains(&to_point(p))
}

/// Closest point on the polygon's exterior ring, with its great-circle
/// distance from `p` in nm. `None` for an empty ring.
pub fn closest_boundary_point(polygon: &Polygon<f64>, p: Position) -> Option<(Position, f64)> {
    let closest = match polygon.exterior().closest_point(&to_point(p)) {
        Closest::Intersection(c) | Closest::SinglePoint(c) => from_point(c),
        Closest::Indeterminate => return None,
    };
    Some((closest, geodesy::distance_nm(p, closest)))
}

/// Project `p` onto a polyline, returning the closest point on the line
/// and its great-circle distance from `p` in nm.
pub fn project_onto_polyline(line: &LineString<f64>, p: Position) -> Option<(Position, f64)> {
    let projected = match line.closest_point(&to_point(p)) {
        Closest::Intersection(c) | Closest::SinglePoint(c) => from_point(c),
        Closest::Indeterminate => return None,
    };
    Some((projected, geodesy::distance_nm(p, projected)))
}

/// Overall bearing of a polyline (first vertex to last), degrees.
pub fn polyline_bearing_deg(line: &LineString<f64>) -> Option<f64> {
    let first = line.points().next()?;
    let last = line.points().last()?;
    let a = from_point(first);
    let b = from_point(last);
    if geodesy::distance_nm(a, b) <= 0.0 {
        return None;
    }
    Some(geodesy::initial_bearing_deg(a, b))
}

/// Bounding rectangle of a polygon, if non-empty.
pub fn polygon_bounds(polygon: &Polygon<f64>) -> Option<Rect<f64>> {
    polygon.bounding_rect()
}

/// Bounding rectangle of a polyline, if non-empty.
pub fn polyline_bounds(line: &LineString<f64>) -> Option<Rect<f64>> {
    line.bounding_rect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn pos(lat: f64, lon: f64) -> Position {
        Position::new(lat, lon).unwrap()
    }

    fn unit_square() -> Polygon<f64> {
        // 1-degree square around (0.5, 0.5) in lon/lat.
        polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ]
    }

    #[test]
    fn containment_matches_square() {
        let square = unit_square();
        assert!(point_in_polygon(&square, pos(0.5, 0.5)));
        assert!(!point_in_polygon(&square, pos(1.5, 0.5)));
    }

    #[test]
    fn closest_boundary_point_is_on_nearest_edge() {
        let square = unit_square();
        let (boundary, dist) = closest_boundary_point(&square, pos(0.5, 1.4)).unwrap();
        assert!((boundary.lon() - 1.0).abs() < 1e-9);
        assert!((boundary.lat() - 0.5).abs() < 1e-9);
        // 0.4 degrees of longitude at the equator is ~24 nm.
        assert!((dist - 24.0).abs() < 0.2, "got {dist}");
    }

    #[test]
    fn cell_index_finds_nearby_features_only() {
        let far_square = polygon![
            (x: 10.0, y: 10.0),
            (x: 11.0, y: 10.0),
            (x: 11.0, y: 11.0),
            (x: 10.0, y: 11.0),
            (x: 10.0, y: 10.0),
        ];
        let bounds = vec![
            polygon_bounds(&unit_square()),
            polygon_bounds(&far_square),
        ];
        let index = CellIndex::build(&bounds, DEFAULT_CELL_SIZE_DEG);

        let near = index.query(pos(0.5, 0.5), 5.0);
        assert!(near.contains(&0));
        assert!(!near.contains(&1));

        let far = index.query(pos(10.5, 10.5), 5.0);
        assert!(far.contains(&1));
        assert!(!far.contains(&0));
    }

    #[test]
    fn cell_index_query_on_empty_index_is_empty() {
        let index = CellIndex::build(&[], DEFAULT_CELL_SIZE_DEG);
        assert!(index.is_empty());
        assert!(index.query(pos(0.0, 0.0), 100.0).is_empty());
    }

    #[test]
    fn projection_onto_polyline_hits_perpendicular_foot() {
        let line = LineString::from(vec![(0.0, 0.0), (2.0, 0.0)]);
        let (projected, dist) = project_onto_polyline(&line, pos(0.5, 1.0)).unwrap();
        assert!((projected.lon() - 1.0).abs() < 1e-9);
        assert!(projected.lat().abs() < 1e-9);
        assert!((dist - 30.0).abs() < 0.2, "got {dist}");
    }

    #[test]
    fn polyline_bearing_runs_first_to_last() {
        let northbound = LineString::from(vec![(0.0, 0.0), (0.0, 2.0)]);
        let bearing = polyline_bearing_deg(&northbound).unwrap();
        assert!(bearing.abs() < 1e-9);
    }
}
