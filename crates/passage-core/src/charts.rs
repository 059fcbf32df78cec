//! Chart store: immutable vector layers with spatial indices.
//!
//! Layers are parsed once from a chart directory and never mutated;
//! a store can be shared read-only across concurrent routing requests.
//! Reloading charts builds a new store, leaving in-flight requests on
//! the snapshot they already hold. Missing or unparsable layer files
//! degrade to empty layers with a warning — the corresponding avoidance
//! pass becomes a no-op, never a fatal error.

use crate::config::RoutingConfig;
use crate::geodesy;
use crate::models::Position;
use crate::spatial::{self, CellIndex, DEFAULT_CELL_SIZE_DEG};
use geo::{Coord, LineString, Polygon, Rect};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

pub const COASTLINES_FILE: &str = "coastlines.geojson";
/// Pre-buffered land union written by a chart-preparation step. When
/// present, its polygons already include the minimum offing, so land
/// queries reduce to plain containment.
pub const CACHED_LAND_BUFFER_FILE: &str = "_cached_land_buffer.json";
pub const TSS_CORRIDORS_FILE: &str = "noaa_tss_corridors.json";
pub const SEA_BUOYS_FILE: &str = "noaa_sea_buoys.json";
pub const PILOTAGE_ZONES_FILE: &str = "noaa_pilotage_zones.json";
pub const RESTRICTED_AREAS_FILE: &str = "noaa_restricted_areas.json";
pub const DEPTH_AREAS_FILE: &str = "noaa_depth_areas.json";
pub const WRECKS_OBSTRUCTIONS_FILE: &str = "noaa_wrecks_obstructions.json";
pub const PIPELINES_CABLES_FILE: &str = "noaa_pipelines_cables.json";

/// Depth reported for a point no depth cell covers. Charted "no data"
/// is treated as deep (safe); this is a deliberate, permissive policy.
pub const NO_DATA_DEPTH_M: f64 = 10_000.0;

/// Declared flow of a traffic separation corridor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TssDirection {
    Inbound,
    Outbound,
    /// Two-way corridor; never treated as opposed.
    Either,
    /// One-way corridor with an explicit bearing in degrees.
    Bearing(f64),
}

impl TssDirection {
    fn parse(raw: &str) -> Self {
        let lower = raw.trim().to_ascii_lowercase();
        if lower == "inbound" {
            TssDirection::Inbound
        } else if lower == "outbound" {
            TssDirection::Outbound
        } else if let Some(rest) = lower.strip_prefix("bearing_") {
            match rest.parse::<f64>() {
                Ok(deg) => TssDirection::Bearing(geodesy::normalize_bearing(deg)),
                Err(_) => TssDirection::Either,
            }
        } else {
            TssDirection::Either
        }
    }
}

/// A named polygon zone (pilotage waters, restricted area).
#[derive(Debug, Clone)]
pub struct NamedZone {
    pub name: String,
    pub polygon: Polygon<f64>,
}

/// A depth cell with its shallow and deep bounds in meters.
#[derive(Debug, Clone)]
pub struct DepthArea {
    pub min_depth_m: f64,
    pub max_depth_m: f64,
    pub polygon: Polygon<f64>,
}

#[derive(Debug, Clone)]
pub struct SeaBuoy {
    pub name: String,
    pub position: Position,
}

/// A charted wreck or obstruction.
#[derive(Debug, Clone)]
pub struct PointHazard {
    pub name: String,
    pub category: String,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct TssCorridor {
    pub name: String,
    pub direction: TssDirection,
    /// Full corridor width; a segment is "inside" within half of this
    /// of the centerline.
    pub corridor_width_nm: f64,
    pub centerline: LineString<f64>,
}

impl TssCorridor {
    /// Effective one-way bearing of the corridor, or `None` for a
    /// two-way corridor. Inbound lanes run against the drawn geometry.
    pub fn flow_bearing_deg(&self) -> Option<f64> {
        match self.direction {
            TssDirection::Either => None,
            TssDirection::Bearing(deg) => Some(deg),
            TssDirection::Outbound => spatial::polyline_bearing_deg(&self.centerline),
            TssDirection::Inbound => spatial::polyline_bearing_deg(&self.centerline)
                .map(|deg| geodesy::normalize_bearing(deg + 180.0)),
        }
    }
}

/// A submarine pipeline or cable route. Loaded for charting and
/// diagnostics; no avoidance pass consumes it.
#[derive(Debug, Clone)]
pub struct CableRoute {
    pub name: String,
    pub line: LineString<f64>,
}

/// Parsed vector layers, independent of where they came from.
#[derive(Debug, Clone, Default)]
pub struct ChartLayers {
    pub land: Vec<Polygon<f64>>,
    /// True when `land` came from a pre-buffered cache and already
    /// includes the minimum offing.
    pub land_prebuffered: bool,
    pub pilotage_zones: Vec<NamedZone>,
    pub restricted_areas: Vec<NamedZone>,
    pub depth_areas: Vec<DepthArea>,
    pub sea_buoys: Vec<SeaBuoy>,
    pub tss_corridors: Vec<TssCorridor>,
    pub hazards: Vec<PointHazard>,
    pub cables: Vec<CableRoute>,
}

/// Nearest point on a land boundary relative to a query position.
#[derive(Debug, Clone, Copy)]
pub struct LandBoundary {
    pub point: Position,
    pub distance_nm: f64,
    /// Whether the query position was inside the land polygon itself.
    pub inside: bool,
}

/// Immutable chart snapshot with per-layer spatial indices.
#[derive(Debug, Clone)]
pub struct ChartStore {
    layers: ChartLayers,
    config: RoutingConfig,
    land_index: CellIndex,
    pilotage_index: CellIndex,
    restricted_index: CellIndex,
    depth_index: CellIndex,
    hazard_index: CellIndex,
}

impl ChartStore {
    /// Load all layers from a chart directory. Never fails: missing or
    /// broken layers are logged and left empty.
    pub fn load(dir: &Path, config: RoutingConfig) -> Self {
        let mut layers = ChartLayers::default();

        // Prefer the cached pre-buffered land union when available;
        // otherwise fall back to raw coastlines and evaluate the offing
        // as a distance predicate at query time.
        let cached = dir.join(CACHED_LAND_BUFFER_FILE);
        if cached.exists() {
            layers.land = load_polygons(&cached);
            layers.land_prebuffered = !layers.land.is_empty();
        }
        if layers.land.is_empty() {
            layers.land = load_polygons(&dir.join(COASTLINES_FILE));
            layers.land_prebuffered = false;
        }

        layers.pilotage_zones = load_named_zones(&dir.join(PILOTAGE_ZONES_FILE));
        layers.restricted_areas = load_named_zones(&dir.join(RESTRICTED_AREAS_FILE));
        layers.depth_areas = load_depth_areas(&dir.join(DEPTH_AREAS_FILE));
        layers.sea_buoys = load_sea_buoys(&dir.join(SEA_BUOYS_FILE));
        layers.tss_corridors = load_tss_corridors(&dir.join(TSS_CORRIDORS_FILE));
        layers.hazards = load_hazards(&dir.join(WRECKS_OBSTRUCTIONS_FILE));
        layers.cables = load_cables(&dir.join(PIPELINES_CABLES_FILE));

        tracing::info!(
            land = layers.land.len(),
            land_prebuffered = layers.land_prebuffered,
            pilotage = layers.pilotage_zones.len(),
            restricted = layers.restricted_areas.len(),
            depth_areas = layers.depth_areas.len(),
            sea_buoys = layers.sea_buoys.len(),
            tss = layers.tss_corridors.len(),
            hazards = layers.hazards.len(),
            cables = layers.cables.len(),
            "chart layers loaded"
        );

        Self::from_layers(layers, config)
    }

    /// Build a store from already-parsed layers (tests, in-memory use).
    pub fn from_layers(layers: ChartLayers, config: RoutingConfig) -> Self {
        let land_index = index_of(layers.land.iter().map(spatial::polygon_bounds));
        let pilotage_index = index_of(layers.pilotage_zones.iter().map(|z| spatial::polygon_bounds(&z.polygon)));
        let restricted_index = index_of(
            layers
                .restricted_areas
                .iter()
                .map(|z| spatial::polygon_bounds(&z.polygon)),
        );
        let depth_index = index_of(layers.depth_areas.iter().map(|d| spatial::polygon_bounds(&d.polygon)));
        let hazard_index = index_of(layers.hazards.iter().map(|h| {
            let c = Coord {
                x: h.position.lon(),
                y: h.position.lat(),
            };
            Some(Rect::new(c, c))
        }));

        Self {
            layers,
            config,
            land_index,
            pilotage_index,
            restricted_index,
            depth_index,
            hazard_index,
        }
    }

    pub fn empty(config: RoutingConfig) -> Self {
        Self::from_layers(ChartLayers::default(), config)
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    pub fn layers(&self) -> &ChartLayers {
        &self.layers
    }

    /// Is `p` within the land mass or its mandatory offing buffer?
    pub fn in_land_buffer(&self, p: Position) -> bool {
        let offing = self.config.min_offing_nm;
        for id in self.land_index.query(p, offing) {
            let polygon = &self.layers.land[id];
            if spatial::point_in_polygon(polygon, p) {
                return true;
            }
            if !self.layers.land_prebuffered {
                if let Some((_, dist)) = spatial::closest_boundary_point(polygon, p) {
                    if dist <= offing {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Nearest land boundary point to `p`, searched within twice the
    /// offing plus a margin. `None` when no land is nearby.
    pub fn nearest_land_boundary(&self, p: Position) -> Option<LandBoundary> {
        let radius = self.config.min_offing_nm * 2.0 + self.config.boundary_margin_nm;
        let mut best: Option<LandBoundary> = None;
        for id in self.land_index.query(p, radius) {
            let polygon = &self.layers.land[id];
            let Some((point, distance_nm)) = spatial::closest_boundary_point(polygon, p) else {
                continue;
            };
            let inside = spatial::point_in_polygon(polygon, p);
            let candidate = LandBoundary {
                point,
                distance_nm,
                inside,
            };
            // A containing polygon always wins; otherwise nearest boundary.
            let better = match &best {
                None => true,
                Some(current) => {
                    (inside && !current.inside)
                        || (inside == current.inside && distance_nm < current.distance_nm)
                }
            };
            if better {
                best = Some(candidate);
            }
        }
        best
    }

    /// Restricted area containing `p`, if any.
    pub fn restricted_area_at(&self, p: Position) -> Option<&NamedZone> {
        self.restricted_index
            .query(p, self.config.restricted_clearance_nm)
            .into_iter()
            .map(|id| &self.layers.restricted_areas[id])
            .find(|zone| spatial::point_in_polygon(&zone.polygon, p))
    }

    /// Shallowest charted depth covering `p`, or [`NO_DATA_DEPTH_M`]
    /// when no depth cell covers it.
    pub fn depth_at(&self, p: Position) -> f64 {
        let mut depth = NO_DATA_DEPTH_M;
        for id in self.depth_index.query(p, 0.0) {
            let area = &self.layers.depth_areas[id];
            if spatial::point_in_polygon(&area.polygon, p) {
                depth = depth.min(area.min_depth_m);
            }
        }
        depth
    }

    /// Nearest charted hazard within `radius_nm` of `p`.
    pub fn nearest_hazard(&self, p: Position, radius_nm: f64) -> Option<(&PointHazard, f64)> {
        self.hazard_index
            .query(p, radius_nm)
            .into_iter()
            .map(|id| {
                let hazard = &self.layers.hazards[id];
                (hazard, geodesy::distance_nm(p, hazard.position))
            })
            .filter(|(_, dist)| *dist <= radius_nm)
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    pub fn in_pilotage_zone(&self, p: Position) -> bool {
        self.pilotage_index
            .query(p, 0.0)
            .into_iter()
            .any(|id| spatial::point_in_polygon(&self.layers.pilotage_zones[id].polygon, p))
    }

    /// Geographically nearest loaded sea buoy, by great-circle distance.
    pub fn nearest_sea_buoy(&self, p: Position) -> Option<&SeaBuoy> {
        self.layers
            .sea_buoys
            .iter()
            .min_by(|a, b| {
                geodesy::distance_nm(p, a.position).total_cmp(&geodesy::distance_nm(p, b.position))
            })
    }

    pub fn tss_corridors(&self) -> &[TssCorridor] {
        &self.layers.tss_corridors
    }
}

fn index_of(bounds: impl Iterator<Item = Option<Rect<f64>>>) -> CellIndex {
    CellIndex::build(&bounds.collect::<Vec<_>>(), DEFAULT_CELL_SIZE_DEG)
}

// ==== GeoJSON-style layer parsing ====

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Point { coordinates: [f64; 2] },
    LineString { coordinates: Vec<[f64; 2]> },
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<[f64; 2]>>> },
}

fn read_feature_collection(path: &Path) -> Option<FeatureCollection> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "chart layer missing, treating as empty");
        return None;
    }
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "failed to read chart layer, treating as empty");
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(collection) => Some(collection),
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "failed to parse chart layer, treating as empty");
            None
        }
    }
}

fn polygon_from_rings(rings: &[Vec<[f64; 2]>]) -> Option<Polygon<f64>> {
    let exterior = rings.first()?;
    if exterior.len() < 3 {
        return None;
    }
    let interiors = rings[1..]
        .iter()
        .map(|ring| spatial::ring_from_coords(ring))
        .collect();
    Some(Polygon::new(spatial::ring_from_coords(exterior), interiors))
}

fn polygons_of(geometry: &Geometry) -> Vec<Polygon<f64>> {
    match geometry {
        Geometry::Polygon { coordinates } => polygon_from_rings(coordinates).into_iter().collect(),
        Geometry::MultiPolygon { coordinates } => coordinates
            .iter()
            .filter_map(|rings| polygon_from_rings(rings))
            .collect(),
        _ => Vec::new(),
    }
}

fn position_of(geometry: &Geometry) -> Option<Position> {
    match geometry {
        // GeoJSON order: [lon, lat]
        Geometry::Point { coordinates } => Position::new(coordinates[1], coordinates[0]).ok(),
        _ => None,
    }
}

fn line_of(geometry: &Geometry) -> Option<LineString<f64>> {
    match geometry {
        Geometry::LineString { coordinates } if coordinates.len() >= 2 => {
            Some(spatial::ring_from_coords(coordinates))
        }
        _ => None,
    }
}

fn prop_str(props: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| props.get(*key))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn prop_f64(props: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match props.get(*key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

fn load_polygons(path: &Path) -> Vec<Polygon<f64>> {
    read_feature_collection(path)
        .map(|collection| {
            collection
                .features
                .iter()
                .filter_map(|f| f.geometry.as_ref())
                .flat_map(polygons_of)
                .collect()
        })
        .unwrap_or_default()
}

fn load_named_zones(path: &Path) -> Vec<NamedZone> {
    read_feature_collection(path)
        .map(|collection| {
            collection
                .features
                .iter()
                .flat_map(|feature| {
                    let name = prop_str(&feature.properties, &["name", "OBJNAM"])
                        .unwrap_or_else(|| "Unnamed".to_string());
                    feature
                        .geometry
                        .iter()
                        .flat_map(polygons_of)
                        .map(move |polygon| NamedZone {
                            name: name.clone(),
                            polygon,
                        })
                        .collect::<Vec<_>>()
                })
                .collect()
        })
        .unwrap_or_default()
}

fn load_depth_areas(path: &Path) -> Vec<DepthArea> {
    read_feature_collection(path)
        .map(|collection| {
            collection
                .features
                .iter()
                .filter_map(|feature| {
                    // ENC depth areas carry DRVAL1/DRVAL2 bounds.
                    let min_depth_m = prop_f64(&feature.properties, &["min_depth_m", "DRVAL1"])?;
                    let max_depth_m = prop_f64(&feature.properties, &["max_depth_m", "DRVAL2"])
                        .unwrap_or(min_depth_m);
                    Some((feature, min_depth_m, max_depth_m))
                })
                .flat_map(|(feature, min_depth_m, max_depth_m)| {
                    feature
                        .geometry
                        .iter()
                        .flat_map(polygons_of)
                        .map(move |polygon| DepthArea {
                            min_depth_m,
                            max_depth_m,
                            polygon,
                        })
                        .collect::<Vec<_>>()
                })
                .collect()
        })
        .unwrap_or_default()
}

fn load_sea_buoys(path: &Path) -> Vec<SeaBuoy> {
    read_feature_collection(path)
        .map(|collection| {
            collection
                .features
                .iter()
                .filter_map(|feature| {
                    let position = position_of(feature.geometry.as_ref()?)?;
                    let name = prop_str(&feature.properties, &["name", "OBJNAM"])
                        .unwrap_or_else(|| "Sea Buoy".to_string());
                    Some(SeaBuoy { name, position })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn load_tss_corridors(path: &Path) -> Vec<TssCorridor> {
    read_feature_collection(path)
        .map(|collection| {
            collection
                .features
                .iter()
                .filter_map(|feature| {
                    let centerline = line_of(feature.geometry.as_ref()?)?;
                    let name = prop_str(&feature.properties, &["name", "OBJNAM"])
                        .unwrap_or_else(|| "TSS".to_string());
                    let direction = prop_str(&feature.properties, &["direction", "TRAFIC"])
                        .map(|raw| TssDirection::parse(&raw))
                        .unwrap_or(TssDirection::Either);
                    let corridor_width_nm =
                        prop_f64(&feature.properties, &["corridor_width_nm"]).unwrap_or(1.0);
                    Some(TssCorridor {
                        name,
                        direction,
                        corridor_width_nm,
                        centerline,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn load_hazards(path: &Path) -> Vec<PointHazard> {
    read_feature_collection(path)
        .map(|collection| {
            collection
                .features
                .iter()
                .filter_map(|feature| {
                    let position = position_of(feature.geometry.as_ref()?)?;
                    let name = prop_str(&feature.properties, &["name", "OBJNAM"])
                        .unwrap_or_else(|| "Obstruction".to_string());
                    let category = prop_str(&feature.properties, &["category", "CATOBS"])
                        .unwrap_or_else(|| "unknown".to_string());
                    Some(PointHazard {
                        name,
                        category,
                        position,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn load_cables(path: &Path) -> Vec<CableRoute> {
    read_feature_collection(path)
        .map(|collection| {
            collection
                .features
                .iter()
                .filter_map(|feature| {
                    let line = line_of(feature.geometry.as_ref()?)?;
                    let name = prop_str(&feature.properties, &["name", "OBJNAM"])
                        .unwrap_or_else(|| "Cable".to_string());
                    Some(CableRoute { name, line })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn pos(lat: f64, lon: f64) -> Position {
        Position::new(lat, lon).unwrap()
    }

    fn square(min_lon: f64, min_lat: f64, size: f64) -> Polygon<f64> {
        polygon![
            (x: min_lon, y: min_lat),
            (x: min_lon + size, y: min_lat),
            (x: min_lon + size, y: min_lat + size),
            (x: min_lon, y: min_lat + size),
            (x: min_lon, y: min_lat),
        ]
    }

    #[test]
    fn empty_store_answers_every_query_permissively() {
        let store = ChartStore::empty(RoutingConfig::default());
        let p = pos(37.0, -123.0);
        assert!(!store.in_land_buffer(p));
        assert!(store.nearest_land_boundary(p).is_none());
        assert!(store.restricted_area_at(p).is_none());
        assert_eq!(store.depth_at(p), NO_DATA_DEPTH_M);
        assert!(store.nearest_hazard(p, 10.0).is_none());
        assert!(!store.in_pilotage_zone(p));
        assert!(store.nearest_sea_buoy(p).is_none());
    }

    #[test]
    fn land_buffer_includes_offing_standoff() {
        let layers = ChartLayers {
            land: vec![square(0.0, 0.0, 1.0)],
            ..Default::default()
        };
        let store = ChartStore::from_layers(layers, RoutingConfig::default());

        // Inside the polygon.
        assert!(store.in_land_buffer(pos(0.5, 0.5)));
        // ~1.2 nm off the eastern edge: inside the 3 nm offing.
        assert!(store.in_land_buffer(pos(0.5, 1.02)));
        // ~12 nm off: clear.
        assert!(!store.in_land_buffer(pos(0.5, 1.2)));
    }

    #[test]
    fn prebuffered_land_uses_containment_only() {
        let layers = ChartLayers {
            land: vec![square(0.0, 0.0, 1.0)],
            land_prebuffered: true,
            ..Default::default()
        };
        let store = ChartStore::from_layers(layers, RoutingConfig::default());

        assert!(store.in_land_buffer(pos(0.5, 0.5)));
        // Just outside a pre-buffered polygon is already clear.
        assert!(!store.in_land_buffer(pos(0.5, 1.02)));
    }

    #[test]
    fn depth_at_picks_shallowest_covering_cell() {
        let layers = ChartLayers {
            depth_areas: vec![
                DepthArea {
                    min_depth_m: 20.0,
                    max_depth_m: 50.0,
                    polygon: square(0.0, 0.0, 2.0),
                },
                DepthArea {
                    min_depth_m: 5.0,
                    max_depth_m: 10.0,
                    polygon: square(0.5, 0.5, 0.5),
                },
            ],
            ..Default::default()
        };
        let store = ChartStore::from_layers(layers, RoutingConfig::default());

        assert_eq!(store.depth_at(pos(0.75, 0.75)), 5.0);
        assert_eq!(store.depth_at(pos(1.5, 1.5)), 20.0);
        assert_eq!(store.depth_at(pos(5.0, 5.0)), NO_DATA_DEPTH_M);
    }

    #[test]
    fn nearest_hazard_respects_radius() {
        let layers = ChartLayers {
            hazards: vec![
                PointHazard {
                    name: "Wreck A".to_string(),
                    category: "wreck".to_string(),
                    position: pos(0.0, 0.1),
                },
                PointHazard {
                    name: "Wreck B".to_string(),
                    category: "wreck".to_string(),
                    position: pos(0.0, 0.5),
                },
            ],
            ..Default::default()
        };
        let store = ChartStore::from_layers(layers, RoutingConfig::default());

        let (hazard, dist) = store.nearest_hazard(pos(0.0, 0.0), 10.0).unwrap();
        assert_eq!(hazard.name, "Wreck A");
        assert!((dist - 6.0).abs() < 0.1);

        assert!(store.nearest_hazard(pos(0.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn nearest_sea_buoy_is_by_great_circle_distance() {
        let layers = ChartLayers {
            sea_buoys: vec![
                SeaBuoy {
                    name: "SF Approach".to_string(),
                    position: pos(37.75, -122.68),
                },
                SeaBuoy {
                    name: "LA Approach".to_string(),
                    position: pos(33.70, -118.23),
                },
            ],
            ..Default::default()
        };
        let store = ChartStore::from_layers(layers, RoutingConfig::default());

        let buoy = store.nearest_sea_buoy(pos(37.8, -122.3)).unwrap();
        assert_eq!(buoy.name, "SF Approach");
    }

    #[test]
    fn missing_chart_directory_loads_empty_layers() {
        let store = ChartStore::load(
            Path::new("/nonexistent/charts"),
            RoutingConfig::default(),
        );
        assert!(store.layers().land.is_empty());
        assert!(store.layers().tss_corridors.is_empty());
        assert!(!store.in_land_buffer(pos(37.0, -123.0)));
    }

    #[test]
    fn layers_parse_from_geojson_files() {
        let dir = std::env::temp_dir().join(format!("passage-charts-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        fs::write(
            dir.join(COASTLINES_FILE),
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{},
                 "geometry":{"type":"Polygon","coordinates":[[[0.0,0.0],[1.0,0.0],[1.0,1.0],[0.0,1.0],[0.0,0.0]]]}}
            ]}"#,
        )
        .unwrap();
        fs::write(
            dir.join(DEPTH_AREAS_FILE),
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"DRVAL1":9.1,"DRVAL2":18.2},
                 "geometry":{"type":"Polygon","coordinates":[[[2.0,2.0],[3.0,2.0],[3.0,3.0],[2.0,3.0],[2.0,2.0]]]}}
            ]}"#,
        )
        .unwrap();
        fs::write(
            dir.join(TSS_CORRIDORS_FILE),
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature",
                 "properties":{"name":"Approach Lane","direction":"outbound","corridor_width_nm":2.0},
                 "geometry":{"type":"LineString","coordinates":[[4.0,4.0],[5.0,5.0]]}}
            ]}"#,
        )
        .unwrap();
        // A broken layer must degrade to empty, not fail the load.
        fs::write(dir.join(RESTRICTED_AREAS_FILE), "not json at all").unwrap();

        let store = ChartStore::load(&dir, RoutingConfig::default());
        assert_eq!(store.layers().land.len(), 1);
        assert_eq!(store.layers().depth_areas.len(), 1);
        assert_eq!(store.layers().tss_corridors.len(), 1);
        assert!(store.layers().restricted_areas.is_empty());

        let corridor = &store.layers().tss_corridors[0];
        assert_eq!(corridor.name, "Approach Lane");
        assert_eq!(corridor.direction, TssDirection::Outbound);
        assert_eq!(store.depth_at(pos(2.5, 2.5)), 9.1);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn tss_direction_parsing() {
        assert_eq!(TssDirection::parse("inbound"), TssDirection::Inbound);
        assert_eq!(TssDirection::parse("Outbound"), TssDirection::Outbound);
        assert_eq!(TssDirection::parse("either"), TssDirection::Either);
        assert_eq!(TssDirection::parse("bearing_135"), TssDirection::Bearing(135.0));
        assert_eq!(TssDirection::parse("garbled"), TssDirection::Either);
    }

    #[test]
    fn inbound_corridor_flow_reverses_geometry_bearing() {
        let northbound = spatial::ring_from_coords(&[[0.0, 0.0], [0.0, 2.0]]);
        let corridor = TssCorridor {
            name: "Lane".to_string(),
            direction: TssDirection::Inbound,
            corridor_width_nm: 2.0,
            centerline: northbound,
        };
        let bearing = corridor.flow_bearing_deg().unwrap();
        assert!((bearing - 180.0).abs() < 1e-9);
    }
}
