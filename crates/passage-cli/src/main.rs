//! Command-line passage planner.
//!
//! `passage plan` plans a route between two positions against a chart
//! directory; `passage layers` reports what the chart directory holds.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use passage_core::{
    vessel_type_name, ChartStore, PlanRequest, Position, Route, RouteObjective, RoutePlanner,
    RoutingConfig, VesselProfile,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan a passage between two positions
    Plan(PlanArgs),
    /// Show what the chart directory contains
    Layers(LayersArgs),
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Chart directory with the NOAA layer files
    #[arg(long, default_value = "charts")]
    charts: PathBuf,

    /// Start position as "LAT,LON"
    #[arg(long)]
    start: String,

    /// End position as "LAT,LON"
    #[arg(long)]
    end: String,

    /// Vessel MMSI
    #[arg(long, default_value_t = 0)]
    mmsi: u32,

    /// AIS vessel type code (drives the squat coefficient)
    #[arg(long)]
    vessel_type: Option<u16>,

    /// Vessel draft in meters
    #[arg(long, default_value_t = 10.5)]
    draft: f64,

    /// Objective: fuel, time, safety, or balanced
    #[arg(long, default_value = "balanced")]
    objective: String,

    /// Minimum transit speed in knots
    #[arg(long, default_value_t = 5.0)]
    min_speed: f64,

    /// Maximum transit speed in knots
    #[arg(long, default_value_t = 20.0)]
    max_speed: f64,

    /// Number of intermediate waypoints
    #[arg(long, default_value_t = passage_core::DEFAULT_INTERMEDIATE_WAYPOINTS)]
    waypoints: usize,

    /// Departure time, RFC 3339 (default: now)
    #[arg(long)]
    departure: Option<String>,

    /// Emit the full route as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct LayersArgs {
    /// Chart directory with the NOAA layer files
    #[arg(long, default_value = "charts")]
    charts: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Plan(args) => plan(args),
        Command::Layers(args) => layers(args),
    }
}

fn plan(args: PlanArgs) -> Result<()> {
    let start = parse_position(&args.start).context("invalid --start")?;
    let end = parse_position(&args.end).context("invalid --end")?;
    let objective = parse_objective(&args.objective)?;
    let departure = args
        .departure
        .as_deref()
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|t| t.with_timezone(&Utc))
                .with_context(|| format!("invalid --departure {raw:?}"))
        })
        .transpose()?;

    let store = ChartStore::load(&args.charts, RoutingConfig::default());
    let planner = RoutePlanner::new(store);

    let mut request = PlanRequest::new(
        start,
        end,
        VesselProfile::new(args.mmsi, args.vessel_type, args.draft),
    );
    request.objective = objective;
    request.constraints.min_speed_knots = args.min_speed;
    request.constraints.max_speed_knots = args.max_speed;
    request.constraints.vessel_draft_m = args.draft;
    request.intermediate_waypoints = args.waypoints;
    request.departure = departure;

    let route = planner.plan(&request)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&route)?);
        return Ok(());
    }
    print_summary(&route, &request);
    Ok(())
}

fn print_summary(route: &Route, request: &PlanRequest) {
    if let Some(code) = request.vessel.vessel_type {
        println!(
            "Vessel: MMSI {} ({}), draft {:.1} m",
            request.vessel.mmsi,
            vessel_type_name(code),
            request.vessel.draft_m
        );
    } else {
        println!(
            "Vessel: MMSI {}, draft {:.1} m",
            request.vessel.mmsi, request.vessel.draft_m
        );
    }
    println!(
        "Distance: {:.1} nm, duration {:.1} h, fuel {:.1} t",
        route.total_distance_nm, route.estimated_duration_hours, route.fuel_consumption_tonnes
    );
    println!(
        "Safety score: {:.2}, weather impact: {:.2}",
        route.safety_score, route.weather_impact_score
    );
    println!();

    for wp in &route.waypoints {
        let name = wp.name.as_deref().unwrap_or("-");
        let advisory = if wp.advisory { " [ADVISORY]" } else { "" };
        let leg = match (wp.course_deg, wp.distance_to_next_nm) {
            (Some(course), Some(dist)) => format!("{course:6.1}\u{b0} {dist:7.1} nm"),
            _ => "     -        -   ".to_string(),
        };
        let eta = wp
            .eta
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {name:<32} {:>9.4} {:>10.4}  {leg}  {eta}{advisory}",
            wp.position.lat(),
            wp.position.lon()
        );
    }

    if !route.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &route.warnings {
            println!("  - {warning}");
        }
    }
}

fn layers(args: LayersArgs) -> Result<()> {
    let store = ChartStore::load(&args.charts, RoutingConfig::default());
    let layers = store.layers();

    println!("Chart directory: {}", args.charts.display());
    println!(
        "  land polygons:      {:>6}{}",
        layers.land.len(),
        if layers.land_prebuffered {
            " (pre-buffered)"
        } else {
            ""
        }
    );
    println!("  pilotage zones:     {:>6}", layers.pilotage_zones.len());
    println!("  restricted areas:   {:>6}", layers.restricted_areas.len());
    println!("  depth areas:        {:>6}", layers.depth_areas.len());
    println!("  sea buoys:          {:>6}", layers.sea_buoys.len());
    println!("  TSS corridors:      {:>6}", layers.tss_corridors.len());
    println!("  hazards:            {:>6}", layers.hazards.len());
    println!("  pipelines/cables:   {:>6}", layers.cables.len());

    for corridor in &layers.tss_corridors {
        println!(
            "    corridor {:?}: {:?}, {:.1} nm wide",
            corridor.name, corridor.direction, corridor.corridor_width_nm
        );
    }
    Ok(())
}

fn parse_position(raw: &str) -> Result<Position> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| anyhow!("expected \"LAT,LON\", got {raw:?}"))?;
    let lat: f64 = lat.trim().parse().context("latitude is not a number")?;
    let lon: f64 = lon.trim().parse().context("longitude is not a number")?;
    Ok(Position::new(lat, lon)?)
}

fn parse_objective(raw: &str) -> Result<RouteObjective> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "fuel" | "fuel_efficiency" => Ok(RouteObjective::FuelEfficiency),
        "time" | "time_optimization" => Ok(RouteObjective::TimeOptimization),
        "safety" | "safety_first" => Ok(RouteObjective::SafetyFirst),
        "balanced" => Ok(RouteObjective::Balanced),
        other => Err(anyhow!(
            "unknown objective {other:?} (expected fuel, time, safety, or balanced)"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_parse_with_whitespace() {
        let p = parse_position(" 37.8044 , -122.2712 ").unwrap();
        assert!((p.lat() - 37.8044).abs() < 1e-12);
        assert!((p.lon() - -122.2712).abs() < 1e-12);

        assert!(parse_position("37.8044").is_err());
        assert!(parse_position("91.0,0.0").is_err());
    }

    #[test]
    fn objectives_accept_short_and_long_forms() {
        assert_eq!(parse_objective("fuel").unwrap(), RouteObjective::FuelEfficiency);
        assert_eq!(
            parse_objective("time_optimization").unwrap(),
            RouteObjective::TimeOptimization
        );
        assert_eq!(parse_objective("Balanced").unwrap(), RouteObjective::Balanced);
        assert!(parse_objective("fastest").is_err());
    }
}
