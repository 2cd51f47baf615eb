/*
This code is part of the viewfinder geospatial analysis library.
License: MIT
*/

//! Command-line driver for the viewpoint-finder pipeline.
//!
//! Dataset acquisition, raster/vector I/O, and result rendering are explicitly
//! out of scope for the core engine; this binary exists to demonstrate the
//! pipeline end-to-end against a small synthetic terrain and road network, and
//! to load a query configuration from a JSON file.

use std::env;
use std::fs;
use std::path;
use std::process;

use viewfinder_common::configs::AppConfig;
use viewfinder_common::structures::{MultiPolyline, Point2D, Polyline};
use viewfinder_common::utils::deg_to_utm;
use viewfinder_core::terrain::{AffineTransform, TerrainGrid};

fn main() {
    tracing_subscriber::fmt::init();

    match run() {
        Ok(()) => {}
        Err(err) => {
            eprintln!("error: {}", err);
            process::exit(1);
        }
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        version();
        help();
        return Ok(());
    }

    let mut config_path = String::new();
    let mut run_demo = false;
    let mut verbose = false;

    for arg in &args[1..] {
        let flag_val = arg.to_lowercase();
        if flag_val == "-h" || flag_val == "--help" {
            help();
            return Ok(());
        } else if flag_val == "--version" {
            version();
            return Ok(());
        } else if flag_val == "-v" || flag_val == "--verbose" {
            verbose = true;
        } else if arg.starts_with("--config") {
            let mut v = arg.replace("--config", "").replace('\"', "").replace('\'', "");
            if let Some(stripped) = v.strip_prefix('=') {
                v = stripped.to_string();
            }
            config_path = v;
        } else if flag_val == "--demo" {
            run_demo = true;
        } else {
            return Err(format!("unrecognized argument: {}", arg));
        }
    }

    if config_path.is_empty() && !run_demo {
        return Err("no --config=<path> supplied; pass --demo to run against the bundled synthetic scene".to_string());
    }

    let config = if config_path.is_empty() {
        demo_config()
    } else {
        let contents = fs::read_to_string(&config_path).map_err(|e| format!("failed to read {}: {}", config_path, e))?;
        AppConfig::from_json(&contents).map_err(|e| e.to_string())?
    };

    if verbose {
        tracing::info!(observer_lat = config.observer.latitude, observer_lon = config.observer.longitude, "starting viewfinder run");
    }

    let (grid, roads) = demo_scene(&config);

    let results = viewfinder_core::run_pipeline(&grid, &roads, &config).map_err(|e| e.to_string())?;

    if results.is_empty() {
        println!("No viewpoints survived visibility and drivability evaluation.");
        return Ok(());
    }

    println!("rank  score   lat         lon          elev_m   fov_deg  walk_min");
    for (rank, result) in results.iter().enumerate() {
        println!(
            "{:>4}  {:.3}  {:>10.5}  {:>11.5}  {:>7.1}  {:>7.1}  {:>8.2}",
            rank + 1,
            result.score,
            result.candidate_lat,
            result.candidate_lon,
            result.candidate.elevation,
            result.metrics.actual_fov_deg,
            result.drivability.walk_minutes,
        );
    }

    Ok(())
}

/// A default query configuration used when no `--config` file is supplied.
fn demo_config() -> AppConfig {
    let json = r#"{
        "observer": { "latitude": 45.5231, "longitude": -122.6765, "altitude_m": 0.0 },
        "terrain": { "search_radius_km": 5.0, "resolution_scale": 1.0, "max_visibility_km": 2.0, "cluster_grid_m": 100.0 },
        "roads": { "walking_speed_kmh": 4.8, "driving_speed_kmh": 60.0, "max_walk_minutes": 30.0 },
        "visibility": { "observer_eye_height_m": 1.8, "obstruction_start_m": 15.0, "obstruction_height_m": 20.0,
                        "min_visibility_miles": 1.0, "min_field_of_view_deg": 90.0, "azimuth_deg": 0.0, "rays_full_circle": 36 },
        "output": { "results_limit": 10 }
    }"#;
    AppConfig::from_json(json).expect("bundled demo configuration must be valid")
}

/// A small synthetic hill and a single access road, centered on the query's observer
/// point, standing in for the DEM and road-network loaders this core doesn't own.
fn demo_scene(config: &AppConfig) -> (TerrainGrid, MultiPolyline) {
    let (origin_x, origin_y, _, _) = deg_to_utm(config.observer.latitude, config.observer.longitude);

    let size = 121usize;
    let pixel = 10.0;
    let half = (size / 2) as f64;
    let transform = AffineTransform::north_up(origin_x - half * pixel, origin_y + half * pixel, pixel, pixel);
    let center = (size / 2) as isize;

    let mut elevations = vec![0.0f32; size * size];
    for row in 0..size {
        for col in 0..size {
            let dx = col as isize - center;
            let dy = row as isize - center;
            let dist = ((dx * dx + dy * dy) as f64).sqrt();
            let elevation = 200.0 - dist * 1.2 + (dx as f64) * 0.1;
            elevations[row * size + col] = elevation.max(50.0) as f32;
        }
    }
    let grid = TerrainGrid::new(elevations, size, size, transform, "query-UTM");

    let mut roads = MultiPolyline::new("query-UTM");
    roads.push(Polyline::new(
        &[Point2D::new(origin_x - 2000.0, origin_y - 300.0), Point2D::new(origin_x + 2000.0, origin_y - 300.0)],
        0,
    ));
    (grid, roads)
}

fn help() {
    let sep: String = path::MAIN_SEPARATOR.to_string();
    let s = "viewfinder Help

The following commands are recognized:
--config=<path>     Loads a query configuration from a JSON file.
--demo              Runs against a small bundled synthetic terrain and road network.
-h, --help          Prints help information.
-v, --verbose       Enables verbose logging.
--version           Prints version information.

Example:
>>.*viewfinder --config=*path*to*query.json -v"
        .to_string()
        .replace('*', &sep);
    println!("{}", s);
}

fn version() {
    const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");
    println!("viewfinder v{} - scenic viewpoint finder", VERSION.unwrap_or("unknown"));
}
