// End-to-end orchestration: candidate extraction, per-candidate visibility and
// drivability evaluation, scoring, and ranking.

use viewfinder_common::configs::AppConfig;
use viewfinder_common::error::{CoreError, CoreResult};
use viewfinder_common::structures::{MultiPolyline, Point2D};
use viewfinder_common::utils::{deg_to_utm, great_circle_distance_m, meters_to_miles, utm_epsg_for_latlon, utm_to_deg};

use crate::candidates::{extract_candidates, ExtractorConfig, TerrainCandidate};
use crate::roads::{evaluate_drivability, nearest_access_point, DrivabilityResult};
use crate::scoring::{score, ScoreInputs};
use crate::terrain::TerrainGrid;
use crate::visibility::{compute_visibility_metrics, VisibilityConfig, VisibilityMetrics};

/// A fully evaluated, accepted viewpoint, ready for ranking.
#[derive(Debug, Clone)]
pub struct ViewpointResult {
    pub candidate: TerrainCandidate,
    pub candidate_lat: f64,
    pub candidate_lon: f64,
    pub metrics: VisibilityMetrics,
    pub drivability: DrivabilityResult,
    pub access_lat: f64,
    pub access_lon: f64,
    pub access_elevation_m: f32,
    pub distance_from_origin_miles: f64,
    pub score: f64,
}

/// Resolves the WGS84 UTM EPSG code and zone/letter pair for an observer location.
/// This is a structural validation error, not a run-time one: a config with an
/// out-of-range observer should already have failed [`AppConfig::validate`].
pub fn resolve_utm_zone(observer_lat: f64, observer_lon: f64) -> CoreResult<(u32, isize, char)> {
    if !(-90.0..=90.0).contains(&observer_lat) {
        return Err(CoreError::InvalidLatitude(observer_lat));
    }
    if !(-180.0..=180.0).contains(&observer_lon) {
        return Err(CoreError::InvalidLongitude(observer_lon));
    }
    let epsg = utm_epsg_for_latlon(observer_lat, observer_lon);
    let (_, _, zone, letter) = deg_to_utm(observer_lat, observer_lon);
    Ok((epsg, zone, letter))
}

/// Runs the full candidate-extraction, visibility, drivability, scoring, and
/// ranking pipeline against an already-reprojected DEM and road network.
///
/// Structural validation errors (an empty road network, a road/terrain CRS mismatch,
/// an observer outside the DEM extent) abort before any per-candidate work runs. Zero
/// surviving candidates after extraction or drivability is not an error: it comes
/// back as an empty `Vec`.
pub fn run_pipeline(grid: &TerrainGrid, roads: &MultiPolyline, config: &AppConfig) -> CoreResult<Vec<ViewpointResult>> {
    config.validate()?;

    if roads.is_empty() {
        return Err(CoreError::EmptyRoadNetwork);
    }

    if grid.crs() != roads.crs() {
        return Err(CoreError::CrsMismatch { terrain_crs: grid.crs().to_string(), roads_crs: roads.crs().to_string() });
    }

    let (_, zone, letter) = resolve_utm_zone(config.observer.latitude, config.observer.longitude)?;

    let (origin_x, origin_y, _, _) = deg_to_utm(config.observer.latitude, config.observer.longitude);
    let origin = Point2D::new(origin_x, origin_y);

    if !grid.bounding_box().contains(origin) {
        return Err(CoreError::ObserverOutsideGrid { lat: config.observer.latitude, lon: config.observer.longitude });
    }

    let extractor_config = ExtractorConfig {
        neighborhood: 3,
        min_prominence_m: 10.0,
        min_slope_deg: 2.0,
        cluster_grid_m: config.terrain.cluster_grid_m,
    };
    let candidates = extract_candidates(grid, &extractor_config);
    tracing::debug!(count = candidates.len(), "extracted terrain candidates");

    let visibility_config = VisibilityConfig {
        observer_eye_height_m: config.visibility.observer_eye_height_m,
        obstruction_start_m: config.visibility.obstruction_start_m,
        obstruction_height_m: config.visibility.obstruction_height_m,
        min_visibility_miles: config.visibility.min_visibility_miles,
        min_field_of_view_deg: config.visibility.min_field_of_view_deg,
        azimuth_deg: config.visibility.azimuth_deg,
        rays_full_circle: config.visibility.rays_full_circle,
        max_visibility_km: config.terrain.max_visibility_km,
    };

    let mut results = Vec::new();
    for candidate in &candidates {
        let metrics = compute_visibility_metrics(grid, candidate, &visibility_config);

        let candidate_point = Point2D::new(candidate.x, candidate.y);
        let access = match nearest_access_point(roads, candidate_point, config.roads.walking_speed_kmh) {
            Some(access) => access,
            None => continue,
        };

        let drivability = match evaluate_drivability(
            origin,
            access,
            config.roads.driving_speed_kmh,
            config.roads.max_walk_minutes,
            config.roads.max_drive_minutes,
        ) {
            Some(d) => d,
            None => continue,
        };

        let (candidate_lat, candidate_lon) = utm_to_deg(zone, letter, candidate.x, candidate.y);
        let (access_lat, access_lon) = utm_to_deg(zone, letter, drivability.access.x, drivability.access.y);
        let access_elevation_m = grid.sample_bilinear(drivability.access.x, drivability.access.y);

        let distance_from_origin_miles =
            meters_to_miles(great_circle_distance_m((config.observer.latitude, config.observer.longitude), (candidate_lat, candidate_lon)));

        let score_inputs = ScoreInputs {
            max_distance_m: metrics.max_distance_m,
            actual_fov_deg: metrics.actual_fov_deg,
            walk_minutes: drivability.walk_minutes,
            elevation_m: candidate.elevation as f64,
            min_visibility_miles: config.visibility.min_visibility_miles,
            min_field_of_view_deg: config.visibility.min_field_of_view_deg,
            max_walk_minutes: config.roads.max_walk_minutes,
        };

        results.push(ViewpointResult {
            candidate: *candidate,
            candidate_lat,
            candidate_lon,
            metrics,
            drivability,
            access_lat,
            access_lon,
            access_elevation_m,
            distance_from_origin_miles,
            score: score(&score_inputs),
        });
    }

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(config.output.results_limit);

    if results.is_empty() {
        tracing::info!("no candidates survived visibility and drivability evaluation");
    } else {
        tracing::info!(accepted = results.len(), "pipeline produced ranked viewpoints");
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewfinder_common::configs::{ObserverConfig, OutputConfig, RoadConfig, TerrainConfig};
    use viewfinder_common::configs::VisibilityConfig as ConfigVisibility;
    use viewfinder_common::structures::Polyline;

    use crate::terrain::AffineTransform;

    fn test_config(observer_lat: f64, observer_lon: f64) -> AppConfig {
        AppConfig {
            observer: ObserverConfig { latitude: observer_lat, longitude: observer_lon, altitude_m: 0.0 },
            terrain: TerrainConfig { search_radius_km: 5.0, resolution_scale: 1.0, max_visibility_km: 2.0, cluster_grid_m: 50.0 },
            roads: RoadConfig { walking_speed_kmh: 4.8, driving_speed_kmh: 60.0, max_walk_minutes: 60.0, max_drive_minutes: None },
            visibility: ConfigVisibility {
                observer_eye_height_m: 1.8,
                obstruction_start_m: 10.0,
                obstruction_height_m: 0.0,
                min_visibility_miles: 0.1,
                min_field_of_view_deg: 90.0,
                azimuth_deg: 0.0,
                rays_full_circle: 16,
            },
            output: OutputConfig { results_limit: 10 },
        }
    }

    /// An isolated, asymmetric hill: the summit sits at 160 m and falls off at a
    /// different rate in each of the four cardinal directions (floored at 100 m),
    /// so the centered-difference slope at the summit is nonzero, as it would be
    /// for any real, non-perfectly-radial terrain feature.
    fn hill_grid(zone_epsg_hint: (f64, f64)) -> TerrainGrid {
        let (origin_x, origin_y, _, _) = deg_to_utm(zone_epsg_hint.0, zone_epsg_hint.1);
        let size = 61usize;
        let half = (size / 2) as f64;
        let pixel = 10.0;
        let transform = AffineTransform::north_up(origin_x - half * pixel, origin_y + half * pixel, pixel, pixel);
        let center = (size / 2) as isize;

        let mut data = vec![0.0f32; size * size];
        for row in 0..size {
            for col in 0..size {
                let row_off = row as isize - center;
                let col_off = col as isize - center;
                let row_drop = if row_off < 0 { -10.0 * row_off as f64 } else { 6.0 * row_off as f64 };
                let col_drop = if col_off < 0 { 12.0 * -(col_off as f64) } else { 8.0 * col_off as f64 };
                let elevation = (160.0 - row_drop - col_drop).max(100.0);
                data[row * size + col] = elevation as f32;
            }
        }
        TerrainGrid::new(data, size, size, transform, "local")
    }

    fn roads_near(origin_x: f64, origin_y: f64) -> MultiPolyline {
        let mut roads = MultiPolyline::new("local");
        roads.push(Polyline::new(
            &[Point2D::new(origin_x - 1000.0, origin_y - 50.0), Point2D::new(origin_x + 1000.0, origin_y - 50.0)],
            0,
        ));
        roads
    }

    #[test]
    fn rejects_empty_road_network() {
        let config = test_config(45.5, -122.6);
        let grid = hill_grid((45.5, -122.6));
        let roads = MultiPolyline::new("local");
        let result = run_pipeline(&grid, &roads, &config);
        assert!(matches!(result, Err(CoreError::EmptyRoadNetwork)));
    }

    #[test]
    fn rejects_invalid_observer_latitude() {
        let config = test_config(95.0, -122.6);
        let grid = hill_grid((45.5, -122.6));
        let (ox, oy, _, _) = deg_to_utm(45.5, -122.6);
        let roads = roads_near(ox, oy);
        let result = run_pipeline(&grid, &roads, &config);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_observer_outside_dem_extent() {
        let grid = hill_grid((45.5, -122.6));
        let config = test_config(45.6, -122.6);
        let (ox, oy, _, _) = deg_to_utm(45.5, -122.6);
        let roads = roads_near(ox, oy);
        let result = run_pipeline(&grid, &roads, &config);
        assert!(matches!(result, Err(CoreError::ObserverOutsideGrid { .. })));
    }

    #[test]
    fn rejects_crs_mismatch_between_roads_and_terrain() {
        let observer = (45.5, -122.6);
        let config = test_config(observer.0, observer.1);
        let grid = hill_grid(observer);
        let (ox, oy, _, _) = deg_to_utm(observer.0, observer.1);
        let mut roads = MultiPolyline::new("EPSG:32610");
        roads.push(Polyline::new(&[Point2D::new(ox - 1000.0, oy - 50.0), Point2D::new(ox + 1000.0, oy - 50.0)], 0));
        let result = run_pipeline(&grid, &roads, &config);
        assert!(matches!(result, Err(CoreError::CrsMismatch { .. })));
    }

    #[test]
    fn produces_a_ranked_result_for_an_isolated_hill() {
        let observer = (45.5, -122.6);
        let config = test_config(observer.0, observer.1);
        let grid = hill_grid(observer);
        let (ox, oy, _, _) = deg_to_utm(observer.0, observer.1);
        let roads = roads_near(ox, oy);

        let results = run_pipeline(&grid, &roads, &config).unwrap();
        assert!(!results.is_empty());
        assert!(results[0].score >= 0.0);
        assert!(results.windows(2).all(|pair| pair[0].score >= pair[1].score));
    }

    #[test]
    fn results_never_exceed_configured_limit() {
        let observer = (45.5, -122.6);
        let mut config = test_config(observer.0, observer.1);
        config.output.results_limit = 1;
        let grid = hill_grid(observer);
        let (ox, oy, _, _) = deg_to_utm(observer.0, observer.1);
        let roads = roads_near(ox, oy);

        let results = run_pipeline(&grid, &roads, &config).unwrap();
        assert!(results.len() <= 1);
    }
}
