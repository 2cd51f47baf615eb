// Ray-cast visibility engine: casts a fan of azimuth rays from a candidate and
// tracks the running max-slope horizon, enforcing a near-field clearance requirement
// that models a uniform foreground obstruction belt (forest edge, building row, etc.).
//
// The ray-marching structure (step along a unit vector, map back to fractional pixel
// indices, bilinear-sample, track a running extremum) follows the `HorizonAngle` tool
// of the WhiteboxTools terrain-analysis toolbox.

use viewfinder_common::utils::{angle_in_sector, azimuth_range, azimuth_unit_vector, miles_to_meters};

use crate::candidates::TerrainCandidate;
use crate::terrain::TerrainGrid;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityConfig {
    pub observer_eye_height_m: f64,
    pub obstruction_start_m: f64,
    pub obstruction_height_m: f64,
    pub min_visibility_miles: f64,
    pub min_field_of_view_deg: f64,
    pub azimuth_deg: f64,
    pub rays_full_circle: u32,
    pub max_visibility_km: f64,
}

/// Per-ray result: the azimuth it was cast at, the visible distance reached (m),
/// and whether the foreground clearance requirement was met.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayResult {
    pub azimuth_deg: f64,
    pub distance_m: f64,
    pub clearance_met: bool,
}

#[derive(Debug, Clone)]
pub struct VisibilityMetrics {
    pub max_distance_m: f64,
    pub mean_sector_distance_m: f64,
    pub median_sector_distance_m: f64,
    pub actual_fov_deg: f64,
    pub rays_with_clearance: usize,
    pub total_rays: usize,
    pub rays: Vec<RayResult>,
}

/// Casts `rays_full_circle` rays from `candidate` and reduces them into
/// [`VisibilityMetrics`]. Pure function: no I/O, no panics on degenerate input.
pub fn compute_visibility_metrics(grid: &TerrainGrid, candidate: &TerrainCandidate, config: &VisibilityConfig) -> VisibilityMetrics {
    let total_rays = config.rays_full_circle as usize;
    let mut rays = Vec::with_capacity(total_rays);
    for i in 0..total_rays {
        let azimuth_deg = (i as f64) * 360.0 / (config.rays_full_circle as f64);
        rays.push(trace_ray(grid, candidate, azimuth_deg, config));
    }

    let rays_with_clearance = rays.iter().filter(|r| r.clearance_met).count();
    let max_distance_m = rays.iter().map(|r| r.distance_m).fold(0.0, f64::max);

    let (sector_start, sector_end) = azimuth_range(config.azimuth_deg, config.min_field_of_view_deg);
    let in_all_sectors = config.min_field_of_view_deg >= 360.0;
    let sector_distances: Vec<f64> = rays
        .iter()
        .filter(|r| in_all_sectors || angle_in_sector(r.azimuth_deg, sector_start, sector_end))
        .map(|r| r.distance_m)
        .collect();

    let mean_sector_distance_m = mean(&sector_distances);
    let median_sector_distance_m = median(&sector_distances);

    let min_visibility_m = miles_to_meters(config.min_visibility_miles);
    let deg_per_ray = 360.0 / (config.rays_full_circle as f64);
    let satisfying = sector_distances.iter().filter(|&&d| d >= min_visibility_m).count();
    let actual_fov_deg = satisfying as f64 * deg_per_ray;

    VisibilityMetrics {
        max_distance_m,
        mean_sector_distance_m,
        median_sector_distance_m,
        actual_fov_deg,
        rays_with_clearance,
        total_rays,
        rays,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn trace_ray(grid: &TerrainGrid, candidate: &TerrainCandidate, azimuth_deg: f64, config: &VisibilityConfig) -> RayResult {
    let (dx_unit, dy_unit) = azimuth_unit_vector(azimuth_deg);

    let (cell_dx, cell_dy) = grid.resolution();
    let cell_size = cell_dx.min(cell_dy);
    let max_steps = (config.max_visibility_km * 1000.0 / cell_size).floor() as i64;

    let viewer_height = candidate.elevation as f64 + config.observer_eye_height_m;
    let drop_required = (config.obstruction_height_m - config.observer_eye_height_m).max(0.0);

    let mut clearance_met = drop_required <= 0.0;
    let mut visible_distance = 0.0f64;
    let mut running_max_slope = f64::NEG_INFINITY;

    for k in 1..=max_steps {
        let distance = k as f64 * cell_size;
        let x = candidate.x + distance * dx_unit;
        let y = candidate.y + distance * dy_unit;

        let (col_f, row_f) = grid.transform().world_to_pixel(x, y);
        if col_f < -0.5 || row_f < -0.5 || col_f > grid.columns() as f64 - 0.5 || row_f > grid.rows() as f64 - 0.5 {
            break;
        }

        let sample = grid.sample_bilinear(x, y);
        if sample.is_nan() {
            continue;
        }
        let sample = sample as f64;

        if distance <= config.obstruction_start_m {
            if !clearance_met && candidate.elevation as f64 - sample >= drop_required {
                clearance_met = true;
            }
        } else if !clearance_met {
            visible_distance = config.obstruction_start_m;
            return RayResult { azimuth_deg, distance_m: visible_distance.min(config.obstruction_start_m), clearance_met: false };
        }

        let obstacle_height = if distance > config.obstruction_start_m { sample + config.obstruction_height_m } else { sample };

        let slope = (obstacle_height - viewer_height) / distance;
        if slope > running_max_slope {
            running_max_slope = slope;
            visible_distance = distance;
        }
    }

    if !clearance_met {
        visible_distance = visible_distance.min(config.obstruction_start_m);
    }

    RayResult { azimuth_deg, distance_m: visible_distance, clearance_met }
}
