// Local-maximum terrain candidate extraction: Gaussian smoothing, a prominence and
// slope filter, and coarse spatial clustering.
//
// The Gaussian kernel construction follows the GaussianFilter tool of the WhiteboxTools
// image-processing toolbox: weights are sampled from the 2-D normal curve and
// normalized to sum to one over a square window sized so the tails fall below 0.001.

use std::collections::BTreeMap;

use crate::terrain::TerrainGrid;

/// A raw terrain candidate located by the extractor, prior to visibility or road analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainCandidate {
    pub x: f64,
    pub y: f64,
    pub elevation: f32,
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractorConfig {
    pub neighborhood: usize,
    pub min_prominence_m: f32,
    pub min_slope_deg: f64,
    pub cluster_grid_m: f64,
}

impl Default for ExtractorConfig {
    fn default() -> ExtractorConfig {
        ExtractorConfig {
            neighborhood: 3,
            min_prominence_m: 10.0,
            min_slope_deg: 2.0,
            cluster_grid_m: 250.0,
        }
    }
}

/// Builds a square Gaussian kernel of odd side length for `sigma` pixels, normalized
/// to unit sum. Mirrors the weight-construction loop of the `GaussianFilter` tool.
fn build_gaussian_kernel(sigma: f64) -> (usize, Vec<f64>) {
    let recip = 1.0 / ((2.0 * std::f64::consts::PI).sqrt() * sigma);
    let two_sigma_sqr = 2.0 * sigma * sigma;

    let mut filter_radius = 1usize;
    loop {
        let weight = recip * (-((filter_radius * filter_radius) as f64) / two_sigma_sqr).exp();
        if weight <= 0.001 {
            break;
        }
        filter_radius += 1;
    }
    let filter_size = (filter_radius * 2 + 1).max(3);
    let midpoint = (filter_size / 2) as isize;

    let mut weights = vec![0.0; filter_size * filter_size];
    let mut sum = 0.0;
    for row in 0..filter_size {
        for col in 0..filter_size {
            let dx = col as isize - midpoint;
            let dy = row as isize - midpoint;
            let w = recip * (-((dx * dx + dy * dy) as f64) / two_sigma_sqr).exp();
            weights[row * filter_size + col] = w;
            sum += w;
        }
    }
    for w in weights.iter_mut() {
        *w /= sum;
    }

    (filter_size, weights)
}

/// Gaussian-smooths the grid with sigma = 1 pixel, reflecting at the edges. NoData
/// cells are excluded from the convolution and renormalized around.
fn smooth(grid: &TerrainGrid) -> Vec<f32> {
    let (filter_size, weights) = build_gaussian_kernel(1.0);
    let midpoint = (filter_size / 2) as isize;
    let rows = grid.rows() as isize;
    let cols = grid.columns() as isize;

    let mut out = vec![f32::NAN; (rows * cols) as usize];
    for row in 0..rows {
        for col in 0..cols {
            let mut weight_sum = 0.0f64;
            let mut value_sum = 0.0f64;
            for kr in 0..filter_size {
                for kc in 0..filter_size {
                    let dy = kr as isize - midpoint;
                    let dx = kc as isize - midpoint;
                    let sample_row = reflect(row + dy, rows);
                    let sample_col = reflect(col + dx, cols);
                    let z = grid.get(sample_row, sample_col);
                    if !z.is_nan() {
                        let w = weights[kr * filter_size + kc];
                        weight_sum += w;
                        value_sum += z as f64 * w;
                    }
                }
            }
            if weight_sum > 0.0 {
                out[(row * cols + col) as usize] = (value_sum / weight_sum) as f32;
            }
        }
    }
    out
}

/// Reflects an out-of-bounds index back into `[0, len)`.
fn reflect(index: isize, len: isize) -> isize {
    if len <= 1 {
        return 0;
    }
    let mut i = index;
    while i < 0 || i >= len {
        if i < 0 {
            i = -i - 1;
        } else if i >= len {
            i = 2 * len - i - 1;
        }
    }
    i
}

/// Max of the smoothed field over the `neighborhood`-sized local-max footprint
/// (radius `neighborhood / 2`), clamped at raster edges.
fn max_smoothed_in_footprint(grid: &TerrainGrid, smoothed: &[f32], row: isize, col: isize, half: isize) -> f32 {
    let cols = grid.columns() as isize;
    let rows = grid.rows() as isize;
    let mut max_smoothed = f32::NEG_INFINITY;
    for dy in -half..=half {
        for dx in -half..=half {
            let r = row + dy;
            let c = col + dx;
            if r < 0 || c < 0 || r >= rows || c >= cols {
                continue;
            }
            let sz = smoothed[(r * cols + c) as usize];
            if !sz.is_nan() && sz > max_smoothed {
                max_smoothed = sz;
            }
        }
    }
    max_smoothed
}

/// Min of the raw elevations over the prominence window, which spans
/// `2*neighborhood + 1` cells on a side (a wider window than the local-max
/// footprint), clamped at raster edges.
fn min_raw_in_prominence_window(grid: &TerrainGrid, row: isize, col: isize, neighborhood: isize) -> f32 {
    let cols = grid.columns() as isize;
    let rows = grid.rows() as isize;
    let mut min_raw = f32::INFINITY;
    for dy in -neighborhood..=neighborhood {
        for dx in -neighborhood..=neighborhood {
            let r = row + dy;
            let c = col + dx;
            if r < 0 || c < 0 || r >= rows || c >= cols {
                continue;
            }
            let rz = grid.get(r, c);
            if !rz.is_nan() && rz < min_raw {
                min_raw = rz;
            }
        }
    }
    min_raw
}

/// Runs the full extraction pipeline: smoothing, local-maximum detection, prominence
/// and slope filtering, and clustering. Candidates come back deterministically ordered
/// by row-major extraction order, then reduced to one per cluster bin.
pub fn extract_candidates(grid: &TerrainGrid, config: &ExtractorConfig) -> Vec<TerrainCandidate> {
    if grid.is_empty() {
        return Vec::new();
    }

    let smoothed = smooth(grid);
    let half = (config.neighborhood / 2) as isize;
    let (dx_px, dy_px) = grid.resolution();
    let rows = grid.rows() as isize;
    let cols = grid.columns() as isize;

    let mut raw_candidates = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            let idx = (row * cols + col) as usize;
            let sz = smoothed[idx];
            if sz.is_nan() {
                continue;
            }

            let max_smoothed = max_smoothed_in_footprint(grid, &smoothed, row, col, half);
            if sz < max_smoothed {
                continue;
            }

            let raw_elevation = grid.get(row, col);
            if raw_elevation.is_nan() {
                continue;
            }
            let min_raw = min_raw_in_prominence_window(grid, row, col, config.neighborhood as isize);
            if min_raw.is_finite() && raw_elevation - min_raw < config.min_prominence_m {
                continue;
            }

            let z_north = grid.get(row - 1, col);
            let z_south = grid.get(row + 1, col);
            let z_west = grid.get(row, col - 1);
            let z_east = grid.get(row, col + 1);
            if z_north.is_nan() || z_south.is_nan() || z_west.is_nan() || z_east.is_nan() {
                continue;
            }
            let gy = (z_south - z_north) as f64 / (2.0 * dy_px);
            let gx = (z_east - z_west) as f64 / (2.0 * dx_px);
            let slope_deg = gx.hypot(gy).atan().to_degrees();
            if slope_deg < config.min_slope_deg {
                continue;
            }

            let (x, y) = grid.pixel_center(row as usize, col as usize);
            raw_candidates.push(TerrainCandidate { x, y, elevation: raw_elevation, row: row as usize, col: col as usize });
        }
    }

    cluster_candidates(&raw_candidates, config.cluster_grid_m)
}

/// Bins candidates by `(floor(x / grid_size), floor(y / grid_size))`, keeping the
/// highest-elevation candidate per bin. Ties go to the earlier row-major candidate.
/// Bin keys are iterated in lexicographic order for deterministic output.
pub fn cluster_candidates(candidates: &[TerrainCandidate], grid_size_m: f64) -> Vec<TerrainCandidate> {
    let mut bins: BTreeMap<(i64, i64), TerrainCandidate> = BTreeMap::new();
    for &candidate in candidates {
        let key = ((candidate.x / grid_size_m).floor() as i64, (candidate.y / grid_size_m).floor() as i64);
        match bins.get(&key) {
            Some(existing) if existing.elevation >= candidate.elevation => {}
            _ => {
                bins.insert(key, candidate);
            }
        }
    }
    bins.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::AffineTransform;

    fn checkerboard_grid(rows: usize, cols: usize) -> TerrainGrid {
        let transform = AffineTransform::north_up(0.0, (rows as f64) * 10.0, 10.0, 10.0);
        let mut data = vec![100.0f32; rows * cols];
        data[(rows / 2) * cols + (cols / 2)] = 140.0;
        TerrainGrid::new(data, rows, cols, transform, "EPSG:32610")
    }

    #[test]
    fn empty_grid_yields_no_candidates() {
        let transform = AffineTransform::north_up(0.0, 0.0, 10.0, 10.0);
        let grid = TerrainGrid::new(Vec::new(), 0, 0, transform, "EPSG:32610");
        assert!(extract_candidates(&grid, &ExtractorConfig::default()).is_empty());
    }

    #[test]
    fn isolated_peak_survives_prominence_and_slope_filters() {
        let grid = checkerboard_grid(21, 21);
        let config = ExtractorConfig { min_prominence_m: 5.0, min_slope_deg: 1.0, ..Default::default() };
        let candidates = extract_candidates(&grid, &config);
        assert!(!candidates.is_empty());
        assert!(candidates.iter().any(|c| c.elevation > 100.0));
    }

    #[test]
    fn flat_grid_has_no_slope_survivors() {
        let transform = AffineTransform::north_up(0.0, 400.0, 10.0, 10.0);
        let grid = TerrainGrid::new(vec![100.0f32; 40 * 40], 40, 40, transform, "EPSG:32610");
        let candidates = extract_candidates(&grid, &ExtractorConfig::default());
        assert!(candidates.is_empty());
    }

    #[test]
    fn clustering_keeps_highest_elevation_per_bin() {
        // 4x4 grid of bin centers at 250 m spacing, with monotonically increasing
        // elevation so the winner in every bin is identifiable.
        let mut candidates = Vec::new();
        let mut elevation = 100.0f32;
        for row in 0..4 {
            for col in 0..4 {
                let x = col as f64 * 250.0 + 10.0;
                let y = row as f64 * 250.0 + 10.0;
                candidates.push(TerrainCandidate { x, y, elevation, row, col });
                elevation += 1.0;
            }
        }
        let clustered = cluster_candidates(&candidates, 250.0);
        assert_eq!(clustered.len(), 4 * 4);
        let max_elevation = clustered.iter().map(|c| c.elevation).fold(f32::MIN, f32::max);
        assert!((max_elevation - 115.0).abs() < 1e-4);
    }

    #[test]
    fn clustering_never_exceeds_bins_touched() {
        let mut candidates = Vec::new();
        for i in 0..10 {
            let coord = i as f64 * 100.0;
            candidates.push(TerrainCandidate { x: coord, y: coord, elevation: 100.0 + i as f32, row: i, col: i });
        }
        let clustered = cluster_candidates(&candidates, 250.0);
        assert!(clustered.len() <= candidates.len());
    }

    #[test]
    fn clustering_breaks_elevation_ties_by_earlier_candidate() {
        let a = TerrainCandidate { x: 10.0, y: 10.0, elevation: 100.0, row: 0, col: 0 };
        let b = TerrainCandidate { x: 20.0, y: 20.0, elevation: 100.0, row: 1, col: 1 };
        let clustered = cluster_candidates(&[a, b], 250.0);
        assert_eq!(clustered.len(), 1);
        assert_eq!(clustered[0].row, 0);
    }
}
