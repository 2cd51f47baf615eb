// An immutable elevation raster with an affine pixel-to-world mapping.
//
// Mirrors the `RasterConfigs` accessor conventions of the WhiteboxTools raster crate
// (`get_x_from_column` / `get_y_from_row` and their inverses), narrowed to the
// read-only, in-memory surface the analysis engine actually needs.

use viewfinder_common::structures::{BoundingBox, Point2D};

/// Six-parameter affine transform mapping pixel `(col, row)` to world `(x, y)`:
/// `x = c + col*a + row*b`, `y = f + col*d + row*e`.
///
/// North-up rasters (the only orientation this engine handles) have `b = d = 0`,
/// `a = pixel_width > 0`, `e = -pixel_height < 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl AffineTransform {
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> AffineTransform {
        AffineTransform {
            a: pixel_width,
            b: 0.0,
            c: origin_x,
            d: 0.0,
            e: -pixel_height,
            f: origin_y,
        }
    }

    pub fn pixel_to_world(&self, col: f64, row: f64) -> (f64, f64) {
        (self.c + col * self.a + row * self.b, self.f + col * self.d + row * self.e)
    }

    /// Inverse mapping from world `(x, y)` to fractional pixel `(col, row)`. Assumes
    /// the north-up case (`b = d = 0`), which is all this engine ever constructs.
    pub fn world_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let col = (x - self.c) / self.a;
        let row = (y - self.f) / self.e;
        (col, row)
    }
}

/// An immutable elevation raster. Rows run north-to-south, columns west-to-east.
/// `NaN` marks nodata; reductions over the grid must skip it rather than propagate it.
#[derive(Debug, Clone)]
pub struct TerrainGrid {
    elevations: Vec<f32>,
    rows: usize,
    columns: usize,
    transform: AffineTransform,
    crs: String,
}

impl TerrainGrid {
    pub fn new(elevations: Vec<f32>, rows: usize, columns: usize, transform: AffineTransform, crs: impl Into<String>) -> TerrainGrid {
        assert_eq!(elevations.len(), rows * columns, "elevation buffer does not match rows*columns");
        TerrainGrid { elevations, rows, columns, transform, crs: crs.into() }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn height(&self) -> usize {
        self.rows
    }

    pub fn width(&self) -> usize {
        self.columns
    }

    pub fn crs(&self) -> &str {
        &self.crs
    }

    pub fn transform(&self) -> AffineTransform {
        self.transform
    }

    /// Pixel size `(dx, dy)`, always positive.
    pub fn resolution(&self) -> (f64, f64) {
        (self.transform.a.abs(), self.transform.e.abs())
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.columns == 0
    }

    pub fn get(&self, row: isize, col: isize) -> f32 {
        if row < 0 || col < 0 || row as usize >= self.rows || col as usize >= self.columns {
            return f32::NAN;
        }
        self.elevations[row as usize * self.columns + col as usize]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        self.elevations[row * self.columns + col] = value;
    }

    /// World coordinates at the center of pixel `(row, col)`.
    pub fn pixel_center(&self, row: usize, col: usize) -> (f64, f64) {
        self.transform.pixel_to_world(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Coordinate meshes at pixel centers: `xs[col]`, `ys[row]`. Valid only for
    /// north-up transforms, which is the only kind this engine produces.
    pub fn coordinates(&self) -> (Vec<f64>, Vec<f64>) {
        let xs = (0..self.columns).map(|col| self.transform.pixel_to_world(col as f64 + 0.5, 0.0).0).collect();
        let ys = (0..self.rows).map(|row| self.transform.pixel_to_world(0.0, row as f64 + 0.5).1).collect();
        (xs, ys)
    }

    /// Bilinear sample at world coordinate `(x, y)`, with nearest-edge extrapolation.
    /// Returns `NaN` if all four corners are nodata, or if `(x, y)` is outside the grid.
    pub fn sample_bilinear(&self, x: f64, y: f64) -> f32 {
        let (col_f, row_f) = self.transform.world_to_pixel(x, y);
        if col_f < -0.5 || row_f < -0.5 || col_f > self.columns as f64 - 0.5 || row_f > self.rows as f64 - 0.5 {
            return f32::NAN;
        }

        let col0 = col_f.floor();
        let row0 = row_f.floor();
        let tx = (col_f - col0).clamp(0.0, 1.0);
        let ty = (row_f - row0).clamp(0.0, 1.0);

        let c0 = col0 as isize;
        let r0 = row0 as isize;

        let z00 = self.get(r0, c0);
        let z10 = self.get(r0, c0 + 1);
        let z01 = self.get(r0 + 1, c0);
        let z11 = self.get(r0 + 1, c0 + 1);

        let mut weight_sum = 0.0f64;
        let mut value_sum = 0.0f64;
        for (z, w) in [
            (z00, (1.0 - tx) * (1.0 - ty)),
            (z10, tx * (1.0 - ty)),
            (z01, (1.0 - tx) * ty),
            (z11, tx * ty),
        ] {
            if !z.is_nan() && w > 0.0 {
                weight_sum += w;
                value_sum += z as f64 * w;
            }
        }

        if weight_sum <= 0.0 {
            f32::NAN
        } else {
            (value_sum / weight_sum) as f32
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let (x0, y0) = self.transform.pixel_to_world(0.0, 0.0);
        let (x1, y1) = self.transform.pixel_to_world(self.columns as f64, self.rows as f64);
        BoundingBox::from_two_points(Point2D::new(x0, y0), Point2D::new(x1, y1))
    }

    /// Clips to the smallest pixel rectangle enclosing `bounds`. Empty if disjoint
    /// from the grid extent.
    pub fn subset(&self, bounds: BoundingBox) -> TerrainGrid {
        let grid_bounds = self.bounding_box();
        if !grid_bounds.overlaps(bounds) {
            return TerrainGrid {
                elevations: Vec::new(),
                rows: 0,
                columns: 0,
                transform: self.transform,
                crs: self.crs.clone(),
            };
        }

        let (min_col_f, max_row_f) = self.transform.world_to_pixel(bounds.min_x, bounds.min_y);
        let (max_col_f, min_row_f) = self.transform.world_to_pixel(bounds.max_x, bounds.max_y);

        let min_col = min_col_f.floor().max(0.0) as usize;
        let min_row = min_row_f.floor().max(0.0) as usize;
        let max_col = (max_col_f.ceil() as isize).min(self.columns as isize).max(0) as usize;
        let max_row = (max_row_f.ceil() as isize).min(self.rows as isize).max(0) as usize;

        if min_col >= max_col || min_row >= max_row {
            return TerrainGrid {
                elevations: Vec::new(),
                rows: 0,
                columns: 0,
                transform: self.transform,
                crs: self.crs.clone(),
            };
        }

        let out_rows = max_row - min_row;
        let out_cols = max_col - min_col;
        let mut data = Vec::with_capacity(out_rows * out_cols);
        for row in min_row..max_row {
            for col in min_col..max_col {
                data.push(self.get(row as isize, col as isize));
            }
        }

        let (origin_x, origin_y) = self.transform.pixel_to_world(min_col as f64, min_row as f64);
        let sub_transform = AffineTransform {
            a: self.transform.a,
            b: self.transform.b,
            c: origin_x,
            d: self.transform.d,
            e: self.transform.e,
            f: origin_y,
        };

        TerrainGrid { elevations: data, rows: out_rows, columns: out_cols, transform: sub_transform, crs: self.crs.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_grid(rows: usize, cols: usize, elevation: f32) -> TerrainGrid {
        let transform = AffineTransform::north_up(0.0, (rows as f64) * 10.0, 10.0, 10.0);
        TerrainGrid::new(vec![elevation; rows * cols], rows, cols, transform, "EPSG:32610")
    }

    #[test]
    fn pixel_center_round_trips_through_transform() {
        let grid = flat_grid(5, 5, 100.0);
        let (x, y) = grid.pixel_center(2, 3);
        let (col, row) = grid.transform().world_to_pixel(x, y);
        assert!((col - 3.5).abs() < 1e-9);
        assert!((row - 2.5).abs() < 1e-9);
    }

    #[test]
    fn bilinear_sample_matches_constant_field() {
        let grid = flat_grid(10, 10, 123.0);
        let (x, y) = grid.pixel_center(4, 4);
        let sampled = grid.sample_bilinear(x, y);
        assert!((sampled - 123.0).abs() < 1e-4);
    }

    #[test]
    fn bilinear_sample_outside_grid_is_nan() {
        let grid = flat_grid(10, 10, 123.0);
        assert!(grid.sample_bilinear(-500.0, -500.0).is_nan());
    }

    #[test]
    fn subset_clips_to_requested_bounds() {
        let grid = flat_grid(20, 20, 50.0);
        let bounds = BoundingBox::new(50.0, 100.0, 50.0, 100.0);
        let sub = grid.subset(bounds);
        assert!(sub.rows() > 0 && sub.rows() < grid.rows());
        assert!(sub.columns() > 0 && sub.columns() < grid.columns());
    }

    #[test]
    fn subset_disjoint_from_grid_is_empty() {
        let grid = flat_grid(10, 10, 50.0);
        let bounds = BoundingBox::new(100_000.0, 100_100.0, 100_000.0, 100_100.0);
        let sub = grid.subset(bounds);
        assert!(sub.is_empty());
    }
}
