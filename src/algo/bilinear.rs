//! Clamped bilinear interpolation for dense 2D grids.
//!
//! Chord sampling queries the intensity and geometric matrices at fractional
//! pixel positions. Queries are clamped to the valid interior so that a chord
//! endpoint that lands exactly on the image border still interpolates from
//! real pixels.

use ndarray::ArrayView2;

/// Keeps the clamped coordinate strictly below the last cell boundary.
const EDGE_EPS: f64 = 1e-9;

/// Bilinear interpolation of `matrix` at fractional pixel (x, y).
///
/// `x` indexes columns and `y` rows. Coordinates are clamped to
/// [0, dim − 1 − 1e-9] per axis; at integer coordinates inside the grid the
/// stored value is returned exactly.
pub fn interpolate(matrix: ArrayView2<'_, f64>, x: f64, y: f64) -> f64 {
    let (rows, cols) = matrix.dim();
    if rows == 0 || cols == 0 {
        return 0.0;
    }
    if rows < 2 || cols < 2 {
        return matrix[[0, 0]];
    }

    let x = x.clamp(0.0, (cols - 1) as f64 - EDGE_EPS);
    let y = y.clamp(0.0, (rows - 1) as f64 - EDGE_EPS);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let v00 = matrix[[y0, x0]];
    let v01 = matrix[[y0, x0 + 1]];
    let v10 = matrix[[y0 + 1, x0]];
    let v11 = matrix[[y0 + 1, x0 + 1]];

    let top = v00 * (1.0 - fx) + v01 * fx;
    let bottom = v10 * (1.0 - fx) + v11 * fx;
    top * (1.0 - fy) + bottom * fy
}
