//! Observation chord: where the star's shadow track crosses the fundamental
//! plane, and what the camera sees along it.
//!
//! The chord is the line swept by the shadow-velocity vector, offset
//! perpendicularly from the plane center. Its two intersections with the
//! image square are oriented by the travel direction, sampled at unit pixel
//! steps, and used both to read the light curve off the intensity matrix and
//! to locate geometric-shadow edges.

use ndarray::ArrayView2;
use std::fmt;

use crate::algo::interpolate;
use crate::error::{OccultError, Result};

/// Which side of the image square an intersection lies on. `Top` is the
/// y = −w/2 side (row 0 of the image), `Bottom` the y = +w/2 side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareEdge {
    Top,
    Bottom,
    Left,
    Right,
}

/// An intersection point tagged with the edge it lies on.
#[derive(Debug, Clone, Copy)]
pub struct AnnotatedPoint {
    pub x: f64,
    pub y: f64,
    pub edge: SquareEdge,
}

/// Travel direction of the shadow across the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathDirection {
    TopToBottom,
    BottomToTop,
    LeftToRight,
    RightToLeft,
}

impl fmt::Display for PathDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PathDirection::TopToBottom => "top to bottom",
            PathDirection::BottomToTop => "bottom to top",
            PathDirection::LeftToRight => "left to right",
            PathDirection::RightToLeft => "right to left",
        };
        f.write_str(s)
    }
}

/// One chord sample: fractional pixel position plus along-path distance.
#[derive(Debug, Clone, Copy)]
pub struct PathSample {
    pub x: f64,
    pub y: f64,
    pub distance_px: f64,
}

/// One light-curve point.
#[derive(Debug, Clone, Copy)]
pub struct LightCurvePoint {
    pub distance_km: f64,
    pub intensity: f64,
}

/// The solved observation chord in image pixel coordinates (origin at the
/// upper-left corner).
#[derive(Debug, Clone)]
pub struct ObservationPath {
    pub speed_km_per_sec: f64,
    /// CCW from +y, in [0°, 360°).
    pub angle_degrees: f64,
    pub direction: PathDirection,
    pub start: (f64, f64),
    pub end: (f64, f64),
    pub samples: Vec<PathSample>,
}

/// Two distinct intersections closer than this collapse into one (corner
/// hits produce the same point from two edges).
const CORNER_TOLERANCE: f64 = 1e-9;

/// Intersect a line with the square of width `width` centered at the origin.
///
/// `theta` is measured CCW from the +y axis, so the line direction is
/// (sin θ, cos θ); `offset` is the signed perpendicular distance of the line
/// from the origin, positive to the right of the travel direction. Returns
/// the two annotated intersections plus the direction components (dx, dy).
pub fn square_intersections(
    width: f64,
    theta: f64,
    offset: f64,
) -> Result<(AnnotatedPoint, AnnotatedPoint, f64, f64)> {
    let half_w = width / 2.0;

    let dx = theta.sin();
    let dy = theta.cos();

    // Normal (perpendicular to the line, rotated 90 degrees clockwise).
    let nx = dy;
    let ny = -dx;

    // A point on the line.
    let x0 = offset * nx;
    let y0 = offset * ny;

    let mut hits: Vec<AnnotatedPoint> = Vec::with_capacity(4);
    let mut push_unique = |p: AnnotatedPoint| {
        let duplicate = hits
            .iter()
            .any(|q| (p.x - q.x).abs() < CORNER_TOLERANCE && (p.y - q.y).abs() < CORNER_TOLERANCE);
        if !duplicate {
            hits.push(p);
        }
    };

    if dx.abs() > 1e-12 {
        let t = (half_w - x0) / dx;
        let y = y0 + t * dy;
        if (-half_w..=half_w).contains(&y) {
            push_unique(AnnotatedPoint {
                x: half_w,
                y,
                edge: SquareEdge::Right,
            });
        }
        let t = (-half_w - x0) / dx;
        let y = y0 + t * dy;
        if (-half_w..=half_w).contains(&y) {
            push_unique(AnnotatedPoint {
                x: -half_w,
                y,
                edge: SquareEdge::Left,
            });
        }
    }

    if dy.abs() > 1e-12 {
        let t = (half_w - y0) / dy;
        let x = x0 + t * dx;
        if (-half_w..=half_w).contains(&x) {
            push_unique(AnnotatedPoint {
                x,
                y: half_w,
                edge: SquareEdge::Bottom,
            });
        }
        let t = (-half_w - y0) / dy;
        let x = x0 + t * dx;
        if (-half_w..=half_w).contains(&x) {
            push_unique(AnnotatedPoint {
                x,
                y: -half_w,
                edge: SquareEdge::Top,
            });
        }
    }

    if hits.len() < 2 {
        return Err(OccultError::NoIntersection);
    }
    Ok((hits[0], hits[1], dx, dy))
}

impl ObservationPath {
    /// Solve the chord for an N-point plane of width `l_km`, shadow velocity
    /// (dx, dy) km/s and perpendicular offset from the center in km.
    pub fn solve(
        n: usize,
        l_km: f64,
        dx_km_per_sec: f64,
        dy_km_per_sec: f64,
        offset_km: f64,
    ) -> Result<Self> {
        let speed = dx_km_per_sec.hypot(dy_km_per_sec);
        if speed <= 0.0 {
            return Err(OccultError::ZeroShadowSpeed);
        }

        let theta = (-dx_km_per_sec).atan2(-dy_km_per_sec);
        let mut angle_degrees = theta.to_degrees();
        if angle_degrees < 0.0 {
            angle_degrees += 360.0;
        }

        // Positive offset moves the chord to the right as seen riding with
        // the shadow.
        let offset_px = offset_km / l_km * n as f64;
        let width = (n - 1) as f64;
        let (mut p1, mut p2, dir_x, dir_y) = square_intersections(width, theta, offset_px)?;

        // Back to pixel coordinates with the origin at the upper-left corner.
        let shift = n as f64 / 2.0;
        p1.x += shift;
        p1.y += shift;
        p2.x += shift;
        p2.y += shift;

        let on_top_bottom = |p: &AnnotatedPoint| {
            p.edge == SquareEdge::Top || p.edge == SquareEdge::Bottom
        };

        let (direction, start, end) = if on_top_bottom(&p1) && on_top_bottom(&p2) {
            if dir_y < 0.0 {
                let (s, e) = if p1.edge == SquareEdge::Top {
                    (p1, p2)
                } else {
                    (p2, p1)
                };
                (PathDirection::TopToBottom, s, e)
            } else {
                let (s, e) = if p1.edge == SquareEdge::Bottom {
                    (p1, p2)
                } else {
                    (p2, p1)
                };
                (PathDirection::BottomToTop, s, e)
            }
        } else if dir_x < 0.0 {
            let (s, e) = if p1.edge == SquareEdge::Left {
                (p1, p2)
            } else {
                (p2, p1)
            };
            (PathDirection::LeftToRight, s, e)
        } else {
            let (s, e) = if p1.edge == SquareEdge::Right {
                (p1, p2)
            } else {
                (p2, p1)
            };
            (PathDirection::RightToLeft, s, e)
        };

        let samples = unit_samples((start.x, start.y), (end.x, end.y));

        Ok(Self {
            speed_km_per_sec: speed,
            angle_degrees,
            direction,
            start: (start.x, start.y),
            end: (end.x, end.y),
            samples,
        })
    }

    /// Read the light curve off the (post-convolution) intensity matrix.
    ///
    /// Distances are converted from pixels to km with the plane resolution.
    pub fn sample_light_curve(
        &self,
        intensity: ArrayView2<'_, f64>,
        resolution_km_per_px: f64,
    ) -> Vec<LightCurvePoint> {
        self.samples
            .iter()
            .map(|s| LightCurvePoint {
                distance_km: s.distance_px * resolution_km_per_px,
                intensity: interpolate(intensity, s.x, s.y),
            })
            .collect()
    }

    /// Along-path pixel distances at which the chord crosses geometric-shadow
    /// boundaries.
    ///
    /// The geometric matrix is 1.0 inside an occulter and 0.0 where
    /// illuminated; the scan starts looking for 1.0, so the first recorded
    /// edge is the first entry into shadow, and each hit toggles the value
    /// sought. A chord crossing a single convex occulter reports exactly the
    /// entry and exit distances.
    pub fn find_shadow_edges(&self, geometric: ArrayView2<'_, f64>) -> Vec<f64> {
        let mut edges = Vec::new();
        let mut target = 1.0;
        for s in &self.samples {
            let mut value = interpolate(geometric, s.x, s.y);
            value = if value > 0.0 { 1.0 } else { 0.0 };
            if value == target {
                edges.push(s.distance_px);
                target = 1.0 - target;
            }
        }
        edges
    }
}

/// Walk from start to end in unit pixel steps.
fn unit_samples(start: (f64, f64), end: (f64, f64)) -> Vec<PathSample> {
    let span_x = end.0 - start.0;
    let span_y = end.1 - start.1;
    let length = span_x.hypot(span_y);

    let step_x = span_x / length;
    let step_y = span_y / length;

    let count = length.round() as usize;
    let mut samples = Vec::with_capacity(count);
    for i in 0..count {
        let k = i as f64;
        samples.push(PathSample {
            x: start.0 + k * step_x,
            y: start.1 + k * step_y,
            distance_px: (k * step_x).hypot(k * step_y),
        });
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    #[test]
    fn test_vertical_chord_through_center() {
        // Velocity (0, -5): path angle atan2(0, 5) = 0, so the image-space
        // travel direction is (sin 0, cos 0) = (0, 1) and the chord runs
        // bottom to top.
        let path = ObservationPath::solve(100, 100.0, 0.0, -5.0, 0.0).unwrap();
        assert_eq!(path.direction, PathDirection::BottomToTop);
        assert_relative_eq!(path.angle_degrees, 0.0, epsilon = 1e-12);
        assert_relative_eq!(path.start.0, 50.0, epsilon = 1e-9);
        assert_relative_eq!(path.start.1, 99.5, epsilon = 1e-9);
        assert_relative_eq!(path.end.1, 0.5, epsilon = 1e-9);
        assert_eq!(path.samples.len(), 99);
    }

    #[test]
    fn test_offset_shifts_the_chord() {
        // 10 km offset on a 100 km plane of 100 px is 10 px, to the right of
        // the travel direction (downward travel: right is -x... the offset
        // normal is (cos θ, −sin θ) = (1, 0) at θ = 0).
        let path = ObservationPath::solve(100, 100.0, 0.0, -5.0, 10.0).unwrap();
        assert_relative_eq!(path.start.0, 60.0, epsilon = 1e-9);
    }

    #[test]
    fn test_velocity_reversal_swaps_orientation() {
        // Zero offset: the two velocity signs share the same chord line.
        let forward = ObservationPath::solve(128, 64.0, -15.0, -10.0, 0.0).unwrap();
        let reverse = ObservationPath::solve(128, 64.0, 15.0, 10.0, 0.0).unwrap();

        assert_eq!(forward.direction, PathDirection::RightToLeft);
        assert_eq!(reverse.direction, PathDirection::LeftToRight);

        // Same chord, opposite traversal.
        assert_relative_eq!(forward.start.0, reverse.end.0, epsilon = 1e-9);
        assert_relative_eq!(forward.start.1, reverse.end.1, epsilon = 1e-9);
        assert_relative_eq!(forward.end.0, reverse.start.0, epsilon = 1e-9);
        assert_relative_eq!(forward.end.1, reverse.start.1, epsilon = 1e-9);
    }

    #[test]
    fn test_sample_spacing_is_one_pixel() {
        let path = ObservationPath::solve(200, 150.0, -7.0, -3.0, 12.0).unwrap();
        let expected = {
            let dx = path.end.0 - path.start.0;
            let dy = path.end.1 - path.start.1;
            dx.hypot(dy).round() as usize
        };
        assert_eq!(path.samples.len(), expected);
        for pair in path.samples.windows(2) {
            let step = (pair[1].x - pair[0].x).hypot(pair[1].y - pair[0].y);
            assert_relative_eq!(step, 1.0, epsilon = 1e-12);
        }
        assert_relative_eq!(path.samples[0].distance_px, 0.0);
    }

    #[test]
    fn test_chord_missing_square_is_rejected() {
        // Offset far larger than the plane: no intersection.
        let result = ObservationPath::solve(100, 100.0, 0.0, -5.0, 500.0);
        assert!(matches!(result, Err(OccultError::NoIntersection)));
    }

    #[test]
    fn test_zero_velocity_is_rejected() {
        let result = ObservationPath::solve(100, 100.0, 0.0, 0.0, 0.0);
        assert!(matches!(result, Err(OccultError::ZeroShadowSpeed)));
    }

    #[test]
    fn test_edges_of_centered_disk() {
        let n = 200;
        let radius = 30.0;
        let center = n as f64 / 2.0;
        let geometric = Array2::from_shape_fn((n, n), |(y, x)| {
            let dx = x as f64 - center;
            let dy = y as f64 - center;
            if dx.hypot(dy) < radius {
                1.0
            } else {
                0.0
            }
        });

        let path = ObservationPath::solve(n, n as f64, 0.0, -5.0, 0.0).unwrap();
        let edges = path.find_shadow_edges(geometric.view());
        assert_eq!(edges.len(), 2, "expected entry and exit, got {edges:?}");
        let width = edges[1] - edges[0];
        assert_relative_eq!(width, 2.0 * radius, epsilon = 1e-9);
    }

    #[test]
    fn test_light_curve_reads_intensity() {
        let n = 64;
        let intensity = Array2::from_elem((n, n), 0.25);
        let path = ObservationPath::solve(n, 32.0, -1.0, 0.0, 0.0).unwrap();
        let curve = path.sample_light_curve(intensity.view(), 0.5);
        assert_eq!(curve.len(), path.samples.len());
        for point in &curve {
            assert_relative_eq!(point.intensity, 0.25, epsilon = 1e-12);
        }
        // Distances advance by the resolution per pixel step.
        assert_relative_eq!(
            curve[1].distance_km - curve[0].distance_km,
            0.5,
            epsilon = 1e-9
        );
    }
}
