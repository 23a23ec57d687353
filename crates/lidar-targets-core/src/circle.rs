//! 2D circle model and radius-constrained RANSAC circle fitting.

use nalgebra::{Matrix3, Point2, Vector3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::ransac::{sample_indices, RansacParams};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle2 {
    pub center: Point2<f64>,
    pub radius: f64,
}

impl Circle2 {
    pub fn new(center: Point2<f64>, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Circumcircle of three points; `None` for collinear input.
    pub fn from_three_points(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> Option<Self> {
        let bx = b.x - a.x;
        let by = b.y - a.y;
        let cx = c.x - a.x;
        let cy = c.y - a.y;
        let det = 2.0 * (bx * cy - by * cx);
        if det.abs() < 1e-12 {
            return None;
        }
        let b2 = bx * bx + by * by;
        let c2 = cx * cx + cy * cy;
        let ux = (cy * b2 - by * c2) / det;
        let uy = (bx * c2 - cx * b2) / det;
        let radius = (ux * ux + uy * uy).sqrt();
        Some(Self::new(Point2::new(a.x + ux, a.y + uy), radius))
    }

    /// Algebraic least-squares circle (Kåsa fit) through a point set.
    pub fn fit_least_squares(points: &[Point2<f64>]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        // x² + y² + D x + E y + F = 0, solved through the normal equations.
        let mut ata = Matrix3::<f64>::zeros();
        let mut atb = Vector3::<f64>::zeros();
        for p in points {
            let row = Vector3::new(p.x, p.y, 1.0);
            let rhs = -(p.x * p.x + p.y * p.y);
            ata += row * row.transpose();
            atb += row * rhs;
        }
        let sol = ata.try_inverse()? * atb;
        let cx = -0.5 * sol[0];
        let cy = -0.5 * sol[1];
        let r2 = cx * cx + cy * cy - sol[2];
        if !r2.is_finite() || r2 <= 0.0 {
            return None;
        }
        Some(Self::new(Point2::new(cx, cy), r2.sqrt()))
    }

    /// Absolute distance from `p` to the circle outline.
    #[inline]
    pub fn residual(&self, p: &Point2<f64>) -> f64 {
        ((p - self.center).norm() - self.radius).abs()
    }
}

/// Closed interval of admissible radii.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RadiusLimits {
    pub min: f64,
    pub max: f64,
}

impl RadiusLimits {
    /// `nominal ± tolerance`.
    pub fn around(nominal: f64, tolerance: f64) -> Self {
        Self {
            min: nominal - tolerance,
            max: nominal + tolerance,
        }
    }

    #[inline]
    pub fn contains(&self, radius: f64) -> bool {
        radius >= self.min && radius <= self.max
    }
}

/// RANSAC circle model with inlier indices into the input slice.
#[derive(Clone, Debug)]
pub struct CircleFit {
    pub circle: Circle2,
    pub inliers: Vec<usize>,
}

fn inliers_of(circle: &Circle2, points: &[Point2<f64>], threshold: f64) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| circle.residual(p) < threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Fit one circle whose radius lies within `limits`.
///
/// Hypotheses are circumcircles of three random points; hypotheses outside
/// the radius limits are skipped. The best hypothesis is refined by a
/// least-squares fit over its inliers, and the refinement is kept only when
/// its radius is still admissible. Returns `None` when no admissible
/// hypothesis was sampled.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(points, params), fields(n = points.len()))
)]
pub fn fit_circle_ransac(
    points: &[Point2<f64>],
    limits: RadiusLimits,
    params: &RansacParams,
) -> Option<CircleFit> {
    let n = points.len();
    if n < 3 {
        return None;
    }

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut best: Option<(Circle2, usize)> = None;

    for _ in 0..params.max_iterations {
        let s = sample_indices(&mut rng, n, 3);
        let Some(circle) = Circle2::from_three_points(&points[s[0]], &points[s[1]], &points[s[2]])
        else {
            continue;
        };
        if !limits.contains(circle.radius) {
            continue;
        }
        let count = points
            .iter()
            .filter(|p| circle.residual(p) < params.distance_threshold)
            .count();
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((circle, count));
            if count == n {
                break;
            }
        }
    }

    let (circle, _) = best?;
    let inliers = inliers_of(&circle, points, params.distance_threshold);
    let inlier_pts: Vec<Point2<f64>> = inliers.iter().map(|&i| points[i]).collect();

    let circle = match Circle2::fit_least_squares(&inlier_pts) {
        Some(refined) if limits.contains(refined.radius) => refined,
        _ => circle,
    };
    let inliers = inliers_of(&circle, points, params.distance_threshold);
    if inliers.is_empty() {
        return None;
    }

    Some(CircleFit { circle, inliers })
}
