//! Plane model and axis-constrained RANSAC plane segmentation.

use nalgebra::{Matrix3, Point3, SymmetricEigen, Unit, Vector3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::ransac::{sample_indices, RansacParams};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Plane `n·p + d = 0` with unit normal `n`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub d: f64,
}

impl Plane {
    /// Build a plane from raw coefficients `[a, b, c, d]`, normalizing the normal.
    pub fn from_coefficients(coeffs: [f64; 4]) -> Option<Self> {
        let n = Vector3::new(coeffs[0], coeffs[1], coeffs[2]);
        let norm = n.norm();
        if !norm.is_finite() || norm < 1e-12 {
            return None;
        }
        Some(Self {
            normal: n / norm,
            d: coeffs[3] / norm,
        })
    }

    /// Plane through three points; `None` when they are (nearly) collinear.
    pub fn from_points(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<Self> {
        let n = (b - a).cross(&(c - a));
        let norm = n.norm();
        if norm < 1e-12 {
            return None;
        }
        let normal = n / norm;
        Some(Self {
            normal,
            d: -normal.dot(&a.coords),
        })
    }

    /// Total least-squares plane through a point set.
    ///
    /// The normal is the eigenvector of the scatter matrix with the smallest
    /// eigenvalue.
    pub fn fit_least_squares(points: &[Point3<f64>]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        let n = points.len() as f64;
        let mean = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords) / n;
        let mut scatter = Matrix3::zeros();
        for p in points {
            let r = p.coords - mean;
            scatter += r * r.transpose();
        }
        let eig = SymmetricEigen::new(scatter);
        let (min_idx, _) = eig
            .eigenvalues
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))?;
        let normal = eig.eigenvectors.column(min_idx).into_owned();
        let norm = normal.norm();
        if !norm.is_finite() || norm < 1e-12 {
            return None;
        }
        let normal = normal / norm;
        Some(Self {
            normal,
            d: -normal.dot(&mean),
        })
    }

    pub fn coefficients(&self) -> [f64; 4] {
        [self.normal.x, self.normal.y, self.normal.z, self.d]
    }

    #[inline]
    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        self.normal.dot(&p.coords) + self.d
    }

    #[inline]
    pub fn distance(&self, p: &Point3<f64>) -> f64 {
        self.signed_distance(p).abs()
    }

    /// Orthogonal projection of the origin onto the plane.
    pub fn foot_point(&self) -> Point3<f64> {
        Point3::from(-self.d * self.normal)
    }

    /// Same plane with the normal pointing the other way.
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            d: -self.d,
        }
    }

    /// Index of the normal component with the largest magnitude.
    pub fn dominant_axis(&self) -> usize {
        self.normal.iamax()
    }

    /// Indices of points closer than `threshold` to the plane.
    pub fn select_within_distance(&self, points: &[Point3<f64>], threshold: f64) -> Vec<usize> {
        points
            .iter()
            .enumerate()
            .filter(|(_, p)| self.distance(p) < threshold)
            .map(|(i, _)| i)
            .collect()
    }
}

/// How the plane normal relates to the reference axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisMode {
    /// The plane contains the axis direction: `|n·axis| <= sin(eps)`.
    #[default]
    PlaneParallel,
    /// The normal points along the axis: `|n·axis| >= cos(eps)`.
    NormalParallel,
}

/// Angular constraint applied to every plane hypothesis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisConstraint {
    pub axis: Unit<Vector3<f64>>,
    /// Allowed angular deviation, radians.
    pub eps_angle: f64,
    pub mode: AxisMode,
}

impl AxisConstraint {
    pub fn new(axis: Vector3<f64>, eps_angle: f64, mode: AxisMode) -> Option<Self> {
        if !axis.iter().all(|v| v.is_finite()) || axis.norm() < 1e-12 {
            return None;
        }
        Some(Self {
            axis: Unit::new_normalize(axis),
            eps_angle,
            mode,
        })
    }

    pub fn accepts(&self, normal: &Vector3<f64>) -> bool {
        let cos = normal.dot(&self.axis).abs();
        match self.mode {
            AxisMode::PlaneParallel => cos <= self.eps_angle.sin(),
            AxisMode::NormalParallel => cos >= self.eps_angle.cos(),
        }
    }
}

/// RANSAC plane model with its inlier indices.
#[derive(Clone, Debug)]
pub struct PlaneFit {
    pub plane: Plane,
    pub inliers: Vec<usize>,
}

/// Segment the dominant plane that satisfies `constraint`.
///
/// Hypotheses are planes through three random points; the best one (most
/// inliers) is refined by a least-squares fit over its inliers and the
/// inliers are re-selected against the refined model. A refinement that
/// leaves the constraint is discarded in favour of the sampled hypothesis.
/// Returns `None` when no hypothesis passes the constraint.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(points, params), fields(n = points.len()))
)]
pub fn fit_plane_ransac(
    points: &[Point3<f64>],
    constraint: &AxisConstraint,
    params: &RansacParams,
) -> Option<PlaneFit> {
    let n = points.len();
    if n < 3 {
        return None;
    }

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut best: Option<(Plane, usize)> = None;

    for _ in 0..params.max_iterations {
        let s = sample_indices(&mut rng, n, 3);
        let Some(plane) = Plane::from_points(&points[s[0]], &points[s[1]], &points[s[2]]) else {
            continue;
        };
        if !constraint.accepts(&plane.normal) {
            continue;
        }
        let count = points
            .iter()
            .filter(|p| plane.distance(p) < params.distance_threshold)
            .count();
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((plane, count));
            if count == n {
                break;
            }
        }
    }

    let (plane, _) = best?;
    let inliers = plane.select_within_distance(points, params.distance_threshold);
    if inliers.is_empty() {
        return None;
    }

    let inlier_pts: Vec<Point3<f64>> = inliers.iter().map(|&i| points[i]).collect();
    let refined = match Plane::fit_least_squares(&inlier_pts) {
        Some(r) if !constraint.accepts(&r.normal) => plane,
        Some(r) if r.normal.dot(&plane.normal) < 0.0 => r.flipped(),
        Some(r) => r,
        None => plane,
    };
    let inliers = refined.select_within_distance(points, params.distance_threshold);

    Some(PlaneFit {
        plane: refined,
        inliers,
    })
}
