//! Detector parameters and their validation.

use lidar_targets_core::{AxisConstraint, AxisMode, RadiusLimits, RansacParams};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::sensor::SensorModel;

/// Invalid detector, accumulator or consensus parameters.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unsupported ring count {0} (expected 16, 32, 64 or 128)")]
    UnsupportedRingCount(u16),
    #[error("plane axis must be a finite non-zero vector, got {0:?}")]
    InvalidAxis([f64; 3]),
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("radius tolerance {tolerance} must be in [0, radius={radius})")]
    InvalidRadiusTolerance { radius: f64, tolerance: f64 },
    #[error("centroid distance window [{min}, {max}] is empty")]
    InvalidCentroidWindow { min: f64, max: f64 },
    #[error("min_points_per_ring must be at least 3, got {0}")]
    RingTooSparse(usize),
    #[error("min_centers_found must be in 1..=4, got {0}")]
    InvalidMinCenters(usize),
    #[error("{field} must be at least 1")]
    ZeroCount { field: &'static str },
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn nonzero(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::ZeroCount { field })
    } else {
        Ok(())
    }
}

/// Board plane segmentation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneParams {
    /// Reference axis of the angular constraint, sensor frame.
    pub axis: [f64; 3],
    /// Allowed angular deviation from the constraint, radians.
    pub eps_angle: f64,
    pub mode: AxisMode,
    pub max_iterations: usize,
    pub distance_threshold: f64,
}

impl Default for PlaneParams {
    fn default() -> Self {
        Self {
            axis: [0.0, 0.0, 1.0],
            eps_angle: 0.35,
            mode: AxisMode::PlaneParallel,
            max_iterations: 1000,
            distance_threshold: 0.01,
        }
    }
}

impl PlaneParams {
    pub fn constraint(&self) -> Result<AxisConstraint, ConfigError> {
        AxisConstraint::new(Vector3::from(self.axis), self.eps_angle, self.mode)
            .ok_or(ConfigError::InvalidAxis(self.axis))
    }

    pub fn ransac(&self, seed: u64) -> RansacParams {
        RansacParams {
            max_iterations: self.max_iterations,
            distance_threshold: self.distance_threshold,
            seed,
        }
    }
}

/// Boundary point detection on the full sweep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeParams {
    /// Maximum *squared* distance from a sweep point to its nearest board point.
    pub knn_radius: f64,
    /// Minimum intensity (range discontinuity) of an edge point, exclusive.
    pub depth_threshold: f32,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            knn_radius: 0.0025,
            depth_threshold: 0.5,
        }
    }
}

/// Per scan-line pruning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingParams {
    /// Rings with fewer edge points are discarded.
    pub min_points_per_ring: usize,
    /// Average number of candidates a contributing ring may carry before the
    /// frame is treated as noise. Also bounds the pattern cluster size.
    pub max_points_per_ring: usize,
}

impl Default for RingParams {
    fn default() -> Self {
        Self {
            min_points_per_ring: 4,
            max_points_per_ring: 4,
        }
    }
}

/// Clustering of the rotated candidates into the pattern blob.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternClusterParams {
    pub tolerance: f64,
    pub min_size: usize,
}

impl Default for PatternClusterParams {
    fn default() -> Self {
        Self {
            tolerance: 0.5,
            min_size: 12,
        }
    }
}

/// Iterative circle search on the flattened candidates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleParams {
    /// Nominal radius of the board cut-outs, meters.
    pub radius: f64,
    pub radius_tolerance: f64,
    /// Inlier distance to the circle outline.
    pub distance_threshold: f64,
    pub max_iterations: usize,
    /// Upper bound on fit attempts per frame, whatever their verdict.
    pub max_attempts: usize,
    /// Circles closer than this to the pattern centroid are quarantined.
    pub centroid_distance_min: f64,
    /// Circles farther than this from the pattern centroid are discarded.
    pub centroid_distance_max: f64,
    /// Minimum separation between two accepted centers of one frame.
    pub duplicate_distance: f64,
    /// Quarantined points within `radius + reclaim_margin` of an accepted
    /// center become eligible for fitting again.
    pub reclaim_margin: f64,
}

impl Default for CircleParams {
    fn default() -> Self {
        Self {
            radius: 0.12,
            radius_tolerance: 0.02,
            distance_threshold: 0.01,
            max_iterations: 1000,
            max_attempts: 16,
            centroid_distance_min: 0.15,
            centroid_distance_max: 0.6,
            duplicate_distance: 0.25,
            reclaim_margin: 0.02,
        }
    }
}

impl CircleParams {
    pub fn radius_limits(&self) -> RadiusLimits {
        RadiusLimits::around(self.radius, self.radius_tolerance)
    }

    pub fn ransac(&self, seed: u64) -> RansacParams {
        RansacParams {
            max_iterations: self.max_iterations,
            distance_threshold: self.distance_threshold,
            seed,
        }
    }

    #[inline]
    pub fn reclaim_distance(&self) -> f64 {
        self.radius + self.reclaim_margin
    }
}

/// Configuration of [`crate::CirclePatternDetector`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternParams {
    /// Number of scan lines of the sensor (16, 32, 64 or 128).
    pub ring_count: u16,
    pub plane: PlaneParams,
    pub edges: EdgeParams,
    /// Edge points farther than this from the board plane are dropped.
    pub plane_membership_distance: f64,
    pub rings: RingParams,
    pub cluster: PatternClusterParams,
    pub circle: CircleParams,
    /// Seed of every random sampler in the detector.
    pub seed: u64,
}

impl Default for PatternParams {
    fn default() -> Self {
        Self {
            ring_count: 32,
            plane: PlaneParams::default(),
            edges: EdgeParams::default(),
            plane_membership_distance: 0.05,
            rings: RingParams::default(),
            cluster: PatternClusterParams::default(),
            circle: CircleParams::default(),
            seed: 42,
        }
    }
}

impl PatternParams {
    /// Defaults for a sensor with `ring_count` scan lines.
    pub fn for_sensor(ring_count: u16) -> Self {
        Self {
            ring_count,
            ..Self::default()
        }
    }

    pub fn sensor(&self) -> Result<SensorModel, ConfigError> {
        SensorModel::from_ring_count(self.ring_count)
    }

    /// Largest admissible pattern cluster.
    pub fn max_cluster_size(&self) -> usize {
        self.rings.max_points_per_ring * self.ring_count as usize
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sensor()?;
        self.plane.constraint()?;
        positive("plane.eps_angle", self.plane.eps_angle)?;
        positive("plane.distance_threshold", self.plane.distance_threshold)?;
        nonzero("plane.max_iterations", self.plane.max_iterations)?;
        positive("edges.knn_radius", self.edges.knn_radius)?;
        positive("plane_membership_distance", self.plane_membership_distance)?;

        if self.rings.min_points_per_ring < 3 {
            return Err(ConfigError::RingTooSparse(self.rings.min_points_per_ring));
        }
        nonzero("rings.max_points_per_ring", self.rings.max_points_per_ring)?;
        positive("cluster.tolerance", self.cluster.tolerance)?;
        nonzero("cluster.min_size", self.cluster.min_size)?;

        let c = &self.circle;
        positive("circle.radius", c.radius)?;
        if !(c.radius_tolerance >= 0.0 && c.radius_tolerance < c.radius) {
            return Err(ConfigError::InvalidRadiusTolerance {
                radius: c.radius,
                tolerance: c.radius_tolerance,
            });
        }
        positive("circle.distance_threshold", c.distance_threshold)?;
        nonzero("circle.max_iterations", c.max_iterations)?;
        nonzero("circle.max_attempts", c.max_attempts)?;
        if !(c.centroid_distance_min >= 0.0 && c.centroid_distance_min < c.centroid_distance_max) {
            return Err(ConfigError::InvalidCentroidWindow {
                min: c.centroid_distance_min,
                max: c.centroid_distance_max,
            });
        }
        positive("circle.duplicate_distance", c.duplicate_distance)?;
        if c.reclaim_margin.is_nan() || c.reclaim_margin < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "circle.reclaim_margin",
                value: c.reclaim_margin,
            });
        }
        Ok(())
    }
}
