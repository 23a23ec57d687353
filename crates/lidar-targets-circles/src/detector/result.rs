use lidar_targets_core::{Circle2, Plane, PointCloud};
use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

/// Outcome of one circle fit inside a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum CircleVerdict {
    /// Kept; `reclaimed` quarantined points were released for later fits.
    Accepted { reclaimed: usize },
    /// Too close to the pattern centroid; inliers quarantined.
    TooCentral,
    /// Too far from the pattern centroid; inliers discarded.
    TooFar,
    /// Too close to an already accepted circle; inliers discarded.
    Duplicate,
}

/// One iteration of the circle search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircleAttempt {
    /// Circle in plane-frame coordinates.
    pub circle: Circle2,
    pub centroid_distance: f64,
    #[serde(flatten)]
    pub verdict: CircleVerdict,
    /// Indices into the flattened candidate cloud.
    pub inliers: Vec<usize>,
}

/// An accepted circle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectedCircle {
    /// Circle in plane-frame coordinates.
    pub circle: Circle2,
    /// Center in the sensor frame, on the board plane.
    pub center: Point3<f64>,
    pub inliers: usize,
}

/// Intermediate clouds of one detection, for inspection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameDiagnostics {
    pub edges: PointCloud,
    pub plane_edges: PointCloud,
    pub candidates: PointCloud,
    /// Candidates rotated into the plane frame.
    pub rotated: Vec<Point3<f64>>,
    /// Rotated candidates with z forced to the canonical elevation.
    pub flattened: Vec<Point3<f64>>,
    pub attempts: Vec<CircleAttempt>,
}

/// Output of [`crate::CirclePatternDetector::detect`] for one sweep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameDetection {
    pub plane: Plane,
    /// Pattern centroid in plane-frame coordinates.
    pub pattern_centroid: Point2<f64>,
    /// Accepted circles, 0 to 4, in acceptance order.
    pub circles: Vec<DetectedCircle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<FrameDiagnostics>,
}

impl FrameDetection {
    /// Sensor-frame centers of the accepted circles.
    pub fn centers(&self) -> Vec<Point3<f64>> {
        self.circles.iter().map(|c| c.center).collect()
    }
}
