use lidar_targets_core::{AxisConstraint, PointCloud};
use nalgebra::{Point2, Point3};

use super::circle_search::search_circles;
use super::edges::{detect_edges, filter_plane_members};
use super::pattern_centroid::pattern_centroid;
use super::plane_fit::extract_board_plane;
use super::projection::PlaneFrame;
use super::rings::filter_rings;
use super::{DetectedCircle, FrameDetection, FrameDiagnostics, PatternError};
use crate::params::{ConfigError, PatternParams};
use crate::sensor::SensorModel;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Four-circle board detector for single sweeps.
///
/// The detector is stateless across frames; accumulation lives in
/// [`crate::CalibrationSession`].
#[derive(Clone, Debug)]
pub struct CirclePatternDetector {
    params: PatternParams,
    sensor: SensorModel,
    constraint: AxisConstraint,
    diagnostics: bool,
}

impl CirclePatternDetector {
    /// Validate `params` and build a detector.
    pub fn new(params: PatternParams) -> Result<Self, ConfigError> {
        params.validate()?;
        let sensor = params.sensor()?;
        let constraint = params.plane.constraint()?;
        Ok(Self {
            params,
            sensor,
            constraint,
            diagnostics: false,
        })
    }

    /// Keep intermediate clouds and per-attempt fits in every detection.
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    #[inline]
    pub fn params(&self) -> &PatternParams {
        &self.params
    }

    #[inline]
    pub fn sensor(&self) -> SensorModel {
        self.sensor
    }

    /// Detect up to four cut-out centers in one sweep.
    ///
    /// `full` is the whole sweep, `board` the board-segmented subset of it.
    /// Non-finite points are ignored. An `Err` means the sweep carries no
    /// usable pattern; `Ok` may still hold fewer than four circles.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(sweep = full.len(), board = board.len()))
    )]
    pub fn detect(
        &self,
        full: &PointCloud,
        board: &PointCloud,
    ) -> Result<FrameDetection, PatternError> {
        let mut full = full.clone();
        let mut board = board.clone();
        let dropped = full.retain_finite() + board.retain_finite();
        if dropped > 0 {
            log::debug!("{dropped} non-finite points removed");
        }

        let plane_fit = extract_board_plane(
            &board,
            &self.constraint,
            &self.params.plane.ransac(self.params.seed),
        )?;
        let plane = plane_fit.plane;

        let edges = detect_edges(&full, &board, &self.params.edges);
        if edges.is_empty() {
            return Err(PatternError::NoEdges);
        }
        log::debug!("{} edge points", edges.len());

        let plane_edges = filter_plane_members(&edges, &plane, self.params.plane_membership_distance);
        let selection = filter_rings(&plane_edges, self.sensor, &self.params.rings)?;

        let frame = PlaneFrame::new(plane);
        let rotated: Vec<Point3<f64>> = selection
            .candidates
            .iter()
            .map(|p| frame.rotate(&p.position))
            .collect();
        let centroid = pattern_centroid(
            &rotated,
            &self.params.cluster,
            self.params.max_cluster_size(),
        )?;
        let centroid = Point2::new(centroid.x, centroid.y);

        let flat: Vec<Point2<f64>> = rotated.iter().map(|p| Point2::new(p.x, p.y)).collect();
        let search = search_circles(&flat, &centroid, &self.params.circle, self.params.seed);

        let circles: Vec<DetectedCircle> = search
            .accepted
            .iter()
            .map(|a| DetectedCircle {
                circle: a.circle,
                center: frame.back_project(&a.circle.center),
                inliers: a.inliers.len(),
            })
            .collect();
        log::debug!(
            "{} circles accepted after {} attempts",
            circles.len(),
            search.attempts.len()
        );

        let diagnostics = self.diagnostics.then(|| FrameDiagnostics {
            edges,
            plane_edges,
            candidates: selection.candidates,
            flattened: flat
                .iter()
                .map(|q| Point3::new(q.x, q.y, frame.elevation()))
                .collect(),
            rotated,
            attempts: search.attempts,
        });

        Ok(FrameDetection {
            plane,
            pattern_centroid: centroid,
            circles,
            diagnostics,
        })
    }
}
