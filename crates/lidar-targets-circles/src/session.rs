//! Calibration session: detection, accumulation and consensus over a stream
//! of sweeps.

use lidar_targets_core::{Plane, PointCloud};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::accumulator::{CenterAccumulator, CommitOutcome};
use crate::consensus::{find_consensus, ConsensusParams, ConsensusResult};
use crate::detector::{CirclePatternDetector, FrameDiagnostics};
use crate::io::CalibrationConfig;
use crate::params::ConfigError;

/// One sweep: the full cloud and its board-segmented subset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FramePair {
    pub full: PointCloud,
    pub board: PointCloud,
}

/// What happened to a frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FrameOutcome {
    /// The detector found no usable pattern; the accumulator never saw it.
    Dropped { reason: String },
    /// Detected, but the center count was outside `[min_centers_found, 4]`.
    Rejected { found: usize },
    Accepted { frame: usize },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    /// Position of the frame in the input stream, from 0.
    pub index: usize,
    #[serde(flatten)]
    pub outcome: FrameOutcome,
    #[serde(default)]
    pub plane: Option<[f64; 4]>,
    #[serde(default)]
    pub centers: Vec<Point3<f64>>,
    pub buffer_len: usize,
    pub frames_accepted: usize,
    pub frames_processed: usize,
    #[serde(default)]
    pub consensus: Option<ConsensusResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<FrameDiagnostics>,
}

/// All mutable calibration state, owned by one processing loop.
///
/// Frames go through [`Self::process`] one at a time. [`Self::reset`] and
/// [`Self::terminate`] are meant to be called between frames.
#[derive(Debug)]
pub struct CalibrationSession {
    detector: CirclePatternDetector,
    accumulator: CenterAccumulator,
    consensus: ConsensusParams,
    frames_seen: usize,
    last_plane: Option<Plane>,
    last_consensus: Option<ConsensusResult>,
    terminated: bool,
}

impl CalibrationSession {
    pub fn new(config: &CalibrationConfig) -> Result<Self, ConfigError> {
        config.consensus.validate()?;
        let detector =
            CirclePatternDetector::new(config.pattern.clone())?.with_diagnostics(config.diagnostics);
        let accumulator = CenterAccumulator::new(config.accumulator.clone())?;
        Ok(Self {
            detector,
            accumulator,
            consensus: config.consensus.clone(),
            frames_seen: 0,
            last_plane: None,
            last_consensus: None,
            terminated: false,
        })
    }

    pub fn process(&mut self, pair: &FramePair) -> FrameReport {
        let index = self.frames_seen;
        self.frames_seen += 1;

        let detection = match self.detector.detect(&pair.full, &pair.board) {
            Ok(d) => d,
            Err(err) => {
                log::warn!("frame {index} dropped: {err}");
                let outcome = FrameOutcome::Dropped {
                    reason: err.to_string(),
                };
                return self.report(index, outcome, None, Vec::new(), None, None);
            }
        };
        self.last_plane = Some(detection.plane);
        let centers = detection.centers();

        let (outcome, consensus) = match self.accumulator.commit(&centers) {
            CommitOutcome::Committed { frame, .. } => {
                log::info!(
                    "frame {index} accepted: {}/{} frames, {} centers buffered",
                    self.accumulator.frames_accepted(),
                    self.accumulator.frames_processed(),
                    self.accumulator.len()
                );
                let consensus = find_consensus(
                    self.accumulator.centers(),
                    self.accumulator.frames_accepted(),
                    self.accumulator.frames_processed(),
                    &self.consensus,
                );
                if let Some(c) = &consensus {
                    log::info!("consensus on 4 centers over {} frames", c.frames_accepted);
                    self.last_consensus = Some(c.clone());
                }
                (FrameOutcome::Accepted { frame }, consensus)
            }
            CommitOutcome::NotEnoughCenters { found, required } => {
                log::warn!("frame {index} rejected: {found} centers, need at least {required}");
                (FrameOutcome::Rejected { found }, None)
            }
            CommitOutcome::TooManyCenters { found } => {
                log::warn!("frame {index} rejected: {found} centers");
                (FrameOutcome::Rejected { found }, None)
            }
        };

        self.report(
            index,
            outcome,
            Some(detection.plane.coefficients()),
            centers,
            consensus,
            detection.diagnostics,
        )
    }

    fn report(
        &self,
        index: usize,
        outcome: FrameOutcome,
        plane: Option<[f64; 4]>,
        centers: Vec<Point3<f64>>,
        consensus: Option<ConsensusResult>,
        diagnostics: Option<FrameDiagnostics>,
    ) -> FrameReport {
        FrameReport {
            index,
            outcome,
            plane,
            centers,
            buffer_len: self.accumulator.len(),
            frames_accepted: self.accumulator.frames_accepted(),
            frames_processed: self.accumulator.frames_processed(),
            consensus,
            diagnostics,
        }
    }

    /// Forget all accumulated centers and counters.
    pub fn reset(&mut self) {
        log::info!(
            "session reset ({} centers, {} accepted frames discarded)",
            self.accumulator.len(),
            self.accumulator.frames_accepted()
        );
        self.accumulator.reset();
        self.last_consensus = None;
    }

    /// Mark the session finished. Further frames are still processed if
    /// offered; the runner stops offering them.
    pub fn terminate(&mut self) {
        self.terminated = true;
    }

    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    #[inline]
    pub fn accumulator(&self) -> &CenterAccumulator {
        &self.accumulator
    }

    #[inline]
    pub fn detector(&self) -> &CirclePatternDetector {
        &self.detector
    }

    /// Plane of the last frame that got past plane segmentation and detection.
    #[inline]
    pub fn last_plane(&self) -> Option<&Plane> {
        self.last_plane.as_ref()
    }

    /// Most recent consensus since the last reset.
    #[inline]
    pub fn last_consensus(&self) -> Option<&ConsensusResult> {
        self.last_consensus.as_ref()
    }
}
