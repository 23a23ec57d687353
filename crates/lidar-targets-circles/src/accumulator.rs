//! Multi-frame buffer of accepted circle centers.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::detector::PATTERN_CIRCLES;
use crate::params::ConfigError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccumulatorParams {
    /// Fewest centers a frame must provide to be committed.
    pub min_centers_found: usize,
}

impl Default for AccumulatorParams {
    fn default() -> Self {
        Self {
            min_centers_found: 4,
        }
    }
}

impl AccumulatorParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if (1..=PATTERN_CIRCLES).contains(&self.min_centers_found) {
            Ok(())
        } else {
            Err(ConfigError::InvalidMinCenters(self.min_centers_found))
        }
    }
}

/// A committed center and the accepted-frame ordinal (1-based) it came from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccumulatedCenter {
    pub position: Point3<f64>,
    pub frame: usize,
}

/// Result of offering one frame's centers to the accumulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommitOutcome {
    Committed { frame: usize, centers: usize },
    NotEnoughCenters { found: usize, required: usize },
    TooManyCenters { found: usize },
}

/// Append-only center buffer with frame counters.
///
/// `frames_processed` counts every frame offered through [`Self::commit`];
/// `frames_accepted` only those whose centers were appended.
#[derive(Clone, Debug, Default)]
pub struct CenterAccumulator {
    params: AccumulatorParams,
    centers: Vec<AccumulatedCenter>,
    frames_accepted: usize,
    frames_processed: usize,
}

impl CenterAccumulator {
    pub fn new(params: AccumulatorParams) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self {
            params,
            ..Self::default()
        })
    }

    pub fn commit(&mut self, centers: &[Point3<f64>]) -> CommitOutcome {
        self.frames_processed += 1;
        let found = centers.len();
        if found < self.params.min_centers_found {
            return CommitOutcome::NotEnoughCenters {
                found,
                required: self.params.min_centers_found,
            };
        }
        if found > PATTERN_CIRCLES {
            return CommitOutcome::TooManyCenters { found };
        }
        self.frames_accepted += 1;
        let frame = self.frames_accepted;
        self.centers
            .extend(centers.iter().map(|&position| AccumulatedCenter { position, frame }));
        CommitOutcome::Committed {
            frame,
            centers: found,
        }
    }

    /// Drop every center and zero both counters.
    pub fn reset(&mut self) {
        self.centers.clear();
        self.frames_accepted = 0;
        self.frames_processed = 0;
    }

    #[inline]
    pub fn centers(&self) -> &[AccumulatedCenter] {
        &self.centers
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    #[inline]
    pub fn frames_accepted(&self) -> usize {
        self.frames_accepted
    }

    #[inline]
    pub fn frames_processed(&self) -> usize {
        self.frames_processed
    }
}
