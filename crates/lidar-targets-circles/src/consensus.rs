//! Multi-frame consensus over accumulated centers.
//!
//! Centers from consistent frames pile up in four tight clusters. A cluster
//! counts when enough distinct frames support it; if the lenient support
//! threshold (half the accepted frames) leaves more than four clusters, the
//! strict one (three quarters) is applied. Consensus exists only when exactly
//! four clusters count.

use std::collections::BTreeSet;

use lidar_targets_core::{euclidean_clusters, Cluster, ClusterParams};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::accumulator::AccumulatedCenter;
use crate::detector::PATTERN_CIRCLES;
use crate::params::ConfigError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusParams {
    /// Euclidean clustering tolerance over accumulated centers, meters.
    pub tolerance: f64,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self { tolerance: 0.02 }
    }
}

impl ConsensusParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tolerance.is_finite() && self.tolerance > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::NonPositive {
                field: "consensus.tolerance",
                value: self.tolerance,
            })
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsensusCenter {
    pub position: Point3<f64>,
    /// Distinct accepted frames contributing to this center.
    pub support: usize,
}

/// Four temporally stable centers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// Ordered by cluster size, largest first.
    pub centers: [ConsensusCenter; PATTERN_CIRCLES],
    pub frames_accepted: usize,
    pub frames_processed: usize,
}

impl ConsensusResult {
    pub fn positions(&self) -> [Point3<f64>; PATTERN_CIRCLES] {
        self.centers.map(|c| c.position)
    }
}

fn supported(
    clusters: &[Cluster],
    centers: &[AccumulatedCenter],
    min_support: usize,
) -> Vec<ConsensusCenter> {
    clusters
        .iter()
        .filter_map(|c| {
            let frames: BTreeSet<usize> = c.indices.iter().map(|&i| centers[i].frame).collect();
            (frames.len() >= min_support).then_some(ConsensusCenter {
                position: c.centroid,
                support: frames.len(),
            })
        })
        .collect()
}

/// Look for four stable centers in the buffer.
pub fn find_consensus(
    centers: &[AccumulatedCenter],
    frames_accepted: usize,
    frames_processed: usize,
    params: &ConsensusParams,
) -> Option<ConsensusResult> {
    if centers.is_empty() || frames_accepted == 0 {
        return None;
    }
    let positions: Vec<Point3<f64>> = centers.iter().map(|c| c.position).collect();
    let clusters = euclidean_clusters(
        &positions,
        &ClusterParams {
            tolerance: params.tolerance,
            min_size: 1,
            max_size: frames_accepted,
        },
    );

    let mut found = supported(&clusters, centers, frames_accepted / 2);
    if found.len() > PATTERN_CIRCLES {
        log::debug!(
            "{} clusters at half support, tightening to three quarters",
            found.len()
        );
        found = supported(&clusters, centers, 3 * frames_accepted / 4);
    }
    log::debug!(
        "{} consensus clusters over {} centers",
        found.len(),
        centers.len()
    );

    let centers: [ConsensusCenter; PATTERN_CIRCLES] = found.try_into().ok()?;
    Some(ConsensusResult {
        centers,
        frames_accepted,
        frames_processed,
    })
}
