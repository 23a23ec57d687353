//! Scan-line aware pruning of plane edge points.
//!
//! A ring that crosses the cut-outs carries the two outer board borders plus
//! two points per crossed circle. Ordering a ring by azimuth and dropping its
//! extremes removes the outer borders. Azimuths wrap at ±π, so each ring is
//! unwrapped at its widest angular gap before the extremes are taken.

use std::f64::consts::TAU;

use lidar_targets_core::{LidarPoint, PointCloud};

use super::PatternError;
use crate::params::RingParams;
use crate::sensor::SensorModel;

#[derive(Clone, Debug)]
pub(crate) struct RingSelection {
    pub candidates: PointCloud,
    /// Rings that contributed at least one candidate.
    pub rings_used: usize,
}

#[inline]
fn azimuth(p: &LidarPoint) -> f64 {
    p.position.y.atan2(p.position.x)
}

/// Order `ring` by azimuth so that the widest empty sector lies between its
/// last and first point.
fn sort_by_azimuth(ring: &mut [LidarPoint]) {
    ring.sort_by(|a, b| azimuth(a).total_cmp(&azimuth(b)));
    let n = ring.len();
    if n < 2 {
        return;
    }
    let mut start = 0;
    let mut widest = azimuth(&ring[0]) + TAU - azimuth(&ring[n - 1]);
    for k in 1..n {
        let gap = azimuth(&ring[k]) - azimuth(&ring[k - 1]);
        if gap > widest {
            widest = gap;
            start = k;
        }
    }
    ring.rotate_left(start);
}

pub(crate) fn filter_rings(
    cloud: &PointCloud,
    sensor: SensorModel,
    params: &RingParams,
) -> Result<RingSelection, PatternError> {
    let mut rings: Vec<Vec<LidarPoint>> = vec![Vec::new(); sensor.rings() as usize];
    let mut unassigned = 0usize;
    for p in cloud {
        match p.ring {
            Some(r) if sensor.contains_ring(r) => rings[r as usize].push(*p),
            _ => unassigned += 1,
        }
    }
    if unassigned > 0 {
        log::debug!("{unassigned} edge points without a valid ring ignored");
    }

    let mut candidates = PointCloud::with_capacity(cloud.len());
    let mut rings_used = 0usize;
    for ring in rings.iter_mut() {
        if ring.len() < params.min_points_per_ring.max(2) {
            continue;
        }
        sort_by_azimuth(ring);
        rings_used += 1;
        candidates
            .points
            .extend_from_slice(&ring[1..ring.len() - 1]);
    }

    if rings_used == 0 {
        return Err(PatternError::NoCandidates);
    }
    let limit = rings_used * params.max_points_per_ring;
    if candidates.len() > limit {
        return Err(PatternError::TooManyOutliers {
            candidates: candidates.len(),
            limit,
        });
    }
    log::debug!("{} candidates from {rings_used} rings", candidates.len());
    Ok(RingSelection {
        candidates,
        rings_used,
    })
}
