//! Board boundary isolation.
//!
//! The upstream range-image stage writes a per-point range discontinuity into
//! the intensity channel. A sweep point is an edge when it lies on the board
//! (its nearest board point is within `knn_radius`) and its discontinuity
//! exceeds `depth_threshold`.

use lidar_targets_core::{Plane, PointCloud, PointIndex};

use crate::params::EdgeParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(sweep = full.len(), board = board.len()))
)]
pub(crate) fn detect_edges(full: &PointCloud, board: &PointCloud, params: &EdgeParams) -> PointCloud {
    let index = PointIndex::new(&board.coords());
    if index.is_empty() {
        return PointCloud::default();
    }
    full.iter()
        .filter(|p| {
            index
                .nearest(&p.coords())
                .is_some_and(|(_, d2)| d2 <= params.knn_radius)
                && p.intensity > params.depth_threshold
        })
        .copied()
        .collect()
}

/// Keep points strictly closer than `max_distance` to `plane`.
pub(crate) fn filter_plane_members(edges: &PointCloud, plane: &Plane, max_distance: f64) -> PointCloud {
    let kept = plane.select_within_distance(&edges.positions(), max_distance);
    edges.select(&kept)
}
