use lidar_targets_core::{euclidean_clusters, ClusterParams};
use nalgebra::Point3;

use super::PatternError;
use crate::params::PatternClusterParams;

/// Centroid of the pattern blob in the plane frame.
///
/// Clusters come ordered largest first; the last (smallest) admissible cluster
/// is taken as the pattern.
pub(crate) fn pattern_centroid(
    rotated: &[Point3<f64>],
    params: &PatternClusterParams,
    max_size: usize,
) -> Result<Point3<f64>, PatternError> {
    let clusters = euclidean_clusters(
        rotated,
        &ClusterParams {
            tolerance: params.tolerance,
            min_size: params.min_size,
            max_size,
        },
    );
    log::debug!(
        "{} clusters found from {} points",
        clusters.len(),
        rotated.len()
    );
    clusters
        .last()
        .map(|c| c.centroid)
        .ok_or(PatternError::NoPatternCluster)
}
