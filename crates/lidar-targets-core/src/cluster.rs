//! Euclidean (connected-component) cluster extraction.
//!
//! Two points belong to the same cluster when they are linked by a chain of
//! points with consecutive gaps no larger than the tolerance. Clusters whose
//! size falls outside `[min_size, max_size]` are dropped.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::cloud::centroid;
use crate::spatial::PointIndex;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterParams {
    /// Maximum gap between neighbouring members.
    pub tolerance: f64,
    pub min_size: usize,
    pub max_size: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            tolerance: 0.02,
            min_size: 1,
            max_size: usize::MAX,
        }
    }
}

/// Point indices of one cluster and their centroid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub indices: Vec<usize>,
    pub centroid: Point3<f64>,
}

impl Cluster {
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Extract Euclidean clusters, largest first (ties keep discovery order).
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(points, params), fields(n = points.len()))
)]
pub fn euclidean_clusters(points: &[Point3<f64>], params: &ClusterParams) -> Vec<Cluster> {
    let coords: Vec<[f64; 3]> = points.iter().map(|p| [p.x, p.y, p.z]).collect();
    let index = PointIndex::new(&coords);

    let mut processed = vec![false; points.len()];
    let mut clusters = Vec::new();

    for seed in 0..points.len() {
        if processed[seed] {
            continue;
        }
        processed[seed] = true;
        let mut members = vec![seed];
        let mut head = 0;
        while head < members.len() {
            let current = members[head];
            head += 1;
            for nb in index.within(&coords[current], params.tolerance) {
                if !processed[nb] {
                    processed[nb] = true;
                    members.push(nb);
                }
            }
        }

        if members.len() < params.min_size || members.len() > params.max_size {
            continue;
        }
        members.sort_unstable();
        let Some(c) = centroid(members.iter().map(|&i| points[i])) else {
            continue;
        };
        clusters.push(Cluster {
            indices: members,
            centroid: c,
        });
    }

    clusters.sort_by(|a, b| b.len().cmp(&a.len()));
    clusters
}
