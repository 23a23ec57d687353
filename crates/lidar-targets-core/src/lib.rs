//! Core types and geometry primitives for LiDAR calibration target detection.
//!
//! This crate is purely geometric: point clouds, planes, circles, a kd-tree
//! index, RANSAC fitters and Euclidean clustering. It knows nothing about
//! calibration boards or frame accumulation.

mod circle;
mod cloud;
mod cluster;
mod logger;
mod plane;
mod ransac;
mod spatial;

pub use circle::{fit_circle_ransac, Circle2, CircleFit, RadiusLimits};
pub use cloud::{centroid, LidarPoint, PointCloud};
pub use cluster::{euclidean_clusters, Cluster, ClusterParams};
pub use plane::{fit_plane_ransac, AxisConstraint, AxisMode, Plane, PlaneFit};
pub use ransac::RansacParams;
pub use spatial::PointIndex;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, parse_level};
