//! High-level facade crate for the `lidar-targets-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the underlying crates
//! - end-to-end helpers that run detection and accumulation over a batch of
//!   sweeps or a JSON-lines frame file
//! - (feature `cli`) the `lidar-targets` command-line tool
//!
//! ## Quickstart
//!
//! ```no_run
//! use lidar_targets::circles::CalibrationConfig;
//! use lidar_targets::detect;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CalibrationConfig::load_json("calib.json")?;
//! let report = detect::calibrate_jsonl("frames.jsonl", &config)?;
//! match report.consensus {
//!     Some(c) => println!("centers: {:?}", c.positions()),
//!     None => println!("no consensus after {} frames", report.frames_processed),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `lidar_targets::core`: point clouds, planes, circles, kd-tree, RANSAC, clustering, logger.
//! - `lidar_targets::circles`: four-circle detector, accumulator, consensus, session, runner.
//! - `lidar_targets::detect`: batch helpers on top of both.

pub use lidar_targets_circles as circles;
pub use lidar_targets_core as core;

pub use lidar_targets_circles::{
    CalibrationConfig, CalibrationSession, CirclePatternDetector, ConsensusResult, FramePair,
    FrameReport, PatternParams, SessionReport,
};
pub use lidar_targets_core::{LidarPoint, PointCloud};

pub mod detect;
