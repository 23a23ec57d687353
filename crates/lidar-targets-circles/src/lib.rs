//! Four-circle calibration board detection in LiDAR sweeps.
//!
//! Per sweep, [`CirclePatternDetector`] finds the board plane, isolates the
//! boundary of the four circular cut-outs and fits up to four circles in a
//! plane-aligned frame. [`CalibrationSession`] accumulates accepted centers
//! over many sweeps and reports four temporally stable centers once enough
//! frames agree. [`FrameRunner`] drives a session from a channel of frames
//! with reset/terminate commands applied between frames.
//!
//! ```no_run
//! use lidar_targets_circles::{CalibrationConfig, CalibrationSession, FramePair};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CalibrationConfig::load_json("calib.json")?;
//! let mut session = CalibrationSession::new(&config)?;
//! # let frames: Vec<FramePair> = Vec::new();
//! for pair in &frames {
//!     let report = session.process(pair);
//!     if let Some(consensus) = report.consensus {
//!         println!("{:?}", consensus.positions());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod accumulator;
mod consensus;
mod detector;
mod io;
mod params;
mod runner;
mod sensor;
mod session;

pub use accumulator::{AccumulatedCenter, AccumulatorParams, CenterAccumulator, CommitOutcome};
pub use consensus::{find_consensus, ConsensusCenter, ConsensusParams, ConsensusResult};
pub use detector::{
    CircleAttempt, CirclePatternDetector, CircleVerdict, DetectedCircle, FrameDetection,
    FrameDiagnostics, PatternError, PlaneFrame, PATTERN_CIRCLES,
};
pub use io::{read_frames_jsonl, write_frames_jsonl, CalibrationConfig, IoError, SessionReport};
pub use params::{
    CircleParams, ConfigError, EdgeParams, PatternClusterParams, PatternParams, PlaneParams,
    RingParams,
};
pub use runner::{ControlCommand, FrameRunner, DEFAULT_POLL_INTERVAL};
pub use sensor::{SensorModel, SUPPORTED_RING_COUNTS};
pub use session::{CalibrationSession, FrameOutcome, FramePair, FrameReport};
