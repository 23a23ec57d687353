//! Per-sweep four-circle pattern detection.
//!
//! Stages, in order: board plane fit, edge isolation, plane membership, ring
//! pruning, plane-aligned projection, pattern clustering, iterative circle
//! search and back-projection of the accepted centers.

mod circle_search;
mod edges;
mod error;
mod pattern_centroid;
mod pipeline;
mod plane_fit;
mod projection;
mod result;
mod rings;

pub use circle_search::PATTERN_CIRCLES;
pub use error::PatternError;
pub use pipeline::CirclePatternDetector;
pub use projection::PlaneFrame;
pub use result::{CircleAttempt, CircleVerdict, DetectedCircle, FrameDetection, FrameDiagnostics};
