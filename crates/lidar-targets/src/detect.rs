use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::circles::{
    self, CalibrationConfig, CalibrationSession, CirclePatternDetector, FrameDetection, FramePair,
    PatternParams, SessionReport,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the high-level facade helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error(transparent)]
    Config(#[from] circles::ConfigError),

    #[error(transparent)]
    Pattern(#[from] circles::PatternError),

    #[error(transparent)]
    Io(#[from] circles::IoError),
}

/// Run the detector once on a single sweep.
pub fn detect_frame(pair: &FramePair, params: PatternParams) -> Result<FrameDetection, DetectError> {
    let detector = CirclePatternDetector::new(params)?;
    Ok(detector.detect(&pair.full, &pair.board)?)
}

/// Feed a batch of sweeps through a fresh session.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip_all))]
pub fn calibrate<'a, I>(frames: I, config: &CalibrationConfig) -> Result<SessionReport, DetectError>
where
    I: IntoIterator<Item = &'a FramePair>,
{
    let mut session = CalibrationSession::new(config)?;
    let mut report = SessionReport::default();
    for pair in frames {
        report.frames.push(session.process(pair));
    }
    Ok(finish(&session, report))
}

/// [`calibrate`] over a JSON-lines frame file, streaming one sweep at a time.
pub fn calibrate_jsonl(
    path: impl AsRef<Path>,
    config: &CalibrationConfig,
) -> Result<SessionReport, DetectError> {
    let file = File::open(path).map_err(circles::IoError::from)?;
    let mut session = CalibrationSession::new(config)?;
    let mut report = SessionReport::default();
    for pair in circles::read_frames_jsonl(BufReader::new(file)) {
        report.frames.push(session.process(&pair?));
    }
    Ok(finish(&session, report))
}

fn finish(session: &CalibrationSession, mut report: SessionReport) -> SessionReport {
    report.record_session(session);
    report
}
