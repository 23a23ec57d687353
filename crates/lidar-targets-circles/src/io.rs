//! JSON configuration, frame input and report helpers.

use std::fs;
use std::io::BufRead;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::accumulator::{AccumulatedCenter, AccumulatorParams};
use crate::consensus::{ConsensusParams, ConsensusResult};
use crate::params::PatternParams;
use crate::session::{CalibrationSession, FramePair, FrameReport};

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Everything a [`crate::CalibrationSession`] needs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub pattern: PatternParams,
    pub accumulator: AccumulatorParams,
    pub consensus: ConsensusParams,
    /// Attach intermediate clouds and circle attempts to every frame report.
    pub diagnostics: bool,
}

impl CalibrationConfig {
    /// Load a JSON config from disk. Missing sections keep their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Summary of a whole run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub frames: Vec<FrameReport>,
    pub frames_accepted: usize,
    pub frames_processed: usize,
    pub resets: usize,
    /// Frames that arrived while paused and were never processed.
    #[serde(default)]
    pub frames_skipped: usize,
    /// Centers buffered since the last reset, in commit order.
    #[serde(default)]
    pub buffer: Vec<AccumulatedCenter>,
    #[serde(default)]
    pub consensus: Option<ConsensusResult>,
    /// The run ended on a terminate command rather than end of input.
    pub terminated: bool,
}

impl SessionReport {
    /// Copy the session's final counters, buffer and consensus.
    pub fn record_session(&mut self, session: &CalibrationSession) {
        let acc = session.accumulator();
        self.frames_accepted = acc.frames_accepted();
        self.frames_processed = acc.frames_processed();
        self.buffer = acc.centers().to_vec();
        self.consensus = session.last_consensus().cloned();
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Parse frames stored one JSON [`FramePair`] per line. Blank lines are skipped.
pub fn read_frames_jsonl<R: BufRead>(reader: R) -> impl Iterator<Item = Result<FramePair, IoError>> {
    reader.lines().filter_map(|line| match line {
        Ok(line) if line.trim().is_empty() => None,
        Ok(line) => Some(serde_json::from_str(&line).map_err(IoError::from)),
        Err(err) => Some(Err(IoError::from(err))),
    })
}

/// Write frames in the format read by [`read_frames_jsonl`].
pub fn write_frames_jsonl<'a, W, I>(mut writer: W, frames: I) -> Result<(), IoError>
where
    W: std::io::Write,
    I: IntoIterator<Item = &'a FramePair>,
{
    for frame in frames {
        serde_json::to_writer(&mut writer, frame)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lidar_targets_core::LidarPoint;
    use std::io::Cursor;

    #[test]
    fn config_roundtrips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        let mut cfg = CalibrationConfig::default();
        cfg.pattern.ring_count = 64;
        cfg.accumulator.min_centers_found = 3;
        cfg.write_json(&path).unwrap();
        assert_eq!(CalibrationConfig::load_json(&path).unwrap(), cfg);
    }

    #[test]
    fn empty_config_file_means_defaults() {
        let cfg: CalibrationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, CalibrationConfig::default());
    }

    #[test]
    fn frames_are_read_line_by_line() {
        let frame = FramePair {
            full: vec![LidarPoint::new(1.0, 2.0, 3.0).with_ring(4)].into_iter().collect(),
            board: Default::default(),
        };
        let mut buf = Vec::new();
        write_frames_jsonl(&mut buf, [&frame, &frame]).unwrap();
        buf.extend_from_slice(b"\n");

        let frames: Vec<FramePair> = read_frames_jsonl(Cursor::new(buf))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(frames, vec![frame.clone(), frame]);
    }

    #[test]
    fn malformed_line_is_a_json_error() {
        let mut it = read_frames_jsonl(Cursor::new(b"{not json}\n".to_vec()));
        assert!(matches!(it.next(), Some(Err(IoError::Json(_)))));
    }
}
