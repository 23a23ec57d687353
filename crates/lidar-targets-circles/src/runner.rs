//! Frame loop with an explicit control channel.

use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use crate::io::SessionReport;
use crate::session::{CalibrationSession, FramePair, FrameReport};

/// Out-of-band requests, applied between frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlCommand {
    /// Discard accumulated centers and counters.
    Reset,
    /// Stop after the frame in flight.
    Terminate,
    /// Discard incoming frames without processing or counting them.
    Pause,
    /// Start over from an empty session and process frames again.
    Resume,
}

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Drives a [`CalibrationSession`] from a frame channel.
pub struct FrameRunner {
    session: CalibrationSession,
    poll_interval: Duration,
    paused: bool,
}

impl FrameRunner {
    pub fn new(session: CalibrationSession) -> Self {
        Self {
            session,
            poll_interval: DEFAULT_POLL_INTERVAL,
            paused: false,
        }
    }

    /// How long to wait for a frame before checking commands again.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[inline]
    pub fn session(&self) -> &CalibrationSession {
        &self.session
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn into_session(self) -> CalibrationSession {
        self.session
    }

    /// Apply pending commands. Returns `true` once terminated.
    fn drain_commands(&mut self, commands: &Receiver<ControlCommand>, resets: &mut usize) -> bool {
        loop {
            match commands.try_recv() {
                Ok(ControlCommand::Reset) => {
                    self.session.reset();
                    *resets += 1;
                }
                Ok(ControlCommand::Terminate) => {
                    log::info!("terminate requested");
                    self.session.terminate();
                }
                Ok(ControlCommand::Pause) => {
                    if !self.paused {
                        log::info!("accumulation paused");
                    }
                    self.paused = true;
                }
                Ok(ControlCommand::Resume) => {
                    if self.paused {
                        log::info!("accumulation resumed");
                        self.session.reset();
                        *resets += 1;
                    }
                    self.paused = false;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        self.session.is_terminated()
    }

    /// Process frames until the frame channel closes or a terminate command
    /// arrives. `on_report` sees every frame report as it is produced.
    ///
    /// Frames received while paused are dropped and only counted in
    /// `frames_skipped`. Resuming resets the session.
    pub fn run<F>(
        &mut self,
        frames: &Receiver<FramePair>,
        commands: &Receiver<ControlCommand>,
        mut on_report: F,
    ) -> SessionReport
    where
        F: FnMut(&FrameReport),
    {
        let mut report = SessionReport::default();
        loop {
            if self.drain_commands(commands, &mut report.resets) {
                report.terminated = true;
                break;
            }
            match frames.recv_timeout(self.poll_interval) {
                Ok(_) if self.paused => {
                    report.frames_skipped += 1;
                }
                Ok(pair) => {
                    let frame = self.session.process(&pair);
                    on_report(&frame);
                    report.frames.push(frame);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    log::debug!("frame source closed");
                    // Commands sent together with the last frames still apply.
                    report.terminated = self.drain_commands(commands, &mut report.resets);
                    break;
                }
            }
        }

        report.record_session(&self.session);
        report
    }
}
