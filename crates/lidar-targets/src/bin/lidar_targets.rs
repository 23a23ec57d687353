//! Detect the four-circle board in a recorded stream of sweeps and write a
//! session report.
//!
//! Usage:
//!   lidar-targets --frames frames.jsonl [--config calib.json] [--output report.json]
//!
//! With `--stdin-commands`, lines `reset`, `pause`, `resume` and `terminate`
//! read from stdin are applied between frames.

use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender, SyncSender};
use std::thread;

use clap::Parser;
use lidar_targets::circles::{
    read_frames_jsonl, CalibrationConfig, CalibrationSession, ControlCommand, FrameOutcome,
    FramePair, FrameRunner, IoError,
};

/// Four-circle LiDAR calibration target detection
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON-lines file, one `{"full": ..., "board": ...}` frame per line
    #[arg(short, long)]
    frames: PathBuf,

    /// JSON configuration; missing sections keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the session report
    #[arg(short, long, default_value = "lidar_targets_report.json")]
    output: PathBuf,

    /// Sensor ring count (16, 32, 64 or 128), overrides the config
    #[arg(long)]
    rings: Option<u16>,

    /// Log level: error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Attach intermediate clouds and circle attempts to every frame report
    #[arg(long)]
    diagnostics: bool,

    /// Read `reset` / `pause` / `resume` / `terminate` commands from stdin
    #[arg(long)]
    stdin_commands: bool,
}

fn init_logging(level: &str) {
    #[cfg(feature = "tracing")]
    {
        let _ = level;
        lidar_targets::core::init_tracing(false);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = lidar_targets::core::init_with_level(lidar_targets::core::parse_level(level));
    }
}

fn spawn_frame_reader(
    file: File,
    tx: SyncSender<FramePair>,
) -> thread::JoinHandle<Result<usize, IoError>> {
    thread::spawn(move || {
        let mut sent = 0usize;
        for pair in read_frames_jsonl(BufReader::new(file)) {
            if tx.send(pair?).is_err() {
                break;
            }
            sent += 1;
        }
        Ok(sent)
    })
}

fn spawn_command_reader(tx: Sender<ControlCommand>) {
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let cmd = match line.trim() {
                "reset" => ControlCommand::Reset,
                "pause" => ControlCommand::Pause,
                "resume" => ControlCommand::Resume,
                "terminate" | "quit" => ControlCommand::Terminate,
                "" => continue,
                other => {
                    log::warn!("unknown command {other:?}");
                    continue;
                }
            };
            if tx.send(cmd).is_err() {
                break;
            }
        }
    });
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let mut config = match &args.config {
        Some(path) => CalibrationConfig::load_json(path)?,
        None => CalibrationConfig::default(),
    };
    if let Some(rings) = args.rings {
        config.pattern.ring_count = rings;
    }
    config.diagnostics |= args.diagnostics;

    let session = CalibrationSession::new(&config)?;
    let file = File::open(&args.frames)?;

    let (frame_tx, frame_rx) = mpsc::sync_channel(8);
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let reader = spawn_frame_reader(file, frame_tx);
    if args.stdin_commands {
        spawn_command_reader(cmd_tx.clone());
    }

    let mut runner = FrameRunner::new(session);
    let report = runner.run(&frame_rx, &cmd_rx, |frame| {
        if let FrameOutcome::Accepted { frame: n } = frame.outcome {
            log::debug!("frame {} committed as accepted frame {n}", frame.index);
        }
    });
    drop(frame_rx);
    drop(cmd_tx);

    report.write_json(&args.output)?;
    println!(
        "processed {} frames: {} accepted, {} reached the accumulator, {} skipped while paused",
        report.frames.len(),
        report.frames_accepted,
        report.frames_processed,
        report.frames_skipped
    );
    println!("{} centers buffered", report.buffer.len());
    match &report.consensus {
        Some(consensus) => {
            for (i, c) in consensus.centers.iter().enumerate() {
                println!(
                    "center {i}: [{:.4}, {:.4}, {:.4}] support {}",
                    c.position.x, c.position.y, c.position.z, c.support
                );
            }
        }
        None => println!("no consensus"),
    }
    println!("report written to {}", args.output.display());

    match reader.join() {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(err)) => Err(err.into()),
        Err(_) => Err("frame reader panicked".into()),
    }
}
