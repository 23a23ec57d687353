mod common;

use assert_cmd::Command;
use lidar_targets::SessionReport;
use predicates::prelude::*;

fn cli() -> Command {
    Command::cargo_bin("lidar-targets").expect("binary built")
}

#[test]
fn help_lists_options() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--frames"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn writes_report_with_consensus() {
    let dir = tempfile::tempdir().expect("tempdir");
    let frames = dir.path().join("frames.jsonl");
    let config = dir.path().join("config.json");
    let output = dir.path().join("report.json");
    common::write_frames(&frames, 3);
    common::config().write_json(&config).expect("write config");

    cli()
        .arg("--frames")
        .arg(&frames)
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .arg("--log-level")
        .arg("warn")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 accepted"))
        .stdout(predicate::str::contains("12 centers buffered"))
        .stdout(predicate::str::contains("center 3"));

    let report = SessionReport::load_json(&output).expect("report");
    assert_eq!(report.frames.len(), 3);
    assert_eq!(report.frames_accepted, 3);
    assert_eq!(report.buffer.len(), 12);
    assert!(report.consensus.is_some());
    assert!(!report.terminated);
    assert!(report.frames.iter().all(|f| f.diagnostics.is_none()));
}

#[test]
fn rings_flag_overrides_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let frames = dir.path().join("frames.jsonl");
    let output = dir.path().join("report.json");
    common::write_frames(&frames, 1);

    cli()
        .arg("--frames")
        .arg(&frames)
        .arg("--rings")
        .arg("64")
        .arg("--diagnostics")
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let report = SessionReport::load_json(&output).expect("report");
    assert_eq!(report.frames_accepted, 1);
    assert!(report.frames[0].diagnostics.is_some());
}

#[test]
fn unsupported_ring_count_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let frames = dir.path().join("frames.jsonl");
    common::write_frames(&frames, 1);

    cli()
        .arg("--frames")
        .arg(&frames)
        .arg("--rings")
        .arg("20")
        .arg("--output")
        .arg(dir.path().join("report.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported ring count 20"));
}

#[test]
fn missing_frames_file_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    cli()
        .arg("--frames")
        .arg(dir.path().join("nope.jsonl"))
        .arg("--output")
        .arg(dir.path().join("report.json"))
        .assert()
        .failure();
}

#[test]
fn malformed_frame_line_fails_after_writing_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let frames = dir.path().join("frames.jsonl");
    let output = dir.path().join("report.json");
    std::fs::write(&frames, "{\"full\": 3}\n").expect("write frames");

    cli()
        .arg("--frames")
        .arg(&frames)
        .arg("--output")
        .arg(&output)
        .assert()
        .failure();
    let report = SessionReport::load_json(&output).expect("report");
    assert!(report.frames.is_empty());
}

#[test]
fn stdin_pause_command_is_accepted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let frames = dir.path().join("frames.jsonl");
    let output = dir.path().join("report.json");
    common::write_frames(&frames, 2);

    cli()
        .arg("--frames")
        .arg(&frames)
        .arg("--output")
        .arg(&output)
        .arg("--rings")
        .arg("64")
        .arg("--stdin-commands")
        .write_stdin("pause\n")
        .assert()
        .success();

    let report = SessionReport::load_json(&output).expect("report");
    assert_eq!(report.frames.len() + report.frames_skipped, 2);
}
