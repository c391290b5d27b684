//! End-to-end session runs over recorded frames and detections.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_panics_doc,
    deprecated
)]

use std::path::Path;

use assert_cmd::Command;
use image::{DynamicImage, GrayImage, Luma};
use liveliness_core::domain::{default_challenges, DetectionSnapshot};
use liveliness_test_support::SnapshotBuilder;
use serde_json::Value;

/// Writes one frame per detection plus the detections file.
fn create_recording(detections: &[Option<DetectionSnapshot>]) -> tempfile::TempDir {
    let temp_dir = tempfile::tempdir().unwrap();
    let frames = temp_dir.path().join("frames");
    std::fs::create_dir(&frames).unwrap();

    let mut lines = Vec::new();
    for (i, detection) in detections.iter().enumerate() {
        let img = GrayImage::from_fn(4, 4, |_, _| Luma([100u8]));
        DynamicImage::ImageLuma8(img)
            .save(frames.join(format!("frame_{i:04}.png")))
            .unwrap();
        lines.push(serde_json::to_string(detection).unwrap());
    }
    std::fs::write(temp_dir.path().join("detections.jsonl"), lines.join("\n")).unwrap();

    temp_dir
}

/// Command running one fast session over `dir`, isolated from user config.
fn run_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("liveliness").unwrap();
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .arg("run")
        .arg("--frames")
        .arg(dir.join("frames"))
        .arg("--detections")
        .arg(dir.join("detections.jsonl"))
        .arg("--tick-ms")
        .arg("1")
        .arg("--rearm-ms")
        .arg("0")
        .arg("--quiet");
    cmd
}

fn all_passing() -> Vec<Option<DetectionSnapshot>> {
    default_challenges()
        .iter()
        .map(|c| Some(SnapshotBuilder::satisfying(c)))
        .collect()
}

fn report(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("stdout should be a JSON report")
}

#[test]
fn test_full_session_completes() {
    let dir = create_recording(&all_passing());

    let output = run_cmd(dir.path()).assert().code(0).get_output().clone();
    let json = report(&output.stdout);

    assert_eq!(json["phase"]["state"], "complete");
    assert_eq!(json["total_challenges"], 6);
    assert_eq!(json["final_prompt"], "All done!");

    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 6);
    assert_eq!(results[0]["prompt_label"], "Please smile 😄");
    assert_eq!(results[1]["summary"], "Blink detected 👁️");
    assert_eq!(results[2]["summary"], "Face turned Left");
    assert_eq!(results[5]["summary"], "Face turned Down");

    let captures = json["captures"].as_array().unwrap();
    assert_eq!(captures.len(), 6);
    assert!(captures.iter().all(|c| c["media_type"] == "image/png"));
    assert!(captures.iter().all(|c| c["bytes"].as_u64().unwrap() > 0));
}

#[test]
fn test_results_carry_metrics() {
    let dir = create_recording(&all_passing());

    let output = run_cmd(dir.path()).assert().code(0).get_output().clone();
    let json = report(&output.stdout);
    let results = json["results"].as_array().unwrap();

    assert_eq!(results[0]["metric"]["type"], "expressions");
    assert!(results[0]["metric"]["confidences"]["happy"].as_f64().unwrap() >= 0.9);
    assert_eq!(results[1]["metric"]["type"], "eye_aspect_ratio");
    assert!(results[1]["metric"]["value"].as_f64().unwrap() < 0.2);
}

#[test]
fn test_misses_are_skipped() {
    let challenges = default_challenges();
    let mut detections = Vec::new();
    for challenge in &challenges {
        detections.push(None);
        detections.push(Some(SnapshotBuilder::neutral().build()));
        detections.push(Some(SnapshotBuilder::satisfying(challenge)));
    }
    let dir = create_recording(&detections);

    let output = run_cmd(dir.path()).assert().code(0).get_output().clone();
    let json = report(&output.stdout);

    assert_eq!(json["phase"]["state"], "complete");
    assert_eq!(json["frames_processed"], 18);
}

#[test]
fn test_stream_end_is_incomplete() {
    let mut detections = all_passing();
    detections.truncate(3);
    let dir = create_recording(&detections);

    let output = run_cmd(dir.path()).assert().code(1).get_output().clone();
    let json = report(&output.stdout);

    assert_eq!(json["phase"]["state"], "active");
    assert_eq!(json["phase"]["index"], 3);
    assert_eq!(json["final_prompt"], "Look right 👉");
    assert_eq!(json["results"].as_array().unwrap().len(), 3);
}

#[test]
fn test_challenge_timeout() {
    let detections = vec![None; 200];
    let dir = create_recording(&detections);

    let output = run_cmd(dir.path())
        .arg("--challenge-timeout-ms")
        .arg("20")
        .assert()
        .code(1)
        .get_output()
        .clone();
    let json = report(&output.stdout);

    assert_eq!(json["phase"]["state"], "timed_out");
    assert_eq!(json["phase"]["index"], 0);
    assert!(json["results"].as_array().unwrap().is_empty());
}

#[test]
fn test_jsonl_streams_events_then_report() {
    let dir = create_recording(&all_passing());

    let output = run_cmd(dir.path())
        .arg("--format")
        .arg("jsonl")
        .assert()
        .code(0)
        .get_output()
        .clone();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).expect("each line should be JSON"))
        .collect();

    assert_eq!(lines[0]["event"], "started");
    assert_eq!(lines[0]["prompt"], "Please smile 😄");

    let passed = lines
        .iter()
        .filter(|l| l["event"] == "challenge_passed")
        .count();
    assert_eq!(passed, 6);

    let prompts: Vec<&str> = lines
        .iter()
        .filter(|l| l["event"] == "prompt_changed")
        .filter_map(|l| l["prompt"].as_str())
        .collect();
    assert_eq!(prompts.first(), Some(&"Please blink 👁️"));
    assert_eq!(prompts.len(), 5);

    let last = lines.last().unwrap();
    assert_eq!(last["phase"]["state"], "complete");
}

#[test]
fn test_pretty_report() {
    let dir = create_recording(&all_passing());

    let output = run_cmd(dir.path())
        .arg("--pretty")
        .assert()
        .code(0)
        .get_output()
        .clone();
    let stdout = String::from_utf8(output.stdout).unwrap();

    assert!(stdout.lines().count() > 1, "pretty output spans lines");
    assert_eq!(report(stdout.as_bytes())["phase"]["state"], "complete");
}

#[test]
fn test_frames_without_detections_see_no_face() {
    let dir = create_recording(&all_passing());
    // detections file shorter than the frame list
    std::fs::write(dir.path().join("detections.jsonl"), "null\n").unwrap();

    let output = run_cmd(dir.path()).assert().code(1).get_output().clone();
    let json = report(&output.stdout);

    assert_eq!(json["frames_processed"], 6);
    assert!(json["results"].as_array().unwrap().is_empty());
}
