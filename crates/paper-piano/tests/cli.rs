#![cfg(feature = "cli")]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn bin() -> Command {
    Command::cargo_bin("paper-piano").expect("binary")
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).expect("read")).expect("json")
}

fn render(dir: &Path, keys: usize) -> (std::path::PathBuf, Value) {
    let frame = dir.join("frame.png");
    let expected = dir.join("expected.json");
    bin()
        .args(["render", "--keys", &keys.to_string(), "--out"])
        .arg(&frame)
        .arg("--expected")
        .arg(&expected)
        .assert()
        .success();
    (frame, read_json(&expected))
}

fn write_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("config.json");
    fs::write(
        &path,
        r#"{"edges": {"blur_strength": 2}, "flip_horizontal": false}"#,
    )
    .expect("write config");
    path
}

#[test]
fn help_lists_subcommands() {
    bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("detect"))
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("replay"));
}

#[test]
fn render_then_detect_finds_every_key() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (frame, expected) = render(dir.path(), 4);
    let config = write_config(dir.path());
    let report = dir.path().join("report.json");
    let overlay = dir.path().join("overlay.png");

    bin()
        .arg("detect")
        .arg("--image")
        .arg(&frame)
        .arg("--config")
        .arg(&config)
        .arg("--report")
        .arg(&report)
        .arg("--overlay")
        .arg(&overlay)
        .assert()
        .success();

    assert!(overlay.exists());
    let report = read_json(&report);
    assert_eq!(report["frame_size"], serde_json::json!([640, 480]));
    assert!(!report["quad"].is_null());

    let found = report["key_points"].as_array().expect("keys");
    let truth = expected.as_array().expect("expected");
    assert_eq!(found.len(), 4);
    for (f, t) in found.iter().zip(truth) {
        let fx = f["position"][0].as_f64().expect("x");
        let tx = t["position"][0].as_f64().expect("x");
        assert!((fx - tx).abs() < 2.0, "{fx} vs {tx}");
    }
}

#[test]
fn detect_prints_report_without_sheet() {
    let dir = tempfile::tempdir().expect("tempdir");
    let frame = dir.path().join("black.png");
    image::RgbImage::new(64, 48).save(&frame).expect("save");

    bin()
        .arg("detect")
        .arg("--image")
        .arg(&frame)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"quad\": null"))
        .stdout(predicate::str::contains("\"key_points\": []"));
}

#[test]
fn verbose_logs_pipeline_stages_to_stderr_only() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (frame, _) = render(dir.path(), 3);
    let config = write_config(dir.path());

    let out = bin()
        .env_remove("RUST_LOG")
        .arg("-v")
        .arg("detect")
        .arg("--image")
        .arg(&frame)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stderr(predicate::str::contains("external edge contours"))
        .get_output()
        .stdout
        .clone();

    let report: Value = serde_json::from_slice(&out).expect("stdout is the json report");
    assert_eq!(report["key_points"].as_array().expect("keys").len(), 3);
}

#[test]
fn detect_fails_on_missing_image() {
    bin()
        .args(["detect", "--image", "does/not/exist.png"])
        .assert()
        .failure();
}

#[test]
fn bad_config_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (frame, _) = render(dir.path(), 3);
    let config = dir.path().join("bad.json");
    fs::write(&config, r#"{"touch": {"touch_distance": -1}}"#).expect("write");

    bin()
        .arg("detect")
        .arg("--image")
        .arg(&frame)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("touch_distance"));
}

#[test]
fn replay_reports_presses_per_frame() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (_, expected) = render(dir.path(), 5);
    let config = write_config(dir.path());
    let key2 = &expected[2]["position"];
    let (x, y) = (key2[0].as_f64().expect("x"), key2[1].as_f64().expect("y"));

    let script = serde_json::json!({
        "frames": [
            {"image": "frame.png", "fingertips": [
                {"hand": "Right", "joint": 8, "position": [x + 2.0, y]}
            ]},
            {"image": "frame.png", "fingertips": [
                {"hand": "Right", "joint": 8, "position": [x + 2.0, y]}
            ]},
            {"image": "frame.png", "fingertips": [
                {"hand": "Right", "joint": 8, "position": [x + 60.0, y - 80.0]}
            ]},
            {"image": "frame.png", "freeze_keys": true, "fingertips": [
                {"hand": "Right", "joint": 8, "position": [x, y + 1.0]}
            ]}
        ]
    });
    let script_path = dir.path().join("script.json");
    fs::write(&script_path, script.to_string()).expect("write script");
    let report = dir.path().join("replay.json");

    bin()
        .arg("-v")
        .arg("replay")
        .arg("--script")
        .arg(&script_path)
        .arg("--config")
        .arg(&config)
        .arg("--report")
        .arg(&report)
        .assert()
        .success();

    let report = read_json(&report);
    let frames = report["frames"].as_array().expect("frames");
    assert_eq!(frames.len(), 4);
    let pressed: Vec<Value> = frames.iter().map(|f| f["pressed"].clone()).collect();
    assert_eq!(
        pressed,
        vec![
            serde_json::json!([2]),
            serde_json::json!([]),
            serde_json::json!([]),
            serde_json::json!([2]),
        ]
    );
    assert!(frames.iter().all(|f| f["key_count"] == 5));
}
