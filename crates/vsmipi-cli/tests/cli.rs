// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Integration tests for the vsmipi CLI
//!
//! These tests verify CLI commands work correctly end-to-end using the
//! assert_cmd crate pattern. The sensor is bound in-process by every
//! command, no hardware is required.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::{
    env,
    path::PathBuf,
    process::{Command as StdCommand, Stdio},
    thread,
    time::{Duration, Instant},
};

/// Helper to create a Command for the vsmipi binary
/// Uses VSMIPI_BIN environment variable if set, otherwise the cargo-built binary
fn vsmipi_cmd() -> Command {
    let mut cmd = if let Ok(bin_path) = env::var("VSMIPI_BIN") {
        Command::new(bin_path)
    } else {
        Command::cargo_bin("vsmipi").expect("vsmipi binary not built")
    };

    // Log output is asserted on, keep it at the CLI's default level
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Path to the vsmipi binary for std::process::Command
fn vsmipi_bin() -> PathBuf {
    match env::var("VSMIPI_BIN") {
        Ok(bin_path) => PathBuf::from(bin_path),
        Err(_) => assert_cmd::cargo::cargo_bin("vsmipi"),
    }
}

/// Run a command with --json and parse its stdout
fn json_output(args: &[&str]) -> Value {
    let output = vsmipi_cmd()
        .args(args)
        .arg("--json")
        .output()
        .expect("Failed to run vsmipi");
    assert!(output.status.success(), "{:?} failed: {:?}", args, output);
    serde_json::from_slice(&output.stdout).expect("Output is not valid JSON")
}

// =============================================================================
// Help and version
// =============================================================================

#[test]
fn test_cli_help() {
    vsmipi_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("vsmipi CLI"))
        .stdout(predicate::str::contains("info"))
        .stdout(predicate::str::contains("formats"))
        .stdout(predicate::str::contains("set-fmt"))
        .stdout(predicate::str::contains("parm"))
        .stdout(predicate::str::contains("stream"));
}

#[test]
fn test_cli_version() {
    vsmipi_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vsmipi"));
}

#[test]
fn test_set_fmt_help() {
    vsmipi_cmd()
        .args(["set-fmt", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--code"))
        .stdout(predicate::str::contains("--resolution"))
        .stdout(predicate::str::contains("--try"));
}

#[test]
fn test_invalid_command() {
    vsmipi_cmd()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// =============================================================================
// info
// =============================================================================

#[test]
fn test_info_text() {
    vsmipi_cmd()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("VisionSensor PV3 MIPI sensor driver"))
        .stdout(predicate::str::contains("imago,sensor_mipi"))
        .stdout(predicate::str::contains("VIDIOC_SUBDEV_G_FMT"))
        .stdout(predicate::str::contains("v4l2_async_register_subdev_sensor"));
}

#[test]
fn test_info_json() {
    let info = json_output(&["info", "--probe", "--kernel", "5.10.72"]);

    assert_eq!(info["name"], "vsmipi");
    assert_eq!(info["version"], "1.3.2.0");
    assert_eq!(info["alias"], "CSI");
    assert_eq!(info["compatible"][0], "imago,sensor_mipi");
    assert_eq!(info["registration"], "v4l2_async_register_subdev");
    assert_eq!(info["ops"]["core"][0], "s_power");
    assert_eq!(info["ops"]["pad"].as_array().unwrap().len(), 5);
    assert_eq!(info["ioctls"].as_array().unwrap().len(), 9);

    let subdev = &info["subdev"];
    assert_eq!(subdev["name"], "vsmipi.csi0");
    assert_eq!(subdev["registered_with"], "v4l2_async_register_subdev");
    assert_eq!(subdev["width"], 1920);
    assert_eq!(subdev["height"], 1080);
    assert_eq!(subdev["colorspace"], "raw");
    assert_eq!(subdev["interval"], "1/30");
}

#[test]
fn test_info_invalid_kernel() {
    vsmipi_cmd()
        .args(["info", "--kernel", "latest"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid kernel version"));
}

// =============================================================================
// formats
// =============================================================================

#[test]
fn test_formats_json() {
    let list = json_output(&["formats", "--device", "32e40000.csi"]);

    assert_eq!(list["subdev"], "vsmipi.32e40000.csi");
    let formats = list["formats"].as_array().unwrap();
    let codes: Vec<u64> = formats.iter().map(|f| f["code"].as_u64().unwrap()).collect();
    assert_eq!(codes, [0x3001, 0x3007, 0x300b]);

    for fmt in formats {
        assert_eq!(fmt["colorspace"], "raw");
        let sizes = fmt["frame_sizes"].as_array().unwrap();
        assert_eq!(sizes.len(), 1);
        assert_eq!(sizes[0]["min_width"], 128);
        assert_eq!(sizes[0]["max_width"], 16384);
        assert_eq!(sizes[0]["min_height"], 1);
        assert_eq!(sizes[0]["max_height"], 16384);

        let intervals = fmt["intervals"].as_array().unwrap();
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0]["interval"], "1/30");
        assert_eq!(intervals[0]["fps"], 30);
    }
}

#[test]
fn test_formats_text() {
    vsmipi_cmd()
        .args(["formats", "--resolution", "640x480"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SBGGR10_ALAW8_1X8 (0x300b)"))
        .stdout(predicate::str::contains("128-16384 x 1-16384"))
        .stdout(predicate::str::contains("1/30 s (30 fps) at 640x480"));
}

// =============================================================================
// set-fmt
// =============================================================================

#[test]
fn test_set_fmt_active() {
    let report = json_output(&["set-fmt", "--code", "SBGGR10_1X10", "--resolution", "1280x720"]);

    assert_eq!(report["which"], "active");
    assert_eq!(report["negotiated"]["code"], 0x3007);
    assert_eq!(report["negotiated"]["field"], "none");
    assert_eq!(report["active"]["width"], 1280);
    assert_eq!(report["active"]["height"], 720);
    assert_eq!(report["active"]["code"], 0x3007);
}

#[test]
fn test_set_fmt_try_keeps_active() {
    let report = json_output(&[
        "set-fmt",
        "--code",
        "0x300b",
        "--resolution",
        "640x480",
        "--try",
    ]);

    assert_eq!(report["which"], "try");
    assert_eq!(report["negotiated"]["width"], 640);
    assert_eq!(report["active"]["width"], 1920);
    assert_eq!(report["active"]["code"], 0x3001);
}

#[test]
fn test_set_fmt_unknown_code_falls_back() {
    vsmipi_cmd()
        .args(["set-fmt", "--code", "0x2008", "--resolution", "800x600"])
        .assert()
        .success()
        .stdout(predicate::str::contains("800x600 SBGGR8_1X8 (0x3001)"))
        .stderr(predicate::str::contains("sensor selected SBGGR8_1X8"));
}

#[test]
fn test_set_fmt_invalid_resolution() {
    vsmipi_cmd()
        .args(["set-fmt", "--resolution", "1920"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid resolution format"));
}

// =============================================================================
// parm
// =============================================================================

#[test]
fn test_parm_default() {
    let parm = json_output(&["parm"]);

    assert_eq!(parm["buf_type"], "VIDEO_CAPTURE");
    assert_eq!(parm["capability"], 0);
    assert_eq!(parm["capturemode"], 0);
    assert_eq!(parm["timeperframe"], "1/30");
    assert_eq!(parm["fps"], 30);
}

#[test]
fn test_parm_set_interval() {
    let parm = json_output(&["parm", "--interval", "1/60", "--capture-mode", "1"]);

    assert_eq!(parm["timeperframe"], "1/60");
    assert_eq!(parm["fps"], 60);
    assert_eq!(parm["capturemode"], 1);
}

#[test]
fn test_parm_zero_interval_normalized() {
    let parm = json_output(&["parm", "--interval", "0/0"]);
    assert_eq!(parm["timeperframe"], "1/30");
}

#[test]
fn test_parm_output_type_rejected() {
    vsmipi_cmd()
        .args(["parm", "--type", "video_output", "--interval", "1/15"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "csi0: Type is not V4L2_BUF_TYPE_VIDEO_CAPTURE but 2",
        ));
}

#[test]
fn test_parm_unknown_type() {
    vsmipi_cmd()
        .args(["parm", "--type", "13"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("csi0: Type is unknown - 13"));
}

// =============================================================================
// stream
// =============================================================================

#[test]
fn test_stream_frames() {
    let summary = json_output(&[
        "stream",
        "--frames",
        "3",
        "--interval",
        "1/100",
        "--resolution",
        "640x480",
    ]);

    assert_eq!(summary["subdev"], "vsmipi.csi0");
    assert_eq!(summary["frames"], 3);
    assert_eq!(summary["width"], 640);
    assert_eq!(summary["interval"], "1/100");
    assert_eq!(summary["interrupted"], false);
    assert!(summary["elapsed_ms"].as_u64().unwrap() >= 30);
}

#[cfg(unix)]
#[test]
fn test_stream_stops_on_sigint_mid_frame() {
    let child = StdCommand::new(vsmipi_bin())
        .args(["stream", "--interval", "5/1", "--frames", "3", "--json"])
        .env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn vsmipi");

    // Let the command bind the sensor and enter its first frame period
    thread::sleep(Duration::from_millis(500));
    let interrupted_at = Instant::now();
    let status = StdCommand::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("Failed to run kill");
    assert!(status.success());

    let output = child.wait_with_output().expect("Failed to wait for vsmipi");
    assert!(
        interrupted_at.elapsed() < Duration::from_secs(1),
        "stream kept running {:?} after SIGINT",
        interrupted_at.elapsed()
    );
    assert!(output.status.success(), "{:?}", output);

    let summary: Value = serde_json::from_slice(&output.stdout).expect("Output is not valid JSON");
    assert_eq!(summary["frames"], 0);
    assert_eq!(summary["interrupted"], true);
    assert_eq!(summary["interval"], "5/1");
    assert!(summary["elapsed_ms"].as_u64().unwrap() < 2000);
}

// =============================================================================
// Device matching
// =============================================================================

#[test]
fn test_foreign_compatible_not_found() {
    vsmipi_cmd()
        .args(["formats", "--compatible", "ovti,ov5640"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Device not found"));
}
