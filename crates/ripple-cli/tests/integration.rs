//! Integration tests for ripple-cli.
//!
//! These drive the built `ripple` binary. Nothing here opens an audio
//! device, so they run on headless machines.

use std::process::Command;
use tempfile::TempDir;

/// Helper to get the path to the `ripple` binary built by cargo.
fn ripple_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ripple"))
}

fn write_sine(path: &std::path::Path, sample_rate: u32, len: usize) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..len {
        let t = i as f32 / sample_rate as f32;
        writer
            .write_sample(0.7 * (2.0 * std::f32::consts::PI * 110.0 * t).sin())
            .unwrap();
    }
    writer.finalize().unwrap();
}

// ---------------------------------------------------------------------------
// Help
// ---------------------------------------------------------------------------

#[test]
fn cli_help_lists_commands() {
    let output = ripple_bin().arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["run", "process", "bench", "devices"] {
        assert!(stdout.contains(command), "help should mention '{command}'");
    }
}

#[test]
fn cli_run_help_shows_effect_flags() {
    let output = ripple_bin().args(["run", "--help"]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in [
        "--ratio",
        "--knee-width",
        "--threshold",
        "--attack",
        "--release",
        "--compression",
        "--comp-gain",
        "--drive",
        "--window",
        "--drive-gain",
        "--block-size",
        "--sample-rate",
        "--periods",
    ] {
        assert!(stdout.contains(flag), "run --help should list {flag}");
    }
}

// ---------------------------------------------------------------------------
// Configuration errors exit before any audio starts
// ---------------------------------------------------------------------------

#[test]
fn cli_rejects_low_ratio() {
    let output = ripple_bin()
        .args(["run", "--ratio", "10"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ratio"), "stderr: {stderr}");
}

#[test]
fn cli_rejects_duplicate_effect() {
    let output = ripple_bin()
        .args(["run", "overdrive", "overdrive"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("only be set once"), "stderr: {stderr}");
}

#[test]
fn cli_rejects_unknown_effect() {
    let output = ripple_bin()
        .args(["bench", "chorus", "--blocks", "4"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown effect type: chorus"), "stderr: {stderr}");
}

#[test]
fn cli_rejects_low_sample_rate() {
    let output = ripple_bin()
        .args(["bench", "--fs", "22050", "--blocks", "4"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn cli_accepts_negative_threshold() {
    let output = ripple_bin()
        .args(["bench", "compressor", "--threshold", "-40", "--blocks", "4"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

// ---------------------------------------------------------------------------
// Bench
// ---------------------------------------------------------------------------

#[test]
fn cli_bench_json_report() {
    let output = ripple_bin()
        .args([
            "bench",
            "overdrive",
            "compressor",
            "--blocks",
            "20",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["order"], serde_json::json!(["overdrive", "compressor"]));
    assert_eq!(report["block_size"], 64);
    assert_eq!(report["blocks"], 20);

    let points = report["points"].as_array().unwrap();
    assert_eq!(points.len(), 12);
    assert_eq!(points[0]["effect"], "overdrive");
    assert_eq!(points[0]["param"], "drive");
    assert_eq!(points[6]["effect"], "compressor");
    assert_eq!(points[6]["param"], "compression");
    assert_eq!(points[11]["value"], 15.0);
    for p in points {
        assert!(p["worst_us"].as_f64().unwrap() >= p["mean_us"].as_f64().unwrap());
    }
}

#[test]
fn cli_bench_text_report() {
    let output = ripple_bin()
        .args(["bench", "--blocks", "10", "--nframes", "128"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Chain: compressor"));
    assert!(stdout.contains("128 frames"));
}

// ---------------------------------------------------------------------------
// Process
// ---------------------------------------------------------------------------

#[test]
fn cli_process_wav() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output_path = dir.path().join("out.wav");
    write_sine(&input, 48000, 4801);

    let output = ripple_bin()
        .arg("process")
        .arg(&input)
        .arg(&output_path)
        .args(["overdrive", "compressor", "--drive", "0.8", "--bit-depth", "16"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Processing: overdrive -> compressor"));

    let reader = hound::WavReader::open(&output_path).unwrap();
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.spec().sample_rate, 48000);
    assert_eq!(reader.spec().bits_per_sample, 16);
    assert_eq!(reader.duration(), 4801);
}

#[test]
fn cli_process_rejects_bad_drive_without_writing() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output_path = dir.path().join("out.wav");
    write_sine(&input, 48000, 480);

    let output = ripple_bin()
        .arg("process")
        .arg(&input)
        .arg(&output_path)
        .args(["overdrive", "--drive", "1.5"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(!output_path.exists());
}
