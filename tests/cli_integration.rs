use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use image::{Rgb, RgbImage};
use tempfile::TempDir;

const GREY: Rgb<u8> = Rgb([128, 128, 128]);

fn uprightdiff() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_uprightdiff"));
    command.env_remove("RUST_LOG").env_remove("UPRIGHTDIFF_CONFIG");
    command
}

/// Writes a baseline with a white square and a current image with the square one block higher
fn write_inputs(dir: &Path) -> (PathBuf, PathBuf) {
    let square = |y0: u32| {
        RgbImage::from_fn(32, 32, |x, y| {
            if x >= 16 && (y0..y0 + 16).contains(&y) {
                Rgb([255, 255, 255])
            } else {
                GREY
            }
        })
    };
    let baseline = dir.join("baseline.png");
    let current = dir.join("current.png");
    square(16).save(&baseline).unwrap();
    square(0).save(&current).unwrap();
    (baseline, current)
}

fn run(paths: [&Path; 3], extra: &[&str]) -> Output {
    uprightdiff().args(paths).args(extra).output().unwrap()
}

#[test]
fn test_help_exits_successfully() {
    let output = uprightdiff().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
    assert!(stdout.contains("--block-size"));
    assert!(stdout.contains("--inner-hl-window"));
}

#[test]
fn test_text_summary() {
    let dir = TempDir::new().unwrap();
    let (baseline, current) = write_inputs(dir.path());
    let out = dir.path().join("diff.png");

    let output = run([&baseline, &current, &out], &[]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout,
        "Modified area: 512 pixels\nMoved area: 512 pixels\nResidual area: 0 pixels\n"
    );
    let visual = image::open(&out).unwrap();
    assert_eq!((visual.width(), visual.height()), (32, 32));
}

#[test]
fn test_json_summary() {
    let dir = TempDir::new().unwrap();
    let (baseline, current) = write_inputs(dir.path());
    let out = dir.path().join("diff.png");

    let output = run([&baseline, &current, &out], &["--format", "json"]);

    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["modifiedArea"], 512);
    assert_eq!(summary["movedArea"], 512);
    assert_eq!(summary["residualArea"], 0);
}

#[test]
fn test_no_summary() {
    let dir = TempDir::new().unwrap();
    let (baseline, current) = write_inputs(dir.path());
    let out = dir.path().join("diff.png");

    let output = run([&baseline, &current, &out], &["--format", "none", "-vv"]);

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    // Logs go to stderr
    assert!(String::from_utf8_lossy(&output.stderr).contains("Searching for block motion"));
    assert!(out.exists());
}

#[test]
fn test_invalid_option_fails_before_output() {
    let dir = TempDir::new().unwrap();
    let (baseline, current) = write_inputs(dir.path());
    let out = dir.path().join("diff.png");

    let output = run([&baseline, &current, &out], &["--brush-width", "4"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Configuration Error"));
    assert!(!out.exists());
}

#[test]
fn test_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let (baseline, _) = write_inputs(dir.path());
    let missing = dir.path().join("missing.png");
    let out = dir.path().join("diff.png");

    let output = run([&baseline, &missing, &out], &[]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(!out.exists());
}

#[test]
fn test_config_file_and_overrides() {
    let dir = TempDir::new().unwrap();
    let (baseline, current) = write_inputs(dir.path());
    let out = dir.path().join("diff.png");
    let steps = dir.path().join("steps");
    let config = dir.path().join("uprightdiff.toml");
    std::fs::write(
        &config,
        format!(
            "[diff]\nblock_size = 8\nintermediate_dir = {:?}\n",
            steps.display().to_string()
        ),
    )
    .unwrap();

    let output = run(
        [&baseline, &current, &out],
        &["--config", config.to_str().unwrap(), "--block-size", "16", "--format", "none"],
    );

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(steps.join("postpaint.png").exists());
}

#[test]
fn test_missing_positional_is_usage_error() {
    let output = uprightdiff().arg("only-one.png").output().unwrap();
    assert!(!output.status.success());
}
