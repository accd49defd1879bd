//! Integration tests for the ssimdiff CLI.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use image::{Rgb, RgbImage};

fn ssimdiff_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ssimdiff"))
}

fn run(args: &[&str]) -> Output {
    Command::new(ssimdiff_bin())
        .args(args)
        .output()
        .expect("Failed to run ssimdiff")
}

/// Create a 16x16 PNG file with a solid color.
fn create_solid_png(path: &Path, r: u8, g: u8, b: u8) {
    RgbImage::from_pixel(16, 16, Rgb([r, g, b]))
        .save(path)
        .expect("Failed to write PNG");
}

/// Create temp directory for test files.
fn temp_dir() -> PathBuf {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("ssimdiff-cli-test-{}-{}", std::process::id(), id));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("Failed to create temp dir");
    dir
}

fn s(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_identical_images() {
    let dir = temp_dir();
    let img1 = dir.join("img1.png");
    let img2 = dir.join("img2.png");
    create_solid_png(&img1, 128, 128, 128);
    create_solid_png(&img2, 128, 128, 128);

    let output = run(&["--color=never", s(&img1), s(&img2)]);
    assert!(output.status.success(), "Exit code should be 0");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Are images identical: true"));
    assert!(stdout.contains("Similarity score: 100.00%"));
    assert!(stdout.contains("Difference percentage: 0.00%"));
    assert!(stdout.contains("Resized to common shape: (16, 16, 3)"));
    assert!(stdout.contains("Rating: identical"));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_different_images() {
    let dir = temp_dir();
    let img1 = dir.join("black.png");
    let img2 = dir.join("white.png");
    create_solid_png(&img1, 0, 0, 0);
    create_solid_png(&img2, 255, 255, 255);

    let output = run(&["--color=never", s(&img1), s(&img2)]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Are images identical: false"));
    assert!(stdout.contains("Rating: very different"));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_quiet_mode() {
    let dir = temp_dir();
    let img1 = dir.join("img1.png");
    let img2 = dir.join("img2.png");
    create_solid_png(&img1, 100, 100, 100);
    create_solid_png(&img2, 100, 100, 100);

    let output = run(&["-q", s(&img1), s(&img2)]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let score: f64 = stdout.trim().parse().expect("Should output just a number");
    assert_eq!(score, 1.0);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_min_score_pass() {
    let dir = temp_dir();
    let img1 = dir.join("img1.png");
    let img2 = dir.join("img2.png");
    create_solid_png(&img1, 128, 128, 128);
    create_solid_png(&img2, 128, 128, 128);

    let output = run(&["--min-score", "99", "--color=never", s(&img1), s(&img2)]);
    assert!(output.status.success(), "Should pass when similarity >= min-score");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Threshold passed"));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_min_score_fail() {
    let dir = temp_dir();
    let img1 = dir.join("black.png");
    let img2 = dir.join("white.png");
    create_solid_png(&img1, 0, 0, 0);
    create_solid_png(&img2, 255, 255, 255);

    let output = run(&["--min-score", "50", s(&img1), s(&img2)]);
    assert_eq!(
        output.status.code(),
        Some(1),
        "Should exit with code 1 when similarity < min-score"
    );

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_json_output() {
    let dir = temp_dir();
    let img1 = dir.join("img1.png");
    let img2 = dir.join("img2.png");
    create_solid_png(&img1, 128, 128, 128);
    create_solid_png(&img2, 128, 128, 128);

    let output = run(&["--format", "json", s(&img1), s(&img2)]);
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(json["identical"], true);
    assert_eq!(json["similarity_score"], 1.0);
    assert_eq!(json["common_shape"]["width"], 16);
    assert_eq!(json["image_1"], s(&img1));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_csv_output() {
    let dir = temp_dir();
    let img1 = dir.join("img1.png");
    let img2 = dir.join("img2.png");
    create_solid_png(&img1, 10, 20, 30);
    create_solid_png(&img2, 10, 20, 30);

    let output = run(&["--format", "csv", s(&img1), s(&img2)]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("image_1,image_2,identical,"));
    assert!(lines[1].contains(",true,"));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_missing_file() {
    let output = run(&["nonexistent1.png", "nonexistent2.png"]);
    assert_eq!(output.status.code(), Some(2), "Should exit with code 2 on error");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"), "Should print error message");
    assert!(stderr.contains("[load]"), "Should name the stage");
    assert!(stderr.contains("nonexistent1.png"), "Should name the path");
}

#[test]
fn test_invalid_window() {
    let dir = temp_dir();
    let img1 = dir.join("img1.png");
    create_solid_png(&img1, 1, 2, 3);

    let output = run(&["--window", "4", s(&img1), s(&img1)]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[params]"));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_save_diff_and_composite() {
    let dir = temp_dir();
    let img1 = dir.join("img1.png");
    let img2 = dir.join("img2.png");
    create_solid_png(&img1, 200, 0, 0);
    create_solid_png(&img2, 0, 0, 200);
    let diff = dir.join("out/nested/diff.png");
    let composite = dir.join("out/pair.png");

    let output = run(&[
        "--save-diff",
        "-o",
        s(&diff),
        "--composite",
        s(&composite),
        s(&img1),
        s(&img2),
    ]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Difference image saved to:"));

    let saved = image::open(&diff).expect("diff should be a PNG");
    assert_eq!((saved.width(), saved.height()), (16, 16));
    let saved = image::open(&composite).expect("composite should be a PNG");
    assert_eq!((saved.width(), saved.height()), (36, 16));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_report_file() {
    let dir = temp_dir();
    let img1 = dir.join("img1.png");
    create_solid_png(&img1, 5, 5, 5);
    let json_report = dir.join("report.json");
    let kv_report = dir.join("report.txt");

    let output = run(&["-q", "--report", s(&json_report), s(&img1), s(&img1)]);
    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_report).unwrap()).unwrap();
    assert_eq!(json["identical"], true);

    let output = run(&["-q", "--report", s(&kv_report), s(&img1), s(&img1)]);
    assert!(output.status.success());
    let text = fs::read_to_string(&kv_report).unwrap();
    assert!(text.contains("similarity_percentage=100.00\n"));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_batch_mode() {
    let dir = temp_dir();
    let dir1 = dir.join("first");
    let dir2 = dir.join("second");
    let out = dir.join("diffs");
    fs::create_dir_all(&dir1).unwrap();
    fs::create_dir_all(&dir2).unwrap();

    create_solid_png(&dir1.join("a.png"), 100, 100, 100);
    create_solid_png(&dir2.join("a.png"), 100, 100, 100);
    create_solid_png(&dir1.join("b.png"), 50, 50, 50);
    create_solid_png(&dir2.join("b.png"), 60, 60, 60);

    let output = run(&[
        "batch",
        "--color=never",
        "--output-dir",
        s(&out),
        s(&dir1),
        s(&dir2),
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("a.png"), "Should list a.png");
    assert!(stdout.contains("b.png"), "Should list b.png");
    assert!(stdout.contains("Batch Comparison Summary"), "Should show summary");
    assert!(stdout.contains("Successful comparisons: 2"));
    assert!(out.join("diff_pair_1.png").is_file());
    assert!(out.join("diff_pair_2.png").is_file());

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_batch_failing_pair_does_not_stop_run() {
    let dir = temp_dir();
    let dir1 = dir.join("first");
    let dir2 = dir.join("second");
    let out = dir.join("diffs");
    fs::create_dir_all(&dir1).unwrap();
    fs::create_dir_all(&dir2).unwrap();

    create_solid_png(&dir1.join("a.png"), 100, 100, 100);
    create_solid_png(&dir2.join("a.png"), 100, 100, 100);
    create_solid_png(&dir1.join("b.png"), 100, 100, 100);
    fs::write(dir2.join("b.png"), b"not an image").unwrap();
    create_solid_png(&dir1.join("c.png"), 100, 100, 100);
    create_solid_png(&dir2.join("c.png"), 90, 90, 90);

    let output = run(&[
        "batch",
        "--color=never",
        "--output-dir",
        s(&out),
        s(&dir1),
        s(&dir2),
    ]);
    assert_eq!(output.status.code(), Some(2));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ERROR [load]"));
    assert!(stdout.contains("Successful comparisons: 2"));
    assert!(stdout.contains("Failed comparisons: 1"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("b.png"));

    assert!(out.join("diff_pair_1.png").is_file());
    assert!(!out.join("diff_pair_2.png").exists());
    assert!(out.join("diff_pair_3.png").is_file());

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_batch_pair_by_order_json() {
    let dir = temp_dir();
    let dir1 = dir.join("first");
    let dir2 = dir.join("second");
    fs::create_dir_all(&dir1).unwrap();
    fs::create_dir_all(&dir2).unwrap();

    create_solid_png(&dir1.join("one.png"), 10, 10, 10);
    create_solid_png(&dir2.join("uno.png"), 10, 10, 10);
    create_solid_png(&dir2.join("zwei.png"), 10, 10, 10);

    let output = run(&[
        "batch",
        "--pair-by",
        "order",
        "--no-diffs",
        "--format",
        "json",
        "--output-dir",
        s(&dir.join("diffs")),
        s(&dir1),
        s(&dir2),
    ]);
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(json["summary"]["total"], 1);
    assert_eq!(json["results"][0]["identical"], true);
    assert!(json["results"][0]["image_2"].as_str().unwrap().ends_with("uno.png"));
    assert!(!dir.join("diffs").exists(), "--no-diffs should write nothing");

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_batch_without_matches() {
    let dir = temp_dir();
    let dir1 = dir.join("first");
    let dir2 = dir.join("second");
    fs::create_dir_all(&dir1).unwrap();
    fs::create_dir_all(&dir2).unwrap();
    create_solid_png(&dir1.join("a.png"), 1, 1, 1);

    let output = run(&["batch", "--color=never", s(&dir1), s(&dir2)]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: no matching image files found"), "{stderr}");
    assert!(!stderr.contains("warning"));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_batch_pairs_by_order_by_default() {
    let dir = temp_dir();
    let dir1 = dir.join("first");
    let dir2 = dir.join("second");
    fs::create_dir_all(&dir1).unwrap();
    fs::create_dir_all(&dir2).unwrap();

    create_solid_png(&dir1.join("before_1.png"), 10, 10, 10);
    create_solid_png(&dir1.join("before_2.png"), 20, 20, 20);
    create_solid_png(&dir2.join("after_1.png"), 10, 10, 10);
    create_solid_png(&dir2.join("after_2.png"), 20, 20, 20);
    create_solid_png(&dir2.join("after_3.png"), 30, 30, 30);

    let output = run(&[
        "batch",
        "--no-diffs",
        "--format",
        "json",
        s(&dir1),
        s(&dir2),
    ]);
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(json["summary"]["total"], 2);
    assert!(json["results"][0]["image_1"].as_str().unwrap().ends_with("before_1.png"));
    assert!(json["results"][0]["image_2"].as_str().unwrap().ends_with("after_1.png"));
    assert!(json["results"][1]["image_2"].as_str().unwrap().ends_with("after_2.png"));
    assert_eq!(json["results"][1]["identical"], true);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_batch_announces_saved_diffs() {
    let dir = temp_dir();
    let dir1 = dir.join("first");
    let dir2 = dir.join("second");
    let out = dir.join("diffs");
    fs::create_dir_all(&dir1).unwrap();
    fs::create_dir_all(&dir2).unwrap();
    create_solid_png(&dir1.join("a.png"), 100, 100, 100);
    create_solid_png(&dir2.join("a.png"), 120, 120, 120);

    let output = run(&["batch", "--output-dir", s(&out), s(&dir1), s(&dir2)]);
    assert!(output.status.success());
    let saved = out.join("diff_pair_1.png");
    assert!(saved.is_file());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains(&format!("Saved diff for pair 1: {}", saved.display())),
        "{stderr}"
    );

    // Quiet mode still writes the file but says nothing
    fs::remove_dir_all(&out).ok();
    let output = run(&["batch", "-q", "--output-dir", s(&out), s(&dir1), s(&dir2)]);
    assert!(output.status.success());
    assert!(saved.is_file());
    assert!(!String::from_utf8_lossy(&output.stderr).contains("Saved diff"));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_batch_by_name_logs_unmatched_files() {
    let dir = temp_dir();
    let dir1 = dir.join("first");
    let dir2 = dir.join("second");
    fs::create_dir_all(&dir1).unwrap();
    fs::create_dir_all(&dir2).unwrap();
    create_solid_png(&dir1.join("kept.png"), 5, 5, 5);
    create_solid_png(&dir1.join("lonely.png"), 5, 5, 5);
    create_solid_png(&dir2.join("kept.png"), 5, 5, 5);

    let output = Command::new(ssimdiff_bin())
        .env("RUST_LOG", "warn")
        .args(["batch", "--pair-by", "name", "--no-diffs", s(&dir1), s(&dir2)])
        .output()
        .expect("Failed to run ssimdiff");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Successful comparisons: 1"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("lonely.png"), "{stderr}");
    assert!(stderr.contains("no counterpart"), "{stderr}");

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_composite_without_save_diff() {
    let dir = temp_dir();
    let img1 = dir.join("img1.png");
    let img2 = dir.join("img2.png");
    let diff = dir.join("diff.png");
    let composite = dir.join("both.png");
    create_solid_png(&img1, 0, 0, 0);
    create_solid_png(&img2, 255, 255, 255);

    let output = run(&[
        "-o",
        s(&diff),
        "--composite",
        s(&composite),
        s(&img1),
        s(&img2),
    ]);
    assert!(output.status.success());
    assert!(composite.is_file());
    assert!(!diff.exists(), "no --save-diff, no difference image");

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_version() {
    let output = run(&["--version"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ssimdiff"), "Should show name");
    assert!(stdout.contains("0."), "Should show version");
}

#[test]
fn test_help() {
    let output = run(&["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("IMAGE1"), "Should show IMAGE1 arg");
    assert!(stdout.contains("IMAGE2"), "Should show IMAGE2 arg");
    assert!(stdout.contains("--min-score"), "Should show --min-score");
    assert!(stdout.contains("batch"), "Should show batch subcommand");
}
