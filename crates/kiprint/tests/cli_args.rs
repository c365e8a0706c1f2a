//! Integration tests for CLI argument handling and output hygiene.
//!
//! The full automation needs Xvfb, xdotool and pcbnew, so these tests only
//! exercise the argument surface of the built binary.

use std::process::Command;

fn run_kiprint(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_kiprint"))
        .args(args)
        .output()
        .expect("Failed to execute kiprint")
}

#[test]
fn test_no_args_shows_usage_and_fails() {
    let output = run_kiprint(&[]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Usage"),
        "expected usage text on stderr, got: {}",
        stderr
    );
}

#[test]
fn test_missing_layers_fails() {
    let output = run_kiprint(&["board.kicad_pcb", "out"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("layers") || stderr.contains("Usage"));
}

#[test]
fn test_version_flag() {
    let output = run_kiprint(&["--version"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_mentions_arguments() {
    let output = run_kiprint(&["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("pcb_file"));
    assert!(stdout.contains("layers"));
    assert!(stdout.contains("--record"));
    assert!(stdout.contains("--output_name"));
}

#[test]
fn test_unknown_flag_rejected() {
    let output = run_kiprint(&["board.kicad_pcb", "out", "F.Cu", "--bogus"]);
    assert!(!output.status.success());
}

#[test]
fn test_missing_pcb_file_fails_cleanly() {
    // All arguments valid, but the board file does not exist; the run must
    // fail before any X machinery starts, with the error on stderr.
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no-such-board.kicad_pcb");
    let out_dir = dir.path().join("out");

    let output = run_kiprint(&[
        missing.to_str().unwrap(),
        out_dir.to_str().unwrap(),
        "F.Cu",
    ]);
    assert!(!output.status.success());

    // stdout stays reserved for the output path; nothing on success path ran.
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.trim().is_empty(), "unexpected stdout: {}", stdout);
}
