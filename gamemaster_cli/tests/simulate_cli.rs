//! Integration tests for the simulator binary.

use std::process::{Command, Output};

fn gamemaster(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gamemaster"))
        .args(args)
        .env_remove("DATABASE_URL")
        .env_remove("GAMEMASTER_SEEDING")
        .env_remove("GAMEMASTER_SEED")
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to run gamemaster binary")
}

#[test]
fn test_help() {
    let output = gamemaster(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("gamemaster simulate"));
}

#[test]
fn test_simulate_each_mode() {
    for mode in ["single", "double", "ladder"] {
        let output = gamemaster(&[
            "simulate",
            "--mode",
            mode,
            "--participants",
            "6",
            "--seed",
            "99",
        ]);
        assert!(
            output.status.success(),
            "{mode}: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Champion:"), "{mode}: {stdout}");
    }
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let args = [
        "simulate",
        "--mode",
        "double",
        "--participants",
        "9",
        "--seed",
        "5",
    ];
    let first = gamemaster(&args);
    let second = gamemaster(&args);
    assert!(first.status.success());

    // Tournament IDs differ between runs, so compare the match lines only
    let matches = |output: &Output| -> Vec<String> {
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| line.trim_start().starts_with("match"))
            .map(str::to_string)
            .collect()
    };
    assert!(!matches(&first).is_empty());
    assert_eq!(matches(&first), matches(&second));
}

#[test]
fn test_rejects_bad_input() {
    let output = gamemaster(&["simulate", "--mode", "swiss"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("swiss"));

    let output = gamemaster(&["simulate", "--participants", "1"]);
    assert!(!output.status.success());

    let output = gamemaster(&["tally"]);
    assert!(!output.status.success());
}
