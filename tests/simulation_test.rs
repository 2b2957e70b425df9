use std::process::{Command, Output};

fn run_binary(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_traffic_jam"))
        .args(args)
        .env("RUST_LOG", "warn,traffic_jam=info")
        .output()
        .expect("Failed to execute simulation")
}

/// Test that the simulation runs headless without crashing
#[test]
fn test_headless_simulation_runs() {
    let output = run_binary(&["--steps", "50", "--display", "none"]);

    assert!(
        output.status.success(),
        "Simulation failed to run. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("SIMULATION COMPLETE"),
        "Simulation did not complete properly. stderr: {}",
        stderr
    );
}

/// Test that run statistics are logged
#[test]
fn test_simulation_statistics_logged() {
    let output = run_binary(&["--preset", "d91", "--display", "none"]);
    assert!(output.status.success(), "Simulation failed to run");

    let stderr = String::from_utf8_lossy(&output.stderr);
    for key in [
        "Steps observed:",
        "Mean velocity:",
        "Mean flow:",
        "Peak stopped vehicles:",
        "Largest jam:",
    ] {
        assert!(stderr.contains(key), "Missing '{}' statistic", key);
    }

    let steps_line = stderr
        .lines()
        .find(|line| line.contains("Steps observed:"))
        .expect("Could not find 'Steps observed' line");
    let parts: Vec<&str> = steps_line.split("Steps observed:").collect();
    let observed: u64 = parts
        .get(1)
        .and_then(|s| s.trim().parse().ok())
        .expect("Could not parse observed steps");

    // Initial state plus the 500 steps of the preset
    assert_eq!(observed, 501);
}

/// Test that every step is printed as a strip
#[test]
fn test_strip_frames_printed() {
    let output = run_binary(&["-l", "20", "-n", "5", "--steps", "3", "--display", "strip"]);
    assert!(output.status.success(), "Simulation failed to run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    for step in 0..=3 {
        assert!(
            stdout.contains(&format!("step {}", step)),
            "Missing frame for step {}",
            step
        );
    }
    // Even placement with zero velocities on 20 cells
    assert!(stdout.contains("0...0...0...0...0..."));
}

/// Test that an impossible road is rejected
#[test]
fn test_invalid_configuration_fails() {
    let output = run_binary(&["-l", "10", "-n", "11", "--display", "none"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid configuration"),
        "Unexpected stderr: {}",
        stderr
    );
}

/// Test that presets start from alternating cells with rolling cars
#[test]
fn test_preset_starts_alternating() {
    let output = run_binary(&["--preset", "d91", "--display", "strip"]);
    assert!(output.status.success(), "Simulation failed to run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let first_strip = stdout.lines().nth(1).expect("Missing strip for step 0");
    assert_eq!(first_strip.chars().count(), 100);
    for (cell, symbol) in first_strip.chars().enumerate() {
        if cell % 2 == 1 && cell < 70 {
            assert!(matches!(symbol, '1'..='3'), "cell {} is '{}'", cell, symbol);
        } else {
            assert_eq!(symbol, '.', "cell {} should be empty", cell);
        }
    }
}

/// Test that the larger preset runs to completion
#[test]
fn test_second_preset_runs() {
    let output = run_binary(&["--preset", "d77", "--display", "none"]);
    assert!(output.status.success(), "Simulation failed to run");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("SIMULATION COMPLETE"));
}

/// Test that an alternating start that cannot fit is rejected
#[test]
fn test_alternate_placement_too_crowded_fails() {
    let output = run_binary(&["-l", "10", "-n", "6", "--placement", "alternate"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("alternate placement"),
        "Unexpected stderr: {}",
        stderr
    );
}

/// Test that the scrolling strip only shows the occupied stretch of road
#[test]
fn test_scrolling_frames_cropped() {
    let args = ["-l", "40", "-n", "3", "--placement", "alternate", "--steps", "0"];
    let output = run_binary(&[&args[..], &["--display", "scrolling"]].concat());
    assert!(output.status.success(), "Simulation failed to run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    // Cars on cells 1, 3 and 5, window from cell 0 to cell 7
    assert_eq!(stdout.lines().nth(1), Some(".0.0.0.."));
}
