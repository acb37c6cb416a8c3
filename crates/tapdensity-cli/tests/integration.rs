//! Integration tests for tapdensity-cli.
//!
//! Runs the `tapdensity` binary and checks its table, JSON and file output.

use std::process::{Command, Output};

/// Helper to get the path to the `tapdensity` binary built by cargo.
fn tapdensity_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tapdensity"))
}

fn run(args: &[&str]) -> Output {
    tapdensity_bin()
        .args(args)
        .output()
        .expect("failed to run tapdensity")
}

fn run_json(args: &[&str]) -> serde_json::Value {
    let output = run(args);
    assert!(
        output.status.success(),
        "tapdensity {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ---------------------------------------------------------------------------
// compensate
// ---------------------------------------------------------------------------

#[test]
fn cli_compensate_attenuates_tight_comb() {
    let report = run_json(&["compensate", "--size", "0.1", "--taps", "64", "--json"]);

    assert_eq!(report["path"], "clustered");
    let gain = report["gain"].as_f64().unwrap();
    let base = report["base_gain"].as_f64().unwrap();
    assert!((base - 1.0 / 64.0).abs() < 1e-9);
    assert!(gain < base, "gain {gain} should be below 1/N");
    assert!(gain >= base * 0.1 - 1e-9, "gain {gain} below the floor");
    assert!(report["strategies"].is_null());
}

#[test]
fn cli_compensate_wide_comb_is_plain_average() {
    let report = run_json(&["compensate", "-s", "10", "-t", "64", "--json"]);

    assert_eq!(report["path"], "spread");
    assert_eq!(report["gain"].as_f64(), Some(1.0 / 64.0));
    assert_eq!(report["adaptive_factor"].as_f64(), Some(1.0));
}

#[test]
fn cli_compensate_table_with_strategies() {
    let output = run(&["compensate", "-s", "0.2", "-p", "quadratic", "--strategies"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("quadratic"));
    assert!(stdout.contains("Strategies"));
    assert!(stdout.contains("adaptive"));
}

#[test]
fn cli_compensate_rejects_bad_input() {
    let zero_taps = run(&["compensate", "--taps", "0"]);
    assert!(!zero_taps.status.success());

    let unknown = run(&["compensate", "--pattern", "zigzag"]);
    assert!(!unknown.status.success());
    assert!(String::from_utf8_lossy(&unknown.stderr).contains("zigzag"));

    let over_limit = run(&["compensate", "--taps", "32", "--max-taps", "16"]);
    assert!(!over_limit.status.success());
}

// ---------------------------------------------------------------------------
// groups
// ---------------------------------------------------------------------------

#[test]
fn cli_groups_partition_all_taps() {
    let report = run_json(&["groups", "-s", "0.1", "-t", "16", "--json"]);

    let groups = report["groups"].as_array().unwrap();
    assert_eq!(groups.len() as u64, report["unique_positions"].as_u64().unwrap());

    let total: usize = groups
        .iter()
        .map(|g| g["taps"].as_array().unwrap().len())
        .sum();
    assert_eq!(total, 16);
}

#[test]
fn cli_groups_writes_matrix() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("matrix.csv");

    let output = run(&["groups", "-t", "8", "--matrix", path.to_str().unwrap()]);
    assert!(output.status.success());

    let csv = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 9);
    assert_eq!(lines[0], "tap,0,1,2,3,4,5,6,7");
}

// ---------------------------------------------------------------------------
// recommend / sweep
// ---------------------------------------------------------------------------

#[test]
fn cli_recommend_limits_short_combs() {
    let rows = run_json(&[
        "recommend",
        "--sizes",
        "0.1,10",
        "--sample-rate",
        "44100",
        "--json",
    ]);
    let rows = rows.as_array().unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["spacing_limit"], 4);
    assert!(rows[0]["recommended"].as_u64().unwrap() < 64);
    assert_eq!(rows[1]["recommended"], 64);
}

#[test]
fn cli_recommend_honours_engine_tap_limit() {
    let rows = run_json(&["recommend", "--sizes", "0.5,10", "--max-taps", "16", "--json"]);
    let rows = rows.as_array().unwrap();

    for row in rows {
        assert!(row["spacing_limit"].as_u64().unwrap() <= 16, "{row}");
        assert!(row["clustering_limit"].as_u64().unwrap() <= 16, "{row}");
    }
    assert_eq!(rows[1]["recommended"], 16);
}

#[test]
fn cli_sweep_exports_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweep.csv");

    let output = run(&[
        "sweep",
        "--min",
        "0.05",
        "--max",
        "10",
        "--steps",
        "6",
        "--boundary",
        "--output",
        path.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Worst threshold step"));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Worst over all patterns"));

    let csv = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 7);
    assert!(lines[0].starts_with("comb_size_ms,taps,pattern"));
    assert!(lines[1].ends_with("clustered"));
    assert!(lines[6].ends_with("spread"));
}

#[test]
fn cli_sweep_boundary_reports_worst_pattern() {
    let report = run_json(&["sweep", "--steps", "2", "--boundary", "--json"]);

    let own = report["boundary"]["step_db"].as_f64().unwrap();
    assert!((0.0..1.5).contains(&own), "linear step {own} dB");

    let all = &report["boundary_all_patterns"];
    assert_eq!(all["pattern"], 1, "logarithmic taps step the most");
    let worst = all["step_db"].as_f64().unwrap();
    assert!(worst > own && worst < 3.5, "worst step {worst} dB");
}

#[test]
fn cli_sweep_rejects_inverted_range() {
    let output = run(&["sweep", "--min", "5", "--max", "1"]);
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// scenarios / config
// ---------------------------------------------------------------------------

#[test]
fn cli_scenarios_lists_factory_set() {
    let output = run(&["scenarios"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in tapdensity_names() {
        assert!(stdout.contains(name), "scenarios should list '{name}'");
    }
}

#[test]
fn cli_scenarios_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenarios.toml");

    let export = run(&["scenarios", "--export", path.to_str().unwrap()]);
    assert!(export.status.success());
    assert!(path.exists());

    let reports = run_json(&[
        "scenarios",
        "--file",
        path.to_str().unwrap(),
        "--name",
        "very_large_delay",
        "--json",
    ]);
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["path"], "spread");

    let missing = run(&["scenarios", "--name", "nonexistent"]);
    assert!(!missing.status.success());
}

#[test]
fn cli_config_written_file_drives_engine() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.toml");

    let written = run(&[
        "config",
        "--sample-rate",
        "96000",
        "--max-taps",
        "32",
        "--write",
        path.to_str().unwrap(),
    ]);
    assert!(written.status.success());

    let report = run_json(&[
        "compensate",
        "--config",
        path.to_str().unwrap(),
        "--taps",
        "32",
        "--json",
    ]);
    assert_eq!(report["sample_rate"].as_f64(), Some(96000.0));
    assert_eq!(report["taps"], 32);
}

#[test]
fn cli_config_prints_defaults() {
    let output = run(&["config"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sample_rate = 48000"));
    assert!(stdout.contains("max_taps = 64"));
}

fn tapdensity_names() -> [&'static str; 6] {
    [
        "tight_linear",
        "tight_quadratic",
        "moderate_log",
        "borderline_linear",
        "large_delay",
        "very_large_delay",
    ]
}
