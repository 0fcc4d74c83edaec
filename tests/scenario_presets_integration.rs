//! Runs the binary against each preset and the bundled TOML scenario.

mod common;

use std::process::Command;

fn run(args: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_pv-station-sim"))
        .args(args)
        .env("PV_STATION_LOG", "warn")
        .output()
        .expect("pv-station-sim process should run");

    assert!(
        output.status.success(),
        "run failed for {args:?}: stderr={} ",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout should be valid UTF-8")
}

fn parse_total_kw(stdout: &str) -> f64 {
    let line = stdout
        .lines()
        .find(|line| line.starts_with("station total"))
        .unwrap_or_else(|| panic!("missing total line in output: {stdout}"));
    let numeric = line
        .trim_start_matches("station total")
        .trim()
        .strip_suffix("kW")
        .unwrap_or_else(|| panic!("invalid total line `{line}`"))
        .trim();
    numeric
        .parse::<f64>()
        .unwrap_or_else(|_| panic!("failed parsing `{numeric}` from `{line}`"))
}

#[test]
fn presets_run_via_cli_and_differ() {
    let baseline = run(&["--preset", "baseline", "--seed", "42"]);
    let clean = run(&["--preset", "clean", "--seed", "42"]);
    let stress = run(&["--preset", "stress", "--seed", "42"]);

    for out in [&baseline, &clean, &stress] {
        assert!(out.contains("Z-01"));
        assert!(out.contains("INV-04-02"));
    }

    // scripted faults take whole strings offline in baseline
    assert!(parse_total_kw(&clean) > parse_total_kw(&baseline));
    assert!(parse_total_kw(&baseline) > parse_total_kw(&stress));
}

#[test]
fn same_seed_same_output() {
    let a = run(&["--preset", "stress", "--seed", "7"]);
    let b = run(&["--preset", "stress", "--seed", "7"]);
    assert_eq!(a, b);
}

#[test]
fn json_output_is_parseable() {
    let out = run(&["--preset", "baseline", "--seed", "3", "--json"]);
    let json: serde_json::Value = serde_json::from_str(&out).expect("stdout should be JSON");
    assert_eq!(json["seed"], 3);
    assert_eq!(json["fields"].as_array().map(Vec::len), Some(4));
    assert!(json["sensors"].as_array().is_some_and(|s| !s.is_empty()));
}

#[test]
fn toml_scenario_and_csv_export() {
    let dir = std::env::temp_dir().join(format!("pv-station-sim-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let csv_path = dir.join("panels.csv");
    let scenario = common::scenario_path("two_fields.toml");

    let out = run(&[
        "--config",
        scenario.to_str().expect("utf-8 path"),
        "--panels-out",
        csv_path.to_str().expect("utf-8 path"),
    ]);
    assert!(out.contains("Carport East"));

    let csv = std::fs::read_to_string(&csv_path).expect("csv written");
    // header + 66 + 43 panels
    assert_eq!(csv.lines().count(), 1 + 66 + 43);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn unknown_preset_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_pv-station-sim"))
        .args(["--preset", "nope"])
        .output()
        .expect("pv-station-sim process should run");
    assert!(!output.status.success());
}
