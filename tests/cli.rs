use std::process::{Command, Output};

fn run_cli(args: &[&str]) -> Output {
    let binary = env!("CARGO_BIN_EXE_mlfq_model");
    Command::new(binary)
        .args(args)
        .output()
        .expect("failed to run mlfq_model binary")
}

#[test]
fn quiet_run_prints_summary_table() {
    let output = run_cli(&["--seed", "7", "--quiet"]);
    assert!(
        output.status.success(),
        "cli failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("SIMULATION STATISTICS"), "stdout: {stdout}");
    assert!(stdout.contains("- completed: "), "stdout: {stdout}");
    assert!(!stdout.contains("SIMULATION START"), "stdout: {stdout}");
}

#[test]
fn event_log_and_banner_are_printed_by_default() {
    let output = run_cli(&["--seed", "7", "--processes", "2"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("- seed: 7"), "stdout: {stdout}");
    assert!(stdout.lines().any(|line| line.starts_with("t=   0 ")), "stdout: {stdout}");
}

#[test]
fn json_report_is_machine_readable() {
    let output = run_cli(&["--seed", "7", "--json", "--processes", "3"]);
    assert!(
        output.status.success(),
        "cli failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be a JSON report");
    assert_eq!(report["process_count"], 3);
    assert_eq!(report["processes"].as_array().map(Vec::len), Some(3));
    assert_eq!(report["config"]["process_count"], 3);
    assert!(report["total_ticks"].as_u64().is_some_and(|t| t > 0));
}

#[test]
fn same_seed_gives_same_report() {
    let first = run_cli(&["--seed", "11", "--json"]);
    let second = run_cli(&["--seed", "11", "--json"]);
    assert!(first.status.success() && second.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn invalid_probability_exits_with_error() {
    let output = run_cli(&["--io-probability", "2", "--quiet"]);
    assert!(!output.status.success());
    assert!(!output.stderr.is_empty());
}
