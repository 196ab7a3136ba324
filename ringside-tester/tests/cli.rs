use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "ringside-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_writes_json_report_for_every_pair() {
    let exe = env!("CARGO_BIN_EXE_ringside-tester");
    let output_path = temp_path("json");
    let output = Command::new(exe)
        .args([
            "--seeds",
            "1,2",
            "--policies",
            "counter,idle",
            "--duration-ms",
            "15000",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Ringside Bout Simulator"));

    let content = std::fs::read_to_string(output_path).expect("read output");
    let value: serde_json::Value = serde_json::from_str(&content).expect("json report");
    let records = value["records"].as_array().expect("records");
    assert_eq!(records.len(), 4);
    assert_eq!(records[0]["policy"], "counter");
    assert_eq!(value["aggregates"].as_array().expect("aggregates").len(), 2);
}

#[test]
fn cli_determinism_check_passes() {
    let exe = env!("CARGO_BIN_EXE_ringside-tester");
    let output_path = temp_path("determinism");
    let status = Command::new(exe)
        .args([
            "--seeds",
            "0x2a",
            "--policies",
            "all",
            "--duration-ms",
            "10000",
            "--report",
            "markdown",
            "--check-determinism",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("# Ringside Bout Results"));
    assert!(!content.contains("Determinism failures"));
}

#[test]
fn cli_rejects_unknown_policy() {
    let exe = env!("CARGO_BIN_EXE_ringside-tester");
    let output = Command::new(exe)
        .args(["--policies", "turtle"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown policy"));
}

#[test]
fn cli_rejects_invalid_roster() {
    let exe = env!("CARGO_BIN_EXE_ringside-tester");
    let roster_path = temp_path("roster");
    std::fs::write(&roster_path, "{\"profiles\": []}").expect("write roster");
    let output = Command::new(exe)
        .arg("--roster")
        .arg(&roster_path)
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid roster"));
}
