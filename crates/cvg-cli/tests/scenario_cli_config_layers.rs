use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;

/// scenario_cli_config_layers
///
/// Validates:
/// 1) `cvg config-hash` prints a stable hash line followed by canonical JSON.
/// 2) A config layer raising `alerts.high_priority_within_days` turns a
///    10-day renewal alert from MEDIUM into HIGH.
/// 3) `--strict-config` rejects unknown keys.

const REQUEST: &str = r#"{
  "today": "2024-03-01",
  "timeline": { "effectiveStartDate": "2024-01-01", "dailyRate": 10 },
  "bonds": [
    { "id": "b1", "bondType": "VNI", "status": "IN_PROGRESS",
      "coverageStart": "2024-01-01", "coverageEnd": "2024-03-11", "renewalReminderDays": 30 }
  ]
}"#;

fn alert_priority(args: &[&str]) -> String {
    let out = Command::cargo_bin("cvg").unwrap().args(args).output().unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let v: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v[0]["daysUntilExpiry"], 10);
    v[0]["priority"].as_str().unwrap().to_string()
}

#[test]
fn config_layer_changes_alert_priority() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("request.json");
    let site = dir.path().join("site.yaml");
    fs::write(&input, REQUEST).unwrap();
    fs::write(&site, "alerts:\n  high_priority_within_days: 10\n").unwrap();
    let input_s = input.to_str().unwrap();

    assert_eq!(alert_priority(&["alerts", "--input", input_s]), "MEDIUM");
    assert_eq!(
        alert_priority(&["alerts", "--input", input_s, "--config", site.to_str().unwrap()]),
        "HIGH"
    );
}

#[test]
fn config_hash_prints_hash_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.yaml");
    fs::write(&base, "synthesis:\n  open_ended_horizon_months: 1\n").unwrap();

    Command::cargo_bin("cvg")
        .unwrap()
        .args(["config-hash", base.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^config_hash=[0-9a-f]{64}\n").unwrap())
        .stdout(predicate::str::contains(r#"{"synthesis":{"open_ended_horizon_months":1}}"#));
}

#[test]
fn strict_config_rejects_unknown_keys() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("request.json");
    let bad = dir.path().join("bad.yaml");
    fs::write(&input, REQUEST).unwrap();
    fs::write(&bad, "alert:\n  high_priority_within_days: 10\n").unwrap();

    Command::cargo_bin("cvg")
        .unwrap()
        .args([
            "alerts",
            "--input",
            input.to_str().unwrap(),
            "--config",
            bad.to_str().unwrap(),
            "--strict-config",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_UNUSED_KEYS"));
}

#[test]
fn shipped_base_config_is_clean_under_strict_mode() {
    let base = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("base.yaml");
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("request.json");
    fs::write(&input, REQUEST).unwrap();

    assert_eq!(
        alert_priority(&[
            "alerts",
            "--input",
            input.to_str().unwrap(),
            "--config",
            base.to_str().unwrap(),
            "--strict-config",
        ]),
        "MEDIUM"
    );
}
