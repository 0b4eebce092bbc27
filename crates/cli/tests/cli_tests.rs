//! CLI integration tests

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const SMALL_FORM: &str = r#"{
    "workloadTitle": "cli-test",
    "workloadSeed": 7,
    "sessions": [
        {
            "id": "session-a",
            "start_tick": 1,
            "stop_tick": 6,
            "trainings": [
                {"start_tick": 2, "duration_in_ticks": 2, "cpus": 10, "memory": 256, "vram": 0,
                 "gpu_utilizations": [{"utilization": 50}]}
            ]
        }
    ]
}"#;

const CATALOG: &str = r#"
- display_name: Small Demo
  key: small
  filepath: small.json
  num_sessions: 1
  num_training_events: 1
- display_name: Production Trace
  key: trace
  filepath: /srv/templates/trace.json
  num_sessions: 4000
  num_training_events: 120000
  large: true
"#;

/// Run the binary with an isolated home directory
fn wlt(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wlt"))
        .args(args)
        .env("HOME", home)
        .env_remove("WLT_API_URL")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write fixture");
    path.to_string_lossy().into_owned()
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    let output = wlt(dir.path(), &["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    for command in ["validate", "summary", "register", "defaults", "randomize", "templates"] {
        assert!(stdout.contains(command), "Should show {} command", command);
    }
}

/// Test that a valid template passes validation
#[test]
fn test_validate_valid_template() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "form.json", SMALL_FORM);

    let output = wlt(dir.path(), &["validate", &file]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Validation should succeed");
    assert!(stdout.contains("fields valid"), "{}", stdout);
}

/// Test that invalid fields fail validation and are listed
#[test]
fn test_validate_reports_errors() {
    let dir = TempDir::new().unwrap();
    let form = SMALL_FORM.replace("\"start_tick\": 2", "\"start_tick\": 5");
    let file = write(dir.path(), "form.json", &form);

    let output = wlt(dir.path(), &["--format", "json", "validate", &file]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(!output.status.success(), "Validation should fail");
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("JSON report");
    let failing: Vec<&str> = report["fields"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|f| f["validity"] == "error")
        .map(|f| f["path"].as_str().unwrap())
        .collect();
    assert!(failing.contains(&"sessions.0.trainings.0.start_tick"));
}

/// Test that malformed documents are rejected
#[test]
fn test_validate_malformed_json() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "broken.json", "{\"sessions\": [");

    let output = wlt(dir.path(), &["validate", &file]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Failed to import"), "{}", stderr);
}

/// Test that register writes the derived envelope
#[test]
fn test_register_writes_envelope() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "form.json", SMALL_FORM);
    let out = dir.path().join("envelope.json");
    let msg_id = "5f1c4a8e-3b7d-4c2a-9e61-0d8f2b7a9c10";

    let output = wlt(
        dir.path(),
        &["register", &file, "--msg-id", msg_id, "--output", out.to_str().unwrap()],
    );
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let envelope: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(envelope["op"], "register_workload");
    assert_eq!(envelope["msg_id"], msg_id);

    let request = &envelope["workload_registration_request"];
    assert_eq!(request["name"], "cli-test");
    assert_eq!(request["seed"], 7);
    let max = &request["sessions"][0]["max_resource_request"];
    assert_eq!(max["cpus"], 10.0);
    assert_eq!(max["memory"], 256.0);
    assert_eq!(max["gpus"], 1);
    assert_eq!(max["gpu_type"], "ANY_GPU");
}

/// Test that a large catalog template registers without sessions
#[test]
fn test_register_large_template_from_catalog() {
    let dir = TempDir::new().unwrap();
    let catalog = write(dir.path(), "catalog.yaml", CATALOG);

    let output = wlt(
        dir.path(),
        &["--catalog", &catalog, "register", "--template", "trace"],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let envelope: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    let request = &envelope["workload_registration_request"];
    assert_eq!(request["sessions"], serde_json::json!([]));
    assert_eq!(request["template_file_path"], "/srv/templates/trace.json");
}

/// Test listing a local catalog as JSON
#[test]
fn test_templates_list_local_catalog() {
    let dir = TempDir::new().unwrap();
    let catalog = write(dir.path(), "catalog.yaml", CATALOG);

    let output = wlt(
        dir.path(),
        &["--catalog", &catalog, "--format", "json", "templates", "list"],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 2);
    assert_eq!(rows[1]["key"], "trace");
    assert_eq!(rows[1]["large"], true);
}

/// Test that defaults writes a timestamped file into a directory
#[test]
fn test_defaults_into_directory() {
    let dir = TempDir::new().unwrap();
    let out_dir = dir.path().join("out");
    std::fs::create_dir(&out_dir).unwrap();

    let output = wlt(dir.path(), &["defaults", "--output", out_dir.to_str().unwrap()]);
    assert!(output.status.success());

    let entries: Vec<_> = std::fs::read_dir(&out_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].starts_with("template-") && entries[0].ends_with(".json"));

    let text = std::fs::read_to_string(out_dir.join(&entries[0])).unwrap();
    assert!(text.starts_with("{\n    \"workloadTitle\""));
}

/// Test that randomize keeps values within range
#[test]
fn test_randomize_training() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "form.json", SMALL_FORM);

    let output = wlt(
        dir.path(),
        &["randomize", &file, "--session", "0", "--training", "0"],
    );
    assert!(output.status.success());

    let form: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap();
    let training = &form["sessions"][0]["trainings"][0];
    let gpus = training["gpus"].as_i64().unwrap();
    assert!((1..=8).contains(&gpus));
    assert_eq!(
        training["gpu_utilizations"].as_array().unwrap().len() as i64,
        gpus
    );
    assert!(training["cpus"].as_f64().unwrap() <= 100.0);
}
