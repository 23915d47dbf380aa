use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("taskdeck-{nanos}-{file_name}"))
}

#[test]
fn add_command_writes_store() {
    let exe = env!("CARGO_BIN_EXE_taskdeck");
    let store_path = temp_path("cli-add.json");

    let output = Command::new(exe)
        .args([
            "add",
            "Write report",
            "--desc",
            "quarterly numbers",
            "--priority",
            "high",
            "--category",
            "work",
            "--due",
            "2099-03-01",
        ])
        .env("TASKDECK_STORE_PATH", &store_path)
        .output()
        .expect("failed to run add command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task: Write report"));

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert_eq!(stored["schema_version"], 2);
    let tasks = stored["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Write report");
    assert_eq!(tasks[0]["description"], "quarterly numbers");
    assert_eq!(tasks[0]["priority"], "high");
    assert_eq!(tasks[0]["category"], "work");
    assert_eq!(tasks[0]["due_date"], "2099-03-01");
    assert_eq!(tasks[0]["completed"], false);
    assert!(tasks[0]["id"].as_str().unwrap().starts_with("task-"));
    assert!(tasks[0]["created_at"].as_str().unwrap().contains('T'));
}

#[test]
fn add_command_json_output_defaults_to_medium_priority() {
    let exe = env!("CARGO_BIN_EXE_taskdeck");
    let store_path = temp_path("cli-add-json.json");

    let output = Command::new(exe)
        .args(["--json", "add", "demo task"])
        .env("TASKDECK_STORE_PATH", &store_path)
        .output()
        .expect("failed to run add command");

    std::fs::remove_file(&store_path).ok();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("json output");

    assert_eq!(parsed["title"], "demo task");
    assert_eq!(parsed["priority"], "medium");
    assert_eq!(parsed["completed"], false);
    assert_eq!(parsed["overdue"], false);
    assert_eq!(parsed["category"], serde_json::Value::Null);
}

#[test]
fn add_command_requires_title() {
    let exe = env!("CARGO_BIN_EXE_taskdeck");
    let store_path = temp_path("cli-add-missing-title.json");

    let output = Command::new(exe)
        .args(["add", "   "])
        .env("TASKDECK_STORE_PATH", &store_path)
        .output()
        .expect("failed to run add command");

    std::fs::remove_file(&store_path).ok();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
    assert!(stderr.contains("title is required"));
}

#[test]
fn add_command_rejects_unknown_priority() {
    let exe = env!("CARGO_BIN_EXE_taskdeck");
    let store_path = temp_path("cli-add-bad-priority.json");

    let output = Command::new(exe)
        .args(["add", "demo", "--priority", "urgent"])
        .env("TASKDECK_STORE_PATH", &store_path)
        .output()
        .expect("failed to run add command");

    std::fs::remove_file(&store_path).ok();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
    assert!(stderr.contains("priority must be high, medium, or low"));
}

#[test]
fn add_command_rejects_malformed_due_date() {
    let exe = env!("CARGO_BIN_EXE_taskdeck");
    let store_path = temp_path("cli-add-bad-due.json");

    let output = Command::new(exe)
        .args(["add", "demo", "--due", "next week"])
        .env("TASKDECK_STORE_PATH", &store_path)
        .output()
        .expect("failed to run add command");

    std::fs::remove_file(&store_path).ok();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
    assert!(stderr.contains("due date must be YYYY-MM-DD"));
}
