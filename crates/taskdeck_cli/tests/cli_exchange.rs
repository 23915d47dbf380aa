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

fn write_store(path: &PathBuf, tasks: serde_json::Value) {
    let content = serde_json::json!({
        "schema_version": 2,
        "tasks": tasks,
        "history": [],
        "dark_mode": false
    });
    std::fs::write(path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

fn seed_tasks() -> serde_json::Value {
    serde_json::json!([
        {
            "id": "task-1",
            "title": "finished chore",
            "description": "already done",
            "priority": "low",
            "category": "home",
            "due_date": null,
            "completed": true,
            "created_at": "2026-01-01T00:00:00Z"
        },
        {
            "id": "task-2",
            "title": "open chore",
            "description": "still pending",
            "priority": "high",
            "category": "work",
            "due_date": "2026-03-01",
            "completed": false,
            "created_at": "2026-01-02T00:00:00Z"
        }
    ])
}

#[test]
fn export_command_writes_default_json_file() {
    let exe = env!("CARGO_BIN_EXE_taskdeck");
    let store_path = temp_path("cli-export.json");
    let work_dir = temp_path("cli-export-dir");
    std::fs::create_dir_all(&work_dir).unwrap();
    write_store(&store_path, seed_tasks());

    let output = Command::new(exe)
        .args(["export"])
        .current_dir(&work_dir)
        .env("TASKDECK_STORE_PATH", &store_path)
        .output()
        .expect("failed to run export command");

    let exported = std::fs::read_to_string(work_dir.join("tasks-export.json")).unwrap();
    std::fs::remove_file(&store_path).ok();
    std::fs::remove_dir_all(&work_dir).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Exported 2 task(s) to tasks-export.json"));

    let parsed: serde_json::Value = serde_json::from_str(&exported).unwrap();
    let records = parsed.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["title"], "finished chore");
    assert_eq!(records[0]["completed"], true);
    assert_eq!(records[1]["created_at"], "2026-01-02T00:00:00Z");
    assert!(records[0].get("id").is_none());
}

#[test]
fn export_command_honors_exclusion_flags() {
    let exe = env!("CARGO_BIN_EXE_taskdeck");
    let store_path = temp_path("cli-export-flags.json");
    let target = temp_path("cli-export-flags.csv");
    write_store(&store_path, seed_tasks());

    let output = Command::new(exe)
        .args([
            "export",
            "--output",
            target.to_str().unwrap(),
            "--no-completed",
            "--no-description",
        ])
        .env("TASKDECK_STORE_PATH", &store_path)
        .output()
        .expect("failed to run export command");

    let exported = std::fs::read_to_string(&target).unwrap();
    std::fs::remove_file(&store_path).ok();
    std::fs::remove_file(&target).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Exported 1 task(s) to"));

    let lines: Vec<&str> = exported.lines().collect();
    assert_eq!(lines[0], "title,priority,category,due_date,completed,created_at");
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("\"open chore\""));
    assert!(!exported.contains("finished chore"));
    assert!(!exported.contains("still pending"));
}

#[test]
fn export_command_json_flag_reports_summary() {
    let exe = env!("CARGO_BIN_EXE_taskdeck");
    let store_path = temp_path("cli-export-summary.json");
    let target = temp_path("cli-export-summary-out.json");
    write_store(&store_path, seed_tasks());

    let output = Command::new(exe)
        .args(["--json", "export", "--output", target.to_str().unwrap()])
        .env("TASKDECK_STORE_PATH", &store_path)
        .output()
        .expect("failed to run export command");

    std::fs::remove_file(&store_path).ok();
    std::fs::remove_file(&target).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(summary["exported"], 2);
    assert!(summary["path"].as_str().unwrap().ends_with(".json"));
}

#[test]
fn export_command_rejects_conflicting_format() {
    let exe = env!("CARGO_BIN_EXE_taskdeck");
    let store_path = temp_path("cli-export-conflict.json");
    write_store(&store_path, seed_tasks());

    let output = Command::new(exe)
        .args(["export", "--output", "tasks.csv", "--format", "json"])
        .env("TASKDECK_STORE_PATH", &store_path)
        .output()
        .expect("failed to run export command");

    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
    assert!(stderr.contains("does not match file extension"));
}

#[test]
fn export_command_rejects_excluding_everything() {
    let exe = env!("CARGO_BIN_EXE_taskdeck");
    let store_path = temp_path("cli-export-nothing.json");
    write_store(&store_path, seed_tasks());

    let output = Command::new(exe)
        .args(["export", "--no-completed", "--no-active"])
        .env("TASKDECK_STORE_PATH", &store_path)
        .output()
        .expect("failed to run export command");

    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
    assert!(stderr.contains("nothing to export"));
}

#[test]
fn import_command_appends_json_records() {
    let exe = env!("CARGO_BIN_EXE_taskdeck");
    let store_path = temp_path("cli-import.json");
    let import_path = temp_path("cli-import-source.json");
    write_store(&store_path, seed_tasks());

    let records = serde_json::json!([
        {
            "title": "brought in",
            "description": "from another app",
            "priority": "urgent",
            "due_date": "someday"
        },
        {"title": "minimal"}
    ]);
    std::fs::write(&import_path, serde_json::to_string(&records).unwrap()).unwrap();

    let output = Command::new(exe)
        .args(["import", import_path.to_str().unwrap()])
        .env("TASKDECK_STORE_PATH", &store_path)
        .output()
        .expect("failed to run import command");

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();
    std::fs::remove_file(&import_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Imported 2 task(s) from"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("imported 2 task(s)"));

    let tasks = stored["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 4);
    assert_eq!(tasks[2]["title"], "brought in");
    assert_eq!(tasks[2]["priority"], "medium");
    assert_eq!(tasks[2]["due_date"], serde_json::Value::Null);
    assert_eq!(tasks[2]["completed"], false);
    assert_ne!(tasks[2]["id"], "task-1");
    assert_ne!(tasks[2]["id"], tasks[3]["id"]);
}

#[test]
fn import_command_reads_csv_files() {
    let exe = env!("CARGO_BIN_EXE_taskdeck");
    let store_path = temp_path("cli-import-csv.json");
    let import_path = temp_path("cli-import-source.csv");
    write_store(&store_path, serde_json::json!([]));

    std::fs::write(
        &import_path,
        "title,priority,category\n\"pick up parcel\",high,errands\nbare row,,\n",
    )
    .unwrap();

    let output = Command::new(exe)
        .args(["import", import_path.to_str().unwrap()])
        .env("TASKDECK_STORE_PATH", &store_path)
        .output()
        .expect("failed to run import command");

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();
    std::fs::remove_file(&import_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Imported 2 task(s) from"));

    let tasks = stored["tasks"].as_array().unwrap();
    assert_eq!(tasks[0]["title"], "pick up parcel");
    assert_eq!(tasks[0]["priority"], "high");
    assert_eq!(tasks[0]["category"], "errands");
    assert_eq!(tasks[1]["title"], "bare row");
    assert_eq!(tasks[1]["priority"], "medium");
}

#[test]
fn import_command_rejects_malformed_files() {
    let exe = env!("CARGO_BIN_EXE_taskdeck");
    let store_path = temp_path("cli-import-bad.json");
    let import_path = temp_path("cli-import-bad-source.json");
    write_store(&store_path, serde_json::json!([]));
    std::fs::write(&import_path, "{ not json ").unwrap();

    let output = Command::new(exe)
        .args(["import", import_path.to_str().unwrap()])
        .env("TASKDECK_STORE_PATH", &store_path)
        .output()
        .expect("failed to run import command");

    std::fs::remove_file(&store_path).ok();
    std::fs::remove_file(&import_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_data"));
    assert!(stderr.contains("invalid task file"));
}

#[test]
fn import_command_reports_missing_files() {
    let exe = env!("CARGO_BIN_EXE_taskdeck");
    let store_path = temp_path("cli-import-missing.json");
    let import_path = temp_path("cli-import-no-such-file.json");

    let output = Command::new(exe)
        .args(["import", import_path.to_str().unwrap()])
        .env("TASKDECK_STORE_PATH", &store_path)
        .output()
        .expect("failed to run import command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: io_error"));
}
