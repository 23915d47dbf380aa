use crate::error::AppError;
use crate::model::Task;
use crate::storage::json_store;
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{info, warn};

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

/// What gets handed to the delivery layer. There is no mail transport; the
/// payload is emitted through the logging layer and returned for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SharePayload {
    pub tasks: Vec<Task>,
    pub recipient_email: String,
    pub timestamp: String,
}

pub fn share_tasks(ids: &[String], recipient: &str) -> Result<SharePayload, AppError> {
    let path = json_store::store_path()?;
    share_tasks_with_path(&path, ids, recipient)
}

fn share_tasks_with_path(
    path: &Path,
    ids: &[String],
    recipient: &str,
) -> Result<SharePayload, AppError> {
    let recipient = recipient.trim();
    if !email_valid(recipient) {
        return Err(AppError::invalid_input("recipient email is invalid"));
    }
    if ids.is_empty() {
        return Err(AppError::invalid_input("at least one task id is required"));
    }

    let state = json_store::load_state_with_fallback(path);
    let mut tasks = Vec::with_capacity(ids.len());
    for id in ids {
        let trimmed = id.trim();
        let task = state
            .tasks
            .active
            .iter()
            .find(|task| task.id == trimmed)
            .ok_or_else(|| AppError::not_found(format!("task not found: {trimmed}")))?;
        tasks.push(task.clone());
    }

    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    let payload = SharePayload {
        tasks,
        recipient_email: recipient.to_string(),
        timestamp,
    };

    let rendered =
        serde_json::to_string(&payload).map_err(|err| AppError::invalid_data(err.to_string()))?;
    info!("share payload: {rendered}");

    Ok(payload)
}

fn email_valid(candidate: &str) -> bool {
    match Regex::new(EMAIL_PATTERN) {
        Ok(pattern) => pattern.is_match(candidate),
        Err(err) => {
            warn!("email pattern failed to compile: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{email_valid, share_tasks_with_path};
    use crate::model::{Priority, Task};
    use crate::storage::json_store;
    use crate::store::tasks::TasksState;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("taskdeck-{nanos}-{file_name}"))
    }

    fn sample_task(id: &str, title: &str) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            priority: Priority::Medium,
            category: None,
            due_date: None,
            completed: false,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn seed_store(path: &std::path::Path, active: Vec<Task>) {
        json_store::save_state(
            path,
            &json_store::StoreState {
                tasks: TasksState {
                    active,
                    history: Vec::new(),
                },
                dark_mode: false,
            },
        )
        .unwrap();
    }

    #[test]
    fn accepts_common_addresses() {
        assert!(email_valid("user@example.com"));
        assert!(email_valid("first.last+tag@sub.example.co"));
        assert!(email_valid("a_b%c@host-name.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!email_valid("not-an-email"));
        assert!(!email_valid("user@no-tld"));
        assert!(!email_valid("@example.com"));
        assert!(!email_valid("user@example.c"));
        assert!(!email_valid(""));
    }

    #[test]
    fn shares_selected_tasks() {
        let path = temp_path("share.json");
        seed_store(
            &path,
            vec![
                sample_task("task-1", "first"),
                sample_task("task-2", "second"),
                sample_task("task-3", "third"),
            ],
        );

        let ids = vec!["task-3".to_string(), "task-1".to_string()];
        let payload = share_tasks_with_path(&path, &ids, "user@example.com").unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(payload.recipient_email, "user@example.com");
        assert_eq!(payload.tasks.len(), 2);
        assert_eq!(payload.tasks[0].id, "task-3");
        assert_eq!(payload.tasks[1].id, "task-1");
        assert!(!payload.timestamp.is_empty());
    }

    #[test]
    fn rejects_invalid_recipient() {
        let path = temp_path("share-bad-email.json");
        seed_store(&path, vec![sample_task("task-1", "first")]);

        let ids = vec!["task-1".to_string()];
        let err = share_tasks_with_path(&path, &ids, "nope").unwrap_err();
        std::fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn rejects_empty_selection() {
        let path = temp_path("share-empty.json");
        seed_store(&path, vec![sample_task("task-1", "first")]);

        let err = share_tasks_with_path(&path, &[], "user@example.com").unwrap_err();
        std::fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn rejects_unknown_task_id() {
        let path = temp_path("share-missing.json");
        seed_store(&path, vec![sample_task("task-1", "first")]);

        let ids = vec!["task-9".to_string()];
        let err = share_tasks_with_path(&path, &ids, "user@example.com").unwrap_err();
        std::fs::remove_file(&path).ok();

        assert_eq!(err.code(), "not_found");
    }
}
