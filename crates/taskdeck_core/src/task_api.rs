use crate::error::AppError;
use crate::exchange::{
    ExportFormat, ExportOptions, ExportOutput, ImportedTask, export_tasks as render_export,
};
use crate::model::{Priority, Task, parse_due_date};
use crate::stats::{TaskStats, task_stats};
use crate::storage::json_store;
use crate::store::filters::Filters;
use crate::store::tasks::TaskPatch;
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};
use tracing::info;

/// Raw field values for a partial task update, as collected from the
/// command line. Validation happens when the update is applied.
#[derive(Debug, Default, Clone)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub due_date: Option<String>,
}

pub fn add_task(
    title: &str,
    description: &str,
    priority: &str,
    category: Option<&str>,
    due_date: Option<&str>,
) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    add_task_with_path(&path, title, description, priority, category, due_date)
}

pub fn toggle_task(id: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    toggle_task_with_path(&path, id)
}

pub fn update_task(id: &str, update: &TaskUpdate) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    update_task_with_path(&path, id, update)
}

pub fn delete_task(id: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    delete_task_with_path(&path, id)
}

pub fn undo_delete(id: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    undo_delete_with_path(&path, id)
}

pub fn move_task(id: &str, position: usize) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    move_task_with_path(&path, id, position)
}

pub fn list_tasks(filters: &Filters) -> Result<Vec<Task>, AppError> {
    let path = json_store::store_path()?;
    list_tasks_with_path(&path, filters)
}

pub fn get_task(id: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    get_task_with_path(&path, id)
}

pub fn history_tasks() -> Result<Vec<Task>, AppError> {
    let path = json_store::store_path()?;
    history_tasks_with_path(&path)
}

pub fn import_tasks(records: Vec<ImportedTask>) -> Result<usize, AppError> {
    let path = json_store::store_path()?;
    import_tasks_with_path(&path, records)
}

pub fn export_tasks(
    options: &ExportOptions,
    format: ExportFormat,
) -> Result<ExportOutput, AppError> {
    let path = json_store::store_path()?;
    export_tasks_with_path(&path, options, format)
}

pub fn stats_summary() -> Result<TaskStats, AppError> {
    let path = json_store::store_path()?;
    stats_summary_with_path(&path)
}

pub fn dark_mode() -> Result<bool, AppError> {
    let path = json_store::store_path()?;
    Ok(json_store::load_state_with_fallback(&path).dark_mode)
}

pub fn set_dark_mode(on: bool) -> Result<bool, AppError> {
    let path = json_store::store_path()?;
    set_dark_mode_with_path(&path, on)
}

pub fn toggle_dark_mode() -> Result<bool, AppError> {
    let path = json_store::store_path()?;
    toggle_dark_mode_with_path(&path)
}

fn add_task_with_path(
    path: &Path,
    title: &str,
    description: &str,
    priority: &str,
    category: Option<&str>,
    due_date: Option<&str>,
) -> Result<Task, AppError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("title is required"));
    }

    let priority = Priority::parse(priority)?;
    let due_date = match due_date.map(str::trim) {
        Some(value) if !value.is_empty() => {
            parse_due_date(value)?;
            Some(value.to_string())
        }
        _ => None,
    };
    let category = category
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    let created_at = now_rfc3339()?;
    let id = format!("task-{}", OffsetDateTime::now_utc().unix_timestamp_nanos());

    let task = Task {
        id,
        title: trimmed.to_string(),
        description: description.trim().to_string(),
        priority,
        category,
        due_date,
        completed: false,
        created_at,
    };

    let mut state = json_store::load_state_with_fallback(path);
    state.tasks.push(task.clone());
    json_store::save_state(path, &state)?;

    Ok(task)
}

fn toggle_task_with_path(path: &Path, id: &str) -> Result<Task, AppError> {
    let trimmed_id = require_id(id)?;

    let mut state = json_store::load_state_with_fallback(path);
    let toggled = state.tasks.toggle(trimmed_id)?;
    json_store::save_state(path, &state)?;

    Ok(toggled)
}

fn update_task_with_path(path: &Path, id: &str, update: &TaskUpdate) -> Result<Task, AppError> {
    let trimmed_id = require_id(id)?;
    let patch = validate_update(update)?;

    let mut state = json_store::load_state_with_fallback(path);
    let updated = state.tasks.update(trimmed_id, &patch)?;
    json_store::save_state(path, &state)?;

    Ok(updated)
}

fn validate_update(update: &TaskUpdate) -> Result<TaskPatch, AppError> {
    let mut patch = TaskPatch::default();

    if let Some(title) = update.title.as_deref() {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("title is required"));
        }
        patch.title = Some(trimmed.to_string());
    }

    if let Some(description) = update.description.as_deref() {
        patch.description = Some(description.trim().to_string());
    }

    if let Some(priority) = update.priority.as_deref() {
        patch.priority = Some(Priority::parse(priority)?);
    }

    if let Some(category) = update.category.as_deref() {
        let trimmed = category.trim();
        patch.category = if trimmed.is_empty() {
            Some(None)
        } else {
            Some(Some(trimmed.to_string()))
        };
    }

    if let Some(due_date) = update.due_date.as_deref() {
        let trimmed = due_date.trim();
        patch.due_date = if trimmed.is_empty() {
            Some(None)
        } else {
            parse_due_date(trimmed)?;
            Some(Some(trimmed.to_string()))
        };
    }

    if patch.is_empty() {
        return Err(AppError::invalid_input("nothing to update"));
    }

    Ok(patch)
}

fn delete_task_with_path(path: &Path, id: &str) -> Result<Task, AppError> {
    let trimmed_id = require_id(id)?;

    let mut state = json_store::load_state_with_fallback(path);
    let removed = state.tasks.delete(trimmed_id)?;
    json_store::save_state(path, &state)?;

    Ok(removed)
}

fn undo_delete_with_path(path: &Path, id: &str) -> Result<Task, AppError> {
    let trimmed_id = require_id(id)?;

    let mut state = json_store::load_state_with_fallback(path);
    let restored = state.tasks.undo(trimmed_id)?;
    json_store::save_state(path, &state)?;

    Ok(restored)
}

fn move_task_with_path(path: &Path, id: &str, position: usize) -> Result<Task, AppError> {
    let trimmed_id = require_id(id)?;
    if position == 0 {
        return Err(AppError::invalid_input("position must be at least 1"));
    }

    let mut state = json_store::load_state_with_fallback(path);
    let moved = state.tasks.move_to(trimmed_id, position - 1)?;
    json_store::save_state(path, &state)?;

    Ok(moved)
}

fn list_tasks_with_path(path: &Path, filters: &Filters) -> Result<Vec<Task>, AppError> {
    let state = json_store::load_state_with_fallback(path);
    filters.apply(&state.tasks.active)
}

fn get_task_with_path(path: &Path, id: &str) -> Result<Task, AppError> {
    let trimmed_id = require_id(id)?;

    let state = json_store::load_state_with_fallback(path);
    state
        .tasks
        .active
        .into_iter()
        .find(|task| task.id == trimmed_id)
        .ok_or_else(|| AppError::not_found("task not found"))
}

fn history_tasks_with_path(path: &Path) -> Result<Vec<Task>, AppError> {
    let state = json_store::load_state_with_fallback(path);
    let mut history = state.tasks.history;
    history.reverse();
    Ok(history)
}

fn import_tasks_with_path(path: &Path, records: Vec<ImportedTask>) -> Result<usize, AppError> {
    let mut state = json_store::load_state_with_fallback(path);

    let created_at = now_rfc3339()?;
    // The index offset keeps ids distinct within one import batch.
    let base = OffsetDateTime::now_utc().unix_timestamp_nanos();
    let mut tasks = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        tasks.push(Task {
            id: format!("task-{}", base + index as i128),
            title: record.title,
            description: record.description,
            priority: record.priority,
            category: record.category,
            due_date: record.due_date,
            completed: false,
            created_at: created_at.clone(),
        });
    }

    let count = state.tasks.append_imported(tasks);
    json_store::save_state(path, &state)?;
    info!("imported {count} task(s)");

    Ok(count)
}

fn export_tasks_with_path(
    path: &Path,
    options: &ExportOptions,
    format: ExportFormat,
) -> Result<ExportOutput, AppError> {
    let state = json_store::load_state_with_fallback(path);
    render_export(&state.tasks.active, options, format)
}

fn stats_summary_with_path(path: &Path) -> Result<TaskStats, AppError> {
    let state = json_store::load_state_with_fallback(path);
    Ok(task_stats(&state.tasks.active))
}

fn set_dark_mode_with_path(path: &Path, on: bool) -> Result<bool, AppError> {
    let mut state = json_store::load_state_with_fallback(path);
    state.dark_mode = on;
    json_store::save_state(path, &state)?;
    Ok(on)
}

fn toggle_dark_mode_with_path(path: &Path) -> Result<bool, AppError> {
    let mut state = json_store::load_state_with_fallback(path);
    state.dark_mode = !state.dark_mode;
    json_store::save_state(path, &state)?;
    Ok(state.dark_mode)
}

fn require_id(id: &str) -> Result<&str, AppError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }
    Ok(trimmed)
}

fn now_rfc3339() -> Result<String, AppError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

/// A task counts as overdue once its due date is strictly before today's
/// local date; completed tasks are never overdue.
pub fn task_overdue(task: &Task) -> Result<bool, AppError> {
    let due = match task.due_date.as_deref() {
        Some(value) => value,
        None => return Ok(false),
    };
    if task.completed {
        return Ok(false);
    }

    let due = parse_due_date(due).map_err(|_| AppError::invalid_data("due_date must be YYYY-MM-DD"))?;
    let local_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();
    Ok(due < today)
}
