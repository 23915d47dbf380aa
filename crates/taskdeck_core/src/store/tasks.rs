use crate::error::AppError;
use crate::model::{Priority, Task};

/// The active task list plus the history of deleted tasks kept for undo.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TasksState {
    pub active: Vec<Task>,
    pub history: Vec<Task>,
}

/// Field-wise update applied over an existing task. `None` leaves a field
/// untouched; `Some(None)` clears an optional field.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<Option<String>>,
    pub due_date: Option<Option<String>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.due_date.is_none()
    }
}

impl TasksState {
    pub fn push(&mut self, task: Task) {
        self.active.push(task);
    }

    pub fn toggle(&mut self, id: &str) -> Result<Task, AppError> {
        let task = self
            .active
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| AppError::not_found("task not found"))?;
        task.completed = !task.completed;
        Ok(task.clone())
    }

    pub fn update(&mut self, id: &str, patch: &TaskPatch) -> Result<Task, AppError> {
        let task = self
            .active
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| AppError::not_found("task not found"))?;

        if let Some(title) = patch.title.as_ref() {
            task.title = title.clone();
        }
        if let Some(description) = patch.description.as_ref() {
            task.description = description.clone();
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(category) = patch.category.as_ref() {
            task.category = category.clone();
        }
        if let Some(due_date) = patch.due_date.as_ref() {
            task.due_date = due_date.clone();
        }

        Ok(task.clone())
    }

    /// Remove a task from the active list and keep it in history for undo.
    pub fn delete(&mut self, id: &str) -> Result<Task, AppError> {
        let index = self
            .active
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| AppError::not_found("task not found"))?;

        let removed = self.active.remove(index);
        self.history.push(removed.clone());
        Ok(removed)
    }

    /// Move a previously deleted task back onto the active list.
    pub fn undo(&mut self, id: &str) -> Result<Task, AppError> {
        let index = self
            .history
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| AppError::not_found("task not found in history"))?;

        let restored = self.history.remove(index);
        self.active.push(restored.clone());
        Ok(restored)
    }

    /// Re-insert the task at the target index, clamped to the list length.
    pub fn move_to(&mut self, id: &str, index: usize) -> Result<Task, AppError> {
        let from = self
            .active
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| AppError::not_found("task not found"))?;

        let task = self.active.remove(from);
        let to = index.min(self.active.len());
        self.active.insert(to, task.clone());
        Ok(task)
    }

    pub fn append_imported(&mut self, tasks: Vec<Task>) -> usize {
        let count = tasks.len();
        self.active.extend(tasks);
        count
    }
}
