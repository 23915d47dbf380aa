use crate::model::{Priority, Task};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    /// Percentage of completed tasks, rounded to one decimal place.
    pub completion_rate: f64,
    pub by_priority: PriorityCounts,
    pub by_category: BTreeMap<String, usize>,
}

pub fn task_stats(tasks: &[Task]) -> TaskStats {
    let total = tasks.len();
    let completed = tasks.iter().filter(|task| task.completed).count();

    let mut by_priority = PriorityCounts::default();
    let mut by_category = BTreeMap::new();
    for task in tasks {
        match task.priority {
            Priority::High => by_priority.high += 1,
            Priority::Medium => by_priority.medium += 1,
            Priority::Low => by_priority.low += 1,
        }
        if let Some(category) = task.category.as_deref()
            && !category.is_empty()
        {
            *by_category.entry(category.to_string()).or_insert(0) += 1;
        }
    }

    let completion_rate = if total == 0 {
        0.0
    } else {
        (completed as f64 / total as f64 * 1000.0).round() / 10.0
    };

    TaskStats {
        total,
        completed,
        active: total - completed,
        completion_rate,
        by_priority,
        by_category,
    }
}
