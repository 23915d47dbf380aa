use tabled::settings::Style;
use tabled::{Table, Tabled};
use taskdeck_core::error::AppError;
use taskdeck_core::model::Task;
use taskdeck_core::stats::TaskStats;
use taskdeck_core::task_api;

#[derive(Debug, Clone)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn accentize(&self, text: &str) -> String {
        if self.accent.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.accent, text, self.reset)
        }
    }

    pub fn mutedize(&self, text: &str) -> String {
        if self.muted.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.muted, text, self.reset)
        }
    }
}

pub fn palette_for_mode(dark: bool) -> Palette {
    if dark {
        Palette {
            accent: "\x1b[38;5;208m",
            muted: "\x1b[38;5;250m",
            reset: "\x1b[0m",
        }
    } else {
        Palette {
            accent: "",
            muted: "",
            reset: "",
        }
    }
}

pub fn status_label(task: &Task) -> &'static str {
    if task.completed { "completed" } else { "active" }
}

#[derive(Tabled)]
struct TaskRow {
    done: &'static str,
    id: String,
    title: String,
    priority: &'static str,
    category: String,
    due: String,
    created: String,
}

fn task_row(task: &Task) -> Result<TaskRow, AppError> {
    let overdue = task_api::task_overdue(task)?;
    let due = match task.due_date.as_deref() {
        Some(date) if overdue => format!("{date} (overdue)"),
        Some(date) => date.to_string(),
        None => "-".to_string(),
    };

    Ok(TaskRow {
        done: if task.completed { "[x]" } else { "[ ]" },
        id: task.id.clone(),
        title: task.title.clone(),
        priority: task.priority.label(),
        category: task.category.clone().unwrap_or_else(|| "-".to_string()),
        due,
        created: task
            .created_at
            .get(..10)
            .unwrap_or(task.created_at.as_str())
            .to_string(),
    })
}

pub fn print_tasks(tasks: &[Task], palette: &Palette) -> Result<(), AppError> {
    if tasks.is_empty() {
        println!("No tasks found");
        return Ok(());
    }

    let mut rows = Vec::with_capacity(tasks.len());
    for task in tasks {
        rows.push(task_row(task)?);
    }

    let mut table = Table::new(rows);
    table.with(Style::psql());
    println!("{table}");
    println!("{}", palette.mutedize(&format!("{} task(s)", tasks.len())));

    Ok(())
}

fn task_json(task: &Task) -> Result<serde_json::Value, AppError> {
    let overdue = task_api::task_overdue(task)?;
    Ok(serde_json::json!({
        "id": task.id,
        "title": task.title,
        "description": task.description,
        "priority": task.priority,
        "category": task.category,
        "due_date": task.due_date,
        "completed": task.completed,
        "created_at": task.created_at,
        "overdue": overdue,
    }))
}

pub fn print_tasks_json(tasks: &[Task]) -> Result<(), AppError> {
    let mut payload = Vec::with_capacity(tasks.len());
    for task in tasks {
        payload.push(task_json(task)?);
    }
    println!("{}", serde_json::Value::Array(payload));
    Ok(())
}

pub fn print_task_json(task: &Task) -> Result<(), AppError> {
    println!("{}", task_json(task)?);
    Ok(())
}

pub fn print_task_detail(task: &Task, palette: &Palette) -> Result<(), AppError> {
    let overdue = task_api::task_overdue(task)?;
    let due = match task.due_date.as_deref() {
        Some(date) if overdue => format!("{date} (overdue)"),
        Some(date) => date.to_string(),
        None => "-".to_string(),
    };

    println!("{}", palette.accentize(&task.title));
    println!("  id:       {}", task.id);
    println!("  status:   {}", status_label(task));
    println!("  priority: {}", task.priority.label());
    println!("  category: {}", task.category.as_deref().unwrap_or("-"));
    println!("  due:      {due}");
    if !task.description.is_empty() {
        println!("  notes:    {}", task.description);
    }
    println!("  created:  {}", palette.mutedize(&task.created_at));

    Ok(())
}

pub fn print_stats(stats: &TaskStats, palette: &Palette) {
    println!("{}", palette.accentize("Task summary"));
    println!("  total:     {}", stats.total);
    println!("  active:    {}", stats.active);
    println!(
        "  completed: {} ({:.1}%)",
        stats.completed, stats.completion_rate
    );
    println!(
        "  priority:  high {} / medium {} / low {}",
        stats.by_priority.high, stats.by_priority.medium, stats.by_priority.low
    );
    if !stats.by_category.is_empty() {
        println!("  categories:");
        for (category, count) in stats.by_category.iter() {
            println!("    {category}: {count}");
        }
    }
}

pub fn print_stats_json(stats: &TaskStats) -> Result<(), AppError> {
    let rendered =
        serde_json::to_string(stats).map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{rendered}");
    Ok(())
}
