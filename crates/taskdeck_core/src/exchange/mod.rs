mod csv;

use crate::error::AppError;
use crate::model::{Priority, Task, parse_due_date};
use csv::{csv_quote, split_csv_line};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(AppError::invalid_input(format!(
                "format must be json or csv, got '{other}'"
            ))),
        }
    }

    pub fn from_extension(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        match extension.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// Pick the exchange format for a file, preferring the explicit choice but
/// rejecting one that contradicts the file extension.
pub fn resolve_format(
    path: &Path,
    explicit: Option<ExportFormat>,
) -> Result<ExportFormat, AppError> {
    let inferred = ExportFormat::from_extension(path);
    match (explicit, inferred) {
        (Some(requested), Some(found)) if requested != found => {
            Err(AppError::invalid_input(format!(
                "format '{}' does not match file extension '{}'",
                requested.extension(),
                found.extension()
            )))
        }
        (Some(requested), _) => Ok(requested),
        (None, Some(found)) => Ok(found),
        (None, None) => Err(AppError::invalid_input(
            "cannot determine format from file name",
        )),
    }
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub include_completed: bool,
    pub include_active: bool,
    pub include_description: bool,
    pub include_metadata: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_completed: true,
            include_active: true,
            include_description: true,
            include_metadata: true,
        }
    }
}

/// Rendered export text plus the number of tasks that made it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutput {
    pub content: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
struct ExportRecord<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<&'a str>,
    completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<&'a str>,
}

impl<'a> ExportRecord<'a> {
    fn from_task(task: &'a Task, options: &ExportOptions) -> Self {
        Self {
            title: &task.title,
            description: options.include_description.then_some(task.description.as_str()),
            priority: options.include_metadata.then_some(task.priority),
            category: if options.include_metadata {
                task.category.as_deref()
            } else {
                None
            },
            due_date: if options.include_metadata {
                task.due_date.as_deref()
            } else {
                None
            },
            completed: task.completed,
            created_at: options.include_metadata.then_some(task.created_at.as_str()),
        }
    }
}

pub fn export_tasks(
    tasks: &[Task],
    options: &ExportOptions,
    format: ExportFormat,
) -> Result<ExportOutput, AppError> {
    if !options.include_completed && !options.include_active {
        return Err(AppError::invalid_input(
            "nothing to export: completed and active tasks are both excluded",
        ));
    }

    let selected: Vec<&Task> = tasks
        .iter()
        .filter(|task| {
            if task.completed {
                options.include_completed
            } else {
                options.include_active
            }
        })
        .collect();

    let content = match format {
        ExportFormat::Json => render_json(&selected, options)?,
        ExportFormat::Csv => render_csv(&selected, options),
    };

    Ok(ExportOutput {
        content,
        count: selected.len(),
    })
}

fn render_json(tasks: &[&Task], options: &ExportOptions) -> Result<String, AppError> {
    let records: Vec<ExportRecord<'_>> = tasks
        .iter()
        .map(|task| ExportRecord::from_task(task, options))
        .collect();
    serde_json::to_string_pretty(&records).map_err(|err| AppError::invalid_data(err.to_string()))
}

fn render_csv(tasks: &[&Task], options: &ExportOptions) -> String {
    let mut columns = vec!["title"];
    if options.include_description {
        columns.push("description");
    }
    if options.include_metadata {
        columns.extend(["priority", "category", "due_date"]);
    }
    columns.push("completed");
    if options.include_metadata {
        columns.push("created_at");
    }

    let mut lines = vec![columns.join(",")];
    for task in tasks {
        let mut cells = vec![csv_quote(&task.title)];
        if options.include_description {
            cells.push(csv_quote(&task.description));
        }
        if options.include_metadata {
            cells.push(csv_quote(task.priority.label()));
            cells.push(csv_quote(task.category.as_deref().unwrap_or("")));
            cells.push(csv_quote(task.due_date.as_deref().unwrap_or("")));
        }
        cells.push(task.completed.to_string());
        if options.include_metadata {
            cells.push(csv_quote(&task.created_at));
        }
        lines.push(cells.join(","));
    }

    let mut rendered = lines.join("\n");
    rendered.push('\n');
    rendered
}

/// One record parsed out of an import file. Ids, completion state, and
/// creation timestamps are assigned when the batch is materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: Option<String>,
    pub due_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawImportRecord {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
}

pub fn parse_json(text: &str) -> Result<Vec<ImportedTask>, AppError> {
    let records: Vec<RawImportRecord> = serde_json::from_str(text)
        .map_err(|err| AppError::invalid_data(format!("invalid task file: {err}")))?;
    Ok(records.into_iter().filter_map(resolve_record).collect())
}

pub fn parse_csv(text: &str) -> Result<Vec<ImportedTask>, AppError> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| AppError::invalid_data("csv file is empty"))?;
    let columns: Vec<String> = split_csv_line(header)?
        .iter()
        .map(|column| column.trim().to_ascii_lowercase())
        .collect();
    let position = |name: &str| columns.iter().position(|column| column == name);

    let title_column = position("title")
        .ok_or_else(|| AppError::invalid_data("title column is required"))?;
    let description_column = position("description");
    let priority_column = position("priority");
    let category_column = position("category");
    let due_date_column = position("due_date");

    let mut records = Vec::new();
    for line in lines {
        let fields = split_csv_line(line)?;
        let cell = |column: Option<usize>| -> String {
            column
                .and_then(|index| fields.get(index))
                .cloned()
                .unwrap_or_default()
        };

        let record = RawImportRecord {
            title: cell(Some(title_column)),
            description: cell(description_column),
            priority: Some(cell(priority_column)),
            category: Some(cell(category_column)),
            due_date: Some(cell(due_date_column)),
        };
        if let Some(resolved) = resolve_record(record) {
            records.push(resolved);
        }
    }

    Ok(records)
}

/// Records without a usable title are dropped; unknown priorities fall back
/// to medium and unparseable due dates are cleared instead of failing the
/// whole file.
fn resolve_record(record: RawImportRecord) -> Option<ImportedTask> {
    let title = record.title.trim();
    if title.is_empty() {
        return None;
    }

    let priority = record
        .priority
        .as_deref()
        .and_then(|raw| Priority::parse(raw).ok())
        .unwrap_or(Priority::Medium);
    let category = record
        .category
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);
    let due_date = record
        .due_date
        .as_deref()
        .map(str::trim)
        .filter(|value| parse_due_date(value).is_ok())
        .map(str::to_string);

    Some(ImportedTask {
        title: title.to_string(),
        description: record.description.trim().to_string(),
        priority,
        category,
        due_date,
    })
}
