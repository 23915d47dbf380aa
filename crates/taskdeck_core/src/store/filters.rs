use crate::error::AppError;
use crate::model::{Priority, Task, parse_due_date};
use serde::Serialize;
use std::cmp::Ordering;
use time::Date;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(AppError::invalid_input(
                "status must be all, active, or completed",
            )),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Created,
    Priority,
    Due,
}

impl SortBy {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(Self::Created),
            "priority" => Ok(Self::Priority),
            "due" => Ok(Self::Due),
            _ => Err(AppError::invalid_input(
                "sort must be created, priority, or due",
            )),
        }
    }

    /// Order used when the caller does not ask for one: newest first for
    /// creation time, highest first for priority, earliest first for due
    /// dates.
    pub fn default_order(&self) -> SortOrder {
        match self {
            Self::Created => SortOrder::Desc,
            Self::Priority => SortOrder::Desc,
            Self::Due => SortOrder::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(AppError::invalid_input("order must be asc or desc")),
        }
    }
}

/// View settings for the task list. Held in memory only; never persisted.
/// Serialized names match the keys `set` accepts, so a shown filter can be
/// fed straight back into `filter set`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Filters {
    pub status: StatusFilter,
    pub search: String,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub due: Option<String>,
    #[serde(rename = "sort")]
    pub sort_by: SortBy,
    #[serde(rename = "order")]
    pub sort_order: Option<SortOrder>,
}

impl Filters {
    /// Assign one filter field from a `NAME=VALUE` pair. An empty value
    /// clears the field.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "status" => {
                self.status = if value.is_empty() {
                    StatusFilter::All
                } else {
                    StatusFilter::parse(value)?
                };
            }
            "search" => self.search = value.to_string(),
            "category" => {
                self.category = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "priority" => {
                self.priority = if value.is_empty() {
                    None
                } else {
                    Some(Priority::parse(value)?)
                };
            }
            "due" => {
                self.due = if value.is_empty() {
                    None
                } else {
                    parse_due_date(value)?;
                    Some(value.to_string())
                };
            }
            "sort" => {
                self.sort_by = if value.is_empty() {
                    SortBy::Created
                } else {
                    SortBy::parse(value)?
                };
            }
            "order" => {
                self.sort_order = if value.is_empty() {
                    None
                } else {
                    Some(SortOrder::parse(value)?)
                };
            }
            other => {
                return Err(AppError::invalid_input(format!("unknown filter '{other}'")));
            }
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Filters::default();
    }

    pub fn matches(&self, task: &Task) -> bool {
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        };
        if !status_ok {
            return false;
        }

        if let Some(priority) = self.priority
            && task.priority != priority
        {
            return false;
        }

        if let Some(category) = self.category.as_deref()
            && task.category.as_deref() != Some(category)
        {
            return false;
        }

        if let Some(due) = self.due.as_deref()
            && task.due_date.as_deref() != Some(due)
        {
            return false;
        }

        let query = self.search.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        task.title.to_lowercase().contains(&query)
            || task.description.to_lowercase().contains(&query)
            || task
                .category
                .as_deref()
                .is_some_and(|category| category.to_lowercase().contains(&query))
    }

    /// Filter then sort a task list according to the current settings.
    pub fn apply(&self, tasks: &[Task]) -> Result<Vec<Task>, AppError> {
        let filtered: Vec<Task> = tasks
            .iter()
            .filter(|task| self.matches(task))
            .cloned()
            .collect();
        self.sort(filtered)
    }

    fn sort(&self, tasks: Vec<Task>) -> Result<Vec<Task>, AppError> {
        let order = self.sort_order.unwrap_or_else(|| self.sort_by.default_order());

        match self.sort_by {
            SortBy::Priority => {
                let mut tasks = tasks;
                tasks.sort_by(|a, b| match order {
                    SortOrder::Asc => a.priority.rank().cmp(&b.priority.rank()),
                    SortOrder::Desc => b.priority.rank().cmp(&a.priority.rank()),
                });
                Ok(tasks)
            }
            SortBy::Created => {
                let mut keyed = Vec::with_capacity(tasks.len());
                for task in tasks {
                    let created = OffsetDateTime::parse(&task.created_at, &Rfc3339)
                        .map_err(|_| AppError::invalid_data("created_at must be RFC3339"))?;
                    keyed.push((created, task));
                }
                keyed.sort_by(|a, b| match order {
                    SortOrder::Asc => a.0.cmp(&b.0),
                    SortOrder::Desc => b.0.cmp(&a.0),
                });
                Ok(keyed.into_iter().map(|(_, task)| task).collect())
            }
            SortBy::Due => {
                let mut keyed = Vec::with_capacity(tasks.len());
                for task in tasks {
                    let due = match task.due_date.as_deref() {
                        Some(value) => Some(
                            parse_due_date(value)
                                .map_err(|_| AppError::invalid_data("due_date must be YYYY-MM-DD"))?,
                        ),
                        None => None,
                    };
                    keyed.push((due, task));
                }
                keyed.sort_by(|a, b| compare_due(a.0, b.0, order));
                Ok(keyed.into_iter().map(|(_, task)| task).collect())
            }
        }
    }
}

// Tasks without a due date always sort after dated ones.
fn compare_due(a: Option<Date>, b: Option<Date>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match order {
            SortOrder::Asc => a.cmp(&b),
            SortOrder::Desc => b.cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
