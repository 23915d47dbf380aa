use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "taskdeck", author, version, about, long_about = None)]
pub struct Cli {
    /// Omit the command to start the interactive shell
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: taskdeck add "Write report" --priority high --due 2026-09-01
    Add {
        title: Option<String>,
        /// Longer free-form notes
        #[arg(long = "desc", value_name = "TEXT")]
        description: Option<String>,
        /// high, medium, or low
        #[arg(long, default_value = "medium")]
        priority: String,
        #[arg(long)]
        category: Option<String>,
        /// Due date in YYYY-MM-DD form
        #[arg(long, value_name = "DATE")]
        due: Option<String>,
    },
    /// List tasks
    ///
    /// Example: taskdeck list --status active --sort priority
    List {
        /// all, active, or completed
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Substring match against title, notes, and category
        #[arg(long)]
        search: Option<String>,
        /// Only tasks due on this date
        #[arg(long, value_name = "DATE")]
        due: Option<String>,
        /// created, priority, or due
        #[arg(long)]
        sort: Option<String>,
        /// asc or desc
        #[arg(long)]
        order: Option<String>,
    },
    /// Show details of a task
    ///
    /// Example: taskdeck show task-1
    Show {
        id: String,
    },
    /// Flip a task between active and completed
    ///
    /// Example: taskdeck toggle task-1
    Toggle {
        id: String,
    },
    /// Edit fields of a task
    ///
    /// Example: taskdeck edit task-1 --title "Write final report" --due ""
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long = "desc", value_name = "TEXT")]
        description: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        /// New category; an empty string clears it
        #[arg(long)]
        category: Option<String>,
        /// New due date; an empty string clears it
        #[arg(long, value_name = "DATE")]
        due: Option<String>,
    },
    /// Delete a task (kept in history for undo)
    ///
    /// Example: taskdeck delete task-1
    Delete {
        id: String,
    },
    /// Restore a deleted task from history
    ///
    /// Example: taskdeck undo task-1
    Undo {
        id: String,
    },
    /// List deleted tasks, most recent first
    History,
    /// Move a task to a new position in the list
    ///
    /// Example: taskdeck move task-1 3
    Move {
        id: String,
        /// Target position, counting from 1
        position: usize,
    },
    /// Write tasks to a JSON or CSV file
    ///
    /// Example: taskdeck export --output tasks.csv --no-completed
    Export {
        /// Output file; defaults to tasks-export.<format>
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// json or csv; inferred from the file extension when omitted
        #[arg(long)]
        format: Option<String>,
        /// Leave completed tasks out
        #[arg(long = "no-completed")]
        no_completed: bool,
        /// Leave active tasks out
        #[arg(long = "no-active")]
        no_active: bool,
        /// Leave descriptions out
        #[arg(long = "no-description")]
        no_description: bool,
        /// Leave priority, category, due date, and creation time out
        #[arg(long = "no-metadata")]
        no_metadata: bool,
    },
    /// Read tasks from a JSON or CSV file
    ///
    /// Example: taskdeck import tasks.json
    Import {
        file: PathBuf,
        /// json or csv; inferred from the file extension when omitted
        #[arg(long)]
        format: Option<String>,
    },
    /// Share tasks by email
    ///
    /// Example: taskdeck share task-1 task-2 --to someone@example.com
    Share {
        /// Ids of the tasks to share
        #[arg(required = true)]
        ids: Vec<String>,
        /// Recipient address
        #[arg(long = "to", value_name = "EMAIL")]
        recipient: String,
    },
    /// Summary statistics for the task list
    Stats,
    /// Switch between the dark and light palette
    ///
    /// Example: taskdeck theme dark
    Theme {
        #[command(subcommand)]
        theme: ThemeCommand,
    },
    /// Adjust the list filters for this shell session
    ///
    /// Example: filter set status=active sort=priority
    Filter {
        #[command(subcommand)]
        filter: FilterCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ThemeCommand {
    /// Turn the dark palette on
    Dark,
    /// Turn the dark palette off
    Light,
    /// Flip the current setting
    Toggle,
    /// Print the current setting
    Show,
}

#[derive(Subcommand, Debug)]
pub enum FilterCommand {
    /// Assign filter values (format KEY=VALUE)
    ///
    /// Example: filter set status=active search=milk
    Set {
        #[arg(required = true, value_name = "KEY=VALUE")]
        assignments: Vec<String>,
    },
    /// Put every filter back to its default
    Reset,
    /// Print the current filters
    Show,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub alias: String,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field.trim(), Some(rest.trim())))
        .unwrap_or((key_raw.trim(), None));

    let canonical_field =
        canonicalize_flag_name(field).ok_or_else(|| "override key cannot be empty".to_string())?;

    match canonical_field.as_str() {
        "aliases" | "alias" => {
            let alias_name = remainder
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| "aliases override requires an alias name".to_string())?;
            Ok(ParsedConfigOverride {
                alias: alias_name.to_string(),
                value,
            })
        }
        other => Err(format!("unknown config field '{other}'")),
    }
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
