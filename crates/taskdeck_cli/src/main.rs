use clap::{CommandFactory, Parser};
use std::collections::HashMap;
use std::io::{self, BufRead};
use std::path::PathBuf;
use taskdeck_cli::cli::{Cli, Command, FilterCommand, ThemeCommand, parse_config_override};
use taskdeck_cli::output;
use taskdeck_core::config::{self, Config, ConfigOverrides};
use taskdeck_core::error::AppError;
use taskdeck_core::exchange::{self, ExportFormat, ExportOptions};
use taskdeck_core::share;
use taskdeck_core::store::filters::Filters;
use taskdeck_core::task_api::{self, TaskUpdate};
use tracing::warn;

/// State owned by one interactive run. Filters live here so `filter`
/// commands can shape later `list` calls.
struct Session {
    filters: Filters,
    aliases: HashMap<String, String>,
    json: bool,
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn parse_overrides(overrides: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut parsed = ConfigOverrides::default();
    for raw in overrides {
        let over = parse_config_override(raw).map_err(AppError::invalid_input)?;
        parsed.aliases.insert(over.alias, over.value);
    }
    Ok(parsed)
}

fn load_session_config(overrides: &[String]) -> Result<Config, AppError> {
    let load = config::load_config_with_fallback();
    if let Some(err) = load.error.as_ref() {
        warn!("falling back to default config: {err}");
    }

    let parsed = parse_overrides(overrides)?;
    Ok(config::merge_overrides(&load.config, &parsed))
}

fn expand_alias(
    args: Vec<String>,
    aliases: &HashMap<String, String>,
) -> Result<Vec<String>, AppError> {
    let Some(expansion) = args.first().and_then(|first| aliases.get(first)) else {
        return Ok(args);
    };

    let mut expanded = split_command_line(expansion)?;
    expanded.extend(args.into_iter().skip(1));
    Ok(expanded)
}

fn print_filters(filters: &Filters, json: bool) -> Result<(), AppError> {
    let value =
        serde_json::to_value(filters).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if json {
        println!("{value}");
        return Ok(());
    }

    println!("Filters");
    if let serde_json::Value::Object(fields) = value {
        for (name, entry) in fields {
            let shown = match entry {
                serde_json::Value::Null => "-".to_string(),
                serde_json::Value::String(text) if text.is_empty() => "-".to_string(),
                serde_json::Value::String(text) => text,
                other => other.to_string(),
            };
            println!("  {name}: {shown}");
        }
    }

    Ok(())
}

fn run_command(command: Command, json: bool, filters: &mut Filters) -> Result<(), AppError> {
    let palette = output::palette_for_mode(task_api::dark_mode()?);

    match command {
        Command::Add {
            title,
            description,
            priority,
            category,
            due,
        } => {
            let title = match title {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("title is required")),
            };

            let task = task_api::add_task(
                &title,
                description.as_deref().unwrap_or(""),
                &priority,
                category.as_deref(),
                due.as_deref(),
            )?;
            if json {
                output::print_task_json(&task)?;
            } else {
                println!("Added task: {} ({})", task.title, task.id);
            }
        }
        Command::List {
            status,
            priority,
            category,
            search,
            due,
            sort,
            order,
        } => {
            let mut view = filters.clone();
            if let Some(value) = status.as_deref() {
                view.set("status", value)?;
            }
            if let Some(value) = priority.as_deref() {
                view.set("priority", value)?;
            }
            if let Some(value) = category.as_deref() {
                view.set("category", value)?;
            }
            if let Some(value) = search.as_deref() {
                view.set("search", value)?;
            }
            if let Some(value) = due.as_deref() {
                view.set("due", value)?;
            }
            if let Some(value) = sort.as_deref() {
                view.set("sort", value)?;
            }
            if let Some(value) = order.as_deref() {
                view.set("order", value)?;
            }

            let tasks = task_api::list_tasks(&view)?;
            if json {
                output::print_tasks_json(&tasks)?;
            } else {
                output::print_tasks(&tasks, &palette)?;
            }
        }
        Command::Show { id } => {
            let task = task_api::get_task(&id)?;
            if json {
                output::print_task_json(&task)?;
            } else {
                output::print_task_detail(&task, &palette)?;
            }
        }
        Command::Toggle { id } => {
            let task = task_api::toggle_task(&id)?;
            if json {
                output::print_task_json(&task)?;
            } else if task.completed {
                println!("Completed task: {} ({})", task.title, task.id);
            } else {
                println!("Reopened task: {} ({})", task.title, task.id);
            }
        }
        Command::Edit {
            id,
            title,
            description,
            priority,
            category,
            due,
        } => {
            let update = TaskUpdate {
                title,
                description,
                priority,
                category,
                due_date: due,
            };
            let task = task_api::update_task(&id, &update)?;
            if json {
                output::print_task_json(&task)?;
            } else {
                println!("Updated task: {} ({})", task.title, task.id);
            }
        }
        Command::Delete { id } => {
            let task = task_api::delete_task(&id)?;
            if json {
                output::print_task_json(&task)?;
            } else {
                println!("Deleted task: {} ({})", task.title, task.id);
            }
        }
        Command::Undo { id } => {
            let task = task_api::undo_delete(&id)?;
            if json {
                output::print_task_json(&task)?;
            } else {
                println!("Restored task: {} ({})", task.title, task.id);
            }
        }
        Command::History => {
            let tasks = task_api::history_tasks()?;
            if json {
                output::print_tasks_json(&tasks)?;
            } else if tasks.is_empty() {
                println!("No deleted tasks");
            } else {
                output::print_tasks(&tasks, &palette)?;
            }
        }
        Command::Move { id, position } => {
            let task = task_api::move_task(&id, position)?;
            if json {
                output::print_task_json(&task)?;
            } else {
                println!("Moved task: {} ({})", task.title, task.id);
            }
        }
        Command::Export {
            output: target,
            format,
            no_completed,
            no_active,
            no_description,
            no_metadata,
        } => {
            let explicit = format.as_deref().map(ExportFormat::parse).transpose()?;
            let path = match target {
                Some(path) => path,
                None => {
                    let format = explicit.unwrap_or(ExportFormat::Json);
                    PathBuf::from(format!("tasks-export.{}", format.extension()))
                }
            };
            let format = exchange::resolve_format(&path, explicit)?;
            let options = ExportOptions {
                include_completed: !no_completed,
                include_active: !no_active,
                include_description: !no_description,
                include_metadata: !no_metadata,
            };

            let export = task_api::export_tasks(&options, format)?;
            std::fs::write(&path, &export.content)
                .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;

            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "exported": export.count,
                        "path": path.display().to_string(),
                    })
                );
            } else {
                println!("Exported {} task(s) to {}", export.count, path.display());
            }
        }
        Command::Import { file, format } => {
            let explicit = format.as_deref().map(ExportFormat::parse).transpose()?;
            let format = exchange::resolve_format(&file, explicit)?;
            let text = std::fs::read_to_string(&file)
                .map_err(|err| AppError::io(format!("{}: {}", file.display(), err)))?;
            let records = match format {
                ExportFormat::Json => exchange::parse_json(&text)?,
                ExportFormat::Csv => exchange::parse_csv(&text)?,
            };

            let count = task_api::import_tasks(records)?;
            if json {
                println!("{}", serde_json::json!({ "imported": count }));
            } else {
                println!("Imported {} task(s) from {}", count, file.display());
            }
        }
        Command::Share { ids, recipient } => {
            let payload = share::share_tasks(&ids, &recipient)?;
            if json {
                let rendered = serde_json::to_string(&payload)
                    .map_err(|err| AppError::invalid_data(err.to_string()))?;
                println!("{rendered}");
            } else {
                println!(
                    "Shared {} task(s) with {}",
                    payload.tasks.len(),
                    payload.recipient_email
                );
            }
        }
        Command::Stats => {
            let stats = task_api::stats_summary()?;
            if json {
                output::print_stats_json(&stats)?;
            } else {
                output::print_stats(&stats, &palette);
            }
        }
        Command::Theme { theme } => match theme {
            ThemeCommand::Dark => {
                task_api::set_dark_mode(true)?;
                if json {
                    println!("{}", serde_json::json!({ "dark_mode": true }));
                } else {
                    println!("Theme set to dark");
                }
            }
            ThemeCommand::Light => {
                task_api::set_dark_mode(false)?;
                if json {
                    println!("{}", serde_json::json!({ "dark_mode": false }));
                } else {
                    println!("Theme set to light");
                }
            }
            ThemeCommand::Toggle => {
                let on = task_api::toggle_dark_mode()?;
                if json {
                    println!("{}", serde_json::json!({ "dark_mode": on }));
                } else {
                    println!("Theme set to {}", if on { "dark" } else { "light" });
                }
            }
            ThemeCommand::Show => {
                let on = task_api::dark_mode()?;
                if json {
                    println!("{}", serde_json::json!({ "dark_mode": on }));
                } else {
                    println!("Theme: {}", if on { "dark" } else { "light" });
                }
            }
        },
        Command::Filter { filter } => match filter {
            FilterCommand::Set { assignments } => {
                for assignment in &assignments {
                    let (key, value) = assignment.split_once('=').ok_or_else(|| {
                        AppError::invalid_input("filter must be in KEY=VALUE format")
                    })?;
                    filters.set(key, value)?;
                }
                print_filters(filters, json)?;
            }
            FilterCommand::Reset => {
                filters.reset();
                print_filters(filters, json)?;
            }
            FilterCommand::Show => {
                print_filters(filters, json)?;
            }
        },
    }

    Ok(())
}

fn run_interactive(session: &mut Session) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let args = match expand_alias(args, &session.aliases) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("taskdeck".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                if err.use_stderr() {
                    eprintln!("ERROR: {}", normalize_parse_error(err));
                } else {
                    println!("{err}");
                }
                continue;
            }
        };

        let json = session.json || cli.json;
        match cli.command {
            Some(command) => {
                if let Err(err) = run_command(command, json, &mut session.filters) {
                    eprintln!("ERROR: {}", err);
                }
            }
            None => print_help(),
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if err.use_stderr() {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                std::process::exit(1);
            }
            err.print().ok();
            return;
        }
    };

    match cli.command {
        Some(command) => {
            // Overrides only shape the shell's alias table, but malformed
            // ones are rejected on this path too.
            if let Err(err) = parse_overrides(&cli.config_override) {
                eprintln!("ERROR: {}", err);
                std::process::exit(1);
            }

            let mut filters = Filters::default();
            if let Err(err) = run_command(command, cli.json, &mut filters) {
                eprintln!("ERROR: {}", err);
                std::process::exit(1);
            }
        }
        None => {
            let config = match load_session_config(&cli.config_override) {
                Ok(config) => config,
                Err(err) => {
                    eprintln!("ERROR: {}", err);
                    std::process::exit(1);
                }
            };

            let mut session = Session {
                filters: Filters::default(),
                aliases: config.aliases,
                json: cli.json,
            };
            if let Err(err) = run_interactive(&mut session) {
                eprintln!("ERROR: {}", err);
                std::process::exit(1);
            }
        }
    }
}
