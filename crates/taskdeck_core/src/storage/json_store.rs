use crate::error::AppError;
use crate::model::Task;
use crate::store::tasks::TasksState;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

pub const SCHEMA_VERSION: u32 = 2;
const STORE_FILE_NAME: &str = "store.json";

#[derive(Debug, Serialize, Deserialize)]
struct StoredState {
    schema_version: u32,
    tasks: Vec<Task>,
    #[serde(default)]
    history: Vec<Task>,
    #[serde(default)]
    dark_mode: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StoreState {
    pub tasks: TasksState,
    pub dark_mode: bool,
}

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var("TASKDECK_STORE_PATH")
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("taskdeck")
            .join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("taskdeck")
            .join(STORE_FILE_NAME))
    }
}

pub fn load_state(path: &Path) -> Result<StoreState, AppError> {
    if !path.exists() {
        return Ok(StoreState::default());
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let stored: StoredState =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    Ok(StoreState {
        tasks: TasksState {
            active: stored.tasks,
            history: stored.history,
        },
        dark_mode: stored.dark_mode,
    })
}

/// Load the store, falling back to an empty state when the file cannot be
/// read. The failure is logged and the next save overwrites the bad file.
pub fn load_state_with_fallback(path: &Path) -> StoreState {
    match load_state(path) {
        Ok(state) => state,
        Err(err) => {
            warn!("failed to read store at {}: {}", path.display(), err);
            StoreState::default()
        }
    }
}

pub fn save_state(path: &Path, state: &StoreState) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredState {
        schema_version: SCHEMA_VERSION,
        tasks: state.tasks.active.to_vec(),
        history: state.tasks.history.to_vec(),
        dark_mode: state.dark_mode,
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    Ok(())
}
