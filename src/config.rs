//! Task file and runtime settings.

use crate::models::Task;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_TASKS_PATH: &str = "config/data_collection_settings.json";
pub const DEFAULT_SETTINGS_PATH: &str = "config/settings.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no tasks configured")]
    Empty,

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A task file holds either one task object or an array of them
#[derive(Deserialize)]
#[serde(untagged)]
enum TaskDocument {
    Many(Vec<Task>),
    One(Task),
}

/// Parse a task document, normalizing a single object to a one-element list
pub fn parse_tasks(raw: &str) -> Result<Vec<Task>, ConfigError> {
    if raw.trim().is_empty() {
        return Err(ConfigError::Empty);
    }

    // Decode to a Value first so malformed JSON reports a position instead of
    // the untagged enum's generic mismatch message.
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let tasks = match serde_json::from_value::<TaskDocument>(value) {
        Ok(TaskDocument::Many(tasks)) => tasks,
        Ok(TaskDocument::One(task)) => {
            info!("Task file holds a single object, treating it as a list");
            vec![task]
        }
        Err(_) => {
            return Err(ConfigError::Invalid(
                "expected an object or an array of objects with 'league' and 'gameweek'".to_string(),
            ))
        }
    };

    if tasks.is_empty() {
        return Err(ConfigError::Empty);
    }

    for task in &tasks {
        if task.league.trim().is_empty() {
            return Err(ConfigError::Invalid("task with an empty league name".to_string()));
        }
        if task.gameweeks.to_vec().is_empty() {
            warn!(league = %task.league, "Task lists no gameweeks, nothing to visit");
        }
    }

    Ok(tasks)
}

/// Read and parse the task file
pub async fn load_tasks(path: &Path) -> Result<Vec<Task>, ConfigError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let tasks = parse_tasks(&raw)?;
    info!("Loaded {} task(s) from {}", tasks.len(), path.display());
    Ok(tasks)
}

/// Runtime knobs; every field has a default so the settings file is optional
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub landing_url: String,
    pub wait_timeout_secs: u64,
    pub pause_min_secs: f64,
    pub pause_max_secs: f64,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub idle_browser_timeout_secs: u64,
    pub output_dir: PathBuf,
    pub csv: bool,
    pub jsonl: bool,
    pub log_file: Option<PathBuf>,
    pub log_retention_days: usize,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            landing_url: crate::scrapers::LANDING_URL.to_string(),
            wait_timeout_secs: 10,
            pause_min_secs: 2.0,
            pause_max_secs: 5.0,
            headless: true,
            window_width: 1920,
            window_height: 1080,
            idle_browser_timeout_secs: 180,
            output_dir: PathBuf::from("data"),
            csv: false,
            jsonl: false,
            log_file: Some(PathBuf::from("logs/app.log")),
            log_retention_days: 7,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when the file is absent
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        match tokio::fs::read_to_string(path).await {
            Ok(raw) => Self::from_json(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if url::Url::parse(&self.landing_url).is_err() {
            return Err(ConfigError::Invalid(format!(
                "landing_url '{}' is not an absolute URL",
                self.landing_url
            )));
        }
        if self.pause_min_secs < 0.0 || self.pause_max_secs < 0.0 {
            return Err(ConfigError::Invalid("pause bounds must not be negative".to_string()));
        }
        if self.log_retention_days == 0 {
            return Err(ConfigError::Invalid("log_retention_days must be at least 1".to_string()));
        }
        if self.pause_min_secs > self.pause_max_secs {
            return Err(ConfigError::Invalid(
                "pause_min_secs is larger than pause_max_secs".to_string(),
            ));
        }
        Ok(())
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}
