use crate::config::{Settings, DEFAULT_SETTINGS_PATH, DEFAULT_TASKS_PATH};
use clap::Parser;
use std::path::PathBuf;

/// Collect xG statistics and match predictions from xgscore.io into per-league sheets
#[derive(Debug, Parser)]
#[command(name = "xg-scout", version)]
pub struct Cli {
    /// Task file: one object or an array of {"league", "gameweek"}
    #[arg(long, default_value = DEFAULT_TASKS_PATH, env = "XG_SCOUT_TASKS")]
    pub tasks: PathBuf,

    /// Optional settings file; missing keys fall back to defaults
    #[arg(long, default_value = DEFAULT_SETTINGS_PATH, env = "XG_SCOUT_SETTINGS")]
    pub settings: PathBuf,

    /// Directory receiving one sheet per league
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Also write a CSV copy of every sheet
    #[arg(long)]
    pub csv: bool,

    /// Also write every record as a JSON line
    #[arg(long)]
    pub jsonl: bool,

    /// Log level or filter directive (overridden by RUST_LOG)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log to the console only
    #[arg(long)]
    pub no_log_file: bool,
}

impl Cli {
    /// Apply command-line overrides on top of file settings
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(dir) = &self.output_dir {
            settings.output_dir = dir.clone();
        }
        if self.headed {
            settings.headless = false;
        }
        if self.csv {
            settings.csv = true;
        }
        if self.jsonl {
            settings.jsonl = true;
        }
        if let Some(level) = &self.log_level {
            settings.log_level = level.clone();
        }
        if self.no_log_file {
            settings.log_file = None;
        }
        settings
    }
}
