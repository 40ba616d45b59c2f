use serde::{Deserialize, Serialize};

use super::task::FilterMode;

/// Configuration from config.toml in the data directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub confirm: ConfirmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Name of the storage slot; the file is `<slot>.json`
    #[serde(default = "default_slot")]
    pub slot: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            slot: default_slot(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Filter used by `tl list` when none is given
    #[serde(default)]
    pub default_filter: FilterMode,
    /// chrono format string for due dates
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Show the created date next to the due date
    #[serde(default)]
    pub show_created: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            default_filter: FilterMode::All,
            date_format: default_date_format(),
            show_created: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmConfig {
    /// Ask before deleting a task or clearing the list
    #[serde(default = "default_true")]
    pub deletes: bool,
}

impl Default for ConfirmConfig {
    fn default() -> Self {
        ConfirmConfig { deletes: true }
    }
}

fn default_slot() -> String {
    "todos".to_string()
}

fn default_date_format() -> String {
    "%m/%d/%Y %I:%M %p".to_string()
}

fn default_true() -> bool {
    true
}
