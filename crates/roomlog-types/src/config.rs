//! Global configuration types for roomlog.
//!
//! `RoomlogConfig` represents the `config.toml` file in the data directory.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.roomlog/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomlogConfig {
    /// How long the room selector waits for an answer, in seconds.
    #[serde(default = "default_selection_timeout_secs")]
    pub selection_timeout_secs: u64,

    /// Keyword that asks the selector for a fresh room (case-insensitive).
    #[serde(default = "default_new_room_keyword")]
    pub new_room_keyword: String,

    /// SQLite file name, relative to the data directory.
    #[serde(default = "default_database_file")]
    pub database_file: String,

    /// Default page size for history views.
    #[serde(default = "default_history_page_size")]
    pub history_page_size: u32,

    /// Default number of messages in the "recent" view.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: u32,
}

fn default_selection_timeout_secs() -> u64 {
    30
}

fn default_new_room_keyword() -> String {
    "new".to_string()
}

fn default_database_file() -> String {
    "roomlog.db".to_string()
}

fn default_history_page_size() -> u32 {
    100
}

fn default_recent_limit() -> u32 {
    10
}

impl Default for RoomlogConfig {
    fn default() -> Self {
        Self {
            selection_timeout_secs: default_selection_timeout_secs(),
            new_room_keyword: default_new_room_keyword(),
            database_file: default_database_file(),
            history_page_size: default_history_page_size(),
            recent_limit: default_recent_limit(),
        }
    }
}
