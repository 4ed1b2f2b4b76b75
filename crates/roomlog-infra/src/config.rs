//! Configuration loader for roomlog.
//!
//! Reads `config.toml` from the data directory (`~/.roomlog/` in production)
//! and deserializes it into [`RoomlogConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::Path;
use std::time::Duration;

use roomlog_types::config::RoomlogConfig;

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`RoomlogConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and
///   returns the default.
pub async fn load_config(data_dir: &Path) -> RoomlogConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return RoomlogConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return RoomlogConfig::default();
        }
    };

    match toml::from_str::<RoomlogConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            RoomlogConfig::default()
        }
    }
}

/// Room selector timeout, with an optional CLI override in seconds.
///
/// A zero timeout is raised to one second so the prompt is shown at all.
pub fn resolve_selection_timeout(config: &RoomlogConfig, override_secs: Option<u64>) -> Duration {
    let secs = override_secs.unwrap_or(config.selection_timeout_secs);
    Duration::from_secs(secs.max(1))
}
