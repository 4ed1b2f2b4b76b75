//! Filesystem adapters for roomlog.
//!
//! Data-directory layout helpers and the directory-backed attachment store.
//! Room `N` keeps its attachments in `{data_dir}/room_N/`.

pub mod attachment;

use std::path::{Path, PathBuf};

use roomlog_types::ids::RoomId;

pub use attachment::LocalAttachmentStore;

/// Compute a room's attachment directory: `{data_dir}/room_{id}/`.
pub fn room_dir(data_dir: &Path, room_id: RoomId) -> PathBuf {
    data_dir.join(format!("room_{room_id}"))
}

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `ROOMLOG_DATA_DIR` environment variable
/// 2. `~/.roomlog`
/// 3. `./.roomlog` when no home directory is known
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ROOMLOG_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".roomlog");
    }

    PathBuf::from(".roomlog")
}
