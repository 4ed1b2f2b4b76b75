//! Room listing and summary types.
//!
//! A room has no persisted attributes besides its id. Message count and last
//! activity are derived on every read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::RoomId;

/// One row of the room listing.
///
/// `last_activity` is the latest reply timestamp in the room when any reply
/// exists, otherwise the latest message timestamp, otherwise `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: RoomId,
    pub message_count: u64,
    pub last_activity: Option<DateTime<Utc>>,
}

/// Detail view for a single room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    pub id: RoomId,
    pub message_count: u64,
    /// Latest message timestamp in the room.
    pub last_activity: Option<DateTime<Utc>>,
}

impl RoomSummary {
    /// Human-readable last activity, `"none"` for rooms without messages.
    pub fn last_activity_display(&self) -> String {
        self.last_activity
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "none".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_last_activity_display() {
        let empty = RoomSummary {
            id: RoomId(1),
            message_count: 0,
            last_activity: None,
        };
        assert_eq!(empty.last_activity_display(), "none");

        let active = RoomSummary {
            id: RoomId(2),
            message_count: 3,
            last_activity: Some(Utc.with_ymd_and_hms(2025, 7, 4, 9, 30, 0).unwrap()),
        };
        assert_eq!(active.last_activity_display(), "2025-07-04 09:30:00");
    }
}
