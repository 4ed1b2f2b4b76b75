//! Private row types for SQLite-to-domain mapping.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDateTime, Utc};
use roomlog_types::conversation::{HistoryRow, Message, Reply};
use roomlog_types::error::RepositoryError;
use roomlog_types::ids::{MessageId, ReplyId, RoomId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

pub(super) struct MessageRow {
    id: i64,
    room_id: i64,
    body: String,
    created_at: String,
}

impl MessageRow {
    pub(super) fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            room_id: row.try_get("room_id")?,
            body: row.try_get("body")?,
            created_at: row.try_get("created_at")?,
        })
    }

    pub(super) fn into_message(self) -> Result<Message, RepositoryError> {
        Ok(Message {
            id: MessageId(self.id),
            room_id: RoomId(self.room_id),
            body: self.body,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

pub(super) struct ReplyRow {
    id: i64,
    message_id: i64,
    body: String,
    attachment_path: Option<String>,
    created_at: String,
}

impl ReplyRow {
    pub(super) fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            message_id: row.try_get("message_id")?,
            body: row.try_get("body")?,
            attachment_path: row.try_get("attachment_path")?,
            created_at: row.try_get("created_at")?,
        })
    }

    pub(super) fn into_reply(self) -> Result<Reply, RepositoryError> {
        Ok(Reply {
            id: ReplyId(self.id),
            message_id: MessageId(self.message_id),
            body: self.body,
            attachment_path: self.attachment_path.map(PathBuf::from),
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

/// One row of the message/reply LEFT JOIN used by history views.
///
/// Reply columns are all NULL when the message has no reply.
pub(super) struct HistoryJoinRow {
    message: MessageRow,
    reply_id: Option<i64>,
    reply_body: Option<String>,
    reply_attachment_path: Option<String>,
    reply_created_at: Option<String>,
}

impl HistoryJoinRow {
    pub(super) fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            message: MessageRow {
                id: row.try_get("message_id")?,
                room_id: row.try_get("room_id")?,
                body: row.try_get("message_body")?,
                created_at: row.try_get("message_created_at")?,
            },
            reply_id: row.try_get("reply_id")?,
            reply_body: row.try_get("reply_body")?,
            reply_attachment_path: row.try_get("reply_attachment_path")?,
            reply_created_at: row.try_get("reply_created_at")?,
        })
    }

    pub(super) fn into_history_row(self) -> Result<HistoryRow, RepositoryError> {
        let message = self.message.into_message()?;
        let reply = match (self.reply_id, self.reply_body, self.reply_created_at) {
            (Some(id), Some(body), Some(created_at)) => Some(Reply {
                id: ReplyId(id),
                message_id: message.id,
                body,
                attachment_path: self.reply_attachment_path.map(PathBuf::from),
                created_at: parse_datetime(&created_at)?,
            }),
            _ => None,
        };
        Ok(HistoryRow { message, reply })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a stored timestamp.
///
/// Accepts RFC 3339 (what the store writes now) and the legacy
/// `YYYY-MM-DD HH:MM:SS[.fff]` form, which is taken as UTC.
pub(super) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| RepositoryError::Query(format!("invalid datetime '{s}': {e}")))
}

pub(super) fn parse_optional_datetime(
    s: Option<String>,
) -> Result<Option<DateTime<Utc>>, RepositoryError> {
    s.as_deref().map(parse_datetime).transpose()
}

pub(super) fn query_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_parse_store_timestamp() {
        let dt = parse_datetime("2025-07-04T09:30:00.125Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 7, 4, 9, 30, 0).unwrap() + chrono::Duration::milliseconds(125));
    }

    #[test]
    fn test_parse_legacy_timestamp() {
        let dt = parse_datetime("2025-07-04 09:30:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 7, 4, 9, 30, 0).unwrap());

        let fractional = parse_datetime("2025-07-04 09:30:00.5").unwrap();
        assert_eq!(fractional.nanosecond(), 500_000_000);
    }

    #[test]
    fn test_parse_garbage_is_query_error() {
        let err = parse_datetime("yesterday").unwrap_err();
        assert!(matches!(err, RepositoryError::Query(_)));
    }
}
