//! `RoomRepository` for `SqliteRepository`.
//!
//! Rooms carry no attributes besides their id; message count and last
//! activity are derived on every read.

use roomlog_core::repository::RoomRepository;
use roomlog_types::error::{Entity, RepositoryError};
use roomlog_types::ids::RoomId;
use roomlog_types::room::{RoomInfo, RoomSummary};
use sqlx::Row;

use super::conversation::SqliteRepository;
use super::rows::{parse_optional_datetime, query_error};

/// Room listing with derived columns.
///
/// `last_jd` is the latest reply time of the room when it has replies,
/// otherwise its latest message time, as a Julian day so both stored
/// timestamp formats compare correctly. Rooms without messages have a NULL
/// `last_jd` and sort last; ties fall back to the newer room first.
const LIST_ROOMS_SQL: &str = r#"
SELECT id,
       message_count,
       strftime('%Y-%m-%dT%H:%M:%fZ', last_jd) AS last_activity
FROM (
    SELECT r.id AS id,
           COUNT(m.id) AS message_count,
           COALESCE(
               (SELECT MAX(julianday(rp.created_at))
                FROM replies rp
                JOIN messages mm ON mm.id = rp.message_id
                WHERE mm.room_id = r.id),
               MAX(julianday(m.created_at))
           ) AS last_jd
    FROM rooms r
    LEFT JOIN messages m ON m.room_id = r.id
    GROUP BY r.id
)
ORDER BY last_jd IS NULL, last_jd DESC, id DESC
"#;

impl RoomRepository for SqliteRepository {
    async fn list_rooms(&self) -> Result<Vec<RoomSummary>, RepositoryError> {
        let rows = sqlx::query(LIST_ROOMS_SQL)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter()
            .map(|row| {
                let id: i64 = row.try_get("id").map_err(query_error)?;
                let message_count: i64 = row.try_get("message_count").map_err(query_error)?;
                let last_activity: Option<String> =
                    row.try_get("last_activity").map_err(query_error)?;
                Ok(RoomSummary {
                    id: RoomId(id),
                    message_count: message_count as u64,
                    last_activity: parse_optional_datetime(last_activity)?,
                })
            })
            .collect()
    }

    async fn create_room(&self) -> Result<RoomId, RepositoryError> {
        let result = sqlx::query("INSERT INTO rooms DEFAULT VALUES")
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;
        Ok(RoomId(result.last_insert_rowid()))
    }

    async fn room_exists(&self, room_id: RoomId) -> Result<bool, RepositoryError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM rooms WHERE id = ?")
            .bind(room_id.0)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;
        Ok(row.is_some())
    }

    async fn room_info(&self, room_id: RoomId) -> Result<RoomInfo, RepositoryError> {
        if !self.room_exists(room_id).await? {
            return Err(RepositoryError::not_found(Entity::Room, room_id.0));
        }

        let (message_count, last_activity): (i64, Option<String>) = sqlx::query_as(
            "SELECT COUNT(id),
                    strftime('%Y-%m-%dT%H:%M:%fZ', MAX(julianday(created_at)))
             FROM messages WHERE room_id = ?",
        )
        .bind(room_id.0)
        .fetch_one(&self.pool.reader)
        .await
        .map_err(query_error)?;

        Ok(RoomInfo {
            id: room_id,
            message_count: message_count as u64,
            last_activity: parse_optional_datetime(last_activity)?,
        })
    }
}
