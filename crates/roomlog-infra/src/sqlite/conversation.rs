//! SQLite conversation repository.
//!
//! Implements `ConversationRepository` from `roomlog-core` using sqlx with
//! split read/write pools. Writes that reference a parent row check it inside
//! the same writer transaction so a missing parent yields `NotFound` and no
//! row; the foreign keys enforce the same thing underneath.
//!
//! Ordering everywhere is `julianday(created_at)` then id, so rows with equal
//! timestamps come back in insertion order.

use std::collections::HashMap;
use std::path::Path;

use roomlog_core::repository::ConversationRepository;
use roomlog_core::timeline::merge_timeline;
use roomlog_types::conversation::{Conversation, HistoryRow, Message, Reply};
use roomlog_types::error::{Entity, RepositoryError};
use roomlog_types::ids::{MessageId, ReplyId, RoomId};
use roomlog_types::timeline::TimelineEntry;

use super::pool::DatabasePool;
use super::rows::{HistoryJoinRow, MessageRow, ReplyRow, query_error};

/// SQLite-backed implementation of both repository traits.
#[derive(Clone)]
pub struct SqliteRepository {
    pub(super) pool: DatabasePool,
}

impl SqliteRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    async fn room_messages(&self, room_id: RoomId) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, room_id, body, created_at FROM messages
             WHERE room_id = ?
             ORDER BY julianday(created_at) ASC, id ASC",
        )
        .bind(room_id.0)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter()
            .map(|row| MessageRow::from_row(row).map_err(query_error)?.into_message())
            .collect()
    }

    /// Replies of a room in timeline order.
    async fn room_replies(&self, room_id: RoomId) -> Result<Vec<Reply>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT r.id, r.message_id, r.body, r.attachment_path, r.created_at
             FROM replies r
             JOIN messages m ON m.id = r.message_id
             WHERE m.room_id = ?
             ORDER BY julianday(r.created_at) ASC, r.message_id ASC, r.id ASC",
        )
        .bind(room_id.0)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter()
            .map(|row| ReplyRow::from_row(row).map_err(query_error)?.into_reply())
            .collect()
    }

    async fn history_rows(
        &self,
        sql: &str,
        room_id: RoomId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<HistoryRow>, RepositoryError> {
        let rows = sqlx::query(sql)
            .bind(room_id.0)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter()
            .map(|row| {
                HistoryJoinRow::from_row(row)
                    .map_err(query_error)?
                    .into_history_row()
            })
            .collect()
    }
}

/// Windowed message/reply join; `$window` orders the message subquery
/// before LIMIT/OFFSET apply.
macro_rules! history_sql {
    ($window:literal) => {
        concat!(
            "SELECT m.id AS message_id, m.room_id AS room_id, m.body AS message_body,
                    m.created_at AS message_created_at,
                    r.id AS reply_id, r.body AS reply_body,
                    r.attachment_path AS reply_attachment_path, r.created_at AS reply_created_at
             FROM (SELECT id, room_id, body, created_at FROM messages
                   WHERE room_id = ?
                   ORDER BY ",
            $window,
            " LIMIT ? OFFSET ?) m
             LEFT JOIN replies r ON r.message_id = m.id
             ORDER BY julianday(m.created_at) ASC, m.id ASC,
                      julianday(r.created_at) ASC, r.id ASC"
        )
    };
}

const HISTORY_SQL: &str = history_sql!("julianday(created_at) ASC, id ASC");
const RECENT_SQL: &str = history_sql!("julianday(created_at) DESC, id DESC");

// ---------------------------------------------------------------------------
// ConversationRepository implementation
// ---------------------------------------------------------------------------

impl ConversationRepository for SqliteRepository {
    async fn save_message(&self, body: &str, room_id: RoomId) -> Result<MessageId, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let room: Option<(i64,)> = sqlx::query_as("SELECT id FROM rooms WHERE id = ?")
            .bind(room_id.0)
            .fetch_optional(&mut *tx)
            .await
            .map_err(query_error)?;
        if room.is_none() {
            return Err(RepositoryError::not_found(Entity::Room, room_id.0));
        }

        let result = sqlx::query("INSERT INTO messages (room_id, body) VALUES (?, ?)")
            .bind(room_id.0)
            .bind(body)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;

        Ok(MessageId(result.last_insert_rowid()))
    }

    async fn save_reply(
        &self,
        body: &str,
        message_id: MessageId,
        attachment_path: Option<&Path>,
    ) -> Result<ReplyId, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let message: Option<(i64,)> = sqlx::query_as("SELECT id FROM messages WHERE id = ?")
            .bind(message_id.0)
            .fetch_optional(&mut *tx)
            .await
            .map_err(query_error)?;
        if message.is_none() {
            return Err(RepositoryError::not_found(Entity::Message, message_id.0));
        }

        let result = sqlx::query(
            "INSERT INTO replies (message_id, body, attachment_path) VALUES (?, ?, ?)",
        )
        .bind(message_id.0)
        .bind(body)
        .bind(attachment_path.map(|p| p.to_string_lossy().into_owned()))
        .execute(&mut *tx)
        .await
        .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;

        Ok(ReplyId(result.last_insert_rowid()))
    }

    async fn update_reply_attachment(
        &self,
        reply_id: ReplyId,
        attachment_path: &Path,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE replies SET attachment_path = ? WHERE id = ?")
            .bind(attachment_path.to_string_lossy().into_owned())
            .bind(reply_id.0)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(Entity::Reply, reply_id.0));
        }
        Ok(())
    }

    async fn get_reply(&self, reply_id: ReplyId) -> Result<Option<Reply>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, message_id, body, attachment_path, created_at FROM replies WHERE id = ?",
        )
        .bind(reply_id.0)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(query_error)?;

        match row {
            Some(row) => {
                let reply_row = ReplyRow::from_row(&row).map_err(query_error)?;
                Ok(Some(reply_row.into_reply()?))
            }
            None => Ok(None),
        }
    }

    async fn count_messages(&self, room_id: RoomId) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages WHERE room_id = ?")
            .bind(room_id.0)
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;
        Ok(count as u64)
    }

    async fn get_history(
        &self,
        room_id: RoomId,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<HistoryRow>, RepositoryError> {
        self.history_rows(HISTORY_SQL, room_id, i64::from(limit), i64::from(offset))
            .await
    }

    async fn get_recent(&self, room_id: RoomId, n: u32) -> Result<Vec<HistoryRow>, RepositoryError> {
        self.history_rows(RECENT_SQL, room_id, i64::from(n), 0).await
    }

    async fn get_timeline(&self, room_id: RoomId) -> Result<Vec<TimelineEntry>, RepositoryError> {
        let messages = self.room_messages(room_id).await?;
        let replies = self.room_replies(room_id).await?;
        Ok(merge_timeline(messages, replies))
    }

    async fn get_conversations(&self, room_id: RoomId) -> Result<Vec<Conversation>, RepositoryError> {
        let messages = self.room_messages(room_id).await?;
        let mut by_message: HashMap<MessageId, Vec<Reply>> = HashMap::new();
        for reply in self.room_replies(room_id).await? {
            by_message.entry(reply.message_id).or_default().push(reply);
        }

        Ok(messages
            .into_iter()
            .map(|message| {
                let replies = by_message.remove(&message.id).unwrap_or_default();
                Conversation { message, replies }
            })
            .collect())
    }
}
