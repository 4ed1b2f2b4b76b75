//! Message, reply, and history types.
//!
//! A `Message` is one inbound unit of conversation text inside a room; a
//! `Reply` answers exactly one message and may carry one attachment path.
//! Neither is mutated after creation except for the reply's attachment path.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{MessageId, ReplyId, RoomId};

/// An inbound message stored in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub room_id: RoomId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A reply to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub id: ReplyId,
    pub message_id: MessageId,
    pub body: String,
    /// Absolute path of the attached file, if any.
    pub attachment_path: Option<PathBuf>,
    pub created_at: DateTime<Utc>,
}

/// One message joined with one of its replies.
///
/// A message without replies yields a single row with `reply: None`; a
/// message with several replies yields one row per reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub message: Message,
    pub reply: Option<Reply>,
}

/// Paginated history of a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPage {
    pub room_id: RoomId,
    pub rows: Vec<HistoryRow>,
    pub limit: u32,
    pub offset: u32,
    pub total_messages: u64,
    pub has_more: bool,
}

impl HistoryPage {
    /// Build a page, deriving `has_more` from the window and the total.
    pub fn new(room_id: RoomId, rows: Vec<HistoryRow>, limit: u32, offset: u32, total_messages: u64) -> Self {
        let has_more = u64::from(offset) + u64::from(limit) < total_messages;
        Self {
            room_id,
            rows,
            limit,
            offset,
            total_messages,
            has_more,
        }
    }
}

/// A message together with all of its replies, in chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub message: Message,
    pub replies: Vec<Reply>,
}

/// Result of persisting one inbound message and its generated reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    pub room_id: RoomId,
    pub message_id: MessageId,
    pub reply_id: ReplyId,
    pub reply_body: String,
    pub attachment_path: Option<PathBuf>,
}
