//! Timeline entries: a normalized view over messages and replies.

use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::conversation::{Message, Reply};
use crate::ids::MessageId;

/// Which record a timeline entry was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Message,
    Reply,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Message => write!(f, "message"),
            EntryKind::Reply => write!(f, "reply"),
        }
    }
}

/// A single item of a room's chronological view.
///
/// `message_id` is the entry's own id for message entries and the answered
/// message's id for reply entries. `attachment_path` is only ever set on
/// reply entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub kind: EntryKind,
    pub id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub message_id: MessageId,
    pub attachment_path: Option<PathBuf>,
}

impl TimelineEntry {
    /// Total order used by the timeline: timestamp, then the owning message
    /// id, then messages before their replies, then the entry id.
    ///
    /// Under identical timestamps this reproduces insertion order for the
    /// usual message-then-reply flow.
    pub fn chronological_cmp(&self, other: &Self) -> Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then_with(|| self.message_id.cmp(&other.message_id))
            .then_with(|| self.kind_rank().cmp(&other.kind_rank()))
            .then_with(|| self.id.cmp(&other.id))
    }

    fn kind_rank(&self) -> u8 {
        match self.kind {
            EntryKind::Message => 0,
            EntryKind::Reply => 1,
        }
    }
}

impl From<Message> for TimelineEntry {
    fn from(message: Message) -> Self {
        Self {
            kind: EntryKind::Message,
            id: message.id.0,
            body: message.body,
            created_at: message.created_at,
            message_id: message.id,
            attachment_path: None,
        }
    }
}

impl From<Reply> for TimelineEntry {
    fn from(reply: Reply) -> Self {
        Self {
            kind: EntryKind::Reply,
            id: reply.id.0,
            body: reply.body,
            created_at: reply.created_at,
            message_id: reply.message_id,
            attachment_path: reply.attachment_path,
        }
    }
}
