//! In-memory fakes of the core traits for unit tests.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use roomlog_types::attachment::{LooseAttachment, PlacedAttachment};
use roomlog_types::conversation::{Conversation, HistoryRow, Message, Reply};
use roomlog_types::error::{AttachmentError, Entity, RepositoryError};
use roomlog_types::ids::{MessageId, ReplyId, RoomId};
use roomlog_types::room::{RoomInfo, RoomSummary};
use roomlog_types::timeline::TimelineEntry;

use crate::attachment::AttachmentStore;
use crate::repository::{ConversationRepository, RoomRepository};
use crate::timeline::merge_timeline;

#[derive(Default)]
struct State {
    rooms: Vec<RoomId>,
    messages: Vec<Message>,
    replies: Vec<Reply>,
    ticks: i64,
    fail_reply_writes: bool,
}

impl State {
    fn tick(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        Utc.with_ymd_and_hms(2025, 7, 4, 0, 0, 0).unwrap() + Duration::seconds(self.ticks)
    }

    fn rows_for(&self, messages: &[Message]) -> Vec<HistoryRow> {
        let mut rows = Vec::new();
        for message in messages {
            let replies: Vec<&Reply> = self
                .replies
                .iter()
                .filter(|r| r.message_id == message.id)
                .collect();
            if replies.is_empty() {
                rows.push(HistoryRow {
                    message: message.clone(),
                    reply: None,
                });
            }
            for reply in replies {
                rows.push(HistoryRow {
                    message: message.clone(),
                    reply: Some(reply.clone()),
                });
            }
        }
        rows
    }

    fn room_messages(&self, room_id: RoomId) -> Vec<Message> {
        self.messages
            .iter()
            .filter(|m| m.room_id == room_id)
            .cloned()
            .collect()
    }
}

/// Shared in-memory store implementing both repository traits.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    state: Arc<Mutex<State>>,
    list_calls: Arc<AtomicUsize>,
}

impl MemoryRepository {
    pub fn with_rooms(ids: &[i64]) -> Self {
        let repo = Self::default();
        repo.state.lock().unwrap().rooms = ids.iter().copied().map(RoomId).collect();
        repo
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.state.lock().unwrap().rooms.clone()
    }

    pub fn reply_count(&self) -> usize {
        self.state.lock().unwrap().replies.len()
    }

    pub fn message_count(&self) -> usize {
        self.state.lock().unwrap().messages.len()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Make every subsequent reply write fail with a query error.
    pub fn fail_reply_writes(&self) {
        self.state.lock().unwrap().fail_reply_writes = true;
    }
}

impl RoomRepository for MemoryRepository {
    async fn list_rooms(&self) -> Result<Vec<RoomSummary>, RepositoryError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        Ok(state
            .rooms
            .iter()
            .map(|id| {
                let messages = state.room_messages(*id);
                RoomSummary {
                    id: *id,
                    message_count: messages.len() as u64,
                    last_activity: messages.iter().map(|m| m.created_at).max(),
                }
            })
            .collect())
    }

    async fn create_room(&self) -> Result<RoomId, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let next = state.rooms.iter().map(|r| r.0).max().unwrap_or(0) + 1;
        state.rooms.push(RoomId(next));
        Ok(RoomId(next))
    }

    async fn room_exists(&self, room_id: RoomId) -> Result<bool, RepositoryError> {
        Ok(self.state.lock().unwrap().rooms.contains(&room_id))
    }

    async fn room_info(&self, room_id: RoomId) -> Result<RoomInfo, RepositoryError> {
        let state = self.state.lock().unwrap();
        if !state.rooms.contains(&room_id) {
            return Err(RepositoryError::not_found(Entity::Room, room_id.0));
        }
        let messages = state.room_messages(room_id);
        Ok(RoomInfo {
            id: room_id,
            message_count: messages.len() as u64,
            last_activity: messages.iter().map(|m| m.created_at).max(),
        })
    }
}

impl ConversationRepository for MemoryRepository {
    async fn save_message(&self, body: &str, room_id: RoomId) -> Result<MessageId, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if !state.rooms.contains(&room_id) {
            return Err(RepositoryError::not_found(Entity::Room, room_id.0));
        }
        let id = MessageId(state.messages.len() as i64 + 1);
        let created_at = state.tick();
        state.messages.push(Message {
            id,
            room_id,
            body: body.to_string(),
            created_at,
        });
        Ok(id)
    }

    async fn save_reply(
        &self,
        body: &str,
        message_id: MessageId,
        attachment_path: Option<&Path>,
    ) -> Result<ReplyId, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_reply_writes {
            return Err(RepositoryError::Query("disk I/O error".to_string()));
        }
        if !state.messages.iter().any(|m| m.id == message_id) {
            return Err(RepositoryError::not_found(Entity::Message, message_id.0));
        }
        let id = ReplyId(state.replies.len() as i64 + 1);
        let created_at = state.tick();
        state.replies.push(Reply {
            id,
            message_id,
            body: body.to_string(),
            attachment_path: attachment_path.map(Path::to_path_buf),
            created_at,
        });
        Ok(id)
    }

    async fn update_reply_attachment(
        &self,
        reply_id: ReplyId,
        attachment_path: &Path,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_reply_writes {
            return Err(RepositoryError::Query("disk I/O error".to_string()));
        }
        let reply = state
            .replies
            .iter_mut()
            .find(|r| r.id == reply_id)
            .ok_or_else(|| RepositoryError::not_found(Entity::Reply, reply_id.0))?;
        reply.attachment_path = Some(attachment_path.to_path_buf());
        Ok(())
    }

    async fn get_reply(&self, reply_id: ReplyId) -> Result<Option<Reply>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.replies.iter().find(|r| r.id == reply_id).cloned())
    }

    async fn count_messages(&self, room_id: RoomId) -> Result<u64, RepositoryError> {
        Ok(self.state.lock().unwrap().room_messages(room_id).len() as u64)
    }

    async fn get_history(
        &self,
        room_id: RoomId,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<HistoryRow>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let window: Vec<Message> = state
            .room_messages(room_id)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok(state.rows_for(&window))
    }

    async fn get_recent(&self, room_id: RoomId, n: u32) -> Result<Vec<HistoryRow>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let messages = state.room_messages(room_id);
        let skip = messages.len().saturating_sub(n as usize);
        let window: Vec<Message> = messages.into_iter().skip(skip).collect();
        Ok(state.rows_for(&window))
    }

    async fn get_timeline(&self, room_id: RoomId) -> Result<Vec<TimelineEntry>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let messages = state.room_messages(room_id);
        let replies = state
            .replies
            .iter()
            .filter(|r| messages.iter().any(|m| m.id == r.message_id))
            .cloned()
            .collect();
        Ok(merge_timeline(messages, replies))
    }

    async fn get_conversations(&self, room_id: RoomId) -> Result<Vec<Conversation>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .room_messages(room_id)
            .into_iter()
            .map(|message| {
                let replies = state
                    .replies
                    .iter()
                    .filter(|r| r.message_id == message.id)
                    .cloned()
                    .collect();
                Conversation { message, replies }
            })
            .collect())
    }
}

/// Records placements without touching the filesystem.
#[derive(Clone, Default)]
pub struct RecordingAttachments {
    placed: Arc<Mutex<Vec<PlacedAttachment>>>,
    restored: Arc<Mutex<Vec<PlacedAttachment>>>,
    fail_with_missing_source: bool,
}

impl RecordingAttachments {
    pub fn failing() -> Self {
        Self {
            fail_with_missing_source: true,
            ..Self::default()
        }
    }

    pub fn placed(&self) -> Vec<PlacedAttachment> {
        self.placed.lock().unwrap().clone()
    }

    pub fn restored(&self) -> Vec<PlacedAttachment> {
        self.restored.lock().unwrap().clone()
    }
}

impl AttachmentStore for RecordingAttachments {
    async fn place(
        &self,
        room_id: RoomId,
        attachment: &LooseAttachment,
    ) -> Result<PlacedAttachment, AttachmentError> {
        if self.fail_with_missing_source {
            return Err(AttachmentError::SourceMissing(attachment.source.clone()));
        }
        let mut placed = self.placed.lock().unwrap();
        let sequence = placed.len() as u64 + 1;
        let record = PlacedAttachment {
            path: PathBuf::from(format!("/data/room_{room_id}/{}_{sequence}.jpeg", attachment.module)),
            origin: attachment.source.clone(),
            sequence,
        };
        placed.push(record.clone());
        Ok(record)
    }

    async fn restore(&self, placed: &PlacedAttachment) -> Result<(), AttachmentError> {
        self.restored.lock().unwrap().push(placed.clone());
        Ok(())
    }
}
