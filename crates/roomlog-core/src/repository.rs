//! Repository trait definitions.
//!
//! Room bookkeeping and conversation persistence are split into two traits so
//! the room selector only needs the former. The SQLite adapter in
//! roomlog-infra implements both on one type.
//!
//! Uses native async fn in traits (RPITIT, Rust 2024 edition).

use std::path::Path;

use roomlog_types::conversation::{Conversation, HistoryRow, Reply};
use roomlog_types::error::RepositoryError;
use roomlog_types::ids::{MessageId, ReplyId, RoomId};
use roomlog_types::room::{RoomInfo, RoomSummary};
use roomlog_types::timeline::TimelineEntry;

/// Room creation and listing.
pub trait RoomRepository: Send + Sync {
    /// List every room with its derived message count and last activity,
    /// most recently active first. Rooms without messages sort last.
    fn list_rooms(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<RoomSummary>, RepositoryError>> + Send;

    /// Insert a new room and return its store-assigned id.
    fn create_room(&self) -> impl std::future::Future<Output = Result<RoomId, RepositoryError>> + Send;

    /// Whether a room with this id exists.
    fn room_exists(
        &self,
        room_id: RoomId,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Message count and latest message time for one room.
    ///
    /// Fails with `NotFound` when the room does not exist.
    fn room_info(
        &self,
        room_id: RoomId,
    ) -> impl std::future::Future<Output = Result<RoomInfo, RepositoryError>> + Send;
}

/// Message and reply persistence plus the read views built on top of it.
pub trait ConversationRepository: Send + Sync {
    /// Store an inbound message. Fails with `NotFound` for an unknown room,
    /// leaving no row behind.
    fn save_message(
        &self,
        body: &str,
        room_id: RoomId,
    ) -> impl std::future::Future<Output = Result<MessageId, RepositoryError>> + Send;

    /// Store a reply to an existing message. Fails with `NotFound` for an
    /// unknown message.
    fn save_reply(
        &self,
        body: &str,
        message_id: MessageId,
        attachment_path: Option<&Path>,
    ) -> impl std::future::Future<Output = Result<ReplyId, RepositoryError>> + Send;

    /// Set the attachment path of an existing reply.
    fn update_reply_attachment(
        &self,
        reply_id: ReplyId,
        attachment_path: &Path,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Fetch a single reply.
    fn get_reply(
        &self,
        reply_id: ReplyId,
    ) -> impl std::future::Future<Output = Result<Option<Reply>, RepositoryError>> + Send;

    /// Number of messages in a room.
    fn count_messages(
        &self,
        room_id: RoomId,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Messages of a room joined with their replies, oldest first.
    ///
    /// `limit`/`offset` window the messages, not the joined rows.
    fn get_history(
        &self,
        room_id: RoomId,
        limit: u32,
        offset: u32,
    ) -> impl std::future::Future<Output = Result<Vec<HistoryRow>, RepositoryError>> + Send;

    /// The `n` most recent messages with their replies, returned oldest first.
    fn get_recent(
        &self,
        room_id: RoomId,
        n: u32,
    ) -> impl std::future::Future<Output = Result<Vec<HistoryRow>, RepositoryError>> + Send;

    /// Messages and replies of a room merged into one chronological sequence.
    fn get_timeline(
        &self,
        room_id: RoomId,
    ) -> impl std::future::Future<Output = Result<Vec<TimelineEntry>, RepositoryError>> + Send;

    /// Every message of a room with all of its replies.
    fn get_conversations(
        &self,
        room_id: RoomId,
    ) -> impl std::future::Future<Output = Result<Vec<Conversation>, RepositoryError>> + Send;
}
