//! Conversation service orchestrating rooms, messages, replies and attachments.
//!
//! `ConversationService` is the surface the outer layers (CLI today, an HTTP
//! layer if one is added) talk to. It resolves the target room from an
//! explicit id or the session's active room, persists each inbound message
//! with its generated reply, and keeps the attachment move and the reply
//! write consistent: a reply never records a path whose move failed, and a
//! moved file never outlives a failed reply write.

use std::path::PathBuf;

use roomlog_types::attachment::{validate_module_name, LooseAttachment, PlacedAttachment};
use roomlog_types::conversation::{Conversation, Exchange, HistoryPage, HistoryRow};
use roomlog_types::error::{ConversationError, Entity, RepositoryError};
use roomlog_types::ids::{ReplyId, RoomId};
use roomlog_types::room::{RoomInfo, RoomSummary};
use roomlog_types::timeline::TimelineEntry;
use tracing::{debug, info, warn};

use crate::attachment::AttachmentStore;
use crate::reply::ReplyGenerator;
use crate::repository::{ConversationRepository, RoomRepository};
use crate::session::SessionContext;

/// Orchestrates conversation persistence.
///
/// Generic over the repository, attachment store and reply generator so
/// roomlog-core never depends on roomlog-infra.
pub struct ConversationService<R, A, G>
where
    R: RoomRepository + ConversationRepository,
    A: AttachmentStore,
    G: ReplyGenerator,
{
    repo: R,
    attachments: A,
    generator: G,
}

impl<R, A, G> ConversationService<R, A, G>
where
    R: RoomRepository + ConversationRepository,
    A: AttachmentStore,
    G: ReplyGenerator,
{
    pub fn new(repo: R, attachments: A, generator: G) -> Self {
        Self {
            repo,
            attachments,
            generator,
        }
    }

    /// Access the repository (e.g. to hand a clone to the room selector).
    pub fn repo(&self) -> &R {
        &self.repo
    }

    // --- Rooms ---

    pub async fn list_rooms(&self) -> Result<Vec<RoomSummary>, ConversationError> {
        Ok(self.repo.list_rooms().await?)
    }

    pub async fn create_room(&self) -> Result<RoomId, ConversationError> {
        let room_id = self.repo.create_room().await?;
        info!(room_id = %room_id, "Room created");
        Ok(room_id)
    }

    pub async fn room_info(&self, room_id: RoomId) -> Result<RoomInfo, ConversationError> {
        Ok(self.repo.room_info(room_id).await?)
    }

    /// Pick the explicit room if given, otherwise the session's active room.
    pub fn resolve_room(
        &self,
        session: &SessionContext,
        room_id: Option<RoomId>,
    ) -> Result<RoomId, ConversationError> {
        match room_id {
            Some(room_id) => Ok(room_id),
            None => session.require_active_room(),
        }
    }

    // --- Messages and replies ---

    /// Persist an inbound message and the reply produced for it.
    ///
    /// If the generator names an attachment, it is placed before the reply is
    /// written; a failed placement fails the call without writing the reply.
    pub async fn send_message(
        &self,
        session: &SessionContext,
        room_id: Option<RoomId>,
        text: &str,
    ) -> Result<Exchange, ConversationError> {
        self.exchange(session, room_id, text, None).await
    }

    /// Like [`send_message`](Self::send_message), but with an attachment
    /// supplied by the caller instead of the generator.
    pub async fn send_message_with_attachment(
        &self,
        session: &SessionContext,
        room_id: Option<RoomId>,
        text: &str,
        attachment: LooseAttachment,
    ) -> Result<Exchange, ConversationError> {
        self.exchange(session, room_id, text, Some(attachment)).await
    }

    async fn exchange(
        &self,
        session: &SessionContext,
        room_id: Option<RoomId>,
        text: &str,
        attachment: Option<LooseAttachment>,
    ) -> Result<Exchange, ConversationError> {
        let room_id = self.resolve_room(session, room_id)?;
        if text.trim().is_empty() {
            return Err(ConversationError::Validation("message text is empty".to_string()));
        }
        if let Some(loose) = &attachment {
            validate_module_name(&loose.module)?;
        }
        let message_id = self.repo.save_message(text, room_id).await?;
        debug!(room_id = %room_id, message_id = %message_id, "Message saved");

        let generated = self.generator.generate(text).await;
        let attachment = attachment.or(generated.attachment);

        let (reply_id, attachment_path) = match attachment {
            Some(loose) => {
                let placed = self.place(room_id, &loose).await?;
                let written = self
                    .repo
                    .save_reply(&generated.body, message_id, Some(&placed.path))
                    .await;
                let reply_id = self.rollback_on_err(&placed, written).await?;
                (reply_id, Some(placed.path))
            }
            None => {
                let reply_id = self.repo.save_reply(&generated.body, message_id, None).await?;
                (reply_id, None)
            }
        };
        debug!(message_id = %message_id, reply_id = %reply_id, "Reply saved");

        Ok(Exchange {
            room_id,
            message_id,
            reply_id,
            reply_body: generated.body,
            attachment_path,
        })
    }

    /// Attach a loose file to an existing reply.
    ///
    /// The reply must exist before anything is moved; if recording the path
    /// fails afterwards, the file is moved back.
    pub async fn attach_to_reply(
        &self,
        reply_id: ReplyId,
        room_id: RoomId,
        attachment: LooseAttachment,
    ) -> Result<PathBuf, ConversationError> {
        if self.repo.get_reply(reply_id).await?.is_none() {
            return Err(RepositoryError::not_found(Entity::Reply, reply_id.0).into());
        }

        let placed = self.place(room_id, &attachment).await?;
        let written = self.repo.update_reply_attachment(reply_id, &placed.path).await;
        self.rollback_on_err(&placed, written).await?;
        info!(reply_id = %reply_id, path = %placed.path.display(), "Attachment recorded");
        Ok(placed.path)
    }

    async fn place(
        &self,
        room_id: RoomId,
        attachment: &LooseAttachment,
    ) -> Result<PlacedAttachment, ConversationError> {
        validate_module_name(&attachment.module)?;
        let placed = self.attachments.place(room_id, attachment).await?;
        info!(
            room_id = %room_id,
            module = %attachment.module,
            path = %placed.path.display(),
            "Attachment placed"
        );
        Ok(placed)
    }

    /// Move `placed` back to its origin if the write that records it failed.
    async fn rollback_on_err<T>(
        &self,
        placed: &PlacedAttachment,
        written: Result<T, RepositoryError>,
    ) -> Result<T, ConversationError> {
        match written {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(path = %placed.path.display(), error = %e, "Reply write failed, restoring attachment");
                if let Err(restore_err) = self.attachments.restore(placed).await {
                    warn!(
                        path = %placed.path.display(),
                        error = %restore_err,
                        "Could not move attachment back"
                    );
                }
                Err(e.into())
            }
        }
    }

    // --- Read views ---

    pub async fn count_messages(&self, room_id: RoomId) -> Result<u64, ConversationError> {
        Ok(self.repo.count_messages(room_id).await?)
    }

    /// One page of a room's history plus pagination metadata.
    pub async fn history(
        &self,
        room_id: RoomId,
        limit: u32,
        offset: u32,
    ) -> Result<HistoryPage, ConversationError> {
        let rows = self.repo.get_history(room_id, limit, offset).await?;
        let total = self.repo.count_messages(room_id).await?;
        Ok(HistoryPage::new(room_id, rows, limit, offset, total))
    }

    pub async fn recent(&self, room_id: RoomId, n: u32) -> Result<Vec<HistoryRow>, ConversationError> {
        Ok(self.repo.get_recent(room_id, n).await?)
    }

    /// Chronological timeline; `NotFound` for an unknown room.
    pub async fn timeline(&self, room_id: RoomId) -> Result<Vec<TimelineEntry>, ConversationError> {
        self.ensure_room(room_id).await?;
        Ok(self.repo.get_timeline(room_id).await?)
    }

    /// Every message with all of its replies; `NotFound` for an unknown room.
    pub async fn conversations(&self, room_id: RoomId) -> Result<Vec<Conversation>, ConversationError> {
        self.ensure_room(room_id).await?;
        Ok(self.repo.get_conversations(room_id).await?)
    }

    async fn ensure_room(&self, room_id: RoomId) -> Result<(), ConversationError> {
        if !self.repo.room_exists(room_id).await? {
            return Err(RepositoryError::not_found(Entity::Room, room_id.0).into());
        }
        Ok(())
    }
}
