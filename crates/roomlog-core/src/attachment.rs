//! Attachment store trait.
//!
//! Defined in roomlog-core so the conversation service can place files
//! without depending on the real filesystem. The directory-backed
//! implementation lives in roomlog-infra.

use roomlog_types::attachment::{LooseAttachment, PlacedAttachment};
use roomlog_types::error::AttachmentError;
use roomlog_types::ids::RoomId;

/// Moves loose attachment files into per-room directories under sequential names.
pub trait AttachmentStore: Send + Sync {
    /// Move `attachment.source` into the room's directory as
    /// `<module>_<n>.<ext>`, where `n` is one past the highest number already
    /// used by that module in that room.
    fn place(
        &self,
        room_id: RoomId,
        attachment: &LooseAttachment,
    ) -> impl std::future::Future<Output = Result<PlacedAttachment, AttachmentError>> + Send;

    /// Undo a `place` by moving the file back to where it came from.
    fn restore(
        &self,
        placed: &PlacedAttachment,
    ) -> impl std::future::Future<Output = Result<(), AttachmentError>> + Send;
}
