//! Process-wide session context.
//!
//! Holds the single "active room" of the process. It starts empty, is set
//! once by the room selector (or by an explicit `--room`), and is read by
//! every operation that defaults to the active room. Operations that run
//! before selection finishes get `ConversationError::NoActiveRoom` instead
//! of blocking.

use std::sync::Arc;

use roomlog_types::error::ConversationError;
use roomlog_types::ids::RoomId;
use tokio::sync::watch;

/// Cloneable handle to the active-room state.
#[derive(Clone)]
pub struct SessionContext {
    active_room: Arc<watch::Sender<Option<RoomId>>>,
}

impl SessionContext {
    /// Create a context with no active room.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            active_room: Arc::new(tx),
        }
    }

    /// Create a context whose active room is already known.
    pub fn with_room(room_id: RoomId) -> Self {
        let ctx = Self::new();
        ctx.set_active_room(room_id);
        ctx
    }

    /// The active room, if selection has completed.
    pub fn active_room(&self) -> Option<RoomId> {
        *self.active_room.borrow()
    }

    /// The active room, or `NoActiveRoom` if selection has not completed.
    pub fn require_active_room(&self) -> Result<RoomId, ConversationError> {
        self.active_room().ok_or(ConversationError::NoActiveRoom)
    }

    /// Record the active room. Later calls replace the value.
    pub fn set_active_room(&self, room_id: RoomId) {
        self.active_room.send_replace(Some(room_id));
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
