//! Room selection results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::RoomId;

/// How the room selector reached its terminal state.
///
/// Only `Selected` ends without creating a room; every other outcome created
/// a fresh room. The distinction is kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum SelectionOutcome {
    /// The store had no rooms, so one was created without prompting.
    NoRooms,
    /// The operator picked an existing room.
    Selected,
    /// The operator typed the "create new" keyword.
    NewRequested,
    /// No answer arrived before the timeout.
    TimedOut,
    /// Input ended (EOF) before an answer arrived.
    InputClosed,
    /// The answer was neither a number nor the keyword.
    Unparseable(String),
    /// The answer was a number that matches no listed room.
    UnknownRoom(i64),
}

impl SelectionOutcome {
    /// Whether reaching this outcome created a new room.
    pub fn created_room(&self) -> bool {
        !matches!(self, SelectionOutcome::Selected)
    }
}

impl fmt::Display for SelectionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionOutcome::NoRooms => write!(f, "no existing rooms"),
            SelectionOutcome::Selected => write!(f, "selected existing room"),
            SelectionOutcome::NewRequested => write!(f, "new room requested"),
            SelectionOutcome::TimedOut => write!(f, "selection timed out"),
            SelectionOutcome::InputClosed => write!(f, "input closed"),
            SelectionOutcome::Unparseable(input) => write!(f, "unparseable input '{input}'"),
            SelectionOutcome::UnknownRoom(id) => write!(f, "room {id} does not exist"),
        }
    }
}

/// Terminal state of the room selector: exactly one active room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSelection {
    pub room_id: RoomId,
    pub outcome: SelectionOutcome,
}
