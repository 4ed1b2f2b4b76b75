//! Room selector: decides which room is active for this process.
//!
//! Runs once at startup:
//!
//! ```text
//! START -> no rooms ---------------------------------> CREATED
//! START -> LISTING -> AWAIT_INPUT -> timeout --------> CREATED
//!                                 -> input closed ---> CREATED
//!                                 -> unparseable ----> CREATED
//!                                 -> unknown id -----> CREATED
//!                                 -> "new" keyword --> CREATED
//!                                 -> listed id ------> SELECTED
//! ```
//!
//! Only the wait for an answer is time-bounded. [`spawn_room_selection`] runs
//! the whole protocol on its own task so the rest of the process keeps
//! working; until it finishes, [`SessionContext::active_room`] is `None`.

use std::time::Duration;

use roomlog_types::error::RepositoryError;
use roomlog_types::ids::RoomId;
use roomlog_types::room::RoomSummary;
use roomlog_types::selection::{RoomSelection, SelectionOutcome};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::repository::RoomRepository;
use crate::session::SessionContext;

/// Source of the operator's answer.
pub trait RoomPrompt: Send {
    /// Present the listed rooms and wait for one line of input.
    ///
    /// Returns `None` when the input source is closed. The selector bounds
    /// this call with its timeout, so implementations may wait indefinitely.
    fn ask(
        &mut self,
        rooms: &[RoomSummary],
    ) -> impl std::future::Future<Output = Option<String>> + Send;
}

/// What an answer resolves to before any store access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Existing(RoomId),
    Create(SelectionOutcome),
}

/// Interpret one line of operator input against the listed rooms.
pub fn interpret_answer(answer: &str, rooms: &[RoomSummary], new_keyword: &str) -> Choice {
    let answer = answer.trim();
    if answer.eq_ignore_ascii_case(new_keyword) {
        return Choice::Create(SelectionOutcome::NewRequested);
    }
    match answer.parse::<i64>() {
        Ok(id) if rooms.iter().any(|room| room.id.0 == id) => Choice::Existing(RoomId(id)),
        Ok(id) => Choice::Create(SelectionOutcome::UnknownRoom(id)),
        Err(_) => Choice::Create(SelectionOutcome::Unparseable(answer.to_string())),
    }
}

/// Settings for one selection run.
#[derive(Debug, Clone)]
pub struct SelectorSettings {
    pub timeout: Duration,
    pub new_keyword: String,
}

impl Default for SelectorSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            new_keyword: "new".to_string(),
        }
    }
}

/// Runs the selection protocol against a room repository.
pub struct RoomSelector<'a, R: RoomRepository> {
    rooms: &'a R,
    settings: SelectorSettings,
}

impl<'a, R: RoomRepository> RoomSelector<'a, R> {
    pub fn new(rooms: &'a R, settings: SelectorSettings) -> Self {
        Self { rooms, settings }
    }

    /// Resolve the active room. Always ends with exactly one room id.
    pub async fn select<P: RoomPrompt>(&self, prompt: &mut P) -> Result<RoomSelection, RepositoryError> {
        let listed = self.rooms.list_rooms().await?;
        if listed.is_empty() {
            return self.create(SelectionOutcome::NoRooms).await;
        }

        let choice = match tokio::time::timeout(self.settings.timeout, prompt.ask(&listed)).await {
            Ok(Some(answer)) => interpret_answer(&answer, &listed, &self.settings.new_keyword),
            Ok(None) => Choice::Create(SelectionOutcome::InputClosed),
            Err(_) => Choice::Create(SelectionOutcome::TimedOut),
        };

        match choice {
            Choice::Existing(room_id) => {
                info!(room_id = %room_id, "Entered existing room");
                Ok(RoomSelection {
                    room_id,
                    outcome: SelectionOutcome::Selected,
                })
            }
            Choice::Create(outcome) => self.create(outcome).await,
        }
    }

    async fn create(&self, outcome: SelectionOutcome) -> Result<RoomSelection, RepositoryError> {
        match &outcome {
            SelectionOutcome::NoRooms | SelectionOutcome::NewRequested => {
                info!(reason = %outcome, "Creating a new room");
            }
            _ => warn!(reason = %outcome, "Falling back to a new room"),
        }
        let room_id = self.rooms.create_room().await?;
        info!(room_id = %room_id, "Room created");
        Ok(RoomSelection { room_id, outcome })
    }
}

/// Run room selection on its own task and publish the result to `session`.
///
/// Resolves to `Ok(None)` when `cancel` fires before selection finishes; in
/// that case no room is created and the session stays without a room.
pub fn spawn_room_selection<R, P>(
    rooms: R,
    mut prompt: P,
    settings: SelectorSettings,
    session: SessionContext,
    cancel: CancellationToken,
) -> JoinHandle<Result<Option<RoomSelection>, RepositoryError>>
where
    R: RoomRepository + 'static,
    P: RoomPrompt + 'static,
{
    tokio::spawn(async move {
        let selector = RoomSelector::new(&rooms, settings);
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Room selection cancelled");
                Ok(None)
            }
            selection = selector.select(&mut prompt) => {
                let selection = selection?;
                session.set_active_room(selection.room_id);
                Ok(Some(selection))
            }
        }
    })
}
