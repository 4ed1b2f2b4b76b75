//! Interactive chat: room selection at start-up, then the chat loop.
//!
//! Room selection runs on its own task via `spawn_room_selection`; until it
//! finishes the session has no active room. Entry point: [`run_chat`].

pub mod input;
pub mod loop_runner;

use anyhow::{Context, Result};
use console::style;
use roomlog_core::selector::{spawn_room_selection, SelectorSettings};
use roomlog_infra::config::resolve_selection_timeout;
use roomlog_types::ids::RoomId;
use roomlog_types::selection::{RoomSelection, SelectionOutcome};
use tokio_util::sync::CancellationToken;

use crate::state::AppState;
use input::{spawn_line_reader, ConsolePrompt, LineSource};

/// Run `roomlog chat`.
///
/// With `--room` the room must exist and selection is skipped; otherwise the
/// room selector decides, bounded by `--timeout` or the configured timeout.
pub async fn run_chat(state: &AppState, room: Option<RoomId>, timeout: Option<u64>) -> Result<()> {
    let lines = spawn_line_reader(std::io::BufReader::new(std::io::stdin()));

    let room_id = match room {
        Some(room_id) => {
            state
                .service
                .room_info(room_id)
                .await
                .with_context(|| format!("cannot enter room {room_id}"))?;
            state.session.set_active_room(room_id);
            println!();
            println!("  {} Entered room {}", style("✓").green().bold(), style(room_id).cyan());
            room_id
        }
        None => match select_room(state, &lines, timeout).await? {
            Some(selection) => {
                print_selection(&selection);
                selection.room_id
            }
            None => return Ok(()),
        },
    };

    loop_runner::run_chat_loop(state, room_id, &lines).await
}

/// Run the room selector on its own task; `None` if interrupted.
async fn select_room(
    state: &AppState,
    lines: &LineSource,
    timeout: Option<u64>,
) -> Result<Option<RoomSelection>> {
    let settings = SelectorSettings {
        timeout: resolve_selection_timeout(&state.config, timeout),
        new_keyword: state.config.new_room_keyword.clone(),
    };
    let prompt = ConsolePrompt::new(lines.clone(), settings.clone());
    let cancel = CancellationToken::new();

    let mut handle = spawn_room_selection(
        state.repository(),
        prompt,
        settings,
        state.session.clone(),
        cancel.clone(),
    );

    tokio::select! {
        joined = &mut handle => {
            let selection = joined.context("room selection task failed")??;
            Ok(selection)
        }
        _ = crate::shutdown_signal() => {
            cancel.cancel();
            let _ = handle.await;
            println!();
            Ok(None)
        }
    }
}

fn print_selection(selection: &RoomSelection) {
    println!();
    let outcome = &selection.outcome;
    if !outcome.created_room() {
        println!(
            "  {} Entered room {}",
            style("✓").green().bold(),
            style(selection.room_id).cyan()
        );
    } else if matches!(outcome, SelectionOutcome::NoRooms | SelectionOutcome::NewRequested) {
        println!(
            "  {} Created room {}",
            style("✓").green().bold(),
            style(selection.room_id).cyan()
        );
    } else {
        println!(
            "  {} {}, created room {}",
            style("!").yellow().bold(),
            outcome,
            style(selection.room_id).cyan()
        );
    }
}
