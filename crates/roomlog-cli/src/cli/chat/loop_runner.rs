//! The interactive chat loop run after a room is active.

use std::io::Write;

use anyhow::Result;
use console::style;
use roomlog_core::attachment::AttachmentStore;
use roomlog_core::reply::ReplyGenerator;
use roomlog_core::repository::{ConversationRepository, RoomRepository};
use roomlog_core::service::ConversationService;
use roomlog_core::session::SessionContext;
use roomlog_types::conversation::Exchange;
use roomlog_types::error::ConversationError;
use roomlog_types::ids::RoomId;

use super::input::LineSource;
use crate::cli::message::print_exchange;
use crate::state::AppState;

/// Word that ends the chat loop.
pub const EXIT_COMMAND: &str = "exit";

/// What one input line led to.
#[derive(Debug)]
pub enum LineAction {
    Exit,
    Skip,
    Sent(Exchange),
}

/// Handle one input line against the session's active room.
pub async fn handle_line<R, A, G>(
    service: &ConversationService<R, A, G>,
    session: &SessionContext,
    line: &str,
) -> Result<LineAction, ConversationError>
where
    R: RoomRepository + ConversationRepository,
    A: AttachmentStore,
    G: ReplyGenerator,
{
    let text = line.trim();
    if text.is_empty() {
        return Ok(LineAction::Skip);
    }
    if text.eq_ignore_ascii_case(EXIT_COMMAND) {
        return Ok(LineAction::Exit);
    }
    let exchange = service.send_message(session, None, text).await?;
    Ok(LineAction::Sent(exchange))
}

/// Read lines until `exit`, end of input, or Ctrl+C.
///
/// A failed message is reported and the loop keeps going.
pub async fn run_chat_loop(state: &AppState, room_id: RoomId, lines: &LineSource) -> Result<()> {
    println!(
        "  {}",
        style(format!("Type '{EXIT_COMMAND}' to leave.")).dim()
    );

    loop {
        print!("{} ", style(format!("room {room_id} >")).cyan().bold());
        let _ = std::io::stdout().flush();

        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = crate::shutdown_signal() => {
                println!();
                break;
            }
        };
        let Some(line) = line else {
            println!();
            break;
        };

        match handle_line(&*state.service, &state.session, &line).await {
            Ok(LineAction::Exit) => break,
            Ok(LineAction::Skip) => continue,
            Ok(LineAction::Sent(exchange)) => print_exchange(&exchange),
            Err(e) => {
                tracing::warn!(room_id = %room_id, error = %e, "Message not stored");
                eprintln!("  {} {e}", style("✗").red().bold());
            }
        }
    }

    println!("  {}", style("Bye.").dim());
    Ok(())
}
