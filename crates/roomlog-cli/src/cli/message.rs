//! One-shot message commands: send a message, attach a file to a reply.

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use roomlog_types::attachment::LooseAttachment;
use roomlog_types::conversation::Exchange;
use roomlog_types::ids::{ReplyId, RoomId};

use crate::state::AppState;

pub(crate) fn print_exchange(exchange: &Exchange) {
    println!(
        "  {} {}",
        style(format!("[{}]", exchange.reply_id)).dim(),
        style(&exchange.reply_body).green()
    );
    if let Some(path) = &exchange.attachment_path {
        println!("      {} {}", style("attached").dim(), path.display());
    }
}

/// Store a message in `room_id` together with its generated reply.
pub async fn send(
    state: &AppState,
    room_id: RoomId,
    text: &str,
    attach: Option<PathBuf>,
    module: Option<String>,
    json: bool,
) -> Result<()> {
    let exchange = match (attach, module) {
        (Some(source), Some(module)) => {
            state
                .service
                .send_message_with_attachment(
                    &state.session,
                    Some(room_id),
                    text,
                    LooseAttachment::new(source, module),
                )
                .await?
        }
        _ => {
            state
                .service
                .send_message(&state.session, Some(room_id), text)
                .await?
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&exchange)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Message {} stored in room {}",
        style("✓").green().bold(),
        style(exchange.message_id).cyan(),
        style(exchange.room_id).cyan()
    );
    print_exchange(&exchange);
    println!();

    Ok(())
}

/// Move `file` into the room's directory and record it on `reply_id`.
pub async fn attach(
    state: &AppState,
    reply_id: ReplyId,
    room_id: RoomId,
    module: String,
    file: PathBuf,
    json: bool,
) -> Result<()> {
    let path = state
        .service
        .attach_to_reply(reply_id, room_id, LooseAttachment::new(file, module))
        .await?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "reply_id": reply_id, "attachment_path": path })
        );
        return Ok(());
    }

    println!();
    println!(
        "  {} Reply {} now carries {}",
        style("✓").green().bold(),
        style(reply_id).cyan(),
        style(path.display()).yellow()
    );
    println!();

    Ok(())
}
