//! Read-only views over a room: history, recent, timeline, dump.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use roomlog_types::conversation::HistoryRow;
use roomlog_types::ids::RoomId;
use roomlog_types::timeline::{EntryKind, TimelineEntry};

use crate::state::AppState;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Shorten `text` to at most `max` characters for table display.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

fn history_table(rows: &[HistoryRow]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Msg").fg(Color::White),
        Cell::new("Time").fg(Color::White),
        Cell::new("Message").fg(Color::White),
        Cell::new("Reply").fg(Color::White),
        Cell::new("Attachment").fg(Color::White),
    ]);

    for row in rows {
        let (reply, attachment) = match &row.reply {
            Some(reply) => (
                Cell::new(truncate(&reply.body, 60)).fg(Color::Green),
                Cell::new(
                    reply
                        .attachment_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default(),
                )
                .fg(Color::DarkGrey),
            ),
            None => (Cell::new("-").fg(Color::DarkGrey), Cell::new("")),
        };
        table.add_row(vec![
            Cell::new(row.message.id).fg(Color::Cyan),
            Cell::new(row.message.created_at.format(TIME_FORMAT)),
            Cell::new(truncate(&row.message.body, 60)),
            reply,
            attachment,
        ]);
    }

    table
}

/// One page of a room's history.
pub async fn history(state: &AppState, room_id: RoomId, limit: u32, offset: u32, json: bool) -> Result<()> {
    let page = state.service.history(room_id, limit, offset).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    if page.rows.is_empty() {
        println!();
        println!("  {} No messages in this window.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    println!();
    println!("{}", history_table(&page.rows));
    println!();
    println!(
        "  Messages {}-{} of {}{}",
        offset + 1,
        (u64::from(offset) + u64::from(limit)).min(page.total_messages),
        style(page.total_messages).bold(),
        if page.has_more {
            format!("  (next: --offset {})", offset + limit)
        } else {
            String::new()
        }
    );
    println!();

    Ok(())
}

/// The latest messages of a room, oldest first.
pub async fn recent(state: &AppState, room_id: RoomId, n: u32, json: bool) -> Result<()> {
    let rows = state.service.recent(room_id, n).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!();
    if rows.is_empty() {
        println!("  {} No messages yet.", style("i").blue().bold());
    } else {
        println!("{}", history_table(&rows));
    }
    println!();

    Ok(())
}

fn timeline_line(entry: &TimelineEntry) -> String {
    let time = entry.created_at.format(TIME_FORMAT).to_string();
    let mut line = match entry.kind {
        EntryKind::Message => format!(
            "  {} {} {}",
            style(time).dim(),
            style(format!("[message {}]", entry.id)).cyan(),
            entry.body
        ),
        EntryKind::Reply => format!(
            "  {} {} {}",
            style(time).dim(),
            style(format!("[reply {} -> {}]", entry.id, entry.message_id)).green(),
            entry.body
        ),
    };
    if let Some(path) = &entry.attachment_path {
        line.push_str(&format!(" {}", style(format!("({})", path.display())).dim()));
    }
    line
}

/// Messages and replies of a room in one chronological stream.
pub async fn timeline(state: &AppState, room_id: RoomId, json: bool) -> Result<()> {
    let entries = state.service.timeline(room_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!();
    if entries.is_empty() {
        println!("  {} Room {} is empty.", style("i").blue().bold(), room_id);
    }
    for entry in &entries {
        println!("{}", timeline_line(entry));
    }
    println!();

    Ok(())
}

/// Every message with all of its replies, plus totals.
pub async fn dump(state: &AppState, room_id: RoomId, json: bool) -> Result<()> {
    let conversations = state.service.conversations(room_id).await?;
    let total_replies: usize = conversations.iter().map(|c| c.replies.len()).sum();

    if json {
        let body = serde_json::json!({
            "room_id": room_id,
            "total_messages": conversations.len(),
            "total_replies": total_replies,
            "conversations": conversations,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!();
    for conversation in &conversations {
        let message = &conversation.message;
        println!(
            "  {} {} {}",
            style(message.created_at.format(TIME_FORMAT)).dim(),
            style(format!("#{}", message.id)).cyan().bold(),
            message.body
        );
        for reply in &conversation.replies {
            let attachment = reply
                .attachment_path
                .as_ref()
                .map(|p| format!(" ({})", p.display()))
                .unwrap_or_default();
            println!(
                "      {} {}{}",
                style("↳").green(),
                reply.body,
                style(attachment).dim()
            );
        }
    }
    println!();
    println!(
        "  {} messages, {} replies",
        style(conversations.len()).bold(),
        style(total_replies).bold()
    );
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
        assert_eq!(truncate("안녕하세요 반갑습니다", 6), "안녕하...");
    }
}
