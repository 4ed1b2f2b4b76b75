//! Room CLI commands: list, create, info.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use roomlog_infra::filesystem::room_dir;
use roomlog_types::ids::RoomId;
use roomlog_types::room::RoomSummary;

use crate::state::AppState;

/// Build the room listing table shared by `rooms` and the chat room prompt.
pub fn rooms_table(rooms: &[RoomSummary]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Room").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
        Cell::new("Last Activity").fg(Color::White),
    ]);

    for room in rooms {
        let activity = match room.last_activity {
            Some(_) => Cell::new(room.last_activity_display()),
            None => Cell::new("none").fg(Color::DarkGrey),
        };
        table.add_row(vec![
            Cell::new(room.id).fg(Color::Cyan),
            Cell::new(room.message_count),
            activity,
        ]);
    }

    table
}

/// List all rooms, most recently active first.
pub async fn list_rooms(state: &AppState, json: bool) -> Result<()> {
    let rooms = state.service.list_rooms().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rooms)?);
        return Ok(());
    }

    if rooms.is_empty() {
        println!();
        println!(
            "  {} No rooms yet. Create one with: {}",
            style("i").blue().bold(),
            style("roomlog new-room").yellow()
        );
        println!();
        return Ok(());
    }

    println!();
    println!("{}", rooms_table(&rooms));
    println!();
    println!(
        "  {} room{}",
        style(rooms.len()).bold(),
        if rooms.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Create a room unconditionally.
pub async fn new_room(state: &AppState, json: bool) -> Result<()> {
    let room_id = state.service.create_room().await?;

    if json {
        println!("{}", serde_json::json!({ "room_id": room_id }));
        return Ok(());
    }

    println!();
    println!(
        "  {} Room {} created",
        style("✓").green().bold(),
        style(room_id).cyan()
    );
    println!();

    Ok(())
}

/// Show one room's derived statistics.
pub async fn room_info(state: &AppState, room_id: RoomId, json: bool) -> Result<()> {
    let info = state.service.room_info(room_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let last_activity = info
        .last_activity
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "none".to_string());

    println!();
    println!("  {}  {}", style("Room:").bold(), style(info.id).cyan());
    println!("  {}  {}", style("Messages:").bold(), info.message_count);
    println!("  {}  {}", style("Last message:").bold(), last_activity);
    println!(
        "  {}  {}",
        style("Attachments:").bold(),
        style(room_dir(&state.data_dir, info.id).display()).dim()
    );
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_rooms_table_rows() {
        let rooms = vec![
            RoomSummary {
                id: RoomId(3),
                message_count: 2,
                last_activity: Some(Utc.with_ymd_and_hms(2025, 7, 4, 9, 0, 0).unwrap()),
            },
            RoomSummary {
                id: RoomId(1),
                message_count: 0,
                last_activity: None,
            },
        ];

        let rendered = rooms_table(&rooms).to_string();
        assert!(rendered.contains("2025-07-04 09:00:00"));
        assert!(rendered.contains("none"));
        assert!(rendered.find('3').unwrap() < rendered.rfind("none").unwrap());
    }
}
