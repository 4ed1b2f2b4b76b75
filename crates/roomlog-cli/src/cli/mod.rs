//! CLI command definitions and dispatch for the `roomlog` binary.
//!
//! Uses clap derive macros for argument parsing. Room, message and reply ids
//! are plain integers on the command line.

pub mod chat;
pub mod history;
pub mod message;
pub mod room;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use roomlog_types::ids::{ReplyId, RoomId};

/// Keep a conversation log, grouped into rooms.
#[derive(Parser)]
#[command(name = "roomlog", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pick or create a room, then chat in it (type `exit` to leave).
    Chat {
        /// Enter this room directly instead of asking.
        #[arg(long)]
        room: Option<RoomId>,

        /// Seconds to wait for a room choice before creating a new room.
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// List rooms, most recently active first.
    #[command(alias = "ls")]
    Rooms,

    /// Create a new room.
    #[command(name = "new-room")]
    NewRoom,

    /// Show message count and last activity of a room.
    Info {
        /// Room id.
        room: RoomId,
    },

    /// Paginated message history of a room, oldest first.
    History {
        /// Room id.
        room: RoomId,

        /// Messages per page (defaults to `history_page_size`).
        #[arg(short, long)]
        limit: Option<u32>,

        /// Messages to skip.
        #[arg(short, long, default_value = "0")]
        offset: u32,
    },

    /// The most recent messages of a room, oldest first.
    Recent {
        /// Room id.
        room: RoomId,

        /// Number of messages (defaults to `recent_limit`).
        #[arg(short = 'n', long)]
        limit: Option<u32>,
    },

    /// Messages and replies of a room as one chronological stream.
    Timeline {
        /// Room id.
        room: RoomId,
    },

    /// Every message of a room with all of its replies.
    Dump {
        /// Room id.
        room: RoomId,
    },

    /// Store a message and its generated reply.
    Send {
        /// Message text.
        text: String,

        /// Target room.
        #[arg(long)]
        room: RoomId,

        /// Loose file to attach to the reply.
        #[arg(long, requires = "module")]
        attach: Option<PathBuf>,

        /// Producer tag used to number the attachment.
        #[arg(long, requires = "attach")]
        module: Option<String>,
    },

    /// Move a loose file into a room and record it on an existing reply.
    Attach {
        /// Reply id.
        reply: ReplyId,

        /// Room whose directory receives the file.
        #[arg(long)]
        room: RoomId,

        /// Producer tag used to number the attachment.
        #[arg(long)]
        module: String,

        /// Loose file to move.
        file: PathBuf,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
