//! Line input shared by the room prompt and the chat loop.
//!
//! A single reader thread owns the input and forwards lines over a channel.
//! The room prompt and the chat loop both pull from the same `LineSource`,
//! so a line typed after the room prompt timed out is still delivered to the
//! chat loop instead of being lost.

use std::io::{BufRead, Write};
use std::sync::Arc;

use console::style;
use roomlog_core::selector::{RoomPrompt, SelectorSettings};
use roomlog_types::room::RoomSummary;
use tokio::sync::{mpsc, Mutex};

use crate::cli::room::rooms_table;

/// Cloneable handle to the line channel.
#[derive(Clone)]
pub struct LineSource {
    rx: Arc<Mutex<mpsc::Receiver<String>>>,
}

impl LineSource {
    /// Next input line, or `None` once the input is closed.
    ///
    /// Cancel-safe: dropping the future never loses a line.
    pub async fn next_line(&self) -> Option<String> {
        self.rx.lock().await.recv().await
    }
}

/// Read lines from `reader` on a dedicated thread.
///
/// A plain thread rather than a runtime task, so a pending read never holds
/// up runtime shutdown.
pub fn spawn_line_reader<R>(reader: R) -> LineSource
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Input read failed, closing input");
                    break;
                }
            }
        }
    });
    LineSource {
        rx: Arc::new(Mutex::new(rx)),
    }
}

/// Terminal room prompt: prints the room table and waits for one line.
pub struct ConsolePrompt {
    lines: LineSource,
    settings: SelectorSettings,
}

impl ConsolePrompt {
    pub fn new(lines: LineSource, settings: SelectorSettings) -> Self {
        Self { lines, settings }
    }
}

impl RoomPrompt for ConsolePrompt {
    async fn ask(&mut self, rooms: &[RoomSummary]) -> Option<String> {
        println!();
        println!("{}", rooms_table(rooms));
        println!();
        print!(
            "  Enter a room id or '{}' ({}s): ",
            style(&self.settings.new_keyword).yellow(),
            self.settings.timeout.as_secs()
        );
        let _ = std::io::stdout().flush();

        self.lines.next_line().await
    }
}
