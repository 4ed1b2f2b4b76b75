//! roomlog CLI entry point.
//!
//! Binary name: `roomlog`
//!
//! Parses CLI arguments, opens the store and wires services, then dispatches
//! to the appropriate command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,roomlog=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "roomlog", &mut std::io::stdout());
        return Ok(());
    }

    // Open the store (runs the schema manager) and wire services
    let state = AppState::init().await?;

    match cli.command {
        Commands::Chat { room, timeout } => {
            cli::chat::run_chat(&state, room, timeout).await?;
        }

        Commands::Rooms => {
            cli::room::list_rooms(&state, cli.json).await?;
        }

        Commands::NewRoom => {
            cli::room::new_room(&state, cli.json).await?;
        }

        Commands::Info { room } => {
            cli::room::room_info(&state, room, cli.json).await?;
        }

        Commands::History { room, limit, offset } => {
            let limit = limit.unwrap_or(state.config.history_page_size);
            cli::history::history(&state, room, limit, offset, cli.json).await?;
        }

        Commands::Recent { room, limit } => {
            let limit = limit.unwrap_or(state.config.recent_limit);
            cli::history::recent(&state, room, limit, cli.json).await?;
        }

        Commands::Timeline { room } => {
            cli::history::timeline(&state, room, cli.json).await?;
        }

        Commands::Dump { room } => {
            cli::history::dump(&state, room, cli.json).await?;
        }

        Commands::Send {
            text,
            room,
            attach,
            module,
        } => {
            cli::message::send(&state, room, &text, attach, module, cli.json).await?;
        }

        Commands::Attach {
            reply,
            room,
            module,
            file,
        } => {
            cli::message::attach(&state, reply, room, module, file, cli.json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
