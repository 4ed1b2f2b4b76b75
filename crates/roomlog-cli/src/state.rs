//! Application state wiring all services together.
//!
//! `ConversationService` is generic over repository, attachment store and
//! reply generator; AppState pins it to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use roomlog_core::reply::EchoReplyGenerator;
use roomlog_core::service::ConversationService;
use roomlog_core::session::SessionContext;
use roomlog_infra::config::load_config;
use roomlog_infra::filesystem::{resolve_data_dir, LocalAttachmentStore};
use roomlog_infra::sqlite::pool::DatabasePool;
use roomlog_infra::sqlite::SqliteRepository;
use roomlog_types::config::RoomlogConfig;

/// Concrete type alias for the service generics pinned to infra implementations.
pub type ConcreteConversationService =
    ConversationService<SqliteRepository, LocalAttachmentStore, EchoReplyGenerator>;

/// Shared application state used by every command.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ConcreteConversationService>,
    pub session: SessionContext,
    pub config: RoomlogConfig,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: load config, open the store, wire services.
    ///
    /// A schema failure here aborts startup.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("cannot create data directory {}", data_dir.display()))?;

        let config = load_config(&data_dir).await;

        let db_pool = DatabasePool::open(&data_dir, &config.database_file)
            .await
            .with_context(|| format!("cannot open store {}", data_dir.join(&config.database_file).display()))?;

        let service = ConversationService::new(
            SqliteRepository::new(db_pool),
            LocalAttachmentStore::new(data_dir.clone()),
            EchoReplyGenerator,
        );

        tracing::debug!(data_dir = %data_dir.display(), "Application state ready");

        Ok(Self {
            service: Arc::new(service),
            session: SessionContext::new(),
            config,
            data_dir,
        })
    }

    /// A handle to the repository for work that runs on its own task.
    pub fn repository(&self) -> SqliteRepository {
        self.service.repo().clone()
    }
}
