use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The kind of record a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Room,
    Message,
    Reply,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Room => write!(f, "room"),
            Entity::Message => write!(f, "message"),
            Entity::Reply => write!(f, "reply"),
        }
    }
}

/// Errors from repository operations (used by trait definitions in roomlog-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },
}

impl RepositoryError {
    pub fn not_found(entity: Entity, id: impl Into<i64>) -> Self {
        RepositoryError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Errors from placing an attachment into a room directory.
#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("attachment source not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("invalid module name: '{0}'")]
    InvalidModule(String),

    #[error("no sequence number left for module '{module}' in {}", dir.display())]
    SequenceExhausted { module: String, dir: PathBuf },

    #[error("attachment i/o error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AttachmentError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AttachmentError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors surfaced by the conversation service to its callers.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("no active room yet")]
    NoActiveRoom,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Attachment(#[from] AttachmentError),
}
