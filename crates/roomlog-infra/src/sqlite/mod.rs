//! SQLite storage layer.
//!
//! One repository type backed by SQLite with WAL mode and split read/write
//! connection pools. The writer pool holds a single connection, so every
//! write is serialized.

pub mod conversation;
pub mod pool;
pub mod room;
pub mod schema;

mod rows;

pub use conversation::SqliteRepository;
