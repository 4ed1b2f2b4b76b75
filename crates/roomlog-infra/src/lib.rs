//! Infrastructure layer for roomlog.
//!
//! Contains implementations of the traits defined in `roomlog-core`: the
//! SQLite store (pool, schema manager, repository), the directory-backed
//! attachment namer, and the `config.toml` loader.

pub mod config;
pub mod filesystem;
pub mod sqlite;
