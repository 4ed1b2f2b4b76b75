//! Shared domain types for roomlog.
//!
//! Rooms, messages, replies, timeline entries, room-selection results,
//! configuration, and the error enums shared by every layer.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod attachment;
pub mod config;
pub mod conversation;
pub mod error;
pub mod ids;
pub mod room;
pub mod selection;
pub mod timeline;
