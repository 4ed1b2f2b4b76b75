//! Business logic and trait definitions for roomlog.
//!
//! This crate defines the "ports" (repository, attachment store, reply
//! generator, room prompt) that the infrastructure and CLI layers implement.
//! It depends only on `roomlog-types` -- never on `roomlog-infra` or any
//! database/IO crate.

pub mod attachment;
pub mod reply;
pub mod repository;
pub mod selector;
pub mod service;
pub mod session;
pub mod timeline;

#[cfg(test)]
mod testing;
