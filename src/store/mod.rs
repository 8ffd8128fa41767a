//! Persistent stores: JSON-backed collections kept in memory.
//!
//! This module is split into two submodules:
//! - `file`: a single JSON document loaded once and flushed on every mutation.
//! - `repo`: the three collections the bot uses (sponsors, users, videos).
//!
//! Callers import from `tg_kinobot::store`; the repository API is re-exported.

pub mod file;
pub mod repo;

pub use file::{JsonFile, LoadPolicy, StoreError};
pub use repo::*;
