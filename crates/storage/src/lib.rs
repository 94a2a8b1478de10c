//! Storage layer for Perpus Admin
//!
//! This crate provides the key-value store and the session slot that holds
//! the current bearer token.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod kv;
pub mod session_slot;

pub use kv::{KvConfig, KvError, KvStore};
pub use session_slot::{KvSessionSlot, MemorySessionSlot, SessionSlot, TOKEN_KEY};
