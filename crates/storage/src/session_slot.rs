//! Session slot: the single persisted bearer token
//!
//! A session slot holds at most one token at a time. The persistent
//! implementation writes the token's raw UTF-8 bytes under [`TOKEN_KEY`],
//! the in-memory one exists so tests and short-lived tools can run several
//! independent sessions side by side.

use crate::kv::{KvError, KvStore};
use parking_lot::RwLock;
use std::sync::Arc;

/// Fixed key under which the bearer token is stored
pub const TOKEN_KEY: &str = "token";

/// Result type for session slot operations
pub type Result<T> = std::result::Result<T, KvError>;

/// Storage location for the current bearer token
///
/// Implementations must be cheap to read; the API client reads the slot on
/// every request.
pub trait SessionSlot: Send + Sync {
    /// Read the stored token, if any
    fn token(&self) -> Result<Option<String>>;

    /// Overwrite the stored token
    fn set_token(&self, token: &str) -> Result<()>;

    /// Remove the stored token, returning whether one was present
    fn clear(&self) -> Result<bool>;
}

/// Session slot persisted in a [`KvStore`]
#[derive(Debug, Clone)]
pub struct KvSessionSlot {
    kv: Arc<KvStore>,
}

impl KvSessionSlot {
    /// Create a slot backed by the given store
    pub fn new(kv: Arc<KvStore>) -> Self {
        Self { kv }
    }
}

impl SessionSlot for KvSessionSlot {
    fn token(&self) -> Result<Option<String>> {
        Ok(self.kv.get(TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    fn set_token(&self, token: &str) -> Result<()> {
        self.kv.set(TOKEN_KEY, token)
    }

    fn clear(&self) -> Result<bool> {
        self.kv.remove(TOKEN_KEY)
    }
}

/// Session slot held in process memory only
#[derive(Debug, Default, Clone)]
pub struct MemorySessionSlot {
    token: Arc<RwLock<Option<String>>>,
}

impl MemorySessionSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot that already holds a token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: Arc::new(RwLock::new(Some(token.into()))) }
    }
}

impl SessionSlot for MemorySessionSlot {
    fn token(&self) -> Result<Option<String>> {
        Ok(self.token.read().clone().filter(|t| !t.is_empty()))
    }

    fn set_token(&self, token: &str) -> Result<()> {
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<bool> {
        Ok(self.token.write().take().is_some())
    }
}
