//! Session context and bearer-token claims
//!
//! The [`SessionContext`] is the explicit handle through which the API
//! client reaches the session slot. It is passed to the client at
//! construction; the token itself is read from the slot on every request.
//!
//! # Example
//!
//! ```rust
//! use perpus_client::session::SessionContext;
//!
//! let session = SessionContext::in_memory();
//! assert!(!session.is_authenticated());
//!
//! session.set_token("header.payload.signature").unwrap();
//! assert!(session.is_authenticated());
//!
//! session.clear().unwrap();
//! assert_eq!(session.token(), None);
//! ```

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use storage::{KvError, MemorySessionSlot, SessionSlot};
use thiserror::Error;

/// Errors that can occur during session operations
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session slot could not be read or written
    #[error("Session storage error: {0}")]
    Storage(#[from] KvError),

    /// The token is not a well-formed JWT
    #[error("Token parsing error: {0}")]
    TokenParse(#[from] jsonwebtoken::errors::Error),

    /// Refused to store an empty token
    #[error("Refusing to store an empty token")]
    EmptyToken,
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Injectable handle to the session slot
#[derive(Clone)]
pub struct SessionContext {
    slot: Arc<dyn SessionSlot>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl SessionContext {
    /// Create a context over an existing slot
    pub fn new(slot: Arc<dyn SessionSlot>) -> Self {
        Self { slot }
    }

    /// Create a context over a fresh in-memory slot
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionSlot::new()))
    }

    /// Current token, read from the slot now
    ///
    /// A slot that cannot be read is treated as holding no token.
    pub fn token(&self) -> Option<String> {
        match self.slot.token() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read session slot, continuing without token");
                None
            }
        }
    }

    /// Overwrite the stored token
    pub fn set_token(&self, token: &str) -> Result<()> {
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        self.slot.set_token(token)?;
        Ok(())
    }

    /// Clear the stored token, returning whether one was present
    pub fn clear(&self) -> Result<bool> {
        Ok(self.slot.clear()?)
    }

    /// Whether a token is currently stored
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Claims of the stored token, if it is a readable JWT
    pub fn claims(&self) -> Option<TokenClaims> {
        let token = self.token()?;
        parse_token_claims(&token).ok()
    }

    /// Whether a token is stored and its `exp` claim has passed
    ///
    /// Missing tokens, opaque tokens and tokens without `exp` are not
    /// reported as expired; the server decides those.
    pub fn is_expired(&self) -> bool {
        self.claims().is_some_and(|claims| claims.is_expired())
    }
}

/// Claims carried by the server's bearer token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// Username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Expiration timestamp (seconds since the epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Additional claims
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TokenClaims {
    /// Expiration time, if the token carries one
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Whether the `exp` claim is present and has passed
    pub fn is_expired(&self) -> bool {
        self.expires_at().is_some_and(|expires_at| expires_at <= Utc::now())
    }
}

/// Parse token claims without verifying the signature
///
/// Only for display and expiry hints; the server remains the authority on
/// whether a token is valid.
pub fn parse_token_claims(token: &str) -> Result<TokenClaims> {
    let header = decode_header(token)?;

    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();

    let token_data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(token_data.claims)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    pub(crate) fn make_token(username: &str, exp: i64) -> String {
        let claims = serde_json::json!({
            "id": 7,
            "username": username,
            "email": format!("{}@example.com", username),
            "exp": exp,
        });
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test-secret")).unwrap()
    }

    #[test]
    fn test_parse_token_claims() {
        let exp = Utc::now().timestamp() + 3600;
        let token = make_token("alice", exp);

        let claims = parse_token_claims(&token).unwrap();
        assert_eq!(claims.id, Some(7));
        assert_eq!(claims.username.as_deref(), Some("alice"));
        assert_eq!(claims.email.as_deref(), Some("alice@example.com"));
        assert_eq!(claims.exp, Some(exp));
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_expired_token() {
        let token = make_token("bob", Utc::now().timestamp() - 60);
        assert!(parse_token_claims(&token).unwrap().is_expired());

        let session = SessionContext::in_memory();
        session.set_token(&token).unwrap();
        assert!(session.is_authenticated());
        assert!(session.is_expired());
    }

    #[test]
    fn test_garbage_token() {
        assert!(parse_token_claims("not-a-jwt").is_err());

        let session = SessionContext::in_memory();
        session.set_token("not-a-jwt").unwrap();
        assert!(!session.is_expired());
    }

    #[test]
    fn test_session_context_lifecycle() {
        let session = SessionContext::in_memory();
        assert!(!session.is_authenticated());
        assert!(!session.is_expired());
        assert_eq!(session.claims(), None);

        let token = make_token("carol", Utc::now().timestamp() + 60);
        session.set_token(&token).unwrap();
        assert!(session.is_authenticated());
        assert!(!session.is_expired());
        assert_eq!(session.claims().unwrap().username.as_deref(), Some("carol"));

        assert!(session.clear().unwrap());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_empty_token_rejected() {
        let session = SessionContext::in_memory();
        assert!(matches!(session.set_token(""), Err(SessionError::EmptyToken)));
    }

    #[test]
    fn test_contexts_over_distinct_slots_are_independent() {
        let a = SessionContext::in_memory();
        let b = SessionContext::in_memory();

        a.set_token("token-a").unwrap();
        assert_eq!(a.token().as_deref(), Some("token-a"));
        assert_eq!(b.token(), None);
    }

    #[test]
    fn test_clones_share_the_slot() {
        let a = SessionContext::in_memory();
        let b = a.clone();

        a.set_token("shared").unwrap();
        assert_eq!(b.token().as_deref(), Some("shared"));
    }
}
