//! Catalog API client library
//!
//! This crate provides the HTTP client for the book catalog REST API,
//! including the error taxonomy, the wire types, the injectable session
//! context, and the typed [`BookApi`] operations.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod http;
pub mod session;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use client::{BookApi, BooksClient};
pub use http::{ApiClientConfig, ApiError, Result};
pub use session::{SessionContext, TokenClaims};
pub use types::{Book, BookPatch, LoginResponse, NewBook, Profile};
