//! Test doubles and fixtures for crates built on [`BookApi`]
//!
//! Enabled with the `test-utils` feature. Downstream crates pull it in as a
//! dev-dependency so their view-model tests share one mock.

use crate::client::BookApi;
use crate::http::Result;
use crate::session::TokenClaims;
use crate::types::{Book, BookPatch, LoginResponse, NewBook, Profile};
use async_trait::async_trait;

mockall::mock! {
    /// Mock of every catalog endpoint and the session helpers
    pub Api {}

    #[async_trait]
    impl BookApi for Api {
        async fn register_user(
            &self,
            username: String,
            email: String,
            password: String,
        ) -> Result<Profile>;
        async fn login_user(&self, username: String, password: String) -> Result<LoginResponse>;
        async fn get_books(&self, limit: Option<u32>, offset: Option<u32>) -> Result<Vec<Book>>;
        async fn get_book_by_id(&self, id: u64) -> Result<Book>;
        async fn create_book(&self, book: NewBook) -> Result<Book>;
        async fn update_book(&self, id: u64, patch: BookPatch) -> Result<Book>;
        async fn delete_book(&self, id: u64) -> Result<()>;
        async fn get_profile(&self) -> Result<Profile>;
        fn logout(&self) -> Result<bool>;
        fn has_token(&self) -> bool;
        fn token_claims(&self) -> Option<TokenClaims>;
        fn is_token_expired(&self) -> bool;
    }
}

/// Build a book with predictable fields
pub fn book(id: u64) -> Book {
    Book {
        id,
        title: format!("Title {}", id),
        author: format!("Author {}", id),
        year: 1900 + id as i32,
    }
}

/// Books with ids `1..=n`
pub fn books(n: u64) -> Vec<Book> {
    (1..=n).map(book).collect()
}

/// Claims for a token that expires far in the future
pub fn claims(username: &str) -> TokenClaims {
    TokenClaims {
        id: Some(1),
        username: Some(username.to_string()),
        email: None,
        exp: Some(4_102_444_800),
        extra: Default::default(),
    }
}
