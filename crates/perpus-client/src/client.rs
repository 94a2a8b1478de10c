//! BooksClient - typed operations over the catalog API
//!
//! # Example
//!
//! ```rust,no_run
//! use perpus_client::{BookApi, BooksClient, NewBook};
//! use perpus_client::http::ApiClientConfig;
//! use perpus_client::session::SessionContext;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BooksClient::new(ApiClientConfig::default(), SessionContext::in_memory())?;
//!
//!     client.login_user("alice".into(), "password".into()).await?;
//!     let book = client.create_book(NewBook::new("Dune", "Herbert", 1965)).await?;
//!     println!("created book {}", book.id);
//!
//!     Ok(())
//! }
//! ```

use crate::http::{ApiClient, ApiClientConfig, ApiError, ApiRequest, Result, StatusPolicy};
use crate::session::{SessionContext, TokenClaims};
use crate::types::{
    Book, BookPatch, LoginRequest, LoginResponse, NewBook, Profile, RegisterRequest,
    RegisterResponse,
};
use async_trait::async_trait;

/// One operation per server resource action
///
/// View-models depend on this trait rather than on [`BooksClient`] so they
/// can be driven by a test double.
#[async_trait]
pub trait BookApi: Send + Sync {
    /// Register a new user; the session is left untouched
    async fn register_user(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> Result<Profile>;

    /// Log in and overwrite the session slot with the returned token
    async fn login_user(&self, username: String, password: String) -> Result<LoginResponse>;

    /// List books, passing optional pagination hints to the server
    async fn get_books(&self, limit: Option<u32>, offset: Option<u32>) -> Result<Vec<Book>>;

    /// Fetch a single book
    async fn get_book_by_id(&self, id: u64) -> Result<Book>;

    /// Create a book
    async fn create_book(&self, book: NewBook) -> Result<Book>;

    /// Update the fields set in `patch`
    async fn update_book(&self, id: u64, patch: BookPatch) -> Result<Book>;

    /// Delete a book
    async fn delete_book(&self, id: u64) -> Result<()>;

    /// Fetch the signed-in user's profile
    async fn get_profile(&self) -> Result<Profile>;

    /// Clear the session slot, returning whether a token was present
    fn logout(&self) -> Result<bool>;

    /// Whether a token is currently stored
    fn has_token(&self) -> bool;

    /// Claims of the stored token
    fn token_claims(&self) -> Option<TokenClaims>;

    /// Whether the stored token carries an `exp` claim that has passed
    fn is_token_expired(&self) -> bool;
}

/// HTTP implementation of [`BookApi`]
#[derive(Debug, Clone)]
pub struct BooksClient {
    api: ApiClient,
}

impl BooksClient {
    /// Create a client reading tokens from `session`
    pub fn new(config: ApiClientConfig, session: SessionContext) -> Result<Self> {
        Ok(Self { api: ApiClient::new(config, session)? })
    }

    /// Wrap an existing HTTP client
    pub fn from_api(api: ApiClient) -> Self {
        Self { api }
    }

    /// The session context in use
    pub fn session(&self) -> &SessionContext {
        self.api.session()
    }

    /// The underlying HTTP client
    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}

fn encode_error(e: serde_json::Error) -> ApiError {
    ApiError::validation(format!("Failed to encode request: {}", e))
}

fn session_error(e: crate::session::SessionError) -> ApiError {
    ApiError::auth(format!("Failed to update session: {}", e))
}

#[async_trait]
impl BookApi for BooksClient {
    async fn register_user(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> Result<Profile> {
        let body = RegisterRequest { username, email, password };
        let request =
            ApiRequest::post("/users").without_token().json_body(&body).map_err(encode_error)?;

        let response = self.api.send::<RegisterResponse>(request, StatusPolicy::Credentials).await?;
        let profile = response.data.into_profile();
        tracing::info!(username = %profile.username, "registered user");
        Ok(profile)
    }

    async fn login_user(&self, username: String, password: String) -> Result<LoginResponse> {
        let body = LoginRequest { username, password };
        let request =
            ApiRequest::post("/login").without_token().json_body(&body).map_err(encode_error)?;

        let response = self.api.send::<LoginResponse>(request, StatusPolicy::Credentials).await?;
        if response.data.token.is_empty() {
            return Err(ApiError::auth("Server returned an empty token"));
        }

        self.api.session().set_token(&response.data.token).map_err(session_error)?;
        tracing::info!(username = %body.username, "logged in");
        Ok(response.data)
    }

    async fn get_books(&self, limit: Option<u32>, offset: Option<u32>) -> Result<Vec<Book>> {
        let request = ApiRequest::get("/books")
            .optional_param("limit", limit)
            .optional_param("offset", offset);

        let response = self.api.send::<Vec<Book>>(request, StatusPolicy::Resource).await?;
        tracing::debug!(count = response.data.len(), "fetched books");
        Ok(response.data)
    }

    async fn get_book_by_id(&self, id: u64) -> Result<Book> {
        let request = ApiRequest::get(format!("/books/{}", id));
        Ok(self.api.send::<Book>(request, StatusPolicy::Resource).await?.data)
    }

    async fn create_book(&self, book: NewBook) -> Result<Book> {
        let request = ApiRequest::post("/books").json_body(&book).map_err(encode_error)?;
        let created = self.api.send::<Book>(request, StatusPolicy::Resource).await?.data;
        tracing::info!(id = created.id, title = %created.title, "created book");
        Ok(created)
    }

    async fn update_book(&self, id: u64, patch: BookPatch) -> Result<Book> {
        let request =
            ApiRequest::put(format!("/books/{}", id)).json_body(&patch).map_err(encode_error)?;
        let updated = self.api.send::<Book>(request, StatusPolicy::Resource).await?.data;
        tracing::info!(id, "updated book");
        Ok(updated)
    }

    async fn delete_book(&self, id: u64) -> Result<()> {
        let request = ApiRequest::delete(format!("/books/{}", id));
        self.api.send_discarding(request, StatusPolicy::Resource).await?;
        tracing::info!(id, "deleted book");
        Ok(())
    }

    async fn get_profile(&self) -> Result<Profile> {
        let request = ApiRequest::get("/profile");
        Ok(self.api.send::<Profile>(request, StatusPolicy::Resource).await?.data)
    }

    fn logout(&self) -> Result<bool> {
        let cleared = self.api.session().clear().map_err(session_error)?;
        tracing::info!(had_token = cleared, "logged out");
        Ok(cleared)
    }

    fn has_token(&self) -> bool {
        self.api.session().is_authenticated()
    }

    fn token_claims(&self) -> Option<TokenClaims> {
        self.api.session().claims()
    }

    fn is_token_expired(&self) -> bool {
        self.api.session().is_expired()
    }
}
