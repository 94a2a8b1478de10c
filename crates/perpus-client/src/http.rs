//! HTTP layer for the catalog REST API
//!
//! This module provides the request/response types, the error taxonomy and
//! the core HTTP client. Every request reads the bearer token from the
//! session context at send time, so a login performed after the client was
//! built is honoured by the very next call.

use crate::session::SessionContext;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

// =============================================================================
// Error Types
// =============================================================================

/// Errors surfaced by the API client
///
/// # Examples
/// ```
/// use perpus_client::http::{ApiError, StatusPolicy};
///
/// let error = ApiError::from_status(404, "Book not found", StatusPolicy::Resource);
/// assert!(matches!(error, ApiError::NotFound { .. }));
/// assert_eq!(error.status(), Some(404));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Field checks failed, either locally before sending or on the server (400/422)
    #[error("Validation error: {message}")]
    Validation {
        /// HTTP status when the server rejected the payload
        status: Option<u16>,
        /// Human-readable message
        message: String,
    },

    /// Missing, invalid or expired credentials (401/403)
    #[error("Authentication error: {message}")]
    Auth {
        /// HTTP status when reported by the server
        status: Option<u16>,
        /// Human-readable message
        message: String,
    },

    /// The resource does not exist (404)
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable message
        message: String,
    },

    /// 5xx or any other unexpected response
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Human-readable message
        message: String,
    },

    /// Transport failure or timeout
    #[error("Network error: {0}")]
    Network(String),
}

/// How non-2xx statuses are classified for an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Book and profile resources
    Resource,
    /// Registration and login: every 4xx is an authentication failure
    Credentials,
}

impl ApiError {
    /// Classify a non-2xx status with the server's message
    pub fn from_status(status: u16, message: impl Into<String>, policy: StatusPolicy) -> Self {
        let message = message.into();
        match (policy, status) {
            (StatusPolicy::Credentials, 400..=499) => {
                ApiError::Auth { status: Some(status), message }
            }
            (StatusPolicy::Resource, 400 | 422) => {
                ApiError::Validation { status: Some(status), message }
            }
            (StatusPolicy::Resource, 401 | 403) => ApiError::Auth { status: Some(status), message },
            (StatusPolicy::Resource, 404) => ApiError::NotFound { message },
            _ => ApiError::Server { status, message },
        }
    }

    /// Client-side validation failure (no request was sent)
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation { status: None, message: message.into() }
    }

    /// Client-side authentication failure (no request was sent)
    pub fn auth(message: impl Into<String>) -> Self {
        ApiError::Auth { status: None, message: message.into() }
    }

    /// HTTP status, when the error came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Validation { status, .. } | ApiError::Auth { status, .. } => *status,
            ApiError::NotFound { .. } => Some(404),
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Network(_) => None,
        }
    }

    /// Message suitable for inline display in a view
    pub fn user_message(&self) -> &str {
        match self {
            ApiError::Validation { message, .. }
            | ApiError::Auth { message, .. }
            | ApiError::NotFound { message }
            | ApiError::Server { message, .. } => message,
            ApiError::Network(message) => message,
        }
    }

    /// Whether the user should be prompted to sign in again
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ApiError::Auth { .. })
    }

    /// Whether the server reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Extract a readable message from an error response body
///
/// The server answers with `{"error": "..."}`, occasionally `{"message": "..."}`,
/// a bare JSON string, or plain text.
pub fn error_message_from_body(status: u16, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return format!("HTTP {}", status);
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => ["error", "message"]
            .iter()
            .find_map(|field| map.get(*field).and_then(|v| v.as_str()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status)),
        Ok(serde_json::Value::String(text)) if !text.is_empty() => text,
        _ => trimmed.to_string(),
    }
}

// =============================================================================
// Request Types
// =============================================================================

/// HTTP method for API requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET request
    Get,
    /// POST request
    Post,
    /// PUT request
    Put,
    /// DELETE request
    Delete,
}

impl HttpMethod {
    /// Method name as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An API request: method, path, query parameters, headers and optional body
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the base URL (e.g., "/books/42")
    pub path: String,
    /// Query parameters
    pub params: HashMap<String, String>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body
    pub body: Option<Vec<u8>>,
    /// Content type of the body
    pub encoding: Option<String>,
    /// Attach the session's bearer token when one is present
    pub attach_token: bool,
}

impl ApiRequest {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: HashMap::new(),
            headers: HashMap::new(),
            body: None,
            encoding: None,
            attach_token: true,
        }
    }

    /// Create a GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Create a POST request
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Create a PUT request
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// Create a DELETE request
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter when a value is present
    pub fn optional_param(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.param(key, value.to_string()),
            None => self,
        }
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the request body from JSON
    pub fn json_body<T: Serialize>(
        mut self,
        value: &T,
    ) -> std::result::Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_vec(value)?);
        self.encoding = Some("application/json".to_string());
        Ok(self)
    }

    /// Never send the bearer token with this request
    pub fn without_token(mut self) -> Self {
        self.attach_token = false;
        self
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// A decoded API response
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Response data
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Create a new response
    pub fn new(status: u16, headers: HashMap<String, String>, data: T) -> Self {
        Self { status, headers, data }
    }

    /// Get a header value
    pub fn header(&self, key: &str) -> Option<&String> {
        self.headers.get(key)
    }
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Default base URL of the catalog API
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL (e.g., "http://localhost:8000")
    pub base_url: String,
    /// Request timeout; `None` leaves the transport default in place
    pub timeout: Option<Duration>,
    /// User agent string
    pub user_agent: String,
    /// Custom headers to include in all requests
    pub default_headers: HashMap<String, String>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            user_agent: format!("perpus-admin/{}", env!("CARGO_PKG_VERSION")),
            default_headers: HashMap::new(),
        }
    }
}

impl ApiClientConfig {
    /// Create a new config with a base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a default header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Full URL for a request path
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

// =============================================================================
// Client Implementation
// =============================================================================

use reqwest::{Client as ReqwestClient, Response as ReqwestResponse};

/// HTTP client bound to a session context
///
/// # Examples
/// ```
/// use perpus_client::http::{ApiClient, ApiClientConfig, ApiRequest, StatusPolicy};
/// use perpus_client::session::SessionContext;
///
/// async fn example() -> Result<(), Box<dyn std::error::Error>> {
///     let client = ApiClient::new(ApiClientConfig::default(), SessionContext::in_memory())?;
///     let response = client
///         .send::<serde_json::Value>(ApiRequest::get("/books"), StatusPolicy::Resource)
///         .await?;
///     println!("{} books", response.data.as_array().map(|a| a.len()).unwrap_or(0));
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: ReqwestClient,
    config: ApiClientConfig,
    session: SessionContext,
}

impl ApiClient {
    /// Create a new client
    pub fn new(config: ApiClientConfig, session: SessionContext) -> Result<Self> {
        let mut builder = ReqwestClient::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config, session })
    }

    /// Send a request and decode a JSON response body
    pub async fn send<T>(&self, request: ApiRequest, policy: StatusPolicy) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.execute(request, policy).await?;
        let status = response.status;
        let data = serde_json::from_str(&response.data).map_err(|e| ApiError::Server {
            status,
            message: format!("Failed to parse response: {}", e),
        })?;
        Ok(ApiResponse::new(status, response.headers, data))
    }

    /// Send a request whose success body is irrelevant
    pub async fn send_discarding(
        &self,
        request: ApiRequest,
        policy: StatusPolicy,
    ) -> Result<ApiResponse<()>> {
        let response = self.execute(request, policy).await?;
        Ok(ApiResponse::new(response.status, response.headers, ()))
    }

    async fn execute(
        &self,
        request: ApiRequest,
        policy: StatusPolicy,
    ) -> Result<ApiResponse<String>> {
        let url = self.config.url_for(&request.path);

        let mut req = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };

        if !request.params.is_empty() {
            req = req.query(&request.params);
        }

        for (key, value) in &self.config.default_headers {
            req = req.header(key, value);
        }

        for (key, value) in &request.headers {
            req = req.header(key, value);
        }

        // Evaluated per request; never cached on the client.
        let has_token = if request.attach_token {
            match self.session.token() {
                Some(token) => {
                    req = req.bearer_auth(token);
                    true
                }
                None => false,
            }
        } else {
            false
        };

        if let Some(body) = request.body {
            if let Some(encoding) = &request.encoding {
                req = req.header("Content-Type", encoding);
            }
            req = req.body(body);
        }

        tracing::debug!(
            method = request.method.as_str(),
            path = %request.path,
            authenticated = has_token,
            "sending request"
        );

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Network(format!("Request timed out: {}", e))
            } else {
                ApiError::Network(format!("Request failed: {}", e))
            }
        })?;

        self.read_response(response, policy).await
    }

    async fn read_response(
        &self,
        response: ReqwestResponse,
        policy: StatusPolicy,
    ) -> Result<ApiResponse<String>> {
        let status = response.status().as_u16();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(value_str) = value.to_str() {
                headers.insert(key.to_string(), value_str.to_string());
            }
        }

        let success = response.status().is_success();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("Failed to read response: {}", e)))?;

        if !success {
            let message = error_message_from_body(status, &body);
            let error = ApiError::from_status(status, message, policy);
            tracing::debug!(status, error = %error, "request rejected");
            return Err(error);
        }

        Ok(ApiResponse::new(status, headers, body))
    }

    /// Get the client configuration
    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get the session context the client reads tokens from
    pub fn session(&self) -> &SessionContext {
        &self.session
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification_for_resources() {
        let p = StatusPolicy::Resource;
        assert!(matches!(
            ApiError::from_status(400, "bad", p),
            ApiError::Validation { status: Some(400), .. }
        ));
        assert!(matches!(
            ApiError::from_status(422, "bad", p),
            ApiError::Validation { status: Some(422), .. }
        ));
        assert!(matches!(
            ApiError::from_status(401, "no", p),
            ApiError::Auth { status: Some(401), .. }
        ));
        assert!(matches!(
            ApiError::from_status(403, "no", p),
            ApiError::Auth { status: Some(403), .. }
        ));
        assert!(matches!(ApiError::from_status(404, "gone", p), ApiError::NotFound { .. }));
        assert!(matches!(
            ApiError::from_status(500, "boom", p),
            ApiError::Server { status: 500, .. }
        ));
        assert!(matches!(
            ApiError::from_status(409, "dup", p),
            ApiError::Server { status: 409, .. }
        ));
    }

    #[test]
    fn test_status_classification_for_credentials() {
        let p = StatusPolicy::Credentials;
        assert!(ApiError::from_status(400, "taken", p).is_auth_error());
        assert!(ApiError::from_status(401, "Invalid credentials", p).is_auth_error());
        assert!(matches!(ApiError::from_status(503, "down", p), ApiError::Server { .. }));
    }

    #[test]
    fn test_error_accessors() {
        let err = ApiError::from_status(404, "Book not found", StatusPolicy::Resource);
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.user_message(), "Book not found");
        assert!(err.is_not_found());

        let err = ApiError::validation("Title is required");
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("Title is required"));

        assert_eq!(ApiError::Network("refused".into()).status(), None);
    }

    #[test]
    fn test_error_message_from_body() {
        assert_eq!(error_message_from_body(404, r#"{"error":"Book not found"}"#), "Book not found");
        assert_eq!(error_message_from_body(400, r#"{"message":"Missing title"}"#), "Missing title");
        assert_eq!(error_message_from_body(400, r#""unexpected EOF""#), "unexpected EOF");
        assert_eq!(error_message_from_body(401, "Missing token"), "Missing token");
        assert_eq!(error_message_from_body(500, "   "), "HTTP 500");
        assert_eq!(error_message_from_body(500, r#"{"code":1}"#), "HTTP 500");
    }

    #[test]
    fn test_request_builders() {
        let req = ApiRequest::get("/books")
            .optional_param("limit", Some(10))
            .optional_param("offset", None::<u32>)
            .header("X-Trace", "1");

        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.params.get("limit"), Some(&"10".to_string()));
        assert!(!req.params.contains_key("offset"));
        assert!(req.attach_token);

        let req = ApiRequest::post("/login").without_token();
        assert!(!req.attach_token);
    }

    #[test]
    fn test_json_body_sets_encoding() {
        let req = ApiRequest::put("/books/1")
            .json_body(&serde_json::json!({"title": "Dune"}))
            .unwrap();
        assert_eq!(req.encoding.as_deref(), Some("application/json"));
        let body = String::from_utf8(req.body.unwrap()).unwrap();
        assert!(body.contains("Dune"));
    }

    #[test]
    fn test_client_config() {
        let config = ApiClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, None);
        assert!(config.user_agent.starts_with("perpus-admin/"));

        let config = ApiClientConfig::new("http://api.local/")
            .with_timeout(Duration::from_secs(5))
            .with_header("X-Custom", "value");
        assert_eq!(config.base_url, "http://api.local");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.url_for("/books"), "http://api.local/books");
        assert_eq!(config.url_for("books/3"), "http://api.local/books/3");
    }

    #[test]
    fn test_http_method_as_str() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Post.as_str(), "POST");
        assert_eq!(HttpMethod::Put.as_str(), "PUT");
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
    }

    #[test]
    fn test_client_construction() {
        let client =
            ApiClient::new(ApiClientConfig::new("http://localhost:9"), SessionContext::in_memory())
                .unwrap();
        assert_eq!(client.base_url(), "http://localhost:9");
        assert!(!client.session().is_authenticated());
    }
}
