//! Wire types for the catalog API

use serde::{Deserialize, Serialize};

/// A book record as stored by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Server-assigned identifier
    pub id: u64,
    /// Title
    pub title: String,
    /// Author
    pub author: String,
    /// Publication year
    #[serde(default)]
    pub year: i32,
}

/// Payload for creating a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    /// Title
    pub title: String,
    /// Author
    pub author: String,
    /// Publication year
    pub year: i32,
}

impl NewBook {
    /// Create a new payload
    pub fn new(title: impl Into<String>, author: impl Into<String>, year: i32) -> Self {
        Self { title: title.into(), author: author.into(), year }
    }
}

/// Partial update; only fields that are set are sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPatch {
    /// New title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New author
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// New publication year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl BookPatch {
    /// Set the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the author
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the year
    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Whether no field is set
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.year.is_none()
    }
}

impl From<NewBook> for BookPatch {
    fn from(book: NewBook) -> Self {
        Self { title: Some(book.title), author: Some(book.author), year: Some(book.year) }
    }
}

/// Registration payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    /// Username
    pub username: String,
    /// Email address
    pub email: String,
    /// Password
    pub password: String,
}

/// Login payload; `username` may also be an email address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    /// Username or email
    pub username: String,
    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    /// Bearer token
    pub token: String,
    /// Anything else the server sent along
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// User profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// User id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Username
    pub username: String,
    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Registration response: either the bare user or `{ "message", "user" }`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RegisterResponse {
    Wrapped {
        #[serde(default)]
        #[allow(dead_code)]
        message: Option<String>,
        user: Profile,
    },
    Bare(Profile),
}

impl RegisterResponse {
    pub(crate) fn into_profile(self) -> Profile {
        match self {
            RegisterResponse::Wrapped { user, .. } => user,
            RegisterResponse::Bare(profile) => profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_deserialize_ignores_unknown_fields() {
        let book: Book = serde_json::from_value(serde_json::json!({
            "id": 42, "title": "Dune", "author": "Herbert", "year": 1965, "CreatedAt": "2024-01-01"
        }))
        .unwrap();
        assert_eq!(
            book,
            Book { id: 42, title: "Dune".into(), author: "Herbert".into(), year: 1965 }
        );
    }

    #[test]
    fn test_patch_omits_absent_fields() {
        let patch = BookPatch::default().title("New title");
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"title": "New title"}));
        assert!(!patch.is_empty());
        assert!(BookPatch::default().is_empty());
    }

    #[test]
    fn test_register_response_shapes() {
        let bare: RegisterResponse = serde_json::from_value(serde_json::json!({
            "id": 1, "username": "alice", "email": "a@example.com", "password": "$2a$hash"
        }))
        .unwrap();
        assert_eq!(bare.into_profile().username, "alice");

        let wrapped: RegisterResponse = serde_json::from_value(serde_json::json!({
            "message": "User registered successfully",
            "user": {"id": 2, "username": "bob", "email": "b@example.com"}
        }))
        .unwrap();
        let profile = wrapped.into_profile();
        assert_eq!(profile.id, Some(2));
        assert_eq!(profile.username, "bob");
    }

    #[test]
    fn test_login_response_keeps_extra_fields() {
        let response: LoginResponse =
            serde_json::from_value(serde_json::json!({"token": "abc", "expires_in": 86400}))
                .unwrap();
        assert_eq!(response.token, "abc");
        assert_eq!(response.extra.get("expires_in"), Some(&serde_json::json!(86400)));
    }
}
