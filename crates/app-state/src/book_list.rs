//! Dashboard book list: fetch once, page locally, delete in place
//!
//! The view moves through `Loading -> Loaded(books)` on mount, or
//! `Loading -> Error` when the fetch fails; there is no automatic retry.
//! After each confirmed mutation the local list is brought up to date
//! according to the configured [`ListCachePolicy`].

use perpus_client::{ApiError, Book, BookApi};
use std::sync::Arc;
use thiserror::Error;

use crate::pagination::{Pager, DEFAULT_PAGE_SIZE};

/// Book list errors
#[derive(Debug, Error)]
pub enum ListError {
    /// The API call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The operation needs a loaded list
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type for book list operations
pub type Result<T> = std::result::Result<T, ListError>;

/// State of the list view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    /// Fetch in progress (or not started)
    Loading,
    /// Books as last known locally
    Loaded(Vec<Book>),
    /// The fetch failed with this message
    Error(String),
}

/// How the local list is refreshed after a confirmed delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListCachePolicy {
    /// Remove the row locally, no extra request
    #[default]
    PatchInPlace,
    /// Fetch the collection again
    Refetch,
}

/// Book list configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookListConfig {
    /// Rows per page
    pub page_size: usize,
    /// Refresh policy after deletes
    pub cache_policy: ListCachePolicy,
    /// Optional server-side limit hint
    pub limit: Option<u32>,
    /// Optional server-side offset hint
    pub offset: Option<u32>,
}

impl Default for BookListConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            cache_policy: ListCachePolicy::default(),
            limit: None,
            offset: None,
        }
    }
}

/// View-model behind the dashboard table
pub struct BookListView {
    api: Arc<dyn BookApi>,
    config: BookListConfig,
    state: ListState,
    pager: Pager,
}

impl BookListView {
    /// Create a view in the `Loading` state
    pub fn new(api: Arc<dyn BookApi>, config: BookListConfig) -> Self {
        let pager = Pager::new(config.page_size);
        Self { api, config, state: ListState::Loading, pager }
    }

    /// Current state
    pub fn state(&self) -> &ListState {
        &self.state
    }

    /// All locally known books (empty unless loaded)
    pub fn books(&self) -> &[Book] {
        match &self.state {
            ListState::Loaded(books) => books,
            _ => &[],
        }
    }

    /// Whether the initial fetch is still pending
    pub fn is_loading(&self) -> bool {
        matches!(self.state, ListState::Loading)
    }

    /// Error message, when the fetch failed
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ListState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Fetch the collection and enter `Loaded` or `Error`
    pub async fn load(&mut self) -> Result<&[Book]> {
        self.state = ListState::Loading;

        match self.api.get_books(self.config.limit, self.config.offset).await {
            Ok(books) => {
                tracing::debug!(count = books.len(), "book list loaded");
                self.pager.clamp(books.len());
                self.state = ListState::Loaded(books);
                Ok(self.books())
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch books");
                self.state = ListState::Error(e.user_message().to_string());
                Err(e.into())
            }
        }
    }

    /// Rows shown on the current page
    pub fn current_page_rows(&self) -> &[Book] {
        self.pager.window(self.books())
    }

    /// Current page (1-based)
    pub fn page(&self) -> usize {
        self.pager.current_page()
    }

    /// Number of pages
    pub fn total_pages(&self) -> usize {
        self.pager.total_pages(self.books().len())
    }

    /// Go to the next page; returns whether the page changed
    pub fn next_page(&mut self) -> bool {
        let len = self.books().len();
        self.pager.next(len)
    }

    /// Go to the previous page; returns whether the page changed
    pub fn prev_page(&mut self) -> bool {
        self.pager.prev()
    }

    /// Jump to a page (clamped)
    pub fn go_to_page(&mut self, page: usize) {
        let len = self.books().len();
        self.pager.go_to(page, len);
    }

    /// Delete a book on the server, then update the local list
    ///
    /// The row is removed only after the server confirms. On failure the
    /// list is left untouched.
    pub async fn delete(&mut self, id: u64) -> Result<()> {
        if !matches!(self.state, ListState::Loaded(_)) {
            return Err(ListError::InvalidState(
                "cannot delete before the list has loaded".to_string(),
            ));
        }

        self.api.delete_book(id).await?;

        match self.config.cache_policy {
            ListCachePolicy::PatchInPlace => self.remove_local(id),
            ListCachePolicy::Refetch => {
                match self.api.get_books(self.config.limit, self.config.offset).await {
                    Ok(books) => self.state = ListState::Loaded(books),
                    Err(e) => {
                        tracing::warn!(error = %e, id, "refetch after delete failed, patching");
                        self.remove_local(id);
                    }
                }
            }
        }

        let len = self.books().len();
        self.pager.clamp(len);
        Ok(())
    }

    fn remove_local(&mut self, id: u64) {
        if let ListState::Loaded(books) = &mut self.state {
            books.retain(|b| b.id != id);
        }
    }
}
