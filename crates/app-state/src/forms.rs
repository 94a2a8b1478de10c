//! Add and Edit book forms
//!
//! Both forms hold a [`BookDraft`] of raw input strings, validate it locally
//! before any request is made, and track the request in a [`SubmitState`].
//! A successful submit shows a confirmation and schedules navigation back to
//! the dashboard after [`FormConfig::redirect_delay`].
//!
//! Forms are cheap to clone; clones share the same draft and state, so two
//! handlers firing at once see the in-flight submit and the second one is
//! refused.

use chrono::Datelike;
use parking_lot::Mutex;
use perpus_client::{ApiError, Book, BookApi, BookPatch, NewBook};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::navigation::{Navigator, Route};

/// Shown when a required field is empty or the year is not a number
pub const MSG_INVALID_FIELDS: &str = "Please fill in every field correctly.";
/// Shown when the session has no token
pub const MSG_SIGN_IN_FIRST: &str = "Please sign in first.";
/// Warning shown on mount when the stored token is past its `exp` claim
pub const MSG_SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";
/// Confirmation after a create
pub const MSG_BOOK_ADDED: &str = "Book added successfully!";
/// Confirmation after an update
pub const MSG_BOOK_UPDATED: &str = "Book updated successfully!";
/// Blocking error when the edit form cannot load its book
pub const MSG_LOAD_FAILED: &str = "Failed to load book data.";

const MSG_ADD_FAILED: &str = "Failed to add book.";
const MSG_UPDATE_FAILED: &str = "Failed to update book.";

/// Default delay before returning to the dashboard
pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_millis(1500);

// =============================================================================
// Errors
// =============================================================================

/// Form errors
#[derive(Debug, Error)]
pub enum FormError {
    /// Local field checks failed; no request was sent
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No session token and the form blocks on it
    #[error("Not signed in")]
    MissingToken,

    /// A submit is already running
    #[error("A submit is already in flight")]
    InFlight,

    /// The edit form has no book loaded
    #[error("Book is not loaded")]
    NotLoaded,

    /// The API call failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result type for form operations
pub type Result<T> = std::result::Result<T, FormError>;

// =============================================================================
// Validation
// =============================================================================

/// How the year range is checked before submitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearPolicy {
    /// Only the input widget bounds apply; any integer is submitted
    #[default]
    WidgetOnly,
    /// Reject years outside [`YearBounds`] before sending
    Enforce,
}

/// Inclusive year range offered by the input widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearBounds {
    /// Lowest accepted year
    pub min: i32,
    /// Highest accepted year
    pub max: i32,
}

impl YearBounds {
    /// Whether `year` falls inside the range
    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }
}

/// Widget bounds for the given current year: `0..=current_year`
pub fn year_bounds(current_year: i32) -> YearBounds {
    YearBounds { min: 0, max: current_year }
}

/// Raw form input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDraft {
    /// Title as typed
    pub title: String,
    /// Author as typed
    pub author: String,
    /// Year as typed
    pub year: String,
}

/// A draft that passed local checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBook {
    /// Trimmed title
    pub title: String,
    /// Trimmed author
    pub author: String,
    /// Parsed year
    pub year: i32,
}

impl From<ValidatedBook> for NewBook {
    fn from(book: ValidatedBook) -> Self {
        NewBook::new(book.title, book.author, book.year)
    }
}

impl From<ValidatedBook> for BookPatch {
    fn from(book: ValidatedBook) -> Self {
        BookPatch::default().title(book.title).author(book.author).year(book.year)
    }
}

impl BookDraft {
    /// Draft pre-filled from a stored book
    pub fn from_book(book: &Book) -> Self {
        Self { title: book.title.clone(), author: book.author.clone(), year: book.year.to_string() }
    }

    /// Check the draft
    ///
    /// Title and author must be non-empty after trimming and the year must
    /// parse as an integer. With [`YearPolicy::Enforce`] the year must also
    /// fall inside `bounds`.
    pub fn validate(&self, policy: YearPolicy, bounds: YearBounds) -> Result<ValidatedBook> {
        let title = self.title.trim();
        let author = self.author.trim();

        if title.is_empty() || author.is_empty() {
            return Err(FormError::Validation(MSG_INVALID_FIELDS.to_string()));
        }

        let year: i32 = self
            .year
            .trim()
            .parse()
            .map_err(|_| FormError::Validation(MSG_INVALID_FIELDS.to_string()))?;

        if policy == YearPolicy::Enforce && !bounds.contains(year) {
            return Err(FormError::Validation(format!(
                "Year must be between {} and {}.",
                bounds.min, bounds.max
            )));
        }

        Ok(ValidatedBook { title: title.to_string(), author: author.to_string(), year })
    }
}

// =============================================================================
// Configuration and state
// =============================================================================

/// What a form does when the session holds no token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingTokenPolicy {
    /// Show a warning on mount, submit anyway
    Warn,
    /// Show a warning on mount and refuse to submit
    Block,
    /// Say nothing; the server decides
    Proceed,
}

/// Request lifecycle of a form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitState {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// Request in flight; the submit control is disabled
    Submitting,
    /// Last submit succeeded
    Succeeded,
    /// Last submit failed (locally or on the server)
    Failed,
}

/// Messages shown next to the form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormStatus {
    /// Inline error
    pub error: Option<String>,
    /// Transient confirmation
    pub success: Option<String>,
    /// Non-blocking notice, e.g. missing sign-in
    pub warning: Option<String>,
}

/// Form settings shared by both forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormConfig {
    /// Year checking
    pub year_policy: YearPolicy,
    /// Delay before navigating back after success
    pub redirect_delay: Duration,
    /// Pinned current year; the local clock is used when unset
    pub current_year: Option<i32>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            year_policy: YearPolicy::default(),
            redirect_delay: DEFAULT_REDIRECT_DELAY,
            current_year: None,
        }
    }
}

impl FormConfig {
    /// Set the redirect delay
    pub fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    /// Set the year policy
    pub fn with_year_policy(mut self, policy: YearPolicy) -> Self {
        self.year_policy = policy;
        self
    }

    /// The calendar year used for widget bounds
    pub fn current_year(&self) -> i32 {
        self.current_year.unwrap_or_else(|| chrono::Local::now().year())
    }

    /// Widget bounds for this configuration
    pub fn year_bounds(&self) -> YearBounds {
        year_bounds(self.current_year())
    }
}

/// Pending navigation scheduled by a successful submit
#[derive(Debug)]
pub struct Redirect {
    /// Where the user will land
    pub route: Route,
    handle: JoinHandle<()>,
}

impl Redirect {
    /// Wait until the navigation has happened
    pub async fn wait(self) {
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "redirect task did not complete");
        }
    }

    /// Drop the pending navigation
    pub fn cancel(self) {
        self.handle.abort();
    }
}

#[derive(Debug, Default)]
struct FormInner {
    draft: BookDraft,
    state: SubmitState,
    status: FormStatus,
}

/// State and collaborators shared by both forms
#[derive(Clone)]
struct FormCore {
    api: Arc<dyn BookApi>,
    navigator: Arc<dyn Navigator>,
    config: FormConfig,
    missing_token: MissingTokenPolicy,
    inner: Arc<Mutex<FormInner>>,
}

impl FormCore {
    fn new(
        api: Arc<dyn BookApi>,
        navigator: Arc<dyn Navigator>,
        config: FormConfig,
        missing_token: MissingTokenPolicy,
    ) -> Self {
        Self {
            api,
            navigator,
            config,
            missing_token,
            inner: Arc::new(Mutex::new(FormInner::default())),
        }
    }

    fn warn_if_signed_out(&self) {
        if self.missing_token == MissingTokenPolicy::Proceed {
            return;
        }

        let warning = if !self.api.has_token() {
            tracing::warn!("form opened without a session token");
            MSG_SIGN_IN_FIRST
        } else if self.api.is_token_expired() {
            tracing::warn!("form opened with an expired session token");
            MSG_SESSION_EXPIRED
        } else {
            return;
        };
        self.inner.lock().status.warning = Some(warning.to_string());
    }

    /// Run local checks and move to `Submitting`
    fn begin_submit(&self) -> Result<ValidatedBook> {
        let mut inner = self.inner.lock();

        if inner.state == SubmitState::Submitting {
            return Err(FormError::InFlight);
        }

        let book = match inner.draft.validate(self.config.year_policy, self.config.year_bounds()) {
            Ok(book) => book,
            Err(e) => {
                inner.state = SubmitState::Failed;
                if let FormError::Validation(message) = &e {
                    inner.status.error = Some(message.clone());
                }
                inner.status.success = None;
                return Err(e);
            }
        };

        if self.missing_token == MissingTokenPolicy::Block && !self.api.has_token() {
            inner.state = SubmitState::Failed;
            inner.status.error = Some(MSG_SIGN_IN_FIRST.to_string());
            inner.status.success = None;
            return Err(FormError::MissingToken);
        }

        inner.state = SubmitState::Submitting;
        inner.status.error = None;
        inner.status.success = None;
        Ok(book)
    }

    /// Record the outcome of the request and schedule the redirect
    fn finish_submit<T>(
        &self,
        result: std::result::Result<T, ApiError>,
        success: &str,
        fallback: &str,
    ) -> Result<(T, Redirect)> {
        let mut inner = self.inner.lock();

        match result {
            Ok(value) => {
                inner.state = SubmitState::Succeeded;
                inner.status.success = Some(success.to_string());
                drop(inner);
                Ok((value, self.schedule_redirect()))
            }
            Err(e) => {
                tracing::error!(error = %e, "form submit failed");
                let message = e.user_message();
                inner.state = SubmitState::Failed;
                inner.status.error =
                    Some(if message.trim().is_empty() {
                        fallback.to_string()
                    } else {
                        message.to_string()
                    });
                Err(e.into())
            }
        }
    }

    fn schedule_redirect(&self) -> Redirect {
        let route = Route::Dashboard;
        let navigator = Arc::clone(&self.navigator);
        let delay = self.config.redirect_delay;
        let target = route.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            navigator.push(target);
        });

        Redirect { route, handle }
    }

    fn with_draft(&self, f: impl FnOnce(&mut BookDraft)) {
        f(&mut self.inner.lock().draft);
    }
}

// =============================================================================
// Add form
// =============================================================================

/// Form that creates a new book
///
/// By default a missing token produces a warning on mount and blocks submit.
#[derive(Clone)]
pub struct AddBookForm {
    core: FormCore,
}

impl AddBookForm {
    /// Create an empty form
    pub fn new(api: Arc<dyn BookApi>, navigator: Arc<dyn Navigator>, config: FormConfig) -> Self {
        Self { core: FormCore::new(api, navigator, config, MissingTokenPolicy::Block) }
    }

    /// Override the missing-token behavior
    pub fn with_missing_token_policy(mut self, policy: MissingTokenPolicy) -> Self {
        self.core.missing_token = policy;
        self
    }

    /// Called when the form is shown
    pub fn mount(&self) {
        self.core.warn_if_signed_out();
    }

    /// Set the title input
    pub fn set_title(&self, title: impl Into<String>) {
        let title = title.into();
        self.core.with_draft(|d| d.title = title);
    }

    /// Set the author input
    pub fn set_author(&self, author: impl Into<String>) {
        let author = author.into();
        self.core.with_draft(|d| d.author = author);
    }

    /// Set the year input
    pub fn set_year(&self, year: impl Into<String>) {
        let year = year.into();
        self.core.with_draft(|d| d.year = year);
    }

    /// Current input
    pub fn draft(&self) -> BookDraft {
        self.core.inner.lock().draft.clone()
    }

    /// Request lifecycle
    pub fn state(&self) -> SubmitState {
        self.core.inner.lock().state
    }

    /// Messages to show
    pub fn status(&self) -> FormStatus {
        self.core.inner.lock().status.clone()
    }

    /// Whether the submit control is enabled
    pub fn can_submit(&self) -> bool {
        self.state() != SubmitState::Submitting
    }

    /// Widget bounds for the year input
    pub fn year_bounds(&self) -> YearBounds {
        self.core.config.year_bounds()
    }

    /// Validate and create the book
    ///
    /// Local failures send no request. The draft is kept on every failure.
    pub async fn submit(&self) -> Result<(Book, Redirect)> {
        let book = self.core.begin_submit()?;
        let result = self.core.api.create_book(book.into()).await;
        self.core.finish_submit(result, MSG_BOOK_ADDED, MSG_ADD_FAILED)
    }
}

// =============================================================================
// Edit form
// =============================================================================

#[derive(Debug, Default)]
struct EditLoad {
    mounted: bool,
    book: Option<Book>,
    error: Option<String>,
}

/// Form that edits an existing book
///
/// The book is fetched once on [`mount`](Self::mount). If that fetch fails
/// the form shows a blocking error and cannot be submitted.
#[derive(Clone)]
pub struct EditBookForm {
    id: u64,
    core: FormCore,
    load: Arc<Mutex<EditLoad>>,
}

impl EditBookForm {
    /// Create a form for book `id`
    pub fn new(
        api: Arc<dyn BookApi>,
        navigator: Arc<dyn Navigator>,
        id: u64,
        config: FormConfig,
    ) -> Self {
        Self {
            id,
            core: FormCore::new(api, navigator, config, MissingTokenPolicy::Proceed),
            load: Arc::new(Mutex::new(EditLoad::default())),
        }
    }

    /// Override the missing-token behavior
    pub fn with_missing_token_policy(mut self, policy: MissingTokenPolicy) -> Self {
        self.core.missing_token = policy;
        self
    }

    /// Book being edited
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Fetch the book and pre-fill the draft
    ///
    /// Only the first call fetches; later calls return immediately.
    pub async fn mount(&self) -> Result<()> {
        {
            let mut load = self.load.lock();
            if load.mounted {
                return Ok(());
            }
            load.mounted = true;
        }
        self.core.warn_if_signed_out();

        match self.core.api.get_book_by_id(self.id).await {
            Ok(book) => {
                self.core.with_draft(|d| *d = BookDraft::from_book(&book));
                self.load.lock().book = Some(book);
                Ok(())
            }
            Err(e) => {
                tracing::error!(id = self.id, error = %e, "failed to load book for editing");
                self.load.lock().error = Some(MSG_LOAD_FAILED.to_string());
                Err(e.into())
            }
        }
    }

    /// Book as loaded from the server
    pub fn loaded(&self) -> Option<Book> {
        self.load.lock().book.clone()
    }

    /// Blocking load error
    pub fn load_error(&self) -> Option<String> {
        self.load.lock().error.clone()
    }

    /// Set the title input
    pub fn set_title(&self, title: impl Into<String>) {
        let title = title.into();
        self.core.with_draft(|d| d.title = title);
    }

    /// Set the author input
    pub fn set_author(&self, author: impl Into<String>) {
        let author = author.into();
        self.core.with_draft(|d| d.author = author);
    }

    /// Set the year input
    pub fn set_year(&self, year: impl Into<String>) {
        let year = year.into();
        self.core.with_draft(|d| d.year = year);
    }

    /// Current input
    pub fn draft(&self) -> BookDraft {
        self.core.inner.lock().draft.clone()
    }

    /// Request lifecycle
    pub fn state(&self) -> SubmitState {
        self.core.inner.lock().state
    }

    /// Messages to show
    pub fn status(&self) -> FormStatus {
        self.core.inner.lock().status.clone()
    }

    /// Whether the submit control is enabled
    pub fn can_submit(&self) -> bool {
        let load = self.load.lock();
        load.book.is_some() && load.error.is_none() && self.state() != SubmitState::Submitting
    }

    /// Widget bounds for the year input
    pub fn year_bounds(&self) -> YearBounds {
        self.core.config.year_bounds()
    }

    /// Validate and send every field as an update
    pub async fn submit(&self) -> Result<(Book, Redirect)> {
        {
            let load = self.load.lock();
            if load.book.is_none() || load.error.is_some() {
                return Err(FormError::NotLoaded);
            }
        }

        let book = self.core.begin_submit()?;
        let result = self.core.api.update_book(self.id, book.into()).await;
        let (updated, redirect) =
            self.core.finish_submit(result, MSG_BOOK_UPDATED, MSG_UPDATE_FAILED)?;
        self.load.lock().book = Some(updated.clone());
        Ok((updated, redirect))
    }
}
