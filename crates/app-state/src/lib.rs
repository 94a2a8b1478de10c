//! View-models for the Perpus admin console
//!
//! This crate holds the state behind each screen: the paginated book list,
//! the add and edit forms, and the routes they navigate between. Views talk
//! to the server only through [`perpus_client::BookApi`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod book_list;
pub mod forms;
pub mod navigation;
pub mod pagination;

pub use book_list::{BookListConfig, BookListView, ListCachePolicy, ListError, ListState};
pub use forms::{
    AddBookForm, BookDraft, EditBookForm, FormConfig, FormError, FormStatus, MissingTokenPolicy,
    Redirect, SubmitState, ValidatedBook, YearBounds, YearPolicy,
};
pub use navigation::{Navigator, RecordingNavigator, Route};
pub use pagination::{Pager, DEFAULT_PAGE_SIZE};
