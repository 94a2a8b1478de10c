//! Shell components of the Perpus admin console
//!
//! - [`theme`] - shared theme context (mode, direction, accent colors)
//! - [`header`] - header bar and user dropdown

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod header;
pub mod theme;

pub use header::{Header, UserDropdown};
pub use theme::{Direction, ThemeContext, ThemeMode, ThemePreferences};
