//! Routes and the navigator seam used by views

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Screens of the admin console
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "route", content = "params")]
pub enum Route {
    /// Book table
    Dashboard,
    /// Add-book form
    AddBook,
    /// Edit-book form
    EditBook {
        /// Book being edited
        id: u64,
    },
    /// Sign-in screen
    SignIn,
    /// Profile section
    Profile,
}

impl Route {
    /// Path for this route
    pub fn path(&self) -> String {
        match self {
            Route::Dashboard => "/dashboard".to_string(),
            Route::AddBook => "/add".to_string(),
            Route::EditBook { id } => format!("/edit/{}", id),
            Route::SignIn => "/signin".to_string(),
            Route::Profile => "/profile".to_string(),
        }
    }

    /// Match a path back to a route
    pub fn from_path(path: &str) -> Option<Route> {
        let segments: Vec<&str> =
            path.trim_matches('/').split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["dashboard"] | [] => Some(Route::Dashboard),
            ["add"] => Some(Route::AddBook),
            ["edit", id] => id.parse().ok().map(|id| Route::EditBook { id }),
            ["signin"] => Some(Route::SignIn),
            ["profile"] => Some(Route::Profile),
            _ => None,
        }
    }
}

/// Something that can move the user to another screen
pub trait Navigator: Send + Sync {
    /// Navigate to `route`
    fn push(&self, route: Route);
}

/// Navigator that records every push
#[derive(Debug, Default, Clone)]
pub struct RecordingNavigator {
    history: Arc<Mutex<Vec<Route>>>,
}

impl RecordingNavigator {
    /// Create an empty navigator
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes pushed so far, oldest first
    pub fn history(&self) -> Vec<Route> {
        self.history.lock().clone()
    }

    /// Most recent route
    pub fn current(&self) -> Option<Route> {
        self.history.lock().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn push(&self, route: Route) {
        tracing::debug!(path = %route.path(), "navigate");
        self.history.lock().push(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths_round_trip() {
        let routes = [
            Route::Dashboard,
            Route::AddBook,
            Route::EditBook { id: 42 },
            Route::SignIn,
            Route::Profile,
        ];
        for route in routes {
            assert_eq!(Route::from_path(&route.path()), Some(route));
        }
    }

    #[test]
    fn test_from_path_rejects_unknown() {
        assert_eq!(Route::from_path("/edit/abc"), None);
        assert_eq!(Route::from_path("/nope"), None);
        assert_eq!(Route::from_path("/"), Some(Route::Dashboard));
    }

    #[test]
    fn test_recording_navigator() {
        let nav = RecordingNavigator::new();
        assert_eq!(nav.current(), None);

        nav.push(Route::AddBook);
        nav.push(Route::Dashboard);

        assert_eq!(nav.history(), vec![Route::AddBook, Route::Dashboard]);
        assert_eq!(nav.current(), Some(Route::Dashboard));
    }
}
