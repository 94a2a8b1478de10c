//! Theme context for the admin console
//!
//! Holds the appearance settings chosen in the theme switcher: light or dark
//! mode, text direction, and four accent colors. Values are not validated;
//! any string may be stored as a color.
//!
//! # Usage
//!
//! ```rust
//! use app_ui::theme::{ThemeContext, ThemeMode};
//!
//! let theme = ThemeContext::new();
//! let header = theme.clone();
//!
//! header.toggle_mode();
//! assert_eq!(theme.mode(), ThemeMode::Dark);
//! assert_eq!(theme.effective_background(), "#1e1e2f");
//!
//! theme.reset();
//! assert_eq!(theme.mode(), ThemeMode::Light);
//! ```

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// Defaults
// =============================================================================

/// Default colors restored by [`ThemeContext::reset`]
pub mod defaults {
    /// Sidebar menu color
    pub const MENU_COLOR: &str = "#000000";

    /// Header color
    pub const HEADER_COLOR: &str = "#000000";

    /// Primary accent
    pub const PRIMARY_COLOR: &str = "#3b82f6";

    /// Page background in light mode
    pub const BACKGROUND_COLOR: &str = "#ffffff";

    /// Page background used whenever dark mode is on
    pub const DARK_BACKGROUND_COLOR: &str = "#1e1e2f";
}

// =============================================================================
// Types
// =============================================================================

/// Light or dark appearance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Light background, dark text
    #[default]
    Light,
    /// Dark background, light text
    Dark,
}

impl ThemeMode {
    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    /// Name as used in settings ("light" or "dark")
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }
}

/// Text direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Left to right
    #[default]
    Ltr,
    /// Right to left
    Rtl,
}

/// A full set of appearance settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePreferences {
    /// Light or dark
    pub mode: ThemeMode,
    /// Text direction
    pub direction: Direction,
    /// Sidebar menu color
    pub menu_color: String,
    /// Header color
    pub header_color: String,
    /// Primary accent
    pub primary_color: String,
    /// Page background in light mode
    pub background_color: String,
}

impl Default for ThemePreferences {
    fn default() -> Self {
        Self {
            mode: ThemeMode::Light,
            direction: Direction::Ltr,
            menu_color: defaults::MENU_COLOR.to_string(),
            header_color: defaults::HEADER_COLOR.to_string(),
            primary_color: defaults::PRIMARY_COLOR.to_string(),
            background_color: defaults::BACKGROUND_COLOR.to_string(),
        }
    }
}

impl ThemePreferences {
    /// Background actually painted: dark mode overrides the configured color
    pub fn effective_background(&self) -> &str {
        match self.mode {
            ThemeMode::Dark => defaults::DARK_BACKGROUND_COLOR,
            ThemeMode::Light => &self.background_color,
        }
    }
}

// =============================================================================
// Shared context
// =============================================================================

/// Shared, mutable theme settings
///
/// Clones share the same settings, so the header toggle and the settings
/// panel see each other's changes.
#[derive(Debug, Clone, Default)]
pub struct ThemeContext {
    prefs: Arc<RwLock<ThemePreferences>>,
}

impl ThemeContext {
    /// Context with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Context starting from `prefs`
    pub fn with_preferences(prefs: ThemePreferences) -> Self {
        Self { prefs: Arc::new(RwLock::new(prefs)) }
    }

    /// Copy of the current settings
    pub fn snapshot(&self) -> ThemePreferences {
        self.prefs.read().clone()
    }

    /// Current mode
    pub fn mode(&self) -> ThemeMode {
        self.prefs.read().mode
    }

    /// Current direction
    pub fn direction(&self) -> Direction {
        self.prefs.read().direction
    }

    /// Set the mode
    pub fn set_mode(&self, mode: ThemeMode) {
        self.prefs.write().mode = mode;
        tracing::debug!(mode = mode.as_str(), "theme mode changed");
    }

    /// Flip between light and dark, returning the new mode
    pub fn toggle_mode(&self) -> ThemeMode {
        let mut prefs = self.prefs.write();
        prefs.mode = prefs.mode.toggled();
        prefs.mode
    }

    /// Set the text direction
    pub fn set_direction(&self, direction: Direction) {
        self.prefs.write().direction = direction;
    }

    /// Set the sidebar menu color
    pub fn set_menu_color(&self, color: impl Into<String>) {
        self.prefs.write().menu_color = color.into();
    }

    /// Set the header color
    pub fn set_header_color(&self, color: impl Into<String>) {
        self.prefs.write().header_color = color.into();
    }

    /// Set the primary accent
    pub fn set_primary_color(&self, color: impl Into<String>) {
        self.prefs.write().primary_color = color.into();
    }

    /// Set the light-mode background
    pub fn set_background_color(&self, color: impl Into<String>) {
        self.prefs.write().background_color = color.into();
    }

    /// Background actually painted
    pub fn effective_background(&self) -> String {
        self.prefs.read().effective_background().to_string()
    }

    /// Restore every setting to its default
    pub fn reset(&self) {
        *self.prefs.write() = ThemePreferences::default();
    }
}
