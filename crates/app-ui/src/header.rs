//! Header bar and user dropdown

use app_state::navigation::{Navigator, Route};
use parking_lot::RwLock;
use perpus_client::{BookApi, Profile};
use std::sync::Arc;

use crate::theme::{ThemeContext, ThemeMode};

/// Header bar showing the signed-in user
pub struct Header {
    api: Arc<dyn BookApi>,
    theme: ThemeContext,
    username: RwLock<Option<String>>,
}

impl Header {
    /// Create a header with no user loaded
    pub fn new(api: Arc<dyn BookApi>, theme: ThemeContext) -> Self {
        Self { api, theme, username: RwLock::new(None) }
    }

    /// Fetch the profile and remember the username
    ///
    /// When the profile request fails, the username from the token claims is
    /// used instead. Returns `None` when neither is available.
    pub async fn load_user(&self) -> Option<String> {
        let username = match self.api.get_profile().await {
            Ok(Profile { username, .. }) => Some(username),
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch profile");
                self.api.token_claims().and_then(|claims| claims.username)
            }
        };

        *self.username.write() = username.clone();
        username
    }

    /// Username shown in the header
    pub fn username(&self) -> Option<String> {
        self.username.read().clone()
    }

    /// Flip between light and dark mode
    pub fn toggle_theme(&self) -> ThemeMode {
        self.theme.toggle_mode()
    }
}

/// Menu under the user avatar
pub struct UserDropdown {
    api: Arc<dyn BookApi>,
    navigator: Arc<dyn Navigator>,
    theme: ThemeContext,
}

impl UserDropdown {
    /// Create the dropdown
    pub fn new(
        api: Arc<dyn BookApi>,
        navigator: Arc<dyn Navigator>,
        theme: ThemeContext,
    ) -> Self {
        Self { api, navigator, theme }
    }

    /// Open the profile section
    pub fn open_profile(&self) {
        self.navigator.push(Route::Profile);
    }

    /// Flip between light and dark mode
    pub fn toggle_theme(&self) -> ThemeMode {
        self.theme.toggle_mode()
    }

    /// Clear the session and go to the sign-in screen
    ///
    /// Navigation happens even when clearing the stored token fails.
    pub fn logout(&self) {
        match self.api.logout() {
            Ok(had_token) => tracing::debug!(had_token, "session cleared from dropdown"),
            Err(e) => tracing::error!(error = %e, "failed to clear session"),
        }
        self.navigator.push(Route::SignIn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_state::navigation::RecordingNavigator;
    use perpus_client::test_utils::{claims, MockApi};
    use perpus_client::ApiError;

    #[tokio::test]
    async fn test_load_user_from_profile() {
        let mut api = MockApi::new();
        api.expect_get_profile()
            .times(1)
            .returning(|| {
                Ok(Profile {
                    id: Some(1),
                    username: "admin".into(),
                    email: Some("admin@example.com".into()),
                })
            });

        let header = Header::new(Arc::new(api), ThemeContext::new());
        assert_eq!(header.username(), None);
        assert_eq!(header.load_user().await.as_deref(), Some("admin"));
        assert_eq!(header.username().as_deref(), Some("admin"));
    }

    #[tokio::test]
    async fn test_load_user_falls_back_to_claims() {
        let mut api = MockApi::new();
        api.expect_get_profile()
            .times(1)
            .returning(|| Err(ApiError::NotFound { message: "404 page not found".into() }));
        api.expect_token_claims()
            .times(1)
            .returning(|| Some(claims("from-token")));

        let header = Header::new(Arc::new(api), ThemeContext::new());
        assert_eq!(header.load_user().await.as_deref(), Some("from-token"));
    }

    #[tokio::test]
    async fn test_load_user_signed_out() {
        let mut api = MockApi::new();
        api.expect_get_profile()
            .times(1)
            .returning(|| {
                Err(ApiError::Auth { status: Some(401), message: "Missing token".into() })
            });
        api.expect_token_claims().times(1).returning(|| None);

        let header = Header::new(Arc::new(api), ThemeContext::new());
        assert_eq!(header.load_user().await, None);
    }

    #[test]
    fn test_logout_clears_session_and_goes_to_sign_in() {
        let mut api = MockApi::new();
        api.expect_logout().times(1).returning(|| Ok(true));

        let nav = RecordingNavigator::new();
        let dropdown =
            UserDropdown::new(Arc::new(api), Arc::new(nav.clone()), ThemeContext::new());
        dropdown.logout();

        assert_eq!(nav.history(), vec![Route::SignIn]);
    }

    #[test]
    fn test_logout_navigates_even_if_clear_fails() {
        let mut api = MockApi::new();
        api.expect_logout()
            .times(1)
            .returning(|| Err(ApiError::Network("storage unavailable".into())));

        let nav = RecordingNavigator::new();
        let dropdown =
            UserDropdown::new(Arc::new(api), Arc::new(nav.clone()), ThemeContext::new());
        dropdown.logout();

        assert_eq!(nav.current(), Some(Route::SignIn));
    }

    #[test]
    fn test_header_and_dropdown_share_theme() {
        let theme = ThemeContext::new();
        let header = Header::new(Arc::new(MockApi::new()), theme.clone());
        let dropdown = UserDropdown::new(
            Arc::new(MockApi::new()),
            Arc::new(RecordingNavigator::new()),
            theme.clone(),
        );

        assert_eq!(header.toggle_theme(), ThemeMode::Dark);
        assert_eq!(dropdown.toggle_theme(), ThemeMode::Light);
        assert_eq!(theme.mode(), ThemeMode::Light);
    }

    #[test]
    fn test_open_profile() {
        let nav = RecordingNavigator::new();
        let dropdown =
            UserDropdown::new(Arc::new(MockApi::new()), Arc::new(nav.clone()), ThemeContext::new());
        dropdown.open_profile();
        assert_eq!(nav.current(), Some(Route::Profile));
    }
}
