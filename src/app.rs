//! Wiring of the console: one session, one client, shared theme and navigator

use std::sync::Arc;

use app_state::{
    AddBookForm, BookListConfig, BookListView, EditBookForm, FormConfig, RecordingNavigator,
};
use app_ui::{Header, ThemeContext, UserDropdown};
use perpus_client::{ApiClientConfig, ApiError, BookApi, BooksClient, SessionContext};
use storage::{KvConfig, KvError, KvSessionSlot, KvStore};

use crate::config::AppConfig;

/// Errors raised while assembling the application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The session store could not be opened
    #[error("Session storage error: {0}")]
    Storage(#[from] KvError),

    /// The HTTP client could not be built
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// A running console instance
///
/// Every view created from the same `App` shares its session, theme and
/// navigator.
pub struct App {
    config: AppConfig,
    session: SessionContext,
    api: Arc<dyn BookApi>,
    theme: ThemeContext,
    navigator: RecordingNavigator,
}

impl App {
    /// Open the persistent session slot under `config.data_dir` and build the client
    pub fn open(config: AppConfig) -> Result<Self, AppError> {
        let path = config.data_dir.to_string_lossy().into_owned();
        let store = KvStore::new(KvConfig::new(path))?;
        let session = SessionContext::new(Arc::new(KvSessionSlot::new(Arc::new(store))));
        Self::with_session(config, session)
    }

    /// Build the console around an existing session
    pub fn with_session(config: AppConfig, session: SessionContext) -> Result<Self, AppError> {
        let mut client_config = ApiClientConfig::new(config.api_url.clone());
        if let Some(timeout) = config.timeout {
            client_config = client_config.with_timeout(timeout);
        }

        let client = BooksClient::new(client_config, session.clone())?;
        tracing::debug!(base_url = %config.api_url, "api client ready");

        Ok(Self {
            config,
            session,
            api: Arc::new(client),
            theme: ThemeContext::new(),
            navigator: RecordingNavigator::new(),
        })
    }

    /// Configuration in effect
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Session shared by every view
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Client shared by every view
    pub fn api(&self) -> Arc<dyn BookApi> {
        Arc::clone(&self.api)
    }

    /// Theme shared by every view
    pub fn theme(&self) -> &ThemeContext {
        &self.theme
    }

    /// Navigator recording every route change
    pub fn navigator(&self) -> &RecordingNavigator {
        &self.navigator
    }

    /// Sign in and store the returned token
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        self.api.login_user(username.to_string(), password.to_string()).await?;
        Ok(())
    }

    /// Dashboard list using the configured page size
    pub fn book_list(&self) -> BookListView {
        let config = BookListConfig { page_size: self.config.page_size, ..Default::default() };
        BookListView::new(self.api(), config)
    }

    /// Empty add form
    pub fn add_form(&self) -> AddBookForm {
        AddBookForm::new(self.api(), Arc::new(self.navigator.clone()), self.form_config())
    }

    /// Edit form for book `id`
    pub fn edit_form(&self, id: u64) -> EditBookForm {
        EditBookForm::new(self.api(), Arc::new(self.navigator.clone()), id, self.form_config())
    }

    /// Header bar
    pub fn header(&self) -> Header {
        Header::new(self.api(), self.theme.clone())
    }

    /// User dropdown
    pub fn user_dropdown(&self) -> UserDropdown {
        UserDropdown::new(self.api(), Arc::new(self.navigator.clone()), self.theme.clone())
    }

    fn form_config(&self) -> FormConfig {
        FormConfig::default().with_redirect_delay(self.config.redirect_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_views_share_theme_and_navigator() {
        let app = App::with_session(AppConfig::default(), SessionContext::in_memory()).unwrap();

        app.user_dropdown().toggle_theme();
        assert_eq!(app.theme().mode(), app_ui::ThemeMode::Dark);

        app.user_dropdown().open_profile();
        assert_eq!(app.navigator().current(), Some(app_state::Route::Profile));
    }

    #[test]
    fn test_open_persists_session_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig { data_dir: dir.path().join("session"), ..Default::default() };

        {
            let app = App::open(config.clone()).unwrap();
            app.session().set_token("persisted").unwrap();
        }

        let app = App::open(config).unwrap();
        assert_eq!(app.session().token().as_deref(), Some("persisted"));
    }

    #[test]
    fn test_page_size_and_delay_flow_into_views() {
        let config =
            AppConfig { page_size: 5, redirect_delay: Duration::ZERO, ..Default::default() };
        let app = App::with_session(config, SessionContext::in_memory()).unwrap();

        let list = app.book_list();
        assert_eq!(list.total_pages(), 0);
        assert_eq!(app.config().page_size, 5);
    }
}
