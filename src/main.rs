//! Headless entry point: restores the stored session and prints the first
//! dashboard page.

use perpus_admin::{init_tracing, App, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_tracing(&config);

    tracing::info!(
        api_url = %config.api_url,
        data_dir = %config.data_dir.display(),
        "starting perpus admin"
    );

    let app = App::open(config)?;

    if !app.session().is_authenticated() {
        tracing::warn!("no stored session, protected requests will be rejected");
    }

    let header = app.header();
    if let Some(username) = header.load_user().await {
        tracing::info!(%username, "signed in");
    }

    let mut list = app.book_list();
    if let Err(e) = list.load().await {
        tracing::error!(error = %e, "dashboard could not be loaded");
        return Err(e.into());
    }

    tracing::info!(
        page = list.page(),
        total_pages = list.total_pages(),
        books = list.books().len(),
        "dashboard loaded"
    );
    for book in list.current_page_rows() {
        tracing::info!(
            id = book.id,
            title = %book.title,
            author = %book.author,
            year = book.year,
            "book"
        );
    }

    Ok(())
}
