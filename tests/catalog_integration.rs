//! End-to-end catalog flows
//!
//! Drives the views assembled by [`App`] against a wiremock books API:
//! sign in, add a book, see it on the dashboard, edit it, delete it, sign out.

use app_state::{FormError, ListState, Route, SubmitState};
use perpus_admin::{App, AppConfig};
use perpus_client::{ApiError, SessionContext};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{bearer_token, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app_for(server: &MockServer) -> App {
    let config = AppConfig {
        api_url: server.uri(),
        redirect_delay: Duration::ZERO,
        ..Default::default()
    };
    App::with_session(config, SessionContext::in_memory()).unwrap()
}

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": token})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_created_book_appears_on_dashboard() {
    let server = MockServer::start().await;
    mount_login(&server, "tok-admin").await;

    Mock::given(method("POST"))
        .and(path("/books"))
        .and(bearer_token("tok-admin"))
        .and(body_json(json!({"title": "Dune", "author": "Herbert", "year": 1965})))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({
                    "id": 42,
                    "title": "Dune",
                    "author": "Herbert",
                    "year": 1965
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/books"))
        .and(bearer_token("tok-admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "title": "Laskar Pelangi", "author": "Andrea Hirata", "year": 2005},
            {"id": 42, "title": "Dune", "author": "Herbert", "year": 1965}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server);
    app.login("admin", "secret").await.unwrap();

    let form = app.add_form();
    form.mount();
    assert_eq!(form.status().warning, None);
    form.set_title("Dune");
    form.set_author("Herbert");
    form.set_year("1965");

    let (created, redirect) = form.submit().await.unwrap();
    assert_eq!(created.id, 42);
    redirect.wait().await;
    assert_eq!(app.navigator().current(), Some(Route::Dashboard));

    let mut list = app.book_list();
    list.load().await.unwrap();
    let dune = list.books().iter().find(|b| b.id == 42).unwrap();
    assert_eq!((dune.title.as_str(), dune.author.as_str(), dune.year), ("Dune", "Herbert", 1965));
}

#[tokio::test]
async fn test_invalid_add_form_sends_no_request() {
    let server = MockServer::start().await;
    mount_login(&server, "tok-admin").await;

    Mock::given(method("POST"))
        .and(path("/books"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let app = app_for(&server);
    app.login("admin", "secret").await.unwrap();

    let form = app.add_form();
    let invalid =
        [("", "Herbert", "1965"), ("Dune", "  ", "1965"), ("Dune", "Herbert", "nineteen")];
    for (title, author, year) in invalid {
        form.set_title(title);
        form.set_author(author);
        form.set_year(year);
        assert!(matches!(form.submit().await, Err(FormError::Validation(_))));
    }
    assert!(app.navigator().history().is_empty());
}

#[tokio::test]
async fn test_add_form_blocks_when_signed_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/books"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let app = app_for(&server);
    let form = app.add_form();
    form.mount();
    assert!(form.status().warning.is_some());

    form.set_title("Dune");
    form.set_author("Herbert");
    form.set_year("1965");
    assert!(matches!(form.submit().await, Err(FormError::MissingToken)));
}

#[tokio::test]
async fn test_edit_round_trip() {
    let server = MockServer::start().await;
    mount_login(&server, "tok-admin").await;

    Mock::given(method("GET"))
        .and(path("/books/42"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "id": 42,
                    "title": "Dune",
                    "author": "Herbert",
                    "year": 1965
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/books/42"))
        .and(bearer_token("tok-admin"))
        .and(body_json(json!({"title": "Dune", "author": "Frank Herbert", "year": 1965})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "id": 42,
                    "title": "Dune",
                    "author": "Frank Herbert",
                    "year": 1965
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server);
    app.login("admin", "secret").await.unwrap();

    let form = app.edit_form(42);
    form.mount().await.unwrap();
    assert_eq!(form.draft().title, "Dune");

    form.set_author("Frank Herbert");
    let (updated, redirect) = form.submit().await.unwrap();
    assert_eq!(updated.author, "Frank Herbert");
    assert_eq!(form.state(), SubmitState::Succeeded);

    redirect.wait().await;
    assert_eq!(app.navigator().current(), Some(Route::Dashboard));
}

#[tokio::test]
async fn test_edit_missing_book_shows_load_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/books/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Book not found"})))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server);
    let form = app.edit_form(404);

    let err = form.mount().await.unwrap_err();
    assert!(matches!(err, FormError::Api(ApiError::NotFound { .. })));
    assert!(form.load_error().is_some());
    assert!(!form.can_submit());
}

#[tokio::test]
async fn test_delete_patches_dashboard_and_reclamps() {
    let server = MockServer::start().await;
    mount_login(&server, "tok-admin").await;

    Mock::given(method("GET"))
        .and(path("/books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "title": "A", "author": "X", "year": 2001},
            {"id": 2, "title": "B", "author": "X", "year": 2002},
            {"id": 3, "title": "C", "author": "X", "year": 2003},
            {"id": 4, "title": "D", "author": "X", "year": 2004}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/books/4"))
        .and(bearer_token("tok-admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Book deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server);
    app.login("admin", "secret").await.unwrap();

    let mut list = app.book_list();
    list.load().await.unwrap();
    assert!(list.next_page());
    assert_eq!(list.current_page_rows().len(), 1);

    list.delete(4).await.unwrap();
    assert_eq!(list.page(), 1);
    assert_eq!(list.total_pages(), 1);
    let ids: Vec<u64> = list.books().iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_logout_then_dashboard_is_rejected() {
    let server = MockServer::start().await;
    mount_login(&server, "tok-admin").await;

    Mock::given(method("GET"))
        .and(path("/books"))
        .and(bearer_token("tok-admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server);
    app.login("admin", "secret").await.unwrap();

    let mut list = app.book_list();
    list.load().await.unwrap();

    app.user_dropdown().logout();
    assert_eq!(app.navigator().current(), Some(Route::SignIn));
    assert!(!app.session().is_authenticated());

    Mock::given(method("GET"))
        .and(path("/books"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Missing token"))
        .expect(1)
        .mount(&server)
        .await;

    let err = list.load().await.unwrap_err();
    assert!(matches!(err, app_state::ListError::Api(ApiError::Auth { .. })));
    assert_eq!(list.state(), &ListState::Error("Missing token".to_string()));

    let requests = server.received_requests().await.unwrap();
    let last = requests.last().unwrap();
    assert!(last.headers.get("authorization").is_none());
}
