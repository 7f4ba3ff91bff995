//! Login, registration, logout and account deletion against a mocked backend

mod common;

use common::{context_for, user_json};
use library_core::api::models::User;
use library_core::config::StorageLocation;
use library_core::storage::session as durable;
use library_core::{LibraryConfig, LibraryContext};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({ "libraryCardId": "123", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": user_json("u1", "Anna Nowak", "CLIENT"),
            "token": "tok"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_stores_session_in_memory_and_on_disk() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let context = context_for(&server).await;
    let session = context.session();

    let user = session.login("123", "pw").await.expect("login failed");
    assert_eq!(user.name, "Anna Nowak");

    assert_eq!(session.token().await.as_deref(), Some("tok"));
    assert_eq!(session.user().await, Some(user.clone()));
    assert!(session.is_authenticated().await);
    assert!(!session.is_admin().await);

    let pool = context.database().pool();
    assert_eq!(durable::load_token(pool).await.unwrap().as_deref(), Some("tok"));
    assert_eq!(durable::load_user(pool).await.unwrap(), Some(user));
}

#[tokio::test]
async fn test_failed_login_keeps_session_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Nieprawidłowy numer karty lub hasło" })),
        )
        .mount(&server)
        .await;

    let context = context_for(&server).await;
    let session = context.session();

    assert!(session.login("123", "wrong").await.is_none());
    assert!(!session.is_authenticated().await);
    assert_eq!(
        session.error().await.as_deref(),
        Some("Nieprawidłowy numer karty lub hasło")
    );
    assert!(!session.snapshot().await.loading);
}

#[tokio::test]
async fn test_login_without_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let context = context_for(&server).await;
    assert!(context.session().login("123", "pw").await.is_none());
    assert_eq!(context.session().error().await.as_deref(), Some("Błąd logowania"));
}

#[tokio::test]
async fn test_register_conflict_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "message": "User already exists" })))
        .mount(&server)
        .await;

    let context = context_for(&server).await;
    let session = context.session();

    assert!(!session.register("Anna", "anna@example.com", "sekret1").await);
    assert_eq!(
        session.error().await.as_deref(),
        Some("Użytkownik z takim adresem email już istnieje.")
    );
}

#[tokio::test]
async fn test_register_does_not_sign_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .and(body_json(json!({
            "name": "Anna",
            "email": "anna@example.com",
            "password": "sekret1"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(user_json("u2", "Anna", "CLIENT")))
        .expect(1)
        .mount(&server)
        .await;

    let context = context_for(&server).await;
    let session = context.session();

    assert!(session.register("Anna", "anna@example.com", "sekret1").await);
    assert!(session.error().await.is_none());
    assert!(!session.is_authenticated().await);
}

#[tokio::test]
async fn test_invalid_registration_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let context = context_for(&server).await;
    let session = context.session();

    assert!(!session.register("", "anna@", "abc").await);
    let error = session.error().await.unwrap();
    assert!(error.contains("Imię jest wymagane"));
    assert!(error.contains("Niepoprawny format email"));
    assert!(error.contains("Hasło musi mieć co najmniej 6 znaków"));
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let context = context_for(&server).await;
    let session = context.session();
    session.login("123", "pw").await.unwrap();

    session.logout().await;
    let once = session.snapshot().await;
    session.logout().await;
    let twice = session.snapshot().await;

    assert_eq!(once, twice);
    assert!(!session.is_authenticated().await);
    assert!(session.user().await.is_none());
    assert!(durable::load_token(context.database().pool()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_logout_during_login_wins() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "user": user_json("u1", "Anna", "CLIENT"), "token": "tok" }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let context = context_for(&server).await;
    let session = Arc::clone(context.session());

    let login = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.login("123", "pw").await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    session.logout().await;

    assert!(login.await.unwrap().is_none());
    assert!(!session.is_authenticated().await);
    assert!(durable::load_token(context.database().pool()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_racing_login_and_logout_agree_on_disk() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let context = context_for(&server).await;
    let session = Arc::clone(context.session());
    let pool = context.database().pool();

    for _ in 0..20 {
        let login = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.login("123", "pw").await })
        };
        let logout = {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                session.logout().await
            })
        };
        login.await.unwrap();
        logout.await.unwrap();

        assert_eq!(session.token().await, durable::load_token(pool).await.unwrap());
        assert_eq!(session.user().await, durable::load_user(pool).await.unwrap());
        session.logout().await;
    }
}

#[tokio::test]
async fn test_set_user_persists_and_keeps_token() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let context = context_for(&server).await;
    let session = context.session();
    let pool = context.database().pool();
    session.login("123", "pw").await.unwrap();

    let renamed: User = serde_json::from_value(user_json("u1", "Anna Kowalska", "CLIENT")).unwrap();
    session.set_user(Some(renamed.clone())).await;

    assert_eq!(session.user().await, Some(renamed.clone()));
    assert_eq!(durable::load_user(pool).await.unwrap(), Some(renamed));
    assert_eq!(session.token().await.as_deref(), Some("tok"));

    session.set_user(None).await;

    assert!(session.user().await.is_none());
    assert!(durable::load_user(pool).await.unwrap().is_none());
    assert_eq!(session.token().await.as_deref(), Some("tok"));
    assert_eq!(durable::load_token(pool).await.unwrap().as_deref(), Some("tok"));
}

#[tokio::test]
async fn test_session_survives_restart() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    let dir = tempfile::tempdir().unwrap();

    let mut config = LibraryConfig::for_testing(server.uri());
    config.storage = StorageLocation::File(dir.path().join("client.db"));

    let first = LibraryContext::new(config.clone()).await.unwrap();
    first.session().login("123", "pw").await.unwrap();

    let second = LibraryContext::new(config).await.unwrap();
    assert_eq!(second.session().token().await.as_deref(), Some("tok"));
    assert_eq!(second.session().user().await.unwrap().id, "u1");
}

#[tokio::test]
async fn test_corrupt_stored_user_is_discarded() {
    let server = MockServer::start().await;
    let context = context_for(&server).await;
    let pool = context.database().pool();

    sqlx::query("INSERT INTO ClientState (key, value) VALUES ('token', 'tok'), ('user', '{not json')")
        .execute(pool)
        .await
        .unwrap();

    context.session().rehydrate().await.unwrap();

    assert_eq!(context.session().token().await.as_deref(), Some("tok"));
    assert!(context.session().user().await.is_none());
    assert!(durable::load_user(pool).await.unwrap().is_none());
}

#[tokio::test]
async fn test_deleting_own_account_signs_out() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/users/u1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let context = context_for(&server).await;
    let session = context.session();
    session.login("123", "pw").await.unwrap();

    session.delete_user("u1").await.unwrap();

    assert!(!session.is_authenticated().await);
    assert!(session.user().await.is_none());
}

#[tokio::test]
async fn test_deleting_other_account_keeps_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": user_json("admin", "Bibliotekarz", "ADMIN"),
            "token": "tok"
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/users/u7"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let context = context_for(&server).await;
    let session = context.session();
    session.login("123", "pw").await.unwrap();
    assert!(session.is_admin().await);

    session.delete_user("u7").await.unwrap();
    assert!(session.is_authenticated().await);
}

#[tokio::test]
async fn test_failed_deletion_returns_status() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/users/u1"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let context = context_for(&server).await;
    let session = context.session();
    session.login("123", "pw").await.unwrap();

    let err = session.delete_user("u1").await.unwrap_err();
    assert_eq!(err.status_code(), Some(403));
    assert_eq!(
        session.error().await.as_deref(),
        Some("Brak uprawnień do wykonania tej operacji.")
    );
    assert!(session.is_authenticated().await);
}
