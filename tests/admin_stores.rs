//! Audit log and user directory against a mocked backend

mod common;

use common::{context_for, signed_in_context, user_json};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_logs_are_replaced_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/logs"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "timestamp": "2024-03-05T09:30:00.000Z", "user": "Anna", "action": "Wypożyczono: Solaris" },
            { "timestamp": "2024-03-06T11:00:00.000Z", "user": "Jan", "action": "Zwrócono: Eden" }
        ])))
        .mount(&server)
        .await;

    let context = signed_in_context(&server).await;
    context.logs().fetch_logs().await;

    let state = context.logs().snapshot().await;
    assert!(state.error.is_none());
    assert_eq!(state.logs.len(), 2);
    assert_eq!(state.logs[1].action, "Zwrócono: Eden");
}

#[tokio::test]
async fn test_logs_require_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let context = context_for(&server).await;
    context.logs().fetch_logs().await;

    assert_eq!(
        context.logs().error().await.as_deref(),
        Some("Wystąpił nieoczekiwany błąd.")
    );
}

#[tokio::test]
async fn test_forbidden_logs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/logs"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let context = signed_in_context(&server).await;
    context.logs().fetch_logs().await;

    assert_eq!(
        context.logs().error().await.as_deref(),
        Some("Brak uprawnień do wykonania tej operacji.")
    );
    assert!(context.logs().logs().await.is_empty());
}

#[tokio::test]
async fn test_user_directory_resolves_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            user_json("u1", "Anna Nowak", "CLIENT"),
            user_json("admin", "Bibliotekarz", "ADMIN"),
        ])))
        .mount(&server)
        .await;

    let context = signed_in_context(&server).await;
    let users = context.users();
    users.fetch_users().await;

    assert!(users.error().await.is_none());
    assert_eq!(users.users().await.len(), 2);
    assert_eq!(users.user_name("u1").await, "Anna Nowak");
    assert_eq!(users.user_name("u404").await, "Nieznany użytkownik");
}

#[tokio::test]
async fn test_user_directory_unknown_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(418))
        .mount(&server)
        .await;

    let context = signed_in_context(&server).await;
    context.users().fetch_users().await;

    assert_eq!(
        context.users().error().await.as_deref(),
        Some("Błąd serwera: 418")
    );
}
