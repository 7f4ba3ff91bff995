//! Shared fixtures for the store integration tests

#![allow(dead_code)]

use library_core::{LibraryConfig, LibraryContext};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const TOKEN: &str = "tok";

/// Context with in-memory storage pointed at `server`
pub async fn context_for(server: &MockServer) -> LibraryContext {
    LibraryContext::new(LibraryConfig::for_testing(server.uri()))
        .await
        .expect("Failed to build context")
}

/// Same as [`context_for`] with a bearer token already installed
pub async fn signed_in_context(server: &MockServer) -> LibraryContext {
    let context = context_for(server).await;
    context.session().set_token(Some(TOKEN.to_string())).await;
    context
}

pub fn book_json(id: &str, title: &str, available: i32) -> Value {
    json!({
        "id": id,
        "title": title,
        "author": "Stanisław Lem",
        "description": null,
        "year": 1961,
        "availableCopies": available,
        "borrowedCopies": 0
    })
}

pub fn rental_json(id: &str, book_id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "userId": "u1",
        "bookId": book_id,
        "rentalDate": "2024-03-05T09:30:00.000Z",
        "returnDate": null,
        "status": status
    })
}

pub fn user_json(id: &str, name: &str, role: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": format!("{}@example.com", id),
        "libraryCardId": "123",
        "role": role
    })
}

/// Base URL of a port nobody listens on
pub fn closed_port_uri() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local address").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
