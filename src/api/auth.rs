// Library Client Core - Library management client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Authentication endpoints
//!
//! The backend issues an opaque bearer token on `POST /login`; there is no
//! refresh flow. Registration never authenticates.

use crate::api::client::ApiClient;
use crate::api::models::{LoginRequest, RegisterRequest, Session, User};
use crate::error::Result;
use reqwest::Method;
use tracing::debug;

impl ApiClient {
    /// Exchange a library card number and password for `{user, token}`
    pub async fn login(&self, library_card_id: &str, password: &str) -> Result<Session> {
        let body = LoginRequest {
            library_card_id,
            password,
        };
        self.send_json(Method::POST, "/login", &body, None).await
    }

    /// Register a new reader
    ///
    /// Returns the created user when the backend echoes it back; some
    /// backends answer with a bare acknowledgement instead.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Option<User>> {
        let body = RegisterRequest {
            name,
            email,
            password,
        };
        let response: serde_json::Value = self
            .send_json(Method::POST, "/register", &body, None)
            .await?;

        match serde_json::from_value::<User>(response) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                debug!(error = %e, "register response carried no user record");
                Ok(None)
            }
        }
    }
}
