// Library Client Core - Library management client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Administrative endpoints: audit log and user directory

use crate::api::client::{item_path, ApiClient};
use crate::api::models::{Log, User};
use crate::error::Result;
use reqwest::Method;

impl ApiClient {
    /// Audit trail, returned verbatim
    pub async fn list_logs(&self, token: &str) -> Result<Vec<Log>> {
        self.get("/logs", Some(token)).await
    }

    pub async fn list_users(&self, token: &str) -> Result<Vec<User>> {
        self.get("/users", Some(token)).await
    }

    /// Delete an account. The backend decides whether the caller may.
    pub async fn delete_user(&self, user_id: &str) -> Result<()> {
        self.send_unit(Method::DELETE, &item_path("users", user_id), None::<&()>, None)
            .await
    }
}
