// Library Client Core - Library management client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Admin user directory
//!
//! Used to put names next to rentals, which only carry a user id.

use crate::api::client::ApiClient;
use crate::api::models::User;
use crate::error::{LibraryError, Result};
use crate::store::activity::Activity;
use crate::store::session::SessionStore;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error};

/// Shown for an id that is not in the directory
pub const UNKNOWN_USER: &str = "Nieznany użytkownik";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserDirectoryState {
    pub users: Vec<User>,
    pub loading: bool,
    pub error: Option<String>,
}

impl UserDirectoryState {
    pub fn user_name(&self, user_id: &str) -> String {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.name.clone())
            .unwrap_or_else(|| UNKNOWN_USER.to_string())
    }
}

#[derive(Debug)]
pub struct UserDirectoryStore {
    api: Arc<ApiClient>,
    session: Arc<SessionStore>,
    state: RwLock<UserDirectoryState>,
    activity: Activity,
}

impl UserDirectoryStore {
    pub fn new(api: Arc<ApiClient>, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            session,
            state: RwLock::new(UserDirectoryState::default()),
            activity: Activity::new(),
        }
    }

    pub async fn snapshot(&self) -> UserDirectoryState {
        let mut state = self.state.read().await.clone();
        state.loading = self.activity.is_loading();
        state
    }

    pub async fn users(&self) -> Vec<User> {
        self.state.read().await.users.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn user_name(&self, user_id: &str) -> String {
        self.state.read().await.user_name(user_id)
    }

    pub async fn fetch_users(&self) {
        let _guard = self.activity.start();
        let ticket = self.activity.next_ticket();
        self.state.write().await.error = None;

        let result = self.load().await;

        if !self.activity.is_current(ticket) {
            debug!(ticket, "discarding superseded user list");
            return;
        }

        let mut state = self.state.write().await;
        match result {
            Ok(users) => {
                debug!(count = users.len(), "users loaded");
                state.users = users;
            }
            Err(e) => {
                error!(error = %e, "fetching users failed");
                state.error = Some(e.user_message());
            }
        }
    }

    async fn load(&self) -> Result<Vec<User>> {
        let token = self.session.token().await.ok_or(LibraryError::MissingToken)?;
        self.api.list_users(&token).await
    }

    pub fn cancel_pending(&self) {
        self.activity.invalidate();
    }
}
