// Library Client Core - Library management client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Admin audit log, read-only

use crate::api::client::ApiClient;
use crate::api::models::Log;
use crate::error::{LibraryError, Result};
use crate::store::activity::Activity;
use crate::store::session::SessionStore;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogState {
    pub logs: Vec<Log>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct LogStore {
    api: Arc<ApiClient>,
    session: Arc<SessionStore>,
    state: RwLock<LogState>,
    activity: Activity,
}

impl LogStore {
    pub fn new(api: Arc<ApiClient>, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            session,
            state: RwLock::new(LogState::default()),
            activity: Activity::new(),
        }
    }

    pub async fn snapshot(&self) -> LogState {
        let mut state = self.state.read().await.clone();
        state.loading = self.activity.is_loading();
        state
    }

    pub async fn logs(&self) -> Vec<Log> {
        self.state.read().await.logs.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// Replace the log collection with the backend's, verbatim
    pub async fn fetch_logs(&self) {
        let _guard = self.activity.start();
        let ticket = self.activity.next_ticket();
        self.state.write().await.error = None;

        let result = self.load().await;

        if !self.activity.is_current(ticket) {
            debug!(ticket, "discarding superseded log list");
            return;
        }

        let mut state = self.state.write().await;
        match result {
            Ok(logs) => {
                debug!(count = logs.len(), "logs loaded");
                state.logs = logs;
            }
            Err(e) => {
                error!(error = %e, "fetching logs failed");
                state.error = Some(e.user_message());
            }
        }
    }

    async fn load(&self) -> Result<Vec<Log>> {
        let token = self.session.token().await.ok_or(LibraryError::MissingToken)?;
        self.api.list_logs(&token).await
    }

    pub fn cancel_pending(&self) {
        self.activity.invalidate();
    }
}
