// Library Client Core - Library management client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Session store: who is signed in
//!
//! Holds the current [`User`] and bearer token in memory and mirrors both to
//! durable storage so that [`rehydrate`](SessionStore::rehydrate) can restore
//! them after a restart. Other stores read the token from here.
//!
//! # Failure reporting
//! `login` and `register` report failure through the error slot and their
//! return value. `delete_user` additionally returns the error so the caller
//! can react to the HTTP status.

use crate::api::client::ApiClient;
use crate::api::models::User;
use crate::error::{LibraryError, Result, MSG_NETWORK};
use crate::forms::RegistrationForm;
use crate::storage::{session as durable, Database};
use crate::store::activity::Activity;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

const MSG_LOGIN_FAILED: &str = "Błąd logowania";
const MSG_REGISTER_FAILED: &str = "Błąd rejestracji";
const MSG_USER_EXISTS: &str = "Użytkownik z takim adresem email już istnieje.";
const MSG_DELETE_FAILED: &str = "Nie udało się usunąć konta.";

/// Backend message for a registration with a taken email
const SERVER_USER_EXISTS: &str = "User already exists";

/// Snapshot of the session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[derive(Debug)]
pub struct SessionStore {
    api: Arc<ApiClient>,
    db: Database,
    state: RwLock<SessionState>,
    activity: Activity,
}

impl SessionStore {
    pub fn new(api: Arc<ApiClient>, db: Database) -> Self {
        Self {
            api,
            db,
            state: RwLock::new(SessionState::default()),
            activity: Activity::new(),
        }
    }

    pub async fn snapshot(&self) -> SessionState {
        let mut state = self.state.read().await.clone();
        state.loading = self.activity.is_loading();
        state
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    /// Bearer token for authenticated endpoints
    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    pub async fn is_admin(&self) -> bool {
        self.state
            .read()
            .await
            .user
            .as_ref()
            .map(User::is_admin)
            .unwrap_or(false)
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    /// Restore `{token, user}` from durable storage
    ///
    /// A user record that no longer decodes is discarded; the token is kept.
    pub async fn rehydrate(&self) -> Result<()> {
        let token = durable::load_token(self.db.pool()).await?;
        let user = match durable::load_user(self.db.pool()).await {
            Ok(user) => user,
            Err(e @ LibraryError::CorruptRecord { .. }) => {
                warn!(error = %e, "discarding stored user");
                durable::save_user(self.db.pool(), None).await?;
                None
            }
            Err(e) => return Err(e),
        };

        debug!(has_token = token.is_some(), has_user = user.is_some(), "session rehydrated");

        let mut state = self.state.write().await;
        state.token = token;
        state.user = user;
        Ok(())
    }

    /// Sign in with a library card number
    ///
    /// Returns the user on success. On failure the session stays signed out,
    /// the error slot holds the reason and `None` is returned.
    pub async fn login(&self, library_card_id: &str, password: &str) -> Option<User> {
        let _guard = self.activity.start();
        let ticket = self.activity.next_ticket();
        self.state.write().await.error = None;

        let session = match self.api.login(library_card_id, password).await {
            Ok(session) => session,
            Err(e) => {
                error!(error = %e, "login failed");
                self.state.write().await.error = Some(login_error_message(&e));
                return None;
            }
        };

        // Disk and memory are committed under the state lock
        let mut state = self.state.write().await;
        if !self.activity.is_current(ticket) {
            debug!("login finished after the session was reset, ignoring");
            return None;
        }

        if let Err(e) = durable::save_session(self.db.pool(), &session.token, &session.user).await {
            warn!(error = %e, "session will not survive a restart");
        }

        info!(user_id = %session.user.id, "signed in");
        state.user = Some(session.user.clone());
        state.token = Some(session.token);
        Some(session.user)
    }

    /// Create an account; does not sign in
    ///
    /// Returns `true` when the backend accepted the registration.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> bool {
        let _guard = self.activity.start();
        self.state.write().await.error = None;

        let form = RegistrationForm::new(name, email, password);
        let result = match form.validate() {
            Ok(()) => self.api.register(name, email, password).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(user) => {
                info!(user_id = user.as_ref().map(|u| u.id.as_str()).unwrap_or("?"), "registered");
                true
            }
            Err(e) => {
                error!(error = %e, "registration failed");
                self.state.write().await.error = Some(register_error_message(&e));
                false
            }
        }
    }

    /// Forget the session in memory and on disk
    ///
    /// Idempotent. A storage failure is logged; memory is cleared regardless.
    pub async fn logout(&self) {
        self.activity.invalidate();

        let mut state = self.state.write().await;
        if let Err(e) = durable::clear_session(self.db.pool()).await {
            warn!(error = %e, "failed to clear stored session");
        }
        *state = SessionState::default();
        debug!("signed out");
    }

    /// Delete an account
    ///
    /// When the deleted account is the signed-in one, the session is cleared.
    /// Whether the account may be deleted (e.g. no unreturned rentals) is for
    /// the caller to decide.
    ///
    /// # Errors
    /// Returns the backend error, with its HTTP status, if deletion failed
    pub async fn delete_user(&self, user_id: &str) -> Result<()> {
        let _guard = self.activity.start();
        self.state.write().await.error = None;

        if let Err(e) = self.api.delete_user(user_id).await {
            error!(user_id, error = %e, "account deletion failed");
            self.state.write().await.error = Some(e.user_message_or(MSG_DELETE_FAILED));
            return Err(e);
        }

        info!(user_id, "account deleted");
        let is_current_user = self
            .state
            .read()
            .await
            .user
            .as_ref()
            .map(|u| u.id == user_id)
            .unwrap_or(false);

        if is_current_user {
            self.logout().await;
        }
        Ok(())
    }

    /// Override the signed-in user, e.g. after an external login flow
    pub async fn set_user(&self, user: Option<User>) {
        let mut state = self.state.write().await;
        if let Err(e) = durable::save_user(self.db.pool(), user.as_ref()).await {
            warn!(error = %e, "failed to persist user");
        }
        state.user = user;
    }

    /// Install a token obtained elsewhere
    pub async fn set_token(&self, token: Option<String>) {
        self.state.write().await.token = token;
    }
}

fn login_error_message(err: &LibraryError) -> String {
    if let Some(message) = err.server_message() {
        message.to_string()
    } else if err.is_transport_error() {
        MSG_NETWORK.to_string()
    } else {
        MSG_LOGIN_FAILED.to_string()
    }
}

fn register_error_message(err: &LibraryError) -> String {
    match (err.status_code(), err.server_message()) {
        (Some(400), Some(SERVER_USER_EXISTS)) => MSG_USER_EXISTS.to_string(),
        (_, Some(message)) => message.to_string(),
        _ if err.is_transport_error() => MSG_NETWORK.to_string(),
        _ => match err {
            LibraryError::ValidationFailed { .. } => err.user_message(),
            _ => MSG_REGISTER_FAILED.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_conflict_is_translated() {
        let err = LibraryError::api_failed(400, Some("User already exists".to_string()), "/register");
        assert_eq!(register_error_message(&err), MSG_USER_EXISTS);
    }

    #[test]
    fn test_register_other_message_passes_through() {
        let err = LibraryError::api_failed(400, Some("Email is invalid".to_string()), "/register");
        assert_eq!(register_error_message(&err), "Email is invalid");

        let err = LibraryError::api_failed(409, None, "/register");
        assert_eq!(register_error_message(&err), MSG_REGISTER_FAILED);
    }

    #[test]
    fn test_login_message_prefers_server_text() {
        let err = LibraryError::api_failed(401, Some("Login failed".to_string()), "/login");
        assert_eq!(login_error_message(&err), "Login failed");

        let err = LibraryError::api_failed(401, None, "/login");
        assert_eq!(login_error_message(&err), MSG_LOGIN_FAILED);

        let err = LibraryError::network_error("refused", false);
        assert_eq!(login_error_message(&err), MSG_NETWORK);
    }
}
