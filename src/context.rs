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


//! Store container
//!
//! [`LibraryContext`] wires the stores together: one shared [`ApiClient`],
//! one [`Database`], and the event channel from the rental store to the
//! catalog store. A front end builds one context and hands out references.
//!
//! # Example
//! ```rust,no_run
//! use library_core::{LibraryConfig, LibraryContext};
//!
//! # async fn example() -> library_core::error::Result<()> {
//! let context = LibraryContext::new(LibraryConfig::from_env()?).await?;
//!
//! if context.session().login("123", "secret").await.is_some() {
//!     context.catalog().fetch_books().await;
//!     context.rentals().borrow_book("1").await;
//! }
//! # Ok(())
//! # }
//! ```

use crate::api::client::ApiClient;
use crate::config::LibraryConfig;
use crate::error::Result;
use crate::forms::NumericInputPolicy;
use crate::storage::Database;
use crate::store::{
    rental_events, CatalogStore, LogStore, RentalStore, SessionStore, UserDirectoryStore,
};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct LibraryContext {
    api: Arc<ApiClient>,
    db: Database,
    numeric_input: NumericInputPolicy,
    session: Arc<SessionStore>,
    catalog: Arc<CatalogStore>,
    rentals: Arc<RentalStore>,
    logs: Arc<LogStore>,
    users: Arc<UserDirectoryStore>,
}

impl LibraryContext {
    /// Open storage, build the stores and restore a persisted session
    ///
    /// # Errors
    /// Returns error if the API client cannot be built or the database cannot
    /// be opened
    pub async fn new(config: LibraryConfig) -> Result<Self> {
        let api = Arc::new(ApiClient::with_config(config.api.clone())?);
        let db = config.open_database().await?;
        let context = Self::with_parts(api, db, config.numeric_input);

        context.session.rehydrate().await?;
        info!(
            base_url = context.api.base_url(),
            signed_in = context.session.is_authenticated().await,
            "library context ready"
        );
        Ok(context)
    }

    /// Build the stores from an existing client and database without
    /// touching storage
    pub fn with_parts(api: Arc<ApiClient>, db: Database, numeric_input: NumericInputPolicy) -> Self {
        let (sender, receiver) = rental_events();

        let session = Arc::new(SessionStore::new(Arc::clone(&api), db.clone()));
        let catalog = Arc::new(CatalogStore::new(Arc::clone(&api), receiver));
        let rentals = Arc::new(RentalStore::new(Arc::clone(&api), Arc::clone(&session), sender));
        let logs = Arc::new(LogStore::new(Arc::clone(&api), Arc::clone(&session)));
        let users = Arc::new(UserDirectoryStore::new(Arc::clone(&api), Arc::clone(&session)));

        Self {
            api,
            db,
            numeric_input,
            session,
            catalog,
            rentals,
            logs,
            users,
        }
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// How book forms treat non-numeric input
    pub fn numeric_input(&self) -> NumericInputPolicy {
        self.numeric_input
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn catalog(&self) -> &Arc<CatalogStore> {
        &self.catalog
    }

    pub fn rentals(&self) -> &Arc<RentalStore> {
        &self.rentals
    }

    pub fn logs(&self) -> &Arc<LogStore> {
        &self.logs
    }

    pub fn users(&self) -> &Arc<UserDirectoryStore> {
        &self.users
    }

    /// Drop every in-flight fetch result, e.g. when the view goes away
    pub fn cancel_pending(&self) {
        self.catalog.cancel_pending();
        self.rentals.cancel_pending();
        self.logs.cancel_pending();
        self.users.cancel_pending();
    }
}
