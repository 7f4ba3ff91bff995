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


//! Rental store: borrow and return
//!
//! # Lifecycle
//! ```text
//! Borrowed --return--> Returned
//! Overdue  --return--> Returned
//! ```
//! The client never moves a rental into `Overdue`; the backend does.
//!
//! # Side effects on the catalog
//! A successful borrow publishes `RentalCompleted { delta: -1 }` and a
//! successful return publishes `RentalCompleted { delta: +1 }`. Nothing is
//! published when the backend rejects the request.
//!
//! # Concurrency
//! Borrows of the same book and returns of the same rental are serialized
//! through [`KeyedLocks`]. Fetches are guarded by request epochs: a rental
//! list that arrives after a newer fetch or a mutation is discarded.

use crate::api::client::ApiClient;
use crate::api::models::{Rental, RentalStatus, RentalWithBook};
use crate::error::{LibraryError, Result};
use crate::store::activity::{Activity, KeyedLocks};
use crate::store::events::{RentalCompleted, RentalEventSender};
use crate::store::session::SessionStore;
use chrono::{SecondsFormat, Utc};
use futures_util::future::join_all;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

const MSG_FETCH_FAILED: &str = "Wystąpił nieznany błąd.";
const MSG_BORROW_FAILED: &str = "Wystąpił nieznany błąd podczas wypożyczania książki.";
const MSG_RETURN_FAILED: &str = "Wystąpił nieznany błąd podczas zwracania książki.";
const MSG_ALREADY_RETURNED: &str = "Ta książka została już zwrócona.";

/// Counts shown on the user panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RentalStats {
    pub returned: usize,
    pub overdue: usize,
    pub current: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RentalState {
    pub rentals: Vec<RentalWithBook>,
    pub loading: bool,
    pub error: Option<String>,
}

impl RentalState {
    pub fn find(&self, rental_id: &str) -> Option<&RentalWithBook> {
        self.rentals.iter().find(|r| r.id == rental_id)
    }

    pub fn stats(&self) -> RentalStats {
        self.rentals
            .iter()
            .fold(RentalStats::default(), |mut stats, rental| {
                match rental.status {
                    RentalStatus::Returned => stats.returned += 1,
                    RentalStatus::Overdue => stats.overdue += 1,
                    RentalStatus::Borrowed => stats.current += 1,
                }
                stats
            })
    }

    /// Rentals started in calendar month `month` (1-12) of any year
    ///
    /// Rentals whose date does not parse are left out.
    pub fn in_month(&self, month: u32) -> Vec<RentalWithBook> {
        self.rentals
            .iter()
            .filter(|r| r.rental_month() == Some(month))
            .cloned()
            .collect()
    }

    pub fn borrowed_by(&self, user_id: &str) -> Vec<RentalWithBook> {
        self.rentals
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Whether `user_id` still holds a copy
    ///
    /// `None` when the last fetch failed and the collection cannot be trusted.
    pub fn has_open_rentals(&self, user_id: &str) -> Option<bool> {
        if self.error.is_some() {
            return None;
        }
        Some(
            self.rentals
                .iter()
                .any(|r| r.user_id == user_id && r.status.is_open()),
        )
    }

    /// Rentals whose copy has not come back
    pub fn open_rentals(&self) -> Vec<RentalWithBook> {
        self.rentals
            .iter()
            .filter(|r| r.status.is_open())
            .cloned()
            .collect()
    }
}

#[derive(Debug)]
pub struct RentalStore {
    api: Arc<ApiClient>,
    session: Arc<SessionStore>,
    events: RentalEventSender,
    state: RwLock<RentalState>,
    activity: Activity,
    locks: KeyedLocks,
}

impl RentalStore {
    pub fn new(api: Arc<ApiClient>, session: Arc<SessionStore>, events: RentalEventSender) -> Self {
        Self {
            api,
            session,
            events,
            state: RwLock::new(RentalState::default()),
            activity: Activity::new(),
            locks: KeyedLocks::new(),
        }
    }

    pub async fn snapshot(&self) -> RentalState {
        let mut state = self.state.read().await.clone();
        state.loading = self.activity.is_loading();
        state
    }

    pub async fn rentals(&self) -> Vec<RentalWithBook> {
        self.state.read().await.rentals.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.activity.is_loading()
    }

    /// Load the rentals visible to the signed-in user and join each with its
    /// book
    ///
    /// A book that cannot be fetched leaves that rental's `book` empty. The
    /// joined list is committed once. On failure the list is cleared.
    pub async fn fetch_rentals(&self) {
        let _guard = self.activity.start();
        let ticket = self.activity.next_ticket();
        self.state.write().await.error = None;

        let result = self.load_rentals().await;

        if !self.activity.is_current(ticket) {
            debug!(ticket, "discarding superseded rental list");
            return;
        }

        let mut state = self.state.write().await;
        match result {
            Ok(rentals) => {
                debug!(count = rentals.len(), "rental list loaded");
                state.rentals = rentals;
            }
            Err(e) => {
                error!(error = %e, "fetching rentals failed");
                state.rentals.clear();
                state.error = Some(e.user_message_or(MSG_FETCH_FAILED));
            }
        }
    }

    async fn load_rentals(&self) -> Result<Vec<RentalWithBook>> {
        let token = self.session.token().await.ok_or(LibraryError::MissingToken)?;
        let rentals = self.api.list_rentals(&token).await?;
        Ok(join_all(rentals.into_iter().map(|rental| self.join_book(rental))).await)
    }

    async fn join_book(&self, mut rental: Rental) -> RentalWithBook {
        if !rental.has_book_reference() {
            rental.book = None;
            return rental;
        }

        rental.book = match self.api.get_book(&rental.book_id).await {
            Ok(book) => Some(book),
            Err(e) => {
                warn!(rental_id = %rental.id, book_id = %rental.book_id, error = %e, "book for rental unavailable");
                None
            }
        };
        rental
    }

    /// Borrow one copy of `book_id` for the signed-in user
    ///
    /// Availability is not checked locally; the backend decides.
    pub async fn borrow_book(&self, book_id: &str) -> bool {
        let _guard = self.activity.start();
        let _lock = self.locks.lock(&format!("book:{}", book_id)).await;
        self.state.write().await.error = None;

        let Some(token) = self.session.token().await else {
            self.fail("borrow_book", &LibraryError::MissingToken, MSG_BORROW_FAILED).await;
            return false;
        };

        let mut rental = match self.api.create_rental(&token, book_id).await {
            Ok(rental) => rental,
            Err(e) => {
                self.fail("borrow_book", &e, MSG_BORROW_FAILED).await;
                return false;
            }
        };

        if rental.book_id.is_empty() {
            rental.book_id = book_id.to_string();
        }
        rental.book = None;

        info!(rental_id = %rental.id, book_id, "book borrowed");
        self.state.write().await.rentals.push(rental);
        self.activity.invalidate();
        self.events.publish(RentalCompleted::borrowed(book_id));
        true
    }

    /// Return the copy held under `rental_id`
    ///
    /// A rental already known to be returned is rejected without a request.
    pub async fn return_book(&self, rental_id: &str) -> bool {
        let _guard = self.activity.start();
        let _lock = self.locks.lock(&format!("rental:{}", rental_id)).await;
        self.state.write().await.error = None;

        let Some(token) = self.session.token().await else {
            self.fail("return_book", &LibraryError::MissingToken, MSG_RETURN_FAILED).await;
            return false;
        };

        let already_returned = self
            .state
            .read()
            .await
            .find(rental_id)
            .map(|r| r.status == RentalStatus::Returned)
            .unwrap_or(false);
        if already_returned {
            let err = LibraryError::InvalidState(MSG_ALREADY_RETURNED.to_string());
            self.fail("return_book", &err, MSG_RETURN_FAILED).await;
            return false;
        }

        let returned_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        if let Err(e) = self.api.return_rental(&token, rental_id, &returned_at).await {
            self.fail("return_book", &e, MSG_RETURN_FAILED).await;
            return false;
        }

        let book_id = {
            let mut state = self.state.write().await;
            state
                .rentals
                .iter_mut()
                .find(|r| r.id == rental_id)
                .map(|rental| {
                    rental.mark_returned(&returned_at);
                    rental.book_id.clone()
                })
        };
        self.activity.invalidate();

        info!(rental_id, returned_at = %returned_at, "book returned");
        match book_id {
            Some(book_id) if !book_id.is_empty() => {
                self.events.publish(RentalCompleted::returned(book_id));
            }
            Some(_) => debug!(rental_id, "returned rental has no book reference"),
            None => debug!(rental_id, "returned rental is not loaded locally"),
        }
        true
    }

    /// Discard responses of requests that are still in flight
    pub fn cancel_pending(&self) {
        self.activity.invalidate();
    }

    async fn fail(&self, operation: &str, err: &LibraryError, fallback: &str) {
        error!(operation, error = %err, "rental operation failed");
        self.state.write().await.error = Some(err.user_message_or(fallback));
    }
}
