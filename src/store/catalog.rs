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


//! Catalog store: the book collection
//!
//! Copy counts change in two ways: an authoritative re-read from
//! `GET /books`, or a [`RentalCompleted`] event from the rental store. Events
//! are drained before every read, so a reader never sees a borrow that has
//! not been subtracted yet. A committed book list replaces the counts and
//! discards events published while it was in flight.
//!
//! # Lock order
//! The event receiver is always locked before the state.

use crate::api::client::ApiClient;
use crate::api::models::{Book, NewBook};
use crate::error::LibraryError;
use crate::store::activity::Activity;
use crate::store::events::{RentalCompleted, RentalEventReceiver};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    pub books: Vec<Book>,
    pub loading: bool,
    pub error: Option<String>,
}

impl CatalogState {
    pub fn find(&self, book_id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == book_id)
    }

    /// Books with at least one copy on the shelf
    pub fn available_books(&self) -> Vec<Book> {
        self.books.iter().filter(|b| b.is_available()).cloned().collect()
    }

    /// Case-insensitive substring match on title or author; an empty query
    /// matches everything
    pub fn search(&self, query: &str) -> Vec<Book> {
        let query = query.trim().to_lowercase();
        self.books
            .iter()
            .filter(|b| {
                query.is_empty()
                    || b.title.to_lowercase().contains(&query)
                    || b.author.to_lowercase().contains(&query)
            })
            .cloned()
            .collect()
    }
}

#[derive(Debug)]
pub struct CatalogStore {
    api: Arc<ApiClient>,
    state: RwLock<CatalogState>,
    activity: Activity,
    events: Mutex<RentalEventReceiver>,
}

impl CatalogStore {
    pub fn new(api: Arc<ApiClient>, events: RentalEventReceiver) -> Self {
        Self {
            api,
            state: RwLock::new(CatalogState::default()),
            activity: Activity::new(),
            events: Mutex::new(events),
        }
    }

    /// Apply every copy-count change published so far
    ///
    /// Returns the number of events applied.
    pub async fn apply_pending(&self) -> usize {
        let mut events = self.events.lock().await;
        let pending = events.drain();
        if pending.is_empty() {
            return 0;
        }

        let mut state = self.state.write().await;
        for event in &pending {
            event.apply_to(&mut state.books);
        }
        debug!(count = pending.len(), "applied rental events to catalog");
        pending.len()
    }

    /// Apply one copy-count change directly
    pub async fn apply(&self, event: &RentalCompleted) -> bool {
        self.apply_pending().await;
        event.apply_to(&mut self.state.write().await.books)
    }

    pub async fn snapshot(&self) -> CatalogState {
        self.apply_pending().await;
        let mut state = self.state.read().await.clone();
        state.loading = self.activity.is_loading();
        state
    }

    pub async fn books(&self) -> Vec<Book> {
        self.apply_pending().await;
        self.state.read().await.books.clone()
    }

    pub async fn available_books(&self) -> Vec<Book> {
        self.apply_pending().await;
        self.state.read().await.available_books()
    }

    pub async fn find(&self, book_id: &str) -> Option<Book> {
        self.apply_pending().await;
        self.state.read().await.find(book_id).cloned()
    }

    pub async fn search(&self, query: &str) -> Vec<Book> {
        self.apply_pending().await;
        self.state.read().await.search(query)
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.activity.is_loading()
    }

    /// Replace the collection with the backend's
    ///
    /// On failure the previous collection is kept and the error slot is set.
    pub async fn fetch_books(&self) {
        let _guard = self.activity.start();
        let ticket = self.activity.next_ticket();
        self.apply_pending().await;
        self.state.write().await.error = None;

        let result = self.api.list_books().await;

        if !self.activity.is_current(ticket) {
            debug!(ticket, "discarding superseded book list");
            return;
        }

        match result {
            Ok(books) => {
                debug!(count = books.len(), "book list loaded");
                let mut events = self.events.lock().await;
                let dropped = events.drain().len();
                if dropped > 0 {
                    debug!(dropped, "rental events superseded by book list");
                }
                self.state.write().await.books = books;
            }
            Err(e) => self.fail("fetch_books", &e).await,
        }
    }

    /// Create a book and append the server's record
    pub async fn add_book(&self, book: NewBook) -> Option<Book> {
        let _guard = self.activity.start();
        self.state.write().await.error = None;

        match self.api.create_book(&book).await {
            Ok(created) => {
                info!(book_id = %created.id, title = %created.title, "book added");
                self.state.write().await.books.push(created.clone());
                self.activity.invalidate();
                self.apply_pending().await;
                Some(created)
            }
            Err(e) => {
                self.fail("add_book", &e).await;
                None
            }
        }
    }

    /// Update a book, then re-read the whole collection
    pub async fn edit_book(&self, book: Book) -> bool {
        let _guard = self.activity.start();
        self.state.write().await.error = None;

        if let Err(e) = self.api.update_book(&book).await {
            self.fail("edit_book", &e).await;
            return false;
        }

        info!(book_id = %book.id, "book updated");
        self.fetch_books().await;
        true
    }

    /// Delete a book, then re-read the whole collection
    pub async fn delete_book(&self, book_id: &str) -> bool {
        let _guard = self.activity.start();
        self.state.write().await.error = None;

        if let Err(e) = self.api.delete_book(book_id).await {
            self.fail("delete_book", &e).await;
            return false;
        }

        info!(book_id, "book deleted");
        self.fetch_books().await;
        true
    }

    /// Replace the collection without asking the backend
    pub async fn set_books(&self, books: Vec<Book>) {
        let mut events = self.events.lock().await;
        let dropped = events.drain().len();
        if dropped > 0 {
            debug!(dropped, "rental events superseded by set_books");
        }
        self.activity.invalidate();
        self.state.write().await.books = books;
    }

    /// Discard responses of requests that are still in flight
    pub fn cancel_pending(&self) {
        self.activity.invalidate();
    }

    async fn fail(&self, operation: &str, err: &LibraryError) {
        error!(operation, error = %err, "catalog operation failed");
        self.state.write().await.error = Some(err.user_message());
    }
}
