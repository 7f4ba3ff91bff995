// Library Client Core - Library management client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Messages from the rental store to the catalog store
//!
//! The rental store never touches book records. After a borrow or return
//! succeeds it publishes a [`RentalCompleted`] and the catalog store applies
//! the copy-count change the next time its state is read or committed.

use crate::api::models::Book;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

/// A borrow (`delta = -1`) or return (`delta = +1`) was accepted by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RentalCompleted {
    pub book_id: String,
    pub delta: i32,
}

impl RentalCompleted {
    pub fn borrowed<S: Into<String>>(book_id: S) -> Self {
        Self {
            book_id: book_id.into(),
            delta: -1,
        }
    }

    pub fn returned<S: Into<String>>(book_id: S) -> Self {
        Self {
            book_id: book_id.into(),
            delta: 1,
        }
    }

    /// Adjust `available_copies` of the matching book; an unknown count is
    /// treated as zero
    ///
    /// Returns `false` when the book is not in `books`.
    pub fn apply_to(&self, books: &mut [Book]) -> bool {
        match books.iter_mut().find(|b| b.id == self.book_id) {
            Some(book) => {
                book.available_copies = Some(book.copies_on_shelf().saturating_add(self.delta));
                true
            }
            None => {
                debug!(book_id = %self.book_id, delta = self.delta, "copy change for a book not in the catalog");
                false
            }
        }
    }
}

/// Publishing half, held by the rental store
#[derive(Debug, Clone)]
pub struct RentalEventSender {
    tx: UnboundedSender<RentalCompleted>,
}

impl RentalEventSender {
    pub fn publish(&self, event: RentalCompleted) {
        if let Err(e) = self.tx.send(event) {
            warn!(book_id = %e.0.book_id, "catalog is gone, copy change dropped");
        }
    }
}

/// Consuming half, held by the catalog store
#[derive(Debug)]
pub struct RentalEventReceiver {
    rx: UnboundedReceiver<RentalCompleted>,
}

impl RentalEventReceiver {
    /// Take every event published so far without waiting
    pub fn drain(&mut self) -> Vec<RentalCompleted> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

pub fn rental_events() -> (RentalEventSender, RentalEventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RentalEventSender { tx }, RentalEventReceiver { rx })
}
