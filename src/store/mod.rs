// Library Client Core - Library management client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Client-side state stores
//!
//! Each store owns one slice of state behind a `tokio::sync::RwLock`, a
//! loading flag and a single error slot holding a user-facing message.
//! Operations catch failures at the store boundary; only
//! [`SessionStore::delete_user`](session::SessionStore::delete_user) also
//! returns the error.

pub mod activity;
pub mod catalog;
pub mod events;
pub mod logs;
pub mod rentals;
pub mod session;
pub mod users;

pub use catalog::{CatalogState, CatalogStore};
pub use events::{rental_events, RentalCompleted};
pub use logs::{LogState, LogStore};
pub use rentals::{RentalState, RentalStats, RentalStore};
pub use session::{SessionState, SessionStore};
pub use users::{UserDirectoryState, UserDirectoryStore};
