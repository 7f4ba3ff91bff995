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


//! Durable client state
//!
//! SQLite via sqlx holds the only state that survives a restart: the bearer
//! token and the signed-in user. Everything else is re-read from the backend.
//!
//! # Usage Example
//! ```no_run
//! use library_core::storage::{session, Database};
//!
//! # async fn example() -> library_core::error::Result<()> {
//! let db = Database::new(Database::get_default_path()).await?;
//! let token = session::load_token(db.pool()).await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod migrations;
pub mod session;

pub use database::Database;
