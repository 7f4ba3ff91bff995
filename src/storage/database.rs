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


//! Database connection and management
//!
//! This module handles database connection pooling and initialization for the
//! durable client state (the session token and user record).
//!
//! # Database Location
//! - Desktop (macOS): ~/Library/Application Support/LibraryClient/client.db
//! - Desktop (Linux): ~/.local/share/LibraryClient/client.db
//! - Desktop (Windows): %APPDATA%/LibraryClient/client.db
//!
//! # SQLite Configuration
//! - WAL mode for file databases
//! - Normal synchronous mode (balance safety/speed)

use crate::error::{LibraryError, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous},
    ConnectOptions,
};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Directory name under the platform data directory
const APP_DIR_NAME: &str = "LibraryClient";

/// Database file name
const DB_FILE_NAME: &str = "client.db";

/// Database manager - handles connection pooling and migrations
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    path: Option<PathBuf>, // None for in-memory databases
}

impl Database {
    /// Open (or create) the database file and run migrations
    ///
    /// # Errors
    /// Returns error if:
    /// - Parent directory doesn't exist and can't be created
    /// - Database file can't be opened
    /// - Migrations fail
    pub async fn new<P: AsRef<Path>>(database_path: P) -> Result<Self> {
        let path = database_path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let connect_opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30))
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(connect_opts)
            .await?;

        let db = Self {
            pool,
            path: Some(path.to_path_buf()),
        };
        db.migrate().await?;

        Ok(db)
    }

    /// Create in-memory database for testing
    ///
    /// The pool is pinned to a single connection that never expires, since
    /// every SQLite in-memory connection is its own database.
    pub async fn new_in_memory() -> Result<Self> {
        let connect_opts = SqliteConnectOptions::from_str("sqlite::memory:")?
            .synchronous(SqliteSynchronous::Normal)
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_opts)
            .await?;

        let db = Self { pool, path: None };
        db.migrate().await?;

        Ok(db)
    }

    /// Apply all pending migrations
    pub async fn migrate(&self) -> Result<()> {
        crate::storage::migrations::run_migrations(&self.pool)
            .await
            .map_err(|e| LibraryError::MigrationFailed(e.to_string()))
    }

    /// Get reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get database file path
    ///
    /// Returns `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Close database and release all connections
    pub async fn close(self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }

    /// Get default database path for the platform
    pub fn get_default_path() -> PathBuf {
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join(APP_DIR_NAME)
                .join(DB_FILE_NAME)
        }

        #[cfg(target_os = "linux")]
        {
            let base = std::env::var("XDG_DATA_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                    PathBuf::from(home).join(".local").join("share")
                });
            base.join(APP_DIR_NAME).join(DB_FILE_NAME)
        }

        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join(APP_DIR_NAME).join(DB_FILE_NAME)
        }

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            PathBuf::from(".").join(DB_FILE_NAME)
        }
    }

    /// Check database integrity
    pub async fn check_integrity(&self) -> Result<bool> {
        let result: String = sqlx::query_scalar("PRAGMA integrity_check")
            .fetch_one(&self.pool)
            .await?;

        Ok(result == "ok")
    }
}
