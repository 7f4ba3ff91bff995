// Library Client Core - Library management client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Top-level configuration
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `LIBRARY_API_URL` | backend root | `http://localhost:3000` |
//! | `LIBRARY_DB_PATH` | durable state database | platform data dir |
//! | `LIBRARY_HTTP_TIMEOUT_SECS` | request timeout | 30 |
//! | `LIBRARY_NUMERIC_INPUT` | `strict` or `lenient` | `strict` |

use crate::api::client::ClientConfig;
use crate::error::{LibraryError, Result};
use crate::forms::NumericInputPolicy;
use crate::storage::Database;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_API_URL: &str = "LIBRARY_API_URL";
pub const ENV_DB_PATH: &str = "LIBRARY_DB_PATH";
pub const ENV_HTTP_TIMEOUT: &str = "LIBRARY_HTTP_TIMEOUT_SECS";
pub const ENV_NUMERIC_INPUT: &str = "LIBRARY_NUMERIC_INPUT";

/// Where durable client state lives
#[derive(Debug, Clone, PartialEq)]
pub enum StorageLocation {
    File(PathBuf),
    /// Nothing survives the process; used by tests
    InMemory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LibraryConfig {
    pub api: ClientConfig,
    pub storage: StorageLocation,
    pub numeric_input: NumericInputPolicy,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            api: ClientConfig::default(),
            storage: StorageLocation::File(Database::get_default_path()),
            numeric_input: NumericInputPolicy::default(),
        }
    }
}

impl LibraryConfig {
    /// Defaults overridden by `LIBRARY_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            config.api.base_url = url.trim().to_string();
        }

        if let Some(path) = lookup(ENV_DB_PATH).filter(|v| !v.trim().is_empty()) {
            config.storage = StorageLocation::File(PathBuf::from(path.trim()));
        }

        if let Some(raw) = lookup(ENV_HTTP_TIMEOUT) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                LibraryError::InvalidConfiguration(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    ENV_HTTP_TIMEOUT, raw
                ))
            })?;
            config.api.timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup(ENV_NUMERIC_INPUT) {
            config.numeric_input = raw.parse()?;
        }

        Ok(config)
    }

    /// In-memory storage against `base_url`
    pub fn for_testing<S: Into<String>>(base_url: S) -> Self {
        Self {
            api: ClientConfig::builder().base_url(base_url).build(),
            storage: StorageLocation::InMemory,
            numeric_input: NumericInputPolicy::Strict,
        }
    }

    /// Open the configured database
    pub async fn open_database(&self) -> Result<Database> {
        match &self.storage {
            StorageLocation::File(path) => Database::new(path).await,
            StorageLocation::InMemory => Database::new_in_memory().await,
        }
    }
}
