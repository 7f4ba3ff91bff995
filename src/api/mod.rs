// Library Client Core - Library management client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! REST backend client
//!
//! [`client::ApiClient`] owns the HTTP plumbing; each sibling module adds the
//! typed endpoint methods for one resource family.
//!
//! | Module | Endpoints |
//! |---|---|
//! | `books` | `/books`, `/books/:id` |
//! | `rentals` | `/rentals`, `/rentals/:id` (bearer) |
//! | `auth` | `/login`, `/register` |
//! | `admin` | `/logs`, `/users` (bearer), `/users/:id` |

pub mod admin;
pub mod auth;
pub mod books;
pub mod client;
pub mod models;
pub mod rentals;

pub use client::{ApiClient, ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL};
