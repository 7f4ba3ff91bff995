//! Library management client core
//!
//! Client-side state for a library lending system backed by a REST API:
//! - [`api`]: HTTP client and wire models
//! - [`store`]: session, catalog, rental, log and user-directory stores
//! - [`storage`]: durable session storage (SQLite)
//! - [`forms`]: client-side validation for registration and book input
//! - [`context`]: the container that wires the stores together

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod forms;
pub mod storage;
pub mod store;

pub use config::LibraryConfig;
pub use context::LibraryContext;
pub use error::{LibraryError, Result};
