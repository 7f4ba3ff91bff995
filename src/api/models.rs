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


//! Wire models for the library REST backend
//!
//! All payloads use camelCase field names. Identifiers are kept as strings;
//! backends that emit numeric ids are accepted and converted on the way in.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier as sent by the backend: text or number
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(id: RawId) -> Self {
        match id {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// Accept `"12"` or `12` for identifier fields
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

/// Same as [`deserialize_id`]; a missing or null id becomes empty
fn deserialize_opt_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?
        .map(String::from)
        .unwrap_or_default())
}

// ============================================================================
// BOOKS
// ============================================================================

/// A catalog entry
///
/// `available_copies`, when present, is the number of copies not currently lent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub available_copies: Option<i32>,
    #[serde(default)]
    pub borrowed_copies: Option<i32>,
}

impl Book {
    /// Copies on the shelf, treating an unknown count as zero
    pub fn copies_on_shelf(&self) -> i32 {
        self.available_copies.unwrap_or(0)
    }

    pub fn is_available(&self) -> bool {
        self.copies_on_shelf() > 0
    }
}

/// Body of `POST /books`: a book without its id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub year: Option<i32>,
    pub available_copies: Option<i32>,
    pub borrowed_copies: Option<i32>,
}

impl NewBook {
    /// Attach a server-assigned id
    pub fn with_id<S: Into<String>>(self, id: S) -> Book {
        Book {
            id: id.into(),
            title: self.title,
            author: self.author,
            description: self.description,
            year: self.year,
            available_copies: self.available_copies,
            borrowed_copies: self.borrowed_copies,
        }
    }
}

// ============================================================================
// RENTALS
// ============================================================================

/// Rental lifecycle state
///
/// The client only ever moves a rental to `Returned`; `Overdue` is assigned
/// by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RentalStatus {
    Borrowed,
    Overdue,
    Returned,
}

impl RentalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Borrowed => "Borrowed",
            Self::Overdue => "Overdue",
            Self::Returned => "Returned",
        }
    }

    /// Whether the copy is still out of the library
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Returned)
    }
}

impl std::fmt::Display for RentalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rental record, optionally joined with its book
///
/// `book` is never sent by the backend; the rental store fills it in after a
/// secondary `GET /books/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rental {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub user_id: String,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub book_id: String,
    #[serde(default)]
    pub book: Option<Book>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_card_id: Option<String>,
    #[serde(default)]
    pub rental_date: String,
    #[serde(default)]
    pub return_date: Option<String>,
    pub status: RentalStatus,
}

/// The joined rental view held by the rental store
pub type RentalWithBook = Rental;

impl Rental {
    pub fn has_book_reference(&self) -> bool {
        !self.book_id.is_empty()
    }

    /// Parsed rental date, if the backend sent RFC 3339
    pub fn rented_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.rental_date)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Calendar month (1-12) of the rental date
    pub fn rental_month(&self) -> Option<u32> {
        self.rented_at().map(|dt| dt.month())
    }

    /// Mark returned at `returned_at`
    pub fn mark_returned(&mut self, returned_at: &str) {
        self.status = RentalStatus::Returned;
        self.return_date = Some(returned_at.to_string());
    }

    /// Title to show for this rental
    pub fn display_title(&self) -> &str {
        self.book
            .as_ref()
            .map(|b| b.title.as_str())
            .unwrap_or("Nieznany tytuł")
    }
}

/// Body of `POST /rentals`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest<'a> {
    pub book_id: &'a str,
}

/// Body of `PATCH /rentals/:id`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest<'a> {
    pub status: RentalStatus,
    pub return_date: &'a str,
}

// ============================================================================
// USERS & SESSION
// ============================================================================

/// Account role
///
/// The backend is free to invent roles; anything unknown is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Client,
    Admin,
    Other(String),
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "CLIENT" => Role::Client,
            "ADMIN" => Role::Admin,
            _ => Role::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Client => "CLIENT".to_string(),
            Role::Admin => "ADMIN".to_string(),
            Role::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub library_card_id: String,
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Body of `POST /login`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub library_card_id: &'a str,
    pub password: &'a str,
}

/// Response of `POST /login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// Body of `POST /register`
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

// ============================================================================
// AUDIT LOG
// ============================================================================

/// One audit-trail entry, written by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub action: String,
}

/// JSON error body returned by the backend
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
