// Library Client Core - Library management client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Rental endpoints
//!
//! All rental endpoints require a bearer token.
//!
//! - `GET /rentals` - every rental visible to the caller
//! - `POST /rentals` with `{bookId}` - borrow a copy
//! - `PATCH /rentals/:id` with `{status, returnDate}` - return a copy

use crate::api::client::{item_path, ApiClient};
use crate::api::models::{BorrowRequest, Rental, RentalStatus, ReturnRequest};
use crate::error::Result;
use reqwest::Method;

impl ApiClient {
    pub async fn list_rentals(&self, token: &str) -> Result<Vec<Rental>> {
        self.get("/rentals", Some(token)).await
    }

    /// Create a rental for `book_id` on behalf of the token's owner
    pub async fn create_rental(&self, token: &str, book_id: &str) -> Result<Rental> {
        let body = BorrowRequest { book_id };
        self.send_json(Method::POST, "/rentals", &body, Some(token))
            .await
    }

    /// Close a rental as returned at `returned_at` (RFC 3339)
    pub async fn return_rental(
        &self,
        token: &str,
        rental_id: &str,
        returned_at: &str,
    ) -> Result<()> {
        let body = ReturnRequest {
            status: RentalStatus::Returned,
            return_date: returned_at,
        };
        self.send_unit(
            Method::PATCH,
            &item_path("rentals", rental_id),
            Some(&body),
            Some(token),
        )
        .await
    }
}
