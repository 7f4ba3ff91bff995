// Library Client Core - Library management client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Catalog endpoints
//!
//! `GET /books`, `GET /books/:id`, `POST /books`, `PUT /books/:id`,
//! `DELETE /books/:id`. None of them require a token.

use crate::api::client::{item_path, ApiClient};
use crate::api::models::{Book, NewBook};
use crate::error::Result;
use reqwest::Method;

impl ApiClient {
    /// Full catalog
    pub async fn list_books(&self) -> Result<Vec<Book>> {
        self.get("/books", None).await
    }

    /// One book, used to join rentals with their books
    pub async fn get_book(&self, book_id: &str) -> Result<Book> {
        self.get(&item_path("books", book_id), None).await
    }

    /// Create a book and return the record as stored by the backend
    pub async fn create_book(&self, book: &NewBook) -> Result<Book> {
        self.send_json(Method::POST, "/books", book, None).await
    }

    /// Replace a book; the response body is ignored
    pub async fn update_book(&self, book: &Book) -> Result<()> {
        self.send_unit(Method::PUT, &item_path("books", &book.id), Some(book), None)
            .await
    }

    pub async fn delete_book(&self, book_id: &str) -> Result<()> {
        self.send_unit(Method::DELETE, &item_path("books", book_id), None::<&()>, None)
            .await
    }
}
