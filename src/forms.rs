// Library Client Core - Library management client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Client-side form validation
//!
//! - [`RegistrationForm`]: field rules checked before `POST /register`
//! - [`BookForm`]: raw admin input for a book, with numeric fields parsed
//!   under a [`NumericInputPolicy`]

use crate::api::models::{Book, NewBook};
use crate::error::{LibraryError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Shortest accepted password
pub const MIN_PASSWORD_LEN: usize = 6;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("email pattern is valid");
}

/// How to treat non-numeric text in numeric book fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericInputPolicy {
    /// Reject the form with a validation error
    #[default]
    Strict,
    /// Coerce anything unparseable to 0
    Lenient,
}

impl std::str::FromStr for NumericInputPolicy {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(LibraryError::InvalidConfiguration(format!(
                "unknown numeric input policy '{}'",
                other
            ))),
        }
    }
}

/// Registration input as typed by the user
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegistrationForm {
    pub fn new<N, E, P>(name: N, email: E, password: P) -> Self
    where
        N: Into<String>,
        E: Into<String>,
        P: Into<String>,
    {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Check every field and collect all messages
    pub fn errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Imię jest wymagane".to_string());
        }

        if self.email.trim().is_empty() {
            errors.push("Email jest wymagany".to_string());
        } else if !EMAIL_RE.is_match(self.email.trim()) {
            errors.push("Niepoprawny format email".to_string());
        }

        if self.password.is_empty() {
            errors.push("Hasło jest wymagane".to_string());
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(format!(
                "Hasło musi mieć co najmniej {} znaków",
                MIN_PASSWORD_LEN
            ));
        }

        errors
    }

    pub fn validate(&self) -> Result<()> {
        let errors = self.errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(LibraryError::ValidationFailed { errors })
        }
    }
}

/// Book input from the admin panel, numeric fields still as text
#[derive(Debug, Clone, Default)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub description: String,
    pub year: String,
    pub available_copies: String,
    pub borrowed_copies: String,
}

impl BookForm {
    /// Prefill from an existing book for editing
    pub fn from_book(book: &Book) -> Self {
        let text = |n: Option<i32>| n.map(|n| n.to_string()).unwrap_or_default();
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            description: book.description.clone().unwrap_or_default(),
            year: text(book.year),
            available_copies: text(book.available_copies),
            borrowed_copies: text(book.borrowed_copies),
        }
    }

    pub fn into_new_book(self, policy: NumericInputPolicy) -> Result<NewBook> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push("Tytuł jest wymagany".to_string());
        }
        if self.author.trim().is_empty() {
            errors.push("Autor jest wymagany".to_string());
        }

        let year = parse_number("Rok", &self.year, policy, &mut errors);
        let available_copies =
            parse_number("Dostępne egzemplarze", &self.available_copies, policy, &mut errors);
        let borrowed_copies =
            parse_number("Wypożyczone egzemplarze", &self.borrowed_copies, policy, &mut errors);

        if !errors.is_empty() {
            return Err(LibraryError::ValidationFailed { errors });
        }

        let description = self.description.trim();
        Ok(NewBook {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            year: Some(year),
            available_copies: Some(available_copies),
            borrowed_copies: Some(borrowed_copies),
        })
    }

    pub fn into_book<S: Into<String>>(self, id: S, policy: NumericInputPolicy) -> Result<Book> {
        Ok(self.into_new_book(policy)?.with_id(id))
    }
}

/// Parse one numeric field; an empty field is 0 under either policy
fn parse_number(
    label: &str,
    raw: &str,
    policy: NumericInputPolicy,
    errors: &mut Vec<String>,
) -> i32 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0;
    }

    match (raw.parse::<i32>(), policy) {
        (Ok(n), _) if n >= 0 => n,
        (_, NumericInputPolicy::Lenient) => lenient_prefix(raw),
        (_, NumericInputPolicy::Strict) => {
            errors.push(format!("{}: wartość musi być nieujemną liczbą całkowitą", label));
            0
        }
    }
}

/// Leading-integer coercion: `"12abc"` is 12, anything without a leading
/// digit is 0
fn lenient_prefix(raw: &str) -> i32 {
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());

    digits[..end]
        .parse::<i32>()
        .map(|n| sign * n)
        .unwrap_or(0)
}
