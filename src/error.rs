//! Error types for the library client
//!
//! This module defines error types using thiserror for ergonomic error handling.
//! Errors are grouped by where they originate (transport, HTTP status, local
//! preconditions, storage) so that stores can turn any failure into the single
//! user-facing message they keep in their error slot.
//!
//! ## User-facing messages
//!
//! | Failure | Message |
//! |---|---|
//! | no response reached the client | [`MSG_NETWORK`] |
//! | HTTP status with `{"message": ...}` body | the body message |
//! | HTTP 400/401/403/404/500/503 without body message | status default |
//! | any other status | `Błąd serwera: {status}` |
//! | local failure (missing token, bad input, storage) | caller-chosen fallback |

use thiserror::Error;

/// Result type alias using our LibraryError type
pub type Result<T> = std::result::Result<T, LibraryError>;

pub const MSG_NETWORK: &str =
    "Nie można połączyć się z serwerem. Sprawdź połączenie z internetem.";
pub const MSG_BAD_REQUEST: &str = "Nieprawidłowe dane wejściowe.";
pub const MSG_UNAUTHORIZED: &str = "Brak autoryzacji. Zaloguj się ponownie.";
pub const MSG_FORBIDDEN: &str = "Brak uprawnień do wykonania tej operacji.";
pub const MSG_NOT_FOUND: &str = "Nie znaleziono zasobu.";
pub const MSG_SERVER_ERROR: &str = "Wystąpił błąd serwera.";
pub const MSG_UNAVAILABLE: &str = "Serwer jest chwilowo niedostępny. Spróbuj ponownie później.";
pub const MSG_UNEXPECTED: &str = "Wystąpił nieoczekiwany błąd.";

/// Main error type for the library client
///
/// Each variant includes a descriptive `Display` message for logs; use
/// [`LibraryError::user_message`] for the text shown to a person.
#[derive(Error, Debug)]
pub enum LibraryError {
    // ===== Transport / API Errors =====

    /// The request never produced an HTTP response (DNS, connect, timeout)
    #[error("Network error: {message}")]
    NetworkError {
        message: String,
        /// Whether the request timed out rather than failing to connect
        is_timeout: bool,
    },

    /// Backend answered with a non-2xx status
    #[error("HTTP error! status: {status_code}")]
    ApiRequestFailed {
        status_code: u16,
        /// `message` field of the JSON error body, if any
        message: Option<String>,
        /// API endpoint that failed
        endpoint: String,
    },

    /// Backend answered 2xx but the body did not match the expected shape
    #[error("Invalid API response: {message}")]
    InvalidApiResponse {
        message: String,
        /// Response body snippet for debugging
        response_body: Option<String>,
    },

    // ===== Local Preconditions =====

    /// An authenticated endpoint was called without a session token
    #[error("No authorization token available")]
    MissingToken,

    /// The store is in a state that does not allow the operation; the text is
    /// shown to the user as-is
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Form input failed client-side validation
    #[error("Validation failed with {} errors", errors.len())]
    ValidationFailed {
        /// Individual validation messages, ready for display
        errors: Vec<String>,
    },

    /// Configuration is invalid or incomplete
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    // ===== Storage Errors =====

    /// Database schema migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// A persisted record could not be decoded
    #[error("Corrupt stored record '{key}': {reason}")]
    CorruptRecord { key: String, reason: String },

    // ===== External Library Errors =====

    /// HTTP client error from reqwest
    #[error("HTTP client error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Database driver error from sqlx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Base URL or endpoint could not be parsed
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl LibraryError {
    /// Create a NetworkError from a transport failure
    pub fn network_error<S: Into<String>>(message: S, is_timeout: bool) -> Self {
        LibraryError::NetworkError {
            message: message.into(),
            is_timeout,
        }
    }

    /// Create an ApiRequestFailed error
    pub fn api_failed<S: Into<String>>(
        status_code: u16,
        message: Option<String>,
        endpoint: S,
    ) -> Self {
        LibraryError::ApiRequestFailed {
            status_code,
            message,
            endpoint: endpoint.into(),
        }
    }

    /// HTTP status code, if the backend produced one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            LibraryError::ApiRequestFailed { status_code, .. } => Some(*status_code),
            LibraryError::ReqwestError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// `message` field of the backend error body, if present and non-empty
    pub fn server_message(&self) -> Option<&str> {
        match self {
            LibraryError::ApiRequestFailed {
                message: Some(message),
                ..
            } if !message.is_empty() => Some(message.as_str()),
            _ => None,
        }
    }

    /// Check if no HTTP response reached the client
    pub fn is_transport_error(&self) -> bool {
        match self {
            LibraryError::NetworkError { .. } => true,
            LibraryError::ReqwestError(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }

    /// Check if the error came from the backend or the wire (as opposed to a
    /// local precondition)
    pub fn is_http_error(&self) -> bool {
        self.is_transport_error() || self.status_code().is_some()
    }

    /// Check if error is due to authentication/authorization
    pub fn is_auth_error(&self) -> bool {
        matches!(self, LibraryError::MissingToken)
            || matches!(self.status_code(), Some(401) | Some(403))
    }

    /// User-facing message for this error
    ///
    /// Local failures map to [`MSG_UNEXPECTED`]; use
    /// [`user_message_or`](Self::user_message_or) to choose a different one.
    pub fn user_message(&self) -> String {
        self.user_message_or(MSG_UNEXPECTED)
    }

    /// User-facing message, with `fallback` for errors that did not come from
    /// the backend or the network
    pub fn user_message_or(&self, fallback: &str) -> String {
        match self {
            LibraryError::ValidationFailed { errors } => return errors.join("\n"),
            LibraryError::InvalidState(message) => return message.clone(),
            _ => {}
        }

        if self.is_transport_error() {
            return MSG_NETWORK.to_string();
        }

        let Some(status) = self.status_code() else {
            return fallback.to_string();
        };

        if let Some(message) = self.server_message() {
            return message.to_string();
        }

        match status {
            400 => MSG_BAD_REQUEST.to_string(),
            401 => MSG_UNAUTHORIZED.to_string(),
            403 => MSG_FORBIDDEN.to_string(),
            404 => MSG_NOT_FOUND.to_string(),
            500 => MSG_SERVER_ERROR.to_string(),
            503 => MSG_UNAVAILABLE.to_string(),
            other => format!("Błąd serwera: {}", other),
        }
    }
}
