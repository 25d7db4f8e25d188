//! Defines the app level error type and its conversion to JSON error responses.
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A required field was missing or empty.
    ///
    /// Callers should pass in the name of the field as it appears in the
    /// request.
    #[error("the field \"{0}\" is required")]
    MissingField(&'static str),

    /// The request body could not be parsed, e.g. malformed JSON or a field
    /// with the wrong type.
    #[error("invalid request body: {0}")]
    InvalidRequest(String),

    /// The request body is larger than the server will read.
    #[error("the request body is too large")]
    PayloadTooLarge,

    /// The username or password did not match a registered user.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The request did not carry a valid session.
    #[error("you must be logged in to do that")]
    Unauthenticated,

    /// The resource exists but belongs to another user.
    #[error("you do not have permission to access this resource")]
    Forbidden,

    /// The username is already taken by another user.
    #[error("the username \"{0}\" is already taken")]
    DuplicateUsername(String),

    /// A customer with the same phone number already exists.
    ///
    /// Whether this is checked per user or across all users depends on the
    /// configured [crate::PhoneUniqueness].
    #[error("A customer with this phone number already exists")]
    DuplicatePhone,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The spreadsheet for the export could not be written.
    #[error("could not write spreadsheet: {0}")]
    SpreadsheetError(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingField(_)
            | Error::InvalidRequest(_)
            | Error::DuplicateUsername(_)
            | Error::DuplicatePhone => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Error::InvalidCredentials | Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::HashingError(_)
            | Error::SpreadsheetError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(value: JsonRejection) -> Self {
        Error::InvalidRequest(value.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(value: PathRejection) -> Self {
        Error::InvalidRequest(value.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let message = if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal details are for the server logs only.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status_code, Json(json!({ "error": message }))).into_response()
    }
}
