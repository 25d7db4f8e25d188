//! Defines the page to display when a page route fails unexpectedly.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::{Error, html::error_view};

pub struct InternalServerError<'a> {
    pub description: &'a str,
    pub fix: &'a str,
}

impl Default for InternalServerError<'_> {
    fn default() -> Self {
        Self {
            description: "Sorry, something went wrong.",
            fix: "Try again later or check the server logs.",
        }
    }
}

impl InternalServerError<'_> {
    pub fn into_html(self) -> Html<String> {
        Html(error_view("Internal Server Error", "500", self.description, self.fix).into_string())
    }
}

impl IntoResponse for InternalServerError<'_> {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.into_html()).into_response()
    }
}

/// Log `error` and render the 500 page for it.
///
/// `action` describes what the page was doing, e.g. "export transactions".
pub fn render_page_error(action: &str, error: Error) -> Response {
    tracing::error!("Could not {action}: {error}");

    InternalServerError {
        description: &format!("Could not {action}."),
        ..Default::default()
    }
    .into_response()
}
