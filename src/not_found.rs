//! The page shown for routes that do not exist.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

pub async fn get_404_not_found() -> Response {
    let page = error_view(
        "Not Found",
        "404",
        "The page you are looking for does not exist.",
        "Check the address or head back to your customers.",
    );

    (StatusCode::NOT_FOUND, Html(page.into_string())).into_response()
}
