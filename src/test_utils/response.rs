use axum::{body::Body, http::header::CONTENT_TYPE, response::Response};
use scraper::Html;

/// Read the body of an HTML `response` and parse it as a full document.
pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    let content_type = get_header(&response, CONTENT_TYPE.as_str());
    assert!(
        content_type.starts_with("text/html"),
        "want an HTML response, got content type {content_type:?}"
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not get response body");

    Html::parse_document(&String::from_utf8_lossy(&body))
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}

#[track_caller]
pub(crate) fn get_header(response: &Response<Body>, header_name: &str) -> String {
    response
        .headers()
        .get(header_name)
        .unwrap_or_else(|| panic!("Headers missing {header_name}"))
        .to_str()
        .expect("Could not convert to str")
        .to_owned()
}
