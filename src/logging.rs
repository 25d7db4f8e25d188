//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Request},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{Error, export::XLSX_CONTENT_TYPE};

/// The number of characters of a body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const REDACTED: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
/// Passwords in submitted forms and session cookies in headers are redacted,
/// and spreadsheet downloads are logged by their size only.
///
/// Request bodies are buffered with axum's default body limit of 2 MB, larger
/// requests are rejected with 413 Payload Too Large.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    // A bare request carries no `DefaultBodyLimit`, so the default applies.
    let body_bytes = match Bytes::from_request(Request::new(body), &()).await {
        Ok(bytes) => bytes,
        Err(rejection) => {
            tracing::warn!(
                "Could not read body of {} {}: {}",
                parts.method,
                parts.uri,
                rejection.body_text()
            );
            let error = match rejection.status() {
                StatusCode::PAYLOAD_TOO_LARGE => Error::PayloadTooLarge,
                _ => Error::InvalidRequest(rejection.body_text()),
            };
            return error.into_response();
        }
    };

    let summary = format!(
        "Received request: {} {} {:?}\nheaders: {:#?}",
        parts.method,
        parts.uri,
        parts.version,
        redact_headers(&parts.headers)
    );
    let body_text = String::from_utf8_lossy(&body_bytes);
    if has_content_type(&parts.headers, FORM_CONTENT_TYPE) {
        log_body(&summary, &redact_field(&body_text, "password"));
    } else {
        log_body(&summary, &body_text);
    }

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            Bytes::new()
        }
    };

    let summary = format!(
        "Sending response: {}\nheaders: {:#?}",
        parts.status,
        redact_headers(&parts.headers)
    );
    if has_content_type(&parts.headers, XLSX_CONTENT_TYPE) {
        tracing::info!("{summary}\nbody: <{} byte spreadsheet>", body_bytes.len());
    } else {
        log_body(&summary, &String::from_utf8_lossy(&body_bytes));
    }

    Response::from_parts(parts, Body::from(body_bytes))
}

fn has_content_type(headers: &HeaderMap, content_type: &str) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(content_type))
}

/// A copy of `headers` with the session cookie values replaced by asterisks.
fn redact_headers(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();

    for name in [COOKIE, SET_COOKIE] {
        let count = headers.get_all(&name).iter().count();
        headers.remove(&name);
        for _ in 0..count {
            headers.append(name.clone(), HeaderValue::from_static(REDACTED));
        }
    }

    headers
}

/// Replace the value of `field_name` in url-encoded `form_text` with asterisks.
fn redact_field(form_text: &str, field_name: &str) -> String {
    form_text
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if key == field_name => format!("{key}={REDACTED}"),
            _ => pair.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// The first [LOG_BODY_LENGTH_LIMIT] characters of `body`, or `None` if it is short enough to log in full.
fn truncate(body: &str) -> Option<&str> {
    body.char_indices()
        .nth(LOG_BODY_LENGTH_LIMIT)
        .map(|(end, _)| &body[..end])
}

fn log_body(summary: &str, body: &str) {
    match truncate(body) {
        Some(truncated) => {
            tracing::info!("{summary}\nbody: {truncated}...");
            tracing::debug!("Full body: {body:?}");
        }
        None => tracing::info!("{summary}\nbody: {body:?}"),
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Bytes,
        http::{HeaderMap, HeaderValue, StatusCode, header},
        middleware,
        routing::{get, post},
    };
    use axum_test::TestServer;

    use crate::export::XLSX_CONTENT_TYPE;

    use super::{LOG_BODY_LENGTH_LIMIT, logging_middleware, redact_field, redact_headers, truncate};

    #[test]
    fn redacts_password_field() {
        assert_eq!(
            redact_field("username=asha&password=pass123", "password"),
            "username=asha&password=********"
        );
        assert_eq!(
            redact_field("password=pass123&redirect_url=%2F", "password"),
            "password=********&redirect_url=%2F"
        );
    }

    #[test]
    fn leaves_other_fields_alone() {
        assert_eq!(
            redact_field("username=password&new_password=x", "password"),
            "username=password&new_password=x"
        );
    }

    #[test]
    fn redacts_session_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("user_id=c2VjcmV0"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("user_id=c2VjcmV0"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("theme=dark"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));

        let redacted = redact_headers(&headers);

        assert_eq!(redacted[header::COOKIE], "********");
        let set_cookies: Vec<_> = redacted.get_all(header::SET_COOKIE).iter().collect();
        assert_eq!(set_cookies, vec!["********", "********"]);
        assert_eq!(redacted[header::CONTENT_TYPE], "text/html");
        assert!(
            !format!("{redacted:?}").contains("c2VjcmV0"),
            "cookie values should not be logged"
        );
    }

    #[test]
    fn truncates_on_character_boundary() {
        let body = "₹".repeat(LOG_BODY_LENGTH_LIMIT + 1);

        let truncated = truncate(&body).unwrap();

        assert_eq!(truncated.chars().count(), LOG_BODY_LENGTH_LIMIT);
        assert_eq!(truncate("short"), None);
    }

    #[tokio::test]
    async fn passes_bodies_through_unchanged() {
        let binary: &'static [u8] = &[0x50, 0x4b, 0x03, 0x04, 0xff, 0xfe, 0x00];
        let app = Router::new()
            .route(
                "/echo",
                post(|body: String| async move { body }),
            )
            .route(
                "/download",
                get(move || async move { ([(header::CONTENT_TYPE, XLSX_CONTENT_TYPE)], binary) }),
            )
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).unwrap();

        let response = server.post("/echo").text("namaste ₹").await;
        response.assert_status(StatusCode::OK);
        assert_eq!(response.text(), "namaste ₹");

        let response = server.get("/download").await;
        assert_eq!(response.as_bytes().as_ref(), binary);
    }

    #[tokio::test]
    async fn rejects_bodies_over_two_megabytes() {
        let app = Router::new()
            .route("/echo", post(|body: Bytes| async move { body.len().to_string() }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).unwrap();

        let response = server
            .post("/echo")
            .bytes(Bytes::from(vec![b'a'; 2 * 1024 * 1024 + 1]))
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["error"], "the request body is too large");

        let response = server
            .post("/echo")
            .bytes(Bytes::from(vec![b'a'; 1024]))
            .await;
        response.assert_status_ok();
        assert_eq!(response.text(), "1024");
    }
}
