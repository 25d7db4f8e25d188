//! Helpers for redirect URLs during authentication flows.

use axum::{extract::Request, http::Uri};
use tracing::error;

use crate::endpoints;

fn is_safe_redirect_url(redirect_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    let path = redirect_url
        .split_once('?')
        .map(|(path, _)| path)
        .unwrap_or(redirect_url);

    path != endpoints::LOG_IN
}

/// Reduce `raw_url` to a local path and query, or `None` if it would send the
/// user somewhere other than this app (or back to the log-in page).
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

/// The URL of the log-in page that sends the user back to the page they
/// requested once they have logged in.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let path_and_query = request.uri().path_and_query()?.as_str();
    let redirect_target = normalize_redirect_url(path_and_query)?;

    match serde_urlencoded::to_string([("redirect_url", &redirect_target)]) {
        Ok(param) => Some(format!("{}?{}", endpoints::LOG_IN, param)),
        Err(error) => {
            error!("Could not encode redirect URL {redirect_target}: {error}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, extract::Request};

    use crate::endpoints;

    use super::{build_log_in_redirect_url, normalize_redirect_url};

    #[test]
    fn keeps_local_path_and_query() {
        assert_eq!(
            normalize_redirect_url("/export_excel?foo=bar"),
            Some("/export_excel?foo=bar".to_owned())
        );
    }

    #[test]
    fn rejects_external_urls() {
        assert_eq!(normalize_redirect_url("https://example.com/"), None);
        assert_eq!(normalize_redirect_url("//example.com/"), None);
    }

    #[test]
    fn rejects_log_in_page() {
        assert_eq!(normalize_redirect_url(endpoints::LOG_IN), None);
    }

    #[test]
    fn builds_log_in_url_with_target() {
        let request = Request::builder()
            .uri(endpoints::EXPORT_EXCEL)
            .body(Body::empty())
            .unwrap();

        let url = build_log_in_redirect_url(&request);

        assert_eq!(url, Some("/login?redirect_url=%2Fexport_excel".to_owned()));
    }
}
