//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The cookie and middleware modules handle the lower level session logic.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    app_state::lock_connection,
    auth::{get_user_by_username, normalize_redirect_url, set_auth_cookie},
    endpoints,
    html::{Flash, base, flash_message, log_in_register, password_input, username_input},
};

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect username or password.";
pub const MISSING_FIELD_ERROR_MSG: &str = "Enter both a username and a password.";
pub const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";
pub const REGISTERED_MSG: &str = "Registration successful. Log in to continue.";

fn log_in_form(username: &str, flash: Option<Flash<'_>>, redirect_url: Option<&str>) -> Markup {
    html! {
        form method="post" action=(endpoints::LOG_IN)
        {
            (flash_message(flash))

            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (username_input(username))
            (password_input())

            button type="submit" id="submit-button" { "Log in" }

            p
            {
                "Don't have an account? "
                a href=(endpoints::REGISTER) { "Register here" }
            }
        }
    }
}

fn log_in_page(username: &str, flash: Option<Flash<'_>>, redirect_url: Option<&str>) -> Response {
    let form = log_in_form(username, flash, redirect_url);
    let content = log_in_register("Log in to your account", &form);

    base("Log In", &content).into_response()
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    match raw_url.and_then(normalize_redirect_url) {
        Some(redirect_url) => Some(redirect_url),
        None => {
            if let Some(redirect_url) = raw_url {
                tracing::warn!("Invalid redirect URL from {source}: {redirect_url}");
            }
            None
        }
    }
}

/// The query parameters accepted by the log-in page.
#[derive(Deserialize)]
pub struct LogInQuery {
    /// Where to send the user after logging in.
    pub redirect_url: Option<String>,
    /// Set after a successful registration to show a confirmation message.
    pub registered: Option<bool>,
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<LogInQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let flash = query
        .registered
        .unwrap_or(false)
        .then_some(Flash::Success(REGISTERED_MSG));

    log_in_page("", flash, redirect_url.as_deref())
}

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the log-in form.
///
/// The password is stored as a plain string. There is no need for validation here since
/// it will be compared against the password hash in the database.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Username entered during log-in.
    #[serde(default)]
    pub username: String,

    /// Password entered during log-in.
    #[serde(default)]
    pub password: String,

    /// Optional URL to redirect to after logging in.
    /// Only accepted from the log-in form submission.
    pub redirect_url: Option<String>,
}

fn verify_credentials(user_data: &LogInData, state: &LoginState) -> Result<crate::User, Error> {
    let username = user_data.username.trim();
    if username.is_empty() || user_data.password.is_empty() {
        return Err(Error::MissingField(if username.is_empty() {
            "username"
        } else {
            "password"
        }));
    }

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        match get_user_by_username(username, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::InvalidCredentials),
            Err(error) => return Err(error),
        }
    };

    match user.password_hash.verify(&user_data.password) {
        Ok(true) => Ok(user),
        Ok(false) => Err(Error::InvalidCredentials),
        Err(error) => Err(Error::HashingError(error.to_string())),
    }
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the auth cookie set and the client is redirected to the
/// requested page or the index page.
/// Otherwise, the form is returned with an error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();

    let user = match verify_credentials(&user_data, &state) {
        Ok(user) => user,
        Err(Error::MissingField(_)) => {
            return log_in_page(
                &user_data.username,
                Some(Flash::Error(MISSING_FIELD_ERROR_MSG)),
                redirect_url,
            );
        }
        Err(Error::InvalidCredentials) => {
            tracing::info!("Failed log-in attempt for \"{}\".", user_data.username);
            return log_in_page(
                &user_data.username,
                Some(Flash::Error(INVALID_CREDENTIALS_ERROR_MSG)),
                redirect_url,
            );
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_page(
                &user_data.username,
                Some(Flash::Error(INTERNAL_ERROR_MSG)),
                redirect_url,
            );
        }
    };

    tracing::info!("User {} logged in.", user.id);
    let redirect_url = redirect_url.unwrap_or(endpoints::ROOT);

    (set_auth_cookie(jar, user.id), Redirect::to(redirect_url)).into_response()
}


#[cfg(test)]
mod log_in_tests {
    use axum::{
        Form, Router,
        body::Body,
        extract::{FromRef, State},
        http::{Response, StatusCode, header::SET_COOKIE},
        routing::post,
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
    use axum_test::TestServer;

    use crate::{
        app_state::get_test_app_state,
        auth::{COOKIE_USER_ID, PasswordHash, create_user},
        endpoints,
        test_utils::{assert_form_error_message, get_header, must_get_form, parse_html_document},
    };

    use super::{
        INVALID_CREDENTIALS_ERROR_MSG, LogInData, LoginState, MISSING_FIELD_ERROR_MSG,
        post_log_in,
    };

    fn get_test_state() -> LoginState {
        let app_state = get_test_app_state();
        create_user(
            "asha",
            PasswordHash::new("pass123", 4).unwrap(),
            &app_state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test user");

        LoginState::from_ref(&app_state)
    }

    fn form(username: &str, password: &str, redirect_url: Option<&str>) -> LogInData {
        LogInData {
            username: username.to_owned(),
            password: password.to_owned(),
            redirect_url: redirect_url.map(str::to_owned),
        }
    }

    async fn new_log_in_request(state: LoginState, log_in_form: LogInData) -> Response<Body> {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        post_log_in(State(state), jar, Form(log_in_form)).await
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let response = new_log_in_request(get_test_state(), form("asha", "pass123", None)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(get_header(&response, "location"), endpoints::ROOT);
        assert_set_cookie(&response);
    }

    #[tokio::test]
    async fn log_in_redirects_to_requested_url() {
        let response = new_log_in_request(
            get_test_state(),
            form("asha", "pass123", Some(endpoints::EXPORT_EXCEL)),
        )
        .await;

        assert_eq!(
            get_header(&response, "location"),
            endpoints::EXPORT_EXCEL
        );
    }

    #[tokio::test]
    async fn log_in_falls_back_on_invalid_redirect_url() {
        let response = new_log_in_request(
            get_test_state(),
            form("asha", "pass123", Some("https://example.com")),
        )
        .await;

        assert_eq!(get_header(&response, "location"), endpoints::ROOT);
    }

    #[tokio::test]
    async fn log_in_fails_with_incorrect_password() {
        let response = new_log_in_request(get_test_state(), form("asha", "wrong", None)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SET_COOKIE).is_none());
        assert_body_contains_message(response, INVALID_CREDENTIALS_ERROR_MSG).await;
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_username() {
        let response = new_log_in_request(get_test_state(), form("ravi", "pass123", None)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_body_contains_message(response, INVALID_CREDENTIALS_ERROR_MSG).await;
    }

    #[tokio::test]
    async fn log_in_fails_with_empty_fields() {
        let response = new_log_in_request(get_test_state(), form("asha", "", None)).await;

        assert_body_contains_message(response, MISSING_FIELD_ERROR_MSG).await;
    }

    #[tokio::test]
    async fn form_deserialises_without_redirect_url() {
        let app = Router::new()
            .route(endpoints::LOG_IN, post(post_log_in))
            .with_state(get_test_state());
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .post(endpoints::LOG_IN)
            .form(&[("username", "asha"), ("password", "pass123")])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
    }

    #[track_caller]
    fn assert_set_cookie(response: &Response<Body>) {
        let cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|header| Cookie::parse(header.to_str().unwrap().to_owned()).unwrap())
            .find(|cookie| cookie.name() == COOKIE_USER_ID);

        assert!(
            cookie.is_some(),
            "could not find cookie '{COOKIE_USER_ID}' in response"
        );
    }

    async fn assert_body_contains_message(response: Response<Body>, message: &str) {
        let document = parse_html_document(response).await;
        assert_form_error_message(&must_get_form(&document), message);
    }
}
