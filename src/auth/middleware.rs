//! Authentication middleware that resolves the session cookie to a user and rejects anonymous requests.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    auth::{
        User, build_log_in_redirect_url, cookie::get_user_id_from_auth_cookie, get_user_by_id,
    },
    endpoints,
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The database connection for looking up the logged in user.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

fn resolve_user(state: &AuthState, jar: &PrivateCookieJar) -> Result<User, Error> {
    let user_id = get_user_id_from_auth_cookie(jar)?;
    let connection = lock_connection(&state.db_connection)?;

    match get_user_by_id(user_id, &connection) {
        Ok(user) => Ok(user),
        Err(Error::NotFound) => {
            tracing::warn!("Session cookie refers to unknown user {user_id}.");
            Err(Error::Unauthenticated)
        }
        Err(error) => Err(error),
    }
}

/// Checks for a valid session cookie and places the user into the request.
///
/// `reject` builds the response sent when the request is not authenticated.
#[inline]
async fn auth_guard_internal(
    state: AuthState,
    request: Request,
    next: Next,
    reject: impl Fn(&Request, Error) -> Response,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}.");
            let request = Request::from_parts(parts, body);
            return reject(&request, Error::Unauthenticated);
        }
    };

    let user = match resolve_user(&state, &jar) {
        Ok(user) => user,
        Err(error) => {
            let request = Request::from_parts(parts, body);
            return reject(&request, error);
        }
    };

    parts.extensions.insert(user.id);
    parts.extensions.insert(user);
    let request = Request::from_parts(parts, body);

    next.run(request).await
}

/// Middleware function for pages that checks for a valid session cookie.
/// The user ID is placed into request and then the request executed normally if the cookie is valid, otherwise a redirect to the log-in page is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
///
/// **Note**: The app state must contain an `axum_extra::extract::cookie::Key` for decrypting and verifying the cookie contents.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    auth_guard_internal(state, request, next, |request, error| match error {
        Error::Unauthenticated => {
            let redirect_url = build_log_in_redirect_url(request)
                .unwrap_or_else(|| endpoints::LOG_IN.to_owned());
            Redirect::to(&redirect_url).into_response()
        }
        error => error.into_response(),
    })
    .await
}

/// Middleware function for JSON routes that checks for a valid session cookie.
/// The user ID is placed into request and then the request executed normally if the cookie is valid, otherwise a 401 JSON error is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard_api(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, |_, error| error.into_response()).await
}
