//! Defines functions for handling user authentication with cookies.

use std::num::ParseIntError;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::UserID};

pub(crate) const COOKIE_USER_ID: &str = "user_id";

/// Add the session cookie to the cookie jar, indicating that a user is logged in and authenticated.
///
/// The cookie has no expiry so it lasts until the browser session ends or the user logs out.
///
/// Returns the cookie jar with the cookie added.
pub(crate) fn set_auth_cookie(jar: PrivateCookieJar, user_id: UserID) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_USER_ID, user_id.as_i64().to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Set the auth cookie to an invalid value and set its max age to zero, which should delete the cookie on the client side.
pub(crate) fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_USER_ID, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Read the user ID from the session cookie in `jar`.
///
/// # Errors
///
/// Returns [Error::Unauthenticated] if the cookie is missing, could not be
/// decrypted, or does not hold a user ID.
pub(crate) fn get_user_id_from_auth_cookie(jar: &PrivateCookieJar) -> Result<UserID, Error> {
    match jar.get(COOKIE_USER_ID) {
        Some(user_id_cookie) => extract_user_id(&user_id_cookie).map_err(|_| Error::Unauthenticated),
        None => Err(Error::Unauthenticated),
    }
}

fn extract_user_id(cookie: &Cookie) -> Result<UserID, ParseIntError> {
    let id: i64 = cookie.value_trimmed().parse()?;

    Ok(UserID::new(id))
}
