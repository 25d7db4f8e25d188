//! The registration page for creating a new user account.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, PasswordHash,
    app_state::lock_connection,
    auth::create_user,
    endpoints,
    html::{Flash, base, flash_message, log_in_register, password_input, username_input},
};

pub const MISSING_FIELD_ERROR_MSG: &str = "Choose a username and a password.";
pub const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

fn registration_form(username: &str, error_message: Option<&str>) -> Markup {
    html! {
        form method="post" action=(endpoints::REGISTER)
        {
            (flash_message(error_message.map(Flash::Error)))

            (username_input(username))
            (password_input())

            button type="submit" id="submit-button" { "Register" }

            p
            {
                "Already have an account? "
                a href=(endpoints::LOG_IN) { "Log in here" }
            }
        }
    }
}

fn registration_page(username: &str, error_message: Option<&str>) -> Response {
    let form = registration_form(username, error_message);
    let content = log_in_register("Create an account", &form);

    base("Register", &content).into_response()
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    registration_page("", None)
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The bcrypt cost for hashing the new user's password.
    pub password_hash_cost: u32,
    /// The database connection for storing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            password_hash_cost: state.password_hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The data entered by the user in the registration form.
#[derive(Serialize, Deserialize)]
pub struct RegisterForm {
    /// The username to register.
    #[serde(default)]
    pub username: String,
    /// The plain text password, hashed before it is stored.
    #[serde(default)]
    pub password: String,
}

/// Create a user from the registration form.
///
/// On success the client is sent to the log-in page, otherwise the form is
/// shown again with a message explaining the problem.
pub async fn register_user(
    State(state): State<RegistrationState>,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let username = user_data.username.trim();

    if username.is_empty() || user_data.password.is_empty() {
        return registration_page(username, Some(MISSING_FIELD_ERROR_MSG));
    }

    let password_hash = match PasswordHash::new(&user_data.password, state.password_hash_cost) {
        Ok(password_hash) => password_hash,
        Err(error) => {
            tracing::error!("Could not hash password: {error}");
            return registration_page(username, Some(INTERNAL_ERROR_MSG));
        }
    };

    let result = lock_connection(&state.db_connection)
        .and_then(|connection| create_user(username, password_hash, &connection));

    match result {
        Ok(user) => {
            tracing::info!("Registered user {} as {}.", user.username, user.id);
            let redirect_url = format!("{}?registered=true", endpoints::LOG_IN);
            Redirect::to(&redirect_url).into_response()
        }
        Err(error @ Error::DuplicateUsername(_)) => {
            registration_page(username, Some(&error.to_string()))
        }
        Err(error) => {
            tracing::error!("Could not create user: {error}");
            registration_page(username, Some(INTERNAL_ERROR_MSG))
        }
    }
}
