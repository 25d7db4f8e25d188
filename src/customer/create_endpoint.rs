//! Defines the endpoint for creating a new customer.
use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error, UserID, app_state::lock_connection, customer::create_customer,
};

/// The state needed to create a customer.
#[derive(Debug, Clone)]
pub struct CreateCustomerState {
    /// The database connection for managing customers.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCustomerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body for creating a customer.
#[derive(Debug, Deserialize)]
pub struct CustomerForm {
    /// The customer's name.
    pub name: Option<String>,
    /// The customer's phone number.
    pub phone: Option<String>,
}

fn required_field(value: &Option<String>, field_name: &'static str) -> Result<String, Error> {
    match value.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_owned()),
        _ => Err(Error::MissingField(field_name)),
    }
}

/// A route handler for creating a customer owned by the logged in user.
///
/// Responds with 201 and the ID of the new customer.
pub async fn create_customer_endpoint(
    State(state): State<CreateCustomerState>,
    Extension(user_id): Extension<UserID>,
    payload: Result<Json<CustomerForm>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), Error> {
    let Json(form) = payload?;
    let name = required_field(&form.name, "name")?;
    let phone = required_field(&form.phone, "phone")?;

    let connection = lock_connection(&state.db_connection)?;
    let customer = create_customer(&name, &phone, user_id, &connection)?;
    tracing::info!("User {user_id} created customer {}.", customer.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Customer added", "id": customer.id })),
    ))
}
