//! Route handlers for listing and searching the logged in user's customers.
use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, UserID,
    app_state::lock_connection,
    customer::{Customer, get_customers, search_customers},
};

/// The state needed to list customers.
#[derive(Debug, Clone)]
pub struct CustomersState {
    /// The database connection for reading customers.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CustomersState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Returns all of the user's customers ordered by name.
pub async fn get_customers_endpoint(
    State(state): State<CustomersState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Customer>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_customers(user_id, &connection).map(Json)
}

/// The query parameters for searching customers.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    /// Text to look for in customer names and phone numbers, empty matches all.
    #[serde(default)]
    pub query: String,
}

/// Returns the user's customers whose name or phone number contains the `query` parameter.
pub async fn search_customers_endpoint(
    State(state): State<CustomersState>,
    Extension(user_id): Extension<UserID>,
    Query(SearchQuery { query }): Query<SearchQuery>,
) -> Result<Json<Vec<Customer>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    search_customers(&query, user_id, &connection).map(Json)
}
