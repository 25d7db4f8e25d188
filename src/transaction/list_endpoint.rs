//! Route handlers for reading transactions.
use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State, rejection::PathRejection},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    app_state::lock_connection,
    customer::{CustomerId, get_owned_customer},
    transaction::{CustomerTransaction, Transaction, get_all_transactions, get_customer_transactions},
};

/// The state needed to read transactions.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Returns the transactions of one of the user's customers, newest first.
pub async fn get_customer_transactions_endpoint(
    State(state): State<TransactionsState>,
    Extension(user_id): Extension<UserID>,
    path: Result<Path<CustomerId>, PathRejection>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let Path(customer_id) = path?;
    let connection = lock_connection(&state.db_connection)?;
    get_owned_customer(customer_id, user_id, &connection)?;

    get_customer_transactions(customer_id, &connection).map(Json)
}

/// Returns every transaction of the user's customers with the customer's name
/// and phone number, newest first.
pub async fn get_all_transactions_endpoint(
    State(state): State<TransactionsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<CustomerTransaction>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_all_transactions(user_id, &connection).map(Json)
}
