//! Route handlers for changing and deleting a single transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{
        FromRef, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error, UserID,
    app_state::lock_connection,
    transaction::{
        TransactionId, TransactionUpdate, delete_transaction, get_owned_transaction,
        update_transaction,
    },
};

/// The state needed to edit or delete a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EditTransactionForm {
    amount: Option<f64>,
    #[serde(rename = "type")]
    kind: Option<String>,
    description: Option<String>,
}

impl TryFrom<EditTransactionForm> for TransactionUpdate {
    type Error = Error;

    fn try_from(form: EditTransactionForm) -> Result<Self, Self::Error> {
        Ok(TransactionUpdate {
            amount: form.amount.ok_or(Error::MissingField("amount"))?,
            kind: form
                .kind
                .filter(|kind| !kind.trim().is_empty())
                .ok_or(Error::MissingField("type"))?,
            description: form.description.ok_or(Error::MissingField("description"))?,
        })
    }
}

/// A route handler that overwrites the amount, type and description of one of the user's transactions.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
    path: Result<Path<TransactionId>, PathRejection>,
    payload: Result<Json<EditTransactionForm>, JsonRejection>,
) -> Result<Json<Value>, Error> {
    let Path(transaction_id) = path?;
    let Json(form) = payload?;
    let update = TransactionUpdate::try_from(form)?;

    let connection = lock_connection(&state.db_connection)?;
    get_owned_transaction(transaction_id, user_id, &connection)?;
    update_transaction(transaction_id, update, &connection)?;

    Ok(Json(json!({ "message": "Transaction updated" })))
}

/// A route handler that deletes one of the user's transactions.
pub async fn delete_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
    path: Result<Path<TransactionId>, PathRejection>,
) -> Result<Json<Value>, Error> {
    let Path(transaction_id) = path?;
    let connection = lock_connection(&state.db_connection)?;
    get_owned_transaction(transaction_id, user_id, &connection)?;
    delete_transaction(transaction_id, &connection)?;
    tracing::info!("User {user_id} deleted transaction {transaction_id}.");

    Ok(Json(json!({ "message": "Transaction deleted" })))
}
