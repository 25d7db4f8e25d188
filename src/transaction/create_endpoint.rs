//! Defines the endpoint for recording a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};
use time::OffsetDateTime;

use crate::{
    AppState, Error, UserID,
    app_state::lock_connection,
    customer::{CustomerId, get_owned_customer},
    transaction::{NewTransaction, create_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body for creating a transaction.
///
/// Every field must be present, the description may be empty.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    customer_id: Option<CustomerId>,
    amount: Option<f64>,
    #[serde(rename = "type")]
    kind: Option<String>,
    description: Option<String>,
}

impl TryFrom<TransactionForm> for NewTransaction {
    type Error = Error;

    fn try_from(form: TransactionForm) -> Result<Self, Self::Error> {
        let kind = form
            .kind
            .filter(|kind| !kind.trim().is_empty())
            .ok_or(Error::MissingField("type"))?;

        Ok(NewTransaction {
            customer_id: form.customer_id.ok_or(Error::MissingField("customer_id"))?,
            amount: form.amount.ok_or(Error::MissingField("amount"))?,
            kind,
            description: form.description.ok_or(Error::MissingField("description"))?,
        })
    }
}

/// A route handler for recording a transaction against one of the user's customers.
///
/// The timestamp is set to the current time. Responds with 201 and the ID of
/// the new transaction.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    payload: Result<Json<TransactionForm>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), Error> {
    let Json(form) = payload?;
    let new_transaction = NewTransaction::try_from(form)?;

    let connection = lock_connection(&state.db_connection)?;
    get_owned_customer(new_transaction.customer_id, user_id, &connection)?;
    let transaction = create_transaction(new_transaction, OffsetDateTime::now_utc(), &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Transaction recorded", "id": transaction.id })),
    ))
}
