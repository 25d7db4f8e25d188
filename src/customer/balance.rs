//! Computes how much each customer owes from their credit and debit transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State, rejection::PathRejection},
};
use rusqlite::{Connection, Row};
use serde::Serialize;

use crate::{
    AppState, Error, UserID,
    app_state::lock_connection,
    customer::{Customer, CustomerId, get_owned_customer, map_customer_row},
};

/// The totals of a customer's transactions.
///
/// Only transactions with the type "credit" or "debit" are counted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Balance {
    /// The customer the totals are for.
    pub customer_id: CustomerId,
    /// The sum of the customer's credit transactions.
    pub credit: f64,
    /// The sum of the customer's debit transactions.
    pub debit: f64,
    /// Credit minus debit.
    pub balance: f64,
}

/// A customer with their current balance, used for the overview page.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerSummary {
    pub customer: Customer,
    pub balance: f64,
}

const CREDIT_SUM: &str = "COALESCE(SUM(CASE WHEN t.type = 'credit' THEN t.amount END), 0)";
const DEBIT_SUM: &str = "COALESCE(SUM(CASE WHEN t.type = 'debit' THEN t.amount END), 0)";

/// Get the credit, debit and balance of the customer `customer_id`.
///
/// A customer without any transactions has a balance of zero.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_customer_balance(
    customer_id: CustomerId,
    connection: &Connection,
) -> Result<Balance, Error> {
    let (credit, debit): (f64, f64) = connection.query_row(
        &format!(
            "SELECT {CREDIT_SUM}, {DEBIT_SUM} FROM \"transaction\" t WHERE t.customer_id = ?1"
        ),
        [customer_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(Balance {
        customer_id,
        credit,
        debit,
        balance: credit - debit,
    })
}

/// Get the customers owned by `user_id` whose name or phone number contains
/// `query` with their balance, ordered by name.
///
/// An empty query matches every customer, the same as [crate::customer::search_customers].
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_customer_summaries(
    user_id: UserID,
    query: &str,
    connection: &Connection,
) -> Result<Vec<CustomerSummary>, Error> {
    let mut statement = connection.prepare(&format!(
        "SELECT c.id, c.name, c.phone, c.user_id, {CREDIT_SUM} - {DEBIT_SUM}
         FROM customer c
         LEFT JOIN \"transaction\" t ON t.customer_id = c.id
         WHERE c.user_id = :user_id
           AND (:query = '' OR instr(c.name, :query) > 0 OR instr(c.phone, :query) > 0)
         GROUP BY c.id
         ORDER BY c.name ASC, c.id ASC"
    ))?;

    statement
        .query_map(
            rusqlite::named_params! { ":user_id": user_id.as_i64(), ":query": query },
            map_summary_row,
        )?
        .map(|maybe_summary| maybe_summary.map_err(Error::from))
        .collect()
}

fn map_summary_row(row: &Row) -> Result<CustomerSummary, rusqlite::Error> {
    Ok(CustomerSummary {
        customer: map_customer_row(row)?,
        balance: row.get(4)?,
    })
}

/// The state needed to get a customer's balance.
#[derive(Debug, Clone)]
pub struct BalanceState {
    /// The database connection for reading customers and transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BalanceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that returns the balance of one of the user's customers.
pub async fn get_customer_balance_endpoint(
    State(state): State<BalanceState>,
    Extension(user_id): Extension<UserID>,
    path: Result<Path<CustomerId>, PathRejection>,
) -> Result<Json<Balance>, Error> {
    let Path(customer_id) = path?;
    let connection = lock_connection(&state.db_connection)?;
    get_owned_customer(customer_id, user_id, &connection)?;

    get_customer_balance(customer_id, &connection).map(Json)
}
